use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer shorter than a full frame
    MalformedPacket { length: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPacket { length } => {
                write!(f, "Malformed packet: received {} bytes", length)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
