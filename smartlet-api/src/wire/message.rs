use super::error::DecodeError;
use super::{HEADER_SIZE, MESSAGE_SIZE, PAYLOAD_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Power reading sent by a node
    Reading,
    /// Device state pushed by the collector
    DeviceState,
    /// Any discriminator this crate has no layout for
    Other(u8),
}

impl MessageType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Reading,
            2 => Self::DeviceState,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Reading => 1,
            Self::DeviceState => 2,
            Self::Other(value) => *value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::DeviceState => "device_state",
            Self::Other(_) => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: MessageType,
    pub length: u16,
    pub node_id: u32,
}

impl Header {
    pub fn new(kind: MessageType, node_id: u32) -> Self {
        Self {
            kind,
            length: PAYLOAD_LENGTH,
            node_id,
        }
    }

    fn encode_into(&self, buffer: &mut [u8; MESSAGE_SIZE]) {
        buffer[0] = self.kind.as_u8();
        buffer[1..3].copy_from_slice(&self.length.to_be_bytes());
        buffer[3..7].copy_from_slice(&self.node_id.to_be_bytes());
    }

    fn decode_from(data: &[u8]) -> Self {
        Self {
            kind: MessageType::from_u8(data[0]),
            length: u16::from_be_bytes([data[1], data[2]]),
            node_id: u32::from_be_bytes([data[3], data[4], data[5], data[6]]),
        }
    }
}

/// The four bytes following the header, interpreted by message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Reading {
        top_power: u16,
        bottom_power: u16,
    },
    DeviceState {
        update_timer: u16,
        top_state: u8,
        bottom_state: u8,
    },
    Raw([u8; 4]),
}

impl Body {
    fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Reading {
                top_power,
                bottom_power,
            } => {
                let [t0, t1] = top_power.to_be_bytes();
                let [b0, b1] = bottom_power.to_be_bytes();
                [t0, t1, b0, b1]
            }
            Self::DeviceState {
                update_timer,
                top_state,
                bottom_state,
            } => {
                let [u0, u1] = update_timer.to_be_bytes();
                [u0, u1, top_state, bottom_state]
            }
            Self::Raw(bytes) => bytes,
        }
    }

    fn from_bytes(kind: MessageType, bytes: [u8; 4]) -> Self {
        match kind {
            MessageType::Reading => Self::Reading {
                top_power: u16::from_be_bytes([bytes[0], bytes[1]]),
                bottom_power: u16::from_be_bytes([bytes[2], bytes[3]]),
            },
            MessageType::DeviceState => Self::DeviceState {
                update_timer: u16::from_be_bytes([bytes[0], bytes[1]]),
                top_state: bytes[2],
                bottom_state: bytes[3],
            },
            MessageType::Other(_) => Self::Raw(bytes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub body: Body,
}

impl Message {
    pub fn reading(node_id: u32, top_power: u16, bottom_power: u16) -> Self {
        Self {
            header: Header::new(MessageType::Reading, node_id),
            body: Body::Reading {
                top_power,
                bottom_power,
            },
        }
    }

    pub fn device_state(node_id: u32, update_timer: u16, top_state: u8, bottom_state: u8) -> Self {
        Self {
            header: Header::new(MessageType::DeviceState, node_id),
            body: Body::DeviceState {
                update_timer,
                top_state,
                bottom_state,
            },
        }
    }

    /// Encodes the message into a single frame
    pub fn encode(&self) -> [u8; MESSAGE_SIZE] {
        let mut buffer = [0u8; MESSAGE_SIZE];
        self.header.encode_into(&mut buffer);
        buffer[HEADER_SIZE..].copy_from_slice(&self.body.to_bytes());
        buffer
    }

    /// Decodes the first frame in `data`.
    ///
    /// Only the minimum size is checked; the length field and the body are
    /// taken as they are. Trailing bytes are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < MESSAGE_SIZE {
            return Err(DecodeError::MalformedPacket { length: data.len() });
        }

        let header = Header::decode_from(data);
        let body = Body::from_bytes(header.kind, [data[7], data[8], data[9], data[10]]);

        Ok(Self { header, body })
    }
}

/// Builds the frame a node sends for one power reading
pub fn encode_reading(node_id: u32, top_power: u16, bottom_power: u16) -> [u8; MESSAGE_SIZE] {
    Message::reading(node_id, top_power, bottom_power).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_layout() {
        let frame = encode_reading(0x0102_0304, 0x0A0B, 0x0C0D);

        assert_eq!(
            frame,
            [0x01, 0x00, 0x04, 0x01, 0x02, 0x03, 0x04, 0x0A, 0x0B, 0x0C, 0x0D]
        );
    }

    #[test]
    fn test_reading_roundtrip() {
        let cases = [(100, 0, 500), (101, 1498, 1998), (u32::MAX, u16::MAX, 0)];

        for (node_id, top, bottom) in cases {
            let message = Message::decode(&encode_reading(node_id, top, bottom)).unwrap();

            assert_eq!(message.header.kind, MessageType::Reading);
            assert_eq!(message.header.length, PAYLOAD_LENGTH);
            assert_eq!(message.header.node_id, node_id);
            assert_eq!(
                message.body,
                Body::Reading {
                    top_power: top,
                    bottom_power: bottom
                }
            );
        }
    }

    #[test]
    fn test_decode_device_state() {
        let data = [0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x65, 0x13, 0x88, 0x01, 0x00];
        let message = Message::decode(&data).unwrap();

        assert_eq!(message.header.kind, MessageType::DeviceState);
        assert_eq!(message.header.node_id, 101);
        assert_eq!(
            message.body,
            Body::DeviceState {
                update_timer: 5000,
                top_state: 1,
                bottom_state: 0
            }
        );
        assert_eq!(message.encode(), data);
    }

    #[test]
    fn test_decode_rejects_short_buffers() {
        let data = [0xFFu8; MESSAGE_SIZE];

        for length in 0..MESSAGE_SIZE {
            assert_eq!(
                Message::decode(&data[..length]),
                Err(DecodeError::MalformedPacket { length })
            );
        }
    }

    #[test]
    fn test_decode_is_not_a_validator() {
        // Unknown type, bogus length field
        let data = [0x7F, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01, 0xDE, 0xAD, 0xBE, 0xEF];
        let message = Message::decode(&data).unwrap();

        assert_eq!(message.header.kind, MessageType::Other(0x7F));
        assert_eq!(message.header.length, 0xFFFF);
        assert_eq!(message.body, Body::Raw([0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut data = [0u8; 16];
        data[..MESSAGE_SIZE].copy_from_slice(&encode_reading(7, 1, 2));

        let message = Message::decode(&data).unwrap();
        assert_eq!(message.header.node_id, 7);
    }

    #[test]
    fn test_message_type_from_u8() {
        assert_eq!(MessageType::from_u8(1), MessageType::Reading);
        assert_eq!(MessageType::from_u8(2), MessageType::DeviceState);
        assert_eq!(MessageType::from_u8(9), MessageType::Other(9));
        assert_eq!(MessageType::Other(9).as_u8(), 9);
        assert_eq!(MessageType::DeviceState.name(), "device_state");
    }
}
