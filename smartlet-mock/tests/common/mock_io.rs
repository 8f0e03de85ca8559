use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use smartlet_api::wire::COLLECTOR_PORT;
use smartlet_api::{DecodeError, Message};
use smartlet_mock::observer::MessageObserver;
use smartlet_mock::transport::{Endpoint, SessionTransport};

/// Collector side of a session, scripted in virtual time
#[derive(Debug, Default)]
pub struct ScriptedIo {
    /// Frames accepted from the simulator, one per write
    pub frames: Vec<Vec<u8>>,
    /// Inbound chunks, each delivered after its delay
    pub reads: VecDeque<(Duration, Vec<u8>)>,
    pub read_calls: usize,
    pub write_delay: Duration,
    /// Index of the write that accepts zero bytes
    pub zero_write_at: Option<usize>,
}

impl ScriptedIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn with_zero_write_at(mut self, index: usize) -> Self {
        self.zero_write_at = Some(index);
        self
    }

    pub fn with_read(mut self, delay: Duration, data: Vec<u8>) -> Self {
        self.reads.push_back((delay, data));
        self
    }

    pub fn into_transport(self) -> SessionTransport<Self> {
        let peer = Endpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), COLLECTOR_PORT);
        SessionTransport::new(self, peer)
    }
}

impl ErrorType for ScriptedIo {
    type Error = ErrorKind;
}

impl Read for ScriptedIo {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.read_calls += 1;

        match self.reads.pop_front() {
            Some((delay, data)) => {
                tokio::time::sleep(delay).await;
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            None => std::future::pending().await,
        }
    }
}

impl Write for ScriptedIo {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }

        if self.zero_write_at == Some(self.frames.len()) {
            return Ok(0);
        }

        self.frames.push(buf.to_vec());
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub messages: Vec<Message>,
    pub malformed: Vec<(Vec<u8>, DecodeError)>,
}

impl MessageObserver for RecordingObserver {
    fn on_message(&mut self, message: &Message, _frame: &[u8]) {
        self.messages.push(*message);
    }

    fn on_malformed(&mut self, frame: &[u8], error: DecodeError) {
        self.malformed.push((frame.to_vec(), error));
    }
}
