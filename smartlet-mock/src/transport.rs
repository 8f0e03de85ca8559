use std::fmt::{self, Debug};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use embedded_io_adapters::tokio_1::FromTokio;
use embedded_io_async::{ErrorType, Read, Write};
use smartlet_api::wire::MESSAGE_SIZE;
use tokio::net::TcpStream;
use tokio::time;

use crate::error::{Error, Result};

/// Where the collector accepts sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    ip: IpAddr,
    port: u16,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// The single connection all simulated nodes report over
#[derive(Debug)]
pub struct SessionTransport<IO> {
    io: IO,
    peer: Endpoint,
}

impl SessionTransport<FromTokio<TcpStream>> {
    /// Opens the session to the collector. There is no reconnect policy, so
    /// a failure here ends the run.
    pub async fn connect(endpoint: Endpoint) -> Result<Self> {
        let stream = TcpStream::connect(endpoint.socket_addr())
            .await
            .map_err(|source| Error::Connect {
                endpoint: endpoint.socket_addr(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("Failed to disable Nagle on session socket: {}", e);
        }

        tracing::info!("Connection established to {}", endpoint);

        Ok(Self::new(FromTokio::new(stream), endpoint))
    }
}

impl<IO> SessionTransport<IO> {
    pub fn new(io: IO, peer: Endpoint) -> Self {
        Self { io, peer }
    }

    pub fn peer(&self) -> Endpoint {
        self.peer
    }

    pub fn inner(&self) -> &IO {
        &self.io
    }
}

impl<IO> SessionTransport<IO>
where
    IO: Read + Write + ErrorType,
    IO::Error: Debug,
{
    /// Writes one frame on behalf of `node_id`.
    ///
    /// Frames are small enough to go out in a single write, so a zero or
    /// short write is treated like a failed one and abandons the session.
    pub async fn send(&mut self, node_id: u32, frame: &[u8]) -> Result<()> {
        let written = self.io.write(frame).await.map_err(|e| Error::Write {
            node_id,
            reason: format!("{:?}", e),
        })?;

        if written == 0 {
            return Err(Error::Write {
                node_id,
                reason: "peer accepted no bytes".into(),
            });
        }

        if written < frame.len() {
            return Err(Error::Write {
                node_id,
                reason: format!("short write of {} of {} bytes", written, frame.len()),
            });
        }

        self.io.flush().await.map_err(|e| Error::Write {
            node_id,
            reason: format!("{:?}", e),
        })?;

        tracing::debug!("Write success for node {}", node_id);

        Ok(())
    }

    /// Waits at most `timeout` for up to `max_bytes` of inbound data.
    ///
    /// The deadline applies to this call only. `Error::Timeout` is the
    /// expected outcome when the collector has nothing to say; end of stream
    /// and read failures are reported as `Error::Receive`.
    pub async fn receive_with_timeout(
        &mut self,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; max_bytes.max(1)];

        let read = match time::timeout(timeout, self.io.read(&mut buffer)).await {
            Err(_) => return Err(Error::Timeout),
            Ok(read) => read.map_err(|e| Error::Receive(format!("{:?}", e)))?,
        };

        if read == 0 {
            return Err(Error::Receive(format!("{} closed the session", self.peer)));
        }

        buffer.truncate(read);
        Ok(buffer)
    }

    /// Receive sized for one inbound frame
    pub async fn receive_frame(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        self.receive_with_timeout(MESSAGE_SIZE, timeout).await
    }
}
