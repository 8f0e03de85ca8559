//! Locating the collector through its multicast announcement.
//!
//! The collector periodically sends a datagram to a well-known group. The
//! payload is not inspected: whoever sent it is the collector.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::settings;
use crate::transport::Endpoint;

/// Receive side of the announcement channel
#[async_trait]
pub trait AnnouncementSource {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl AnnouncementSource for UdpSocket {
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPolicy {
    pub group: Ipv4Addr,
    pub port: u16,
    /// How long a single receive may block
    pub attempt_timeout: Duration,
    /// `None` keeps listening until the collector shows up
    pub max_attempts: Option<u32>,
    pub buffer_size: usize,
}

impl From<&settings::Discovery> for DiscoveryPolicy {
    fn from(discovery: &settings::Discovery) -> Self {
        Self {
            group: discovery.group,
            port: discovery.port,
            attempt_timeout: Duration::from_millis(discovery.attempt_timeout_ms),
            max_attempts: discovery.max_attempts,
            buffer_size: discovery.buffer_size,
        }
    }
}

/// Binds the announcement port on all interfaces and joins the group.
///
/// Any failure here is an environment problem and is not retried.
pub async fn bind_listener(policy: &DiscoveryPolicy) -> Result<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, policy.port))
        .await
        .map_err(Error::Bind)?;

    socket
        .join_multicast_v4(policy.group, Ipv4Addr::UNSPECIFIED)
        .map_err(Error::Bind)?;

    tracing::info!(
        "Listening for collector announcements on {}:{}",
        policy.group,
        policy.port
    );

    Ok(socket)
}

/// Waits for an announcement and returns the collector's session endpoint.
///
/// Each attempt is bounded by the policy's timeout; timeouts and transient
/// receive errors are logged and retried until an announcement arrives, the
/// attempt cap is reached or `shutdown` fires.
pub async fn discover_collector<S>(
    source: &mut S,
    policy: &DiscoveryPolicy,
    collector_port: u16,
    shutdown: &CancellationToken,
) -> Result<Endpoint>
where
    S: AnnouncementSource + Send + ?Sized,
{
    let mut buffer = vec![0u8; policy.buffer_size.max(1)];
    let mut attempts: u32 = 0;

    loop {
        if let Some(max_attempts) = policy.max_attempts {
            if attempts >= max_attempts {
                return Err(Error::DiscoveryExhausted(attempts));
            }
        }
        attempts += 1;

        let received = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(Error::Cancelled),
            received = time::timeout(policy.attempt_timeout, source.recv_from(&mut buffer)) => received,
        };

        match received {
            Ok(Ok((size, sender))) => {
                tracing::info!(
                    "Got a broadcast packet ({} bytes) from {}, setting configuration",
                    size,
                    sender.ip()
                );
                return Ok(Endpoint::new(sender.ip(), collector_port));
            }
            Ok(Err(e)) => {
                tracing::warn!("Error waiting for broadcast packet: {}", e);
                // Keep a failing socket from spinning
                time::sleep(policy.attempt_timeout).await;
            }
            Err(_) => {
                tracing::info!("Timeout waiting for broadcast packet (attempt {})", attempts);
            }
        }
    }
}
