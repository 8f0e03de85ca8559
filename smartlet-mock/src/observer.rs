use std::fmt::Write as _;

use smartlet_api::{Body, DecodeError, Message};

/// Receives whatever the collector sends during the waiting phase
pub trait MessageObserver {
    fn on_message(&mut self, message: &Message, frame: &[u8]);

    fn on_malformed(&mut self, _frame: &[u8], _error: DecodeError) {}
}

/// Reports inbound traffic through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MessageObserver for TracingObserver {
    fn on_message(&mut self, message: &Message, frame: &[u8]) {
        let header = &message.header;

        match message.body {
            Body::DeviceState {
                update_timer,
                top_state,
                bottom_state,
            } => tracing::info!(
                kind = header.kind.name(),
                length = header.length,
                node_id = header.node_id,
                update_timer,
                top_state,
                bottom_state,
                "Received device state"
            ),
            Body::Reading {
                top_power,
                bottom_power,
            } => tracing::info!(
                kind = header.kind.name(),
                length = header.length,
                node_id = header.node_id,
                top_power,
                bottom_power,
                "Received reading"
            ),
            Body::Raw(bytes) => tracing::info!(
                kind = header.kind.as_u8(),
                length = header.length,
                node_id = header.node_id,
                body = ?bytes,
                "Received message of unknown type"
            ),
        }

        tracing::debug!("{}", hex_dump(frame));
    }

    fn on_malformed(&mut self, frame: &[u8], error: DecodeError) {
        tracing::warn!("Discarding inbound data: {} [{}]", error, hex_dump(frame));
    }
}

/// `0A|0B|...` rendering of a frame
pub fn hex_dump(frame: &[u8]) -> String {
    let mut out = String::with_capacity(frame.len() * 3);
    for byte in frame {
        let _ = write!(out, "{:02X}|", byte);
    }
    out
}
