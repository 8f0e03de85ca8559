use std::ops::Range;

use rand::Rng;
use smartlet_api::Message;

use crate::error::{Error, Result};
use crate::settings::MAX_CLIENTS;

/// Width of the band each node draws its powers from
const POWER_SPAN: u16 = 499;

/// Offset of the bottom band above the top band
const BOTTOM_OFFSET: u16 = 500;

/// Distance between the bands of consecutive nodes
const NODE_STRIDE: u16 = 1000;

/// One simulated Smartlet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    index: u16,
    id: u32,
}

impl Node {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Range the top power is drawn from: `[1000i, 1000i + 499)`
    pub fn top_range(&self) -> Range<u16> {
        let base = NODE_STRIDE * self.index;
        base..base + POWER_SPAN
    }

    /// Range the bottom power is drawn from: `[1000i + 500, 1000i + 999)`
    pub fn bottom_range(&self) -> Range<u16> {
        let base = NODE_STRIDE * self.index + BOTTOM_OFFSET;
        base..base + POWER_SPAN
    }

    /// Produces the next power reading for this node
    pub fn reading<R: Rng>(&self, rng: &mut R) -> Message {
        let top_power = rng.random_range(self.top_range());
        let bottom_power = rng.random_range(self.bottom_range());

        Message::reading(self.id, top_power, bottom_power)
    }
}

/// The fixed set of nodes multiplexed over one session
#[derive(Debug, Clone)]
pub struct Fleet {
    nodes: Vec<Node>,
}

impl Fleet {
    pub fn new(count: usize, id_offset: u32) -> Result<Self> {
        if count == 0 || count > MAX_CLIENTS {
            return Err(Error::Config(format!(
                "fleet size must be between 1 and {MAX_CLIENTS}, got {count}"
            )));
        }

        let nodes = (0..count as u16)
            .map(|index| {
                let id = id_offset.checked_add(index as u32).ok_or_else(|| {
                    Error::Config(format!(
                        "node id offset {id_offset} leaves no room for {count} nodes"
                    ))
                })?;

                Ok(Node { index, id })
            })
            .collect::<Result<_>>()?;

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
