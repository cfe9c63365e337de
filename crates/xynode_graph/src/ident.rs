// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity identifiers and the per-scene ID generator.
//!
//! Every node, socket and edge draws its ID from the same [`IdGenerator`], so
//! IDs are unique across entity kinds within a live scene. The generator is
//! owned by the scene rather than being process global, which keeps
//! independent editor sessions from interfering with each other.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a scene
    SceneId,
    "scene"
);
entity_id!(
    /// Unique identifier for a node
    NodeId,
    "node"
);
entity_id!(
    /// Unique identifier for a socket
    SocketId,
    "socket"
);
entity_id!(
    /// Unique identifier for an edge
    EdgeId,
    "edge"
);

/// Largest ID a serialized payload may carry.
///
/// Anything above would leave the generator no room to keep minting after
/// the ID has been reserved.
pub const MAX_PAYLOAD_ID: u64 = u64::MAX - 2;

/// The generator has handed out every ID it can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ID space exhausted")]
pub struct IdExhausted;

/// Monotonic ID source scoped to one scene.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Create a generator that starts at 1 (0 is never handed out)
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next raw ID
    pub fn mint(&mut self) -> Result<u64, IdExhausted> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or(IdExhausted)?;
        Ok(id)
    }

    /// Mint a node ID
    pub fn node(&mut self) -> Result<NodeId, IdExhausted> {
        self.mint().map(NodeId)
    }

    /// Mint a socket ID
    pub fn socket(&mut self) -> Result<SocketId, IdExhausted> {
        self.mint().map(SocketId)
    }

    /// Mint an edge ID
    pub fn edge(&mut self) -> Result<EdgeId, IdExhausted> {
        self.mint().map(EdgeId)
    }

    /// Whether `count` more IDs can be minted
    pub fn has_room(&self, count: usize) -> bool {
        u64::try_from(count)
            .ok()
            .and_then(|count| self.next.checked_add(count))
            .is_some()
    }

    /// Mark `raw` as used so it is never minted afterwards.
    ///
    /// Called for every ID adopted from a payload with `restore_id`.
    pub fn reserve(&mut self, raw: u64) {
        if raw >= self.next {
            self.next = raw.saturating_add(1);
        }
    }

    /// The ID the next call to [`mint`](Self::mint) returns
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
