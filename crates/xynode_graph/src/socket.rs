// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::ident::{EdgeId, NodeId, SocketId};
use serde::{Deserialize, Serialize};

/// Integer category of a socket, used for compatibility and visual grouping
pub type SocketType = u32;

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// Corner of the node a socket is anchored to.
///
/// Purely geometric metadata. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SocketSide {
    /// Left edge, stacked from the top
    LeftTop = 1,
    /// Left edge, stacked from the bottom
    LeftBottom = 2,
    /// Right edge, stacked from the top
    RightTop = 3,
    /// Right edge, stacked from the bottom
    RightBottom = 4,
}

impl SocketSide {
    /// Whether the socket sits on the left edge
    pub fn is_left(self) -> bool {
        matches!(self, Self::LeftTop | Self::LeftBottom)
    }

    /// Whether sockets on this side stack up from the bottom
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::LeftBottom | Self::RightBottom)
    }

    /// Default side for sockets of the given direction
    pub fn default_for(direction: SocketDirection) -> Self {
        match direction {
            SocketDirection::Input => Self::LeftBottom,
            SocketDirection::Output => Self::RightTop,
        }
    }
}

impl From<SocketSide> for u8 {
    fn from(side: SocketSide) -> Self {
        side as u8
    }
}

impl TryFrom<u8> for SocketSide {
    type Error = InvalidSocketSide;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::LeftTop),
            2 => Ok(Self::LeftBottom),
            3 => Ok(Self::RightTop),
            4 => Ok(Self::RightBottom),
            other => Err(InvalidSocketSide(other)),
        }
    }
}

/// Socket side code outside `1..=4`
#[derive(Debug, thiserror::Error)]
#[error("Invalid socket side code: {0}")]
pub struct InvalidSocketSide(pub u8);

/// Socket colour palette indexed by type tag (wraps around)
const SOCKET_COLORS: [[u8; 3]; 6] = [
    [0xFF, 0x77, 0x00],
    [0x52, 0xE2, 0x20],
    [0x00, 0x56, 0xA6],
    [0xA8, 0x6D, 0xB1],
    [0xB5, 0x47, 0x47],
    [0xDB, 0xE2, 0x20],
];

/// Get the colour for a socket type tag (for UI)
pub fn socket_type_color(socket_type: SocketType) -> [u8; 3] {
    SOCKET_COLORS[socket_type as usize % SOCKET_COLORS.len()]
}

/// What a node factory needs to know to create one socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketSpec {
    /// Type tag
    pub socket_type: SocketType,
    /// Whether the socket accepts more than one edge
    pub multi_edges: bool,
}

impl SocketSpec {
    /// Single-edge input socket
    pub fn input(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            multi_edges: false,
        }
    }

    /// Multi-edge output socket
    pub fn output(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            multi_edges: true, // Outputs can fan out by default
        }
    }

    /// Override the multi-edge flag
    pub fn with_multi_edges(mut self, multi_edges: bool) -> Self {
        self.multi_edges = multi_edges;
        self
    }
}

/// A connection point on a node
#[derive(Debug, Clone)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    node: NodeId,
    /// Position within the node's input or output list
    pub index: usize,
    /// Input or output
    pub direction: SocketDirection,
    /// Anchor corner
    pub side: SocketSide,
    /// Type tag
    pub socket_type: SocketType,
    /// Whether more than one edge may attach
    pub multi_edges: bool,
    edges: Vec<EdgeId>,
}

impl Socket {
    /// Create a socket owned by `node`
    pub fn new(
        id: SocketId,
        node: NodeId,
        index: usize,
        direction: SocketDirection,
        side: SocketSide,
        spec: SocketSpec,
    ) -> Self {
        Self {
            id,
            node,
            index,
            direction,
            side,
            socket_type: spec.socket_type,
            multi_edges: spec.multi_edges,
            edges: Vec::new(),
        }
    }

    /// Owning node (fixed at construction)
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Attached edges, in attach order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of attached edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `edge` is attached
    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Record an attached edge
    pub(crate) fn add_edge(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    /// Forget an attached edge.
    ///
    /// Returns `false` and logs a warning when `edge` is not attached, so a
    /// repeated call is harmless.
    pub(crate) fn remove_edge(&mut self, edge: EdgeId) -> bool {
        if let Some(pos) = self.edges.iter().position(|e| *e == edge) {
            self.edges.remove(pos);
            true
        } else {
            tracing::warn!("Socket::remove_edge: {} is not attached to {}", edge, self.id);
            false
        }
    }
}
