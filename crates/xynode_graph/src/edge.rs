// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::ident::{EdgeId, SocketId};
use serde::{Deserialize, Serialize};

/// How an edge is drawn. Has no behavioural effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EdgeType {
    /// Straight line
    Direct = 1,
    /// Cubic bezier curve
    #[default]
    Bezier = 2,
}

impl From<EdgeType> for u8 {
    fn from(edge_type: EdgeType) -> Self {
        edge_type as u8
    }
}

impl TryFrom<u8> for EdgeType {
    type Error = InvalidEdgeType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Direct),
            2 => Ok(Self::Bezier),
            other => Err(InvalidEdgeType(other)),
        }
    }
}

/// Edge type code outside `1..=2`
#[derive(Debug, thiserror::Error)]
#[error("Invalid edge type code: {0}")]
pub struct InvalidEdgeType(pub u8);

/// A connection between two sockets.
///
/// `end` is `None` only for a provisional drag edge, which is never stored
/// in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Rendering style
    pub edge_type: EdgeType,
    start: SocketId,
    end: Option<SocketId>,
}

impl Edge {
    /// Create a committed edge
    pub fn new(id: EdgeId, start: SocketId, end: SocketId, edge_type: EdgeType) -> Self {
        Self {
            id,
            edge_type,
            start,
            end: Some(end),
        }
    }

    /// Create a one-ended edge for an in-progress drag
    pub fn provisional(id: EdgeId, start: SocketId, edge_type: EdgeType) -> Self {
        Self {
            id,
            edge_type,
            start,
            end: None,
        }
    }

    /// Start socket
    pub fn start(&self) -> SocketId {
        self.start
    }

    /// End socket, `None` while dragging
    pub fn end(&self) -> Option<SocketId> {
        self.end
    }

    /// Whether this is a one-ended drag edge
    pub fn is_provisional(&self) -> bool {
        self.end.is_none()
    }

    /// Whether this edge runs exactly from `start` to `end`
    pub fn connects(&self, start: SocketId, end: SocketId) -> bool {
        self.start == start && self.end == Some(end)
    }

    /// Check if this edge involves a specific socket
    pub fn involves_socket(&self, socket: SocketId) -> bool {
        self.start == socket || self.end == Some(socket)
    }

    /// Both endpoints, skipping a missing end
    pub fn sockets(&self) -> impl Iterator<Item = SocketId> {
        std::iter::once(self.start).chain(self.end)
    }
}
