// SPDX-License-Identifier: MIT OR Apache-2.0
//! Save/restore contract shared by every scene entity.
//!
//! Each entity serializes into a plain data struct whose field names match the
//! on-disk JSON format. Deserialization takes an explicit [`IdMap`] and a
//! `restore_id` flag:
//!
//! - `restore_id == true` (load, undo/redo): the entity adopts the serialized ID.
//! - `restore_id == false` (paste): the entity keeps a freshly minted ID.
//!
//! Either way the entity is registered in the map under its *serialized* ID,
//! so edges later in the same payload can resolve their endpoint sockets.
//! Nodes (with their sockets) are therefore always rebuilt before edges.
//!
//! Payloads are validated in full before the live scene is touched, so a
//! malformed payload never leaves a half-built graph behind.

use crate::edge::{Edge, EdgeType};
use crate::geometry::Point;
use crate::ident::{EdgeId, IdExhausted, IdGenerator, NodeId, SceneId, SocketId, MAX_PAYLOAD_ID};
use crate::node::Node;
use crate::scene::{GraphError, Scene};
use crate::socket::{Socket, SocketDirection, SocketSide, SocketSpec, SocketType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Serialized scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    /// Scene ID
    pub id: SceneId,
    /// Canvas width
    pub scene_width: f64,
    /// Canvas height
    pub scene_height: f64,
    /// Nodes in insertion order
    pub nodes: Vec<NodeData>,
    /// Edges in insertion order
    pub edges: Vec<EdgeData>,
}

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node ID
    pub id: NodeId,
    /// Title
    pub title: String,
    /// Horizontal position
    pub pos_x: f64,
    /// Vertical position
    pub pos_y: f64,
    /// Input sockets
    pub inputs: Vec<SocketData>,
    /// Output sockets
    pub outputs: Vec<SocketData>,
    /// Widget content
    #[serde(default)]
    pub content: IndexMap<String, String>,
}

/// Serialized socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketData {
    /// Socket ID
    pub id: SocketId,
    /// Index within the input/output list
    pub index: usize,
    /// Anchor corner
    pub position: SocketSide,
    /// Type tag
    pub socket_type: SocketType,
    /// Multi-edge flag
    pub multi_edges: bool,
}

/// Serialized edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Edge ID
    pub id: EdgeId,
    /// Rendering style
    pub edge_type: EdgeType,
    /// Start socket ID
    pub socket_start: SocketId,
    /// End socket ID
    pub socket_end: SocketId,
}

/// Self-contained subgraph exchanged through the clipboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardData {
    /// Copied nodes
    pub nodes: Vec<NodeData>,
    /// Edges whose both ends are on copied nodes
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

impl SceneData {
    /// Parse from JSON text
    pub fn from_json(text: &str) -> Result<Self, DeserializeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ClipboardData {
    /// Parse from JSON text
    pub fn from_json(text: &str) -> Result<Self, DeserializeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether the payload holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Serialized ID -> live ID, for one top-level deserialize call.
///
/// Always construct a fresh map per load or paste; [`Scene::deserialize`]
/// refuses a map that already holds entries.
#[derive(Debug, Default)]
pub struct IdMap {
    nodes: HashMap<NodeId, NodeId>,
    sockets: HashMap<SocketId, SocketId>,
    edges: HashMap<EdgeId, EdgeId>,
}

impl IdMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been registered yet
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.sockets.is_empty() && self.edges.is_empty()
    }

    /// Live node for a serialized node ID
    pub fn node(&self, old: NodeId) -> Option<NodeId> {
        self.nodes.get(&old).copied()
    }

    /// Live socket for a serialized socket ID
    pub fn socket(&self, old: SocketId) -> Option<SocketId> {
        self.sockets.get(&old).copied()
    }

    /// Live edge for a serialized edge ID
    pub fn edge(&self, old: EdgeId) -> Option<EdgeId> {
        self.edges.get(&old).copied()
    }

    fn register_node(&mut self, old: NodeId, new: NodeId) {
        self.nodes.insert(old, new);
    }

    fn register_socket(&mut self, old: SocketId, new: SocketId) {
        self.sockets.insert(old, new);
    }

    fn register_edge(&mut self, old: EdgeId, new: EdgeId) {
        self.edges.insert(old, new);
    }
}

// ---- per-entity contract ----

impl Socket {
    /// Extract the socket's persistent state
    pub fn serialize(&self) -> SocketData {
        SocketData {
            id: self.id,
            index: self.index,
            position: self.side,
            socket_type: self.socket_type,
            multi_edges: self.multi_edges,
        }
    }

    /// Rebuild a socket owned by `node`
    pub fn deserialize(
        data: &SocketData,
        node: NodeId,
        direction: SocketDirection,
        ids: &mut IdGenerator,
        id_map: &mut IdMap,
        restore_id: bool,
    ) -> Result<Self, IdExhausted> {
        let id = if restore_id { data.id } else { ids.socket()? };
        id_map.register_socket(data.id, id);
        let spec = SocketSpec {
            socket_type: data.socket_type,
            multi_edges: data.multi_edges,
        };
        Ok(Socket::new(id, node, data.index, direction, data.position, spec))
    }
}

impl Node {
    /// Extract the node's persistent state, sockets included
    pub fn serialize(&self) -> NodeData {
        NodeData {
            id: self.id,
            title: self.title.clone(),
            pos_x: self.position.x,
            pos_y: self.position.y,
            inputs: self.inputs.iter().map(Socket::serialize).collect(),
            outputs: self.outputs.iter().map(Socket::serialize).collect(),
            content: self.content.clone(),
        }
    }

    /// Rebuild a node and its sockets
    pub fn deserialize(
        data: &NodeData,
        ids: &mut IdGenerator,
        id_map: &mut IdMap,
        restore_id: bool,
    ) -> Result<Self, IdExhausted> {
        let id = if restore_id { data.id } else { ids.node()? };
        id_map.register_node(data.id, id);

        let inputs = data
            .inputs
            .iter()
            .map(|s| Socket::deserialize(s, id, SocketDirection::Input, ids, id_map, restore_id))
            .collect::<Result<_, _>>()?;
        let outputs = data
            .outputs
            .iter()
            .map(|s| Socket::deserialize(s, id, SocketDirection::Output, ids, id_map, restore_id))
            .collect::<Result<_, _>>()?;

        Ok(Node {
            id,
            title: data.title.clone(),
            position: Point::new(data.pos_x, data.pos_y),
            inputs,
            outputs,
            content: data.content.clone(),
        })
    }
}

impl Edge {
    /// Extract the edge's persistent state. `None` for a provisional edge.
    pub fn serialize(&self) -> Option<EdgeData> {
        Some(EdgeData {
            id: self.id,
            edge_type: self.edge_type,
            socket_start: self.start(),
            socket_end: self.end()?,
        })
    }

    /// Rebuild an edge, resolving its sockets through `id_map`
    pub fn deserialize(
        data: &EdgeData,
        ids: &mut IdGenerator,
        id_map: &mut IdMap,
        restore_id: bool,
    ) -> Result<Self, DeserializeError> {
        let resolve = |socket: SocketId| {
            id_map.socket(socket).ok_or(DeserializeError::UnresolvedSocket {
                edge: data.id,
                socket,
            })
        };
        let start = resolve(data.socket_start)?;
        let end = resolve(data.socket_end)?;

        let id = if restore_id { data.id } else { ids.edge()? };
        id_map.register_edge(data.id, id);
        Ok(Edge::new(id, start, end, data.edge_type))
    }
}

impl Scene {
    /// Extract the whole scene
    pub fn serialize(&self) -> SceneData {
        SceneData {
            id: self.id(),
            scene_width: self.width,
            scene_height: self.height,
            nodes: self.nodes().map(Node::serialize).collect(),
            edges: self.edges().filter_map(Edge::serialize).collect(),
        }
    }

    /// Replace the scene's contents with `data`.
    ///
    /// The payload is validated first; on error the scene is left exactly as
    /// it was. The modified flag is not touched; callers set it once the
    /// rebuild is done.
    pub fn deserialize(
        &mut self,
        data: &SceneData,
        id_map: &mut IdMap,
        restore_id: bool,
    ) -> Result<(), DeserializeError> {
        if !id_map.is_empty() {
            return Err(DeserializeError::IdMapNotFresh);
        }
        let reserved = restore_id.then_some(data.id.0);
        validate_subgraph(&data.nodes, &data.edges, reserved)?;
        if !restore_id && !self.ids_mut().has_room(entity_count(&data.nodes, &data.edges)) {
            return Err(IdExhausted.into());
        }

        self.clear_entities();
        if restore_id {
            self.set_id(data.id);
        }
        self.width = data.scene_width;
        self.height = data.scene_height;

        for node_data in &data.nodes {
            let node = Node::deserialize(node_data, self.ids_mut(), id_map, restore_id)?;
            self.insert_node(node);
        }
        for edge_data in &data.edges {
            let edge = Edge::deserialize(edge_data, self.ids_mut(), id_map, restore_id)?;
            self.insert_edge(edge)?;
        }
        Ok(())
    }
}

/// Number of IDs a payload needs when pasted with fresh IDs
pub(crate) fn entity_count(nodes: &[NodeData], edges: &[EdgeData]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + n.inputs.len() + n.outputs.len())
        .sum::<usize>()
        + edges.len()
}

/// Check that a node/edge payload is self-consistent.
///
/// IDs must be unique (including `reserved`, if given) and no larger than
/// [`MAX_PAYLOAD_ID`], every edge endpoint
/// must be a socket in the payload, and the payload itself must satisfy the
/// graph invariants: no self-loops, no repeated `(start, end)` pair, and at
/// most one edge per single-edge socket.
pub fn validate_subgraph(
    nodes: &[NodeData],
    edges: &[EdgeData],
    reserved: Option<u64>,
) -> Result<(), DeserializeError> {
    let mut seen = HashSet::new();
    let mut claim = |raw: u64| {
        if raw > MAX_PAYLOAD_ID {
            Err(DeserializeError::IdOutOfRange(raw))
        } else if seen.insert(raw) {
            Ok(())
        } else {
            Err(DeserializeError::DuplicateId(raw))
        }
    };

    if let Some(raw) = reserved {
        claim(raw)?;
    }

    // socket -> (multi_edges, attached edge count)
    let mut sockets: HashMap<SocketId, (bool, usize)> = HashMap::new();
    for node in nodes {
        claim(node.id.0)?;
        for socket in node.inputs.iter().chain(node.outputs.iter()) {
            claim(socket.id.0)?;
            sockets.insert(socket.id, (socket.multi_edges, 0));
        }
    }

    let mut pairs = HashSet::new();
    for edge in edges {
        claim(edge.id.0)?;
        for socket in [edge.socket_start, edge.socket_end] {
            if !sockets.contains_key(&socket) {
                return Err(DeserializeError::UnresolvedSocket { edge: edge.id, socket });
            }
        }
        if edge.socket_start == edge.socket_end {
            return Err(DeserializeError::SelfLoop(edge.id));
        }
        if !pairs.insert((edge.socket_start, edge.socket_end)) {
            return Err(DeserializeError::DuplicateEdge(edge.id));
        }
        for socket in [edge.socket_start, edge.socket_end] {
            if let Some((multi_edges, count)) = sockets.get_mut(&socket) {
                *count += 1;
                if !*multi_edges && *count > 1 {
                    return Err(DeserializeError::SocketOverloaded(socket));
                }
            }
        }
    }
    Ok(())
}

/// Error when rebuilding a scene or subgraph from serialized data
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// Malformed JSON or missing field
    #[error("Invalid graph data: {0}")]
    Json(#[from] serde_json::Error),

    /// The ID map passed in was already used
    #[error("ID map must be fresh for every deserialize call")]
    IdMapNotFresh,

    /// Two entities share an ID
    #[error("Duplicate ID in payload: {0}")]
    DuplicateId(u64),

    /// ID too large to adopt
    #[error("ID out of range in payload: {0}")]
    IdOutOfRange(u64),

    /// Edge refers to a socket not present in the payload
    #[error("{edge} refers to unknown {socket}")]
    UnresolvedSocket {
        /// Offending edge
        edge: EdgeId,
        /// Missing socket
        socket: SocketId,
    },

    /// Edge starts and ends on the same socket
    #[error("{0} is a self-loop")]
    SelfLoop(EdgeId),

    /// Edge repeats an earlier `(start, end)` pair
    #[error("{0} duplicates an earlier edge")]
    DuplicateEdge(EdgeId),

    /// Single-edge socket has several edges
    #[error("{0} holds more than one edge but is single-edge")]
    SocketOverloaded(SocketId),

    /// Scene rejected a rebuilt entity
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No IDs left for the pasted entities
    #[error(transparent)]
    Ids(#[from] IdExhausted),
}
