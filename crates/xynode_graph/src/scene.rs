// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene: the owning container of nodes and edges.

use crate::edge::{Edge, EdgeType};
use crate::geometry::{self, GeometryProvider, Point};
use crate::ident::{EdgeId, IdExhausted, IdGenerator, NodeId, SceneId, SocketId};
use crate::node::{Node, NodeTemplate};
use crate::observer::{ListenerHandle, Listeners};
use crate::socket::{Socket, SocketSpec, SocketType};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Default canvas extent in both directions
pub const DEFAULT_SCENE_SIZE: f64 = 64000.0;

/// A node graph scene.
///
/// Nodes and edges are kept in insertion order so serialization is
/// deterministic. Sockets live inside their node; `socket_owners` maps a
/// socket ID to that node for constant-time lookup.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    socket_owners: HashMap<SocketId, NodeId>,
    ids: IdGenerator,
    modified: bool,
    modified_listeners: Listeners<dyn FnMut(bool)>,
    edge_path_listeners: Listeners<dyn FnMut(EdgeId)>,
}

impl Scene {
    /// Create a new empty scene of the default size
    pub fn new() -> Self {
        Self::with_size(DEFAULT_SCENE_SIZE, DEFAULT_SCENE_SIZE)
    }

    /// Create a new empty scene
    pub fn with_size(width: f64, height: f64) -> Self {
        let mut ids = IdGenerator::new();
        let id = SceneId(ids.peek());
        ids.reserve(id.0);
        Self {
            id,
            width,
            height,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            socket_owners: HashMap::new(),
            ids,
            modified: false,
            modified_listeners: Listeners::new(),
            edge_path_listeners: Listeners::new(),
        }
    }

    /// Scene ID
    pub fn id(&self) -> SceneId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: SceneId) {
        self.ids.reserve(id.0);
        self.id = id;
    }

    pub(crate) fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Mint an edge ID without storing an edge (used for drag edges)
    pub fn mint_edge_id(&mut self) -> Result<EdgeId, GraphError> {
        Ok(self.ids.edge()?)
    }

    // ---- nodes ----

    /// Create a node with single-edge inputs and multi-edge outputs of the given type tags
    pub fn add_node(
        &mut self,
        title: impl Into<String>,
        inputs: &[SocketType],
        outputs: &[SocketType],
    ) -> Result<NodeId, GraphError> {
        let inputs: Vec<_> = inputs.iter().copied().map(SocketSpec::input).collect();
        let outputs: Vec<_> = outputs.iter().copied().map(SocketSpec::output).collect();
        self.add_node_with_sockets(title, &inputs, &outputs)
    }

    /// Create a node with explicit socket specs
    pub fn add_node_with_sockets(
        &mut self,
        title: impl Into<String>,
        inputs: &[SocketSpec],
        outputs: &[SocketSpec],
    ) -> Result<NodeId, GraphError> {
        let node = Node::build(&mut self.ids, title, inputs, outputs)?;
        Ok(self.insert_node(node))
    }

    /// Create a node from a template
    pub fn add_node_from_template(&mut self, template: &NodeTemplate) -> Result<NodeId, GraphError> {
        self.add_node_with_sockets(template.title.clone(), &template.inputs, &template.outputs)
    }

    /// Store a fully built node. The caller guarantees its IDs are unused.
    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.ids.reserve(id.0);
        for socket_id in node.socket_ids() {
            self.ids.reserve(socket_id.0);
            self.socket_owners.insert(socket_id, id);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node after severing every edge on its sockets.
    ///
    /// Removing a node that is not in the scene logs a warning and returns `None`.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let Some(node) = self.nodes.get(&node_id) else {
            tracing::warn!("Scene::remove_node: {} is not in the list", node_id);
            return None;
        };
        let socket_ids: Vec<_> = node.socket_ids().collect();

        for socket_id in &socket_ids {
            self.remove_all_edges(*socket_id);
        }
        for socket_id in &socket_ids {
            self.socket_owners.remove(socket_id);
        }
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID (title and content only; sockets are managed by the scene)
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the node is in the scene
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Move a node and notify edge path listeners for every attached edge
    pub fn set_node_position(&mut self, node_id: NodeId, position: Point) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;

        for edge_id in self.node_edges(node_id) {
            self.notify_edge_path(edge_id);
        }
        Ok(())
    }

    // ---- sockets ----

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        let owner = self.socket_owners.get(&socket_id)?;
        self.nodes.get(owner)?.socket(socket_id)
    }

    fn socket_mut(&mut self, socket_id: SocketId) -> Option<&mut Socket> {
        let owner = self.socket_owners.get(&socket_id)?;
        self.nodes.get_mut(owner)?.socket_mut(socket_id)
    }

    /// Canvas position of a socket
    pub fn socket_position(&self, socket_id: SocketId, geometry: &dyn GeometryProvider) -> Option<Point> {
        let socket = self.socket(socket_id)?;
        let node = self.nodes.get(&socket.node())?;
        Some(node.position + geometry.socket_anchor(node, socket.index, socket.side))
    }

    /// Sever and remove every edge attached to a socket. Returns the removed edges.
    pub fn remove_all_edges(&mut self, socket_id: SocketId) -> Vec<EdgeId> {
        let mut removed = Vec::new();
        while let Some(edge_id) = self.socket(socket_id).and_then(|s| s.edges().first().copied()) {
            if self.remove_edge(edge_id).is_some() {
                removed.push(edge_id);
            } else if let Some(socket) = self.socket_mut(socket_id) {
                // Dangling back-reference; drop it so the loop terminates
                socket.remove_edge(edge_id);
            }
        }
        removed
    }

    // ---- edges ----

    /// Connect two sockets with a new edge.
    ///
    /// Fails if the edge would be a self-loop, duplicate an existing
    /// `(start, end)` pair, or overload a single-edge socket.
    pub fn add_edge(
        &mut self,
        start: SocketId,
        end: SocketId,
        edge_type: EdgeType,
    ) -> Result<EdgeId, GraphError> {
        self.check_connectable(start, end)?;
        let id = self.ids.edge()?;
        self.attach_edge(Edge::new(id, start, end, edge_type));
        Ok(id)
    }

    /// Store an edge that already carries its ID
    pub(crate) fn insert_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        let end = edge.end().ok_or(GraphError::ProvisionalEdge(edge.id))?;
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId(edge.id.0));
        }
        self.check_connectable(edge.start(), end)?;
        self.ids.reserve(edge.id.0);
        let id = edge.id;
        self.attach_edge(edge);
        Ok(id)
    }

    fn check_connectable(&self, start: SocketId, end: SocketId) -> Result<(), GraphError> {
        if start == end {
            return Err(GraphError::SelfLoop(start));
        }
        let start_socket = self.socket(start).ok_or(GraphError::SocketNotFound(start))?;
        let end_socket = self.socket(end).ok_or(GraphError::SocketNotFound(end))?;

        if self.find_edge(start, end).is_some() {
            return Err(GraphError::DuplicateEdge { start, end });
        }
        if !start_socket.multi_edges && start_socket.edge_count() > 0 {
            return Err(GraphError::SocketOccupied(start));
        }
        if !end_socket.multi_edges && end_socket.edge_count() > 0 {
            return Err(GraphError::SocketOccupied(end));
        }
        Ok(())
    }

    fn attach_edge(&mut self, edge: Edge) {
        let id = edge.id;
        for socket_id in edge.sockets() {
            if let Some(socket) = self.socket_mut(socket_id) {
                socket.add_edge(id);
            }
        }
        self.edges.insert(id, edge);
        self.notify_edge_path(id);
    }

    /// Detach an edge from both sockets and drop it from the scene.
    ///
    /// A second call for the same edge logs a warning and returns `None`.
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let Some(edge) = self.edges.shift_remove(&edge_id) else {
            tracing::warn!("Scene::remove_edge: {} is not in the list", edge_id);
            return None;
        };
        for socket_id in edge.sockets() {
            if let Some(socket) = self.socket_mut(socket_id) {
                socket.remove_edge(edge_id);
            }
        }
        Some(edge)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get all edge IDs in insertion order
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the edge is in the scene
    pub fn contains_edge(&self, edge_id: EdgeId) -> bool {
        self.edges.contains_key(&edge_id)
    }

    /// The edge running exactly from `start` to `end`, if any
    pub fn find_edge(&self, start: SocketId, end: SocketId) -> Option<EdgeId> {
        self.socket(start)?.edges().iter().copied().find(|edge_id| {
            self.edges
                .get(edge_id)
                .is_some_and(|edge| edge.connects(start, end))
        })
    }

    /// Edges attached to any socket of a node, without repeats
    pub fn node_edges(&self, node_id: NodeId) -> Vec<EdgeId> {
        let mut result = Vec::new();
        if let Some(node) = self.nodes.get(&node_id) {
            for edge_id in node.sockets().flat_map(|s| s.edges().iter().copied()) {
                if !result.contains(&edge_id) {
                    result.push(edge_id);
                }
            }
        }
        result
    }

    /// Rendered path of a committed edge as a polyline
    pub fn edge_path(
        &self,
        edge_id: EdgeId,
        geometry: &dyn GeometryProvider,
        segments: usize,
    ) -> Option<Vec<Point>> {
        let edge = self.edges.get(&edge_id)?;
        let start_socket = self.socket(edge.start())?;
        let source = self.socket_position(edge.start(), geometry)?;
        let destination = self.socket_position(edge.end()?, geometry)?;
        Some(geometry::edge_path(
            edge.edge_type,
            source,
            destination,
            start_socket.side,
            segments,
        ))
    }

    /// Edges whose rendered path touches the segment `a`-`b`
    pub fn edges_crossing(
        &self,
        a: Point,
        b: Point,
        geometry: &dyn GeometryProvider,
        segments: usize,
    ) -> Vec<EdgeId> {
        self.edge_ids()
            .filter(|edge_id| {
                self.edge_path(*edge_id, geometry, segments)
                    .is_some_and(|path| geometry::path_intersects_segment(&path, a, b))
            })
            .collect()
    }

    // ---- lifecycle ----

    /// Remove every node (and with them every edge) and reset the modified flag
    pub fn clear(&mut self) {
        self.clear_entities();
        self.set_modified(false);
    }

    /// Drop every edge and node without touching the modified flag.
    ///
    /// Sockets live inside their nodes, so dropping both maps at once leaves
    /// no back-reference behind.
    pub(crate) fn clear_entities(&mut self) {
        self.edges.clear();
        self.nodes.clear();
        self.socket_owners.clear();
    }

    // ---- change tracking ----

    /// Whether the scene has unsaved changes
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set the modified flag, notifying listeners if the value changes
    pub fn set_modified(&mut self, modified: bool) {
        if self.modified == modified {
            return;
        }
        self.modified = modified;
        for callback in self.modified_listeners.iter_mut() {
            callback(modified);
        }
    }

    /// Subscribe to modified flag changes
    pub fn subscribe_modified(&mut self, callback: impl FnMut(bool) + 'static) -> ListenerHandle {
        self.modified_listeners.subscribe(Box::new(callback))
    }

    /// Unsubscribe a modified flag listener
    pub fn unsubscribe_modified(&mut self, handle: ListenerHandle) -> bool {
        self.modified_listeners.unsubscribe(handle)
    }

    /// Subscribe to "edge path must be recomputed" notifications
    pub fn subscribe_edge_paths(&mut self, callback: impl FnMut(EdgeId) + 'static) -> ListenerHandle {
        self.edge_path_listeners.subscribe(Box::new(callback))
    }

    /// Unsubscribe an edge path listener
    pub fn unsubscribe_edge_paths(&mut self, handle: ListenerHandle) -> bool {
        self.edge_path_listeners.unsubscribe(handle)
    }

    fn notify_edge_path(&mut self, edge_id: EdgeId) {
        for callback in self.edge_path_listeners.iter_mut() {
            callback(edge_id);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when mutating a scene
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0}")]
    SocketNotFound(SocketId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed on {0}")]
    SelfLoop(SocketId),

    /// Same ordered socket pair already connected
    #[error("Edge from {start} to {end} already exists")]
    DuplicateEdge {
        /// Start socket
        start: SocketId,
        /// End socket
        end: SocketId,
    },

    /// Single-edge socket already holds an edge
    #[error("Socket already connected: {0}")]
    SocketOccupied(SocketId),

    /// Edge without an end socket cannot be stored
    #[error("Edge has no end socket: {0}")]
    ProvisionalEdge(EdgeId),

    /// ID already in use
    #[error("ID already in use: {0}")]
    DuplicateId(u64),

    /// No IDs left to mint
    #[error(transparent)]
    Ids(#[from] IdExhausted),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NodeGeometry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_nodes(scene: &mut Scene) -> (SocketId, SocketId) {
        let a = scene.add_node("A", &[], &[1]).unwrap();
        let b = scene.add_node("B", &[1], &[]).unwrap();
        let out = scene.node(a).unwrap().outputs()[0].id;
        let inp = scene.node(b).unwrap().inputs()[0].id;
        (out, inp)
    }

    #[test]
    fn test_add_edge_links_both_sockets() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);

        let edge = scene.add_edge(out, inp, EdgeType::Bezier).unwrap();
        assert_eq!(scene.edge_count(), 1);
        assert!(scene.socket(out).unwrap().has_edge(edge));
        assert!(scene.socket(inp).unwrap().has_edge(edge));
        assert_eq!(scene.find_edge(out, inp), Some(edge));
        assert_eq!(scene.find_edge(inp, out), None);
    }

    #[test]
    fn test_add_edge_rejections() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);

        assert!(matches!(
            scene.add_edge(out, out, EdgeType::Direct),
            Err(GraphError::SelfLoop(_))
        ));
        scene.add_edge(out, inp, EdgeType::Direct).unwrap();
        assert!(matches!(
            scene.add_edge(out, inp, EdgeType::Direct),
            Err(GraphError::DuplicateEdge { .. })
        ));

        let c = scene.add_node("C", &[], &[1]).unwrap();
        let other_out = scene.node(c).unwrap().outputs()[0].id;
        assert!(matches!(
            scene.add_edge(other_out, inp, EdgeType::Direct),
            Err(GraphError::SocketOccupied(s)) if s == inp
        ));
        assert!(matches!(
            scene.add_edge(other_out, SocketId(9999), EdgeType::Direct),
            Err(GraphError::SocketNotFound(_))
        ));
        assert_eq!(scene.edge_count(), 1);
    }

    #[test]
    fn test_remove_edge_twice() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);
        let edge = scene.add_edge(out, inp, EdgeType::Bezier).unwrap();

        assert!(scene.remove_edge(edge).is_some());
        assert!(scene.remove_edge(edge).is_none());
        assert_eq!(scene.edge_count(), 0);
        assert_eq!(scene.socket(out).unwrap().edge_count(), 0);
        assert_eq!(scene.socket(inp).unwrap().edge_count(), 0);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);
        scene.add_edge(out, inp, EdgeType::Bezier).unwrap();
        let a = scene.socket(out).unwrap().node();

        assert!(scene.remove_node(a).is_some());
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.edge_count(), 0);
        assert_eq!(scene.socket(inp).unwrap().edge_count(), 0);
        assert!(scene.socket(out).is_none());

        // Not present any more: warning only
        assert!(scene.remove_node(a).is_none());
    }

    #[test]
    fn test_remove_all_edges() {
        let mut scene = Scene::new();
        let a = scene.add_node("A", &[], &[1]).unwrap();
        let out = scene.node(a).unwrap().outputs()[0].id;
        for _ in 0..3 {
            let b = scene.add_node("B", &[1], &[]).unwrap();
            let inp = scene.node(b).unwrap().inputs()[0].id;
            scene.add_edge(out, inp, EdgeType::Direct).unwrap();
        }

        let removed = scene.remove_all_edges(out);
        assert_eq!(removed.len(), 3);
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn test_clear_resets_modified() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);
        scene.add_edge(out, inp, EdgeType::Bezier).unwrap();
        scene.set_modified(true);

        scene.clear();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.edge_count(), 0);
        assert!(!scene.is_modified());
    }

    #[test]
    fn test_clear_large_chain() {
        let mut scene = Scene::new();
        let mut previous: Option<SocketId> = None;
        for i in 0..2000 {
            let node = scene.add_node(format!("N{i}"), &[0], &[0]).unwrap();
            let inp = scene.node(node).unwrap().inputs()[0].id;
            if let Some(out) = previous {
                scene.add_edge(out, inp, EdgeType::Direct).unwrap();
            }
            previous = Some(scene.node(node).unwrap().outputs()[0].id);
        }
        assert_eq!(scene.edge_count(), 1999);

        scene.clear();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.edge_count(), 0);
        assert!(previous.is_some_and(|out| scene.socket(out).is_none()));

        // Usable again afterwards
        let (out, inp) = two_nodes(&mut scene);
        scene.add_edge(out, inp, EdgeType::Direct).unwrap();
        assert_eq!(scene.edge_count(), 1);
    }

    #[test]
    fn test_node_mut_keeps_identity() {
        let mut scene = Scene::new();
        let (out, _) = two_nodes(&mut scene);
        let a = scene.socket(out).unwrap().node();

        let node = scene.node_mut(a).unwrap();
        node.title = "Renamed".into();
        node.content.insert("value".into(), "1".into());

        let node = scene.node(a).unwrap();
        assert_eq!(node.id(), a);
        assert_eq!(node.title, "Renamed");
        assert!(node.sockets().all(|s| s.node() == a));
        assert_eq!(scene.node_ids().collect::<Vec<_>>().len(), 2);
    }

    #[test]
    fn test_modified_listeners_fire_on_change_only() {
        let mut scene = Scene::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handle = scene.subscribe_modified(move |m| sink.borrow_mut().push(m));

        scene.set_modified(true);
        scene.set_modified(true);
        scene.set_modified(false);
        assert_eq!(*seen.borrow(), vec![true, false]);

        assert!(scene.unsubscribe_modified(handle));
        scene.set_modified(true);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_moving_node_requests_edge_repaint() {
        let mut scene = Scene::new();
        let (out, inp) = two_nodes(&mut scene);
        let edge = scene.add_edge(out, inp, EdgeType::Bezier).unwrap();
        let a = scene.socket(out).unwrap().node();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        scene.subscribe_edge_paths(move |e| sink.borrow_mut().push(e));

        scene.set_node_position(a, Point::new(10.0, 20.0)).unwrap();
        assert_eq!(*seen.borrow(), vec![edge]);
        assert_eq!(scene.node(a).unwrap().position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_socket_position_uses_geometry() {
        let mut scene = Scene::new();
        let (out, _) = two_nodes(&mut scene);
        let a = scene.socket(out).unwrap().node();
        scene.set_node_position(a, Point::new(100.0, 50.0)).unwrap();

        let geometry = NodeGeometry::default();
        let pos = scene.socket_position(out, &geometry).unwrap();
        // Right edge, first socket below the title bar
        assert_eq!(pos, Point::new(100.0 + 180.0, 50.0 + 24.0 + 4.0 + 10.0));
    }
}
