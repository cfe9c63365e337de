// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subgraph extraction and ID-remapped paste.

use crate::edge::Edge;
use crate::geometry::{bounding_box_center, Point};
use crate::ident::{EdgeId, IdExhausted, NodeId};
use crate::node::Node;
use crate::scene::Scene;
use crate::selection::Selection;
use crate::serialization::{entity_count, validate_subgraph, ClipboardData, DeserializeError, IdMap};
use std::collections::HashSet;

/// Live IDs created by a paste
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PastedItems {
    /// New nodes, in payload order
    pub nodes: Vec<NodeId>,
    /// New edges, in payload order
    pub edges: Vec<EdgeId>,
}

/// Serialize the selected nodes plus every selected edge running between them.
///
/// Selected edges with an endpoint outside the selected nodes are left out
/// of the payload; they stay untouched in the scene.
pub fn serialize_selected(scene: &Scene, selection: &Selection) -> ClipboardData {
    let mut nodes = Vec::with_capacity(selection.nodes.len());
    let mut socket_ids = HashSet::new();
    for node_id in &selection.nodes {
        let Some(node) = scene.node(*node_id) else {
            tracing::warn!("Clipboard: selected {} is not in the scene", node_id);
            continue;
        };
        socket_ids.extend(node.socket_ids());
        nodes.push(node.serialize());
    }

    let edges = selection
        .edges
        .iter()
        .filter_map(|edge_id| scene.edge(*edge_id))
        .filter(|edge| edge.sockets().all(|socket| socket_ids.contains(&socket)))
        .filter_map(Edge::serialize)
        .collect::<Vec<_>>();

    tracing::debug!("Clipboard: serialized {} nodes, {} edges", nodes.len(), edges.len());
    ClipboardData { nodes, edges }
}

/// Translation that centres the payload's bounding box on `pointer`.
///
/// Zero when there is no pointer position or no node.
pub fn paste_offset(data: &ClipboardData, pointer: Option<Point>) -> Point {
    let Some(pointer) = pointer else {
        return Point::ZERO;
    };
    bounding_box_center(data.nodes.iter().map(|n| Point::new(n.pos_x, n.pos_y)))
        .map_or(Point::ZERO, |center| pointer - center)
}

impl Scene {
    /// Add a clipboard payload to the scene with fresh IDs, moved by `offset`.
    ///
    /// Nothing is added if the payload fails validation.
    pub fn paste_subgraph(
        &mut self,
        data: &ClipboardData,
        id_map: &mut IdMap,
        offset: Point,
    ) -> Result<PastedItems, DeserializeError> {
        if !id_map.is_empty() {
            return Err(DeserializeError::IdMapNotFresh);
        }
        validate_subgraph(&data.nodes, &data.edges, None)?;
        if !self.ids_mut().has_room(entity_count(&data.nodes, &data.edges)) {
            return Err(IdExhausted.into());
        }

        let mut pasted = PastedItems::default();
        for node_data in &data.nodes {
            let mut node = Node::deserialize(node_data, self.ids_mut(), id_map, false)?;
            node.position = node.position + offset;
            pasted.nodes.push(self.insert_node(node));
        }
        for edge_data in &data.edges {
            let edge = Edge::deserialize(edge_data, self.ids_mut(), id_map, false)?;
            pasted.edges.push(self.insert_edge(edge)?);
        }
        Ok(pasted)
    }
}
