// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selected nodes and edges.
//!
//! Selection belongs to the presentation side of the editor and is never part
//! of a scene snapshot. It is kept in insertion order so that copy and delete
//! process entities in the order the user picked them.

use crate::ident::{EdgeId, NodeId};
use crate::scene::Scene;
use indexmap::IndexSet;

/// Current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected nodes
    pub nodes: IndexSet<NodeId>,
    /// Selected edges
    pub edges: IndexSet<EdgeId>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Clear selection
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Select a node (optionally add to selection)
    pub fn select_node(&mut self, node_id: NodeId, add_to_selection: bool) {
        if !add_to_selection {
            self.clear();
        }
        self.nodes.insert(node_id);
    }

    /// Select an edge (optionally add to selection)
    pub fn select_edge(&mut self, edge_id: EdgeId, add_to_selection: bool) {
        if !add_to_selection {
            self.clear();
        }
        self.edges.insert(edge_id);
    }

    /// Toggle node selection
    pub fn toggle_node(&mut self, node_id: NodeId) {
        if !self.nodes.shift_remove(&node_id) {
            self.nodes.insert(node_id);
        }
    }

    /// Toggle edge selection
    pub fn toggle_edge(&mut self, edge_id: EdgeId) {
        if !self.edges.shift_remove(&edge_id) {
            self.edges.insert(edge_id);
        }
    }

    /// Select every node and edge in the scene
    pub fn select_all(&mut self, scene: &Scene) {
        self.nodes = scene.node_ids().collect();
        self.edges = scene.edge_ids().collect();
    }

    /// Drop entries that no longer exist in the scene
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.nodes.retain(|id| scene.contains_node(*id));
        self.edges.retain(|id| scene.contains_edge(*id));
    }

    /// Whether the node is selected
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Whether the edge is selected
    pub fn contains_edge(&self, edge_id: EdgeId) -> bool {
        self.edges.contains(&edge_id)
    }
}
