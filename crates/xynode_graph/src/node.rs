// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph.

use crate::geometry::Point;
use crate::ident::{IdExhausted, IdGenerator, NodeId, SocketId};
use crate::socket::{Socket, SocketDirection, SocketSide, SocketSpec, SocketType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node template category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Value sources
    Input,
    /// Result sinks
    Output,
    /// Math operations
    Math,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// Reusable description of a kind of node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Unique template identifier
    pub id: String,
    /// Title given to created nodes
    pub title: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Input sockets, in order
    pub inputs: Vec<SocketSpec>,
    /// Output sockets, in order
    pub outputs: Vec<SocketSpec>,
}

impl NodeTemplate {
    /// Template with single-edge inputs and multi-edge outputs of the given type tags
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: NodeCategory,
        inputs: &[SocketType],
        outputs: &[SocketType],
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category,
            description: String::new(),
            inputs: inputs.iter().copied().map(SocketSpec::input).collect(),
            outputs: outputs.iter().copied().map(SocketSpec::output).collect(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A node instance in the scene
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Display title
    pub title: String,
    pub(crate) position: Point,
    pub(crate) inputs: Vec<Socket>,
    pub(crate) outputs: Vec<Socket>,
    /// Free-form content attached by the node's widget
    pub content: IndexMap<String, String>,
}

impl Node {
    /// Build a node with freshly minted IDs for itself and every socket.
    ///
    /// Inputs are anchored bottom-left and outputs top-right, indexed in list order.
    pub fn build(
        ids: &mut IdGenerator,
        title: impl Into<String>,
        inputs: &[SocketSpec],
        outputs: &[SocketSpec],
    ) -> Result<Self, IdExhausted> {
        let id = ids.node()?;
        let inputs = Self::build_sockets(ids, id, SocketDirection::Input, inputs)?;
        let outputs = Self::build_sockets(ids, id, SocketDirection::Output, outputs)?;
        Ok(Self {
            id,
            title: title.into(),
            position: Point::ZERO,
            inputs,
            outputs,
            content: IndexMap::new(),
        })
    }

    fn build_sockets(
        ids: &mut IdGenerator,
        node: NodeId,
        direction: SocketDirection,
        specs: &[SocketSpec],
    ) -> Result<Vec<Socket>, IdExhausted> {
        let side = SocketSide::default_for(direction);
        specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Ok(Socket::new(ids.socket()?, node, index, direction, side, *spec)))
            .collect()
    }

    /// Unique instance ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Set the position
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Position on the canvas
    pub fn position(&self) -> Point {
        self.position
    }

    /// Input sockets
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    /// Output sockets
    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    /// Get an input socket by index
    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    /// Get an output socket by index
    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.sockets().find(|s| s.id == socket_id)
    }

    pub(crate) fn socket_mut(&mut self, socket_id: SocketId) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id == socket_id)
    }

    /// All sockets, inputs first
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// IDs of all sockets, inputs first
    pub fn socket_ids(&self) -> impl Iterator<Item = SocketId> + '_ {
        self.sockets().map(|s| s.id)
    }
}

/// Registry of available node templates
pub struct NodeRegistry {
    templates: IndexMap<String, NodeTemplate>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Register a template, replacing any with the same ID
    pub fn register(&mut self, template: NodeTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> Option<&NodeTemplate> {
        self.templates.get(id)
    }

    /// Get all registered templates
    pub fn templates(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values()
    }

    /// Get templates by category
    pub fn templates_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values().filter(move |t| t.category == category)
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
