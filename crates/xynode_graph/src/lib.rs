// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph editing engine for `XYNode`.
//!
//! This crate provides the headless core of a visual node editor:
//! - Scene model of nodes, typed sockets and edges
//! - Edge drag and line-cut gestures with connection validation
//! - Snapshot based undo/redo history
//! - Copy/cut/paste of subgraphs with ID remapping
//!
//! ## Architecture
//!
//! The [`Scene`] owns every node and edge in ID-keyed, insertion-ordered maps.
//! Sockets live inside their node and edges refer to sockets by ID, so there
//! are no reference cycles. A [`NodeEditor`] session binds a scene to its
//! history, selection and interaction state, and is the entry point for
//! presentation layers.

pub mod ident;
pub mod geometry;
pub mod socket;
pub mod node;
pub mod edge;
pub mod observer;
pub mod scene;
pub mod serialization;
pub mod selection;
pub mod history;
pub mod clipboard;
pub mod interaction;
pub mod config;
pub mod editor;
pub mod templates;

pub use ident::{EdgeId, IdExhausted, IdGenerator, NodeId, SceneId, SocketId, MAX_PAYLOAD_ID};
pub use geometry::{GeometryProvider, NodeGeometry, Point};
pub use socket::{socket_type_color, Socket, SocketDirection, SocketSide, SocketSpec, SocketType};
pub use node::{Node, NodeCategory, NodeRegistry, NodeTemplate};
pub use edge::{Edge, EdgeType};
pub use observer::ListenerHandle;
pub use scene::{GraphError, Scene};
pub use serialization::{
    ClipboardData, DeserializeError, EdgeData, IdMap, NodeData, SceneData, SocketData,
};
pub use selection::Selection;
pub use history::{Checkpoint, HistoryError, HistoryStats, SceneHistory, StateSnapshot};
pub use clipboard::{paste_offset, serialize_selected, PastedItems};
pub use interaction::{CutLine, DragEdge, DragOutcome, HitTarget, InteractionMode, Modifiers, Rejection};
pub use config::{ConfigError, EditorConfig};
pub use editor::{EditorError, NodeEditor};
pub use templates::create_calculator_registry;
