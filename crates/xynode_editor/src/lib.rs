// SPDX-License-Identifier: MIT OR Apache-2.0
//! `XYNode` editor documents.
//!
//! A [`Document`] wraps one [`xynode_graph::NodeEditor`] session with the
//! file-level concerns around it: the current filename, the window title,
//! the unsaved-changes guard and the bridge between the graph clipboard and
//! plain JSON text.

pub mod document;

pub use document::{ClipboardError, CloseDecision, Document, DocumentError};
