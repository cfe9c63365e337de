// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection and cut gestures.
//!
//! The presentation layer hit-tests once per pointer event and hands the
//! result in as a [`HitTarget`]. The editor is then in one of three modes:
//!
//! - `Idle`
//! - `DraggingEdge`: a provisional edge hangs off its start socket
//! - `CuttingEdges`: a polyline is being drawn across edges
//!
//! Validation failures while connecting are ordinary outcomes reported via
//! [`DragOutcome`], never errors.

use crate::edge::{Edge, EdgeType};
use crate::editor::{EditorError, NodeEditor};
use crate::geometry::Point;
use crate::ident::{EdgeId, NodeId, SocketId};

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A node body
    Node(NodeId),
    /// An edge
    Edge(EdgeId),
    /// A socket
    Socket(SocketId),
    /// Empty canvas
    Empty,
}

/// Keyboard modifiers held during a press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift: extend the selection
    pub shift: bool,
    /// Ctrl: start a cut on empty canvas
    pub ctrl: bool,
}

/// In-progress connection
#[derive(Debug, Clone, PartialEq)]
pub struct DragEdge {
    /// Provisional edge; its end is always `None`
    pub edge: Edge,
    /// Loose end, follows the pointer
    pub pointer: Point,
}

/// In-progress cut polyline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutLine {
    /// Scene-space points in drawing order
    pub points: Vec<Point>,
}

/// Gesture state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    /// No gesture active
    #[default]
    Idle,
    /// Dragging a new edge
    DraggingEdge(DragEdge),
    /// Drawing a cut line
    CuttingEdges(CutLine),
}

/// Why a connection attempt was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Released on the start socket
    SelfLoop,
    /// The same `(start, end)` pair is already connected
    DuplicateEdge,
    /// One of the sockets is not in the scene
    UnknownSocket,
}

/// Result of finishing a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// A new edge was created
    Connected(EdgeId),
    /// Cancelled by validation; nothing changed
    Rejected(Rejection),
    /// Released away from any socket; nothing changed
    Dropped,
    /// No drag was in progress
    NotDragging,
}

impl NodeEditor {
    /// Current gesture state
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// The in-progress connection, if any
    pub fn drag_edge(&self) -> Option<&DragEdge> {
        match &self.mode {
            InteractionMode::DraggingEdge(drag) => Some(drag),
            _ => None,
        }
    }

    /// Start dragging a new edge out of `socket`.
    ///
    /// The socket itself is not touched until the drag completes. Returns
    /// `false` if a gesture is already active or the socket is unknown.
    pub fn begin_drag(&mut self, socket: SocketId) -> bool {
        if !matches!(self.mode, InteractionMode::Idle) {
            return false;
        }
        let Some(anchor) = self.scene.socket_position(socket, self.geometry.as_ref()) else {
            tracing::warn!("begin_drag: {} is not in the scene", socket);
            return false;
        };
        let edge_id = match self.scene.mint_edge_id() {
            Ok(edge_id) => edge_id,
            Err(e) => {
                tracing::warn!("begin_drag: {}", e);
                return false;
            }
        };
        let edge = Edge::provisional(edge_id, socket, self.config.default_edge_type);
        tracing::debug!("Start dragging edge from {}", socket);
        self.mode = InteractionMode::DraggingEdge(DragEdge {
            edge,
            pointer: self.pointer.unwrap_or(anchor),
        });
        true
    }

    /// Finish the drag over `candidate`, or over nothing
    pub fn complete_drag(&mut self, candidate: Option<SocketId>) -> Result<DragOutcome, EditorError> {
        let InteractionMode::DraggingEdge(drag) = std::mem::take(&mut self.mode) else {
            return Ok(DragOutcome::NotDragging);
        };
        let Some(candidate) = candidate else {
            tracing::debug!("Drag from {} dropped", drag.edge.start());
            return Ok(DragOutcome::Dropped);
        };
        self.apply_connection(drag.edge.start(), candidate, drag.edge.edge_type)
    }

    /// Abandon any gesture without touching the scene
    pub fn cancel_gesture(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Connect two sockets with the same policy as a completed drag
    pub fn connect(&mut self, start: SocketId, end: SocketId) -> Result<DragOutcome, EditorError> {
        self.apply_connection(start, end, self.config.default_edge_type)
    }

    fn apply_connection(
        &mut self,
        start: SocketId,
        candidate: SocketId,
        edge_type: EdgeType,
    ) -> Result<DragOutcome, EditorError> {
        if candidate == start {
            tracing::debug!("Connection rejected: self-loop on {}", start);
            return Ok(DragOutcome::Rejected(Rejection::SelfLoop));
        }
        let (Some(start_socket), Some(end_socket)) = (self.scene.socket(start), self.scene.socket(candidate)) else {
            return Ok(DragOutcome::Rejected(Rejection::UnknownSocket));
        };
        if self.scene.find_edge(start, candidate).is_some() {
            tracing::debug!("Connection rejected: {} -> {} already exists", start, candidate);
            return Ok(DragOutcome::Rejected(Rejection::DuplicateEdge));
        }

        let (start_multi, end_multi) = (start_socket.multi_edges, end_socket.multi_edges);
        if !start_multi {
            self.scene.remove_all_edges(start);
        }
        if !end_multi {
            self.scene.remove_all_edges(candidate);
        }

        let edge_id = self.scene.add_edge(start, candidate, edge_type)?;
        self.store_history("edge created", true)?;
        Ok(DragOutcome::Connected(edge_id))
    }

    /// Start drawing a cut line. Returns `false` if a gesture is already active.
    pub fn begin_cut(&mut self) -> bool {
        if !matches!(self.mode, InteractionMode::Idle) {
            return false;
        }
        tracing::debug!("Start cutting");
        self.mode = InteractionMode::CuttingEdges(CutLine::default());
        true
    }

    /// Append a point to the cut line
    pub fn add_cut_point(&mut self, point: Point) {
        if let InteractionMode::CuttingEdges(line) = &mut self.mode {
            line.points.push(point);
        }
    }

    /// Remove every edge crossed by the cut line.
    ///
    /// Records a single "edges cut" checkpoint however many edges were removed.
    /// Does nothing outside a cut.
    pub fn end_cut(&mut self) -> Result<Vec<EdgeId>, EditorError> {
        let InteractionMode::CuttingEdges(line) = std::mem::take(&mut self.mode) else {
            return Ok(Vec::new());
        };

        let mut removed = Vec::new();
        for pair in line.points.windows(2) {
            let crossing = self.scene.edges_crossing(
                pair[0],
                pair[1],
                self.geometry.as_ref(),
                self.config.cut_curve_segments,
            );
            for edge_id in crossing {
                if self.scene.remove_edge(edge_id).is_some() {
                    removed.push(edge_id);
                }
            }
        }

        self.selection.retain_existing(&self.scene);
        self.store_history("edges cut", true)?;
        tracing::debug!("Cut removed {} edges", removed.len());
        Ok(removed)
    }

    /// Record the end of a selection gesture
    pub fn selection_changed(&mut self) -> Result<(), EditorError> {
        self.store_history("selection changed", false)
    }

    // ---- pointer dispatch ----

    /// Pointer button pressed over `hit`
    pub fn press(&mut self, hit: HitTarget, modifiers: Modifiers) {
        if !matches!(self.mode, InteractionMode::Idle) {
            return;
        }
        match hit {
            HitTarget::Socket(socket) => {
                self.begin_drag(socket);
            }
            HitTarget::Empty if modifiers.ctrl => {
                self.begin_cut();
                if let Some(pointer) = self.pointer {
                    self.add_cut_point(pointer);
                }
            }
            HitTarget::Empty => {
                if !modifiers.shift {
                    self.selection.clear();
                }
            }
            HitTarget::Node(node) if modifiers.shift => self.selection.toggle_node(node),
            HitTarget::Node(node) => self.selection.select_node(node, false),
            HitTarget::Edge(edge) if modifiers.shift => self.selection.toggle_edge(edge),
            HitTarget::Edge(edge) => self.selection.select_edge(edge, false),
        }
    }

    /// Pointer moved to `point` in scene coordinates
    pub fn pointer_moved(&mut self, point: Point) {
        self.pointer = Some(point);
        match &mut self.mode {
            InteractionMode::DraggingEdge(drag) => drag.pointer = point,
            InteractionMode::CuttingEdges(line) => line.points.push(point),
            InteractionMode::Idle => {}
        }
    }

    /// Pointer button released over `hit`.
    ///
    /// Returns the drag outcome when a connection gesture ended here.
    pub fn release(&mut self, hit: HitTarget) -> Result<Option<DragOutcome>, EditorError> {
        match self.mode {
            InteractionMode::DraggingEdge(_) => {
                let candidate = match hit {
                    HitTarget::Socket(socket) => Some(socket),
                    _ => None,
                };
                self.complete_drag(candidate).map(Some)
            }
            InteractionMode::CuttingEdges(_) => {
                self.end_cut()?;
                Ok(None)
            }
            InteractionMode::Idle => Ok(None),
        }
    }
}
