// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session: one scene with its history, selection and gesture state.
//!
//! Every user-level mutation made through [`NodeEditor`] ends with exactly one
//! history checkpoint. Direct access to the scene through
//! [`NodeEditor::scene_mut`] bypasses history and is meant for callers that
//! batch several primitive changes and checkpoint once themselves.

use crate::clipboard::{paste_offset, serialize_selected, PastedItems};
use crate::config::EditorConfig;
use crate::geometry::{GeometryProvider, NodeGeometry, Point};
use crate::history::{HistoryError, SceneHistory};
use crate::ident::{EdgeId, NodeId};
use crate::interaction::InteractionMode;
use crate::node::NodeTemplate;
use crate::scene::{GraphError, Scene};
use crate::selection::Selection;
use crate::serialization::{ClipboardData, DeserializeError, IdMap, SceneData};
use crate::socket::SocketType;
use std::path::{Path, PathBuf};

/// A single editing session
pub struct NodeEditor {
    pub(crate) scene: Scene,
    pub(crate) history: SceneHistory,
    pub(crate) selection: Selection,
    pub(crate) mode: InteractionMode,
    pub(crate) pointer: Option<Point>,
    pub(crate) geometry: Box<dyn GeometryProvider>,
    pub(crate) config: EditorConfig,
}

impl NodeEditor {
    /// Create an editor with an empty scene and empty history
    pub fn new(config: EditorConfig) -> Self {
        Self {
            scene: Scene::with_size(config.scene_width, config.scene_height),
            history: SceneHistory::with_max_depth(config.history_capacity),
            selection: Selection::new(),
            mode: InteractionMode::Idle,
            pointer: None,
            geometry: Box::new(NodeGeometry::default()),
            config,
        }
    }

    /// Replace the geometry provider used for cut hit-testing
    pub fn with_geometry(mut self, geometry: impl GeometryProvider + 'static) -> Self {
        self.geometry = Box::new(geometry);
        self
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, for changes that bypass history
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Undo/redo history
    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Mutable selection. Call [`NodeEditor::selection_changed`] when a gesture completes.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Geometry provider
    pub fn geometry(&self) -> &dyn GeometryProvider {
        self.geometry.as_ref()
    }

    /// Last known pointer position in scene coordinates
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Whether the scene has unsaved changes
    pub fn is_modified(&self) -> bool {
        self.scene.is_modified()
    }

    /// Record a checkpoint of the current scene
    pub fn store_history(&mut self, label: &str, set_modified: bool) -> Result<(), EditorError> {
        self.history.store(label, &mut self.scene, set_modified)?;
        Ok(())
    }

    /// Empty the scene and forget all history
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
        self.selection.clear();
        self.scene.clear();
        self.history.clear();
    }

    // ---- graph mutations ----

    /// Create a node with default socket specs at `position`
    pub fn add_node(
        &mut self,
        title: &str,
        inputs: &[SocketType],
        outputs: &[SocketType],
        position: Point,
    ) -> Result<NodeId, EditorError> {
        let node_id = self.scene.add_node(title, inputs, outputs)?;
        self.scene.set_node_position(node_id, position)?;
        self.store_history("node created", true)?;
        Ok(node_id)
    }

    /// Create a node from a template at `position`
    pub fn add_node_from_template(
        &mut self,
        template: &NodeTemplate,
        position: Point,
    ) -> Result<NodeId, EditorError> {
        let node_id = self.scene.add_node_from_template(template)?;
        self.scene.set_node_position(node_id, position)?;
        self.store_history("node created", true)?;
        Ok(node_id)
    }

    /// Move a node
    pub fn move_node(&mut self, node_id: NodeId, position: Point) -> Result<(), EditorError> {
        self.scene.set_node_position(node_id, position)?;
        self.store_history("node moved", true)
    }

    /// Remove one node together with its edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<(), EditorError> {
        if self.scene.remove_node(node_id).is_none() {
            return Err(GraphError::NodeNotFound(node_id).into());
        }
        self.selection.retain_existing(&self.scene);
        self.store_history("node removed", true)
    }

    /// Remove one edge
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Result<(), EditorError> {
        if self.scene.remove_edge(edge_id).is_none() {
            return Err(GraphError::EdgeNotFound(edge_id).into());
        }
        self.selection.retain_existing(&self.scene);
        self.store_history("edge removed", true)
    }

    /// Remove selected edges, then selected nodes
    pub fn delete_selection(&mut self) -> Result<(), EditorError> {
        self.remove_selected_items();
        self.store_history("delete selected", true)
    }

    fn remove_selected_items(&mut self) {
        let selection = std::mem::take(&mut self.selection);
        for edge_id in selection.edges {
            // Already gone if a selected node took it with it
            if self.scene.contains_edge(edge_id) {
                self.scene.remove_edge(edge_id);
            }
        }
        for node_id in selection.nodes {
            self.scene.remove_node(node_id);
        }
    }

    // ---- clipboard ----

    /// Serialize the selection
    pub fn copy(&self) -> ClipboardData {
        serialize_selected(&self.scene, &self.selection)
    }

    /// Serialize the selection, then delete it
    pub fn cut(&mut self) -> Result<ClipboardData, EditorError> {
        let data = serialize_selected(&self.scene, &self.selection);
        self.remove_selected_items();
        self.store_history("cut", true)?;
        tracing::info!("Cut {} nodes, {} edges", data.nodes.len(), data.edges.len());
        Ok(data)
    }

    /// Paste a payload centred on the last pointer position.
    ///
    /// An empty payload is a no-op and records no checkpoint.
    pub fn paste(&mut self, data: &ClipboardData) -> Result<PastedItems, EditorError> {
        if data.is_empty() {
            return Ok(PastedItems::default());
        }
        let offset = paste_offset(data, self.pointer);
        let pasted = self.scene.paste_subgraph(data, &mut IdMap::new(), offset)?;

        if self.config.select_pasted {
            self.selection.clear();
            self.selection.nodes.extend(pasted.nodes.iter().copied());
            self.selection.edges.extend(pasted.edges.iter().copied());
        }
        self.store_history("paste", true)?;
        tracing::info!("Pasted {} nodes, {} edges", pasted.nodes.len(), pasted.edges.len());
        Ok(pasted)
    }

    // ---- history ----

    /// Step back one checkpoint. Returns `false` when already at the oldest.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        match self.history.undo(&mut self.scene) {
            Ok(label) => tracing::debug!("Undo '{}'", label),
            Err(HistoryError::NothingToUndo) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        self.after_restore();
        Ok(true)
    }

    /// Step forward one checkpoint. Returns `false` when already at the newest.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        match self.history.redo(&mut self.scene) {
            Ok(label) => tracing::debug!("Redo '{}'", label),
            Err(HistoryError::NothingToRedo) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        self.after_restore();
        Ok(true)
    }

    fn after_restore(&mut self) {
        self.mode = InteractionMode::Idle;
        self.selection.retain_existing(&self.scene);
    }

    // ---- files ----

    /// Write the scene as JSON and clear the modified flag
    pub fn save(&mut self, path: &Path) -> Result<(), EditorError> {
        let json = self.scene.serialize().to_json()?;
        std::fs::write(path, json).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.scene.set_modified(false);
        tracing::info!("Saved scene to {:?}", path);
        Ok(())
    }

    /// Replace the scene with a JSON file.
    ///
    /// On failure the scene and history are left as they were.
    pub fn load(&mut self, path: &Path) -> Result<(), EditorError> {
        let content = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = SceneData::from_json(&content)?;
        self.load_scene_data(&data)?;
        tracing::info!("Loaded scene from {:?}", path);
        Ok(())
    }

    /// Replace the scene with already parsed data, keeping its IDs
    pub fn load_scene_data(&mut self, data: &SceneData) -> Result<(), EditorError> {
        self.scene.deserialize(data, &mut IdMap::new(), true)?;
        self.scene.set_modified(false);
        self.mode = InteractionMode::Idle;
        self.selection.clear();
        self.store_history("load", false)
    }
}

impl Default for NodeEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Editor errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// File could not be read or written
    #[error("File error at {path:?}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Scene could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was rejected
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    /// History operation failed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Scene mutation failed
    #[error(transparent)]
    Graph(#[from] GraphError),
}
