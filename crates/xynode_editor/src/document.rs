// SPDX-License-Identifier: MIT OR Apache-2.0
//! File-backed editor document.

use std::path::{Path, PathBuf};
use xynode_graph::{
    ClipboardData, EdgeType, EditorConfig, EditorError, NodeEditor, PastedItems, Point,
};

/// Title used before the document has a file
pub const UNTITLED: &str = "New Graph";

/// Answer to "the document has been modified, save your changes?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Save, then continue
    Save,
    /// Continue without saving
    Discard,
    /// Abort the action
    Cancel,
}

/// One graph and the file it belongs to
pub struct Document {
    editor: NodeEditor,
    filename: Option<PathBuf>,
}

impl Document {
    /// Create an empty, untitled document
    pub fn new(config: EditorConfig) -> Self {
        Self {
            editor: NodeEditor::new(config),
            filename: None,
        }
    }

    /// Create an untitled document holding the three-node sample graph
    pub fn with_sample_graph(config: EditorConfig) -> Result<Self, DocumentError> {
        let mut document = Self::new(config);
        let scene = document.editor.scene_mut();

        let specs: [(&[u32], &[u32], Point); 3] = [
            (&[0, 2, 3], &[4], Point::new(-350.0, -250.0)),
            (&[5, 2, 4], &[4], Point::new(-75.0, 0.0)),
            (&[1, 5, 3], &[5], Point::new(200.0, -150.0)),
        ];
        let mut nodes = Vec::with_capacity(specs.len());
        for (inputs, outputs, position) in specs {
            let node = scene
                .add_node("My new node", inputs, outputs)
                .map_err(EditorError::from)?;
            scene.set_node_position(node, position).map_err(EditorError::from)?;
            nodes.push(node);
        }

        for pair in nodes.windows(2) {
            let start = scene.node(pair[0]).and_then(|n| n.output(0)).map(|s| s.id);
            let end = scene.node(pair[1]).and_then(|n| n.input(0)).map(|s| s.id);
            if let (Some(start), Some(end)) = (start, end) {
                scene
                    .add_edge(start, end, EdgeType::Bezier)
                    .map_err(EditorError::from)?;
            }
        }

        document.editor.store_history("init add nodes", false)?;
        Ok(document)
    }

    /// Open a graph file
    pub fn open(path: &Path, config: EditorConfig) -> Result<Self, DocumentError> {
        let mut document = Self::new(config);
        document.editor.load(path)?;
        document.filename = Some(path.to_path_buf());
        Ok(document)
    }

    /// The editing session
    pub fn editor(&self) -> &NodeEditor {
        &self.editor
    }

    /// The editing session, mutable
    pub fn editor_mut(&mut self) -> &mut NodeEditor {
        &mut self.editor
    }

    /// File backing this document
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Whether the document has been saved or opened from a file
    pub fn is_filename_set(&self) -> bool {
        self.filename.is_some()
    }

    /// Whether there are unsaved changes
    pub fn is_modified(&self) -> bool {
        self.editor.is_modified()
    }

    /// File name (or [`UNTITLED`]) with a trailing `*` when modified
    pub fn user_friendly_filename(&self) -> String {
        let name = self
            .filename
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| UNTITLED.to_string(), |n| n.to_string_lossy().into_owned());
        if self.is_modified() {
            format!("{name}*")
        } else {
            name
        }
    }

    /// Window title
    pub fn title(&self) -> String {
        format!("Node Editor - {}", self.user_friendly_filename())
    }

    /// Guard before discarding the document.
    ///
    /// `ask` is only consulted when there are unsaved changes. Returns whether
    /// the caller may go ahead.
    pub fn maybe_save(&mut self, ask: impl FnOnce() -> CloseDecision) -> Result<bool, DocumentError> {
        if !self.is_modified() {
            return Ok(true);
        }
        match ask() {
            CloseDecision::Save => {
                self.save()?;
                Ok(true)
            }
            CloseDecision::Discard => Ok(true),
            CloseDecision::Cancel => Ok(false),
        }
    }

    /// Start over with an empty untitled graph, if the guard allows it
    pub fn new_file(&mut self, ask: impl FnOnce() -> CloseDecision) -> Result<bool, DocumentError> {
        if !self.maybe_save(ask)? {
            return Ok(false);
        }
        self.editor.reset();
        self.filename = None;
        Ok(true)
    }

    /// Replace the graph with a file, if the guard allows it
    pub fn open_file(
        &mut self,
        path: &Path,
        ask: impl FnOnce() -> CloseDecision,
    ) -> Result<bool, DocumentError> {
        if !self.maybe_save(ask)? {
            return Ok(false);
        }
        self.editor.load(path)?;
        self.filename = Some(path.to_path_buf());
        Ok(true)
    }

    /// Save to the current file
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.filename.clone().ok_or(DocumentError::NoFilename)?;
        self.editor.save(&path)?;
        Ok(())
    }

    /// Save to a new file and adopt it
    pub fn save_as(&mut self, path: &Path) -> Result<(), DocumentError> {
        self.editor.save(path)?;
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    // ---- clipboard text ----

    /// Copy the selection as JSON text
    pub fn copy_to_text(&self) -> Result<String, DocumentError> {
        Ok(self.editor.copy().to_json()?)
    }

    /// Cut the selection as JSON text
    pub fn cut_to_text(&mut self) -> Result<String, DocumentError> {
        let data = self.editor.cut()?;
        Ok(data.to_json()?)
    }

    /// Paste JSON text at the last pointer position.
    ///
    /// Text that is not JSON, or has no `nodes` key, is rejected before the
    /// scene is touched.
    pub fn paste_text(&mut self, text: &str) -> Result<PastedItems, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(ClipboardError::InvalidJson)?;
        if value.get("nodes").is_none() {
            tracing::warn!("Paste ignored: clipboard JSON has no nodes");
            return Err(ClipboardError::MissingNodes.into());
        }
        let data: ClipboardData = serde_json::from_value(value).map_err(ClipboardError::InvalidPayload)?;
        Ok(self.editor.paste(&data)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Rejected clipboard text
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// Not JSON at all
    #[error("Pasting of invalid JSON data: {0}")]
    InvalidJson(serde_json::Error),

    /// JSON without a `nodes` key
    #[error("JSON does not contain any nodes")]
    MissingNodes,

    /// JSON that does not match the clipboard layout
    #[error("Clipboard payload is malformed: {0}")]
    InvalidPayload(serde_json::Error),
}

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Save requested on an untitled document
    #[error("Document has no file name")]
    NoFilename,

    /// Clipboard text rejected
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Editor operation failed
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Payload could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use xynode_graph::Selection;

    fn select_all(document: &mut Document) {
        let mut selection = Selection::new();
        selection.select_all(document.editor().scene());
        *document.editor_mut().selection_mut() = selection;
    }

    #[test]
    fn test_sample_graph() {
        let document = Document::with_sample_graph(EditorConfig::default()).unwrap();
        let scene = document.editor().scene();
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(document.editor().history().current_label(), Some("init add nodes"));
        assert!(!document.is_modified());

        let positions: Vec<_> = scene.nodes().map(|n| n.position()).collect();
        assert_eq!(positions[2], Point::new(200.0, -150.0));
        let types: Vec<_> = scene.nodes().next().unwrap().inputs().iter().map(|s| s.socket_type).collect();
        assert_eq!(types, vec![0, 2, 3]);
    }

    #[test]
    fn test_title_tracks_file_and_modified_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.json");

        let mut document = Document::default();
        assert_eq!(document.user_friendly_filename(), "New Graph");

        document
            .editor_mut()
            .add_node("A", &[], &[], Point::ZERO)
            .unwrap();
        assert_eq!(document.title(), "Node Editor - New Graph*");

        document.save_as(&path).unwrap();
        assert_eq!(document.user_friendly_filename(), "calc.json");
    }

    #[test]
    fn test_save_without_filename() {
        let mut document = Document::default();
        assert!(matches!(document.save(), Err(DocumentError::NoFilename)));
    }

    #[test]
    fn test_maybe_save_guard() {
        let mut document = Document::default();
        let mut asked = false;
        assert!(document.maybe_save(|| {
            asked = true;
            CloseDecision::Cancel
        }).unwrap());
        assert!(!asked);

        document.editor_mut().add_node("A", &[], &[], Point::ZERO).unwrap();
        assert!(!document.new_file(|| CloseDecision::Cancel).unwrap());
        assert_eq!(document.editor().scene().node_count(), 1);

        assert!(document.new_file(|| CloseDecision::Discard).unwrap());
        assert_eq!(document.editor().scene().node_count(), 0);
        assert!(document.editor().history().is_empty());
        assert!(!document.is_modified());
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        let mut sample = Document::with_sample_graph(EditorConfig::default()).unwrap();
        sample.save_as(&path).unwrap();

        let opened = Document::open(&path, EditorConfig::default()).unwrap();
        assert_eq!(opened.filename(), Some(path.as_path()));
        assert_eq!(opened.editor().scene().serialize(), sample.editor().scene().serialize());
        assert_eq!(opened.editor().history().current_label(), Some("load"));
    }

    #[test]
    fn test_copy_paste_text() {
        let mut document = Document::with_sample_graph(EditorConfig::default()).unwrap();
        select_all(&mut document);
        let text = document.copy_to_text().unwrap();
        assert!(text.contains("\"nodes\""));

        let pasted = document.paste_text(&text).unwrap();
        assert_eq!(pasted.nodes.len(), 3);
        assert_eq!(pasted.edges.len(), 2);
        assert_eq!(document.editor().scene().node_count(), 6);
    }

    #[test]
    fn test_cut_text() {
        let mut document = Document::with_sample_graph(EditorConfig::default()).unwrap();
        select_all(&mut document);
        let text = document.cut_to_text().unwrap();
        assert_eq!(document.editor().scene().node_count(), 0);
        assert_eq!(document.editor().history().current_label(), Some("cut"));

        document.paste_text(&text).unwrap();
        assert_eq!(document.editor().scene().node_count(), 3);
    }

    #[test]
    fn test_rejected_paste_text() {
        let mut document = Document::with_sample_graph(EditorConfig::default()).unwrap();
        let before = document.editor().scene().serialize();
        let history_len = document.editor().history().len();

        assert!(matches!(
            document.paste_text("not json"),
            Err(DocumentError::Clipboard(ClipboardError::InvalidJson(_)))
        ));
        assert!(matches!(
            document.paste_text(r#"{"edges": []}"#),
            Err(DocumentError::Clipboard(ClipboardError::MissingNodes))
        ));
        assert!(matches!(
            document.paste_text(r#"{"nodes": [{"id": 1}]}"#),
            Err(DocumentError::Clipboard(ClipboardError::InvalidPayload(_)))
        ));

        assert_eq!(document.editor().scene().serialize(), before);
        assert_eq!(document.editor().history().len(), history_len);
    }
}
