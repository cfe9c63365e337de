// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built from full scene snapshots.
//!
//! Every checkpoint holds the whole serialized scene, encoded with bincode.
//! Undo and redo move a pointer through the stack and rebuild the live scene
//! from the checkpoint it lands on; the old entities are discarded rather
//! than patched in place. Restoring never records a checkpoint of its own.

use crate::scene::Scene;
use crate::serialization::{DeserializeError, IdMap, SceneData};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Snapshot decoded but could not be applied
    #[error("Restore failed: {0}")]
    Restore(#[from] DeserializeError),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Encoded scene state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// bincode-encoded [`SceneData`]
    pub data: Vec<u8>,
    /// Size in bytes
    pub size: usize,
}

impl StateSnapshot {
    /// Capture the scene
    pub fn capture(scene: &Scene) -> Result<Self> {
        let data = bincode::serialize(&scene.serialize())?;
        let size = data.len();
        Ok(Self { data, size })
    }

    /// Decode the captured scene data
    pub fn scene_data(&self) -> Result<SceneData> {
        Ok(bincode::deserialize(&self.data)?)
    }
}

/// One labelled entry in the history stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Human-readable description
    pub label: String,
    /// Scene state after the action
    pub snapshot: StateSnapshot,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl Checkpoint {
    fn new(label: String, snapshot: StateSnapshot) -> Self {
        Self {
            label,
            snapshot,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }
}

/// History statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Checkpoints at or before the pointer
    pub undo_count: usize,
    /// Checkpoints after the pointer
    pub redo_count: usize,
    /// Total snapshot bytes
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Checkpoint stack with a current-position pointer
#[derive(Debug)]
pub struct SceneHistory {
    stack: VecDeque<Checkpoint>,
    current: Option<usize>,
    max_depth: usize,
    memory_used: usize,
}

impl SceneHistory {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth (at least one)
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            stack: VecDeque::new(),
            current: None,
            max_depth: max_depth.max(1),
            memory_used: 0,
        }
    }

    /// Record the scene's current state.
    ///
    /// Redo entries past the pointer are discarded and the oldest entry is
    /// evicted once the stack is full. With `set_modified` the scene is
    /// flagged dirty first.
    pub fn store(&mut self, label: impl Into<String>, scene: &mut Scene, set_modified: bool) -> Result<()> {
        let label = label.into();
        if set_modified {
            scene.set_modified(true);
        }
        let snapshot = StateSnapshot::capture(scene)?;

        let keep = self.current.map_or(0, |current| current + 1);
        while self.stack.len() > keep {
            if let Some(dropped) = self.stack.pop_back() {
                self.memory_used = self.memory_used.saturating_sub(dropped.snapshot.size);
            }
        }

        self.memory_used += snapshot.size;
        tracing::trace!("History: storing '{}' ({} bytes)", label, snapshot.size);
        self.stack.push_back(Checkpoint::new(label, snapshot));

        while self.stack.len() > self.max_depth {
            if let Some(old) = self.stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.snapshot.size);
            }
        }
        self.current = Some(self.stack.len() - 1);
        Ok(())
    }

    /// Step back one checkpoint and rebuild the scene from it
    pub fn undo(&mut self, scene: &mut Scene) -> Result<&str> {
        let target = match self.current {
            Some(current) if current > 0 => current - 1,
            _ => return Err(HistoryError::NothingToUndo),
        };
        self.restore(target, scene)
    }

    /// Step forward one checkpoint and rebuild the scene from it
    pub fn redo(&mut self, scene: &mut Scene) -> Result<&str> {
        let target = match self.current {
            Some(current) if current + 1 < self.stack.len() => current + 1,
            _ => return Err(HistoryError::NothingToRedo),
        };
        self.restore(target, scene)
    }

    /// The pointer only moves once the scene has been rebuilt
    fn restore(&mut self, index: usize, scene: &mut Scene) -> Result<&str> {
        let Some(checkpoint) = self.stack.get(index) else {
            return Err(HistoryError::NothingToRedo);
        };
        let data = checkpoint.snapshot.scene_data()?;
        scene.deserialize(&data, &mut IdMap::new(), true)?;
        scene.set_modified(true);
        self.current = Some(index);
        tracing::debug!("History: restored '{}' ({}/{})", checkpoint.label, index + 1, self.stack.len());
        Ok(&checkpoint.label)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|current| current > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current.is_some_and(|current| current + 1 < self.stack.len())
    }

    /// Number of stored checkpoints
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether no checkpoint is stored
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Index of the current checkpoint
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Label of the current checkpoint
    pub fn current_label(&self) -> Option<&str> {
        self.current
            .and_then(|current| self.stack.get(current))
            .map(|c| c.label.as_str())
    }

    /// Labels from oldest to newest
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(|c| c.label.as_str())
    }

    /// Stored checkpoints from oldest to newest
    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.stack.iter()
    }

    /// Maximum history depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.stack.clear();
        self.current = None;
        self.memory_used = 0;
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        let undo_count = self.current.map_or(0, |current| current + 1);
        HistoryStats {
            undo_count,
            redo_count: self.stack.len() - undo_count,
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new()
    }
}
