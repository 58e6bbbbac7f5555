//! Undo/redo history of region-list snapshots.
//!
//! Every mutating editor operation replaces the whole region list and then
//! commits the new list here. Snapshots are `Arc<[Region]>`, shared with the
//! live list, so committing never deep-copies regions.
//!
//! The history always holds at least one snapshot (the state after the image
//! was loaded), and `index` points at the snapshot matching the live list.

use std::sync::Arc;

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::model::Region;

/// Shared, immutable region list.
pub type Snapshot = Arc<[Region]>;

/// Configuration for the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep; `None` keeps everything.
    pub max_history: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

/// Linear snapshot history with a movable cursor.
#[derive(Debug, Clone)]
pub struct RegionHistory {
    snapshots: Vec<Snapshot>,
    index: usize,
    config: HistoryConfig,
}

impl Default for RegionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionHistory {
    /// Create a history holding a single empty snapshot.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            snapshots: vec![Snapshot::from(Vec::new())],
            index: 0,
            config,
        }
    }

    /// Drop every snapshot and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
        log::debug!("History reset");
    }

    /// Record `regions` as the newest snapshot.
    ///
    /// Anything beyond the current index (the redo future) is discarded.
    pub fn commit(&mut self, regions: Snapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(regions);
        self.index = self.snapshots.len() - 1;

        // A cap of zero would leave nothing to undo to; keep at least one.
        if let Some(max) = self.config.max_history.map(|max| max.max(1)) {
            while self.snapshots.len() > max {
                self.snapshots.remove(0);
                self.index -= 1;
            }
        }
        log::debug!(
            "History commit: {} regions (snapshot {}/{})",
            self.snapshots[self.index].len(),
            self.index + 1,
            self.snapshots.len()
        );
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Step back one snapshot. Returns `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("Undo to snapshot {}", self.index + 1);
        Some(Arc::clone(&self.snapshots[self.index]))
    }

    /// Step forward one snapshot. Returns `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("Redo to snapshot {}", self.index + 1);
        Some(Arc::clone(&self.snapshots[self.index]))
    }

    /// The snapshot the cursor points at.
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    /// Position of the cursor (0 = oldest snapshot).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: a history holds at least one snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
