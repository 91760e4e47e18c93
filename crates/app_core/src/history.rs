//! Bounded back/forward history over visited directories

use crate::path;

/// Default number of remembered directories
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A back or forward step waiting for its listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryMove {
    /// Move the cursor to `index`
    Step { index: usize, path: String },
    /// Divergent back: load the parent, then reset to `[base_dir]`
    ResetToParent { path: String },
}

impl HistoryMove {
    /// Directory to load
    pub fn target(&self) -> &str {
        match self {
            HistoryMove::Step { path, .. } | HistoryMove::ResetToParent { path } => path,
        }
    }

    pub fn into_target(self) -> String {
        match self {
            HistoryMove::Step { path, .. } | HistoryMove::ResetToParent { path } => path,
        }
    }
}

/// Browser-style history stack.
///
/// Invariants: never empty, `index < entries.len()`, `entries.len() <= max_length`.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<String>,
    index: usize,
    max_length: usize,
    base_dir: String,
}

impl HistoryStack {
    /// Start a history rooted at `base_dir`
    pub fn new(base_dir: &str, max_length: usize) -> Self {
        Self {
            entries: vec![base_dir.to_string()],
            index: 0,
            max_length: max_length.max(1),
            base_dir: base_dir.to_string(),
        }
    }

    /// Record a visit.
    ///
    /// Entries after the current position are dropped first. Re-pushing the
    /// last entry is a no-op. Overflow drops the oldest entry.
    pub fn push(&mut self, path: &str) {
        if self.index + 1 < self.entries.len() {
            self.entries.truncate(self.index + 1);
        }

        if self.entries.last().map(String::as_str) == Some(path) {
            self.index = self.entries.len() - 1;
            return;
        }

        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.max_length {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    /// Where a back step would go, without moving.
    ///
    /// `current_path` is what the browser is actually showing; it can diverge
    /// from the stack after non-history navigation. At the bottom of the stack
    /// this falls back to the parent of `current_path` and a reset to the base
    /// directory. Returns `None` when already at the base.
    pub fn peek_back(&self, current_path: &str) -> Option<HistoryMove> {
        if self.index > 0 {
            return Some(HistoryMove::Step {
                index: self.index - 1,
                path: self.entries[self.index - 1].clone(),
            });
        }

        if current_path == self.base_dir {
            return None;
        }

        Some(HistoryMove::ResetToParent {
            path: path::parent_of(current_path, &self.base_dir),
        })
    }

    /// Where a forward step would go, without moving
    pub fn peek_forward(&self) -> Option<HistoryMove> {
        let index = self.index + 1;
        self.entries.get(index).map(|path| HistoryMove::Step {
            index,
            path: path.clone(),
        })
    }

    /// Commit a move once its directory has loaded.
    ///
    /// A step whose slot no longer holds the same path is refused.
    pub fn apply(&mut self, history_move: &HistoryMove) -> bool {
        match history_move {
            HistoryMove::Step { index, path } => {
                if self.entries.get(*index) != Some(path) {
                    tracing::debug!("History changed under pending move to {}", path);
                    return false;
                }
                self.index = *index;
            }
            HistoryMove::ResetToParent { .. } => self.reset(),
        }
        true
    }

    /// Step back immediately and return the directory to load
    pub fn back(&mut self, current_path: &str) -> Option<String> {
        let history_move = self.peek_back(current_path)?;
        self.apply(&history_move);
        Some(history_move.into_target())
    }

    /// Step forward immediately and return the directory to load
    pub fn forward(&mut self) -> Option<String> {
        let history_move = self.peek_forward()?;
        self.apply(&history_move);
        Some(history_move.into_target())
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Back to `[base_dir]` at index 0
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(self.base_dir.clone());
        self.index = 0;
    }

    /// Re-root the stack (base directory changed after config load)
    pub fn rebase(&mut self, base_dir: &str) {
        self.base_dir = base_dir.to_string();
        self.reset();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new("", DEFAULT_HISTORY_LIMIT)
    }
}
