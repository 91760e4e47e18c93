//! Directory browser state: current path, listing, history, scroll positions

use crate::history::{HistoryMove, HistoryStack};
use crate::path;
use crate::selection::SelectionSet;
use app_proto::{DirectoryEntry, EntryKind, Listing};
use std::collections::HashMap;

/// Label of the synthetic parent row
pub const PARENT_LABEL: &str = "..";

/// How a navigation was triggered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Let the server skip through single-child directories
    pub auto_enter: bool,
    /// Back/forward/refresh: do not touch history
    pub from_history: bool,
}

impl NavigateOptions {
    /// Clicking into a directory
    pub fn enter() -> Self {
        Self {
            auto_enter: true,
            from_history: false,
        }
    }

    /// Back, forward, and refresh
    pub fn history() -> Self {
        Self {
            auto_enter: false,
            from_history: true,
        }
    }

    /// Typed or restored path
    pub fn direct() -> Self {
        Self::default()
    }
}

/// Handle for one in-flight listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    pub requested: String,
    pub options: NavigateOptions,
    /// Back/forward step committed only when this listing lands
    pub history_move: Option<HistoryMove>,
}

/// A rendered listing row
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserRow {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub is_parent_link: bool,
    pub checked: bool,
}

/// Snapshot handed to the view after a listing changes
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserView {
    pub current_path: String,
    pub rows: Vec<BrowserRow>,
    pub scroll_offset: f32,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// What activating a row means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    Back,
    Enter(String),
    Preview(String),
}

/// Directory browser
#[derive(Debug, Clone)]
pub struct DirectoryBrowser {
    base_dir: String,
    current_path: String,
    history: HistoryStack,
    entries: Vec<DirectoryEntry>,
    scroll_offsets: HashMap<String, f32>,
    generation: u64,
}

impl DirectoryBrowser {
    pub fn new(base_dir: &str, history_limit: usize) -> Self {
        Self {
            base_dir: base_dir.to_string(),
            current_path: base_dir.to_string(),
            history: HistoryStack::new(base_dir, history_limit),
            entries: Vec::new(),
            scroll_offsets: HashMap::new(),
            generation: 0,
        }
    }

    /// Adopt the server's base directory
    pub fn rebase(&mut self, base_dir: &str) {
        self.base_dir = base_dir.to_string();
        self.current_path = base_dir.to_string();
        self.history.rebase(base_dir);
        self.entries.clear();
        self.scroll_offsets.clear();
    }

    /// Start a navigation; any earlier in-flight navigation becomes stale
    pub fn begin_navigation(&mut self, requested: &str, options: NavigateOptions) -> NavigationTicket {
        self.generation += 1;
        NavigationTicket {
            generation: self.generation,
            requested: requested.to_string(),
            options,
            history_move: None,
        }
    }

    /// Start loading the previous directory; history moves on success only
    pub fn begin_back(&mut self) -> Option<NavigationTicket> {
        let history_move = self.history.peek_back(&self.current_path)?;
        Some(self.begin_history_step(history_move))
    }

    /// Start loading the next directory; history moves on success only
    pub fn begin_forward(&mut self) -> Option<NavigationTicket> {
        let history_move = self.history.peek_forward()?;
        Some(self.begin_history_step(history_move))
    }

    fn begin_history_step(&mut self, history_move: HistoryMove) -> NavigationTicket {
        let mut ticket = self.begin_navigation(history_move.target(), NavigateOptions::history());
        ticket.history_move = Some(history_move);
        ticket
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a listing response. Returns `false` (and changes nothing) when
    /// the ticket was superseded.
    pub fn complete_navigation(&mut self, ticket: &NavigationTicket, listing: Listing) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!("Dropping stale listing for {}", ticket.requested);
            return false;
        }

        if listing.current_path != ticket.requested {
            tracing::debug!(
                "Server moved navigation from {} to {}",
                ticket.requested,
                listing.current_path
            );
        }

        self.current_path = listing.current_path;
        if let Some(history_move) = &ticket.history_move {
            self.history.apply(history_move);
        } else if !ticket.options.from_history {
            self.history.push(&self.current_path);
        }
        self.entries = listing.files;
        true
    }

    /// Whether a failure for this ticket should be surfaced
    pub fn fail_navigation(&self, ticket: &NavigationTicket) -> bool {
        self.is_current(ticket)
    }

    pub fn at_base(&self) -> bool {
        self.current_path == self.base_dir
    }

    /// Rows in display order; a `..` row leads when below the base directory
    pub fn rows(&self, selection: &SelectionSet) -> Vec<BrowserRow> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);

        if !self.at_base() {
            rows.push(BrowserRow {
                name: PARENT_LABEL.to_string(),
                path: path::parent_of(&self.current_path, &self.base_dir),
                kind: EntryKind::Dir,
                size: None,
                is_parent_link: true,
                checked: false,
            });
        }

        rows.extend(self.entries.iter().map(|e| BrowserRow {
            name: e.name.clone(),
            path: e.path.clone(),
            kind: e.kind,
            size: if e.is_file() { e.size } else { None },
            is_parent_link: false,
            checked: selection.contains(&e.path),
        }));

        rows
    }

    pub fn view(&self, selection: &SelectionSet) -> BrowserView {
        BrowserView {
            current_path: self.current_path.clone(),
            rows: self.rows(selection),
            scroll_offset: self.scroll_offset(&self.current_path),
            can_go_back: !self.at_base() || self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
        }
    }

    /// Interpret a click on the row at `index`
    pub fn activate(&self, index: usize) -> Option<EntryAction> {
        let row_offset = usize::from(!self.at_base());

        if row_offset == 1 && index == 0 {
            return Some(EntryAction::Back);
        }

        let entry = self.entries.get(index - row_offset)?;
        Some(match entry.kind {
            EntryKind::Dir if entry.name == PARENT_LABEL => EntryAction::Back,
            EntryKind::Dir => EntryAction::Enter(entry.path.clone()),
            EntryKind::File => EntryAction::Preview(entry.path.clone()),
        })
    }

    /// Remember how far the current directory is scrolled
    pub fn record_scroll(&mut self, offset: f32) {
        self.scroll_offsets.insert(self.current_path.clone(), offset.max(0.0));
    }

    pub fn scroll_offset(&self, path: &str) -> f32 {
        self.scroll_offsets.get(path).copied().unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }
}
