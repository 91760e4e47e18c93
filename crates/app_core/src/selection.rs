//! Paths chosen for the next batch operation

use crate::path;
use app_proto::DirectoryEntry;

/// Ordered set of selected paths, unique by exact string match.
///
/// No normalization happens here; callers pass paths exactly as the server
/// reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: Vec<String>,
}

/// One row of the selection panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub path: String,
    pub filename: String,
    pub is_dir: bool,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkbox toggle; returns whether the set changed
    pub fn toggle(&mut self, path: &str, checked: bool) -> bool {
        if checked {
            self.insert(path)
        } else {
            self.remove(path)
        }
    }

    pub fn insert(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.paths.push(path.to_string());
        true
    }

    pub fn remove(&mut self, path: &str) -> bool {
        match self.paths.iter().position(|p| p == path) {
            Some(idx) => {
                self.paths.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Add every file entry of a listing; returns how many were new
    pub fn select_all(&mut self, entries: &[DirectoryEntry]) -> usize {
        entries
            .iter()
            .filter(|e| e.is_file())
            .filter(|e| self.insert(&e.path))
            .count()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Panel rows; directory flags come from `listing` when the path is in it,
    /// otherwise a name without an extension is taken as a directory.
    pub fn items(&self, listing: &[DirectoryEntry]) -> Vec<SelectionItem> {
        self.paths
            .iter()
            .map(|p| {
                let filename = path::filename_of(p).to_string();
                let is_dir = listing
                    .iter()
                    .find(|e| &e.path == p)
                    .map(DirectoryEntry::is_dir)
                    .unwrap_or_else(|| !filename.contains('.'));
                SelectionItem {
                    path: p.clone(),
                    filename,
                    is_dir,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_proto::EntryKind;

    fn entry(path: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            name: path::filename_of(path).to_string(),
            path: path.to_string(),
            kind,
            size: Some(10),
            mtime: None,
        }
    }

    #[test]
    fn test_toggle_idempotent() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle("/data/a.png", true));
        assert!(!sel.toggle("/data/a.png", true));
        assert_eq!(sel.len(), 1);

        assert!(sel.toggle("/data/a.png", false));
        assert!(!sel.toggle("/data/a.png", false));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_exact_match_only() {
        let mut sel = SelectionSet::new();
        sel.insert("/data/a.png");
        assert!(!sel.contains("/data//a.png"));
        assert!(!sel.contains("\\data\\a.png"));
    }

    #[test]
    fn test_select_all_files_only() {
        let listing = vec![
            entry("/data/sub", EntryKind::Dir),
            entry("/data/a.png", EntryKind::File),
            entry("/data/b.jpg", EntryKind::File),
        ];

        let mut sel = SelectionSet::new();
        sel.insert("/data/b.jpg");
        assert_eq!(sel.select_all(&listing), 1);
        assert_eq!(sel.paths(), ["/data/b.jpg", "/data/a.png"]);

        assert_eq!(sel.select_all(&listing), 0);
    }

    #[test]
    fn test_select_all_only_dirs() {
        let listing = vec![entry("/data/sub", EntryKind::Dir)];
        let mut sel = SelectionSet::new();
        assert_eq!(sel.select_all(&listing), 0);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_items_dir_detection() {
        let listing = vec![entry("/data/v1.0", EntryKind::Dir)];
        let mut sel = SelectionSet::new();
        sel.insert("/data/v1.0");
        sel.insert("/data/other/raw");
        sel.insert("/data/other/x.png");

        let items = sel.items(&listing);
        assert!(items[0].is_dir);
        assert!(items[1].is_dir);
        assert!(!items[2].is_dir);
        assert_eq!(items[2].filename, "x.png");
    }
}
