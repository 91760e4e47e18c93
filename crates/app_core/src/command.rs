//! Command system for user actions

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Navigation commands
    pub const NAV_LIST: &'static str = "nav.list";
    pub const NAV_CHANGE_DIR: &'static str = "nav.change_dir";
    pub const NAV_BACK: &'static str = "nav.back";
    pub const NAV_FORWARD: &'static str = "nav.forward";
    pub const NAV_OPEN: &'static str = "nav.open";
    pub const NAV_REFRESH: &'static str = "nav.refresh";

    // Selection commands
    pub const SEL_SELECT: &'static str = "sel.select";
    pub const SEL_UNSELECT: &'static str = "sel.unselect";
    pub const SEL_SELECT_ALL: &'static str = "sel.select_all";
    pub const SEL_DESELECT_ALL: &'static str = "sel.deselect_all";
    pub const SEL_SHOW: &'static str = "sel.show";

    // Batch commands
    pub const BATCH_COMPRESS: &'static str = "batch.compress";
    pub const BATCH_CONVERT: &'static str = "batch.convert";
    pub const BATCH_STOP: &'static str = "batch.stop";
    pub const BATCH_CLOSE_PROGRESS: &'static str = "batch.close_progress";

    // Task commands
    pub const TASK_COUNT: &'static str = "task.count_formats";
    pub const TASK_FIX_EXT: &'static str = "task.fix_extensions";
    pub const TASK_CLEAN_EMPTY: &'static str = "task.clean_empty_folders";
    pub const TASK_SEARCH: &'static str = "task.search";
    pub const TASK_DELETE_FORMAT: &'static str = "task.delete_by_format";

    // File commands
    pub const FILE_DELETE: &'static str = "file.delete";

    // Preview commands
    pub const PREVIEW_OPEN: &'static str = "preview.open";
    pub const PREVIEW_HOVER: &'static str = "preview.hover";
    pub const PREVIEW_LEAVE: &'static str = "preview.leave";
    pub const PREVIEW_CLOSE: &'static str = "preview.close";
    pub const PREVIEW_ADDRESS: &'static str = "preview.address";

    // App commands
    pub const APP_LANGUAGE: &'static str = "app.language";
    pub const APP_HELP: &'static str = "app.help";
    pub const APP_QUIT: &'static str = "app.quit";
}

/// Console keyword, command id, usage line
pub const COMMAND_TABLE: &[(&str, &str, &str)] = &[
    ("ls", CommandId::NAV_LIST, "ls"),
    ("cd", CommandId::NAV_CHANGE_DIR, "cd <path>"),
    ("back", CommandId::NAV_BACK, "back"),
    ("forward", CommandId::NAV_FORWARD, "forward"),
    ("open", CommandId::NAV_OPEN, "open <index>"),
    ("refresh", CommandId::NAV_REFRESH, "refresh"),
    ("select", CommandId::SEL_SELECT, "select <index|path>"),
    ("unselect", CommandId::SEL_UNSELECT, "unselect <index|path>"),
    ("select-all", CommandId::SEL_SELECT_ALL, "select-all"),
    ("deselect-all", CommandId::SEL_DESELECT_ALL, "deselect-all"),
    ("selection", CommandId::SEL_SHOW, "selection"),
    ("compress", CommandId::BATCH_COMPRESS, "compress [quality] [min_kb] [workers]"),
    ("convert", CommandId::BATCH_CONVERT, "convert <format> [quality] [workers] [--keep-pdf]"),
    ("stop", CommandId::BATCH_STOP, "stop"),
    ("close-progress", CommandId::BATCH_CLOSE_PROGRESS, "close-progress"),
    ("count", CommandId::TASK_COUNT, "count"),
    ("fix-ext", CommandId::TASK_FIX_EXT, "fix-ext"),
    ("clean-empty", CommandId::TASK_CLEAN_EMPTY, "clean-empty"),
    ("search", CommandId::TASK_SEARCH, "search <pattern> [--regex] [--case]"),
    ("delete-format", CommandId::TASK_DELETE_FORMAT, "delete-format <format>"),
    ("delete", CommandId::FILE_DELETE, "delete <index|path>"),
    ("preview", CommandId::PREVIEW_OPEN, "preview <index|path>"),
    ("hover", CommandId::PREVIEW_HOVER, "hover <index>"),
    ("leave", CommandId::PREVIEW_LEAVE, "leave"),
    ("close-preview", CommandId::PREVIEW_CLOSE, "close-preview"),
    ("address", CommandId::PREVIEW_ADDRESS, "address [lat lon]"),
    ("lang", CommandId::APP_LANGUAGE, "lang <locale>"),
    ("help", CommandId::APP_HELP, "help"),
    ("quit", CommandId::APP_QUIT, "quit"),
];

/// Command with optional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandParams {
    /// Positional arguments, quotes removed
    pub args: Vec<String>,
    /// `--name` switches, without the dashes
    pub flags: Vec<String>,
}

impl CommandParams {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    /// All positional arguments joined back with spaces
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}

/// Split a line on whitespace; double quotes group words
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }

    if in_quotes {
        return Err(AppError::InvalidInput(format!("unterminated quote: {}", line)));
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_arg(mut self, value: &str) -> Self {
        self.params.args.push(value.to_string());
        self
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.params.flags.push(name.to_string());
        self
    }

    /// Parse one console line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words = split_words(line)?;
        let Some((keyword, rest)) = words.split_first() else {
            return Ok(None);
        };

        let id = COMMAND_TABLE
            .iter()
            .find(|(kw, _, _)| kw.eq_ignore_ascii_case(keyword))
            .map(|(_, id, _)| *id)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown command: {}", keyword)))?;

        let mut command = Self::new(id);
        for word in rest {
            match word.strip_prefix("--") {
                Some(flag) if !flag.is_empty() => command.params.flags.push(flag.to_string()),
                _ => command.params.args.push(word.clone()),
            }
        }
        Ok(Some(command))
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_quoted_path() {
        let cmd = Command::parse(r#"cd "/data/my photos/2024""#).unwrap().unwrap();
        assert!(cmd.is(CommandId::NAV_CHANGE_DIR));
        assert_eq!(cmd.params.arg(0), Some("/data/my photos/2024"));
    }

    #[test]
    fn test_parse_flags() {
        let cmd = Command::parse("search ^IMG_\\d+ --regex --case").unwrap().unwrap();
        assert_eq!(cmd, Command::new(CommandId::TASK_SEARCH)
            .with_arg("^IMG_\\d+")
            .with_flag("regex")
            .with_flag("case"));
        assert!(cmd.params.has_flag("regex"));
    }

    #[test]
    fn test_parse_case_insensitive_keyword() {
        let cmd = Command::parse("Select-All").unwrap().unwrap();
        assert!(cmd.is(CommandId::SEL_SELECT_ALL));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("teleport /data").is_err());
        assert!(Command::parse("cd \"/data").is_err());
    }

    #[test]
    fn test_empty_quotes_is_an_argument() {
        let cmd = Command::parse("search \"\"").unwrap().unwrap();
        assert_eq!(cmd.params.args, vec![String::new()]);
    }

    #[test]
    fn test_rest_joins_args() {
        let cmd = Command::parse("search big cat").unwrap().unwrap();
        assert_eq!(cmd.params.rest(), "big cat");
    }

    #[test]
    fn test_table_keywords_unique() {
        for (i, (kw, _, _)) in COMMAND_TABLE.iter().enumerate() {
            assert!(COMMAND_TABLE[i + 1..].iter().all(|(other, _, _)| other != kw));
        }
    }
}
