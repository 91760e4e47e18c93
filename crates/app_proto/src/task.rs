//! Server-side tasks polled through `/get_task_status/<task_id>`

use crate::FileIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task kinds the server runs asynchronously
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CountFormats,
    FixExtensions,
    CleanEmptyFolders,
    SearchFiles,
    DeleteFilesByFormat,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::CountFormats => "count_formats",
            TaskType::FixExtensions => "fix_extensions",
            TaskType::CleanEmptyFolders => "clean_empty_folders",
            TaskType::SearchFiles => "search_files",
            TaskType::DeleteFilesByFormat => "delete_files_by_format",
            TaskType::Unknown => "unknown",
        }
    }

    /// Tasks whose completion changes what is on disk
    pub fn mutates_files(&self) -> bool {
        matches!(
            self,
            TaskType::FixExtensions | TaskType::CleanEmptyFolders | TaskType::DeleteFilesByFormat
        )
    }
}

/// Status reported for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
    NotFound,
    Error,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::NotFound | TaskStatus::Error
        )
    }
}

/// Response of every task-submitting endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubmitted {
    pub task_id: String,
    #[serde(default)]
    pub task_type: TaskType,
}

/// A task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, alias = "task_id")]
    pub id: Option<String>,
    #[serde(default, rename = "type", alias = "task_type")]
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Task {
    /// Synthetic record for a task the server no longer knows about
    pub fn not_found(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            task_type: TaskType::Unknown,
            status: TaskStatus::NotFound,
            params: serde_json::Value::Null,
            result: None,
            error: None,
        }
    }

    /// Decode the typed result payload
    pub fn result_as<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        self.result
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Decode the submission parameters
    pub fn params_as<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        serde_json::from_value(self.params.clone()).ok()
    }
}

/// `/get_running_tasks`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunningTasks {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Params of tasks that only carry a selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionParams {
    #[serde(default)]
    pub selected_paths: Vec<String>,
}

/// Params of a search task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub selected_paths: Vec<String>,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Params of a delete-by-format task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteByFormatParams {
    #[serde(default)]
    pub selected_paths: Vec<String>,
    #[serde(default)]
    pub format: String,
}

/// Result of `count_formats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatCountResult {
    pub format_count: BTreeMap<String, u64>,
    pub format_size: BTreeMap<String, u64>,
    pub total_files: u64,
    pub total_size: u64,
}

/// Result of `fix_extensions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixExtensionsResult {
    pub processed: u64,
    pub failed_files: Vec<FileIssue>,
}

/// Result of `clean_empty_folders`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanEmptyResult {
    pub removed_count: u64,
    pub removed_folders: Vec<String>,
    pub failed_files: Vec<FileIssue>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Result of `search_files`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    pub total: Option<u64>,
}

/// Result of `delete_files_by_format`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteByFormatResult {
    pub deleted_count: u64,
    pub deleted_size: u64,
    pub failed_files: Vec<FileIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_decode() {
        let json = r#"{
            "id": "t-1", "type": "search_files", "status": "running",
            "params": {"selected_paths": ["/data"], "pattern": "IMG_*", "is_regex": false, "case_sensitive": true}
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_deref(), Some("t-1"));
        assert_eq!(task.task_type, TaskType::SearchFiles);
        assert!(!task.status.is_terminal());

        let params: SearchParams = task.params_as().unwrap();
        assert_eq!(params.pattern, "IMG_*");
        assert!(params.case_sensitive);
    }

    #[test]
    fn test_task_type_alias_and_unknown() {
        let task: Task =
            serde_json::from_str(r#"{"task_id": "t-2", "task_type": "rotate", "status": "completed"}"#)
                .unwrap();
        assert_eq!(task.id.as_deref(), Some("t-2"));
        assert_eq!(task.task_type, TaskType::Unknown);
        assert!(task.status.is_terminal());
    }

    #[test]
    fn test_format_count_result() {
        let task: Task = serde_json::from_str(
            r#"{"status": "completed", "type": "count_formats", "result": {
                "format_count": {"jpg": 2, "png": 1},
                "format_size": {"jpg": 3072, "png": 100},
                "total_files": 3, "total_size": 3172
            }}"#,
        )
        .unwrap();

        let result: FormatCountResult = task.result_as().unwrap();
        assert_eq!(result.format_count["jpg"], 2);
        assert_eq!(result.total_size, 3172);
    }

    #[test]
    fn test_not_found_is_terminal() {
        let task = Task::not_found("gone");
        assert!(task.status.is_terminal());
        assert!(task.result.is_none());
    }

    #[test]
    fn test_mutating_types() {
        assert!(TaskType::FixExtensions.mutates_files());
        assert!(TaskType::DeleteFilesByFormat.mutates_files());
        assert!(!TaskType::CountFormats.mutates_files());
        assert!(!TaskType::SearchFiles.mutates_files());
    }
}
