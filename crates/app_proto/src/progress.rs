//! Shared batch progress state reported by `/get_progress`

use serde::{Deserialize, Serialize};

/// Server-side batch status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[default]
    Idle,
    Running,
    Completed,
    #[serde(other)]
    Unknown,
}

/// A file that failed or was skipped during a batch
///
/// The server reports these either as bare paths or as `{path, reason}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FileIssueRepr")]
pub struct FileIssue {
    pub path: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileIssueRepr {
    Path(String),
    Detailed {
        path: String,
        #[serde(default, alias = "error")]
        reason: Option<String>,
    },
}

impl From<FileIssueRepr> for FileIssue {
    fn from(repr: FileIssueRepr) -> Self {
        match repr {
            FileIssueRepr::Path(path) => Self { path, reason: None },
            FileIssueRepr::Detailed { path, reason } => Self { path, reason },
        }
    }
}

/// Process-wide progress of the current compress/convert batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    pub status: ProgressStatus,
    pub total: u64,
    pub processed: u64,
    pub current_file: Option<String>,
    pub task_type: Option<String>,
    /// ISO-8601 local timestamp
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub original_size: u64,
    pub final_size: u64,
    pub failed_files: Vec<FileIssue>,
    pub skipped_files: Vec<FileIssue>,
    pub ignored_count: u64,
}

impl ProgressState {
    pub fn is_running(&self) -> bool {
        self.status == ProgressStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}
