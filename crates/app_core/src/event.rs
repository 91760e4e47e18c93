//! Events emitted by the controller for the binding layer

use crate::browser::BrowserView;
use crate::preview::{HoverShow, PreviewSource};
use crate::progress::ProgressView;
use crate::render::{BatchSummary, PreviewInfoView, TaskResultView};
use crate::selection::SelectionItem;
use crate::state::TaskForm;
use app_proto::TaskType;
use fluent::FluentArgs;

/// How a notice is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Needs acknowledgement
    Modal,
    /// Transient
    Toast,
}

/// Operation named in failure notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadFiles,
    Preview,
    Compress,
    Convert,
    Stop,
    ResetProgress,
    SubmitTask,
    DeleteFile,
    LookupAddress,
}

impl Operation {
    pub fn key(&self) -> &'static str {
        match self {
            Operation::LoadFiles => "op-load-files",
            Operation::Preview => "op-preview",
            Operation::Compress => "op-compress",
            Operation::Convert => "op-convert",
            Operation::Stop => "op-stop",
            Operation::ResetProgress => "op-reset-progress",
            Operation::SubmitTask => "op-submit-task",
            Operation::DeleteFile => "op-delete-file",
            Operation::LookupAddress => "op-lookup-address",
        }
    }
}

/// Fluent message id of a task type's display name
pub fn task_type_key(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::CountFormats => "task-count-formats",
        TaskType::FixExtensions => "task-fix-extensions",
        TaskType::CleanEmptyFolders => "task-clean-empty-folders",
        TaskType::SearchFiles => "task-search-files",
        TaskType::DeleteFilesByFormat => "task-delete-by-format",
        TaskType::Unknown => "task-unknown",
    }
}

/// User-facing message, rendered through the localization bundles
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    NothingSelected,
    NoFilesToSelect,
    SelectedFiles { count: usize },
    OperationFailed { operation: Operation, detail: String },
    TaskFailed { task_type: TaskType, error: String },
    TaskRecovered { task_type: TaskType },
    InvalidInput { detail: String },
    BatchAccepted { count: usize },
    StopRequested,
    StopAccepted,
    FileDeleted { name: String },
    ConfigFallback { base_dir: String },
    LastPathRestored { path: String },
    DownloadStarted { name: String },
    NoGpsData,
    LanguageChanged { locale: String },
    UnknownLanguage { locale: String },
    Cancelled,
}

impl Message {
    pub fn key(&self) -> &'static str {
        match self {
            Message::NothingSelected => "notice-nothing-selected",
            Message::NoFilesToSelect => "notice-no-files-to-select",
            Message::SelectedFiles { .. } => "notice-selected-files",
            Message::OperationFailed { .. } => "notice-operation-failed",
            Message::TaskFailed { .. } => "notice-task-failed",
            Message::TaskRecovered { .. } => "notice-task-recovered",
            Message::InvalidInput { .. } => "notice-invalid-input",
            Message::BatchAccepted { .. } => "notice-batch-accepted",
            Message::StopRequested => "notice-stop-requested",
            Message::StopAccepted => "notice-stop-accepted",
            Message::FileDeleted { .. } => "notice-file-deleted",
            Message::ConfigFallback { .. } => "notice-config-fallback",
            Message::LastPathRestored { .. } => "notice-last-path-restored",
            Message::DownloadStarted { .. } => "notice-download-started",
            Message::NoGpsData => "notice-no-gps",
            Message::LanguageChanged { .. } => "notice-language-changed",
            Message::UnknownLanguage { .. } => "notice-unknown-language",
            Message::Cancelled => "notice-cancelled",
        }
    }

    /// Placeholder values; message ids in `$operation`/`$task` are resolved by the renderer
    pub fn args(&self) -> FluentArgs<'static> {
        let mut args = FluentArgs::new();
        match self {
            Message::SelectedFiles { count } | Message::BatchAccepted { count } => {
                args.set("count", *count);
            }
            Message::OperationFailed { operation, detail } => {
                args.set("operation", operation.key());
                args.set("detail", detail.clone());
            }
            Message::TaskFailed { task_type, error } => {
                args.set("task", task_type_key(*task_type));
                args.set("detail", error.clone());
            }
            Message::TaskRecovered { task_type } => {
                args.set("task", task_type_key(*task_type));
            }
            Message::InvalidInput { detail } => {
                args.set("detail", detail.clone());
            }
            Message::FileDeleted { name } | Message::DownloadStarted { name } => {
                args.set("name", name.clone());
            }
            Message::ConfigFallback { base_dir } => {
                args.set("path", base_dir.clone());
            }
            Message::LastPathRestored { path } => {
                args.set("path", path.clone());
            }
            Message::LanguageChanged { locale } | Message::UnknownLanguage { locale } => {
                args.set("locale", locale.clone());
            }
            Message::NothingSelected
            | Message::NoFilesToSelect
            | Message::StopRequested
            | Message::StopAccepted
            | Message::NoGpsData
            | Message::Cancelled => {}
        }
        args
    }
}

/// A message plus its presentation
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: Message,
}

impl Notice {
    pub fn modal(message: Message) -> Self {
        Self {
            severity: Severity::Modal,
            message,
        }
    }

    pub fn toast(message: Message) -> Self {
        Self {
            severity: Severity::Toast,
            message,
        }
    }
}

/// What a confirmation prompt is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    FixExtensions { count: usize },
    CleanEmptyFolders { count: usize },
    DeleteByFormat { format: String, count: usize },
    DeleteFile { name: String },
    StopProcessing,
}

impl ConfirmPrompt {
    pub fn key(&self) -> &'static str {
        match self {
            ConfirmPrompt::FixExtensions { .. } => "confirm-fix-extensions",
            ConfirmPrompt::CleanEmptyFolders { .. } => "confirm-clean-empty",
            ConfirmPrompt::DeleteByFormat { .. } => "confirm-delete-by-format",
            ConfirmPrompt::DeleteFile { .. } => "confirm-delete-file",
            ConfirmPrompt::StopProcessing => "confirm-stop",
        }
    }

    pub fn args(&self) -> FluentArgs<'static> {
        let mut args = FluentArgs::new();
        match self {
            ConfirmPrompt::FixExtensions { count } | ConfirmPrompt::CleanEmptyFolders { count } => {
                args.set("count", *count);
            }
            ConfirmPrompt::DeleteByFormat { format, count } => {
                args.set("format", format.to_uppercase());
                args.set("count", *count);
            }
            ConfirmPrompt::DeleteFile { name } => {
                args.set("name", name.clone());
            }
            ConfirmPrompt::StopProcessing => {}
        }
        args
    }
}

/// Server facts learned at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub base_dir: String,
    pub cpu_count: usize,
    pub default_workers: usize,
    pub formats: Vec<String>,
    pub version: Option<String>,
}

/// Everything the binding layer may need to redraw
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ServerInfo(ServerInfo),
    Listing(BrowserView),
    /// Selection panel contents and whether selection-bound actions are enabled
    Selection {
        items: Vec<SelectionItem>,
        actions_enabled: bool,
    },
    Progress(ProgressView),
    ProgressClosed,
    BatchCompleted(BatchSummary),
    TaskStarted {
        task_id: String,
        task_type: TaskType,
    },
    TaskFinished(TaskResultView),
    /// Parameters of a recovered task, for refilling forms
    TaskFormRestored(TaskForm),
    HoverShow(HoverShow),
    HoverMove {
        x: f32,
        y: f32,
    },
    HoverHide,
    ModalPreview {
        info: PreviewInfoView,
        source: PreviewSource,
    },
    ModalClosed,
    /// Fetch `url` and save it as `name`
    Download {
        url: String,
        name: String,
    },
    Address {
        address: String,
    },
    Notice(Notice),
}
