//! ImageDeck Core Domain Logic
//!
//! This crate contains:
//! - Path helpers and the bounded history stack
//! - Directory browser, selection set
//! - Task poller and batch progress monitor
//! - Hover/modal preview state
//! - Result rendering helpers
//! - Input parsing and console commands
//! - Configuration, session persistence, localization
//! - The async controller tying it all to a backend

pub mod path;
pub mod history;
pub mod selection;
pub mod browser;
pub mod task_poller;
pub mod progress;
pub mod preview;
pub mod render;
pub mod input;
pub mod command;
pub mod event;
pub mod i18n;
pub mod config;
pub mod session_store;
pub mod error;
pub mod state;
pub mod controller;

pub use browser::{BrowserRow, BrowserView, DirectoryBrowser, EntryAction, NavigateOptions};
pub use command::{Command, CommandId, CommandParams, COMMAND_TABLE};
pub use config::AppConfig;
pub use controller::{Confirmer, Controller, TaskRequest};
pub use error::AppError;
pub use event::{ConfirmPrompt, Message, Notice, Operation, ServerInfo, Severity, UiEvent};
pub use history::{HistoryMove, HistoryStack};
pub use i18n::I18n;
pub use input::{CompressOptions, ConvertOptions};
pub use preview::{PreviewController, PreviewSource};
pub use progress::{ProgressMonitor, ProgressView, StopControl};
pub use render::{BatchSummary, PreviewInfoView, TaskResultView};
pub use selection::{SelectionItem, SelectionSet};
pub use session_store::SessionStore;
pub use state::{AppState, TaskForm};
pub use task_poller::{TaskOutcome, TaskPoller};
