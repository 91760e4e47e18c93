//! Application state management

use crate::browser::DirectoryBrowser;
use crate::config::AppConfig;
use crate::error::Result;
use crate::event::ServerInfo;
use crate::input::default_workers;
use crate::preview::{PreviewController, PreviewRules};
use crate::progress::ProgressMonitor;
use crate::selection::SelectionSet;
use crate::session_store::SessionStore;
use crate::task_poller::TaskPoller;
use app_proto::{GpsCoords, TaskType};
use parking_lot::{Mutex, RwLock};

/// Server core count assumed until `/get_config` answers
pub const DEFAULT_CPU_COUNT: usize = 4;

/// Parameters of the last submitted (or recovered) task, for refilling forms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub task_type: TaskType,
    pub selected_paths: Vec<String>,
    pub pattern: Option<String>,
    pub is_regex: bool,
    pub case_sensitive: bool,
    pub format: Option<String>,
}

/// Main application state
///
/// One instance per session; every component reads and writes through it.
/// Locks are never held across an `.await`.
pub struct AppState {
    /// Application configuration
    pub config: RwLock<AppConfig>,

    /// What the server told us at startup
    pub server: RwLock<ServerInfo>,

    /// Current directory, listing, history
    pub browser: RwLock<DirectoryBrowser>,

    /// Paths chosen for the next operation
    pub selection: RwLock<SelectionSet>,

    /// Server-side task polling
    pub poller: Mutex<TaskPoller>,

    /// Batch progress monitoring
    pub monitor: Mutex<ProgressMonitor>,

    /// Hover/modal preview flags
    pub preview: Mutex<PreviewController>,

    /// Persisted client state
    pub session: Mutex<SessionStore>,

    /// Last task submission parameters
    pub task_form: RwLock<TaskForm>,

    /// GPS position of the open preview, if any
    pub preview_gps: RwLock<Option<GpsCoords>>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: AppConfig, session: SessionStore) -> Self {
        let base_dir = config.server.fallback_base_dir.clone();

        let browser = DirectoryBrowser::new(&base_dir, config.browser.history_limit);
        let poller = TaskPoller::new(config.polling.task_interval());
        let monitor = ProgressMonitor::new(
            config.polling.progress_interval(),
            config.browser.current_file_label_max,
        );
        let preview = PreviewController::new(
            PreviewRules {
                download_extensions: config.preview.download_extensions.clone(),
                transcode_extensions: config.preview.transcode_extensions.clone(),
            },
            config.preview.hover_delay(),
            &base_dir,
        );

        Self {
            server: RwLock::new(ServerInfo {
                base_dir,
                cpu_count: DEFAULT_CPU_COUNT,
                default_workers: default_workers(DEFAULT_CPU_COUNT),
                formats: Vec::new(),
                version: None,
            }),
            config: RwLock::new(config),
            browser: RwLock::new(browser),
            selection: RwLock::new(SelectionSet::new()),
            poller: Mutex::new(poller),
            monitor: Mutex::new(monitor),
            preview: Mutex::new(preview),
            session: Mutex::new(session),
            task_form: RwLock::new(TaskForm::default()),
            preview_gps: RwLock::new(None),
        }
    }

    /// Adopt the server's configuration
    pub fn apply_server_info(&self, info: ServerInfo) {
        self.browser.write().rebase(&info.base_dir);
        self.preview.lock().set_base_dir(&info.base_dir);
        *self.server.write() = info;
    }

    pub fn base_dir(&self) -> String {
        self.server.read().base_dir.clone()
    }

    pub fn cpu_count(&self) -> usize {
        self.server.read().cpu_count
    }

    pub fn supported_formats(&self) -> Vec<String> {
        self.server.read().formats.clone()
    }

    /// Save the current configuration
    pub fn save_config(&self) -> Result<()> {
        self.config.read().save()
    }
}
