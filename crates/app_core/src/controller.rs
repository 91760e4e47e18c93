//! Async drivers wiring the state machines to the backend
//!
//! Everything runs on one thread inside a `tokio::task::LocalSet`. Poll loops,
//! bursts and hover timers are `spawn_local` tasks that re-check their token
//! after every suspension point and exit once superseded.

use crate::browser::{BrowserView, EntryAction, NavigateOptions, NavigationTicket};
use crate::error::{AppError, Result};
use crate::event::{ConfirmPrompt, Message, Notice, Operation, ServerInfo, UiEvent};
use crate::input::{default_workers, CompressOptions, ConvertOptions};
use crate::path;
use crate::progress::{BurstToken, MonitorEffect, ProgressView, QuickPoll, TimerToken};
use crate::preview::ModalRequest;
use crate::render;
use crate::selection::SelectionItem;
use crate::state::{AppState, TaskForm, DEFAULT_CPU_COUNT};
use crate::task_poller::{PollStep, SessionToken, TaskOutcome, TerminalStatus};
use app_net::Backend;
use app_proto::{
    CompressRequest, ConvertRequest, DeleteByFormatParams, DeleteByFormatRequest, ProgressState,
    ProgressStatus, SearchParams, SearchRequest, SelectionParams, Task, TaskStatus, TaskType,
};
use async_trait::async_trait;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::spawn_local;

/// Asks the user before destructive operations
#[async_trait(?Send)]
pub trait Confirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// A server-side task the user can start on the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    CountFormats,
    FixExtensions,
    CleanEmptyFolders,
    Search {
        pattern: String,
        is_regex: bool,
        case_sensitive: bool,
    },
    DeleteByFormat {
        format: String,
    },
}

impl TaskRequest {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskRequest::CountFormats => TaskType::CountFormats,
            TaskRequest::FixExtensions => TaskType::FixExtensions,
            TaskRequest::CleanEmptyFolders => TaskType::CleanEmptyFolders,
            TaskRequest::Search { .. } => TaskType::SearchFiles,
            TaskRequest::DeleteByFormat { .. } => TaskType::DeleteFilesByFormat,
        }
    }

    /// Confirmation needed before submitting, if any
    pub fn prompt(&self, count: usize) -> Option<ConfirmPrompt> {
        match self {
            TaskRequest::FixExtensions => Some(ConfirmPrompt::FixExtensions { count }),
            TaskRequest::CleanEmptyFolders => Some(ConfirmPrompt::CleanEmptyFolders { count }),
            TaskRequest::DeleteByFormat { format } => Some(ConfirmPrompt::DeleteByFormat {
                format: format.clone(),
                count,
            }),
            TaskRequest::CountFormats | TaskRequest::Search { .. } => None,
        }
    }

    fn form(&self, selected_paths: Vec<String>) -> TaskForm {
        let mut form = TaskForm {
            task_type: self.task_type(),
            selected_paths,
            ..Default::default()
        };
        match self {
            TaskRequest::Search {
                pattern,
                is_regex,
                case_sensitive,
            } => {
                form.pattern = Some(pattern.clone());
                form.is_regex = *is_regex;
                form.case_sensitive = *case_sensitive;
            }
            TaskRequest::DeleteByFormat { format } => form.format = Some(format.clone()),
            _ => {}
        }
        form
    }
}

/// Rebuild the submission form from a task's stored params
fn form_from_task(task: &Task) -> TaskForm {
    let mut form = TaskForm {
        task_type: task.task_type,
        ..Default::default()
    };
    match task.task_type {
        TaskType::SearchFiles => {
            let params: SearchParams = task.params_as().unwrap_or_default();
            form.selected_paths = params.selected_paths;
            form.pattern = Some(params.pattern);
            form.is_regex = params.is_regex;
            form.case_sensitive = params.case_sensitive;
        }
        TaskType::DeleteFilesByFormat => {
            let params: DeleteByFormatParams = task.params_as().unwrap_or_default();
            form.selected_paths = params.selected_paths;
            form.format = Some(params.format);
        }
        _ => {
            let params: SelectionParams = task.params_as().unwrap_or_default();
            form.selected_paths = params.selected_paths;
        }
    }
    form
}

/// Session controller
#[derive(Clone)]
pub struct Controller {
    state: Arc<AppState>,
    backend: Arc<dyn Backend>,
    confirmer: Rc<dyn Confirmer>,
    events: UnboundedSender<UiEvent>,
}

impl Controller {
    pub fn new(
        state: Arc<AppState>,
        backend: Arc<dyn Backend>,
        confirmer: Rc<dyn Confirmer>,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            state,
            backend,
            confirmer,
            events,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    fn emit(&self, event: UiEvent) {
        // Receiver gone means the binding layer is shutting down
        let _ = self.events.send(event);
    }

    fn toast(&self, message: Message) {
        self.emit(UiEvent::Notice(Notice::toast(message)));
    }

    fn alert(&self, message: Message) {
        self.emit(UiEvent::Notice(Notice::modal(message)));
    }

    /// Turn an error into the notice the user sees
    fn report(&self, operation: Operation, err: AppError) {
        match err {
            AppError::NothingSelected => self.toast(Message::NothingSelected),
            AppError::InvalidInput(detail) => self.toast(Message::InvalidInput { detail }),
            err => {
                tracing::error!("{:?} failed: {}", operation, err);
                self.alert(Message::OperationFailed {
                    operation,
                    detail: err.user_message(),
                });
            }
        }
    }

    // ===== Startup =====

    /// Load server facts, open the first directory, pick up running work
    pub async fn startup(&self) {
        let (config, formats, version) = futures::join!(
            self.backend.get_config(),
            self.backend.get_supported_formats(),
            self.backend.get_version(),
        );

        let (base_dir, cpu_count) = match config {
            Ok(config) => {
                tracing::info!("Server base directory: {}", config.base_dir);
                (config.base_dir, config.cpu_count.max(1))
            }
            Err(e) => {
                let fallback = self.state.config.read().server.fallback_base_dir.clone();
                tracing::warn!("Failed to load server config ({}), using {}", e, fallback);
                self.toast(Message::ConfigFallback {
                    base_dir: fallback.clone(),
                });
                (fallback, DEFAULT_CPU_COUNT)
            }
        };

        let formats = formats.map(|f| f.formats).unwrap_or_else(|e| {
            tracing::warn!("Failed to load supported formats: {}", e);
            Vec::new()
        });
        let version = version.map(|v| v.version).ok();

        let info = ServerInfo {
            base_dir: base_dir.clone(),
            cpu_count,
            default_workers: default_workers(cpu_count),
            formats,
            version,
        };
        self.state.apply_server_info(info.clone());
        self.emit(UiEvent::ServerInfo(info));

        let restore = self.state.config.read().browser.restore_last_path;
        let restored = if restore {
            self.state.session.lock().restore_path(&base_dir)
        } else {
            None
        };

        let start = match restored {
            Some(path) if path != base_dir => {
                self.toast(Message::LastPathRestored { path: path.clone() });
                path
            }
            _ => base_dir,
        };
        self.navigate(&start, NavigateOptions::direct()).await;

        self.recover_running_tasks().await;
        self.check_progress().await;
    }

    // ===== Directory browsing =====

    /// Load `path`; returns whether the listing was applied
    pub async fn navigate(&self, path: &str, options: NavigateOptions) -> bool {
        let ticket = self.state.browser.write().begin_navigation(path, options);
        self.load_listing(ticket).await
    }

    async fn load_listing(&self, ticket: NavigationTicket) -> bool {
        let path = ticket.requested.as_str();
        let options = ticket.options;
        let hover_hidden = self.state.preview.lock().begin_navigation();
        if hover_hidden {
            self.emit(UiEvent::HoverHide);
        }

        tracing::debug!("Loading {} (auto_enter={})", path, options.auto_enter);
        let response = self.backend.get_files(path, options.auto_enter).await;

        match response {
            Ok(listing) => {
                let applied = self.state.browser.write().complete_navigation(&ticket, listing);
                if !applied {
                    return false;
                }

                let current = self.state.browser.read().current_path().to_string();
                if let Err(e) = self.state.session.lock().remember_path(&current) {
                    tracing::warn!("Failed to persist last path: {}", e);
                }

                self.emit(UiEvent::Listing(self.listing_view()));
                true
            }
            Err(e) => {
                let current = self.state.browser.read().fail_navigation(&ticket);
                if current {
                    self.report(Operation::LoadFiles, e.into());
                }
                false
            }
        }
    }

    pub async fn back(&self) -> bool {
        let ticket = self.state.browser.write().begin_back();
        match ticket {
            Some(ticket) => self.load_listing(ticket).await,
            None => {
                tracing::debug!("Already at base directory");
                false
            }
        }
    }

    pub async fn forward(&self) -> bool {
        let ticket = self.state.browser.write().begin_forward();
        match ticket {
            Some(ticket) => self.load_listing(ticket).await,
            None => false,
        }
    }

    /// Reload the current directory without touching history
    pub async fn refresh(&self) -> bool {
        let current = self.state.browser.read().current_path().to_string();
        self.navigate(&current, NavigateOptions::history()).await
    }

    /// Click on the row at `index`
    pub async fn activate(&self, index: usize) {
        let action = self.state.browser.read().activate(index);
        match action {
            Some(EntryAction::Back) => {
                self.back().await;
            }
            Some(EntryAction::Enter(path)) => {
                self.navigate(&path, NavigateOptions::enter()).await;
            }
            Some(EntryAction::Preview(path)) => self.open_preview(&path).await,
            None => tracing::debug!("No row at {}", index),
        }
    }

    pub fn record_scroll(&self, offset: f32) {
        self.state.browser.write().record_scroll(offset);
    }

    pub fn listing_view(&self) -> BrowserView {
        let browser = self.state.browser.read();
        let selection = self.state.selection.read();
        browser.view(&selection)
    }

    // ===== Selection =====

    pub fn selection_items(&self) -> Vec<SelectionItem> {
        let browser = self.state.browser.read();
        let selection = self.state.selection.read();
        selection.items(browser.entries())
    }

    fn emit_selection(&self) {
        let items = self.selection_items();
        let actions_enabled = !items.is_empty();
        self.emit(UiEvent::Selection {
            items,
            actions_enabled,
        });
    }

    pub fn toggle_selection(&self, path: &str, checked: bool) {
        let changed = self.state.selection.write().toggle(path, checked);
        if changed {
            self.emit_selection();
        }
    }

    pub fn select_all(&self) {
        let added = {
            let browser = self.state.browser.read();
            let mut selection = self.state.selection.write();
            selection.select_all(browser.entries())
        };

        if added == 0 {
            self.toast(Message::NoFilesToSelect);
        } else {
            self.toast(Message::SelectedFiles { count: added });
        }
        self.emit_selection();
    }

    pub fn clear_selection(&self) {
        self.state.selection.write().clear();
        self.emit_selection();
    }

    pub fn remove_from_selection(&self, path: &str) {
        let changed = self.state.selection.write().remove(path);
        if changed {
            self.emit_selection();
        }
    }

    fn selected_paths(&self) -> Result<Vec<String>> {
        let paths = self.state.selection.read().paths().to_vec();
        if paths.is_empty() {
            return Err(AppError::NothingSelected);
        }
        Ok(paths)
    }

    // ===== Batch operations =====

    pub async fn compress(&self, options: CompressOptions) {
        let selected_paths = match self.selected_paths() {
            Ok(paths) => paths,
            Err(e) => return self.report(Operation::Compress, e),
        };
        let count = selected_paths.len();
        let request = CompressRequest {
            selected_paths,
            quality: options.quality,
            min_size: options.min_size,
            max_workers: options.max_workers,
        };

        tracing::info!("Submitting compression of {} paths", count);
        match self.backend.compress_images(&request).await {
            Ok(_) => self.batch_accepted(count).await,
            Err(e) => self.report(Operation::Compress, e.into()),
        }
    }

    pub async fn convert(&self, options: ConvertOptions) {
        let selected_paths = match self.selected_paths() {
            Ok(paths) => paths,
            Err(e) => return self.report(Operation::Convert, e),
        };
        let count = selected_paths.len();
        let request = ConvertRequest {
            selected_paths,
            target_format: options.target_format,
            quality: options.quality,
            max_workers: options.max_workers,
            skip_pdf: options.skip_pdf,
        };

        tracing::info!("Submitting conversion of {} paths to {}", count, request.target_format);
        match self.backend.convert_images(&request).await {
            Ok(_) => self.batch_accepted(count).await,
            Err(e) => self.report(Operation::Convert, e.into()),
        }
    }

    async fn batch_accepted(&self, count: usize) {
        self.state.selection.write().clear();
        self.emit_selection();
        self.toast(Message::BatchAccepted { count });

        self.check_progress().await;

        let (token, burst) = {
            let config = self.state.config.read();
            let burst = QuickPoll::new(
                config.polling.quick_poll_interval(),
                config.polling.quick_poll_attempts,
            );
            (self.state.monitor.lock().begin_burst(), burst)
        };
        spawn_local(self.clone().quick_poll(token, burst));
    }

    async fn quick_poll(self, token: BurstToken, mut burst: QuickPoll) {
        loop {
            tokio::time::sleep(burst.interval()).await;
            if !self.state.monitor.lock().burst_is_current(token) {
                return;
            }

            let total = self.check_progress().await.map_or(0, |s| s.total);
            if !burst.record(total) {
                break;
            }
        }

        self.state.monitor.lock().end_burst(token);
        tracing::info!("Quick poll finished after {} attempts", burst.attempts());
    }

    /// One `/get_progress` round trip folded into the monitor
    pub async fn check_progress(&self) -> Option<ProgressState> {
        match self.backend.get_progress().await {
            Ok(progress) => {
                self.apply_progress(&progress);
                Some(progress)
            }
            Err(e) => {
                tracing::error!("Failed to get progress: {}", e);
                None
            }
        }
    }

    fn apply_progress(&self, progress: &ProgressState) {
        let update = self.state.monitor.lock().apply(progress);
        self.emit(UiEvent::Progress(update.view));
        self.apply_effects(update.effects);
    }

    fn apply_effects(&self, effects: Vec<MonitorEffect>) {
        for effect in effects {
            match effect {
                MonitorEffect::StartTimer(token) => {
                    spawn_local(self.clone().progress_loop(token));
                }
                MonitorEffect::StopTimer => {}
                MonitorEffect::ProcessingActive(active) => {
                    let hidden = {
                        let mut preview = self.state.preview.lock();
                        let visible = preview.visible_hover().is_some();
                        preview.set_processing(active);
                        visible && active
                    };
                    if hidden {
                        self.emit(UiEvent::HoverHide);
                    }
                }
                MonitorEffect::Completed(summary) => {
                    tracing::info!(
                        "Batch completed: {}/{} in {:?}s",
                        summary.processed,
                        summary.total,
                        summary.elapsed_secs
                    );
                    self.emit(UiEvent::BatchCompleted(summary));
                }
                MonitorEffect::RefreshDirectory => {
                    let controller = self.clone();
                    spawn_local(async move {
                        controller.refresh().await;
                    });
                }
            }
        }
    }

    async fn progress_loop(self, token: TimerToken) {
        let interval = self.state.monitor.lock().interval();
        loop {
            tokio::time::sleep(interval).await;
            if !self.state.monitor.lock().timer_is_current(token) {
                break;
            }
            self.check_progress().await;
        }
        tracing::debug!("Progress loop {:?} exited", token);
    }

    pub fn progress_view(&self) -> ProgressView {
        self.state.monitor.lock().view().clone()
    }

    /// Ask the server to stop the running batch
    pub async fn stop(&self) {
        let stoppable = {
            let monitor = self.state.monitor.lock();
            monitor.status() == ProgressStatus::Running && monitor.stop_control().enabled()
        };
        if !stoppable {
            tracing::debug!("Stop ignored: nothing running or a stop is pending");
            return;
        }

        if !self.confirmer.confirm(&ConfirmPrompt::StopProcessing).await {
            self.toast(Message::Cancelled);
            return;
        }

        let claimed = self.state.monitor.lock().request_stop();
        if !claimed {
            tracing::debug!("Stop ignored: state changed while confirming");
            return;
        }
        self.emit(UiEvent::Progress(self.progress_view()));
        self.toast(Message::StopRequested);

        match self.backend.stop_processing().await {
            Ok(_) => {
                self.state.monitor.lock().stop_succeeded();
                self.toast(Message::StopAccepted);
            }
            Err(e) => {
                self.state.monitor.lock().stop_failed();
                self.report(Operation::Stop, e.into());
            }
        }
        self.emit(UiEvent::Progress(self.progress_view()));
    }

    /// Close the progress panel and clear the server's progress record
    pub async fn close_progress(&self) {
        match self.backend.reset_progress().await {
            Ok(_) => {
                let effects = self.state.monitor.lock().reset();
                self.apply_effects(effects);
                self.emit(UiEvent::ProgressClosed);
            }
            Err(e) => self.report(Operation::ResetProgress, e.into()),
        }
    }

    // ===== Server-side tasks =====

    /// Submit `request` for the current selection and poll it to the end
    pub async fn run_task(&self, request: TaskRequest) {
        let selected_paths = match self.selected_paths() {
            Ok(paths) => paths,
            Err(e) => return self.report(Operation::SubmitTask, e),
        };

        if let Some(prompt) = request.prompt(selected_paths.len()) {
            if !self.confirmer.confirm(&prompt).await {
                self.toast(Message::Cancelled);
                return;
            }
        }

        *self.state.task_form.write() = request.form(selected_paths.clone());

        let submitted = match &request {
            TaskRequest::CountFormats => self.backend.count_formats(&selected_paths).await,
            TaskRequest::FixExtensions => self.backend.fix_extensions(&selected_paths).await,
            TaskRequest::CleanEmptyFolders => self.backend.clean_empty_folders(&selected_paths).await,
            TaskRequest::Search {
                pattern,
                is_regex,
                case_sensitive,
            } => {
                let search = SearchRequest {
                    selected_paths,
                    pattern: pattern.clone(),
                    is_regex: *is_regex,
                    case_sensitive: *case_sensitive,
                };
                self.backend.search_files(&search).await
            }
            TaskRequest::DeleteByFormat { format } => {
                let delete = DeleteByFormatRequest {
                    selected_paths,
                    format: format.clone(),
                };
                self.backend.delete_files_by_format(&delete).await
            }
        };

        match submitted {
            Ok(submitted) => {
                let task_type = match submitted.task_type {
                    TaskType::Unknown => request.task_type(),
                    known => known,
                };
                self.start_polling(&submitted.task_id, task_type);
            }
            Err(e) => self.report(Operation::SubmitTask, e.into()),
        }
    }

    fn start_polling(&self, task_id: &str, task_type: TaskType) -> SessionToken {
        let token = self.state.poller.lock().start(task_id, task_type);
        self.emit(UiEvent::TaskStarted {
            task_id: task_id.to_string(),
            task_type,
        });
        spawn_local(self.clone().poll_task(token));
        token
    }

    async fn poll_task(self, token: SessionToken) {
        loop {
            let Some(task_id) = self.state.poller.lock().begin_request(token) else {
                return;
            };

            let response = self.backend.get_task_status(&task_id).await;
            let step = self.state.poller.lock().on_response(token, response);

            match step {
                PollStep::Continue(delay) => {
                    tracing::debug!("Task {} still running", task_id);
                    tokio::time::sleep(delay).await;
                }
                PollStep::Terminal(outcome) => {
                    self.finish_task(outcome).await;
                    return;
                }
                PollStep::Discarded => return,
            }
        }
    }

    async fn finish_task(&self, outcome: TaskOutcome) {
        if matches!(outcome.status, TerminalStatus::Failed | TerminalStatus::Error) {
            self.alert(Message::TaskFailed {
                task_type: outcome.task_type,
                error: outcome.error.clone().unwrap_or_default(),
            });
        }

        self.emit(UiEvent::TaskFinished(render::task_result(&outcome)));

        if outcome.succeeded() && outcome.task_type.mutates_files() {
            self.refresh().await;
        }
    }

    /// Resume polling a task that was running before this session started
    pub async fn recover_running_tasks(&self) {
        let running = match self.backend.get_running_tasks().await {
            Ok(running) => running,
            Err(e) => {
                tracing::warn!("Failed to query running tasks: {}", e);
                return;
            }
        };

        let found = running.tasks.into_iter().find(|t| {
            t.status == TaskStatus::Running && t.task_type != TaskType::Unknown && t.id.is_some()
        });
        let Some(task) = found else {
            return;
        };
        let Some(task_id) = task.id.clone() else {
            return;
        };

        tracing::info!("Recovering running task {} ({})", task_id, task.task_type.as_str());
        let form = form_from_task(&task);
        *self.state.task_form.write() = form.clone();
        self.emit(UiEvent::TaskFormRestored(form));
        self.toast(Message::TaskRecovered {
            task_type: task.task_type,
        });
        self.start_polling(&task_id, task.task_type);
    }

    // ===== Single files =====

    pub async fn delete_file(&self, file_path: &str) {
        let name = path::filename_of(file_path).to_string();
        if !self
            .confirmer
            .confirm(&ConfirmPrompt::DeleteFile { name: name.clone() })
            .await
        {
            self.toast(Message::Cancelled);
            return;
        }

        match self.backend.delete_file(file_path).await {
            Ok(_) => {
                tracing::info!("Deleted {}", file_path);
                self.remove_from_selection(file_path);
                self.toast(Message::FileDeleted { name });
                self.refresh().await;
            }
            Err(e) => self.report(Operation::DeleteFile, e.into()),
        }
    }

    // ===== Preview =====

    /// Click on a file: modal preview, or a download for non-previewable types
    pub async fn open_preview(&self, file_path: &str) {
        let request = self.state.preview.lock().open_modal(file_path);
        self.emit(UiEvent::HoverHide);

        match request {
            ModalRequest::Download(url) => {
                let name = path::filename_of(file_path).to_string();
                self.toast(Message::DownloadStarted { name: name.clone() });
                self.emit(UiEvent::Download { url, name });
            }
            ModalRequest::Load { path, source } => {
                let response = self.backend.preview_image(&path).await;
                match response {
                    Ok(info) => {
                        let current = self.state.preview.lock().modal_loaded(&path, true);
                        if current {
                            let view = render::preview_info(&path, &info);
                            *self.state.preview_gps.write() = view.gps;
                            self.emit(UiEvent::ModalPreview { info: view, source });
                        }
                    }
                    Err(e) => {
                        let current = self.state.preview.lock().modal_loaded(&path, false);
                        if current {
                            self.report(Operation::Preview, e.into());
                        }
                    }
                }
            }
        }
    }

    pub fn close_preview(&self) {
        self.state.preview.lock().close_modal();
        *self.state.preview_gps.write() = None;
        self.emit(UiEvent::ModalClosed);
    }

    /// Pointer entered a file row
    pub fn hover_enter(&self, file_path: &str) {
        let armed = self.state.preview.lock().pointer_enter(file_path);
        if let Some((token, delay)) = armed {
            let controller = self.clone();
            spawn_local(async move {
                tokio::time::sleep(delay).await;
                let show = controller.state.preview.lock().hover_elapsed(token);
                if let Some(show) = show {
                    controller.emit(UiEvent::HoverShow(show));
                }
            });
        }
    }

    pub fn hover_leave(&self) {
        let hidden = self.state.preview.lock().pointer_leave();
        if hidden {
            self.emit(UiEvent::HoverHide);
        }
    }

    pub fn hover_move(&self, x: f32, y: f32) {
        let moved = self.state.preview.lock().pointer_move(x, y);
        if let Some((x, y)) = moved {
            self.emit(UiEvent::HoverMove { x, y });
        }
    }

    /// Resolve an address for explicit coordinates
    pub async fn lookup_address(&self, lat: f64, lon: f64) {
        match self.backend.get_address_from_coords(lat, lon).await {
            Ok(address) => self.emit(UiEvent::Address { address }),
            Err(e) => self.report(Operation::LookupAddress, e.into()),
        }
    }

    /// Resolve the address of the open preview's GPS position
    pub async fn lookup_preview_address(&self) {
        let gps = *self.state.preview_gps.read();
        match gps {
            Some(gps) => self.lookup_address(gps.lat, gps.lon).await,
            None => self.toast(Message::NoGpsData),
        }
    }

    /// Report invalid user input
    pub fn invalid_input(&self, detail: String) {
        self.toast(Message::InvalidInput { detail });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_request_prompts() {
        assert_eq!(TaskRequest::CountFormats.prompt(3), None);
        assert_eq!(
            TaskRequest::FixExtensions.prompt(3),
            Some(ConfirmPrompt::FixExtensions { count: 3 })
        );
        assert_eq!(
            TaskRequest::DeleteByFormat { format: "png".into() }.task_type(),
            TaskType::DeleteFilesByFormat
        );
    }

    #[test]
    fn test_form_from_search_task() {
        let task: Task = serde_json::from_value(json!({
            "id": "t9",
            "type": "search_files",
            "status": "running",
            "params": {"selected_paths": ["/data/a"], "pattern": "cat", "is_regex": true}
        }))
        .unwrap();

        let form = form_from_task(&task);
        assert_eq!(form.task_type, TaskType::SearchFiles);
        assert_eq!(form.selected_paths, ["/data/a"]);
        assert_eq!(form.pattern.as_deref(), Some("cat"));
        assert!(form.is_regex);
        assert!(!form.case_sensitive);
    }

    #[test]
    fn test_form_from_delete_task() {
        let task: Task = serde_json::from_value(json!({
            "id": "t2",
            "type": "delete_files_by_format",
            "status": "running",
            "params": {"selected_paths": ["/data"], "format": "bmp"}
        }))
        .unwrap();

        let form = form_from_task(&task);
        assert_eq!(form.format.as_deref(), Some("bmp"));
    }
}
