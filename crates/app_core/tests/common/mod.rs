//! Scripted backend and helpers shared by the controller tests

#![allow(dead_code)]

use app_core::{
    AppConfig, AppState, ConfirmPrompt, Confirmer, Controller, SessionStore, UiEvent,
};
use app_net::{Backend, NetError, Result};
use app_proto::{
    Ack, CompressRequest, ConvertRequest, DeleteByFormatRequest, Listing, PreviewInfo,
    ProgressState, RunningTasks, SearchRequest, ServerConfig, SupportedFormats, Task,
    TaskSubmitted, TaskType, VersionInfo,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Queue that keeps answering with its last element once drained
#[derive(Debug)]
pub struct Script<T: Clone> {
    items: VecDeque<T>,
}

impl<T: Clone> Default for Script<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: Clone> Script<T> {
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    fn next(&mut self) -> Option<T> {
        if self.items.len() > 1 {
            self.items.pop_front()
        } else {
            self.items.front().cloned()
        }
    }
}

/// In-memory image server
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<String>>,
    pub config: Mutex<Option<ServerConfig>>,
    pub listings: Mutex<HashMap<String, Listing>>,
    pub listing_delays: Mutex<HashMap<String, Duration>>,
    pub progress: Mutex<Script<ProgressState>>,
    pub stop_error: Mutex<Option<NetError>>,
    pub task_statuses: Mutex<HashMap<String, Script<Task>>>,
    pub task_delays: Mutex<HashMap<String, Duration>>,
    pub running: Mutex<Vec<Task>>,
    pub compress_requests: Mutex<Vec<CompressRequest>>,
    next_task: Mutex<u32>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.config.lock() = Some(ServerConfig {
            base_dir: "/data".into(),
            cpu_count: 8,
        });
        Arc::new(backend)
    }

    pub fn add_dir(&self, path: &str, entries: &[(&str, bool)]) {
        let files = entries
            .iter()
            .map(|(name, is_dir)| {
                serde_json::from_value(json!({
                    "name": name,
                    "path": format!("{}/{}", path, name),
                    "type": if *is_dir { "dir" } else { "file" },
                    "size": if *is_dir { None } else { Some(2048) },
                }))
                .unwrap()
            })
            .collect();
        self.listings.lock().insert(
            path.to_string(),
            Listing {
                current_path: path.to_string(),
                files,
            },
        );
    }

    pub fn script_task(&self, task_id: &str, statuses: Vec<Task>) {
        let mut script = Script::default();
        for status in statuses {
            script.push(status);
        }
        self.task_statuses.lock().insert(task_id.to_string(), script);
    }

    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn submit(&self, task_type: TaskType) -> Result<TaskSubmitted> {
        let id = {
            let mut next = self.next_task.lock();
            *next += 1;
            format!("t{}", *next)
        };
        self.record(format!("submit {} {}", task_type.as_str(), id));
        Ok(TaskSubmitted {
            task_id: id,
            task_type,
        })
    }
}

pub fn task(id: &str, task_type: &str, status: &str, result: serde_json::Value) -> Task {
    serde_json::from_value(json!({
        "id": id,
        "type": task_type,
        "status": status,
        "result": result,
    }))
    .unwrap()
}

pub fn progress(status: &str, total: u64, processed: u64) -> ProgressState {
    let end_time = (status == "completed").then_some("2024-05-01T10:00:07.400000");
    serde_json::from_value(json!({
        "status": status,
        "total": total,
        "processed": processed,
        "current_file": "/data/a/IMG_0001.jpg",
        "task_type": "compress",
        "start_time": "2024-05-01T10:00:00.000000",
        "end_time": end_time,
        "original_size": 4096,
        "final_size": 1024,
    }))
    .unwrap()
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_config(&self) -> Result<ServerConfig> {
        self.record("get_config".into());
        let config = self.config.lock().clone();
        config.ok_or_else(|| NetError::Transport("connection refused".into()))
    }

    async fn get_supported_formats(&self) -> Result<SupportedFormats> {
        Ok(SupportedFormats {
            formats: vec!["jpeg".into(), "png".into(), "webp".into()],
        })
    }

    async fn get_version(&self) -> Result<VersionInfo> {
        Ok(serde_json::from_value(json!({"version": "1.4.0"})).unwrap())
    }

    async fn get_files(&self, path: &str, auto_enter: bool) -> Result<Listing> {
        self.record(format!("get_files {} {}", path, auto_enter));
        let delay = self.listing_delays.lock().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let listing = self.listings.lock().get(path).cloned();
        listing.ok_or_else(|| NetError::Application {
            status: 404,
            message: format!("Directory not found: {}", path),
        })
    }

    async fn preview_image(&self, path: &str) -> Result<PreviewInfo> {
        self.record(format!("preview_image {}", path));
        Ok(serde_json::from_value(json!({
            "width": 640,
            "height": 480,
            "format": "JPEG",
            "size": 2048,
            "exif": {"gps": {"lat": 35.0, "lon": 139.0}, "Model": "X100"},
        }))
        .unwrap())
    }

    async fn compress_images(&self, request: &CompressRequest) -> Result<Ack> {
        self.record("compress_images".into());
        self.compress_requests.lock().push(request.clone());
        Ok(Ack::default())
    }

    async fn convert_images(&self, _request: &ConvertRequest) -> Result<Ack> {
        self.record("convert_images".into());
        Ok(Ack::default())
    }

    async fn get_progress(&self) -> Result<ProgressState> {
        self.record("get_progress".into());
        Ok(self.progress.lock().next().unwrap_or_default())
    }

    async fn stop_processing(&self) -> Result<Ack> {
        self.record("stop_processing".into());
        match self.stop_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(Ack::default()),
        }
    }

    async fn reset_progress(&self) -> Result<Ack> {
        self.record("reset_progress".into());
        Ok(Ack::default())
    }

    async fn count_formats(&self, _selected_paths: &[String]) -> Result<TaskSubmitted> {
        self.submit(TaskType::CountFormats)
    }

    async fn fix_extensions(&self, _selected_paths: &[String]) -> Result<TaskSubmitted> {
        self.submit(TaskType::FixExtensions)
    }

    async fn clean_empty_folders(&self, _selected_paths: &[String]) -> Result<TaskSubmitted> {
        self.submit(TaskType::CleanEmptyFolders)
    }

    async fn search_files(&self, _request: &SearchRequest) -> Result<TaskSubmitted> {
        self.submit(TaskType::SearchFiles)
    }

    async fn delete_files_by_format(&self, _request: &DeleteByFormatRequest) -> Result<TaskSubmitted> {
        self.submit(TaskType::DeleteFilesByFormat)
    }

    async fn delete_file(&self, path: &str) -> Result<Ack> {
        self.record(format!("delete_file {}", path));
        Ok(Ack::default())
    }

    async fn get_task_status(&self, task_id: &str) -> Result<Task> {
        self.record(format!("get_task_status {}", task_id));
        let delay = self.task_delays.lock().get(task_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .task_statuses
            .lock()
            .get_mut(task_id)
            .and_then(|script| script.next());
        Ok(next.unwrap_or_else(|| Task::not_found(task_id)))
    }

    async fn get_running_tasks(&self) -> Result<RunningTasks> {
        Ok(RunningTasks {
            tasks: self.running.lock().clone(),
        })
    }

    async fn get_address_from_coords(&self, lat: f64, lon: f64) -> Result<String> {
        self.record(format!("address {} {}", lat, lon));
        Ok("Tokyo, Japan".into())
    }

    async fn fetch_bytes(&self, url_path: &str) -> Result<Vec<u8>> {
        self.record(format!("fetch {}", url_path));
        Ok(vec![0xff, 0xd8])
    }
}

/// Confirmer with a fixed answer that records what it was asked
pub struct ScriptedConfirmer {
    pub answer: bool,
    pub asked: Mutex<Vec<ConfirmPrompt>>,
}

#[async_trait(?Send)]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self.asked.lock().push(prompt.clone());
        self.answer
    }
}

pub struct Harness {
    pub controller: Controller,
    pub backend: Arc<MockBackend>,
    pub confirmer: Rc<ScriptedConfirmer>,
    pub events: UnboundedReceiver<UiEvent>,
}

impl Harness {
    pub fn new(backend: Arc<MockBackend>, confirm: bool) -> Self {
        Self::with_session(backend, confirm, SessionStore::in_memory())
    }

    pub fn with_session(backend: Arc<MockBackend>, confirm: bool, session: SessionStore) -> Self {
        let state = Arc::new(AppState::new(AppConfig::default(), session));
        let confirmer = Rc::new(ScriptedConfirmer {
            answer: confirm,
            asked: Mutex::new(Vec::new()),
        });
        let (tx, rx) = unbounded_channel();
        let controller = Controller::new(state, backend.clone(), confirmer.clone(), tx);
        Self {
            controller,
            backend,
            confirmer,
            events: rx,
        }
    }

    /// Everything emitted since the last drain
    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Let spawned tasks run for `duration` of (paused) time
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
