mod common;

use app_core::render::TaskResultView;
use app_core::{ConfirmPrompt, Message, Notice, TaskRequest, UiEvent};
use app_proto::TaskType;
use common::{advance, task, Harness, MockBackend};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::LocalSet;

fn backend() -> Arc<MockBackend> {
    let backend = MockBackend::new();
    backend.add_dir("/data", &[("a", true), ("b", true)]);
    backend
}

fn finished(events: &[UiEvent]) -> Vec<TaskResultView> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::TaskFinished(view) => Some(view.clone()),
            _ => None,
        })
        .collect()
}

async fn ready(confirm: bool) -> Harness {
    let mut h = Harness::new(backend(), confirm);
    h.controller.startup().await;
    h.controller.toggle_selection("/data/a", true);
    h.drain();
    h.backend.calls.lock().clear();
    h
}

#[tokio::test(start_paused = true)]
async fn test_superseded_poll_is_discarded() {
    LocalSet::new()
        .run_until(async {
            let mut h = ready(true).await;
            h.backend
                .task_delays
                .lock()
                .insert("t1".into(), Duration::from_secs(2));
            h.backend.script_task(
                "t1",
                vec![task("t1", "count_formats", "completed", json!({"total_files": 9}))],
            );
            h.backend.script_task(
                "t2",
                vec![task(
                    "t2",
                    "search_files",
                    "completed",
                    json!({"matches": [{"path": "/data/a/cat.jpg"}]}),
                )],
            );

            h.controller.run_task(TaskRequest::CountFormats).await;
            advance(Duration::from_millis(10)).await;
            h.controller
                .run_task(TaskRequest::Search {
                    pattern: "cat".into(),
                    is_regex: false,
                    case_sensitive: false,
                })
                .await;

            advance(Duration::from_secs(5)).await;

            let results = finished(&h.drain());
            assert_eq!(results.len(), 1);
            match &results[0] {
                TaskResultView::Search { matches, total } => {
                    assert_eq!(matches.len(), 1);
                    assert_eq!(*total, 1);
                }
                other => panic!("unexpected result {:?}", other),
            }
            assert_eq!(h.backend.calls_to("get_task_status t1").len(), 1);
            assert!(!h.controller.state().poller.lock().is_polling());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_mutating_task_polls_then_refreshes() {
    LocalSet::new()
        .run_until(async {
            let mut h = ready(true).await;
            h.backend.script_task(
                "t1",
                vec![
                    task("t1", "fix_extensions", "running", json!(null)),
                    task("t1", "fix_extensions", "running", json!(null)),
                    task("t1", "fix_extensions", "completed", json!({"processed": 3})),
                ],
            );

            h.controller.run_task(TaskRequest::FixExtensions).await;
            assert_eq!(
                *h.confirmer.asked.lock(),
                [ConfirmPrompt::FixExtensions { count: 1 }]
            );

            advance(Duration::from_millis(600)).await;
            assert_eq!(h.backend.calls_to("get_task_status").len(), 2);

            advance(Duration::from_secs(2)).await;
            assert_eq!(h.backend.calls_to("get_task_status").len(), 3);

            let events = h.drain();
            assert!(events.contains(&UiEvent::TaskStarted {
                task_id: "t1".into(),
                task_type: TaskType::FixExtensions,
            }));
            assert_eq!(
                finished(&events),
                [TaskResultView::FixExtensions {
                    processed: 3,
                    failed_files: vec![],
                }]
            );
            assert_eq!(h.backend.calls_to("get_files"), ["get_files /data false"]);

            // Selection survives task submission
            assert_eq!(h.controller.state().selection.read().paths(), ["/data/a"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_task_alerts() {
    LocalSet::new()
        .run_until(async {
            let mut h = ready(true).await;
            let mut failed = task("t1", "clean_empty_folders", "failed", json!(null));
            failed.error = Some("permission denied".into());
            h.backend.script_task("t1", vec![failed]);

            h.controller.run_task(TaskRequest::CleanEmptyFolders).await;
            advance(Duration::from_secs(1)).await;

            let events = h.drain();
            assert!(events.contains(&UiEvent::Notice(Notice::modal(Message::TaskFailed {
                task_type: TaskType::CleanEmptyFolders,
                error: "permission denied".into(),
            }))));
            assert_eq!(
                finished(&events),
                [TaskResultView::Failed {
                    task_type: TaskType::CleanEmptyFolders,
                    error: "permission denied".into(),
                }]
            );
            assert!(h.backend.calls_to("get_files").is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_forgotten_task_finishes_empty() {
    LocalSet::new()
        .run_until(async {
            let mut h = ready(true).await;

            h.controller.run_task(TaskRequest::CountFormats).await;
            advance(Duration::from_secs(1)).await;

            assert_eq!(
                finished(&h.drain()),
                [TaskResultView::Empty {
                    task_type: TaskType::CountFormats,
                }]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_declined_delete_by_format_not_submitted() {
    LocalSet::new()
        .run_until(async {
            let mut h = ready(false).await;

            h.controller
                .run_task(TaskRequest::DeleteByFormat { format: "bmp".into() })
                .await;

            assert!(h.backend.calls_to("submit").is_empty());
            assert_eq!(
                *h.confirmer.asked.lock(),
                [ConfirmPrompt::DeleteByFormat {
                    format: "bmp".into(),
                    count: 1,
                }]
            );
            assert_eq!(h.drain(), [UiEvent::Notice(Notice::toast(Message::Cancelled))]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_running_task_recovered_on_startup() {
    LocalSet::new()
        .run_until(async {
            let backend = backend();
            let running: app_proto::Task = serde_json::from_value(json!({
                "id": "t7",
                "type": "search_files",
                "status": "running",
                "params": {"selected_paths": ["/data/b"], "pattern": "IMG_", "case_sensitive": true}
            }))
            .unwrap();
            backend.running.lock().push(running);
            backend.script_task(
                "t7",
                vec![task("t7", "search_files", "completed", json!({"matches": [], "total": 0}))],
            );

            let mut h = Harness::new(backend, true);
            h.controller.startup().await;
            advance(Duration::from_secs(1)).await;

            let events = h.drain();
            let form = events.iter().find_map(|e| match e {
                UiEvent::TaskFormRestored(form) => Some(form.clone()),
                _ => None,
            });
            let form = form.expect("form restored");
            assert_eq!(form.selected_paths, ["/data/b"]);
            assert_eq!(form.pattern.as_deref(), Some("IMG_"));
            assert!(form.case_sensitive);

            assert!(events.contains(&UiEvent::Notice(Notice::toast(Message::TaskRecovered {
                task_type: TaskType::SearchFiles,
            }))));
            assert_eq!(
                finished(&events),
                [TaskResultView::Search {
                    matches: vec![],
                    total: 0,
                }]
            );
            // Recovery does not touch the selection
            assert!(h.controller.state().selection.read().is_empty());
        })
        .await;
}
