mod common;

use app_core::{Message, NavigateOptions, Operation, SessionStore, Severity, UiEvent};
use common::{advance, Harness, MockBackend};
use std::time::Duration;
use tokio::task::{spawn_local, LocalSet};

fn backend_with_tree() -> std::sync::Arc<MockBackend> {
    let backend = MockBackend::new();
    backend.add_dir("/data", &[("a", true), ("b", true), ("cover.jpg", false)]);
    backend.add_dir("/data/a", &[("IMG_0001.jpg", false), ("scan.pdf", false)]);
    backend.add_dir("/data/b", &[]);
    backend
}

#[tokio::test(start_paused = true)]
async fn test_startup_loads_base_directory() {
    LocalSet::new()
        .run_until(async {
            let mut h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;

            let events = h.drain();
            let info = events.iter().find_map(|e| match e {
                UiEvent::ServerInfo(info) => Some(info.clone()),
                _ => None,
            });
            let info = info.expect("server info emitted");
            assert_eq!(info.base_dir, "/data");
            assert_eq!(info.cpu_count, 8);
            assert_eq!(info.default_workers, 5);
            assert_eq!(info.version.as_deref(), Some("1.4.0"));

            let listing = events.iter().find_map(|e| match e {
                UiEvent::Listing(view) => Some(view.clone()),
                _ => None,
            });
            let listing = listing.expect("listing emitted");
            assert_eq!(listing.current_path, "/data");
            assert_eq!(listing.rows.len(), 3);
            assert!(!listing.can_go_back);

            assert_eq!(h.backend.calls_to("get_files"), ["get_files /data false"]);
            assert_eq!(h.backend.calls_to("get_progress").len(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_falls_back_when_config_fails() {
    LocalSet::new()
        .run_until(async {
            let backend = backend_with_tree();
            *backend.config.lock() = None;
            let mut h = Harness::new(backend, true);
            h.controller.startup().await;

            let events = h.drain();
            assert!(events.iter().any(|e| matches!(
                e,
                UiEvent::Notice(n) if n.severity == Severity::Toast
                    && n.message == Message::ConfigFallback { base_dir: "/data".into() }
            )));
            assert_eq!(h.controller.state().cpu_count(), 4);
            assert_eq!(h.controller.state().browser.read().current_path(), "/data");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_restores_last_path() {
    LocalSet::new()
        .run_until(async {
            let mut session = SessionStore::in_memory();
            session.remember_path("/data/a").unwrap();

            let mut h = Harness::with_session(backend_with_tree(), true, session);
            h.controller.startup().await;

            assert_eq!(h.controller.state().browser.read().current_path(), "/data/a");
            assert!(h.drain().iter().any(|e| matches!(
                e,
                UiEvent::Notice(n) if n.message == Message::LastPathRestored { path: "/data/a".into() }
            )));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_listing_is_dropped() {
    LocalSet::new()
        .run_until(async {
            let backend = backend_with_tree();
            backend
                .listing_delays
                .lock()
                .insert("/data/a".into(), Duration::from_secs(2));
            let mut h = Harness::new(backend, true);
            h.controller.startup().await;
            h.drain();

            let slow = h.controller.clone();
            let handle = spawn_local(async move {
                slow.navigate("/data/a", NavigateOptions::enter()).await
            });
            advance(Duration::from_millis(10)).await;

            assert!(h.controller.navigate("/data/b", NavigateOptions::enter()).await);
            assert!(!handle.await.unwrap());

            let state = h.controller.state();
            assert_eq!(state.browser.read().current_path(), "/data/b");
            assert_eq!(state.browser.read().history().entries(), ["/data", "/data/b"]);

            let listings: Vec<_> = h
                .drain()
                .into_iter()
                .filter_map(|e| match e {
                    UiEvent::Listing(view) => Some(view.current_path),
                    _ => None,
                })
                .collect();
            assert_eq!(listings, ["/data/b"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_back_and_forward_reuse_history() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;

            h.controller.activate(0).await;
            assert_eq!(h.controller.state().browser.read().current_path(), "/data/a");

            assert!(h.controller.back().await);
            assert_eq!(h.controller.state().browser.read().current_path(), "/data");

            assert!(h.controller.forward().await);
            assert_eq!(h.controller.state().browser.read().current_path(), "/data/a");

            assert_eq!(
                h.backend.calls_to("get_files"),
                [
                    "get_files /data false",
                    "get_files /data/a true",
                    "get_files /data false",
                    "get_files /data/a false",
                ]
            );
            assert_eq!(
                h.controller.state().browser.read().history().entries(),
                ["/data", "/data/a"]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_listing_reports_and_keeps_directory() {
    LocalSet::new()
        .run_until(async {
            let mut h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;
            h.drain();

            assert!(!h.controller.navigate("/data/missing", NavigateOptions::direct()).await);
            assert_eq!(h.controller.state().browser.read().current_path(), "/data");

            let events = h.drain();
            assert_eq!(
                events,
                [UiEvent::Notice(app_core::Notice::modal(Message::OperationFailed {
                    operation: Operation::LoadFiles,
                    detail: "Directory not found: /data/missing".into(),
                }))]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_select_all_and_clear() {
    LocalSet::new()
        .run_until(async {
            let mut h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;
            h.drain();

            h.controller.select_all();
            assert_eq!(h.controller.selection_items().len(), 1);

            h.controller.select_all();
            let events = h.drain();
            assert!(events.iter().any(|e| matches!(
                e,
                UiEvent::Notice(n) if n.message == Message::SelectedFiles { count: 1 }
            )));
            assert!(events.iter().any(|e| matches!(
                e,
                UiEvent::Notice(n) if n.message == Message::NoFilesToSelect
            )));

            h.controller.clear_selection();
            assert!(matches!(
                h.drain().last(),
                Some(UiEvent::Selection { items, actions_enabled: false }) if items.is_empty()
            ));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_offset_restored_on_back() {
    LocalSet::new()
        .run_until(async {
            let mut h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;
            h.controller.record_scroll(120.0);

            assert!(h.controller.navigate("/data/a", NavigateOptions::direct()).await);
            assert_eq!(h.controller.listing_view().scroll_offset, 0.0);

            assert!(h.controller.back().await);
            assert_eq!(h.controller.listing_view().current_path, "/data");
            assert_eq!(h.controller.listing_view().scroll_offset, 120.0);
            h.drain();
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_remove_from_selection() {
    LocalSet::new()
        .run_until(async {
            let mut h = Harness::new(backend_with_tree(), true);
            h.controller.startup().await;
            h.controller.toggle_selection("/data/cover.jpg", true);
            h.controller.toggle_selection("/data/a", true);
            h.drain();

            h.controller.remove_from_selection("/data/cover.jpg");
            let items = h.controller.selection_items();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].path, "/data/a");
            assert!(matches!(
                h.drain().as_slice(),
                [UiEvent::Selection { actions_enabled: true, .. }]
            ));

            // Unknown paths change nothing and emit nothing
            h.controller.remove_from_selection("/data/missing.jpg");
            assert!(h.drain().is_empty());
        })
        .await;
}

async fn visit_a_then_b(h: &Harness) {
    h.controller.startup().await;
    assert!(h.controller.navigate("/data/a", NavigateOptions::direct()).await);
    assert!(h.controller.navigate("/data/b", NavigateOptions::direct()).await);
}

#[tokio::test(start_paused = true)]
async fn test_failed_back_keeps_history() {
    LocalSet::new()
        .run_until(async {
            let backend = backend_with_tree();
            let mut h = Harness::new(backend.clone(), true);
            visit_a_then_b(&h).await;

            let a_listing = backend.listings.lock().remove("/data/a").unwrap();
            assert!(!h.controller.back().await);
            {
                let browser = h.controller.state().browser.read();
                assert_eq!(browser.current_path(), "/data/b");
                assert_eq!(browser.history().entries(), ["/data", "/data/a", "/data/b"]);
                assert_eq!(browser.history().index(), 2);
            }

            backend.listings.lock().insert("/data/a".into(), a_listing);
            assert!(h.controller.back().await);
            let browser = h.controller.state().browser.read();
            assert_eq!(browser.current_path(), "/data/a");
            assert_eq!(browser.history().index(), 1);
            drop(browser);
            h.drain();
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_superseded_back_keeps_history() {
    LocalSet::new()
        .run_until(async {
            let backend = backend_with_tree();
            let mut h = Harness::new(backend.clone(), true);
            visit_a_then_b(&h).await;
            backend
                .listing_delays
                .lock()
                .insert("/data/a".into(), Duration::from_secs(2));

            let slow = h.controller.clone();
            let handle = spawn_local(async move { slow.back().await });
            advance(Duration::from_millis(10)).await;

            assert!(h.controller.refresh().await);
            assert!(!handle.await.unwrap());

            let browser = h.controller.state().browser.read();
            assert_eq!(browser.current_path(), "/data/b");
            assert_eq!(browser.history().index(), 2);
            drop(browser);
            h.drain();
        })
        .await;
}
