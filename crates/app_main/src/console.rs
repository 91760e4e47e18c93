//! Console rendering of controller events, and the stdin-backed confirmer

use app_core::event::task_type_key;
use app_core::render::{format_file_size, BatchSummary, FormatStatsView};
use app_core::{
    t, BrowserView, ConfirmPrompt, Confirmer, I18n, ProgressView, SelectionItem, Severity,
    TaskResultView, UiEvent,
};
use app_net::Backend;
use app_proto::{FileIssue, ProgressStatus, TaskType};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Mutex;
use tokio::task::spawn_local;

/// Lines typed on stdin, shared by the command loop and confirmation prompts
pub struct LineSource {
    lines: Mutex<UnboundedReceiver<String>>,
}

impl LineSource {
    /// Start reading stdin on a local task
    pub fn spawn_stdin() -> Self {
        let (tx, rx) = unbounded_channel();
        spawn_local(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            tracing::debug!("stdin closed");
        });

        Self {
            lines: Mutex::new(rx),
        }
    }

    /// Next line, or `None` once stdin is closed
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }
}

/// Print without a newline and flush
pub fn prompt(text: &str) {
    print!("{}", text);
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("stdout flush failed: {}", e);
    }
}

/// Asks on the console; only `y`/`yes` proceeds
pub struct ConsoleConfirmer {
    i18n: Arc<I18n>,
    lines: Rc<LineSource>,
}

impl ConsoleConfirmer {
    pub fn new(i18n: Arc<I18n>, lines: Rc<LineSource>) -> Self {
        Self { i18n, lines }
    }
}

#[async_trait(?Send)]
impl Confirmer for ConsoleConfirmer {
    async fn confirm(&self, question: &ConfirmPrompt) -> bool {
        prompt(&format!("{} {} ", self.i18n.prompt(question), self.i18n.get("confirm-suffix")));

        let answer = self.lines.next_line().await.unwrap_or_default();
        let answer = answer.trim();
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }
}

fn task_name(i18n: &I18n, task_type: TaskType) -> String {
    i18n.get(task_type_key(task_type))
}

fn issue_lines(out: &mut Vec<String>, issues: &[FileIssue]) {
    for issue in issues {
        match &issue.reason {
            Some(reason) => out.push(format!("    {}: {}", issue.path, reason)),
            None => out.push(format!("    {}", issue.path)),
        }
    }
}

pub fn render_listing(i18n: &I18n, view: &BrowserView) -> String {
    let mut out = vec![t!(i18n, "listing-header", path = view.current_path.as_str())];

    if view.rows.is_empty() {
        out.push(format!("  {}", i18n.get("listing-empty")));
    }

    for (index, row) in view.rows.iter().enumerate() {
        if row.is_parent_link {
            out.push(format!("  [{:>3}]     {}", index, i18n.get("listing-parent")));
            continue;
        }

        let check = if row.checked { "[x]" } else { "[ ]" };
        let line = match row.size {
            _ if row.kind == app_proto::EntryKind::Dir => format!("{}/", row.name),
            Some(size) => format!("{}  {}", row.name, format_file_size(size as f64)),
            None => row.name.clone(),
        };
        out.push(format!("  [{:>3}] {} {}", index, check, line));
    }

    out.join("\n")
}

pub fn render_selection(i18n: &I18n, items: &[SelectionItem]) -> String {
    if items.is_empty() {
        return i18n.get("selection-empty");
    }

    let mut out = vec![t!(i18n, "selection-header", count = items.len())];
    for item in items {
        let marker = if item.is_dir { "/" } else { "" };
        out.push(format!("  {}{}  ({})", item.filename, marker, item.path));
    }
    out.join("\n")
}

fn status_key(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::Idle => "progress-status-idle",
        ProgressStatus::Running => "progress-status-running",
        ProgressStatus::Completed => "progress-status-completed",
        ProgressStatus::Unknown => "progress-status-unknown",
    }
}

pub fn render_progress(i18n: &I18n, view: &ProgressView) -> String {
    let mut line = t!(
        i18n,
        "progress-line",
        status = i18n.get(status_key(view.status)),
        processed = view.processed,
        total = view.total,
        percent = format!("{:.1}", view.percent)
    );

    if view.status == ProgressStatus::Running {
        line.push_str(&format!("  [{}]", i18n.get(view.stop.label_key())));
    }
    if !view.current_file_label.is_empty() {
        line.push('\n');
        line.push_str(&t!(i18n, "progress-current", file = view.current_file_label.as_str()));
    }
    line
}

pub fn render_summary(i18n: &I18n, summary: &BatchSummary) -> String {
    let mut out = vec![
        i18n.get("summary-title"),
        t!(
            i18n,
            "summary-processed",
            processed = summary.processed,
            total = summary.total
        ),
    ];

    if let Some(seconds) = summary.elapsed_secs {
        out.push(t!(i18n, "summary-elapsed", seconds = seconds));
    }
    if summary.original_size > 0 {
        out.push(t!(
            i18n,
            "summary-size",
            original = summary.original_size_label(),
            reduced = summary.final_size_label(),
            ratio = summary.compression_ratio
        ));
    }
    if !summary.failed_files.is_empty() {
        out.push(t!(i18n, "summary-failed", count = summary.failed_files.len()));
        issue_lines(&mut out, &summary.failed_files);
    }
    if !summary.skipped_files.is_empty() {
        out.push(t!(i18n, "summary-skipped", count = summary.skipped_files.len()));
        issue_lines(&mut out, &summary.skipped_files);
    }
    if summary.ignored_count > 0 {
        out.push(t!(i18n, "summary-ignored", count = summary.ignored_count));
    }

    out.join("\n")
}

fn render_format_stats(i18n: &I18n, stats: &FormatStatsView) -> Vec<String> {
    let mut out = vec![t!(
        i18n,
        "result-format-header",
        files = stats.total_files,
        size = format_file_size(stats.total_size as f64)
    )];
    for row in &stats.rows {
        out.push(format!(
            "  {}",
            t!(
                i18n,
                "result-format-row",
                format = row.format.as_str(),
                count = row.count,
                size = format_file_size(row.total_size as f64),
                average = format_file_size(row.average_size)
            )
        ));
    }
    out
}

pub fn render_task_result(i18n: &I18n, view: &TaskResultView) -> String {
    let mut out = Vec::new();

    match view {
        TaskResultView::FormatStats(stats) => out.extend(render_format_stats(i18n, stats)),
        TaskResultView::FixExtensions {
            processed,
            failed_files,
        } => {
            out.push(t!(i18n, "result-fix-extensions", count = *processed));
            if !failed_files.is_empty() {
                out.push(t!(i18n, "result-failed-files", count = failed_files.len()));
                issue_lines(&mut out, failed_files);
            }
        }
        TaskResultView::CleanEmpty {
            removed_count,
            removed_folders,
            failed_files,
        } => {
            out.push(t!(i18n, "result-clean-empty", count = *removed_count));
            out.extend(removed_folders.iter().map(|f| format!("    {}", f)));
            if !failed_files.is_empty() {
                out.push(t!(i18n, "result-failed-files", count = failed_files.len()));
                issue_lines(&mut out, failed_files);
            }
        }
        TaskResultView::Search { matches, total } => {
            out.push(t!(i18n, "result-search", count = matches.len(), total = *total));
            for m in matches {
                let size = m.size.map(|s| format_file_size(s as f64)).unwrap_or_default();
                out.push(format!("    {}  {}", m.path, size).trim_end().to_string());
            }
        }
        TaskResultView::DeleteByFormat {
            deleted_count,
            deleted_size,
            failed_files,
        } => {
            out.push(t!(
                i18n,
                "result-delete-by-format",
                count = *deleted_count,
                size = format_file_size(*deleted_size as f64)
            ));
            if !failed_files.is_empty() {
                out.push(t!(i18n, "result-failed-files", count = failed_files.len()));
                issue_lines(&mut out, failed_files);
            }
        }
        // Already reported as a modal notice
        TaskResultView::Failed { .. } => {}
        TaskResultView::Empty { task_type } => {
            out.push(t!(i18n, "result-empty", task = task_name(i18n, *task_type)));
        }
    }

    out.join("\n")
}

/// Prints every controller event; downloads are fetched and saved here
pub struct Printer {
    i18n: Arc<I18n>,
    backend: Arc<dyn Backend>,
    download_dir: PathBuf,
}

impl Printer {
    pub fn new(i18n: Arc<I18n>, backend: Arc<dyn Backend>, download_dir: PathBuf) -> Self {
        Self {
            i18n,
            backend,
            download_dir,
        }
    }

    pub async fn run(self, mut events: UnboundedReceiver<UiEvent>) {
        while let Some(event) = events.recv().await {
            if let Some(text) = self.render(event) {
                println!("{}", text);
            }
        }
    }

    fn render(&self, event: UiEvent) -> Option<String> {
        let i18n = self.i18n.as_ref();

        let text = match event {
            UiEvent::ServerInfo(info) => {
                let mut text = t!(
                    i18n,
                    "app-server-info",
                    version = info.version.unwrap_or_else(|| "?".into()),
                    base = info.base_dir,
                    cpu = info.cpu_count,
                    workers = info.default_workers
                );
                if !info.formats.is_empty() {
                    text.push('\n');
                    text.push_str(&t!(i18n, "app-formats", formats = info.formats.join(", ")));
                }
                text
            }
            UiEvent::Listing(view) => render_listing(i18n, &view),
            UiEvent::Selection { items, .. } => render_selection(i18n, &items),
            UiEvent::Progress(view) if view.status == ProgressStatus::Idle => return None,
            UiEvent::Progress(view) => render_progress(i18n, &view),
            UiEvent::ProgressClosed => i18n.get("progress-closed"),
            UiEvent::BatchCompleted(summary) => render_summary(i18n, &summary),
            UiEvent::TaskStarted { task_id, task_type } => t!(
                i18n,
                "task-started",
                task = task_name(i18n, task_type),
                id = task_id
            ),
            UiEvent::TaskFinished(view) => {
                let text = render_task_result(i18n, &view);
                if text.is_empty() {
                    return None;
                }
                text
            }
            UiEvent::TaskFormRestored(form) => t!(
                i18n,
                "task-form-restored",
                task = task_name(i18n, form.task_type),
                count = form.selected_paths.len()
            ),
            UiEvent::HoverShow(show) => t!(
                i18n,
                "preview-hover",
                name = app_core::path::filename_of(&show.path),
                url = show.source.url_path()
            ),
            UiEvent::HoverMove { x, y } => {
                tracing::trace!("Hover at {}, {}", x, y);
                return None;
            }
            UiEvent::HoverHide => {
                tracing::debug!("Hover hidden");
                return None;
            }
            UiEvent::ModalPreview { info, source } => {
                let mut out = vec![
                    t!(
                        i18n,
                        "preview-modal",
                        name = info.filename.as_str(),
                        width = info.width,
                        height = info.height,
                        format = info.format.as_str(),
                        size = info.size_label.as_str()
                    ),
                    t!(i18n, "preview-source", url = source.url_path()),
                ];
                out.extend(info.exif.iter().map(|(k, v)| format!("  {}: {}", k, v)));
                if let Some(gps) = info.gps {
                    out.push(t!(i18n, "preview-gps", lat = gps.lat, lon = gps.lon));
                }
                out.join("\n")
            }
            UiEvent::ModalClosed => i18n.get("preview-closed"),
            UiEvent::Download { url, name } => {
                spawn_local(download(
                    self.i18n.clone(),
                    self.backend.clone(),
                    url,
                    self.download_dir.join(&name),
                    name,
                ));
                return None;
            }
            UiEvent::Address { address } => t!(i18n, "preview-address", address = address),
            UiEvent::Notice(notice) => {
                let text = i18n.message(&notice.message);
                match notice.severity {
                    Severity::Modal => format!("!! {}", text),
                    Severity::Toast => format!("-- {}", text),
                }
            }
        };

        Some(text)
    }
}

async fn download(i18n: Arc<I18n>, backend: Arc<dyn Backend>, url: String, target: PathBuf, name: String) {
    let saved = match backend.fetch_bytes(&url).await {
        Ok(bytes) => tokio::fs::write(&target, bytes).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.user_message()),
    };

    match saved {
        Ok(()) => {
            tracing::info!("Saved {} to {:?}", url, target);
            println!(
                "{}",
                t!(i18n, "download-saved", name = name, path = target.display().to_string())
            );
        }
        Err(detail) => {
            tracing::error!("Download of {} failed: {}", url, detail);
            println!("{}", t!(i18n, "download-failed", name = name, detail = detail));
        }
    }
}
