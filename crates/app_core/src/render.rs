//! Display models for finished tasks, finished batches, and previews
//!
//! Pure functions only; callers decide where the models go.

use crate::path;
use crate::task_poller::{TaskOutcome, TerminalStatus};
use app_proto::{
    CleanEmptyResult, DeleteByFormatResult, FileIssue, FixExtensionsResult, FormatCountResult,
    GpsCoords, PreviewInfo, ProgressState, SearchMatch, SearchResult, TaskType,
};
use chrono::{DateTime, NaiveDateTime};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human readable size: base 1024, up to two decimals, trailing zeros dropped
pub fn format_file_size(bytes: f64) -> String {
    if bytes <= 0.0 {
        return "0 Bytes".to_string();
    }

    let exponent = (bytes.ln() / 1024f64.ln()).floor().max(0.0) as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes / 1024f64.powi(exponent as i32);

    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, SIZE_UNITS[exponent])
}

/// Parse the server's ISO timestamps, with or without an offset
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

/// Whole seconds between two timestamps, rounded
pub fn elapsed_seconds(start: &str, end: &str) -> Option<i64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let millis = (end - start).num_milliseconds();
    Some((millis as f64 / 1000.0).round() as i64)
}

/// `round((1 - final/original) * 100)`, or 0 without an original size
pub fn compression_ratio(original_size: u64, final_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    ((1.0 - final_size as f64 / original_size as f64) * 100.0).round() as i64
}

/// Statistics of a finished compress/convert batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub task_type: Option<String>,
    pub total: u64,
    pub processed: u64,
    pub elapsed_secs: Option<i64>,
    pub original_size: u64,
    pub final_size: u64,
    pub compression_ratio: i64,
    pub failed_files: Vec<FileIssue>,
    pub skipped_files: Vec<FileIssue>,
    pub ignored_count: u64,
}

impl BatchSummary {
    pub fn original_size_label(&self) -> String {
        format_file_size(self.original_size as f64)
    }

    pub fn final_size_label(&self) -> String {
        format_file_size(self.final_size as f64)
    }
}

pub fn batch_summary(state: &ProgressState) -> BatchSummary {
    let elapsed_secs = match (&state.start_time, &state.end_time) {
        (Some(start), Some(end)) => elapsed_seconds(start, end),
        _ => None,
    };

    BatchSummary {
        task_type: state.task_type.clone(),
        total: state.total,
        processed: state.processed,
        elapsed_secs,
        original_size: state.original_size,
        final_size: state.final_size,
        compression_ratio: compression_ratio(state.original_size, state.final_size),
        failed_files: state.failed_files.clone(),
        skipped_files: state.skipped_files.clone(),
        ignored_count: state.ignored_count,
    }
}

/// One row of the format statistics table
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRow {
    pub format: String,
    pub count: u64,
    pub total_size: u64,
    pub average_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatStatsView {
    pub total_files: u64,
    pub total_size: u64,
    /// Most frequent format first
    pub rows: Vec<FormatRow>,
}

pub fn format_stats(result: &FormatCountResult) -> FormatStatsView {
    let mut rows: Vec<FormatRow> = result
        .format_count
        .iter()
        .map(|(format, &count)| {
            let total_size = result.format_size.get(format).copied().unwrap_or(0);
            let average_size = if count > 0 {
                total_size as f64 / count as f64
            } else {
                0.0
            };
            FormatRow {
                format: format.to_uppercase(),
                count,
                total_size,
                average_size,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.format.cmp(&b.format)));

    FormatStatsView {
        total_files: result.total_files,
        total_size: result.total_size,
        rows,
    }
}

/// What a finished task shows
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResultView {
    FormatStats(FormatStatsView),
    FixExtensions {
        processed: u64,
        failed_files: Vec<FileIssue>,
    },
    CleanEmpty {
        removed_count: u64,
        removed_folders: Vec<String>,
        failed_files: Vec<FileIssue>,
    },
    Search {
        matches: Vec<SearchMatch>,
        total: u64,
    },
    DeleteByFormat {
        deleted_count: u64,
        deleted_size: u64,
        failed_files: Vec<FileIssue>,
    },
    Failed {
        task_type: TaskType,
        error: String,
    },
    /// Finished without a usable result (not found, or unreadable payload)
    Empty { task_type: TaskType },
}

pub fn task_result(outcome: &TaskOutcome) -> TaskResultView {
    let task_type = outcome.task_type;

    if matches!(outcome.status, TerminalStatus::Failed | TerminalStatus::Error) {
        return TaskResultView::Failed {
            task_type,
            error: outcome.error.clone().unwrap_or_default(),
        };
    }

    let Some(task) = &outcome.task else {
        return TaskResultView::Empty { task_type };
    };

    let view = match task_type {
        TaskType::CountFormats => task
            .result_as::<FormatCountResult>()
            .map(|r| TaskResultView::FormatStats(format_stats(&r))),
        TaskType::FixExtensions => task
            .result_as::<FixExtensionsResult>()
            .map(|r| TaskResultView::FixExtensions {
                processed: r.processed,
                failed_files: r.failed_files,
            }),
        TaskType::CleanEmptyFolders => {
            task.result_as::<CleanEmptyResult>()
                .map(|r| TaskResultView::CleanEmpty {
                    removed_count: r.removed_count,
                    removed_folders: r.removed_folders,
                    failed_files: r.failed_files,
                })
        }
        TaskType::SearchFiles => task.result_as::<SearchResult>().map(|r| {
            let total = r.total.unwrap_or(r.matches.len() as u64);
            TaskResultView::Search {
                matches: r.matches,
                total,
            }
        }),
        TaskType::DeleteFilesByFormat => {
            task.result_as::<DeleteByFormatResult>()
                .map(|r| TaskResultView::DeleteByFormat {
                    deleted_count: r.deleted_count,
                    deleted_size: r.deleted_size,
                    failed_files: r.failed_files,
                })
        }
        TaskType::Unknown => None,
    };

    view.unwrap_or_else(|| {
        tracing::warn!("Task {} finished without a readable result", outcome.task_id);
        TaskResultView::Empty { task_type }
    })
}

/// Info panel next to a modal preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewInfoView {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_label: String,
    pub exif: Vec<(String, String)>,
    pub gps: Option<GpsCoords>,
}

pub fn preview_info(file_path: &str, info: &PreviewInfo) -> PreviewInfoView {
    let exif = info
        .exif
        .as_ref()
        .map(|e| {
            e.tags
                .iter()
                .map(|(k, v)| {
                    let text = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), text)
                })
                .collect()
        })
        .unwrap_or_default();

    PreviewInfoView {
        filename: path::filename_of(file_path).to_string(),
        width: info.width,
        height: info.height,
        format: info.format.clone().unwrap_or_default(),
        size_label: format_file_size(info.size as f64),
        exif,
        gps: info.exif.as_ref().and_then(|e| e.gps),
    }
}
