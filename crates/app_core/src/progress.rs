//! Monitor for the shared compress/convert progress state
//!
//! `apply` turns each `/get_progress` answer into a view plus a list of
//! effects (start/stop the 1s timer, completion summary, directory refresh).
//! Timers and bursts carry generation tokens so superseded loops can exit.

use crate::path;
use crate::render::{self, BatchSummary};
use app_proto::{ProgressState, ProgressStatus};
use std::time::Duration;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_QUICK_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_QUICK_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_CURRENT_FILE_LABEL_MAX: usize = 80;

/// `processed / total * 100` rounded to one decimal; 0 when `total == 0`
pub fn progress_percent(processed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (processed as f64 / total as f64 * 1000.0).round() / 10.0
}

/// State of the stop button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopControl {
    #[default]
    Ready,
    /// Stop request awaiting its answer
    Stopping,
    /// Server accepted the stop; waits for `completed`
    Stopped,
}

impl StopControl {
    pub fn enabled(&self) -> bool {
        *self == StopControl::Ready
    }

    /// Fluent message id of the button label
    pub fn label_key(&self) -> &'static str {
        match self {
            StopControl::Ready => "stop-label-ready",
            StopControl::Stopping => "stop-label-stopping",
            StopControl::Stopped => "stop-label-stopped",
        }
    }
}

/// Generation token of the 1s monitor loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Generation token of a fast-poll burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstToken(u64);

/// Progress panel contents
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub status: ProgressStatus,
    pub total: u64,
    pub processed: u64,
    pub percent: f64,
    pub current_file_label: String,
    pub task_type: Option<String>,
    pub stop: StopControl,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self {
            status: ProgressStatus::Idle,
            total: 0,
            processed: 0,
            percent: 0.0,
            current_file_label: String::new(),
            task_type: None,
            stop: StopControl::Ready,
        }
    }
}

/// Side effects requested by the monitor
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEffect {
    StartTimer(TimerToken),
    StopTimer,
    /// Hover previews must be suppressed while true
    ProcessingActive(bool),
    Completed(BatchSummary),
    RefreshDirectory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorUpdate {
    pub view: ProgressView,
    pub effects: Vec<MonitorEffect>,
}

/// Bounded fast polling right after a batch is accepted
#[derive(Debug, Clone, Copy)]
pub struct QuickPoll {
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
}

impl QuickPoll {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            interval,
        }
    }

    /// Count one poll; `true` while the burst should keep going
    pub fn record(&mut self, total: u64) -> bool {
        self.attempts += 1;
        total == 0 && self.attempts < self.max_attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for QuickPoll {
    fn default() -> Self {
        Self::new(DEFAULT_QUICK_POLL_INTERVAL, DEFAULT_QUICK_POLL_ATTEMPTS)
    }
}

/// Progress monitor
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    generation: u64,
    timer: Option<TimerToken>,
    burst: Option<BurstToken>,
    stop: StopControl,
    status: ProgressStatus,
    view: ProgressView,
    last_completion: Option<(Option<String>, Option<String>)>,
    label_max: usize,
    interval: Duration,
}

impl ProgressMonitor {
    pub fn new(interval: Duration, label_max: usize) -> Self {
        Self {
            generation: 0,
            timer: None,
            burst: None,
            stop: StopControl::Ready,
            status: ProgressStatus::Idle,
            view: ProgressView::default(),
            last_completion: None,
            label_max,
            interval,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Fold one progress answer into the monitor
    pub fn apply(&mut self, state: &ProgressState) -> MonitorUpdate {
        let mut effects = Vec::new();
        let was_running = self.status == ProgressStatus::Running;

        match state.status {
            ProgressStatus::Running => {
                if self.timer.is_none() {
                    let token = TimerToken(self.next_generation());
                    self.timer = Some(token);
                    tracing::info!("Progress monitor started");
                    effects.push(MonitorEffect::StartTimer(token));
                }
                if !was_running {
                    effects.push(MonitorEffect::ProcessingActive(true));
                }
            }
            ProgressStatus::Completed => {
                self.stop_timer(&mut effects);
                self.burst = None;
                self.stop = StopControl::Ready;
                if was_running {
                    effects.push(MonitorEffect::ProcessingActive(false));
                }

                let run = (state.start_time.clone(), state.end_time.clone());
                if self.last_completion.as_ref() != Some(&run) {
                    self.last_completion = Some(run);
                    effects.push(MonitorEffect::Completed(render::batch_summary(state)));
                    effects.push(MonitorEffect::RefreshDirectory);
                }
            }
            ProgressStatus::Idle => {
                self.stop_timer(&mut effects);
                if was_running {
                    effects.push(MonitorEffect::ProcessingActive(false));
                }
            }
            ProgressStatus::Unknown => {
                tracing::debug!("Ignoring unrecognized progress status");
                return MonitorUpdate {
                    view: self.view.clone(),
                    effects,
                };
            }
        }

        self.status = state.status;
        self.view = self.build_view(state);
        MonitorUpdate {
            view: self.view.clone(),
            effects,
        }
    }

    fn stop_timer(&mut self, effects: &mut Vec<MonitorEffect>) {
        if self.timer.take().is_some() {
            tracing::info!("Progress monitor stopped");
            effects.push(MonitorEffect::StopTimer);
        }
    }

    fn build_view(&self, state: &ProgressState) -> ProgressView {
        let running = state.status == ProgressStatus::Running;
        let percent = if state.status == ProgressStatus::Completed {
            100.0
        } else {
            progress_percent(state.processed, state.total)
        };
        let current_file_label = match (&state.current_file, running) {
            (Some(file), true) => path::truncate_for_display(file, self.label_max),
            _ => String::new(),
        };

        ProgressView {
            status: state.status,
            total: state.total,
            processed: state.processed,
            percent,
            current_file_label,
            task_type: state.task_type.clone(),
            stop: self.stop,
        }
    }

    pub fn timer_is_current(&self, token: TimerToken) -> bool {
        self.timer == Some(token)
    }

    /// Start a fast-poll burst, superseding any running one
    pub fn begin_burst(&mut self) -> BurstToken {
        let token = BurstToken(self.next_generation());
        self.burst = Some(token);
        token
    }

    pub fn burst_is_current(&self, token: BurstToken) -> bool {
        self.burst == Some(token)
    }

    pub fn end_burst(&mut self, token: BurstToken) {
        if self.burst == Some(token) {
            self.burst = None;
        }
    }

    /// Claim the stop button; `false` if a stop is pending or nothing runs
    pub fn request_stop(&mut self) -> bool {
        if self.status != ProgressStatus::Running || !self.stop.enabled() {
            return false;
        }
        self.stop = StopControl::Stopping;
        self.view.stop = self.stop;
        true
    }

    pub fn stop_succeeded(&mut self) {
        if self.stop == StopControl::Stopping {
            self.stop = StopControl::Stopped;
            self.view.stop = self.stop;
        }
    }

    pub fn stop_failed(&mut self) {
        if self.stop == StopControl::Stopping {
            self.stop = StopControl::Ready;
            self.view.stop = self.stop;
        }
    }

    /// Progress panel closed; forget the finished run
    pub fn reset(&mut self) -> Vec<MonitorEffect> {
        let mut effects = Vec::new();
        self.stop_timer(&mut effects);
        if self.status == ProgressStatus::Running {
            effects.push(MonitorEffect::ProcessingActive(false));
        }
        self.burst = None;
        self.stop = StopControl::Ready;
        self.status = ProgressStatus::Idle;
        self.view = ProgressView::default();
        effects
    }

    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    pub fn view(&self) -> &ProgressView {
        &self.view
    }

    pub fn stop_control(&self) -> StopControl {
        self.stop
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL, DEFAULT_CURRENT_FILE_LABEL_MAX)
    }
}
