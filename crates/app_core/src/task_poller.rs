//! Submit-and-poll state machine for server-side tasks
//!
//! The poller itself does no I/O. A driver asks `begin_request` for permission
//! to issue a status check, feeds the answer to `on_response`, and follows the
//! returned `PollStep`. Only the most recently started session is honored.

use app_net::NetError;
use app_proto::{Task, TaskStatus, TaskType};
use std::time::Duration;

/// Delay between one status answer and the next request
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Identifies one poll session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

/// How a task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Completed,
    Failed,
    /// Server forgot the task; handled as completed without a result
    NotFound,
    /// Server reported `error`, or the status request itself failed
    Error,
}

/// Everything the terminal callback receives
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task_id: String,
    pub task_type: TaskType,
    pub status: TerminalStatus,
    pub task: Option<Task>,
    pub error: Option<String>,
}

impl TaskOutcome {
    /// Completed or not found
    pub fn succeeded(&self) -> bool {
        matches!(self.status, TerminalStatus::Completed | TerminalStatus::NotFound)
    }
}

/// What the driver does next
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Wait, then check again
    Continue(Duration),
    /// Stop; deliver the outcome exactly once
    Terminal(TaskOutcome),
    /// Response belongs to a superseded or finished session
    Discarded,
}

#[derive(Debug, Clone)]
struct PollSession {
    token: SessionToken,
    task_id: String,
    task_type: TaskType,
    in_flight: bool,
    polls: u32,
}

/// Task poller
#[derive(Debug, Clone)]
pub struct TaskPoller {
    next_token: u64,
    session: Option<PollSession>,
    interval: Duration,
}

impl TaskPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            next_token: 0,
            session: None,
            interval,
        }
    }

    /// Begin polling `task_id`; the previous session, if any, is abandoned
    pub fn start(&mut self, task_id: &str, task_type: TaskType) -> SessionToken {
        if let Some(old) = &self.session {
            tracing::info!("Abandoning poll of task {} for {}", old.task_id, task_id);
        }

        self.next_token += 1;
        let token = SessionToken(self.next_token);
        self.session = Some(PollSession {
            token,
            task_id: task_id.to_string(),
            task_type,
            in_flight: false,
            polls: 0,
        });

        tracing::info!("Polling task {} ({})", task_id, task_type.as_str());
        token
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        self.session.as_ref().is_some_and(|s| s.token == token)
    }

    /// Claim the right to issue a status request; returns the task id.
    ///
    /// `None` if the session is stale or a request is already outstanding.
    pub fn begin_request(&mut self, token: SessionToken) -> Option<String> {
        let session = self.session.as_mut().filter(|s| s.token == token)?;
        if session.in_flight {
            tracing::debug!("Status request for {} already in flight", session.task_id);
            return None;
        }
        session.in_flight = true;
        session.polls += 1;
        Some(session.task_id.clone())
    }

    /// Feed back the status answer for `token`
    pub fn on_response(&mut self, token: SessionToken, response: Result<Task, NetError>) -> PollStep {
        let Some(session) = self.session.as_mut().filter(|s| s.token == token) else {
            tracing::debug!("Discarding task status for superseded session {:?}", token);
            return PollStep::Discarded;
        };
        session.in_flight = false;

        let (status, task, error) = match response {
            Ok(task) => match task.status {
                TaskStatus::Running => return PollStep::Continue(self.interval),
                TaskStatus::Unknown => {
                    tracing::warn!("Task {} reported an unrecognized status", session.task_id);
                    return PollStep::Continue(self.interval);
                }
                TaskStatus::Completed => (TerminalStatus::Completed, Some(task), None),
                TaskStatus::NotFound => (TerminalStatus::NotFound, None, None),
                TaskStatus::Failed => {
                    let error = task.error.clone();
                    (TerminalStatus::Failed, Some(task), error)
                }
                TaskStatus::Error => {
                    let error = task.error.clone();
                    (TerminalStatus::Error, Some(task), error)
                }
            },
            Err(err) => (TerminalStatus::Error, None, Some(err.user_message())),
        };

        let Some(session) = self.session.take() else {
            return PollStep::Discarded;
        };

        tracing::info!(
            "Task {} finished with {:?} after {} checks",
            session.task_id,
            status,
            session.polls
        );

        let task_type = match (&task, session.task_type) {
            (Some(t), TaskType::Unknown) => t.task_type,
            (_, known) => known,
        };

        PollStep::Terminal(TaskOutcome {
            task_id: session.task_id,
            task_type,
            status,
            task,
            error,
        })
    }

    /// Stop polling without delivering an outcome
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("Stopped polling task {}", session.task_id);
        }
    }

    pub fn active_task(&self) -> Option<(&str, TaskType)> {
        self.session
            .as_ref()
            .map(|s| (s.task_id.as_str(), s.task_type))
    }

    pub fn is_polling(&self) -> bool {
        self.session.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for TaskPoller {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: Some("t1".into()),
            task_type: TaskType::CountFormats,
            status,
            params: serde_json::Value::Null,
            result: None,
            error: None,
        }
    }

    #[test]
    fn test_running_continues_with_interval() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::CountFormats);

        assert_eq!(poller.begin_request(token).as_deref(), Some("t1"));
        let step = poller.on_response(token, Ok(task(TaskStatus::Running)));
        assert_eq!(step, PollStep::Continue(Duration::from_millis(500)));
        assert!(poller.is_polling());
    }

    #[test]
    fn test_in_flight_guard() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::CountFormats);

        assert!(poller.begin_request(token).is_some());
        assert!(poller.begin_request(token).is_none());

        poller.on_response(token, Ok(task(TaskStatus::Running)));
        assert!(poller.begin_request(token).is_some());
    }

    #[test]
    fn test_completed_is_terminal_once() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::CountFormats);
        poller.begin_request(token);

        let mut done = task(TaskStatus::Completed);
        done.result = Some(json!({"total_files": 3}));
        let PollStep::Terminal(outcome) = poller.on_response(token, Ok(done)) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome.status, TerminalStatus::Completed);
        assert!(outcome.succeeded());
        assert!(outcome.task.unwrap().result.is_some());

        assert!(!poller.is_polling());
        assert_eq!(
            poller.on_response(token, Ok(task(TaskStatus::Completed))),
            PollStep::Discarded
        );
        assert!(poller.begin_request(token).is_none());
    }

    #[test]
    fn test_not_found_counts_as_success() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::FixExtensions);
        poller.begin_request(token);

        let PollStep::Terminal(outcome) = poller.on_response(token, Ok(Task::not_found("t1"))) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome.status, TerminalStatus::NotFound);
        assert!(outcome.succeeded());
        assert!(outcome.task.is_none());
        assert_eq!(outcome.task_type, TaskType::FixExtensions);
    }

    #[test]
    fn test_failed_carries_error() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::SearchFiles);
        poller.begin_request(token);

        let mut failed = task(TaskStatus::Failed);
        failed.error = Some("invalid regex".into());
        let PollStep::Terminal(outcome) = poller.on_response(token, Ok(failed)) else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome.status, TerminalStatus::Failed);
        assert_eq!(outcome.error.as_deref(), Some("invalid regex"));
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_transport_error_is_terminal() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::SearchFiles);
        poller.begin_request(token);

        let step = poller.on_response(token, Err(NetError::Transport("connection refused".into())));
        let PollStep::Terminal(outcome) = step else {
            panic!("expected terminal step");
        };
        assert_eq!(outcome.status, TerminalStatus::Error);
        assert_eq!(outcome.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_stale_session_discarded() {
        let mut poller = TaskPoller::default();
        let first = poller.start("t1", TaskType::CountFormats);
        assert!(poller.begin_request(first).is_some());

        let second = poller.start("t2", TaskType::SearchFiles);
        assert!(!poller.is_current(first));

        assert_eq!(
            poller.on_response(first, Ok(task(TaskStatus::Completed))),
            PollStep::Discarded
        );
        assert_eq!(poller.active_task(), Some(("t2", TaskType::SearchFiles)));

        assert_eq!(poller.begin_request(second).as_deref(), Some("t2"));
    }

    #[test]
    fn test_cancel() {
        let mut poller = TaskPoller::default();
        let token = poller.start("t1", TaskType::CountFormats);
        poller.cancel();
        assert!(poller.begin_request(token).is_none());
        assert_eq!(
            poller.on_response(token, Ok(task(TaskStatus::Completed))),
            PollStep::Discarded
        );
    }
}
