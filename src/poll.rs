//! Poller: fixed-cadence probing of one correlation id under a time budget.
//!
//! Probes for an id are strictly sequential. The inter-probe delay is the
//! only suspension point besides the probe itself, and both observe the
//! cancellation token: a cancelled poll issues no further probe and never
//! reports a result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warning};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use crate::error::{GateError, Result};
use crate::session::CorrelationId;
use crate::sink::{Outcome, ResultSink};

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 20000;

/// What a single probe learned about the unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeStatus {
    Pending,
    Terminal(Outcome),
}

/// Caller-supplied status query for one correlation id.
///
/// Transient errors ([`GateError::is_transient`]) are swallowed by the poll
/// loop; any other error ends the poll with [`Outcome::Error`].
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, id: &CorrelationId) -> impl Future<Output = Result<ProbeStatus>> + Send;
}

impl<P: Probe> Probe for Arc<P> {
    fn probe(&self, id: &CorrelationId) -> impl Future<Output = Result<ProbeStatus>> + Send {
        (**self).probe(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollBudget {
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(GateError::Config("poll interval must be positive".into()));
        }
        Ok(Self { interval, timeout })
    }

    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Result<Self> {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    /// Upper bound on probes implied by the budget.
    pub fn max_attempts(&self) -> u64 {
        self.timeout
            .as_millis()
            .checked_div(self.interval.as_millis())
            .unwrap_or(0) as u64
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Continue,
    Terminal,
    /// Non-terminal probe that used up the budget.
    Timeout,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollAttempt {
    pub attempt_number: u32,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub id: CorrelationId,
    pub outcome: Outcome,
    pub attempts: Vec<PollAttempt>,
    pub elapsed: Duration,
}

impl PollReport {
    /// The outcome, with an exhausted budget turned into [`GateError::Timeout`].
    pub fn into_result(self) -> Result<Outcome> {
        match self.outcome {
            Outcome::Timeout => Err(GateError::Timeout(self.elapsed)),
            outcome => Ok(outcome),
        }
    }
}

/// Probe `id` every `budget.interval` until a terminal state, a fatal error,
/// or the timeout. Returns `None` if `cancel` fires first.
pub async fn poll<P: Probe>(
    id: &CorrelationId,
    budget: &PollBudget,
    probe: &P,
    cancel: &CancellationToken,
) -> Option<PollReport> {
    let start = Instant::now();
    let mut attempts: Vec<PollAttempt> = Vec::new();
    let report = |outcome: Outcome, attempts: Vec<PollAttempt>| PollReport {
        id: id.clone(),
        outcome,
        attempts,
        elapsed: start.elapsed(),
    };

    loop {
        let remaining = budget.timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        // a probe is only issued on a full interval tick within the budget
        let last_tick = remaining < budget.interval;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[{id}] poll cancelled while waiting");
                return None;
            }
            _ = sleep(remaining.min(budget.interval)) => {}
        }
        if last_tick {
            break;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[{id}] poll cancelled during probe, request dropped");
                return None;
            }
            result = probe.probe(id) => result,
        };

        let attempt_number = attempts.len() as u32 + 1;
        let elapsed = start.elapsed();
        match result {
            Ok(ProbeStatus::Terminal(outcome)) => {
                debug!("[{id}] probe {attempt_number}: terminal {}", outcome.kind());
                attempts.push(PollAttempt {
                    attempt_number,
                    elapsed,
                    outcome: AttemptOutcome::Terminal,
                });
                return Some(report(outcome, attempts));
            }
            Ok(ProbeStatus::Pending) => {
                debug!("[{id}] probe {attempt_number}: pending");
            }
            Err(err) if err.is_transient() => {
                warning!("[{id}] probe {attempt_number} failed, continuing: {err}");
            }
            Err(err) => {
                error!("[{id}] probe {attempt_number} failed fatally: {err}");
                attempts.push(PollAttempt {
                    attempt_number,
                    elapsed,
                    outcome: AttemptOutcome::Error,
                });
                return Some(report(
                    Outcome::Error {
                        detail: err.to_string(),
                    },
                    attempts,
                ));
            }
        }

        let outcome = if elapsed >= budget.timeout {
            AttemptOutcome::Timeout
        } else {
            AttemptOutcome::Continue
        };
        attempts.push(PollAttempt {
            attempt_number,
            elapsed,
            outcome,
        });
    }

    warning!(
        "[{id}] no result after {}ms ({} probes)",
        budget.timeout.as_millis(),
        attempts.len()
    );
    Some(report(Outcome::Timeout, attempts))
}

/// Owned handle to a background poll loop.
///
/// Dropping the handle cancels the loop.
pub struct PollHandle {
    id: CorrelationId,
    token: CancellationToken,
    task: Option<JoinHandle<Option<PollReport>>>,
}

impl PollHandle {
    /// Start polling `id` on the current tokio runtime. The outcome is
    /// delivered to `sink` unless the poll is cancelled first.
    pub fn spawn<P: Probe>(
        id: CorrelationId,
        budget: PollBudget,
        probe: P,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task_id = id.clone();

        info!(
            "[{id}] polling every {}ms for up to {}ms ({} probes at most)",
            budget.interval.as_millis(),
            budget.timeout.as_millis(),
            budget.max_attempts()
        );
        let task = tokio::spawn(async move {
            let report = poll(&task_id, &budget, &probe, &task_token).await?;
            if task_token.is_cancelled() {
                return None;
            }
            sink.deliver(&report.id, report.outcome.clone());
            Some(report)
        });

        Self {
            id,
            token,
            task: Some(task),
        }
    }

    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    /// Request cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Cancel and wait until the loop has exited.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("[{}] poll task failed to join: {e}", self.id);
            }
        }
        debug!("[{}] poll stopped", self.id);
    }

    /// Wait for the loop to finish on its own. `None` if it was cancelled.
    ///
    /// Dropping this future leaves the handle (and its loop) intact.
    pub async fn join(&mut self) -> Option<PollReport> {
        let task = self.task.as_mut()?;
        let result = task.await;
        self.task = None;
        match result {
            Ok(report) => report,
            Err(e) => {
                error!("[{}] poll task failed to join: {e}", self.id);
                None
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.token.cancel();
        }
    }
}
