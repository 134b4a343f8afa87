//! Event Correlator: match asynchronous results back to the unit of work
//! that requested them.
//!
//! Two addressing modes: a scan of the recent events feed (canonical for
//! gate sessions) and a direct task-status query (uploaded frames).

use std::sync::Arc;

use log::{debug, info};

use crate::api::Gateway;
use crate::error::{GateError, Result};
use crate::event::{EventStatus, RecognitionEvent, TaskStatus};
use crate::poll::{Probe, ProbeStatus};
use crate::session::CorrelationId;
use crate::sink::Outcome;

pub const DEFAULT_EVENTS_LIMIT: usize = 50;

/// Decode one feed entry; a malformed entry is a correlation error.
pub fn decode_event(index: usize, raw: serde_json::Value) -> Result<RecognitionEvent> {
    serde_json::from_value(raw)
        .map_err(|e| GateError::Correlation(format!("malformed event #{index}: {e}")))
}

/// Scan a feed snapshot, in the backend's order, for the first terminal
/// event of `id`.
///
/// Entries of other sessions are skipped before they are decoded, so a
/// foreign row the client cannot parse does not affect this poll. Only an
/// entry without a `session_id`, or a malformed entry of `id` itself, is a
/// correlation error. No match means the result is not there yet.
pub fn correlate(events: Vec<serde_json::Value>, id: &CorrelationId) -> Result<ProbeStatus> {
    for (index, raw) in events.into_iter().enumerate() {
        let session_id = raw
            .get("session_id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| GateError::Correlation(format!("event #{index} has no session_id")))?;
        if !id.matches(session_id) {
            continue;
        }

        let event = decode_event(index, raw)?;
        if let EventStatus::Failed { reason } = &event.status {
            info!(
                "[{id}] recognition failed: {}",
                reason.as_deref().unwrap_or("no reason given")
            );
        }
        let name = event.status.name();
        match event.status.into_check_in_outcome() {
            Some(outcome) => return Ok(ProbeStatus::Terminal(outcome)),
            None => debug!("[{id}] skipping non-terminal {name} event"),
        }
    }
    Ok(ProbeStatus::Pending)
}

/// Map a direct task-status response onto the poll protocol.
pub fn task_outcome(status: TaskStatus) -> ProbeStatus {
    match status {
        TaskStatus::Pending => ProbeStatus::Pending,
        TaskStatus::Done {
            plate_text: Some(plate),
        } if !plate.trim().is_empty() => ProbeStatus::Terminal(Outcome::success(plate.trim())),
        TaskStatus::Done { .. } => ProbeStatus::Terminal(Outcome::NotFound),
    }
}

/// Probe that scans the `limit` most recent events.
pub struct EventsFeedProbe<G: Gateway> {
    gateway: Arc<G>,
    limit: usize,
}

impl<G: Gateway> EventsFeedProbe<G> {
    pub fn new(gateway: Arc<G>, limit: usize) -> Self {
        Self { gateway, limit }
    }
}

impl<G: Gateway> Probe for EventsFeedProbe<G> {
    async fn probe(&self, id: &CorrelationId) -> Result<ProbeStatus> {
        let feed = self.gateway.events(self.limit).await?;
        correlate(feed.events, id)
    }
}

/// Probe that asks the backend for the status of one task.
pub struct TaskStatusProbe<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> TaskStatusProbe<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G: Gateway> Probe for TaskStatusProbe<G> {
    async fn probe(&self, id: &CorrelationId) -> Result<ProbeStatus> {
        let status = self.gateway.task_status(id.as_str()).await?;
        Ok(task_outcome(status))
    }
}
