//! Client-session object tying submission, polling and result delivery
//! together.
//!
//! At most one poll loop is active per client. Any new submission first
//! stops the active loop and waits for it to exit, so an outcome of the old
//! unit of work can never be delivered after the new one was submitted.

use std::sync::Arc;

use log::{debug, info};

use crate::api::Gateway;
use crate::correlate::{DEFAULT_EVENTS_LIMIT, EventsFeedProbe, TaskStatusProbe, decode_event};
use crate::error::{GateError, Result};
use crate::event::RecognitionEvent;
use crate::poll::{PollBudget, PollHandle, PollReport};
use crate::session::{CheckInParams, CorrelationId, GateSession, RecognitionTask};
use crate::sink::ResultSink;
use crate::submit::{FrameSource, TaskSubmitter};

pub struct GateClient<G: Gateway> {
    gateway: Arc<G>,
    submitter: TaskSubmitter<G>,
    budget: PollBudget,
    events_limit: usize,
    active: Option<PollHandle>,
}

impl<G: Gateway> GateClient<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            submitter: TaskSubmitter::new(gateway.clone()),
            gateway,
            budget: PollBudget::default(),
            events_limit: DEFAULT_EVENTS_LIMIT,
            active: None,
        }
    }

    pub fn with_budget(mut self, budget: PollBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_events_limit(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(GateError::Config("events limit must be positive".into()));
        }
        self.events_limit = limit;
        Ok(self)
    }

    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    pub fn submitter(&self) -> &TaskSubmitter<G> {
        &self.submitter
    }

    /// Id of the unit of work currently being polled, if any.
    pub fn active_id(&self) -> Option<&CorrelationId> {
        self.active
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .map(|handle| handle.id())
    }

    /// Stop the active poll, if any, and wait for it to exit.
    pub async fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            debug!("Cancelling poll for {}", handle.id());
            handle.stop().await;
        }
    }

    /// Wait for the active poll to finish on its own.
    ///
    /// If this future is dropped early the poll keeps running and stays
    /// owned by the client.
    pub async fn wait(&mut self) -> Option<PollReport> {
        let handle = self.active.as_mut()?;
        let report = handle.join().await;
        self.active = None;
        report
    }

    /// Open a gate session without watching it.
    pub async fn check_in(&mut self, params: &CheckInParams) -> Result<GateSession> {
        self.cancel().await;
        self.submitter.check_in(params).await
    }

    /// Watch the events feed for the outcome of `session`, replacing any
    /// active poll.
    pub async fn watch_session(&mut self, session: &GateSession, sink: Arc<dyn ResultSink>) {
        self.cancel().await;
        let probe = EventsFeedProbe::new(self.gateway.clone(), self.events_limit);
        self.active = Some(PollHandle::spawn(
            session.id.clone(),
            self.budget,
            probe,
            sink,
        ));
    }

    /// Check in and watch the session's events. Submission errors are
    /// returned before any poll is started.
    pub async fn check_in_and_watch(
        &mut self,
        params: &CheckInParams,
        sink: Arc<dyn ResultSink>,
    ) -> Result<GateSession> {
        let session = self.check_in(params).await?;
        self.watch_session(&session, sink).await;
        Ok(session)
    }

    /// Upload a frame and poll its task status directly.
    pub async fn recognize<F: FrameSource + ?Sized>(
        &mut self,
        frames: &mut F,
        sink: Arc<dyn ResultSink>,
    ) -> Result<RecognitionTask> {
        self.cancel().await;
        let task = self.submitter.upload_frame(frames).await?;
        let probe = TaskStatusProbe::new(self.gateway.clone());
        self.active = Some(PollHandle::spawn(task.id.clone(), self.budget, probe, sink));
        Ok(task)
    }

    /// Fire-and-forget capture trigger; leaves the active poll alone.
    pub async fn trigger_capture(&self) -> Result<String> {
        self.submitter.trigger_capture().await
    }

    pub async fn check_out(&self, card_id: &str) -> Result<()> {
        self.submitter.check_out(card_id).await
    }

    pub async fn update_plate(
        &self,
        session_id: &CorrelationId,
        plate_text: &str,
        vehicle_type: &str,
    ) -> Result<()> {
        self.submitter
            .update_plate(session_id, plate_text, vehicle_type)
            .await
    }

    /// The most recent events, decoded.
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<RecognitionEvent>> {
        let feed = self.gateway.events(limit).await?;
        info!("Fetched {} events", feed.events.len());
        feed.events
            .into_iter()
            .enumerate()
            .map(|(index, raw)| decode_event(index, raw))
            .collect()
    }
}
