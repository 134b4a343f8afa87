//! Task Submitter: creates units of work and hands back their correlation id.
//!
//! Submitting never starts a poll. Callers decide whether and how to poll.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::{info, warning};

use crate::api::Gateway;
use crate::api::types::{CheckInRequest, CheckOutRequest, UpdatePlateRequest};
use crate::error::{GateError, Result};
use crate::session::{CheckInParams, CorrelationId, GateSession, RecognitionTask};

/// Produces the JPEG artifact to upload. Fails with [`GateError::Upload`]
/// when no frame is available.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Vec<u8>>;
}

/// A single frame handed over by the caller; yields it once.
impl FrameSource for Option<Vec<u8>> {
    fn capture(&mut self) -> Result<Vec<u8>> {
        self.take()
            .ok_or_else(|| GateError::Upload("no camera frame available".into()))
    }
}

/// Reads a captured frame from disk.
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSource for FileFrameSource {
    fn capture(&mut self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| {
            warning!("Failed to read frame {}: {e}", self.path.display());
            GateError::Upload(format!(
                "failed to read frame {}: {e}",
                self.path.display()
            ))
        })
    }
}

pub struct TaskSubmitter<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> TaskSubmitter<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Open a gate session. The session id correlates the later events.
    pub async fn check_in(&self, params: &CheckInParams) -> Result<GateSession> {
        let response = self
            .gateway
            .check_in(&CheckInRequest::from(params))
            .await?;
        if response.session_id.trim().is_empty() {
            return Err(GateError::Correlation(
                "check-in returned an empty session_id".into(),
            ));
        }

        let session = GateSession {
            id: CorrelationId::new(response.session_id),
            card_id: params.card_id.clone(),
            lane: params.lane.clone(),
            created_at: Utc::now(),
        };
        info!(
            "Checked in session {} (card {}, lane {})",
            session.id,
            session.card_id.as_deref().unwrap_or("-"),
            session.lane.as_deref().unwrap_or("-")
        );
        Ok(session)
    }

    /// Upload one frame for recognition.
    pub async fn upload_frame<F: FrameSource + ?Sized>(
        &self,
        frames: &mut F,
    ) -> Result<RecognitionTask> {
        let frame = frames.capture()?;
        if frame.is_empty() {
            return Err(GateError::Upload("camera frame is empty".into()));
        }

        let response = self.gateway.upload_image(frame).await?;
        if response.task_id.trim().is_empty() {
            return Err(GateError::Correlation(
                "upload returned an empty task_id".into(),
            ));
        }
        let task = RecognitionTask::new(CorrelationId::new(response.task_id));
        info!("Uploaded frame, recognition task {}", task.id);
        Ok(task)
    }

    /// Fire-and-forget capture trigger. There is nothing to correlate.
    pub async fn trigger_capture(&self) -> Result<String> {
        let response = self.gateway.capture_task().await?;
        info!("Capture task requested: {}", response.task);
        Ok(response.task)
    }

    pub async fn check_out(&self, card_id: &str) -> Result<()> {
        self.gateway
            .check_out(&CheckOutRequest {
                card_id: card_id.to_owned(),
            })
            .await?;
        info!("Checked out card {card_id}");
        Ok(())
    }

    /// Manual plate correction for an existing session.
    pub async fn update_plate(
        &self,
        session_id: &CorrelationId,
        plate_text: &str,
        vehicle_type: &str,
    ) -> Result<()> {
        self.gateway
            .update_plate(&UpdatePlateRequest {
                session_id: session_id.as_str().to_owned(),
                plate_text: plate_text.to_owned(),
                vehicle_type: vehicle_type.to_owned(),
            })
            .await?;
        info!("Updated plate of session {session_id} to {plate_text}");
        Ok(())
    }
}
