//! Scripted in-memory gateway for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use super::Gateway;
use super::types::{
    CaptureTaskResponse, CheckInRequest, CheckInResponse, CheckOutRequest, EventsResponse,
    UpdatePlateRequest, UploadResponse,
};
use crate::error::{GateError, Result};
use crate::event::TaskStatus;

/// Build a feed entry the way the backend serializes it.
pub(crate) fn event(session_id: &str, status: &str, plate_text: Option<&str>) -> Value {
    json!({
        "session_id": session_id,
        "status": status,
        "plate_text": plate_text,
        "vehicle_type": "motorbike",
        "timestamp": "2025-09-30T08:15:00Z",
    })
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    session_ids: Mutex<VecDeque<Result<String>>>,
    task_ids: Mutex<VecDeque<Result<String>>>,
    feeds: Mutex<VecDeque<Result<Vec<Value>>>>,
    task_statuses: Mutex<VecDeque<Result<TaskStatus>>>,
    capture: Mutex<Option<Result<String>>>,
    calls: Mutex<Vec<String>>,
    check_ins: Mutex<Vec<CheckInRequest>>,
    check_outs: Mutex<Vec<CheckOutRequest>>,
    plate_updates: Mutex<Vec<UpdatePlateRequest>>,
    uploads: Mutex<Vec<usize>>,
    limits: Mutex<Vec<usize>>,
    task_status_ids: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub(crate) fn push_session(&self, result: Result<String>) {
        self.session_ids.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_task(&self, result: Result<String>) {
        self.task_ids.lock().unwrap().push_back(result);
    }

    /// Feed snapshot for the next `events` call; an empty feed once exhausted.
    pub(crate) fn push_feed(&self, result: Result<Vec<Value>>) {
        self.feeds.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_task_status(&self, result: Result<TaskStatus>) {
        self.task_statuses.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_capture(&self, result: Result<String>) {
        *self.capture.lock().unwrap() = Some(result);
    }

    /// Every call in order, e.g. `check-in`, `events`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn events_calls(&self) -> usize {
        self.limits.lock().unwrap().len()
    }

    pub(crate) fn last_limit(&self) -> Option<usize> {
        self.limits.lock().unwrap().last().copied()
    }

    pub(crate) fn check_ins(&self) -> Vec<CheckInRequest> {
        self.check_ins.lock().unwrap().clone()
    }

    pub(crate) fn check_outs(&self) -> Vec<CheckOutRequest> {
        self.check_outs.lock().unwrap().clone()
    }

    pub(crate) fn plate_updates(&self) -> Vec<UpdatePlateRequest> {
        self.plate_updates.lock().unwrap().clone()
    }

    pub(crate) fn uploads(&self) -> Vec<usize> {
        self.uploads.lock().unwrap().clone()
    }

    pub(crate) fn task_status_ids(&self) -> Vec<String> {
        self.task_status_ids.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }
}

impl Gateway for FakeGateway {
    async fn check_in(&self, request: &CheckInRequest) -> Result<CheckInResponse> {
        self.record("check-in");
        self.check_ins.lock().unwrap().push(request.clone());
        let next = self.session_ids.lock().unwrap().pop_front();
        let session_id = next.unwrap_or_else(|| Err(GateError::transport("no scripted session")))?;
        Ok(CheckInResponse { session_id })
    }

    async fn check_out(&self, request: &CheckOutRequest) -> Result<()> {
        self.record("check-out");
        self.check_outs.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update_plate(&self, request: &UpdatePlateRequest) -> Result<()> {
        self.record("update-plate");
        self.plate_updates.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn events(&self, limit: usize) -> Result<EventsResponse> {
        self.record("events");
        self.limits.lock().unwrap().push(limit);
        let next = self.feeds.lock().unwrap().pop_front();
        let events = next.unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(EventsResponse { events })
    }

    async fn capture_task(&self) -> Result<CaptureTaskResponse> {
        self.record("capture-task");
        let scripted = self.capture.lock().unwrap().clone();
        let task = scripted.unwrap_or_else(|| Ok("capture_plate".to_owned()))?;
        Ok(CaptureTaskResponse { task })
    }

    async fn upload_image(&self, jpeg: Vec<u8>) -> Result<UploadResponse> {
        self.record("upload");
        self.uploads.lock().unwrap().push(jpeg.len());
        let next = self.task_ids.lock().unwrap().pop_front();
        let task_id = next.unwrap_or_else(|| Err(GateError::transport("no scripted task")))?;
        Ok(UploadResponse { task_id })
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.record("task-status");
        self.task_status_ids.lock().unwrap().push(task_id.to_owned());
        let next = self.task_statuses.lock().unwrap().pop_front();
        next.unwrap_or(Ok(TaskStatus::Pending))
    }
}
