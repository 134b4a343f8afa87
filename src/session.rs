use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier handed out by the backend at submission time.
///
/// Matching is exact string equality; there is no prefix or fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An uploaded frame awaiting recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionTask {
    pub id: CorrelationId,
    pub created_at: DateTime<Utc>,
}

impl RecognitionTask {
    pub fn new(id: CorrelationId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
        }
    }
}

/// One vehicle's gate transaction, created by a check-in request.
#[derive(Debug, Clone, PartialEq)]
pub struct GateSession {
    pub id: CorrelationId,
    pub card_id: Option<String>,
    pub lane: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters of a check-in request. Every field is optional; the backend
/// decides what it needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInParams {
    pub card_id: Option<String>,
    pub lane: Option<String>,
    pub plate_text: Option<String>,
    pub vehicle_type: Option<String>,
}

impl CheckInParams {
    pub fn with_card(card_id: impl Into<String>) -> Self {
        Self {
            card_id: Some(card_id.into()),
            ..Self::default()
        }
    }

    pub fn lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }
}
