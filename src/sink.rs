//! Result Sink: the boundary to presentation.

use log::{info, warning};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::session::CorrelationId;

/// Membership record attached to a recognized plate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "memberId")]
    pub member_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<String>,
}

/// Terminal outcome of one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        plate_text: String,
        member_info: Option<MemberInfo>,
    },
    /// Recognized an empty plate, or no membership.
    NotFound,
    Timeout,
    Error {
        detail: String,
    },
}

impl Outcome {
    pub fn success(plate_text: impl Into<String>) -> Self {
        Outcome::Success {
            plate_text: plate_text.into(),
            member_info: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "SUCCESS",
            Outcome::NotFound => "NOT_FOUND",
            Outcome::Timeout => "TIMEOUT",
            Outcome::Error { .. } => "ERROR",
        }
    }

    pub fn plate_text(&self) -> Option<&str> {
        match self {
            Outcome::Success { plate_text, .. } => Some(plate_text),
            _ => None,
        }
    }
}

/// Receives exactly one outcome per completed (not cancelled) poll.
pub trait ResultSink: Send + Sync + 'static {
    fn deliver(&self, id: &CorrelationId, outcome: Outcome);
}

/// Sink that only writes outcomes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn deliver(&self, id: &CorrelationId, outcome: Outcome) {
        match outcome {
            Outcome::Success {
                plate_text,
                member_info,
            } => match member_info.and_then(|m| m.name) {
                Some(name) => info!("[{id}] plate {plate_text} (member {name})"),
                None => info!("[{id}] plate {plate_text}"),
            },
            Outcome::NotFound => info!("[{id}] no plate or membership found"),
            Outcome::Timeout => warning!("[{id}] recognition timed out"),
            Outcome::Error { detail } => warning!("[{id}] recognition failed: {detail}"),
        }
    }
}

/// One delivered outcome, as seen by a channel consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub id: CorrelationId,
    pub outcome: Outcome,
}

impl ResultSink for mpsc::UnboundedSender<Delivery> {
    fn deliver(&self, id: &CorrelationId, outcome: Outcome) {
        // receiver gone means nobody is displaying results anymore
        let _ = self.send(Delivery {
            id: id.clone(),
            outcome,
        });
    }
}
