//! Asynchronous results published by the backend.
//!
//! Events are read-only on the client. The fields that only make sense for
//! one status live on that status' variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sink::{MemberInfo, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionEvent {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, alias = "lane_id")]
    pub lane: Option<String>,
    #[serde(flatten)]
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    CheckedIn {
        #[serde(default)]
        plate_text: Option<String>,
        #[serde(default)]
        vehicle_type: Option<String>,
        #[serde(default, alias = "plate_conf")]
        plate_confidence: Option<f32>,
        #[serde(default)]
        member: Option<MemberInfo>,
    },
    CheckedOut {
        #[serde(default)]
        plate_text: Option<String>,
    },
    Failed {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl EventStatus {
    /// Terminal for the check-in flow: a check-in that carries a plate, or a failure.
    pub fn is_check_in_terminal(&self) -> bool {
        match self {
            EventStatus::CheckedIn { plate_text, .. } => plate_text
                .as_deref()
                .is_some_and(|plate| !plate.trim().is_empty()),
            EventStatus::Failed { .. } => true,
            EventStatus::Pending | EventStatus::CheckedOut { .. } => false,
        }
    }

    /// What a terminal check-in status resolves to; `None` while the flow
    /// is still running.
    pub fn into_check_in_outcome(self) -> Option<Outcome> {
        if !self.is_check_in_terminal() {
            return None;
        }
        match self {
            EventStatus::CheckedIn {
                plate_text, member, ..
            } => Some(Outcome::Success {
                plate_text: plate_text.unwrap_or_default().trim().to_owned(),
                member_info: member,
            }),
            _ => Some(Outcome::NotFound),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventStatus::Pending => "PENDING",
            EventStatus::CheckedIn { .. } => "CHECKED_IN",
            EventStatus::CheckedOut { .. } => "CHECKED_OUT",
            EventStatus::Failed { .. } => "FAILED",
        }
    }
}

/// Direct task-status response of the image recognition endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done {
        #[serde(default)]
        plate_text: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_checked_in_with_optional_fields() {
        let event: RecognitionEvent = serde_json::from_value(json!({
            "session_id": "S-1",
            "status": "CHECKED_IN",
            "plate_text": "30F-123.45",
            "vehicle_type": "motorbike",
            "plate_conf": 0.91,
            "lane_id": "L2",
            "timestamp": "2025-09-30T08:15:00Z",
            "member": {
                "name": "Nguyen Van A",
                "member_id": "MEM-2025-0001",
                "status": "active"
            }
        }))
        .unwrap();

        assert_eq!(event.session_id, "S-1");
        assert_eq!(event.lane.as_deref(), Some("L2"));
        match &event.status {
            EventStatus::CheckedIn {
                plate_text,
                plate_confidence,
                member,
                ..
            } => {
                assert_eq!(plate_text.as_deref(), Some("30F-123.45"));
                assert_eq!(*plate_confidence, Some(0.91));
                assert_eq!(
                    member.as_ref().and_then(|m| m.member_id.as_deref()),
                    Some("MEM-2025-0001")
                );
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert!(event.status.is_check_in_terminal());
    }

    #[test]
    fn pending_ignores_stray_fields() {
        let event: RecognitionEvent = serde_json::from_value(json!({
            "session_id": "S-1",
            "status": "PENDING",
            "plate_text": null,
            "timestamp": "2025-09-30T08:15:00Z"
        }))
        .unwrap();
        assert_eq!(event.status, EventStatus::Pending);
        assert!(!event.status.is_check_in_terminal());
    }

    #[test]
    fn checked_in_without_plate_is_not_terminal() {
        let blank = EventStatus::CheckedIn {
            plate_text: Some("  ".into()),
            vehicle_type: None,
            plate_confidence: None,
            member: None,
        };
        assert!(!blank.is_check_in_terminal());
        assert!(EventStatus::Failed { reason: None }.is_check_in_terminal());
        assert!(!EventStatus::CheckedOut { plate_text: None }.is_check_in_terminal());
    }

    #[test]
    fn check_in_outcome_follows_terminal_rule() {
        let checked_in = EventStatus::CheckedIn {
            plate_text: Some(" 30F-123.45 ".into()),
            vehicle_type: Some("car".into()),
            plate_confidence: Some(0.8),
            member: None,
        };
        assert_eq!(
            checked_in.into_check_in_outcome(),
            Some(Outcome::success("30F-123.45"))
        );
        assert_eq!(
            EventStatus::Failed {
                reason: Some("blurred".into())
            }
            .into_check_in_outcome(),
            Some(Outcome::NotFound)
        );
        assert_eq!(EventStatus::Pending.into_check_in_outcome(), None);
        assert_eq!(
            EventStatus::CheckedIn {
                plate_text: None,
                vehicle_type: None,
                plate_confidence: None,
                member: None,
            }
            .into_check_in_outcome(),
            None
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_value::<RecognitionEvent>(json!({
            "session_id": "S-1",
            "status": "Registered",
            "timestamp": "2025-09-30T08:15:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn task_status_variants() {
        let pending: TaskStatus = serde_json::from_value(json!({"status": "pending"})).unwrap();
        assert_eq!(pending, TaskStatus::Pending);
        let done: TaskStatus =
            serde_json::from_value(json!({"status": "done", "plate_text": "59A1-123.45"})).unwrap();
        assert_eq!(
            done,
            TaskStatus::Done {
                plate_text: Some("59A1-123.45".into())
            }
        );
    }
}
