use serde::{Deserialize, Serialize};

use crate::session::CheckInParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

impl From<&CheckInParams> for CheckInRequest {
    fn from(params: &CheckInParams) -> Self {
        Self {
            card_id: params.card_id.clone(),
            lane: params.lane.clone(),
            plate_text: params.plate_text.clone(),
            vehicle_type: params.vehicle_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutRequest {
    pub card_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlateRequest {
    pub session_id: String,
    pub plate_text: String,
    pub vehicle_type: String,
}

/// Raw events feed. Entries are decoded one by one during correlation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureTaskResponse {
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
}

/// Error body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// `message`, else `detail` (strings verbatim, anything else as JSON).
    pub fn describe(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return Some(message.to_owned());
        }
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(detail) if detail.is_empty() => None,
            serde_json::Value::String(detail) => Some(detail.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_in_request_skips_absent_fields() {
        let params = CheckInParams::with_card("C-7").lane("L1");
        let body = serde_json::to_value(CheckInRequest::from(&params)).unwrap();
        assert_eq!(body, json!({"card_id": "C-7", "lane": "L1"}));
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_value(json!({"message": "card unknown", "detail": "x"})).unwrap();
        assert_eq!(body.describe().as_deref(), Some("card unknown"));

        let body: ErrorBody = serde_json::from_value(json!({"detail": "Unauthorized"})).unwrap();
        assert_eq!(body.describe().as_deref(), Some("Unauthorized"));

        let body: ErrorBody =
            serde_json::from_value(json!({"detail": [{"loc": ["body", "card_id"]}]})).unwrap();
        assert_eq!(
            body.describe().as_deref(),
            Some(r#"[{"loc":["body","card_id"]}]"#)
        );

        assert_eq!(ErrorBody::default().describe(), None);
    }
}
