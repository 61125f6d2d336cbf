//! Payloads handed back to the routing layer.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// Acknowledgement for a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_id: Option<JobId>,
}

impl ActionResponse {
    pub fn success() -> Self {
        Self {
            message: "success".to_string(),
            created_id: None,
            checked_id: None,
        }
    }

    /// A job was created.
    pub fn created(id: JobId) -> Self {
        Self {
            created_id: Some(id),
            ..Self::success()
        }
    }

    /// A job was checked out or checked in.
    pub fn checked(id: JobId) -> Self {
        Self {
            checked_id: Some(id),
            ..Self::success()
        }
    }
}

/// Error body; `error` is a stable machine-readable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_response_shape() {
        let json = serde_json::to_value(ActionResponse::created(JobId::from("42"))).unwrap();
        assert_eq!(json, serde_json::json!({"message": "success", "createdId": "42"}));
    }

    #[test]
    fn plain_success_has_no_ids() {
        let json = serde_json::to_value(ActionResponse::success()).unwrap();
        assert_eq!(json, serde_json::json!({"message": "success"}));
    }
}
