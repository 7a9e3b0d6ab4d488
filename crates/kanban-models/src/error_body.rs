//! Error body returned by the REST server on non-success responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub validation_errors: BTreeMap<String, String>,
}

impl ApiErrorBody {
    /// Best available human readable message.
    pub fn summary(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_validation_errors() {
        let raw = r#"{
            "timestamp": "2026-01-05T10:00:00",
            "status": 400,
            "error": "Bad Request",
            "message": "Validation failed",
            "path": "/api/v1/boards",
            "validationErrors": {"name": "must not be blank"}
        }"#;
        let body: ApiErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(body.status, Some(400));
        assert_eq!(body.summary(), Some("Validation failed"));
        assert_eq!(body.validation_errors["name"], "must not be blank");
    }

    #[test]
    fn test_summary_falls_back_to_error() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": "Forbidden", "message": ""}"#).unwrap();
        assert_eq!(body.summary(), Some("Forbidden"));
    }
}
