use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JSON body returned by the submission endpoint, for success and failure alike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

impl SubmissionResponse {
    pub fn success(report_id: Uuid, email_sent: bool, email_error: Option<String>) -> Self {
        Self {
            ok: true,
            message: None,
            report_id: Some(report_id),
            email_sent: Some(email_sent),
            email_error,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            report_id: None,
            email_sent: None,
            email_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_serializes_without_optional_fields() {
        let body = serde_json::to_value(SubmissionResponse::failure("Invalid organisation")).unwrap();
        assert_eq!(body, json!({ "ok": false, "message": "Invalid organisation" }));
    }

    #[test]
    fn test_success_uses_camel_case_keys() {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(SubmissionResponse::success(
            id,
            false,
            Some("Notification email is not configured".to_string()),
        ))
        .unwrap();

        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["reportId"], json!(id.to_string()));
        assert_eq!(body["emailSent"], json!(false));
        assert_eq!(body["emailError"], json!("Notification email is not configured"));
        assert!(body.get("message").is_none());
    }
}
