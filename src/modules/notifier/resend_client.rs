use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::modules::notifier::{Notifier, OutgoingEmail};

/// Request body for `POST /emails`
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// Successful send response
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Resend error response
#[derive(Debug, Deserialize)]
struct ResendErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    name: String,
}

/// Client for the Resend transactional email API
pub struct ResendClient {
    api_key: String,
    api_url: String,
    http_client: reqwest::Client,
}

impl ResendClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(api_key: String, api_url: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl Notifier for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let url = format!("{}/emails", self.api_url);

        let request_body = SendEmailRequest {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        tracing::debug!("Sending email via Resend to {:?}", email.to);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach Resend: {}", e);
                AppError::ExternalService(format!("Failed to send email: {}", e))
            })?;

        let status = response.status();

        if status.is_success() {
            let sent = response.json::<SendEmailResponse>().await.map_err(|e| {
                AppError::ExternalService(format!("Failed to parse email response: {}", e))
            })?;
            return Ok(sent.id);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Resend API error: HTTP {} - {}", status, body);

        let message = match serde_json::from_str::<ResendErrorResponse>(&body) {
            Ok(err) if !err.message.is_empty() => err.message,
            Ok(err) if !err.name.is_empty() => err.name,
            _ => format!("Resend API error: HTTP {}", status),
        };

        Err(AppError::ExternalService(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let to = vec!["ops@example.com".to_string()];
        let body = SendEmailRequest {
            from: "Daily Reports <onboarding@resend.dev>",
            to: &to,
            subject: "Daily report: 42 – North crew",
            html: "<p>hi</p>",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["to"][0], "ops@example.com");
        assert_eq!(value["subject"], "Daily report: 42 – North crew");
    }

    #[test]
    fn test_api_url_is_normalised() {
        let client =
            ResendClient::new("re_test".to_string(), "https://api.resend.com/".to_string())
                .unwrap();
        assert_eq!(client.api_url, "https://api.resend.com");
    }
}
