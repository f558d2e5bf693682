//! Transactional email delivery
//!
//! [`Notifier`] is the capability used by the submission flow; [`ResendClient`]
//! implements it against the Resend HTTP API.

mod resend_client;

pub use resend_client::ResendClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// A single outgoing HTML email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Sends an email once. Callers never retry.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Returns the provider's message id on success.
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}
