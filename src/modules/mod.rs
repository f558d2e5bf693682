//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for the blob store and the email provider.

pub mod notifier;
pub mod storage;
