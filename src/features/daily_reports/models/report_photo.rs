use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a stored report photo
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct ReportPhoto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub storage_path: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Data for linking an uploaded blob to its report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReportPhoto {
    pub report_id: Uuid,
    pub storage_path: String,
    /// Zero-based upload order
    pub position: i32,
}
