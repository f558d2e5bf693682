use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a daily report
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct DailyReport {
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub site_id: Option<Uuid>,
    pub site_identifier: String,
    pub crew_name: String,
    pub summary: String,
    pub finished_plan: bool,
    pub not_finished_why: Option<String>,
    pub catchup_plan: Option<String>,
    pub site_left_clean: Option<bool>,
    pub site_left_clean_notes: String,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new daily report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDailyReport {
    pub organisation_id: Uuid,
    pub site_id: Option<Uuid>,
    pub site_identifier: String,
    pub crew_name: String,
    pub summary: String,
    pub finished_plan: bool,
    /// Always `None` when `finished_plan` is true
    pub not_finished_why: Option<String>,
    /// Always `None` when `finished_plan` is true
    pub catchup_plan: Option<String>,
    pub site_left_clean: Option<bool>,
    pub site_left_clean_notes: String,
}
