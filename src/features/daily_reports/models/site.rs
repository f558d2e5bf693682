use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a registered, active site
#[derive(Debug, Clone, FromRow)]
pub struct Site {
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub site_number: String,
}
