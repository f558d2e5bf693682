use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an organisation (tenant)
#[derive(Debug, Clone, FromRow)]
pub struct Organisation {
    pub id: Uuid,
    pub slug: String,
}
