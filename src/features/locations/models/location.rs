use sqlx::FromRow;

/// Database model for location
#[derive(Debug, Clone, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
}
