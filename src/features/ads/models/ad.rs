use sqlx::FromRow;

/// Ad row joined with its author's first name
#[derive(Debug, Clone, FromRow)]
pub struct AdWithAuthor {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub is_published: bool,
    /// Storage key of the attached image, if any
    pub image: Option<String>,
    pub author_id: i64,
    pub category_id: i64,
    pub author: String,
}

/// Listing projection row
#[derive(Debug, Clone, FromRow)]
pub struct AdSummaryRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub author: String,
}
