use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::ads::dtos::{
    extension_for, AdDetailDto, AdFilters, AdPageDto, AdSummaryDto, CreateAdDto, UpdateAdDto,
};
use crate::features::ads::models::{AdSummaryRow, AdWithAuthor};
use crate::modules::storage::ImageStore;

const DETAIL_QUERY: &str = "\
    SELECT a.id, a.name, a.price, a.description, a.is_published, a.image, \
           a.author_id, a.category_id, u.first_name AS author \
    FROM ads a \
    JOIN users u ON u.id = a.author_id \
    WHERE a.id = $1";

/// Service for ad operations
pub struct AdService {
    pool: PgPool,
    store: Arc<ImageStore>,
    page_size: i64,
}

/// Wraps a search term in `%…%`, escaping LIKE metacharacters so the
/// term matches literally (`\` is Postgres' default ESCAPE character).
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends the conjunctive filter conditions to a builder whose SQL so
/// far ends in `WHERE TRUE` with `ads` aliased as `a`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &AdFilters) {
    if let Some(category_id) = filters.category_id {
        qb.push(" AND a.category_id = ").push_bind(category_id);
    }
    if let Some(ref text) = filters.text {
        qb.push(" AND a.name ILIKE ").push_bind(like_pattern(text));
    }
    if let Some(ref location) = filters.location {
        qb.push(
            " AND EXISTS (\
                SELECT 1 FROM user_locations ul \
                JOIN locations l ON l.id = ul.location_id \
                WHERE ul.user_id = a.author_id AND l.name ILIKE ",
        )
        .push_bind(like_pattern(location))
        .push(")");
    }
    if let Some(price_from) = filters.price_from {
        qb.push(" AND a.price >= ").push_bind(price_from);
    }
    if let Some(price_to) = filters.price_to {
        qb.push(" AND a.price <= ").push_bind(price_to);
    }
}

/// Total page count the way the original paginator reports it: an empty
/// result set still has one (empty) page.
fn num_pages(total: i64, page_size: i64) -> i64 {
    if total == 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    }
}

/// Row offset for a 1-indexed page; saturates so an absurd page number
/// stays a valid (empty) query instead of overflowing.
fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size)
}

impl AdService {
    pub fn new(pool: PgPool, store: Arc<ImageStore>, page_size: i64) -> Self {
        Self {
            pool,
            store,
            page_size,
        }
    }

    /// Filtered, price-descending, paginated listing.
    pub async fn list(&self, filters: &AdFilters, page: i64) -> Result<AdPageDto> {
        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM ads a WHERE TRUE");
        push_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let offset = page_offset(page, self.page_size);

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT a.id, a.name, a.price, u.first_name AS author \
             FROM ads a \
             JOIN users u ON u.id = a.author_id \
             WHERE TRUE",
        );
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY a.price DESC, a.id DESC");
        qb.push(" LIMIT ")
            .push_bind(self.page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<AdSummaryRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(AdPageDto {
            items: rows.into_iter().map(AdSummaryDto::from).collect(),
            total,
            num_pages: num_pages(total, self.page_size),
        })
    }

    /// Get the full ad projection by id
    pub async fn get(&self, id: i64) -> Result<AdDetailDto> {
        let row = sqlx::query_as::<_, AdWithAuthor>(DETAIL_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ad with id {} not found", id)))?;

        Ok(self.project(row))
    }

    pub async fn create(&self, dto: CreateAdDto) -> Result<AdDetailDto> {
        self.ensure_author(dto.author_id).await?;
        self.ensure_category(dto.category_id).await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO ads (name, price, description, is_published, author_id, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&dto.name)
        .bind(dto.price)
        .bind(&dto.description)
        .bind(dto.is_published)
        .bind(dto.author_id)
        .bind(dto.category_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Ad created: id={}", id);
        self.get(id).await
    }

    /// Full field replacement; `is_published` is left as-is.
    pub async fn update(&self, id: i64, dto: UpdateAdDto) -> Result<AdDetailDto> {
        self.ensure_ad(id).await?;
        self.ensure_author(dto.author_id).await?;
        self.ensure_category(dto.category_id).await?;

        sqlx::query(
            "UPDATE ads \
             SET name = $1, price = $2, description = $3, author_id = $4, category_id = $5 \
             WHERE id = $6",
        )
        .bind(&dto.name)
        .bind(dto.price)
        .bind(&dto.description)
        .bind(dto.author_id)
        .bind(dto.category_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Stores the uploaded file and replaces the ad's image reference.
    pub async fn attach_image(
        &self,
        id: i64,
        original_filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<AdDetailDto> {
        self.ensure_ad(id).await?;

        let extension = extension_for(content_type)
            .map(str::to_string)
            .unwrap_or_else(|| {
                original_filename
                    .rsplit('.')
                    .next()
                    .unwrap_or("bin")
                    .to_ascii_lowercase()
            });
        let key = self.store.save(id, &extension, data).await?;

        sqlx::query("UPDATE ads SET image = $1 WHERE id = $2")
            .bind(&key)
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Ad image replaced: id={}, key={}", id, key);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Ad with id {} not found", id)));
        }

        tracing::info!("Ad deleted: id={}", id);
        Ok(())
    }

    fn project(&self, row: AdWithAuthor) -> AdDetailDto {
        let image_url = row.image.as_deref().map(|key| self.store.url(key));
        AdDetailDto::project(row, image_url)
    }

    async fn ensure_ad(&self, id: i64) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM ads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Ad with id {} not found", id)))
    }

    async fn ensure_author(&self, id: i64) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn ensure_category(&self, id: i64) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_sql(filters: &AdFilters) -> String {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM ads a WHERE TRUE");
        push_filters(&mut qb, filters);
        qb.sql().to_string()
    }

    #[test]
    fn no_filters_leaves_query_unfiltered() {
        let sql = built_sql(&AdFilters::default());
        assert_eq!(sql, "SELECT COUNT(*) FROM ads a WHERE TRUE");
    }

    #[test]
    fn each_filter_is_a_conjunct() {
        let filters = AdFilters {
            category_id: Some(3),
            text: Some("chair".to_string()),
            location: Some("moscow".to_string()),
            price_from: Some(100.0),
            price_to: Some(200.0),
        };
        let sql = built_sql(&filters);
        assert!(sql.contains("AND a.category_id = $1"));
        assert!(sql.contains("AND a.name ILIKE $2"));
        assert!(sql.contains("l.name ILIKE $3"));
        assert!(sql.contains("AND a.price >= $4"));
        assert!(sql.contains("AND a.price <= $5"));
    }

    #[test]
    fn text_filter_alone_binds_first_placeholder() {
        let filters = AdFilters {
            text: Some("chair".to_string()),
            ..Default::default()
        };
        let sql = built_sql(&filters);
        assert!(sql.contains("a.name ILIKE $1"));
        assert!(!sql.contains("category_id"));
        assert!(!sql.contains("price"));
    }

    #[test]
    fn location_filter_probes_author_locations() {
        let filters = AdFilters {
            location: Some("spb".to_string()),
            ..Default::default()
        };
        let sql = built_sql(&filters);
        assert!(sql.contains("EXISTS"));
        assert!(sql.contains("ul.user_id = a.author_id"));
        assert!(sql.contains("l.name ILIKE $1"));
    }

    #[test]
    fn listing_query_orders_by_price_descending() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT a.id, a.name, a.price, u.first_name AS author \
             FROM ads a \
             JOIN users u ON u.id = a.author_id \
             WHERE TRUE",
        );
        push_filters(&mut qb, &AdFilters::default());
        qb.push(" ORDER BY a.price DESC, a.id DESC");
        assert!(qb.sql().ends_with("ORDER BY a.price DESC, a.id DESC"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("chair"), "%chair%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn page_offset_is_zero_based_and_saturates() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(i64::MAX, 10), i64::MAX);
    }

    #[test]
    fn num_pages_rounds_up() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(1, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
        assert_eq!(num_pages(21, 10), 3);
    }
}
