//! PostgreSQL RMA request repository.
//!
//! Identifier assignment runs inside one transaction holding a
//! transaction-scoped advisory lock, so two submissions can never read the
//! same last identifier. The `UNIQUE` constraint on `rma_number` backs this
//! up if a writer bypasses the repository.
//!
//! # Example
//!
//! ```no_run
//! use rma_desk_postgres::PostgresRmaRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/rma").await?;
//! let repo = PostgresRmaRepository::new(pool);
//! repo.migrate().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rma_desk_core::identifier::next_identifier;
use rma_desk_core::providers::{PAGE_SIZE, RmaPage, RmaRepository, RmaSearch};
use rma_desk_core::state::{
    DuplicateKey, RmaId, RmaNumber, RmaRequest, RmaStatus, RmaSubmission,
};
use rma_desk_core::{Result, RmaError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Advisory lock key guarding RMA number assignment ("RMA_NUM").
const RMA_NUMBER_LOCK: i64 = 0x0052_4D41_5F4E_554D;

const SELECT_COLUMNS: &str = "id, customer_name, email, phone, order_ref, product_sku, \
     reason_for_return, rma_number, rma_instructions, status, created_at";

/// PostgreSQL RMA request repository.
#[derive(Clone)]
pub struct PostgresRmaRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresRmaRepository {
    /// Create a new repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        crate::migrate(&self.pool).await
    }
}

/// Map a database error, turning the duplicate-triple violation into
/// [`RmaError::DuplicateRequest`].
fn map_insert_error(e: sqlx::Error) -> RmaError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("idx_rma_requests_duplicate") {
                return RmaError::DuplicateRequest;
            }
            return RmaError::DatabaseError(format!("RMA number collision: {db_err}"));
        }
    }
    RmaError::DatabaseError(format!("Failed to insert RMA request: {e}"))
}

fn request_from_row(row: &PgRow) -> Result<RmaRequest> {
    let get_err = |e: sqlx::Error| RmaError::DatabaseError(format!("Failed to read row: {e}"));

    let rma_number: String = row.try_get("rma_number").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;

    Ok(RmaRequest {
        id: RmaId::new(row.try_get("id").map_err(get_err)?),
        customer_name: row.try_get("customer_name").map_err(get_err)?,
        email: row.try_get("email").map_err(get_err)?,
        phone: row.try_get("phone").map_err(get_err)?,
        order_ref: row.try_get("order_ref").map_err(get_err)?,
        product_sku: row.try_get("product_sku").map_err(get_err)?,
        reason_for_return: row.try_get("reason_for_return").map_err(get_err)?,
        rma_number: RmaNumber::parse(&rma_number)?,
        rma_instructions: row.try_get("rma_instructions").map_err(get_err)?,
        status: RmaStatus::parse(&status)?,
        created_at: row.try_get("created_at").map_err(get_err)?,
    })
}

/// `ILIKE` pattern matching `term` as a literal substring.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl RmaRepository for PostgresRmaRepository {
    async fn latest_rma_number(&self) -> Result<Option<String>> {
        let row = sqlx::query("SELECT rma_number FROM rma_requests ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to read latest RMA number: {e}")))?;

        row.map(|r| r.try_get::<String, _>("rma_number"))
            .transpose()
            .map_err(|e| RmaError::DatabaseError(format!("Failed to read row: {e}")))
    }

    async fn duplicate_exists(&self, key: &DuplicateKey) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM rma_requests \
             WHERE email = $1 AND order_ref = $2 AND product_sku = $3)",
        )
        .bind(&key.email)
        .bind(&key.order_ref)
        .bind(&key.product_sku)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Failed to check duplicates: {e}")))?;

        Ok(exists)
    }

    async fn insert_numbered(
        &self,
        submission: RmaSubmission,
        created_at: DateTime<Utc>,
    ) -> Result<RmaRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(RMA_NUMBER_LOCK)
            .execute(&mut *tx)
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to lock RMA numbering: {e}")))?;

        let last: Option<String> =
            sqlx::query_scalar("SELECT rma_number FROM rma_requests ORDER BY id DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    RmaError::DatabaseError(format!("Failed to read latest RMA number: {e}"))
                })?;

        let rma_number = next_identifier(last.as_deref()).inspect_err(|error| {
            tracing::error!(last = ?last, error = %error, "Cannot derive next RMA number");
        })?;

        let mut request = submission.into_request(RmaId::new(0), rma_number, created_at);

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO rma_requests (
                customer_name, email, phone, order_ref, product_sku,
                reason_for_return, rma_number, rma_instructions, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(&request.customer_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.order_ref)
        .bind(&request.product_sku)
        .bind(&request.reason_for_return)
        .bind(request.rma_number.to_string())
        .bind(&request.rma_instructions)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit()
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to commit RMA request: {e}")))?;

        request.id = RmaId::new(id);
        tracing::debug!(request_id = id, rma_number = %request.rma_number, "RMA request inserted");
        Ok(request)
    }

    async fn get(&self, id: RmaId) -> Result<Option<RmaRequest>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM rma_requests WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to load RMA request: {e}")))?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn save_admin_changes(&self, request: &RmaRequest) -> Result<()> {
        let result = sqlx::query(
            "UPDATE rma_requests SET status = $2, rma_instructions = $3 WHERE id = $1",
        )
        .bind(request.id.get())
        .bind(request.status.as_str())
        .bind(&request.rma_instructions)
        .execute(&self.pool)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Failed to update RMA request: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(RmaError::NotFound(request.id.get()));
        }

        Ok(())
    }

    async fn search(&self, query: &RmaSearch) -> Result<RmaPage> {
        let pattern = query.term().map(contains_pattern);
        let status = query.status.map(RmaStatus::as_str);
        let offset = i64::try_from(query.offset())
            .map_err(|_| RmaError::InternalError("Page offset out of range".to_string()))?;

        let filter = "($1::TEXT IS NULL \
                OR rma_number ILIKE $1 OR order_ref ILIKE $1 \
                OR product_sku ILIKE $1 OR email ILIKE $1) \
             AND ($2::TEXT IS NULL OR status = $2)";

        let count_sql = format!("SELECT COUNT(*) FROM rma_requests WHERE {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&pattern)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to count RMA requests: {e}")))?;

        let page_sql = format!(
            "SELECT {SELECT_COLUMNS} FROM rma_requests WHERE {filter} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&page_sql)
            .bind(&pattern)
            .bind(status)
            .bind(i64::from(PAGE_SIZE))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RmaError::DatabaseError(format!("Failed to search RMA requests: {e}")))?;

        // Rows with corrupted identifiers stay out of the list instead of
        // failing the whole page.
        let mut items = Vec::with_capacity(rows.len());
        let mut skipped: u64 = 0;
        for row in &rows {
            match request_from_row(row) {
                Ok(request) => items.push(request),
                Err(error) if error.is_integrity_error() => {
                    skipped += 1;
                    tracing::warn!(
                        request_id = row.try_get::<i64, _>("id").ok(),
                        error = %error,
                        "Skipping RMA request with malformed identifier"
                    );
                }
                Err(error) => return Err(error),
            }
        }

        Ok(RmaPage {
            items,
            total: u64::try_from(total).unwrap_or_default().saturating_sub(skipped),
            page: query.page(),
            per_page: PAGE_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("RMA-0004"), "%RMA-0004%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
