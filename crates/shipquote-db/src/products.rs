//! Catalog lookups against the `products` table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    /// Free-form weight attribute (`"250g"`, `"1kg"`, `"250"`); `NULL` when
    /// the product was never weighed.
    pub declared_weight: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts a product and returns its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product(
    pool: &PgPool,
    name: &str,
    declared_weight: Option<&str>,
) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO products (name, declared_weight) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(declared_weight)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches one product by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<ProductRow, DbError> {
    sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, declared_weight, created_at, updated_at \
         FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the declared weight for each of `ids` that has one.
///
/// Unknown ids and products without a declared weight are absent from the
/// map. An empty `ids` slice returns an empty map without querying.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_declared_weights(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, declared_weight FROM products \
         WHERE id = ANY($1) AND declared_weight IS NOT NULL",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}
