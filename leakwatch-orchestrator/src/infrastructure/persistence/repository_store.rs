//! SQLx implementation of the repository store

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::error;

use crate::domain::entities::{NewRepository, RepositoryRecord};

use super::{PersistenceError, RepositoryStore};

/// SQLx implementation of the repository store
pub struct PgRepositoryStore {
    pool: Arc<PgPool>,
}

impl PgRepositoryStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<RepositoryRecord, PersistenceError> {
    Ok(RepositoryRecord {
        id: row.try_get("id")?,
        github_id: row.try_get("github_id")?,
        full_name: row.try_get("full_name")?,
        owner: row.try_get("owner")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_private: row.try_get("is_private")?,
        stars: row.try_get("stars")?,
        language: row.try_get("language")?,
        first_seen: row.try_get("first_seen")?,
        last_scanned: row.try_get("last_scanned")?,
    })
}

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    async fn get_or_create(
        &self,
        repo: &NewRepository,
    ) -> Result<RepositoryRecord, PersistenceError> {
        // Upsert keyed by github_id; metadata is refreshed on every event
        let row = sqlx::query(
            r#"
            INSERT INTO repositories (
                github_id, full_name, owner, name, description, is_private, stars, language
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (github_id)
            DO UPDATE SET
                full_name = EXCLUDED.full_name,
                owner = EXCLUDED.owner,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                is_private = EXCLUDED.is_private,
                stars = EXCLUDED.stars,
                language = EXCLUDED.language
            RETURNING id, github_id, full_name, owner, name, description, is_private,
                      stars, language, first_seen, last_scanned
            "#,
        )
        .bind(repo.github_id)
        .bind(&repo.full_name)
        .bind(&repo.owner)
        .bind(&repo.name)
        .bind(&repo.description)
        .bind(repo.is_private)
        .bind(repo.stars)
        .bind(&repo.language)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            error!(github_id = repo.github_id, error = %e, "Database error upserting repository");
            PersistenceError::from(e)
        })?;

        record_from_row(&row)
    }

    async fn touch_last_scanned(&self, id: i64) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE repositories SET last_scanned = now() WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                error!(repository_id = id, error = %e, "Database error touching repository");
                PersistenceError::from(e)
            })?;

        Ok(())
    }
}
