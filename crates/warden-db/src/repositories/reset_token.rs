//! PostgreSQL implementation of ResetTokenStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use warden_core::{NewResetToken, RepoResult, ResetToken, ResetTokenStore, User, UserId};

use crate::mappers::token_with_owner;
use crate::models::{ResetTokenModel, ResetTokenWithUserModel};

use super::error::{map_db_error, map_unique_violation, user_not_found};

/// PostgreSQL implementation of ResetTokenStore
#[derive(Clone)]
pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    /// Create a new PgResetTokenStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn insert(&self, token: &NewResetToken) -> RepoResult<ResetToken> {
        let model = sqlx::query_as::<_, ResetTokenModel>(
            r"
            INSERT INTO password_reset_tokens (user_id, token, expires_at, used, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id, user_id, token, expires_at, used, created_at
            ",
        )
        .bind(token.user_id.into_inner())
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                user_not_found(token.user_id)
            } else {
                map_unique_violation(e)
            }
        })?;

        Ok(ResetToken::from(model))
    }

    #[instrument(skip_all)]
    async fn find_with_user(&self, token: &str) -> RepoResult<Option<(ResetToken, User)>> {
        let row = sqlx::query_as::<_, ResetTokenWithUserModel>(
            r"
            SELECT t.id, t.user_id, t.token, t.expires_at, t.used, t.created_at,
                   u.username AS owner_username,
                   u.email AS owner_email,
                   u.password_hash AS owner_password_hash,
                   u.role AS owner_role
            FROM password_reset_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(token_with_owner).transpose()
    }

    #[instrument(skip(self, new_password_hash))]
    async fn consume(
        &self,
        token_id: i64,
        user_id: UserId,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // The WHERE clause is the compare-and-set: only one caller can flip `used`
        let claimed = sqlx::query(
            r"
            UPDATE password_reset_tokens
            SET used = TRUE
            WHERE id = $1 AND user_id = $2 AND used = FALSE AND expires_at > $3
            ",
        )
        .bind(token_id)
        .bind(user_id.into_inner())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(false);
        }

        let updated = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user_id.into_inner())
        .bind(new_password_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(user_not_found(user_id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(true)
    }
}
