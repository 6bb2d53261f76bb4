use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::providers::Clock;
use crate::types::db::refresh_token;

/// Stored refresh token row. Only the HMAC hash is ever persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRefreshToken {
    pub user_id: String,
    pub expires_at: i64,
}

/// Repository for the `refresh_tokens` table
///
/// The store does not judge expiry; callers compare `expires_at` with their clock.
pub struct RefreshTokenStore {
    clock: Arc<dyn Clock>,
}

impl RefreshTokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Store a refresh token hash for a user
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: String,
        user_id: &str,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        let model = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            created_at: Set(self.clock.now()),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("store_refresh_token", e))?;
        Ok(())
    }

    pub async fn find_by_hash(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
    ) -> Result<Option<StoredRefreshToken>, InternalError> {
        let token = refresh_token::Entity::find()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_refresh_token", e))?;

        Ok(token.map(|t| StoredRefreshToken {
            user_id: t.user_id,
            expires_at: t.expires_at,
        }))
    }

    /// Delete a token by hash. Returns the owner if a row was removed.
    pub async fn delete_by_hash(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
    ) -> Result<Option<String>, InternalError> {
        let Some(token) = self.find_by_hash(conn, token_hash).await? else {
            return Ok(None);
        };

        refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("revoke_refresh_token", e))?;

        Ok(Some(token.user_id))
    }

    /// Revoke every session of a user. Returns the number of tokens removed.
    pub async fn delete_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("revoke_user_refresh_tokens", e))?;
        Ok(result.rows_affected)
    }

    pub async fn count_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_refresh_tokens", e))
    }
}
