// Stores layer - Data access and repository pattern
//
// Store methods take `&impl ConnectionTrait` so the same call works on the
// pooled connection or inside a coordinator's transaction.
pub mod activity_store;
pub mod asset_store;
pub mod audit_store;
pub mod refresh_token_store;
pub mod user_store;

pub use activity_store::ActivityStore;
pub use asset_store::{AssetFilter, AssetPatch, AssetStore, Custodian};
pub use audit_store::AuditStore;
pub use refresh_token_store::{RefreshTokenStore, StoredRefreshToken};
pub use user_store::{NewUser, UserCredentials, UserPatch, UserStore};

use sea_orm::{DbErr, SqlErr};

/// True when the error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
