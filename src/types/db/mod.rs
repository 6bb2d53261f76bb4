// Database entities - SeaORM models
pub mod asset;
pub mod asset_activity;
pub mod audit_event;
pub mod refresh_token;
pub mod role;
pub mod user;
pub mod user_activity;
