// API request/response models
pub mod activity;
pub mod asset;
pub mod auth;
pub mod common;
pub mod user;
