// Domain types shared by providers, stores and coordinators
pub mod activity;
pub mod asset;
pub mod audit;
pub mod auth;
pub mod context;
pub mod role;
pub mod user;

pub use context::{RequestContext, RequestId, RequestSource};
