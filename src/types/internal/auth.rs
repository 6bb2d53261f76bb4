use serde::{Deserialize, Serialize};

use crate::types::internal::role::Role;

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,

    /// Email at issue time
    pub email: String,

    /// Role at issue time. May be stale until the token expires.
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID for audit trail correlation
    pub jti: String,
}

/// Authenticated caller as seen by the permission policy
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}
