use poem_openapi::Object;

use crate::types::internal::role::Role;
use crate::types::internal::user::{User, UserStatus};

/// Public user profile. Never carries the password hash.
#[derive(Object, Debug, Clone)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login_at: Option<i64>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Admin-side account creation. The account is approved immediately.
#[derive(Object, Debug)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Object, Debug)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Object, Debug)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

/// `true` approves the account, `false` puts it back to pending
#[derive(Object, Debug)]
pub struct SetUserActiveRequest {
    pub active: bool,
}
