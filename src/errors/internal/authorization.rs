use thiserror::Error;

use crate::types::internal::role::Role;

#[derive(Error, Debug)]
pub enum AuthorizationError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Cannot perform {operation} on your own account")]
    SelfManagement { operation: String },

    #[error("Role {role} is not permitted to perform {operation}")]
    InsufficientRole { operation: String, role: Role },
}
