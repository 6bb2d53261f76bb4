use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found: {user_id}")]
    NotFound { user_id: String },

    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },
}
