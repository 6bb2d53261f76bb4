use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::UserCoordinator;
use crate::errors::InternalError;
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::User;

/// Create an approved ADMIN account from the command line
///
/// The generated password is printed once and never stored in clear.
///
/// # Returns
/// * `Ok(User)` - The new administrator
/// * `Err(UserError::DuplicateEmail)` - Email already registered
pub async fn create_admin(
    app_data: Arc<AppData>,
    name: &str,
    email: &str,
) -> Result<User, InternalError> {
    let ctx = RequestContext::for_cli("create-admin");
    let coordinator = UserCoordinator::new(app_data);

    let (user, password) = coordinator.bootstrap_admin(&ctx, name, email).await?;

    println!("\n=== Administrator created ===\n");
    println!("ID:       {}", user.id);
    println!("Email:    {}", user.email);
    println!("Password: {}", password);
    println!("\nStore this password now. It will not be shown again.\n");

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::UserError;
    use crate::test::utils::setup_test_app_data;
    use crate::types::internal::activity::{ActivityAction, EntityType};
    use crate::types::internal::role::Role;
    use crate::types::internal::user::UserStatus;

    #[tokio::test]
    async fn test_create_admin_writes_unattributed_record() {
        let (app_data, _clock) = setup_test_app_data().await;

        let user = create_admin(app_data.clone(), "Root", "root@example.com").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.status, UserStatus::Approved);

        let records = app_data
            .activity_store
            .list_for(&app_data.connections.main, EntityType::User, &user.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ActivityAction::Created);
        assert_eq!(records[0].actor_user_id, None);
    }

    #[tokio::test]
    async fn test_create_admin_rejects_duplicate_email() {
        let (app_data, _clock) = setup_test_app_data().await;
        create_admin(app_data.clone(), "Root", "root@example.com").await.unwrap();

        let result = create_admin(app_data.clone(), "Again", "root@example.com").await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateEmail { .. }))
        ));
    }
}
