use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::UserError;
use crate::providers::mutation_provider::to_state;
use crate::providers::{CryptoProvider, MutationProvider, Operation, input_validator};
use crate::stores::{ActivityStore, NewUser, RefreshTokenStore, UserPatch, UserStore};
use crate::types::internal::activity::{ActivityAction, ActivityEntry, ActivityRecord, EntityType};
use crate::types::internal::context::RequestContext;
use crate::types::internal::role::Role;
use crate::types::internal::user::{User, UserStatus};

/// User administration coordinator
///
/// Every state change goes through the audited mutation sequence and produces
/// exactly one activity record in the same transaction.
pub struct UserCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    activity_store: Arc<ActivityStore>,
    refresh_token_store: Arc<RefreshTokenStore>,
    crypto_provider: Arc<CryptoProvider>,
    mutation_provider: Arc<MutationProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl UserCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.main.clone(),
            user_store: app_data.user_store.clone(),
            activity_store: app_data.activity_store.clone(),
            refresh_token_store: app_data.refresh_token_store.clone(),
            crypto_provider: app_data.crypto_provider.clone(),
            mutation_provider: app_data.mutation_provider.clone(),
            audit_logger: app_data.audit_logger.clone(),
        }
    }

    /// Administrator-created account, approved immediately
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::CreateUser, None).await?;
        input_validator::validate_required("name", name)?;
        input_validator::validate_email(email)?;
        input_validator::validate_password(password)?;

        let password_hash = self.crypto_provider.hash_password(password)?;
        let user = self
            .insert_approved(ctx, name, email, password_hash, role)
            .await?;

        tracing::info!("User {} created by {} with role {}", user.id, ctx.actor_id, role);
        Ok(user)
    }

    /// Create an approved ADMIN from the command line
    ///
    /// No caller is authenticated, so the CREATED record has no actor.
    ///
    /// # Returns
    /// * `Ok((User, String))` - The account and its generated password, shown once
    pub async fn bootstrap_admin(
        &self,
        ctx: &RequestContext,
        name: &str,
        email: &str,
    ) -> Result<(User, String), InternalError> {
        input_validator::validate_required("name", name)?;
        input_validator::validate_email(email)?;

        let password = self.crypto_provider.generate_secure_password();
        let password_hash = self.crypto_provider.hash_password(&password)?;
        let user = self
            .insert_approved(ctx, name, email, password_hash, Role::Admin)
            .await?;

        self.audit_logger
            .log_custom(ctx, "admin_bootstrapped", &user.id)
            .await;
        tracing::info!("Bootstrapped admin {} via {}", user.id, ctx.actor_id);
        Ok((user, password))
    }

    async fn insert_approved(
        &self,
        ctx: &RequestContext,
        name: &str,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<User, InternalError> {
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let user = self
            .user_store
            .insert(
                &txn,
                NewUser {
                    name: name.trim().to_string(),
                    email: email.to_string(),
                    password_hash,
                    role,
                    status: UserStatus::Approved,
                },
            )
            .await?;
        self.mutation_provider
            .record(
                &txn,
                ctx,
                EntityType::User,
                &user.id,
                ActivityAction::Created,
                None,
                Some(to_state(&user.snapshot())?),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;
        Ok(user)
    }

    /// Non-deleted users, optionally filtered by status
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        status: Option<UserStatus>,
    ) -> Result<Vec<User>, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ListUsers, None).await?;
        self.user_store.list(&self.db, status).await
    }

    pub async fn get_user(&self, ctx: &RequestContext, user_id: &str) -> Result<User, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ViewUser, Some(user_id)).await?;
        self.user_store
            .find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| not_found(user_id))
    }

    /// Approve, reject or reset an account to pending
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, InternalError> {
        self.mutate(
            ctx,
            Operation::UpdateUserStatus,
            user_id,
            ActivityAction::StatusChanged,
            UserPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Change a user's role. Existing access tokens keep the old role until they expire.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role: Role,
    ) -> Result<User, InternalError> {
        self.mutate(
            ctx,
            Operation::UpdateUserRole,
            user_id,
            ActivityAction::RoleChanged,
            UserPatch {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
    }

    /// Activation maps onto status: active is `approved`, inactive is `pending`
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        active: bool,
    ) -> Result<User, InternalError> {
        let status = if active {
            UserStatus::Approved
        } else {
            UserStatus::Pending
        };
        self.mutate(
            ctx,
            Operation::SetUserActive,
            user_id,
            ActivityAction::StatusChanged,
            UserPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Soft delete. The user's refresh tokens are revoked in the same transaction.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: &str) -> Result<User, InternalError> {
        self.mutate(
            ctx,
            Operation::DeleteUser,
            user_id,
            ActivityAction::Deleted,
            UserPatch {
                soft_delete: true,
                ..Default::default()
            },
        )
        .await
    }

    /// Activity trail of a user, deleted users included
    pub async fn list_activity(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<ActivityEntry>, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ViewUserActivity, Some(user_id)).await?;

        if self
            .user_store
            .find_by_id_including_deleted(&self.db, user_id)
            .await?
            .is_none()
        {
            return Err(not_found(user_id));
        }

        let records = self
            .activity_store
            .list_for(&self.db, EntityType::User, user_id)
            .await?;
        resolve_actor_names(&self.db, &self.user_store, records).await
    }

    async fn mutate(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        user_id: &str,
        action: ActivityAction,
        patch: UserPatch,
    ) -> Result<User, InternalError> {
        authorize(&self.audit_logger, ctx, operation, Some(user_id)).await?;

        let _lock = self.mutation_provider.lock(EntityType::User, user_id).await;
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;

        let (after, revoked) = self.apply(&txn, ctx, user_id, action, patch).await?;

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        if revoked > 0 {
            self.audit_logger
                .log_refresh_token_revoked(ctx, user_id, revoked, "user_deleted")
                .await;
        }
        tracing::info!("{} on user {} by {}", action, user_id, ctx.actor_id);
        Ok(after)
    }

    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        ctx: &RequestContext,
        user_id: &str,
        action: ActivityAction,
        patch: UserPatch,
    ) -> Result<(User, u64), InternalError> {
        let before = self
            .user_store
            .find_by_id(txn, user_id)
            .await?
            .ok_or_else(|| not_found(user_id))?;

        let soft_delete = patch.soft_delete;
        let after = self.user_store.update(txn, user_id, patch).await?;

        let revoked = if soft_delete {
            self.refresh_token_store.delete_for_user(txn, user_id).await?
        } else {
            0
        };

        self.mutation_provider
            .record(
                txn,
                ctx,
                EntityType::User,
                user_id,
                action,
                Some(to_state(&before.snapshot())?),
                Some(to_state(&after.snapshot())?),
            )
            .await?;

        Ok((after, revoked))
    }
}

fn not_found(user_id: &str) -> InternalError {
    UserError::NotFound {
        user_id: user_id.to_string(),
    }
    .into()
}

/// Attach display names to records; soft-deleted actors still resolve
pub(crate) async fn resolve_actor_names(
    db: &DatabaseConnection,
    user_store: &UserStore,
    records: Vec<ActivityRecord>,
) -> Result<Vec<ActivityEntry>, InternalError> {
    let mut actor_ids: Vec<String> = records
        .iter()
        .filter_map(|record| record.actor_user_id.clone())
        .collect();
    actor_ids.sort();
    actor_ids.dedup();

    let names = user_store.display_names(db, &actor_ids).await?;

    Ok(records
        .into_iter()
        .map(|record| {
            let actor_name = record
                .actor_user_id
                .as_ref()
                .and_then(|id| names.get(id).cloned());
            ActivityEntry { record, actor_name }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::AuthorizationError;
    use crate::test::utils::{TEST_PASSWORD, authenticated_context, seed_user, setup_test_app_data};

    #[tokio::test]
    async fn test_admin_cannot_change_own_role_or_status() {
        let (app_data, _clock) = setup_test_app_data().await;
        let admin = seed_user(&app_data, "admin@example.com", Role::Admin, UserStatus::Approved).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &admin);

        let role = coordinator.update_role(&ctx, &admin.id, Role::Guest).await;
        let status = coordinator
            .update_status(&ctx, &admin.id, UserStatus::Rejected)
            .await;
        let active = coordinator.set_active(&ctx, &admin.id, false).await;
        let delete = coordinator.delete_user(&ctx, &admin.id).await;

        for result in [role, status, active, delete] {
            assert!(matches!(
                result,
                Err(InternalError::Authorization(AuthorizationError::SelfManagement { .. }))
            ));
        }

        // Only the seed CREATED record exists
        let records = app_data
            .activity_store
            .list_for(&app_data.connections.main, EntityType::User, &admin.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_manage_users() {
        let (app_data, _clock) = setup_test_app_data().await;
        let manager = seed_user(&app_data, "mgr@example.com", Role::Manager, UserStatus::Approved).await;
        let target = seed_user(&app_data, "t@example.com", Role::Guest, UserStatus::Pending).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &manager);

        let result = coordinator
            .update_status(&ctx, &target.id, UserStatus::Approved)
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Authorization(AuthorizationError::InsufficientRole { .. }))
        ));
    }

    #[tokio::test]
    async fn test_non_admin_targeting_missing_user_is_forbidden() {
        let (app_data, _clock) = setup_test_app_data().await;
        let manager = seed_user(&app_data, "mgr@example.com", Role::Manager, UserStatus::Approved).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &manager);

        let result = coordinator.delete_user(&ctx, "missing").await;
        assert!(matches!(
            result,
            Err(InternalError::Authorization(AuthorizationError::InsufficientRole { .. }))
        ));
    }

    #[tokio::test]
    async fn test_approve_records_before_and_after() {
        let (app_data, _clock) = setup_test_app_data().await;
        let admin = seed_user(&app_data, "admin@example.com", Role::Admin, UserStatus::Approved).await;
        let target = seed_user(&app_data, "t@example.com", Role::Guest, UserStatus::Pending).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &admin);

        let updated = coordinator
            .update_status(&ctx, &target.id, UserStatus::Approved)
            .await
            .unwrap();
        assert_eq!(updated.status, UserStatus::Approved);

        let entries = coordinator.list_activity(&ctx, &target.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        let last = &entries[1];
        assert_eq!(last.record.action, ActivityAction::StatusChanged);
        assert_eq!(last.record.actor_user_id.as_deref(), Some(admin.id.as_str()));
        assert_eq!(last.actor_name.as_deref(), Some(admin.name.as_str()));
        assert_eq!(last.record.before.as_ref().unwrap()["status"], "pending");
        assert_eq!(last.record.after.as_ref().unwrap()["status"], "approved");
    }

    #[tokio::test]
    async fn test_set_active_maps_to_status() {
        let (app_data, _clock) = setup_test_app_data().await;
        let admin = seed_user(&app_data, "admin@example.com", Role::Admin, UserStatus::Approved).await;
        let target = seed_user(&app_data, "t@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &admin);

        let inactive = coordinator.set_active(&ctx, &target.id, false).await.unwrap();
        assert_eq!(inactive.status, UserStatus::Pending);
        let active = coordinator.set_active(&ctx, &target.id, true).await.unwrap();
        assert_eq!(active.status, UserStatus::Approved);
    }

    #[tokio::test]
    async fn test_delete_hides_user_and_revokes_tokens() {
        let (app_data, _clock) = setup_test_app_data().await;
        let admin = seed_user(&app_data, "admin@example.com", Role::Admin, UserStatus::Approved).await;
        let target = seed_user(&app_data, "t@example.com", Role::Technician, UserStatus::Approved).await;
        let auth = crate::coordinators::AuthCoordinator::new(app_data.clone());
        auth.login(&RequestContext::new(), "t@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &admin);
        let deleted = coordinator.delete_user(&ctx, &target.id).await.unwrap();
        assert!(deleted.is_deleted);

        assert!(matches!(
            coordinator.get_user(&ctx, &target.id).await,
            Err(InternalError::User(UserError::NotFound { .. }))
        ));
        assert!(coordinator
            .list_users(&ctx, None)
            .await
            .unwrap()
            .iter()
            .all(|u| u.id != target.id));
        assert_eq!(
            app_data
                .refresh_token_store
                .count_for_user(&app_data.connections.main, &target.id)
                .await
                .unwrap(),
            0
        );

        let trail = coordinator.list_activity(&ctx, &target.id).await.unwrap();
        assert_eq!(trail.last().unwrap().record.action, ActivityAction::Deleted);
    }

    #[tokio::test]
    async fn test_deleted_actor_still_named_in_trail() {
        let (app_data, _clock) = setup_test_app_data().await;
        let root = seed_user(&app_data, "root@example.com", Role::Admin, UserStatus::Approved).await;
        let second = seed_user(&app_data, "second@example.com", Role::Admin, UserStatus::Approved).await;
        let target = seed_user(&app_data, "t@example.com", Role::Guest, UserStatus::Pending).await;
        let coordinator = UserCoordinator::new(app_data.clone());

        coordinator
            .update_status(&authenticated_context(&app_data, &second), &target.id, UserStatus::Approved)
            .await
            .unwrap();
        let root_ctx = authenticated_context(&app_data, &root);
        coordinator.delete_user(&root_ctx, &second.id).await.unwrap();

        let trail = coordinator.list_activity(&root_ctx, &target.id).await.unwrap();
        let approval = trail
            .iter()
            .find(|e| e.record.action == ActivityAction::StatusChanged)
            .unwrap();
        assert_eq!(approval.actor_name.as_deref(), Some(second.name.as_str()));
    }

    #[tokio::test]
    async fn test_mutating_missing_user_is_not_found_without_record() {
        let (app_data, _clock) = setup_test_app_data().await;
        let admin = seed_user(&app_data, "admin@example.com", Role::Admin, UserStatus::Approved).await;
        let coordinator = UserCoordinator::new(app_data.clone());
        let ctx = authenticated_context(&app_data, &admin);

        let result = coordinator.update_role(&ctx, "missing", Role::Engineer).await;
        assert!(matches!(
            result,
            Err(InternalError::User(UserError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_supervisor_can_view_profile_but_technician_cannot() {
        let (app_data, _clock) = setup_test_app_data().await;
        let supervisor = seed_user(&app_data, "sup@example.com", Role::Supervisor, UserStatus::Approved).await;
        let tech = seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = UserCoordinator::new(app_data.clone());

        let viewed = coordinator
            .get_user(&authenticated_context(&app_data, &supervisor), &tech.id)
            .await
            .unwrap();
        assert_eq!(viewed.id, tech.id);

        let denied = coordinator
            .get_user(&authenticated_context(&app_data, &tech), &supervisor.id)
            .await;
        assert!(matches!(
            denied,
            Err(InternalError::Authorization(AuthorizationError::InsufficientRole { .. }))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_approved_and_unattributed() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = UserCoordinator::new(app_data.clone());

        let (admin, password) = coordinator
            .bootstrap_admin(&RequestContext::for_cli("create-admin"), "Root", "root@example.com")
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.status, UserStatus::Approved);
        assert!(password.len() >= 16);

        let records = app_data
            .activity_store
            .list_for(&app_data.connections.main, EntityType::User, &admin.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actor_user_id, None);

        let auth = crate::coordinators::AuthCoordinator::new(app_data);
        assert!(auth
            .login(&RequestContext::new(), "root@example.com", &password)
            .await
            .is_ok());
    }
}
