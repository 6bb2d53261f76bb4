use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{ApiResponse, OpenApi, Tags, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::coordinators::UserCoordinator;
use crate::errors::ManagementError;
use crate::providers::TokenProvider;
use crate::types::dto::activity::ActivityResponse;
use crate::types::dto::user::{
    CreateUserRequest, SetUserActiveRequest, UpdateUserRoleRequest, UpdateUserStatusRequest,
    UserResponse,
};
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::UserStatus;

/// API tags for user management endpoints
#[derive(Tags)]
enum UserTags {
    /// User administration
    Users,
}

#[derive(ApiResponse)]
pub enum CreateUserResponse {
    /// Account created and approved
    #[oai(status = 201)]
    Created(Json<UserResponse>),
}

/// User management API endpoints
pub struct UserApi {
    user_coordinator: Arc<UserCoordinator>,
    token_provider: Arc<TokenProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl UserApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            token_provider: app_data.token_provider.clone(),
            audit_logger: app_data.audit_logger.clone(),
            user_coordinator: Arc::new(UserCoordinator::new(app_data)),
        }
    }

    async fn context(&self, req: &Request, auth: BearerAuth) -> Result<RequestContext, ManagementError> {
        helpers::create_request_context(req, Some(auth.0), &self.token_provider, &self.audit_logger)
            .await
            .map_err(ManagementError::from_internal_error)
    }
}

#[OpenApi]
impl UserApi {
    /// Create an approved account with the given role
    #[oai(path = "/users", method = "post", tag = "UserTags::Users")]
    async fn create_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<CreateUserResponse, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self
            .user_coordinator
            .create_user(&ctx, &body.name, &body.email, &body.password, body.role)
            .await?;

        Ok(CreateUserResponse::Created(Json(UserResponse::from(user))))
    }

    /// List users, optionally by approval status. Deleted users are never listed.
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn list_users(
        &self,
        req: &Request,
        auth: BearerAuth,
        status: Query<Option<UserStatus>>,
    ) -> Result<Json<Vec<UserResponse>>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let users = self.user_coordinator.list_users(&ctx, status.0).await?;

        Ok(Json(users.into_iter().map(UserResponse::from).collect()))
    }

    #[oai(path = "/users/:id", method = "get", tag = "UserTags::Users")]
    async fn get_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self.user_coordinator.get_user(&ctx, &id.0).await?;

        Ok(Json(UserResponse::from(user)))
    }

    /// Approve, reject or reset an account to pending
    #[oai(path = "/users/:id/status", method = "patch", tag = "UserTags::Users")]
    async fn update_status(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateUserStatusRequest>,
    ) -> Result<Json<UserResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self
            .user_coordinator
            .update_status(&ctx, &id.0, body.status)
            .await?;

        Ok(Json(UserResponse::from(user)))
    }

    #[oai(path = "/users/:id/role", method = "patch", tag = "UserTags::Users")]
    async fn update_role(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateUserRoleRequest>,
    ) -> Result<Json<UserResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self.user_coordinator.update_role(&ctx, &id.0, body.role).await?;

        Ok(Json(UserResponse::from(user)))
    }

    #[oai(path = "/users/:id/active", method = "patch", tag = "UserTags::Users")]
    async fn set_active(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<SetUserActiveRequest>,
    ) -> Result<Json<UserResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self.user_coordinator.set_active(&ctx, &id.0, body.active).await?;

        Ok(Json(UserResponse::from(user)))
    }

    /// Soft delete. The user's refresh tokens are revoked.
    #[oai(path = "/users/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let user = self.user_coordinator.delete_user(&ctx, &id.0).await?;

        Ok(Json(UserResponse::from(user)))
    }

    /// Activity trail of a user, oldest first
    #[oai(path = "/users/:id/activity", method = "get", tag = "UserTags::Users")]
    async fn list_activity(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<Vec<ActivityResponse>>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let entries = self.user_coordinator.list_activity(&ctx, &id.0).await?;

        Ok(Json(entries.into_iter().map(ActivityResponse::from).collect()))
    }
}
