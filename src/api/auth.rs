use std::sync::Arc;

use poem::Request;
use poem_openapi::{ApiResponse, OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::api::helpers;
use crate::coordinators::AuthCoordinator;
use crate::errors::AuthError;
use crate::types::dto::auth::{
    LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenResponse,
    WhoAmIResponse,
};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::UserResponse;
use crate::types::internal::context::RequestContext;

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[derive(ApiResponse)]
pub enum RegisterResponse {
    /// Account created, awaiting approval
    #[oai(status = 201)]
    Created(Json<UserResponse>),
}

/// Authentication API endpoints
pub struct AuthApi {
    auth_coordinator: Arc<AuthCoordinator>,
}

impl AuthApi {
    pub fn new(auth_coordinator: Arc<AuthCoordinator>) -> Self {
        Self { auth_coordinator }
    }

    async fn context(
        &self,
        req: &Request,
        auth: Option<Bearer>,
    ) -> Result<RequestContext, AuthError> {
        helpers::create_request_context(
            req,
            auth,
            &self.auth_coordinator.token_provider(),
            &self.auth_coordinator.audit_logger(),
        )
        .await
        .map_err(AuthError::from_internal_error)
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new account
    ///
    /// The account starts pending with the GUEST role and cannot log in until
    /// an administrator approves it.
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(
        &self,
        req: &Request,
        body: Json<RegisterRequest>,
    ) -> Result<RegisterResponse, AuthError> {
        let ctx = self.context(req, None).await?;
        let user = self
            .auth_coordinator
            .register(&ctx, &body.name, &body.email, &body.password)
            .await?;

        Ok(RegisterResponse::Created(Json(UserResponse::from(user))))
    }

    /// Login with email and password to receive authentication tokens
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        body: Json<LoginRequest>,
    ) -> Result<Json<TokenResponse>, AuthError> {
        let ctx = self.context(req, None).await?;
        let outcome = self
            .auth_coordinator
            .login(&ctx, &body.email, &body.password)
            .await?;

        Ok(Json(TokenResponse {
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.auth_coordinator.token_provider().access_token_ttl_seconds(),
            user: UserResponse::from(outcome.user),
        }))
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The new token carries the user's current role. The refresh token is not rotated.
    #[oai(path = "/refresh", method = "post", tag = "AuthTags::Authentication")]
    async fn refresh(
        &self,
        req: &Request,
        body: Json<RefreshRequest>,
    ) -> Result<Json<RefreshResponse>, AuthError> {
        let ctx = self.context(req, None).await?;
        let (access_token, _claims) = self
            .auth_coordinator
            .refresh(&ctx, &body.refresh_token)
            .await?;

        Ok(Json(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.auth_coordinator.token_provider().access_token_ttl_seconds(),
        }))
    }

    /// Revoke a refresh token. Always succeeds.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        req: &Request,
        body: Json<LogoutRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = self.context(req, None).await?;
        self.auth_coordinator
            .logout(&ctx, body.refresh_token.as_deref())
            .await?;

        Ok(Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }))
    }

    /// Verify the access token and return its claims
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<WhoAmIResponse>, AuthError> {
        let ctx = self.context(req, Some(auth.0)).await?;
        let claims = self.auth_coordinator.whoami(&ctx)?;

        Ok(Json(WhoAmIResponse {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            expires_at: claims.exp,
        }))
    }
}
