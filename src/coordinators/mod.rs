// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and provider operations for specific API endpoints.
// Every mutation follows the same sequence: authorize, lock the entity, begin a
// transaction, read before, apply the patch, read after, append the activity
// record, commit.

pub mod asset_coordinator;
pub mod auth_coordinator;
pub mod user_coordinator;

pub use asset_coordinator::AssetCoordinator;
pub use auth_coordinator::{AuthCoordinator, LoginOutcome};
pub use user_coordinator::UserCoordinator;

use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::errors::internal::AuthorizationError;
use crate::providers::Operation;
use crate::providers::permission_policy;
use crate::types::internal::auth::Actor;
use crate::types::internal::context::RequestContext;

/// Resolve the caller and check the permission policy
///
/// Denials are written to the security audit log before the error is returned.
pub(crate) async fn authorize(
    audit_logger: &AuditLogger,
    ctx: &RequestContext,
    operation: Operation,
    target_id: Option<&str>,
) -> Result<Actor, InternalError> {
    let actor = ctx.actor()?;

    if let Err(denial) = permission_policy::authorize(&actor, operation, target_id) {
        let reason = match &denial {
            AuthorizationError::SelfManagement { .. } => "self_management",
            AuthorizationError::InsufficientRole { .. } => "insufficient_role",
            AuthorizationError::Unauthenticated => "unauthenticated",
        };
        tracing::warn!(
            "Denied {} for user {} ({}): {}",
            operation,
            actor.user_id,
            actor.role,
            reason
        );
        audit_logger
            .log_authorization_denied(ctx, operation.as_str(), target_id, reason)
            .await;
        return Err(denial.into());
    }

    Ok(actor)
}
