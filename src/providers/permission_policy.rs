use std::fmt;

use crate::errors::internal::AuthorizationError;
use crate::types::internal::auth::Actor;
use crate::types::internal::role::{Role, has_role};

/// Roles allowed to mutate assets
pub const ASSET_MANAGERS: &[Role] = &[Role::Admin, Role::AssetManager];

/// Roles allowed to administer user accounts
pub const USER_ADMINS: &[Role] = &[Role::Admin];

/// Minimum role for viewing another user's profile
pub const PROFILE_VIEWER: Role = Role::Supervisor;

/// Every permission-checked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateUser,
    ListUsers,
    ViewUser,
    UpdateUserStatus,
    UpdateUserRole,
    SetUserActive,
    DeleteUser,
    ViewUserActivity,
    CreateAsset,
    ListAssets,
    ViewAsset,
    UpdateAsset,
    UpdateAssetStatus,
    AssignAsset,
    RetireAsset,
    ViewAssetActivity,
}

/// Role rule attached to an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated caller
    Authenticated,
    /// Caller's role must be one of these exactly
    AllowList(&'static [Role]),
    /// Caller's role must rank at or above this one
    AtLeast(Role),
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateUser => "create_user",
            Operation::ListUsers => "list_users",
            Operation::ViewUser => "view_user",
            Operation::UpdateUserStatus => "update_user_status",
            Operation::UpdateUserRole => "update_user_role",
            Operation::SetUserActive => "set_user_active",
            Operation::DeleteUser => "delete_user",
            Operation::ViewUserActivity => "view_user_activity",
            Operation::CreateAsset => "create_asset",
            Operation::ListAssets => "list_assets",
            Operation::ViewAsset => "view_asset",
            Operation::UpdateAsset => "update_asset",
            Operation::UpdateAssetStatus => "update_asset_status",
            Operation::AssignAsset => "assign_asset",
            Operation::RetireAsset => "retire_asset",
            Operation::ViewAssetActivity => "view_asset_activity",
        }
    }

    /// Operations a caller may never perform on their own account
    pub fn is_self_managed(&self) -> bool {
        matches!(
            self,
            Operation::UpdateUserStatus
                | Operation::UpdateUserRole
                | Operation::SetUserActive
                | Operation::DeleteUser
        )
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Operation::CreateUser
            | Operation::ListUsers
            | Operation::UpdateUserStatus
            | Operation::UpdateUserRole
            | Operation::SetUserActive
            | Operation::DeleteUser
            | Operation::ViewUserActivity => Requirement::AllowList(USER_ADMINS),

            Operation::ViewUser => Requirement::AtLeast(PROFILE_VIEWER),

            Operation::CreateAsset
            | Operation::UpdateAsset
            | Operation::UpdateAssetStatus
            | Operation::AssignAsset
            | Operation::RetireAsset => Requirement::AllowList(ASSET_MANAGERS),

            Operation::ListAssets | Operation::ViewAsset | Operation::ViewAssetActivity => {
                Requirement::Authenticated
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Requirement {
    pub fn is_satisfied_by(&self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::AllowList(roles) => roles.contains(&role),
            Requirement::AtLeast(required) => has_role(role, *required),
        }
    }
}

/// True when the caller targets their own account
pub fn is_self_management_violation(caller_id: &str, target_id: &str) -> bool {
    caller_id == target_id
}

/// Decide whether `actor` may perform `operation` on `target_id`
///
/// The self-management rule is checked first and applies to every role,
/// ADMIN included. The role rule is checked second.
///
/// # Arguments
/// * `actor` - Authenticated caller
/// * `operation` - Operation being attempted
/// * `target_id` - Id of the user the operation targets, if any
///
/// # Returns
/// * `Ok(())` - Permitted
/// * `Err(AuthorizationError::SelfManagement)` - Caller targets themselves
/// * `Err(AuthorizationError::InsufficientRole)` - Caller's role fails the rule
pub fn authorize(
    actor: &Actor,
    operation: Operation,
    target_id: Option<&str>,
) -> Result<(), AuthorizationError> {
    if operation.is_self_managed()
        && target_id.is_some_and(|target| is_self_management_violation(&actor.user_id, target))
    {
        return Err(AuthorizationError::SelfManagement {
            operation: operation.to_string(),
        });
    }

    if !operation.requirement().is_satisfied_by(actor.role) {
        return Err(AuthorizationError::InsufficientRole {
            operation: operation.to_string(),
            role: actor.role,
        });
    }

    Ok(())
}
