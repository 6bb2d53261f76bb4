use std::fmt;
use std::str::FromStr;

use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

/// Canonical role identifier
///
/// Every role carries a fixed rank. Hierarchy checks compare ranks; allow-list
/// checks compare identity. Display names live in the `roles` reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    AssetManager,
    Supervisor,
    Engineer,
    Maintenance,
    Technician,
    Client,
    Guest,
}

impl Role {
    /// All roles, highest rank first
    pub const ALL: [Role; 9] = [
        Role::Admin,
        Role::Manager,
        Role::AssetManager,
        Role::Supervisor,
        Role::Engineer,
        Role::Maintenance,
        Role::Technician,
        Role::Client,
        Role::Guest,
    ];

    /// Role assigned to every self-registered account
    pub const SELF_REGISTRATION: Role = Role::Guest;

    /// Static rank of the role. Ranks are distinct, so the order is total.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Manager => 80,
            Role::AssetManager => 70,
            Role::Supervisor => 60,
            Role::Engineer => 50,
            Role::Maintenance => 40,
            Role::Technician => 30,
            Role::Client => 20,
            Role::Guest => 10,
        }
    }

    /// Identifier stored in `users.role_id` and carried in access tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::AssetManager => "ASSET_MANAGER",
            Role::Supervisor => "SUPERVISOR",
            Role::Engineer => "ENGINEER",
            Role::Maintenance => "MAINTENANCE",
            Role::Technician => "TECHNICIAN",
            Role::Client => "CLIENT",
            Role::Guest => "GUEST",
        }
    }
}

/// Hierarchy check: true iff `user_role` ranks at or above `required_role`
pub fn has_role(user_role: Role, required_role: Role) -> bool {
    user_role.rank() >= required_role.rank()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role_matches_rank_comparison_for_all_pairs() {
        for r1 in Role::ALL {
            for r2 in Role::ALL {
                assert_eq!(has_role(r1, r2), r1.rank() >= r2.rank(), "{} vs {}", r1, r2);
            }
        }
    }

    #[test]
    fn test_ranks_are_distinct() {
        let mut ranks: Vec<u8> = Role::ALL.iter().map(Role::rank).collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), Role::ALL.len());
    }

    #[test]
    fn test_admin_outranks_everyone() {
        for role in Role::ALL {
            assert!(has_role(Role::Admin, role));
        }
        assert!(!has_role(Role::Guest, Role::Client));
    }

    #[test]
    fn test_role_string_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("SUPERUSER".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_as_identifier() {
        let json = serde_json::to_string(&Role::AssetManager).unwrap();
        assert_eq!(json, "\"ASSET_MANAGER\"");
    }
}
