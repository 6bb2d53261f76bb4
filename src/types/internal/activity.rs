use std::fmt;
use std::str::FromStr;

use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

/// Kind of entity an activity record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
#[oai(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Asset,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Asset => "asset",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action tag of an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Created,
    Updated,
    StatusChanged,
    RoleChanged,
    Assigned,
    Retired,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "CREATED",
            ActivityAction::Updated => "UPDATED",
            ActivityAction::StatusChanged => "STATUS_CHANGED",
            ActivityAction::RoleChanged => "ROLE_CHANGED",
            ActivityAction::Assigned => "ASSIGNED",
            ActivityAction::Retired => "RETIRED",
            ActivityAction::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(ActivityAction::Created),
            "UPDATED" => Ok(ActivityAction::Updated),
            "STATUS_CHANGED" => Ok(ActivityAction::StatusChanged),
            "ROLE_CHANGED" => Ok(ActivityAction::RoleChanged),
            "ASSIGNED" => Ok(ActivityAction::Assigned),
            "RETIRED" => Ok(ActivityAction::Retired),
            "DELETED" => Ok(ActivityAction::Deleted),
            other => Err(format!("unknown activity action '{}'", other)),
        }
    }
}

/// Immutable audit entry for one mutation of a user or asset
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub actor_user_id: Option<String>,
    pub action: ActivityAction,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub created_at: i64,
}

/// Activity record about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub actor_user_id: Option<String>,
    pub action: ActivityAction,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

/// Activity record joined with the actor's display name for listings
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub record: ActivityRecord,
    pub actor_name: Option<String>,
}
