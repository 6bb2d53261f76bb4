use poem_openapi::Object;

use crate::types::internal::activity::{ActivityAction, ActivityEntry, EntityType};

/// One entry of an entity's activity trail
#[derive(Object, Debug, Clone)]
pub struct ActivityResponse {
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub actor_user_id: Option<String>,
    /// Display name of the actor. Soft-deleted actors still resolve.
    pub actor_name: Option<String>,
    pub action: ActivityAction,
    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,
    pub created_at: i64,
}

impl From<ActivityEntry> for ActivityResponse {
    fn from(entry: ActivityEntry) -> Self {
        let record = entry.record;
        Self {
            id: record.id,
            entity_type: record.entity_type,
            entity_id: record.entity_id,
            actor_user_id: record.actor_user_id,
            actor_name: entry.actor_name,
            action: record.action,
            before_state: record.before,
            after_state: record.after,
            created_at: record.created_at,
        }
    }
}
