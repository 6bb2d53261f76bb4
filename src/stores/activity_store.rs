use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::providers::Clock;
use crate::types::db::{asset_activity, user_activity};
use crate::types::internal::activity::{ActivityAction, ActivityRecord, EntityType, NewActivity};

/// Append-only repository for `user_activity` and `asset_activity`
///
/// Records are never updated or deleted.
pub struct ActivityStore {
    clock: Arc<dyn Clock>,
}

impl ActivityStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Append one record to the table matching its entity type
    pub async fn append(
        &self,
        conn: &impl ConnectionTrait,
        activity: NewActivity,
    ) -> Result<ActivityRecord, InternalError> {
        let id = Uuid::new_v4().to_string();
        let created_at = self.clock.now();
        let before_state = encode_state(activity.before.as_ref())?;
        let after_state = encode_state(activity.after.as_ref())?;

        match activity.entity_type {
            EntityType::User => {
                user_activity::ActiveModel {
                    id: Set(id.clone()),
                    user_id: Set(activity.entity_id.clone()),
                    actor_user_id: Set(activity.actor_user_id.clone()),
                    action: Set(activity.action.as_str().to_string()),
                    before_state: Set(before_state),
                    after_state: Set(after_state),
                    created_at: Set(created_at),
                }
                .insert(conn)
                .await
                .map_err(|e| InternalError::database("append_user_activity", e))?;
            }
            EntityType::Asset => {
                asset_activity::ActiveModel {
                    id: Set(id.clone()),
                    asset_id: Set(activity.entity_id.clone()),
                    actor_user_id: Set(activity.actor_user_id.clone()),
                    action: Set(activity.action.as_str().to_string()),
                    before_state: Set(before_state),
                    after_state: Set(after_state),
                    created_at: Set(created_at),
                }
                .insert(conn)
                .await
                .map_err(|e| InternalError::database("append_asset_activity", e))?;
            }
        }

        Ok(ActivityRecord {
            id,
            entity_type: activity.entity_type,
            entity_id: activity.entity_id,
            actor_user_id: activity.actor_user_id,
            action: activity.action,
            before: activity.before,
            after: activity.after,
            created_at,
        })
    }

    /// Records for one entity, oldest first (insertion order breaks timestamp ties)
    pub async fn list_for(
        &self,
        conn: &impl ConnectionTrait,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Vec<ActivityRecord>, InternalError> {
        match entity_type {
            EntityType::User => user_activity::Entity::find()
                .filter(user_activity::Column::UserId.eq(entity_id))
                .order_by_asc(user_activity::Column::CreatedAt)
                .order_by(Expr::cust("rowid"), Order::Asc)
                .all(conn)
                .await
                .map_err(|e| InternalError::database("list_user_activity", e))?
                .into_iter()
                .map(|m| {
                    decode_record(
                        EntityType::User,
                        m.id,
                        m.user_id,
                        m.actor_user_id,
                        &m.action,
                        m.before_state,
                        m.after_state,
                        m.created_at,
                    )
                })
                .collect(),
            EntityType::Asset => asset_activity::Entity::find()
                .filter(asset_activity::Column::AssetId.eq(entity_id))
                .order_by_asc(asset_activity::Column::CreatedAt)
                .order_by(Expr::cust("rowid"), Order::Asc)
                .all(conn)
                .await
                .map_err(|e| InternalError::database("list_asset_activity", e))?
                .into_iter()
                .map(|m| {
                    decode_record(
                        EntityType::Asset,
                        m.id,
                        m.asset_id,
                        m.actor_user_id,
                        &m.action,
                        m.before_state,
                        m.after_state,
                        m.created_at,
                    )
                })
                .collect(),
        }
    }
}

fn encode_state(state: Option<&serde_json::Value>) -> Result<Option<String>, InternalError> {
    state
        .map(|value| {
            serde_json::to_string(value).map_err(|e| InternalError::parse("activity_state", e.to_string()))
        })
        .transpose()
}

fn decode_state(state: Option<String>) -> Result<Option<serde_json::Value>, InternalError> {
    state
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| InternalError::parse("activity_state", e.to_string()))
        })
        .transpose()
}

#[allow(clippy::too_many_arguments)]
fn decode_record(
    entity_type: EntityType,
    id: String,
    entity_id: String,
    actor_user_id: Option<String>,
    action: &str,
    before_state: Option<String>,
    after_state: Option<String>,
    created_at: i64,
) -> Result<ActivityRecord, InternalError> {
    let action = action
        .parse::<ActivityAction>()
        .map_err(|e| InternalError::parse("activity_action", e))?;

    Ok(ActivityRecord {
        id,
        entity_type,
        entity_id,
        actor_user_id,
        action,
        before: decode_state(before_state)?,
        after: decode_state(after_state)?,
        created_at,
    })
}
