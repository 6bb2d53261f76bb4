use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::errors::InternalError;
use crate::stores::ActivityStore;
use crate::types::internal::activity::{ActivityAction, ActivityRecord, EntityType, NewActivity};
use crate::types::internal::context::RequestContext;

type LockKey = (EntityType, String);

/// Registry of per-entity async mutexes
///
/// At most one mutation per (entity type, id) is in flight. Entries are removed
/// once no guard or waiter references them.
#[derive(Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

/// Held for the duration of one mutation
pub struct EntityLockGuard {
    registry: Arc<EntityLocks>,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one entity
    pub async fn acquire(self: &Arc<Self>, entity_type: EntityType, entity_id: &str) -> EntityLockGuard {
        let key = (entity_type, entity_id.to_string());
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.entry(key.clone()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        EntityLockGuard {
            registry: Arc::clone(self),
            key,
            guard: Some(guard),
        }
    }

    /// Number of entities currently locked or awaited
    pub fn active(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl Drop for EntityLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.registry.locks.lock().unwrap_or_else(|p| p.into_inner());
        if locks
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

/// Serialize an entity snapshot for an activity record
pub fn to_state(value: &impl Serialize) -> Result<serde_json::Value, InternalError> {
    serde_json::to_value(value).map_err(|e| InternalError::parse("activity_state", e.to_string()))
}

/// Primitives of the audited mutation contract
///
/// Coordinators lock the entity, open a transaction, read the before state,
/// apply the patch, read the after state and then call `record` on the same
/// transaction before committing. Dropping the transaction on any error rolls
/// back the mutation and its record together.
pub struct MutationProvider {
    locks: Arc<EntityLocks>,
    activity_store: Arc<ActivityStore>,
}

impl MutationProvider {
    pub fn new(activity_store: Arc<ActivityStore>) -> Self {
        Self {
            locks: Arc::new(EntityLocks::new()),
            activity_store,
        }
    }

    pub async fn lock(&self, entity_type: EntityType, entity_id: &str) -> EntityLockGuard {
        self.locks.acquire(entity_type, entity_id).await
    }

    /// Append the activity record of a mutation
    ///
    /// The actor is the authenticated caller, or none for self-registration and
    /// CLI bootstrap.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        conn: &impl ConnectionTrait,
        ctx: &RequestContext,
        entity_type: EntityType,
        entity_id: &str,
        action: ActivityAction,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Result<ActivityRecord, InternalError> {
        self.activity_store
            .append(
                conn,
                NewActivity {
                    entity_type,
                    entity_id: entity_id.to_string(),
                    actor_user_id: ctx.actor_user_id(),
                    action,
                    before,
                    after,
                },
            )
            .await
    }
}
