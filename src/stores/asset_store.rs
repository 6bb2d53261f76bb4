use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::AssetError;
use crate::providers::Clock;
use crate::stores::is_unique_violation;
use crate::types::db::asset;
use crate::types::internal::asset::{Asset, AssetDraft, AssetStatus};

/// Listing filter for assets
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    /// Retired (DECOMMISSIONED) assets are hidden unless requested or filtered for
    pub include_retired: bool,
}

/// Current holder of an asset
#[derive(Debug, Clone, PartialEq)]
pub struct Custodian {
    pub id: String,
    pub name: String,
}

/// Partial update of an asset row
///
/// Outer `None` leaves the column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub model: Option<Option<String>>,
    pub serial_number: Option<String>,
    pub location: Option<Option<String>>,
    pub status: Option<AssetStatus>,
    pub department: Option<Option<String>>,
    pub building: Option<Option<String>>,
    pub room: Option<Option<String>>,
    pub custodian: Option<Option<Custodian>>,
    pub purchase_date: Option<Option<String>>,
}

impl AssetPatch {
    /// Full replacement of the descriptive fields. Custodian is left as is.
    pub fn from_draft(draft: AssetDraft) -> Self {
        Self {
            name: Some(draft.name),
            model: Some(draft.model),
            serial_number: Some(draft.serial_number),
            location: Some(draft.location),
            status: Some(draft.status),
            department: Some(draft.department),
            building: Some(draft.building),
            room: Some(draft.room),
            custodian: None,
            purchase_date: Some(draft.purchase_date),
        }
    }

    pub fn status(status: AssetStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Repository for the `assets` table
pub struct AssetStore {
    clock: Arc<dyn Clock>,
}

impl AssetStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Insert a new asset with no custodian
    ///
    /// # Returns
    /// * `Err(AssetError::DuplicateSerialNumber)` - Serial already registered
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        draft: AssetDraft,
    ) -> Result<Asset, InternalError> {
        if self.serial_taken(conn, &draft.serial_number, None).await? {
            return Err(AssetError::DuplicateSerialNumber {
                serial_number: draft.serial_number,
            }
            .into());
        }

        let now = self.clock.now();
        let serial_number = draft.serial_number.clone();
        let model = asset::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(draft.name),
            model: Set(draft.model),
            serial_number: Set(draft.serial_number),
            location: Set(draft.location),
            status: Set(draft.status.as_str().to_string()),
            department: Set(draft.department),
            building: Set(draft.building),
            room: Set(draft.room),
            custodian_id: Set(None),
            custodian_name: Set(None),
            purchase_date: Set(draft.purchase_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(conn)
            .await
            .map_err(|e| map_write_error("insert_asset", e, &serial_number))?;

        Asset::try_from(inserted)
    }

    /// Whether another asset already carries this serial number
    pub async fn serial_taken(
        &self,
        conn: &impl ConnectionTrait,
        serial_number: &str,
        excluding_id: Option<&str>,
    ) -> Result<bool, InternalError> {
        let mut query = asset::Entity::find().filter(asset::Column::SerialNumber.eq(serial_number));
        if let Some(id) = excluding_id {
            query = query.filter(asset::Column::Id.ne(id));
        }

        let count = query
            .count(conn)
            .await
            .map_err(|e| InternalError::database("check_serial_number", e))?;
        Ok(count > 0)
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<Asset>, InternalError> {
        asset::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_asset_by_id", e))?
            .map(Asset::try_from)
            .transpose()
    }

    /// Assets ordered by name then serial number
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        filter: AssetFilter,
    ) -> Result<Vec<Asset>, InternalError> {
        let mut query = asset::Entity::find();
        match filter.status {
            Some(status) => {
                query = query.filter(asset::Column::Status.eq(status.as_str()));
            }
            None if !filter.include_retired => {
                query = query.filter(
                    asset::Column::Status.ne(AssetStatus::Decommissioned.as_str()),
                );
            }
            None => {}
        }

        query
            .order_by_asc(asset::Column::Name)
            .order_by_asc(asset::Column::SerialNumber)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_assets", e))?
            .into_iter()
            .map(Asset::try_from)
            .collect()
    }

    /// Apply a partial update and refresh `updated_at`
    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        patch: AssetPatch,
    ) -> Result<Asset, InternalError> {
        let existing = asset::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("load_asset_for_update", e))?
            .ok_or_else(|| AssetError::NotFound {
                asset_id: id.to_string(),
            })?;

        let serial_number = patch
            .serial_number
            .clone()
            .unwrap_or_else(|| existing.serial_number.clone());
        if patch.serial_number.is_some()
            && self.serial_taken(conn, &serial_number, Some(id)).await?
        {
            return Err(AssetError::DuplicateSerialNumber { serial_number }.into());
        }

        let mut model: asset::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(value) = patch.model {
            model.model = Set(value);
        }
        if let Some(serial) = patch.serial_number {
            model.serial_number = Set(serial);
        }
        if let Some(location) = patch.location {
            model.location = Set(location);
        }
        if let Some(status) = patch.status {
            model.status = Set(status.as_str().to_string());
        }
        if let Some(department) = patch.department {
            model.department = Set(department);
        }
        if let Some(building) = patch.building {
            model.building = Set(building);
        }
        if let Some(room) = patch.room {
            model.room = Set(room);
        }
        if let Some(custodian) = patch.custodian {
            let (custodian_id, custodian_name) = match custodian {
                Some(c) => (Some(c.id), Some(c.name)),
                None => (None, None),
            };
            model.custodian_id = Set(custodian_id);
            model.custodian_name = Set(custodian_name);
        }
        if let Some(purchase_date) = patch.purchase_date {
            model.purchase_date = Set(purchase_date);
        }
        model.updated_at = Set(self.clock.now());

        let updated = model
            .update(conn)
            .await
            .map_err(|e| map_write_error("update_asset", e, &serial_number))?;
        Asset::try_from(updated)
    }

    pub async fn count_all(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        asset::Entity::find()
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_assets", e))
    }
}

fn map_write_error(operation: &str, err: sea_orm::DbErr, serial_number: &str) -> InternalError {
    if is_unique_violation(&err) {
        AssetError::DuplicateSerialNumber {
            serial_number: serial_number.to_string(),
        }
        .into()
    } else {
        InternalError::database(operation, err)
    }
}
