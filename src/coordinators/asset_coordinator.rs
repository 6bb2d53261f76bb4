use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::coordinators::authorize;
use crate::coordinators::user_coordinator::resolve_actor_names;
use crate::errors::InternalError;
use crate::errors::internal::AssetError;
use crate::providers::mutation_provider::to_state;
use crate::providers::{MutationProvider, Operation, input_validator};
use crate::stores::{ActivityStore, AssetFilter, AssetPatch, AssetStore, Custodian, UserStore};
use crate::types::internal::activity::{ActivityAction, ActivityEntry, EntityType};
use crate::types::internal::asset::{Asset, AssetDraft, AssetStatus, AssignmentPatch};
use crate::types::internal::context::RequestContext;

/// Equipment coordinator
///
/// Retirement is the transition to DECOMMISSIONED; asset rows are never removed.
/// A retired asset rejects update, assign and retire, but a status change may
/// bring it back into service.
pub struct AssetCoordinator {
    db: DatabaseConnection,
    asset_store: Arc<AssetStore>,
    user_store: Arc<UserStore>,
    activity_store: Arc<ActivityStore>,
    mutation_provider: Arc<MutationProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AssetCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.main.clone(),
            asset_store: app_data.asset_store.clone(),
            user_store: app_data.user_store.clone(),
            activity_store: app_data.activity_store.clone(),
            mutation_provider: app_data.mutation_provider.clone(),
            audit_logger: app_data.audit_logger.clone(),
        }
    }

    /// Register a new asset
    ///
    /// # Returns
    /// * `Err(AssetError::DuplicateSerialNumber)` - Serial already registered; no record written
    pub async fn create_asset(
        &self,
        ctx: &RequestContext,
        draft: AssetDraft,
    ) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::CreateAsset, None).await?;
        validate_draft(&draft)?;

        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let asset = self.asset_store.insert(&txn, draft).await?;
        self.mutation_provider
            .record(
                &txn,
                ctx,
                EntityType::Asset,
                &asset.id,
                ActivityAction::Created,
                None,
                Some(to_state(asset.snapshot())?),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!(
            "Asset {} ({}) created by {}",
            asset.id,
            asset.serial_number,
            ctx.actor_id
        );
        Ok(asset)
    }

    pub async fn list_assets(
        &self,
        ctx: &RequestContext,
        filter: AssetFilter,
    ) -> Result<Vec<Asset>, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ListAssets, None).await?;
        self.asset_store.list(&self.db, filter).await
    }

    pub async fn get_asset(&self, ctx: &RequestContext, asset_id: &str) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ViewAsset, None).await?;
        self.asset_store
            .find_by_id(&self.db, asset_id)
            .await?
            .ok_or_else(|| not_found(asset_id))
    }

    /// Full replacement of the descriptive fields. The custodian is kept.
    pub async fn update_asset(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        draft: AssetDraft,
    ) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::UpdateAsset, None).await?;
        validate_draft(&draft)?;

        let _lock = self.mutation_provider.lock(EntityType::Asset, asset_id).await;
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let after = self
            .apply(
                &txn,
                ctx,
                asset_id,
                ActivityAction::Updated,
                true,
                AssetPatch::from_draft(draft),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Asset {} updated by {}", asset_id, ctx.actor_id);
        Ok(after)
    }

    /// Change only the status. Allowed on retired assets (reactivation).
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        status: AssetStatus,
    ) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::UpdateAssetStatus, None).await?;

        let _lock = self.mutation_provider.lock(EntityType::Asset, asset_id).await;
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let after = self
            .apply(
                &txn,
                ctx,
                asset_id,
                ActivityAction::StatusChanged,
                false,
                AssetPatch::status(status),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Asset {} status set to {} by {}", asset_id, status, ctx.actor_id);
        Ok(after)
    }

    /// Reassign custodian and/or location fields
    ///
    /// # Returns
    /// * `Err(InternalError::Validation)` - Nothing to change
    /// * `Err(AssetError::CustodianNotFound)` - Custodian id is not an active user
    /// * `Err(AssetError::Retired)` - Asset is decommissioned
    pub async fn assign_asset(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
        assignment: AssignmentPatch,
    ) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::AssignAsset, None).await?;
        if assignment.is_empty() {
            return Err(InternalError::validation(
                "assignment",
                "At least one of custodian or location fields must be provided",
            ));
        }

        let _lock = self.mutation_provider.lock(EntityType::Asset, asset_id).await;
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;

        let custodian = if assignment.clear_custodian {
            Some(None)
        } else if let Some(custodian_id) = &assignment.custodian_id {
            let holder = self
                .user_store
                .find_by_id(&txn, custodian_id)
                .await?
                .ok_or_else(|| AssetError::CustodianNotFound {
                    user_id: custodian_id.clone(),
                })?;
            Some(Some(Custodian {
                id: holder.id,
                name: holder.name,
            }))
        } else {
            None
        };

        let patch = AssetPatch {
            custodian,
            location: assignment.location.map(Some),
            department: assignment.department.map(Some),
            building: assignment.building.map(Some),
            room: assignment.room.map(Some),
            ..Default::default()
        };
        let after = self
            .apply(&txn, ctx, asset_id, ActivityAction::Assigned, true, patch)
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Asset {} reassigned by {}", asset_id, ctx.actor_id);
        Ok(after)
    }

    /// Retire an asset by moving it to DECOMMISSIONED
    pub async fn retire_asset(&self, ctx: &RequestContext, asset_id: &str) -> Result<Asset, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::RetireAsset, None).await?;

        let _lock = self.mutation_provider.lock(EntityType::Asset, asset_id).await;
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let after = self
            .apply(
                &txn,
                ctx,
                asset_id,
                ActivityAction::Retired,
                true,
                AssetPatch::status(AssetStatus::Decommissioned),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Asset {} retired by {}", asset_id, ctx.actor_id);
        Ok(after)
    }

    /// Activity trail of an asset, oldest first
    pub async fn list_activity(
        &self,
        ctx: &RequestContext,
        asset_id: &str,
    ) -> Result<Vec<ActivityEntry>, InternalError> {
        authorize(&self.audit_logger, ctx, Operation::ViewAssetActivity, None).await?;

        if self.asset_store.find_by_id(&self.db, asset_id).await?.is_none() {
            return Err(not_found(asset_id));
        }

        let records = self
            .activity_store
            .list_for(&self.db, EntityType::Asset, asset_id)
            .await?;
        resolve_actor_names(&self.db, &self.user_store, records).await
    }

    /// Read before, patch, read after, append the record
    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        ctx: &RequestContext,
        asset_id: &str,
        action: ActivityAction,
        reject_retired: bool,
        patch: AssetPatch,
    ) -> Result<Asset, InternalError> {
        let before = self
            .asset_store
            .find_by_id(txn, asset_id)
            .await?
            .ok_or_else(|| not_found(asset_id))?;

        if reject_retired && before.status.is_retired() {
            tracing::warn!("Rejected {} on retired asset {}", action, asset_id);
            return Err(AssetError::Retired {
                asset_id: asset_id.to_string(),
            }
            .into());
        }

        let after = self.asset_store.update(txn, asset_id, patch).await?;

        self.mutation_provider
            .record(
                txn,
                ctx,
                EntityType::Asset,
                asset_id,
                action,
                Some(to_state(before.snapshot())?),
                Some(to_state(after.snapshot())?),
            )
            .await?;

        Ok(after)
    }
}

fn validate_draft(draft: &AssetDraft) -> Result<(), InternalError> {
    input_validator::validate_required("name", &draft.name)?;
    input_validator::validate_required("serial_number", &draft.serial_number)?;
    if let Some(date) = &draft.purchase_date {
        input_validator::validate_purchase_date(date)?;
    }
    Ok(())
}

fn not_found(asset_id: &str) -> InternalError {
    AssetError::NotFound {
        asset_id: asset_id.to_string(),
    }
    .into()
}
