use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{ApiResponse, OpenApi, Tags, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::coordinators::AssetCoordinator;
use crate::errors::ManagementError;
use crate::providers::TokenProvider;
use crate::stores::AssetFilter;
use crate::types::dto::activity::ActivityResponse;
use crate::types::dto::asset::{
    AssetRequest, AssetResponse, AssignAssetRequest, UpdateAssetStatusRequest, parse_asset_status,
};
use crate::types::internal::context::RequestContext;

/// API tags for asset endpoints
#[derive(Tags)]
enum AssetTags {
    /// Equipment register
    Assets,
}

#[derive(ApiResponse)]
pub enum CreateAssetResponse {
    /// Asset registered
    #[oai(status = 201)]
    Created(Json<AssetResponse>),
}

/// Asset management API endpoints
pub struct AssetApi {
    asset_coordinator: Arc<AssetCoordinator>,
    token_provider: Arc<TokenProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AssetApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            token_provider: app_data.token_provider.clone(),
            audit_logger: app_data.audit_logger.clone(),
            asset_coordinator: Arc::new(AssetCoordinator::new(app_data)),
        }
    }

    async fn context(&self, req: &Request, auth: BearerAuth) -> Result<RequestContext, ManagementError> {
        helpers::create_request_context(req, Some(auth.0), &self.token_provider, &self.audit_logger)
            .await
            .map_err(ManagementError::from_internal_error)
    }
}

#[OpenApi]
impl AssetApi {
    /// Register a new asset. Serial numbers are unique.
    #[oai(path = "/assets", method = "post", tag = "AssetTags::Assets")]
    async fn create_asset(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<AssetRequest>,
    ) -> Result<CreateAssetResponse, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let draft = body.0.into_draft()?;
        let asset = self.asset_coordinator.create_asset(&ctx, draft).await?;

        Ok(CreateAssetResponse::Created(Json(AssetResponse::from(asset))))
    }

    /// List assets
    ///
    /// Filtering by status returns exactly that status. Without a filter,
    /// decommissioned assets are hidden unless `include_retired` is set.
    #[oai(path = "/assets", method = "get", tag = "AssetTags::Assets")]
    async fn list_assets(
        &self,
        req: &Request,
        auth: BearerAuth,
        status: Query<Option<String>>,
        include_retired: Query<Option<bool>>,
    ) -> Result<Json<Vec<AssetResponse>>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let status = status.0.as_deref().map(parse_asset_status).transpose()?;
        let filter = AssetFilter {
            status,
            include_retired: include_retired.0.unwrap_or(false),
        };
        let assets = self.asset_coordinator.list_assets(&ctx, filter).await?;

        Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
    }

    #[oai(path = "/assets/:id", method = "get", tag = "AssetTags::Assets")]
    async fn get_asset(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<AssetResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let asset = self.asset_coordinator.get_asset(&ctx, &id.0).await?;

        Ok(Json(AssetResponse::from(asset)))
    }

    /// Replace the descriptive fields of an asset. The custodian is kept.
    #[oai(path = "/assets/:id", method = "put", tag = "AssetTags::Assets")]
    async fn update_asset(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<AssetRequest>,
    ) -> Result<Json<AssetResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let draft = body.0.into_draft()?;
        let asset = self.asset_coordinator.update_asset(&ctx, &id.0, draft).await?;

        Ok(Json(AssetResponse::from(asset)))
    }

    /// Change only the status. Also used to bring a retired asset back.
    #[oai(path = "/assets/:id/status", method = "patch", tag = "AssetTags::Assets")]
    async fn update_status(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateAssetStatusRequest>,
    ) -> Result<Json<AssetResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let status = parse_asset_status(&body.status)?;
        let asset = self.asset_coordinator.update_status(&ctx, &id.0, status).await?;

        Ok(Json(AssetResponse::from(asset)))
    }

    /// Reassign custodian and location fields
    #[oai(path = "/assets/:id/assign", method = "post", tag = "AssetTags::Assets")]
    async fn assign_asset(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<AssignAssetRequest>,
    ) -> Result<Json<AssetResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let asset = self
            .asset_coordinator
            .assign_asset(&ctx, &id.0, body.0.into())
            .await?;

        Ok(Json(AssetResponse::from(asset)))
    }

    /// Retire an asset. The row and its activity trail are kept.
    #[oai(path = "/assets/:id", method = "delete", tag = "AssetTags::Assets")]
    async fn retire_asset(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<AssetResponse>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let asset = self.asset_coordinator.retire_asset(&ctx, &id.0).await?;

        Ok(Json(AssetResponse::from(asset)))
    }

    /// Activity trail of an asset, oldest first
    #[oai(path = "/assets/:id/activity", method = "get", tag = "AssetTags::Assets")]
    async fn list_activity(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<Vec<ActivityResponse>>, ManagementError> {
        let ctx = self.context(req, auth).await?;
        let entries = self.asset_coordinator.list_activity(&ctx, &id.0).await?;

        Ok(Json(entries.into_iter().map(ActivityResponse::from).collect()))
    }
}
