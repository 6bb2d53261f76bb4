use poem_openapi::Object;

use crate::errors::InternalError;
use crate::types::internal::asset::{Asset, AssetDraft, AssetStatus, AssignmentPatch};

#[derive(Object, Debug, Clone)]
pub struct AssetResponse {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
    pub status: AssetStatus,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
    pub custodian_id: Option<String>,
    pub custodian_name: Option<String>,
    pub purchase_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            model: asset.model,
            serial_number: asset.serial_number,
            location: asset.location,
            status: asset.status,
            department: asset.department,
            building: asset.building,
            room: asset.room,
            custodian_id: asset.custodian_id,
            custodian_name: asset.custodian_name,
            purchase_date: asset.purchase_date,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

/// Body for asset creation and full update
///
/// `status` accepts `OPERATIONAL`, `IN_REPAIR`, `DECOMMISSIONED` and the legacy
/// `active`, `in-repair`, `retired` spellings. Defaults to `OPERATIONAL`.
#[derive(Object, Debug, Clone)]
pub struct AssetRequest {
    pub name: String,
    pub model: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
    /// `YYYY-MM-DD`
    pub purchase_date: Option<String>,
}

impl AssetRequest {
    pub fn into_draft(self) -> Result<AssetDraft, InternalError> {
        let status = match self.status.as_deref() {
            Some(raw) => parse_asset_status(raw)?,
            None => AssetStatus::Operational,
        };

        Ok(AssetDraft {
            name: self.name,
            model: self.model,
            serial_number: self.serial_number,
            location: self.location,
            status,
            department: self.department,
            building: self.building,
            room: self.room,
            purchase_date: self.purchase_date,
        })
    }
}

/// Parse a status from request input, legacy spellings included
pub fn parse_asset_status(raw: &str) -> Result<AssetStatus, InternalError> {
    raw.parse::<AssetStatus>()
        .map_err(|e| InternalError::validation("status", e))
}

#[derive(Object, Debug)]
pub struct UpdateAssetStatusRequest {
    pub status: String,
}

/// Custodian and location reassignment. Omitted fields are left unchanged.
#[derive(Object, Debug, Default)]
pub struct AssignAssetRequest {
    pub custodian_id: Option<String>,
    /// Remove the current custodian
    pub clear_custodian: Option<bool>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
}

impl From<AssignAssetRequest> for AssignmentPatch {
    fn from(request: AssignAssetRequest) -> Self {
        Self {
            custodian_id: request.custodian_id,
            clear_custodian: request.clear_custodian.unwrap_or(false),
            location: request.location,
            department: request.department,
            building: request.building,
            room: request.room,
        }
    }
}
