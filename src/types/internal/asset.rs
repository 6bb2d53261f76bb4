use std::fmt;
use std::str::FromStr;

use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

use crate::errors::InternalError;
use crate::types::db::asset;

/// Equipment lifecycle status
///
/// `DECOMMISSIONED` is the retirement state; retired assets keep their row and
/// their activity trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    Operational,
    InRepair,
    Decommissioned,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Operational => "OPERATIONAL",
            AssetStatus::InRepair => "IN_REPAIR",
            AssetStatus::Decommissioned => "DECOMMISSIONED",
        }
    }

    pub fn is_retired(&self) -> bool {
        matches!(self, AssetStatus::Decommissioned)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical names and the legacy `active` / `in-repair` / `retired` spellings
impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPERATIONAL" | "active" => Ok(AssetStatus::Operational),
            "IN_REPAIR" | "in-repair" => Ok(AssetStatus::InRepair),
            "DECOMMISSIONED" | "retired" => Ok(AssetStatus::Decommissioned),
            other => Err(format!("unknown asset status '{}'", other)),
        }
    }
}

/// Equipment record as seen by the service layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
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

impl Asset {
    /// Every asset field is tracked, so the snapshot is the asset itself
    pub fn snapshot(&self) -> &Asset {
        self
    }
}

impl TryFrom<asset::Model> for Asset {
    type Error = InternalError;

    fn try_from(model: asset::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<AssetStatus>()
            .map_err(|e| InternalError::parse("asset_status", e))?;

        Ok(Self {
            id: model.id,
            name: model.name,
            model: model.model,
            serial_number: model.serial_number,
            location: model.location,
            status,
            department: model.department,
            building: model.building,
            room: model.room,
            custodian_id: model.custodian_id,
            custodian_name: model.custodian_name,
            purchase_date: model.purchase_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Field set for creating or fully replacing an asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub name: String,
    pub model: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
    pub status: AssetStatus,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
    pub purchase_date: Option<String>,
}

/// Partial custodian/location reassignment. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPatch {
    pub custodian_id: Option<String>,
    pub clear_custodian: bool,
    pub location: Option<String>,
    pub department: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        self.custodian_id.is_none()
            && !self.clear_custodian
            && self.location.is_none()
            && self.department.is_none()
            && self.building.is_none()
            && self.room.is_none()
    }
}
