use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {asset_id}")]
    NotFound { asset_id: String },

    #[error("Serial number already registered: {serial_number}")]
    DuplicateSerialNumber { serial_number: String },

    #[error("Asset {asset_id} is retired")]
    Retired { asset_id: String },

    #[error("Custodian not found: {user_id}")]
    CustodianNotFound { user_id: String },
}
