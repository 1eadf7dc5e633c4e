use serde::Deserialize;

use crate::error::StoreError;

/// One archive as listed in a vault inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveRecord {
    pub archive_id: String,
    #[serde(default)]
    pub archive_description: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename = "SHA256TreeHash")]
    pub sha256_tree_hash: String,
}

/// The JSON document produced by an `inventory-retrieval` job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryReport {
    #[serde(default, rename = "VaultARN")]
    pub vault_arn: String,
    #[serde(default)]
    pub inventory_date: String,
    pub archive_list: Vec<ArchiveRecord>,
}

impl InventoryReport {
    pub fn parse(data: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(data).map_err(|err| StoreError::Service {
            operation: "parse_inventory".to_owned(),
            message: err.to_string(),
        })
    }

    pub fn total_size(&self) -> u64 {
        self.archive_list.iter().map(|a| a.size).sum()
    }
}
