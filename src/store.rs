use async_trait::async_trait;

use crate::error::StoreError;
use crate::inventory::ArchiveRecord;

/// An inventory-retrieval job that was started for a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryJob {
    pub job_id: String,
    pub vault_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Ready,
    /// The service gave up on the job; carries its status message.
    Failed(String),
}

/// The narrow request/response surface of the archive storage service.
///
/// `GlacierStore` talks to Amazon Glacier; tests substitute a scripted fake.
#[async_trait]
pub trait VaultStore: Send + Sync {
    async fn describe_vault(&self, vault: &str) -> Result<(), StoreError>;

    async fn initiate_inventory_job(&self, vault: &str) -> Result<InventoryJob, StoreError>;

    async fn poll_job_status(&self, job: &InventoryJob) -> Result<JobStatus, StoreError>;

    async fn get_job_output(&self, job: &InventoryJob) -> Result<Vec<ArchiveRecord>, StoreError>;

    async fn delete_archive(&self, vault: &str, archive_id: &str) -> Result<(), StoreError>;

    async fn delete_vault(&self, vault: &str) -> Result<(), StoreError>;
}
