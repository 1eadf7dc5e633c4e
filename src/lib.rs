//! Empty Amazon Glacier vaults archive by archive and delete them.
//!
//! For every vault in a list, an inventory-retrieval job is started and
//! polled until ready, each archive in the inventory is deleted (backing off
//! whenever Glacier throttles), and finally the vault itself is deleted.
//! All calls to Glacier go through the [`VaultStore`] trait.

pub mod batch;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod glacier_aux;
pub mod inventory;
pub mod logging;
pub mod metrics;
pub mod processor;
pub mod retry;
pub mod store;

#[cfg(test)]
mod testing;

pub use batch::{run_batch, BatchReport, VaultOutcome};
pub use client::{get_client, get_region_client};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ProcessorSettings, Settings};
pub use error::{StoreError, VaultError};
pub use glacier_aux::GlacierStore;
pub use inventory::ArchiveRecord;
pub use metrics::RunMetrics;
pub use processor::remove_all_archives_and_vault;
pub use store::{InventoryJob, JobStatus, VaultStore};
