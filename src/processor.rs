//! Empties one vault and deletes it.
//!
//! The lifecycle is strictly sequential: describe the vault, start an
//! inventory-retrieval job, poll it until ready, delete every listed archive,
//! then delete the vault. The vault delete is only issued once every archive
//! from the inventory has been acknowledged as deleted.

use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::config::ProcessorSettings;
use crate::error::{StoreError, VaultError};
use crate::inventory::ArchiveRecord;
use crate::metrics::RunMetrics;
use crate::retry::with_throttle_retry;
use crate::store::{InventoryJob, JobStatus, VaultStore};

const SEPARATOR: &str =
    "#######################################################################################";

/// Remove all archives from `vault` and then the vault itself.
/// Returns the collected metrics; the summary line has already been logged.
pub async fn remove_all_archives_and_vault<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault: &str,
) -> Result<RunMetrics, VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    info!("{SEPARATOR}");
    let mut metrics = RunMetrics::start(vault, clock.now());
    info!(
        "{}: Starting process to delete archives and vault: {vault}",
        metrics.start_time
    );

    check_vault_exists(store, clock, settings, vault).await?;

    let job = initiate_inventory(store, clock, settings, vault).await?;
    wait_for_job(store, clock, settings, &job).await?;
    metrics.job_completion_time = Some(clock.now());
    info!("Inventory job {} for vault {vault} is ready", job.job_id);

    let archives = with_throttle_retry(clock, &settings.throttle, "get_job_output", || {
        store.get_job_output(&job)
    })
    .await
    .result
    .map_err(|err| VaultError::from_store(vault, "get_job_output", err))?;

    metrics.archive_count = archives.len();
    info!("Number of Archives: {}", archives.len());
    info!("Processing deletions in vault {vault}");

    delete_archives(store, clock, settings, vault, &archives, &mut metrics).await;

    info!("Total Archives: {}", metrics.archive_count);
    info!("Total SUCCESS: {}", metrics.deleted);
    info!("Total FAIL: {}", metrics.failed);
    info!("Total throttle retries: {}", metrics.throttle_retries);

    let outcome = if metrics.failed > 0 {
        error!("Not deleting vault {vault}: {} archive(s) could not be deleted", metrics.failed);
        Err(VaultError::DeleteFailed {
            vault: vault.to_owned(),
            failed: metrics.failed,
            total: metrics.archive_count,
        })
    } else {
        delete_vault(store, clock, settings, vault).await
    };

    metrics.end_time = Some(clock.now());
    info!("{}", metrics.summary_line());

    outcome.map(|()| metrics)
}

async fn check_vault_exists<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault: &str,
) -> Result<(), VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let attempted = with_throttle_retry(clock, &settings.throttle, "describe_vault", || {
        store.describe_vault(vault)
    })
    .await;

    match attempted.result {
        Ok(()) => Ok(()),
        Err(StoreError::NotFound(_)) => {
            error!("Error: Vault {vault} does not exist. Skipping.");
            Err(VaultError::VaultNotFound(vault.to_owned()))
        }
        Err(err) => {
            error!("Error checking vault existence for {vault}: {err}");
            Err(VaultError::from_store(vault, "describe_vault", err))
        }
    }
}

async fn initiate_inventory<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault: &str,
) -> Result<InventoryJob, VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let job = with_throttle_retry(clock, &settings.throttle, "initiate_job", || {
        store.initiate_inventory_job(vault)
    })
    .await
    .result
    .map_err(|err| VaultError::from_store(vault, "initiate_job", err))?;

    info!("Initiated inventory job {} for vault {vault}", job.job_id);
    Ok(job)
}

/// Poll the job at `poll_interval` until it is ready, checking once right away.
/// Gives up with `JobTimeout` after `max_polls` checks.
async fn wait_for_job<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    job: &InventoryJob,
) -> Result<(), VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let vault = job.vault_name.as_str();
    for poll in 1..=settings.max_polls {
        info!("Checking job status as of {}...", clock.now());
        let status = with_throttle_retry(clock, &settings.throttle, "describe_job", || {
            store.poll_job_status(job)
        })
        .await
        .result
        .map_err(|err| VaultError::from_store(vault, "describe_job", err))?;

        match status {
            JobStatus::Ready => return Ok(()),
            JobStatus::Failed(reason) => {
                error!("Inventory job {} for vault {vault} failed: {reason}", job.job_id);
                return Err(VaultError::JobFailed {
                    vault: vault.to_owned(),
                    job_id: job.job_id.clone(),
                    reason,
                });
            }
            JobStatus::Pending if poll < settings.max_polls => {
                clock.sleep(settings.poll_interval).await;
            }
            JobStatus::Pending => {}
        }
    }

    error!(
        "Inventory job {} for vault {vault} not complete after {} polls",
        job.job_id, settings.max_polls
    );
    Err(VaultError::JobTimeout {
        vault: vault.to_owned(),
        polls: settings.max_polls,
    })
}

/// Delete every archive in order, tallying successes and failures in `metrics`.
/// A failing archive does not stop the loop.
async fn delete_archives<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault: &str,
    archives: &[ArchiveRecord],
    metrics: &mut RunMetrics,
) where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    for (idx, archive) in archives.iter().enumerate() {
        let attempted = with_throttle_retry(clock, &settings.throttle, "delete_archive", || {
            store.delete_archive(vault, &archive.archive_id)
        })
        .await;
        metrics.throttle_retries += attempted.retries;

        match attempted.result {
            Ok(()) => {
                debug!("ArchiveID #{idx}: Delete SUCCEEDED");
                metrics.deleted += 1;
            }
            Err(StoreError::NotFound(_)) => {
                debug!("ArchiveID #{idx}: already deleted");
                metrics.deleted += 1;
            }
            Err(err) => {
                error!("ArchiveID #{idx}: Delete FAILED - {err}");
                metrics.failed += 1;
            }
        }

        let processed = idx + 1;
        if settings.progress_every > 0 && processed % settings.progress_every == 0 {
            info!("{} Progress: {processed} processed...", clock.now());
        }
        if settings.pace_every > 0 && processed % settings.pace_every == 0 {
            clock.sleep(settings.pace_pause).await;
        }
    }
}

async fn delete_vault<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault: &str,
) -> Result<(), VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let attempted = with_throttle_retry(clock, &settings.throttle, "delete_vault", || {
        store.delete_vault(vault)
    })
    .await;

    match attempted.result {
        Ok(()) => {
            info!("Vault {vault} deleted");
            Ok(())
        }
        Err(err) => {
            error!("Deleting vault {vault} failed: {err}");
            Err(VaultError::from_store(vault, "delete_vault", err))
        }
    }
}
