use std::path::Path;
use tracing::{error, info};

use crate::clock::Clock;
use crate::config::ProcessorSettings;
use crate::error::VaultError;
use crate::metrics::RunMetrics;
use crate::processor::remove_all_archives_and_vault;
use crate::store::VaultStore;

/// Result of processing one vault of the batch.
#[derive(Debug)]
pub struct VaultOutcome {
    pub vault: String,
    pub result: Result<RunMetrics, VaultError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<VaultOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// One vault name per line; surrounding whitespace is trimmed and blank lines skipped.
pub fn parse_vault_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

pub async fn read_vault_names(path: &Path) -> Result<Vec<String>, VaultError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(parse_vault_names(&contents)),
        Err(source) => {
            error!("Error: vault list '{}' could not be read: {source}", path.display());
            Err(VaultError::ConfigMissing {
                path: path.to_owned(),
                source,
            })
        }
    }
}

/// Read the vault list at `path` and empty and delete each vault in file order.
/// Only failure to read the list aborts; per-vault errors end up in the report.
pub async fn run_batch<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    path: &Path,
) -> Result<BatchReport, VaultError>
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let vault_names = read_vault_names(path).await?;
    if vault_names.is_empty() {
        error!(
            "No vaults to process. Ensure '{}' contains vault names.",
            path.display()
        );
    }
    Ok(process_vaults(store, clock, settings, &vault_names).await)
}

pub async fn process_vaults<S, C>(
    store: &S,
    clock: &C,
    settings: &ProcessorSettings,
    vault_names: &[String],
) -> BatchReport
where
    S: VaultStore + ?Sized,
    C: Clock + ?Sized,
{
    let mut report = BatchReport::default();
    for vault in vault_names {
        info!("Processing vault: {vault}");
        let result = remove_all_archives_and_vault(store, clock, settings, vault).await;
        if let Err(err) = &result {
            error!("Vault {vault} skipped: {err}");
        }
        report.outcomes.push(VaultOutcome {
            vault: vault.clone(),
            result,
        });
    }

    info!(
        "Batch finished: {} vault(s) deleted, {} failed",
        report.succeeded(),
        report.failed()
    );
    report
}
