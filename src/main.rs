use std::process::ExitCode;
use tracing::info;

use glacier_cleanup::{client, logging, run_batch, GlacierStore, Settings, SystemClock};


/// Empty and delete every vault listed in the vault-list file.
/// Exits non-zero only when the settings or the vault list can not be read;
/// failures of individual vaults are logged and the batch carries on.
#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init_file_logging(&settings.log_file, settings.log_level) {
        eprintln!("Could not open log file {}: {err}. Logging to stderr.", settings.log_file.display());
        logging::init_stderr_logging(settings.log_level);
    }

    let (region, glacier_client) = client::get_region_client(&settings.region).await;
    info!("Using Glacier in region {region}");
    let store = GlacierStore::new(glacier_client);

    match run_batch(&store, &SystemClock, &settings.processor, &settings.vault_list).await {
        Ok(report) => {
            println!(
                "Processed {} vault(s): {} deleted, {} failed. See {} for details.",
                report.outcomes.len(),
                report.succeeded(),
                report.failed(),
                settings.log_file.display()
            );
            ExitCode::SUCCESS
        }
        // already logged by the batch runner
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
