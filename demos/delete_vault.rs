use std::process::ExitCode;
use glacier_cleanup::{get_client, remove_all_archives_and_vault, GlacierStore, Settings, SystemClock};


/// example that empties and deletes a single vault given on the command line.
/// Logs go to stderr instead of the log file.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(vault) = std::env::args().nth(1) else {
        eprintln!("usage: delete_vault <vault-name>");
        return ExitCode::FAILURE;
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let store = GlacierStore::new(get_client(&settings.region).await);
    match remove_all_archives_and_vault(&store, &SystemClock, &settings.processor, &vault).await {
        Ok(metrics) => {
            println!("{}", metrics.summary_line());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error while deleting vault {vault}: {err}");
            ExitCode::FAILURE
        }
    }
}
