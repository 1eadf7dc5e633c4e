use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::Mutex};
use tracing::Level;


/// Send all log lines to `path`, appending to what earlier runs wrote.
pub fn init_file_logging(path: &Path, level: Level) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}

/// Fallback when the log file can not be opened.
pub fn init_stderr_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
