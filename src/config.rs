//! Run settings. Defaults match the original clean-up script; each one can be
//! overridden through a `GLACIER_*` environment variable.

use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::Level;

use crate::error::VaultError;
use crate::retry::ThrottlePolicy;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_VAULT_LIST: &str = "VaultsToBeDeleted.txt";
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Knobs of the per-vault lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSettings {
    /// Wait between two inventory-job status checks.
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub throttle: ThrottlePolicy,
    /// Pause for `pace_pause` after every `pace_every` archives; 0 disables pacing.
    pub pace_every: usize,
    pub pace_pause: Duration,
    pub progress_every: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(20 * 60),
            max_polls: 72,
            throttle: ThrottlePolicy::default(),
            pace_every: 100,
            pace_pause: Duration::from_secs(1),
            progress_every: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub region: String,
    pub vault_list: PathBuf,
    pub log_file: PathBuf,
    pub log_level: Level,
    pub processor: ProcessorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            vault_list: PathBuf::from(DEFAULT_VAULT_LIST),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: Level::INFO,
            processor: ProcessorSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, VaultError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(region) = lookup("GLACIER_REGION") {
            settings.region = region;
        }
        if let Some(path) = lookup("GLACIER_VAULT_LIST") {
            settings.vault_list = PathBuf::from(path);
        }
        if let Some(path) = lookup("GLACIER_LOG_FILE") {
            settings.log_file = PathBuf::from(path);
        }
        if let Some(level) = parsed(&lookup, "GLACIER_LOG_LEVEL")? {
            settings.log_level = level;
        }

        let p = &mut settings.processor;
        if let Some(secs) = parsed(&lookup, "GLACIER_POLL_INTERVAL_SECS")? {
            p.poll_interval = Duration::from_secs(secs);
        }
        if let Some(n) = parsed::<u32, _>(&lookup, "GLACIER_MAX_POLLS")? {
            // zero polls would time out without ever checking the job
            if n == 0 {
                return Err(VaultError::InvalidSetting {
                    key: "GLACIER_MAX_POLLS".to_owned(),
                    value: n.to_string(),
                });
            }
            p.max_polls = n;
        }
        if let Some(secs) = parsed(&lookup, "GLACIER_THROTTLE_BACKOFF_SECS")? {
            p.throttle.backoff = Duration::from_secs(secs);
        }
        if let Some(n) = parsed(&lookup, "GLACIER_MAX_THROTTLE_RETRIES")? {
            p.throttle.max_retries = n;
        }
        if let Some(n) = parsed(&lookup, "GLACIER_PACE_EVERY")? {
            p.pace_every = n;
        }
        if let Some(secs) = parsed(&lookup, "GLACIER_PACE_PAUSE_SECS")? {
            p.pace_pause = Duration::from_secs(secs);
        }
        if let Some(n) = parsed(&lookup, "GLACIER_PROGRESS_EVERY")? {
            p.progress_every = n;
        }

        Ok(settings)
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>, VaultError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| VaultError::InvalidSetting {
                key: key.to_owned(),
                value,
            }),
    }
}
