use std::{io, path::PathBuf};
use thiserror::Error;

/// What a single `VaultStore` call can report back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("vault not empty: {0}")]
    NotEmpty(String),

    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },
}

impl StoreError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, StoreError::Throttled(_))
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault list could not be read. Aborts the whole run.
    #[error("vault list {} could not be read: {source}", .path.display())]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("setting {key} has invalid value '{value}'")]
    InvalidSetting { key: String, value: String },

    #[error("vault {0} does not exist")]
    VaultNotFound(String),

    #[error("inventory job for vault {vault} not complete after {polls} polls")]
    JobTimeout { vault: String, polls: u32 },

    #[error("inventory job {job_id} for vault {vault} failed: {reason}")]
    JobFailed {
        vault: String,
        job_id: String,
        reason: String,
    },

    #[error("{failed} of {total} archives in vault {vault} could not be deleted")]
    DeleteFailed {
        vault: String,
        failed: usize,
        total: usize,
    },

    #[error("vault {0} still contains archives")]
    VaultNotEmpty(String),

    #[error("{operation} on vault {vault} failed: {message}")]
    Service {
        vault: String,
        operation: String,
        message: String,
    },
}

impl VaultError {
    /// Fatal errors abort the batch; everything else only skips the current vault.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VaultError::ConfigMissing { .. } | VaultError::InvalidSetting { .. }
        )
    }

    /// Attach vault context to a store error that has no more specific mapping.
    /// `NotFound` only means a missing vault for `describe_vault`; for any other
    /// operation it is the job or resource that is gone, not the vault.
    pub fn from_store(vault: &str, operation: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) if operation == "describe_vault" => {
                VaultError::VaultNotFound(vault.to_owned())
            }
            StoreError::NotFound(msg) => VaultError::Service {
                vault: vault.to_owned(),
                operation: operation.to_owned(),
                message: format!("not found: {msg}"),
            },
            StoreError::NotEmpty(_) => VaultError::VaultNotEmpty(vault.to_owned()),
            StoreError::Throttled(msg) => VaultError::Service {
                vault: vault.to_owned(),
                operation: operation.to_owned(),
                message: format!("still throttled after retries: {msg}"),
            },
            StoreError::Service { message, .. } => VaultError::Service {
                vault: vault.to_owned(),
                operation: operation.to_owned(),
                message,
            },
        }
    }
}
