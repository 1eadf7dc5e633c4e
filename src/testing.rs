//! In-memory `VaultStore` and log capture shared by the unit tests.

use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};
use async_trait::async_trait;
use tracing::Level;

use crate::clock::ManualClock;
use crate::error::StoreError;
use crate::inventory::ArchiveRecord;
use crate::store::{InventoryJob, JobStatus, VaultStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribeVault(String),
    InitiateJob(String),
    PollJob(String),
    GetJobOutput(String),
    DeleteArchive { vault: String, archive_id: String },
    DeleteVault(String),
}

#[derive(Debug, Default)]
struct FakeVault {
    /// What is really stored.
    contents: BTreeSet<String>,
    /// What the inventory job reports, in order.
    inventory: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    vaults: HashMap<String, FakeVault>,
    calls: Vec<Call>,
    polls: HashMap<String, u32>,
    throttles: HashMap<String, u32>,
    /// Errors to answer for the next N calls of an operation, by operation name.
    scripted: HashMap<&'static str, (StoreError, u32)>,
    next_job: u32,
}

impl Inner {
    fn scripted(&mut self, operation: &str) -> Result<(), StoreError> {
        match self.scripted.get_mut(operation) {
            Some((err, left)) if *left > 0 => {
                *left -= 1;
                Err(err.clone())
            }
            _ => Ok(()),
        }
    }
}

/// Scripted stand-in for Glacier. Every call is journaled.
pub struct FakeStore {
    clock: ManualClock,
    inner: Mutex<Inner>,
    job_ready_after: u32,
    job_failure: Option<String>,
    delete_cost: Duration,
}

impl FakeStore {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
            job_ready_after: 0,
            job_failure: None,
            delete_cost: Duration::ZERO,
        }
    }

    /// Add a vault holding `archives` archives named `{vault}-archive-{i}`.
    pub fn with_vault(self, vault: &str, archives: usize) -> Self {
        {
            let mut inner = self.lock();
            let entry = inner.vaults.entry(vault.to_owned()).or_default();
            for i in 0..archives {
                let id = format!("{vault}-archive-{i}");
                entry.contents.insert(id.clone());
                entry.inventory.push(id);
            }
        }
        self
    }

    /// Number of pending polls before a job reports ready.
    pub fn job_ready_after(mut self, polls: u32) -> Self {
        self.job_ready_after = polls;
        self
    }

    pub fn job_fails(mut self, reason: &str) -> Self {
        self.job_failure = Some(reason.to_owned());
        self
    }

    /// Each successful archive delete advances the clock by `cost`.
    pub fn delete_takes(mut self, cost: Duration) -> Self {
        self.delete_cost = cost;
        self
    }

    /// Answer `Throttled` the first `times` deletes of `archive_id`.
    pub fn throttle_archive(self, archive_id: &str, times: u32) -> Self {
        self.lock().throttles.insert(archive_id.to_owned(), times);
        self
    }

    /// Answer `err` the next `times` calls of `operation`, one of `describe_vault`,
    /// `initiate_job`, `describe_job`, `get_job_output` or `delete_vault`.
    pub fn fail_op(self, operation: &'static str, err: StoreError, times: u32) -> Self {
        self.lock().scripted.insert(operation, (err, times));
        self
    }

    pub fn throttle_op(self, operation: &'static str, times: u32) -> Self {
        self.fail_op(operation, StoreError::Throttled("ThrottlingException".to_owned()), times)
    }

    /// Listed by the inventory but no longer stored.
    pub fn stale_archive(self, vault: &str, archive_id: &str) -> Self {
        self.lock()
            .vaults
            .entry(vault.to_owned())
            .or_default()
            .inventory
            .push(archive_id.to_owned());
        self
    }

    /// Stored but missing from the inventory.
    pub fn hidden_archive(self, vault: &str, archive_id: &str) -> Self {
        self.lock()
            .vaults
            .entry(vault.to_owned())
            .or_default()
            .contents
            .insert(archive_id.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn has_vault(&self, vault: &str) -> bool {
        self.lock().vaults.contains_key(vault)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

fn not_found(what: &str) -> StoreError {
    StoreError::NotFound(what.to_owned())
}

#[async_trait]
impl VaultStore for FakeStore {
    async fn describe_vault(&self, vault: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::DescribeVault(vault.to_owned()));
        inner.scripted("describe_vault")?;
        if inner.vaults.contains_key(vault) {
            Ok(())
        } else {
            Err(not_found(vault))
        }
    }

    async fn initiate_inventory_job(&self, vault: &str) -> Result<InventoryJob, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::InitiateJob(vault.to_owned()));
        inner.scripted("initiate_job")?;
        if !inner.vaults.contains_key(vault) {
            return Err(not_found(vault));
        }
        inner.next_job += 1;
        Ok(InventoryJob {
            job_id: format!("job-{}", inner.next_job),
            vault_name: vault.to_owned(),
        })
    }

    async fn poll_job_status(&self, job: &InventoryJob) -> Result<JobStatus, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::PollJob(job.job_id.clone()));
        inner.scripted("describe_job")?;
        if let Some(reason) = &self.job_failure {
            return Ok(JobStatus::Failed(reason.clone()));
        }
        let polls = inner.polls.entry(job.job_id.clone()).or_insert(0);
        *polls += 1;
        if *polls > self.job_ready_after {
            Ok(JobStatus::Ready)
        } else {
            Ok(JobStatus::Pending)
        }
    }

    async fn get_job_output(&self, job: &InventoryJob) -> Result<Vec<ArchiveRecord>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::GetJobOutput(job.job_id.clone()));
        inner.scripted("get_job_output")?;
        let vault = inner
            .vaults
            .get(&job.vault_name)
            .ok_or_else(|| not_found(&job.vault_name))?;
        Ok(vault
            .inventory
            .iter()
            .map(|id| ArchiveRecord {
                archive_id: id.clone(),
                archive_description: String::new(),
                creation_date: "2012-03-20T17:03:43Z".to_owned(),
                size: 1024,
                sha256_tree_hash: String::new(),
            })
            .collect())
    }

    async fn delete_archive(&self, vault: &str, archive_id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::DeleteArchive {
            vault: vault.to_owned(),
            archive_id: archive_id.to_owned(),
        });
        if let Some(left) = inner.throttles.get_mut(archive_id) {
            if *left > 0 {
                *left -= 1;
                return Err(StoreError::Throttled("ThrottlingException".to_owned()));
            }
        }
        let removed = inner
            .vaults
            .get_mut(vault)
            .map(|v| v.contents.remove(archive_id))
            .unwrap_or(false);
        if !removed {
            return Err(not_found(archive_id));
        }
        self.clock.advance(self.delete_cost);
        Ok(())
    }

    async fn delete_vault(&self, vault: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(Call::DeleteVault(vault.to_owned()));
        inner.scripted("delete_vault")?;
        match inner.vaults.get(vault) {
            None => Err(not_found(vault)),
            Some(v) if !v.contents.is_empty() => Err(StoreError::NotEmpty(vault.to_owned())),
            Some(_) => {
                inner.vaults.remove(vault);
                Ok(())
            }
        }
    }
}

/// Cloneable in-memory sink for a tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `fut` with a thread-local subscriber and return what it logged.
/// Only valid on the current-thread runtime that `#[tokio::test]` uses.
pub async fn capture_logs<F: Future>(fut: F) -> (F::Output, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();

    let guard = tracing::subscriber::set_default(subscriber);
    let output = fut.await;
    drop(guard);

    (output, capture.contents())
}
