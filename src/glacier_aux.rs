//! `VaultStore` over the Amazon Glacier SDK client.

use aws_sdk_glacier::{
    config::http::HttpResponse,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{JobParameters, StatusCode},
    Client,
};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;
use crate::inventory::{ArchiveRecord, InventoryReport};
use crate::store::{InventoryJob, JobStatus, VaultStore};

/// `-` selects the account that owns the credentials.
pub const ACCOUNT_ID: &str = "-";

const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "ThrottledException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "SlowDown",
];

pub struct GlacierStore {
    client: Client,
}

impl GlacierStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Map an SDK failure onto the store's error kinds by its service error code.
fn classify<E>(operation: &str, err: SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let service_err = err.as_service_error();
    let code = service_err.and_then(|e| e.code());
    let message = service_err.and_then(|e| e.message()).unwrap_or_default();

    classify_code(operation, code, message).unwrap_or_else(|| StoreError::Service {
        operation: operation.to_owned(),
        message: DisplayErrorContext(&err).to_string(),
    })
}

fn classify_code(operation: &str, code: Option<&str>, message: &str) -> Option<StoreError> {
    match code? {
        "ResourceNotFoundException" => Some(StoreError::NotFound(message.to_owned())),
        code if THROTTLING_CODES.contains(&code) => Some(StoreError::Throttled(code.to_owned())),
        // Glacier refuses to drop a vault that still holds archives as of its last inventory
        "InvalidParameterValueException"
            if operation == "delete_vault" && message.to_lowercase().contains("not empty") =>
        {
            Some(StoreError::NotEmpty(message.to_owned()))
        }
        _ => None,
    }
}

fn missing(operation: &str, what: &str) -> StoreError {
    StoreError::Service {
        operation: operation.to_owned(),
        message: format!("response carried no {what}"),
    }
}

#[async_trait]
impl VaultStore for GlacierStore {
    async fn describe_vault(&self, vault: &str) -> Result<(), StoreError> {
        let output = self
            .client
            .describe_vault()
            .account_id(ACCOUNT_ID)
            .vault_name(vault)
            .send()
            .await
            .map_err(|err| classify("describe_vault", err))?;
        debug!(
            "Vault {vault}: {:?} archives, {:?} bytes, last inventory {:?}",
            output.number_of_archives(),
            output.size_in_bytes(),
            output.last_inventory_date()
        );
        Ok(())
    }

    async fn initiate_inventory_job(&self, vault: &str) -> Result<InventoryJob, StoreError> {
        let params = JobParameters::builder()
            .r#type("inventory-retrieval")
            .format("JSON")
            .build();
        let output = self
            .client
            .initiate_job()
            .account_id(ACCOUNT_ID)
            .vault_name(vault)
            .job_parameters(params)
            .send()
            .await
            .map_err(|err| classify("initiate_job", err))?;

        let job_id = output.job_id().ok_or_else(|| missing("initiate_job", "job id"))?;
        Ok(InventoryJob {
            job_id: job_id.to_owned(),
            vault_name: vault.to_owned(),
        })
    }

    async fn poll_job_status(&self, job: &InventoryJob) -> Result<JobStatus, StoreError> {
        let output = self
            .client
            .describe_job()
            .account_id(ACCOUNT_ID)
            .vault_name(&job.vault_name)
            .job_id(&job.job_id)
            .send()
            .await
            .map_err(|err| classify("describe_job", err))?;

        Ok(match output.status_code() {
            Some(StatusCode::Succeeded) => JobStatus::Ready,
            Some(StatusCode::Failed) => JobStatus::Failed(
                output.status_message().unwrap_or("no status message").to_owned(),
            ),
            _ => JobStatus::Pending,
        })
    }

    async fn get_job_output(&self, job: &InventoryJob) -> Result<Vec<ArchiveRecord>, StoreError> {
        let output = self
            .client
            .get_job_output()
            .account_id(ACCOUNT_ID)
            .vault_name(&job.vault_name)
            .job_id(&job.job_id)
            .send()
            .await
            .map_err(|err| classify("get_job_output", err))?;

        let data: Bytes = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Service {
                operation: "get_job_output".to_owned(),
                message: err.to_string(),
            })?
            .into_bytes();
        let report = InventoryReport::parse(&data)?;
        debug!(
            "Inventory of {} taken {}: {} archives, {} bytes",
            report.vault_arn,
            report.inventory_date,
            report.archive_list.len(),
            report.total_size()
        );
        Ok(report.archive_list)
    }

    async fn delete_archive(&self, vault: &str, archive_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_archive()
            .account_id(ACCOUNT_ID)
            .vault_name(vault)
            .archive_id(archive_id)
            .send()
            .await
            .map_err(|err| classify("delete_archive", err))?;
        Ok(())
    }

    async fn delete_vault(&self, vault: &str) -> Result<(), StoreError> {
        self.client
            .delete_vault()
            .account_id(ACCOUNT_ID)
            .vault_name(vault)
            .send()
            .await
            .map_err(|err| classify("delete_vault", err))?;
        Ok(())
    }
}
