use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use futures::StreamExt;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{spawn_blocking, JoinHandle};
use tokio::{fs, spawn};
use tracing::{debug, error, info};

use crate::client::{ClientError, UsageSource};
use crate::config::{discover_accounts, ConfigSource};
use crate::engine::ExportError;
use crate::grouping::{MonthBatch, MonthGrouper};
use crate::models::{mask_account_id, AccountCredential, ExportOutcome, UsageRecord};
use crate::storage::{account_output_path, CsvSink};

pub const DEFAULT_ACCOUNT_PREFIX: &str = "TWILIO";

/// Runs one independent export pipeline per configured account.
pub struct ExportEngine<S: UsageSource> {
    source: Arc<S>,
    output_dir: PathBuf,
    prefix: String,
    max_concurrency: Option<usize>,
    backpressure: usize
}

/// What the blocking writer reports back when its channel closes.
struct WriterReport {
    rows_written: usize,
    result: Result<(), ExportError>
}

impl<S: UsageSource> ExportEngine<S> {
    /// Creates a new engine reading from `source` and writing into `output_dir`.
    pub fn new(source: Arc<S>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            max_concurrency: None,
            backpressure: 256
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Caps the number of account pipelines in flight at once. Unbounded by default.
    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency.filter(|limit| *limit > 0);
        self
    }

    /// Discovers accounts from `config`, exports each one concurrently and
    /// returns one outcome per account in discovery order.
    ///
    /// # Errors
    /// Only run-level failures are returned: no accounts configured, or the
    /// output directory cannot be created. Per-account failures are reported in
    /// the outcomes.
    pub async fn run<C: ConfigSource + ?Sized>(&self, config: &C) -> Result<Vec<ExportOutcome>, ExportError> {
        let accounts = discover_accounts(config, &self.prefix)?;

        fs::create_dir_all(&self.output_dir).await?;

        info!("Exporting usage records for {} account(s) into {}", accounts.len(), self.output_dir.display());

        Ok(self.export_all(accounts).await)
    }

    /// Exports the given accounts concurrently; every account gets an outcome.
    pub async fn export_all(&self, accounts: Vec<AccountCredential>) -> Vec<ExportOutcome> {
        let limiter = self.max_concurrency.map(|limit| Arc::new(Semaphore::new(limit)));
        let mut account_ids = Vec::with_capacity(accounts.len());
        let mut handles = Vec::with_capacity(accounts.len());

        //NOTE: All pipelines are spawned before any is awaited
        for credential in accounts {
            account_ids.push(credential.account_id.clone());
            handles.push(self.spawn_pipeline(credential, limiter.clone()));
        }

        join_all(handles).await
            .into_iter()
            .zip(account_ids)
            .map(|(result, account_id)| match result {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let error = ExportError::from(join_error);
                    error!("Export for account [{}] aborted: {error}", mask_account_id(&account_id));
                    ExportOutcome::failed(account_id, 0, error.to_string())
                }
            })
            .collect()
    }

    fn spawn_pipeline(&self, credential: AccountCredential, limiter: Option<Arc<Semaphore>>) -> JoinHandle<ExportOutcome> {
        let source = self.source.clone();
        let path = account_output_path(&self.output_dir, &credential.account_id);
        let backpressure = self.backpressure;

        spawn(async move {
            //NOTE: The semaphore is never closed so acquiring only fails if that changes; run unbounded in that case
            let _permit = match &limiter {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None
            };

            export_account(source.as_ref(), credential, path, backpressure).await
        })
    }
}

/// Runs the stream-read, group, write pipeline for a single account.
async fn export_account<S: UsageSource + ?Sized>(source: &S, credential: AccountCredential, path: PathBuf, backpressure: usize) -> ExportOutcome {
    let account_id = credential.account_id.clone();
    let masked_id = credential.masked_id();

    let (sender, receiver) = mpsc::channel::<UsageRecord>(backpressure);
    let writer_handle = spawn_writer(path.clone(), masked_id.clone(), receiver);
    let stream_result = forward_records(source, credential, sender).await;

    let report = match writer_handle.await {
        Ok(report) => report,
        Err(join_error) => WriterReport {
            rows_written: 0,
            result: Err(ExportError::from(join_error))
        }
    };

    //NOTE: A writer failure stops the reader early, so it is the root cause when both fail
    let result = report.result.and(stream_result.map_err(ExportError::from));

    match result {
        Ok(()) => {
            info!("Account [{masked_id}] exported {} records to {}", report.rows_written, path.display());
            ExportOutcome::succeeded(account_id, report.rows_written)
        }
        Err(error) => {
            error!("Account [{masked_id}] export failed after {} records: {error}", report.rows_written);
            ExportOutcome::failed(account_id, report.rows_written, error.to_string())
        }
    }
}

async fn forward_records<S: UsageSource + ?Sized>(source: &S, credential: AccountCredential, sender: mpsc::Sender<UsageRecord>) -> Result<(), ClientError> {
    let mut records = source.monthly_records(credential);

    while let Some(record) = records.next().await {
        if sender.send(record?).await.is_err() {
            //NOTE: The writer has stopped and will report its own error
            break;
        }
    }

    Ok(())
}

fn spawn_writer(path: PathBuf, masked_id: String, mut receiver: mpsc::Receiver<UsageRecord>) -> JoinHandle<WriterReport> {
    spawn_blocking(move || {
        let mut sink = match CsvSink::create(&path) {
            Ok(sink) => sink,
            Err(error) => {
                return WriterReport {
                    rows_written: 0,
                    result: Err(ExportError::from(error))
                };
            }
        };

        debug!("Writing usage records for account [{masked_id}] to {}", sink.path().display());

        let mut grouper = MonthGrouper::new();

        //NOTE: The channel also closes when the reader fails, so whatever month is pending still gets written below
        while let Some(record) = receiver.blocking_recv() {
            if let Some(batch) = grouper.push(record) {
                if let Err(error) = write_batch(&mut sink, &batch, &masked_id) {
                    return WriterReport {
                        rows_written: sink.rows_written(),
                        result: Err(error)
                    };
                }
            }
        }

        let result = match grouper.finish() {
            Some(batch) => write_batch(&mut sink, &batch, &masked_id),
            None => Ok(())
        };

        WriterReport {
            rows_written: sink.rows_written(),
            result
        }
    })
}

fn write_batch(sink: &mut CsvSink, batch: &MonthBatch, masked_id: &str) -> Result<(), ExportError> {
    sink.append(batch)?;

    if batch.is_announced() {
        info!(account = masked_id, "Wrote {} records for {}", batch.len(), batch.key);
    } else {
        debug!(account = masked_id, "Wrote {} record for {}", batch.len(), batch.key);
    }

    Ok(())
}
