//! Acquisition service
//!
//! Drains the watcher queue and conditions each file on a blocking worker,
//! bounded by a semaphore so a burst of drops cannot fan out without limit.
//! Every file is isolated: a failure is logged with the stage it died in and
//! the service keeps consuming. Failed files are not retried.

use crate::config::NodeConfig;
use crate::transport::MessageBus;
use ecg_core::EcgResult;
use ecg_processing::{codec, Conditioner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

/// Conditions detected recordings and publishes them on the raw topic
pub struct AcquisitionService {
    conditioner: Conditioner,
    bus: Arc<dyn MessageBus>,
    raw_topic: String,
    worker_count: usize,
}

impl AcquisitionService {
    /// Build the service; fails fast on an unusable rate/filter combination
    pub fn new(config: &NodeConfig, bus: Arc<dyn MessageBus>) -> EcgResult<Self> {
        let conditioner = Conditioner::from_rates(
            config.source_rate_hz,
            config.target_rate_hz,
            config.filter_order,
            config.cutoff_hz,
        )?;

        Ok(AcquisitionService {
            conditioner,
            bus,
            raw_topic: config.raw_topic.clone(),
            worker_count: config.worker_count,
        })
    }

    /// Consume the watcher queue until it closes
    ///
    /// Each file is handed to its own task; at most `worker_count` files are
    /// in flight at once.
    pub async fn run(self: Arc<Self>, mut queue: mpsc::Receiver<PathBuf>) {
        let permits = Arc::new(Semaphore::new(self.worker_count));

        while let Some(path) = queue.recv().await {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let service = Arc::clone(&self);
            tokio::spawn(async move {
                let _permit = permit;
                service.process_file(path).await;
            });
        }

        info!("acquisition queue closed, service stopping");
    }

    /// Condition one file and publish the result; errors stay local
    async fn process_file(&self, path: PathBuf) {
        info!(file = %path.display(), "conditioning recording");

        let conditioner = self.conditioner.clone();
        let worker_path = path.clone();
        let outcome =
            tokio::task::spawn_blocking(move || conditioner.condition_file(&worker_path)).await;

        let record = match outcome {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!(
                    file = %path.display(),
                    stage = %e.stage,
                    error = %e.error,
                    "conditioning failed, file skipped"
                );
                return;
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "conditioning task aborted");
                return;
            }
        };

        let payload = match codec::encode(&record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(file = %record.filename, error = %e, "record encoding failed");
                return;
            }
        };

        // No retry on transport failure: the record is lost and said so
        match self.bus.publish(&self.raw_topic, payload) {
            Ok(()) => info!(
                file = %record.filename,
                leads = record.leads.len(),
                samples = record.samples_per_lead(),
                "record published"
            ),
            Err(e) => warn!(file = %record.filename, error = %e, "publish failed, record lost"),
        }
    }
}
