//! Inference consumer
//!
//! Subscribes to the raw topic and, per message: decode → oracle →
//! sigmoid → threshold → publish the label string. Every step is fallible
//! and every failure is local to its message; the loop never dies on bad
//! input.

use crate::config::NodeConfig;
use crate::oracle::InferenceOracle;
use crate::transport::MessageBus;
use ecg_core::{EcgError, EcgResult, InferenceResult};
use ecg_processing::codec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Logistic activation applied to raw oracle logits
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Consumes processed records and publishes diagnostic labels
pub struct InferenceService {
    bus: Arc<dyn MessageBus>,
    oracle: Arc<dyn InferenceOracle>,
    raw_topic: String,
    result_topic: String,
    threshold: f32,
    oracle_timeout: Duration,
}

impl InferenceService {
    /// Build the consumer from node configuration
    pub fn new(
        config: &NodeConfig,
        bus: Arc<dyn MessageBus>,
        oracle: Arc<dyn InferenceOracle>,
    ) -> Self {
        InferenceService {
            bus,
            oracle,
            raw_topic: config.raw_topic.clone(),
            result_topic: config.result_topic.clone(),
            threshold: config.decision_threshold,
            oracle_timeout: Duration::from_millis(config.oracle_timeout_ms),
        }
    }

    /// Consume the raw topic until it closes
    pub async fn run(self) {
        let mut messages = self.bus.subscribe(&self.raw_topic);
        info!(topic = %self.raw_topic, "inference consumer started");

        loop {
            match messages.recv().await {
                Ok(payload) => {
                    if let Err(e) = self.handle_message(&payload).await {
                        warn!(error = %e, "message processing failed, continuing");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "consumer lagged behind the raw topic");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("raw topic closed, consumer stopping");
                    break;
                }
            }
        }
    }

    /// Process one raw-signal message end to end
    async fn handle_message(&self, payload: &[u8]) -> EcgResult<()> {
        let record = codec::decode(payload)?;
        let tensor = codec::to_tensor(&record)?;
        info!(file = %record.filename, shape = ?tensor.shape(), "record received");

        let oracle = Arc::clone(&self.oracle);
        let logits = tokio::time::timeout(
            self.oracle_timeout,
            tokio::task::spawn_blocking(move || oracle.infer(&tensor)),
        )
        .await
        .map_err(|_| EcgError::OracleFailure {
            reason: format!("no result within {:?}", self.oracle_timeout),
        })?
        .map_err(|e| EcgError::OracleFailure {
            reason: format!("inference task aborted: {}", e),
        })??;

        let probabilities: Vec<f32> = logits.iter().map(|&logit| sigmoid(logit)).collect();
        let result = InferenceResult::from_probabilities(&probabilities, self.threshold)?;

        info!(file = %record.filename, result = %result.to_wire(), "inference complete");
        self.bus.publish(&self.result_topic, result.to_wire().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StubOracle;
    use crate::transport::InMemoryBus;
    use ecg_core::{LeadTrace, ProcessedRecord, DERIVED_LEAD_ORDER};

    fn twelve_lead_record(samples: usize) -> ProcessedRecord {
        let leads = DERIVED_LEAD_ORDER
            .iter()
            .map(|name| LeadTrace {
                name: name.to_string(),
                samples: vec![0.25; samples],
            })
            .collect();
        ProcessedRecord::new("rec.xls".to_string(), leads).unwrap()
    }

    fn service_with(oracle: Arc<dyn InferenceOracle>, bus: Arc<InMemoryBus>) -> InferenceService {
        InferenceService::new(&NodeConfig::default(), bus, oracle)
    }

    async fn recv_string(rx: &mut broadcast::Receiver<Vec<u8>>) -> String {
        let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no result within timeout")
            .expect("result topic closed");
        String::from_utf8(payload).unwrap()
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[tokio::test]
    async fn test_all_below_threshold_publishes_normal() {
        let bus = Arc::new(InMemoryBus::new(16));
        let mut results = bus.subscribe("ecg/inference");
        let service = service_with(Arc::new(StubOracle::default()), bus.clone());

        let payload = codec::encode(&twelve_lead_record(8)).unwrap();
        service.handle_message(&payload).await.unwrap();

        assert_eq!(recv_string(&mut results).await, "Normal");
    }

    #[tokio::test]
    async fn test_labels_above_threshold_are_joined() {
        let bus = Arc::new(InMemoryBus::new(16));
        let mut results = bus.subscribe("ecg/inference");

        // Brady (index 3) and STach (index 23) confidently positive
        let mut logits = vec![-10.0f32; 26];
        logits[3] = 6.0;
        logits[23] = 6.0;
        let service = service_with(Arc::new(StubOracle::new(logits)), bus.clone());

        let payload = codec::encode(&twelve_lead_record(8)).unwrap();
        service.handle_message(&payload).await.unwrap();

        assert_eq!(recv_string(&mut results).await, "Brady,STach");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_reported() {
        let bus = Arc::new(InMemoryBus::new(16));
        let service = service_with(Arc::new(StubOracle::default()), bus);

        let err = service.handle_message(b"{\"filename\": \"x\"}").await.unwrap_err();
        assert!(matches!(err, EcgError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn test_consumer_survives_malformed_message() {
        let bus = Arc::new(InMemoryBus::new(16));
        let mut results = bus.subscribe("ecg/inference");
        let service = service_with(Arc::new(StubOracle::default()), bus.clone());

        // Subscribe happens inside run(); give it a moment before publishing
        let handle = tokio::spawn(service.run());
        tokio::time::sleep(Duration::from_millis(50)).await;

        bus.publish("ecg/data", b"not json".to_vec()).unwrap();
        bus.publish("ecg/data", codec::encode(&twelve_lead_record(8)).unwrap())
            .unwrap();

        // The malformed message is skipped, the valid one still answers
        assert_eq!(recv_string(&mut results).await, "Normal");
        handle.abort();
    }

    #[tokio::test]
    async fn test_oracle_failure_is_contained() {
        struct FailingOracle;
        impl InferenceOracle for FailingOracle {
            fn infer(&self, _input: &ecg_core::LeadTensor) -> EcgResult<Vec<f32>> {
                Err(EcgError::OracleFailure { reason: "model not loaded".to_string() })
            }
        }

        let bus = Arc::new(InMemoryBus::new(16));
        let service = service_with(Arc::new(FailingOracle), bus);

        let payload = codec::encode(&twelve_lead_record(8)).unwrap();
        let err = service.handle_message(&payload).await.unwrap_err();
        assert!(matches!(err, EcgError::OracleFailure { .. }));
    }
}
