//! ECG node: acquisition and inference services over one message bus
//!
//! Signal flow: watched directory → conditioning pipeline → "raw signal"
//! topic → inference consumer → "result" topic.

mod acquisition;
mod config;
mod inference;
mod oracle;
mod transport;
mod watcher;

use crate::acquisition::AcquisitionService;
use crate::config::NodeConfig;
use crate::inference::InferenceService;
use crate::oracle::{InferenceOracle, StubOracle};
use crate::transport::{InMemoryBus, MessageBus};
use crate::watcher::DirectoryWatcher;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::load(Path::new(&path))
            .with_context(|| format!("loading configuration from {}", path))?,
        None => NodeConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    info!(
        watch_dir = %config.watch_dir.display(),
        raw_topic = %config.raw_topic,
        result_topic = %config.result_topic,
        "starting ECG node"
    );

    let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new(64));
    // Stand-in classifier; swap for a real model backend here
    let model: Arc<dyn InferenceOracle> = Arc::new(StubOracle::default());

    let watcher = DirectoryWatcher::new(
        config.watch_dir.clone(),
        &config.file_extension,
        Duration::from_millis(config.poll_interval_ms),
    );
    let acquisition = Arc::new(AcquisitionService::new(&config, Arc::clone(&bus))?);
    let consumer = InferenceService::new(&config, Arc::clone(&bus), model);

    // Mirror published results to the log, the way an operator sees them
    let mut results = bus.subscribe(&config.result_topic);
    tokio::spawn(async move {
        while let Ok(payload) = results.recv().await {
            info!(result = %String::from_utf8_lossy(&payload), "inference result");
        }
    });

    let (queue_tx, queue_rx) = mpsc::channel(64);
    tokio::spawn(watcher.run(queue_tx));
    tokio::spawn(acquisition.run(queue_rx));
    tokio::spawn(consumer.run());

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received, stopping");
    Ok(())
}
