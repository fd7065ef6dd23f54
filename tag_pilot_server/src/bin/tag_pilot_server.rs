use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tag_pilot::{DecisionEngine, FileStore, MarkerDetector, PilotConfig, SteeringPipeline, TagFamily};
use tag_pilot_server::{ServerConfig, serve};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve steering commands computed from uploaded camera frames
#[derive(Parser, Debug)]
#[command(name = "tag_pilot_server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TP_BIND", default_value = "0.0.0.0:5000")]
    bind: String,

    /// Dead-zone half-width as a fraction of half the frame width
    #[arg(long, env = "TP_TOLERANCE", default_value_t = 0.15)]
    tolerance: f64,

    /// Path of the shared last-command record
    #[arg(long, env = "TP_STORE", default_value = "last_result.json")]
    store: PathBuf,

    /// AprilTag family to detect
    #[arg(long, env = "TP_TAG_FAMILY", default_value = "36h11")]
    tag_family: TagFamily,
}

impl Args {
    fn into_config(self) -> PilotConfig {
        PilotConfig {
            tolerance: self.tolerance,
            store_path: self.store,
            bind_addr: self.bind,
            tag_family: self.tag_family,
            ..PilotConfig::default()
        }
    }
}

#[cfg(feature = "opencv")]
fn build_detector(family: TagFamily) -> anyhow::Result<Arc<dyn MarkerDetector>> {
    let detector = tag_pilot::ArucoTagDetector::new(family).context("failed to build AprilTag detector")?;
    Ok(Arc::new(detector))
}

#[cfg(not(feature = "opencv"))]
fn build_detector(_family: TagFamily) -> anyhow::Result<Arc<dyn MarkerDetector>> {
    Err(anyhow::anyhow!("opencv feature not enabled for tag_pilot_server; no marker detector available"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config();
    config.validate().context("invalid configuration")?;
    info!(
        tolerance = config.tolerance,
        store = %config.store_path.display(),
        family = %config.tag_family,
        "starting tag_pilot server"
    );

    let engine = DecisionEngine::new(config.tolerance)?;
    let detector = build_detector(config.tag_family)?;
    let store = Arc::new(
        FileStore::open(&config.store_path)
            .with_context(|| format!("failed to open store at {}", config.store_path.display()))?,
    );
    let pipeline = SteeringPipeline::new(engine, detector, store.clone());

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    };
    serve(pipeline, ServerConfig { bind_addr: config.bind_addr }, shutdown).await?;

    if let Ok(store) = Arc::try_unwrap(store) {
        store.close();
    }
    Ok(())
}
