//! Rustack provider - reconciles S3 buckets and DynamoDB tables declared as
//! JSON manifests.
//!
//! # Usage
//!
//! ```text
//! MANIFEST_DIR=./manifests rustack-provider [--memory] [--once]
//! ```
//!
//! `--memory` sends every call to process-local in-memory stores instead of
//! AWS. `--once` ticks every object a single time and exits.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MANIFEST_DIR` | `./manifests` | Directory of manifest documents |
//! | `POLL_INTERVAL_SECS` | `60` | Delay between ticks of up-to-date objects |
//! | `MAX_CONCURRENT_RECONCILES` | `8` | Ticks allowed to run at once |
//! | `RECONCILE_TIMEOUT_SECS` | `120` | Upper bound on a single tick |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `SECRET_<NAME>_<KEY>` | *(unset)* | Secret value, else `secrets/<name>/<key>` |

mod controller;
mod manifest;

use std::sync::Arc;

use anyhow::{Context, Result};
use rustack_provider_core::ControllerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::controller::{Backend, Controller, run_until_shutdown};
use crate::manifest::ManifestStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(config: &ControllerConfig) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level filter: {}", config.log_level))?
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json_logs() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ControllerConfig::from_env();
    init_tracing(&config)?;

    let backend = if std::env::args().any(|a| a == "--memory") {
        Backend::Memory
    } else {
        Backend::Aws
    };
    let once = std::env::args().any(|a| a == "--once");

    info!(
        manifest_dir = %config.manifest_dir,
        poll_interval_secs = config.poll_interval_secs,
        max_concurrent_reconciles = config.max_concurrent_reconciles,
        reconcile_timeout_secs = config.reconcile_timeout_secs,
        ?backend,
        version = VERSION,
        "starting Rustack provider",
    );

    let store = Arc::new(ManifestStore::new(&config.manifest_dir));
    let manifests = store.load().await?;
    let controller = Controller::new(config, store, backend);

    if once {
        let outcomes = controller.run_once(manifests).await;
        info!(reconciled = outcomes.len(), "single pass finished");
        return Ok(());
    }

    run_until_shutdown(controller.spawn(manifests)).await;
    Ok(())
}
