//! # kbdesk-client
//!
//! Knowledge service implementations for the kbdesk workspace.
//!
//! - [`http::HttpKnowledgeService`] talks to a running service over HTTP
//! - `mock::MockKnowledgeService` (feature `mock`) answers with canned data
//! - [`config::ClientConfig`] selects and configures one of them
//! - [`telemetry::init_tracing`] installs the tracing subscriber
//!
//! ## Example
//!
//! ```ignore
//! use kbdesk_client::{connect, ClientConfig};
//!
//! let config = ClientConfig::load()?;
//! let service = connect(&config)?;
//! assert!(service.health_check().await?);
//! ```

use std::sync::Arc;

use tracing::info;

use kbdesk_core::{KnowledgeService, Result};

pub mod config;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod telemetry;

pub use config::{BackendKind, ClientConfig, ConfigError};
pub use http::HttpKnowledgeService;
#[cfg(feature = "mock")]
pub use mock::MockKnowledgeService;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};

/// Build the knowledge service selected by `config`.
pub fn connect(config: &ClientConfig) -> Result<Arc<dyn KnowledgeService>> {
    config.validate()?;
    info!(
        subsystem = "client",
        backend = %config.backend,
        base_url = %config.base_url,
        "Connecting to knowledge service"
    );

    match config.backend {
        BackendKind::Http => Ok(Arc::new(HttpKnowledgeService::from_config(config)?)),
        #[cfg(feature = "mock")]
        BackendKind::Mock => Ok(Arc::new(MockKnowledgeService::new().with_sample_latencies())),
        #[cfg(not(feature = "mock"))]
        BackendKind::Mock => Err(kbdesk_core::Error::Config(
            "mock backend requires the `mock` feature".to_string(),
        )),
    }
}
