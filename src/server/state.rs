//! Server shared state
//!
//! Holds the configuration and the selection workflow every request works on.

use crate::config::Config;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::GeoBackend;
use crate::selection::{SelectionWorkflow, WorkflowSettings};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState<G> {
    pub config: Arc<RwLock<Config>>,

    /// The one selection shared by all clients
    pub workflow: SelectionWorkflow<G>,

    started: Instant,
}

impl AppState<NominatimBackend> {
    /// State backed by the configured Nominatim instance
    pub fn from_config(config: Config) -> Result<Self> {
        let backend = NominatimBackend::from_config(&config.geocoding)?;
        Ok(Self::new(config, backend))
    }
}

impl<G: GeoBackend + 'static> AppState<G> {
    pub fn new(config: Config, backend: G) -> Self {
        let workflow = SelectionWorkflow::new(backend, WorkflowSettings::from_config(&config));
        Self {
            config: Arc::new(RwLock::new(config)),
            workflow,
            started: Instant::now(),
        }
    }

    pub fn backend(&self) -> &G {
        self.workflow.backend()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
