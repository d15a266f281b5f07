use recon_match::MatchEngine;
use std::sync::Arc;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_pairs: u64,
    pub max_body_bytes: usize,
}

/// Everything the router needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub limits: Limits,
}

impl AppState {
    pub fn new(engine: MatchEngine, limits: Limits) -> Self {
        Self {
            engine: Arc::new(engine),
            limits,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            MatchEngine::new(config.engine.clone()),
            Limits {
                max_pairs: config.max_pairs,
                max_body_bytes: config.max_body_bytes,
            },
        )
    }
}
