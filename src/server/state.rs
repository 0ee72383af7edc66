use std::sync::Arc;

use crate::config::RedactConfig;
use crate::pipeline::Pipeline;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<RedactConfig>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, config: Arc<RedactConfig>) -> Self {
        Self { pipeline, config }
    }
}
