//! Application state shared across all handlers.

use gp_core::SavingsEstimator;
use gp_compressor::CompressionPipeline;
use std::sync::Arc;

/// Shared application state. The pipeline is read-only after construction,
/// so handlers share one instance across requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CompressionPipeline>,
    pub estimator: SavingsEstimator,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(pipeline: Arc<CompressionPipeline>) -> Self {
        Self {
            pipeline,
            estimator: SavingsEstimator::default(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_estimator(mut self, estimator: SavingsEstimator) -> Self {
        self.estimator = estimator;
        self
    }
}
