use std::sync::Arc;

use services::Services;

use crate::metrics::Metrics;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services, metrics: Metrics) -> Self {
        Self {
            services: Arc::new(services),
            metrics: Arc::new(metrics),
        }
    }
}
