//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::StakingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Staking service for all business logic.
    pub staking_service: Arc<StakingService>,
}
