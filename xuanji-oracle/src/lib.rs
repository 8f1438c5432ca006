//! xuanji-oracle library interface
//!
//! Exposes the router, state and generators for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod prompts;
pub mod schema;
pub mod services;
pub mod view_state;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use inference::InferenceClient;
use services::{ChartInterpreter, FloorPlanAnalyzer, FlyingStarAdvisor, HoroscopeGenerator, RoomDesigner};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use view_state::ViewRegistry;
use xuanji_almanac::ChartOptions;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub charts: Arc<ChartInterpreter>,
    pub stars: Arc<FlyingStarAdvisor>,
    pub horoscopes: Arc<HoroscopeGenerator>,
    pub floor_plans: Arc<FloorPlanAnalyzer>,
    pub designer: Arc<RoomDesigner>,
    pub views: ViewRegistry,
    /// Whether generation endpoints can succeed at all
    pub has_credential: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last upstream error for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(client: Arc<dyn InferenceClient>, chart_options: ChartOptions) -> Self {
        Self {
            has_credential: client.has_credential(),
            charts: Arc::new(ChartInterpreter::new(client.clone(), chart_options)),
            stars: Arc::new(FlyingStarAdvisor::new(client.clone())),
            horoscopes: Arc::new(HoroscopeGenerator::new(client.clone())),
            floor_plans: Arc::new(FloorPlanAnalyzer::new(client.clone())),
            designer: Arc::new(RoomDesigner::new(client)),
            views: ViewRegistry::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::bazi_routes())
        .merge(api::star_routes())
        .merge(api::horoscope_routes())
        .merge(api::floor_plan_routes())
        .merge(api::design_routes())
        .merge(api::store_routes())
        .merge(api::view_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
