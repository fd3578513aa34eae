//! Heart disease prediction service
//!
//! One web page collects eleven clinical measurements, a random forest
//! trained elsewhere scores them, and the page shows the verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HEART PREDICT                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌─────────────────────┐  │
//! │  │  Form     │──▶│  Feature    │──▶│  Predictor          │  │
//! │  │  (Axum)   │   │  Encoder    │   │  (RandomForest)     │  │
//! │  └───────────┘   └─────────────┘   └──────────┬──────────┘  │
//! │                                               ▼             │
//! │                                   ┌─────────────────────┐   │
//! │                                   │ forest artifact     │   │
//! │                                   │ (loaded at startup) │   │
//! │                                   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod models;
pub mod render;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::Predictor;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub predictor: Predictor,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home::show).post(handlers::home::submit))
        .route("/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
