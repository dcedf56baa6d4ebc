//! HTTP front for the LogShield masking engine.
//!
//! Uploads are masked in-process; only the masked text is forwarded to the
//! optional analysis service.

pub mod analysis;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upload;

pub use analysis::{AnalysisCache, AnalysisClient, AnalysisError, AnalysisReport};
pub use config::ProxyConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
