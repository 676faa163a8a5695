// Library interface for Aura modules
// This allows integration tests and benches to access the core functionality

pub mod circadian;
pub mod config;
pub mod database;
pub mod directive;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod readiness;
pub mod recovery;
pub mod service;
pub mod sleep;
pub mod validation;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use models::*;
pub use circadian::build_hourly_performance;
pub use readiness::{build_readiness_score, ReadinessCalculator, ReadinessConfig};
pub use recovery::{compute_recovery_status, RecoveryModel};
pub use directive::TrainingDirective;
pub use service::{CheckInService, Dashboard, HistorySummary};
pub use error::{AuraError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
