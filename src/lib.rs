pub mod collaborators;
pub mod config;
pub mod models;
pub mod triage;

pub use models::{PatientProfile, Prediction, TriagePrediction};
pub use triage::{RiskModifierRegistry, TriageEngine, TriageError};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays clean for JSON output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
