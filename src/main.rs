//! `refugee-triage [profile.json]`
//!
//! Reads one patient profile as JSON (from the file argument, or stdin when
//! absent or `-`) and prints the triage result as pretty JSON.

use std::io::Read;
use std::process::ExitCode;

use thiserror::Error;

use refugee_triage::config::{self, TriageConfig};
use refugee_triage::{init_tracing, PatientProfile, TriageEngine, TriageError};

#[derive(Error, Debug)]
enum CliError {
    #[error("failed to read {source_name}: {reason}")]
    Input { source_name: String, reason: String },

    #[error("invalid patient profile: {0}")]
    Profile(String),

    #[error(transparent)]
    Engine(#[from] TriageError),

    #[error("failed to serialize result: {0}")]
    Output(String),
}

fn read_input(arg: Option<&str>) -> Result<String, CliError> {
    match arg {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::Input {
                    source_name: "stdin".into(),
                    reason: e.to_string(),
                })?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::Input {
            source_name: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn parse_profile(input: &str) -> Result<PatientProfile, CliError> {
    serde_json::from_str(input).map_err(|e| CliError::Profile(e.to_string()))
}

async fn run(arg: Option<&str>) -> Result<String, CliError> {
    let profile = parse_profile(&read_input(arg)?)?;

    let engine = TriageEngine::from_config(TriageConfig::from_env())?;
    let prediction = engine.analyze_with_models(&profile).await;

    serde_json::to_string_pretty(&prediction).map_err(|e| CliError::Output(e.to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let arg = std::env::args().nth(1);
    match run(arg.as_deref()).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e}", config::APP_NAME);
            ExitCode::FAILURE
        }
    }
}
