use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TriagePrediction;

use super::CollaboratorError;

/// A finished assessment handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub prediction: TriagePrediction,
}

impl AssessmentRecord {
    pub fn new(prediction: TriagePrediction) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            prediction,
        }
    }
}

/// Write-only storage for finished records. Never read during analysis.
pub trait AssessmentSink: Send + Sync {
    fn store(&self, record: &AssessmentRecord) -> Result<(), CollaboratorError>;
}

/// Appends one JSON object per line.
pub struct JsonlAssessmentSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAssessmentSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, e: impl ToString) -> CollaboratorError {
        CollaboratorError::Storage(self.path.display().to_string(), e.to_string())
    }
}

impl AssessmentSink for JsonlAssessmentSink {
    fn store(&self, record: &AssessmentRecord) -> Result<(), CollaboratorError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| CollaboratorError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| CollaboratorError::LockPoisoned)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_err(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.storage_err(e))?;

        tracing::debug!(record_id = %record.id, "Assessment record appended");
        Ok(())
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AssessmentRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Result<Vec<AssessmentRecord>, CollaboratorError> {
        let records = self.records.lock().map_err(|_| CollaboratorError::LockPoisoned)?;
        Ok(records.clone())
    }
}

impl AssessmentSink for MemorySink {
    fn store(&self, record: &AssessmentRecord) -> Result<(), CollaboratorError> {
        let mut records = self.records.lock().map_err(|_| CollaboratorError::LockPoisoned)?;
        records.push(record.clone());
        Ok(())
    }
}
