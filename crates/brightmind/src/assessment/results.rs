use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::domain::AssessmentResult;

/// Well-known slot the latest result is kept under.
pub const RESULTS_KEY: &str = "assessmentResults";

/// Single-slot storage for the most recent assessment result.
pub trait ResultsStore: Send + Sync {
    /// Replace whatever is stored with `result`.
    fn save(&self, result: &AssessmentResult) -> Result<(), ResultsError>;
    /// Last saved result, or `None` when nothing has been saved.
    fn load(&self) -> Result<Option<AssessmentResult>, ResultsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("results storage unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("stored results are unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Keeps the result as a JSON document named after [`RESULTS_KEY`] inside a directory.
#[derive(Debug, Clone)]
pub struct FileResultsStore {
    dir: PathBuf,
}

impl FileResultsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{RESULTS_KEY}.json"))
    }

    fn staging_path(&self) -> PathBuf {
        self.dir.join(format!(".{RESULTS_KEY}.json.tmp"))
    }
}

impl ResultsStore for FileResultsStore {
    fn save(&self, result: &AssessmentResult) -> Result<(), ResultsError> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_vec_pretty(result)?;
        let staging = self.staging_path();
        fs::write(&staging, payload)?;
        // rename over the previous slot so readers never see a half-written file
        fs::rename(&staging, self.path())?;
        debug!(path = %self.path().display(), "assessment results saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<AssessmentResult>, ResultsError> {
        read_slot(&self.path())
    }
}

fn read_slot(path: &Path) -> Result<Option<AssessmentResult>, ResultsError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Serialized in-memory slot, useful in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryResultsStore {
    slot: Mutex<Option<String>>,
}

impl ResultsStore for MemoryResultsStore {
    fn save(&self, result: &AssessmentResult) -> Result<(), ResultsError> {
        let serialized = serde_json::to_string(result)?;
        *self.slot.lock().expect("results mutex poisoned") = Some(serialized);
        Ok(())
    }

    fn load(&self) -> Result<Option<AssessmentResult>, ResultsError> {
        let guard = self.slot.lock().expect("results mutex poisoned");
        guard
            .as_deref()
            .map(serde_json::from_str::<AssessmentResult>)
            .transpose()
            .map_err(ResultsError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::{AnswerSet, LikertValue};
    use crate::assessment::scoring::SubscaleScores;
    use chrono::{TimeZone, Utc};

    fn result(depression_score: u32, minute: u32) -> AssessmentResult {
        AssessmentResult::new(
            SubscaleScores {
                depression_score,
                anxiety_score: 2,
            },
            AnswerSet::from_values([LikertValue::SEVERAL_DAYS; 9]),
            Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0)
                .single()
                .expect("valid timestamp"),
        )
    }

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("brightmind-{label}-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_store_starts_empty_and_keeps_only_latest() {
        let store = MemoryResultsStore::default();
        assert_eq!(store.load().expect("load"), None);

        let first = result(1, 0);
        let second = result(7, 5);
        store.save(&first).expect("save first");
        store.save(&second).expect("save second");
        assert_eq!(store.load().expect("load"), Some(second));
    }

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = scratch_dir("results");
        let store = FileResultsStore::new(&dir);
        assert_eq!(store.load().expect("missing file is absent"), None);

        let first = result(3, 1);
        store.save(&first).expect("save first");
        assert_eq!(store.load().expect("load"), Some(first));

        let second = result(11, 2);
        store.save(&second).expect("save second");
        assert_eq!(store.load().expect("load"), Some(second));
        assert!(store.path().ends_with("assessmentResults.json"));
        assert!(!store.staging_path().exists());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_slot_is_an_error_not_absent() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).expect("create dir");
        let store = FileResultsStore::new(&dir);
        fs::write(store.path(), b"{not json").expect("write garbage");

        assert!(matches!(store.load(), Err(ResultsError::Corrupt(_))));
        fs::remove_dir_all(dir).ok();
    }
}
