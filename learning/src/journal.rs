//! JSON-lines journal of training cases.
//!
//! Every recorded case is appended as one line so the store can be rebuilt
//! after a restart.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::types::{Result, TrainingCase};

/// Append-only case journal.
pub struct CaseJournal {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl CaseJournal {
    /// Open (creating if needed) the journal at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Case journal opened at {}", path.display());

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one case and flush.
    pub async fn append(&self, case: &TrainingCase) -> Result<()> {
        let line = serde_json::to_string(case)?;
        let mut writer = self.writer.lock().await;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    /// Read every case in the journal, skipping lines that do not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<TrainingCase>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut cases = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TrainingCase>(&line) {
                Ok(case) => cases.push(case),
                Err(e) => warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed journal line"
                ),
            }
        }

        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PendingPrediction;
    use shepherd_taxonomy::{Classification, ModeratorAction, ModeratorDecision, Priority};

    fn case(content_id: &str) -> TrainingCase {
        TrainingCase::from_prediction(
            PendingPrediction::new(
                content_id,
                "Any personal info for sale?",
                "comment",
                Classification::new(Priority::Critical, "privacy_violation", 0.9, "selling data"),
            ),
            ModeratorDecision::new(
                Priority::Critical,
                "privacy_violation",
                ModeratorAction::Removed,
                "mod-1",
            ),
        )
    }

    #[tokio::test]
    async fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.jsonl");

        let journal = CaseJournal::open(&path).unwrap();
        journal.append(&case("a")).await.unwrap();
        journal.append(&case("b")).await.unwrap();

        let loaded = CaseJournal::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content_id, "a");
        assert_eq!(loaded[1].human_decision.moderator_id, "mod-1");
    }

    #[tokio::test]
    async fn test_load_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.jsonl");

        let journal = CaseJournal::open(&path).unwrap();
        journal.append(&case("a")).await.unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "{{\"truncated\":"))
            .unwrap();
        journal.append(&case("b")).await.unwrap();

        let loaded = CaseJournal::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CaseJournal::load(dir.path().join("absent.jsonl")).unwrap();
        assert!(loaded.is_empty());
    }
}
