//! Configuration for the learning subsystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use shepherd_oracle::OracleConfig;

use crate::types::{LearningError, Result};

/// Configuration for [`crate::ModerationLearning`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Oracle call settings
    pub oracle: OracleConfig,
    /// Learning-enabled classifier settings
    pub classifier: ClassifierConfig,
    /// Pending prediction cache settings
    pub pending: PendingConfig,
    /// Training case store settings
    pub store: StoreConfig,
    /// Feedback reporter settings
    pub feedback: FeedbackConfig,
}

impl LearningConfig {
    /// Load config from YAML text.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            LearningError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would disable the subsystem in surprising ways.
    pub fn validate(&self) -> Result<()> {
        if self.oracle.timeout_ms == 0 {
            return Err(LearningError::Config("oracle.timeout_ms must be > 0".into()));
        }
        if self.pending.capacity == 0 {
            return Err(LearningError::Config("pending.capacity must be > 0".into()));
        }
        if self.store.max_cases == Some(0) {
            return Err(LearningError::Config("store.max_cases must be > 0".into()));
        }
        if self.feedback.min_pattern_frequency == 0 {
            return Err(LearningError::Config(
                "feedback.min_pattern_frequency must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Learning-enabled classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Most frequent correction patterns fed back into the prompt
    pub max_hints: usize,
    /// Patterns seen fewer times than this are not fed back
    pub hint_min_frequency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_hints: 5,
            hint_min_frequency: 1,
        }
    }
}

/// Pending prediction cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingConfig {
    /// Maximum predictions awaiting a decision
    pub capacity: usize,
    /// Age after which an undecided prediction is dropped (0 = never)
    pub ttl_secs: u64,
    /// How often expired predictions are swept (seconds)
    pub sweep_interval_secs: u64,
}

impl PendingConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl_secs: 7 * 24 * 60 * 60, // 7 days
            sweep_interval_secs: 300,
        }
    }
}

/// Training case store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Keep at most this many cases, dropping the oldest (None = unbounded)
    pub max_cases: Option<usize>,
    /// Append every case to this JSON-lines file and replay it at startup
    pub journal_path: Option<PathBuf>,
}

/// Feedback reporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Misclassification pairs seen fewer times are left out of the summary
    pub min_pattern_frequency: usize,
    /// Cases needed in one category before a suggestion is made
    pub min_suggestion_count: usize,
    /// Accuracy below which the prompt itself is flagged
    pub low_accuracy_threshold: f64,
    /// Cases needed before the accuracy rule applies
    pub low_accuracy_min_cases: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_pattern_frequency: 2,
            min_suggestion_count: 2,
            low_accuracy_threshold: 0.6,
            low_accuracy_min_cases: 10,
        }
    }
}
