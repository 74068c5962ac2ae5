//! Training case store.
//!
//! Append-only record of settled predictions. Cases live in memory behind a
//! `RwLock`; an optional journal persists them across restarts.

use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shepherd_taxonomy::prompt::truncate_chars;
use shepherd_taxonomy::Priority;

use crate::config::StoreConfig;
use crate::journal::CaseJournal;
use crate::types::{MisclassificationPattern, Result, TrainingCase, EXAMPLE_SNIPPET_CHARS};

/// Stores training cases for the feedback loop.
pub struct TrainingCaseStore {
    cases: RwLock<VecDeque<TrainingCase>>,
    max_cases: Option<usize>,
    journal: Option<CaseJournal>,
}

impl TrainingCaseStore {
    /// Create an unbounded in-memory store.
    pub fn new() -> Self {
        Self {
            cases: RwLock::new(VecDeque::new()),
            max_cases: None,
            journal: None,
        }
    }

    /// Create an in-memory store keeping at most `max` cases.
    pub fn with_max_cases(max: usize) -> Self {
        Self {
            max_cases: Some(max.max(1)),
            ..Self::new()
        }
    }

    /// Create from configuration, replaying the journal if one is set.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let max_cases = config.max_cases.map(|max| max.max(1));

        let Some(path) = &config.journal_path else {
            return Ok(Self {
                max_cases,
                ..Self::new()
            });
        };

        let mut cases: VecDeque<TrainingCase> = CaseJournal::load(path)?.into();
        if let Some(max) = max_cases {
            while cases.len() > max {
                cases.pop_front();
            }
        }
        let journal = CaseJournal::open(path)?;

        info!(
            cases = cases.len(),
            journal = %path.display(),
            "Training case store restored"
        );

        Ok(Self {
            cases: RwLock::new(cases),
            max_cases,
            journal: Some(journal),
        })
    }

    /// Append a case.
    ///
    /// The case is always kept in memory; an error means only the journal
    /// write failed.
    pub async fn add(&self, case: TrainingCase) -> Result<()> {
        debug!(
            case_id = %case.case_id,
            content_id = %case.content_id,
            outcome = %case.outcome,
            "Storing training case"
        );

        {
            let mut cases = self.cases.write().await;
            cases.push_back(case.clone());

            if let Some(max) = self.max_cases {
                while cases.len() > max {
                    if let Some(dropped) = cases.pop_front() {
                        debug!(case_id = %dropped.case_id, "Dropped oldest training case");
                    }
                }
            }
        }

        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&case).await {
                warn!(
                    case_id = %case.case_id,
                    journal = %journal.path().display(),
                    error = %e,
                    "Failed to journal training case"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    /// Snapshot of every case, oldest first.
    pub async fn all(&self) -> Vec<TrainingCase> {
        self.cases.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }

    /// Every `(predicted, corrected)` pair with its frequency.
    pub async fn misclassification_table(&self) -> Vec<MisclassificationPattern> {
        let cases = self.cases.read().await;
        group_misclassifications(cases.iter())
    }

    /// The `limit` most frequent misclassification patterns.
    pub async fn recent_misclassifications(&self, limit: usize) -> Vec<MisclassificationPattern> {
        let mut table = self.misclassification_table().await;
        table.truncate(limit);
        table
    }
}

impl Default for TrainingCaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct PairTally<'a> {
    frequency: usize,
    categories: BTreeMap<String, usize>,
    latest: Option<&'a TrainingCase>,
}

/// Group misclassified cases by `(predicted, corrected)` priority pair.
///
/// Sorted by frequency descending, then severity gap descending, then by
/// predicted and corrected ordinal ascending, so equal inputs always give
/// equal output.
pub fn group_misclassifications<'a>(
    cases: impl IntoIterator<Item = &'a TrainingCase>,
) -> Vec<MisclassificationPattern> {
    let mut pairs: BTreeMap<(Priority, Priority), PairTally<'a>> = BTreeMap::new();

    for case in cases.into_iter().filter(|c| c.is_misclassified()) {
        let tally = pairs
            .entry((case.ai_priority(), case.human_priority()))
            .or_default();
        tally.frequency += 1;
        *tally.categories.entry(case.effective_category()).or_insert(0) += 1;
        tally.latest = Some(case);
    }

    let mut patterns: Vec<MisclassificationPattern> = pairs
        .into_iter()
        .filter_map(|((ai_predicted, human_corrected), tally)| {
            let latest = tally.latest?;
            // Most frequent category; alphabetical on ties.
            let category = tally
                .categories
                .iter()
                .max_by_key(|&(name, count)| (*count, Reverse(name.as_str())))
                .map(|(name, _)| name.clone())
                .unwrap_or_default();

            Some(MisclassificationPattern {
                ai_predicted,
                human_corrected,
                frequency: tally.frequency,
                category,
                example: truncate_chars(latest.content.trim(), EXAMPLE_SNIPPET_CHARS),
                content_type: latest.content_type.clone(),
            })
        })
        .collect();

    patterns.sort_by_key(|p| {
        (
            Reverse(p.frequency),
            Reverse(p.severity_gap()),
            p.ai_predicted,
            p.human_corrected,
        )
    });

    patterns
}
