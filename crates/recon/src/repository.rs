//! Read-only collaborators the engine pulls its inputs from.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::error::ReconError;
use crate::model::{
    ComplementaryGroup, ExclusionRule, GenericIssueMapping, KeyTranslation, MatchingAlgorithm,
    Worklog,
};

/// Source of cached worklog rows. Implementations may be called from several
/// threads at once, one call per instance.
pub trait WorklogRepository: Sync {
    /// Worklogs for one instance with `started_at` in `[start, end)`.
    fn get(
        &self,
        company_id: &str,
        instance_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Worklog>, ReconError>;
}

/// Source of per-company reconciliation settings.
pub trait ConfigRepository {
    fn complementary_groups(&self, company_id: &str) -> Result<Vec<ComplementaryGroup>, ReconError>;

    fn enabled_algorithms(&self, company_id: &str) -> Result<Vec<MatchingAlgorithm>, ReconError>;

    fn exclusion_rules(&self, company_id: &str) -> Result<Vec<ExclusionRule>, ReconError>;

    fn generic_issue_mappings(&self, company_id: &str) -> Result<Vec<GenericIssueMapping>, ReconError>;

    fn key_translations(&self, _company_id: &str) -> Result<Vec<KeyTranslation>, ReconError> {
        Ok(Vec::new())
    }

    /// Display names for team ids used by generic issue mappings.
    fn team_names(&self, _company_id: &str) -> Result<BTreeMap<String, String>, ReconError> {
        Ok(BTreeMap::new())
    }

    /// Author (email) -> team id. Picks the team among generic mappings that
    /// share an issue code and type.
    fn team_members(&self, _company_id: &str) -> Result<BTreeMap<String, String>, ReconError> {
        Ok(BTreeMap::new())
    }

    /// Company default for the discrepancy threshold, if configured.
    fn threshold_hours(&self, _company_id: &str) -> Result<Option<f64>, ReconError> {
        Ok(None)
    }
}

/// Worklogs held in memory, indexed by `(company_id, instance_id)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorklogs {
    rows: HashMap<(String, String), Vec<Worklog>>,
}

impl InMemoryWorklogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Worklog>) -> Self {
        let mut repo = Self::new();
        repo.extend(rows);
        repo
    }

    pub fn insert(&mut self, worklog: Worklog) {
        self.rows
            .entry((worklog.company_id.clone(), worklog.instance_id.clone()))
            .or_default()
            .push(worklog);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Worklog>) {
        for row in rows {
            self.insert(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WorklogRepository for InMemoryWorklogs {
    fn get(
        &self,
        company_id: &str,
        instance_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Worklog>, ReconError> {
        let key = (company_id.to_string(), instance_id.to_string());
        let mut rows: Vec<Worklog> = self
            .rows
            .get(&key)
            .map(|rows| rows.iter().filter(|w| w.within(start, end)).cloned().collect())
            .unwrap_or_default();
        // Stable: rows logged at the same instant keep insertion order.
        rows.sort_by_key(|w| w.started_at);
        Ok(rows)
    }
}
