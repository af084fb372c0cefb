use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigWarning;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single worklog row as produced by the external worklog repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Worklog {
    pub company_id: String,
    pub instance_id: String,
    pub issue_key: String,
    pub issue_type: String,
    /// Epic / project key, if the tracker links one.
    pub parent_key: Option<String>,
    pub author: String,
    pub duration_seconds: i64,
    pub started_at: NaiveDateTime,
    pub issue_summary: Option<String>,
    pub parent_name: Option<String>,
}

impl Worklog {
    /// True when `started_at` falls in the half-open window `[start, end)`.
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let day = self.started_at.date();
        day >= start && day < end
    }
}

/// Instances whose worklogs are reconciled against each other.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComplementaryGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "primary")]
    pub primary_instance_id: String,
    #[serde(rename = "secondaries")]
    pub secondary_instance_ids: Vec<String>,
}

impl ComplementaryGroup {
    pub fn is_secondary(&self, instance_id: &str) -> bool {
        self.secondary_instance_ids.iter().any(|s| s == instance_id)
    }

    /// Primary first, then secondaries in configured order.
    pub fn instances(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_instance_id.as_str())
            .chain(self.secondary_instance_ids.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Matching algorithms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmType {
    ParentLinking,
    GenericIssueType,
    ExactKey,
}

impl AlgorithmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentLinking => "parent_linking",
            Self::GenericIssueType => "generic_issue_type",
            Self::ExactKey => "exact_key",
        }
    }
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentLinkingConfig {
    /// Fall back to the first tracker key found in the issue summary, then the parent name.
    pub scan_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericIssueTypeConfig {
    /// Prefix of the synthetic initiative key, `<prefix>:<team_id>`.
    pub key_prefix: String,
}

impl Default for GenericIssueTypeConfig {
    fn default() -> Self {
        Self {
            key_prefix: "TEAM".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactKeyConfig {
    /// Only accept issue keys shaped like `PROJ-123`.
    pub require_key_shape: bool,
}

/// Per-algorithm configuration; the variant determines the algorithm type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmConfig {
    ParentLinking(ParentLinkingConfig),
    GenericIssueType(GenericIssueTypeConfig),
    ExactKey(ExactKeyConfig),
}

impl AlgorithmConfig {
    pub fn algorithm_type(&self) -> AlgorithmType {
        match self {
            Self::ParentLinking(_) => AlgorithmType::ParentLinking,
            Self::GenericIssueType(_) => AlgorithmType::GenericIssueType,
            Self::ExactKey(_) => AlgorithmType::ExactKey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingAlgorithm {
    pub company_id: String,
    pub enabled: bool,
    /// Ascending: lower numbers are evaluated first.
    pub priority: i32,
    pub config: AlgorithmConfig,
}

impl MatchingAlgorithm {
    pub fn algorithm_type(&self) -> AlgorithmType {
        self.config.algorithm_type()
    }
}

// ---------------------------------------------------------------------------
// Exclusions, generic mappings, key translations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    IssueKey,
    ParentKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    pub company_id: String,
    pub pattern: String,
    pub rule_type: RuleType,
    pub description: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericIssueMapping {
    pub company_id: String,
    pub issue_code: String,
    /// One issue type, or several separated by commas.
    pub issue_type: String,
    pub team_id: String,
    pub description: Option<String>,
}

impl GenericIssueMapping {
    pub fn issue_types(&self) -> impl Iterator<Item = &str> {
        self.issue_type
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Declares that `from` on `instance_id` means the same initiative as `to`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyTranslation {
    #[serde(rename = "instance")]
    pub instance_id: String,
    pub from: String,
    pub to: String,
}

// ---------------------------------------------------------------------------
// Derived
// ---------------------------------------------------------------------------

/// How a worklog ended up under its initiative key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    ParentLinking,
    GenericIssueType,
    ExactKey,
    Unmatched,
}

impl From<AlgorithmType> for MatchOrigin {
    fn from(t: AlgorithmType) -> Self {
        match t {
            AlgorithmType::ParentLinking => Self::ParentLinking,
            AlgorithmType::GenericIssueType => Self::GenericIssueType,
            AlgorithmType::ExactKey => Self::ExactKey,
        }
    }
}

/// Result of running the matching cascade over one worklog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub initiative_key: String,
    pub display_name: String,
    pub origin: MatchOrigin,
}

/// Hours for one initiative, accumulated in whole seconds per side.
#[derive(Debug, Clone, Default)]
pub struct Initiative {
    pub key: String,
    pub name: String,
    pub primary_seconds: i64,
    pub secondary_seconds: i64,
    pub primary_worklogs: usize,
    pub secondary_worklogs: usize,
    pub primary_issues: BTreeSet<String>,
    pub secondary_issues: BTreeSet<String>,
    /// Issue keys of the worklogs placed by `exact_key`, before key translation.
    pub exact_issues: BTreeSet<String>,
    pub origins: BTreeSet<MatchOrigin>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One row of the discrepancy report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyGroup {
    pub initiative_key: String,
    pub initiative_name: String,
    pub primary_hours: f64,
    pub secondary_hours: f64,
    pub delta_hours: f64,
    pub delta_percentage: f64,
    pub is_excluded: bool,
    pub primary_worklogs: usize,
    pub secondary_worklogs: usize,
    pub primary_issues: Vec<String>,
    pub secondary_issues: Vec<String>,
    pub matched_by: Vec<MatchOrigin>,
    #[serde(skip)]
    pub delta_seconds: i64,
}

/// A single secondary serializes as a string, several as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SecondaryInstances {
    One(String),
    Many(Vec<String>),
}

impl SecondaryInstances {
    pub fn from_ids(ids: &[String]) -> Self {
        match ids {
            [only] => Self::One(only.clone()),
            many => Self::Many(many.to_vec()),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::One(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub company_id: String,
    pub group_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub threshold_hours: f64,
    /// Effective cascade order for this run.
    pub algorithms: Vec<AlgorithmType>,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancyReport {
    pub group_name: String,
    pub primary_instance: String,
    pub secondary_instance: SecondaryInstances,
    pub primary_hours: f64,
    pub secondary_hours: f64,
    pub delta: f64,
    pub discrepancy_count: usize,
    pub discrepancy_groups: Vec<DiscrepancyGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
    pub meta: ReportMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_instances_shape() {
        let one = SecondaryInstances::from_ids(&["MMFG".to_string()]);
        assert_eq!(serde_json::to_value(&one).unwrap(), serde_json::json!("MMFG"));

        let many = SecondaryInstances::from_ids(&["A".to_string(), "B".to_string()]);
        assert_eq!(serde_json::to_value(&many).unwrap(), serde_json::json!(["A", "B"]));
        assert_eq!(many.ids(), vec!["A", "B"]);
    }

    #[test]
    fn mapping_splits_issue_types() {
        let m = GenericIssueMapping {
            company_id: "acme".into(),
            issue_code: "DMA".into(),
            issue_type: "Incident, Request,,Bug ".into(),
            team_id: "7".into(),
            description: None,
        };
        assert_eq!(m.issue_types().collect::<Vec<_>>(), vec!["Incident", "Request", "Bug"]);
    }

    #[test]
    fn range_is_half_open() {
        let wl = Worklog {
            company_id: "acme".into(),
            instance_id: "OT".into(),
            issue_key: "A-1".into(),
            issue_type: "Task".into(),
            parent_key: None,
            author: "a@example.com".into(),
            duration_seconds: 60,
            started_at: NaiveDate::from_ymd_opt(2026, 1, 31)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
            issue_summary: None,
            parent_name: None,
        };
        let jan1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let jan31 = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let feb1 = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(wl.within(jan1, feb1));
        assert!(!wl.within(jan1, jan31));
    }
}
