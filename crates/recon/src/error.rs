use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::AlgorithmType;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad group membership, duplicate mapping, etc.).
    ConfigValidation(String),
    /// The requested complementary group does not exist for the company.
    UnknownGroup { company_id: String, group_id: String },
    /// More than one algorithm row of the same type for a company.
    DuplicateAlgorithm { company_id: String, algorithm: AlgorithmType },
    /// Typed algorithm config failed validation.
    InvalidAlgorithmConfig { algorithm: AlgorithmType, reason: String },
    /// Exclusion pattern is empty or uses an unsupported wildcard.
    InvalidExclusionPattern { pattern: String, reason: String },
    /// Reconciliation window ends before it starts.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Worklog repository failed to produce rows for an instance.
    Repository { instance_id: String, message: String },
    /// Missing required column in a worklog export.
    MissingColumn { column: String },
    /// Unparseable `started_at` value.
    DateParse { line: u64, value: String },
    /// Non-numeric or non-positive duration.
    DurationParse { line: u64, value: String },
    /// A repository row whose duration cannot be summed (negative, or overflowing the totals).
    InvalidDuration { instance_id: String, issue_key: String, reason: String },
    /// Run was cancelled by the caller.
    Cancelled,
    /// IO error (file read, etc.).
    Io(String),
}

impl ReconError {
    /// Stable machine-readable code, surfaced in reports and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_)
            | Self::ConfigValidation(_)
            | Self::UnknownGroup { .. }
            | Self::DuplicateAlgorithm { .. }
            | Self::InvalidAlgorithmConfig { .. }
            | Self::InvalidExclusionPattern { .. }
            | Self::InvalidRange { .. } => "configuration_error",
            Self::Repository { .. } => "repository_error",
            Self::MissingColumn { .. }
            | Self::DateParse { .. }
            | Self::DurationParse { .. }
            | Self::InvalidDuration { .. }
            | Self::Io(_) => "input_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Fatal configuration problems: the run is aborted and no partial report is produced.
    pub fn is_configuration(&self) -> bool {
        self.code() == "configuration_error"
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownGroup { company_id, group_id } => {
                write!(f, "company '{company_id}': unknown complementary group '{group_id}'")
            }
            Self::DuplicateAlgorithm { company_id, algorithm } => {
                write!(f, "company '{company_id}': algorithm '{algorithm}' configured more than once")
            }
            Self::InvalidAlgorithmConfig { algorithm, reason } => {
                write!(f, "algorithm '{algorithm}': {reason}")
            }
            Self::InvalidExclusionPattern { pattern, reason } => {
                write!(f, "exclusion pattern '{pattern}': {reason}")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "invalid range: start {start} is after end {end}")
            }
            Self::Repository { instance_id, message } => {
                write!(f, "instance '{instance_id}': worklog fetch failed: {message}")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::DateParse { line, value } => {
                write!(f, "line {line}: cannot parse started_at '{value}'")
            }
            Self::DurationParse { line, value } => {
                write!(f, "line {line}: duration_seconds must be a positive integer, got '{value}'")
            }
            Self::InvalidDuration { instance_id, issue_key, reason } => {
                write!(f, "instance '{instance_id}', issue '{issue_key}': {reason}")
            }
            Self::Cancelled => write!(f, "reconciliation cancelled"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// Non-fatal configuration findings returned alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// Several mappings share `(issue_code, issue_type)` but point at different teams.
    /// A worklog whose author belongs to one of them goes to that team; any other
    /// worklog goes to the first team in configuration order.
    AmbiguousMapping {
        issue_code: String,
        issue_type: String,
        team_ids: Vec<String>,
        chosen: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousMapping { issue_code, issue_type, team_ids, chosen } => write!(
                f,
                "generic issue mapping ({issue_code}, {issue_type}) is ambiguous across teams [{}]; using the author's team, else '{chosen}'",
                team_ids.join(", ")
            ),
        }
    }
}
