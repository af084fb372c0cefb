use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::ReconError;
use crate::exclusion::Pattern;
use crate::generic::author_key;
use crate::model::{
    AlgorithmConfig, AlgorithmType, ComplementaryGroup, ExactKeyConfig, ExclusionRule,
    GenericIssueMapping, GenericIssueTypeConfig, KeyTranslation, MatchingAlgorithm,
    ParentLinkingConfig, RuleType,
};
use crate::registry::validate_algorithm_config;
use crate::repository::ConfigRepository;
use crate::translate::TranslationTable;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub companies: BTreeMap<String, CompanyConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyConfig {
    #[serde(default)]
    pub threshold_hours: Option<f64>,
    /// Team id -> display name.
    #[serde(default)]
    pub teams: BTreeMap<String, String>,
    /// Author email -> team id.
    #[serde(default)]
    pub members: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: Vec<ComplementaryGroup>,
    #[serde(default)]
    pub algorithms: Vec<AlgorithmEntry>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionEntry>,
    #[serde(default)]
    pub generic_issues: Vec<GenericIssueEntry>,
    #[serde(default)]
    pub key_translations: Vec<KeyTranslation>,
}

fn default_enabled() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Algorithms
// ---------------------------------------------------------------------------

/// One `[[companies.<id>.algorithms]]` table. Per-type fields are optional here
/// and checked against `type` during validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlgorithmEntry {
    #[serde(rename = "type")]
    pub algorithm_type: AlgorithmType,
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub scan_summary: Option<bool>,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default)]
    pub require_key_shape: Option<bool>,
}

impl AlgorithmEntry {
    pub fn to_algorithm(&self, company_id: &str) -> Result<MatchingAlgorithm, ReconError> {
        let reject = |field: &str| {
            Err(ReconError::InvalidAlgorithmConfig {
                algorithm: self.algorithm_type,
                reason: format!("field '{field}' does not apply to this algorithm"),
            })
        };

        let config = match self.algorithm_type {
            AlgorithmType::ParentLinking => {
                if self.key_prefix.is_some() {
                    return reject("key_prefix");
                }
                if self.require_key_shape.is_some() {
                    return reject("require_key_shape");
                }
                AlgorithmConfig::ParentLinking(ParentLinkingConfig {
                    scan_summary: self.scan_summary.unwrap_or(false),
                })
            }
            AlgorithmType::GenericIssueType => {
                if self.scan_summary.is_some() {
                    return reject("scan_summary");
                }
                if self.require_key_shape.is_some() {
                    return reject("require_key_shape");
                }
                let mut c = GenericIssueTypeConfig::default();
                if let Some(ref prefix) = self.key_prefix {
                    c.key_prefix = prefix.clone();
                }
                AlgorithmConfig::GenericIssueType(c)
            }
            AlgorithmType::ExactKey => {
                if self.scan_summary.is_some() {
                    return reject("scan_summary");
                }
                if self.key_prefix.is_some() {
                    return reject("key_prefix");
                }
                AlgorithmConfig::ExactKey(ExactKeyConfig {
                    require_key_shape: self.require_key_shape.unwrap_or(false),
                })
            }
        };
        validate_algorithm_config(&config)?;

        Ok(MatchingAlgorithm {
            company_id: company_id.to_string(),
            enabled: self.enabled,
            priority: self.priority,
            config,
        })
    }
}

// ---------------------------------------------------------------------------
// Exclusions + generic issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusionEntry {
    pub pattern: String,
    pub rule_type: RuleType,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericIssueEntry {
    pub issue_code: String,
    pub issue_type: String,
    pub team_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn company(&self, company_id: &str) -> Option<&CompanyConfig> {
        self.companies.get(company_id)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.companies.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one company is required".into(),
            ));
        }
        for (company_id, company) in &self.companies {
            company.validate(company_id)?;
        }
        Ok(())
    }
}

impl CompanyConfig {
    fn validate(&self, company_id: &str) -> Result<(), ReconError> {
        let invalid = |msg: String| ReconError::ConfigValidation(format!("company '{company_id}': {msg}"));

        if let Some(t) = self.threshold_hours {
            if !t.is_finite() || t < 0.0 {
                return Err(invalid(format!("threshold_hours must be >= 0, got {t}")));
            }
        }

        // Groups
        let mut group_ids = HashSet::new();
        for g in &self.groups {
            if g.id.trim().is_empty() || g.primary_instance_id.trim().is_empty() {
                return Err(invalid("group id and primary must be non-empty".into()));
            }
            if !group_ids.insert(g.id.as_str()) {
                return Err(invalid(format!("duplicate group id '{}'", g.id)));
            }
            if g.secondary_instance_ids.is_empty() {
                return Err(invalid(format!("group '{}' has no secondary instances", g.id)));
            }
            if g.is_secondary(&g.primary_instance_id) {
                return Err(invalid(format!(
                    "group '{}': primary instance '{}' is also listed as secondary",
                    g.id, g.primary_instance_id
                )));
            }
            let mut seen = HashSet::new();
            for s in &g.secondary_instance_ids {
                if !seen.insert(s.as_str()) {
                    return Err(invalid(format!("group '{}': duplicate secondary '{s}'", g.id)));
                }
            }
        }

        // Algorithms: at most one row per type, typed config valid
        let mut types = HashSet::new();
        for entry in &self.algorithms {
            if !types.insert(entry.algorithm_type) {
                return Err(ReconError::DuplicateAlgorithm {
                    company_id: company_id.to_string(),
                    algorithm: entry.algorithm_type,
                });
            }
            entry.to_algorithm(company_id)?;
        }

        // Exclusions
        for e in &self.exclusions {
            Pattern::parse(&e.pattern)?;
        }

        // Generic issue mappings
        let mut mapping_keys = HashSet::new();
        for m in &self.generic_issues {
            if m.issue_code.trim().is_empty() || m.team_id.trim().is_empty() {
                return Err(invalid("generic issue needs issue_code and team_id".into()));
            }
            if m.issue_type.split(',').all(|t| t.trim().is_empty()) {
                return Err(invalid(format!("generic issue '{}' has no issue_type", m.issue_code)));
            }
            if !mapping_keys.insert((&m.issue_code, &m.issue_type, &m.team_id)) {
                return Err(invalid(format!(
                    "duplicate generic issue ({}, {}, {})",
                    m.issue_code, m.issue_type, m.team_id
                )));
            }
        }

        // Members: author emails compare case-insensitively
        let mut authors = HashSet::new();
        for (author, team_id) in &self.members {
            if author.trim().is_empty() || team_id.trim().is_empty() {
                return Err(invalid("members need a non-empty author and team id".into()));
            }
            if !authors.insert(author_key(author)) {
                return Err(invalid(format!("member '{author}' listed more than once")));
            }
        }

        TranslationTable::new(&self.key_translations)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Repository view
// ---------------------------------------------------------------------------

impl ConfigRepository for ReconConfig {
    fn complementary_groups(&self, company_id: &str) -> Result<Vec<ComplementaryGroup>, ReconError> {
        Ok(self.company(company_id).map(|c| c.groups.clone()).unwrap_or_default())
    }

    fn enabled_algorithms(&self, company_id: &str) -> Result<Vec<MatchingAlgorithm>, ReconError> {
        let Some(company) = self.company(company_id) else {
            return Ok(Vec::new());
        };
        company
            .algorithms
            .iter()
            .filter(|a| a.enabled)
            .map(|a| a.to_algorithm(company_id))
            .collect()
    }

    fn exclusion_rules(&self, company_id: &str) -> Result<Vec<ExclusionRule>, ReconError> {
        Ok(self
            .company(company_id)
            .map(|c| {
                c.exclusions
                    .iter()
                    .map(|e| ExclusionRule {
                        company_id: company_id.to_string(),
                        pattern: e.pattern.clone(),
                        rule_type: e.rule_type,
                        description: e.description.clone(),
                        enabled: e.enabled,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn generic_issue_mappings(&self, company_id: &str) -> Result<Vec<GenericIssueMapping>, ReconError> {
        Ok(self
            .company(company_id)
            .map(|c| {
                c.generic_issues
                    .iter()
                    .map(|m| GenericIssueMapping {
                        company_id: company_id.to_string(),
                        issue_code: m.issue_code.trim().to_string(),
                        issue_type: m.issue_type.clone(),
                        team_id: m.team_id.trim().to_string(),
                        description: m.description.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn key_translations(&self, company_id: &str) -> Result<Vec<KeyTranslation>, ReconError> {
        Ok(self
            .company(company_id)
            .map(|c| c.key_translations.clone())
            .unwrap_or_default())
    }

    fn team_names(&self, company_id: &str) -> Result<BTreeMap<String, String>, ReconError> {
        Ok(self.company(company_id).map(|c| c.teams.clone()).unwrap_or_default())
    }

    fn team_members(&self, company_id: &str) -> Result<BTreeMap<String, String>, ReconError> {
        Ok(self
            .company(company_id)
            .map(|c| {
                c.members
                    .iter()
                    .map(|(author, team_id)| (author_key(author), team_id.trim().to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn threshold_hours(&self, company_id: &str) -> Result<Option<f64>, ReconError> {
        Ok(self.company(company_id).and_then(|c| c.threshold_hours))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
