//! Exclusion patterns: exact keys or literal prefixes ending in `*`.

use crate::error::ReconError;
use crate::model::{ExclusionRule, RuleType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    /// Trailing `*` stripped.
    Prefix(String),
}

impl Pattern {
    /// Parse and validate a raw pattern. Only a single trailing `*` is allowed.
    pub fn parse(raw: &str) -> Result<Self, ReconError> {
        let invalid = |reason: &str| ReconError::InvalidExclusionPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern must not be empty"));
        }
        match raw.find('*') {
            None => Ok(Self::Exact(raw.to_string())),
            Some(pos) if pos == raw.len() - 1 => Ok(Self::Prefix(raw[..pos].to_string())),
            Some(_) => Err(invalid("'*' is only supported as the last character")),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(lit) => key == lit,
            Self::Prefix(prefix) => key.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn parse<'a, I>(raw: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let patterns = raw.into_iter().map(Pattern::parse).collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// A key matches the set if any pattern matches it.
    pub fn matches(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(key))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Enabled exclusion rules split by the key they apply to.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    parent_key: PatternSet,
    issue_key: PatternSet,
}

impl ExclusionMatcher {
    /// Enabled rules of `company_id`; rows of other companies are ignored.
    pub fn from_rules(company_id: &str, rules: &[ExclusionRule]) -> Result<Self, ReconError> {
        let enabled = |ty: RuleType| {
            rules
                .iter()
                .filter(move |r| r.enabled && r.rule_type == ty && r.company_id == company_id)
                .map(|r| r.pattern.as_str())
        };
        Ok(Self {
            parent_key: PatternSet::parse(enabled(RuleType::ParentKey))?,
            issue_key: PatternSet::parse(enabled(RuleType::IssueKey))?,
        })
    }

    /// `parent_key` rules apply to the initiative key. `issue_key` rules apply to
    /// the untranslated issue keys of the initiative's `exact_key` worklogs, so an
    /// initiative without such worklogs is never excluded by them.
    pub fn is_excluded<I, S>(&self, initiative_key: &str, exact_issue_keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.parent_key.matches(initiative_key) {
            return true;
        }
        !self.issue_key.is_empty()
            && exact_issue_keys
                .into_iter()
                .any(|k| self.issue_key.matches(k.as_ref()))
    }

    pub fn rule_count(&self) -> usize {
        self.parent_key.len() + self.issue_key.len()
    }
}
