//! Fallback mapping from (issue code, issue type) to the team that owns the work.

use std::collections::BTreeMap;

use crate::error::ConfigWarning;
use crate::model::GenericIssueMapping;

/// Team a generic mapping resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTeam {
    pub team_id: String,
    pub description: Option<String>,
}

/// Project prefix of an issue key: everything before the first separator
/// (`DLWMS-866` -> `DLWMS`). Keys without a separator yield their leading letters.
pub fn issue_code(issue_key: &str) -> Option<&str> {
    let key = issue_key.trim();
    let code = match key.find(|c: char| !c.is_ascii_alphanumeric()) {
        Some(pos) => &key[..pos],
        None => {
            let end = key
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(key.len());
            &key[..end]
        }
    };
    (!code.is_empty()).then_some(code)
}

/// Key under which an author is looked up in the member directory.
pub fn author_key(author: &str) -> String {
    author.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct GenericIssueResolver {
    /// Candidate teams per `(issue_code, issue_type)`, in configuration order.
    index: BTreeMap<(String, String), Vec<ResolvedTeam>>,
    warnings: Vec<ConfigWarning>,
}

impl GenericIssueResolver {
    /// Build the lookup table from the company's mappings; rows of other companies
    /// are ignored. A pair mapped to more than one team is reported as an
    /// ambiguity warning.
    pub fn new(company_id: &str, mappings: &[GenericIssueMapping]) -> Self {
        let mut index: BTreeMap<(String, String), Vec<ResolvedTeam>> = BTreeMap::new();

        for mapping in mappings.iter().filter(|m| m.company_id == company_id) {
            for issue_type in mapping.issue_types() {
                let teams = index
                    .entry((mapping.issue_code.clone(), issue_type.to_string()))
                    .or_default();
                if !teams.iter().any(|t| t.team_id == mapping.team_id) {
                    teams.push(ResolvedTeam {
                        team_id: mapping.team_id.clone(),
                        description: mapping.description.clone(),
                    });
                }
            }
        }

        let warnings = index
            .iter()
            .filter(|(_, teams)| teams.len() > 1)
            .map(|((issue_code, issue_type), teams)| ConfigWarning::AmbiguousMapping {
                issue_code: issue_code.clone(),
                issue_type: issue_type.clone(),
                team_ids: teams.iter().map(|t| t.team_id.clone()).collect(),
                chosen: teams[0].team_id.clone(),
            })
            .collect();

        Self { index, warnings }
    }

    /// Resolve the owning team. A mapping keyed by the full issue key (a container
    /// issue) takes precedence over one keyed by the project prefix. Among several
    /// teams for the same pair, the author's team wins, then the first configured.
    pub fn resolve(
        &self,
        issue_key: &str,
        issue_type: &str,
        author_team: Option<&str>,
    ) -> Option<&ResolvedTeam> {
        let issue_type = issue_type.trim();
        if issue_type.is_empty() {
            return None;
        }
        let lookup = |code: &str| {
            self.index
                .get(&(code.to_string(), issue_type.to_string()))
                .filter(|teams| !teams.is_empty())
        };

        let teams = lookup(issue_key.trim()).or_else(|| issue_code(issue_key).and_then(lookup))?;
        author_team
            .and_then(|team| teams.iter().find(|t| t.team_id == team))
            .or_else(|| teams.first())
    }

    /// Ambiguous mappings, ordered by `(issue_code, issue_type)`.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
