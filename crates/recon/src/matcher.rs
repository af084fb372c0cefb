use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::generic::{author_key, GenericIssueResolver};
use crate::model::{
    AlgorithmConfig, Assignment, ExactKeyConfig, GenericIssueTypeConfig, MatchOrigin,
    MatchingAlgorithm, ParentLinkingConfig, Worklog,
};
use crate::translate::KeyTranslator;

/// Bucket for worklogs no algorithm could place. Scoped per instance so leftover
/// hours from two trackers never pair up with each other.
pub fn unmatched_key(instance_id: &str) -> String {
    format!("UNMATCHED:{instance_id}")
}

fn tracker_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][A-Z0-9]+-[0-9]+").expect("static tracker key pattern"))
}

fn tracker_key_shape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]+-[0-9]+$").expect("static tracker key pattern"))
}

/// First `PROJ-123` shaped token in free text.
pub fn find_tracker_key(text: &str) -> Option<&str> {
    tracker_key_re().find(text).map(|m| m.as_str())
}

pub fn is_tracker_key(key: &str) -> bool {
    tracker_key_shape_re().is_match(key)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Assigns initiative keys by running the enabled algorithms in priority order.
/// The first algorithm that yields a key wins.
pub struct MatchingEngine<'s> {
    algorithms: &'s [MatchingAlgorithm],
    resolver: &'s GenericIssueResolver,
    translator: &'s dyn KeyTranslator,
    team_names: Option<&'s BTreeMap<String, String>>,
    members: Option<&'s BTreeMap<String, String>>,
}

impl<'s> MatchingEngine<'s> {
    pub fn new(
        algorithms: &'s [MatchingAlgorithm],
        resolver: &'s GenericIssueResolver,
        translator: &'s dyn KeyTranslator,
    ) -> Self {
        Self {
            algorithms,
            resolver,
            translator,
            team_names: None,
            members: None,
        }
    }

    /// Display names for `TEAM:<id>` initiatives.
    pub fn with_team_names(mut self, names: &'s BTreeMap<String, String>) -> Self {
        self.team_names = Some(names);
        self
    }

    /// Author -> team directory, keyed by [`author_key`]. Used to pick among
    /// generic mappings that share an issue code and type.
    pub fn with_members(mut self, members: &'s BTreeMap<String, String>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn assign_initiative(&self, worklog: &Worklog) -> Assignment {
        self.algorithms
            .iter()
            .find_map(|algo| self.try_algorithm(&algo.config, worklog))
            .unwrap_or_else(|| Assignment {
                initiative_key: unmatched_key(&worklog.instance_id),
                display_name: format!("Unmatched worklogs ({})", worklog.instance_id),
                origin: MatchOrigin::Unmatched,
            })
    }

    fn try_algorithm(&self, config: &AlgorithmConfig, worklog: &Worklog) -> Option<Assignment> {
        match config {
            AlgorithmConfig::ParentLinking(c) => self.parent_linking(c, worklog),
            AlgorithmConfig::GenericIssueType(c) => self.generic_issue_type(c, worklog),
            AlgorithmConfig::ExactKey(c) => self.exact_key(c, worklog),
        }
    }

    fn parent_linking(&self, config: &ParentLinkingConfig, worklog: &Worklog) -> Option<Assignment> {
        let parent_name = non_empty(worklog.parent_name.as_deref());

        let parent_key = non_empty(worklog.parent_key.as_deref()).or_else(|| {
            if !config.scan_summary {
                return None;
            }
            non_empty(worklog.issue_summary.as_deref())
                .and_then(find_tracker_key)
                .or_else(|| parent_name.and_then(find_tracker_key))
        })?;

        let key = self.translator.translate(&worklog.instance_id, parent_key);
        Some(Assignment {
            display_name: parent_name.unwrap_or(&*key).to_string(),
            initiative_key: key.into_owned(),
            origin: MatchOrigin::ParentLinking,
        })
    }

    fn generic_issue_type(
        &self,
        config: &GenericIssueTypeConfig,
        worklog: &Worklog,
    ) -> Option<Assignment> {
        let author_team = self
            .members
            .and_then(|members| members.get(&author_key(&worklog.author)))
            .map(String::as_str);
        let team = self
            .resolver
            .resolve(&worklog.issue_key, &worklog.issue_type, author_team)?;

        let display_name = self
            .team_names
            .and_then(|names| names.get(&team.team_id))
            .cloned()
            .or_else(|| team.description.clone())
            .unwrap_or_else(|| format!("Team {}", team.team_id));

        Some(Assignment {
            initiative_key: format!("{}:{}", config.key_prefix.trim(), team.team_id),
            display_name,
            origin: MatchOrigin::GenericIssueType,
        })
    }

    fn exact_key(&self, config: &ExactKeyConfig, worklog: &Worklog) -> Option<Assignment> {
        let issue_key = non_empty(Some(worklog.issue_key.as_str()))?;
        if config.require_key_shape && !is_tracker_key(issue_key) {
            return None;
        }

        let key = self.translator.translate(&worklog.instance_id, issue_key);
        Some(Assignment {
            display_name: non_empty(worklog.issue_summary.as_deref())
                .unwrap_or(&*key)
                .to_string(),
            initiative_key: key.into_owned(),
            origin: MatchOrigin::ExactKey,
        })
    }
}
