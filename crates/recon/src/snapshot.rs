//! Immutable view of a company's settings, captured once at the start of a run.

use std::collections::{BTreeMap, HashSet};

use crate::error::{ConfigWarning, ReconError};
use crate::exclusion::ExclusionMatcher;
use crate::generic::{author_key, GenericIssueResolver};
use crate::model::ComplementaryGroup;
use crate::registry::AlgorithmRegistry;
use crate::repository::ConfigRepository;
use crate::translate::TranslationTable;

#[derive(Debug)]
pub struct ConfigSnapshot {
    pub company_id: String,
    pub group: ComplementaryGroup,
    pub registry: AlgorithmRegistry,
    pub exclusions: ExclusionMatcher,
    pub resolver: GenericIssueResolver,
    pub translations: TranslationTable,
    pub team_names: BTreeMap<String, String>,
    /// Author -> team id, keyed by [`author_key`].
    pub members: BTreeMap<String, String>,
    pub threshold_hours: Option<f64>,
}

impl ConfigSnapshot {
    /// Read everything the run needs from `config`. Later edits to the
    /// repository do not affect a captured snapshot.
    pub fn capture<C>(config: &C, company_id: &str, group_id: &str) -> Result<Self, ReconError>
    where
        C: ConfigRepository + ?Sized,
    {
        let group = config
            .complementary_groups(company_id)?
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ReconError::UnknownGroup {
                company_id: company_id.to_string(),
                group_id: group_id.to_string(),
            })?;
        validate_group(&group)?;

        let registry = AlgorithmRegistry::new(company_id, config.enabled_algorithms(company_id)?)?;
        let exclusions = ExclusionMatcher::from_rules(company_id, &config.exclusion_rules(company_id)?)?;
        let resolver = GenericIssueResolver::new(company_id, &config.generic_issue_mappings(company_id)?);
        let translations = TranslationTable::new(&config.key_translations(company_id)?)?;
        let team_names = config.team_names(company_id)?;
        let members: BTreeMap<String, String> = config
            .team_members(company_id)?
            .into_iter()
            .map(|(author, team_id)| (author_key(&author), team_id.trim().to_string()))
            .collect();
        let threshold_hours = config.threshold_hours(company_id)?;

        for warning in resolver.warnings() {
            log::warn!("company '{company_id}': {warning}");
        }
        log::debug!(
            "snapshot for '{company_id}/{group_id}': algorithms={:?} exclusions={} translations={} members={}",
            registry.order(),
            exclusions.rule_count(),
            translations.len(),
            members.len()
        );

        Ok(Self {
            company_id: company_id.to_string(),
            group,
            registry,
            exclusions,
            resolver,
            translations,
            team_names,
            members,
            threshold_hours,
        })
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        self.resolver.warnings()
    }
}

/// Membership checks for groups that come from repositories other than the
/// validated TOML config.
fn validate_group(group: &ComplementaryGroup) -> Result<(), ReconError> {
    if group.secondary_instance_ids.is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "group '{}' has no secondary instances",
            group.id
        )));
    }
    if group.is_secondary(&group.primary_instance_id) {
        return Err(ReconError::ConfigValidation(format!(
            "group '{}': primary instance '{}' is also listed as secondary",
            group.id, group.primary_instance_id
        )));
    }
    let mut seen = HashSet::new();
    for s in &group.secondary_instance_ids {
        if !seen.insert(s.as_str()) {
            return Err(ReconError::ConfigValidation(format!(
                "group '{}': duplicate secondary '{s}'",
                group.id
            )));
        }
    }
    Ok(())
}
