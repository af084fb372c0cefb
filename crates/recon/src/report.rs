//! Packages aggregated initiatives into the externally consumed report shape.

use crate::aggregate::{delta_percentage, seconds_to_hours};
use crate::error::{ConfigWarning, ReconError};
use crate::exclusion::ExclusionMatcher;
use crate::model::{
    ComplementaryGroup, DiscrepancyGroup, DiscrepancyReport, Initiative, ReportError, ReportMeta,
    SecondaryInstances,
};

pub struct DiscrepancyReportBuilder<'a> {
    group: &'a ComplementaryGroup,
    meta: ReportMeta,
    exclusions: Option<&'a ExclusionMatcher>,
    warnings: Vec<ConfigWarning>,
}

impl<'a> DiscrepancyReportBuilder<'a> {
    pub fn new(group: &'a ComplementaryGroup, meta: ReportMeta) -> Self {
        Self {
            group,
            meta,
            exclusions: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: &'a ExclusionMatcher) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    pub fn with_warnings(mut self, warnings: &[ConfigWarning]) -> Self {
        self.warnings = warnings.to_vec();
        self
    }

    pub fn build(self, initiatives: Vec<Initiative>) -> DiscrepancyReport {
        let primary_seconds: i64 = initiatives.iter().map(|i| i.primary_seconds).sum();
        let secondary_seconds: i64 = initiatives.iter().map(|i| i.secondary_seconds).sum();

        let mut groups: Vec<DiscrepancyGroup> = initiatives
            .into_iter()
            .map(|i| self.discrepancy_group(i))
            .collect();

        groups.sort_by(|a, b| {
            b.delta_seconds
                .abs()
                .cmp(&a.delta_seconds.abs())
                .then_with(|| a.initiative_key.cmp(&b.initiative_key))
        });

        let threshold = self.meta.threshold_hours;
        let discrepancy_count = groups
            .iter()
            .filter(|g| g.delta_hours.abs() > threshold)
            .count();

        DiscrepancyReport {
            group_name: self.group.name.clone(),
            primary_instance: self.group.primary_instance_id.clone(),
            secondary_instance: SecondaryInstances::from_ids(&self.group.secondary_instance_ids),
            primary_hours: seconds_to_hours(primary_seconds),
            secondary_hours: seconds_to_hours(secondary_seconds),
            delta: seconds_to_hours(primary_seconds - secondary_seconds),
            discrepancy_count,
            discrepancy_groups: groups,
            warnings: self.warnings,
            error: None,
            meta: self.meta,
        }
    }

    fn discrepancy_group(&self, i: Initiative) -> DiscrepancyGroup {
        let primary_hours = seconds_to_hours(i.primary_seconds);
        let secondary_hours = seconds_to_hours(i.secondary_seconds);
        let delta_seconds = i.primary_seconds - i.secondary_seconds;
        let is_excluded = self
            .exclusions
            .is_some_and(|m| m.is_excluded(&i.key, &i.exact_issues));

        DiscrepancyGroup {
            initiative_name: i.name,
            primary_hours,
            secondary_hours,
            delta_hours: seconds_to_hours(delta_seconds),
            delta_percentage: delta_percentage(primary_hours, secondary_hours),
            is_excluded,
            primary_worklogs: i.primary_worklogs,
            secondary_worklogs: i.secondary_worklogs,
            primary_issues: i.primary_issues.into_iter().collect(),
            secondary_issues: i.secondary_issues.into_iter().collect(),
            matched_by: i.origins.into_iter().collect(),
            delta_seconds,
            initiative_key: i.key,
        }
    }
}

/// Empty report carrying a fatal error. Never contains partial results.
pub fn failed_report(
    group: Option<&ComplementaryGroup>,
    meta: ReportMeta,
    err: &ReconError,
) -> DiscrepancyReport {
    let (group_name, primary_instance, secondary_instance) = match group {
        Some(g) => (
            g.name.clone(),
            g.primary_instance_id.clone(),
            SecondaryInstances::from_ids(&g.secondary_instance_ids),
        ),
        None => (
            meta.group_id.clone(),
            String::new(),
            SecondaryInstances::Many(Vec::new()),
        ),
    };

    DiscrepancyReport {
        group_name,
        primary_instance,
        secondary_instance,
        primary_hours: 0.0,
        secondary_hours: 0.0,
        delta: 0.0,
        discrepancy_count: 0,
        discrepancy_groups: Vec::new(),
        warnings: Vec::new(),
        error: Some(ReportError {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
        meta,
    }
}
