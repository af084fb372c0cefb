use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;

use crate::aggregate::{InitiativeAccumulator, Side};
use crate::error::ReconError;
use crate::matcher::MatchingEngine;
use crate::model::{ComplementaryGroup, DiscrepancyReport, ReportMeta, Worklog};
use crate::report::{failed_report, DiscrepancyReportBuilder};
use crate::repository::{ConfigRepository, WorklogRepository};
use crate::snapshot::ConfigSnapshot;
use crate::translate::KeyTranslator;

/// Shared flag a caller sets to abandon an in-flight run.
pub type CancelToken = Arc<AtomicBool>;

/// Worklogs between cancellation checks during aggregation.
const CANCEL_CHECK_EVERY: usize = 1024;

/// One reconciliation: a company, one of its groups, and a `[start, end)` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconRequest {
    pub company_id: String,
    pub group_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReconRequest {
    pub fn new(
        company_id: impl Into<String>,
        group_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            group_id: group_id.into(),
            start,
            end,
        }
    }
}

/// Per-run overrides. Anything left unset comes from the config snapshot.
#[derive(Clone, Default)]
pub struct RunOptions {
    pub threshold_hours: Option<f64>,
    /// Replaces the configured key translation table.
    pub translator: Option<Arc<dyn KeyTranslator>>,
    pub cancel: Option<CancelToken>,
}

impl RunOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    fn check_cancelled(&self) -> Result<(), ReconError> {
        if self.is_cancelled() {
            return Err(ReconError::Cancelled);
        }
        Ok(())
    }
}

/// Reconcile one complementary group over `[start, end)`.
///
/// Configuration is captured once before any worklog is fetched; every instance
/// is fetched concurrently and all fetches complete before aggregation starts.
/// Any error aborts the run without a partial report.
pub fn reconcile<W, C>(
    worklogs: &W,
    config: &C,
    request: &ReconRequest,
    options: &RunOptions,
) -> Result<DiscrepancyReport, ReconError>
where
    W: WorklogRepository + ?Sized,
    C: ConfigRepository + ?Sized,
{
    if request.start > request.end {
        return Err(ReconError::InvalidRange {
            start: request.start,
            end: request.end,
        });
    }
    options.check_cancelled()?;

    let snapshot = ConfigSnapshot::capture(config, &request.company_id, &request.group_id)?;
    let threshold_hours = effective_threshold(options, &snapshot)?;
    let group = &snapshot.group;

    log::info!(
        "reconciling {}/{} from {} to {} across {} instances",
        request.company_id,
        request.group_id,
        request.start,
        request.end,
        group.secondary_instance_ids.len() + 1
    );

    let meta = ReportMeta {
        company_id: request.company_id.clone(),
        group_id: request.group_id.clone(),
        period_start: request.start,
        period_end: request.end,
        threshold_hours,
        algorithms: snapshot.registry.order(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let builder = DiscrepancyReportBuilder::new(group, meta)
        .with_exclusions(&snapshot.exclusions)
        .with_warnings(snapshot.warnings());

    if request.start == request.end {
        log::debug!("empty window, nothing to fetch");
        return Ok(builder.build(Vec::new()));
    }

    let fetched = fetch_all(worklogs, request, group)?;
    options.check_cancelled()?;

    let translator: &dyn KeyTranslator = match &options.translator {
        Some(t) => t.as_ref(),
        None => &snapshot.translations,
    };
    let engine = MatchingEngine::new(
        snapshot.registry.enabled_algorithms(),
        &snapshot.resolver,
        translator,
    )
    .with_team_names(&snapshot.team_names)
    .with_members(&snapshot.members);

    let mut acc = InitiativeAccumulator::new();
    let mut seen = 0usize;
    for (side, rows) in &fetched {
        for worklog in rows {
            seen += 1;
            if seen % CANCEL_CHECK_EVERY == 0 {
                options.check_cancelled()?;
            }
            acc.add(*side, worklog, engine.assign_initiative(worklog))?;
        }
    }
    options.check_cancelled()?;

    let report = builder.build(acc.into_initiatives());
    log::info!(
        "{}: {} initiatives, {} discrepancies, primary {:.2}h, secondary {:.2}h",
        request.group_id,
        report.discrepancy_groups.len(),
        report.discrepancy_count,
        report.primary_hours,
        report.secondary_hours
    );
    Ok(report)
}

/// Like [`reconcile`], but a fatal error yields an empty report whose `error`
/// object carries the error code and message.
pub fn reconcile_or_empty<W, C>(
    worklogs: &W,
    config: &C,
    request: &ReconRequest,
    options: &RunOptions,
) -> DiscrepancyReport
where
    W: WorklogRepository + ?Sized,
    C: ConfigRepository + ?Sized,
{
    match reconcile(worklogs, config, request, options) {
        Ok(report) => report,
        Err(err) => {
            log::error!("{}/{}: {err}", request.company_id, request.group_id);
            let group = config
                .complementary_groups(&request.company_id)
                .ok()
                .and_then(|groups| groups.into_iter().find(|g| g.id == request.group_id));
            let meta = ReportMeta {
                company_id: request.company_id.clone(),
                group_id: request.group_id.clone(),
                period_start: request.start,
                period_end: request.end,
                threshold_hours: options.threshold_hours.unwrap_or(0.0),
                algorithms: Vec::new(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
            };
            failed_report(group.as_ref(), meta, &err)
        }
    }
}

fn effective_threshold(options: &RunOptions, snapshot: &ConfigSnapshot) -> Result<f64, ReconError> {
    let threshold = options
        .threshold_hours
        .or(snapshot.threshold_hours)
        .unwrap_or(0.0);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ReconError::ConfigValidation(format!(
            "threshold must be >= 0 hours, got {threshold}"
        )));
    }
    Ok(threshold)
}

/// One scoped thread per instance. Results come back in group order: primary
/// first, then secondaries as configured.
fn fetch_all<W>(
    repo: &W,
    request: &ReconRequest,
    group: &ComplementaryGroup,
) -> Result<Vec<(Side, Vec<Worklog>)>, ReconError>
where
    W: WorklogRepository + ?Sized,
{
    let results: Vec<(Side, &str, Result<Vec<Worklog>, ReconError>)> = thread::scope(|s| {
        let handles: Vec<_> = group
            .instances()
            .map(|instance| {
                let side = if instance == group.primary_instance_id {
                    Side::Primary
                } else {
                    Side::Secondary
                };
                let handle = s.spawn(move || {
                    repo.get(&request.company_id, instance, request.start, request.end)
                });
                (side, instance, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(side, instance, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(ReconError::Repository {
                        instance_id: instance.to_string(),
                        message: "fetch thread panicked".into(),
                    })
                });
                (side, instance, result)
            })
            .collect()
    });

    let mut fetched = Vec::with_capacity(results.len());
    for (side, instance, result) in results {
        let mut rows = result?;
        let before = rows.len();
        rows.retain(|w| w.within(request.start, request.end));
        if rows.len() != before {
            log::warn!(
                "{instance}: dropped {} worklogs outside {}..{}",
                before - rows.len(),
                request.start,
                request.end
            );
        }
        log::debug!("{instance}: fetched {} worklogs", rows.len());
        fetched.push((side, rows));
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::model::{
        ExclusionRule, GenericIssueMapping, KeyTranslation, MatchOrigin, MatchingAlgorithm,
        SecondaryInstances,
    };
    use crate::repository::InMemoryWorklogs;
    use crate::translate::TranslationTable;

    const CONFIG: &str = r#"
[[companies.acme.groups]]
id = "ot-mmfg"
name = "OT vs MMFG"
primary = "OT"
secondaries = ["MMFG"]

[[companies.acme.groups]]
id = "ot-all"
name = "OT vs everyone"
primary = "OT"
secondaries = ["MMFG", "DL"]

[[companies.acme.algorithms]]
type = "parent_linking"
priority = 1

[[companies.acme.algorithms]]
type = "generic_issue_type"
priority = 2

[[companies.acme.exclusions]]
pattern = "ASS"
rule_type = "parent_key"
description = "Assignments"

[[companies.acme.generic_issues]]
issue_code = "DMA"
issue_type = "Incident"
team_id = "7"
"#;

    fn config() -> ReconConfig {
        ReconConfig::from_toml(CONFIG).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn january(group: &str) -> ReconRequest {
        ReconRequest::new("acme", group, date(1, 1), date(2, 1))
    }

    fn wl(instance: &str, key: &str, parent: Option<&str>, hours: i64) -> Worklog {
        Worklog {
            company_id: "acme".into(),
            instance_id: instance.into(),
            issue_key: key.into(),
            issue_type: "Task".into(),
            parent_key: parent.map(Into::into),
            author: "dev@example.com".into(),
            duration_seconds: hours * 3600,
            started_at: date(1, 15).and_hms_opt(9, 0, 0).unwrap(),
            issue_summary: None,
            parent_name: None,
        }
    }

    struct FailingRepo;

    impl WorklogRepository for FailingRepo {
        fn get(&self, _: &str, instance_id: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<Worklog>, ReconError> {
            if instance_id == "MMFG" {
                return Err(ReconError::Repository {
                    instance_id: instance_id.into(),
                    message: "timeout".into(),
                });
            }
            Ok(vec![wl(instance_id, "A-1", Some("EPIC-5"), 1)])
        }
    }

    /// Cancels the run while its fetches are in flight.
    struct CancellingRepo(CancelToken);

    impl WorklogRepository for CancellingRepo {
        fn get(&self, _: &str, instance_id: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<Worklog>, ReconError> {
            self.0.store(true, Ordering::Relaxed);
            Ok(vec![wl(instance_id, "A-1", Some("EPIC-5"), 1)])
        }
    }

    /// Ignores the requested window.
    struct SloppyRepo(Vec<Worklog>);

    impl WorklogRepository for SloppyRepo {
        fn get(&self, _: &str, instance_id: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<Worklog>, ReconError> {
            Ok(self.0.iter().filter(|w| w.instance_id == instance_id).cloned().collect())
        }
    }

    /// Serves the TOML settings but lists MMFG twice as a secondary.
    struct RepeatedSecondary(ReconConfig);

    impl ConfigRepository for RepeatedSecondary {
        fn complementary_groups(&self, company_id: &str) -> Result<Vec<ComplementaryGroup>, ReconError> {
            let mut groups = self.0.complementary_groups(company_id)?;
            for g in &mut groups {
                g.secondary_instance_ids = vec!["MMFG".into(), "MMFG".into()];
            }
            Ok(groups)
        }

        fn enabled_algorithms(&self, company_id: &str) -> Result<Vec<MatchingAlgorithm>, ReconError> {
            self.0.enabled_algorithms(company_id)
        }

        fn exclusion_rules(&self, company_id: &str) -> Result<Vec<ExclusionRule>, ReconError> {
            self.0.exclusion_rules(company_id)
        }

        fn generic_issue_mappings(&self, company_id: &str) -> Result<Vec<GenericIssueMapping>, ReconError> {
            self.0.generic_issue_mappings(company_id)
        }
    }

    #[test]
    fn matching_epic_has_no_discrepancy() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("EPIC-5"), 10),
            wl("MMFG", "B-1", Some("EPIC-5"), 10),
        ]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        assert_eq!(report.discrepancy_groups.len(), 1);
        let g = &report.discrepancy_groups[0];
        assert_eq!(g.initiative_key, "EPIC-5");
        assert_eq!(g.delta_hours, 0.0);
        assert_eq!(report.discrepancy_count, 0);
        assert_eq!(report.secondary_instance, SecondaryInstances::One("MMFG".into()));
        assert_eq!(
            report.meta.algorithms,
            vec![
                crate::model::AlgorithmType::ParentLinking,
                crate::model::AlgorithmType::GenericIssueType
            ]
        );
    }

    #[test]
    fn excluded_one_sided_group_still_counted() {
        let repo = InMemoryWorklogs::from_rows([wl("OT", "A-1", Some("ASS"), 8)]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let g = &report.discrepancy_groups[0];
        assert_eq!(g.initiative_key, "ASS");
        assert_eq!(g.delta_hours, 8.0);
        assert!(g.is_excluded);
        assert_eq!(report.discrepancy_count, 1);
    }

    #[test]
    fn equal_deltas_sorted_by_key() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("EPIC-B"), 3),
            wl("MMFG", "B-1", Some("EPIC-A"), 3),
        ]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let keys: Vec<_> = report
            .discrepancy_groups
            .iter()
            .map(|g| g.initiative_key.as_str())
            .collect();
        assert_eq!(keys, vec!["EPIC-A", "EPIC-B"]);
    }

    #[test]
    fn unmatched_sides_never_merge() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "X-1", None, 2),
            wl("MMFG", "Y-1", None, 2),
        ]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let keys: Vec<_> = report
            .discrepancy_groups
            .iter()
            .map(|g| g.initiative_key.as_str())
            .collect();
        assert_eq!(keys, vec!["UNMATCHED:MMFG", "UNMATCHED:OT"]);
        assert_eq!(report.discrepancy_count, 2);
        assert_eq!(report.delta, 0.0);
        assert_eq!(report.discrepancy_groups[0].matched_by, vec![MatchOrigin::Unmatched]);
    }

    #[test]
    fn generic_issues_aggregate_by_team() {
        let mut a = wl("OT", "DMA-1", None, 1);
        a.issue_type = "Incident".into();
        let mut b = wl("OT", "DMA-2", None, 2);
        b.issue_type = "Incident".into();
        let repo = InMemoryWorklogs::from_rows([a, b]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let g = &report.discrepancy_groups[0];
        assert_eq!(g.initiative_key, "TEAM:7");
        assert_eq!(g.primary_hours, 3.0);
        assert_eq!(g.primary_issues, vec!["DMA-1", "DMA-2"]);
    }

    #[test]
    fn multiple_secondaries_sum_on_secondary_side() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("EPIC-5"), 5),
            wl("MMFG", "B-1", Some("EPIC-5"), 2),
            wl("DL", "C-1", Some("EPIC-5"), 3),
        ]);
        let report = reconcile(&repo, &config(), &january("ot-all"), &RunOptions::default()).unwrap();
        assert_eq!(report.discrepancy_groups.len(), 1);
        assert_eq!(report.discrepancy_groups[0].secondary_hours, 5.0);
        assert_eq!(report.discrepancy_groups[0].secondary_worklogs, 2);
        assert_eq!(
            report.secondary_instance,
            SecondaryInstances::Many(vec!["MMFG".into(), "DL".into()])
        );
    }

    #[test]
    fn no_worklogs_is_empty_valid_report() {
        let report = reconcile(
            &InMemoryWorklogs::new(),
            &config(),
            &january("ot-mmfg"),
            &RunOptions::default(),
        )
        .unwrap();
        assert!(report.discrepancy_groups.is_empty());
        assert_eq!(report.discrepancy_count, 0);
        assert!(report.error.is_none());
    }

    #[test]
    fn unknown_group_is_fatal() {
        let err = reconcile(
            &InMemoryWorklogs::new(),
            &config(),
            &january("nope"),
            &RunOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());

        let report = reconcile_or_empty(
            &InMemoryWorklogs::new(),
            &config(),
            &january("nope"),
            &RunOptions::default(),
        );
        assert!(report.discrepancy_groups.is_empty());
        assert_eq!(report.error.unwrap().code, "configuration_error");
    }

    #[test]
    fn inverted_range_rejected_and_empty_range_is_empty() {
        let req = ReconRequest::new("acme", "ot-mmfg", date(2, 1), date(1, 1));
        let err = reconcile(&InMemoryWorklogs::new(), &config(), &req, &RunOptions::default()).unwrap_err();
        assert!(matches!(err, ReconError::InvalidRange { .. }));

        let repo = InMemoryWorklogs::from_rows([wl("OT", "A-1", Some("EPIC-5"), 1)]);
        let req = ReconRequest::new("acme", "ot-mmfg", date(1, 15), date(1, 15));
        let report = reconcile(&repo, &config(), &req, &RunOptions::default()).unwrap();
        assert!(report.discrepancy_groups.is_empty());
    }

    #[test]
    fn repository_failure_aborts_run() {
        let err = reconcile(&FailingRepo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap_err();
        assert_eq!(err.code(), "repository_error");

        let report = reconcile_or_empty(&FailingRepo, &config(), &january("ot-mmfg"), &RunOptions::default());
        assert!(report.discrepancy_groups.is_empty());
        assert_eq!(report.group_name, "OT vs MMFG");
        assert_eq!(report.error.unwrap().code, "repository_error");
    }

    #[test]
    fn cancellation_discards_state() {
        let token: CancelToken = Arc::new(AtomicBool::new(false));
        let options = RunOptions {
            cancel: Some(token.clone()),
            ..RunOptions::default()
        };
        let err = reconcile(&CancellingRepo(token), &config(), &january("ot-mmfg"), &options).unwrap_err();
        assert_eq!(err, ReconError::Cancelled);
    }

    #[test]
    fn rows_outside_window_are_dropped() {
        let mut late = wl("OT", "A-2", Some("EPIC-5"), 4);
        late.started_at = date(2, 1).and_hms_opt(0, 0, 0).unwrap();
        let repo = SloppyRepo(vec![wl("OT", "A-1", Some("EPIC-5"), 1), late]);
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        assert_eq!(report.primary_hours, 1.0);
    }

    #[test]
    fn threshold_override_and_translator_override() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("DLREQ-1447"), 3),
            wl("MMFG", "B-1", Some("SYS-12"), 2),
        ]);
        let table = TranslationTable::new(&[KeyTranslation {
            instance_id: "MMFG".into(),
            from: "SYS-12".into(),
            to: "DLREQ-1447".into(),
        }])
        .unwrap();
        let options = RunOptions {
            threshold_hours: Some(1.0),
            translator: Some(Arc::new(table)),
            cancel: None,
        };
        let report = reconcile(&repo, &config(), &january("ot-mmfg"), &options).unwrap();
        assert_eq!(report.discrepancy_groups.len(), 1);
        assert_eq!(report.discrepancy_groups[0].delta_hours, 1.0);
        assert_eq!(report.discrepancy_count, 0, "threshold is strict");
        assert_eq!(report.meta.threshold_hours, 1.0);
    }

    #[test]
    fn identical_inputs_identical_json() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("EPIC-5"), 3),
            wl("MMFG", "B-1", None, 1),
        ]);
        let a = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let b = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn repeated_secondary_is_rejected_not_double_counted() {
        let repo = InMemoryWorklogs::from_rows([
            wl("OT", "A-1", Some("EPIC-5"), 10),
            wl("MMFG", "B-1", Some("EPIC-5"), 10),
        ]);
        let config = RepeatedSecondary(config());
        let err = reconcile(&repo, &config, &january("ot-mmfg"), &RunOptions::default()).unwrap_err();
        assert!(err.is_configuration());

        let report = reconcile_or_empty(&repo, &config, &january("ot-mmfg"), &RunOptions::default());
        assert_eq!(report.secondary_hours, 0.0);
        assert_eq!(report.error.unwrap().code, "configuration_error");
    }

    #[test]
    fn issue_key_exclusion_follows_untranslated_issue() {
        let config = ReconConfig::from_toml(
            r#"
[[companies.acme.groups]]
id = "ot-mmfg"
name = "OT vs MMFG"
primary = "OT"
secondaries = ["MMFG"]

[[companies.acme.algorithms]]
type = "exact_key"
priority = 1

[[companies.acme.exclusions]]
pattern = "SYS-*"
rule_type = "issue_key"

[[companies.acme.key_translations]]
instance = "MMFG"
from = "SYS-12"
to = "DLREQ-1447"
"#,
        )
        .unwrap();
        let repo = InMemoryWorklogs::from_rows([
            wl("MMFG", "SYS-12", None, 2),
            wl("OT", "DLREQ-9", None, 1),
        ]);
        let report = reconcile(&repo, &config, &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let rows: Vec<_> = report
            .discrepancy_groups
            .iter()
            .map(|g| (g.initiative_key.as_str(), g.is_excluded))
            .collect();
        assert_eq!(rows, vec![("DLREQ-1447", true), ("DLREQ-9", false)]);
    }

    #[test]
    fn author_team_settles_ambiguous_generic_mapping() {
        let config = ReconConfig::from_toml(
            r#"
[companies.acme.members]
"bo@example.com" = "9"

[[companies.acme.groups]]
id = "ot-mmfg"
name = "OT vs MMFG"
primary = "OT"
secondaries = ["MMFG"]

[[companies.acme.algorithms]]
type = "generic_issue_type"
priority = 1

[[companies.acme.generic_issues]]
issue_code = "DMA"
issue_type = "Incident"
team_id = "7"

[[companies.acme.generic_issues]]
issue_code = "DMA"
issue_type = "Incident"
team_id = "9"
"#,
        )
        .unwrap();
        let mut ana = wl("OT", "DMA-1", None, 1);
        ana.issue_type = "Incident".into();
        let mut bo = wl("MMFG", "DMA-2", None, 2);
        bo.issue_type = "Incident".into();
        bo.author = "Bo@Example.com".into();
        let repo = InMemoryWorklogs::from_rows([ana, bo]);

        let report = reconcile(&repo, &config, &january("ot-mmfg"), &RunOptions::default()).unwrap();
        let rows: Vec<_> = report
            .discrepancy_groups
            .iter()
            .map(|g| (g.initiative_key.as_str(), g.primary_hours, g.secondary_hours))
            .collect();
        assert_eq!(rows, vec![("TEAM:9", 0.0, 2.0), ("TEAM:7", 1.0, 0.0)]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn overflowing_durations_abort_run() {
        let mut a = wl("OT", "A-1", Some("EPIC-5"), 0);
        a.duration_seconds = i64::MAX;
        let mut b = wl("OT", "A-2", Some("EPIC-5"), 0);
        b.duration_seconds = i64::MAX;
        let repo = SloppyRepo(vec![a, b]);
        let err = reconcile(&repo, &config(), &january("ot-mmfg"), &RunOptions::default()).unwrap_err();
        assert_eq!(err.code(), "input_error");
    }
}
