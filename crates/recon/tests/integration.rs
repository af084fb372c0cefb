use std::path::PathBuf;

use chrono::NaiveDate;
use worklink_recon::engine::{reconcile, reconcile_or_empty, ReconRequest, RunOptions};
use worklink_recon::model::{DiscrepancyReport, MatchOrigin, SecondaryInstances};
use worklink_recon::{load_csv_worklogs, InMemoryWorklogs, ReconConfig};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("acme.recon.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

fn load_worklogs(files: &[&str]) -> InMemoryWorklogs {
    let mut repo = InMemoryWorklogs::new();
    for file in files {
        let path = fixtures_dir().join(file);
        let csv_data = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        repo.extend(load_csv_worklogs(&csv_data).unwrap());
    }
    repo
}

fn january(group: &str) -> ReconRequest {
    ReconRequest::new(
        "acme",
        group,
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
    )
}

fn run(group: &str) -> DiscrepancyReport {
    let repo = load_worklogs(&["ot.csv", "mmfg.csv", "dl.csv"]);
    reconcile(&repo, &load_config(), &january(group), &RunOptions::default()).unwrap()
}

fn row<'a>(report: &'a DiscrepancyReport, key: &str) -> &'a worklink_recon::DiscrepancyGroup {
    report
        .discrepancy_groups
        .iter()
        .find(|g| g.initiative_key == key)
        .unwrap_or_else(|| panic!("no group for {key}"))
}

// -------------------------------------------------------------------------
// Single secondary
// -------------------------------------------------------------------------

#[test]
fn ot_vs_mmfg_january() {
    let report = run("ot-mmfg");

    assert_eq!(report.group_name, "OT vs MMFG");
    assert_eq!(report.primary_instance, "OT");
    assert_eq!(report.secondary_instance, SecondaryInstances::One("MMFG".into()));

    let keys: Vec<_> = report
        .discrepancy_groups
        .iter()
        .map(|g| g.initiative_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec!["ASS-1", "DLREQ-1447", "ADMIN-3", "UNMATCHED:OT", "UNMATCHED:MMFG", "TEAM:7"]
    );

    // February row is outside the window.
    assert_eq!(report.primary_hours, 23.0);
    assert_eq!(report.secondary_hours, 11.75);
    assert_eq!(report.delta, 11.25);

    // threshold 0.5 is strict: 8h, 2h and 1h deltas count.
    assert_eq!(report.discrepancy_count, 3);
    assert_eq!(report.meta.threshold_hours, 0.5);
}

#[test]
fn translated_parent_key_lines_up_with_primary_epic() {
    let report = run("ot-mmfg");
    let epic = row(&report, "DLREQ-1447");
    assert_eq!(epic.initiative_name, "Warehouse rollout");
    assert_eq!(epic.primary_hours, 12.0);
    assert_eq!(epic.secondary_hours, 10.0);
    assert_eq!(epic.delta_hours, 2.0);
    assert!((epic.delta_percentage - 100.0 * 2.0 / 12.0).abs() < 1e-9);
    assert_eq!(epic.primary_issues, vec!["SYSMMFG-5349", "SYSMMFG-5350"]);
    assert_eq!(epic.secondary_issues, vec!["MM-1"]);
    assert_eq!(epic.matched_by, vec![MatchOrigin::ParentLinking]);
    assert!(!epic.is_excluded, "disabled rule must not apply");
}

#[test]
fn generic_team_bucket_balances() {
    let report = run("ot-mmfg");
    let team = row(&report, "TEAM:7");
    assert_eq!(team.initiative_name, "Platform");
    assert_eq!(team.primary_hours, 1.5);
    assert_eq!(team.secondary_hours, 1.5);
    assert_eq!(team.delta_percentage, 0.0);
    assert_eq!(team.matched_by, vec![MatchOrigin::GenericIssueType]);
}

#[test]
fn exclusions_flag_but_keep_rows() {
    let report = run("ot-mmfg");

    let ass = row(&report, "ASS-1");
    assert!(ass.is_excluded);
    assert_eq!(ass.delta_hours, 8.0);

    let admin = row(&report, "ADMIN-3");
    assert!(admin.is_excluded);
    assert_eq!(admin.initiative_name, "Timesheets");
    assert_eq!(admin.matched_by, vec![MatchOrigin::ExactKey]);

    assert!(!row(&report, "UNMATCHED:OT").is_excluded);
}

#[test]
fn unmatched_buckets_stay_per_instance() {
    let report = run("ot-mmfg");
    let ot = row(&report, "UNMATCHED:OT");
    let mmfg = row(&report, "UNMATCHED:MMFG");
    assert_eq!(ot.initiative_name, "Unmatched worklogs (OT)");
    assert_eq!((ot.primary_hours, ot.secondary_hours), (0.5, 0.0));
    assert_eq!((mmfg.primary_hours, mmfg.secondary_hours), (0.0, 0.25));
}

// -------------------------------------------------------------------------
// Multiple secondaries
// -------------------------------------------------------------------------

#[test]
fn ot_vs_all_secondaries() {
    let report = run("ot-all");
    assert_eq!(
        report.secondary_instance,
        SecondaryInstances::Many(vec!["MMFG".into(), "DL".into()])
    );
    let epic = row(&report, "DLREQ-1447");
    assert_eq!(epic.secondary_hours, 12.0);
    assert_eq!(epic.delta_hours, 0.0);
    assert_eq!(epic.secondary_issues, vec!["DL-1", "MM-1"]);
    assert_eq!(report.secondary_hours, 13.75);
}

// -------------------------------------------------------------------------
// Failure + contract
// -------------------------------------------------------------------------

#[test]
fn unknown_group_yields_error_report() {
    let repo = load_worklogs(&["ot.csv"]);
    let report = reconcile_or_empty(&repo, &load_config(), &january("nope"), &RunOptions::default());
    assert!(report.discrepancy_groups.is_empty());
    assert_eq!(report.discrepancy_count, 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["error"]["code"], "configuration_error");
    assert_eq!(json["discrepancyGroups"], serde_json::json!([]));
}

#[test]
fn report_json_contract() {
    let report = run("ot-mmfg");
    let json = serde_json::to_value(&report).unwrap();

    for field in [
        "groupName",
        "primaryInstance",
        "secondaryInstance",
        "primaryHours",
        "secondaryHours",
        "delta",
        "discrepancyCount",
        "discrepancyGroups",
        "meta",
    ] {
        assert!(json.get(field).is_some(), "missing top-level field {field}");
    }

    let first = &json["discrepancyGroups"][0];
    for field in [
        "initiative_key",
        "initiative_name",
        "primary_hours",
        "secondary_hours",
        "delta_hours",
        "delta_percentage",
        "is_excluded",
    ] {
        assert!(first.get(field).is_some(), "missing group field {field}");
    }

    assert_eq!(json["meta"]["companyId"], "acme");
    assert_eq!(json["meta"]["periodEnd"], "2026-02-01");
    assert_eq!(
        json["meta"]["algorithms"],
        serde_json::json!(["parent_linking", "generic_issue_type", "exact_key"])
    );
    assert!(json.get("warnings").is_none());
}

#[test]
fn repeated_runs_are_byte_identical() {
    let a = serde_json::to_string_pretty(&run("ot-mmfg")).unwrap();
    let b = serde_json::to_string_pretty(&run("ot-mmfg")).unwrap();
    assert_eq!(a, b);
}
