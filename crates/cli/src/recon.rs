//! `wlk recon`: reconcile worklogs of a complementary group.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use worklink_recon::engine::{reconcile_or_empty, ReconRequest, RunOptions};
use worklink_recon::generic::GenericIssueResolver;
use worklink_recon::registry::AlgorithmRegistry;
use worklink_recon::{
    load_csv_worklogs, ConfigRepository, DiscrepancyReport, InMemoryWorklogs, ReconConfig,
    ReconError,
};

use crate::exit_codes::{
    recon_exit_code, EXIT_ERROR, EXIT_RECON_CONFIG, EXIT_RECON_DISCREPANCIES, EXIT_RECON_INPUT,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile one group over a date range
    #[command(after_help = "\
Examples:
  wlk recon run acme.recon.toml --company acme --group ot-mmfg \\
      --from 2026-01-01 --to 2026-02-01 --worklogs ot.csv mmfg.csv
  wlk recon run acme.recon.toml --company acme --group ot-mmfg \\
      --from 2026-01-01 --to 2026-02-01 --worklogs all.csv --json
  wlk recon run acme.recon.toml --company acme --group ot-mmfg \\
      --from 2026-01-01 --to 2026-02-01 --worklogs all.csv --fail-on-discrepancy

The range is half-open: --to is the first day NOT included.")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Company whose settings and worklogs are used
        #[arg(long)]
        company: String,

        /// Complementary group id
        #[arg(long)]
        group: String,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Day after the last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Worklog CSV exports (any mix of instances)
        #[arg(long, required = true, num_args = 1..)]
        worklogs: Vec<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Hours a delta must exceed to count as a discrepancy (overrides config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit 3 when any initiative exceeds the threshold
        #[arg(long)]
        fail_on_discrepancy: bool,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  wlk recon validate acme.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },

    /// List a company's groups and its effective algorithm order
    #[command(after_help = "\
Examples:
  wlk recon groups acme.recon.toml --company acme
  wlk recon groups acme.recon.toml --company acme --json")]
    Groups {
        /// Path to the .recon.toml config file
        config: PathBuf,

        #[arg(long)]
        company: String,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_recon(cmd: ReconCommands, quiet: bool) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            config,
            company,
            group,
            from,
            to,
            worklogs,
            json,
            output,
            threshold,
            fail_on_discrepancy,
        } => {
            let request = ReconRequest::new(company, group, from, to);
            cmd_recon_run(config, request, worklogs, json, output, threshold, fail_on_discrepancy, quiet)
        }
        ReconCommands::Validate { config } => cmd_recon_validate(config, quiet),
        ReconCommands::Groups { config, company, json } => cmd_recon_groups(config, company, json),
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: ReconError) -> CliError {
    recon_err(recon_exit_code(err.code()), err.to_string())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("cannot read config: {e}")))?;
    ReconConfig::from_toml(&config_str).map_err(engine_err)
}

#[allow(clippy::too_many_arguments)]
fn cmd_recon_run(
    config_path: PathBuf,
    request: ReconRequest,
    worklog_paths: Vec<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
    threshold: Option<f64>,
    fail_on_discrepancy: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if let Some(t) = threshold {
        if !t.is_finite() || t < 0.0 {
            return Err(CliError::args(format!("--threshold must be >= 0, got {t}")));
        }
    }

    let config = load_config(&config_path)?;
    if config.company(&request.company_id).is_none() {
        let known: Vec<&str> = config.companies.keys().map(String::as_str).collect();
        return Err(recon_err(
            EXIT_RECON_CONFIG,
            format!("unknown company '{}'", request.company_id),
        )
        .with_hint(format!("companies in config: {}", known.join(", "))));
    }

    let mut worklogs = InMemoryWorklogs::new();
    for path in &worklog_paths {
        let csv_data = std::fs::read_to_string(path).map_err(|e| {
            recon_err(EXIT_RECON_INPUT, format!("cannot read {}: {e}", path.display()))
        })?;
        let rows = load_csv_worklogs(&csv_data)
            .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("{}: {e}", path.display())))?;
        log::debug!("{}: {} worklogs", path.display(), rows.len());
        worklogs.extend(rows);
    }

    let options = RunOptions {
        threshold_hours: threshold,
        ..RunOptions::default()
    };
    let report = reconcile_or_empty(&worklogs, &config, &request, &options);

    // Output
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("cannot write output: {e}")))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        println!("{json_str}");
    }

    if let Some(ref error) = report.error {
        return Err(recon_err(recon_exit_code(&error.code), error.message.clone()));
    }

    if !quiet {
        print_summary(&report);
    }

    if fail_on_discrepancy && report.discrepancy_count > 0 {
        return Err(recon_err(
            EXIT_RECON_DISCREPANCIES,
            format!(
                "{} initiatives differ by more than {}h",
                report.discrepancy_count, report.meta.threshold_hours
            ),
        ));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(report: &DiscrepancyReport) {
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }

    eprintln!(
        "{}: {} initiatives, {} above {:.2}h; primary {:.2}h, secondary {:.2}h, delta {:+.2}h",
        report.group_name,
        report.discrepancy_groups.len(),
        report.discrepancy_count,
        report.meta.threshold_hours,
        report.primary_hours,
        report.secondary_hours,
        report.delta,
    );

    let threshold = report.meta.threshold_hours;
    for g in report
        .discrepancy_groups
        .iter()
        .filter(|g| g.delta_hours.abs() > threshold)
    {
        eprintln!(
            "  {:<24} {:>+9.2}h  {}{}",
            g.initiative_key,
            g.delta_hours,
            g.initiative_name,
            if g.is_excluded { "  (expected)" } else { "" }
        );
    }
}

fn cmd_recon_validate(config_path: PathBuf, quiet: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    for (company_id, company) in &config.companies {
        let mappings = config
            .generic_issue_mappings(company_id)
            .map_err(engine_err)?;
        let resolver = GenericIssueResolver::new(company_id, &mappings);
        for warning in resolver.warnings() {
            eprintln!("warning: {company_id}: {warning}");
        }

        if !quiet {
            eprintln!(
                "{company_id}: {} groups, {} algorithms, {} exclusion rules, {} generic mappings, {} key translations, {} members",
                company.groups.len(),
                company.algorithms.len(),
                company.exclusions.len(),
                company.generic_issues.len(),
                company.key_translations.len(),
                company.members.len(),
            );
        }
    }

    if !quiet {
        eprintln!("config is valid");
    }
    Ok(())
}

fn cmd_recon_groups(config_path: PathBuf, company_id: String, json_output: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let company = config.company(&company_id).ok_or_else(|| {
        recon_err(EXIT_RECON_CONFIG, format!("unknown company '{company_id}'"))
    })?;

    let algorithms = config.enabled_algorithms(&company_id).map_err(engine_err)?;
    let registry = AlgorithmRegistry::new(&company_id, algorithms).map_err(engine_err)?;
    let order: Vec<&str> = registry.order().iter().map(|a| a.as_str()).collect();

    if json_output {
        let groups: Vec<serde_json::Value> = company
            .groups
            .iter()
            .map(|g| {
                serde_json::json!({
                    "id": g.id,
                    "name": g.name,
                    "primary": g.primary_instance_id,
                    "secondaries": g.secondary_instance_ids,
                })
            })
            .collect();
        let value = serde_json::json!({
            "company": company_id,
            "groups": groups,
            "algorithms": order,
        });
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for g in &company.groups {
        println!(
            "{}\t{}\t{} -> {}",
            g.id,
            g.name,
            g.primary_instance_id,
            g.secondary_instance_ids.join(", ")
        );
    }
    println!(
        "algorithms: {}",
        if order.is_empty() { "(none, every worklog is unmatched)".to_string() } else { order.join(" > ") }
    );
    Ok(())
}
