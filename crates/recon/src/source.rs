//! Worklog CSV exports -> [`Worklog`] rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::ReconError;
use crate::model::Worklog;

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, or a bare date.
pub fn parse_started_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a worklog export with a header row. Optional columns: `parent_key`,
/// `issue_summary`, `parent_name`; empty cells in them read as absent.
pub fn load_csv_worklogs(csv_data: &str) -> Result<Vec<Worklog>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let idx = |name: &str| -> Result<usize, ReconError> {
        position(name).ok_or_else(|| ReconError::MissingColumn {
            column: name.into(),
        })
    };

    let company_idx = idx("company_id")?;
    let instance_idx = idx("instance_id")?;
    let issue_key_idx = idx("issue_key")?;
    let issue_type_idx = idx("issue_type")?;
    let author_idx = idx("author")?;
    let duration_idx = idx("duration_seconds")?;
    let started_idx = idx("started_at")?;

    let parent_key_idx = position("parent_key");
    let summary_idx = position("issue_summary");
    let parent_name_idx = position("parent_name");

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let optional = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let duration_str = field(duration_idx);
        let duration_seconds = match duration_str.parse::<i64>() {
            Ok(d) if d > 0 => d,
            _ => {
                return Err(ReconError::DurationParse {
                    line,
                    value: duration_str,
                })
            }
        };

        let started_str = field(started_idx);
        let started_at = parse_started_at(&started_str).ok_or_else(|| ReconError::DateParse {
            line,
            value: started_str.clone(),
        })?;

        rows.push(Worklog {
            company_id: field(company_idx),
            instance_id: field(instance_idx),
            issue_key: field(issue_key_idx),
            issue_type: field(issue_type_idx),
            parent_key: optional(parent_key_idx),
            author: field(author_idx),
            duration_seconds,
            started_at,
            issue_summary: optional(summary_idx),
            parent_name: optional(parent_name_idx),
        });
    }

    Ok(rows)
}
