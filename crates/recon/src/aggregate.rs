use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::model::{Assignment, Initiative, MatchOrigin, Worklog};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Floor for the percentage denominator when both sides are zero.
pub const DELTA_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Primary,
    Secondary,
}

pub fn seconds_to_hours(seconds: i64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

/// `delta / max(primary, secondary, ε) * 100`. Zero when both sides are zero.
pub fn delta_percentage(primary_hours: f64, secondary_hours: f64) -> f64 {
    let delta = primary_hours - secondary_hours;
    if delta == 0.0 {
        return 0.0;
    }
    delta / primary_hours.max(secondary_hours).max(DELTA_EPSILON) * 100.0
}

/// Group assigned worklogs by initiative key. Durations are summed in whole
/// seconds so per-key totals add up exactly to the fetched totals.
#[derive(Debug, Default)]
pub struct InitiativeAccumulator {
    initiatives: BTreeMap<String, Initiative>,
    primary_seconds: i64,
    secondary_seconds: i64,
}

impl InitiativeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations must be non-negative and the per-side totals must fit in `i64`.
    /// Every per-initiative sum is bounded by its side total.
    pub fn add(&mut self, side: Side, worklog: &Worklog, assignment: Assignment) -> Result<(), ReconError> {
        let invalid = |reason: &str| ReconError::InvalidDuration {
            instance_id: worklog.instance_id.clone(),
            issue_key: worklog.issue_key.clone(),
            reason: reason.to_string(),
        };

        let secs = worklog.duration_seconds;
        if secs < 0 {
            return Err(invalid(&format!("negative duration {secs}s")));
        }
        let side_total = match side {
            Side::Primary => self.primary_seconds,
            Side::Secondary => self.secondary_seconds,
        }
        .checked_add(secs)
        .ok_or_else(|| invalid("duration total overflows"))?;

        let Assignment {
            initiative_key,
            display_name,
            origin,
        } = assignment;

        let entry = self
            .initiatives
            .entry(initiative_key)
            .or_insert_with_key(|key| Initiative {
                key: key.clone(),
                ..Initiative::default()
            });

        // First non-empty name in fetch order.
        if entry.name.is_empty() && !display_name.trim().is_empty() {
            entry.name = display_name;
        }
        if origin == MatchOrigin::ExactKey {
            entry.exact_issues.insert(worklog.issue_key.trim().to_string());
        }
        entry.origins.insert(origin);

        match side {
            Side::Primary => {
                entry.primary_seconds += secs;
                entry.primary_worklogs += 1;
                entry.primary_issues.insert(worklog.issue_key.clone());
                self.primary_seconds = side_total;
            }
            Side::Secondary => {
                entry.secondary_seconds += secs;
                entry.secondary_worklogs += 1;
                entry.secondary_issues.insert(worklog.issue_key.clone());
                self.secondary_seconds = side_total;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.initiatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initiatives.is_empty()
    }

    /// Seconds fetched per side, independent of grouping.
    pub fn fetched_seconds(&self) -> (i64, i64) {
        (self.primary_seconds, self.secondary_seconds)
    }

    /// Initiatives in key order.
    pub fn into_initiatives(self) -> Vec<Initiative> {
        self.initiatives
            .into_values()
            .map(|mut i| {
                if i.name.is_empty() {
                    i.name = i.key.clone();
                }
                i
            })
            .collect()
    }
}
