use std::collections::HashSet;

use crate::error::ReconError;
use crate::model::{AlgorithmConfig, AlgorithmType, MatchingAlgorithm};

/// Enabled matching algorithms for one company, sorted once per run.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    algorithms: Vec<MatchingAlgorithm>,
}

impl AlgorithmRegistry {
    /// Validate the company's rows and keep the enabled ones ordered by ascending
    /// priority. Ties fall back to the algorithm type name so the order is stable.
    /// Rows of other companies are ignored.
    pub fn new(company_id: &str, rows: Vec<MatchingAlgorithm>) -> Result<Self, ReconError> {
        let rows: Vec<MatchingAlgorithm> = rows
            .into_iter()
            .filter(|a| a.company_id == company_id)
            .collect();

        let mut seen: HashSet<AlgorithmType> = HashSet::new();
        for row in &rows {
            if !seen.insert(row.algorithm_type()) {
                return Err(ReconError::DuplicateAlgorithm {
                    company_id: company_id.to_string(),
                    algorithm: row.algorithm_type(),
                });
            }
            validate_algorithm_config(&row.config)?;
        }

        let mut algorithms: Vec<MatchingAlgorithm> = rows
            .into_iter()
            .filter(|a| a.enabled)
            .collect();
        algorithms.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.algorithm_type().as_str().cmp(b.algorithm_type().as_str()))
        });

        Ok(Self { algorithms })
    }

    pub fn enabled_algorithms(&self) -> &[MatchingAlgorithm] {
        &self.algorithms
    }

    pub fn order(&self) -> Vec<AlgorithmType> {
        self.algorithms.iter().map(|a| a.algorithm_type()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

pub fn validate_algorithm_config(config: &AlgorithmConfig) -> Result<(), ReconError> {
    match config {
        AlgorithmConfig::GenericIssueType(c) => {
            let prefix = c.key_prefix.trim();
            if prefix.is_empty() || prefix.contains(':') {
                return Err(ReconError::InvalidAlgorithmConfig {
                    algorithm: AlgorithmType::GenericIssueType,
                    reason: format!("key_prefix must be non-empty and contain no ':', got '{}'", c.key_prefix),
                });
            }
            if prefix == "UNMATCHED" {
                return Err(ReconError::InvalidAlgorithmConfig {
                    algorithm: AlgorithmType::GenericIssueType,
                    reason: "key_prefix 'UNMATCHED' is reserved".into(),
                });
            }
            Ok(())
        }
        AlgorithmConfig::ParentLinking(_) | AlgorithmConfig::ExactKey(_) => Ok(()),
    }
}
