//! `worklink-recon`: cross-instance worklog reconciliation engine.
//!
//! Pure engine crate: reads worklogs and settings through repository traits,
//! assigns every worklog to an initiative, and returns a discrepancy report
//! comparing a primary tracker instance against its complementary instances.
//! No CLI dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod generic;
pub mod matcher;
pub mod model;
pub mod registry;
pub mod report;
pub mod repository;
pub mod snapshot;
pub mod source;
pub mod translate;

pub use config::ReconConfig;
pub use engine::{reconcile, reconcile_or_empty, CancelToken, ReconRequest, RunOptions};
pub use error::{ConfigWarning, ReconError};
pub use matcher::MatchingEngine;
pub use model::{DiscrepancyGroup, DiscrepancyReport, Worklog};
pub use repository::{ConfigRepository, InMemoryWorklogs, WorklogRepository};
pub use source::load_csv_worklogs;
pub use translate::{KeyTranslator, LiteralKeys, TranslationTable};
