//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified, cancelled run)                |
//! | 2    | CLI usage error (bad args, bad threshold)                 |
//! | 3    | Discrepancies above threshold (`--fail-on-discrepancy`)   |
//! | 4    | Configuration error (bad TOML, unknown group, bad range)  |
//! | 5    | Input error (unreadable file, malformed worklog CSV)      |
//! | 6    | Worklog repository error                                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (3-6)
// =============================================================================

/// At least one initiative differs by more than the threshold and
/// `--fail-on-discrepancy` was given. Excluded initiatives count too.
pub const EXIT_RECON_DISCREPANCIES: u8 = 3;

/// Config failed to parse or validate, the group is unknown, or the date
/// range is inverted.
pub const EXIT_RECON_CONFIG: u8 = 4;

/// Config or worklog file unreadable, or a worklog CSV is malformed.
pub const EXIT_RECON_INPUT: u8 = 5;

/// The worklog repository failed to deliver rows for an instance.
pub const EXIT_RECON_REPOSITORY: u8 = 6;

/// Map an engine error code (`ReconError::code()`) to an exit code.
pub fn recon_exit_code(error_code: &str) -> u8 {
    match error_code {
        "configuration_error" => EXIT_RECON_CONFIG,
        "input_error" => EXIT_RECON_INPUT,
        "repository_error" => EXIT_RECON_REPOSITORY,
        _ => EXIT_ERROR,
    }
}
