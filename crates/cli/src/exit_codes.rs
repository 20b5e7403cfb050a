//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error / no matches               |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 10-19   | fetch            | Sheet data source codes                  |
//! | 20-29   | pick             | Interactive picker codes                 |
//! | 30-39   | serve            | Host bridge codes                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sheetpick_sheet::SheetError;

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

/// Search found nothing.
/// Like `grep(1)`, exit 1 means "no matches."
pub const EXIT_SEARCH_NO_MATCH: u8 = 1;

// =============================================================================
// Fetch (10-19) — sheet data source
// =============================================================================

/// No usable sheet ID (not configured, or rejected before the request).
pub const EXIT_FETCH_CONFIG: u8 = 10;

/// Upstream failure: network error, HTTP error after retries, or an HTML
/// sign-in page where CSV was expected.
pub const EXIT_FETCH_UPSTREAM: u8 = 11;

/// Fetch succeeded but the projected column had zero usable values.
pub const EXIT_FETCH_EMPTY: u8 = 12;

// =============================================================================
// Pick (20-29) — interactive picker
// =============================================================================

/// The picker was dismissed without accepting a value (Esc, Ctrl-C).
pub const EXIT_PICK_CANCELLED: u8 = 20;

/// stdin/stdout is not a terminal; the picker cannot run.
pub const EXIT_PICK_NO_TTY: u8 = 21;

// =============================================================================
// Serve (30-39) — host bridge
// =============================================================================

/// Handshake failed: the host speaks a newer protocol version.
pub const EXIT_SERVE_PROTOCOL: u8 = 30;

/// stdout write failure while emitting protocol messages.
pub const EXIT_SERVE_IO: u8 = 31;

/// Map a SheetError to its exit code.
pub fn sheet_exit_code(err: &SheetError) -> u8 {
    match err {
        SheetError::InvalidSheetId(_) => EXIT_FETCH_CONFIG,
        SheetError::Fetch(_) => EXIT_FETCH_UPSTREAM,
        SheetError::EmptyDataset => EXIT_FETCH_EMPTY,
    }
}
