//! `spick pick` — interactive fuzzy picker in the terminal.
//!
//! Runs the widget controller behind a ratatui frontend. The accepted
//! value is the only thing printed to stdout; everything interactive
//! stays on the alternate screen.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use sheetpick_config::WidgetSettings;

use crate::exit_codes::{EXIT_PICK_CANCELLED, EXIT_PICK_NO_TTY};
use crate::fetch;
use crate::tui;
use crate::CliError;

pub(crate) fn cmd_pick(
    settings: WidgetSettings,
    no_cache: bool,
    base_url: Option<String>,
) -> Result<(), CliError> {
    if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
        return Err(CliError {
            code: EXIT_PICK_NO_TTY,
            message: "pick needs a terminal".to_string(),
            hint: Some("use `spick search` for non-interactive queries".to_string()),
        });
    }

    let store = Arc::new(fetch::build_store(base_url.as_deref(), no_cache));

    match tui::run(settings, store).map_err(CliError::general)? {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        // Cancelled picks exit 20 with nothing on stdout so scripts can
        // tell "picked nothing" from "picked the empty string".
        None => Err(CliError::silent(EXIT_PICK_CANCELLED)),
    }
}
