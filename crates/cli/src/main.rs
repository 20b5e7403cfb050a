// SheetPick CLI - sheet-backed autocomplete, headless and interactive

mod cache;
mod config;
mod exit_codes;
mod fetch;
mod pick;
mod search;
mod serve;
mod tui;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sheetpick_config::{parse_column_ref, WidgetSettings};
use sheetpick_sheet::SheetError;

use exit_codes::{sheet_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "spick")]
#[command(about = "Autocomplete over a published Google Sheet (CLI + host bridge)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet and print the indexed column
    #[command(after_help = "\
Examples:
  spick fetch --sheet 1AbCdEf
  spick fetch --sheet 1AbCdEf --column C --max-rows 50
  spick fetch --sheet 1AbCdEf --range A1:C50 --out rows.csv
  spick fetch --sheet 1AbCdEf --json | jq length
  spick fetch --no-cache")]
    Fetch {
        /// Sheet ID (overrides the settings file)
        #[arg(long)]
        sheet: Option<String>,

        /// Column to project: 0-based number or letter (0, 2, C, AA)
        #[arg(long)]
        column: Option<String>,

        /// A1 range restriction (e.g. A1:C50)
        #[arg(long)]
        range: Option<String>,

        /// Cap on data rows, header excluded
        #[arg(long)]
        max_rows: Option<u32>,

        /// Write full rows as CSV to this file instead of printing the column
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Output the column as JSON
        #[arg(long)]
        json: bool,

        /// Bypass the disk cache
        #[arg(long)]
        no_cache: bool,

        /// Export endpoint override
        #[arg(long, env = "SPICK_BASE_URL")]
        base_url: Option<String>,

        /// Settings file (default: user config dir)
        #[arg(long)]
        settings_file: Option<PathBuf>,
    },

    /// One-shot fuzzy search against the sheet or a local CSV
    #[command(after_help = "\
Examples:
  spick search ali --sheet 1AbCdEf
  spick search ali --from-csv names.csv
  spick search ali --sheet 1AbCdEf --threshold 0.5 --max 10
  spick search ali --from-csv names.csv --json | jq '.[0].segments'

Exit codes:
  0  Matches found
  1  No matches
  2  Usage error")]
    Search {
        /// Query text
        query: String,

        /// Sheet ID (overrides the settings file)
        #[arg(long)]
        sheet: Option<String>,

        /// Column to search: 0-based number or letter
        #[arg(long)]
        column: Option<String>,

        /// A1 range restriction
        #[arg(long)]
        range: Option<String>,

        /// Search a local CSV instead of fetching (offline)
        #[arg(long, value_name = "PATH")]
        from_csv: Option<PathBuf>,

        /// Match strictness: 0 = contiguous prefix only, 1 = any subsequence
        #[arg(long)]
        threshold: Option<f32>,

        /// Positional slack tolerated by the matcher, in characters
        #[arg(long)]
        distance: Option<u32>,

        /// Result cap (presentation only; the index is never truncated)
        #[arg(long)]
        max: Option<u32>,

        /// Minimum query length before anything matches
        #[arg(long)]
        min_chars: Option<u32>,

        /// Cap on data rows, header excluded
        #[arg(long)]
        max_rows: Option<u32>,

        /// Output results as JSON with highlight segments
        #[arg(long)]
        json: bool,

        /// Bypass the disk cache
        #[arg(long)]
        no_cache: bool,

        /// Export endpoint override
        #[arg(long, env = "SPICK_BASE_URL")]
        base_url: Option<String>,

        /// Settings file (default: user config dir)
        #[arg(long)]
        settings_file: Option<PathBuf>,
    },

    /// Interactive picker; prints the accepted value to stdout
    #[command(after_help = "\
Examples:
  spick pick --sheet 1AbCdEf
  city=$(spick pick --sheet 1AbCdEf --column C)

Exit codes:
  0   Value accepted
  20  Cancelled (Esc, Ctrl-C)
  21  Not a terminal")]
    Pick {
        /// Sheet ID (overrides the settings file)
        #[arg(long)]
        sheet: Option<String>,

        /// Column to search: 0-based number or letter
        #[arg(long)]
        column: Option<String>,

        /// Match strictness: 0 = contiguous prefix only, 1 = any subsequence
        #[arg(long)]
        threshold: Option<f32>,

        /// Positional slack tolerated by the matcher, in characters
        #[arg(long)]
        distance: Option<u32>,

        /// Suggestion rows shown at once
        #[arg(long)]
        max: Option<u32>,

        /// Minimum query length before suggestions appear
        #[arg(long)]
        min_chars: Option<u32>,

        /// Cap on data rows, header excluded
        #[arg(long)]
        max_rows: Option<u32>,

        /// Bypass the disk cache
        #[arg(long)]
        no_cache: bool,

        /// Export endpoint override
        #[arg(long, env = "SPICK_BASE_URL")]
        base_url: Option<String>,

        /// Settings file (default: user config dir)
        #[arg(long)]
        settings_file: Option<PathBuf>,
    },

    /// Speak the JSONL widget protocol over stdin/stdout
    #[command(after_help = "\
The host opens with `hello` carrying raw settings, then streams input
events. The bridge answers with `ready`, then `send_value`, `render`,
`request_resize`, and `notice` messages, one JSON object per line.
`shutdown` or EOF ends the session.

Examples:
  spick serve
  spick serve --settings-file ./widget.json")]
    Serve {
        /// Settings file layered under host-provided values
        #[arg(long)]
        settings_file: Option<PathBuf>,
    },

    /// Inspect or clear the on-disk sheet cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Manage the settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum CacheCommands {
    /// List cached sheets with row counts and ages
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every cached sheet
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a commented settings template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings file location
    Path,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nprotocol: v1",
            "\nbuild:    debug",
            "\ntarget:   ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nprotocol: v1",
            "\nbuild:    release",
            "\ntarget:   ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: spick <command> [options]");
            eprintln!("       spick --help for more information");
            Ok(())
        }
        Some(Commands::Fetch {
            sheet,
            column,
            range,
            max_rows,
            out,
            json,
            no_cache,
            base_url,
            settings_file,
        }) => {
            let settings = resolve_settings(
                settings_file.as_deref(),
                sheet,
                column,
                None,
                None,
                None,
                None,
                max_rows,
            );
            settings.and_then(|s| fetch::cmd_fetch(&s, range, out, json, no_cache, base_url))
        }
        Some(Commands::Search {
            query,
            sheet,
            column,
            range,
            from_csv,
            threshold,
            distance,
            max,
            min_chars,
            max_rows,
            json,
            no_cache,
            base_url,
            settings_file,
        }) => {
            let settings = resolve_settings(
                settings_file.as_deref(),
                sheet,
                column,
                threshold,
                distance,
                max,
                min_chars,
                max_rows,
            );
            settings.and_then(|s| {
                search::cmd_search(&query, &s, range, from_csv, json, no_cache, base_url)
            })
        }
        Some(Commands::Pick {
            sheet,
            column,
            threshold,
            distance,
            max,
            min_chars,
            max_rows,
            no_cache,
            base_url,
            settings_file,
        }) => {
            let settings = resolve_settings(
                settings_file.as_deref(),
                sheet,
                column,
                threshold,
                distance,
                max,
                min_chars,
                max_rows,
            );
            settings.and_then(|s| pick::cmd_pick(s, no_cache, base_url))
        }
        Some(Commands::Serve { settings_file }) => serve::cmd_serve(settings_file),
        Some(Commands::Cache(cache_cmd)) => match cache_cmd {
            CacheCommands::Status { json } => cache::cmd_status(json),
            CacheCommands::Clear => cache::cmd_clear(),
        },
        Some(Commands::Config(config_cmd)) => match config_cmd {
            ConfigCommands::Init { force } => config::cmd_init(force),
            ConfigCommands::Path => config::cmd_path(),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Settings layering: built-in defaults, then the settings file, then flags.
#[allow(clippy::too_many_arguments)]
fn resolve_settings(
    settings_file: Option<&Path>,
    sheet: Option<String>,
    column: Option<String>,
    threshold: Option<f32>,
    distance: Option<u32>,
    max: Option<u32>,
    min_chars: Option<u32>,
    max_rows: Option<u32>,
) -> Result<WidgetSettings, CliError> {
    let mut settings = match settings_file {
        Some(path) => WidgetSettings::load_from(path),
        None => WidgetSettings::load(),
    };

    if let Some(sheet) = sheet {
        settings.sheet_id = sheet;
    }
    if let Some(column) = column {
        settings.column_index = parse_column_ref(&column)
            .map_err(|e| CliError::usage(format!("--column {:?}: {}", column, e)))?;
    }
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::usage(format!(
                "--threshold {} is outside 0..=1",
                threshold
            )));
        }
        settings.threshold = threshold;
    }
    if let Some(distance) = distance {
        settings.distance = distance;
    }
    if let Some(max) = max {
        settings.max_results = max;
    }
    if let Some(min_chars) = min_chars {
        settings.min_char_required = min_chars;
    }
    if let Some(max_rows) = max_rows {
        settings.max_rows = max_rows;
    }

    Ok(settings)
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// An exit code with no message; the condition was already reported
    /// (or is the whole point, like a cancelled pick).
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    /// Create error from data source error with proper exit code.
    pub fn sheet(err: SheetError) -> Self {
        let code = sheet_exit_code(&err);
        let hint = match &err {
            SheetError::InvalidSheetId(_) => {
                Some("pass --sheet, or set googleSheetId via `spick config init`".to_string())
            }
            SheetError::Fetch(_) => {
                Some("is the sheet published and shared as \"anyone with the link\"?".to_string())
            }
            SheetError::EmptyDataset => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
