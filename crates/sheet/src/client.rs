// HTTP client for the Google Sheets CSV export endpoint

use std::thread;
use std::time::Duration;

use url::Url;

use crate::{parse, SheetError, SheetKey, SheetRow};

const DEFAULT_BASE_URL: &str = "https://docs.google.com";
const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("spick/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client with retry, backoff, and error classification.
///
/// The export endpoint is `{base}/spreadsheets/d/{id}/gviz/tq?tqx=out:csv`,
/// plus `&range=` when the key carries one. The base URL is injectable so
/// tests can point at a local mock server.
pub struct SheetClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl SheetClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");

        Self { http, base_url: base_url.into() }
    }

    /// Fetch and parse the export, keeping at most `max_rows` data rows.
    pub fn fetch_rows(&self, key: &SheetKey, max_rows: u32) -> Result<Vec<SheetRow>, SheetError> {
        let text = self.fetch_csv(key)?;
        parse::parse_rows(&text, max_rows).map_err(SheetError::Fetch)
    }

    /// Fetch the raw CSV export text.
    pub fn fetch_csv(&self, key: &SheetKey) -> Result<String, SheetError> {
        let url = self.export_url(key)?;
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            let result = self.http.get(url.clone()).send();

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Access problems: fail immediately, retrying cannot help
                    if status == 401 || status == 403 {
                        return Err(SheetError::Fetch(format!(
                            "access denied ({}): is the sheet shared publicly?",
                            status,
                        )));
                    }

                    // Other 4xx (not 429): fail immediately
                    if status >= 400 && status < 500 && status != 429 {
                        return Err(SheetError::Fetch(format!(
                            "sheet not found ({}): check the sheet id",
                            status,
                        )));
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            return Err(SheetError::Fetch(format!(
                                "upstream error after {} attempts ({})",
                                MAX_RETRIES, status,
                            )));
                        }

                        // Respect Retry-After header for 429
                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    // An unshared or missing sheet can come back as an HTML
                    // page behind redirects with status 200.
                    let content_type = resp
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    if content_type.contains("text/html") {
                        return Err(SheetError::Fetch(
                            "got an HTML page instead of CSV: is the sheet shared publicly?"
                                .to_string(),
                        ));
                    }

                    let text = resp
                        .text()
                        .map_err(|e| SheetError::Fetch(format!("failed to read body: {}", e)))?;
                    // Strip a UTF-8 BOM if the export carries one
                    return Ok(text.trim_start_matches('\u{feff}').to_string());
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(SheetError::Fetch(format!(
                            "network error after {} attempts: {}",
                            MAX_RETRIES, e,
                        )));
                    }

                    eprintln!(
                        "warning: retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        unreachable!()
    }

    fn export_url(&self, key: &SheetKey) -> Result<Url, SheetError> {
        validate_sheet_id(&key.sheet_id)?;

        let mut raw = format!(
            "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv",
            self.base_url.trim_end_matches('/'),
            key.sheet_id,
        );
        if let Some(range) = &key.range {
            let encoded: String = url::form_urlencoded::byte_serialize(range.as_bytes()).collect();
            raw.push_str("&range=");
            raw.push_str(&encoded);
        }

        Url::parse(&raw).map_err(|e| SheetError::Fetch(format!("bad endpoint url: {}", e)))
    }
}

impl Default for SheetClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Google sheet IDs are URL-safe tokens; anything else is a configuration
/// mistake worth naming before a request goes out.
fn validate_sheet_id(sheet_id: &str) -> Result<(), SheetError> {
    if sheet_id.is_empty() {
        return Err(SheetError::InvalidSheetId(sheet_id.to_string()));
    }
    if !sheet_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SheetError::InvalidSheetId(sheet_id.to_string()));
    }
    Ok(())
}
