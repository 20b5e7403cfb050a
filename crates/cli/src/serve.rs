//! `spick serve` — the host bridge: JSON lines over stdin/stdout.
//!
//! One message per line. The host opens with `hello`, the widget answers
//! `ready`, then input/key/click/blur/submit flow in while send_value,
//! render, request_resize, and notice flow out. `shutdown` or EOF ends
//! the session cleanly.
//!
//! Stdin is read on its own thread; sheet loads run on their own threads.
//! Everything rejoins a single mpsc channel, so the controller itself
//! stays single-threaded.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sheetpick_config::WidgetSettings;
use sheetpick_protocol::{
    ErrorMessage, HelloMessage, HostMessage, NoticeKind, NoticeMessage, ReadyMessage,
    WidgetMessage, PROTOCOL_VERSION,
};
use sheetpick_sheet::{SheetError, SheetStore};
use sheetpick_widget::{AutocompleteController, HostPort, LoadRequest};

use crate::exit_codes::{EXIT_SERVE_IO, EXIT_SERVE_PROTOCOL};
use crate::fetch;
use crate::CliError;

/// How long the event loop waits for a message before giving the
/// controller a poll tick (debounce and blur timers run off these).
const POLL_INTERVAL: Duration = Duration::from_millis(25);

enum Event {
    Line(String),
    Eof,
    Fetch { generation: u64, result: Result<Vec<String>, SheetError> },
}

// ── Stdout port ─────────────────────────────────────────────────────

/// Writes each widget message as one JSON line on stdout.
///
/// A write failure is remembered instead of panicking mid-emit; the
/// event loop checks once per iteration and exits with the IO code.
struct StdoutPort {
    error: Option<io::Error>,
}

impl StdoutPort {
    fn new() -> Self {
        Self { error: None }
    }
}

impl HostPort for StdoutPort {
    fn emit(&mut self, message: WidgetMessage) {
        if self.error.is_some() {
            return;
        }
        let line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                self.error = Some(io::Error::new(io::ErrorKind::InvalidData, e));
                return;
            }
        };
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            self.error = Some(e);
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────

pub(crate) fn cmd_serve(settings_file: Option<PathBuf>) -> Result<(), CliError> {
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());

    let mut port = StdoutPort::new();

    let hello = match read_hello(&rx, &mut port) {
        Some(hello) => hello,
        None => return Ok(()),
    };

    if hello.protocol_version > PROTOCOL_VERSION {
        port.emit(WidgetMessage::Error(ErrorMessage {
            id: Some(hello.id),
            code: "protocol_mismatch".to_string(),
            message: format!(
                "host speaks protocol v{}, this build speaks v{}",
                hello.protocol_version, PROTOCOL_VERSION,
            ),
        }));
        return Err(CliError {
            code: EXIT_SERVE_PROTOCOL,
            message: format!("unsupported protocol version {}", hello.protocol_version),
            hint: None,
        });
    }

    // File settings first, then the hello's overrides on top. Values the
    // host sends that fail to parse fall back to the file/default layer
    // and are reported as notices, never as fatal errors.
    let mut settings = match settings_file {
        Some(path) => WidgetSettings::load_from(&path),
        None => WidgetSettings::load(),
    };
    let overrides: HashMap<String, String> = hello.settings.into_iter().collect();
    let warnings = settings.apply_source(&overrides);

    port.emit(WidgetMessage::Ready(ReadyMessage {
        id: hello.id,
        protocol_version: PROTOCOL_VERSION,
        placeholder: settings.placeholder_text.clone(),
        input_width: settings.input_width.clone(),
        autocomplete_width: settings.autocomplete_width.clone(),
    }));
    for warning in &warnings {
        port.emit(WidgetMessage::Notice(NoticeMessage {
            kind: NoticeKind::SettingIgnored,
            message: warning.to_string(),
        }));
    }

    let store = Arc::new(fetch::build_store(None, false));
    let mut controller = AutocompleteController::new(settings);
    controller.start(&mut port);

    loop {
        if let Some(err) = port.error.take() {
            return Err(CliError {
                code: EXIT_SERVE_IO,
                message: format!("stdout: {}", err),
                hint: None,
            });
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Event::Line(line)) => {
                let message: HostMessage = match serde_json::from_str(&line) {
                    Ok(message) => message,
                    Err(e) => {
                        port.emit(malformed(e));
                        continue;
                    }
                };
                match message {
                    HostMessage::Hello(_) => {
                        port.emit(WidgetMessage::Error(ErrorMessage {
                            id: None,
                            code: "unexpected_hello".to_string(),
                            message: "the session is already established".to_string(),
                        }));
                    }
                    HostMessage::Input(input) => {
                        if let Some(request) = controller.handle_input(&input.text, &mut port) {
                            spawn_fetch(&store, request, tx.clone());
                        }
                    }
                    HostMessage::Key(key) => controller.handle_key(key.key, &mut port),
                    HostMessage::Click(click) => controller.handle_click(click.index, &mut port),
                    HostMessage::Blur => controller.handle_blur(),
                    HostMessage::Submit => controller.handle_submit(&mut port),
                    HostMessage::Shutdown => return Ok(()),
                }
            }
            Ok(Event::Fetch { generation, result }) => {
                controller.handle_fetch_result(generation, result, &mut port);
            }
            Ok(Event::Eof) => return Ok(()),
            Err(RecvTimeoutError::Timeout) => controller.poll(&mut port),
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

/// Wait for the opening `hello`.
///
/// Anything else on the wire gets `handshake_required`; EOF or `shutdown`
/// before the handshake is a clean no-session exit.
fn read_hello(rx: &Receiver<Event>, port: &mut StdoutPort) -> Option<HelloMessage> {
    loop {
        match rx.recv() {
            Ok(Event::Line(line)) => match serde_json::from_str::<HostMessage>(&line) {
                Ok(HostMessage::Hello(hello)) => return Some(hello),
                Ok(HostMessage::Shutdown) => return None,
                Ok(_) => port.emit(WidgetMessage::Error(ErrorMessage {
                    id: None,
                    code: "handshake_required".to_string(),
                    message: "the first message must be hello".to_string(),
                })),
                Err(e) => port.emit(malformed(e)),
            },
            // No fetch can be in flight before the handshake
            Ok(Event::Fetch { .. }) => {}
            Ok(Event::Eof) | Err(_) => return None,
        }
    }
}

fn malformed(err: serde_json::Error) -> WidgetMessage {
    WidgetMessage::Error(ErrorMessage {
        id: None,
        code: "malformed_message".to_string(),
        message: err.to_string(),
    })
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Eof);
    });
}

/// Resolve a load request off-thread; the result rejoins the event loop
/// tagged with its generation so stale loads are discarded on arrival.
fn spawn_fetch(store: &Arc<SheetStore>, request: LoadRequest, tx: Sender<Event>) {
    let store = Arc::clone(store);
    thread::spawn(move || {
        let result = fetch::load_items(&store, &request);
        let _ = tx.send(Event::Fetch { generation: request.generation, result });
    });
}
