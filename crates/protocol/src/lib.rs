//! SheetPick Host Bridge Protocol — v1 Frozen Wire Format
//!
//! This crate defines the canonical protocol types for host <-> widget
//! communication. The wire format is JSONL (newline-delimited JSON) over the
//! bridge's stdin/stdout.
//!
//! # Protocol Version
//!
//! This is **protocol v1** — the wire format is frozen. Changes require:
//! 1. Version bump in PROTOCOL_VERSION
//! 2. New golden vectors in `crates/cli/tests/golden/`
//! 3. Backward compatibility handling
//!
//! # Usage
//!
//! ```ignore
//! use sheetpick_protocol::{HostMessage, WidgetMessage, PROTOCOL_VERSION};
//!
//! // Deserialize a host message
//! let msg: HostMessage = serde_json::from_str(&line)?;
//!
//! // Serialize a widget message
//! let out = WidgetMessage::SendValue(SendValueMessage {
//!     value: "Alice".into(),
//!     valid: true,
//! });
//! let json = serde_json::to_string(&out)?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// =============================================================================
// Host → Widget Messages
// =============================================================================

/// Messages sent from the embedding host to the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Hello(HelloMessage),
    Input(InputMessage),
    Key(KeyMessage),
    Click(ClickMessage),
    Blur,
    Submit,
    Shutdown,
}

/// Initial handshake from the host, carrying the widget settings.
///
/// Settings are raw text values keyed by wire name (`googleSheetId`, ...).
/// BTreeMap keeps serialization order stable for the golden vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub id: String,
    pub client: String,
    pub version: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

fn default_protocol_version() -> u32 {
    1
}

/// The input field's current text, sent on every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMessage {
    pub text: String,
}

/// A navigation or commit key press.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMessage {
    pub key: KeyName,
}

/// Keys the widget reacts to; the host filters everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyName {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// A click on the suggestion at `index` (0-based, top of the visible list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickMessage {
    pub index: usize,
}

// =============================================================================
// Widget → Host Messages
// =============================================================================

/// Messages sent from the widget to the embedding host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetMessage {
    Ready(ReadyMessage),
    SendValue(SendValueMessage),
    RequestResize(RequestResizeMessage),
    Render(RenderMessage),
    Notice(NoticeMessage),
    Error(ErrorMessage),
}

/// Response to `hello`: the widget is live and the host can apply presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyMessage {
    pub id: String,
    pub protocol_version: u32,
    pub placeholder: String,
    pub input_width: String,
    pub autocomplete_width: String,
}

/// The current input value. `valid` is unconditionally true: this widget
/// never rejects input, and form submission must never be blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendValueMessage {
    pub value: String,
    pub valid: bool,
}

/// Ask the host to resize the widget container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResizeMessage {
    pub height: u32,
}

/// The suggestion list as the host should render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMessage {
    pub query: String,
    pub visible: bool,
    pub items: Vec<RenderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
}

/// One suggestion row, pre-split into highlight segments.
///
/// Segments concatenate to the full suggestion text; the host styles
/// `matched: true` pieces and concatenates the rest verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderItem {
    pub text: String,
    pub segments: Vec<Segment>,
}

/// A maximal run of matched or unmatched characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub matched: bool,
    pub text: String,
}

/// A user-visible condition the host may surface near the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeMessage {
    pub kind: NoticeKind,
    pub message: String,
}

/// Hosts branch on the kind string; `load_failed` and `empty_sheet`
/// stay separate kinds with separate messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Loading,
    Loaded,
    LoadFailed,
    EmptySheet,
    SettingIgnored,
}

/// Protocol-level error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub message: String,
}
