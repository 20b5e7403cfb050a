//! The autocomplete controller: host events in, widget messages out.
//!
//! The controller is synchronous and single-threaded. Frontends feed it
//! host events, call [`AutocompleteController::poll`] from their event loop
//! to fire due debounce and blur deadlines, and run the [`LoadRequest`]s it
//! returns on a worker thread, reporting completions back through
//! [`AutocompleteController::handle_fetch_result`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sheetpick_config::WidgetSettings;
use sheetpick_index::{FuzzyIndex, IndexConfig, SearchResult};
use sheetpick_protocol::{
    KeyName, NoticeKind, NoticeMessage, RenderItem, RenderMessage, RequestResizeMessage, Segment,
    SendValueMessage, WidgetMessage,
};
use sheetpick_sheet::{Clock, SheetError, SheetKey, SystemClock};

use crate::debounce::Debouncer;
use crate::state::{LoadState, UiState};

/// Container height is computed from these, not measured: input area plus
/// one row per visible suggestion plus padding.
pub const INPUT_AREA_HEIGHT: u32 = 48;
pub const SUGGESTION_ROW_HEIGHT: u32 = 32;
pub const RESIZE_PADDING: u32 = 20;
/// Height requested when `dynamic_resize` is off.
pub const FIXED_HEIGHT: u32 = 250;

/// The first input of at least this many chars triggers the sheet load.
/// Fixed engagement threshold, independent of `min_char_required`.
pub const LAZY_LOAD_MIN_CHARS: usize = 2;

/// How long a blur waits before closing the list, so a click on a
/// suggestion can land first.
pub const BLUR_GRACE: Duration = Duration::from_millis(100);

/// Sink for widget output. Frontends either serialize the messages to the
/// host or fold them into their own UI state.
pub trait HostPort {
    fn emit(&mut self, message: WidgetMessage);
}

/// A sheet load the frontend should run off the event thread. Completion
/// goes to [`AutocompleteController::handle_fetch_result`] with the same
/// generation; completions for any other generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub key: SheetKey,
    pub generation: u64,
    pub max_rows: u32,
    pub column_index: u32,
}

pub struct AutocompleteController {
    settings: WidgetSettings,
    clock: Arc<dyn Clock>,
    ui: UiState,
    load: LoadState,
    load_generation: u64,
    index: Option<FuzzyIndex>,
    memo: HashMap<String, Vec<SearchResult>>,
    debounce: Debouncer,
    blur_deadline: Option<Instant>,
    search_seq: u64,
    last_height: Option<u32>,
}

impl AutocompleteController {
    pub fn new(settings: WidgetSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: WidgetSettings, clock: Arc<dyn Clock>) -> Self {
        let debounce = Debouncer::new(Duration::from_millis(u64::from(settings.debounce_time_ms)));
        Self {
            settings,
            clock,
            ui: UiState::default(),
            load: LoadState::NotLoaded,
            load_generation: 0,
            index: None,
            memo: HashMap::new(),
            debounce,
            blur_deadline: None,
            search_seq: 0,
            last_height: None,
        }
    }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Announce the initial container height.
    pub fn start(&mut self, port: &mut dyn HostPort) {
        self.resize_if_changed(port);
    }

    /// The input text changed. Reports the value, lazily starts the sheet
    /// load, and arms the search debounce. Queries below `min_char_required`
    /// close the list immediately.
    pub fn handle_input(&mut self, text: &str, port: &mut dyn HostPort) -> Option<LoadRequest> {
        self.ui.query = text.to_string();
        self.send_value(port);

        let request = self.maybe_start_load(port);

        if self.query_len() < self.settings.min_char_required as usize {
            self.debounce.cancel();
            if self.ui.visible {
                self.ui.close();
                self.render(port);
                self.resize_if_changed(port);
            }
            return request;
        }

        self.debounce.arm(self.clock.now());
        request
    }

    /// Fire any due debounce or blur deadline. Frontends call this from
    /// their event loop tick.
    pub fn poll(&mut self, port: &mut dyn HostPort) {
        let now = self.clock.now();
        if self.debounce.fire_if_due(now) {
            self.run_search(port);
        }
        if let Some(deadline) = self.blur_deadline {
            if now >= deadline {
                self.blur_deadline = None;
                self.close_list(port);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyName, port: &mut dyn HostPort) {
        match key {
            KeyName::ArrowDown => {
                if self.ui.move_down() {
                    self.render(port);
                }
            }
            KeyName::ArrowUp => {
                if self.ui.move_up() {
                    self.render(port);
                }
            }
            KeyName::Enter => {
                // A selection commits its text; either way the list closes
                // and the current value is reported
                if let Some(text) = self.ui.selected_text().map(String::from) {
                    self.ui.query = text;
                }
                let was_visible = self.ui.visible;
                self.ui.close();
                self.send_value(port);
                if was_visible {
                    self.render(port);
                    self.resize_if_changed(port);
                }
            }
            KeyName::Escape => self.close_list(port),
        }
    }

    /// A click on the suggestion at `index` commits it. Clicks that race a
    /// repaint and land out of range are ignored.
    pub fn handle_click(&mut self, index: usize, port: &mut dyn HostPort) {
        if !self.ui.visible {
            return;
        }
        let Some(text) = self.ui.results.get(index).map(|r| r.text.clone()) else {
            return;
        };
        self.ui.query = text;
        self.ui.close();
        self.send_value(port);
        self.render(port);
        self.resize_if_changed(port);
    }

    /// The input lost focus. The list closes after [`BLUR_GRACE`] unless a
    /// click commits first.
    pub fn handle_blur(&mut self) {
        self.blur_deadline = Some(self.clock.now() + BLUR_GRACE);
    }

    /// The host form was submitted. The current value is always reported
    /// as valid, whatever the load state.
    pub fn handle_submit(&mut self, port: &mut dyn HostPort) {
        self.send_value(port);
    }

    /// A sheet load finished. Results for any generation other than the
    /// outstanding one are dropped.
    pub fn handle_fetch_result(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, SheetError>,
        port: &mut dyn HostPort,
    ) {
        match self.load {
            LoadState::Loading { generation: current } if current == generation => {}
            _ => return,
        }

        match result {
            Ok(items) => {
                self.index = Some(FuzzyIndex::build(items, self.index_config()));
                self.memo.clear();
                self.load = LoadState::Loaded;
                self.notice(port, NoticeKind::Loaded, "sheet data loaded");
                // The load satisfies the keystroke that started it
                self.debounce.cancel();
                self.run_search(port);
            }
            Err(err) => {
                self.load = LoadState::Failed;
                let kind = match err {
                    SheetError::EmptyDataset => NoticeKind::EmptySheet,
                    _ => NoticeKind::LoadFailed,
                };
                self.notice(port, kind, err.user_message());
            }
        }
    }

    // ========================================================================
    // State access for frontends that render directly
    // ========================================================================

    pub fn query(&self) -> &str {
        &self.ui.query
    }

    pub fn is_visible(&self) -> bool {
        self.ui.visible
    }

    pub fn selection(&self) -> Option<usize> {
        self.ui.selection
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.ui.results
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_loading()
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn query_len(&self) -> usize {
        self.ui.query.chars().count()
    }

    fn index_config(&self) -> IndexConfig {
        IndexConfig {
            threshold: self.settings.threshold,
            distance: self.settings.distance,
            min_match_char_length: self.settings.min_char_required,
        }
    }

    fn maybe_start_load(&mut self, port: &mut dyn HostPort) -> Option<LoadRequest> {
        if self.query_len() < LAZY_LOAD_MIN_CHARS || !self.load.can_start() {
            return None;
        }
        if self.settings.sheet_id.is_empty() {
            return None;
        }

        self.load_generation += 1;
        self.load = LoadState::Loading { generation: self.load_generation };
        self.notice(port, NoticeKind::Loading, "loading sheet data");
        Some(LoadRequest {
            key: SheetKey::new(self.settings.sheet_id.clone()),
            generation: self.load_generation,
            max_rows: self.settings.max_rows,
            column_index: self.settings.column_index,
        })
    }

    fn run_search(&mut self, port: &mut dyn HostPort) {
        self.search_seq += 1;
        let seq = self.search_seq;
        let results = self.search_results();
        self.apply_results(seq, results, port);
    }

    fn search_results(&mut self) -> Vec<SearchResult> {
        if self.query_len() < self.settings.min_char_required as usize {
            return Vec::new();
        }
        let Some(index) = &self.index else {
            return Vec::new();
        };
        if let Some(hit) = self.memo.get(&self.ui.query) {
            return hit.clone();
        }
        let results = index.search(&self.ui.query);
        self.memo.insert(self.ui.query.clone(), results.clone());
        results
    }

    /// Apply a finished search. Results whose sequence number is older than
    /// the newest issued are stale and never repaint the list.
    fn apply_results(&mut self, seq: u64, results: Vec<SearchResult>, port: &mut dyn HostPort) {
        if seq < self.search_seq {
            return;
        }
        let mut shown = results;
        shown.truncate(self.settings.max_results as usize);
        self.ui.show(shown);
        self.render(port);
        self.resize_if_changed(port);
    }

    fn close_list(&mut self, port: &mut dyn HostPort) {
        if !self.ui.visible {
            return;
        }
        self.ui.close();
        self.send_value(port);
        self.render(port);
        self.resize_if_changed(port);
    }

    fn send_value(&self, port: &mut dyn HostPort) {
        port.emit(WidgetMessage::SendValue(SendValueMessage {
            value: self.ui.query.clone(),
            valid: true,
        }));
    }

    fn notice(&self, port: &mut dyn HostPort, kind: NoticeKind, message: &str) {
        port.emit(WidgetMessage::Notice(NoticeMessage {
            kind,
            message: message.to_string(),
        }));
    }

    fn render(&self, port: &mut dyn HostPort) {
        let items = self
            .ui
            .results
            .iter()
            .map(|result| RenderItem {
                text: result.text.clone(),
                segments: result
                    .segments()
                    .into_iter()
                    .map(|s| Segment { matched: s.matched, text: s.text })
                    .collect(),
            })
            .collect();
        port.emit(WidgetMessage::Render(RenderMessage {
            query: self.ui.query.clone(),
            visible: self.ui.visible,
            items,
            selected: self.ui.selection,
        }));
    }

    fn current_height(&self) -> u32 {
        if !self.settings.dynamic_resize {
            return FIXED_HEIGHT;
        }
        let rows = self.ui.row_count() as u32;
        INPUT_AREA_HEIGHT + rows * SUGGESTION_ROW_HEIGHT + RESIZE_PADDING
    }

    /// Request a resize only when the height actually changed.
    fn resize_if_changed(&mut self, port: &mut dyn HostPort) {
        let height = self.current_height();
        if self.last_height == Some(height) {
            return;
        }
        self.last_height = Some(height);
        port.emit(WidgetMessage::RequestResize(RequestResizeMessage { height }));
    }
}
