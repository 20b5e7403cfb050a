// Suggestion list state and load tracking

use sheetpick_index::SearchResult;

/// Where the sheet data stands. `Loading` carries the generation of the
/// outstanding request so late completions from earlier requests can be
/// told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading { generation: u64 },
    Loaded,
    Failed,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    /// A new load may start before the first one and after a failure.
    /// While one is in flight, duplicates are refused.
    pub fn can_start(&self) -> bool {
        matches!(self, LoadState::NotLoaded | LoadState::Failed)
    }
}

/// The input text, the visible suggestion list, and its selection.
///
/// The selection is `None` when nothing is highlighted; arrow movement is
/// clamped to `[0, N-1]` with no wraparound.
#[derive(Debug, Default)]
pub struct UiState {
    pub query: String,
    pub visible: bool,
    pub selection: Option<usize>,
    pub results: Vec<SearchResult>,
}

impl UiState {
    /// Replace the list content. A fresh list always starts unselected,
    /// and an empty list is never visible.
    pub fn show(&mut self, results: Vec<SearchResult>) {
        self.visible = !results.is_empty();
        self.results = results;
        self.selection = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.selection = None;
        self.results.clear();
    }

    /// Move the selection down one row, selecting the first row when
    /// nothing is selected. Returns whether the selection changed.
    pub fn move_down(&mut self) -> bool {
        if !self.visible || self.results.is_empty() {
            return false;
        }
        let next = match self.selection {
            None => 0,
            Some(i) => (i + 1).min(self.results.len() - 1),
        };
        if self.selection == Some(next) {
            return false;
        }
        self.selection = Some(next);
        true
    }

    /// Move the selection up one row. A no-op at the top and when nothing
    /// is selected. Returns whether the selection changed.
    pub fn move_up(&mut self) -> bool {
        match self.selection {
            Some(i) if i > 0 => {
                self.selection = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection
            .and_then(|i| self.results.get(i))
            .map(|r| r.text.as_str())
    }

    /// Rows currently occupying screen space.
    pub fn row_count(&self) -> usize {
        if self.visible {
            self.results.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str) -> SearchResult {
        SearchResult {
            index: 0,
            text: text.to_string(),
            score: 0.0,
            ranges: Vec::new(),
        }
    }

    fn showing(n: usize) -> UiState {
        let mut ui = UiState::default();
        ui.show((0..n).map(|i| result(&format!("item{i}"))).collect());
        ui
    }

    #[test]
    fn fresh_list_is_unselected() {
        let ui = showing(3);
        assert!(ui.visible);
        assert_eq!(ui.selection, None);
    }

    #[test]
    fn empty_list_is_hidden() {
        let ui = showing(0);
        assert!(!ui.visible);
    }

    #[test]
    fn down_selects_first_then_walks() {
        let mut ui = showing(3);
        assert!(ui.move_down());
        assert_eq!(ui.selection, Some(0));
        assert!(ui.move_down());
        assert_eq!(ui.selection, Some(1));
    }

    #[test]
    fn down_clamps_at_last_row() {
        let mut ui = showing(2);
        ui.move_down();
        ui.move_down();
        assert_eq!(ui.selection, Some(1));
        assert!(!ui.move_down(), "down at the end must be a no-op");
        assert_eq!(ui.selection, Some(1));
    }

    #[test]
    fn up_clamps_at_first_row() {
        let mut ui = showing(2);
        ui.move_down();
        assert_eq!(ui.selection, Some(0));
        assert!(!ui.move_up(), "up at the top must be a no-op");
        assert_eq!(ui.selection, Some(0));
    }

    #[test]
    fn up_with_no_selection_is_noop() {
        let mut ui = showing(2);
        assert!(!ui.move_up());
        assert_eq!(ui.selection, None);
    }

    #[test]
    fn movement_on_hidden_list_is_noop() {
        let mut ui = showing(2);
        ui.close();
        assert!(!ui.move_down());
        assert!(!ui.move_up());
        assert_eq!(ui.selection, None);
    }

    #[test]
    fn reshow_resets_selection() {
        let mut ui = showing(3);
        ui.move_down();
        ui.move_down();
        ui.show(vec![result("fresh")]);
        assert_eq!(ui.selection, None);
    }

    #[test]
    fn selected_text_follows_selection() {
        let mut ui = showing(2);
        assert_eq!(ui.selected_text(), None);
        ui.move_down();
        assert_eq!(ui.selected_text(), Some("item0"));
    }

    #[test]
    fn hidden_list_occupies_no_rows() {
        let mut ui = showing(3);
        assert_eq!(ui.row_count(), 3);
        ui.close();
        assert_eq!(ui.row_count(), 0);
    }
}
