//! Interactive picker: the widget controller behind a ratatui frontend.
//!
//! The terminal stands in for the browser embed. Keystrokes feed
//! `handle_input`/`handle_key`, sheet loads run on worker threads and
//! rejoin through a channel, and each frame is drawn from controller
//! state. Accepting a value returns it; Esc or Ctrl-C returns `None`.

use std::io::stdout;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use sheetpick_config::WidgetSettings;
use sheetpick_protocol::{KeyName, NoticeKind, WidgetMessage};
use sheetpick_sheet::{SheetError, SheetStore};
use sheetpick_widget::{AutocompleteController, HostPort, LoadRequest};

use crate::fetch;
use crate::util;

/// The picker reads controller state directly after every call, so the
/// render/resize traffic is dropped; only notices are kept, for the
/// status line. A `loaded` notice clears whatever came before it.
struct StatusPort {
    notice: Option<(NoticeKind, String)>,
}

impl HostPort for StatusPort {
    fn emit(&mut self, message: WidgetMessage) {
        if let WidgetMessage::Notice(notice) = message {
            match notice.kind {
                NoticeKind::Loaded => self.notice = None,
                kind => self.notice = Some((kind, notice.message)),
            }
        }
    }
}

struct Completion {
    generation: u64,
    result: Result<Vec<String>, SheetError>,
}

struct PickApp {
    controller: AutocompleteController,
    port: StatusPort,
    store: Arc<SheetStore>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    /// `Some(Some(value))` accepted, `Some(None)` cancelled
    outcome: Option<Option<String>>,
}

impl PickApp {
    /// Drain finished loads and give the controller a timer tick.
    fn tick(&mut self) {
        while let Ok(done) = self.rx.try_recv() {
            self.controller
                .handle_fetch_result(done.generation, done.result, &mut self.port);
        }
        self.controller.poll(&mut self.port);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.outcome = Some(None);
            return;
        }

        match key.code {
            KeyCode::Esc => {
                // First Esc closes the list, the next one cancels the pick
                if self.controller.is_visible() {
                    self.controller.handle_key(KeyName::Escape, &mut self.port);
                } else {
                    self.outcome = Some(None);
                }
            }
            KeyCode::Enter => {
                self.controller.handle_key(KeyName::Enter, &mut self.port);
                self.outcome = Some(Some(self.controller.query().to_string()));
            }
            KeyCode::Down => self.controller.handle_key(KeyName::ArrowDown, &mut self.port),
            KeyCode::Up => self.controller.handle_key(KeyName::ArrowUp, &mut self.port),
            KeyCode::Backspace => {
                let mut text = self.controller.query().to_string();
                text.pop();
                self.input(text);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut text = self.controller.query().to_string();
                text.push(c);
                self.input(text);
            }
            _ => {}
        }
    }

    fn input(&mut self, text: String) {
        if let Some(request) = self.controller.handle_input(&text, &mut self.port) {
            spawn_fetch(&self.store, request, self.tx.clone());
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

        self.draw_title(frame, chunks[0]);
        self.draw_input(frame, chunks[1]);
        self.draw_list(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let settings = self.controller.settings();
        let sheet = if settings.sheet_id.is_empty() {
            "(no sheet configured)"
        } else {
            settings.sheet_id.as_str()
        };
        let title = format!(" spick: {} ", sheet);
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let query = self.controller.query();
        let line = if query.is_empty() {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
                Span::styled(
                    self.controller.settings().placeholder_text.clone(),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(query.to_string()),
                Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        if !self.controller.is_visible() {
            return;
        }
        let width = area.width as usize;
        let selected = self.controller.selection();

        let mut lines: Vec<Line> = Vec::new();
        for (i, result) in self.controller.results().iter().enumerate() {
            let is_selected = selected == Some(i);
            let row_style = if is_selected {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled("  ", row_style)];
            if util::display_width(&result.text) + 2 > width {
                // Overlong rows lose their highlights and get an ellipsis
                spans.push(Span::styled(
                    util::truncate_display(&result.text, width.saturating_sub(2)),
                    row_style,
                ));
            } else {
                for segment in result.segments() {
                    let style = if segment.matched {
                        let bold = row_style.add_modifier(Modifier::BOLD);
                        if is_selected { bold } else { bold.fg(Color::Yellow) }
                    } else if is_selected {
                        row_style
                    } else {
                        row_style.fg(Color::Gray)
                    };
                    spans.push(Span::styled(segment.text, style));
                }
            }
            lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let text = if self.controller.is_loading() {
            "loading sheet data...".to_string()
        } else if let Some((_, message)) = &self.port.notice {
            message.clone()
        } else if self.controller.is_visible() {
            format!(
                "{} matches  enter accept  esc cancel",
                self.controller.results().len(),
            )
        } else {
            "type to search  enter accept  esc cancel".to_string()
        };

        let para = Paragraph::new(Line::from(vec![Span::styled(
            format!(" {}", text),
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }
}

pub(crate) fn run(
    settings: WidgetSettings,
    store: Arc<SheetStore>,
) -> Result<Option<String>, String> {
    let (tx, rx) = mpsc::channel();
    let mut app = PickApp {
        controller: AutocompleteController::new(settings),
        port: StatusPort { notice: None },
        store,
        tx,
        rx,
        outcome: None,
    };
    app.controller.start(&mut app.port);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        app.tick();

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                app.handle_key(key);
            }
        }

        if let Some(outcome) = app.outcome.take() {
            return Ok(outcome);
        }
    }
}

fn spawn_fetch(store: &Arc<SheetStore>, request: LoadRequest, tx: Sender<Completion>) {
    let store = Arc::clone(store);
    thread::spawn(move || {
        let result = fetch::load_items(&store, &request);
        let _ = tx.send(Completion { generation: request.generation, result });
    });
}
