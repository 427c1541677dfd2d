//! Ratatui-based terminal UI.
//!
//! A sidebar menu switches between the Home page and the Price Prediction
//! form. The selected page lives in an explicit [`ViewState`] value that is
//! passed into navigation and rendering.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{PredictionOutput, Predictor};
use crate::config::AppConfig;
use crate::debug::{DebugEntry, write_debug_bundle};
use crate::domain::FormRecord;
use crate::error::AppError;
use crate::form::{COLUMN_LEN, FORM_FIELDS, FormAction, FormState, SUBMIT_FOCUS, SUBMIT_LABEL, Submission};

/// Start the TUI.
pub fn run(config: &AppConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(
        Predictor::from_path(&config.model_path),
        config.debug_dir.clone(),
    );
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    PricePrediction,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Home, Page::PricePrediction];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::PricePrediction => "Price Prediction",
        }
    }

    fn index(self) -> usize {
        match self {
            Page::Home => 0,
            Page::PricePrediction => 1,
        }
    }
}

/// Which panel receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Menu,
    Content,
}

/// Navigation state of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub page: Page,
    pub pane: Pane,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: Page::Home,
            pane: Pane::Menu,
        }
    }
}

/// Apply a navigation key to the view. Keys that do not navigate leave it unchanged.
pub fn navigate(view: ViewState, code: KeyCode) -> ViewState {
    match (view.pane, code) {
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => ViewState {
            pane: match view.pane {
                Pane::Menu => Pane::Content,
                Pane::Content => Pane::Menu,
            },
            ..view
        },
        (Pane::Menu, KeyCode::Up) => ViewState { page: Page::Home, ..view },
        (Pane::Menu, KeyCode::Down) => ViewState {
            page: Page::PricePrediction,
            ..view
        },
        (Pane::Menu, KeyCode::Enter) | (Pane::Menu, KeyCode::Right) => ViewState {
            pane: Pane::Content,
            ..view
        },
        (Pane::Content, KeyCode::Esc) => ViewState {
            pane: Pane::Menu,
            ..view
        },
        _ => view,
    }
}

/// Content of the result area.
#[derive(Debug, Clone)]
enum ResultView {
    Price(PredictionOutput),
    Error(String),
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
    Submit(FormRecord),
}

struct App {
    view: ViewState,
    form: FormState,
    predictor: Predictor,
    debug_dir: PathBuf,
    result: Option<ResultView>,
    last: Option<DebugEntry>,
    status: String,
}

impl App {
    fn new(predictor: Predictor, debug_dir: PathBuf) -> Self {
        Self {
            view: ViewState::default(),
            form: FormState::new(),
            predictor,
            debug_dir,
            result: None,
            last: None,
            status: "Ready.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                self.redraw(terminal)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key.code) {
                        Control::Quit => break,
                        Control::Continue => {}
                        Control::Submit(record) => {
                            // Show the busy status before the synchronous call.
                            self.status = "Getting Price...".to_string();
                            self.redraw(terminal)?;
                            self.submit(record);
                        }
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn redraw<B: ratatui::backend::Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        terminal
            .draw(|f| self.draw(f, self.view))
            .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Control {
        match code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('d') => {
                self.write_debug();
                return Control::Continue;
            }
            _ => {}
        }

        let in_form = self.view.pane == Pane::Content && self.view.page == Page::PricePrediction;
        if !in_form {
            self.view = navigate(self.view, code);
            return Control::Continue;
        }

        let action = match code {
            KeyCode::Up => FormAction::FocusPrev,
            KeyCode::Down => FormAction::FocusNext,
            KeyCode::Left => FormAction::Step(-1),
            KeyCode::Right => FormAction::Step(1),
            KeyCode::PageUp => FormAction::PageUp,
            KeyCode::PageDown => FormAction::PageDown,
            KeyCode::Home => FormAction::First,
            KeyCode::End => FormAction::Last,
            KeyCode::Enter => FormAction::Activate,
            KeyCode::Char('p') => FormAction::Submit,
            _ => {
                self.view = navigate(self.view, code);
                return Control::Continue;
            }
        };

        match self.form.collect(action) {
            Submission::Submitted(record) => Control::Submit(record),
            Submission::NotSubmitted => Control::Continue,
        }
    }

    /// Run one prediction; every failure ends up in the result area.
    fn submit(&mut self, record: FormRecord) {
        let outcome = self.predictor.predict(&record);
        self.result = Some(match &outcome {
            Ok(output) => {
                self.status = "Prediction complete.".to_string();
                ResultView::Price(output.clone())
            }
            Err(err) => {
                self.status = format!("Prediction failed ({}).", err.kind());
                ResultView::Error(err.user_message())
            }
        });
        self.last = Some(DebugEntry {
            model_path: self.predictor.model_path().to_path_buf(),
            record,
            outcome,
        });
    }

    fn write_debug(&mut self) {
        let Some(entry) = &self.last else {
            self.status = "Nothing to debug yet; submit the form first.".to_string();
            return;
        };
        match write_debug_bundle(&self.debug_dir, entry) {
            Ok(path) => {
                info!("event=debug_bundle path={}", path.display());
                self.status = format!("Wrote debug bundle: {}", path.display());
            }
            Err(err) => {
                self.status = format!("Debug write failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>, view: ViewState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(rows[0]);

        draw_sidebar(frame, cols[0], view);
        match view.page {
            Page::Home => draw_home(frame, cols[1]),
            Page::PricePrediction => self.draw_prediction(frame, cols[1], view),
        }
        self.draw_footer(frame, rows[1], view);
    }

    fn draw_prediction(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: ViewState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(COLUMN_LEN as u16 + 3),
                Constraint::Min(0),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            "Price Prediction",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        let active = view.pane == Pane::Content;

        let mut left = Vec::new();
        let mut right = Vec::new();
        for slot in 0..FORM_FIELDS.len() {
            let line = field_line(&self.form, slot, active);
            if slot < COLUMN_LEN {
                left.push(line);
            } else {
                right.push(line);
            }
        }
        right.push(submit_line(&self.form, active));

        frame.render_widget(
            Paragraph::new(Text::from(left)).block(Block::default().borders(Borders::ALL)),
            columns[0],
        );
        frame.render_widget(
            Paragraph::new(Text::from(right)).block(Block::default().borders(Borders::ALL)),
            columns[1],
        );

        self.draw_result(frame, chunks[2]);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Result").borders(Borders::ALL);
        let text = match &self.result {
            None => Text::from(Span::styled(
                format!("Fill in the form and choose '{SUBMIT_LABEL}'."),
                Style::default().fg(Color::Gray),
            )),
            Some(ResultView::Price(output)) => Text::from(vec![
                Line::from(Span::styled(
                    "The Selling Price is",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    output.result.to_string(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "Storey range {} encoded as {}",
                        output.decoded_storey_range,
                        output.features.storey_rank()
                    ),
                    Style::default().fg(Color::Gray),
                )),
            ]),
            Some(ResultView::Error(message)) => Text::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )),
        };
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: ViewState) {
        let help = match (view.pane, view.page) {
            (Pane::Content, Page::PricePrediction) => {
                "↑/↓ field  ←/→ value  PgUp/PgDn ±10  Enter/p submit  Tab menu  d debug  q quit"
            }
            _ => "↑/↓ page  Enter/Tab open  d debug  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_sidebar(frame: &mut ratatui::Frame<'_>, area: Rect, view: ViewState) {
    let items: Vec<ListItem> = Page::ALL.iter().map(|p| ListItem::new(p.title())).collect();
    let border = if view.pane == Pane::Menu { Color::Green } else { Color::Gray };
    let list = List::new(items)
        .block(
            Block::default()
                .title("Menu")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Rgb(255, 165, 0)))
        .highlight_symbol("» ");

    let mut state = ListState::default();
    state.select(Some(view.page.index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_home(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let key = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled("Welcome", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Project Name: ", key),
            Span::raw("Singapore Resale Flat Prices Prediction"),
        ]),
        Line::from(vec![
            Span::styled("Technologies Used: ", key),
            Span::raw("Rust, Ratatui, regression model inference"),
        ]),
        Line::from(vec![Span::styled("Domain: ", key), Span::raw("Real Estate")]),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Overview: ", key),
            Span::raw(
                "Predict the resale price of a flat in Singapore from its attributes \
                 using a pre-trained regression model.",
            ),
        ]),
    ];
    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Home").borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn field_line(form: &FormState, slot: usize, active: bool) -> Line<'static> {
    let focused = active && form.focus() == slot;
    let label = format!("{:<20}", FORM_FIELDS[slot].label());
    let value = format!("‹ {} ›", form.display_value(slot));
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default()
    };
    Line::from(vec![Span::raw(label), Span::styled(value, style)])
}

fn submit_line(form: &FormState, active: bool) -> Line<'static> {
    let focused = active && form.focus() == SUBMIT_FOCUS;
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    Line::from(Span::styled(format!("[ {SUBMIT_LABEL} ]"), style))
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::error::PredictError;
    use crate::models::Regressor;

    struct FixedModel(f64);

    impl Regressor for FixedModel {
        fn predict(&self, _features: &[f64]) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.draw(f, app.view)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn open_form(app: &mut App) {
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(
            app.view,
            ViewState {
                page: Page::PricePrediction,
                pane: Pane::Content
            }
        );
    }

    fn press_until_submit(app: &mut App) -> FormRecord {
        for _ in 0..SUBMIT_FOCUS {
            assert_eq!(app.handle_key(KeyCode::Down), Control::Continue);
        }
        match app.handle_key(KeyCode::Enter) {
            Control::Submit(record) => record,
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn navigation_is_a_pure_function_of_view() {
        let home = ViewState::default();
        let menu_down = navigate(home, KeyCode::Down);
        assert_eq!(menu_down.page, Page::PricePrediction);
        assert_eq!(navigate(menu_down, KeyCode::Up).page, Page::Home);

        let content = navigate(menu_down, KeyCode::Tab);
        assert_eq!(content.pane, Pane::Content);
        assert_eq!(navigate(content, KeyCode::Esc).pane, Pane::Menu);
        assert_eq!(navigate(content, KeyCode::Char('x')), content);
    }

    #[test]
    fn home_page_renders_welcome() {
        let app = App::new(Predictor::with_model(FixedModel(1.0)), PathBuf::from("debug"));
        let text = screen(&app);
        assert!(text.contains("Welcome"));
        assert!(text.contains("Singapore Resale Flat Prices Prediction"));
    }

    #[test]
    fn form_edits_do_not_predict() {
        let mut app = App::new(Predictor::with_model(FixedModel(1.0)), PathBuf::from("debug"));
        open_form(&mut app);
        assert_eq!(app.handle_key(KeyCode::Right), Control::Continue);
        assert_eq!(app.handle_key(KeyCode::Down), Control::Continue);
        assert!(app.result.is_none());
    }

    #[test]
    fn submitted_price_is_displayed() {
        let mut app = App::new(
            Predictor::with_model(FixedModel(350_000.0)),
            PathBuf::from("debug"),
        );
        open_form(&mut app);
        let record = press_until_submit(&mut app);
        assert_eq!(record.storey_range, "10 TO 12");
        app.submit(record);

        let text = screen(&app);
        assert!(text.contains("Month"));
        assert!(text.contains("Lease_commence_date"));
        assert!(text.contains(SUBMIT_LABEL));
        assert!(text.contains("The Selling Price is"));
        assert!(text.contains("$350,000"));
    }

    #[test]
    fn missing_model_shows_error_instead_of_crashing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            Predictor::from_path(dir.path().join("missing.json")),
            dir.path().join("debug"),
        );
        open_form(&mut app);
        let record = press_until_submit(&mut app);
        app.submit(record);

        assert!(matches!(app.result, Some(ResultView::Error(_))));
        let text = screen(&app);
        assert!(text.contains("An error occurred"));
        assert!(app.status.contains("model_unavailable"));
    }

    #[test]
    fn debug_key_writes_bundle_after_submit() {
        let dir = tempfile::tempdir().unwrap();
        let debug_dir = dir.path().join("debug");
        let mut app = App::new(Predictor::with_model(FixedModel(5.0)), debug_dir.clone());

        app.handle_key(KeyCode::Char('d'));
        assert!(app.status.starts_with("Nothing to debug"));

        open_form(&mut app);
        let record = press_until_submit(&mut app);
        app.submit(record);
        app.handle_key(KeyCode::Char('d'));
        assert!(app.status.starts_with("Wrote debug bundle"));
        assert_eq!(std::fs::read_dir(&debug_dir).unwrap().count(), 1);
    }

    #[test]
    fn quit_key_quits() {
        let mut app = App::new(Predictor::with_model(FixedModel(1.0)), PathBuf::from("debug"));
        assert_eq!(app.handle_key(KeyCode::Char('q')), Control::Quit);
    }
}
