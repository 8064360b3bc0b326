//! Ratatui-based terminal UI.
//!
//! The form has one row per choice (province, market, category, commodity,
//! month, unit). Every change re-resolves the cascade, so downstream rows always
//! show a valid choice. Predicting renders the result panel; prediction errors
//! are shown inline and the session keeps going.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::Assets;
use crate::catalog::ResolvedForm;
use crate::domain::{Field, MONTHS, Selection};
use crate::error::AppError;
use crate::report::{Diagnostic, PredictionView, find_diagnostics, month_name};

/// Start the TUI.
pub fn run(assets: &Assets) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(assets);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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

/// One row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Choice(Field),
    Month,
}

const ROWS: [Row; 6] = [
    Row::Choice(Field::Admin1),
    Row::Choice(Field::Market),
    Row::Choice(Field::Category),
    Row::Choice(Field::Commodity),
    Row::Month,
    Row::Choice(Field::Unit),
];

impl Row {
    fn label(self) -> &'static str {
        match self {
            Row::Choice(field) => field.display_name(),
            Row::Month => "Month (2026)",
        }
    }
}

/// Result panel content.
#[derive(Debug, Clone)]
enum Outcome {
    Predicted(Box<PredictionView>),
    Failed(String),
}

struct App<'a> {
    assets: &'a Assets,
    form: ResolvedForm,
    selected_row: usize,
    /// Cursor inside the open dropdown, if any.
    dropdown: Option<usize>,
    outcome: Option<Outcome>,
    diagnostics: Vec<Diagnostic>,
    status: String,
}

impl<'a> App<'a> {
    fn new(assets: &'a Assets) -> Self {
        let form = assets.resolver().resolve(&Selection::default(), assets.variant());
        Self {
            assets,
            form,
            selected_row: 0,
            dropdown: None,
            outcome: None,
            diagnostics: Vec::new(),
            status: format!(
                "{} markets, {} commodities loaded.",
                assets.catalog.market_count(),
                assets.catalog.commodity_count()
            ),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.dropdown.is_some() {
            self.handle_dropdown_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row + 1 < ROWS.len() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.step_choice(-1),
            KeyCode::Right => self.step_choice(1),
            KeyCode::Enter => {
                self.dropdown = Some(self.current_index());
            }
            KeyCode::Char('p') => self.predict(),
            _ => {}
        }
        false
    }

    fn handle_dropdown_key(&mut self, code: KeyCode) {
        let Some(cursor) = self.dropdown else {
            return;
        };
        let len = self.row_options(self.row()).len();
        match code {
            KeyCode::Esc => self.dropdown = None,
            KeyCode::Up => self.dropdown = Some(cursor.saturating_sub(1)),
            KeyCode::Down => self.dropdown = Some((cursor + 1).min(len.saturating_sub(1))),
            KeyCode::PageUp => self.dropdown = Some(cursor.saturating_sub(10)),
            KeyCode::PageDown => self.dropdown = Some((cursor + 10).min(len.saturating_sub(1))),
            KeyCode::Home => self.dropdown = Some(0),
            KeyCode::End => self.dropdown = Some(len.saturating_sub(1)),
            KeyCode::Enter => {
                self.dropdown = None;
                self.choose(cursor);
            }
            _ => {}
        }
    }

    fn row(&self) -> Row {
        ROWS[self.selected_row]
    }

    fn row_options(&self, row: Row) -> Vec<String> {
        match row {
            Row::Choice(field) => self.form.options(field).to_vec(),
            Row::Month => MONTHS.filter_map(month_name).collect(),
        }
    }

    fn row_value(&self, row: Row) -> String {
        match row {
            Row::Choice(field) => self.form.selection.label(field).to_string(),
            Row::Month => month_name(self.form.selection.month).unwrap_or_default(),
        }
    }

    fn current_index(&self) -> usize {
        let row = self.row();
        let value = self.row_value(row);
        self.row_options(row)
            .iter()
            .position(|o| *o == value)
            .unwrap_or(0)
    }

    fn step_choice(&mut self, delta: isize) {
        let len = self.row_options(self.row()).len();
        if len == 0 {
            return;
        }
        let idx = (self.current_index() as isize + delta).rem_euclid(len as isize) as usize;
        self.choose(idx);
    }

    /// Apply the `idx`-th option of the current row and re-resolve the cascade.
    fn choose(&mut self, idx: usize) {
        let row = self.row();
        let options = self.row_options(row);
        let Some(value) = options.get(idx) else {
            return;
        };

        match row {
            Row::Choice(field) => {
                self.form = self
                    .assets
                    .resolver()
                    .select(&self.form.selection, field, value, self.assets.variant());
            }
            Row::Month => {
                self.form.selection.month = idx as u32 + 1;
            }
        }
        // A stale result would no longer match the form.
        self.outcome = None;
        self.status = format!("{}: {value}", row.label());
    }

    fn predict(&mut self) {
        match self.assets.predict(&self.form.selection) {
            Ok(prediction) => {
                let view = PredictionView::new(&prediction);
                self.status = format!("Predicted {} for {}.", view.price_text, view.period);
                self.outcome = Some(Outcome::Predicted(Box::new(view)));
                self.diagnostics = find_diagnostics(&self.assets.config.outputs_dir);
            }
            Err(err) => {
                tracing::warn!(%err, "prediction failed");
                self.status = "Prediction failed.".to_string();
                self.outcome = Some(Outcome::Failed(err.to_string()));
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Sri Lanka Food Price Predictor",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Predict 2026 food prices across Sri Lanka's markets",
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_result(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = ROWS
            .iter()
            .map(|row| ListItem::new(format!("{:<14} {}", row.label(), self.row_value(*row))))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Preferences").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, area, &mut state);

        if let Some(cursor) = self.dropdown {
            self.draw_dropdown(frame, area, cursor);
        }
    }

    fn draw_dropdown(&self, frame: &mut ratatui::Frame<'_>, form_area: Rect, cursor: usize) {
        let row = self.row();
        let options = self.row_options(row);
        let height = (options.len() as u16 + 2).min(form_area.height.saturating_sub(2)).max(3);
        let rect = Rect {
            x: form_area.x.saturating_add(4),
            y: form_area.y.saturating_add(1),
            width: form_area.width.saturating_sub(8).max(10),
            height,
        }
        .intersection(form_area);
        if rect.width < 3 || rect.height < 3 {
            return;
        }

        let items: Vec<ListItem> = options.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(Block::default().title(row.label()).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .highlight_symbol("› ");

        let mut state = ListState::default();
        state.select(Some(cursor));
        frame.render_widget(Clear, rect);
        frame.render_stateful_widget(list, rect, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price Prediction").borders(Borders::ALL);

        let text = match &self.outcome {
            None => Text::from(Line::from(Span::styled(
                "Select options and press p to predict",
                Style::default().fg(Color::Cyan),
            ))),
            Some(Outcome::Failed(msg)) => Text::from(Line::from(Span::styled(
                format!("⚠ {msg}"),
                Style::default().fg(Color::Red),
            ))),
            Some(Outcome::Predicted(view)) => self.result_text(view),
        };

        let p = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        frame.render_widget(p, area);
    }

    fn result_text(&self, view: &PredictionView) -> Text<'static> {
        let muted = Style::default().fg(Color::Gray);
        let mut lines = vec![
            Line::from(Span::styled("Estimated price for", muted)),
            Line::from(Span::styled(view.period.clone(), Style::default().fg(Color::Cyan))),
            Line::from(Span::styled(
                view.price_text.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
        ];
        if !view.secondary_text.is_empty() {
            lines.push(Line::from(view.secondary_text.clone()));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Confidence: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(view.confidence),
        ]));
        lines.push(Line::from(Span::styled(view.confidence_note, muted)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Details", Style::default().add_modifier(Modifier::BOLD))));
        lines.push(Line::from(view.item.clone()));
        lines.push(Line::from(view.place.clone()));
        if let Some(note) = view.crisis_note {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(note, Style::default().fg(Color::Yellow))));
        }

        if !self.diagnostics.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Model Insights", Style::default().add_modifier(Modifier::BOLD))));
            for d in &self.diagnostics {
                lines.push(Line::from(Span::styled(
                    format!("{}: {}", d.caption, d.path.display()),
                    muted,
                )));
            }
        }

        Text::from(lines)
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.dropdown.is_some() {
            "↑/↓ move  PgUp/PgDn page  Enter choose  Esc cancel"
        } else {
            "↑/↓ select  ←/→ change  Enter open list  p predict  q quit"
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
