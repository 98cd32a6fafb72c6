use crate::api_client::{BusinessApiClient, SearchError};
use crate::config::Config;
use crate::contact_launcher::{ContactLauncher, SystemLauncher};
use crate::data::business::SearchResponse;
use crate::ui::page_controller::{Completion, PageController, PageState, SearchTicket};
use crate::ui::results_table::ResultsTable;
use crate::ui::search_form::{FormField, SearchForm};
use crate::utils::logging::LogRingBuffer;
use crate::yank_manager::YankManager;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const LOG_PANEL_ENTRIES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppMode {
    Form,
    Results,
}

/// Finished search, sent back from the task that ran it
#[derive(Debug)]
pub struct SearchOutcome {
    pub request_id: u64,
    pub outcome: Result<SearchResponse, SearchError>,
}

pub struct TuiApp {
    config: Config,
    api_client: BusinessApiClient,
    runtime: Handle,
    form: SearchForm,
    page: PageController,
    table: Option<ResultsTable>,
    mode: AppMode,
    show_help: bool,
    show_logs: bool,
    should_quit: bool,
    status_message: String,
    launcher: Box<dyn ContactLauncher>,
    log_buffer: Option<LogRingBuffer>,
    outcome_tx: UnboundedSender<SearchOutcome>,
    outcome_rx: UnboundedReceiver<SearchOutcome>,
}

impl TuiApp {
    pub fn new(config: Config, api_url: &str, runtime: Handle) -> Self {
        Self::with_launcher(config, api_url, runtime, Box::new(SystemLauncher))
    }

    pub fn with_launcher(
        config: Config,
        api_url: &str,
        runtime: Handle,
        launcher: Box<dyn ContactLauncher>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        Self {
            form: SearchForm::new(&config.search),
            config,
            api_client: BusinessApiClient::new(api_url),
            runtime,
            page: PageController::new(),
            table: None,
            mode: AppMode::Form,
            show_help: false,
            show_logs: false,
            should_quit: false,
            status_message: format!(
                "Ready - enter an industry and a location, then press Enter ({})",
                api_url
            ),
            launcher,
            log_buffer: None,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn with_log_buffer(mut self, buffer: LogRingBuffer) -> Self {
        self.log_buffer = Some(buffer);
        self
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn page(&self) -> &PageController {
        &self.page
    }

    pub fn table(&self) -> Option<&ResultsTable> {
        self.table.as_ref()
    }

    pub fn table_mut(&mut self) -> Option<&mut ResultsTable> {
        self.table.as_mut()
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.drain_search_outcomes();
            terminal.draw(|f| self.ui(f))?;

            if event::poll(EVENT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate the form and start a search. Returns the ticket when a
    /// search was started; validation failures only update the status line.
    pub fn submit_search(&mut self) -> Option<SearchTicket> {
        let criteria = match self.form.submit() {
            Ok(criteria) => criteria,
            Err(e) => {
                self.status_message = e.message();
                return None;
            }
        };

        match self.page.begin_search(criteria) {
            Some(ticket) => {
                // The old table goes with the old results
                self.table = None;
                self.mode = AppMode::Form;
                self.status_message = format!("Searching for {}...", ticket.criteria.describe());
                Some(ticket)
            }
            None => {
                self.status_message = "A search is already running".to_string();
                None
            }
        }
    }

    fn spawn_search(&self, ticket: SearchTicket) {
        let client = self.api_client.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let outcome = client.search_businesses(&ticket.criteria).await;
            let _ = tx.send(SearchOutcome {
                request_id: ticket.request_id,
                outcome,
            });
        });
    }

    /// Apply every search outcome that has arrived since the last call
    pub fn drain_search_outcomes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.outcome_rx.try_recv() {
            self.apply_outcome(message.request_id, message.outcome);
            applied += 1;
        }
        applied
    }

    /// Feed one search outcome through the page controller and rebuild the
    /// table on success, which also drops any old selection
    pub fn apply_outcome(
        &mut self,
        request_id: u64,
        outcome: Result<SearchResponse, SearchError>,
    ) -> Completion {
        let completion = self.page.complete(request_id, outcome);
        match completion {
            Completion::Results => {
                if let PageState::Results(response) = self.page.state() {
                    let count = response.businesses.len();
                    self.table = Some(ResultsTable::new(response.clone()));
                    self.mode = AppMode::Results;
                    self.status_message = format!(
                        "Found {} business{} - Space select, a all, s export, c call, m email",
                        count,
                        if count == 1 { "" } else { "es" }
                    );
                }
            }
            Completion::Failed => {
                self.table = None;
                self.mode = AppMode::Form;
                if let Some(error) = self.page.error() {
                    self.status_message = format!("Search error: {}", error.message);
                }
            }
            Completion::Stale => {}
        }
        completion
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::F(5) => {
                self.show_logs = !self.show_logs;
                return;
            }
            KeyCode::Esc if self.show_help || self.show_logs => {
                self.show_help = false;
                self.show_logs = false;
                return;
            }
            _ => {}
        }

        match self.mode {
            AppMode::Form => self.handle_form_key(key),
            AppMode::Results => self.handle_results_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.table.is_some() {
                    self.mode = AppMode::Results;
                } else if !self.page.is_loading() {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => {
                if let Some(ticket) = self.submit_search() {
                    self.spawn_search(ticket);
                }
            }
            KeyCode::Tab => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::F(2) => self.form.toggle_advanced(),
            _ if self.page.is_loading() => {
                // Fields are read-only while a search runs
            }
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) && c.is_ascii_digit() => {
                let preset = c
                    .to_digit(10)
                    .and_then(|d| d.checked_sub(1))
                    .and_then(|index| self.form.quick_select(index as usize));
                if let Some(preset) = preset {
                    self.status_message = format!("Industry set to {}", preset);
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::PageUp | KeyCode::PageDown
                if self.form.focus() == FormField::Radius =>
            {
                let delta = match key.code {
                    KeyCode::Left => -1,
                    KeyCode::Right => 1,
                    KeyCode::PageDown => -10,
                    _ => 10,
                };
                self.form.adjust_radius(delta);
            }
            KeyCode::Left | KeyCode::Right if self.form.focus() == FormField::MaxResults => {
                self.form.cycle_max_results(key.code == KeyCode::Right);
            }
            KeyCode::Down if self.table.is_some() => self.mode = AppMode::Results,
            _ => {
                self.form.handle_input_event(&Event::Key(key));
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let Some(table) = self.table.as_mut() else {
            self.mode = AppMode::Form;
            return;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('/') => self.mode = AppMode::Form,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => table.previous_row(),
            KeyCode::Down | KeyCode::Char('j') => table.next_row(),
            KeyCode::PageUp => table.page_up(),
            KeyCode::PageDown => table.page_down(),
            KeyCode::Home | KeyCode::Char('g') => table.first_row(),
            KeyCode::End | KeyCode::Char('G') => table.last_row(),
            KeyCode::Char(' ') => {
                table.toggle_current();
                self.status_message = format!("{} selected", table.selection().count());
            }
            KeyCode::Char('a') => {
                table.toggle_all();
                self.status_message = format!("{} selected", table.selection().count());
            }
            KeyCode::Char('u') => {
                table.clear_selection();
                self.status_message = "Selection cleared".to_string();
            }
            KeyCode::Char('s') | KeyCode::Char('x') => {
                let dir = self.config.export_dir();
                self.status_message = match table.export_selected(&dir) {
                    Ok(summary) => summary.describe(),
                    Err(e) => format!("Export failed: {}", e),
                };
            }
            KeyCode::Char('c') => {
                if let Some(index) = table.cursor() {
                    if table.call(index, self.launcher.as_ref()) {
                        self.status_message = "Opening dialer...".to_string();
                    }
                }
            }
            KeyCode::Char('m') => {
                if let Some(index) = table.cursor() {
                    if table.email(index, self.launcher.as_ref()) {
                        self.status_message = "Opening mail client...".to_string();
                    }
                }
            }
            KeyCode::Char('y') => {
                if let Some(business) = table.current() {
                    self.status_message = match YankManager::yank_row(business) {
                        Ok(result) => format!("Yanked {}: {}", result.description, result.preview),
                        Err(e) => format!("Clipboard unavailable: {}", e),
                    };
                }
            }
            _ => {}
        }
    }

    pub fn ui(&mut self, f: &mut Frame) {
        let header_height = if self.form.show_advanced() { 6 } else { 5 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height), // Search header
                Constraint::Min(5),                // Results area
                Constraint::Length(1),             // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_body(f, chunks[1]);
        self.render_status(f, chunks[2]);

        if self.show_help {
            render_help_popup(f);
        } else if self.show_logs {
            self.render_log_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let inputs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(40),
                Constraint::Percentage(20),
            ])
            .split(rows[0]);

        let editing = self.mode == AppMode::Form && !self.page.is_loading();
        let field_style = |field: FormField| {
            if editing && self.form.focus() == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            }
        };

        let industry = Paragraph::new(self.form.industry())
            .style(field_style(FormField::Industry))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Industry (e.g., insurance brokers)"),
            );
        f.render_widget(industry, inputs[0]);

        let location = Paragraph::new(self.form.location())
            .style(field_style(FormField::Location))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Location (e.g., Toronto)"),
            );
        f.render_widget(location, inputs[1]);

        let search_label = if self.page.is_loading() {
            Span::styled("Searching...", Style::default().fg(Color::Magenta))
        } else {
            Span::styled("Enter = Search", Style::default().fg(Color::Green))
        };
        let count_title = match self.page.results_count() {
            Some(count) => format!("LeadScout - {} results", count),
            None => "LeadScout".to_string(),
        };
        let search_box = Paragraph::new(Line::from(search_label))
            .block(Block::default().borders(Borders::ALL).title(count_title));
        f.render_widget(search_box, inputs[2]);

        let mut presets = vec![Span::styled("Quick: ", Style::default().fg(Color::DarkGray))];
        for (i, name) in self.form.popular_industries().iter().enumerate().take(9) {
            presets.push(Span::styled(
                format!("[Alt+{}] {}  ", i + 1, name),
                Style::default().fg(Color::Cyan),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(presets)), rows[1]);

        if self.form.show_advanced() {
            let advanced = Line::from(vec![
                Span::styled("Advanced: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("Radius: {} km", self.form.radius_km()),
                    field_style(FormField::Radius),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("Max Results: {}", self.form.max_results()),
                    field_style(FormField::MaxResults),
                ),
                Span::styled(
                    "   (Tab to focus, ←/→ to adjust)",
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            f.render_widget(Paragraph::new(advanced), rows[2]);
        }

        if editing {
            if let Some(input) = self.form.focused_input() {
                let target = if self.form.focus() == FormField::Industry {
                    inputs[0]
                } else {
                    inputs[1]
                };
                let max_offset = target.width.saturating_sub(2);
                f.set_cursor_position((
                    target.x + (input.visual_cursor() as u16).min(max_offset) + 1,
                    target.y + 1,
                ));
            }
        }
    }

    fn render_body(&mut self, f: &mut Frame, area: Rect) {
        match self.page.state() {
            PageState::Submitting => {
                let mut lines = vec![Line::from(Span::styled(
                    "Searching for leads...",
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                if let Some(criteria) = self.page.last_criteria() {
                    lines.push(Line::from(format!(
                        "{} within {} km (up to {} results)",
                        criteria.describe(),
                        criteria.radius_km(),
                        criteria.max_results()
                    )));
                }
                lines.push(Line::from("This may take a few seconds"));
                let loading = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .wrap(Wrap { trim: true });
                f.render_widget(loading, area);
            }
            PageState::Error(error) => {
                let error_block = Paragraph::new(vec![
                    Line::from(Span::styled(
                        format!("{} Search Error", self.config.display.icons.error),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        error.message.clone(),
                        Style::default().fg(Color::Red),
                    )),
                ])
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red))
                        .title("Results"),
                )
                .wrap(Wrap { trim: true });
                f.render_widget(error_block, area);
            }
            PageState::Results(_) => {
                let focused = self.mode == AppMode::Results;
                let icons = &self.config.display.icons;
                let show_row_numbers = self.config.display.show_row_numbers;
                if let Some(table) = self.table.as_mut() {
                    table.render(f, area, icons, show_row_numbers, focused);
                }
            }
            PageState::Idle => {
                let welcome = Paragraph::new(vec![
                    Line::from(Span::styled(
                        "Ready to Find Your Next Leads?",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(
                        "Enter your target industry and location above to discover businesses with contact information.",
                    ),
                    Line::from(""),
                    Line::from("  Tab       - Switch field"),
                    Line::from("  Alt+1..9  - Quick-select an industry"),
                    Line::from("  F2        - Advanced options (radius, max results)"),
                    Line::from("  Enter     - Search"),
                    Line::from("  F1        - Help"),
                ])
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .wrap(Wrap { trim: true });
                f.render_widget(welcome, area);
            }
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let status_line = Line::from(vec![
            Span::styled(&self.status_message, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled(
                match self.mode {
                    AppMode::Form => "SEARCH",
                    AppMode::Results => "RESULTS",
                },
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | F1=Help | F5=Logs | Esc=Back/Exit"),
        ]);

        let status = Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, area);
    }

    fn render_log_popup(&self, f: &mut Frame) {
        let area = centered_rect(90, 70, f.area());
        f.render_widget(Clear, area);

        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = match &self.log_buffer {
            Some(buffer) => buffer
                .get_recent(LOG_PANEL_ENTRIES)
                .into_iter()
                .rev()
                .take(visible)
                .rev()
                .map(|entry| Line::from(entry.format_for_display()))
                .collect(),
            None => vec![Line::from("Logging is not attached to this session")],
        };

        let popup = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Logs (F5 to close)"),
        );
        f.render_widget(popup, area);
    }
}

fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(80, 70, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "LeadScout Help",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Search:"),
        Line::from("  Tab / Shift+Tab - Switch field"),
        Line::from("  Alt+1..9        - Quick-select industry"),
        Line::from("  F2              - Toggle advanced options"),
        Line::from("  ←/→ PgUp/PgDn   - Adjust radius / max results"),
        Line::from("  Enter           - Search"),
        Line::from("  Down            - Back to results"),
        Line::from(""),
        Line::from("Results:"),
        Line::from("  ↑↓ j/k g/G      - Navigate rows"),
        Line::from("  Space           - Toggle row selection"),
        Line::from("  a / u           - Select all (toggle) / clear selection"),
        Line::from("  s               - Export selected rows to CSV"),
        Line::from("  c / m           - Call / email the highlighted business"),
        Line::from("  y               - Copy contact details to clipboard"),
        Line::from("  Esc or /        - Back to search"),
        Line::from(""),
        Line::from("Global:"),
        Line::from("  F1 Help   F5 Logs   Ctrl+C Quit"),
    ];

    let help_popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });

    f.render_widget(help_popup, area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Run the interactive terminal UI until the user quits
pub fn run_tui(config: Config, api_url: &str, log_buffer: Option<LogRingBuffer>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(config, api_url, runtime.handle().clone());
    if let Some(buffer) = log_buffer {
        app = app.with_log_buffer(buffer);
    }
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Searches still in flight are abandoned
    runtime.shutdown_background();

    res
}
