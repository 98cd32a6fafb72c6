use crate::config::config::IconConfig;
use crate::contact_launcher::{launch_best_effort, mailto_uri, tel_uri, ContactLauncher};
use crate::data::business::{Business, SearchResponse};
use crate::data::data_exporter::{DataExporter, ExportSummary};
use crate::data::selection::SelectionSet;
use anyhow::Result;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use std::path::Path;

pub const NO_RESULTS_MESSAGE: &str = "No businesses found. Try a different search.";

const PAGE_SIZE: usize = 10;

/// Contact shortcuts a row offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowActions {
    pub can_call: bool,
    pub can_email: bool,
}

/// Results of one search: rows in server order, a highlight cursor and the
/// selection used for export. A new response always gets a new table.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    query: String,
    businesses: Vec<Business>,
    selection: SelectionSet,
    table_state: TableState,
}

impl ResultsTable {
    pub fn new(response: SearchResponse) -> Self {
        let mut table_state = TableState::default();
        if !response.businesses.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            query: response.query,
            selection: SelectionSet::new(response.businesses.len()),
            businesses: response.businesses,
            table_state,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn cursor(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn current(&self) -> Option<&Business> {
        self.cursor().and_then(|i| self.businesses.get(i))
    }

    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.selection.toggle(index)
    }

    pub fn toggle_current(&mut self) -> Option<bool> {
        let index = self.cursor()?;
        self.toggle(index)
    }

    pub fn toggle_all(&mut self) {
        self.selection.toggle_all();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn row_actions(&self, index: usize) -> RowActions {
        self.businesses
            .get(index)
            .map(|b| RowActions {
                can_call: b.callable_phone().is_some(),
                can_email: b.mailable_email().is_some(),
            })
            .unwrap_or_default()
    }

    /// CSV text of the selected rows, in table order
    pub fn export_csv(&self) -> Result<String> {
        DataExporter::selected_to_csv(&self.businesses, &self.selection)
    }

    /// Write the selected rows to a new file in `dir`
    pub fn export_selected(&self, dir: &Path) -> Result<ExportSummary> {
        DataExporter::export_selected(&self.businesses, &self.selection, dir)
    }

    /// Hand the row's phone number to the dialer. Returns whether a handoff
    /// was attempted; the outcome of the handoff itself is not observed.
    pub fn call(&self, index: usize, launcher: &dyn ContactLauncher) -> bool {
        match self.businesses.get(index).and_then(|b| b.callable_phone()) {
            Some(phone) => {
                launch_best_effort(launcher, &tel_uri(phone));
                true
            }
            None => false,
        }
    }

    /// Hand the row's email address to the mail client
    pub fn email(&self, index: usize, launcher: &dyn ContactLauncher) -> bool {
        match self.businesses.get(index).and_then(|b| b.mailable_email()) {
            Some(email) => {
                launch_best_effort(launcher, &mailto_uri(email));
                true
            }
            None => false,
        }
    }

    pub fn next_row(&mut self) {
        self.move_cursor(|current, len| if current + 1 < len { current + 1 } else { 0 });
    }

    pub fn previous_row(&mut self) {
        self.move_cursor(|current, len| if current > 0 { current - 1 } else { len - 1 });
    }

    pub fn page_down(&mut self) {
        self.move_cursor(|current, len| (current + PAGE_SIZE).min(len - 1));
    }

    pub fn page_up(&mut self) {
        self.move_cursor(|current, _| current.saturating_sub(PAGE_SIZE));
    }

    pub fn first_row(&mut self) {
        self.move_cursor(|_, _| 0);
    }

    pub fn last_row(&mut self) {
        self.move_cursor(|_, len| len - 1);
    }

    fn move_cursor(&mut self, step: impl Fn(usize, usize) -> usize) {
        let len = self.businesses.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(step(current, len)));
    }

    /// Draw the table, or the "no results" state when there are no rows
    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        icons: &IconConfig,
        show_row_numbers: bool,
        focused: bool,
    ) {
        if self.businesses.is_empty() {
            let no_data = Paragraph::new(NO_RESULTS_MESSAGE)
                .style(Style::default().fg(Color::Gray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Search Results: {}", self.query)),
                )
                .wrap(Wrap { trim: true });
            f.render_widget(no_data, area);
            return;
        }

        let mut headers = vec!["", "Business Name", "Phone", "Email", "Address", "Rating", "Actions"];
        if show_row_numbers {
            headers.insert(0, "#");
        }
        let header = Row::new(headers.into_iter().map(|h| {
            Cell::from(h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .height(1)
        .bottom_margin(1);

        let rows: Vec<Row> = self
            .businesses
            .iter()
            .enumerate()
            .map(|(index, business)| {
                let mut cells = Vec::with_capacity(8);
                if show_row_numbers {
                    cells.push(Cell::from((index + 1).to_string()));
                }
                let marker = if self.selection.contains(index) {
                    icons.selected.as_str()
                } else {
                    icons.unselected.as_str()
                };
                cells.push(Cell::from(marker.to_string()));
                cells.push(Cell::from(business.name.clone()));
                cells.push(Cell::from(display_or_dash(business.phone.as_deref())));
                cells.push(Cell::from(display_or_dash(business.email.as_deref())));
                cells.push(Cell::from(display_or_dash(business.address.as_deref())));
                cells.push(Cell::from(match business.rating {
                    Some(rating) if rating > 0.0 => format!("{} {}", icons.rating, rating),
                    _ => "-".to_string(),
                }));
                cells.push(Cell::from(action_label(self.row_actions(index), icons)));

                let style = if self.selection.contains(index) {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                Row::new(cells).style(style).height(1)
            })
            .collect();

        let mut widths = vec![
            Constraint::Length(3),
            Constraint::Percentage(22),
            Constraint::Length(16),
            Constraint::Percentage(20),
            Constraint::Percentage(26),
            Constraint::Length(8),
            Constraint::Length(14),
        ];
        if show_row_numbers {
            widths.insert(0, Constraint::Length(4));
        }

        let count = self.businesses.len();
        let title = format!(
            "Search Results: {} - {} business{} ({} selected)",
            self.query,
            count,
            if count == 1 { "" } else { "es" },
            self.selection.count()
        );
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }
}

fn display_or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn action_label(actions: RowActions, icons: &IconConfig) -> String {
    let mut parts = Vec::new();
    if actions.can_call {
        parts.push(icons.call.as_str());
    }
    if actions.can_email {
        parts.push(icons.email.as_str());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact_launcher::testing::RecordingLauncher;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn scenario_response() -> SearchResponse {
        let mut a = Business::new("A");
        a.phone = Some("555-1".to_string());
        let mut b = Business::new("B");
        b.email = Some("b@x.com".to_string());
        SearchResponse {
            query: "plumbers in Toronto".to_string(),
            total_results: 2,
            businesses: vec![a, b],
        }
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_to_text(table: &mut ResultsTable) -> String {
        let backend = TestBackend::new(140, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                table.render(f, area, &IconConfig::simple(), false, true)
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_row_actions_follow_contact_fields() {
        let table = ResultsTable::new(scenario_response());
        assert_eq!(
            table.row_actions(0),
            RowActions {
                can_call: true,
                can_email: false
            }
        );
        assert_eq!(
            table.row_actions(1),
            RowActions {
                can_call: false,
                can_email: true
            }
        );
        assert_eq!(table.row_actions(7), RowActions::default());
    }

    #[test]
    fn test_export_of_second_row_only() {
        let mut table = ResultsTable::new(scenario_response());
        table.toggle(1);
        assert_eq!(
            table.export_csv().unwrap(),
            "Name,Phone,Email,Address,Rating,Reviews\nB,,b@x.com,,,"
        );
    }

    #[test]
    fn test_select_all_exports_every_row_in_order() {
        let mut table = ResultsTable::new(scenario_response());
        table.toggle_all();
        let csv = table.export_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "A,555-1,,,,");
        assert_eq!(lines[2], "B,,b@x.com,,,");
    }

    #[test]
    fn test_call_and_email_do_not_touch_selection_or_cursor() {
        let mut table = ResultsTable::new(scenario_response());
        table.toggle(1);
        table.next_row();
        let launcher = RecordingLauncher::default();

        assert!(table.call(0, &launcher));
        assert!(!table.email(0, &launcher));
        assert!(table.email(1, &launcher));
        assert!(!table.call(1, &launcher));

        assert_eq!(
            launcher.opened.borrow().as_slice(),
            ["tel:555-1".to_string(), "mailto:b@x.com".to_string()]
        );
        assert_eq!(table.selection().indices(), vec![1]);
        assert_eq!(table.cursor(), Some(1));
    }

    #[test]
    fn test_failed_handoff_is_silent() {
        let table = ResultsTable::new(scenario_response());
        let launcher = RecordingLauncher {
            fail: true,
            ..Default::default()
        };
        assert!(table.call(0, &launcher));
        assert_eq!(table.selection().count(), 0);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut table = ResultsTable::new(scenario_response());
        assert_eq!(table.cursor(), Some(0));
        table.previous_row();
        assert_eq!(table.cursor(), Some(1));
        table.next_row();
        assert_eq!(table.cursor(), Some(0));
        table.last_row();
        assert_eq!(table.current().unwrap().name, "B");
    }

    #[test]
    fn test_toggle_current_row() {
        let mut table = ResultsTable::new(scenario_response());
        table.next_row();
        assert_eq!(table.toggle_current(), Some(true));
        assert_eq!(table.selection().indices(), vec![1]);
    }

    #[test]
    fn test_renders_rows_in_order_with_actions() {
        let mut table = ResultsTable::new(scenario_response());
        let text = render_to_text(&mut table);

        assert!(text.contains("Search Results: plumbers in Toronto"));
        let a_pos = text.find("555-1").unwrap();
        let b_pos = text.find("b@x.com").unwrap();
        assert!(a_pos < b_pos);
        assert!(text.contains("Call"));
        assert!(text.contains("Email"));
        assert!(!text.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_empty_results_render_no_results_state() {
        let mut table = ResultsTable::new(SearchResponse {
            query: "yodelers in Reno".to_string(),
            total_results: 0,
            businesses: vec![],
        });
        assert_eq!(table.cursor(), None);

        let text = render_to_text(&mut table);
        assert!(text.contains(NO_RESULTS_MESSAGE));
        assert!(!text.contains("Business Name"));
    }
}
