//! Verify Document screen

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    models::{ActionType, Document},
    tui::{
        components::{
            date_picker::{PICKER_HEIGHT, PICKER_WIDTH},
            DatePicker, DocumentTable, DocumentTableConfig,
        },
        traits::{Screen as ScreenView, ScreenAction},
        ui::{anchored_rect, InputField, SelectableList, Styles},
    },
    verification::{ActionPolicy, Disclosure, TypeFilter, VerificationView},
};

/// Page size until the first frame fits it to the terminal height.
const INITIAL_ROWS_PER_PAGE: usize = 10;

/// Which part of the screen receives keys when no overlay is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerifyFocus {
    Declaration,
    Suggestions,
    Table,
}

/// Verify screen state
pub struct VerifyScreen {
    pub view: VerificationView,
    pub declaration_input: InputField,
    pub focus: VerifyFocus,
    pub suggestion_state: ListState,
    pub table: DocumentTable,
    pub date_picker: DatePicker,
    pub type_options: SelectableList<TypeFilter>,
    /// Where the last frame put the filter bar, for anchoring overlays.
    filter_bar_area: Rect,
    /// Calendar or dropdown area of the last frame, while one is open.
    overlay_area: Option<Rect>,
}

impl VerifyScreen {
    pub fn new(policy: ActionPolicy) -> Self {
        let mut screen = Self {
            view: VerificationView::new(Vec::new(), policy),
            declaration_input: InputField::new("Declaration Number")
                .with_placeholder("Enter 13-digit DecNum"),
            focus: VerifyFocus::Table,
            suggestion_state: ListState::default(),
            table: DocumentTable::new(DocumentTableConfig::new("Verify Document"))
                .with_pagination(INITIAL_ROWS_PER_PAGE),
            date_picker: DatePicker::new(Local::now().date_naive()),
            type_options: SelectableList::new(TypeFilter::options()),
            filter_bar_area: Rect::default(),
            overlay_area: None,
        };
        screen.update_focus();
        screen
    }

    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.view.replace_documents(documents);
        self.table.clamp(self.view.visible_len());
    }

    fn update_focus(&mut self) {
        self.declaration_input
            .set_focus(self.focus == VerifyFocus::Declaration);
    }

    fn focus_on(&mut self, focus: VerifyFocus) {
        self.focus = focus;
        if focus == VerifyFocus::Suggestions {
            self.suggestion_state.select(Some(0));
        }
        self.update_focus();
    }

    fn after_refilter(&mut self) {
        self.table.clamp(self.view.visible_len());
    }

    fn on_declaration_edited(&mut self) {
        let value = self.declaration_input.value.clone();
        self.view.type_declaration(&value);
        self.after_refilter();
    }

    fn select_suggestion(&mut self, suggestion: String) -> ScreenAction {
        self.declaration_input.set_value(&suggestion);
        self.view.select_suggestion(&suggestion);
        self.after_refilter();
        self.focus_on(VerifyFocus::Table);
        ScreenAction::SetStatus(format!("Declaration number: {}", suggestion))
    }

    fn open_calendar(&mut self) {
        let start = self
            .view
            .filters()
            .date
            .or_else(|| {
                self.table
                    .cursor()
                    .and_then(|i| self.view.visible_row(i))
                    .map(|doc| doc.updated_date)
            })
            .unwrap_or_else(|| Local::now().date_naive());
        self.date_picker.set_cursor(start);
        self.view.toggle_calendar();
    }

    fn open_type_dropdown(&mut self) {
        let current = self.view.filters().document_type.clone();
        let index = self
            .type_options
            .items
            .iter()
            .position(|option| *option == current)
            .unwrap_or(0);
        self.type_options.select(Some(index));
        self.view.toggle_type_dropdown();
    }

    fn pick_date(&mut self, date: Option<NaiveDate>) -> ScreenAction {
        self.view.pick_date(date);
        self.after_refilter();
        match date {
            Some(date) => ScreenAction::SetStatus(format!(
                "Updated date = {} ({} documents)",
                date.format("%Y-%m-%d"),
                self.view.visible_len()
            )),
            None => ScreenAction::SetStatus("Date filter cleared".to_string()),
        }
    }

    fn apply_action(&mut self, action: ActionType) -> ScreenAction {
        let stamped = self.view.apply(action);
        self.after_refilter();
        if stamped.is_empty() {
            return ScreenAction::SetStatus("No documents selected".to_string());
        }
        ScreenAction::RecordAction {
            declaration_numbers: stamped,
            action,
        }
    }

    /// Mouse press at `column`/`row`. A press outside the open overlay
    /// dismisses it.
    pub fn handle_click(&mut self, column: u16, row: u16) {
        if self.view.disclosure().is_closed() {
            return;
        }
        let inside = self
            .overlay_area
            .map(|a| column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height)
            .unwrap_or(false);
        if !inside {
            self.view.dismiss_overlays();
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Left => self.date_picker.move_days(-1),
            KeyCode::Right => self.date_picker.move_days(1),
            KeyCode::Up => self.date_picker.move_days(-7),
            KeyCode::Down => self.date_picker.move_days(7),
            KeyCode::PageUp => self.date_picker.previous_month(),
            KeyCode::PageDown => self.date_picker.next_month(),
            KeyCode::Enter => return self.pick_date(Some(self.date_picker.cursor())),
            KeyCode::Delete | KeyCode::Backspace => return self.pick_date(None),
            KeyCode::Char('c') => self.view.toggle_calendar(),
            KeyCode::Char('t') => self.open_type_dropdown(),
            // Anything else is an interaction outside the overlay
            _ => self.view.dismiss_overlays(),
        }
        ScreenAction::None
    }

    fn handle_dropdown_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.type_options.previous(),
            KeyCode::Down => self.type_options.next(),
            KeyCode::Enter => {
                let picked = self.type_options.selected().cloned().unwrap_or_default();
                self.view.pick_document_type(picked.clone());
                self.after_refilter();
                return ScreenAction::SetStatus(format!(
                    "Document type = {} ({} documents)",
                    picked,
                    self.view.visible_len()
                ));
            }
            KeyCode::Char('t') => self.view.toggle_type_dropdown(),
            KeyCode::Char('c') => self.open_calendar(),
            _ => self.view.dismiss_overlays(),
        }
        ScreenAction::None
    }

    fn handle_declaration_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Char(c) => {
                self.declaration_input.insert_char(c);
                self.on_declaration_edited();
            }
            KeyCode::Backspace => {
                self.declaration_input.delete_char();
                self.on_declaration_edited();
            }
            KeyCode::Delete => {
                self.declaration_input.delete_char_forward();
                self.on_declaration_edited();
            }
            KeyCode::Left => self.declaration_input.move_cursor_left(),
            KeyCode::Right => self.declaration_input.move_cursor_right(),
            KeyCode::Home => self.declaration_input.move_cursor_to_start(),
            KeyCode::End => self.declaration_input.move_cursor_to_end(),
            KeyCode::Down if !self.view.suggestions().is_empty() => {
                self.focus_on(VerifyFocus::Suggestions);
            }
            KeyCode::Down | KeyCode::Tab | KeyCode::Enter => self.focus_on(VerifyFocus::Table),
            KeyCode::Esc => {
                if self.view.suggestions().is_empty() {
                    self.focus_on(VerifyFocus::Table);
                } else {
                    self.view.clear_suggestions();
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_suggestion_key(&mut self, key: KeyEvent) -> ScreenAction {
        let count = self.view.suggestions().len();
        if count == 0 {
            self.focus_on(VerifyFocus::Declaration);
            return ScreenAction::None;
        }

        let selected = self.suggestion_state.selected().unwrap_or(0).min(count - 1);
        match key.code {
            KeyCode::Up if selected == 0 => self.focus_on(VerifyFocus::Declaration),
            KeyCode::Up => self.suggestion_state.select(Some(selected - 1)),
            KeyCode::Down => self.suggestion_state.select(Some((selected + 1) % count)),
            KeyCode::Enter => {
                let suggestion = self.view.suggestions()[selected].clone();
                return self.select_suggestion(suggestion);
            }
            _ => self.focus_on(VerifyFocus::Declaration),
        }
        ScreenAction::None
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> ScreenAction {
        let len = self.view.visible_len();
        match key.code {
            KeyCode::Up => self.table.navigate_up(len),
            KeyCode::Down => self.table.navigate_down(len),
            KeyCode::Left | KeyCode::PageUp => self.table.previous_page(len),
            KeyCode::Right | KeyCode::PageDown => self.table.next_page(len),
            KeyCode::Char(' ') => {
                if let Some(cursor) = self.table.cursor() {
                    let stamped = self
                        .view
                        .visible_row(cursor)
                        .map(|doc| doc.is_stamped())
                        .unwrap_or(false);
                    if stamped {
                        return ScreenAction::SetStatus(
                            "Row already has an action; press u to reset it".to_string(),
                        );
                    }
                    self.view.toggle_row(cursor);
                    return ScreenAction::SetStatus(format!(
                        "{} selected",
                        self.view.selection().len()
                    ));
                }
            }
            KeyCode::Char('a') => return self.apply_action(ActionType::Approved),
            KeyCode::Char('x') => return self.apply_action(ActionType::Rejected),
            KeyCode::Char('u') => {
                if let Some(cursor) = self.table.cursor() {
                    if let Some(id) = self.view.reset_row(cursor) {
                        self.after_refilter();
                        return ScreenAction::SetStatus(format!("Action reset for {}", id));
                    }
                }
            }
            KeyCode::Char('c') => self.open_calendar(),
            KeyCode::Char('t') => self.open_type_dropdown(),
            KeyCode::Char('/') | KeyCode::Tab => self.focus_on(VerifyFocus::Declaration),
            KeyCode::Char('f') => {
                self.declaration_input.clear();
                self.view.clear_filters();
                self.after_refilter();
                return ScreenAction::SetStatus("Filters cleared".to_string());
            }
            KeyCode::Char('r') => return ScreenAction::ReloadDocuments,
            KeyCode::Char('L') => return ScreenAction::Logout,
            KeyCode::Char('q') => return ScreenAction::Quit,
            KeyCode::Enter => {
                if let Some(doc) = self.table.cursor().and_then(|i| self.view.visible_row(i)) {
                    let location = doc.download_url.as_deref().unwrap_or("N/A");
                    return ScreenAction::SetStatus(format!(
                        "{} - {}: {}",
                        doc.declaration_number,
                        doc.file_label(),
                        location
                    ));
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn draw_filter_bar(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        self.declaration_input.render(f, chunks[0]);

        let filters = self.view.filters();
        let date_label = filters
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "any".to_string());

        let summary = Line::from(vec![
            Span::styled("Updated: ", Styles::title()),
            Span::raw(date_label),
            Span::styled("  Type: ", Styles::title()),
            Span::raw(filters.document_type.to_string()),
            Span::styled(format!("  [{}]", self.view.policy()), Styles::inactive()),
        ]);

        let block = Block::default()
            .title("Filters (c: calendar, t: type)")
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());
        f.render_widget(Paragraph::new(summary).block(block), chunks[1]);
    }

    fn draw_suggestions(&mut self, f: &mut Frame, input_area: Rect, bounds: Rect) {
        let suggestions = self.view.suggestions();
        if suggestions.is_empty() {
            return;
        }

        let height = (suggestions.len() as u16).min(8) + 2;
        let anchor = Rect {
            y: input_area.y + input_area.height,
            ..input_area
        };
        let area = anchored_rect(anchor, input_area.width, height, bounds);

        let focused = self.focus == VerifyFocus::Suggestions;
        let items: Vec<ListItem> = suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let style = if focused && self.suggestion_state.selected() == Some(i) {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                ListItem::new(Span::styled(s.clone(), style))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Suggestions")
                .borders(Borders::ALL)
                .border_style(Styles::info()),
        );

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.suggestion_state);
    }

    fn draw_type_dropdown(&mut self, f: &mut Frame, bounds: Rect) {
        let height = self.type_options.len() as u16 + 2;
        let anchor = Rect {
            x: self.filter_bar_area.x + self.filter_bar_area.width / 2,
            y: self.filter_bar_area.y + self.filter_bar_area.height,
            ..self.filter_bar_area
        };
        let area = anchored_rect(anchor, 20, height, bounds);
        self.overlay_area = Some(area);

        let selected = self.type_options.state.selected();
        let items: Vec<ListItem> = self
            .type_options
            .items
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let style = if selected == Some(i) {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                ListItem::new(Span::styled(option.to_string(), style))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Document Type")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.type_options.state);
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let instructions = vec![
            Line::from("↑/↓: Navigate | Space: Select | a: Approve | x: Reject | u: Reset action"),
            Line::from("/: Declaration search | c: Calendar | t: Type | f: Clear filters | r: Reload | L: Logout"),
        ];

        let widget = Paragraph::new(instructions).style(Styles::info()).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(widget, area);
    }
}

impl ScreenView for VerifyScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        let action = match self.view.disclosure() {
            Disclosure::CalendarOpen => self.handle_calendar_key(key),
            Disclosure::DropdownOpen => self.handle_dropdown_key(key),
            Disclosure::Closed => match self.focus {
                VerifyFocus::Declaration => self.handle_declaration_key(key),
                VerifyFocus::Suggestions => self.handle_suggestion_key(key),
                VerifyFocus::Table => self.handle_table_key(key),
            },
        };
        Ok(action)
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Declaration input and filter summary
                Constraint::Min(0),    // Table
                Constraint::Length(4), // Instructions
            ])
            .split(area);

        self.filter_bar_area = chunks[0];
        self.overlay_area = None;
        self.draw_filter_bar(f, chunks[0]);

        let table_focused = self.focus == VerifyFocus::Table && self.view.disclosure().is_closed();
        let rows = chunks[1].height.saturating_sub(3).max(1) as usize;
        if rows != self.table.items_per_page {
            let cursor = self.table.cursor();
            self.table.items_per_page = rows;
            if let Some(cursor) = cursor {
                self.table.current_page = cursor / rows;
                self.table.state.select(Some(cursor % rows));
            }
        }
        self.table.render(f, chunks[1], &self.view, table_focused);

        self.draw_instructions(f, chunks[2]);

        let input_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0])[0];
        if self.view.disclosure().is_closed() {
            self.draw_suggestions(f, input_area, area);
        }

        match self.view.disclosure() {
            Disclosure::CalendarOpen => {
                let anchor = Rect {
                    x: self.filter_bar_area.x + self.filter_bar_area.width / 2,
                    y: self.filter_bar_area.y + self.filter_bar_area.height,
                    ..self.filter_bar_area
                };
                let picker_area = anchored_rect(anchor, PICKER_WIDTH, PICKER_HEIGHT, area);
                self.overlay_area = Some(picker_area);
                self.date_picker.render(f, picker_area, self.view.filters().date);
            }
            Disclosure::DropdownOpen => self.draw_type_dropdown(f, area),
            Disclosure::Closed => {}
        }
    }

    fn captures_text(&self) -> bool {
        self.focus == VerifyFocus::Declaration && self.view.disclosure().is_closed()
    }

    fn help_text(&self) -> &'static str {
        "Verify Document:\n\
        ↑/↓ - Navigate rows, ←/→ - Pages\n\
        Space - Select / unselect row\n\
        a - Approve selected, x - Reject selected\n\
        u - Reset the action of the current row\n\
        / or Tab - Declaration number search (↓ into suggestions)\n\
        c - Calendar (Enter pick, Del clear)\n\
        t - Document type dropdown\n\
        f - Clear filters, r - Reload documents\n\
        L - Logout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclarationNumber, DocumentType};
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen() -> VerifyScreen {
        let mut screen = VerifyScreen::new(ActionPolicy::RetainWithBadge);
        screen.set_documents(vec![
            Document::new(
                "1234567890123",
                "IN-345",
                NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
                DocumentType::Invoice,
            ),
            Document::new(
                "9876543210123",
                "DE-446",
                NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
                DocumentType::Declaration,
            ),
            Document::new(
                "1112233445566",
                "PL-12",
                NaiveDate::from_ymd_opt(2024, 12, 8).unwrap(),
                DocumentType::PackingList,
            ),
        ]);
        screen
    }

    fn press(screen: &mut VerifyScreen, code: KeyCode) -> ScreenAction {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_select_and_approve_first_row() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Char(' '));
        assert_eq!(
            press(&mut screen, KeyCode::Char('a')),
            ScreenAction::RecordAction {
                declaration_numbers: vec![DeclarationNumber::from("1234567890123")],
                action: ActionType::Approved,
            }
        );
        assert!(screen.view.selection().is_empty());

        press(&mut screen, KeyCode::Char('u'));
        assert_eq!(screen.view.visible_row(0).unwrap().action, None);
    }

    #[test]
    fn test_reject_without_selection_only_reports() {
        let mut screen = screen();
        assert_eq!(
            press(&mut screen, KeyCode::Char('x')),
            ScreenAction::SetStatus("No documents selected".to_string())
        );
    }

    #[test]
    fn test_typing_and_picking_suggestion() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Char('/'));
        assert!(screen.captures_text());
        press(&mut screen, KeyCode::Char('1'));
        press(&mut screen, KeyCode::Char('1'));
        assert_eq!(screen.view.suggestions(), ["1112233445566"]);

        press(&mut screen, KeyCode::Down);
        assert_eq!(screen.focus, VerifyFocus::Suggestions);
        press(&mut screen, KeyCode::Enter);

        assert_eq!(screen.declaration_input.value, "1112233445566");
        assert!(screen.view.suggestions().is_empty());
        assert_eq!(screen.view.visible_len(), 1);
        assert_eq!(screen.focus, VerifyFocus::Table);
    }

    #[test]
    fn test_overlays_are_exclusive_and_dismissed_outside() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Char('c'));
        assert!(screen.view.disclosure().is_calendar_open());

        press(&mut screen, KeyCode::Char('t'));
        assert!(screen.view.disclosure().is_dropdown_open());

        press(&mut screen, KeyCode::Esc);
        assert!(screen.view.disclosure().is_closed());
    }

    #[test]
    fn test_calendar_pick_filters_by_date() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Down); // cursor on 2024-12-10
        press(&mut screen, KeyCode::Char('c'));
        assert_eq!(screen.date_picker.cursor(), NaiveDate::from_ymd_opt(2024, 12, 10).unwrap());
        press(&mut screen, KeyCode::Enter);

        assert!(screen.view.disclosure().is_closed());
        assert_eq!(screen.view.visible_len(), 1);

        press(&mut screen, KeyCode::Char('c'));
        press(&mut screen, KeyCode::Delete);
        assert_eq!(screen.view.visible_len(), 3);
    }

    #[test]
    fn test_type_dropdown_pick() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Char('t'));
        press(&mut screen, KeyCode::Down); // Declaration
        press(&mut screen, KeyCode::Down); // Invoice
        press(&mut screen, KeyCode::Enter);
        assert_eq!(screen.view.filters().document_type, TypeFilter::from("Invoice"));
        assert_eq!(screen.view.visible_len(), 1);
    }

    #[test]
    fn test_click_outside_overlay_dismisses_it() {
        let mut screen = screen();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        press(&mut screen, KeyCode::Char('t'));
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();
        let area = screen.overlay_area.unwrap();

        screen.handle_click(area.x + 1, area.y + 1);
        assert!(screen.view.disclosure().is_dropdown_open());

        screen.handle_click(0, 0);
        assert!(screen.view.disclosure().is_closed());
    }

    #[test]
    fn test_first_frame_fits_page_to_height() {
        let mut screen = screen();
        assert_eq!(screen.table.items_per_page, INITIAL_ROWS_PER_PAGE);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();
        // 30 rows minus filter bar (3), instructions (4), borders and header (3)
        assert_eq!(screen.table.items_per_page, 20);
    }

    #[test]
    fn test_draw_does_not_panic_with_overlays() {
        let mut screen = screen();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();

        press(&mut screen, KeyCode::Char('c'));
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();

        press(&mut screen, KeyCode::Char('t'));
        terminal.draw(|f| screen.draw(f, f.size())).unwrap();
    }
}
