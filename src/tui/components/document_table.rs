//! Document table component for the verification screen

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::{
    models::Document,
    tui::ui::{fit_width, Styles},
    verification::VerificationView,
};

/// Configuration for document table display
#[derive(Debug, Clone)]
pub struct DocumentTableConfig {
    pub title: String,
    pub show_header: bool,
    pub max_declaration_len: usize,
    pub max_file_len: usize,
    pub max_type_len: usize,
}

impl Default for DocumentTableConfig {
    fn default() -> Self {
        Self {
            title: "Documents".to_string(),
            show_header: true,
            max_declaration_len: 13,
            max_file_len: 16,
            max_type_len: 14,
        }
    }
}

impl DocumentTableConfig {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

/// Cursor and paging over the visible rows of a [`VerificationView`].
///
/// The table does not own documents; row count comes from the view on every
/// call so the cursor follows re-filtering.
pub struct DocumentTable {
    pub state: ListState,
    pub config: DocumentTableConfig,
    pub current_page: usize,
    pub items_per_page: usize,
}

impl DocumentTable {
    pub fn new(config: DocumentTableConfig) -> Self {
        Self {
            state: ListState::default(),
            config,
            current_page: 0,
            items_per_page: 20,
        }
    }

    pub fn with_pagination(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page.max(1);
        self
    }

    /// Cursor position as an index into the visible rows.
    pub fn cursor(&self) -> Option<usize> {
        self.state
            .selected()
            .map(|idx| self.current_page * self.items_per_page + idx)
    }

    fn set_cursor(&mut self, absolute: usize) {
        self.current_page = absolute / self.items_per_page;
        self.state.select(Some(absolute % self.items_per_page));
    }

    /// Keep the cursor on an existing row after the row count changed.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.current_page = 0;
            self.state.select(None);
            return;
        }
        let cursor = self.cursor().unwrap_or(0).min(len - 1);
        self.set_cursor(cursor);
    }

    /// Get total number of pages
    pub fn get_total_pages(&self, len: usize) -> usize {
        if len == 0 {
            1
        } else {
            (len + self.items_per_page - 1) / self.items_per_page
        }
    }

    pub fn navigate_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let cursor = self.cursor().unwrap_or(0);
        self.set_cursor(if cursor == 0 { len - 1 } else { cursor - 1 });
    }

    pub fn navigate_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let cursor = self.cursor().map(|c| c + 1).unwrap_or(0);
        self.set_cursor(if cursor >= len { 0 } else { cursor });
    }

    /// Navigate to next page
    pub fn next_page(&mut self, len: usize) {
        if self.current_page + 1 < self.get_total_pages(len) {
            self.set_cursor((self.current_page + 1) * self.items_per_page);
        }
    }

    /// Navigate to previous page
    pub fn previous_page(&mut self, len: usize) {
        if self.current_page > 0 && len > 0 {
            self.set_cursor((self.current_page - 1) * self.items_per_page);
        }
    }

    fn header(&self) -> Line<'static> {
        let cfg = &self.config;
        Line::from(vec![
            Span::styled("Sel  ", Styles::title()),
            Span::styled("│ ", Styles::title()),
            Span::styled(fit_width("Declaration No.", cfg.max_declaration_len), Styles::title()),
            Span::styled(" │ ", Styles::title()),
            Span::styled(fit_width("File Name", cfg.max_file_len), Styles::title()),
            Span::styled(" │ ", Styles::title()),
            Span::styled(fit_width("Updated", 10), Styles::title()),
            Span::styled(" │ ", Styles::title()),
            Span::styled(fit_width("Document Type", cfg.max_type_len), Styles::title()),
            Span::styled(" │ ", Styles::title()),
            Span::styled("Actions", Styles::title()),
        ])
    }

    fn row(&self, doc: &Document, checked: bool, highlighted: bool) -> Line<'static> {
        let cfg = &self.config;
        let base = if highlighted {
            Styles::selected()
        } else {
            Style::default()
        };

        let marker = match (doc.action, checked) {
            (Some(_), _) => "  -  ",
            (None, true) => " [x] ",
            (None, false) => " [ ] ",
        };

        let mut spans = vec![
            Span::styled(marker, base),
            Span::styled("│ ", base),
            Span::styled(
                fit_width(doc.declaration_number.as_str(), cfg.max_declaration_len),
                base,
            ),
            Span::styled(" │ ", base),
            Span::styled(fit_width(doc.file_label(), cfg.max_file_len), base),
            Span::styled(" │ ", base),
            Span::styled(doc.updated_date.format("%Y-%m-%d").to_string(), base),
            Span::styled(" │ ", base),
            Span::styled(fit_width(doc.document_type.as_str(), cfg.max_type_len), base),
            Span::styled(" │ ", base),
        ];

        match doc.action {
            Some(action) => {
                spans.push(Span::styled(action.to_string(), Styles::action_badge(action)));
                spans.push(Span::styled(" (u: reset)", Styles::inactive()));
            }
            None => spans.push(Span::styled("-", Styles::inactive())),
        }

        Line::from(spans)
    }

    /// Render the visible rows of `view`
    pub fn render(&mut self, f: &mut Frame, area: Rect, view: &VerificationView, focused: bool) {
        let len = view.visible_len();
        self.clamp(len);

        let start = self.current_page * self.items_per_page;
        let end = std::cmp::min(start + self.items_per_page, len);

        let mut items = Vec::new();
        if self.config.show_header {
            items.push(ListItem::new(self.header()));
        }

        for absolute in start..end {
            if let Some(doc) = view.visible_row(absolute) {
                let highlighted = focused && self.cursor() == Some(absolute);
                let checked = view.is_row_selected(absolute);
                items.push(ListItem::new(self.row(doc, checked, highlighted)));
            }
        }

        let title = if len == 0 {
            format!("{} (No documents match the current filters)", self.config.title)
        } else {
            format!(
                "{} ({} of {} - {} selected - Page {}/{})",
                self.config.title,
                len,
                view.documents().len(),
                view.selection().len(),
                self.current_page + 1,
                self.get_total_pages(len)
            )
        };

        let border_style = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        // Highlighting is done per row above; the widget state is only kept
        // for the cursor position.
        f.render_widget(list, area);
    }
}
