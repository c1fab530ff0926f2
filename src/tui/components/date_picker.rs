//! Month-grid date picker overlay

use chrono::{Datelike, Duration, Months, NaiveDate};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;

pub const PICKER_WIDTH: u16 = 24;
pub const PICKER_HEIGHT: u16 = 11;

/// Weeks of a month, Monday first. `None` pads days outside the month.
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<u32>; 7]> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date,
        None => return Vec::new(),
    };
    let days_in_month = first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31);
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = offset;
    for day in 1..=days_in_month {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

/// Keyboard-driven calendar. The cursor is the day Enter would pick.
#[derive(Debug, Clone)]
pub struct DatePicker {
    cursor: NaiveDate,
}

impl DatePicker {
    pub fn new(initial: NaiveDate) -> Self {
        Self { cursor: initial }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn set_cursor(&mut self, date: NaiveDate) {
        self.cursor = date;
    }

    pub fn move_days(&mut self, days: i64) {
        if let Some(date) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.cursor = date;
        }
    }

    /// Same day next month, clamped to the month's last day.
    pub fn next_month(&mut self) {
        if let Some(date) = self.cursor.checked_add_months(Months::new(1)) {
            self.cursor = date;
        }
    }

    pub fn previous_month(&mut self) {
        if let Some(date) = self.cursor.checked_sub_months(Months::new(1)) {
            self.cursor = date;
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, picked: Option<NaiveDate>) {
        let mut lines = vec![Line::from(Span::styled(
            " Mo Tu We Th Fr Sa Su",
            Styles::title(),
        ))];

        for week in month_grid(self.cursor.year(), self.cursor.month()) {
            let mut spans = Vec::with_capacity(7);
            for day in week {
                let Some(day) = day else {
                    spans.push(Span::raw("   "));
                    continue;
                };
                let is_cursor = day == self.cursor.day();
                let is_picked = picked
                    .map(|p| p.year() == self.cursor.year() && p.month() == self.cursor.month() && p.day() == day)
                    .unwrap_or(false);

                let style = if is_cursor {
                    Styles::selected()
                } else if is_picked {
                    Styles::success().add_modifier(Modifier::UNDERLINED)
                } else {
                    Styles::default()
                };
                spans.push(Span::styled(format!("{:>3}", day), style));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(Span::styled(
            "Enter pick  Del clear",
            Styles::inactive(),
        )));

        let block = Block::default()
            .title(self.cursor.format(" %B %Y ").to_string())
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_grid_december_2024() {
        // 1 December 2024 is a Sunday
        let grid = month_grid(2024, 12);
        assert_eq!(grid[0], [None, None, None, None, None, None, Some(1)]);
        assert_eq!(grid[1][0], Some(2));
        let days: Vec<u32> = grid.iter().flatten().flatten().copied().collect();
        assert_eq!(days.len(), 31);
        assert_eq!(days.last(), Some(&31));
    }

    #[test]
    fn test_month_grid_leap_february() {
        let days = month_grid(2024, 2).iter().flatten().flatten().count();
        assert_eq!(days, 29);
        assert!(month_grid(2024, 13).is_empty());
    }

    #[test]
    fn test_cursor_movement() {
        let mut picker = DatePicker::new(date(2024, 12, 15));
        picker.move_days(-7);
        assert_eq!(picker.cursor(), date(2024, 12, 8));
        picker.move_days(24);
        assert_eq!(picker.cursor(), date(2025, 1, 1));
        picker.previous_month();
        assert_eq!(picker.cursor(), date(2024, 12, 1));
    }

    #[test]
    fn test_month_step_clamps_day() {
        let mut picker = DatePicker::new(date(2025, 1, 31));
        picker.next_month();
        assert_eq!(picker.cursor(), date(2025, 2, 28));
    }
}
