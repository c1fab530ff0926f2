//! Login screen: credentials, then OTP

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    auth::LoginFlow,
    tui::{
        traits::{Screen as ScreenView, ScreenAction},
        ui::{centered_rect, InputField, Styles},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginField {
    Username,
    Password,
    Otp,
}

/// Login screen state
pub struct LoginScreen {
    pub flow: LoginFlow,
    pub username_input: InputField,
    pub password_input: InputField,
    pub otp_input: InputField,
    pub current_field: LoginField,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        let mut screen = Self {
            flow: LoginFlow::new(),
            username_input: InputField::new("Username/Email Id *"),
            password_input: InputField::new("Password *").masked(),
            otp_input: InputField::new("OTP *"),
            current_field: LoginField::Username,
        };
        screen.update_field_focus();
        screen
    }

    /// Back to an empty form, e.g. after logout or session expiry.
    pub fn reset(&mut self) {
        self.flow.reset();
        self.password_input.clear();
        self.otp_input.clear();
        self.current_field = LoginField::Username;
        self.update_field_focus();
    }

    /// Called by the app after each submit so focus follows the flow stage.
    pub fn sync_with_flow(&mut self) {
        if self.flow.is_otp_visible() {
            self.current_field = LoginField::Otp;
        } else if self.current_field == LoginField::Otp {
            self.otp_input.clear();
            self.current_field = LoginField::Username;
        }
        self.update_field_focus();
    }

    fn update_field_focus(&mut self) {
        self.username_input.set_focus(self.current_field == LoginField::Username);
        self.password_input.set_focus(self.current_field == LoginField::Password);
        self.otp_input.set_focus(self.current_field == LoginField::Otp);
    }

    fn current_input(&mut self) -> &mut InputField {
        match self.current_field {
            LoginField::Username => &mut self.username_input,
            LoginField::Password => &mut self.password_input,
            LoginField::Otp => &mut self.otp_input,
        }
    }

    fn switch_credential_field(&mut self) {
        // Credential fields are locked while the OTP is pending
        if self.flow.is_otp_visible() {
            return;
        }
        self.current_field = match self.current_field {
            LoginField::Username => LoginField::Password,
            _ => LoginField::Username,
        };
        self.update_field_focus();
    }

    fn submit(&self) -> ScreenAction {
        if self.flow.is_otp_visible() {
            ScreenAction::SubmitOtp {
                otp: self.otp_input.value.trim().to_string(),
            }
        } else {
            ScreenAction::SubmitCredentials {
                username: self.username_input.value.trim().to_string(),
                password: self.password_input.value.clone(),
            }
        }
    }
}

impl ScreenView for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        let action = match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.switch_credential_field();
                ScreenAction::None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if self.flow.is_otp_visible() {
                    self.reset();
                    ScreenAction::SetStatus("OTP cancelled".to_string())
                } else {
                    ScreenAction::Quit
                }
            }
            KeyCode::Char(c) => {
                self.current_input().insert_char(c);
                ScreenAction::None
            }
            KeyCode::Backspace => {
                self.current_input().delete_char();
                ScreenAction::None
            }
            KeyCode::Delete => {
                self.current_input().delete_char_forward();
                ScreenAction::None
            }
            KeyCode::Left => {
                self.current_input().move_cursor_left();
                ScreenAction::None
            }
            KeyCode::Right => {
                self.current_input().move_cursor_right();
                ScreenAction::None
            }
            KeyCode::Home => {
                self.current_input().move_cursor_to_start();
                ScreenAction::None
            }
            KeyCode::End => {
                self.current_input().move_cursor_to_end();
                ScreenAction::None
            }
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let form_area = centered_rect(60, 80, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(4), // Banner and messages
                Constraint::Length(3), // Username
                Constraint::Length(3), // Password
                Constraint::Length(3), // OTP
                Constraint::Min(0),
            ])
            .split(form_area);

        let title = Paragraph::new("Login")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        let mut lines = Vec::new();
        if self.flow.is_otp_visible() {
            lines.push(Line::styled("Welcome User! Please verify the OTP.", Styles::success()));
        }
        for message in self.flow.messages() {
            lines.push(Line::styled(format!("• {}", message), Styles::error()));
        }
        f.render_widget(Paragraph::new(lines), chunks[1]);

        self.username_input.render(f, chunks[2]);
        self.password_input.render(f, chunks[3]);

        if self.flow.is_otp_visible() {
            self.otp_input.render(f, chunks[4]);
        } else {
            let hint = Paragraph::new("Enter: Login | Tab: Next field | Esc: Quit")
                .style(Styles::info());
            f.render_widget(hint, chunks[4]);
        }
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn help_text(&self) -> &'static str {
        "Login:\n\
        Tab / ↑/↓ - Switch between username and password\n\
        Enter - Login, or Verify OTP once it was sent\n\
        Esc - Cancel OTP step / Quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(screen: &mut LoginScreen, code: KeyCode) -> ScreenAction {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_submits_credentials() {
        let mut screen = LoginScreen::new();
        type_text(&mut screen, "alice");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "s3cret");

        assert_eq!(
            press(&mut screen, KeyCode::Enter),
            ScreenAction::SubmitCredentials {
                username: "alice".to_string(),
                password: "s3cret".to_string(),
            }
        );
    }

    #[test]
    fn test_esc_quits_from_credentials() {
        let mut screen = LoginScreen::new();
        assert_eq!(press(&mut screen, KeyCode::Esc), ScreenAction::Quit);
    }
}
