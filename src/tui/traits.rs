//! Core traits for the console screens

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::models::{ActionType, DeclarationNumber};

/// Actions that can be returned from screen event handling. Anything that
/// needs the backend is returned to the app instead of being done in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Quit the application
    Quit,
    /// Set status message
    SetStatus(String),
    /// Check username and password, then request an OTP
    SubmitCredentials { username: String, password: String },
    /// Verify the OTP and open a session
    SubmitOtp { otp: String },
    /// Persist dispositions stamped locally
    RecordAction {
        declaration_numbers: Vec<DeclarationNumber>,
        action: ActionType,
    },
    /// Fetch the document set again
    ReloadDocuments,
    /// Drop the session and return to the login form
    Logout,
    /// No action taken
    None,
}

/// Core trait for all console screens
pub trait Screen {
    /// Draw the screen content
    fn draw(&mut self, f: &mut Frame, area: Rect);

    /// Handle keyboard input and return an action for the app
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction>;

    /// Whether plain character keys are currently going into a text field,
    /// in which case global single-letter shortcuts are disabled.
    fn captures_text(&self) -> bool {
        false
    }

    /// Shortcut summary for the help popup
    fn help_text(&self) -> &'static str;
}
