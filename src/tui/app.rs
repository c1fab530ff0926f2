//! Console application state and event loop

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::screens::{LoginScreen, VerifyScreen};
use super::traits::{Screen as ScreenView, ScreenAction};
use super::ui::{centered_rect, Styles};
use crate::api::{AuthService, DocumentProvider, FileDocumentProvider, HttpBackend};
use crate::config::Config;
use crate::error::VerifyError;
use crate::models::{ActionType, DeclarationNumber};
use crate::session::SessionContext;

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Login,
    Verify,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Verify => "Verify Document",
        }
    }
}

/// Main console application state
pub struct App {
    /// Current active screen
    pub current_screen: Screen,
    /// Application configuration
    pub config: Config,

    /// `None` when working offline on a document file
    auth: Option<Arc<dyn AuthService>>,
    provider: Arc<dyn DocumentProvider>,
    pub session: Option<SessionContext>,

    // Screen states
    pub login: LoginScreen,
    pub verify: VerifyScreen,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create the application from configuration. A documents file means an
    /// offline session straight into the verify screen; otherwise the backend
    /// API is used and the user starts at the login form.
    pub fn new(config: Config) -> Result<Self> {
        if let Some(path) = config.documents_file.clone() {
            info!("Working offline on {}", path.display());
            let user = std::env::var("USER").unwrap_or_else(|_| "offline".to_string());
            let provider = Arc::new(FileDocumentProvider::new(path));
            return Ok(Self::with_services(
                config,
                None,
                provider,
                Some(SessionContext::offline(&user)),
            ));
        }

        let backend = Arc::new(HttpBackend::new(&config)?);
        info!("Using backend at {}", backend.base_url());
        let auth: Arc<dyn AuthService> = backend.clone();
        Ok(Self::with_services(config, Some(auth), backend, None))
    }

    /// Wire the application to explicit collaborators.
    pub fn with_services(
        config: Config,
        auth: Option<Arc<dyn AuthService>>,
        provider: Arc<dyn DocumentProvider>,
        session: Option<SessionContext>,
    ) -> Self {
        let current_screen = if session.is_some() {
            Screen::Verify
        } else {
            Screen::Login
        };
        let verify = VerifyScreen::new(config.action_policy);

        Self {
            current_screen,
            config,
            auth,
            provider,
            session,
            login: LoginScreen::new(),
            verify,
            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
        }
    }

    /// Initial document load for sessions that exist at startup.
    pub async fn start(&mut self) {
        if self.session.is_some() {
            self.load_documents().await;
        } else {
            self.set_status("Please log in".to_string());
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.start().await;

        loop {
            terminal.draw(|f| self.draw(f))?;

            // Poll so session expiry is noticed without a key press
            if event::poll(Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(key).await?;
                    }
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    _ => {}
                }
            }

            self.check_session_expiry(Utc::now());

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn active_screen(&self) -> &dyn ScreenView {
        match self.current_screen {
            Screen::Login => &self.login,
            Screen::Verify => &self.verify,
        }
    }

    fn active_screen_mut(&mut self) -> &mut dyn ScreenView {
        match self.current_screen {
            Screen::Login => &mut self.login,
            Screen::Verify => &mut self.verify,
        }
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        if self.show_help_popup {
            // Any key closes the popup
            self.show_help_popup = false;
            return Ok(());
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = true;
                return Ok(());
            }
            KeyCode::Char('?') if !self.active_screen().captures_text() => {
                self.show_help_popup = true;
                return Ok(());
            }
            _ => {}
        }

        let action = self.active_screen_mut().handle_key_event(key)?;
        self.perform(action).await;
        Ok(())
    }

    /// Clicks only matter for dismissing the verify screen's overlays.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.show_help_popup || self.current_screen != Screen::Verify {
            return;
        }
        if let MouseEventKind::Down(_) = mouse.kind {
            self.verify.handle_click(mouse.column, mouse.row);
        }
    }

    /// Carry out what a screen asked for.
    pub async fn perform(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.set_status(message),
            ScreenAction::SubmitCredentials { username, password } => {
                self.submit_credentials(&username, &password).await
            }
            ScreenAction::SubmitOtp { otp } => self.submit_otp(&otp).await,
            ScreenAction::RecordAction {
                declaration_numbers,
                action,
            } => self.record_action(&declaration_numbers, action).await,
            ScreenAction::ReloadDocuments => {
                if let Some(count) = self.load_documents().await {
                    self.set_status(format!("Reloaded {} documents", count));
                }
            }
            ScreenAction::Logout => self.logout(),
            ScreenAction::None => {}
        }
    }

    async fn submit_credentials(&mut self, username: &str, password: &str) {
        let Some(auth) = self.auth.clone() else {
            self.set_error("No authentication backend configured".to_string());
            return;
        };

        self.clear_messages();
        self.login
            .flow
            .submit_credentials(auth.as_ref(), username, password)
            .await;
        self.login.sync_with_flow();

        if self.login.flow.is_otp_visible() {
            self.set_status(format!("OTP sent to {}", username));
        }
    }

    async fn submit_otp(&mut self, otp: &str) {
        let Some(auth) = self.auth.clone() else {
            self.set_error("No authentication backend configured".to_string());
            return;
        };

        let ttl = self.config.session_ttl();
        let session = self.login.flow.submit_otp(auth.as_ref(), otp, ttl).await;
        self.login.sync_with_flow();

        let Some(session) = session else {
            return;
        };

        info!("Session opened for {}", session.username());
        self.session = Some(session);
        self.navigate_to_screen(Screen::Verify);
        if let Some(count) = self.load_documents().await {
            self.set_status(format!("OTP Verified! {} documents loaded", count));
        }
    }

    /// Fetch the document set into the verify screen. Returns the count on
    /// success; failures are reported in the status bar.
    async fn load_documents(&mut self) -> Option<usize> {
        let session = match &self.session {
            Some(session) => session.clone(),
            None => {
                self.end_session("Please log in to view documents");
                return None;
            }
        };

        match self.provider.fetch_documents(&session).await {
            Ok(documents) => {
                let count = documents.len();
                info!("Loaded {} documents for {}", count, session.username());
                self.verify.set_documents(documents);
                self.set_status(format!("Loaded {} documents", count));
                Some(count)
            }
            Err(e) => {
                self.handle_backend_error(e, "Failed to load documents");
                None
            }
        }
    }

    /// Persist dispositions already stamped locally. Failures are reported
    /// but never roll back the local state.
    async fn record_action(&mut self, declaration_numbers: &[DeclarationNumber], action: ActionType) {
        let Some(session) = self.session.clone() else {
            self.end_session("Please log in to record actions");
            return;
        };

        let mut failed = Vec::new();
        for id in declaration_numbers {
            match self.provider.record_action(&session, id, action).await {
                Ok(()) => {}
                Err(e) if is_auth_failure(&e) => {
                    self.handle_backend_error(e, "Failed to record action");
                    return;
                }
                Err(e) => {
                    warn!("Failed to record {} for {}: {}", action, id, e);
                    failed.push(id.to_string());
                }
            }
        }

        if failed.is_empty() {
            self.set_status(format!(
                "{} document(s) marked {}",
                declaration_numbers.len(),
                action
            ));
        } else {
            self.set_error(format!(
                "Marked {} locally but could not save {}",
                action,
                failed.join(", ")
            ));
        }
    }

    fn handle_backend_error(&mut self, e: VerifyError, context: &str) {
        if is_auth_failure(&e) {
            warn!("{}: {}", context, e);
            let message = match e {
                VerifyError::ApiError { .. } => {
                    "Session is no longer valid. Please log in again".to_string()
                }
                other => other.to_string(),
            };
            self.end_session(&message);
        } else {
            error!("{}: {}", context, e);
            self.set_error(format!("{}: {}", context, e));
        }
    }

    fn logout(&mut self) {
        if self.auth.is_none() {
            self.set_status("Offline session, nothing to log out of".to_string());
            return;
        }
        if let Some(session) = &self.session {
            info!("{} logged out", session.username());
        }
        self.end_session("");
        self.set_status("Logged out".to_string());
    }

    /// Drop the session and the documents fetched with it, and go back to
    /// the login form with `message` shown there.
    fn end_session(&mut self, message: &str) {
        if let Some(mut session) = self.session.take() {
            session.invalidate();
        }
        self.verify.set_documents(Vec::new());
        self.login.reset();
        if !message.is_empty() {
            self.login.flow.set_message(message);
        }
        self.navigate_to_screen(Screen::Login);
        if !message.is_empty() {
            self.set_error(message.to_string());
        }
    }

    /// End the session once it has expired.
    pub fn check_session_expiry(&mut self, now: DateTime<Utc>) {
        let expired = self
            .session
            .as_ref()
            .map(|session| session.is_expired(now))
            .unwrap_or(false);
        if expired {
            let username = self
                .session
                .as_ref()
                .map(|s| s.username().to_string())
                .unwrap_or_default();
            info!("Session for {} expired", username);
            self.end_session(&VerifyError::SessionExpired(username).to_string());
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.active_screen_mut().draw(f, chunks[0]);
        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn session_summary(&self) -> String {
        match &self.session {
            None => "not signed in".to_string(),
            Some(session) => match session.remaining(Utc::now()) {
                Some(left) => format!("{} ({} min left)", session.username(), left.num_minutes()),
                None => format!("{} (offline)", session.username()),
            },
        }
    }

    /// Draw status bar with current screen info and shortcuts
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else {
            format!(
                "docverify - {} | {} | F1/?: Help | Ctrl-C: Quit",
                self.current_screen.title(),
                self.session_summary()
            )
        };

        let style = if self.error_message.is_some() {
            Styles::error()
        } else if self.status_message.is_some() {
            Styles::success()
        } else {
            Styles::inactive()
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);

        f.render_widget(Clear, popup_area);

        let help_content = format!(
            "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            Ctrl-C - Quit application\n\
            Session: {}\n\n{}",
            self.session_summary(),
            self.active_screen().help_text()
        );

        let help_popup = Paragraph::new(help_content)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            )
            .style(Styles::default());

        f.render_widget(help_popup, popup_area);
    }

    /// Navigate to a specific screen
    pub fn navigate_to_screen(&mut self, screen: Screen) {
        self.current_screen = screen;
        self.clear_messages();
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    /// Clear status and error messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}

/// Errors after which the session cannot be used any more.
fn is_auth_failure(e: &VerifyError) -> bool {
    matches!(
        e,
        VerifyError::NotAuthenticated
            | VerifyError::SessionExpired(_)
            | VerifyError::ApiError {
                status_code: 401,
                ..
            }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Credentials, LoginGrant};
    use crate::error;
    use crate::models::Document;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        {"declarationNumber": "1234567890123", "FileName": "IN-345", "updatedDate": "2024-12-15", "documentType": "Invoice", "actions": ""},
        {"declarationNumber": "9876543210123", "FileName": "DE-446", "updatedDate": "2024-12-10", "documentType": "Declaration", "actions": ""},
        {"declarationNumber": "1112233445566", "FileName": "PL-12", "updatedDate": "2024-12-08", "documentType": "Packing List", "actions": ""}
    ]"#;

    fn sample_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    struct FakeAuth;

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn login(&self, credentials: &Credentials) -> error::Result<LoginGrant> {
            if credentials.password == "secret" {
                Ok(LoginGrant {
                    token: "tok".to_string(),
                    message: None,
                })
            } else {
                Err(VerifyError::ApiError {
                    status_code: 401,
                    message: String::new(),
                })
            }
        }

        async fn send_otp(&self, _username: &str) -> error::Result<()> {
            Ok(())
        }

        async fn verify_otp(&self, _email: &str, otp: &str) -> error::Result<()> {
            if otp == "123456" {
                Ok(())
            } else {
                Err(VerifyError::ApiError {
                    status_code: 400,
                    message: String::new(),
                })
            }
        }
    }

    /// Serves the sample documents and remembers recorded actions, or
    /// rejects every call with the configured status.
    struct FakeProvider {
        documents: Vec<Document>,
        recorded: Mutex<Vec<(DeclarationNumber, ActionType)>>,
        reject_with: Option<u16>,
    }

    impl FakeProvider {
        fn new(reject_with: Option<u16>) -> Self {
            Self {
                documents: crate::verification::sample_documents(),
                recorded: Mutex::new(Vec::new()),
                reject_with,
            }
        }

        fn check(&self) -> error::Result<()> {
            match self.reject_with {
                Some(status_code) => Err(VerifyError::ApiError {
                    status_code,
                    message: "nope".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl DocumentProvider for FakeProvider {
        async fn fetch_documents(&self, session: &SessionContext) -> error::Result<Vec<Document>> {
            session.bearer(Utc::now())?;
            Ok(self.documents.clone())
        }

        async fn record_action(
            &self,
            _session: &SessionContext,
            declaration_number: &DeclarationNumber,
            action: ActionType,
        ) -> error::Result<()> {
            self.check()?;
            self.recorded
                .lock()
                .unwrap()
                .push((declaration_number.clone(), action));
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    fn online_session() -> SessionContext {
        SessionContext::issue("alice", "tok", chrono::Duration::minutes(60), Utc::now())
    }

    #[tokio::test]
    async fn test_offline_file_session_approves_rows() {
        let file = sample_file();
        let config = Config {
            documents_file: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let mut app = App::new(config).unwrap();
        assert_eq!(app.current_screen, Screen::Verify);

        app.start().await;
        assert_eq!(app.verify.view.visible_len(), 3);

        app.handle_key_event(key(KeyCode::Char(' '))).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('a'))).await.unwrap();

        assert_eq!(
            app.verify.view.documents()[0].action,
            Some(ActionType::Approved)
        );
        assert_eq!(
            app.status_message.as_deref(),
            Some("1 document(s) marked Approved")
        );
    }

    #[tokio::test]
    async fn test_login_with_otp_opens_verify_screen() {
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            Arc::new(FakeProvider::new(None)),
            None,
        );
        app.start().await;
        assert_eq!(app.current_screen, Screen::Login);

        type_text(&mut app, "alice").await;
        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();
        type_text(&mut app, "secret").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(app.login.flow.is_otp_visible());

        type_text(&mut app, "123456").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.current_screen, Screen::Verify);
        assert!(app.session.is_some());
        assert_eq!(app.verify.view.visible_len(), 3);
        assert_eq!(
            app.status_message.as_deref(),
            Some("OTP Verified! 3 documents loaded")
        );
    }

    #[tokio::test]
    async fn test_wrong_otp_stays_on_login() {
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            Arc::new(FakeProvider::new(None)),
            None,
        );
        type_text(&mut app, "alice").await;
        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();
        type_text(&mut app, "secret").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "000000").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.session.is_none());
        assert_eq!(app.login.flow.messages(), ["Invalid OTP. Please try again."]);
    }

    #[tokio::test]
    async fn test_unauthorized_record_ends_session() {
        let provider = Arc::new(FakeProvider::new(Some(401)));
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            provider,
            Some(online_session()),
        );
        app.start().await;

        app.handle_key_event(key(KeyCode::Char(' '))).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('x'))).await.unwrap();

        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.session.is_none());
        assert!(app.verify.view.documents().is_empty());
    }

    #[tokio::test]
    async fn test_failed_record_keeps_local_stamp() {
        let provider = Arc::new(FakeProvider::new(Some(500)));
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            provider,
            Some(online_session()),
        );
        app.start().await;

        app.handle_key_event(key(KeyCode::Char(' '))).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('x'))).await.unwrap();

        assert_eq!(app.current_screen, Screen::Verify);
        assert_eq!(
            app.verify.view.documents()[0].action,
            Some(ActionType::Rejected)
        );
        assert!(app.error_message.is_some());
    }

    #[tokio::test]
    async fn test_session_expiry_returns_to_login() {
        let provider = Arc::new(FakeProvider::new(None));
        let recorded = provider.clone();
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            provider,
            Some(online_session()),
        );
        app.start().await;
        assert!(recorded.recorded.lock().unwrap().is_empty());

        app.check_session_expiry(Utc::now() + chrono::Duration::minutes(61));
        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.session.is_none());
        assert_eq!(app.login.flow.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_mouse_press_outside_calendar_closes_it() {
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            Arc::new(FakeProvider::new(None)),
            Some(online_session()),
        );
        app.start().await;
        app.handle_key_event(key(KeyCode::Char('c'))).await.unwrap();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(app.verify.view.disclosure().is_calendar_open());

        app.handle_mouse_event(MouseEvent {
            kind: MouseEventKind::Down(crossterm::event::MouseButton::Left),
            column: 0,
            row: 29,
            modifiers: KeyModifiers::NONE,
        });
        assert!(app.verify.view.disclosure().is_closed());
    }

    #[tokio::test]
    async fn test_logout_and_help_popup() {
        let mut app = App::with_services(
            Config::default(),
            Some(Arc::new(FakeAuth)),
            Arc::new(FakeProvider::new(None)),
            Some(online_session()),
        );
        app.start().await;

        app.handle_key_event(key(KeyCode::Char('?'))).await.unwrap();
        assert!(app.show_help_popup);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(!app.show_help_popup);

        app.handle_key_event(key(KeyCode::Char('L'))).await.unwrap();
        assert_eq!(app.current_screen, Screen::Login);
        assert_eq!(app.status_message.as_deref(), Some("Logged out"));
        terminal.draw(|f| app.draw(f)).unwrap();
    }
}
