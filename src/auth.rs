//! Two-step login: credentials, then a one-time password

use chrono::{Duration, Utc};
use tracing::{error, info};

use crate::api::{AuthService, Credentials, LoginGrant};
use crate::session::SessionContext;

pub const MSG_MISSING_FIELDS: &str = "Please fill in all fields";
pub const MSG_LOGIN_FAILED: &str = "Login failed";
pub const MSG_MISSING_OTP: &str = "Please enter the OTP";
pub const MSG_INVALID_OTP: &str = "Invalid OTP. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginStage {
    /// Waiting for username and password.
    Credentials,
    /// Credentials accepted and OTP sent.
    AwaitingOtp { username: String, grant: LoginGrant },
    Verified,
}

/// Login form state: the current stage plus the message list shown above
/// the form. Messages are replaced, never appended, on each submit.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    stage: LoginStage,
    messages: Vec<String>,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        Self {
            stage: LoginStage::Credentials,
            messages: Vec::new(),
        }
    }

    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Whether the OTP field is shown (credential fields are then locked).
    pub fn is_otp_visible(&self) -> bool {
        matches!(self.stage, LoginStage::AwaitingOtp { .. })
    }

    pub fn is_verified(&self) -> bool {
        self.stage == LoginStage::Verified
    }

    /// Back to an empty credentials form.
    pub fn reset(&mut self) {
        self.stage = LoginStage::Credentials;
        self.messages.clear();
    }

    pub fn set_message(&mut self, message: &str) {
        self.messages = vec![message.to_string()];
    }

    /// Check credentials and request an OTP. Either call failing keeps the
    /// flow on the credentials stage with the error in the message list.
    pub async fn submit_credentials(
        &mut self,
        auth: &dyn AuthService,
        username: &str,
        password: &str,
    ) {
        if username.is_empty() || password.is_empty() {
            self.set_message(MSG_MISSING_FIELDS);
            return;
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let outcome = async {
            let grant = auth.login(&credentials).await?;
            auth.send_otp(username).await?;
            Ok::<_, crate::error::VerifyError>(grant)
        }
        .await;

        match outcome {
            Ok(grant) => {
                info!("Login accepted for {}, awaiting OTP", username);
                self.messages.clear();
                self.stage = LoginStage::AwaitingOtp {
                    username: username.to_string(),
                    grant,
                };
            }
            Err(e) => {
                error!("Login error for {}: {}", username, e);
                self.stage = LoginStage::Credentials;
                self.set_message(&e.user_message().unwrap_or_else(|| MSG_LOGIN_FAILED.to_string()));
            }
        }
    }

    /// Verify the OTP. On success the flow is done and a session is issued.
    pub async fn submit_otp(
        &mut self,
        auth: &dyn AuthService,
        otp: &str,
        ttl: Duration,
    ) -> Option<SessionContext> {
        let (username, token) = match &self.stage {
            LoginStage::AwaitingOtp { username, grant } => (username.clone(), grant.token.clone()),
            _ => return None,
        };

        if otp.is_empty() {
            self.set_message(MSG_MISSING_OTP);
            return None;
        }

        match auth.verify_otp(&username, otp).await {
            Ok(()) => {
                info!("OTP verified for {}", username);
                self.messages.clear();
                self.stage = LoginStage::Verified;
                Some(SessionContext::issue(&username, &token, ttl, Utc::now()))
            }
            Err(e) => {
                error!("OTP verification error for {}: {}", username, e);
                self.set_message(&e.user_message().unwrap_or_else(|| MSG_INVALID_OTP.to_string()));
                None
            }
        }
    }
}
