//! Signed-in session passed explicitly to the code that talks to the backend

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, VerifyError};

/// Username, bearer token and expiry of the signed-in user.
///
/// A session only exists once the OTP has been verified. It stops being
/// authenticated when it expires or is invalidated (logout, 401).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    username: String,
    token: Option<String>,
    otp_verified: bool,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Session granted by the backend after a verified OTP.
    pub fn issue(username: &str, token: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            token: Some(token.to_string()),
            otp_verified: true,
            issued_at: now,
            expires_at: Some(now + ttl),
        }
    }

    /// Local session for working on a document file without a backend.
    /// Never expires.
    pub fn offline(username: &str) -> Self {
        Self {
            username: username.to_string(),
            token: None,
            otp_verified: true,
            issued_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_offline(&self) -> bool {
        self.token.is_none() && self.expires_at.is_none() && self.otp_verified
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().map(|t| !t.is_empty()).unwrap_or(false)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }

    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        if self.is_offline() {
            return true;
        }
        self.has_token() && self.otp_verified && !self.is_expired(now)
    }

    /// Bearer token for a backend call, or the reason there is none.
    pub fn bearer(&self, now: DateTime<Utc>) -> Result<&str> {
        if self.is_expired(now) {
            return Err(VerifyError::SessionExpired(self.username.clone()));
        }
        match self.token.as_deref() {
            Some(token) if !token.is_empty() && self.otp_verified => Ok(token),
            _ => Err(VerifyError::NotAuthenticated),
        }
    }

    pub fn invalidate(&mut self) {
        self.token = None;
        self.otp_verified = false;
        self.expires_at = Some(self.issued_at);
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|at| (at - now).max(Duration::zero()))
    }
}
