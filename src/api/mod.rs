//! Backend collaborators: authentication and the document store
//!
//! The console only depends on the two traits below. [`HttpBackend`] talks to
//! the document-management API; [`FileDocumentProvider`] serves a local JSON
//! file for offline review.

pub mod file;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ActionType, DeclarationNumber, Document};
use crate::session::SessionContext;

pub use file::FileDocumentProvider;
pub use http::HttpBackend;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of a successful credential check. The token becomes usable once
/// the OTP is verified.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginGrant {
    #[serde(alias = "access_token", alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant>;

    async fn send_otp(&self, username: &str) -> Result<()>;

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<()>;
}

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn fetch_documents(&self, session: &SessionContext) -> Result<Vec<Document>>;

    /// Persist a disposition stamped locally. Local state does not depend on
    /// the outcome.
    async fn record_action(
        &self,
        session: &SessionContext,
        declaration_number: &DeclarationNumber,
        action: ActionType,
    ) -> Result<()>;
}
