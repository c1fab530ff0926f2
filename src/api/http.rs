//! HTTP client for the document-management backend

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{AuthService, Credentials, DocumentProvider, LoginGrant};
use crate::config::Config;
use crate::error::{Result, VerifyError};
use crate::models::{ActionType, DeclarationNumber, Document};
use crate::session::SessionContext;

/// `GET /documents` answers either a bare array or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentsPayload {
    List(Vec<Document>),
    Wrapped { documents: Vec<Document> },
}

impl DocumentsPayload {
    fn into_documents(self) -> Vec<Document> {
        match self {
            DocumentsPayload::List(documents) => documents,
            DocumentsPayload::Wrapped { documents } => documents,
        }
    }
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.http.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `documents/{declaration_number}/action`, the number escaped as one
    /// path segment.
    fn action_url(&self, declaration_number: &DeclarationNumber) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| VerifyError::Config(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| VerifyError::Config(format!("API URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["documents", declaration_number.as_str(), "action"]);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn non-2xx responses into [`VerifyError::ApiError`].
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!("Backend answered {}: {}", status.as_u16(), message);
        Err(VerifyError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant> {
        let url = self.endpoint("auth/login");
        debug!("POST {} for {}", url, credentials.username);

        let response = self.client.post(&url).json(credentials).send().await?;
        let grant = Self::check(response).await?.json::<LoginGrant>().await?;

        info!("Credentials accepted for {}", credentials.username);
        Ok(grant)
    }

    async fn send_otp(&self, username: &str) -> Result<()> {
        let url = self.endpoint("auth/send-otp");
        debug!("POST {} for {}", url, username);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "username": username }))
            .send()
            .await?;
        Self::check(response).await?;

        info!("OTP sent to {}", username);
        Ok(())
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<()> {
        let url = self.endpoint("auth/verify-otp");
        debug!("POST {} for {}", url, email);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await?;
        Self::check(response).await?;

        info!("OTP verified for {}", email);
        Ok(())
    }
}

#[async_trait]
impl DocumentProvider for HttpBackend {
    async fn fetch_documents(&self, session: &SessionContext) -> Result<Vec<Document>> {
        let token = session.bearer(Utc::now())?;
        let url = self.endpoint("documents");
        debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let body = Self::check(response).await?.text().await?;
        let documents = parse_documents(&body, &url)?;

        info!("Fetched {} documents for {}", documents.len(), session.username());
        Ok(documents)
    }

    async fn record_action(
        &self,
        session: &SessionContext,
        declaration_number: &DeclarationNumber,
        action: ActionType,
    ) -> Result<()> {
        let token = session.bearer(Utc::now())?;
        let url = self.action_url(declaration_number)?;
        debug!("POST {} action={}", url, action);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "action": action.as_str() }))
            .send()
            .await?;
        Self::check(response).await?;

        info!("Recorded {} for {}", action, declaration_number);
        Ok(())
    }
}

pub(crate) fn parse_documents(body: &str, origin: &str) -> Result<Vec<Document>> {
    serde_json::from_str::<DocumentsPayload>(body)
        .map(DocumentsPayload::into_documents)
        .map_err(|source| VerifyError::DocumentParse {
            origin: origin.to_string(),
            source,
        })
}

/// Best-effort message out of an error body: a JSON `message`, `error` or
/// `detail` field, otherwise the trimmed text.
pub(crate) fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.trim().to_string();
            }
        }
    }
    body.trim().to_string()
}
