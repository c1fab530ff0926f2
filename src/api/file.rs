//! Document provider backed by a local JSON file

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{http::parse_documents, DocumentProvider};
use crate::error::Result;
use crate::models::{ActionType, DeclarationNumber, Document};
use crate::session::SessionContext;

/// Reads documents from a JSON file (a bare array or `{"documents": [...]}`).
/// Actions are only logged; the file is never written.
pub struct FileDocumentProvider {
    path: PathBuf,
}

impl FileDocumentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronous load, for CLI commands that do not need a session.
    pub fn load(&self) -> Result<Vec<Document>> {
        let content = std::fs::read_to_string(&self.path)?;
        let documents = parse_documents(&content, &self.path.display().to_string())?;

        let malformed = documents
            .iter()
            .filter(|doc| !doc.declaration_number.is_well_formed())
            .count();
        if malformed > 0 {
            warn!(
                "{} of {} declaration numbers in {} are not 13 digits",
                malformed,
                documents.len(),
                self.path.display()
            );
        }

        info!("Loaded {} documents from {}", documents.len(), self.path.display());
        Ok(documents)
    }
}

#[async_trait]
impl DocumentProvider for FileDocumentProvider {
    async fn fetch_documents(&self, _session: &SessionContext) -> Result<Vec<Document>> {
        self.load()
    }

    async fn record_action(
        &self,
        session: &SessionContext,
        declaration_number: &DeclarationNumber,
        action: ActionType,
    ) -> Result<()> {
        info!(
            "{} marked {} as {} (offline, not persisted)",
            session.username(),
            declaration_number,
            action
        );
        Ok(())
    }
}
