use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VerifyError;

/// Identifier of a customs/shipping declaration. Primary search key of the
/// verification view and the stable identity of a document row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationNumber(String);

impl DeclarationNumber {
    pub const EXPECTED_LEN: usize = 13;

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the number has the usual 13-digit shape. Only used for hints;
    /// documents with other shapes are still listed and searchable.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::EXPECTED_LEN && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for DeclarationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeclarationNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    Invoice,
    Declaration,
    PackingList,
    Other(String),
}

impl DocumentType {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Declaration => "Declaration",
            DocumentType::PackingList => "Packing List",
            DocumentType::Other(s) => s,
        }
    }

    /// Types offered by the type dropdown, in display order.
    pub fn known() -> Vec<DocumentType> {
        vec![
            DocumentType::Declaration,
            DocumentType::Invoice,
            DocumentType::PackingList,
        ]
    }
}

// Exact, case-sensitive mapping. Anything unrecognised is kept verbatim.
impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Invoice" => DocumentType::Invoice,
            "Declaration" => DocumentType::Declaration,
            "Packing List" => DocumentType::PackingList,
            _ => DocumentType::Other(value),
        }
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        DocumentType::from(value.to_string())
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disposition stamped onto a document during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Approved,
    Rejected,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Approved => "Approved",
            ActionType::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" | "approve" => Ok(ActionType::Approved),
            "rejected" | "reject" => Ok(ActionType::Rejected),
            other => Err(VerifyError::Config(format!("Unknown action: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub declaration_number: DeclarationNumber,
    #[serde(rename = "FileName", alias = "fileName", default)]
    pub file_name: String,
    pub updated_date: NaiveDate,
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, alias = "actions", deserialize_with = "deserialize_action")]
    pub action: Option<ActionType>,
}

impl Document {
    pub fn new(
        declaration_number: &str,
        file_name: &str,
        updated_date: NaiveDate,
        document_type: DocumentType,
    ) -> Self {
        Self {
            declaration_number: DeclarationNumber::new(declaration_number),
            file_name: file_name.to_string(),
            updated_date,
            document_type,
            download_url: None,
            action: None,
        }
    }

    pub fn with_download_url(mut self, url: &str) -> Self {
        self.download_url = Some(url.to_string());
        self
    }

    /// Label shown in the file column.
    pub fn file_label(&self) -> &str {
        match self.download_url.as_deref() {
            Some(url) if !url.is_empty() => {
                if self.file_name.is_empty() {
                    "View Document"
                } else {
                    &self.file_name
                }
            }
            _ => "N/A",
        }
    }

    pub fn is_stamped(&self) -> bool {
        self.action.is_some()
    }
}

// Backends send "" for documents nobody has acted on yet.
fn deserialize_action<'de, D>(deserializer: D) -> Result<Option<ActionType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
