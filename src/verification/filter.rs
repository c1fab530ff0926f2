//! Filter engine: derives the visible rows from the full document set

use chrono::NaiveDate;
use std::fmt;

use crate::models::{Document, DocumentType};

/// Selection of the type dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(DocumentType),
}

impl TypeFilter {
    pub fn as_str(&self) -> &str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Only(document_type) => document_type.as_str(),
        }
    }

    /// Dropdown options, "All" first.
    pub fn options() -> Vec<TypeFilter> {
        std::iter::once(TypeFilter::All)
            .chain(DocumentType::known().into_iter().map(TypeFilter::Only))
            .collect()
    }

    pub fn matches(&self, document_type: &DocumentType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted.as_str() == document_type.as_str(),
        }
    }
}

impl From<&str> for TypeFilter {
    fn from(value: &str) -> Self {
        match value {
            "All" => TypeFilter::All,
            other => TypeFilter::Only(DocumentType::from(other)),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three independent predicates of the verification view. They combine
/// with AND; a default value for any of them is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub document_type: TypeFilter,
    pub date: Option<NaiveDate>,
    pub declaration_query: String,
}

impl FilterState {
    pub fn with_document_type(mut self, document_type: TypeFilter) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn with_declaration_query(mut self, query: &str) -> Self {
        self.declaration_query = query.to_string();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.document_type == TypeFilter::All
            && self.date.is_none()
            && self.declaration_query.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        if !self.document_type.matches(&document.document_type) {
            return false;
        }

        if let Some(date) = self.date {
            if document.updated_date != date {
                return false;
            }
        }

        if !self.declaration_query.is_empty()
            && !document
                .declaration_number
                .as_str()
                .contains(self.declaration_query.as_str())
        {
            return false;
        }

        true
    }

    /// Short human-readable summary used in titles and logs.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("type={}", self.document_type)];
        if let Some(date) = self.date {
            parts.push(format!("date={}", date.format("%Y-%m-%d")));
        }
        if !self.declaration_query.is_empty() {
            parts.push(format!("declaration~{}", self.declaration_query));
        }
        parts.join(", ")
    }
}

/// Full re-scan of `documents`, keeping source order.
pub fn apply_filters<'a>(documents: &'a [Document], filters: &FilterState) -> Vec<&'a Document> {
    documents.iter().filter(|doc| filters.matches(doc)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::sample_documents;

    fn numbers(documents: &[&Document]) -> Vec<String> {
        documents
            .iter()
            .map(|doc| doc.declaration_number.to_string())
            .collect()
    }

    #[test]
    fn test_no_filters_keeps_everything_in_order() {
        let docs = sample_documents();
        let filtered = apply_filters(&docs, &FilterState::default());
        assert_eq!(
            numbers(&filtered),
            vec!["1234567890123", "9876543210123", "1112233445566"]
        );
    }

    #[test]
    fn test_type_filter_then_declaration_filter() {
        let docs = sample_documents();

        let by_type = FilterState::default().with_document_type(TypeFilter::from("Invoice"));
        assert_eq!(numbers(&apply_filters(&docs, &by_type)), vec!["1234567890123"]);

        let narrowed = by_type.with_declaration_query("999");
        assert!(apply_filters(&docs, &narrowed).is_empty());
    }

    #[test]
    fn test_all_is_identity() {
        let docs = sample_documents();
        let base = FilterState::default().with_declaration_query("1");
        let with_all = base.clone().with_document_type(TypeFilter::All);
        assert_eq!(apply_filters(&docs, &base), apply_filters(&docs, &with_all));
    }

    #[test]
    fn test_date_filter_matches_calendar_date() {
        let docs = sample_documents();
        let filters = FilterState::default()
            .with_date(Some(NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()));
        assert_eq!(numbers(&apply_filters(&docs, &filters)), vec!["9876543210123"]);

        let nothing = FilterState::default()
            .with_date(Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
        assert!(apply_filters(&docs, &nothing).is_empty());
    }

    #[test]
    fn test_declaration_filter_is_unanchored_substring() {
        let docs = sample_documents();
        let filters = FilterState::default().with_declaration_query("0123");
        assert_eq!(
            numbers(&apply_filters(&docs, &filters)),
            vec!["1234567890123", "9876543210123"]
        );
    }

    #[test]
    fn test_type_filter_is_case_sensitive() {
        let docs = sample_documents();
        let filters = FilterState::default().with_document_type(TypeFilter::from("invoice"));
        assert!(apply_filters(&docs, &filters).is_empty());
    }

    #[test]
    fn test_filters_are_pure() {
        let docs = sample_documents();
        let filters = FilterState::default()
            .with_document_type(TypeFilter::from("Declaration"))
            .with_declaration_query("98");
        let first = numbers(&apply_filters(&docs, &filters));
        let second = numbers(&apply_filters(&docs, &filters));
        assert_eq!(first, second);
        assert_eq!(docs, sample_documents());
    }

    #[test]
    fn test_type_filter_options() {
        let labels: Vec<String> = TypeFilter::options()
            .iter()
            .map(|option| option.as_str().to_string())
            .collect();
        assert_eq!(labels, vec!["All", "Declaration", "Invoice", "Packing List"]);
    }
}
