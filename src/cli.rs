use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Document;
use crate::verification::{ActionPolicy, FilterState, TypeFilter};

#[derive(Parser)]
#[command(name = "docverify")]
#[command(about = "Review, filter, approve and reject declaration documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the documents of a JSON file that pass the given filters
    List {
        /// JSON document file (defaults to DOCVERIFY_DOCUMENTS_FILE)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Document type (All, Declaration, Invoice, Packing List)
        #[arg(short = 't', long, default_value = "All")]
        doc_type: String,

        /// Updated date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Part of the declaration number
        #[arg(short = 'n', long)]
        declaration: Option<String>,

        /// Hide rows that already carry an action (retain, remove)
        #[arg(short, long)]
        policy: Option<String>,
    },

    /// Print declaration numbers starting with PARTIAL
    Suggest {
        /// Partial declaration number
        partial: String,

        /// JSON document file (defaults to DOCVERIFY_DOCUMENTS_FILE)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Launch the interactive console
    Tui {
        /// Work offline on a JSON document file instead of the backend
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Commands {
    pub fn parse_policy(policy: Option<&str>) -> Result<Option<ActionPolicy>, anyhow::Error> {
        policy
            .map(|p| p.parse::<ActionPolicy>().map_err(anyhow::Error::from))
            .transpose()
    }

    /// Type names outside the dropdown options become `Other` and match exactly.
    pub fn build_filters(
        doc_type: &str,
        date: Option<NaiveDate>,
        declaration: Option<&str>,
    ) -> FilterState {
        FilterState::default()
            .with_document_type(TypeFilter::from(doc_type))
            .with_date(date)
            .with_declaration_query(declaration.unwrap_or(""))
    }
}

/// Header line of the `list` output
pub fn listing_header() -> String {
    format!(
        "{:<15} {:<24} {:<12} {:<14} {:<10}",
        "Declaration", "File", "Updated", "Type", "Action"
    )
}

/// One row of the `list` output
pub fn listing_row(doc: &Document) -> String {
    format!(
        "{:<15} {:<24} {:<12} {:<14} {:<10}",
        doc.declaration_number.as_str(),
        truncate_string(doc.file_label(), 24),
        doc.updated_date.format("%Y-%m-%d"),
        doc.document_type.as_str(),
        doc.action.map(|a| a.as_str()).unwrap_or("-")
    )
}

/// Truncate string to specified width with ellipsis
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::verification::apply_filters;

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "docverify",
            "list",
            "--file",
            "docs.json",
            "--doc-type",
            "Packing List",
            "--date",
            "2024-12-08",
        ])
        .unwrap();

        match cli.command {
            Commands::List {
                file,
                doc_type,
                date,
                declaration,
                policy,
            } => {
                assert_eq!(file, Some(PathBuf::from("docs.json")));
                assert_eq!(doc_type, "Packing List");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 8));
                assert!(declaration.is_none());
                assert!(policy.is_none());
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_build_filters() {
        let filters = Commands::build_filters("Invoice", None, Some("123"));
        assert_eq!(filters.document_type, TypeFilter::Only(DocumentType::Invoice));
        assert_eq!(filters.declaration_query, "123");

        assert_eq!(
            Commands::build_filters("All", None, None),
            FilterState::default()
        );
    }

    #[test]
    fn test_build_filters_accepts_other_types() {
        let mut documents = crate::verification::sample_documents();
        documents.push(Document::new(
            "12345",
            "XX-1",
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            DocumentType::from("Certificate of Origin"),
        ));

        let filters = Commands::build_filters("Certificate of Origin", None, None);
        let listed = apply_filters(&documents, &filters);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].declaration_number.as_str(), "12345");

        // Unknown or differently cased names give an empty listing
        for unknown in ["Receipt", "invoice"] {
            let filters = Commands::build_filters(unknown, None, None);
            assert!(apply_filters(&documents, &filters).is_empty());
        }
    }

    #[test]
    fn test_listing_row_shows_action_badge() {
        let mut doc = Document::new(
            "9876543210123",
            "DE-446",
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
            DocumentType::Declaration,
        );
        doc.action = Some(crate::models::ActionType::Rejected);
        assert!(listing_row(&doc).trim_end().ends_with("Rejected"));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            Commands::parse_policy(Some("remove")).unwrap(),
            Some(ActionPolicy::RemoveFromView)
        );
        assert_eq!(Commands::parse_policy(None).unwrap(), None);
        assert!(Commands::parse_policy(Some("archive")).is_err());
    }

    #[test]
    fn test_listing_row_falls_back_for_missing_file() {
        let doc = Document::new(
            "1234567890123",
            "",
            NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            DocumentType::Invoice,
        );
        let row = listing_row(&doc);
        assert!(row.starts_with("1234567890123"));
        assert!(row.contains("N/A"));
        assert!(row.trim_end().ends_with('-'));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a-very-long-file-name.pdf", 10), "a-very-...");
    }
}
