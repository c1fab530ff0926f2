//! Document verification core
//!
//! Filter engine, suggestion index, selection set, action applier and
//! overlay disclosure state, plus the [`VerificationView`] aggregate that
//! wires them together for the console.

pub mod action;
pub mod disclosure;
pub mod filter;
pub mod selection;
pub mod suggest;
pub mod view;

pub use action::{apply_action, reset_action, ActionPolicy};
pub use disclosure::Disclosure;
pub use filter::{apply_filters, FilterState, TypeFilter};
pub use selection::SelectionSet;
pub use suggest::suggest;
pub use view::VerificationView;

#[cfg(test)]
pub(crate) fn sample_documents() -> Vec<crate::models::Document> {
    use crate::models::{Document, DocumentType};
    use chrono::NaiveDate;

    vec![
        Document::new(
            "1234567890123",
            "IN-345",
            NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            DocumentType::Invoice,
        )
        .with_download_url("/downloads/sample1.pdf"),
        Document::new(
            "9876543210123",
            "DE-446",
            NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
            DocumentType::Declaration,
        )
        .with_download_url("/downloads/sample2.docx"),
        Document::new(
            "1112233445566",
            "PL-12",
            NaiveDate::from_ymd_opt(2024, 12, 8).unwrap(),
            DocumentType::PackingList,
        )
        .with_download_url("/downloads/sample3.xlsx"),
    ]
}
