//! Reusable UI components for the console

pub mod date_picker;
pub mod document_table;

pub use date_picker::DatePicker;
pub use document_table::{DocumentTable, DocumentTableConfig};
