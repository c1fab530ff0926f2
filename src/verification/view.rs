//! State of the verification screen

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{ActionType, DeclarationNumber, Document};
use crate::verification::{
    action::{apply_action, reset_action, ActionPolicy},
    disclosure::Disclosure,
    filter::{FilterState, TypeFilter},
    selection::SelectionSet,
    suggest::suggest,
};

/// Aggregate owning the document set and every piece of view state.
///
/// Every mutation that can change the visible rows re-runs the filter over
/// the full set and reconciles the selection against the result, so a
/// checked row that gets filtered away is never acted upon.
#[derive(Debug, Clone)]
pub struct VerificationView {
    documents: Vec<Document>,
    filters: FilterState,
    selection: SelectionSet,
    disclosure: Disclosure,
    suggestions: Vec<String>,
    policy: ActionPolicy,
    /// Indices into `documents`, in source order.
    visible: Vec<usize>,
}

impl VerificationView {
    pub fn new(documents: Vec<Document>, policy: ActionPolicy) -> Self {
        let mut view = Self {
            documents,
            filters: FilterState::default(),
            selection: SelectionSet::new(),
            disclosure: Disclosure::default(),
            suggestions: Vec::new(),
            policy,
            visible: Vec::new(),
        };
        view.refresh();
        view
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn policy(&self) -> ActionPolicy {
        self.policy
    }

    pub fn visible_documents(&self) -> Vec<&Document> {
        self.visible.iter().map(|&i| &self.documents[i]).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_row(&self, index: usize) -> Option<&Document> {
        self.visible.get(index).map(|&i| &self.documents[i])
    }

    /// Swap in a freshly fetched document set, keeping filters.
    pub fn replace_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        // Only an open suggestion list follows the new set
        if !self.suggestions.is_empty() {
            self.suggestions = suggest(&self.documents, &self.filters.declaration_query);
        }
        self.refresh();
    }

    /// Every edit of the declaration input.
    pub fn type_declaration(&mut self, input: &str) {
        self.filters.declaration_query = input.to_string();
        self.suggestions = suggest(&self.documents, input);
        self.refresh();
    }

    pub fn select_suggestion(&mut self, suggestion: &str) {
        self.filters.declaration_query = suggestion.to_string();
        self.suggestions.clear();
        self.refresh();
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }

    pub fn toggle_calendar(&mut self) {
        self.disclosure.toggle_calendar();
    }

    pub fn toggle_type_dropdown(&mut self) {
        self.disclosure.toggle_dropdown();
    }

    pub fn dismiss_overlays(&mut self) {
        self.disclosure.dismiss();
    }

    /// Date picked in the calendar; `None` clears the date filter.
    pub fn pick_date(&mut self, date: Option<NaiveDate>) {
        self.filters.date = date;
        self.disclosure.dismiss();
        self.refresh();
    }

    pub fn pick_document_type(&mut self, document_type: TypeFilter) {
        self.filters.document_type = document_type;
        self.disclosure.dismiss();
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.suggestions.clear();
        self.refresh();
    }

    /// Flip the checkbox of visible row `index`. Rows that already carry an
    /// action have no checkbox. Returns whether the row is checked afterwards.
    pub fn toggle_row(&mut self, index: usize) -> bool {
        let id = match self.visible_row(index) {
            Some(doc) if !doc.is_stamped() => doc.declaration_number.clone(),
            _ => return false,
        };
        let selected = self.selection.toggle(&id);
        debug!("Row {} ({}) selected={}", index, id, selected);
        selected
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        self.visible_row(index)
            .map(|doc| self.selection.contains(&doc.declaration_number))
            .unwrap_or(false)
    }

    pub fn approve_selected(&mut self) -> Vec<DeclarationNumber> {
        self.apply(ActionType::Approved)
    }

    pub fn reject_selected(&mut self) -> Vec<DeclarationNumber> {
        self.apply(ActionType::Rejected)
    }

    /// Stamp `action` onto the checked visible rows and clear the selection.
    /// Returns the stamped numbers, in source order, for persistence.
    pub fn apply(&mut self, action: ActionType) -> Vec<DeclarationNumber> {
        let visible_ids: Vec<DeclarationNumber> = self
            .visible
            .iter()
            .map(|&i| self.documents[i].declaration_number.clone())
            .collect();
        self.selection.reconcile(visible_ids.iter());

        if self.selection.is_empty() {
            debug!("{} requested with empty selection", action);
            return Vec::new();
        }

        let stamped: Vec<DeclarationNumber> = visible_ids
            .into_iter()
            .filter(|id| self.selection.contains(id))
            .collect();

        self.documents = apply_action(&self.documents, &self.selection, action);
        self.selection.clear();
        debug!("Stamped {} document(s) as {}", stamped.len(), action);
        self.refresh();
        stamped
    }

    /// Reset control of a stamped row. Returns the number that was reset.
    pub fn reset_row(&mut self, index: usize) -> Option<DeclarationNumber> {
        let id = self
            .visible_row(index)
            .filter(|doc| doc.is_stamped())
            .map(|doc| doc.declaration_number.clone())?;

        if reset_action(&mut self.documents, &id) {
            debug!("Reset action of {}", id);
            self.refresh();
            Some(id)
        } else {
            None
        }
    }

    fn refresh(&mut self) {
        let filters = &self.filters;
        let policy = self.policy;
        self.visible = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| filters.matches(doc) && policy.shows(doc))
            .map(|(i, _)| i)
            .collect();

        let documents = &self.documents;
        let dropped = self
            .selection
            .reconcile(self.visible.iter().map(|&i| &documents[i].declaration_number));

        debug!(
            "Filters [{}] -> {}/{} visible, {} stale selection(s) dropped",
            self.filters.describe(),
            self.visible.len(),
            self.documents.len(),
            dropped
        );
    }
}
