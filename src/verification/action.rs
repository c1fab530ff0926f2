//! Stamping approve/reject dispositions onto selected documents

use std::fmt;
use std::str::FromStr;

use crate::error::VerifyError;
use crate::models::{ActionType, DeclarationNumber, Document};
use crate::verification::selection::SelectionSet;

/// What happens to a row once it carries an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionPolicy {
    /// Row stays in the table with a colored badge and a reset control.
    #[default]
    RetainWithBadge,
    /// Row leaves the table.
    RemoveFromView,
}

impl ActionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPolicy::RetainWithBadge => "retain",
            ActionPolicy::RemoveFromView => "remove",
        }
    }

    /// Whether a document passes the visibility step under this policy.
    pub fn shows(&self, document: &Document) -> bool {
        match self {
            ActionPolicy::RetainWithBadge => true,
            ActionPolicy::RemoveFromView => !document.is_stamped(),
        }
    }
}

impl FromStr for ActionPolicy {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "badge" | "retain-with-badge" => Ok(ActionPolicy::RetainWithBadge),
            "remove" | "remove-from-view" => Ok(ActionPolicy::RemoveFromView),
            other => Err(VerifyError::InvalidActionPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ActionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copy of `documents` where every selected document carries `action`.
pub fn apply_action(
    documents: &[Document],
    selection: &SelectionSet,
    action: ActionType,
) -> Vec<Document> {
    documents
        .iter()
        .map(|doc| {
            if selection.contains(&doc.declaration_number) {
                Document {
                    action: Some(action),
                    ..doc.clone()
                }
            } else {
                doc.clone()
            }
        })
        .collect()
}

/// Clear the action of `id` back to unset. Returns false when no document
/// with that number carries an action.
pub fn reset_action(documents: &mut [Document], id: &DeclarationNumber) -> bool {
    let mut changed = false;
    for doc in documents
        .iter_mut()
        .filter(|doc| &doc.declaration_number == id && doc.is_stamped())
    {
        doc.action = None;
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::sample_documents;

    #[test]
    fn test_apply_action_stamps_selected_only() {
        let docs = sample_documents();
        let mut selection = SelectionSet::new();
        selection.toggle(&DeclarationNumber::from("9876543210123"));

        let updated = apply_action(&docs, &selection, ActionType::Rejected);
        assert_eq!(updated[0].action, None);
        assert_eq!(updated[1].action, Some(ActionType::Rejected));
        assert_eq!(updated[2].action, None);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let docs = sample_documents();
        let selection = SelectionSet::new();
        let updated = apply_action(&docs, &selection, ActionType::Approved);
        assert_eq!(updated, docs);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_reset_action() {
        let mut docs = sample_documents();
        let id = DeclarationNumber::from("1234567890123");
        docs[0].action = Some(ActionType::Approved);

        assert!(reset_action(&mut docs, &id));
        assert_eq!(docs[0].action, None);
        assert!(!reset_action(&mut docs, &id));
    }

    #[test]
    fn test_policy_parsing_and_visibility() {
        assert_eq!("retain".parse::<ActionPolicy>().unwrap(), ActionPolicy::RetainWithBadge);
        assert_eq!("REMOVE".parse::<ActionPolicy>().unwrap(), ActionPolicy::RemoveFromView);
        assert!("archive".parse::<ActionPolicy>().is_err());

        let mut doc = sample_documents().remove(0);
        doc.action = Some(ActionType::Approved);
        assert!(ActionPolicy::RetainWithBadge.shows(&doc));
        assert!(!ActionPolicy::RemoveFromView.shows(&doc));
    }
}
