//! Checked rows of the verification table, keyed by declaration number

use std::collections::BTreeSet;

use crate::models::DeclarationNumber;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<DeclarationNumber>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &DeclarationNumber) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &DeclarationNumber) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop every id that is not among `visible`. Returns how many were dropped.
    pub fn reconcile<'a, I>(&mut self, visible: I) -> usize
    where
        I: IntoIterator<Item = &'a DeclarationNumber>,
    {
        let visible: BTreeSet<&DeclarationNumber> = visible.into_iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| visible.contains(id));
        before - self.selected.len()
    }
}
