//! Context selector
//!
//! Holds the document candidate set and the ordered subset selected as
//! grounding context. Every selected id is present in the candidate set.

use chat_core::{ContextKind, Document};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSelector {
    candidates: Vec<Document>,
    selected: Vec<String>,
}

impl ContextSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Document] {
        &self.candidates
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, document_id: &str) -> bool {
        self.selected.iter().any(|id| id == document_id)
    }

    pub fn has_candidate(&self, document_id: &str) -> bool {
        self.candidates.iter().any(|doc| doc.id == document_id)
    }

    pub fn context_kind(&self) -> ContextKind {
        ContextKind::for_selection(&self.selected)
    }

    /// Add `document_id` to the selection if absent, remove it if present.
    ///
    /// Ids outside the candidate set are ignored. Returns whether the id is
    /// selected afterwards.
    pub fn toggle(&mut self, document_id: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|id| id == document_id) {
            self.selected.remove(pos);
            return false;
        }
        if !self.has_candidate(document_id) {
            return false;
        }
        self.selected.push(document_id.to_string());
        true
    }

    /// Select every candidate, or clear the selection when it is already full.
    pub fn select_all(&mut self) {
        if self.selected.len() == self.candidates.len() {
            self.selected.clear();
        } else {
            self.selected = self.candidates.iter().map(|doc| doc.id.clone()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drop a document from both the candidates and the selection.
    pub fn remove_candidate(&mut self, document_id: &str) {
        self.candidates.retain(|doc| doc.id != document_id);
        self.selected.retain(|id| id != document_id);
    }

    /// Put a newly uploaded document at the front of the candidates.
    pub fn add_candidate(&mut self, document: Document) {
        self.candidates.retain(|doc| doc.id != document.id);
        self.candidates.insert(0, document);
    }

    /// Swap in a freshly fetched candidate set, keeping selected ids that
    /// still exist.
    pub fn replace_candidates(&mut self, documents: Vec<Document>) {
        self.candidates = documents;
        let candidates = &self.candidates;
        self.selected.retain(|id| candidates.iter().any(|doc| &doc.id == id));
    }
}
