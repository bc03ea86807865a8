//! Document library: the candidate set behind the context selector.

use std::sync::Arc;

use chat_client::{ChatBackend, Page};
use chat_core::Document;
use tracing::{debug, info, warn};

use crate::error::{ChatError, Result};
use crate::notice::Notifier;
use crate::store::ChatStore;

#[derive(Clone)]
pub struct DocumentLibrary {
    backend: Arc<dyn ChatBackend>,
    store: ChatStore,
    notifier: Notifier,
}

impl DocumentLibrary {
    pub fn new(backend: Arc<dyn ChatBackend>, store: ChatStore, notifier: Notifier) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    /// Fetch the user's documents into the candidate set.
    pub async fn load(&self) -> Result<Vec<Document>> {
        match self.backend.list_documents(Page::documents()).await {
            Ok(documents) => {
                debug!("Loaded {} documents", documents.len());
                self.store.update(|state| state.selector.replace_candidates(documents.clone()));
                Ok(documents)
            }
            Err(err) => {
                let err = ChatError::from(err);
                warn!("Failed to load documents: {}", err);
                self.notifier.failure("Failed to load documents", &err, None);
                Err(err)
            }
        }
    }

    /// Delete on the backend, then drop the document from candidates and
    /// selection together.
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        if let Err(err) = self.backend.delete_document(document_id).await {
            let err = ChatError::from(err);
            warn!("Failed to delete document {}: {}", document_id, err);
            self.notifier.failure("Failed to delete document", &err, None);
            return Err(err);
        }

        self.store
            .update(|state| state.selector.remove_candidate(document_id));
        info!("Deleted document {}", document_id);
        self.notifier.success("Document deleted successfully");
        Ok(())
    }

    pub fn toggle(&self, document_id: &str) -> bool {
        self.store.update(|state| state.selector.toggle(document_id))
    }

    pub fn select_all(&self) {
        self.store.update(|state| state.selector.select_all());
    }

    pub fn clear_selection(&self) {
        self.store.update(|state| state.selector.clear_selection());
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.store
            .read(|state| state.selector.selected_ids().to_vec())
    }
}
