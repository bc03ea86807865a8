//! Upload coordinator
//!
//! Media type and size are checked before anything touches the network.

use std::sync::Arc;

use chat_client::{ChatBackend, UploadedDocument};
use chat_core::{DocumentUpload, MAX_UPLOAD_BYTES};
use tracing::{info, warn};

use crate::error::{ChatError, Result, ValidationError};
use crate::notice::{NoticeLevel, Notifier};
use crate::store::ChatStore;

const UPLOAD_NOTICE_KEY: &str = "upload";

#[derive(Clone)]
pub struct UploadCoordinator {
    backend: Arc<dyn ChatBackend>,
    store: ChatStore,
    notifier: Notifier,
}

impl UploadCoordinator {
    pub fn new(backend: Arc<dyn ChatBackend>, store: ChatStore, notifier: Notifier) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    pub fn validate(upload: &DocumentUpload) -> std::result::Result<(), ValidationError> {
        if !upload.is_document_type() {
            return Err(ValidationError::InvalidFileType {
                media_type: upload.media_type.clone(),
            });
        }
        if upload.size() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::FileTooLarge {
                size: upload.size(),
                limit: MAX_UPLOAD_BYTES,
            });
        }
        Ok(())
    }

    /// Upload a document and add it to the front of the candidate set.
    pub async fn upload(&self, upload: DocumentUpload) -> Result<UploadedDocument> {
        if let Err(err) = Self::validate(&upload) {
            warn!("Rejected upload of {}: {}", upload.filename, err);
            let err = ChatError::from(err);
            self.notifier.error(err.to_string());
            return Err(err);
        }

        let filename = upload.filename.clone();
        self.store.update(|state| state.uploading = true);
        self.notifier.loading(UPLOAD_NOTICE_KEY, "Uploading and processing PDF...");

        let result = self.backend.upload_document(upload).await;
        self.store.update(|state| {
            state.uploading = false;
            if let Ok(uploaded) = &result {
                state.selector.add_candidate(uploaded.document.clone());
            }
        });

        match result {
            Ok(uploaded) => {
                info!(
                    "Uploaded {} as {} ({} chunks)",
                    filename, uploaded.document.id, uploaded.chunks_created
                );
                self.notifier.notify(
                    NoticeLevel::Success,
                    format!(
                        "PDF uploaded successfully! Created {} chunks.",
                        uploaded.chunks_created
                    ),
                    Some(UPLOAD_NOTICE_KEY),
                );
                Ok(uploaded)
            }
            Err(err) => {
                let err = ChatError::from(err);
                warn!("Upload of {} failed: {}", filename, err);
                self.notifier
                    .failure("Failed to upload PDF", &err, Some(UPLOAD_NOTICE_KEY));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::PDF_MEDIA_TYPE;

    #[test]
    fn test_rejects_non_pdf_before_size() {
        let upload = DocumentUpload::new("notes.txt", "text/plain", vec![0; 32]);
        assert_eq!(
            UploadCoordinator::validate(&upload),
            Err(ValidationError::InvalidFileType {
                media_type: "text/plain".to_string()
            })
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let limit = MAX_UPLOAD_BYTES as usize;
        let at_limit = DocumentUpload::new("a.pdf", PDF_MEDIA_TYPE, vec![0; limit]);
        assert!(UploadCoordinator::validate(&at_limit).is_ok());

        let over = DocumentUpload::new("b.pdf", PDF_MEDIA_TYPE, vec![0; limit + 1]);
        assert!(matches!(
            UploadCoordinator::validate(&over),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }
}
