//! Reference documents and upload payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media type accepted by the upload endpoint.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Upload size ceiling (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// An uploaded reference document that can be attached as chat context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(default)]
    pub user_id: String,

    pub filename: String,

    /// Size in bytes
    #[serde(default)]
    pub file_size: u64,

    #[serde(default)]
    pub page_count: u32,

    #[serde(default)]
    pub processed: bool,

    #[serde(with = "crate::time")]
    pub created_at: DateTime<Utc>,
}

/// A binary payload selected by the user for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_document_type(&self) -> bool {
        self.media_type.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }

    /// Guess a media type from a file name, the way a file picker would.
    pub fn media_type_for(filename: &str) -> &'static str {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            PDF_MEDIA_TYPE
        } else if lower.ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        }
    }
}
