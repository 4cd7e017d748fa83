//! Study plan attachment and the client-side checks it must pass before it
//! can gate the shortlist request.

use std::path::Path;

use bytes::Bytes;

use crate::error::ValidationError;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const MAX_STUDY_PLAN_BYTES: u64 = 10 * 1024 * 1024;

/// An attached document. The bytes are reference counted: cloning the
/// attachment, or handing it to an outgoing request, never copies the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlanFile {
    filename: String,
    mime_type: String,
    bytes: Bytes,
}

impl StudyPlanFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a document from disk. The MIME type is guessed from the
    /// extension and the size is checked against the file metadata before the
    /// content is loaded.
    pub async fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let unreadable = |reason: String| ValidationError::UnreadableFile {
            path: path.display().to_string(),
            reason,
        };

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| unreadable(err.to_string()))?;
        check_constraints(&mime_type, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| unreadable(err.to_string()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "study_plan.pdf".to_string());

        let file = Self::new(filename, mime_type, bytes);
        file.validate()?;
        Ok(file)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap handle on the same buffer, used as the request body.
    pub fn shared_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_constraints(&self.mime_type, self.size_bytes())
    }
}

fn check_constraints(mime_type: &str, size: u64) -> Result<(), ValidationError> {
    if !mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE) {
        return Err(ValidationError::UnsupportedFileType {
            mime_type: mime_type.to_string(),
        });
    }
    if size > MAX_STUDY_PLAN_BYTES {
        return Err(ValidationError::FileTooLarge {
            size,
            limit: MAX_STUDY_PLAN_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/study_plan_tests.rs"]
mod tests;
