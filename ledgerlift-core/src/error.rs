//! Fatal ingestion failures.
//!
//! Anything that can be resolved with a best-effort fallback is not an error;
//! it shows up as a counter on `ParsedStatement` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file extension {extension:?} (expected xlsx, xls or csv)")]
    UnsupportedExtension { extension: String },

    #[error("unreadable workbook: {reason}")]
    UnreadableWorkbook { reason: String },
}

impl IngestError {
    pub fn unsupported(extension: impl Into<String>) -> Self {
        IngestError::UnsupportedExtension {
            extension: extension.into(),
        }
    }

    pub fn unreadable(reason: impl ToString) -> Self {
        IngestError::UnreadableWorkbook {
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = IngestError::unsupported("pdf");
        assert_eq!(
            err.to_string(),
            "unsupported file extension \"pdf\" (expected xlsx, xls or csv)"
        );

        let err = IngestError::unreadable("zip header missing");
        assert_eq!(err.to_string(), "unreadable workbook: zip header missing");
    }
}
