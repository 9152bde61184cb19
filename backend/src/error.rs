//! Engine error type and its HTTP mapping.
//!
//! Variants are grouped the way callers treat them:
//! - schema defects (`UnknownField`, `InvalidFieldKind`, `IndexOutOfRange`, ...)
//!   mean the template catalog or the caller is broken;
//! - `UnresolvedTemplateToken` refuses to render a template that would leak raw tokens;
//! - rendering errors are retried by the operator with the form left untouched;
//! - submission errors keep the form and the artifact so the operator can resend.
//!
//! Missing required fields are not errors; see `editor::FormState::validate`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Operator-facing message when the submission endpoint gives no reason.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Gagal mengirim surat keluar";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("duplicate template id '{0}' in catalog")]
    DuplicateTemplate(String),

    #[error("template '{template}' declares field '{field}' more than once")]
    DuplicateField { template: String, field: String },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' is {actual}, expected {expected}")]
    InvalidFieldKind {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("index {index} out of range for field '{field}' with {len} items")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("template '{template}' references undeclared token '{token}'")]
    UnresolvedTemplateToken { template: String, token: String },

    #[error("render target not ready: {0}")]
    RenderTargetNotReady(String),

    #[error("rasterization failed: {0}")]
    RasterizationFailed(String),

    #[error("{0}")]
    SubmissionRejected(String),

    #[error("submission transport error: {0}")]
    SubmissionTransport(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("attachment conversion failed: {0}")]
    AttachmentConversionFailed(String),

    #[error("unknown session '{0}'")]
    UnknownSession(String),
}

impl EngineError {
    /// Recoverable errors leave the session usable and may be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::RenderTargetNotReady(_)
                | EngineError::RasterizationFailed(_)
                | EngineError::SubmissionRejected(_)
                | EngineError::SubmissionTransport(_)
                | EngineError::DownloadFailed(_)
                | EngineError::AttachmentConversionFailed(_)
        )
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::UnknownTemplate(_)
            | EngineError::UnknownField(_)
            | EngineError::UnknownSession(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidFieldKind { .. } | EngineError::IndexOutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            EngineError::DuplicateTemplate(_)
            | EngineError::DuplicateField { .. }
            | EngineError::UnresolvedTemplateToken { .. }
            | EngineError::DownloadFailed(_)
            | EngineError::AttachmentConversionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::RenderTargetNotReady(_) | EngineError::RasterizationFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::SubmissionRejected(_) | EngineError::SubmissionTransport(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            EngineError::SubmissionTransport(_) => GENERIC_SUBMISSION_FAILURE.to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_and_submission_errors_are_recoverable() {
        assert!(EngineError::RenderTargetNotReady("fonts".into()).is_recoverable());
        assert!(EngineError::SubmissionTransport("reset".into()).is_recoverable());
        assert!(EngineError::AttachmentConversionFailed("panicked".into()).is_recoverable());
        assert!(!EngineError::UnknownField("x".into()).is_recoverable());
        assert!(!EngineError::UnresolvedTemplateToken {
            template: "t".into(),
            token: "x".into()
        }
        .is_recoverable());
    }

    #[test]
    fn schema_errors_map_to_client_statuses() {
        let err = EngineError::IndexOutOfRange {
            field: "agenda".into(),
            index: 9,
            len: 4,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            EngineError::UnknownSession("s".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
