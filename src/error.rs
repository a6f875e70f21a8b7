// feedback-report-service/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::renderers::TemplateKind;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Template {} not found", .0.file_label())]
    TemplateMissing(TemplateKind),

    #[error("Template {} could not be decoded: {1}", .0.file_label())]
    TemplateInvalid(TemplateKind, String),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("Only {available} unused usernames left for prefix {prefix}, {requested} requested")]
    CredentialSpaceExhausted {
        prefix: String,
        requested: usize,
        available: usize,
    },

    #[error("Login {0} has already been used to submit feedback")]
    CredentialUsed(String),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Report generation timed out after {0}s")]
    Timeout(u64),
}

impl ReportError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ReportError::NotFound(_) => "not_found",
            ReportError::Validation(_) => "validation",
            ReportError::TemplateMissing(_) => "template_missing",
            ReportError::TemplateInvalid(..) => "template_invalid",
            ReportError::Store(_) => "store_error",
            ReportError::CredentialSpaceExhausted { .. } => "credential_space_exhausted",
            ReportError::CredentialUsed(_) => "credential_used",
            ReportError::Render(_) => "render_error",
            ReportError::Timeout(_) => "timeout",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::CredentialSpaceExhausted { .. } | ReportError::CredentialUsed(_) => {
                StatusCode::CONFLICT
            }
            ReportError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ReportError::TemplateMissing(_)
            | ReportError::TemplateInvalid(..)
            | ReportError::Store(_)
            | ReportError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Store failures never leak their internals to the caller.
    pub fn to_error_response(&self) -> ErrorResponse {
        let message = match self {
            ReportError::Store(_) => "Server error".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            success: false,
            message,
            error_type: self.error_type().to_string(),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, error_type = self.error_type(), "Request failed");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_hide_details() {
        let err = ReportError::Store(anyhow::anyhow!("relation \"feedback\" does not exist"));
        let body = err.to_error_response();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Server error");
        assert_eq!(body.error_type, "store_error");
        assert!(!body.success);
    }

    #[test]
    fn missing_templates_name_the_file() {
        let theory = ReportError::TemplateMissing(TemplateKind::Theory);
        let header = ReportError::TemplateMissing(TemplateKind::Header);

        assert_eq!(theory.to_string(), "Template theory not found");
        assert_eq!(header.to_string(), "Template header not found");
        assert_ne!(theory.to_string(), header.to_string());
    }

    #[test]
    fn exhaustion_is_a_conflict() {
        let err = ReportError::CredentialSpaceExhausted {
            prefix: "SECS1".into(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.error_type(), "credential_space_exhausted");
    }
}
