//! HTTP error responses.
//!
//! Two body shapes are in use: the legacy and lookup endpoints answer
//! `{"success": false, "error": ..}`, the current generation and raw proxy
//! endpoints answer a bare `{"error": ..}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use petition_cnpj::LookupError;
use petition_docgen::DocgenError;
use petition_docgen::ErrorKind;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{"success": false, "error": ..}`
    Flagged,
    /// `{"error": ..}`
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub envelope: Envelope,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            envelope: Envelope::Flagged,
        }
    }

    pub fn bare(mut self) -> Self {
        self.envelope = Envelope::Bare;
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<DocgenError> for ApiError {
    fn from(err: DocgenError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Rendering => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "document generation failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let status =
            StatusCode::from_u16(err.proxy_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.envelope {
            Envelope::Flagged => json!({ "success": false, "error": self.message }),
            Envelope::Bare => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petition_cnpj::LookupSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn docgen_kinds_map_to_status() {
        let cases = [
            (DocgenError::MissingLegacyFields, StatusCode::BAD_REQUEST),
            (DocgenError::UnknownKind("x".into()), StatusCode::BAD_REQUEST),
            (DocgenError::TemplateNotFound("x.docx".into()), StatusCode::NOT_FOUND),
            (DocgenError::PdfMissing, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn lookup_status_is_passed_through() {
        let err = LookupError::Status {
            provider: LookupSource::BrasilApi,
            status: 429,
        };
        assert_eq!(ApiError::from(err).status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::from(LookupError::NotFound).status, StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(LookupError::NotFound).message,
            "CNPJ não encontrado em nenhuma fonte"
        );
    }

    #[test]
    fn bare_switches_envelope() {
        let err = ApiError::not_found("x").bare();
        assert_eq!(err.envelope, Envelope::Bare);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
