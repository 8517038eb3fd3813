// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextLensError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No text could be extracted from the image")]
    NoTextExtracted,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid analysis context: {0}")]
    InvalidContext(String),

    #[error("Failed to parse model response: {0}")]
    ModelResponseParse(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl TextLensError {
    fn error_type(&self) -> &'static str {
        match self {
            TextLensError::Validation(_) => "ValidationError",
            TextLensError::NoTextExtracted => "NoTextExtractedError",
            TextLensError::MissingField(_) => "MissingFieldError",
            TextLensError::InvalidContext(_) => "InvalidContextError",
            TextLensError::ModelResponseParse(_) => "ModelResponseParseError",
            TextLensError::Timeout(_) => "TimeoutError",
            TextLensError::Processing(_) => "ProcessingError",
        }
    }

    fn details(&self) -> String {
        match self {
            TextLensError::Validation(d)
            | TextLensError::MissingField(d)
            | TextLensError::InvalidContext(d)
            | TextLensError::ModelResponseParse(d)
            | TextLensError::Timeout(d)
            | TextLensError::Processing(d) => d.clone(),
            TextLensError::NoTextExtracted => self.to_string(),
        }
    }
}

impl ResponseError for TextLensError {
    fn status_code(&self) -> StatusCode {
        match self {
            TextLensError::Validation(_)
            | TextLensError::NoTextExtracted
            | TextLensError::MissingField(_)
            | TextLensError::InvalidContext(_) => StatusCode::BAD_REQUEST,
            TextLensError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            TextLensError::ModelResponseParse(_) | TextLensError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
            "error": {
                "type": self.error_type(),
                "details": self.details(),
                "timestamp": chrono::Utc::now(),
            }
        }))
    }
}

// A malformed multipart body is a bad request, not an internal fault.
impl From<actix_multipart::MultipartError> for TextLensError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        TextLensError::Validation(format!("Malformed multipart body: {}", err))
    }
}
