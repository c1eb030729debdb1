use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures that can occur while handling an optimization request.
///
/// Client mistakes map to 400; everything past form validation maps to 500
/// with a generic body, the underlying cause going to the log only.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Multipart(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::UnsupportedFormat(format) => {
                tracing::error!("unsupported image format: {}", format);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing the image".to_string(),
                )
            }
            AppError::Image(e) => {
                tracing::error!("image error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing the image".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing the image".to_string(),
                )
            }
            AppError::Processing(msg) => {
                tracing::error!("processing error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing the image".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

/// Fatal initialization failures surfaced before the server starts.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("external compressor `{0}` is not available on PATH")]
    CompressorUnavailable(String),
}
