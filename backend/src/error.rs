use actix_web::http::StatusCode;
use thiserror::Error;

/// Request-scoped failure kinds for the classification pipeline. Every
/// variant is non-fatal: the handler logs it and answers with a retry
/// message, and the process keeps serving.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no file was provided in the upload")]
    MissingUpload,
    #[error("disallowed file extension on {0:?}")]
    InvalidFileType(String),
    #[error("no model is loaded")]
    ModelUnavailable,
    #[error("image processing failed: {0}")]
    ImageProcessing(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

impl ClassifyError {
    /// Fixed user-facing message shown on the home page after a redirect.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClassifyError::MissingUpload => "No file selected",
            ClassifyError::InvalidFileType(_) => {
                "Invalid file type. Please upload an image file."
            }
            ClassifyError::ModelUnavailable => "Model not available. Please try again later.",
            ClassifyError::ImageProcessing(_) | ClassifyError::Inference(_) => {
                "Error processing image. Please try again."
            }
        }
    }

    /// Status for the JSON API surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifyError::MissingUpload | ClassifyError::InvalidFileType(_) => {
                StatusCode::BAD_REQUEST
            }
            ClassifyError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ClassifyError::ImageProcessing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ClassifyError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
