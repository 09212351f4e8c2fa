use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::pages;
use super::validation::FormValidationError;
use crate::config::FormLimits;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{source}")]
    InvalidForm {
        #[source]
        source: FormValidationError,
        limits: FormLimits,
    },
    #[error("form could not be read: {reason}")]
    UnreadableForm {
        status: StatusCode,
        reason: String,
        limits: FormLimits,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidForm { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnreadableForm { status, .. } => *status,
        }
    }

    /// Text shown above the re-rendered form
    fn notice(&self) -> String {
        match self {
            ApiError::InvalidForm { source, .. } => source.to_string(),
            ApiError::UnreadableForm { .. } => {
                "The form could not be read. Please fill in every field.".to_string()
            }
        }
    }

    fn limits(&self) -> &FormLimits {
        match self {
            ApiError::InvalidForm { limits, .. } | ApiError::UnreadableForm { limits, .. } => {
                limits
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let page = pages::index_page(self.limits(), Some(&self.notice()));

        (status, page).into_response()
    }
}
