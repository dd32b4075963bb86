use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use menu_core::error::{DomainError, ErrorKind};

use crate::response::ErrorBody;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body rejected: {message}")]
    Body { status: StatusCode, message: String },
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Domain(err.into())
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Domain(e) => e.kind(),
            ApiError::BadRequest(_) | ApiError::Body { .. } => ErrorKind::Parse,
        }
    }

    pub fn status(&self) -> StatusCode {
        if let ApiError::Body { status, .. } = self {
            return *status;
        }
        match self.kind() {
            ErrorKind::Parse | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.kind().as_str();

        let (message, error_id) = match self.kind() {
            ErrorKind::Persistence => {
                // Storage details stay in the log; the client gets a reference.
                let error_id = Uuid::new_v4().to_string();
                tracing::error!(error_id = %error_id, "Storage failure: {}", self);
                ("Internal storage error".to_string(), Some(error_id))
            }
            _ => {
                tracing::warn!("{}: {}", code, self);
                (self.to_string(), None)
            }
        };

        let body = Json(ErrorBody {
            success: false,
            error: message,
            code,
            error_id,
        });

        (status, body).into_response()
    }
}
