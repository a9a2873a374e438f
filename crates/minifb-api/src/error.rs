use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use minifb_social::SocialError;
use minifb_types::api::ErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    Social(SocialError),
    /// The request never reached a handler: bad path segment or body.
    Rejected { status: StatusCode, message: String },
    Internal,
}

impl From<SocialError> for ApiError {
    fn from(e: SocialError) -> Self {
        Self::Social(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Social(e) => match e {
                SocialError::ProfileNotFound | SocialError::StatusNotFound => StatusCode::NOT_FOUND,
                SocialError::InvalidRelationship => StatusCode::BAD_REQUEST,
                SocialError::DuplicateRelationship | SocialError::ProfileExists => StatusCode::CONFLICT,
                SocialError::InvalidProfile(_) | SocialError::EmptyStatus => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                SocialError::NotOwner => StatusCode::FORBIDDEN,
                SocialError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Rejected { status, .. } => *status,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Storage details stay in the log.
            Self::Social(SocialError::Storage(e)) => {
                error!("Storage failure: {:#}", e);
                "internal error".to_string()
            }
            Self::Social(e) => e.to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Internal => "internal error".to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
