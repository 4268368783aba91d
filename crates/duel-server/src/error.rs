//! Mapping of duel errors onto HTTP responses.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use duel_core::protocol::ErrorBody;
use duel_core::DuelError;

/// Application error type
pub enum AppError {
    /// Rejected by the duel engine
    Duel(DuelError),
    /// Body or path could not be decoded
    Request { status: StatusCode, message: String },
}

impl From<DuelError> for AppError {
    fn from(e: DuelError) -> Self {
        AppError::Duel(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Request {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Request {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// `Json` extractor whose rejections use the service's error body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor whose rejections use the service's error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl AppError {
    pub fn status(&self) -> StatusCode {
        let e = match self {
            AppError::Duel(e) => e,
            AppError::Request { status, .. } => return *status,
        };
        match e {
            DuelError::NotFound(_) => StatusCode::NOT_FOUND,
            DuelError::NotAParticipant(_) => StatusCode::FORBIDDEN,
            DuelError::AlreadyJoined
            | DuelError::SelfJoin
            | DuelError::WrongPhase { .. }
            | DuelError::DuplicateCommitment(_)
            | DuelError::DuplicateReveal(_) => StatusCode::CONFLICT,
            DuelError::InvalidStake
            | DuelError::InvalidAllocation(_)
            | DuelError::CommitmentVerificationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            DuelError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            AppError::Duel(e) => ErrorBody {
                error: e.kind().to_string(),
                message: e.to_string(),
                retryable: e.is_retryable(),
            },
            AppError::Request { message, .. } => ErrorBody {
                error: "invalid_request".to_string(),
                message: message.clone(),
                retryable: false,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Duel(e @ DuelError::Store(_)) = &self {
            tracing::error!("Storage failure: {}", e);
        }

        (status, Json(self.body())).into_response()
    }
}
