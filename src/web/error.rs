//! Turning failures into responses.

use crate::errors::{AppError, ErrorKind};
use crate::session::{ErrorKey, FlashKey, Session, WarningKey};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

pub type WebResult = Result<Response, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => match self.kind() {
                ErrorKind::Validation | ErrorKind::Parse | ErrorKind::SessionMissing => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::Persistence | ErrorKind::Unexpected => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Fallback for errors a handler did not turn into a redirect itself.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let message = if status.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Error notice plus a 303 back to `to`. A 303 is followed with GET, so a
/// failed POST never gets replayed against a GET-only page.
pub fn fail_to(session: &Session, to: &str, message: impl Into<String>) -> Response {
    let message = message.into();
    tracing::info!(to, %message, "redirecting with error");
    session.put(&ErrorKey, &message);
    Redirect::to(to).into_response()
}

/// Like [`fail_to`], with the message derived from `err`.
pub fn fail_with(session: &Session, to: &str, err: &AppError) -> Response {
    let message = match err.kind() {
        ErrorKind::Parse => format!("Invalid input: {}", err),
        ErrorKind::SessionMissing => "Your session has expired, please start again".to_string(),
        ErrorKind::Persistence => match err {
            AppError::NotFound(what) => format!("{} not found", what),
            _ => "Something went wrong while saving or loading data".to_string(),
        },
        _ => err.to_string(),
    };
    if err.kind() == ErrorKind::Persistence {
        tracing::error!(error = %err, "store failure");
    }
    fail_to(session, to, message)
}

/// Flash notice plus a 303 to `to`.
pub fn done(session: &Session, to: &str, message: impl Into<String>) -> Response {
    session.put(&FlashKey, &message.into());
    Redirect::to(to).into_response()
}

pub fn warn(session: &Session, message: impl Into<String>) {
    session.put(&WarningKey, &message.into());
}
