//! Session cookie handling.

use crate::errors::AppError;
use crate::registry::AppRegistry;
use crate::session::Session;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "hotelbook_session";

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Attach a [`Session`] to every request and send the cookie back once the
/// session has been stored or renewed. Requests that never write to their
/// session get no cookie and leave nothing behind.
pub async fn session_layer(
    State(registry): State<AppRegistry>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = registry.sessions().load(session_id(request.headers()));
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if session.needs_cookie() {
        let secure = if registry.secure_cookies() { "; Secure" } else { "" };
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
            COOKIE_NAME,
            session.id(),
            secure
        );
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                response.headers_mut().append(SET_COOKIE, v);
            }
            Err(e) => tracing::error!(error = %e, "invalid session cookie"),
        }
    }
    response
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Other("session layer not installed".into()))
    }
}
