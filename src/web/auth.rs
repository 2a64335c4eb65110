use crate::session::{ErrorKey, Session, UserIdKey};
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Admin pages need a logged-in user; everyone else goes to the login form.
pub async fn require_admin(session: Session, request: Request, next: Next) -> Response {
    if session.get(&UserIdKey).is_none() {
        tracing::debug!(path = %request.uri().path(), "admin page without login");
        session.put(&ErrorKey, &"Log in first!".to_string());
        return Redirect::to("/user/login").into_response();
    }
    next.run(request).await
}
