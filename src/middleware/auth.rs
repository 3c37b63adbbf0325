use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::handlers::SESSION_USER_KEY;
use crate::models::User;

/// The management routes are only reachable by an administrator session;
/// anyone else is sent back to the login page.
pub async fn require_admin(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if path == "/" || path == "/login" || path == "/logout" || path.starts_with("/static") {
        return next.run(req).await;
    }

    match session.get::<User>(SESSION_USER_KEY).await {
        Ok(Some(user)) if user.is_admin => next.run(req).await,
        _ => Redirect::to("/").into_response(),
    }
}
