use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use bcrypt::verify;
use std::fs;
use tower_sessions::Session;

use crate::config::Config;
use crate::models::{LoginForm, User};
use crate::store::UserStore;

/// Session key holding the logged-in user's record snapshot. Written at
/// login, removed at logout, never re-synced from the store in between, so
/// a stale profile is expected until the next login.
pub const SESSION_USER_KEY: &str = "current-user";

pub async fn serve_login_page() -> impl IntoResponse {
    let login_html = fs::read_to_string("templates/login.html")
        .unwrap_or_else(|_| "Error loading login page".to_string());
    Html(login_html)
}

#[axum::debug_handler]
pub async fn handle_login(
    State((store, _)): State<(UserStore, Config)>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> Response {
    tracing::info!("Login attempt for {}", login_form.email);

    match store.find_by_email(&login_form.email).await {
        Some(user) => {
            if verify(&login_form.password, &user.password_hash).unwrap_or(false) {
                tracing::info!("Password verified for {}", login_form.email);
                if let Err(e) = session.insert(SESSION_USER_KEY, user).await {
                    tracing::error!("Session error: {}", e);
                    return Redirect::to("/?error=Server%20error").into_response();
                }
                Redirect::to("/users").into_response()
            } else {
                tracing::info!("Invalid password for {}", login_form.email);
                Redirect::to("/?error=Password%20is%20incorrect%2C%20please%20re-enter").into_response()
            }
        }
        None => {
            tracing::info!("No account for {}", login_form.email);
            Redirect::to("/?error=No%20account%20matches%20this%20email").into_response()
        }
    }
}

#[axum::debug_handler]
pub async fn handle_logout(
    session: Session,
) -> Response {
    if let Err(e) = session.remove::<User>(SESSION_USER_KEY).await {
        tracing::warn!("Session removal error: {}", e);
    }
    Redirect::to("/").into_response()
}
