use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use common::{AppState, auth::{AUTH_SESSION_KEY, password_matches}};
use std::sync::Arc;
use askama::Template;
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

fn render_login(status: StatusCode, error: Option<String>) -> Response {
    let template = LoginTemplate { error };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render login page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template Error").into_response()
        }
    }
}

pub async fn login_get(
    State(state): State<Arc<AppState>>,
) -> Response {
    if state.config.app_password.is_none() {
        return Redirect::to("/").into_response();
    }

    render_login(StatusCode::OK, None)
}

pub async fn login_post(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(payload): Form<LoginForm>,
) -> Response {
    let Some(correct_password) = &state.config.app_password else {
        return Redirect::to("/").into_response();
    };

    if password_matches(&payload.password, correct_password) {
        if let Err(e) = session.cycle_id().await {
            tracing::warn!("Failed to rotate session id: {}", e);
        }
        if let Err(e) = session.insert(AUTH_SESSION_KEY, true).await {
            tracing::error!("Failed to store login in session: {}", e);
            return render_login(StatusCode::INTERNAL_SERVER_ERROR, Some("Could not log you in, please retry".into()));
        }
        return Redirect::to("/").into_response();
    }

    tracing::warn!("Rejected login attempt");
    render_login(StatusCode::UNAUTHORIZED, Some("Invalid password".into()))
}

pub async fn logout(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to clear session: {}", e);
    }
    Redirect::to("/login").into_response()
}
