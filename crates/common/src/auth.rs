use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::{Request, State},
};
use sha2::{Digest, Sha256};
use tower_sessions::Session;
use std::sync::Arc;
use crate::AppState;

pub const AUTH_SESSION_KEY: &str = "authenticated";

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    // If no password is set, authentication is disabled
    if state.config.app_password.is_none() {
        return next.run(request).await;
    }

    let authenticated = match session.get::<bool>(AUTH_SESSION_KEY).await {
        Ok(flag) => flag.unwrap_or(false),
        Err(e) => {
            tracing::warn!("Failed to read session: {}", e);
            false
        }
    };

    if authenticated {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}

/// Compares SHA-256 digests so timing depends on neither content nor length.
pub fn password_matches(candidate: &str, expected: &str) -> bool {
    let a = Sha256::digest(candidate.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
