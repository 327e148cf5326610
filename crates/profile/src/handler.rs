use crate::models::{Profile, RawUpdateProfileRequest};
use crate::service::{ProfileError, ProfileService};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use askama::Template;
use common::money::{Currency, Locale, MoneyFormat};
use common::AppState;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ProfileError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ProfileError::NotFound => (StatusCode::NOT_FOUND, "Profile not found".to_string()),
            ProfileError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub struct ChoiceView {
    pub key: &'static str,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub name: String,
    pub email: String,
    pub currencies: Vec<ChoiceView>,
    pub locales: Vec<ChoiceView>,
    pub saved: bool,
    pub error: Option<String>,
}

impl SettingsTemplate {
    fn new(profile: &Profile, saved: bool, error: Option<String>) -> Self {
        let currencies = Currency::ALL
            .into_iter()
            .map(|c| ChoiceView {
                key: c.key(),
                label: format!("{} {}", c.symbol(), c.key()),
                selected: c == profile.currency,
            })
            .collect();
        let sample = 123_456_700;
        let locales = Locale::ALL
            .into_iter()
            .map(|l| ChoiceView {
                key: l.key(),
                label: format!("{} ({})", MoneyFormat::new(profile.currency, l).format_plain(sample), l.key()),
                selected: l == profile.locale,
            })
            .collect();

        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            currencies,
            locales,
            saved,
            error,
        }
    }
}

#[derive(Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    pub saved: bool,
}

pub fn profile_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(settings_view).post(update_settings))
        .route("/api", get(profile_api))
        .with_state(state)
}

async fn settings_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettingsQuery>,
) -> Result<impl IntoResponse, ProfileError> {
    let profile = ProfileService::get_profile(&state.db).await?;
    let template = SettingsTemplate::new(&profile, query.saved, None);
    Ok(Html(template.render().map_err(|e| ProfileError::Infrastructure(e.to_string()))?))
}

async fn profile_api(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Profile>, ProfileError> {
    let profile = ProfileService::get_profile(&state.db).await?;
    Ok(Json(profile))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<RawUpdateProfileRequest>,
) -> Result<Response, ProfileError> {
    match ProfileService::update_profile(
        &state.db,
        payload.name,
        payload.email,
        payload.currency,
        payload.locale,
    )
    .await
    {
        Ok(_) => Ok(Redirect::to("/settings?saved=true").into_response()),
        Err(ProfileError::InvalidInput(msg)) => {
            tracing::warn!("Rejected profile update: {}", msg);
            let profile = ProfileService::get_profile(&state.db).await?;
            let template = SettingsTemplate::new(&profile, false, Some(msg));
            let html = template.render().map_err(|e| ProfileError::Infrastructure(e.to_string()))?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
        Err(e) => {
            tracing::error!("update_profile error: {:?}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_choices_show_grouping_sample() {
        let profile = Profile {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            currency: Currency::Euro,
            locale: Locale::De,
        };
        let view = SettingsTemplate::new(&profile, false, None);
        let labels: Vec<&str> = view.locales.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["1,234,567 (en)", "1.234.567 (de)", "1\u{202f}234\u{202f}567 (fr)", "12,34,567 (in)"]);
        assert!(view.locales[1].selected);
    }
}
