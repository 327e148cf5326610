use crate::models::{Category, CategoryActivity, RawCreateCategoryRequest, UpdateCategoryRequest};
use crate::service::{CategoryError, CategoryReport, CategoryService};
use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use common::ledger::CategoryIcon;
use common::money::MoneyFormat;
use common::AppState;
use profile::service::ProfileService;
use reporting::ChartSeries;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CategoryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            CategoryError::NotFound => (StatusCode::NOT_FOUND, "Category not found".to_string()),
            CategoryError::Report(e) => {
                tracing::error!("Category report failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            CategoryError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub struct IconChoice {
    pub key: &'static str,
    pub class: &'static str,
}

pub struct ChartBarView {
    pub label: String,
    pub amount: String,
    pub percent: i64,
}

pub struct ActivityRowView {
    pub title: String,
    pub description: String,
    pub kind: String,
    pub kind_class: &'static str,
    pub date_display: String,
    pub amount: String,
}

pub struct CategoryRowView {
    pub id: i64,
    pub name: String,
    pub icon_key: &'static str,
    pub icon_class: &'static str,
    pub total: String,
    pub transactions: Vec<ActivityRowView>,
}

#[derive(Template)]
#[template(path = "manage_categories.html")]
pub struct ManageCategoriesTemplate {
    pub categories: Vec<CategoryRowView>,
    pub chart: Vec<ChartBarView>,
    pub icons: Vec<IconChoice>,
}

fn percent_of(value: i64, max: i64) -> i64 {
    if max <= 0 {
        return 0;
    }
    (i128::from(value) * 100 / i128::from(max)).clamp(0, 100) as i64
}

/// Bar widths as a percentage of the largest value.
pub fn chart_bars(series: &ChartSeries, fmt: &MoneyFormat) -> Vec<ChartBarView> {
    let max = series.max_value();
    series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, &value)| ChartBarView {
            label: label.clone(),
            amount: fmt.format(value),
            percent: percent_of(value, max),
        })
        .collect()
}

fn category_row(activity: &CategoryActivity, total: i64, fmt: &MoneyFormat) -> CategoryRowView {
    CategoryRowView {
        id: activity.category.id,
        name: activity.category.name.clone(),
        icon_key: activity.category.icon.key(),
        icon_class: activity.category.icon.css_class(),
        total: fmt.format(total),
        transactions: activity
            .transactions
            .iter()
            .map(|t| ActivityRowView {
                title: t.title.clone(),
                description: t.description.clone(),
                kind: t.kind.to_string(),
                kind_class: t.kind.css_class(),
                date_display: t.occurred_at.format("%e %b %Y, %H:%M").to_string(),
                amount: fmt.format(t.amount),
            })
            .collect(),
    }
}

pub fn categories_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories_view).post(create_category))
        .route("/api", get(category_report_api))
        .route("/{id}", put(update_category).delete(delete_category))
        // Plain HTML forms cannot send PUT/DELETE
        .route("/{id}/edit", post(edit_category_form))
        .route("/{id}/delete", post(delete_category_form))
        .with_state(state)
}

async fn list_categories_view(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, CategoryError> {
    let report = CategoryService::get_report(&state.db).await?;
    let fmt = ProfileService::get_profile(&state.db)
        .await
        .map_err(|e| CategoryError::Infrastructure(e.to_string()))?
        .money_format();

    let categories = report
        .categories
        .iter()
        .zip(&report.series.values)
        .map(|(activity, &total)| category_row(activity, total, &fmt))
        .collect();
    let icons = CategoryIcon::ALL
        .into_iter()
        .map(|icon| IconChoice { key: icon.key(), class: icon.css_class() })
        .collect();

    let template = ManageCategoriesTemplate {
        categories,
        chart: chart_bars(&report.series, &fmt),
        icons,
    };
    Ok(Html(template.render().map_err(|e| CategoryError::Infrastructure(e.to_string()))?))
}

async fn category_report_api(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoryReport>, CategoryError> {
    let report = CategoryService::get_report(&state.db).await?;
    Ok(Json(report))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<RawCreateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::create_category(&state.db, payload.name, payload.icon)
        .await
        .map_err(|e| {
            tracing::error!("create_category error: {:?}", e);
            e
        })?;

    Ok(Redirect::to("/categories"))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, CategoryError> {
    let category = CategoryService::update_category(&state.db, id, payload.name, payload.icon).await?;
    Ok(Json(category))
}

#[derive(Deserialize)]
pub struct EditCategoryForm {
    pub name: Option<String>,
    pub icon: Option<String>,
}

async fn edit_category_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(payload): Form<EditCategoryForm>,
) -> Result<impl IntoResponse, CategoryError> {
    let icon = match payload.icon.as_deref() {
        Some(key) if !key.is_empty() => Some(
            key.parse::<CategoryIcon>()
                .map_err(|e| CategoryError::InvalidInput(e.to_string()))?,
        ),
        _ => None,
    };

    CategoryService::update_category(&state.db, id, payload.name, icon).await?;
    Ok(Redirect::to("/categories"))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::delete_category(&state.db, id).await?;
    Ok(Redirect::to("/categories"))
}
