use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json,
};
use categories::handler::{chart_bars, ChartBarView};
use common::AppState;
use profile::models::Profile;
use profile::service::ProfileService;
use std::sync::Arc;
use transactions::handler::TransactionView;
use transactions::service::{LedgerSummary, TransactionError, TransactionService};

pub struct TopCategoryView {
    pub name: String,
    pub icon_class: &'static str,
    pub total: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub name: String,
    pub net: String,
    pub net_is_negative: bool,
    pub income: String,
    pub expense: String,
    pub top_categories: Vec<TopCategoryView>,
    pub chart: Vec<ChartBarView>,
    pub recent: Vec<TransactionView>,
    /// Set when the report could not be built; the page then only offers a retry.
    pub error: Option<String>,
}

impl DashboardTemplate {
    pub fn new(profile: &Profile, summary: &LedgerSummary) -> Self {
        let fmt = profile.money_format();
        Self {
            name: profile.name.clone(),
            net: fmt.format(summary.net),
            net_is_negative: summary.net < 0,
            income: fmt.format(summary.totals.total_income),
            expense: fmt.format(summary.totals.total_expense),
            top_categories: summary
                .top_categories
                .iter()
                .map(|c| TopCategoryView {
                    name: c.name.clone(),
                    icon_class: c.icon.css_class(),
                    total: fmt.format(c.total),
                })
                .collect(),
            chart: chart_bars(&summary.chart, &fmt),
            recent: summary.recent.iter().map(|t| TransactionView::new(t, &fmt)).collect(),
            error: None,
        }
    }

    pub fn degraded(profile: &Profile, error: String) -> Self {
        let zero = profile.money_format().format(0);
        Self {
            name: profile.name.clone(),
            net: zero.clone(),
            net_is_negative: false,
            income: zero.clone(),
            expense: zero,
            top_categories: Vec::new(),
            chart: Vec::new(),
            recent: Vec::new(),
            error: Some(error),
        }
    }
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Response, TransactionError> {
    let profile = ProfileService::get_profile(&state.db)
        .await
        .map_err(|e| TransactionError::Infrastructure(e.to_string()))?;

    let template = match TransactionService::get_summary(&state.db).await {
        Ok(summary) => DashboardTemplate::new(&profile, &summary),
        Err(TransactionError::Report(e)) => {
            tracing::warn!("Dashboard shown without report: {}", e);
            DashboardTemplate::degraded(&profile, e.to_string())
        }
        Err(e) => return Err(e),
    };

    let html = template.render().map_err(|e| TransactionError::Infrastructure(e.to_string()))?;
    Ok(Html(html).into_response())
}

pub async fn summary_api(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LedgerSummary>, TransactionError> {
    let summary = TransactionService::get_summary(&state.db).await?;
    Ok(Json(summary))
}
