use crate::models::{ListParams, ListQuery, PageMeta, RawCreateTransactionRequest, SortField, Transaction, TransactionPage};
use crate::service::{TransactionError, TransactionService};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use categories::service::CategoryService;
use common::money::MoneyFormat;
use common::AppState;
use profile::service::ProfileService;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            TransactionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            TransactionError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_string()),
            TransactionError::Report(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            TransactionError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub struct TransactionView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub kind_class: &'static str,
    pub category_name: String,
    pub category_icon_class: &'static str,
    pub date_display: String,
    pub amount: String,
}

impl TransactionView {
    pub fn new(t: &Transaction, fmt: &MoneyFormat) -> Self {
        let (category_name, category_icon_class) = match &t.category {
            Some(c) => (c.name.clone(), c.icon.css_class()),
            None => ("Uncategorised".to_string(), "fa-circle-question"),
        };

        Self {
            id: t.id,
            title: t.title.clone(),
            description: t.description.clone(),
            kind: t.kind.to_string(),
            kind_class: t.kind.css_class(),
            category_name,
            category_icon_class,
            date_display: t.occurred_at.format("%e %b %Y, %H:%M").to_string(),
            amount: fmt.format(t.amount),
        }
    }
}

pub struct SortHeaderView {
    pub key: &'static str,
    pub active: bool,
    /// Direction a click on this header asks for.
    pub next_ascending: bool,
}

pub struct CategoryOption {
    pub id: i64,
    pub name: String,
}

#[derive(Template)]
#[template(path = "transactions.html")]
pub struct TransactionsTemplate {
    pub transactions: Vec<TransactionView>,
    pub categories: Vec<CategoryOption>,
    pub headers: Vec<SortHeaderView>,
    pub search: String,
    pub order: &'static str,
    pub ascending: bool,
    pub page: PageMeta,
    pub first_row: i64,
    pub last_row: i64,
}

impl TransactionsTemplate {
    fn new(page: TransactionPage, params: &ListParams, categories: Vec<CategoryOption>, fmt: &MoneyFormat) -> Self {
        let headers = SortField::ALL
            .into_iter()
            .map(|field| {
                let active = field == params.order;
                SortHeaderView {
                    key: field.key(),
                    active,
                    next_ascending: if active { !params.ascending } else { true },
                }
            })
            .collect();

        let shown = page.items.len() as i64;
        let first_row = if shown == 0 { 0 } else { i64::from(page.meta.offset) + 1 };

        Self {
            transactions: page.items.iter().map(|t| TransactionView::new(t, fmt)).collect(),
            categories,
            headers,
            search: params.search.clone(),
            order: params.order.key(),
            ascending: params.ascending,
            first_row,
            last_row: i64::from(page.meta.offset) + shown,
            page: page.meta,
        }
    }
}

pub fn transactions_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        // Specific routes first
        .route("/", get(list_view))
        .route("/api", get(list_api))
        .route("/add", post(create_transaction))
        // Then parameterized routes
        .route(
            "/{id}",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
        .route("/{id}/delete", post(delete_transaction_form))
        .with_state(state)
}

async fn list_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, TransactionError> {
    let params = query.into_params(state.config.page_length);
    tracing::info!("Listing transactions: {:?}", params);

    let page = TransactionService::list_page(&state.db, params.clone()).await.map_err(|e| {
        tracing::error!("list_page error: {:?}", e);
        e
    })?;

    let categories = CategoryService::list_categories(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {}", e);
            TransactionError::Infrastructure(e.to_string())
        })?
        .into_iter()
        .map(|c| CategoryOption { id: c.id, name: c.name })
        .collect();

    let fmt = ProfileService::get_profile(&state.db)
        .await
        .map_err(|e| TransactionError::Infrastructure(e.to_string()))?
        .money_format();

    let template = TransactionsTemplate::new(page, &params, categories, &fmt);
    Ok(Html(template.render().map_err(|e| TransactionError::Infrastructure(e.to_string()))?))
}

async fn list_api(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TransactionPage>, TransactionError> {
    let params = query.into_params(state.config.page_length);
    let page = TransactionService::list_page(&state.db, params).await?;
    Ok(Json(page))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<RawCreateTransactionRequest>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::create_transaction(&state.db, payload)
        .await
        .map_err(|e| {
            tracing::error!("create_transaction error: {:?}", e);
            e
        })?;

    Ok(Redirect::to("/transactions"))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, TransactionError> {
    let transaction = TransactionService::get_transaction(&state.db, id).await?;
    Ok(Json(transaction))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<RawCreateTransactionRequest>,
) -> Result<Json<Transaction>, TransactionError> {
    let transaction = TransactionService::update_transaction(&state.db, id, payload).await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::delete_transaction(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_transaction_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::delete_transaction(&state.db, id).await?;
    Ok(Redirect::to("/transactions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use categories::models::Category;
    use chrono::NaiveDate;
    use common::ledger::{CategoryIcon, TransactionKind};
    use common::money::{Currency, Locale};

    fn transaction(category: Option<Category>) -> Transaction {
        Transaction {
            id: 3,
            kind: TransactionKind::Expense,
            title: "Rent".into(),
            description: String::new(),
            amount: 123_456,
            occurred_at: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(8, 5, 0).unwrap(),
            category,
        }
    }

    #[test]
    fn test_transaction_view_formats_with_profile_money() {
        let housing = Category { id: 1, name: "Housing".into(), icon: CategoryIcon::Housing };
        let view = TransactionView::new(&transaction(Some(housing)), &MoneyFormat::new(Currency::Euro, Locale::De));
        assert_eq!(view.amount, "€1.235");
        assert_eq!(view.category_name, "Housing");
        assert_eq!(view.category_icon_class, "fa-house-chimney");
        assert_eq!(view.date_display, " 1 Feb 2026, 08:05");
    }

    #[test]
    fn test_transaction_view_without_category() {
        let view = TransactionView::new(&transaction(None), &MoneyFormat::default());
        assert_eq!(view.category_name, "Uncategorised");
    }

    #[test]
    fn test_sort_headers_toggle_active_column() {
        let params = ListParams { search: String::new(), order: SortField::Amount, ascending: true, offset: 0, length: 10 };
        let page = TransactionPage { items: vec![], meta: PageMeta::new(0, 0, 10) };
        let template = TransactionsTemplate::new(page, &params, vec![], &MoneyFormat::default());

        let amount = template.headers.iter().find(|h| h.key == "amount").unwrap();
        assert!(amount.active);
        assert!(!amount.next_ascending);
        let title = template.headers.iter().find(|h| h.key == "title").unwrap();
        assert!(!title.active && title.next_ascending);
        assert_eq!((template.first_row, template.last_row), (0, 0));
    }
}
