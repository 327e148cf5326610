use crate::models::{CreateTransactionRequest, ListParams, PageMeta, RawCreateTransactionRequest, Transaction, TransactionPage};
use crate::repository::TransactionRepository;
use database::{RepositoryError, Database};
use reporting::{CategoryTotal, ChartSeries, ReportError, Totals, DEFAULT_TOP_N};
use serde::Serialize;
use tracing::instrument;

/// How many transactions the dashboard lists.
pub const RECENT_COUNT: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Transaction not found")]
    NotFound,
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<RepositoryError> for TransactionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => TransactionError::NotFound,
            RepositoryError::ForeignKeyViolation(_) => {
                TransactionError::InvalidInput("Invalid category ID".into())
            }
            RepositoryError::CheckViolation(msg) => TransactionError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => TransactionError::Infrastructure(e.to_string()),
            _ => TransactionError::Infrastructure(err.to_string()),
        }
    }
}

/// Everything the dashboard shows apart from the greeting.
#[derive(Debug, Serialize)]
pub struct LedgerSummary {
    pub totals: Totals,
    pub net: i64,
    pub top_categories: Vec<CategoryTotal>,
    pub chart: ChartSeries,
    pub recent: Vec<Transaction>,
}

impl LedgerSummary {
    /// `feed` must be newest first.
    pub fn from_feed(mut feed: Vec<Transaction>) -> Result<Self, ReportError> {
        let totals = reporting::classify(&feed)?;
        let top_categories = reporting::top_n(&feed, DEFAULT_TOP_N)?;
        let chart = ChartSeries::from_totals(&top_categories);
        feed.truncate(RECENT_COUNT);

        Ok(Self {
            net: totals.net(),
            totals,
            top_categories,
            chart,
            recent: feed,
        })
    }
}

pub struct TransactionService;

impl TransactionService {
    #[instrument(skip(db))]
    pub async fn create_transaction(
        db: &Database,
        raw: RawCreateTransactionRequest,
    ) -> Result<i64, TransactionError> {
        let req = CreateTransactionRequest::new(raw).map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let id = repo.create(&req).await?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(id)
    }

    #[instrument(skip(db))]
    pub async fn update_transaction(
        db: &Database,
        id: i64,
        raw: RawCreateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let req = CreateTransactionRequest::new(raw).map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.update(id, &req).await?;

        let transaction = repo.find_by_id(id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn get_transaction(db: &Database, id: i64) -> Result<Transaction, TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transaction = repo.find_by_id(id).await?
            .ok_or(TransactionError::NotFound)?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn delete_transaction(db: &Database, id: i64) -> Result<(), TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_page(db: &Database, params: ListParams) -> Result<TransactionPage, TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let (items, total) = repo.list_page(&params).await?;

        Ok(TransactionPage {
            items,
            meta: PageMeta::new(total, params.offset, params.length),
        })
    }

    /// All transactions with their category, newest first.
    #[instrument(skip(db))]
    pub async fn list_feed(db: &Database) -> Result<Vec<Transaction>, TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let feed = repo.list_with_categories().await?;

        Ok(feed)
    }

    #[instrument(skip(db))]
    pub async fn get_summary(db: &Database) -> Result<LedgerSummary, TransactionError> {
        let feed = Self::list_feed(db).await?;
        let summary = LedgerSummary::from_feed(feed).map_err(|e| {
            tracing::error!("Failed to build dashboard summary: {}", e);
            e
        })?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortField;
    use categories::service::CategoryService;
    use database::get_test_db;

    async fn category(db: &Database, name: &str, icon: &str) -> i64 {
        CategoryService::create_category(db, name.into(), icon.into()).await.unwrap()
    }

    fn raw(kind: &str, title: &str, amount: f64, at: &str, category_id: i64) -> RawCreateTransactionRequest {
        RawCreateTransactionRequest {
            kind: kind.into(),
            title: title.into(),
            description: None,
            amount,
            occurred_at: at.into(),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;

        let id = TransactionService::create_transaction(&db, raw("expense", "Rice", 12.0, "2026-01-01T09:00", food)).await.unwrap();
        let t = TransactionService::get_transaction(&db, id).await.unwrap();
        assert_eq!(t.amount, 1200);
        assert_eq!(t.category.unwrap().id, food);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let db = get_test_db().await;
        let err = TransactionService::create_transaction(&db, raw("expense", "Rice", 12.0, "2026-01-01T09:00", 77)).await.unwrap_err();
        assert!(matches!(err, TransactionError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;
        let id = TransactionService::create_transaction(&db, raw("expense", "Rice", 12.0, "2026-01-01T09:00", food)).await.unwrap();

        let err = TransactionService::update_transaction(&db, id, raw("expense", "Rice", 12.0, "2026-01-01T09:00", 77)).await.unwrap_err();
        assert!(matches!(err, TransactionError::InvalidInput(ref msg) if msg == "Invalid category ID"));
        assert_eq!(TransactionService::get_transaction(&db, id).await.unwrap().category.unwrap().id, food);
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_amount() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;
        let err = TransactionService::create_transaction(&db, raw("income", "Jackpot", 1e30, "2026-01-01T09:00", food)).await.unwrap_err();
        assert!(matches!(err, TransactionError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;
        let id = TransactionService::create_transaction(&db, raw("expense", "Rice", 12.0, "2026-01-01T09:00", food)).await.unwrap();

        let t = TransactionService::update_transaction(&db, id, raw("expense", "Rice and beans", 15.0, "2026-01-01T09:00", food)).await.unwrap();
        assert_eq!(t.title, "Rice and beans");
        assert_eq!(t.amount, 1500);

        TransactionService::delete_transaction(&db, id).await.unwrap();
        assert!(matches!(TransactionService::get_transaction(&db, id).await.unwrap_err(), TransactionError::NotFound));
    }

    #[tokio::test]
    async fn test_list_page_meta() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;
        for day in 1..=3 {
            let at = format!("2026-01-0{}T09:00", day);
            TransactionService::create_transaction(&db, raw("expense", "Snack", 1.0, &at, food)).await.unwrap();
        }

        let params = ListParams { search: String::new(), order: SortField::Date, ascending: false, offset: 0, length: 2 };
        let page = TransactionService::list_page(&db, params).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.total, 3);
        assert!(page.meta.has_next);
        assert_eq!(page.meta.next_offset, 2);
    }

    #[tokio::test]
    async fn test_summary() {
        let db = get_test_db().await;
        let food = category(&db, "Food", "food").await;
        let transport = category(&db, "Transport", "transport").await;
        let utility = category(&db, "Utility", "utility").await;
        let health = category(&db, "Healthcare", "healthcare").await;
        let work = category(&db, "Work", "work").await;

        TransactionService::create_transaction(&db, raw("expense", "Rice", 12.0, "2026-01-01T09:00", food)).await.unwrap();
        TransactionService::create_transaction(&db, raw("expense", "Bus", 35.0, "2026-01-02T09:00", transport)).await.unwrap();
        TransactionService::create_transaction(&db, raw("expense", "Power", 7.0, "2026-01-03T09:00", utility)).await.unwrap();
        TransactionService::create_transaction(&db, raw("expense", "Pills", 20.0, "2026-01-04T09:00", health)).await.unwrap();
        TransactionService::create_transaction(&db, raw("income", "Pay", 100.0, "2026-01-05T09:00", work)).await.unwrap();

        let summary = TransactionService::get_summary(&db).await.unwrap();
        assert_eq!(summary.totals, Totals { total_income: 10000, total_expense: 7400 });
        assert_eq!(summary.net, 2600);
        assert_eq!(
            summary.chart.labels,
            vec!["Work", "Transport", "Healthcare", "Food"]
        );
        assert_eq!(summary.recent.len(), RECENT_COUNT);
        assert_eq!(summary.recent[0].title, "Pay");
    }

    #[tokio::test]
    async fn test_summary_fails_on_unresolved_category() {
        let db = get_test_db().await;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (kind, title, amount, occurred_at) VALUES ('expense', 'Loose', 100, '2026-01-01 09:00:00') RETURNING id",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();

        let err = TransactionService::get_summary(&db).await.unwrap_err();
        assert!(matches!(err, TransactionError::Report(ReportError::UnresolvedCategory { transaction_id }) if transaction_id == id));
    }

    #[tokio::test]
    async fn test_summary_reports_overflow() {
        let db = get_test_db().await;
        let work = category(&db, "Work", "work").await;
        for day in 1..=2 {
            sqlx::query("INSERT INTO transactions (kind, title, amount, occurred_at, category_id) VALUES ('income', 'Huge', $1, $2, $3)")
                .bind(i64::MAX)
                .bind(format!("2026-01-0{} 09:00:00", day))
                .bind(work)
                .execute(&db.pool)
                .await
                .unwrap();
        }

        let err = TransactionService::get_summary(&db).await.unwrap_err();
        assert!(matches!(err, TransactionError::Report(ReportError::AmountOverflow { .. })));
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let db = get_test_db().await;
        let summary = TransactionService::get_summary(&db).await.unwrap();
        assert_eq!(summary.totals, Totals::default());
        assert!(summary.top_categories.is_empty());
        assert!(summary.chart.is_empty());
        assert!(summary.recent.is_empty());
    }
}
