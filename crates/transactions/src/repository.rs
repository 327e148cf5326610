use crate::models::{CreateTransactionRequest, ListParams, Transaction};
use categories::models::Category;
use chrono::NaiveDateTime;
use common::ledger::{CategoryIcon, TransactionKind};
use database::{self, RepositoryError};
use sqlx::FromRow;

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT t.id, t.kind, t.title, t.description, t.amount, t.occurred_at,
           c.id AS category_id, c.name AS category_name, c.icon AS category_icon
    FROM transactions t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

#[derive(FromRow)]
struct TransactionRecord {
    id: i64,
    kind: String,
    title: String,
    description: String,
    amount: i64,
    occurred_at: NaiveDateTime,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_icon: Option<CategoryIcon>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let category = match (record.category_id, record.category_name, record.category_icon) {
            (Some(id), Some(name), Some(icon)) => Some(Category { id, name, icon }),
            _ => None,
        };

        Transaction {
            id: record.id,
            kind: TransactionKind::from(record.kind),
            title: record.title,
            description: record.description,
            amount: record.amount,
            occurred_at: record.occurred_at,
            category,
        }
    }
}

/// `LIKE` pattern matching `search` anywhere in the text.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) struct TransactionRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateTransactionRequest) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (kind, title, description, amount, occurred_at, category_id) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(req.kind().as_str())
        .bind(req.title())
        .bind(req.description())
        .bind(req.amount())
        .bind(req.occurred_at())
        .bind(req.category_id())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn update(&mut self, id: i64, req: &CreateTransactionRequest) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET kind = $1, title = $2, description = $3, amount = $4, occurred_at = $5, category_id = $6 WHERE id = $7",
        )
        .bind(req.kind().as_str())
        .bind(req.title())
        .bind(req.description())
        .bind(req.amount())
        .bind(req.occurred_at())
        .bind(req.category_id())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Transaction>, RepositoryError> {
        let sql = format!("{} WHERE t.id = $1", SELECT_WITH_CATEGORY);
        let record = sqlx::query_as::<_, TransactionRecord>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// One page of transactions whose title contains `params.search`
    /// (case-insensitive), plus the number of matches over all pages.
    pub async fn list_page(&mut self, params: &ListParams) -> Result<(Vec<Transaction>, i64), RepositoryError> {
        let pattern = like_pattern(&params.search);

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM transactions t WHERE t.title LIKE $1 ESCAPE '\'",
        )
        .bind(&pattern)
        .fetch_one(&mut *self.conn)
        .await?;

        // Column and direction come from a closed enum, never from input
        let direction = if params.ascending { "ASC" } else { "DESC" };
        let sql = format!(
            r"{} WHERE t.title LIKE $1 ESCAPE '\' ORDER BY {} {}, t.id {} LIMIT $2 OFFSET $3",
            SELECT_WITH_CATEGORY,
            params.order.column(),
            direction,
            direction,
        );
        let records = sqlx::query_as::<_, TransactionRecord>(&sql)
            .bind(&pattern)
            .bind(i64::from(params.length))
            .bind(i64::from(params.offset))
            .fetch_all(&mut *self.conn)
            .await?;

        Ok((records.into_iter().map(|r| r.into()).collect(), total))
    }

    /// Every transaction with its category, newest first.
    pub async fn list_with_categories(&mut self) -> Result<Vec<Transaction>, RepositoryError> {
        let sql = format!("{} ORDER BY t.occurred_at DESC, t.id DESC", SELECT_WITH_CATEGORY);
        let records = sqlx::query_as::<_, TransactionRecord>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(records.into_iter().map(|r| r.into()).collect())
    }
}
