use crate::models::{ActivityItem, Category, CategoryActivity, CreateCategoryRequest};
use chrono::NaiveDateTime;
use common::ledger::{CategoryIcon, TransactionKind};
use database::{self, RepositoryError};
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
    icon: CategoryIcon,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            name: record.name,
            icon: record.icon,
        }
    }
}

#[derive(FromRow)]
struct ActivityRecord {
    id: i64,
    category_id: i64,
    kind: String,
    title: String,
    description: String,
    amount: i64,
    occurred_at: NaiveDateTime,
}

impl From<ActivityRecord> for ActivityItem {
    fn from(record: ActivityRecord) -> Self {
        ActivityItem {
            id: record.id,
            kind: TransactionKind::from(record.kind),
            title: record.title,
            description: record.description,
            amount: record.amount,
            occurred_at: record.occurred_at,
        }
    }
}

pub(crate) struct CategoryRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateCategoryRequest) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, icon) VALUES ($1, $2) RETURNING id",
        )
        .bind(&req.name)
        .bind(req.icon)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list(&mut self) -> Result<Vec<Category>, RepositoryError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, icon FROM categories ORDER BY name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, icon FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn update(&mut self, id: i64, name: &str, icon: CategoryIcon) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE categories SET name = $1, icon = $2 WHERE id = $3")
            .bind(name)
            .bind(icon)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Deleting a category also deletes its transactions (ON DELETE CASCADE).
    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Every category with its transactions nested, newest transaction first.
    /// Categories without transactions are included with an empty list.
    pub async fn list_with_activity(&mut self) -> Result<Vec<CategoryActivity>, RepositoryError> {
        let categories = self.list().await?;

        let records = sqlx::query_as::<_, ActivityRecord>(
            r#"
            SELECT id, category_id, kind, title, description, amount, occurred_at
            FROM transactions
            WHERE category_id IS NOT NULL
            ORDER BY occurred_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let mut by_category: HashMap<i64, Vec<ActivityItem>> = HashMap::new();
        for record in records {
            by_category.entry(record.category_id).or_default().push(record.into());
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let transactions = by_category.remove(&category.id).unwrap_or_default();
                CategoryActivity { category, transactions }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;

    async fn insert_transaction(conn: &mut database::Connection, category_id: i64, kind: &str, amount: i64, at: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO transactions (kind, title, description, amount, occurred_at, category_id) VALUES ($1, $2, '', $3, $4, $5) RETURNING id",
        )
        .bind(kind)
        .bind("Test")
        .bind(amount)
        .bind(at)
        .bind(category_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let req = CreateCategoryRequest::new("Test Category".to_string(), "gaming").unwrap();
        let id = repo.create(&req).await.unwrap();
        assert!(id > 0);

        let cat = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(cat.name, "Test Category");
        assert_eq!(cat.icon, CategoryIcon::Gaming);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let req = CreateCategoryRequest::new("Food".to_string(), "food").unwrap();
        repo.create(&req).await.unwrap();
        let err = repo.create(&req).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_read_categories() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let initial_count = repo.list().await.unwrap().len();

        repo.create(&CreateCategoryRequest::new("Cat 1".to_string(), "book").unwrap()).await.unwrap();

        let categories = repo.list().await.unwrap();
        assert_eq!(categories.len(), initial_count + 1);
    }

    #[tokio::test]
    async fn test_update_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&CreateCategoryRequest::new("Original".to_string(), "book").unwrap()).await.unwrap();

        repo.update(id, "Updated", CategoryIcon::Bookmark).await.unwrap();

        let cat = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(cat.name, "Updated");
        assert_eq!(cat.icon, CategoryIcon::Bookmark);
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&CreateCategoryRequest::new("Delete Me".to_string(), "bills").unwrap()).await.unwrap();
        insert_transaction(uow.connection(), id, "expense", 500, "2026-01-01 10:00:00").await;

        let mut repo = CategoryRepository::new(uow.connection());
        assert!(repo.find_by_id(id).await.unwrap().is_some());
        repo.delete(id).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(uow.connection())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_list_with_activity() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();

        let mut repo = CategoryRepository::new(uow.connection());
        let food = repo.create(&CreateCategoryRequest::new("Food".to_string(), "food").unwrap()).await.unwrap();
        repo.create(&CreateCategoryRequest::new("Gaming".to_string(), "gaming").unwrap()).await.unwrap();

        insert_transaction(uow.connection(), food, "expense", 1200, "2026-01-01 10:00:00").await;
        let newest = insert_transaction(uow.connection(), food, "expense", 300, "2026-01-05 10:00:00").await;

        let mut repo = CategoryRepository::new(uow.connection());
        let view = repo.list_with_activity().await.unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].category.name, "Food");
        assert_eq!(view[0].transactions.len(), 2);
        assert_eq!(view[0].transactions[0].id, newest);
        assert_eq!(view[1].category.name, "Gaming");
        assert!(view[1].transactions.is_empty());
    }
}
