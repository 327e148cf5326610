use crate::models::{Category, CategoryActivity, CreateCategoryRequest};
use crate::repository::CategoryRepository;
use common::ledger::CategoryIcon;
use database::{RepositoryError, Database};
use reporting::{ChartSeries, CategoryKey, ReportError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Category already exists: {0}")]
    Conflict(String),
    #[error("Category not found")]
    NotFound,
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<RepositoryError> for CategoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CategoryError::NotFound,
            RepositoryError::UniqueViolation(msg) => CategoryError::Conflict(msg),
            RepositoryError::Infrastructure(e) => CategoryError::Infrastructure(e.to_string()),
            _ => CategoryError::Infrastructure(err.to_string()),
        }
    }
}

/// The category page: every category, its transactions, and the spend per
/// category keyed over all of them.
#[derive(Debug, serde::Serialize)]
pub struct CategoryReport {
    pub categories: Vec<CategoryActivity>,
    pub series: ChartSeries,
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db))]
    pub async fn create_category(
        db: &Database,
        name: String,
        icon: String,
    ) -> Result<i64, CategoryError> {
        let req = CreateCategoryRequest::new(name, &icon)
            .map_err(CategoryError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&req).await?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(id)
    }

    #[instrument(skip(db))]
    pub async fn update_category(
        db: &Database,
        id: i64,
        name: Option<String>,
        icon: Option<CategoryIcon>,
    ) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let current = repo.find_by_id(id).await?
            .ok_or(CategoryError::NotFound)?;

        // Blank or missing fields keep what is stored
        let name = match name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => current.name,
        };
        let icon = icon.unwrap_or(current.icon);
        let req = CreateCategoryRequest::new(name, icon.key())
            .map_err(CategoryError::InvalidInput)?;

        repo.update(id, &req.name, req.icon).await?;
        let updated = repo.find_by_id(id).await?
            .ok_or(CategoryError::NotFound)?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(updated)
    }

    #[instrument(skip(db))]
    pub async fn delete_category(
        db: &Database,
        id: i64,
    ) -> Result<(), CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_categories(db: &Database) -> Result<Vec<Category>, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list().await?;

        Ok(categories)
    }

    #[instrument(skip(db))]
    pub async fn get_category(db: &Database, id: i64) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_by_id(id).await?
            .ok_or(CategoryError::NotFound)?;

        Ok(category)
    }

    #[instrument(skip(db))]
    pub async fn get_report(db: &Database) -> Result<CategoryReport, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list_with_activity().await.map_err(|e| {
            tracing::error!("Failed to load categories with transactions: {}", e);
            CategoryError::from(e)
        })?;

        let series = {
            let keys: Vec<CategoryKey> = categories.iter().map(|a| a.category.key()).collect();
            reporting::series_over(&keys, &categories)?
        };

        Ok(CategoryReport { categories, series })
    }
}
