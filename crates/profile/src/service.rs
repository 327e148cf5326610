use crate::models::{Profile, UpdateProfileRequest};
use crate::repository::ProfileRepository;
use database::{RepositoryError, Database};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Profile not found")]
    NotFound,
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ProfileError::NotFound,
            RepositoryError::Infrastructure(e) => ProfileError::Infrastructure(e.to_string()),
            _ => ProfileError::Infrastructure(err.to_string()),
        }
    }
}

pub struct ProfileService;

impl ProfileService {
    #[instrument(skip(db))]
    pub async fn get_profile(db: &Database) -> Result<Profile, ProfileError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        let profile = repo.get().await?;
        Ok(profile)
    }

    #[instrument(skip(db))]
    pub async fn update_profile(
        db: &Database,
        name: String,
        email: String,
        currency: String,
        locale: Option<String>,
    ) -> Result<Profile, ProfileError> {
        let req = UpdateProfileRequest::new(name, email, &currency, locale.as_deref())
            .map_err(ProfileError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        repo.update(&req).await?;
        let profile = repo.get().await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(profile)
    }
}
