use crate::models::{Profile, UpdateProfileRequest};
use common::money::{Currency, Locale};
use database::{self, RepositoryError};
use sqlx::FromRow;

// The profile table holds exactly one row, seeded by the migration.
const PROFILE_ID: i64 = 1;

#[derive(FromRow)]
struct ProfileRecord {
    name: String,
    email: String,
    currency: Currency,
    locale: Locale,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Profile {
            name: record.name,
            email: record.email,
            currency: record.currency,
            locale: record.locale,
        }
    }
}

pub(crate) struct ProfileRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self) -> Result<Profile, RepositoryError> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT name, email, currency, locale FROM profile WHERE id = $1",
        )
        .bind(PROFILE_ID)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(record.into())
    }

    pub async fn update(&mut self, req: &UpdateProfileRequest) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO profile (id, name, email, currency, locale)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            currency = excluded.currency,
            locale = excluded.locale
            "#,
        )
        .bind(PROFILE_ID)
        .bind(req.name())
        .bind(req.email())
        .bind(req.currency())
        .bind(req.locale())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}
