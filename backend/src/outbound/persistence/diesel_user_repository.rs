//! PostgreSQL-backed `UserRepository`.
//!
//! Uniqueness of email and username is enforced by the `users_email_key`
//! and `users_username_key` constraints; violations come back as the
//! dedicated duplicate variants so concurrent registrations cannot both
//! succeed.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, PageRequest, User, UserAccount, UserId, Username};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{RowDecodeError, UserChangeset, UserRow, profile_json};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: DieselError) -> UserRepositoryError {
    match unique_violation(&error) {
        Some(EMAIL_CONSTRAINT) => return UserRepositoryError::duplicate_email(),
        Some(USERNAME_CONSTRAINT) => return UserRepositoryError::duplicate_username(),
        Some(other) => warn!(constraint = other, "unexpected unique violation on users"),
        None => {}
    }
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn decode_error(error: RowDecodeError) -> UserRepositoryError {
    UserRepositoryError::query(error.to_string())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let row = UserRow::from_account(account).map_err(decode_error)?;
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    diesel::insert_into(users::table)
                        .values(&row)
                        .execute(&mut conn)
                        .await
                        .map_err(diesel_error)?;
                    Ok(())
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let id = *id.as_uuid();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let row: Option<UserRow> = users::table
                        .find(id)
                        .select(UserRow::as_select())
                        .first(&mut conn)
                        .await
                        .optional()
                        .map_err(diesel_error)?;
                    row.map(|row| row.into_user().map_err(decode_error))
                        .transpose()
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let email = email.as_ref().to_owned();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let row: Option<UserRow> = users::table
                        .filter(users::email.eq(&email))
                        .select(UserRow::as_select())
                        .first(&mut conn)
                        .await
                        .optional()
                        .map_err(diesel_error)?;
                    row.map(|row| row.into_account().map_err(decode_error))
                        .transpose()
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError> {
        let email = email.as_ref().to_owned();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    diesel::select(diesel::dsl::exists(
                        users::table.filter(users::email.eq(&email)),
                    ))
                    .get_result(&mut conn)
                    .await
                    .map_err(diesel_error)
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let username = username.as_ref().to_owned();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    diesel::select(diesel::dsl::exists(
                        users::table.filter(users::username.eq(&username)),
                    ))
                    .get_result(&mut conn)
                    .await
                    .map_err(diesel_error)
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn list_active(&self, page: PageRequest) -> Result<Vec<User>, UserRepositoryError> {
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let rows: Vec<UserRow> = users::table
                        .filter(users::is_active.eq(true))
                        .order((users::created_at.desc(), users::id.desc()))
                        .offset(i64::from(page.skip()))
                        .limit(i64::from(page.limit()))
                        .select(UserRow::as_select())
                        .load(&mut conn)
                        .await
                        .map_err(diesel_error)?;
                    rows.into_iter()
                        .map(|row| row.into_user().map_err(decode_error))
                        .collect()
                },
                UserRepositoryError::connection,
            )
            .await
    }

    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError> {
        let id = *user.id.as_uuid();
        let profile = profile_json(&user.profile).map_err(decode_error)?;
        let changes = UserChangeset {
            username: user.username.as_ref(),
            full_name: user.full_name.as_ref(),
            profile,
            updated_at: user.updated_at,
        };
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let row: Option<UserRow> = diesel::update(users::table.find(id))
                        .set(&changes)
                        .returning(UserRow::as_returning())
                        .get_result(&mut conn)
                        .await
                        .optional()
                        .map_err(diesel_error)?;
                    row.map(|row| row.into_user().map_err(decode_error))
                        .transpose()
                },
                UserRepositoryError::connection,
            )
            .await
    }
}
