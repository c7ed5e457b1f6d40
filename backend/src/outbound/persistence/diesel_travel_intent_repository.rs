//! PostgreSQL-backed `TravelIntentRepository`.
//!
//! Interest changes are single conditional `UPDATE ... RETURNING`
//! statements using `array_append`/`array_remove`, so concurrent requests
//! for the same user cannot produce duplicates. When such a statement
//! matches no row, one follow-up read tells a missing intent apart from a
//! no-op. Owner edits lock the row for the length of a short transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{Array, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{InterestMutation, TravelIntentRepository, TravelIntentRepositoryError};
use crate::domain::{
    PageRequest, TravelIntent, TravelIntentFilter, TravelIntentId, TravelIntentPatch,
    TravelIntentValidationError, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{RowDecodeError, TravelIntentChangeset, TravelIntentRow};
use super::pool::{DbPool, PoolError};
use super::schema::travel_intents;

diesel::define_sql_function! {
    fn array_append(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

diesel::define_sql_function! {
    fn array_remove(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

#[derive(Clone)]
pub struct DieselTravelIntentRepository {
    pool: DbPool,
}

impl DieselTravelIntentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TravelIntentRepositoryError {
    map_pool_error(error, TravelIntentRepositoryError::connection)
}

fn diesel_error(error: DieselError) -> TravelIntentRepositoryError {
    map_diesel_error(
        error,
        TravelIntentRepositoryError::query,
        TravelIntentRepositoryError::connection,
    )
}

fn decode_error(error: RowDecodeError) -> TravelIntentRepositoryError {
    TravelIntentRepositoryError::query(error.to_string())
}

fn decode(row: TravelIntentRow) -> Result<TravelIntent, TravelIntentRepositoryError> {
    TravelIntent::try_from(row).map_err(decode_error)
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Failures inside the owner-update transaction.
enum UpdateFailure {
    Store(DieselError),
    Decode(RowDecodeError),
    Invalid(TravelIntentValidationError),
}

impl From<DieselError> for UpdateFailure {
    fn from(error: DieselError) -> Self {
        Self::Store(error)
    }
}

impl From<UpdateFailure> for TravelIntentRepositoryError {
    fn from(failure: UpdateFailure) -> Self {
        match failure {
            UpdateFailure::Store(error) => diesel_error(error),
            UpdateFailure::Decode(error) => decode_error(error),
            UpdateFailure::Invalid(error) => Self::invalid_patch(error),
        }
    }
}

async fn fetch(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<TravelIntentRow>, DieselError> {
    travel_intents::table
        .filter(travel_intents::id.eq(id))
        .select(TravelIntentRow::as_select())
        .first(conn)
        .await
        .optional()
}

/// Turn the result of a conditional interest statement into an outcome.
async fn interest_outcome(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    changed: Option<TravelIntentRow>,
) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
    if let Some(row) = changed {
        return Ok(Some(InterestMutation::Applied(decode(row)?)));
    }
    let current = fetch(conn, id).await.map_err(diesel_error)?;
    current
        .map(|row| decode(row).map(InterestMutation::Unchanged))
        .transpose()
}

#[async_trait]
impl TravelIntentRepository for DieselTravelIntentRepository {
    async fn insert(&self, intent: &TravelIntent) -> Result<(), TravelIntentRepositoryError> {
        let row = TravelIntentRow::from(intent);
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    diesel::insert_into(travel_intents::table)
                        .values(&row)
                        .execute(&mut conn)
                        .await
                        .map_err(diesel_error)?;
                    Ok(())
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }

    async fn find_by_id(
        &self,
        id: &TravelIntentId,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError> {
        let id = *id.as_uuid();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let row = fetch(&mut conn, id).await.map_err(diesel_error)?;
                    row.map(decode).transpose()
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }

    async fn list(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, TravelIntentRepositoryError> {
        let mut query = travel_intents::table
            .select(TravelIntentRow::as_select())
            .into_boxed();
        if let Some(needle) = &filter.destination {
            query = query.filter(travel_intents::destination.ilike(like_pattern(needle)));
        }
        if let Some(from) = filter.start_date_from {
            query = query.filter(travel_intents::start_date.ge(from));
        }
        if filter.active_only {
            query = query.filter(travel_intents::is_active.eq(true));
        }
        if let Some(owner) = &filter.owner_id {
            query = query.filter(travel_intents::user_id.eq(*owner.as_uuid()));
        }
        let query = query
            .order((travel_intents::created_at.desc(), travel_intents::id.desc()))
            .offset(i64::from(page.skip()))
            .limit(i64::from(page.limit()));

        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let rows: Vec<TravelIntentRow> =
                        query.load(&mut conn).await.map_err(diesel_error)?;
                    rows.into_iter().map(decode).collect()
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }

    async fn update_owned(
        &self,
        id: &TravelIntentId,
        owner: &UserId,
        patch: &TravelIntentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError> {
        let id = *id.as_uuid();
        let owner = *owner.as_uuid();
        let patch = patch.clone();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let updated = conn
                        .transaction(|conn| {
                            async move {
                                let Some(row) = travel_intents::table
                                    .filter(travel_intents::id.eq(id))
                                    .filter(travel_intents::user_id.eq(owner))
                                    .select(TravelIntentRow::as_select())
                                    .for_update()
                                    .first(conn)
                                    .await
                                    .optional()?
                                else {
                                    return Ok(None);
                                };
                                let mut intent =
                                    TravelIntent::try_from(row).map_err(UpdateFailure::Decode)?;
                                intent
                                    .apply_patch(patch, now)
                                    .map_err(UpdateFailure::Invalid)?;
                                diesel::update(travel_intents::table.find(id))
                                    .set(TravelIntentChangeset::from(&intent))
                                    .execute(conn)
                                    .await?;
                                Ok::<_, UpdateFailure>(Some(intent))
                            }
                            .scope_boxed()
                        })
                        .await?;
                    Ok(updated)
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }

    async fn add_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
        let id = *id.as_uuid();
        let user = *user.as_uuid();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let changed = diesel::update(travel_intents::table)
                        .filter(travel_intents::id.eq(id))
                        .filter(travel_intents::user_id.ne(user))
                        .filter(diesel::dsl::not(
                            travel_intents::interested_users.contains(vec![user]),
                        ))
                        .set(
                            travel_intents::interested_users
                                .eq(array_append(travel_intents::interested_users, user)),
                        )
                        .returning(TravelIntentRow::as_returning())
                        .get_result(&mut conn)
                        .await
                        .optional()
                        .map_err(diesel_error)?;
                    interest_outcome(&mut conn, id, changed).await
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }

    async fn remove_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
        let id = *id.as_uuid();
        let user = *user.as_uuid();
        self.pool
            .within(
                async {
                    let mut conn = self.pool.get().await.map_err(pool_error)?;
                    let changed = diesel::update(travel_intents::table)
                        .filter(travel_intents::id.eq(id))
                        .filter(travel_intents::interested_users.contains(vec![user]))
                        .set(
                            travel_intents::interested_users
                                .eq(array_remove(travel_intents::interested_users, user)),
                        )
                        .returning(TravelIntentRow::as_returning())
                        .get_result(&mut conn)
                        .await
                        .optional()
                        .map_err(diesel_error)?;
                    interest_outcome(&mut conn, id, changed).await
                },
                TravelIntentRepositoryError::connection,
            )
            .await
    }
}
