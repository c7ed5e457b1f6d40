//! Readiness ping against PostgreSQL.

use async_trait::async_trait;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoreHealth, StoreHealthError};

use super::pool::DbPool;

#[derive(Clone)]
pub struct DieselStoreHealth {
    pool: DbPool,
}

impl DieselStoreHealth {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for DieselStoreHealth {
    async fn ping(&self) -> Result<(), StoreHealthError> {
        self.pool
            .within(
                async {
                    let mut conn = self
                        .pool
                        .get()
                        .await
                        .map_err(|err| StoreHealthError::unreachable(err.into_message()))?;
                    diesel::select(diesel::dsl::sql::<Integer>("1"))
                        .execute(&mut conn)
                        .await
                        .map_err(|err| StoreHealthError::unreachable(err.to_string()))?;
                    Ok(())
                },
                StoreHealthError::unreachable,
            )
            .await
    }
}
