//! Migrated scratch databases on an embedded cluster.
//!
//! Each world owns its cluster, a freshly created database with the
//! embedded migrations applied, and a runtime for driving the async
//! repositories from synchronous tests.

use std::future::Future;

use chrono::{DateTime, TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use backpacker_connect::domain::{
    EmailAddress, FullName, PasswordHash, User, UserAccount, UserId, UserProfile, Username,
};
use backpacker_connect::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use super::pg_embed::{handle_cluster_setup_failure, test_cluster};

pub(crate) struct PgWorld {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _cluster: TestCluster,
}

/// Render a `postgres` error with the SQLSTATE and server message, which
/// its `Display` output collapses to `db error`.
pub(crate) fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(constraint) = db_error.constraint() {
        summary.push_str("; constraint: ");
        summary.push_str(constraint);
    }
    summary
}

fn create_database(admin_url: &str, name: &str) -> Result<(), String> {
    let mut client = Client::connect(admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))
}

fn setup() -> Result<PgWorld, String> {
    let cluster = test_cluster()?;
    let name = format!("test_{}", Uuid::new_v4().simple());
    create_database(&cluster.connection().database_url("postgres").to_string(), &name)?;
    let database_url = cluster.connection().database_url(&name).to_string();

    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let pool = runtime.block_on(async {
        run_pending_migrations(&database_url)
            .await
            .map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(database_url.as_str()).with_max_size(4))
            .await
            .map_err(|err| err.to_string())
    })?;

    Ok(PgWorld {
        runtime,
        pool,
        database_url,
        _cluster: cluster,
    })
}

/// A migrated database, or `None` when the cluster is unavailable and
/// `SKIP_TEST_CLUSTER` allows skipping.
pub(crate) fn pg_world() -> Option<PgWorld> {
    match setup() {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

impl PgWorld {
    pub(crate) fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run raw SQL outside Diesel, for statements the adapters never issue.
    pub(crate) fn execute(&self, sql: &str) -> Result<u64, String> {
        let mut client =
            Client::connect(&self.database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        client
            .execute(sql, &[])
            .map_err(|err| format_postgres_error(&err))
    }

    /// First row, first column of `sql` as a boolean.
    pub(crate) fn query_bool(&self, sql: &str) -> Result<bool, String> {
        let mut client =
            Client::connect(&self.database_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        client
            .query_one(sql, &[])
            .map(|row| row.get::<_, bool>(0))
            .map_err(|err| format_postgres_error(&err))
    }
}

/// Whole-second timestamps survive the microsecond precision of
/// `timestamptz` unchanged.
pub(crate) fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 12, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn account(username: &str, minute: u32) -> UserAccount {
    let created = at_minute(minute);
    UserAccount {
        user: User {
            id: UserId::random(),
            email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
            username: Username::new(username).expect("valid username"),
            full_name: FullName::new("Test Traveller").expect("valid name"),
            profile: UserProfile::default(),
            is_verified: false,
            is_active: true,
            created_at: created,
            updated_at: created,
        },
        password_hash: PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g"),
    }
}
