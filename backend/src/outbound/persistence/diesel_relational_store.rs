//! PostgreSQL-backed relational store and schema initializer.

use async_trait::async_trait;
use diesel::sql_query;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::{debug, info};

use crate::domain::ports::{
    InsertOutcome, RelationalStore, RelationalStoreError, SchemaInitializer,
};
use crate::domain::{Product, User};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProductRow, NewUserRow};
use super::pool::DbPool;
use super::schema::{products, users};

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (\
    id SERIAL PRIMARY KEY, \
    name TEXT NOT NULL, \
    email TEXT NOT NULL UNIQUE, \
    password TEXT NOT NULL\
)";

const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS products (\
    id SERIAL PRIMARY KEY, \
    name TEXT NOT NULL, \
    price DOUBLE PRECISION NOT NULL, \
    description TEXT\
)";

/// Diesel implementation of the relational store ports.
///
/// # Examples
///
/// ```rust,no_run
/// use dualwrite::outbound::persistence::{DbPool, DieselRelationalStore, PoolConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::connect(PoolConfig::new("postgres://localhost/app")).await?;
/// let store = DieselRelationalStore::new(pool);
/// # let _ = store;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DieselRelationalStore {
    pool: DbPool,
}

impl DieselRelationalStore {
    /// Create a store over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationalStore for DieselRelationalStore {
    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, RelationalStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows_affected = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .on_conflict(users::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if rows_affected == 0 {
            debug!(email = user.email(), "user row already present; insert skipped");
            return Ok(InsertOutcome::DuplicateSkipped);
        }
        Ok(InsertOutcome::Inserted)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RelationalStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(NewProductRow::from(product))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl SchemaInitializer for DieselRelationalStore {
    async fn ensure_schema(&self) -> Result<(), RelationalStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                sql_query(CREATE_USERS).execute(conn).await?;
                sql_query(CREATE_PRODUCTS).execute(conn).await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;
        info!("relational schema ensured");
        Ok(())
    }
}
