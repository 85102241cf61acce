//! `DieselRelationalStore` against embedded PostgreSQL.
//!
//! Opt-in: run with `RUN_PG_EMBEDDED=1 cargo test -- --ignored`.

use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;
use dualwrite::domain::ports::{InsertOutcome, RelationalStore, SchemaInitializer};
use dualwrite::domain::{Product, User};
use dualwrite::outbound::persistence::{DbPool, DieselRelationalStore, PoolConfig};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    let mut conn = pool.get().await.expect("connection checkout");
    sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
        .get_result::<Count>(&mut conn)
        .await
        .expect("count query")
        .count
}

#[test]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn schema_and_inserts_follow_store_semantics() {
    if !pg_embed::enabled() {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run");
        return;
    }
    let cluster = pg_embed::test_cluster().expect("embedded Postgres should start");
    let url = cluster.connection().database_url("postgres");
    let runtime = Runtime::new().expect("tokio runtime");

    runtime.block_on(async {
        let pool = DbPool::connect(PoolConfig::new(url).with_max_size(2))
            .await
            .expect("pool connects");
        let store = DieselRelationalStore::new(pool.clone());
        let user = User::try_new("A", "a@x.com", "p").expect("valid user");
        let product = Product::try_new("Lamp", 19.5, None).expect("valid product");

        let err = store
            .insert_user(&user)
            .await
            .expect_err("tables do not exist yet");
        assert_eq!(err.kind(), "query");

        store.ensure_schema().await.expect("schema created");
        store.ensure_schema().await.expect("schema creation is idempotent");

        assert_eq!(
            store.insert_user(&user).await.expect("first insert"),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_user(&user).await.expect("second insert"),
            InsertOutcome::DuplicateSkipped
        );
        assert_eq!(count_rows(&pool, "users").await, 1);

        store.insert_product(&product).await.expect("first product");
        store.insert_product(&product).await.expect("second product");
        assert_eq!(count_rows(&pool, "products").await, 2);
    });
}
