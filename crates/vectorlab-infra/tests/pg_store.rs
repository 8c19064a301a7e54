//! Live PostgreSQL + pgvector tests.
//!
//! Skipped unless `VECTORLAB_TEST_DATABASE_URL` points at a database with
//! the `vector` extension available. Each test works in its own table and
//! drops it afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};

use vectorlab_core::store::{ConversationStore, SchemaManager};
use vectorlab_infra::pg::{DatabasePool, PgConversationStore, PgSchemaManager};
use vectorlab_types::config::DatabaseConfig;
use vectorlab_types::index::{IndexKind, IndexSpec};
use vectorlab_types::search::DistanceMetric;

const DIM: usize = 3;

static TABLE_SEQ: AtomicUsize = AtomicUsize::new(0);

struct Fixture {
    pool: DatabasePool,
    table: String,
    schema: PgSchemaManager,
    store: PgConversationStore,
}

impl Fixture {
    async fn teardown(self) {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&self.pool.pool)
            .await
            .unwrap();
        self.pool.close().await;
    }
}

async fn fixture() -> Option<Fixture> {
    fixture_with(DistanceMetric::Cosine).await
}

async fn fixture_with(metric: DistanceMetric) -> Option<Fixture> {
    let url = std::env::var("VECTORLAB_TEST_DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url: Some(url),
        min_connections: 1,
        max_connections: 4,
        ..Default::default()
    };
    let pool = DatabasePool::connect(&config).await.unwrap();
    pool.ping().await.unwrap();

    let table = format!(
        "vlab_test_{}_{}",
        std::process::id(),
        TABLE_SEQ.fetch_add(1, Ordering::SeqCst)
    );
    let schema = PgSchemaManager::new(pool.clone(), table.clone(), DIM)
        .unwrap()
        .with_metric(metric);
    let store = PgConversationStore::new(pool.clone(), table.clone(), DIM)
        .unwrap()
        .with_metric(metric);
    schema.ensure_schema().await.unwrap();

    Some(Fixture {
        pool,
        table,
        schema,
        store,
    })
}

macro_rules! require_db {
    () => {
        require_db!(DistanceMetric::Cosine)
    };
    ($metric:expr) => {
        match fixture_with($metric).await {
            Some(f) => f,
            None => {
                eprintln!("VECTORLAB_TEST_DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let f = require_db!();
    f.schema.ensure_schema().await.unwrap();
    f.schema.ensure_schema().await.unwrap();

    let stats = f.schema.stats().await.unwrap();
    assert_eq!(stats.row_count, 0);
    let default_name = format!("idx_{}_embedding", f.table);
    let default_index = stats
        .indexes
        .iter()
        .find(|i| i.name == default_name)
        .expect("default index present");
    assert_eq!(default_index.kind, IndexKind::Hnsw);
    f.teardown().await;
}

#[tokio::test]
async fn insert_then_search_returns_nearest_first() {
    let f = require_db!();
    let id_a = f.store.insert("alice", "hnsw graphs", &[1.0, 0.0, 0.0], Some("HNSW")).await.unwrap();
    let id_b = f.store.insert("bob", "ivfflat lists", &[0.0, 1.0, 0.0], None).await.unwrap();
    f.store.insert("carol", "vacuum", &[0.0, 0.0, 1.0], None).await.unwrap();
    assert!(id_b > id_a);

    let hits = f.store.search_similar(&[0.9, 0.1, 0.0], 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, id_a);
    assert_eq!(hits[0].title.as_deref(), Some("HNSW"));
    assert!(hits[0].distance <= hits[1].distance);

    let stats = f.schema.stats().await.unwrap();
    assert_eq!(stats.row_count, 3);
    f.teardown().await;
}

async fn assert_each_vector_finds_itself(metric: DistanceMetric) {
    let f = require_db!(metric);
    let vectors: [[f32; DIM]; 4] = [
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
    ];
    let mut ids = Vec::new();
    for (i, v) in vectors.iter().enumerate() {
        let id = f
            .store
            .insert("alice", &format!("row {i}"), v, None)
            .await
            .unwrap();
        ids.push(id);
    }

    for (id, v) in ids.iter().zip(vectors.iter()) {
        let hits = f.store.search_similar(v, 4).await.unwrap();
        assert_eq!(hits[0].id, *id, "{metric}: {v:?} should be its own nearest");
        assert!(hits[0].distance.abs() < 1e-6, "{metric}: distance {}", hits[0].distance);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
    f.teardown().await;
}

#[tokio::test]
async fn stored_vector_is_its_own_nearest_cosine() {
    assert_each_vector_finds_itself(DistanceMetric::Cosine).await;
}

#[tokio::test]
async fn stored_vector_is_its_own_nearest_euclidean() {
    assert_each_vector_finds_itself(DistanceMetric::Euclidean).await;
}

#[tokio::test]
async fn search_limit_one_returns_exactly_one_row() {
    let f = require_db!();
    for (user, v) in [("a", [1.0f32, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0]), ("c", [0.0, 0.0, 1.0])] {
        f.store.insert(user, "content", &v, None).await.unwrap();
    }

    let hits = f.store.search_similar(&[0.0, 1.0, 0.0], 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].username, "b");

    let hybrid = f
        .store
        .search_hybrid(&[0.0, 1.0, 0.0], "content", 1)
        .await
        .unwrap();
    assert_eq!(hybrid.len(), 1);
    f.teardown().await;
}

#[tokio::test]
async fn hybrid_partial_term_rows_sort_by_distance() {
    let f = require_db!();
    f.store
        .insert("alice", "autovacuum memory tuning", &[0.0, 0.0, 1.0], None)
        .await
        .unwrap();
    // Shares "memory" with the query but does not match it.
    f.store
        .insert("bob", "graph nearest neighbour memory", &[1.0, 1.0, 0.0], None)
        .await
        .unwrap();
    f.store
        .insert("carol", "index build notes", &[1.0, 0.1, 0.0], None)
        .await
        .unwrap();

    let hits = f
        .store
        .search_hybrid(&[1.0, 0.0, 0.0], "autovacuum memory", 10)
        .await
        .unwrap();

    let users: Vec<&str> = hits.iter().map(|h| h.username.as_str()).collect();
    assert_eq!(users, vec!["alice", "carol", "bob"]);
    assert!(hits[0].text_match);
    assert!(hits[1..].iter().all(|h| !h.text_match && h.rank == 0.0));
    f.teardown().await;
}

#[tokio::test]
async fn hybrid_search_puts_text_matches_first() {
    let f = require_db!();
    f.store
        .insert("alice", "tuning postgres autovacuum settings", &[0.0, 0.0, 1.0], None)
        .await
        .unwrap();
    f.store
        .insert("bob", "graph based nearest neighbour", &[1.0, 0.0, 0.0], None)
        .await
        .unwrap();
    f.store
        .insert("carol", "unrelated and far away", &[-1.0, 0.0, 0.0], None)
        .await
        .unwrap();

    let hits = f
        .store
        .search_hybrid(&[1.0, 0.05, 0.0], "autovacuum", 10)
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits[0].text_match);
    assert_eq!(hits[0].username, "alice");
    assert!(!hits[1].text_match);
    assert_eq!(hits[1].username, "bob");
    assert!(hits.iter().all(|h| h.qualifies()));
    f.teardown().await;
}

#[tokio::test]
async fn create_and_drop_indexes() {
    let f = require_db!();
    f.store.insert("alice", "seed row", &[1.0, 0.0, 0.0], None).await.unwrap();

    let first = f.schema.create_index(&IndexSpec::hnsw_default()).await.unwrap();
    assert!(first.created);
    let again = f.schema.create_index(&IndexSpec::hnsw_default()).await.unwrap();
    assert!(!again.created);
    assert_eq!(again.kind, IndexKind::Hnsw);
    assert_eq!(again.metric, DistanceMetric::Cosine);

    let ivf = IndexSpec::IvfFlat {
        partition_count: 1,
        metric: DistanceMetric::Euclidean,
    };
    assert!(f.schema.create_index(&ivf).await.unwrap().created);

    let stats = f.schema.stats().await.unwrap();
    assert_eq!(stats.vector_indexes().count(), 3);

    f.schema.drop_indexes().await.unwrap();
    f.schema.drop_indexes().await.unwrap();
    let stats = f.schema.stats().await.unwrap();
    assert_eq!(stats.vector_indexes().count(), 0);
    assert_eq!(stats.row_count, 1);
    f.teardown().await;
}

#[tokio::test]
async fn explain_reports_plan_or_error_string() {
    let f = require_db!();
    let plan = f
        .store
        .explain_similarity(&[1.0, 0.0, 0.0], 5, DistanceMetric::Cosine)
        .await
        .unwrap();
    assert!(plan.contains("Execution Time"));

    let l2 = f
        .store
        .explain_similarity(&[1.0, 0.0, 0.0], 5, DistanceMetric::Euclidean)
        .await
        .unwrap();
    assert!(!l2.starts_with("Error: "), "{l2}");

    let broken = f.store.explain("SELECT * FROM no_such_table_here").await;
    assert!(broken.starts_with("Error: "));
    f.teardown().await;
}

#[tokio::test]
async fn stats_tolerate_missing_table() {
    let Some(f) = fixture().await else {
        eprintln!("VECTORLAB_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let missing = PgSchemaManager::new(f.pool.clone(), "vlab_never_created", DIM).unwrap();
    let stats = missing.stats().await.unwrap();
    assert_eq!(stats.row_count, 0);
    assert!(stats.indexes.is_empty());
    f.teardown().await;
}
