//! pgvector schema management.
//!
//! Owns the conversation table and its three known index names:
//! `idx_{table}_embedding` (default HNSW built by `ensure_schema`),
//! `idx_{table}_hnsw` and `idx_{table}_ivfflat` (built on request).
//! The table name is validated at construction because it is interpolated
//! into DDL.

use sqlx::Row;
use tracing::{debug, info};

use vectorlab_core::store::SchemaManager;
use vectorlab_types::config::validate_table_name;
use vectorlab_types::error::{ConfigError, StoreError};
use vectorlab_types::index::{IndexDescriptor, IndexInfo, IndexKind, IndexSpec, SchemaStats};
use vectorlab_types::search::DistanceMetric;

use super::map_sqlx_error;
use super::pool::DatabasePool;

/// PostgreSQL-backed implementation of `SchemaManager`.
pub struct PgSchemaManager {
    pool: DatabasePool,
    table: String,
    dimension: usize,
    metric: DistanceMetric,
}

impl PgSchemaManager {
    pub fn new(
        pool: DatabasePool,
        table: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, ConfigError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            pool,
            table,
            dimension,
            metric: DistanceMetric::default(),
        })
    }

    /// Operator class used by the default index.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn default_index_name(&self) -> String {
        format!("idx_{}_embedding", self.table)
    }

    /// Name of the alternate index built for `spec`.
    pub fn index_name(&self, spec: &IndexSpec) -> String {
        match spec {
            IndexSpec::Hnsw { .. } => format!("idx_{}_hnsw", self.table),
            IndexSpec::IvfFlat { .. } => format!("idx_{}_ivfflat", self.table),
        }
    }

    fn known_index_names(&self) -> [String; 3] {
        [
            self.default_index_name(),
            format!("idx_{}_hnsw", self.table),
            format!("idx_{}_ivfflat", self.table),
        ]
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL,
                session_content TEXT NOT NULL,
                session_title TEXT,
                embedding vector({dim}),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            table = self.table,
            dim = self.dimension,
        )
    }

    fn default_index_sql(&self) -> String {
        let spec = IndexSpec::Hnsw {
            connections_per_node: IndexSpec::DEFAULT_CONNECTIONS_PER_NODE,
            build_quality: IndexSpec::DEFAULT_BUILD_QUALITY,
            metric: self.metric,
        };
        self.create_index_sql(&self.default_index_name(), &spec)
    }

    fn create_index_sql(&self, name: &str, spec: &IndexSpec) -> String {
        match *spec {
            IndexSpec::Hnsw {
                connections_per_node,
                build_quality,
                metric,
            } => format!(
                "CREATE INDEX IF NOT EXISTS {name} ON {table} USING hnsw (embedding {ops}) \
                 WITH (m = {connections_per_node}, ef_construction = {build_quality})",
                table = self.table,
                ops = metric.operator_class(),
            ),
            IndexSpec::IvfFlat {
                partition_count,
                metric,
            } => format!(
                "CREATE INDEX IF NOT EXISTS {name} ON {table} USING ivfflat (embedding {ops}) \
                 WITH (lists = {partition_count})",
                table = self.table,
                ops = metric.operator_class(),
            ),
        }
    }

    async fn execute(&self, sql: &str) -> Result<(), StoreError> {
        debug!(sql, "executing DDL");
        sqlx::query(sql)
            .execute(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn existing_index_definition(&self, name: &str) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT indexdef FROM pg_indexes \
             WHERE schemaname = current_schema() AND tablename = $1 AND indexname = $2",
        )
        .bind(&self.table)
        .bind(name)
        .fetch_optional(&self.pool.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn table_exists(&self) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT to_regclass($1::text) IS NOT NULL")
            .bind(&self.table)
            .fetch_one(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

/// Metric an existing index was built for, read from its operator class.
fn metric_from_definition(indexdef: &str) -> Option<DistanceMetric> {
    let def = indexdef.to_lowercase();
    [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::InnerProduct,
    ]
    .into_iter()
    .find(|metric| def.contains(metric.operator_class()))
}

impl SchemaManager for PgSchemaManager {
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.execute("CREATE EXTENSION IF NOT EXISTS vector").await?;
        self.execute(&self.create_table_sql()).await?;
        self.execute(&self.default_index_sql()).await?;
        info!(table = %self.table, dimension = self.dimension, "schema ready");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn create_index(&self, spec: &IndexSpec) -> Result<IndexDescriptor, StoreError> {
        spec.validate().map_err(StoreError::InvalidInput)?;
        let name = self.index_name(spec);

        if let Some(indexdef) = self.existing_index_definition(&name).await? {
            debug!(index = %name, "index already present");
            return Ok(IndexDescriptor {
                name,
                kind: IndexKind::from_definition(&indexdef),
                metric: metric_from_definition(&indexdef).unwrap_or(spec.metric()),
                created: false,
            });
        }

        self.execute(&self.create_index_sql(&name, spec)).await?;
        info!(index = %name, kind = %spec.kind(), metric = %spec.metric(), "index created");

        Ok(IndexDescriptor {
            name,
            kind: spec.kind(),
            metric: spec.metric(),
            created: true,
        })
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn drop_indexes(&self) -> Result<(), StoreError> {
        for name in self.known_index_names() {
            self.execute(&format!("DROP INDEX IF EXISTS {name}")).await?;
        }
        info!(table = %self.table, "similarity indexes dropped");
        Ok(())
    }

    async fn stats(&self) -> Result<SchemaStats, StoreError> {
        if !self.table_exists().await? {
            return Ok(SchemaStats::default());
        }

        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)?;

        let rows = sqlx::query(
            "SELECT indexname, indexdef, \
                    pg_relation_size(format('%I.%I', schemaname, indexname)::regclass) AS size_bytes, \
                    pg_size_pretty(pg_relation_size(format('%I.%I', schemaname, indexname)::regclass)) AS size \
             FROM pg_indexes \
             WHERE schemaname = current_schema() AND tablename = $1 \
             ORDER BY indexname",
        )
        .bind(&self.table)
        .fetch_all(&self.pool.pool)
        .await
        .map_err(map_sqlx_error)?;

        let indexes = rows
            .iter()
            .map(|row| {
                let indexdef: String = row.try_get("indexdef")?;
                Ok(IndexInfo {
                    name: row.try_get("indexname")?,
                    kind: IndexKind::from_definition(&indexdef),
                    size: row.try_get("size")?,
                    size_bytes: row.try_get("size_bytes")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(map_sqlx_error)?;

        Ok(SchemaStats { row_count, indexes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectorlab_types::config::DatabaseConfig;

    fn lazy_pool() -> DatabasePool {
        let config = DatabaseConfig {
            min_connections: 0,
            ..Default::default()
        };
        DatabasePool::connect_lazy(&config).unwrap()
    }

    #[tokio::test]
    async fn test_rejects_unsafe_table_name() {
        let result = PgSchemaManager::new(lazy_pool(), "chats; DROP TABLE x", 768);
        assert!(matches!(result, Err(ConfigError::InvalidTableName(_))));
    }

    #[tokio::test]
    async fn test_index_names() {
        let schema = PgSchemaManager::new(lazy_pool(), "conversations", 768).unwrap();
        assert_eq!(schema.default_index_name(), "idx_conversations_embedding");
        assert_eq!(
            schema.index_name(&IndexSpec::hnsw_default()),
            "idx_conversations_hnsw"
        );
        assert_eq!(
            schema.index_name(&IndexSpec::ivfflat_default()),
            "idx_conversations_ivfflat"
        );
    }

    #[tokio::test]
    async fn test_ddl_text() {
        let schema = PgSchemaManager::new(lazy_pool(), "chats", 384).unwrap();
        let table = schema.create_table_sql();
        assert!(table.contains("CREATE TABLE IF NOT EXISTS chats"));
        assert!(table.contains("embedding vector(384)"));
        assert!(table.contains("session_title TEXT,"));

        assert_eq!(
            schema.default_index_sql(),
            "CREATE INDEX IF NOT EXISTS idx_chats_embedding ON chats USING hnsw \
             (embedding vector_cosine_ops) WITH (m = 16, ef_construction = 64)"
        );

        let ivf = IndexSpec::IvfFlat {
            partition_count: 100,
            metric: DistanceMetric::Euclidean,
        };
        assert_eq!(
            schema.create_index_sql("idx_chats_ivfflat", &ivf),
            "CREATE INDEX IF NOT EXISTS idx_chats_ivfflat ON chats USING ivfflat \
             (embedding vector_l2_ops) WITH (lists = 100)"
        );
    }

    #[tokio::test]
    async fn test_create_index_validates_before_sql() {
        let schema = PgSchemaManager::new(lazy_pool(), "conversations", 768).unwrap();
        let bad = IndexSpec::Hnsw {
            connections_per_node: 16,
            build_quality: 8,
            metric: DistanceMetric::Cosine,
        };
        assert!(matches!(
            schema.create_index(&bad).await,
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_metric_from_definition() {
        let def = "CREATE INDEX idx_conversations_hnsw ON public.conversations \
                   USING hnsw (embedding vector_ip_ops) WITH (m='16', ef_construction='64')";
        assert_eq!(
            metric_from_definition(def),
            Some(DistanceMetric::InnerProduct)
        );
        assert_eq!(
            metric_from_definition("CREATE UNIQUE INDEX p ON t USING btree (id)"),
            None
        );
    }
}
