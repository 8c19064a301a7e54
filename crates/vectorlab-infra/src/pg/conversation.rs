//! pgvector-backed conversation store.
//!
//! Implements `ConversationStore` from `vectorlab-core`. The distance
//! operator comes from the configured [`DistanceMetric`] and is used both to
//! order rows and to report their distance.

use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::debug;

use vectorlab_core::store::ConversationStore;
use vectorlab_core::store::validate::{check_content, check_embedding, check_limit};
use vectorlab_types::config::validate_table_name;
use vectorlab_types::error::{ConfigError, StoreError};
use vectorlab_types::search::{DistanceMetric, HYBRID_DISTANCE_THRESHOLD, HybridHit, SimilarHit};

use super::pool::DatabasePool;
use super::{map_sqlx_error, vector_literal};

/// PostgreSQL-backed implementation of `ConversationStore`.
pub struct PgConversationStore {
    pool: DatabasePool,
    table: String,
    dimension: usize,
    metric: DistanceMetric,
}

impl PgConversationStore {
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

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Explain the similarity query for `query_embedding` under `metric`,
    /// which may differ from the store's own, to compare plans across
    /// operator classes.
    ///
    /// The vector is inlined so the plan shows whether an index scan is used.
    pub async fn explain_similarity(
        &self,
        query_embedding: &[f32],
        limit: usize,
        metric: DistanceMetric,
    ) -> Result<String, StoreError> {
        check_embedding(query_embedding, self.dimension)?;
        check_limit(limit)?;
        let sql = self.explain_similarity_sql(query_embedding, limit, metric);
        Ok(self.explain(&sql).await)
    }

    fn explain_similarity_sql(
        &self,
        query_embedding: &[f32],
        limit: usize,
        metric: DistanceMetric,
    ) -> String {
        let literal = format!("'{}'::vector", vector_literal(query_embedding));
        format!(
            "SELECT id, username, session_title, embedding {op} {literal} AS distance \
             FROM {table} ORDER BY embedding {op} {literal} LIMIT {limit}",
            op = metric.operator(),
            table = self.table,
        )
    }

    fn similar_sql(&self) -> String {
        format!(
            "SELECT id, username, session_content, session_title, created_at, \
                    (embedding {op} $1::vector)::float8 AS distance \
             FROM {table} \
             WHERE embedding IS NOT NULL \
             ORDER BY embedding {op} $1::vector \
             LIMIT $2",
            op = self.metric.operator(),
            table = self.table,
        )
    }

    fn hybrid_sql(&self) -> String {
        format!(
            "SELECT id, username, session_content, session_title, created_at, \
                    (embedding {op} $1::vector)::float8 AS distance, \
                    CASE WHEN to_tsvector('english', session_content) \
                                  @@ plainto_tsquery('english', $2) \
                         THEN ts_rank(to_tsvector('english', session_content), \
                                      plainto_tsquery('english', $2))::float8 \
                         ELSE 0::float8 END AS rank, \
                    to_tsvector('english', session_content) @@ plainto_tsquery('english', $2) \
                        AS text_match \
             FROM {table} \
             WHERE embedding IS NOT NULL \
               AND (to_tsvector('english', session_content) @@ plainto_tsquery('english', $2) \
                    OR (embedding {op} $1::vector) < $3) \
             ORDER BY text_match DESC, rank DESC, distance ASC \
             LIMIT $4",
            op = self.metric.operator(),
            table = self.table,
        )
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn similar_hit(row: &PgRow) -> Result<SimilarHit, sqlx::Error> {
    Ok(SimilarHit {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        content: row.try_get("session_content")?,
        title: row.try_get("session_title")?,
        created_at: row.try_get("created_at")?,
        distance: row.try_get("distance")?,
    })
}

fn hybrid_hit(row: &PgRow) -> Result<HybridHit, sqlx::Error> {
    Ok(HybridHit {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        content: row.try_get("session_content")?,
        title: row.try_get("session_title")?,
        created_at: row.try_get("created_at")?,
        distance: row.try_get("distance")?,
        rank: row.try_get("rank")?,
        text_match: row.try_get("text_match")?,
    })
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// ConversationStore implementation
// ---------------------------------------------------------------------------

impl ConversationStore for PgConversationStore {
    #[tracing::instrument(skip(self, content, embedding), fields(table = %self.table))]
    async fn insert(
        &self,
        username: &str,
        content: &str,
        embedding: &[f32],
        title: Option<&str>,
    ) -> Result<i64, StoreError> {
        check_content(content)?;
        check_embedding(embedding, self.dimension)?;

        let sql = format!(
            "INSERT INTO {} (username, session_content, session_title, embedding) \
             VALUES ($1, $2, $3, $4::vector) RETURNING id",
            self.table
        );
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(username)
            .bind(content)
            .bind(title)
            .bind(vector_literal(embedding))
            .fetch_one(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(id, "conversation inserted");
        Ok(id)
    }

    #[tracing::instrument(skip(self, query_embedding), fields(table = %self.table, metric = %self.metric))]
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarHit>, StoreError> {
        check_embedding(query_embedding, self.dimension)?;
        check_limit(limit)?;

        let rows = sqlx::query(&self.similar_sql())
            .bind(vector_literal(query_embedding))
            .bind(limit_param(limit))
            .fetch_all(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)?;

        let hits = rows
            .iter()
            .map(similar_hit)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlx_error)?;
        debug!(hits = hits.len(), "similarity search done");
        Ok(hits)
    }

    #[tracing::instrument(skip(self, query_embedding), fields(table = %self.table, metric = %self.metric))]
    async fn search_hybrid(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<HybridHit>, StoreError> {
        check_embedding(query_embedding, self.dimension)?;
        check_limit(limit)?;

        let rows = sqlx::query(&self.hybrid_sql())
            .bind(vector_literal(query_embedding))
            .bind(query_text)
            .bind(HYBRID_DISTANCE_THRESHOLD)
            .bind(limit_param(limit))
            .fetch_all(&self.pool.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut hits = rows
            .iter()
            .map(hybrid_hit)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlx_error)?;
        hits.sort_by(HybridHit::relevance_order);
        debug!(hits = hits.len(), "hybrid search done");
        Ok(hits)
    }

    async fn explain(&self, query: &str) -> String {
        let sql = format!("EXPLAIN (ANALYZE, BUFFERS, FORMAT TEXT) {query}");
        match sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool.pool)
            .await
        {
            Ok(lines) => lines.join("\n"),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
