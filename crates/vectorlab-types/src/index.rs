//! Vector index descriptors and schema statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::search::DistanceMetric;

/// Kind of an index on the conversations table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Graph-based approximate nearest neighbour (HNSW).
    Hnsw,
    /// Clustering-based inverted lists (IVFFlat).
    IvfFlat,
    /// Anything that is not a vector index (e.g. the primary key btree).
    Other,
}

impl IndexKind {
    /// Classify an index from its `pg_indexes.indexdef` text.
    pub fn from_definition(indexdef: &str) -> Self {
        let def = indexdef.to_lowercase();
        if def.contains("using hnsw") {
            IndexKind::Hnsw
        } else if def.contains("using ivfflat") {
            IndexKind::IvfFlat
        } else {
            IndexKind::Other
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, IndexKind::Hnsw | IndexKind::IvfFlat)
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Hnsw => write!(f, "hnsw"),
            IndexKind::IvfFlat => write!(f, "ivfflat"),
            IndexKind::Other => write!(f, "other"),
        }
    }
}

/// Request to create one alternate similarity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndexSpec {
    Hnsw {
        /// pgvector `m`: max connections per graph node.
        connections_per_node: u32,
        /// pgvector `ef_construction`: candidate list size while building.
        build_quality: u32,
        metric: DistanceMetric,
    },
    IvfFlat {
        /// pgvector `lists`: number of partitions.
        partition_count: u32,
        metric: DistanceMetric,
    },
}

impl IndexSpec {
    pub const DEFAULT_CONNECTIONS_PER_NODE: u32 = 16;
    pub const DEFAULT_BUILD_QUALITY: u32 = 64;
    pub const DEFAULT_PARTITION_COUNT: u32 = 10;

    pub fn hnsw_default() -> Self {
        IndexSpec::Hnsw {
            connections_per_node: Self::DEFAULT_CONNECTIONS_PER_NODE,
            build_quality: Self::DEFAULT_BUILD_QUALITY,
            metric: DistanceMetric::Cosine,
        }
    }

    pub fn ivfflat_default() -> Self {
        IndexSpec::IvfFlat {
            partition_count: Self::DEFAULT_PARTITION_COUNT,
            metric: DistanceMetric::Cosine,
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            IndexSpec::Hnsw { .. } => IndexKind::Hnsw,
            IndexSpec::IvfFlat { .. } => IndexKind::IvfFlat,
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        match self {
            IndexSpec::Hnsw { metric, .. } | IndexSpec::IvfFlat { metric, .. } => *metric,
        }
    }

    /// Check the parameters against pgvector's accepted ranges.
    ///
    /// HNSW requires `m` in 2..=100 and `ef_construction >= 2 * m`;
    /// IVFFlat requires `lists` in 1..=32768.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            IndexSpec::Hnsw {
                connections_per_node,
                build_quality,
                ..
            } => {
                if !(2..=100).contains(&connections_per_node) {
                    return Err(format!(
                        "connections_per_node must be between 2 and 100, got {connections_per_node}"
                    ));
                }
                if build_quality < 2 * connections_per_node || build_quality > 1000 {
                    return Err(format!(
                        "build_quality must be between {} and 1000, got {build_quality}",
                        2 * connections_per_node
                    ));
                }
                Ok(())
            }
            IndexSpec::IvfFlat {
                partition_count, ..
            } => {
                if !(1..=32_768).contains(&partition_count) {
                    return Err(format!(
                        "partition_count must be between 1 and 32768, got {partition_count}"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Result of `create_index`: what exists now and whether this call created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub kind: IndexKind,
    pub metric: DistanceMetric,
    /// False when the index already existed and nothing was built.
    pub created: bool,
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.created { "created" } else { "already exists" };
        write!(
            f,
            "{} index '{}' ({} distance) {}",
            self.kind, self.name, self.metric, verb
        )
    }
}

/// One index on the conversations table as reported by `stats()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub kind: IndexKind,
    /// Human-readable size from `pg_size_pretty`.
    pub size: String,
    pub size_bytes: i64,
}

/// Read-only snapshot of the table and its indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaStats {
    pub row_count: i64,
    pub indexes: Vec<IndexInfo>,
}

impl SchemaStats {
    /// Only the HNSW/IVFFlat indexes.
    pub fn vector_indexes(&self) -> impl Iterator<Item = &IndexInfo> {
        self.indexes.iter().filter(|i| i.kind.is_vector())
    }
}
