//! Ingestion progress reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an ingestion run currently is.
///
/// `Opened -> Reading -> {Embedding -> Inserting}* -> Completed | Failed`.
/// A run abandoned through its cancellation token ends in `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestPhase {
    Opened,
    Reading,
    Titling,
    Embedding,
    Inserting,
    Completed,
    Failed,
    Cancelled,
}

impl IngestPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IngestPhase::Completed | IngestPhase::Failed | IngestPhase::Cancelled
        )
    }
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngestPhase::Opened => "opened",
            IngestPhase::Reading => "reading",
            IngestPhase::Titling => "generating title",
            IngestPhase::Embedding => "embedding",
            IngestPhase::Inserting => "inserting",
            IngestPhase::Completed => "completed",
            IngestPhase::Failed => "failed",
            IngestPhase::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Snapshot emitted to the progress observer after each state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestProgress {
    pub phase: IngestPhase,
    /// 1-based number of the record being processed (0 before the first).
    pub record: usize,
    /// Records committed so far.
    pub inserted: usize,
    /// 1-based batch number (0 before the first).
    pub batch: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(IngestPhase::Completed.is_terminal());
        assert!(IngestPhase::Failed.is_terminal());
        assert!(IngestPhase::Cancelled.is_terminal());
        assert!(!IngestPhase::Embedding.is_terminal());
    }

    #[test]
    fn test_phase_serde_lowercase() {
        let json = serde_json::to_string(&IngestPhase::Inserting).unwrap();
        assert_eq!(json, "\"inserting\"");
    }
}
