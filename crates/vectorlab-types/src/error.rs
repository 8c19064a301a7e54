use thiserror::Error;

/// Errors from embedding and title generation.
///
/// Never retried automatically; the underlying cause travels in the message.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("authentication with {0} failed")]
    AuthenticationFailed(String),

    #[error("malformed response from {provider}: {message}")]
    Deserialization { provider: String, message: String },

    #[error("{0} returned no embedding")]
    EmptyResponse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("title model returned an empty title")]
    EmptyTitle,
}

/// Errors from schema, index, insert and search operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("conversation content must not be empty")]
    EmptyContent,

    #[error("embedding dimension mismatch: table expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding component {index} is not a finite number")]
    NonFiniteComponent { index: usize },

    #[error("search limit must be greater than zero")]
    InvalidLimit,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors in required configuration, raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} API key is not configured")]
    MissingApiKey(String),

    #[error("invalid table name '{0}': expected a lowercase SQL identifier")]
    InvalidTableName(String),

    #[error("unknown embedding backend '{0}' (expected 'ollama' or 'openrouter')")]
    UnknownBackend(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors produced while reading records from an ingestion source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read source: {0}")]
    Io(String),

    #[error("line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("line {line}: missing required field '{field}'")]
    MissingField { line: u64, field: String },
}

/// Errors from an ingestion run.
///
/// Record numbers are 1-based positions in the source. Records before the
/// failing one stay committed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("failed to prepare schema: {0}")]
    Schema(#[source] StoreError),

    #[error("reading record {record} failed: {source}")]
    Source {
        record: usize,
        #[source]
        source: SourceError,
    },

    #[error("embedding record {record} failed: {source}")]
    Embedding {
        record: usize,
        #[source]
        source: ProviderError,
    },

    #[error("inserting record {record} failed: {source}")]
    Insert {
        record: usize,
        #[source]
        source: StoreError,
    },

    #[error("ingestion cancelled after {inserted} records")]
    Cancelled { inserted: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_names_record() {
        let err = IngestError::Embedding {
            record: 13,
            source: ProviderError::EmptyResponse("ollama".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "embedding record 13 failed: ollama returned no embedding"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::MissingField {
            line: 4,
            field: "session_content".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 4: missing required field 'session_content'"
        );
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 768, got 384"
        );
    }

    #[test]
    fn test_provider_error_carries_cause() {
        let err = ProviderError::Request {
            provider: "ollama".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("ollama"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
        assert_eq!(
            StoreError::InvalidLimit.to_string(),
            "search limit must be greater than zero"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingApiKey("OpenRouter".to_string());
        assert_eq!(err.to_string(), "OpenRouter API key is not configured");
    }
}
