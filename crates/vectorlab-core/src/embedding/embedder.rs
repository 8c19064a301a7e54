//! Embedder trait for text-to-vector conversion.
//!
//! Implementations (Ollama, OpenRouter) live in vectorlab-infra.

use vectorlab_types::error::ProviderError;

/// Trait for converting text into a fixed-length embedding vector.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
///
/// Implementations must reject empty text with [`ProviderError::EmptyInput`]
/// and must fail with [`ProviderError::DimensionMismatch`] rather than return
/// a vector whose length differs from [`Embedder::dimension`].
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, ProviderError>> + Send;

    /// Provider name for logs and status output (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// The model producing the vectors (e.g., "nomic-embed-text").
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;
}

/// Shared input/output checks for [`Embedder`] implementations.
pub fn check_input(text: &str) -> Result<(), ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::EmptyInput);
    }
    Ok(())
}

/// Verify a returned vector has the configured length.
pub fn check_dimension(vector: &[f32], expected: usize) -> Result<(), ProviderError> {
    if vector.len() != expected {
        return Err(ProviderError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_input_rejects_blank() {
        assert!(matches!(check_input(""), Err(ProviderError::EmptyInput)));
        assert!(matches!(check_input("  \n\t"), Err(ProviderError::EmptyInput)));
        assert!(check_input("vector search").is_ok());
    }

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension(&[0.0; 768], 768).is_ok());
        match check_dimension(&[0.0; 384], 768) {
            Err(ProviderError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 768);
                assert_eq!(actual, 384);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }
}
