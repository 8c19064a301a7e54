//! BoxEmbedder -- object-safe dynamic dispatch wrapper for Embedder.
//!
//! 1. Define an object-safe `EmbedderDyn` trait with boxed futures
//! 2. Blanket-impl `EmbedderDyn` for all `T: Embedder`
//! 3. `BoxEmbedder` wraps `Box<dyn EmbedderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use vectorlab_types::error::ProviderError;

use super::embedder::Embedder;

/// Object-safe version of [`Embedder`] with boxed futures.
pub trait EmbedderDyn: Send + Sync {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, ProviderError>> + Send + 'a>>;

    fn provider_name_dyn(&self) -> &str;

    fn model_name_dyn(&self) -> &str;

    fn dimension_dyn(&self) -> usize;
}

impl<T: Embedder> EmbedderDyn for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, ProviderError>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }

    fn provider_name_dyn(&self) -> &str {
        self.provider_name()
    }

    fn model_name_dyn(&self) -> &str {
        self.model_name()
    }

    fn dimension_dyn(&self) -> usize {
        self.dimension()
    }
}

/// Type-erased embedder chosen from configuration at startup.
///
/// Since `Embedder` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxEmbedder` implements `Embedder` itself, so code generic over the trait
/// accepts either a concrete provider or this box.
pub struct BoxEmbedder {
    inner: Box<dyn EmbedderDyn + Send + Sync>,
}

impl BoxEmbedder {
    /// Wrap a concrete `Embedder` in a type-erased box.
    pub fn new<T: Embedder + 'static>(embedder: T) -> Self {
        Self {
            inner: Box::new(embedder),
        }
    }
}

impl Embedder for BoxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.inner.embed_boxed(text).await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name_dyn()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name_dyn()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension_dyn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder;

    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
            super::super::embedder::check_input(text)?;
            Ok(vec![0.5; 4])
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }

        fn model_name(&self) -> &str {
            "fixed-4"
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    #[tokio::test]
    async fn test_box_embedder_delegates() {
        let boxed = BoxEmbedder::new(FixedEmbedder);
        assert_eq!(boxed.provider_name(), "fixed");
        assert_eq!(boxed.model_name(), "fixed-4");
        assert_eq!(boxed.dimension(), 4);
        assert_eq!(boxed.embed("hello").await.unwrap(), vec![0.5; 4]);
    }

    #[tokio::test]
    async fn test_box_embedder_propagates_errors() {
        let boxed = BoxEmbedder::new(FixedEmbedder);
        assert!(matches!(
            boxed.embed("").await,
            Err(ProviderError::EmptyInput)
        ));
    }
}
