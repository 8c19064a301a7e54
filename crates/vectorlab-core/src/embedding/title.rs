//! Short title generation for conversation bodies.
//!
//! A title is a convenience label; callers decide whether a missing title
//! is fatal. The ingestion pipeline treats it as optional.

use std::future::Future;
use std::pin::Pin;

use vectorlab_types::error::ProviderError;

/// System prompt for the title model.
pub const TITLE_SYSTEM_PROMPT: &str = "Generate a short, descriptive title (max 5 words) for this Python/PostgreSQL conversation. Just return the title, no quotes.";

/// Only this many characters of the body are sent to the title model.
pub const TITLE_INPUT_CHARS: usize = 1000;

/// Trait for producing a short human-readable label for a text body.
pub trait TitleSummarizer: Send + Sync {
    fn summarize_title(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// The model used for titles (e.g., "phi4-mini").
    fn model_name(&self) -> &str;
}

/// First [`TITLE_INPUT_CHARS`] characters of `text`, on a char boundary.
pub fn title_input(text: &str) -> &str {
    match text.char_indices().nth(TITLE_INPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Normalize a raw model reply into a title.
///
/// Keeps the first non-empty line, trims whitespace and surrounding quotes.
pub fn clean_title(raw: &str) -> Result<String, ProviderError> {
    let title = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    if title.is_empty() {
        return Err(ProviderError::EmptyTitle);
    }
    Ok(title)
}

/// Object-safe version of [`TitleSummarizer`] with boxed futures.
pub trait TitleSummarizerDyn: Send + Sync {
    fn summarize_title_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

    fn model_name_dyn(&self) -> &str;
}

impl<T: TitleSummarizer> TitleSummarizerDyn for T {
    fn summarize_title_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.summarize_title(text))
    }

    fn model_name_dyn(&self) -> &str {
        self.model_name()
    }
}

/// Type-erased title summarizer.
pub struct BoxTitleSummarizer {
    inner: Box<dyn TitleSummarizerDyn + Send + Sync>,
}

impl BoxTitleSummarizer {
    pub fn new<T: TitleSummarizer + 'static>(summarizer: T) -> Self {
        Self {
            inner: Box::new(summarizer),
        }
    }
}

impl TitleSummarizer for BoxTitleSummarizer {
    async fn summarize_title(&self, text: &str) -> Result<String, ProviderError> {
        self.inner.summarize_title_boxed(text).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name_dyn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_strips_quotes_and_whitespace() {
        assert_eq!(
            clean_title("  \"Tuning HNSW Parameters\"  ").unwrap(),
            "Tuning HNSW Parameters"
        );
        assert_eq!(clean_title("'IVFFlat Lists'").unwrap(), "IVFFlat Lists");
    }

    #[test]
    fn test_clean_title_keeps_first_line() {
        let raw = "\n\nCosine vs L2 Distance\nThis title captures the topic.";
        assert_eq!(clean_title(raw).unwrap(), "Cosine vs L2 Distance");
    }

    #[test]
    fn test_clean_title_rejects_empty() {
        assert!(matches!(clean_title("  \"\"  "), Err(ProviderError::EmptyTitle)));
        assert!(matches!(clean_title(""), Err(ProviderError::EmptyTitle)));
    }

    #[test]
    fn test_title_input_truncates_on_char_boundary() {
        let long = "é".repeat(TITLE_INPUT_CHARS + 50);
        let cut = title_input(&long);
        assert_eq!(cut.chars().count(), TITLE_INPUT_CHARS);

        let short = "short body";
        assert_eq!(title_input(short), short);
    }

    #[test]
    fn test_system_prompt_constraints() {
        assert!(TITLE_SYSTEM_PROMPT.contains("max 5 words"));
        assert!(TITLE_SYSTEM_PROMPT.contains("no quotes"));
    }
}
