//! Input checks every [`super::ConversationStore`] applies before issuing SQL.

use vectorlab_types::error::StoreError;

pub fn check_content(content: &str) -> Result<(), StoreError> {
    if content.trim().is_empty() {
        return Err(StoreError::EmptyContent);
    }
    Ok(())
}

/// Length must equal the table dimension and every component must be finite.
pub fn check_embedding(embedding: &[f32], dimension: usize) -> Result<(), StoreError> {
    if embedding.len() != dimension {
        return Err(StoreError::DimensionMismatch {
            expected: dimension,
            actual: embedding.len(),
        });
    }
    if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(StoreError::NonFiniteComponent { index });
    }
    Ok(())
}

pub fn check_limit(limit: usize) -> Result<(), StoreError> {
    if limit == 0 {
        return Err(StoreError::InvalidLimit);
    }
    Ok(())
}
