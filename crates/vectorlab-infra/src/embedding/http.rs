//! Shared request plumbing for the HTTP providers.

use std::time::Duration;

use serde::de::DeserializeOwned;

use vectorlab_types::error::{ConfigError, ProviderError};

pub(crate) fn client(timeout_secs: u64) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// `base` without a trailing slash, joined with `path`.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Send `request` and decode a JSON body, mapping every failure to
/// a [`ProviderError`] that names `provider`.
pub(crate) async fn send_json<R: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<R, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Request {
        provider: provider.to_string(),
        message: if e.is_timeout() {
            format!("request timed out: {e}")
        } else {
            e.to_string()
        },
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationFailed(provider.to_string()),
            code => ProviderError::Status {
                provider: provider.to_string(),
                status: code,
                body,
            },
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ProviderError::Deserialization {
            provider: provider.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:11434/", "/api/embed"),
            "http://localhost:11434/api/embed"
        );
        assert_eq!(
            endpoint("https://openrouter.ai/api/v1", "/embeddings"),
            "https://openrouter.ai/api/v1/embeddings"
        );
    }
}
