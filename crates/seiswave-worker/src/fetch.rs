//! HTTP-backed filter-definition fetches.
//!
//! The only network dependency of the pipeline: given channel names and
//! a time range, fetch the filter definitions the backend prescribes,
//! keyed by usage. A missing base URL is a configuration error detected
//! before any network call is attempted.

use std::collections::HashMap;

use log::debug;
use seiswave_core::TimeRange;
use seiswave_filter::FilterDefinition;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancel::CancellationToken;

/// Errors from fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Cannot make a request on the worker without a baseUrl in the config")]
    MissingBaseUrl,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request cancelled")]
    Cancelled,
}

/// Request body for filter-definition lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinitionsRequest {
    pub channel_names: Vec<String>,
    pub time_range: TimeRange,
}

/// Filter definitions keyed by usage name.
pub type FilterDefinitionsByUsage = HashMap<String, Vec<FilterDefinition>>;

/// HTTP client for the pipeline's fetch operations.
#[derive(Debug, Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    client: reqwest::Client,
}

impl FetchClient {
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Fetch the filter definitions for a set of channels over a time
    /// range.
    ///
    /// Fails immediately with [`FetchError::MissingBaseUrl`] when no base
    /// URL is configured; resolves as [`FetchError::Cancelled`] when the
    /// token fires first.
    pub async fn fetch_filter_definitions(
        &self,
        request: &FilterDefinitionsRequest,
        token: &CancellationToken,
    ) -> Result<FilterDefinitionsByUsage, FetchError> {
        let base_url = self.base_url.as_deref().ok_or(FetchError::MissingBaseUrl)?;
        let url = format!("{base_url}/filter-definitions/query");
        debug!(
            "fetching filter definitions for {} channels",
            request.channel_names.len()
        );

        tokio::select! {
            () = token.cancelled() => Err(FetchError::Cancelled),
            response = async {
                self.client
                    .post(&url)
                    .json(request)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<FilterDefinitionsByUsage>()
                    .await
            } => Ok(response?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FilterDefinitionsRequest {
        FilterDefinitionsRequest {
            channel_names: vec!["ASAR.AS01.SHZ".to_string()],
            time_range: TimeRange::new(0.0, 100.0),
        }
    }

    #[tokio::test]
    async fn test_missing_base_url_fails_fast() {
        let client = FetchClient::new(None);
        let err = client
            .fetch_filter_definitions(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingBaseUrl));
        assert_eq!(
            err.to_string(),
            "Cannot make a request on the worker without a baseUrl in the config"
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_send_resolves_cancelled() {
        // An unroutable base URL; cancellation must win the select
        // without the request ever mattering.
        let client = FetchClient::new(Some("http://192.0.2.1:9".to_string()));
        let token = CancellationToken::new();
        token.cancel();
        let err = client
            .fetch_filter_definitions(&request(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
    }

    #[test]
    fn test_request_wire_form() {
        let json = serde_json::to_string(&request()).unwrap();
        assert!(json.contains(r#""channelNames""#));
        assert!(json.contains(r#""timeRange""#));
    }
}
