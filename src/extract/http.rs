//! HTTP extractor client
//!
//! Posts the facet request as JSON to `{base_url}/extract` and decodes
//! the typed facet response. The endpoint is an OpenAI-compatible
//! service front; transport and decode failures map onto
//! [`ExtractError`] so the pipeline's retry handling applies uniformly.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ExtractError, Extractor, FacetRequest, FacetResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extractor implementation backed by an HTTP extraction service.
pub struct HttpExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExtractor {
    /// Create a client for the service at `base_url` with the default
    /// request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExtractError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/extract", self.base_url)
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, request: FacetRequest) -> Result<FacetResponse, ExtractError> {
        let facet = request.facet;
        debug!(%facet, fields = request.fields.len(), "posting extraction request");

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Unavailable(format!("extraction request timed out: {e}"))
                } else {
                    ExtractError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Failed(format!(
                "extractor returned HTTP {status}"
            )));
        }

        let decoded: FacetResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Malformed(e.to_string()))?;

        // A response for the wrong facet is as unusable as no response.
        if decoded.facet() != facet {
            return Err(ExtractError::Malformed(format!(
                "requested {facet} but extractor answered for {}",
                decoded.facet()
            )));
        }

        Ok(decoded)
    }
}
