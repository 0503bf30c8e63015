//! Extractor client — boundary to the extraction service
//!
//! Defines the client trait and wire types for invoking the external
//! extractor, which turns a subset of raw record fields into a typed
//! facet result with per-item confidence. Two implementations:
//! - [`HttpExtractor`]: posts to an OpenAI-compatible extraction
//!   endpoint (production)
//! - [`MockExtractor`]: returns scripted responses (testing)
//!
//! The extractor is stateless and safe for concurrent use by multiple
//! runs; the pipeline depends only on the [`Extractor`] trait.

mod http;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{AddressExtraction, DistrictExtraction, ElectionExtraction, ParsedName};

pub use http::HttpExtractor;

/// The four record facets the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Name,
    Address,
    District,
    Election,
}

impl Facet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Name => "name",
            Facet::Address => "address",
            Facet::District => "district",
            Facet::Election => "election",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request: one facet plus the raw fields classified as relevant to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetRequest {
    pub facet: Facet,
    /// Original field name → stringified raw value.
    pub fields: BTreeMap<String, String>,
}

impl FacetRequest {
    pub fn new(facet: Facet, fields: BTreeMap<String, String>) -> Self {
        Self { facet, fields }
    }
}

/// Typed facet result returned by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "facet", content = "result", rename_all = "snake_case")]
pub enum FacetResponse {
    Name(ParsedName),
    Address(AddressExtraction),
    District(DistrictExtraction),
    Election(ElectionExtraction),
}

impl FacetResponse {
    pub fn facet(&self) -> Facet {
        match self {
            FacetResponse::Name(_) => Facet::Name,
            FacetResponse::Address(_) => Facet::Address,
            FacetResponse::District(_) => Facet::District,
            FacetResponse::Election(_) => Facet::Election,
        }
    }
}

/// Errors from extractor invocations.
///
/// A malformed response (wrong facet, undecodable body) is handled by
/// callers exactly like a failed call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    #[error("extractor unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("extraction failed: {0}")]
    Failed(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Client trait for the extraction service.
///
/// Abstracts over transport (HTTP, mock) so stage handlers don't depend
/// on how the extractor is reached.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract one facet from the given field subset.
    async fn extract(&self, request: FacetRequest) -> Result<FacetResponse, ExtractError>;
}

/// Mock extractor for testing — replays scripted responses.
///
/// Each facet holds an ordered script of outcomes; the last outcome
/// repeats once the script is exhausted. Facets with no script fail,
/// and every request is recorded for assertions.
#[derive(Default)]
pub struct MockExtractor {
    scripts: Mutex<HashMap<Facet, Script>>,
    requests: Mutex<Vec<FacetRequest>>,
}

struct Script {
    outcomes: Vec<Result<FacetResponse, ExtractError>>,
    next: usize,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful response to a facet's script.
    pub fn with_response(self, response: FacetResponse) -> Self {
        let facet = response.facet();
        self.push(facet, Ok(response));
        self
    }

    /// Append a failure to a facet's script.
    pub fn with_failure(self, facet: Facet, error: ExtractError) -> Self {
        self.push(facet, Err(error));
        self
    }

    /// Append an arbitrary outcome under an explicit facet.
    ///
    /// Unlike [`with_response`](Self::with_response) the facet is not
    /// derived from the response, which lets tests script a
    /// wrong-facet reply.
    pub fn with_scripted(
        self,
        facet: Facet,
        outcome: Result<FacetResponse, ExtractError>,
    ) -> Self {
        self.push(facet, outcome);
        self
    }

    fn push(&self, facet: Facet, outcome: Result<FacetResponse, ExtractError>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .entry(facet)
            .or_insert_with(|| Script { outcomes: Vec::new(), next: 0 })
            .outcomes
            .push(outcome);
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<FacetRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls made for one facet.
    pub fn calls_for(&self, facet: Facet) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.facet == facet)
            .count()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, request: FacetRequest) -> Result<FacetResponse, ExtractError> {
        let facet = request.facet;
        self.requests.lock().unwrap().push(request);

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&facet) {
            Some(script) if !script.outcomes.is_empty() => {
                let index = script.next.min(script.outcomes.len() - 1);
                script.next += 1;
                script.outcomes[index].clone()
            }
            _ => Err(ExtractError::Failed(format!(
                "no mock response for facet '{facet}'"
            ))),
        }
    }
}
