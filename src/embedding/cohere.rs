//! Cohere embedding provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::{BiblioError, Result};

const COHERE_EMBED_URL: &str = "https://api.cohere.ai/v1/embed";
const DEFAULT_MODEL: &str = "embed-english-v3.0";

/// Embedder backed by the Cohere embed API.
pub struct CohereEmbedder {
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl CohereEmbedder {
    /// Create a provider. Falls back to the `COHERE_API_KEY` environment
    /// variable when no key is given; a missing key is reported as a
    /// configuration error at embed time, not here.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.or_else(|| std::env::var("COHERE_API_KEY").ok()),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: Vec<&'a str>,
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for CohereEmbedder {
    async fn embed(&self, text: &str, _dim_hint: Option<usize>) -> Result<Vec<f32>> {
        let Some(api_key) = &self.api_key else {
            return Err(BiblioError::invalid_config("COHERE_API_KEY not configured"));
        };

        let request = EmbedRequest {
            texts: vec![text],
            model: &self.model,
            input_type: "search_document",
        };

        let response = self
            .client
            .post(COHERE_EMBED_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| BiblioError::embedding(format!("cohere request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BiblioError::embedding(format!(
                "cohere embed returned status {status}"
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|err| BiblioError::embedding(format!("cohere response invalid: {err}")))?;

        body.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| BiblioError::embedding("cohere returned no embeddings"))
    }

    fn name(&self) -> &str {
        "cohere"
    }
}
