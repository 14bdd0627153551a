use std::fmt;

use ab_core::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{InferenceConfig, InferenceModel, ModelConfig};

const DEFAULT_URL: &str = "http://localhost:11434/gemma3:1b";
const DEFAULT_MODEL: &str = "gemma3:1b";
const EMBED_MODEL: &str = "nomic-embed-text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model_name: String,
    pub embed_model: String,
}

impl ModelConfig for OllamaConfig {
    /// Reads `scheme://host:port/model`, the model name defaulting when the path is empty.
    fn from_inference_config(config: &InferenceConfig) -> Result<Self> {
        let raw = config.model_url.as_deref().unwrap_or(DEFAULT_URL);
        let parsed = Url::parse(raw).map_err(|e| Error::Config(format!("Invalid model URL {}: {}", raw, e)))?;

        let model_name = parsed.path().trim_start_matches('/').to_string();
        Ok(Self {
            base_url: format!(
                "{}://{}:{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("localhost"),
                parsed.port().unwrap_or(11434)
            ),
            model_name: if model_name.is_empty() { DEFAULT_MODEL.to_string() } else { model_name },
            embed_model: EMBED_MODEL.to_string(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaModel {
    client: Client,
    config: OllamaConfig,
}

impl OllamaModel {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait::async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(&GenerateRequest {
                model: &self.config.model_name,
                prompt,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        Ok(response.response.trim().to_string())
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/api/embed", self.config.base_url))
            .json(&EmbedRequest {
                model: &self.config.embed_model,
                input: text,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<EmbedResponse>()
            .await?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("Ollama returned no embeddings".to_string()))
    }
}
