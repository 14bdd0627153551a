use std::sync::Arc;

use ab_core::{Error, Result};
use tracing::info;

pub use ab_core::InferenceModel;

pub mod deepseek;
pub mod dummy;
pub mod ollama;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;
pub use ollama::OllamaModel;

/// Connection details shared by every model implementation.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    pub model_url: Option<String>,
    pub api_key: Option<String>,
}

pub trait ModelConfig: Sized {
    fn from_inference_config(config: &InferenceConfig) -> Result<Self>;
}

/// Builds the named model. Available models: ollama (default), deepseek, dummy.
pub fn create_model(name: &str, config: &InferenceConfig) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match name {
        "ollama" => Arc::new(OllamaModel::new(ollama::OllamaConfig::from_inference_config(config)?)),
        "deepseek" => Arc::new(DeepSeekModel::new(config.api_key.clone(), config.model_url.clone())?),
        "dummy" => Arc::new(DummyModel::new()),
        other => return Err(Error::Config(format!("Unknown model: {}", other))),
    };
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}
