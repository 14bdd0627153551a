use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// A generative text backend.
#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Produce text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate embeddings for a piece of text
    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>>;
}
