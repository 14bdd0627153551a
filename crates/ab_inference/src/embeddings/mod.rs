use std::sync::Arc;

use ab_core::{normalize_vector, Article, Result};

use crate::models::InferenceModel;

/// Produces unit-length embeddings suitable for cosine comparison.
#[derive(Debug, Clone)]
pub struct EmbeddingGenerator {
    model: Arc<dyn InferenceModel>,
}

impl EmbeddingGenerator {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    pub async fn generate_article_embedding(&self, article: &Article) -> Result<Vec<f32>> {
        self.generate_text_embedding(&article.content).await
    }

    pub async fn generate_text_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.generate_embeddings(text).await?;
        Ok(normalize_vector(&embedding))
    }
}
