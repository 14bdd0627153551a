use std::fmt;
use std::sync::Arc;

use ab_core::{Article, ArticleStorage, InferenceModel, Result, SimilarityVerdict};
use ab_inference::EmbeddingGenerator;
use async_trait::async_trait;
use tracing::{debug, error};

use super::{title_is_unique, SimilarityOracle};
use crate::config::PipelineConfig;

/// Vector strategy: content is a duplicate when its nearest stored neighbour is
/// closer than the configured cosine threshold. Articles are indexed through `record`.
pub struct EmbeddingOracle {
    storage: Arc<dyn ArticleStorage>,
    embeddings: EmbeddingGenerator,
    threshold: f64,
    min_content_length: usize,
}

impl fmt::Debug for EmbeddingOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingOracle")
            .field("storage", &"<dyn ArticleStorage>")
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl EmbeddingOracle {
    pub fn new(storage: Arc<dyn ArticleStorage>, model: Arc<dyn InferenceModel>, config: &PipelineConfig) -> Self {
        Self {
            storage,
            embeddings: EmbeddingGenerator::new(model),
            threshold: config.embedding_threshold,
            min_content_length: config.min_content_length,
        }
    }

    async fn nearest(&self, content: &str) -> Result<SimilarityVerdict> {
        let embedding = self.embeddings.generate_text_embedding(content).await?;
        let nearest = self.storage.nearest_by_embedding(&embedding, 1).await?;
        Ok(match nearest.into_iter().next() {
            Some(top) if top.score > self.threshold => {
                debug!("Content is {:.3} cosine-close to \"{}\"", top.score, top.article.title);
                SimilarityVerdict::similar(top.score, top.article.id)
            }
            _ => SimilarityVerdict::not_similar(),
        })
    }
}

#[async_trait]
impl SimilarityOracle for EmbeddingOracle {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn check_title_uniqueness(&self, title: &str) -> bool {
        title_is_unique(&self.storage, title).await
    }

    async fn check_content_similarity(&self, content: &str) -> SimilarityVerdict {
        if content.chars().count() < self.min_content_length {
            return SimilarityVerdict::not_similar();
        }
        self.nearest(content).await.unwrap_or_else(|e| {
            error!("Error checking content similarity: {}", e);
            SimilarityVerdict::not_similar()
        })
    }

    async fn record(&self, article: &Article) -> Result<()> {
        let embedding = self.embeddings.generate_article_embedding(article).await?;
        self.storage.set_embedding(article.id, &embedding).await
    }
}
