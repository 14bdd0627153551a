use std::sync::Arc;

use ab_core::{Article, ArticleStorage, Error, GeneratedContent, InferenceModel, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::oracle::SimilarityOracle;
use crate::prompts::content_prompt;

lazy_static! {
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z]*\n?").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub min_words: u32,
    pub max_words: u32,
    pub tone: String,
}

/// Collapses runs of blank lines and strips code fences a model may wrap around its answer.
pub fn normalize_content(raw: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(raw, "");
    EXCESS_BLANK_LINES.replace_all(&unfenced, "\n\n").trim().to_string()
}

pub struct ContentGenerator {
    model: Arc<dyn InferenceModel>,
    oracle: Arc<dyn SimilarityOracle>,
    storage: Arc<dyn ArticleStorage>,
    max_retries: u32,
}

impl ContentGenerator {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        oracle: Arc<dyn SimilarityOracle>,
        storage: Arc<dyn ArticleStorage>,
        max_retries: u32,
    ) -> Self {
        Self {
            model,
            oracle,
            storage,
            max_retries,
        }
    }

    /// Generates article text, regenerating while the oracle reports a near
    /// duplicate. After `max_retries` regenerations the last draft is accepted
    /// with `similarity_warning` set. The oracle scores the raw backend text;
    /// callers apply [`normalize_content`] before persisting.
    pub async fn generate_content(&self, request: &ContentRequest) -> Result<GeneratedContent> {
        if request.title.trim().is_empty() {
            return Err(Error::Validation("Title is required for content generation".to_string()));
        }

        let mut avoid: Option<Article> = None;
        let mut retry = 0;
        loop {
            let prompt = content_prompt(request, avoid.as_ref());
            let content = self.model.generate(&prompt).await?;
            let verdict = self.oracle.check_content_similarity(&content).await;

            if !verdict.is_similar {
                return Ok(GeneratedContent {
                    content,
                    similarity_score: verdict.similarity_score,
                    similarity_warning: false,
                    similar_post_id: None,
                });
            }

            if retry >= self.max_retries {
                warn!(
                    "Accepting content for \"{}\" despite similarity {:.2} after {} retries",
                    request.title, verdict.similarity_score, retry
                );
                return Ok(GeneratedContent {
                    content,
                    similarity_score: verdict.similarity_score,
                    similarity_warning: true,
                    similar_post_id: verdict.similar_post_id,
                });
            }

            retry += 1;
            info!(
                "Content for \"{}\" is too similar (score {:.2}), regenerating ({}/{})",
                request.title, verdict.similarity_score, retry, self.max_retries
            );
            avoid = match verdict.similar_post_id {
                Some(id) => self.lookup_avoid(id).await,
                None => None,
            };
        }
    }

    async fn lookup_avoid(&self, id: Uuid) -> Option<Article> {
        match self.storage.get_article(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Could not load similar post {}: {}", id, e);
                None
            }
        }
    }
}
