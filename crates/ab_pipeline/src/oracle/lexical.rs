use std::sync::Arc;

use ab_core::{ArticleStorage, SimilarityVerdict, TextQuery};
use async_trait::async_trait;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use tracing::{debug, error};

use super::{title_is_unique, SimilarityOracle};
use crate::config::PipelineConfig;

const MIN_SENTENCE_CHARS: usize = 30;
const MIN_PARAGRAPH_CHARS: usize = 100;

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Samples long sentences and paragraphs from `content` without replacement.
pub fn extract_key_phrases<R: Rng + ?Sized>(
    content: &str,
    rng: &mut R,
    sentences: usize,
    paragraphs: usize,
) -> Vec<String> {
    let long_sentences: Vec<&str> = content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect();
    let long_paragraphs: Vec<&str> = PARAGRAPH_BREAK
        .split(content)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    long_sentences
        .choose_multiple(rng, sentences)
        .chain(long_paragraphs.choose_multiple(rng, paragraphs))
        .map(|s| s.to_string())
        .collect()
}

/// Flags content whose sampled phrases find a strong relevance match in the store.
pub struct LexicalOracle {
    storage: Arc<dyn ArticleStorage>,
    threshold: f64,
    min_content_length: usize,
    sentence_samples: usize,
    paragraph_samples: usize,
}

impl LexicalOracle {
    pub fn new(storage: Arc<dyn ArticleStorage>, config: &PipelineConfig) -> Self {
        Self {
            storage,
            threshold: config.similarity_threshold,
            min_content_length: config.min_content_length,
            sentence_samples: config.sentence_samples,
            paragraph_samples: config.paragraph_samples,
        }
    }

    fn sample_query(&self, content: &str) -> TextQuery {
        let mut rng = rand::thread_rng();
        TextQuery::new(extract_key_phrases(
            content,
            &mut rng,
            self.sentence_samples,
            self.paragraph_samples,
        ))
    }
}

#[async_trait]
impl SimilarityOracle for LexicalOracle {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn check_title_uniqueness(&self, title: &str) -> bool {
        title_is_unique(&self.storage, title).await
    }

    async fn check_content_similarity(&self, content: &str) -> SimilarityVerdict {
        if content.chars().count() < self.min_content_length {
            return SimilarityVerdict::not_similar();
        }

        let query = self.sample_query(content);
        if query.is_empty() {
            return SimilarityVerdict::not_similar();
        }

        match self.storage.text_search(&query, 1).await {
            Ok(results) => match results.into_iter().next() {
                Some(top) if top.score > self.threshold => {
                    debug!("Content resembles \"{}\" (score {:.2})", top.article.title, top.score);
                    SimilarityVerdict::similar(top.score, top.article.id)
                }
                _ => SimilarityVerdict::not_similar(),
            },
            Err(e) => {
                error!("Error checking content similarity: {}", e);
                SimilarityVerdict::not_similar()
            }
        }
    }
}
