use std::time::Duration;

use crate::catalog::CategoryCatalog;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_words: u32,
    pub max_words: u32,
    pub tone: String,
    /// Upper bound on topic attempts before giving up with `Error::TopicExhausted`
    pub max_topic_attempts: u32,
    /// Similar-content regenerations before the draft is accepted with a warning
    pub max_content_retries: u32,
    /// Pause between batch items
    pub batch_delay: Duration,
    /// Lexical relevance above which content counts as a duplicate
    pub similarity_threshold: f64,
    /// Cosine similarity above which content counts as a duplicate
    pub embedding_threshold: f64,
    /// Content shorter than this (in characters) is never compared
    pub min_content_length: usize,
    pub sentence_samples: usize,
    pub paragraph_samples: usize,
    pub catalog: CategoryCatalog,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_words: 600,
            max_words: 2000,
            tone: "informative".to_string(),
            max_topic_attempts: 10,
            max_content_retries: 3,
            batch_delay: Duration::from_secs(5),
            similarity_threshold: 1.5,
            embedding_threshold: 0.92,
            min_content_length: 100,
            sentence_samples: 3,
            paragraph_samples: 2,
            catalog: CategoryCatalog::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn with_max_topic_attempts(mut self, attempts: u32) -> Self {
        self.max_topic_attempts = attempts.max(1);
        self
    }

    pub fn with_catalog(mut self, catalog: CategoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}
