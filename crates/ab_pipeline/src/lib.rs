pub mod catalog;
pub mod config;
pub mod content;
pub mod job;
pub mod logging;
pub mod oracle;
pub mod prompts;
pub mod publisher;
pub mod scheduler;
pub mod topic;

#[cfg(test)]
mod test_support;

pub use catalog::CategoryCatalog;
pub use config::PipelineConfig;
pub use content::{normalize_content, ContentGenerator, ContentRequest};
pub use job::{BlogJob, GenerateOptions, PublishOutcome};
pub use logging::{init_logging, Logger};
pub use oracle::{EmbeddingOracle, LexicalOracle, SimilarityOracle};
pub use publisher::Publisher;
pub use scheduler::{
    start_scheduler, Acknowledgement, HumanDuration, ScheduleConfig, Scheduler, BLOG_GENERATION_JOB,
};
pub use topic::{parse_title, TopicGenerator, TopicRequest};

use std::sync::Arc;

use ab_core::{ArticleStorage, Error, InferenceModel, Result};

/// Builds the named oracle strategy: `lexical` (default) or `embedding`.
pub fn create_oracle(
    name: &str,
    storage: Arc<dyn ArticleStorage>,
    model: Arc<dyn InferenceModel>,
    config: &PipelineConfig,
) -> Result<Arc<dyn SimilarityOracle>> {
    let oracle: Arc<dyn SimilarityOracle> = match name {
        "lexical" => Arc::new(LexicalOracle::new(storage, config)),
        "embedding" => Arc::new(EmbeddingOracle::new(storage, model, config)),
        other => return Err(Error::Config(format!("Unknown similarity oracle: {}", other))),
    };
    tracing::info!("🔎 Similarity oracle initialized (using {})", oracle.name());
    Ok(oracle)
}

pub mod prelude {
    pub use super::{
        create_oracle, init_logging, BlogJob, GenerateOptions, PipelineConfig, Publisher, PublishOutcome,
        ScheduleConfig, Scheduler, SimilarityOracle,
    };
    pub use ab_core::{Error, Result};
}
