use std::sync::Arc;

use ab_core::{derive_slug, Article, ArticleStatus, ArticleStorage, Error, InferenceModel, NewArticle, Result};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::content::{normalize_content, ContentGenerator, ContentRequest};
use crate::logging::Logger;
use crate::oracle::SimilarityOracle;
use crate::publisher::Publisher;
use crate::topic::{TopicGenerator, TopicRequest};

/// Caller options for one generation run. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub keywords: Vec<String>,
    pub min_words: Option<u32>,
    pub max_words: Option<u32>,
    pub tone: Option<String>,
    pub auto_publish: bool,
}

/// Result envelope of a pipeline run; failures are reported here instead of as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl PublishOutcome {
    pub fn published(post: Article) -> Self {
        let message = match (post.status, post.similarity_score > 0.0) {
            (ArticleStatus::Published, _) => "Blog post generated and published successfully",
            (_, true) => "Blog post generated as draft (similar content detected)",
            _ => "Blog post generated as draft",
        };
        Self {
            success: true,
            post: Some(post),
            error: None,
            message: message.to_string(),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            success: false,
            post: None,
            error: Some(error.to_string()),
            message: "Failed to generate blog post".to_string(),
        }
    }
}

/// Topic, then content, then persistence.
pub struct BlogJob {
    topics: TopicGenerator,
    content: ContentGenerator,
    publisher: Publisher,
    oracle: Arc<dyn SimilarityOracle>,
    config: PipelineConfig,
}

impl BlogJob {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        storage: Arc<dyn ArticleStorage>,
        oracle: Arc<dyn SimilarityOracle>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            topics: TopicGenerator::new(
                model.clone(),
                oracle.clone(),
                config.catalog.clone(),
                config.max_topic_attempts,
            ),
            content: ContentGenerator::new(model, oracle.clone(), storage.clone(), config.max_content_retries),
            publisher: Publisher::new(storage),
            oracle,
            config,
        }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the whole pipeline once. Never fails: errors become a failure envelope.
    pub async fn generate_and_publish(&self, options: &GenerateOptions) -> PublishOutcome {
        self.generate_and_publish_with(options, &Logger::new()).await
    }

    /// Same as [`BlogJob::generate_and_publish`], logging through `log`.
    pub async fn generate_and_publish_with(&self, options: &GenerateOptions, log: &Logger) -> PublishOutcome {
        match self.run(options, log).await {
            Ok(post) => PublishOutcome::published(post),
            Err(e) => {
                log.error(&format!("Failed to generate blog post: {}", e));
                PublishOutcome::failed(&e)
            }
        }
    }

    async fn run(&self, options: &GenerateOptions, log: &Logger) -> Result<Article> {
        log.info("📝 Generating topic");
        let topic = self
            .topics
            .generate_topic(&TopicRequest {
                category: options.category.clone(),
                subcategory: options.subcategory.clone(),
                keywords: options.keywords.clone(),
            })
            .await?;
        if topic.title.trim().is_empty() {
            return Err(Error::Generation("Failed to generate topic".to_string()));
        }

        log.info(&format!("🖋️ Generating content for \"{}\"", topic.title));
        let request = ContentRequest {
            title: topic.title.clone(),
            category: topic.category.clone(),
            subcategory: topic.subcategory.clone(),
            min_words: options.min_words.unwrap_or(self.config.min_words),
            max_words: options.max_words.unwrap_or(self.config.max_words),
            tone: options.tone.clone().unwrap_or_else(|| self.config.tone.clone()),
        };
        let generated = self.content.generate_content(&request).await?;
        if generated.similarity_warning {
            log.warn(&format!(
                "Saving \"{}\" despite similarity {:.2} to {:?}",
                topic.title, generated.similarity_score, generated.similar_post_id
            ));
        }

        let post = self
            .publisher
            .save_post(NewArticle {
                slug: derive_slug(&topic.title),
                title: topic.title,
                content: normalize_content(&generated.content),
                category: topic.category,
                subcategory: topic.subcategory,
                status: if options.auto_publish {
                    ArticleStatus::Published
                } else {
                    ArticleStatus::Draft
                },
                similarity_score: generated.similarity_score,
            })
            .await?;

        if let Err(e) = self.oracle.record(&post).await {
            log.warn(&format!("Could not index post {} for similarity: {}", post.id, e));
        }
        log.info(&format!("✅ Post \"{}\" saved as {}", post.title, post.status));
        Ok(post)
    }

    /// Runs `count` generations one after another, pausing between them.
    /// A failed item is recorded in its slot and the batch continues.
    pub async fn generate_batch(&self, count: usize, options: &GenerateOptions) -> Vec<PublishOutcome> {
        let mut outcomes = Vec::with_capacity(count);
        for i in 0..count {
            let log = Logger::new().with_prefix(format!("[batch {}/{}]", i + 1, count));
            outcomes.push(self.generate_and_publish_with(options, &log).await);

            if i + 1 < count && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Logger::new().info(&format!("Batch finished: {}/{} posts generated", succeeded, count));
        outcomes
    }
}
