use std::sync::Arc;

use ab_core::{Error, InferenceModel, Result, Topic};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::CategoryCatalog;
use crate::oracle::SimilarityOracle;
use crate::prompts::{topic_instruction, topic_prompt};

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*?\}").unwrap();
    static ref BOLD_LINE: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref TITLE_LINE: Regex = Regex::new(r"(?im)^\s*(?:#+\s*)?title\s*:\s*(.+)$").unwrap();
}

/// Constraints a caller may place on the generated topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRequest {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
struct TitlePayload {
    title: String,
}

/// Pulls a title out of a backend response: a JSON object first, then a
/// `**bold**` line, then a `Title:` line.
pub fn parse_title(response: &str) -> Option<String> {
    let from_json = JSON_OBJECT
        .find_iter(response)
        .find_map(|m| serde_json::from_str::<TitlePayload>(m.as_str()).ok())
        .map(|p| p.title);

    from_json
        .or_else(|| BOLD_LINE.captures(response).map(|c| c[1].to_string()))
        .or_else(|| TITLE_LINE.captures(response).map(|c| c[1].to_string()))
        .map(|t| t.trim().trim_matches(|c| c == '"' || c == '*').trim().to_string())
        .filter(|t| !t.is_empty())
}

pub struct TopicGenerator {
    model: Arc<dyn InferenceModel>,
    oracle: Arc<dyn SimilarityOracle>,
    catalog: CategoryCatalog,
    max_attempts: u32,
}

impl TopicGenerator {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        oracle: Arc<dyn SimilarityOracle>,
        catalog: CategoryCatalog,
        max_attempts: u32,
    ) -> Self {
        Self {
            model,
            oracle,
            catalog,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Asks the backend for titles until one passes the uniqueness check.
    ///
    /// Backend errors and unparseable responses end the search immediately;
    /// duplicate titles are retried with the rejected title as an avoid hint,
    /// up to `max_attempts` before `Error::TopicExhausted`.
    pub async fn generate_topic(&self, request: &TopicRequest) -> Result<Topic> {
        let mut avoid: Option<String> = None;

        for retry in 0..self.max_attempts {
            let instruction = topic_instruction(request, avoid.as_deref(), retry);
            let (category, subcategory) = self.catalog.pick(
                &mut rand::thread_rng(),
                request.category.as_deref(),
                request.subcategory.as_deref(),
            );
            let prompt = topic_prompt(&instruction, &category, &subcategory);

            let response = self.model.generate(&prompt).await?;
            let title = parse_title(&response).ok_or_else(|| {
                Error::Generation(format!("Could not extract a title from response: {}", response.trim()))
            })?;
            debug!("Candidate title (attempt {}): {}", retry + 1, title);

            if self.oracle.check_title_uniqueness(&title).await {
                info!("✨ Accepted topic \"{}\" [{} / {}]", title, category, subcategory);
                return Ok(Topic {
                    title,
                    category,
                    subcategory,
                });
            }

            warn!("Title \"{}\" is not unique, retrying", title);
            avoid = Some(title);
        }

        Err(Error::TopicExhausted {
            attempts: self.max_attempts,
        })
    }
}
