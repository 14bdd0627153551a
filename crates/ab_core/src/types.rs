use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::word_count;
use crate::Error;

/// A candidate post subject, produced per generation attempt and never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub category: String,
    pub subcategory: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 3] = [ArticleStatus::Draft, ArticleStatus::Published, ArticleStatus::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            "archived" => Ok(ArticleStatus::Archived),
            other => Err(Error::Validation(format!("Invalid status value: {}", other))),
        }
    }
}

/// A persisted blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub subcategory: String,
    pub status: ArticleStatus,
    pub word_count: usize,
    pub similarity_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Materializes a new record, trimming text fields the way the store expects them.
    pub fn from_new(new: NewArticle, now: DateTime<Utc>) -> Self {
        let content = new.content.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            title: new.title.trim().to_string(),
            slug: new.slug.trim().to_string(),
            word_count: word_count(&content),
            content,
            category: new.category.trim().to_string(),
            subcategory: new.subcategory.trim().to_string(),
            status: new.status,
            similarity_score: new.similarity_score.max(0.0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = content.trim().to_string();
        self.word_count = word_count(&self.content);
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: ArticleStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slug.to_string();
        self.updated_at = Utc::now();
    }
}

/// Insert payload for the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub subcategory: String,
    pub status: ArticleStatus,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityVerdict {
    pub is_similar: bool,
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar_post_id: Option<Uuid>,
}

impl SimilarityVerdict {
    pub fn not_similar() -> Self {
        Self::default()
    }

    pub fn similar(score: f64, post_id: Uuid) -> Self {
        Self {
            is_similar: true,
            similarity_score: score,
            similar_post_id: Some(post_id),
        }
    }
}

/// Output of the content generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub content: String,
    pub similarity_score: f64,
    pub similarity_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar_post_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredArticle {
    pub article: Article,
    pub score: f64,
}

/// A relevance search made of phrases sampled from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    pub phrases: Vec<String>,
}

impl TextQuery {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugEntry {
    pub title: String,
    pub slug: String,
}
