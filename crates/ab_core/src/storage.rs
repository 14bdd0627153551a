use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{Article, ArticleStatus, NewArticle, ScoredArticle, TextQuery};
use crate::Result;

/// Persistent article store. Implementations must reject duplicate titles and slugs on insert.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Insert a new article, failing with `Error::Duplicate` on a title or slug collision
    async fn insert_article(&self, article: NewArticle) -> Result<Article>;

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// All articles, newest first
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Every stored title, lowercased and trimmed
    async fn normalized_titles(&self) -> Result<Vec<String>>;

    /// First article whose title contains `needle`, ignoring case
    async fn find_title_containing(&self, needle: &str) -> Result<Option<Article>>;

    /// First article whose slug contains `needle`, ignoring case
    async fn find_slug_containing(&self, needle: &str) -> Result<Option<Article>>;

    /// Relevance-ranked search, best match first
    async fn text_search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredArticle>>;

    /// Nearest neighbours by cosine similarity over stored embeddings
    async fn nearest_by_embedding(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredArticle>>;

    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<()>;

    async fn update_status(&self, id: Uuid, status: ArticleStatus) -> Result<Article>;

    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<Article>;

    /// Moves every draft to published and returns how many changed
    async fn publish_all_drafts(&self) -> Result<u64>;

    /// Number of articles per status, one entry per status in `ArticleStatus::ALL` order
    async fn count_by_status(&self) -> Result<Vec<(ArticleStatus, u64)>>;

    /// Distinct categories, sorted
    async fn categories(&self) -> Result<Vec<String>>;

    /// Distinct subcategories within a category, sorted
    async fn subcategories(&self, category: &str) -> Result<Vec<String>>;
}
