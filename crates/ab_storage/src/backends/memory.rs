use std::collections::BTreeSet;
use std::sync::Arc;

use ab_core::{
    cosine_similarity, normalize_title, Article, ArticleStatus, ArticleStorage, Error,
    NewArticle, Result, ScoredArticle, TextQuery,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::search::relevance;
use crate::{BackendConfig, StorageBackend};

#[derive(Debug, Clone)]
struct StoredArticle {
    article: Article,
    embedding: Option<Vec<f32>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<StoredArticle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, id: Uuid) -> Option<&StoredArticle> {
        self.articles.iter().find(|s| s.article.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut StoredArticle> {
        self.articles
            .iter_mut()
            .find(|s| s.article.id == id)
            .ok_or_else(|| Error::NotFound(format!("Blog post with ID {}", id)))
    }

    pub fn insert(&mut self, new: NewArticle) -> Result<Article> {
        let article = Article::from_new(new, Utc::now());
        let title = normalize_title(&article.title);
        if self.articles.iter().any(|s| normalize_title(&s.article.title) == title) {
            return Err(Error::Duplicate(format!("title already exists: {}", article.title)));
        }
        if self.articles.iter().any(|s| s.article.slug == article.slug) {
            return Err(Error::Duplicate(format!("slug already exists: {}", article.slug)));
        }
        self.articles.push(StoredArticle {
            article: article.clone(),
            embedding: None,
        });
        Ok(article)
    }

    pub fn newest_first(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles.iter().map(|s| s.article.clone()).collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        articles
    }

    pub fn text_search(&self, query: &TextQuery, limit: usize) -> Vec<ScoredArticle> {
        let mut scored: Vec<ScoredArticle> = self
            .articles
            .iter()
            .map(|s| ScoredArticle {
                score: relevance(query, &s.article.title, &s.article.content),
                article: s.article.clone(),
            })
            .filter(|s| s.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    pub fn nearest(&self, embedding: &[f32], limit: usize) -> Vec<ScoredArticle> {
        let mut scored: Vec<ScoredArticle> = self
            .articles
            .iter()
            .filter_map(|s| {
                let stored = s.embedding.as_ref()?;
                Some(ScoredArticle {
                    score: cosine_similarity(embedding, stored) as f64,
                    article: s.article.clone(),
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }
}

/// Process-local store, the default backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn kind() -> &'static str {
        "memory"
    }

    async fn connect(_config: &BackendConfig) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        self.store.write().await.insert(article)
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.store.read().await.find(id).map(|s| s.article.clone()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .find(|s| s.article.slug == slug)
            .map(|s| s.article.clone()))
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        Ok(self.store.read().await.newest_first())
    }

    async fn normalized_titles(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().map(|s| normalize_title(&s.article.title)).collect())
    }

    async fn find_title_containing(&self, needle: &str) -> Result<Option<Article>> {
        let needle = needle.to_lowercase();
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .find(|s| s.article.title.to_lowercase().contains(&needle))
            .map(|s| s.article.clone()))
    }

    async fn find_slug_containing(&self, needle: &str) -> Result<Option<Article>> {
        let needle = needle.to_lowercase();
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .find(|s| s.article.slug.to_lowercase().contains(&needle))
            .map(|s| s.article.clone()))
    }

    async fn text_search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredArticle>> {
        Ok(self.store.read().await.text_search(query, limit))
    }

    async fn nearest_by_embedding(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredArticle>> {
        Ok(self.store.read().await.nearest(embedding, limit))
    }

    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<()> {
        let mut store = self.store.write().await;
        store.find_mut(id)?.embedding = Some(embedding.to_vec());
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ArticleStatus) -> Result<Article> {
        let mut store = self.store.write().await;
        let stored = store.find_mut(id)?;
        stored.article.set_status(status);
        Ok(stored.article.clone())
    }

    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<Article> {
        let mut store = self.store.write().await;
        if store.articles.iter().any(|s| s.article.slug == slug && s.article.id != id) {
            return Err(Error::Duplicate(format!("slug already exists: {}", slug)));
        }
        let stored = store.find_mut(id)?;
        stored.article.set_slug(slug);
        Ok(stored.article.clone())
    }

    async fn publish_all_drafts(&self) -> Result<u64> {
        let mut store = self.store.write().await;
        let mut published = 0;
        for stored in store.articles.iter_mut() {
            if stored.article.status == ArticleStatus::Draft {
                stored.article.set_status(ArticleStatus::Published);
                published += 1;
            }
        }
        Ok(published)
    }

    async fn count_by_status(&self) -> Result<Vec<(ArticleStatus, u64)>> {
        let store = self.store.read().await;
        Ok(ArticleStatus::ALL
            .iter()
            .map(|status| {
                let count = store.articles.iter().filter(|s| s.article.status == *status).count();
                (*status, count as u64)
            })
            .collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        let distinct: BTreeSet<String> = store.articles.iter().map(|s| s.article.category.clone()).collect();
        Ok(distinct.into_iter().collect())
    }

    async fn subcategories(&self, category: &str) -> Result<Vec<String>> {
        let store = self.store.read().await;
        let distinct: BTreeSet<String> = store
            .articles
            .iter()
            .filter(|s| s.article.category == category)
            .map(|s| s.article.subcategory.clone())
            .collect();
        Ok(distinct.into_iter().collect())
    }
}
