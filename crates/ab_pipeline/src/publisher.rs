use std::collections::BTreeMap;
use std::sync::Arc;

use ab_core::{derive_slug, Article, ArticleStatus, ArticleStorage, Error, NewArticle, Result, SlugEntry};
use tracing::{info, warn};
use uuid::Uuid;

/// Validated persistence and record maintenance on top of an [`ArticleStorage`].
#[derive(Clone)]
pub struct Publisher {
    storage: Arc<dyn ArticleStorage>,
}

impl Publisher {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    /// Persists a post after checking its required fields. A blank slug is derived from the title.
    pub async fn save_post(&self, mut post: NewArticle) -> Result<Article> {
        if post.title.trim().is_empty() || post.content.trim().is_empty() {
            return Err(Error::Validation("Title and content are required".to_string()));
        }
        if post.category.trim().is_empty() || post.subcategory.trim().is_empty() {
            return Err(Error::Validation("Category and subcategory are required".to_string()));
        }
        if post.slug.trim().is_empty() {
            post.slug = derive_slug(&post.title);
        }
        if post.slug.is_empty() {
            return Err(Error::Validation("Slug could not be derived from the title".to_string()));
        }

        let saved = self.storage.insert_article(post).await?;
        info!("💾 Saved post {} ({}, {})", saved.id, saved.slug, saved.status);
        Ok(saved)
    }

    pub async fn get(&self, id: Uuid) -> Result<Article> {
        self.storage
            .get_article(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Blog post with ID {}", id)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Article> {
        self.storage
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Blog post with slug {}", slug)))
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Article> {
        let status: ArticleStatus = status.parse()?;
        self.storage.update_status(id, status).await
    }

    pub async fn update_slug(&self, id: Uuid, slug: &str) -> Result<Article> {
        let slug = derive_slug(slug);
        if slug.is_empty() {
            return Err(Error::Validation("Slug is required".to_string()));
        }
        self.storage.update_slug(id, &slug).await
    }

    /// Re-derives every slug from its title. Articles whose slug already matches are skipped;
    /// a collision leaves that article unchanged and is logged.
    pub async fn backfill_slugs(&self) -> Result<Vec<Article>> {
        let mut updated = Vec::new();
        for article in self.storage.list_articles().await? {
            let slug = derive_slug(&article.title);
            if slug.is_empty() || slug == article.slug {
                continue;
            }
            match self.storage.update_slug(article.id, &slug).await {
                Ok(saved) => updated.push(saved),
                Err(Error::Duplicate(reason)) => warn!("Skipping slug for {}: {}", article.id, reason),
                Err(e) => return Err(e),
            }
        }
        info!("Backfilled {} slugs", updated.len());
        Ok(updated)
    }

    pub async fn list_slugs(&self) -> Result<Vec<SlugEntry>> {
        Ok(self
            .storage
            .list_articles()
            .await?
            .into_iter()
            .map(|a| SlugEntry {
                title: a.title,
                slug: a.slug,
            })
            .collect())
    }

    /// Distinct categories with their distinct subcategories.
    pub async fn categories(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut categories = BTreeMap::new();
        for category in self.storage.categories().await? {
            let subcategories = self.storage.subcategories(&category).await?;
            categories.insert(category, subcategories);
        }
        Ok(categories)
    }

    pub async fn status_counts(&self) -> Result<Vec<(ArticleStatus, u64)>> {
        self.storage.count_by_status().await
    }

    pub async fn publish_all_drafts(&self) -> Result<u64> {
        let published = self.storage.publish_all_drafts().await?;
        info!("📢 Published {} drafts", published);
        Ok(published)
    }
}
