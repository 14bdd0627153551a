//! Duplicate detection for titles and article bodies.
//!
//! Title checks are shared by every strategy and fail closed: a lookup error
//! counts as "not unique". Content checks fail open: a search error counts as
//! "not similar" so a flaky index never blocks generation.

use std::sync::Arc;

use ab_core::{derive_slug, normalize_title, Article, ArticleStorage, Result, SimilarityVerdict};
use async_trait::async_trait;
use tracing::{debug, error};

pub mod embedding;
pub mod lexical;

pub use embedding::EmbeddingOracle;
pub use lexical::LexicalOracle;

#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    fn name(&self) -> &str;

    /// `true` only when the title matches no stored title exactly, by substring, or by slug.
    async fn check_title_uniqueness(&self, title: &str) -> bool;

    async fn check_content_similarity(&self, content: &str) -> SimilarityVerdict;

    /// Called after an article is persisted so the strategy can index it.
    async fn record(&self, _article: &Article) -> Result<()> {
        Ok(())
    }
}

/// Runs the three title checks in order, stopping at the first match.
pub async fn title_is_unique(storage: &Arc<dyn ArticleStorage>, title: &str) -> bool {
    match find_title_collision(storage, title).await {
        Ok(None) => true,
        Ok(Some(reason)) => {
            debug!("Title rejected ({}): {}", reason, title);
            false
        }
        Err(e) => {
            error!("Error checking title uniqueness: {}", e);
            false
        }
    }
}

async fn find_title_collision(storage: &Arc<dyn ArticleStorage>, title: &str) -> Result<Option<&'static str>> {
    let normalized = normalize_title(title);
    if normalized.is_empty() {
        return Ok(Some("empty title"));
    }

    if storage.normalized_titles().await?.iter().any(|t| *t == normalized) {
        return Ok(Some("exact match"));
    }
    if storage.find_title_containing(&normalized).await?.is_some() {
        return Ok(Some("similar title"));
    }
    if storage.find_slug_containing(&derive_slug(&normalized)).await?.is_some() {
        return Ok(Some("slug collision"));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_article, ProbeStorage};

    async fn seeded() -> (Arc<ProbeStorage>, Arc<dyn ArticleStorage>) {
        let probe = Arc::new(ProbeStorage::new());
        probe
            .insert_article(new_article("The Future of Quantum Computing in 2025", "body"))
            .await
            .unwrap();
        let storage: Arc<dyn ArticleStorage> = probe.clone();
        (probe, storage)
    }

    #[tokio::test]
    async fn test_exact_match_ignores_case_and_padding() {
        let (_, storage) = seeded().await;
        assert!(!title_is_unique(&storage, "  the future of QUANTUM computing in 2025 ").await);
    }

    #[tokio::test]
    async fn test_substring_match_is_rejected() {
        let (_, storage) = seeded().await;
        assert!(!title_is_unique(&storage, "Quantum Computing").await);
    }

    #[tokio::test]
    async fn test_slug_collision_is_rejected() {
        let (_, storage) = seeded().await;
        // Punctuation defeats the substring check but not the slug check.
        assert!(!title_is_unique(&storage, "Future: of Quantum!").await);
    }

    #[tokio::test]
    async fn test_unrelated_title_is_unique() {
        let (_, storage) = seeded().await;
        assert!(title_is_unique(&storage, "Sourdough Starters for Beginners").await);
        assert!(!title_is_unique(&storage, "   ").await);
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let (probe, storage) = seeded().await;
        probe.set_failing(true);
        assert!(!title_is_unique(&storage, "Sourdough Starters for Beginners").await);
    }
}
