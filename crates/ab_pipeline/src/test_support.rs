//! Scripted collaborators shared by the pipeline tests.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use ab_core::{
    Article, ArticleStatus, ArticleStorage, Error, InferenceModel, NewArticle, Result,
    ScoredArticle, TextQuery,
};
use ab_storage::InMemoryStorage;
use async_trait::async_trait;
use uuid::Uuid;

/// Replays queued responses in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel").finish()
    }
}

impl ScriptedModel {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn ok<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|r| Ok(r.into())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Inference("script exhausted".to_string())))
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            embedding[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(embedding)
    }
}

/// An in-memory store that counts searches and can be switched into a failing mode.
#[derive(Default)]
pub struct ProbeStorage {
    inner: InMemoryStorage,
    searches: AtomicUsize,
    failing: AtomicBool,
}

impl ProbeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleStorage for ProbeStorage {
    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        self.check()?;
        self.inner.insert_article(article).await
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
        self.check()?;
        self.inner.get_article(id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.check()?;
        self.inner.get_by_slug(slug).await
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        self.check()?;
        self.inner.list_articles().await
    }

    async fn normalized_titles(&self) -> Result<Vec<String>> {
        self.check()?;
        self.inner.normalized_titles().await
    }

    async fn find_title_containing(&self, needle: &str) -> Result<Option<Article>> {
        self.check()?;
        self.inner.find_title_containing(needle).await
    }

    async fn find_slug_containing(&self, needle: &str) -> Result<Option<Article>> {
        self.check()?;
        self.inner.find_slug_containing(needle).await
    }

    async fn text_search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredArticle>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.text_search(query, limit).await
    }

    async fn nearest_by_embedding(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredArticle>> {
        self.check()?;
        self.inner.nearest_by_embedding(embedding, limit).await
    }

    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<()> {
        self.check()?;
        self.inner.set_embedding(id, embedding).await
    }

    async fn update_status(&self, id: Uuid, status: ArticleStatus) -> Result<Article> {
        self.check()?;
        self.inner.update_status(id, status).await
    }

    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<Article> {
        self.check()?;
        self.inner.update_slug(id, slug).await
    }

    async fn publish_all_drafts(&self) -> Result<u64> {
        self.check()?;
        self.inner.publish_all_drafts().await
    }

    async fn count_by_status(&self) -> Result<Vec<(ArticleStatus, u64)>> {
        self.check()?;
        self.inner.count_by_status().await
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.check()?;
        self.inner.categories().await
    }

    async fn subcategories(&self, category: &str) -> Result<Vec<String>> {
        self.check()?;
        self.inner.subcategories(category).await
    }
}

pub fn new_article(title: &str, content: &str) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        slug: ab_core::derive_slug(title),
        content: content.to_string(),
        category: "Tech".to_string(),
        subcategory: "Programming".to_string(),
        ..Default::default()
    }
}

/// Multi-paragraph article body with long sentences, distinct per `subject`.
pub fn long_body(subject: &str) -> String {
    format!(
        "{s} has changed how teams plan their weekly engineering work in surprising ways. \
         Most practitioners discover the {s} workflow through trial and error rather than training.\n\n\
         The first lesson about {s} is that small consistent habits outperform occasional heroic efforts. \
         Teams that review their {s} practice monthly report fewer regressions and calmer releases.\n\n\
         Finally, {s} rewards curiosity, because every project exposes a new corner of the discipline worth studying.",
        s = subject
    )
}

/// Shares almost no vocabulary with [`long_body`].
pub const GARDEN_BODY: &str = "Gardening begins with healthy soil, so mix compost into raised beds before planting tomatoes. \
Seedlings prefer morning sunlight, gentle watering, and mulch that keeps roots cool during July.\n\n\
Prune basil often; pinching flowers encourages bushier leaves for pesto, salads, and summer sauces later. \
Rotate crops yearly because beans restore nitrogen while squash exhausts nutrients quickly.";
