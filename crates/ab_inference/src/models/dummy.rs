use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use ab_core::Result;

use super::InferenceModel;

const EMBEDDING_SIZE: usize = 768;

const SUBJECTS: &[&str] = &[
    "Remote Work", "Home Gardening", "Personal Budgets", "Open Source", "Sleep Science",
    "Urban Cycling", "Meal Prep", "Solar Power", "Language Learning", "Board Games",
];

const ANGLES: &[&str] = &[
    "A Beginner's Guide to", "Hidden Costs of", "The Future of", "Myths About",
    "Lessons From a Decade of", "Ten Habits for Better",
];

/// Offline model producing deterministic, distinct output on each call.
pub struct DummyModel {
    calls: AtomicUsize,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn topic(&self, n: usize) -> String {
        let angle = ANGLES[n % ANGLES.len()];
        let subject = SUBJECTS[(n / ANGLES.len()) % SUBJECTS.len()];
        let round = n / (ANGLES.len() * SUBJECTS.len());
        let title = if round == 0 {
            format!("{} {}", angle, subject)
        } else {
            format!("{} {} (Part {})", angle, subject, round + 1)
        };
        serde_json::json!({ "title": title }).to_string()
    }

    fn article(&self, prompt: &str, n: usize) -> String {
        let title = prompt
            .lines()
            .find_map(|l| l.trim().strip_prefix("Title: "))
            .map(|t| t.trim_matches('"').to_string())
            .unwrap_or_else(|| "this topic".to_string());

        let mut sections = vec![format!(
            "{} is a subject worth a closer look, and draft number {} approaches it from first principles.",
            title, n
        )];
        for (i, heading) in ["Background", "Practical advice", "Common mistakes"].iter().enumerate() {
            sections.push(format!(
                "## {}\n\nSection {} of draft {} explains how {} plays out day to day, with concrete examples readers can try immediately.",
                heading,
                i + 1,
                n,
                title.to_lowercase()
            ));
        }
        sections.push(format!("In conclusion, {} rewards steady, informed effort.", title.to_lowercase()));
        sections.join("\n\n")
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if prompt.contains("blog post topic") {
            Ok(self.topic(n))
        } else {
            Ok(self.article(prompt, n))
        }
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0; EMBEDDING_SIZE];
        let text_len = text.chars().count().max(1) as f32;

        embedding[0] = text_len / 1000.0;
        for c in text.chars().flat_map(char::to_lowercase) {
            let bucket = 1 + (c as usize) % (EMBEDDING_SIZE - 1);
            embedding[bucket] += 1.0 / text_len;
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_topics_are_distinct() {
        let model = DummyModel::new();
        let first = model.generate("Generate a single unique blog post topic").await.unwrap();
        let second = model.generate("Generate a single unique blog post topic").await.unwrap();
        assert_ne!(first, second);
        let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert!(parsed["title"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_article_mentions_title() {
        let model = DummyModel::new();
        let body = model
            .generate("Generate a detailed blog post\nTitle: \"Solar Power at Home\"\nCategory: Tech")
            .await
            .unwrap();
        assert!(body.starts_with("Solar Power at Home"));
        assert!(body.split_whitespace().count() > 50);
    }

    #[tokio::test]
    async fn test_embeddings_are_deterministic() {
        let model = DummyModel::new();
        let a = model.generate_embeddings("Test text").await.unwrap();
        let b = model.generate_embeddings("Test text").await.unwrap();
        assert_eq!(a.len(), EMBEDDING_SIZE);
        assert!(a[0] > 0.0);
        assert_eq!(a, b);
    }
}
