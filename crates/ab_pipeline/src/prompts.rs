//! Prompt templates sent to the text backend.

use ab_core::Article;

use crate::content::ContentRequest;
use crate::topic::TopicRequest;

/// Characters of a rejected article quoted back to the model.
const AVOID_EXCERPT_CHARS: usize = 600;

pub fn topic_instruction(request: &TopicRequest, avoid: Option<&str>, retry: u32) -> String {
    let mut prompt = String::from(
        "Generate a single unique, engaging blog post topic with a title, category, and subcategory. \
         Don't include any other text. The title should be catchy and relevant to the category and subcategory. \
         Respond with JSON in the form {\"title\": \"...\"}.",
    );

    if let Some(category) = &request.category {
        prompt.push_str(&format!(" The category should be {}.", category));
    }
    if let Some(subcategory) = &request.subcategory {
        prompt.push_str(&format!(" The subcategory should be {}.", subcategory));
    }
    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            " Include some of these keywords if possible: {}.",
            request.keywords.join(", ")
        ));
    }
    if let Some(title) = avoid {
        prompt.push_str(&format!(" Avoid anything similar to \"{}\".", title));
    }
    if retry > 2 {
        prompt.push_str(" Be more creative and think outside the box.");
    }

    prompt
}

pub fn topic_prompt(instruction: &str, category: &str, subcategory: &str) -> String {
    format!("{}, Category: {}, Subcategory: {}", instruction, category, subcategory)
}

pub fn content_prompt(request: &ContentRequest, avoid: Option<&Article>) -> String {
    let mut prompt = format!(
        "Generate a detailed blog post with the following details:\n\
         Title: \"{}\"\n\
         Category: {}\n\
         Subcategory: {}\n\
         Tone: {}\n\
         Word count: between {} and {} words.\n",
        request.title, request.category, request.subcategory, request.tone, request.min_words, request.max_words
    );

    if let Some(article) = avoid {
        let excerpt: String = article.content.chars().take(AVOID_EXCERPT_CHARS).collect();
        prompt.push_str(&format!(
            "\nIMPORTANT: Your content must be COMPLETELY DIFFERENT and NOT SIMILAR to this existing article:\n\
             Existing title: \"{}\"\n\
             Existing excerpt: {}\n\
             Take a totally different approach, use different examples, and structure the article differently.\n",
            article.title, excerpt
        ));
    }

    prompt.push_str(
        "\nPlease include an engaging introduction, at least 3 informative sections, and a conclusion.\n\
         Return only the content (no metadata or explanation).",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_core::NewArticle;
    use chrono::Utc;

    fn request() -> TopicRequest {
        TopicRequest {
            category: Some("Tech".to_string()),
            subcategory: None,
            keywords: vec!["rust".to_string(), "wasm".to_string()],
        }
    }

    #[test]
    fn test_topic_instruction_includes_constraints() {
        let prompt = topic_instruction(&request(), Some("Old Title"), 0);
        assert!(prompt.contains("The category should be Tech."));
        assert!(!prompt.contains("The subcategory should be"));
        assert!(prompt.contains("keywords if possible: rust, wasm."));
        assert!(prompt.contains("Avoid anything similar to \"Old Title\"."));
        assert!(!prompt.contains("outside the box"));
    }

    #[test]
    fn test_topic_instruction_intensifies_after_two_retries() {
        assert!(!topic_instruction(&request(), None, 2).contains("outside the box"));
        assert!(topic_instruction(&request(), None, 3).contains("outside the box"));
    }

    #[test]
    fn test_topic_prompt_merges_pair() {
        let prompt = topic_prompt("Base.", "Food", "Baking");
        assert!(prompt.ends_with("Category: Food, Subcategory: Baking"));
    }

    #[test]
    fn test_content_prompt_with_avoid_hint() {
        let request = ContentRequest {
            title: "Ten Tips".to_string(),
            category: "Travel".to_string(),
            subcategory: "Budget Travel".to_string(),
            min_words: 600,
            max_words: 2000,
            tone: "informative".to_string(),
        };
        let plain = content_prompt(&request, None);
        assert!(plain.contains("Title: \"Ten Tips\""));
        assert!(plain.contains("between 600 and 2000 words"));
        assert!(!plain.contains("COMPLETELY DIFFERENT"));

        let existing = ab_core::Article::from_new(
            NewArticle {
                title: "Cheap Flights".to_string(),
                slug: "cheap-flights".to_string(),
                content: "x".repeat(2000),
                category: "Travel".to_string(),
                subcategory: "Budget Travel".to_string(),
                ..Default::default()
            },
            Utc::now(),
        );
        let steered = content_prompt(&request, Some(&existing));
        assert!(steered.contains("COMPLETELY DIFFERENT"));
        assert!(steered.contains("Existing title: \"Cheap Flights\""));
        assert!(!steered.contains(&"x".repeat(AVOID_EXCERPT_CHARS + 1)));
    }
}
