use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const FALLBACK_NAME: &str = "General";

/// Categories and their subcategories, used when a request leaves them open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        let entries: &[(&str, &[&str])] = &[
            ("Tech", &["Artificial Intelligence", "Programming", "Gadgets", "Cybersecurity"]),
            ("Health", &["Fitness", "Nutrition", "Mental Health", "Sleep"]),
            ("Finance", &["Personal Finance", "Investing", "Budgeting", "Careers"]),
            ("Travel", &["Destinations", "Budget Travel", "Travel Tips"]),
            ("Food", &["Recipes", "Baking", "Food Culture"]),
            ("Lifestyle", &["Productivity", "Home", "Relationships"]),
            ("Science", &["Space", "Climate", "Biology"]),
            ("Education", &["Study Skills", "Online Learning", "Languages"]),
        ];
        Self::from_entries(entries.iter().map(|(c, subs)| (c.to_string(), subs.iter().map(|s| s.to_string()).collect())))
    }
}

impl CategoryCatalog {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        Self {
            categories: entries.into_iter().collect(),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn subcategories(&self, category: &str) -> &[String] {
        self.categories.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves a (category, subcategory) pair, choosing at random whatever the caller left unset.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: Option<&str>,
        subcategory: Option<&str>,
    ) -> (String, String) {
        let category = match category.filter(|c| !c.trim().is_empty()) {
            Some(c) => c.trim().to_string(),
            None => {
                let all: Vec<&str> = self.categories().collect();
                all.choose(rng).map(|c| c.to_string()).unwrap_or_else(|| FALLBACK_NAME.to_string())
            }
        };

        let subcategory = match subcategory.filter(|s| !s.trim().is_empty()) {
            Some(s) => s.trim().to_string(),
            None => self
                .subcategories(&category)
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| FALLBACK_NAME.to_string()),
        };

        (category, subcategory)
    }
}
