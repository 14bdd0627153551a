pub mod error;
pub mod models;
pub mod slug;
pub mod storage;
pub mod types;
pub mod vector;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use slug::{derive_slug, normalize_title, word_count};
pub use storage::ArticleStorage;
pub use types::{
    Article, ArticleStatus, GeneratedContent, NewArticle, ScoredArticle, SimilarityVerdict,
    SlugEntry, TextQuery, Topic,
};
pub use vector::{cosine_similarity, normalize_vector};
