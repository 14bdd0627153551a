pub mod embeddings;
pub mod models;

pub use embeddings::EmbeddingGenerator;
pub use models::{create_model, InferenceConfig, InferenceModel};

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{EmbeddingGenerator, InferenceConfig};
    pub use ab_core::{Error, InferenceModel, Result};
}
