use std::sync::Arc;

use ab_core::{ArticleStorage, Error, Result};
use async_trait::async_trait;
use tracing::info;

pub mod backends;
pub mod search;

pub use backends::*;

/// A store that can be opened from a URL.
#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    fn kind() -> &'static str;
    async fn connect(config: &BackendConfig) -> Result<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Default location for a backend kind.
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            "sqlite" => Self::new("sqlite://autoblog.db"),
            _ => Self::new("memory://"),
        }
    }
}

async fn open<T: StorageBackend + 'static>(config: &BackendConfig) -> Result<Arc<dyn ArticleStorage>> {
    let storage = T::connect(config).await?;
    info!("🏦 Storage backend initialized (using {} at {})", T::kind(), config.url);
    Ok(Arc::new(storage))
}

/// Opens the named backend, falling back to its default location when `url` is absent.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let config = url.map(BackendConfig::new).unwrap_or_else(|| BackendConfig::for_kind(kind));
    match kind {
        "memory" => open::<InMemoryStorage>(&config).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(&config).await,
        other => Err(Error::Config(format!(
            "Unsupported storage backend: {} (is the feature enabled?)",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig, StorageBackend};
}
