use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let blog = Router::new()
        .route("/generate", post(handlers::generate_post))
        .route("/generate-batch", post(handlers::generate_batch))
        .route("/run-scheduler", post(handlers::run_scheduler_now))
        .route("/generate-slug", patch(handlers::backfill_slugs))
        .route("/posts/categories", get(handlers::list_categories))
        .route("/posts/slugs", get(handlers::list_slugs))
        .route("/posts/publish-all", patch(handlers::publish_all))
        .route("/posts/slug/:slug", get(handlers::get_post_by_slug))
        .route("/posts/:id", get(handlers::get_post))
        .route("/posts/:id/status", patch(handlers::update_status));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/blog", blog)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, create_app(state)).await
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use ab_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use ab_core::{ArticleStatus, ArticleStorage, InferenceModel, NewArticle};
    use ab_inference::models::DummyModel;
    use ab_pipeline::{start_scheduler, BlogJob, LexicalOracle, PipelineConfig, ScheduleConfig, Scheduler};
    use ab_storage::InMemoryStorage;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        storage: Arc<dyn ArticleStorage>,
    }

    fn harness(register_job: bool) -> Harness {
        let storage: Arc<dyn ArticleStorage> = Arc::new(InMemoryStorage::new());
        let model: Arc<dyn InferenceModel> = Arc::new(DummyModel::new());
        let config = PipelineConfig::default().with_batch_delay(Duration::ZERO);
        let oracle = Arc::new(LexicalOracle::new(storage.clone(), &config));
        let job = Arc::new(BlogJob::new(model, storage.clone(), oracle, config));
        let scheduler = Arc::new(Scheduler::new());
        if register_job {
            start_scheduler(&scheduler, job.clone(), &ScheduleConfig::default());
        }
        Harness {
            app: create_app(AppState::new(job, scheduler)),
            storage,
        }
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed(storage: &Arc<dyn ArticleStorage>, title: &str, slug: &str) -> ab_core::Article {
        storage
            .insert_article(NewArticle {
                title: title.to_string(),
                slug: slug.to_string(),
                content: "Some body text".to_string(),
                category: "Tech".to_string(),
                subcategory: "Programming".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(false);
        let (status, body) = call(&h.app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_generate_creates_draft() {
        let h = harness(false);
        let (status, body) = call(
            &h.app,
            Method::POST,
            "/api/blog/generate",
            Some(json!({"category": "Tech", "autoPublish": false})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["post"]["status"], "draft");
        assert_eq!(body["post"]["category"], "Tech");
        assert!(!body["post"]["slug"].as_str().unwrap().is_empty());
        assert!(body["post"]["wordCount"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let h = harness(false);
        let (status, body) = call(&h.app, Method::POST, "/api/blog/generate-batch", Some(json!({"count": 11}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call(&h.app, Method::POST, "/api/blog/generate-batch", Some(json!({"count": 2}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["message"], "Started generating 2 blog posts in the background");
    }

    #[tokio::test]
    async fn test_run_scheduler() {
        let h = harness(false);
        let (status, body) = call(&h.app, Method::POST, "/api/blog/run-scheduler", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let h = harness(true);
        let (status, body) = call(&h.app, Method::POST, "/api/blog/run-scheduler", None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_post_lookups() {
        let h = harness(false);
        let post = seed(&h.storage, "Lookup Post", "lookup-post").await;

        let (status, body) = call(&h.app, Method::GET, &format!("/api/blog/posts/{}", post.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["title"], "Lookup Post");

        let (status, body) = call(&h.app, Method::GET, "/api/blog/posts/slug/lookup-post", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["id"], post.id.to_string());

        let (status, _) = call(&h.app, Method::GET, &format!("/api/blog/posts/{}", uuid::Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&h.app, Method::GET, "/api/blog/posts/slug/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_slugs_and_categories() {
        let h = harness(false);
        seed(&h.storage, "First", "first").await;
        seed(&h.storage, "Second", "second").await;

        let (status, body) = call(&h.app, Method::GET, "/api/blog/posts/slugs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["numberOfPosts"], 2);

        let (status, body) = call(&h.app, Method::GET, "/api/blog/posts/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"], json!([{"category": "Tech", "subcategories": ["Programming"]}]));
    }

    #[tokio::test]
    async fn test_status_updates() {
        let h = harness(false);
        let post = seed(&h.storage, "Status Post", "status-post").await;
        let uri = format!("/api/blog/posts/{}/status", post.id);

        let (status, body) = call(&h.app, Method::PATCH, &uri, Some(json!({"status": "published"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["status"], "published");

        let (status, body) = call(&h.app, Method::PATCH, &uri, Some(json!({"status": "deleted"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid status value: deleted");

        let missing = format!("/api/blog/posts/{}/status", uuid::Uuid::new_v4());
        let (status, _) = call(&h.app, Method::PATCH, &missing, Some(json!({"status": "draft"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_all_and_backfill() {
        let h = harness(false);
        let stale = seed(&h.storage, "Needs A Slug", "stale").await;
        seed(&h.storage, "Fine", "fine").await;

        let (status, body) = call(&h.app, Method::PATCH, "/api/blog/posts/publish-all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["published"], 2);
        let reloaded = h.storage.get_article(stale.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ArticleStatus::Published);

        let (status, body) = call(&h.app, Method::PATCH, "/api/blog/generate-slug", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["numberOfPostsUpdated"], 1);
        assert_eq!(body["updatedPosts"][0]["slug"], "needs-a-slug");
    }
}
