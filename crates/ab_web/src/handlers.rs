use std::sync::Arc;

use ab_core::Error;
use ab_pipeline::{GenerateOptions, BLOG_GENERATION_JOB};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;

pub const MAX_BATCH_SIZE: usize = 10;
const DEFAULT_BATCH_SIZE: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub count: Option<usize>,
    #[serde(flatten)]
    pub options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

fn error_response(context: &str, e: &Error) -> Response {
    match e {
        Error::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Blog post not found"})),
        )
            .into_response(),
        Error::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": message})),
        )
            .into_response(),
        _ => {
            error!("Error in {}: {}", context, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "message": "Server error", "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn generate_post(
    State(state): State<Arc<AppState>>,
    body: Option<Json<GenerateOptions>>,
) -> Response {
    let options = body.map(|Json(o)| o).unwrap_or_default();
    let outcome = state.job.generate_and_publish(&options).await;
    let status = if outcome.success {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}

pub async fn generate_batch(
    State(state): State<Arc<AppState>>,
    body: Option<Json<BatchRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let count = request.count.unwrap_or(DEFAULT_BATCH_SIZE);
    if count == 0 || count > MAX_BATCH_SIZE {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": format!("Batch size must be between 1 and {} posts", MAX_BATCH_SIZE),
            })),
        )
            .into_response();
    }

    let job = state.job.clone();
    let options = request.options;
    tokio::spawn(async move {
        let outcomes = job.generate_batch(count, &options).await;
        info!(
            "Background batch done: {} of {} succeeded",
            outcomes.iter().filter(|o| o.success).count(),
            count
        );
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": format!("Started generating {} blog posts in the background", count),
        })),
    )
        .into_response()
}

pub async fn run_scheduler_now(State(state): State<Arc<AppState>>) -> Response {
    let ack = state.scheduler.run_job_now(BLOG_GENERATION_JOB);
    let status = if ack.success {
        StatusCode::ACCEPTED
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(ack)).into_response()
}

pub async fn get_post(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.publisher.get(id).await {
        Ok(post) => Json(json!({"success": true, "post": post})).into_response(),
        Err(e) => error_response("get_post", &e),
    }
}

pub async fn get_post_by_slug(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match state.publisher.get_by_slug(&slug).await {
        Ok(post) => Json(json!({"success": true, "post": post})).into_response(),
        Err(e) => error_response("get_post_by_slug", &e),
    }
}

pub async fn list_slugs(State(state): State<Arc<AppState>>) -> Response {
    match state.publisher.list_slugs().await {
        Ok(slugs) => Json(json!({
            "success": true,
            "numberOfPosts": slugs.len(),
            "slugs": slugs,
        }))
        .into_response(),
        Err(e) => error_response("list_slugs", &e),
    }
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Response {
    match state.publisher.categories().await {
        Ok(categories) => {
            let categories: Vec<_> = categories
                .into_iter()
                .map(|(category, subcategories)| json!({"category": category, "subcategories": subcategories}))
                .collect();
            Json(json!({"success": true, "categories": categories})).into_response()
        }
        Err(e) => error_response("list_categories", &e),
    }
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> Response {
    let Some(status) = request.status else {
        return error_response("update_status", &Error::Validation("Invalid status value".to_string()));
    };
    match state.publisher.update_status(id, &status).await {
        Ok(post) => Json(json!({
            "success": true,
            "message": format!("Post status updated to {}", post.status),
            "post": post,
        }))
        .into_response(),
        Err(e) => error_response("update_status", &e),
    }
}

pub async fn publish_all(State(state): State<Arc<AppState>>) -> Response {
    match state.publisher.publish_all_drafts().await {
        Ok(published) => Json(json!({"success": true, "published": published})).into_response(),
        Err(e) => error_response("publish_all", &e),
    }
}

pub async fn backfill_slugs(State(state): State<Arc<AppState>>) -> Response {
    match state.publisher.backfill_slugs().await {
        Ok(updated) => Json(json!({
            "success": true,
            "numberOfPostsUpdated": updated.len(),
            "updatedPosts": updated,
        }))
        .into_response(),
        Err(e) => error_response("backfill_slugs", &e),
    }
}
