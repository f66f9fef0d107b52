use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{MessageResponse, Post, PostPayload},
    store::SharedStore,
    AppState,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(list_posts)
                .post(create_post)
                .fallback(method_not_allowed),
        )
        .route(
            "/posts/:id",
            get(get_post)
                .put(update_post)
                .delete(delete_post)
                .fallback(method_not_allowed),
        )
}

/// Every handler goes through the connection cache before touching the store.
async fn store(state: &AppState) -> Result<SharedStore, ApiError> {
    state.db.acquire().await.map_err(|e| {
        error!("Database connection error: {e}");
        ApiError::Connection(e.to_string())
    })
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let store = store(&state).await?;

    match store.list().await {
        Ok(posts) => {
            info!("Fetched {} posts", posts.len());
            Ok(Json(posts))
        }
        Err(e) => {
            error!("Error fetching posts: {e}");
            Err(ApiError::Read {
                message: "Error fetching posts",
                details: e.to_string(),
            })
        }
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let store = store(&state).await?;

    if !payload.has_required_fields() {
        return Err(ApiError::MissingFields);
    }

    match store.create(&payload).await {
        Ok(post) => {
            info!("Created post {} by {}", post.id, post.author);
            Ok((StatusCode::CREATED, Json(post)))
        }
        Err(e) => {
            error!("Error creating post: {e}");
            Err(ApiError::Write {
                message: "Error creating post",
                details: e.to_string(),
            })
        }
    }
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let store = store(&state).await?;
    let id = parse_id(&id)?;

    match store.find(id).await {
        Ok(Some(post)) => Ok(Json(post)),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            error!("Error fetching post {id}: {e}");
            Err(ApiError::Read {
                message: "Error fetching post",
                details: e.to_string(),
            })
        }
    }
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, ApiError> {
    let store = store(&state).await?;
    let id = parse_id(&id)?;

    if !payload.has_required_fields() {
        return Err(ApiError::MissingFields);
    }

    match store.update(id, &payload).await {
        Ok(Some(post)) => {
            info!("Updated post {id}");
            Ok(Json(post))
        }
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            error!("Error updating post {id}: {e}");
            Err(ApiError::Write {
                message: "Error updating post",
                details: e.to_string(),
            })
        }
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = store(&state).await?;
    let id = parse_id(&id)?;

    match store.delete(id).await {
        Ok(true) => {
            info!("Deleted post {id}");
            Ok(Json(MessageResponse {
                message: "Post deleted successfully".to_string(),
            }))
        }
        Ok(false) => Err(ApiError::NotFound),
        Err(e) => {
            error!("Error deleting post {id}: {e}");
            Err(ApiError::Write {
                message: "Error deleting post",
                details: e.to_string(),
            })
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
