//! Post routes. Posts are readable by any authenticated user; mutation is
//! owner-checked and a non-owner gets 403 rather than 404.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stashpad_auth::{Operation, ReadScope};
use stashpad_core::PostId;
use stashpad_store::{NewPost, PostChanges};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_post).get(list_posts))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreatePostRequest>,
) -> axum::response::Response {
    let title = body.title.trim().to_string();
    if title.is_empty() || body.content.trim().is_empty() || body.category.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "title, content and category are required",
        );
    }

    let new = NewPost {
        title,
        content: body.content,
        category: body.category,
        tags: body.tags.unwrap_or_default(),
        status: body.status.unwrap_or_default(),
        author: body
            .author
            .unwrap_or_else(|| current.username().to_string()),
        owner: current.user_id(),
    };
    match services.posts_create(new).await {
        Ok(post) => (StatusCode::CREATED, Json(dto::post_to_json(post))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.posts_list_all().await {
        Ok(posts) => {
            let posts = posts
                .into_iter()
                .map(dto::post_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": posts }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid post id");
        }
    };

    let post = match services.posts_get(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) = authz::check_access(&current, post.owner, Operation::Read, ReadScope::Public)
    {
        return resp;
    }

    (StatusCode::OK, Json(dto::post_to_json(post))).into_response()
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePostRequest>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid post id");
        }
    };

    let title = body.title.map(|t| t.trim().to_string());
    if title.as_deref() == Some("") {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "title must not be empty",
        );
    }

    let post = match services.posts_get(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) =
        authz::check_access(&current, post.owner, Operation::Update, ReadScope::Public)
    {
        return resp;
    }

    let changes = PostChanges {
        title,
        content: body.content,
        category: body.category,
        tags: body.tags,
        status: body.status,
        author: body.author,
    };
    match services.posts_update(id, changes).await {
        Ok(post) => (StatusCode::OK, Json(dto::post_to_json(post))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid post id");
        }
    };

    let post = match services.posts_get(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) =
        authz::check_access(&current, post.owner, Operation::Delete, ReadScope::Public)
    {
        return resp;
    }

    match services.posts_delete(id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "deleted": true }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
