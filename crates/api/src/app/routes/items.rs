//! Item routes. Items are private: reads and listings are owner-scoped, so a
//! non-owner cannot tell an item they don't own from one that does not exist.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stashpad_auth::{Operation, ReadScope};
use stashpad_core::ItemId;
use stashpad_store::{ItemChanges, NewItem};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "name is required");
    }
    if body.stock < 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "stock must be non-negative",
        );
    }

    let new = NewItem {
        name,
        stock: body.stock,
        owner: current.user_id(),
    };
    match services.items_create(new).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(item))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    match services.items_list_for_owner(current.user_id()).await {
        Ok(items) => {
            let items = items
                .into_iter()
                .map(dto::item_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid item id");
        }
    };

    let item = match services.items_get(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) = authz::check_access(&current, item.owner, Operation::Read, ReadScope::OwnerOnly)
    {
        return resp;
    }

    (StatusCode::OK, Json(dto::item_to_json(item))).into_response()
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid item id");
        }
    };

    let name = body.name.map(|n| n.trim().to_string());
    if name.as_deref() == Some("") {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "name must not be empty",
        );
    }
    if body.stock.is_some_and(|s| s < 0) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "stock must be non-negative",
        );
    }

    let item = match services.items_get(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) =
        authz::check_access(&current, item.owner, Operation::Update, ReadScope::OwnerOnly)
    {
        return resp;
    }

    let changes = ItemChanges {
        name,
        stock: body.stock,
    };
    match services.items_update(id, changes).await {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(item))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid item id");
        }
    };

    let item = match services.items_get(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) =
        authz::check_access(&current, item.owner, Operation::Delete, ReadScope::OwnerOnly)
    {
        return resp;
    }

    match services.items_delete(id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "deleted": true }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
