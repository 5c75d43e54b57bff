use crate::janua::accounts::{self, DynAccountStore};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, IntoParams, Serialize, Deserialize, Debug)]
pub struct ExistsParams {
    username: String,
}

#[utoipa::path(
    post,
    path= "/auth/exists",
    params(ExistsParams),
    responses (
        (status = 200, description = "Existence reported", body = String, content_type = "application/json"),
        (status = 400, description = "Missing username or store failure", body = String),
    ),
    tag= "auth"
)]
// axum handler for username availability
pub async fn exists(
    store: Extension<DynAccountStore>,
    query: Option<Query<ExistsParams>>,
) -> impl IntoResponse {
    let Some(Query(params)) = query else {
        return (StatusCode::BAD_REQUEST, "Missing username".to_string()).into_response();
    };

    // Non-existence is the valid, expected answer here, never an error
    match accounts::check_if_exists(store.as_ref(), &params.username).await {
        Ok(existing) => (StatusCode::OK, Json(json!({ "existing": existing }))).into_response(),
        Err(err) => {
            error!("Existence check failed: {err:?}");
            (
                StatusCode::BAD_REQUEST,
                "Existence check failed".to_string(),
            )
                .into_response()
        }
    }
}
