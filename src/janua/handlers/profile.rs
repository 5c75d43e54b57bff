use crate::janua::{
    accounts::{self, AccountError, DynAccountStore, ProfileChanges},
    handlers::valid_username,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
}

#[utoipa::path(
    put,
    path= "/user/profile",
    request_body = UpdateProfile,
    responses (
        (status = 200, description = "Profile applied; `updated` reports whether a write happened", body = String, content_type = "application/json"),
        (status = 400, description = "Unknown account or username already taken", body = String),
    ),
    tag= "user"
)]
// axum handler for profile updates
pub async fn update_profile(
    store: Extension<DynAccountStore>,
    payload: Option<Json<UpdateProfile>>,
) -> impl IntoResponse {
    let profile: UpdateProfile = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_username(&profile.username) {
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string()).into_response();
    }

    let changes = ProfileChanges {
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
    };

    match accounts::update_profile(store.as_ref(), profile.id, changes).await {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(AccountError::Store(err)) => {
            error!("Profile update failed: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Profile update failed".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            debug!("Profile update rejected: {err}");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}
