use crate::janua::{
    accounts::{self, AccountError, DynAccountStore},
    handlers::valid_password,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    id: Uuid,
    password: String,
    new_password: String,
}

#[utoipa::path(
    put,
    path= "/user/password",
    request_body = ChangePassword,
    responses (
        (status = 200, description = "Password replaced", body = String, content_type = "application/json"),
        (status = 400, description = "Unknown account or wrong current password", body = String),
    ),
    tag= "user"
)]
// axum handler for password changes
pub async fn change_password(
    store: Extension<DynAccountStore>,
    payload: Option<Json<ChangePassword>>,
) -> impl IntoResponse {
    let request: ChangePassword = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_password(&request.new_password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    match accounts::change_password(
        store.as_ref(),
        request.id,
        &request.password,
        &request.new_password,
    )
    .await
    {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(AccountError::Store(err)) => {
            error!("Password change failed: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password change failed".to_string(),
            )
                .into_response()
        }
        Err(err) => {
            debug!("Password change rejected: {err}");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}
