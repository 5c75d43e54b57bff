use crate::{
    cli::globals::GlobalArgs,
    janua::{
        accounts::{self, AccountError, DynAccountStore},
        token,
    },
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/auth",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful, token issued", body = String, content_type = "application/json"),
        (status = 400, description = "Invalid credentials", body = String),
    ),
    tag= "auth"
)]
// axum handler for login
pub async fn login(
    store: Extension<DynAccountStore>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<UserLogin>>,
) -> impl IntoResponse {
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let account = match accounts::verify(store.as_ref(), &user.username, &user.password).await {
        Ok(account) => account,
        // Unknown username and wrong password produce the same status and
        // body so callers cannot probe which usernames exist.
        Err(err @ (AccountError::UserNotFound | AccountError::InvalidCredentials)) => {
            debug!("Login rejected: {err:?}");
            return (StatusCode::BAD_REQUEST, "Invalid credentials".to_string()).into_response();
        }
        Err(err) => {
            error!("Login failed: {err:?}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
                .into_response();
        }
    };

    match token::create(&account, &globals.token_secret, globals.token_ttl_seconds) {
        Ok(token) => (StatusCode::OK, Json(json!({ "token": token }))).into_response(),
        Err(err) => {
            error!("Token signing failed: {err:?}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string()).into_response()
        }
    }
}
