use crate::{
    cli::globals::GlobalArgs,
    janua::{
        accounts::{self, AccountError, DynAccountStore},
        handlers::{valid_password, valid_username},
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
pub struct NewUser {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
}

#[utoipa::path(
    post,
    path= "/auth/new",
    request_body = NewUser,
    responses (
        (status = 201, description = "Registration successful, token issued", body = String, content_type = "application/json"),
        (status = 400, description = "Invalid input or username already taken", body = String),
    ),
    tag= "auth"
)]
// axum handler for registration
pub async fn register(
    store: Extension<DynAccountStore>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<NewUser>>,
) -> impl IntoResponse {
    let user: NewUser = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_username(&user.username) {
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string()).into_response();
    }

    if !valid_password(&user.password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    let account = match accounts::register(
        store.as_ref(),
        &user.username,
        &user.password,
        &user.first_name,
        &user.last_name,
    )
    .await
    {
        Ok(account) => account,
        Err(AccountError::Store(err)) => {
            error!("Registration failed: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            debug!("Registration rejected: {err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    match token::create(&account, &globals.token_secret, globals.token_ttl_seconds) {
        Ok(token) => (StatusCode::CREATED, Json(json!({ "token": token }))).into_response(),
        Err(err) => {
            error!("Token signing failed: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}
