//! Token issuance for verified accounts.

use crate::janua::accounts::Account;
use anyhow::{Context, Result};
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

/// Mint a signed HS256 token for a verified account.
///
/// # Errors
/// Returns an error if signing fails.
pub fn create(account: &Account, secret: &SecretString, ttl_seconds: u64) -> Result<String> {
    let iat = get_current_timestamp();
    let claims = Claims {
        sub: account.id,
        username: account.username.clone(),
        iat,
        exp: iat + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .context("failed to sign token")
}
