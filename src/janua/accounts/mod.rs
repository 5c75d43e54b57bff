//! Account domain logic: credential verification, conditional mutation and
//! existence checks over a pluggable [`AccountStore`].

use thiserror::Error;
use uuid::Uuid;

pub mod password;
pub mod store;

pub use store::{AccountStore, DynAccountStore, MemoryAccountStore, PgAccountStore};

/// The persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Field values for a not-yet-persisted account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Profile fields applied by [`update_profile`].
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,
    #[error("Username already taken")]
    AlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid credentials")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Create an account with a freshly hashed password.
///
/// Username uniqueness is enforced by the store; a race between two
/// registrations is resolved by the store rejecting the second writer.
///
/// # Errors
/// `AlreadyExists` if the username collides with an existing account.
pub async fn register(
    store: &dyn AccountStore,
    username: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Account, AccountError> {
    let password_hash = password::hash(password).await?;

    store
        .insert(NewAccount {
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash,
        })
        .await
}

/// Check a claimed username and password against the stored hash.
///
/// Read-only; returns the matched account unchanged. `UserNotFound` and
/// `InvalidCredentials` stay distinct here so callers can log the difference,
/// but both carry the same message and must surface identically to clients.
///
/// # Errors
/// `UserNotFound` if no account matches, `InvalidCredentials` on a password
/// mismatch.
pub async fn verify(
    store: &dyn AccountStore,
    username: &str,
    password: &str,
) -> Result<Account, AccountError> {
    let account = store
        .find_by_username(username)
        .await?
        .ok_or(AccountError::UserNotFound)?;

    if password::verify(password, &account.password_hash).await? {
        Ok(account)
    } else {
        Err(AccountError::InvalidCredentials)
    }
}

/// Overwrite the profile fields and persist only if something changed.
///
/// The dirty check is an explicit snapshot-and-compare over the mutable
/// fields; assigning values equal to the current ones issues no write.
///
/// # Errors
/// `NotFound` if the id does not resolve, `AlreadyExists` if the new
/// username collides with another account.
pub async fn update_profile(
    store: &dyn AccountStore,
    id: Uuid,
    changes: ProfileChanges,
) -> Result<bool, AccountError> {
    let mut account = store.find_by_id(id).await?.ok_or(AccountError::NotFound)?;

    let snapshot = (
        account.username.clone(),
        account.first_name.clone(),
        account.last_name.clone(),
    );

    account.username = changes.username;
    account.first_name = changes.first_name;
    account.last_name = changes.last_name;

    let dirty = (
        account.username.as_str(),
        account.first_name.as_str(),
        account.last_name.as_str(),
    ) != (
        snapshot.0.as_str(),
        snapshot.1.as_str(),
        snapshot.2.as_str(),
    );

    if dirty {
        store.save(&account).await?;
    }

    Ok(dirty)
}

/// Replace the stored hash after re-verifying the current password.
///
/// No dirty check on this path: once the current password checks out the
/// write always happens and the result is always `true`.
///
/// # Errors
/// `NotFound` if the id does not resolve, `InvalidCredentials` if the
/// current password does not match.
pub async fn change_password(
    store: &dyn AccountStore,
    id: Uuid,
    current_password: &str,
    new_password: &str,
) -> Result<bool, AccountError> {
    let mut account = store.find_by_id(id).await?.ok_or(AccountError::NotFound)?;

    if !password::verify(current_password, &account.password_hash).await? {
        return Err(AccountError::InvalidCredentials);
    }

    account.password_hash = password::hash(new_password).await?;
    store.save(&account).await?;

    Ok(true)
}

/// Report whether an account with the given username exists.
///
/// Absence is the valid, expected answer; only store failures error.
///
/// # Errors
/// Store failures only.
pub async fn check_if_exists(
    store: &dyn AccountStore,
    username: &str,
) -> Result<bool, AccountError> {
    Ok(store.find_by_username(username).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> (MemoryAccountStore, Account) {
        let store = MemoryAccountStore::new();
        let account = register(&store, "alice", "CorrectHorse", "Alice", "Smith")
            .await
            .unwrap();
        (store, account)
    }

    #[tokio::test]
    async fn register_hashes_password() {
        let (_, account) = seeded_store().await;
        assert_ne!(account.password_hash, "CorrectHorse");
        assert!(account.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn register_duplicate_username_fails() {
        let (store, before) = seeded_store().await;

        let err = register(&store, "alice", "OtherPass", "Mallory", "Jones")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists));

        // pre-existing account is untouched
        let reloaded = store.find_by_id(before.id).await.unwrap().unwrap();
        assert_eq!(reloaded, before);
    }

    #[tokio::test]
    async fn register_then_exists() {
        let (store, _) = seeded_store().await;
        assert!(check_if_exists(&store, "alice").await.unwrap());
        assert!(!check_if_exists(&store, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn verify_correct_password() {
        let (store, account) = seeded_store().await;
        let verified = verify(&store, "alice", "CorrectHorse").await.unwrap();
        assert_eq!(verified, account);
    }

    #[tokio::test]
    async fn verify_wrong_password() {
        let (store, _) = seeded_store().await;
        let err = verify(&store, "alice", "WrongHorse").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn verify_unknown_username() {
        let (store, _) = seeded_store().await;
        let err = verify(&store, "nobody", "CorrectHorse").await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    #[tokio::test]
    async fn verify_failures_share_message() {
        // Handlers surface the message text; both failure kinds must read the
        // same so responses stay indistinguishable.
        assert_eq!(
            AccountError::UserNotFound.to_string(),
            AccountError::InvalidCredentials.to_string()
        );
    }

    #[tokio::test]
    async fn update_profile_identical_values_is_noop() {
        let (store, account) = seeded_store().await;
        let writes_before = store.writes();

        let updated = update_profile(
            &store,
            account.id,
            ProfileChanges {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Smith".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(!updated);
        assert_eq!(store.writes(), writes_before);
    }

    #[tokio::test]
    async fn update_profile_changed_field_persists() {
        let (store, account) = seeded_store().await;
        let writes_before = store.writes();

        let updated = update_profile(
            &store,
            account.id,
            ProfileChanges {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Jones".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(updated);
        assert_eq!(store.writes(), writes_before + 1);
        let reloaded = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_name, "Jones");
    }

    #[tokio::test]
    async fn update_profile_unknown_id() {
        let (store, _) = seeded_store().await;
        let err = update_profile(
            &store,
            Uuid::new_v4(),
            ProfileChanges {
                username: "ghost".to_string(),
                first_name: "Gh".to_string(),
                last_name: "Ost".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
    }

    #[tokio::test]
    async fn update_profile_username_collision() {
        let (store, _) = seeded_store().await;
        let bob = register(&store, "bob", "BobPassword", "Bob", "Brown")
            .await
            .unwrap();

        let err = update_profile(
            &store,
            bob.id,
            ProfileChanges {
                username: "alice".to_string(),
                first_name: "Bob".to_string(),
                last_name: "Brown".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists));
    }

    #[tokio::test]
    async fn change_password_wrong_current_leaves_hash() {
        let (store, account) = seeded_store().await;

        let err = change_password(&store, account.id, "WrongHorse", "NewPassword1")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));

        let reloaded = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, account.password_hash);
    }

    #[tokio::test]
    async fn change_password_replaces_hash() {
        let (store, account) = seeded_store().await;

        let updated = change_password(&store, account.id, "CorrectHorse", "NewPassword1")
            .await
            .unwrap();
        assert!(updated);

        let reloaded = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_ne!(reloaded.password_hash, account.password_hash);
        assert!(password::verify("NewPassword1", &reloaded.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn change_password_same_password_still_writes() {
        // No dirty check on the password path: a successful verification
        // always produces a write, even for an unchanged password.
        let (store, account) = seeded_store().await;
        let writes_before = store.writes();

        let updated = change_password(&store, account.id, "CorrectHorse", "CorrectHorse")
            .await
            .unwrap();
        assert!(updated);
        assert_eq!(store.writes(), writes_before + 1);
    }

    #[tokio::test]
    async fn change_password_unknown_id() {
        let (store, _) = seeded_store().await;
        let err = change_password(&store, Uuid::new_v4(), "CorrectHorse", "NewPassword1")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
    }
}
