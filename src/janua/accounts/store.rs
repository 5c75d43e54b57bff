//! Account persistence: the store seam plus the Postgres and in-memory
//! implementations.

use super::{Account, AccountError, NewAccount};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tracing::Instrument;
use uuid::Uuid;

pub type DynAccountStore = Arc<dyn AccountStore>;

/// The document-store surface the account operations rely on: lookups by id
/// and by unique username, insert with a uniqueness constraint, and a
/// save-if-present write.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError>;

    /// Insert a new account; `AlreadyExists` on a username collision.
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError>;

    /// Persist all mutable fields of an existing account.
    async fn save(&self, account: &Account) -> Result<(), AccountError>;

    /// Liveness check for the health endpoint.
    async fn ping(&self) -> Result<(), AccountError>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        let query = r"
            SELECT id, username, first_name, last_name, password_hash
            FROM accounts
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by id")?;

        Ok(row.as_ref().map(row_to_account))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        let query = r"
            SELECT id, username, first_name, last_name, password_hash
            FROM accounts
            WHERE username = $1
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by username")?;

        Ok(row.as_ref().map(row_to_account))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError> {
        let query = r"
            INSERT INTO accounts (username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&account.username)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(Account {
                id: row.get("id"),
                username: account.username,
                first_name: account.first_name,
                last_name: account.last_name,
                password_hash: account.password_hash,
            }),
            Err(err) if is_unique_violation(&err) => Err(AccountError::AlreadyExists),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert account")
                .into()),
        }
    }

    async fn save(&self, account: &Account) -> Result<(), AccountError> {
        let query = r"
            UPDATE accounts
            SET username = $2,
                first_name = $3,
                last_name = $4,
                password_hash = $5,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AccountError::NotFound),
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(AccountError::AlreadyExists),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to save account")
                .into()),
        }
    }

    async fn ping(&self) -> Result<(), AccountError> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")?;

        Ok(())
    }
}

/// In-memory store used by tests; counts writes so callers can assert that
/// clean updates issue none.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
    writes: AtomicUsize,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes (inserts and saves) issued against the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Account>>, AccountError> {
        self.accounts
            .lock()
            .map_err(|_| AccountError::Store(anyhow!("account store mutex poisoned")))
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        Ok(self
            .lock()?
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError> {
        let mut accounts = self.lock()?;

        if accounts
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(AccountError::AlreadyExists);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash: account.password_hash,
        };
        accounts.insert(account.id, account.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<(), AccountError> {
        let mut accounts = self.lock()?;

        if !accounts.contains_key(&account.id) {
            return Err(AccountError::NotFound);
        }

        if accounts
            .values()
            .any(|existing| existing.id != account.id && existing.username == account.username)
        {
            return Err(AccountError::AlreadyExists);
        }

        accounts.insert(account.id, account.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn ping(&self) -> Result<(), AccountError> {
        Ok(())
    }
}
