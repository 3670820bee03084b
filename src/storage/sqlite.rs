//! SQLite backend for users and contacts

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous},
    FromRow,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{
        storage::UserStorage,
        types::{Subscription, User},
    },
    contacts::{
        scope::{ContactScope, OwnerScope},
        storage::ContactStorage,
        types::{Contact, ContactChanges, ContactFilter, NewContact},
    },
    errors::ApiError,
};

const USER_COLUMNS: &str = "id, email, password_hash, subscription, token, avatar_url, \
                            verified_email, verify_token, created_at";
const CONTACT_COLUMNS: &str = "id, name, email, phone, favorite, owner, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    subscription: String,
    token: Option<String>,
    avatar_url: Option<String>,
    verified_email: bool,
    verify_token: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            subscription: Subscription::from_str(&row.subscription).map_err(ApiError::Storage)?,
            token: row.token,
            avatar_url: row.avatar_url,
            verified_email: row.verified_email,
            verify_token: row.verify_token,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContactRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    favorite: bool,
    owner: String,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            favorite: row.favorite,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}

/// SQLite-backed storage implementing both [`UserStorage`] and [`ContactStorage`]
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `database_url` and ensure the schema
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ApiError> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // an in-memory database lives only as long as its connection
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        info!(in_memory, "sqlite storage initialized");
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), ApiError> {
        debug!("initializing database schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                subscription TEXT NOT NULL DEFAULT 'starter',
                token TEXT,
                avatar_url TEXT,
                verified_email BOOLEAN NOT NULL DEFAULT 0,
                verify_token TEXT,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_users_verify_token ON users (verify_token)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                favorite BOOLEAN NOT NULL DEFAULT 0,
                owner TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                FOREIGN KEY (owner) REFERENCES users (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_owner ON contacts (owner)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_user(&self, sql: &str, key: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, UserRow>(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserStorage for SqliteStorage {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let result = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.subscription.as_str())
        .bind(&user.token)
        .bind(&user.avatar_url)
        .bind(user.verified_email)
        .bind(&user.verify_token)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::Conflict("Email in use".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        self.fetch_user(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"), id)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.fetch_user(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
            email,
        )
        .await
    }

    async fn set_session_token(&self, id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE users SET token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn set_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET subscription = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(subscription.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound)?;

        User::try_from(row)
    }

    async fn set_avatar(&self, id: &str, avatar_url: &str) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE users SET avatar_url = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn consume_verify_token(&self, verify_token: &str) -> Result<Option<User>, ApiError> {
        self.fetch_user(
            &format!(
                "UPDATE users SET verified_email = 1, verify_token = NULL \
                 WHERE verify_token = ? RETURNING {USER_COLUMNS}"
            ),
            verify_token,
        )
        .await
    }
}

#[async_trait]
impl ContactStorage for SqliteStorage {
    async fn list(
        &self,
        scope: &OwnerScope,
        filter: ContactFilter,
    ) -> Result<Vec<Contact>, ApiError> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE owner = ? AND (? IS NULL OR favorite = ?) \
             ORDER BY rowid LIMIT ? OFFSET ?"
        ))
        .bind(scope.owner())
        .bind(filter.favorite)
        .bind(filter.favorite)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn insert(&self, scope: &OwnerScope, contact: NewContact) -> Result<Contact, ApiError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "INSERT INTO contacts ({CONTACT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.favorite)
        .bind(scope.owner())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ? AND owner = ?"
        ))
        .bind(scope.id())
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Contact::from))
    }

    async fn update(
        &self,
        scope: &ContactScope,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, ApiError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "UPDATE contacts SET \
                name = COALESCE(?, name), \
                email = COALESCE(?, email), \
                phone = COALESCE(?, phone), \
                favorite = COALESCE(?, favorite) \
             WHERE id = ? AND owner = ? \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.favorite)
        .bind(scope.id())
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Contact::from))
    }

    async fn delete(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "DELETE FROM contacts WHERE id = ? AND owner = ? RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(scope.id())
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Contact::from))
    }
}
