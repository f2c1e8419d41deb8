use async_trait::async_trait;
use common::AggregateId;
use domain::{Password, Role, StoredUser, UserAggregate};
use outbox::{OutboxMessage, PostgresOutboxStore};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    query::UserListQuery,
    read_store::{TokenInfo, UserDetails, UserListItem, UserReadStore},
    repository::UserRepository,
    uow::{TxScope, UnitOfWork},
};

/// Name of the unique index guarding one-email-per-account.
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str =
    "id, name, email, username, password_hash, role, is_active, created_at, updated_at, version";

/// PostgreSQL-backed identity store.
///
/// Implements the repository, the read store, and the unit of work over
/// one connection pool. Aggregate state and outbox rows share the same
/// database, so the transactional scope co-commits them.
#[derive(Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Creates a new PostgreSQL identity store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_stored(row: &PgRow) -> Result<StoredUser> {
        Ok(StoredUser {
            id: AggregateId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get::<i64, _>("version")? as u64,
        })
    }

    fn rehydrate(stored: StoredUser) -> Result<UserAggregate> {
        UserAggregate::from_stored(stored).map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }

    fn map_unique_violation(error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = error
            && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
        {
            return StoreError::DuplicateEmail;
        }
        StoreError::Database(error)
    }

    async fn upsert_user(
        tx: &mut Transaction<'_, Postgres>,
        stored: &StoredUser,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, email, username, password_hash, role, is_active, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at,
                version = EXCLUDED.version
            "#,
        )
        .bind(stored.id.as_uuid())
        .bind(&stored.name)
        .bind(&stored.email)
        .bind(&stored.username)
        .bind(&stored.password_hash)
        .bind(&stored.role)
        .bind(stored.is_active)
        .bind(stored.created_at)
        .bind(stored.updated_at)
        .bind(stored.version as i64)
        .execute(&mut **tx)
        .await
        .map_err(Self::map_unique_violation)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresIdentityStore {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.to_lowercase())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get_by_id(&self, id: AggregateId) -> Result<Option<UserAggregate>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(Self::row_to_stored)
            .transpose()?
            .map(Self::rehydrate)
            .transpose()
    }

    async fn add(&self, user: &UserAggregate) -> Result<()> {
        let stored = user.to_stored();
        let mut tx = self.pool.begin().await?;
        Self::upsert_user(&mut tx, &stored).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: AggregateId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserReadStore for PostgresIdentityStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<UserDetails>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active AND email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let stored = Self::row_to_stored(&row)?;
        Ok(Some(UserDetails {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            username: stored.username,
            role: parse_role(&stored.role)?,
        }))
    }

    async fn get_user_list(&self, query: &UserListQuery) -> Result<Vec<UserListItem>> {
        // The ORDER BY clause is assembled from the closed sort enum only;
        // raw caller strings never reach it.
        let order_clause = match query.sort {
            Some((field, direction)) => {
                format!("ORDER BY {} {}", field.column(), direction.keyword())
            }
            None => "ORDER BY created_at ASC".to_string(),
        };

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE is_active
              AND ($1::text IS NULL OR name ILIKE $1 OR username ILIKE $1
                   OR email ILIKE $1 OR role ILIKE $1)
            {order_clause}
            LIMIT $2 OFFSET $3
            "#
        );

        let pattern = query.filter.as_ref().map(|f| format!("%{f}%"));
        let rows = sqlx::query(&sql)
            .bind(pattern)
            .bind(query.page_size as i64)
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let stored = Self::row_to_stored(row)?;
                Ok(UserListItem {
                    id: stored.id,
                    name: stored.name,
                    email: stored.email,
                    username: stored.username,
                    role: parse_role(&stored.role)?,
                })
            })
            .collect()
    }

    async fn get_token_info(&self, email: &str, password: &str) -> Result<Option<TokenInfo>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };
        let stored = Self::row_to_stored(&row)?;

        let hash = Password::from_hash(&stored.password_hash)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        if !hash.verify(password) {
            return Ok(None);
        }

        Ok(Some(TokenInfo {
            user_id: stored.id,
            name: stored.name,
            email: stored.email,
            username: stored.username,
            role: parse_role(&stored.role)?,
        }))
    }
}

fn parse_role(value: &str) -> Result<Role> {
    Role::create(value).map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

/// Open PostgreSQL transaction over users and outbox rows.
pub struct PostgresTxScope {
    tx: Transaction<'static, Postgres>,
    writes: u64,
}

#[async_trait]
impl UnitOfWork for PostgresIdentityStore {
    type Scope = PostgresTxScope;

    async fn begin(&self) -> Result<Self::Scope> {
        Ok(PostgresTxScope {
            tx: self.pool.begin().await?,
            writes: 0,
        })
    }
}

#[async_trait]
impl TxScope for PostgresTxScope {
    async fn persist_user(&mut self, user: &UserAggregate) -> Result<()> {
        let stored = user.to_stored();
        PostgresIdentityStore::upsert_user(&mut self.tx, &stored).await?;
        self.writes += 1;
        Ok(())
    }

    async fn delete_user(&mut self, id: AggregateId) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        self.writes += 1;
        Ok(())
    }

    async fn enqueue(&mut self, message: OutboxMessage) -> Result<()> {
        PostgresOutboxStore::insert_in_tx(&mut self.tx, &message).await?;
        self.writes += 1;
        Ok(())
    }

    async fn commit(self) -> Result<u64> {
        self.tx.commit().await?;
        Ok(self.writes)
    }
}
