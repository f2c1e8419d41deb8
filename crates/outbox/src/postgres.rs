use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    MessageId, OutboxError, OutboxMessage, OutboxStatus, Result, store::OutboxStore,
};

/// PostgreSQL-backed outbox store.
#[derive(Clone)]
pub struct PostgresOutboxStore {
    pool: PgPool,
}

impl PostgresOutboxStore {
    /// Creates a new PostgreSQL outbox store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a message inside an open transaction.
    ///
    /// This is the transactional enqueue path: the row commits or rolls
    /// back together with whatever else the transaction holds.
    pub async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        message: &OutboxMessage,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox_messages
                (id, event_type, destination, payload, status, attempts, created_at, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(&message.event_type)
        .bind(&message.destination)
        .bind(&message.payload)
        .bind(message.status.as_str())
        .bind(message.attempts as i32)
        .bind(message.created_at)
        .bind(message.sent_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    fn row_to_message(row: PgRow) -> Result<OutboxMessage> {
        let status_raw: String = row.try_get("status")?;
        let status = OutboxStatus::parse(&status_raw).ok_or_else(|| {
            OutboxError::Serialization(serde_json::Error::io(std::io::Error::other(format!(
                "unknown outbox status: {status_raw}"
            ))))
        })?;

        Ok(OutboxMessage {
            id: MessageId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            destination: row.try_get("destination")?,
            payload: row.try_get("payload")?,
            status,
            attempts: row.try_get::<i32, _>("attempts")? as u32,
            created_at: row.try_get("created_at")?,
            sent_at: row.try_get("sent_at")?,
        })
    }

    async fn set_status(
        &self,
        id: MessageId,
        status: OutboxStatus,
        attempts: u32,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE outbox_messages SET status = $2, attempts = $3, sent_at = $4 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(attempts as i32)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::MessageNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn insert(&self, message: OutboxMessage) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::insert_in_tx(&mut tx, &message).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: MessageId) -> Result<Option<OutboxMessage>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_type, destination, payload, status, attempts, created_at, sent_at
            FROM outbox_messages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_message).transpose()
    }

    async fn load_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, destination, payload, status, attempts, created_at, sent_at
            FROM outbox_messages
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_message).collect()
    }

    async fn load_pending_older_than(&self, age: Duration) -> Result<Vec<OutboxMessage>> {
        let cutoff = Utc::now() - age;
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, destination, payload, status, attempts, created_at, sent_at
            FROM outbox_messages
            WHERE status = 'pending' AND created_at < $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_message).collect()
    }

    async fn mark_sent(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.set_status(id, OutboxStatus::Sent, attempts, Some(Utc::now()))
            .await
    }

    async fn mark_retrying(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.set_status(id, OutboxStatus::Pending, attempts, None).await
    }

    async fn mark_dead_letter(&self, id: MessageId, attempts: u32) -> Result<()> {
        self.set_status(id, OutboxStatus::DeadLetter, attempts, None)
            .await
    }
}
