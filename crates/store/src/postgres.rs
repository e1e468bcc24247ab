use async_trait::async_trait;
use counsel_core::store::{CheckpointStore, StoreError};
use counsel_core::thread::Thread;
use counsel_model::ModelMessage;

/// Postgres-backed checkpoint store.
///
/// Threads are stored as a row per thread plus a row per message; the
/// `BIGSERIAL` message sequence preserves append order, and messages are
/// persisted verbatim as JSONB so that loading a thread reconstructs the
/// exact log the agent produced.
pub struct PostgresStore {
    pool: sqlx::PgPool,
    threads_table: String,
    messages_table: String,
}

impl PostgresStore {
    /// Creates a new Postgres store using the given connection pool.
    ///
    /// Threads are stored in the `counsel_threads` table by default,
    /// messages in `counsel_messages`.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool,
            threads_table: "counsel_threads".to_string(),
            messages_table: "counsel_messages".to_string(),
        }
    }

    /// Creates a new Postgres store with a custom table name.
    ///
    /// The messages table will be named `{table}_messages`.
    pub fn with_table(pool: sqlx::PgPool, table: impl Into<String>) -> Self {
        let threads_table = table.into();
        let messages_table = format!("{threads_table}_messages");
        Self {
            pool,
            threads_table,
            messages_table,
        }
    }

    /// Ensures the storage tables exist (idempotent).
    pub async fn ensure_tables(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {threads} (
                id         TEXT PRIMARY KEY,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE TABLE IF NOT EXISTS {messages} (
                seq        BIGSERIAL PRIMARY KEY,
                thread_id  TEXT NOT NULL REFERENCES {threads}(id) ON DELETE CASCADE,
                data       JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX IF NOT EXISTS idx_{messages}_thread_seq
                ON {messages} (thread_id, seq);
            "#,
            threads = self.threads_table,
            messages = self.messages_table,
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(Self::sql_err)?;
        Ok(())
    }

    fn sql_err(e: sqlx::Error) -> StoreError {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl CheckpointStore for PostgresStore {
    async fn load(
        &self,
        thread_id: &str,
    ) -> Result<Option<Thread>, StoreError> {
        let exists_sql =
            format!("SELECT 1 FROM {} WHERE id = $1", self.threads_table);
        let exists: Option<(i32,)> = sqlx::query_as(&exists_sql)
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::sql_err)?;
        if exists.is_none() {
            return Ok(None);
        }

        let msg_sql = format!(
            "SELECT data FROM {} WHERE thread_id = $1 ORDER BY seq",
            self.messages_table
        );
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(&msg_sql)
            .bind(thread_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::sql_err)?;

        let messages = rows
            .into_iter()
            .map(|(data,)| {
                serde_json::from_value::<ModelMessage>(data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Thread::with_messages(thread_id, messages)))
    }

    async fn append(
        &self,
        thread_id: &str,
        messages: &[ModelMessage],
    ) -> Result<(), StoreError> {
        // Use a transaction to keep the thread row and its messages
        // consistent.
        let mut tx = self.pool.begin().await.map_err(Self::sql_err)?;

        let upsert_sql = format!(
            r#"
            INSERT INTO {} (id, updated_at)
            VALUES ($1, now())
            ON CONFLICT (id) DO UPDATE
            SET updated_at = now()
            "#,
            self.threads_table
        );
        sqlx::query(&upsert_sql)
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(Self::sql_err)?;

        let insert_sql = format!(
            "INSERT INTO {} (thread_id, data) VALUES ($1, $2)",
            self.messages_table
        );
        for msg in messages {
            let data = serde_json::to_value(msg)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            sqlx::query(&insert_sql)
                .bind(thread_id)
                .bind(&data)
                .execute(&mut *tx)
                .await
                .map_err(Self::sql_err)?;
        }

        tx.commit().await.map_err(Self::sql_err)?;
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>, StoreError> {
        let sql =
            format!("SELECT id FROM {} ORDER BY id", self.threads_table);
        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::sql_err)?;
        Ok(ids)
    }
}
