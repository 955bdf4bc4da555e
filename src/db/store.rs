use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Connection};

use crate::db::{DatabaseTarget, GenerationRecord, StoredGeneration};
use crate::error::DbError;
use crate::retry::{RetryPolicy, with_retry};

const SQLITE_SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS generated_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        generation_prompt TEXT NOT NULL,
        generation_timestamp DATETIME NOT NULL,
        generation_width INTEGER NOT NULL,
        generation_height INTEGER NOT NULL,
        generation_steps INTEGER NOT NULL,
        imgbb_id TEXT,
        imgbb_title TEXT,
        imgbb_url_viewer TEXT,
        imgbb_url TEXT,
        imgbb_display_url TEXT,
        imgbb_width TEXT,
        imgbb_height TEXT,
        imgbb_size TEXT,
        imgbb_time TEXT,
        imgbb_expiration TEXT,
        delete_url TEXT,
        raw_response TEXT,
        user_id TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_generated_images_timestamp ON generated_images (generation_timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_generated_images_imgbb_id ON generated_images (imgbb_id)",
];

const MYSQL_SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS generated_images (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    generation_prompt TEXT NOT NULL,
    generation_timestamp DATETIME NOT NULL,
    generation_width INT NOT NULL,
    generation_height INT NOT NULL,
    generation_steps INT NOT NULL,
    imgbb_id VARCHAR(255),
    imgbb_title VARCHAR(255),
    imgbb_url_viewer TEXT,
    imgbb_url TEXT,
    imgbb_display_url TEXT,
    imgbb_width VARCHAR(50),
    imgbb_height VARCHAR(50),
    imgbb_size VARCHAR(50),
    imgbb_time VARCHAR(50),
    imgbb_expiration VARCHAR(50),
    delete_url TEXT,
    raw_response LONGTEXT,
    user_id VARCHAR(255) NULL,
    INDEX idx_generated_images_timestamp (generation_timestamp),
    INDEX idx_generated_images_imgbb_id (imgbb_id)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"#;

const INSERT_SQL: &str = r#"INSERT INTO generated_images (
    generation_prompt, generation_timestamp, generation_width, generation_height,
    generation_steps, imgbb_id, imgbb_title, imgbb_url_viewer, imgbb_url,
    imgbb_display_url, imgbb_width, imgbb_height, imgbb_size, imgbb_time,
    imgbb_expiration, delete_url, raw_response, user_id
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;

const SELECT_COLUMNS: &str = "id, generation_prompt, generation_timestamp, generation_width, \
    generation_height, generation_steps, imgbb_id, imgbb_title, imgbb_url_viewer, imgbb_url, \
    imgbb_display_url, imgbb_width, imgbb_height, imgbb_size, imgbb_time, imgbb_expiration, \
    delete_url, raw_response, user_id";

macro_rules! bind_record {
    ($query:expr, $record:expr) => {
        $query
            .bind($record.prompt.as_str())
            .bind($record.created_at)
            .bind(i64::from($record.width))
            .bind(i64::from($record.height))
            .bind(i64::from($record.steps))
            .bind($record.hosting_id.as_deref())
            .bind($record.hosting_title.as_deref())
            .bind($record.url_viewer.as_deref())
            .bind($record.url.as_deref())
            .bind($record.display_url.as_deref())
            .bind($record.hosted_width.as_deref())
            .bind($record.hosted_height.as_deref())
            .bind($record.hosted_size.as_deref())
            .bind($record.hosted_time.as_deref())
            .bind($record.expiration.as_deref())
            .bind($record.delete_url.as_deref())
            .bind($record.raw_response.as_str())
            .bind($record.user_id.as_deref())
    };
}

/// Runs the same expression against whichever pool is configured.
macro_rules! on_pool {
    ($pool:expr, |$p:ident| $body:expr) => {
        match $pool {
            Pool::Sqlite($p) => $body,
            Pool::MySql($p) => $body,
        }
    };
}

#[derive(Clone, Debug)]
enum Pool {
    Sqlite(SqlitePool),
    MySql(MySqlPool),
}

/// Append-only access to the `generated_images` table.
#[derive(Clone, Debug)]
pub struct GenerationStore {
    pool: Pool,
}

impl GenerationStore {
    /// Opens a pool, retrying the initial connection according to `retry`.
    pub async fn connect(
        target: &DatabaseTarget,
        pool_size: u32,
        retry: RetryPolicy,
    ) -> Result<Self, DbError> {
        let mut attempts = 0;
        let result = with_retry(retry, "database connect", || {
            attempts += 1;
            open_pool(target, pool_size)
        })
        .await;
        let pool = result.map_err(|source| {
            tracing::error!(backend = target.backend_name(), attempts, error = %source, "database connection failed");
            DbError::Connection { attempts, source }
        })?;
        tracing::info!(backend = target.backend_name(), "connected to database");
        Ok(Self { pool })
    }

    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        match &self.pool {
            Pool::Sqlite(pool) => {
                for statement in SQLITE_SCHEMA {
                    sqlx::query(statement)
                        .execute(pool)
                        .await
                        .map_err(DbError::Schema)?;
                }
            }
            Pool::MySql(pool) => {
                sqlx::query(MYSQL_SCHEMA)
                    .execute(pool)
                    .await
                    .map_err(DbError::Schema)?;
            }
        }
        tracing::info!("database schema ready");
        Ok(())
    }

    /// Inserts and commits one record, returning the new row id.
    pub async fn try_insert(&self, record: &GenerationRecord) -> Result<i64, DbError> {
        let id = match &self.pool {
            Pool::Sqlite(pool) => {
                let mut tx = pool.begin().await.map_err(DbError::Persist)?;
                let result = bind_record!(sqlx::query(INSERT_SQL), record)
                    .execute(&mut *tx)
                    .await
                    .map_err(DbError::Persist)?;
                tx.commit().await.map_err(DbError::Persist)?;
                result.last_insert_rowid()
            }
            Pool::MySql(pool) => {
                let mut tx = pool.begin().await.map_err(DbError::Persist)?;
                let result = bind_record!(sqlx::query(INSERT_SQL), record)
                    .execute(&mut *tx)
                    .await
                    .map_err(DbError::Persist)?;
                tx.commit().await.map_err(DbError::Persist)?;
                result.last_insert_id() as i64
            }
        };
        Ok(id)
    }

    /// Soft-failing insert: errors are logged and reported as `false`.
    pub async fn insert(&self, record: &GenerationRecord) -> bool {
        match self.try_insert(record).await {
            Ok(id) => {
                tracing::info!(id, "saved generation record");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "database error");
                false
            }
        }
    }

    /// Newest records first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<StoredGeneration>, DbError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM generated_images ORDER BY id DESC LIMIT ?");
        on_pool!(&self.pool, |pool| {
            sqlx::query_as::<_, StoredGeneration>(&sql)
                .bind(i64::from(limit))
                .fetch_all(pool)
                .await
        })
        .map_err(DbError::Query)
    }

    pub async fn find_by_hosting_id(
        &self,
        hosting_id: &str,
    ) -> Result<Option<StoredGeneration>, DbError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM generated_images WHERE imgbb_id = ? ORDER BY id DESC LIMIT 1"
        );
        on_pool!(&self.pool, |pool| {
            sqlx::query_as::<_, StoredGeneration>(&sql)
                .bind(hosting_id)
                .fetch_optional(pool)
                .await
        })
        .map_err(DbError::Query)
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        on_pool!(&self.pool, |pool| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM generated_images")
                .fetch_one(pool)
                .await
        })
        .map_err(DbError::Query)
    }
}

/// Opens one connection outside the pool first so an unreachable server
/// reports the driver error instead of `PoolTimedOut`.
async fn open_pool(target: &DatabaseTarget, pool_size: u32) -> Result<Pool, sqlx::Error> {
    match target {
        DatabaseTarget::Sqlite { options, in_memory } => {
            if *in_memory {
                // Every connection to `:memory:` is its own database.
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options.clone())
                    .await?;
                return Ok(Pool::Sqlite(pool));
            }
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            options.connect().await?.close().await?;
            let pool = SqlitePoolOptions::new()
                .max_connections(pool_size)
                .connect_with(options.clone())
                .await?;
            Ok(Pool::Sqlite(pool))
        }
        DatabaseTarget::MySql(params) => {
            let options = params.mysql_options();
            options.connect().await?.close().await?;
            let pool = MySqlPoolOptions::new()
                .max_connections(pool_size)
                .connect_with(options)
                .await?;
            Ok(Pool::MySql(pool))
        }
    }
}
