use async_trait::async_trait;
use sqlx::PgPool;

use super::MetadataStore;
use crate::models::FileMeta;
use crate::types::AppResult;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, file_id: &str) -> AppResult<Option<FileMeta>> {
        let meta = sqlx::query_as::<_, FileMeta>(
            "SELECT file_id, user_id, filename, filepath, filetype, upload_date FROM files WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meta)
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<FileMeta>> {
        let files = sqlx::query_as::<_, FileMeta>(
            r#"
            SELECT file_id, user_id, filename, filepath, filetype, upload_date
            FROM files
            WHERE user_id = $1
            ORDER BY upload_date DESC, file_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn upsert(&self, meta: FileMeta) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO files (file_id, user_id, filename, filepath, filetype, upload_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (file_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                filename = EXCLUDED.filename,
                filepath = EXCLUDED.filepath,
                filetype = EXCLUDED.filetype,
                upload_date = EXCLUDED.upload_date
            "#,
        )
        .bind(&meta.file_id)
        .bind(&meta.user_id)
        .bind(&meta.filename)
        .bind(&meta.filepath)
        .bind(&meta.filetype)
        .bind(meta.upload_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, file_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user_and_filename(&self, user_id: &str, filename: &str) -> AppResult<Vec<FileMeta>> {
        let files = sqlx::query_as::<_, FileMeta>(
            "SELECT file_id, user_id, filename, filepath, filetype, upload_date FROM files WHERE user_id = $1 AND filename = $2",
        )
        .bind(user_id)
        .bind(filename)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
