//! Uploads table holding one row per distinct submission.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(UPLOADS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS uploads CASCADE;")
            .await?;
        Ok(())
    }
}

const UPLOADS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS uploads (
    id BIGSERIAL PRIMARY KEY,
    hash CHAR(40) NOT NULL UNIQUE,
    body TEXT NOT NULL DEFAULT '',
    files TEXT[] NOT NULL DEFAULT '{}',
    "timestamp" BIGINT NOT NULL,
    CONSTRAINT chk_uploads_hash_hex CHECK (hash ~ '^[0-9a-f]{40}$')
);

-- Prefix lookups (hash LIKE 'abc%')
CREATE INDEX IF NOT EXISTS idx_uploads_hash_prefix ON uploads (hash bpchar_pattern_ops);
"#;
