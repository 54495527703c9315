use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use chrono::{Duration, Local, NaiveDateTime};
use libsql::{Builder, Connection};
use log::debug;

use crate::error::SrResult;

const EXPIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Expiring key/value store for raw provider responses.
#[derive(Clone, Debug)]
pub struct ResponseCache {
    path: PathBuf,
}

impl ResponseCache {
    pub async fn open(path: &Path) -> SrResult<Self> {
        if let Some(cache_dir) = path.parent() {
            create_dir_all(cache_dir)?;
        }

        let cache = Self {
            path: path.to_path_buf(),
        };

        let conn = cache.connect().await?;
        conn.execute(
            r#"
CREATE TABLE IF NOT EXISTS "cache" (
    "key"     TEXT PRIMARY KEY,
    "data"    BLOB NOT NULL,
    "expire"  TIMESTAMP)
;"#,
            (),
        )
        .await?;

        Ok(cache)
    }

    pub async fn get(&self, key: &str) -> SrResult<Option<Vec<u8>>> {
        let conn = self.connect().await?;

        let mut rows = conn
            .query(
                r#"
SELECT "data", "expire"
FROM "cache"
WHERE "key" = ?
LIMIT 1
;"#,
                [key],
            )
            .await?;
        if let Some(row) = rows.next().await? {
            let data = row.get::<Vec<u8>>(0)?;
            let expire_str = row.get::<String>(1)?;
            let expire = NaiveDateTime::parse_from_str(&expire_str, EXPIRE_FORMAT)?;
            if expire > Local::now().naive_local() {
                debug!("[Cache Hit] {key}");
                return Ok(Some(data));
            }
        }

        Ok(None)
    }

    pub async fn upsert(&self, key: &str, data: &[u8], expire: &NaiveDateTime) -> SrResult<()> {
        let expire_str = expire.format(EXPIRE_FORMAT).to_string();

        let conn = self.connect().await?;
        conn.execute(
            r#"
INSERT INTO "cache"
    ("key", "data", "expire")
VALUES
    (?, ?, ?)
ON CONFLICT ("key") DO UPDATE
SET "data" = excluded."data",
    "expire" = excluded."expire"
;"#,
            (key, data, expire_str),
        )
        .await?;

        Ok(())
    }

    /// Removes expired rows, returns how many were deleted.
    pub async fn purge_expired(&self) -> SrResult<u64> {
        let now_str = Local::now().naive_local().format(EXPIRE_FORMAT).to_string();

        let conn = self.connect().await?;
        let deleted = conn
            .execute(
                r#"
DELETE FROM "cache"
WHERE "expire" <= ?
;"#,
                [now_str],
            )
            .await?;

        Ok(deleted)
    }

    async fn connect(&self) -> SrResult<Connection> {
        let db = Builder::new_local(&self.path).build().await?;
        Ok(db.connect()?)
    }
}

pub fn expire_after_hours(hours: u64) -> NaiveDateTime {
    (Local::now() + Duration::hours(hours as i64)).naive_local()
}
