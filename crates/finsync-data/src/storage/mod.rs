//! 영속 저장소 모듈.
//!
//! 유니버스(주식/ETF)마다 독립된 SQLite 파일 하나를 사용합니다.
//! WAL 저널 모드로 열어 수집 프로세스(단일 writer)와 조회 계층
//! (다중 reader)이 서로를 차단하지 않습니다.

pub mod instrument;
pub mod series;

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::{DataError, Result};

pub use instrument::{InstrumentStore, ListingRow};
pub use series::SeriesStore;

/// 유니버스 데이터베이스 파일 오픈.
///
/// `full_refresh` 면 기존 파일(WAL 부속 파일 포함)을 삭제하고 새로
/// 만듭니다 (콜드 스타트 재구축). 모든 쓰기는 단일 연결을 통해
/// 직렬화됩니다.
pub async fn open_universe_db(path: &Path, full_refresh: bool) -> Result<SqlitePool> {
    if full_refresh {
        remove_db_files(path)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| DataError::ConnectionError(e.to_string()))?;

    Ok(pool)
}

/// DB 파일과 WAL 부속 파일 삭제.
fn remove_db_files(path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let target = if suffix.is_empty() {
            path.to_path_buf()
        } else {
            PathBuf::from(format!("{}{}", path.display(), suffix))
        };

        if target.exists() {
            std::fs::remove_file(&target).map_err(|e| {
                DataError::MigrationError(format!("failed to remove stale db file: {e}"))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let pool = open_universe_db(&path, false).await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_full_refresh_drops_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let pool = open_universe_db(&path, false).await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = open_universe_db(&path, true).await.unwrap();
        let exists: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 't'",
        )
        .fetch_optional(&pool)
        .await
        .unwrap();

        assert!(exists.is_none());
    }
}
