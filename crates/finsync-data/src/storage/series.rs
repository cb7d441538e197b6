//! 일봉 OHLC 이력 저장소.
//!
//! `(symbol, date)` 를 키로 하는 단일 테이블입니다. 한 번 기록한
//! 포인트는 수정하지 않는 append-only 저장소로, 제공자 측의 소급
//! 수정이 기존 이력을 덮어쓰지 않습니다.

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;

use finsync_core::OhlcBar;

use crate::error::{DataError, Result};

/// ohlc_history 테이블 핸들.
#[derive(Clone)]
pub struct SeriesStore {
    pool: SqlitePool,
}

impl SeriesStore {
    /// 새로운 저장소 핸들 생성.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 테이블과 인덱스 생성.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ohlc_history (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume INTEGER,
                change_percent REAL,
                UNIQUE (symbol, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::MigrationError(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_ohlc_history_symbol ON ohlc_history (symbol)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::MigrationError(e.to_string()))?;

        Ok(())
    }

    /// 심볼에 대해 이미 저장된 날짜 집합.
    pub async fn existing_dates(&self, symbol: &str) -> Result<HashSet<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> =
            sqlx::query_as("SELECT date FROM ohlc_history WHERE symbol = ?")
                .bind(symbol)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// 저장되지 않은 날짜의 포인트만 추가.
    ///
    /// `bars` 는 과거 → 최신 순서를 가정합니다. 이미 저장된 날짜는
    /// 건너뛰며 (기존 포인트 불변), 삽입된 행 수를 반환합니다.
    pub async fn append_missing(&self, symbol: &str, bars: &[OhlcBar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let existing = self.existing_dates(symbol).await?;
        let mut inserted = 0;

        for bar in bars {
            if existing.contains(&bar.date) {
                continue;
            }

            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO ohlc_history
                    (symbol, date, open, high, low, close, volume, change_percent)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(symbol)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(bar.change_percent)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            inserted += result.rows_affected() as usize;
        }

        Ok(inserted)
    }

    /// 심볼의 저장된 포인트 수.
    pub async fn count(&self, symbol: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ohlc_history WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
