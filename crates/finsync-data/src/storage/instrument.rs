//! Instruments 테이블 저장소.
//!
//! 컬럼 집합이 수집 시점에 동적으로 늘어나는 wide 테이블입니다.
//!
//! # 동작 방식
//!
//! 1. 새 컬럼은 처음 관찰된 값의 타입(TEXT/INTEGER/REAL)으로 추가
//! 2. 행이 없으면 심볼만 있는 빈 행을 먼저 삽입
//! 3. 공급된 컬럼마다 개별 UPDATE 적용
//!
//! 컬럼은 추가만 되고 삭제되지 않으며, 선언 타입은 최초 결정 후
//! 불변입니다. 선언 타입과 다른 타입의 값이 들어오면 텍스트 표현으로
//! 기록합니다.

use std::collections::HashMap;

use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use finsync_core::{ColumnValue, SqlType};

use crate::error::{DataError, Result};

/// 상장 종목 기본 레코드 (심볼 동기화 단계에서 기록).
#[derive(Debug, Clone)]
pub struct ListingRow {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub exchange_short_name: String,
    pub instrument_type: String,
}

/// instruments 테이블 핸들.
#[derive(Clone)]
pub struct InstrumentStore {
    pool: SqlitePool,
}

impl InstrumentStore {
    /// 새로운 저장소 핸들 생성.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 기본 테이블 생성.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instruments (
                symbol TEXT PRIMARY KEY,
                name TEXT,
                exchange TEXT,
                exchangeShortName TEXT,
                type TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::MigrationError(e.to_string()))?;

        Ok(())
    }

    /// 상장 종목 기본 정보 upsert.
    ///
    /// 새 심볼이면 삽입하고, 기존 심볼이면 기본 컬럼만 갱신합니다.
    /// 이미 수집된 fundamental 컬럼은 건드리지 않습니다.
    pub async fn upsert_listing(&self, row: &ListingRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO instruments (symbol, name, exchange, exchangeShortName, type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.symbol)
        .bind(&row.name)
        .bind(&row.exchange)
        .bind(&row.exchange_short_name)
        .bind(&row.instrument_type)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE instruments SET name = ?, exchange = ?, exchangeShortName = ?, type = ?
            WHERE symbol = ?
            "#,
        )
        .bind(&row.name)
        .bind(&row.exchange)
        .bind(&row.exchange_short_name)
        .bind(&row.instrument_type)
        .bind(&row.symbol)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 현재 선언된 컬럼과 타입 조회 (PRAGMA table_info).
    pub async fn declared_columns(&self) -> Result<HashMap<String, SqlType>> {
        let rows = sqlx::query("PRAGMA table_info(instruments)")
            .fetch_all(&self.pool)
            .await?;

        let mut columns = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            columns.insert(name, SqlType::from_declared(&declared));
        }

        Ok(columns)
    }

    /// 컬럼이 없으면 추가. 이미 있으면 no-op.
    ///
    /// 타입은 처음 추가될 때 한 번만 결정됩니다.
    pub async fn ensure_column(&self, column: &str, sql_type: SqlType) -> Result<()> {
        validate_identifier(column)?;

        let ddl = format!(
            r#"ALTER TABLE instruments ADD COLUMN "{}" {}"#,
            column,
            sql_type.as_str()
        );

        if let Err(e) = sqlx::query(&ddl).execute(&self.pool).await {
            // 같은 청크의 다른 심볼이 먼저 추가했을 수 있다
            if e.to_string().contains("duplicate column name") {
                return Ok(());
            }
            return Err(DataError::MigrationError(e.to_string()));
        }

        tracing::debug!(column = column, sql_type = %sql_type, "컬럼 추가");
        Ok(())
    }

    /// 심볼 행에 컬럼 값 일괄 적용 (upsert).
    ///
    /// 같은 입력으로 반복 호출해도 최종 상태는 동일합니다.
    pub async fn apply_row(&self, symbol: &str, columns: &[(String, ColumnValue)]) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }

        let mut declared = self.declared_columns().await?;

        for (name, value) in columns {
            if !declared.contains_key(name) {
                self.ensure_column(name, value.sql_type()).await?;
                declared.insert(name.clone(), value.sql_type());
            }
        }

        sqlx::query("INSERT OR IGNORE INTO instruments (symbol) VALUES (?)")
            .bind(symbol)
            .execute(&self.pool)
            .await?;

        for (name, value) in columns {
            let declared_type = declared.get(name).copied().unwrap_or(SqlType::Text);
            self.update_column(symbol, name, value, declared_type).await?;
        }

        Ok(())
    }

    /// 단일 컬럼 UPDATE. 선언 타입과 불일치하면 텍스트 표현으로 기록.
    async fn update_column(
        &self,
        symbol: &str,
        column: &str,
        value: &ColumnValue,
        declared: SqlType,
    ) -> Result<()> {
        validate_identifier(column)?;

        let sql = format!(r#"UPDATE instruments SET "{}" = ? WHERE symbol = ?"#, column);
        let query = sqlx::query(&sql);

        let query = if value.sql_type() == declared {
            match value {
                ColumnValue::Text(s) => query.bind(s.clone()),
                ColumnValue::Integer(i) => query.bind(*i),
                ColumnValue::Real(r) => query.bind(*r),
            }
        } else {
            query.bind(value.as_text())
        };

        query
            .bind(symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        Ok(())
    }

    /// 저장된 심볼 수.
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM instruments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// 단일 컬럼 값을 텍스트로 조회.
    ///
    /// 조회 계층과 테스트에서 사용합니다. 행이나 값이 없거나 컬럼이
    /// 아직 생기지 않았으면 None.
    pub async fn fetch_text(&self, symbol: &str, column: &str) -> Result<Option<String>> {
        validate_identifier(column)?;

        if !self.declared_columns().await?.contains_key(column) {
            return Ok(None);
        }

        let sql = format!(
            r#"SELECT CAST("{}" AS TEXT) FROM instruments WHERE symbol = ?"#,
            column
        );
        let row: Option<(Option<String>,)> = sqlx::query_as(&sql)
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|(value,)| value))
    }
}

/// 컬럼 이름 검증.
///
/// 컬럼 이름은 업스트림 JSON 키에서 오므로, 식별자 인용을 깨뜨릴 수
/// 있는 문자는 거부합니다.
fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(DataError::InvalidData(format!(
            "invalid column name: {name:?}"
        )));
    }
    Ok(())
}
