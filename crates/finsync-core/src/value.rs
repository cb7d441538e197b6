//! 동적 컬럼 값 표현.
//!
//! instruments 테이블의 컬럼 집합은 스키마 설계 시점에 고정되지 않고
//! 업스트림 payload 에서 관찰된 키에 따라 늘어납니다. 각 컬럼의 저장
//! 타입은 처음 관찰된 값의 런타임 타입으로 결정되며 이후 변경되지
//! 않습니다.

use serde::{Deserialize, Serialize};

/// SQLite 컬럼 저장 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    /// DDL 에 사용하는 타입 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }

    /// 선언된 컬럼 타입 문자열에서 파싱 (PRAGMA table_info 결과).
    ///
    /// 알 수 없는 선언은 TEXT 로 간주합니다.
    pub fn from_declared(decl: &str) -> Self {
        match decl.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Self::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => Self::Real,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 동적 컬럼에 기록되는 태그된 값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl ColumnValue {
    /// 값의 자연 저장 타입.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Self::Text(_) => SqlType::Text,
            Self::Integer(_) => SqlType::Integer,
            Self::Real(_) => SqlType::Real,
        }
    }

    /// JSON 값에서 변환.
    ///
    /// - null → None (호출자가 센티넬로 치환)
    /// - 문자열 → Text, 정수 → Integer, 실수 → Real
    /// - 그 외 (bool, 배열, 객체) → JSON 텍스트
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else {
                    n.as_f64().map(Self::Real)
                }
            }
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// 텍스트 표현.
    ///
    /// 선언 타입과 불일치하는 값을 기록할 때 폴백으로 사용됩니다.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            ColumnValue::from_json(&json!("n/a")),
            Some(ColumnValue::Text("n/a".to_string()))
        );
        assert_eq!(
            ColumnValue::from_json(&json!(42)),
            Some(ColumnValue::Integer(42))
        );
        assert_eq!(
            ColumnValue::from_json(&json!(0.95)),
            Some(ColumnValue::Real(0.95))
        );
        assert_eq!(ColumnValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_from_json_compound_becomes_text() {
        let value = ColumnValue::from_json(&json!([1, 2, 3])).unwrap();
        assert_eq!(value, ColumnValue::Text("[1,2,3]".to_string()));
        assert_eq!(value.sql_type(), SqlType::Text);
    }

    #[test]
    fn test_sql_type_mapping() {
        assert_eq!(ColumnValue::Text("x".into()).sql_type(), SqlType::Text);
        assert_eq!(ColumnValue::Integer(1).sql_type(), SqlType::Integer);
        assert_eq!(ColumnValue::Real(1.5).sql_type(), SqlType::Real);
    }

    #[test]
    fn test_sql_type_from_declared() {
        assert_eq!(SqlType::from_declared("TEXT"), SqlType::Text);
        assert_eq!(SqlType::from_declared("integer"), SqlType::Integer);
        assert_eq!(SqlType::from_declared("REAL"), SqlType::Real);
        assert_eq!(SqlType::from_declared(""), SqlType::Text);
    }

    #[test]
    fn test_as_text_fallback() {
        assert_eq!(ColumnValue::Integer(7).as_text(), "7");
        assert_eq!(ColumnValue::Real(0.03).as_text(), "0.03");
        assert_eq!(ColumnValue::Text("abc".into()).as_text(), "abc");
    }
}
