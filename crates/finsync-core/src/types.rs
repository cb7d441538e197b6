//! 수집 파이프라인 기본 타입 정의.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 수집 대상 유니버스 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// 개별 주식
    Stock,
    /// 상장지수펀드
    Etf,
}

impl InstrumentKind {
    /// 유니버스별 데이터베이스 파일명.
    ///
    /// 유니버스마다 독립된 단일 파일 저장소를 사용합니다.
    pub fn db_file_name(&self) -> &'static str {
        match self {
            Self::Stock => "stocks.db",
            Self::Etf => "etf.db",
        }
    }

    /// 로그 출력용 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Etf => "etf",
        }
    }
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 데이터 제공자의 상장 종목 목록 엔드포인트가 반환하는 원시 레코드.
///
/// 필드 누락이 흔하므로 심볼 외에는 모두 Option 으로 받습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    /// 티커 심볼
    pub symbol: String,
    /// 종목명
    #[serde(default)]
    pub name: Option<String>,
    /// 거래소 전체 이름
    #[serde(default)]
    pub exchange: Option<String>,
    /// 거래소 약칭 (NYSE, NASDAQ, XETRA 등)
    #[serde(rename = "exchangeShortName", default)]
    pub exchange_short_name: Option<String>,
    /// 종목 유형 (stock, etf, trust 등)
    #[serde(rename = "type", default)]
    pub instrument_type: Option<String>,
}

/// 일봉 OHLC 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: i64,
    /// 전일 대비 등락률 (%)
    pub change_percent: f64,
}

impl OhlcBar {
    /// 제공자의 historical 항목 JSON 에서 파싱.
    ///
    /// 날짜가 없거나 형식이 다르면 None (해당 항목은 건너뜀).
    /// 가격 필드 누락은 0 으로 처리합니다.
    pub fn from_json(entry: &serde_json::Value) -> Option<Self> {
        let date = entry.get("date")?.as_str()?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;

        Some(Self {
            date,
            open: entry.get("open").and_then(|v| v.as_f64()).unwrap_or(0.0),
            high: entry.get("high").and_then(|v| v.as_f64()).unwrap_or(0.0),
            low: entry.get("low").and_then(|v| v.as_f64()).unwrap_or(0.0),
            close: entry.get("close").and_then(|v| v.as_f64()).unwrap_or(0.0),
            volume: entry.get("volume").and_then(|v| v.as_i64()).unwrap_or(0),
            change_percent: entry
                .get("changePercent")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_listing_deserialize() {
        let listing: RawListing = serde_json::from_value(json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "exchange": "NASDAQ Global Select",
            "exchangeShortName": "NASDAQ",
            "type": "stock"
        }))
        .unwrap();

        assert_eq!(listing.symbol, "AAPL");
        assert_eq!(listing.exchange_short_name.as_deref(), Some("NASDAQ"));
        assert_eq!(listing.instrument_type.as_deref(), Some("stock"));
    }

    #[test]
    fn test_raw_listing_missing_fields() {
        let listing: RawListing =
            serde_json::from_value(json!({ "symbol": "XYZ" })).unwrap();

        assert_eq!(listing.symbol, "XYZ");
        assert!(listing.name.is_none());
        assert!(listing.exchange_short_name.is_none());
    }

    #[test]
    fn test_ohlc_bar_from_json() {
        let bar = OhlcBar::from_json(&json!({
            "date": "2024-01-03",
            "open": 184.22,
            "high": 185.88,
            "low": 183.43,
            "close": 184.25,
            "volume": 58414500i64,
            "changePercent": 0.0163
        }))
        .unwrap();

        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(bar.close, 184.25);
        assert_eq!(bar.volume, 58414500);
    }

    #[test]
    fn test_ohlc_bar_missing_date_is_skipped() {
        assert!(OhlcBar::from_json(&json!({ "open": 1.0 })).is_none());
        assert!(OhlcBar::from_json(&json!({ "date": "03/01/2024" })).is_none());
    }

    #[test]
    fn test_ohlc_bar_missing_price_defaults_to_zero() {
        let bar = OhlcBar::from_json(&json!({ "date": "2024-01-03" })).unwrap();
        assert_eq!(bar.open, 0.0);
        assert_eq!(bar.volume, 0);
    }
}
