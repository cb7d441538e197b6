//! Fundamental 데이터 수집 모듈.
//!
//! 심볼 하나에 대해 고정된 서브 리소스 목록을 조회하고, 성공한
//! 응답만 골라 하나의 flat 레코드로 접습니다.
//!
//! ## 실패 격리
//!
//! - 서브 리소스 하나의 실패(네트워크, 키 누락, 모양 불일치)는 해당
//!   추출만 건너뛰고 나머지에 영향을 주지 않습니다.
//! - 이번 사이클에 채워지지 않은 컬럼은 이전 값을 유지합니다.
//!
//! ## 값 정규화
//!
//! - 비율/금액 스칼라는 소수 둘째 자리 반올림
//! - null 은 타입에 맞는 센티넬로 치환 (텍스트 "n/a", 숫자 0) —
//!   컬럼에 NULL 이 저장되는 일은 없습니다.

use serde_json::Value;

use finsync_core::{etf_provider_slug, ColumnValue, InstrumentKind};
use finsync_data::provider::{FundamentalResource, MarketDataProvider};
use finsync_data::storage::InstrumentStore;

use crate::Result;

/// 주식 유니버스 서브 리소스 목록.
const STOCK_RESOURCES: &[FundamentalResource] = &[
    FundamentalResource::Profile,
    FundamentalResource::Quote,
    FundamentalResource::DividendHistory,
    FundamentalResource::EmployeeCount,
    FundamentalResource::SplitHistory,
    FundamentalResource::Peers,
    FundamentalResource::InstitutionalHolders,
    FundamentalResource::RevenueProductSegmentation,
    FundamentalResource::RevenueGeographicSegmentation,
    FundamentalResource::AnalystEstimates,
];

/// ETF 유니버스 서브 리소스 목록.
const ETF_RESOURCES: &[FundamentalResource] = &[
    FundamentalResource::EtfInfo,
    FundamentalResource::EtfHoldings,
    FundamentalResource::EtfCountryWeightings,
    FundamentalResource::Quote,
    FundamentalResource::DividendHistory,
    FundamentalResource::InstitutionalHolders,
];

/// 심볼 하나의 fundamental 레코드 수집/저장.
///
/// 저장된 컬럼 수를 반환합니다. 수집된 데이터가 없으면 0.
pub async fn sync_symbol_fundamentals(
    store: &InstrumentStore,
    provider: &dyn MarketDataProvider,
    kind: InstrumentKind,
    symbol: &str,
    fetch_symbol: &str,
) -> Result<usize> {
    let resources = match kind {
        InstrumentKind::Stock => STOCK_RESOURCES,
        InstrumentKind::Etf => ETF_RESOURCES,
    };

    let mut record: Vec<(String, ColumnValue)> = Vec::new();

    for resource in resources {
        match provider.fetch_fundamental(*resource, fetch_symbol).await {
            Ok(payload) => extract_resource(kind, *resource, &payload, &mut record),
            Err(e) => {
                tracing::debug!(
                    symbol = symbol,
                    resource = resource.as_str(),
                    error = %e,
                    "서브 리소스 조회 실패, 건너뜀"
                );
            }
        }
    }

    if record.is_empty() {
        tracing::debug!(symbol = symbol, "수집된 fundamental 데이터 없음");
        return Ok(0);
    }

    let columns = record.len();
    store.apply_row(symbol, &record).await?;

    tracing::debug!(symbol = symbol, columns = columns, "fundamental 레코드 저장");
    Ok(columns)
}

/// 서브 리소스 응답을 레코드 컬럼으로 변환.
///
/// 기대한 모양이 아니거나 비어 있으면 해당 리소스만 건너뜁니다.
fn extract_resource(
    kind: InstrumentKind,
    resource: FundamentalResource,
    payload: &Value,
    record: &mut Vec<(String, ColumnValue)>,
) {
    if payload_is_empty(payload) {
        return;
    }

    match resource {
        FundamentalResource::Profile => extract_profile(payload, record),
        FundamentalResource::Quote => extract_quote(kind, payload, record),
        FundamentalResource::DividendHistory => {
            let column = match kind {
                InstrumentKind::Stock => "stock_dividend",
                InstrumentKind::Etf => "etf_dividend",
            };
            push_blob(record, column, payload);
        }
        FundamentalResource::EmployeeCount => {
            push_blob(record, "history_employee_count", payload)
        }
        FundamentalResource::SplitHistory => {
            if let Some(historical) = payload.get("historical") {
                if !payload_is_empty(historical) {
                    push_blob(record, "stock_split", historical);
                }
            }
        }
        FundamentalResource::Peers => extract_peers(payload, record),
        FundamentalResource::InstitutionalHolders => push_blob(record, "shareholders", payload),
        FundamentalResource::RevenueProductSegmentation => {
            push_blob(record, "revenue_product_segmentation", payload)
        }
        FundamentalResource::RevenueGeographicSegmentation => {
            push_blob(record, "revenue_geographic_segmentation", payload)
        }
        FundamentalResource::AnalystEstimates => push_blob(record, "analyst_estimates", payload),
        FundamentalResource::EtfInfo => extract_etf_info(payload, record),
        FundamentalResource::EtfHoldings => extract_etf_holdings(payload, record),
        FundamentalResource::EtfCountryWeightings => {
            push_blob(record, "country_weightings", payload)
        }
    }
}

/// 기업 프로필: JSON blob + 요약 스칼라 승격.
fn extract_profile(payload: &Value, record: &mut Vec<(String, ColumnValue)>) {
    let Some(first) = payload.as_array().and_then(|a| a.first()) else {
        return;
    };

    push_blob(record, "profile", payload);
    push(record, "beta", number_or_zero(first.get("beta")));
    push(record, "country", text_or_na(first.get("country")));
    push(record, "sector", text_or_na(first.get("sector")));
    push(record, "industry", text_or_na(first.get("industry")));
    push(
        record,
        "discounted_cash_flow",
        round2_or_zero(first.get("dcf")),
    );
}

/// 시세 요약: JSON blob + 유니버스별 스칼라 승격.
fn extract_quote(kind: InstrumentKind, payload: &Value, record: &mut Vec<(String, ColumnValue)>) {
    let Some(first) = payload.as_array().and_then(|a| a.first()) else {
        return;
    };

    push_blob(record, "quote", payload);
    push(record, "price", number_or_zero(first.get("price")));
    push(
        record,
        "changesPercentage",
        round2_or_zero(first.get("changesPercentage")),
    );
    push(record, "marketCap", number_or_zero(first.get("marketCap")));
    push(record, "volume", number_or_zero(first.get("volume")));
    push(record, "avgVolume", number_or_zero(first.get("avgVolume")));

    match kind {
        InstrumentKind::Stock => {
            push(record, "eps", number_or_zero(first.get("eps")));
            push(record, "pe", number_or_zero(first.get("pe")));
        }
        InstrumentKind::Etf => {
            push(record, "eps", round2_or_zero(first.get("eps")));
            push(record, "pe", round2_or_zero(first.get("pe")));
            push(
                record,
                "previousClose",
                number_or_zero(first.get("previousClose")),
            );
        }
    }
}

/// 동종 기업 목록: 빈 문자열을 제거한 배열을 blob 으로 저장.
fn extract_peers(payload: &Value, record: &mut Vec<(String, ColumnValue)>) {
    let Some(peers) = payload
        .as_array()
        .and_then(|a| a.first())
        .and_then(|first| first.get("peersList"))
        .and_then(|list| list.as_array())
    else {
        return;
    };

    let filtered: Vec<Value> = peers
        .iter()
        .filter(|peer| peer.as_str() != Some(""))
        .cloned()
        .collect();

    push_blob(record, "stock_peers", &Value::Array(filtered));
}

/// ETF 기본 정보: JSON blob + 운용사 슬러그 등 스칼라 승격.
fn extract_etf_info(payload: &Value, record: &mut Vec<(String, ColumnValue)>) {
    let Some(first) = payload.as_array().and_then(|a| a.first()) else {
        return;
    };

    push_blob(record, "profile", payload);
    push(record, "inceptionDate", text_or_na(first.get("inceptionDate")));

    let name = first.get("name").and_then(|v| v.as_str()).unwrap_or("");
    push(
        record,
        "etfProvider",
        ColumnValue::Text(etf_provider_slug(name).to_string()),
    );

    push(record, "expenseRatio", round2_or_zero(first.get("expenseRatio")));
    push(record, "totalAssets", number_or_zero(first.get("aum")));
}

/// ETF 보유 종목: JSON blob + 보유 종목 수 승격.
fn extract_etf_holdings(payload: &Value, record: &mut Vec<(String, ColumnValue)>) {
    let Some(holdings) = payload.as_array() else {
        return;
    };

    push_blob(record, "holding", payload);
    push(
        record,
        "numberOfHoldings",
        ColumnValue::Integer(holdings.len() as i64),
    );
}

/// 빈 응답 (null, 빈 배열/객체) 여부.
fn payload_is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn push(record: &mut Vec<(String, ColumnValue)>, name: &str, value: ColumnValue) {
    record.push((name.to_string(), value));
}

/// payload 를 JSON 텍스트 blob 컬럼으로 저장.
fn push_blob(record: &mut Vec<(String, ColumnValue)>, name: &str, payload: &Value) {
    match serde_json::to_string(payload) {
        Ok(blob) => push(record, name, ColumnValue::Text(blob)),
        Err(e) => tracing::debug!(column = name, error = %e, "JSON 직렬화 실패"),
    }
}

/// 텍스트 스칼라. null/누락/빈 문자열 → "n/a".
fn text_or_na(value: Option<&Value>) -> ColumnValue {
    match value.and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => ColumnValue::Text(s.to_string()),
        _ => ColumnValue::Text("n/a".to_string()),
    }
}

/// 숫자 스칼라. null/누락 → 0.
fn number_or_zero(value: Option<&Value>) -> ColumnValue {
    match value {
        Some(v) => {
            if let Some(i) = v.as_i64() {
                ColumnValue::Integer(i)
            } else if let Some(f) = v.as_f64() {
                ColumnValue::Real(f)
            } else {
                ColumnValue::Integer(0)
            }
        }
        None => ColumnValue::Integer(0),
    }
}

/// 소수 둘째 자리 반올림 숫자. null/누락 → 0.
fn round2_or_zero(value: Option<&Value>) -> ColumnValue {
    match value.and_then(|v| v.as_f64()) {
        Some(f) => ColumnValue::Real(round2(f)),
        None => ColumnValue::Real(0.0),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_test_stores, MockProvider};
    use serde_json::json;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.031234), 0.03);
        assert_eq!(round2(2.556), 2.56);
        assert_eq!(round2(10.0 / 3.0), 3.33);
    }

    #[test]
    fn test_text_or_na_sentinel() {
        assert_eq!(
            text_or_na(Some(&json!(null))),
            ColumnValue::Text("n/a".to_string())
        );
        assert_eq!(text_or_na(None), ColumnValue::Text("n/a".to_string()));
        assert_eq!(
            text_or_na(Some(&json!(""))),
            ColumnValue::Text("n/a".to_string())
        );
        assert_eq!(
            text_or_na(Some(&json!("Technology"))),
            ColumnValue::Text("Technology".to_string())
        );
    }

    #[test]
    fn test_number_or_zero_sentinel() {
        assert_eq!(number_or_zero(Some(&json!(null))), ColumnValue::Integer(0));
        assert_eq!(number_or_zero(None), ColumnValue::Integer(0));
        assert_eq!(number_or_zero(Some(&json!(42))), ColumnValue::Integer(42));
        assert_eq!(number_or_zero(Some(&json!(1.5))), ColumnValue::Real(1.5));
    }

    #[tokio::test]
    async fn test_etf_record_from_profile_fetch() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_fundamental(
            FundamentalResource::EtfInfo,
            "ABC",
            json!([{
                "name": "Vanguard Total",
                "inceptionDate": "2010-01-01",
                "expenseRatio": 0.031234,
                "aum": 500000000i64
            }]),
        );

        let columns =
            sync_symbol_fundamentals(&store, &provider, InstrumentKind::Etf, "ABC", "ABC")
                .await
                .unwrap();
        assert!(columns > 0);

        assert_eq!(
            store.fetch_text("ABC", "etfProvider").await.unwrap().as_deref(),
            Some("vanguard")
        );
        assert_eq!(
            store.fetch_text("ABC", "expenseRatio").await.unwrap().as_deref(),
            Some("0.03")
        );
        assert_eq!(
            store.fetch_text("ABC", "totalAssets").await.unwrap().as_deref(),
            Some("500000000")
        );
        assert_eq!(
            store.fetch_text("ABC", "inceptionDate").await.unwrap().as_deref(),
            Some("2010-01-01")
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_resources() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new()
            .with_fundamental(
                FundamentalResource::Profile,
                "AAPL",
                json!([{
                    "beta": 1.25,
                    "country": "US",
                    "sector": "Technology",
                    "industry": "Consumer Electronics",
                    "dcf": 171.3612
                }]),
            )
            .with_failure(FundamentalResource::Quote);

        let columns =
            sync_symbol_fundamentals(&store, &provider, InstrumentKind::Stock, "AAPL", "AAPL")
                .await
                .unwrap();
        assert!(columns > 0);

        // quote 실패와 무관하게 profile 추출은 저장된다
        assert_eq!(
            store.fetch_text("AAPL", "sector").await.unwrap().as_deref(),
            Some("Technology")
        );
        assert_eq!(
            store
                .fetch_text("AAPL", "discounted_cash_flow")
                .await
                .unwrap()
                .as_deref(),
            Some("171.36")
        );
        // quote 컬럼은 이번 사이클에 생기지 않는다
        assert!(store.fetch_text("AAPL", "price").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_scalars_become_sentinels() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_fundamental(
            FundamentalResource::Profile,
            "XYZ",
            json!([{
                "beta": null,
                "country": null,
                "sector": "Energy",
                "industry": null,
                "dcf": null
            }]),
        );

        sync_symbol_fundamentals(&store, &provider, InstrumentKind::Stock, "XYZ", "XYZ")
            .await
            .unwrap();

        assert_eq!(
            store.fetch_text("XYZ", "country").await.unwrap().as_deref(),
            Some("n/a")
        );
        assert_eq!(
            store.fetch_text("XYZ", "beta").await.unwrap().as_deref(),
            Some("0")
        );
        assert_eq!(
            store
                .fetch_text("XYZ", "discounted_cash_flow")
                .await
                .unwrap()
                .as_deref(),
            Some("0.0")
        );
    }

    #[tokio::test]
    async fn test_empty_payload_contributes_nothing() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new()
            .with_fundamental(FundamentalResource::Profile, "EMPTY", json!([]))
            .with_fundamental(FundamentalResource::Quote, "EMPTY", json!([]));

        let columns =
            sync_symbol_fundamentals(&store, &provider, InstrumentKind::Stock, "EMPTY", "EMPTY")
                .await
                .unwrap();

        assert_eq!(columns, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stock_quote_and_peers_extraction() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new()
            .with_fundamental(
                FundamentalResource::Quote,
                "AAPL",
                json!([{
                    "price": 184.25,
                    "changesPercentage": 1.2345,
                    "marketCap": 2800000000000i64,
                    "volume": 58414500i64,
                    "avgVolume": 60000000i64,
                    "eps": 6.42,
                    "pe": 28.7
                }]),
            )
            .with_fundamental(
                FundamentalResource::Peers,
                "AAPL",
                json!([{ "symbol": "AAPL", "peersList": ["MSFT", "", "GOOGL"] }]),
            );

        sync_symbol_fundamentals(&store, &provider, InstrumentKind::Stock, "AAPL", "AAPL")
            .await
            .unwrap();

        assert_eq!(
            store
                .fetch_text("AAPL", "changesPercentage")
                .await
                .unwrap()
                .as_deref(),
            Some("1.23")
        );
        assert_eq!(
            store.fetch_text("AAPL", "stock_peers").await.unwrap().as_deref(),
            Some(r#"["MSFT","GOOGL"]"#)
        );
    }

    #[tokio::test]
    async fn test_etf_holdings_count_promoted() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_fundamental(
            FundamentalResource::EtfHoldings,
            "SPY",
            json!([
                { "asset": "AAPL", "weightPercentage": 7.1 },
                { "asset": "MSFT", "weightPercentage": 6.8 },
                { "asset": "NVDA", "weightPercentage": 6.0 }
            ]),
        );

        sync_symbol_fundamentals(&store, &provider, InstrumentKind::Etf, "SPY", "SPY")
            .await
            .unwrap();

        assert_eq!(
            store
                .fetch_text("SPY", "numberOfHoldings")
                .await
                .unwrap()
                .as_deref(),
            Some("3")
        );
    }

    #[tokio::test]
    async fn test_split_history_unwraps_historical_key() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_fundamental(
            FundamentalResource::SplitHistory,
            "AAPL",
            json!({
                "symbol": "AAPL",
                "historical": [
                    { "date": "2020-08-31", "numerator": 4, "denominator": 1 }
                ]
            }),
        );

        sync_symbol_fundamentals(&store, &provider, InstrumentKind::Stock, "AAPL", "AAPL")
            .await
            .unwrap();

        let blob = store
            .fetch_text("AAPL", "stock_split")
            .await
            .unwrap()
            .unwrap();
        assert!(blob.starts_with('['));
        assert!(blob.contains("2020-08-31"));
    }
}
