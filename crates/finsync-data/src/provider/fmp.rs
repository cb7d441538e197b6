//! Financial Modeling Prep API 클라이언트.
//!
//! FMP REST API 에서 상장 종목 목록, fundamental 서브 리소스, 일봉
//! OHLC 이력을 조회합니다.
//!
//! # API 키 관리
//!
//! API 키는 환경변수 `FMP_API_KEY` 로 주입하고 쿼리 파라미터로
//! 전달합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use finsync_data::provider::{FmpClient, FundamentalResource, MarketDataProvider};
//!
//! let client = FmpClient::from_env().expect("FMP_API_KEY 필요");
//! let quote = client.fetch_fundamental(FundamentalResource::Quote, "AAPL").await?;
//! ```

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

use finsync_core::{InstrumentKind, RawListing};

use crate::error::{DataError, Result};
use crate::provider::{FundamentalResource, MarketDataProvider};

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";

/// FMP API 클라이언트.
#[derive(Clone)]
pub struct FmpClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FmpClient {
    /// 새로운 FMP 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// 환경변수 `FMP_API_KEY` 에서 키를 로드하여 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("FMP_API_KEY").ok().map(Self::new)
    }

    /// Base URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API 요청 실행.
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(path = path, "FMP API 요청");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::UpstreamStatus { status, body });
        }

        Ok(response.json().await?)
    }
}

/// 서브 리소스별 엔드포인트 경로와 쿼리 파라미터.
fn resource_request(
    resource: FundamentalResource,
    symbol: &str,
) -> (String, Vec<(&'static str, String)>) {
    use FundamentalResource::*;

    match resource {
        Profile => (format!("/api/v3/profile/{symbol}"), Vec::new()),
        Quote => (format!("/api/v3/quote/{symbol}"), Vec::new()),
        DividendHistory => (
            format!("/api/v3/historical-price-full/stock_dividend/{symbol}"),
            Vec::new(),
        ),
        EmployeeCount => (
            "/api/v4/historical/employee_count".to_string(),
            vec![("symbol", symbol.to_string())],
        ),
        SplitHistory => (
            format!("/api/v3/historical-price-full/stock_split/{symbol}"),
            Vec::new(),
        ),
        Peers => (
            "/api/v4/stock_peers".to_string(),
            vec![("symbol", symbol.to_string())],
        ),
        InstitutionalHolders => (
            "/api/v4/institutional-ownership/institutional-holders/symbol-ownership-percent"
                .to_string(),
            vec![
                ("symbol", symbol.to_string()),
                (
                    "date",
                    latest_quarter_end(Utc::now().date_naive())
                        .format("%Y-%m-%d")
                        .to_string(),
                ),
            ],
        ),
        RevenueProductSegmentation => (
            "/api/v4/revenue-product-segmentation".to_string(),
            vec![("symbol", symbol.to_string()), ("structure", "flat".to_string())],
        ),
        RevenueGeographicSegmentation => (
            "/api/v4/revenue-geographic-segmentation".to_string(),
            vec![("symbol", symbol.to_string()), ("structure", "flat".to_string())],
        ),
        AnalystEstimates => (format!("/api/v3/analyst-estimates/{symbol}"), Vec::new()),
        EtfInfo => (
            "/api/v4/etf-info".to_string(),
            vec![("symbol", symbol.to_string())],
        ),
        EtfHoldings => (format!("/api/v3/etf-holder/{symbol}"), Vec::new()),
        EtfCountryWeightings => (
            format!("/api/v3/etf-country-weightings/{symbol}"),
            Vec::new(),
        ),
    }
}

/// 가장 최근에 끝난 분기의 마지막 날짜.
///
/// 기관 보유 현황 조회의 기준 분기로 사용합니다.
pub fn latest_quarter_end(today: NaiveDate) -> NaiveDate {
    let (year, month) = (today.year(), today.month());
    match month {
        1..=3 => NaiveDate::from_ymd_opt(year - 1, 12, 31),
        4..=6 => NaiveDate::from_ymd_opt(year, 3, 31),
        7..=9 => NaiveDate::from_ymd_opt(year, 6, 30),
        _ => NaiveDate::from_ymd_opt(year, 9, 30),
    }
    .expect("유효한 분기 말 날짜")
}

#[async_trait]
impl MarketDataProvider for FmpClient {
    fn name(&self) -> &str {
        "fmp"
    }

    async fn list_instruments(&self, kind: InstrumentKind) -> Result<Vec<RawListing>> {
        let path = match kind {
            InstrumentKind::Stock => "/api/v3/available-traded/list",
            InstrumentKind::Etf => "/api/v3/etf/list",
        };

        let payload = self.get_json(path, &[]).await?;
        let listings: Vec<RawListing> = serde_json::from_value(payload)?;

        tracing::debug!(universe = %kind, count = listings.len(), "상장 목록 조회 완료");

        Ok(listings)
    }

    async fn fetch_fundamental(
        &self,
        resource: FundamentalResource,
        symbol: &str,
    ) -> Result<Value> {
        let (path, params) = resource_request(resource, symbol);
        self.get_json(&path, &params).await
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value> {
        let path = format!("/api/v3/historical-price-full/{symbol}");
        let params = vec![
            ("from", start.format("%Y-%m-%d").to_string()),
            ("to", end.format("%Y-%m-%d").to_string()),
        ];
        self.get_json(&path, &params).await
    }
}
