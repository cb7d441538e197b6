//! 데이터 Provider 모듈.
//!
//! ## Financial Modeling Prep
//! - `FmpClient`: FMP REST API 클라이언트 (API 키 필요)
//! - 상장 종목 목록, 프로필/시세 등 fundamental 서브 리소스, 일봉 이력
//!
//! 업스트림 payload 는 엔드포인트마다 모양이 다른 중첩 JSON 이므로
//! 의도적으로 `serde_json::Value` 로 반환합니다. 구조 해석과 컬럼
//! 추출은 수집 모듈의 책임입니다.

pub mod fmp;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use finsync_core::{InstrumentKind, RawListing};

use crate::error::Result;

pub use fmp::FmpClient;

/// 심볼별 fundamental 서브 리소스 식별자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundamentalResource {
    /// 기업 프로필
    Profile,
    /// 시세 요약
    Quote,
    /// 배당 이력
    DividendHistory,
    /// 임직원 수 이력
    EmployeeCount,
    /// 액면분할 이력
    SplitHistory,
    /// 동종 기업 목록
    Peers,
    /// 기관 보유 현황 (최근 완료 분기)
    InstitutionalHolders,
    /// 제품별 매출 구성
    RevenueProductSegmentation,
    /// 지역별 매출 구성
    RevenueGeographicSegmentation,
    /// 애널리스트 추정치
    AnalystEstimates,
    /// ETF 기본 정보
    EtfInfo,
    /// ETF 보유 종목
    EtfHoldings,
    /// ETF 국가별 비중
    EtfCountryWeightings,
}

impl FundamentalResource {
    /// 로그 출력용 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Quote => "quote",
            Self::DividendHistory => "dividend_history",
            Self::EmployeeCount => "employee_count",
            Self::SplitHistory => "split_history",
            Self::Peers => "peers",
            Self::InstitutionalHolders => "institutional_holders",
            Self::RevenueProductSegmentation => "revenue_product_segmentation",
            Self::RevenueGeographicSegmentation => "revenue_geographic_segmentation",
            Self::AnalystEstimates => "analyst_estimates",
            Self::EtfInfo => "etf_info",
            Self::EtfHoldings => "etf_holdings",
            Self::EtfCountryWeightings => "etf_country_weightings",
        }
    }
}

/// 시장 데이터 제공자 경계.
///
/// 수집 모듈과 테스트가 실제 HTTP 클라이언트 대신 mock 을 끼울 수
/// 있도록 trait 으로 분리합니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 유니버스 상장 종목 목록 조회.
    async fn list_instruments(&self, kind: InstrumentKind) -> Result<Vec<RawListing>>;

    /// 심볼의 fundamental 서브 리소스 조회.
    async fn fetch_fundamental(
        &self,
        resource: FundamentalResource,
        symbol: &str,
    ) -> Result<Value>;

    /// 일봉 OHLC 이력 조회. 제공자는 최신순으로 반환합니다.
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value>;
}
