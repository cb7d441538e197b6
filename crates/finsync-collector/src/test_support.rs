//! 테스트 헬퍼: scripted provider 와 임시 저장소.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use finsync_core::{InstrumentKind, RawListing};
use finsync_data::error::{DataError, Result as DataResult};
use finsync_data::provider::{FundamentalResource, MarketDataProvider};
use finsync_data::storage::{open_universe_db, InstrumentStore, SeriesStore};

/// 임시 디렉터리에 유니버스 DB 를 열고 두 저장소 핸들 반환.
pub(crate) async fn open_test_stores() -> (tempfile::TempDir, InstrumentStore, SeriesStore) {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_universe_db(&dir.path().join("test.db"), false)
        .await
        .unwrap();

    let store = InstrumentStore::new(pool.clone());
    let series = SeriesStore::new(pool);
    store.init().await.unwrap();
    series.init().await.unwrap();

    (dir, store, series)
}

/// 리소스별 응답을 미리 지정해 두는 scripted provider.
///
/// 등록되지 않은 조회는 NotFound, `with_failure` 로 지정한 리소스는
/// 항상 FetchError 를 반환합니다.
#[derive(Default)]
pub(crate) struct MockProvider {
    listings: Vec<RawListing>,
    fundamentals: HashMap<(FundamentalResource, String), Value>,
    histories: HashMap<String, Value>,
    fail_resources: Vec<FundamentalResource>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_listings(mut self, listings: Vec<RawListing>) -> Self {
        self.listings = listings;
        self
    }

    pub(crate) fn with_fundamental(
        mut self,
        resource: FundamentalResource,
        symbol: &str,
        payload: Value,
    ) -> Self {
        self.fundamentals
            .insert((resource, symbol.to_string()), payload);
        self
    }

    pub(crate) fn with_history(mut self, symbol: &str, payload: Value) -> Self {
        self.histories.insert(symbol.to_string(), payload);
        self
    }

    pub(crate) fn with_failure(mut self, resource: FundamentalResource) -> Self {
        self.fail_resources.push(resource);
        self
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_instruments(&self, _kind: InstrumentKind) -> DataResult<Vec<RawListing>> {
        Ok(self.listings.clone())
    }

    async fn fetch_fundamental(
        &self,
        resource: FundamentalResource,
        symbol: &str,
    ) -> DataResult<Value> {
        if self.fail_resources.contains(&resource) {
            return Err(DataError::FetchError("scripted failure".to_string()));
        }

        self.fundamentals
            .get(&(resource, symbol.to_string()))
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("{}:{}", resource.as_str(), symbol)))
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> DataResult<Value> {
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::NotFound(symbol.to_string()))
    }
}
