//! 심볼 동기화 모듈.

use std::time::Instant;

use finsync_core::InstrumentKind;
use finsync_data::provider::MarketDataProvider;
use finsync_data::storage::{InstrumentStore, ListingRow};

use crate::normalize::{self, AdmittedListing};
use crate::{CollectionStats, Result};

/// 유니버스 상장 목록 동기화.
///
/// 제공자의 원시 목록에 admission 필터를 적용하고, 통과한 종목의
/// 기본 정보를 instruments 테이블에 upsert 합니다. 이후 배치 단계에서
/// 쓸 수 있도록 admitted 목록을 반환합니다.
pub async fn sync_symbols(
    store: &InstrumentStore,
    provider: &dyn MarketDataProvider,
    kind: InstrumentKind,
) -> Result<(Vec<AdmittedListing>, CollectionStats)> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!(universe = %kind, "심볼 동기화 시작");

    let raw = provider
        .list_instruments(kind)
        .await
        .map_err(|e| crate::error::CollectorError::DataSource(e.to_string()))?;

    let admitted = normalize::admit(kind, &raw);

    tracing::info!(
        universe = %kind,
        raw = raw.len(),
        admitted = admitted.len(),
        "상장 목록 필터링 완료"
    );

    for listing in &admitted {
        stats.total += 1;

        let row = ListingRow {
            symbol: listing.symbol.clone(),
            name: listing.name.clone(),
            exchange: listing.exchange.clone(),
            exchange_short_name: listing.exchange_short_name.clone(),
            instrument_type: listing.instrument_type.clone(),
        };

        match store.upsert_listing(&row).await {
            Ok(()) => stats.success += 1,
            Err(e) => {
                stats.errors += 1;
                tracing::warn!(symbol = %listing.symbol, error = %e, "심볼 저장 실패");
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok((admitted, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_test_stores, MockProvider};
    use finsync_core::RawListing;

    #[tokio::test]
    async fn test_sync_symbols_persists_admitted_only() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_listings(vec![
            RawListing {
                symbol: "AAPL".to_string(),
                name: Some("Apple Inc.".to_string()),
                exchange: Some("NASDAQ Global Select".to_string()),
                exchange_short_name: Some("NASDAQ".to_string()),
                instrument_type: Some("stock".to_string()),
            },
            RawListing {
                symbol: "JUNK1".to_string(),
                name: Some("Junk Listing".to_string()),
                exchange: Some("OTC".to_string()),
                exchange_short_name: Some("OTC".to_string()),
                instrument_type: Some("stock".to_string()),
            },
        ]);

        let (admitted, stats) = sync_symbols(&store, &provider, InstrumentKind::Stock)
            .await
            .unwrap();

        assert_eq!(admitted.len(), 1);
        assert_eq!(stats.success, 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store.fetch_text("AAPL", "name").await.unwrap().as_deref(),
            Some("Apple Inc.")
        );
    }

    #[tokio::test]
    async fn test_sync_symbols_is_idempotent() {
        let (_dir, store, _series) = open_test_stores().await;

        let provider = MockProvider::new().with_listings(vec![RawListing {
            symbol: "MSFT".to_string(),
            name: Some("Microsoft Corporation".to_string()),
            exchange: Some("NASDAQ Global Select".to_string()),
            exchange_short_name: Some("NASDAQ".to_string()),
            instrument_type: Some("stock".to_string()),
        }]);

        sync_symbols(&store, &provider, InstrumentKind::Stock)
            .await
            .unwrap();
        sync_symbols(&store, &provider, InstrumentKind::Stock)
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
