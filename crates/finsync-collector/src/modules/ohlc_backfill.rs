//! 일봉 OHLC 백필 모듈.
//!
//! 제공자의 전체 이력(최신순)을 시간순으로 뒤집은 뒤, 저장소에 없는
//! 날짜만 추가합니다. 이미 저장된 포인트는 절대 수정하지 않습니다.

use chrono::NaiveDate;

use finsync_core::OhlcBar;
use finsync_data::provider::MarketDataProvider;
use finsync_data::storage::SeriesStore;

use crate::Result;

/// 심볼 하나의 OHLC 이력 백필.
///
/// 삽입된 포인트 수를 반환합니다.
pub async fn backfill_symbol(
    series: &SeriesStore,
    provider: &dyn MarketDataProvider,
    symbol: &str,
    fetch_symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize> {
    let payload = provider
        .fetch_daily_history(fetch_symbol, start, end)
        .await
        .map_err(|e| crate::error::CollectorError::DataSource(e.to_string()))?;

    let Some(historical) = payload.get("historical").and_then(|h| h.as_array()) else {
        tracing::debug!(symbol = symbol, "historical 데이터 없음");
        return Ok(0);
    };

    // 제공자는 최신순으로 반환하므로 시간순으로 뒤집는다
    let bars: Vec<OhlcBar> = historical
        .iter()
        .rev()
        .filter_map(OhlcBar::from_json)
        .collect();

    let inserted = series.append_missing(symbol, &bars).await?;

    tracing::debug!(
        symbol = symbol,
        fetched = bars.len(),
        inserted = inserted,
        "OHLC 백필 완료"
    );

    Ok(inserted)
}
