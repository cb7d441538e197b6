//! 배치 스케줄러.
//!
//! admitted 유니버스 전체를 청크 단위로 나눠 fundamental 수집과 OHLC
//! 백필을 동시에 수행합니다. 청크의 모든 작업이 끝나야(barrier) 다음
//! 청크로 넘어가며, 그 사이에 정적 쿨다운을 둡니다. 업스트림 rate
//! limit 대응은 이 쿨다운이 전부입니다.
//!
//! 심볼마다 fundamental / 백필 두 작업은 독립적으로 실패합니다.
//! 한쪽의 실패가 다른 쪽이나 배치 전체를 막지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use finsync_core::InstrumentKind;
use finsync_data::provider::MarketDataProvider;
use finsync_data::storage::{InstrumentStore, SeriesStore};

use crate::config::{BatchConfig, HistoryConfig};
use crate::modules::{fundamental_sync, ohlc_backfill};
use crate::normalize::AdmittedListing;
use crate::stats::CollectionStats;

/// 청크 내 개별 작업 결과.
enum TaskOutcome {
    /// fundamental 레코드 저장 (컬럼 수)
    Fundamental(usize),
    /// OHLC 백필 (삽입된 포인트 수)
    Backfill(usize),
}

/// admitted 유니버스 전체를 배치 처리.
pub async fn run_universe(
    store: InstrumentStore,
    series: SeriesStore,
    provider: Arc<dyn MarketDataProvider>,
    kind: InstrumentKind,
    admitted: Vec<AdmittedListing>,
    batch: &BatchConfig,
    history: &HistoryConfig,
) -> CollectionStats {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let start_date = history.start_date;
    let end_date = history.end_or_today();
    let chunk_size = batch.chunk_size.max(1);
    let chunk_count = admitted.len().div_ceil(chunk_size);

    tracing::info!(
        universe = %kind,
        symbols = admitted.len(),
        chunk_size = chunk_size,
        cooldown_secs = batch.cooldown_secs,
        "배치 수집 시작"
    );

    for (chunk_idx, chunk) in admitted.chunks(chunk_size).enumerate() {
        let mut tasks: JoinSet<(String, crate::Result<TaskOutcome>)> = JoinSet::new();

        for listing in chunk {
            stats.total += 1;

            let symbol = listing.symbol.clone();
            let fetch_symbol = listing.fetch_symbol.clone();
            let store = store.clone();
            let provider_fund = Arc::clone(&provider);
            tasks.spawn(async move {
                let result = fundamental_sync::sync_symbol_fundamentals(
                    &store,
                    provider_fund.as_ref(),
                    kind,
                    &symbol,
                    &fetch_symbol,
                )
                .await
                .map(TaskOutcome::Fundamental);
                (symbol, result)
            });

            let symbol = listing.symbol.clone();
            let fetch_symbol = listing.fetch_symbol.clone();
            let series = series.clone();
            let provider_back = Arc::clone(&provider);
            tasks.spawn(async move {
                let result = ohlc_backfill::backfill_symbol(
                    &series,
                    provider_back.as_ref(),
                    &symbol,
                    &fetch_symbol,
                    start_date,
                    end_date,
                )
                .await
                .map(TaskOutcome::Backfill);
                (symbol, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(TaskOutcome::Fundamental(columns)))) => {
                    if columns > 0 {
                        stats.success += 1;
                    } else {
                        stats.empty += 1;
                    }
                }
                Ok((_, Ok(TaskOutcome::Backfill(points)))) => {
                    stats.total_points += points;
                }
                Ok((symbol, Err(e))) => {
                    stats.errors += 1;
                    tracing::error!(symbol = %symbol, error = %e, "심볼 처리 실패");
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::error!(error = %e, "작업 join 실패");
                }
            }
        }

        if chunk_idx + 1 < chunk_count {
            tracing::info!(
                universe = %kind,
                chunk = chunk_idx + 1,
                total_chunks = chunk_count,
                "청크 완료, 쿨다운 대기"
            );
            tokio::time::sleep(batch.cooldown()).await;
        }
    }

    stats.elapsed = start.elapsed();
    stats
}
