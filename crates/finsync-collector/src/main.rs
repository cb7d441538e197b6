//! Standalone market data collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsync_collector::{modules, scheduler, CollectorConfig};
use finsync_core::InstrumentKind;
use finsync_data::provider::{FmpClient, MarketDataProvider};
use finsync_data::storage::{self, InstrumentStore, SeriesStore};

#[derive(Parser)]
#[command(name = "finsync-collector")]
#[command(about = "FinSync Market Data Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 수집 대상 유니버스.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Universe {
    Stocks,
    Etfs,
}

impl From<Universe> for InstrumentKind {
    fn from(universe: Universe) -> Self {
        match universe {
            Universe::Stocks => InstrumentKind::Stock,
            Universe::Etfs => InstrumentKind::Etf,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 심볼 목록 동기화
    SyncSymbols {
        /// 대상 유니버스
        #[arg(long, value_enum)]
        universe: Universe,
    },

    /// 유니버스 하나의 전체 수집 (심볼 동기화 → fundamental + OHLC)
    Run {
        /// 대상 유니버스
        #[arg(long, value_enum)]
        universe: Universe,

        /// 저장소 파일을 삭제하고 처음부터 재구축
        #[arg(long)]
        full_refresh: bool,

        /// 특정 심볼만 수집 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 전체 워크플로우 실행 (주식 → ETF)
    RunAll {
        /// 저장소 파일을 삭제하고 처음부터 재구축
        #[arg(long)]
        full_refresh: bool,
    },

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("finsync_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("FinSync Data Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "설정 로드 완료");

    let provider: Arc<dyn MarketDataProvider> = Arc::new(FmpClient::new(config.api_key.clone()));

    // 명령 실행
    match cli.command {
        Commands::SyncSymbols { universe } => {
            let kind = universe.into();
            let (store, _series) = open_stores(&config, kind, false).await?;
            let (_, stats) = modules::sync_symbols(&store, provider.as_ref(), kind).await?;
            stats.log_summary("심볼 동기화");
        }
        Commands::Run {
            universe,
            full_refresh,
            symbols,
        } => {
            run_universe_workflow(&config, Arc::clone(&provider), universe.into(), full_refresh, symbols)
                .await?;
        }
        Commands::RunAll { full_refresh } => {
            tracing::info!("=== 전체 워크플로우 시작 ===");

            tracing::info!("Step 1/2: 주식 유니버스");
            run_universe_workflow(
                &config,
                Arc::clone(&provider),
                InstrumentKind::Stock,
                full_refresh,
                None,
            )
            .await?;

            tracing::info!("Step 2/2: ETF 유니버스");
            run_universe_workflow(
                &config,
                Arc::clone(&provider),
                InstrumentKind::Etf,
                full_refresh,
                None,
            )
            .await?;

            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 워크플로우 실행 시작 ===");

                        for kind in [InstrumentKind::Stock, InstrumentKind::Etf] {
                            if let Err(e) = run_universe_workflow(
                                &config,
                                Arc::clone(&provider),
                                kind,
                                false,
                                None,
                            )
                            .await
                            {
                                tracing::error!(universe = %kind, error = %e, "유니버스 수집 실패");
                            }
                        }

                        tracing::info!(
                            "=== 워크플로우 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    tracing::info!("FinSync Data Collector 종료");

    Ok(())
}

/// 유니버스 DB 를 열고 저장소 핸들 초기화.
async fn open_stores(
    config: &CollectorConfig,
    kind: InstrumentKind,
    full_refresh: bool,
) -> Result<(InstrumentStore, SeriesStore), Box<dyn std::error::Error>> {
    let path = config.db_path(kind);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = storage::open_universe_db(&path, full_refresh).await?;
    let store = InstrumentStore::new(pool.clone());
    let series = SeriesStore::new(pool);
    store.init().await?;
    series.init().await?;

    tracing::info!(universe = %kind, db = %path.display(), "데이터베이스 연결 성공");

    Ok((store, series))
}

/// 유니버스 하나의 전체 수집 워크플로우.
async fn run_universe_workflow(
    config: &CollectorConfig,
    provider: Arc<dyn MarketDataProvider>,
    kind: InstrumentKind,
    full_refresh: bool,
    symbols: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (store, series) = open_stores(config, kind, full_refresh).await?;

    // 1. 심볼 동기화
    let (mut admitted, sync_stats) = modules::sync_symbols(&store, provider.as_ref(), kind).await?;
    sync_stats.log_summary("심볼 동기화");

    // 2. 특정 심볼 필터 (지정된 경우)
    if let Some(filter) = symbols {
        let wanted: Vec<String> = filter.split(',').map(|s| s.trim().to_string()).collect();
        admitted.retain(|listing| wanted.iter().any(|w| w == &listing.symbol));
        tracing::info!(count = admitted.len(), "특정 심볼만 수집");
    }

    // 3. fundamental + OHLC 배치 수집
    let stats = scheduler::run_universe(
        store,
        series,
        provider,
        kind,
        admitted,
        config.batch(kind),
        &config.history,
    )
    .await;
    stats.log_summary("배치 수집");

    Ok(())
}
