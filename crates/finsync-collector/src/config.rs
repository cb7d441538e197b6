//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use finsync_core::InstrumentKind;

use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// FMP API 키
    pub api_key: String,
    /// 데이터베이스 파일 디렉터리
    pub data_dir: PathBuf,
    /// 주식 유니버스 배치 설정
    pub stocks: BatchConfig,
    /// ETF 유니버스 배치 설정
    pub etfs: BatchConfig,
    /// OHLC 백필 범위 설정
    pub history: HistoryConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 유니버스별 배치 설정.
///
/// 청크 크기와 쿨다운이 업스트림 rate limit 대응의 전부입니다.
/// 관측된 응답 지연에 적응하지 않는 정적 상수입니다.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 청크당 동시 처리 심볼 수
    pub chunk_size: usize,
    /// 청크 사이 쿨다운 (초)
    pub cooldown_secs: u64,
}

/// OHLC 백필 범위 설정
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// 수집 시작 날짜
    pub start_date: NaiveDate,
    /// 수집 종료 날짜 (없으면 실행 시점의 오늘)
    pub end_date: Option<NaiveDate>,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("FMP_API_KEY").map_err(|_| {
            crate::error::CollectorError::Config(
                "FMP_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        let start_date = env_var_date("OHLC_START_DATE")
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2015, 1, 1).expect("유효한 기본 시작일"));

        Ok(Self {
            api_key,
            data_dir: std::env::var("FINSYNC_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("backup_db")),
            stocks: BatchConfig {
                chunk_size: env_var_parse("STOCK_CHUNK_SIZE", 60),
                cooldown_secs: env_var_parse("STOCK_COOLDOWN_SECS", 30),
            },
            etfs: BatchConfig {
                chunk_size: env_var_parse("ETF_CHUNK_SIZE", 150),
                cooldown_secs: env_var_parse("ETF_COOLDOWN_SECS", 60),
            },
            history: HistoryConfig {
                start_date,
                end_date: env_var_date("OHLC_END_DATE"),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1440),
            },
        })
    }

    /// 유니버스별 배치 설정.
    pub fn batch(&self, kind: InstrumentKind) -> &BatchConfig {
        match kind {
            InstrumentKind::Stock => &self.stocks,
            InstrumentKind::Etf => &self.etfs,
        }
    }

    /// 유니버스별 DB 파일 경로.
    pub fn db_path(&self, kind: InstrumentKind) -> PathBuf {
        self.data_dir.join(kind.db_file_name())
    }
}

impl BatchConfig {
    /// 청크 사이 쿨다운을 Duration 으로 반환
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl HistoryConfig {
    /// 백필 종료 날짜 (설정이 없으면 오늘)
    pub fn end_or_today(&self) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration 으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 날짜 파싱 (YYYY-MM-DD)
fn env_var_date(key: &str) -> Option<NaiveDate> {
    std::env::var(key)
        .ok()
        .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}
