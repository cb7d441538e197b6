//! 데이터 수집 및 저장.
//!
//! 이 crate 는 다음을 제공합니다:
//! - 시장 데이터 제공자 클라이언트 (Financial Modeling Prep)
//! - 유니버스별 SQLite 저장소 (instruments, ohlc_history)
//! - 동적 스키마 확장 및 wide-row upsert

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use provider::{FmpClient, FundamentalResource, MarketDataProvider};
pub use storage::{open_universe_db, InstrumentStore, SeriesStore};
