//! 데이터 수집 모듈.

pub mod fundamental_sync;
pub mod ohlc_backfill;
pub mod symbol_sync;

pub use fundamental_sync::sync_symbol_fundamentals;
pub use ohlc_backfill::backfill_symbol;
pub use symbol_sync::sync_symbols;
