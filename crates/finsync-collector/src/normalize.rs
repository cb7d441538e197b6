//! 심볼 정규화 및 유니버스 admission 필터.
//!
//! 제공자의 원시 상장 목록에서 수집 대상 심볼만 선별합니다.
//! 전부 순수 함수이며 부수효과가 없습니다.

use finsync_core::{InstrumentKind, RawListing};

/// 주식 유니버스로 허용되는 거래소 약칭.
const STOCK_VENUES: &[&str] = &["XETRA", "NYSE", "NASDAQ", "AMEX", "PNK", "EURONEXT"];

/// 핑크시트(PNK)에서 예외적으로 허용하는 심볼.
///
/// PNK 전체는 커버리지가 얇아 제외하고, 검증된 대형 종목만 들인다.
const PNK_ALLOWED: &[&str] = &[
    "FSRNQ", "TSSI", "DRSHF", "NTDOY", "OTGLF", "TCEHY", "KRKNF", "BYDDY", "XIACY", "NSRGY",
    "TLPFY", "TLPFF",
];

/// Euronext 에서 예외적으로 허용하는 심볼 (점 표기 포함).
const EURONEXT_ALLOWED: &[&str] = &[
    "ALEUP.PA", "ALNEV.PA", "ALGAU.PA", "ALDRV.PA", "ALHYG.PA", "ALVMG.PA", "TEP.PA",
];

/// 대시 표기를 유지하는 주식 심볼.
const DASH_ALLOWED: &[&str] = &["BRK-A", "BRK-B"];

/// 점 표기를 허용하는 ETF 심볼.
const DOTTED_ETF_ALLOWED: &[&str] = &["QDVE.DE"];

/// 수집 대상으로 확정된 종목.
#[derive(Debug, Clone)]
pub struct AdmittedListing {
    /// 저장소 기본 키로 쓰는 심볼
    pub symbol: String,
    /// 제공자 API 호출에 쓰는 심볼 (ETF 는 대시 제거)
    pub fetch_symbol: String,
    /// 종목명
    pub name: String,
    /// 거래소 전체 이름
    pub exchange: String,
    /// 거래소 약칭
    pub exchange_short_name: String,
    /// 종목 유형
    pub instrument_type: String,
}

/// 원시 목록에 유니버스별 admission 필터 적용.
pub fn admit(kind: InstrumentKind, listings: &[RawListing]) -> Vec<AdmittedListing> {
    listings
        .iter()
        .filter_map(|listing| match kind {
            InstrumentKind::Stock => admit_stock(listing),
            InstrumentKind::Etf => admit_etf(listing),
        })
        .collect()
}

fn admit_stock(listing: &RawListing) -> Option<AdmittedListing> {
    let symbol = listing.symbol.as_str();
    if symbol.is_empty() {
        return None;
    }

    // 우선주/클래스 구분 대시 표기는 명시 허용 목록 외 제외
    if symbol.contains('-') && !DASH_ALLOWED.contains(&symbol) {
        return None;
    }

    let name = listing.name.as_deref().unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let venue = listing.exchange_short_name.as_deref().unwrap_or("");
    if !STOCK_VENUES.contains(&venue) {
        return None;
    }
    if listing.instrument_type.as_deref() != Some("stock") {
        return None;
    }

    if venue == "PNK" && !PNK_ALLOWED.contains(&symbol) {
        return None;
    }
    if venue == "EURONEXT" && !EURONEXT_ALLOWED.contains(&symbol) {
        return None;
    }

    Some(AdmittedListing {
        symbol: symbol.to_string(),
        fetch_symbol: symbol.to_string(),
        name: name.to_string(),
        exchange: listing.exchange.clone().unwrap_or_default(),
        exchange_short_name: venue.to_string(),
        instrument_type: "stock".to_string(),
    })
}

fn admit_etf(listing: &RawListing) -> Option<AdmittedListing> {
    let symbol = listing.symbol.as_str();
    if symbol.is_empty() {
        return None;
    }

    let name = listing.name.as_deref().unwrap_or("");
    if name.is_empty() {
        return None;
    }

    // 숫자나 점이 들어간 심볼은 지역 클래스 표기라 제외
    let clean = !symbol.contains('.') && !symbol.chars().any(|c| c.is_ascii_digit());
    if !clean && !DOTTED_ETF_ALLOWED.contains(&symbol) {
        return None;
    }

    Some(AdmittedListing {
        symbol: symbol.to_string(),
        fetch_symbol: symbol.replace('-', ""),
        name: name.to_string(),
        exchange: listing.exchange.clone().unwrap_or_default(),
        exchange_short_name: listing.exchange_short_name.clone().unwrap_or_default(),
        instrument_type: listing
            .instrument_type
            .clone()
            .unwrap_or_else(|| "etf".to_string()),
    })
}
