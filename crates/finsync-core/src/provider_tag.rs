//! ETF 운용사 이름 → 표준 슬러그 매핑.
//!
//! 운용사의 표시 이름에 포함된 키워드로 표준 슬러그를 결정합니다.
//! 정적 테이블 기반의 순수 함수이며, 같은 이름은 항상 같은 슬러그를
//! 반환합니다. 테이블 순서가 우선순위입니다.

/// (슬러그, 이름 키워드 목록) 정적 테이블.
const PROVIDER_KEYWORDS: &[(&str, &[&str])] = &[
    ("first-trust", &["FT", "First Trust"]),
    ("blackrock", &["IShares", "iShares", "ishares", "Ishares"]),
    ("vanguard", &["Vanguard"]),
    ("state-street", &["SPDR"]),
    ("invesco", &["Invesco"]),
    ("charles-schwab", &["Schwab"]),
    ("jpmorgan-chase", &["JPMorgan Chase", "J.P.", "JP Morgan"]),
    ("dimensional", &["Dimensional"]),
    ("wisdom-tree", &["Wisdom Tree", "WisdomTree", "Wisdom"]),
    ("proshares", &["ProShares", "Proshares"]),
    ("vaneck", &["VanEck"]),
    ("fidelity", &["Fidelity"]),
    ("global-x", &["Global X"]),
    ("american-century-investments", &["Avantis", "American Century"]),
    ("direxion", &["Direxion"]),
    ("goldman-sachs", &["Goldman Sachs"]),
    ("pimco", &["PIMCO"]),
    ("flexshares", &["FlexShares"]),
    ("xtrackers", &["Xtrackers"]),
    ("capital-group", &["Capital Group"]),
    ("innovator", &["Innovator"]),
    ("ark", &["ARK", "3D Printing"]),
    (
        "franklin-templeton",
        &["Franklin", "Western", "Royce", "ClearBridge", "Martin Currie"],
    ),
    ("janus-henderson", &["Janus"]),
    ("ssc", &["Alerian", "ALPS", "Alps", "Riverfront", "Level Four"]),
    ("sprott", &["Sprott"]),
    ("nuveen", &["Nuveen"]),
    ("victory-shares", &["VictoryShares"]),
    ("abrdn", &["abrdn"]),
    ("krane-shares", &["KraneShares"]),
    ("pgim", &["PGIM"]),
    ("john-hancock", &["John Hancock"]),
    (
        "alpha-architect",
        &[
            "EA Bridgeway",
            "Strive U.S.",
            "Freedom 100",
            "Alpha Architect",
            "Strive",
            "Burney",
            "Euclidean",
            "Gadsden",
            "Argent",
            "Guru",
            "Sparkline",
            "Relative Sentiment",
            "Altrius Global",
        ],
    ),
    ("bny-mellon", &["BNY"]),
    ("amplify-investments", &["Amplify"]),
    ("the-hartford", &["Hartford"]),
    ("index-iq", &["IQ", "IndexIQ"]),
    (
        "exchange-traded-concepts",
        &[
            "ROBO",
            "ETC",
            "EMQQ",
            "Cabana",
            "Saba",
            "Bitwise",
            "NETLease",
            "Hull",
            "Vesper",
            "Corbett",
            "FMQQ",
            "India Internet",
            "QRAFT",
            "Capital Link",
            "Armor US",
            "ETFB Green",
            "Nifty India",
            "Blue Horizon",
            "LG Qraft",
            "KPOP",
            "Optica Rare",
            "Akros",
            "BTD Capital",
        ],
    ),
    ("fm-investments", &["US Treasury", "F/m"]),
    ("principal", &["Principal"]),
    (
        "etf-mg",
        &[
            "ETFMG",
            "Etho Climate",
            "AI Powered Equity",
            "Bluestar Israel",
            "Breakwave Dry",
            "Wedbush",
        ],
    ),
    ("simplify", &["Simplify"]),
    ("marygold", &["USCF", "United States"]),
    ("t-rowe-price", &["T.Rowe Price"]),
    ("bondbloxx", &["BondBloxx"]),
    ("columbia-threadneedle", &["Columbia"]),
    (
        "tidal",
        &[
            "RPAR",
            "Gotham",
            "Adasina",
            "UPAR",
            "Blueprint Chesapeake",
            "Nicholas Fixed",
            "FolioBeyond",
            "God Bless America",
            "Zega Buy",
            "Leatherback",
            "SonicShares",
            "Aztian",
            "Unlimited HFND",
            "Return Stacked",
            "Meet Kevin",
            "Sound Enhanced",
            "Carbon Collective",
            "Pinnacle Focused",
            "Robinson Alternative",
            "Ionic Inflation",
            "ATAC",
            "CNIC",
            "REIT",
            "Newday Ocean",
        ],
    ),
    ("cambria", &["Cambria"]),
    ("main-management", &["Main"]),
    ("allianz", &["AllianzIM"]),
    ("putnam", &["Putnam"]),
    ("aptus-capital-advisors", &["Aptus"]),
    ("yieldmax", &["YieldMax"]),
    ("graniteshares", &["GraniteShares"]),
    ("us-global-investors", &["U.S. Global"]),
    ("the-motley-fool", &["Motley Fool"]),
    ("inspire", &["Inspire"]),
    ("defiance", &["Defiance"]),
    ("harbor", &["Harbor"]),
    ("advisorshares", &["AdvisorShares"]),
    ("virtus-investment-partners", &["Virtus"]),
    ("strategy-shares", &["Strategy Shares"]),
    ("redwood", &["LeaderShares"]),
    ("morgan-stanley", &["Calvert", "Morgan Stanley"]),
];

/// ETF 이름에서 운용사 슬러그 결정.
///
/// 테이블 순서대로 키워드 부분 일치를 검사하고, 첫 번째로 매칭되는
/// 슬러그를 반환합니다. 매칭이 없으면 "other".
pub fn etf_provider_slug(etf_name: &str) -> &'static str {
    for (slug, keywords) in PROVIDER_KEYWORDS {
        if keywords.iter().any(|kw| etf_name.contains(kw)) {
            return slug;
        }
    }
    "other"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_providers() {
        assert_eq!(etf_provider_slug("Vanguard Total Stock Market ETF"), "vanguard");
        assert_eq!(etf_provider_slug("iShares Core S&P 500 ETF"), "blackrock");
        assert_eq!(etf_provider_slug("SPDR S&P 500 ETF Trust"), "state-street");
        assert_eq!(etf_provider_slug("Invesco QQQ Trust"), "invesco");
        assert_eq!(etf_provider_slug("ARK Innovation ETF"), "ark");
    }

    #[test]
    fn test_unmatched_name_is_other() {
        assert_eq!(etf_provider_slug("Quantum Widget Fund"), "other");
        assert_eq!(etf_provider_slug(""), "other");
    }

    #[test]
    fn test_table_order_wins() {
        // "First Trust Capital Group..." 류의 이름은 테이블 앞쪽의
        // first-trust 가 capital-group 보다 우선한다.
        assert_eq!(
            etf_provider_slug("First Trust Capital Group Income"),
            "first-trust"
        );
    }

    #[test]
    fn test_deterministic() {
        let name = "WisdomTree Emerging Markets High Dividend Fund";
        let first = etf_provider_slug(name);
        for _ in 0..10 {
            assert_eq!(etf_provider_slug(name), first);
        }
        assert_eq!(first, "wisdom-tree");
    }
}
