//! 종목 코드 형식 기반 시장 판별.
//!
//! 종목 코드의 형식만으로 소속 시장을 판별합니다:
//! - 전부 알파벳 (점 포함 가능, 예: "AAPL", "BRK.B") → 미국
//! - ".HK" 접미사 또는 4~5자리 숫자 (예: "0700", "09988") → 홍콩
//! - 6자리 숫자 (예: "600519") → 중국 A주
//!
//! 판별 불가능한 코드는 설정된 기본 시장으로 처리하며 경고를 남깁니다.

use quantlab_core::{Market, MarketConfig};
use tracing::warn;

/// 종목 코드로 시장을 판별합니다.
///
/// `fallback`은 어떤 형식에도 해당하지 않는 코드에 사용할 기본 시장입니다.
pub fn detect_market(code: &str, fallback: Market) -> Market {
    let trimmed = code.trim().to_uppercase();

    // ".HK" 접미사는 명시적 홍콩 표기
    if trimmed.ends_with(".HK") {
        return Market::HongKong;
    }

    // 알파벳 전용 또는 알파벳+점 조합은 미국 티커
    if !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == '.')
        && trimmed.chars().any(|c| c.is_ascii_alphabetic())
    {
        return Market::UnitedStates;
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        match trimmed.len() {
            6 => return Market::ChinaA,
            4 | 5 => return Market::HongKong,
            _ => {}
        }
    }

    warn!(
        code = %code,
        fallback = %fallback,
        "종목 코드 형식을 인식하지 못해 기본 시장으로 처리합니다"
    );
    fallback
}

/// 설정을 보관하는 시장 판별기.
#[derive(Debug, Clone)]
pub struct MarketDetector {
    config: MarketConfig,
}

impl MarketDetector {
    /// 새 판별기를 생성합니다.
    pub fn new(config: MarketConfig) -> Self {
        Self { config }
    }

    /// 종목 코드로 시장을 판별합니다.
    pub fn detect(&self, code: &str) -> Market {
        detect_market(code, self.config.fallback_market)
    }
}

impl Default for MarketDetector {
    fn default() -> Self {
        Self::new(MarketConfig::default())
    }
}
