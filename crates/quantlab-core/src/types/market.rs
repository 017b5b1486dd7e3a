//! 시장 구분 정의.
//!
//! 이 모듈은 지원하는 주식 시장을 구분하는 타입을 정의합니다.
//! 시장별 매매 규칙(거래 단위, 결제 주기, 수수료 등)은
//! `quantlab-market` 크레이트에서 제공합니다.

use serde::{Deserialize, Serialize};

/// 지원하는 주식 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// 중국 본토 A주 (상하이/선전)
    ChinaA,
    /// 홍콩 거래소
    HongKong,
    /// 미국 시장 (NYSE/NASDAQ)
    UnitedStates,
}

impl Market {
    /// 시장의 표시 이름을 반환합니다.
    pub fn display_name(&self) -> &'static str {
        match self {
            Market::ChinaA => "China A-Shares",
            Market::HongKong => "Hong Kong",
            Market::UnitedStates => "United States",
        }
    }

    /// 결제 통화를 반환합니다.
    pub fn currency(&self) -> &'static str {
        match self {
            Market::ChinaA => "CNY",
            Market::HongKong => "HKD",
            Market::UnitedStates => "USD",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::ChinaA => write!(f, "china_a"),
            Market::HongKong => write!(f, "hong_kong"),
            Market::UnitedStates => write!(f, "united_states"),
        }
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "china_a" | "cn" | "a" => Ok(Market::ChinaA),
            "hong_kong" | "hk" => Ok(Market::HongKong),
            "united_states" | "us" => Ok(Market::UnitedStates),
            _ => Err(format!("Unknown market: {}", s)),
        }
    }
}
