//! # QuantLab Market
//!
//! 시장별 매매 규칙 엔진을 제공합니다.
//!
//! 종목 코드 형식으로 시장(중국 A주 / 홍콩 / 미국)을 판별하고,
//! 시장별 거래 단위, 결제 주기, 수수료, 가격제한폭 규칙을
//! 상태 없이 결정적으로 적용합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use quantlab_market::MarketRuleEngine;
//! use quantlab_core::{MarketConfig, Side};
//! use rust_decimal_macros::dec;
//!
//! let engine = MarketRuleEngine::new(MarketConfig::default());
//! let market = engine.detect_market("600519");
//! let fees = engine.calculate_commission(market, Side::Buy, dec!(100000));
//! println!("총 비용: {}", fees.total());
//! ```

mod detect;
mod engine;
mod fees;
mod rules;
mod session;

pub use detect::*;
pub use engine::*;
pub use fees::*;
pub use rules::*;
pub use session::*;
