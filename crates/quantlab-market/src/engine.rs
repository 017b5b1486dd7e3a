//! 시장 규칙 엔진.
//!
//! 시장 판별, 규칙 조회, 비용 계산, 주문 검증을 하나의 진입점으로
//! 묶습니다. 엔진은 상태가 없으며 (설정만 보관) 모든 연산은
//! 입력에 대해 결정적입니다.

use crate::detect::MarketDetector;
use crate::fees::{calculate_fees, FeeBreakdown};
use crate::rules::MarketRule;
use crate::session::{self, PriceBand, RuleViolation};
use chrono::{DateTime, Utc};
use quantlab_core::{Market, MarketConfig, Price, Quantity, Side};

/// 시장별 매매 규칙 엔진.
#[derive(Debug, Clone)]
pub struct MarketRuleEngine {
    detector: MarketDetector,
}

impl MarketRuleEngine {
    /// 새 규칙 엔진을 생성합니다.
    pub fn new(config: MarketConfig) -> Self {
        Self {
            detector: MarketDetector::new(config),
        }
    }

    /// 종목 코드로 시장을 판별합니다.
    pub fn detect_market(&self, code: &str) -> Market {
        self.detector.detect(code)
    }

    /// 시장의 매매 규칙을 반환합니다.
    pub fn get_rule(&self, market: Market) -> MarketRule {
        MarketRule::for_market(market)
    }

    /// 명목 가치에 대한 비용 내역을 계산합니다.
    pub fn calculate_commission(&self, market: Market, side: Side, notional: Price) -> FeeBreakdown {
        calculate_fees(&self.get_rule(market), side, notional)
    }

    /// 주문 수량을 검증합니다.
    pub fn validate_quantity(&self, market: Market, quantity: Quantity) -> Result<(), RuleViolation> {
        session::validate_quantity(&self.get_rule(market), quantity)
    }

    /// 가격이 가격제한폭 안에 있는지 검증하고 밴드를 반환합니다.
    pub fn check_price_limit(
        &self,
        market: Market,
        price: Price,
        prev_close: Price,
        code: &str,
    ) -> Result<PriceBand, RuleViolation> {
        session::check_price_limit(&self.get_rule(market), price, prev_close, code)
    }

    /// 매수분을 오늘 매도할 수 있는지 확인합니다 (T+N 결제).
    pub fn can_sell_today(&self, market: Market, buy_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        session::can_sell_today(&self.get_rule(market), buy_at, now)
    }
}

impl Default for MarketRuleEngine {
    fn default() -> Self {
        Self::new(MarketConfig::default())
    }
}
