//! 거래 비용 계산.
//!
//! 시장별 수수료 규칙을 명목 가치에 적용하여 비용 내역을 산출합니다.
//! 계산은 결정적이며, 명목 가치에 대해 단조 비감소입니다.

use crate::rules::{MarketRule, StampDutySide};
use quantlab_core::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 단일 체결의 비용 내역.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// 위탁 수수료 (최소 수수료 반영)
    pub commission: Decimal,
    /// 인지세
    pub stamp_duty: Decimal,
    /// 거래 징수금 (홍콩)
    pub transaction_levy: Decimal,
    /// 거래소 거래비 (홍콩)
    pub trading_fee: Decimal,
    /// SEC 수수료 (미국, 매도만)
    pub sec_fee: Decimal,
}

impl FeeBreakdown {
    /// 총 비용을 반환합니다.
    pub fn total(&self) -> Decimal {
        self.commission + self.stamp_duty + self.transaction_levy + self.trading_fee + self.sec_fee
    }
}

/// 명목 가치에 대한 비용 내역을 계산합니다.
///
/// 명목 가치가 0 이하이면 모든 항목이 0인 내역을 반환합니다.
pub fn calculate_fees(rule: &MarketRule, side: Side, notional: Decimal) -> FeeBreakdown {
    if notional <= Decimal::ZERO {
        return FeeBreakdown::default();
    }

    let mut fees = FeeBreakdown {
        commission: (notional * rule.commission_rate).max(rule.min_commission),
        ..Default::default()
    };

    let duty_applies = match rule.stamp_duty_side {
        StampDutySide::None => false,
        StampDutySide::SellOnly => side == Side::Sell,
        StampDutySide::Both => true,
    };
    if duty_applies {
        fees.stamp_duty = notional * rule.stamp_duty_rate;
    }

    fees.transaction_levy = notional * rule.transaction_levy_rate;
    fees.trading_fee = notional * rule.trading_fee_rate;

    if side == Side::Sell {
        fees.sec_fee = notional * rule.sec_fee_rate;
    }

    fees
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quantlab_core::Market;
    use rust_decimal_macros::dec;

    #[test]
    fn test_china_a_buy_fees() {
        let rule = MarketRule::for_market(Market::ChinaA);
        let fees = calculate_fees(&rule, Side::Buy, dec!(100000));

        // 위탁 수수료 0.03% = 30, 매수에는 인지세 없음
        assert_eq!(fees.commission, dec!(30));
        assert_eq!(fees.stamp_duty, Decimal::ZERO);
        assert_eq!(fees.total(), dec!(30));
    }

    #[test]
    fn test_china_a_sell_fees() {
        let rule = MarketRule::for_market(Market::ChinaA);
        let fees = calculate_fees(&rule, Side::Sell, dec!(100000));

        // 매도에는 인지세 0.1% = 100 추가
        assert_eq!(fees.commission, dec!(30));
        assert_eq!(fees.stamp_duty, dec!(100));
        assert_eq!(fees.total(), dec!(130));
    }

    #[test]
    fn test_min_commission_floor() {
        let rule = MarketRule::for_market(Market::ChinaA);
        // 소액 거래 수수료는 최소 수수료까지 올림
        let fees = calculate_fees(&rule, Side::Buy, dec!(1000));
        assert_eq!(fees.commission, dec!(5));
    }

    #[test]
    fn test_hong_kong_duty_both_sides() {
        let rule = MarketRule::for_market(Market::HongKong);
        let buy = calculate_fees(&rule, Side::Buy, dec!(100000));
        let sell = calculate_fees(&rule, Side::Sell, dec!(100000));

        assert_eq!(buy.stamp_duty, dec!(100));
        assert_eq!(sell.stamp_duty, dec!(100));
        assert!(buy.transaction_levy > Decimal::ZERO);
        assert!(buy.trading_fee > Decimal::ZERO);
    }

    #[test]
    fn test_us_sec_fee_sells_only() {
        let rule = MarketRule::for_market(Market::UnitedStates);
        let buy = calculate_fees(&rule, Side::Buy, dec!(100000));
        let sell = calculate_fees(&rule, Side::Sell, dec!(100000));

        assert_eq!(buy.sec_fee, Decimal::ZERO);
        assert!(sell.sec_fee > Decimal::ZERO);
        assert_eq!(buy.total(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_notional() {
        let rule = MarketRule::for_market(Market::ChinaA);
        let fees = calculate_fees(&rule, Side::Buy, Decimal::ZERO);
        assert_eq!(fees.total(), Decimal::ZERO);
    }

    proptest! {
        // 총 비용은 명목 가치에 대해 단조 비감소
        #[test]
        fn prop_fees_monotone_in_notional(a in 1u64..10_000_000, b in 1u64..10_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for market in [Market::ChinaA, Market::HongKong, Market::UnitedStates] {
                let rule = MarketRule::for_market(market);
                for side in [Side::Buy, Side::Sell] {
                    let f_lo = calculate_fees(&rule, side, Decimal::from(lo)).total();
                    let f_hi = calculate_fees(&rule, side, Decimal::from(hi)).total();
                    prop_assert!(f_lo <= f_hi);
                }
            }
        }

        // 동일 입력은 항상 동일 출력 (결정성)
        #[test]
        fn prop_fees_deterministic(n in 1u64..10_000_000) {
            let rule = MarketRule::for_market(Market::ChinaA);
            let first = calculate_fees(&rule, Side::Sell, Decimal::from(n)).total();
            let second = calculate_fees(&rule, Side::Sell, Decimal::from(n)).total();
            prop_assert_eq!(first, second);
        }
    }
}
