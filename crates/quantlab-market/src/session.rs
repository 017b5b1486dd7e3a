//! 주문 검증 규칙 (수량, 가격제한폭, 결제 주기).

use crate::rules::MarketRule;
use chrono::{DateTime, Utc};
use quantlab_core::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 주문이 시장 규칙을 위반했을 때의 사유.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    /// 수량이 0 이하
    #[error("수량은 양수여야 합니다: {0}")]
    NonPositiveQuantity(Quantity),

    /// 수량이 정수가 아님
    #[error("수량은 정수여야 합니다: {0}")]
    FractionalQuantity(Quantity),

    /// 거래 단위 배수가 아님
    #[error("수량 {quantity}은(는) 거래 단위 {lot_size}의 배수가 아닙니다")]
    NotLotMultiple {
        /// 주문 수량
        quantity: Quantity,
        /// 거래 단위
        lot_size: u32,
    },

    /// 가격제한폭 이탈
    #[error("가격 {price}이(가) 가격제한폭 [{lower}, {upper}]을 벗어났습니다")]
    PriceOutOfBand {
        /// 주문 가격
        price: Price,
        /// 하한가
        lower: Price,
        /// 상한가
        upper: Price,
    },
}

/// 가격제한폭 밴드.
///
/// 상·하한이 없는 시장(홍콩/미국)은 언제나 유효합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    /// 하한가 (제한 없으면 None)
    pub lower: Option<Price>,
    /// 상한가 (제한 없으면 None)
    pub upper: Option<Price>,
}

impl PriceBand {
    /// 제한 없는 밴드를 생성합니다.
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// 가격이 밴드 안에 있는지 확인합니다.
    pub fn contains(&self, price: Price) -> bool {
        if let Some(lower) = self.lower {
            if price < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper {
            if price > upper {
                return false;
            }
        }
        true
    }
}

/// 주문 수량을 검증합니다.
///
/// 모든 시장에서 양수·정수여야 하며, 거래 단위 배수 강제 시장
/// (중국 A주)에서는 lot의 배수여야 합니다.
pub fn validate_quantity(rule: &MarketRule, quantity: Quantity) -> Result<(), RuleViolation> {
    if quantity <= Decimal::ZERO {
        return Err(RuleViolation::NonPositiveQuantity(quantity));
    }
    if !quantity.fract().is_zero() {
        return Err(RuleViolation::FractionalQuantity(quantity));
    }
    if rule.lot_multiple_required {
        let lot = rule.lot_size_decimal();
        if !(quantity % lot).is_zero() {
            return Err(RuleViolation::NotLotMultiple {
                quantity,
                lot_size: rule.lot_size,
            });
        }
    }
    Ok(())
}

/// 전일 종가 기준 가격제한폭 밴드를 계산합니다.
///
/// 전일 종가가 0 이하이면 (상장 첫날 등) 제한을 적용하지 않습니다.
pub fn price_band(rule: &MarketRule, prev_close: Price, code: &str) -> PriceBand {
    if prev_close <= Decimal::ZERO {
        return PriceBand::unbounded();
    }

    match rule.price_limit_for(code) {
        Some(limit) => PriceBand {
            lower: Some(prev_close * (Decimal::ONE - limit)),
            upper: Some(prev_close * (Decimal::ONE + limit)),
        },
        None => PriceBand::unbounded(),
    }
}

/// 가격이 가격제한폭 안에 있는지 검증합니다.
pub fn check_price_limit(
    rule: &MarketRule,
    price: Price,
    prev_close: Price,
    code: &str,
) -> Result<PriceBand, RuleViolation> {
    let band = price_band(rule, prev_close, code);
    if !band.contains(price) {
        return Err(RuleViolation::PriceOutOfBand {
            price,
            lower: band.lower.unwrap_or(Decimal::ZERO),
            upper: band.upper.unwrap_or(Decimal::MAX),
        });
    }
    Ok(band)
}

/// 매수분을 오늘 매도할 수 있는지 확인합니다 (T+N 결제).
///
/// 결제 주기가 0이면 (T+0) 항상 가능합니다. T+1은 시각이 아니라
/// 달력 날짜 기준으로 하루 이상 경과해야 합니다.
pub fn can_sell_today(rule: &MarketRule, buy_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if rule.settlement_days == 0 {
        return true;
    }
    let elapsed_days = now
        .date_naive()
        .signed_duration_since(buy_at.date_naive())
        .num_days();
    elapsed_days >= rule.settlement_days as i64
}
