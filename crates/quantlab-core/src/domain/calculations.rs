//! 손익 및 가치 계산용 순수 함수.
//!
//! 포지션, 엔진, 지표 계산에서 공통으로 사용하는 계산을 한곳에 모았습니다.
//! 모든 함수는 상태가 없으며 입력에 대해 결정적입니다.

use crate::types::{Price, Quantity};
use rust_decimal::Decimal;

/// 명목 가치 = 가격 × 수량.
pub fn notional_value(price: Price, quantity: Quantity) -> Decimal {
    price * quantity
}

/// 실현 손익 = (청산가 - 진입가) × 수량 (롱 포지션 기준).
pub fn realized_pnl(entry_price: Price, exit_price: Price, quantity: Quantity) -> Decimal {
    (exit_price - entry_price) * quantity
}

/// 수익률 = (청산가 - 진입가) / 진입가. 진입가가 0이면 0을 반환합니다.
pub fn return_pct(entry_price: Price, exit_price: Price) -> Decimal {
    if entry_price.is_zero() {
        return Decimal::ZERO;
    }
    (exit_price - entry_price) / entry_price
}

/// 비용 차감 후 순손익 = 실현 손익 - 수수료.
pub fn net_pnl(gross_pnl: Decimal, fees: Decimal) -> Decimal {
    gross_pnl - fees
}

/// 두 매수 구간의 가중 평균 가격.
///
/// 기존 보유분 (기존_평단 × 기존_수량)에 신규 체결을 합산합니다.
/// 총 수량이 0이면 0을 반환합니다.
pub fn weighted_average_price(
    existing_price: Price,
    existing_qty: Quantity,
    new_price: Price,
    new_qty: Quantity,
) -> Price {
    let total_qty = existing_qty + new_qty;
    if total_qty.is_zero() {
        return Decimal::ZERO;
    }
    (existing_price * existing_qty + new_price * new_qty) / total_qty
}
