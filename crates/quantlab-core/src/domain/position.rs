//! 포지션 추적 및 관리.
//!
//! 이 모듈은 백테스트 중의 단일 종목 보유 상태를 정의합니다.
//! 공매도는 지원하지 않으므로 보유 수량은 항상 0 이상입니다.

use crate::error::{QuantError, QuantResult};
use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 단일 종목의 보유 상태.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// 종목 코드
    pub symbol: String,
    /// 현재 보유 수량 (거래 단위 정렬, 항상 0 이상)
    pub quantity: Quantity,
    /// 평균 진입 가격 (가중 평균)
    pub avg_entry_price: Price,
    /// 실현 손익 누계
    pub realized_pnl: Decimal,
    /// 최초 진입 타임스탬프 (보유 수량이 0이면 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    /// 마지막 매수 타임스탬프 (T+1 결제 확인용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_buy_at: Option<DateTime<Utc>>,
}

impl Position {
    /// 빈 포지션을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            avg_entry_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            opened_at: None,
            last_buy_at: None,
        }
    }

    /// 포지션이 오픈 상태인지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// 포지션에 추가합니다 (가중 평균 진입가 갱신).
    pub fn add(&mut self, quantity: Quantity, price: Price, at: DateTime<Utc>) -> QuantResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(QuantError::InvalidInput(
                "매수 수량은 양수여야 합니다".to_string(),
            ));
        }

        let total_cost = (self.avg_entry_price * self.quantity) + (price * quantity);
        self.quantity += quantity;
        self.avg_entry_price = total_cost / self.quantity;
        if self.opened_at.is_none() {
            self.opened_at = Some(at);
        }
        self.last_buy_at = Some(at);
        Ok(())
    }

    /// 포지션을 줄이고 실현 손익을 반환합니다.
    ///
    /// 보유 수량을 초과하는 청산은 에러입니다 (공매도 불가).
    pub fn reduce(&mut self, quantity: Quantity, price: Price) -> QuantResult<Decimal> {
        if quantity <= Decimal::ZERO {
            return Err(QuantError::InvalidInput(
                "매도 수량은 양수여야 합니다".to_string(),
            ));
        }
        if quantity > self.quantity {
            return Err(QuantError::InvalidInput(format!(
                "매도 수량({})이 보유 수량({})을 초과합니다",
                quantity, self.quantity
            )));
        }

        let pnl = (price - self.avg_entry_price) * quantity;
        self.quantity -= quantity;
        self.realized_pnl += pnl;

        if self.quantity.is_zero() {
            self.avg_entry_price = Decimal::ZERO;
            self.opened_at = None;
            self.last_buy_at = None;
        }
        Ok(pnl)
    }

    /// 현재 가격 기준 포지션의 명목 가치를 반환합니다.
    pub fn notional_value(&self, price: Price) -> Decimal {
        price * self.quantity
    }

    /// 현재 가격 기준 미실현 손익을 반환합니다.
    pub fn unrealized_pnl(&self, price: Price) -> Decimal {
        (price - self.avg_entry_price) * self.quantity
    }
}
