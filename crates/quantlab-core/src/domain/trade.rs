//! 체결 기록.
//!
//! 이 모듈은 백테스트 중 발생한 체결을 나타내는 불변 기록을 정의합니다.
//! `Trade`는 생성 이후 절대 수정되지 않습니다.

use crate::domain::Side;
use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 단일 체결 기록 (불변).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// 체결 ID
    pub id: Uuid,
    /// 종목 코드
    pub symbol: String,
    /// 매매 방향
    pub side: Side,
    /// 체결 수량
    pub quantity: Quantity,
    /// 체결 가격 (슬리피지 반영)
    pub price: Price,
    /// 수수료 합계 (위탁 수수료 + 인지세 + 기타 비용)
    pub commission: Decimal,
    /// 슬리피지 비용
    pub slippage_cost: Decimal,
    /// 실현 손익 (매도 체결에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<Decimal>,
    /// 체결 타임스탬프
    pub executed_at: DateTime<Utc>,
    /// 체결 직후 포트폴리오 가치
    pub portfolio_value_after: Decimal,
}

impl Trade {
    /// 새 체결 기록을 생성합니다.
    ///
    /// 체결 ID는 체결 내용(종목/방향/수량/가격/시각)에서 유도한
    /// v5 UUID입니다. 같은 입력으로 실행한 백테스트는 항상 같은
    /// ID를 생성하므로 체결 기록 직렬화 결과도 동일합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        commission: Decimal,
        slippage_cost: Decimal,
        executed_at: DateTime<Utc>,
        portfolio_value_after: Decimal,
    ) -> Self {
        let symbol = symbol.into();
        let id = Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!(
                "{}|{}|{}|{}|{}",
                symbol,
                side,
                quantity,
                price,
                executed_at.to_rfc3339()
            )
            .as_bytes(),
        );
        Self {
            id,
            symbol,
            side,
            quantity,
            price,
            commission,
            slippage_cost,
            realized_pnl: None,
            executed_at,
            portfolio_value_after,
        }
    }

    /// 실현 손익을 설정합니다 (매도 체결용).
    pub fn with_realized_pnl(mut self, pnl: Decimal) -> Self {
        self.realized_pnl = Some(pnl);
        self
    }

    /// 체결의 명목 가치를 반환합니다.
    pub fn notional_value(&self) -> Decimal {
        self.price * self.quantity
    }

    /// 비용을 반영한 순 가치를 반환합니다.
    ///
    /// 매수는 지출(명목 + 수수료), 매도는 수입(명목 - 수수료)입니다.
    pub fn net_value(&self) -> Decimal {
        match self.side {
            Side::Buy => self.notional_value() + self.commission,
            Side::Sell => self.notional_value() - self.commission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn test_trade(side: Side) -> Trade {
        Trade::new(
            "600519",
            side,
            dec!(100),
            dec!(50),
            dec!(5),
            dec!(2.5),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            dec!(100000),
        )
    }

    #[test]
    fn test_trade_notional() {
        let trade = test_trade(Side::Buy);
        assert_eq!(trade.notional_value(), dec!(5000));
    }

    #[test]
    fn test_trade_net_value() {
        assert_eq!(test_trade(Side::Buy).net_value(), dec!(5005));
        assert_eq!(test_trade(Side::Sell).net_value(), dec!(4995));
    }

    #[test]
    fn test_trade_realized_pnl_builder() {
        let trade = test_trade(Side::Sell).with_realized_pnl(dec!(300));
        assert_eq!(trade.realized_pnl, Some(dec!(300)));
    }

    #[test]
    fn test_trade_id_deterministic() {
        // 같은 체결 내용은 항상 같은 ID
        let a = test_trade(Side::Buy);
        let b = test_trade(Side::Buy);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_trade_id_distinct_per_fill() {
        let a = test_trade(Side::Buy);
        let b = test_trade(Side::Sell);
        let c = Trade::new(
            "600519",
            Side::Buy,
            dec!(100),
            dec!(50),
            dec!(5),
            dec!(2.5),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            dec!(100000),
        );

        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }
}
