//! 트레이딩 시그널.
//!
//! 이 모듈은 전략이 바마다 생성하는 시그널 타입을 정의합니다.
//! 시그널은 일시적인 값으로, 생성된 바에서 소비되며 결과에 저장되지 않습니다.

use crate::types::{Percentage, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 시그널 종류 (5단계).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// 강력 매수
    StrongBuy,
    /// 매수
    Buy,
    /// 관망
    Hold,
    /// 매도 (부분 청산)
    Sell,
    /// 강력 매도 (전량 청산)
    StrongSell,
}

impl SignalKind {
    /// 진입 시그널인지 확인합니다.
    pub fn is_entry(&self) -> bool {
        matches!(self, SignalKind::StrongBuy | SignalKind::Buy)
    }

    /// 청산 시그널인지 확인합니다.
    pub fn is_exit(&self) -> bool {
        matches!(self, SignalKind::Sell | SignalKind::StrongSell)
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::StrongBuy => write!(f, "STRONG_BUY"),
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Hold => write!(f, "HOLD"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// 전략이 생성하는 트레이딩 시그널.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// 시그널 ID
    pub id: Uuid,
    /// 시그널 종류
    pub kind: SignalKind,
    /// 확신도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 목표 가격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Price>,
    /// 손절 가격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Price>,
    /// 포지션 비중 (포트폴리오 대비, 미지정 시 엔진 기본값 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_fraction: Option<Percentage>,
    /// 시그널 발생 이유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// 생성 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// 새 시그널을 생성합니다. 확신도는 [0, 1] 범위로 잘립니다.
    pub fn new(kind: SignalKind, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            target_price: None,
            stop_loss: None,
            position_fraction: None,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    /// 관망 시그널을 생성합니다.
    pub fn hold() -> Self {
        Self::new(SignalKind::Hold, 0.0)
    }

    /// 목표 가격을 설정합니다.
    pub fn with_target_price(mut self, price: Price) -> Self {
        self.target_price = Some(price);
        self
    }

    /// 손절 가격을 설정합니다.
    pub fn with_stop_loss(mut self, price: Price) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// 포지션 비중을 설정합니다.
    pub fn with_position_fraction(mut self, fraction: Percentage) -> Self {
        self.position_fraction = Some(fraction);
        self
    }

    /// 시그널 이유를 설정합니다.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_kind_classification() {
        assert!(SignalKind::StrongBuy.is_entry());
        assert!(SignalKind::Buy.is_entry());
        assert!(!SignalKind::Hold.is_entry());
        assert!(SignalKind::Sell.is_exit());
        assert!(SignalKind::StrongSell.is_exit());
        assert!(!SignalKind::Hold.is_exit());
    }

    #[test]
    fn test_confidence_clamped() {
        let signal = Signal::new(SignalKind::Buy, 1.5);
        assert_eq!(signal.confidence, 1.0);

        let signal = Signal::new(SignalKind::Buy, -0.3);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_signal_builder() {
        use rust_decimal_macros::dec;

        let signal = Signal::new(SignalKind::StrongBuy, 0.9)
            .with_position_fraction(dec!(0.5))
            .with_reason("골든 크로스");

        assert_eq!(signal.position_fraction, Some(dec!(0.5)));
        assert_eq!(signal.reason.as_deref(), Some("골든 크로스"));
    }
}
