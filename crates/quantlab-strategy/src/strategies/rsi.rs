//! RSI 역추세 전략.
//!
//! RSI가 과매도 구간에 들어오면 매수, 과매수 구간에 들어가면
//! 매도하는 평균 회귀 전략입니다. 깊은 과매도/과매수에서는
//! 강한 시그널을 냅니다.

use crate::indicators::{closes, rsi};
use crate::{Strategy, StrategyResult};
use quantlab_core::{Bar, Quantity, Signal, SignalKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// RSI 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RsiConfig {
    /// RSI 기간
    #[serde(default = "default_period")]
    pub period: usize,

    /// 과매도 임계값
    #[serde(default = "default_oversold")]
    pub oversold: Decimal,

    /// 과매수 임계값
    #[serde(default = "default_overbought")]
    pub overbought: Decimal,
}

fn default_period() -> usize {
    14
}

fn default_oversold() -> Decimal {
    dec!(30)
}

fn default_overbought() -> Decimal {
    dec!(70)
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            oversold: default_oversold(),
            overbought: default_overbought(),
        }
    }
}

/// RSI 역추세 전략.
pub struct RsiStrategy {
    config: RsiConfig,
}

impl RsiStrategy {
    /// 새 RSI 전략을 생성합니다.
    pub fn new(config: RsiConfig) -> Self {
        Self { config }
    }
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self::new(RsiConfig::default())
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        "RSI Reversal"
    }

    fn description(&self) -> &str {
        "RSI 과매도 매수 / 과매수 매도 평균 회귀 전략"
    }

    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>> {
        let values = closes(history);
        let Some(rsi_value) = rsi(&values, self.config.period) else {
            return Ok(None);
        };

        if rsi_value <= self.config.oversold && position_qty.is_zero() {
            // 과매도 깊이에 비례한 확신도
            let depth = (self.config.oversold - rsi_value) / self.config.oversold;
            let confidence = 0.5 + depth.to_f64().unwrap_or(0.0) * 0.5;
            let kind = if rsi_value <= dec!(20) {
                SignalKind::StrongBuy
            } else {
                SignalKind::Buy
            };
            debug!(rsi = %rsi_value, "과매도 - 매수 신호");
            return Ok(Some(
                Signal::new(kind, confidence).with_reason(format!("RSI 과매도: {:.1}", rsi_value)),
            ));
        }

        if rsi_value >= self.config.overbought && position_qty > Decimal::ZERO {
            let kind = if rsi_value >= dec!(80) {
                SignalKind::StrongSell
            } else {
                SignalKind::Sell
            };
            debug!(rsi = %rsi_value, "과매수 - 매도 신호");
            return Ok(Some(
                Signal::new(kind, 0.7).with_reason(format!("RSI 과매수: {:.1}", rsi_value)),
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn falling_bars(count: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let close = Decimal::from(200 - (i as i64) * 5);
                Bar::new(
                    start + Duration::days(i as i64),
                    close + dec!(1),
                    close + dec!(2),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect()
    }

    fn rising_bars(count: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let close = Decimal::from(100 + (i as i64) * 5);
                Bar::new(
                    start + Duration::days(i as i64),
                    close - dec!(1),
                    close + dec!(1),
                    close - dec!(2),
                    close,
                    dec!(10000),
                )
            })
            .collect()
    }

    #[test]
    fn test_oversold_emits_buy() {
        let mut strategy = RsiStrategy::default();
        let bars = falling_bars(20);

        let signal = strategy
            .generate_signal(&bars, Decimal::ZERO)
            .unwrap()
            .expect("연속 하락이면 과매도 신호가 나와야 한다");
        assert!(signal.kind.is_entry());
        // 전부 하락이면 RSI 0 근처이므로 강력 매수
        assert_eq!(signal.kind, SignalKind::StrongBuy);
    }

    #[test]
    fn test_overbought_emits_sell_only_with_position() {
        let mut strategy = RsiStrategy::default();
        let bars = rising_bars(20);

        // 포지션이 없으면 과매수여도 관망
        let signal = strategy.generate_signal(&bars, Decimal::ZERO).unwrap();
        assert!(signal.is_none());

        // 포지션이 있으면 매도
        let signal = strategy
            .generate_signal(&bars, Decimal::from(100))
            .unwrap()
            .expect("과매수 + 보유 중이면 매도 신호");
        assert!(signal.kind.is_exit());
    }

    #[test]
    fn test_insufficient_history_holds() {
        let mut strategy = RsiStrategy::default();
        let bars = falling_bars(5);
        assert!(strategy
            .generate_signal(&bars, Decimal::ZERO)
            .unwrap()
            .is_none());
    }
}
