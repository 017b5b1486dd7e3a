//! 볼린저 밴드 평균 회귀 전략.
//!
//! 종가가 하단 밴드를 이탈하면 매수, 상단 밴드를 이탈하면
//! 매도하는 평균 회귀 전략입니다.

use crate::indicators::{closes, sma, stddev};
use crate::{Strategy, StrategyResult};
use quantlab_core::{Bar, Quantity, Signal, SignalKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 볼린저 밴드 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BollingerConfig {
    /// 이동평균/표준편차 기간
    #[serde(default = "default_period")]
    pub period: usize,

    /// 밴드 폭 (표준편차 배수)
    #[serde(default = "default_band_width")]
    pub band_width: Decimal,
}

fn default_period() -> usize {
    20
}

fn default_band_width() -> Decimal {
    dec!(2)
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            band_width: default_band_width(),
        }
    }
}

/// 볼린저 밴드 평균 회귀 전략.
pub struct BollingerStrategy {
    config: BollingerConfig,
}

impl BollingerStrategy {
    /// 새 볼린저 밴드 전략을 생성합니다.
    pub fn new(config: BollingerConfig) -> Self {
        Self { config }
    }
}

impl Default for BollingerStrategy {
    fn default() -> Self {
        Self::new(BollingerConfig::default())
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &str {
        "Bollinger Reversion"
    }

    fn description(&self) -> &str {
        "볼린저 밴드 이탈 시 평균 회귀를 노리는 전략"
    }

    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>> {
        let values = closes(history);
        let (Some(mid), Some(sd)) = (
            sma(&values, self.config.period),
            stddev(&values, self.config.period),
        ) else {
            return Ok(None);
        };

        // 변동성이 전혀 없으면 밴드가 무의미하다
        if sd.is_zero() {
            return Ok(None);
        }

        let upper = mid + sd * self.config.band_width;
        let lower = mid - sd * self.config.band_width;
        let close = history[history.len() - 1].close;

        if close < lower && position_qty.is_zero() {
            debug!(close = %close, lower = %lower, "하단 밴드 이탈 - 매수 신호");
            return Ok(Some(
                Signal::new(SignalKind::Buy, 0.6).with_reason("볼린저 하단 이탈"),
            ));
        }

        if close > upper && position_qty > Decimal::ZERO {
            debug!(close = %close, upper = %upper, "상단 밴드 이탈 - 매도 신호");
            return Ok(Some(
                Signal::new(SignalKind::Sell, 0.6).with_reason("볼린저 상단 이탈"),
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from_closes(closes: &[i64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let close = Decimal::from(*c);
                Bar::new(
                    start + Duration::days(i as i64),
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect()
    }

    #[test]
    fn test_lower_band_breach_emits_buy() {
        let mut strategy = BollingerStrategy::new(BollingerConfig {
            period: 10,
            band_width: dec!(2),
        });

        // 좁은 박스권 후 급락
        let mut closes = vec![100, 101, 99, 100, 101, 99, 100, 101, 99, 100];
        closes.push(80);
        let bars = bars_from_closes(&closes);

        let signal = strategy
            .generate_signal(&bars, Decimal::ZERO)
            .unwrap()
            .expect("급락이면 하단 이탈 매수 신호");
        assert_eq!(signal.kind, SignalKind::Buy);
    }

    #[test]
    fn test_flat_series_holds() {
        let mut strategy = BollingerStrategy::default();
        let bars = bars_from_closes(&[100; 30]);
        // 표준편차 0이면 신호 없음
        assert!(strategy
            .generate_signal(&bars, Decimal::ZERO)
            .unwrap()
            .is_none());
    }
}
