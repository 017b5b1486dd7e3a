//! MACD 모멘텀 전략.
//!
//! MACD 라인이 시그널 라인을 상향 돌파하면 매수,
//! 하향 돌파하면 전량 매도하는 모멘텀 전략입니다.

use crate::indicators::{closes, macd};
use crate::{Strategy, StrategyResult};
use quantlab_core::{Bar, Quantity, Signal, SignalKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MACD 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MacdConfig {
    /// 단기 EMA 기간
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,

    /// 장기 EMA 기간
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,

    /// 시그널 라인 EMA 기간
    #[serde(default = "default_signal_period")]
    pub signal_period: usize,
}

fn default_fast_period() -> usize {
    12
}

fn default_slow_period() -> usize {
    26
}

fn default_signal_period() -> usize {
    9
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            signal_period: default_signal_period(),
        }
    }
}

/// MACD 모멘텀 전략.
pub struct MacdStrategy {
    config: MacdConfig,
}

impl MacdStrategy {
    /// 새 MACD 전략을 생성합니다.
    pub fn new(config: MacdConfig) -> Self {
        Self { config }
    }

    fn histogram(&self, values: &[Decimal]) -> Option<Decimal> {
        macd(
            values,
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        )
        .map(|(_, _, hist)| hist)
    }
}

impl Default for MacdStrategy {
    fn default() -> Self {
        Self::new(MacdConfig::default())
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> &str {
        "MACD Momentum"
    }

    fn description(&self) -> &str {
        "MACD 라인과 시그널 라인의 크로스오버 모멘텀 전략"
    }

    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>> {
        let values = closes(history);

        let Some(hist_now) = self.histogram(&values) else {
            return Ok(None);
        };
        let Some(hist_prev) = self.histogram(&values[..values.len() - 1]) else {
            return Ok(None);
        };

        // 히스토그램의 부호 전환이 크로스오버
        let bullish_cross = hist_prev <= Decimal::ZERO && hist_now > Decimal::ZERO;
        let bearish_cross = hist_prev >= Decimal::ZERO && hist_now < Decimal::ZERO;

        if bullish_cross && position_qty.is_zero() {
            debug!(histogram = %hist_now, "MACD 상향 돌파 - 매수 신호");
            return Ok(Some(
                Signal::new(SignalKind::Buy, 0.7).with_reason("MACD 상향 돌파"),
            ));
        }

        if bearish_cross && position_qty > Decimal::ZERO {
            debug!(histogram = %hist_now, "MACD 하향 돌파 - 전량 매도 신호");
            return Ok(Some(
                Signal::new(SignalKind::StrongSell, 0.7).with_reason("MACD 하향 돌파"),
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

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
    fn test_bullish_cross_after_downtrend_reversal() {
        let mut strategy = MacdStrategy::new(MacdConfig {
            fast_period: 3,
            slow_period: 6,
            signal_period: 3,
        });

        // 하락 후 강한 반등
        let mut closes: Vec<i64> = (0..15).map(|i| 200 - i * 5).collect();
        closes.extend((0..15).map(|i| 125 + i * 8));
        let bars = bars_from_closes(&closes);

        let mut saw_buy = false;
        for i in 10..=bars.len() {
            if let Some(signal) = strategy
                .generate_signal(&bars[..i], Decimal::ZERO)
                .unwrap()
            {
                if signal.kind == SignalKind::Buy {
                    saw_buy = true;
                    break;
                }
            }
        }
        assert!(saw_buy);
    }

    #[test]
    fn test_flat_series_holds() {
        let mut strategy = MacdStrategy::default();
        let bars = bars_from_closes(&[100; 60]);
        let signal = strategy.generate_signal(&bars, Decimal::ZERO).unwrap();
        assert!(signal.is_none());
    }
}
