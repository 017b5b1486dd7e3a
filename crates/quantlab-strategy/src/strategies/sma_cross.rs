//! 단순 이동평균 크로스오버 전략.
//!
//! 단기 이동평균이 장기 이동평균을 상향 돌파하면 매수,
//! 하향 돌파하면 전량 매도하는 클래식한 추세 추종 전략입니다.
//!
//! # 전략 로직
//! - 골든 크로스 (단기 SMA > 장기 SMA): 매수 신호
//! - 데드 크로스 (단기 SMA < 장기 SMA): 전량 매도 신호

use crate::indicators::{closes, sma};
use crate::{Strategy, StrategyResult};
use quantlab_core::{Bar, Quantity, Signal, SignalKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// SMA 크로스오버 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmaCrossConfig {
    /// 단기 이동평균 기간
    #[serde(default = "default_short_period")]
    pub short_period: usize,

    /// 장기 이동평균 기간
    #[serde(default = "default_long_period")]
    pub long_period: usize,
}

fn default_short_period() -> usize {
    10
}

fn default_long_period() -> usize {
    20
}

impl Default for SmaCrossConfig {
    fn default() -> Self {
        Self {
            short_period: default_short_period(),
            long_period: default_long_period(),
        }
    }
}

/// SMA 크로스오버 전략.
pub struct SmaCrossStrategy {
    config: SmaCrossConfig,
}

impl SmaCrossStrategy {
    /// 새 SMA 크로스오버 전략을 생성합니다.
    pub fn new(config: SmaCrossConfig) -> Self {
        Self { config }
    }

    /// 현재 바 기준 (단기 SMA, 장기 SMA)을 계산합니다.
    fn smas(&self, values: &[Decimal]) -> Option<(Decimal, Decimal)> {
        Some((
            sma(values, self.config.short_period)?,
            sma(values, self.config.long_period)?,
        ))
    }
}

impl Default for SmaCrossStrategy {
    fn default() -> Self {
        Self::new(SmaCrossConfig::default())
    }
}

impl Strategy for SmaCrossStrategy {
    fn name(&self) -> &str {
        "SMA Crossover"
    }

    fn description(&self) -> &str {
        "단기/장기 이동평균 크로스오버 추세 추종 전략"
    }

    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>> {
        // 크로스오버 감지에는 직전 바 기준 값도 필요
        if history.len() < self.config.long_period + 1 {
            return Ok(None);
        }

        let values = closes(history);
        let Some((short_now, long_now)) = self.smas(&values) else {
            return Ok(None);
        };
        let Some((short_prev, long_prev)) = self.smas(&values[..values.len() - 1]) else {
            return Ok(None);
        };

        let golden_cross = short_prev <= long_prev && short_now > long_now;
        let death_cross = short_prev >= long_prev && short_now < long_now;

        if golden_cross && position_qty.is_zero() {
            debug!(short = %short_now, long = %long_now, "골든 크로스 - 매수 신호");
            return Ok(Some(
                Signal::new(SignalKind::Buy, 0.8).with_reason("골든 크로스"),
            ));
        }

        if death_cross && position_qty > Decimal::ZERO {
            debug!(short = %short_now, long = %long_now, "데드 크로스 - 전량 매도 신호");
            return Ok(Some(
                Signal::new(SignalKind::StrongSell, 0.8).with_reason("데드 크로스"),
            ));
        }

        Ok(None)
    }
}
