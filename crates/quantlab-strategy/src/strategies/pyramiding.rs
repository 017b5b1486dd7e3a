//! 피라미딩 (분할 매수) 전략.
//!
//! 사이클 단위로 포지션을 관리하는 유일한 상태 보유 전략입니다.
//! 상승 추세에서 첫 진입 후, 직전 매수가 대비 일정 비율 하락할 때마다
//! 추가 매수하고, 평균 진입가 대비 목표 수익률에 도달하면 전량 청산하며
//! 사이클을 종료합니다.
//!
//! 매수 시그널은 다음 호출에서 포지션 수량 증가로 체결이 확인된 뒤에야
//! 사이클 통계에 반영됩니다. 엔진이 주문을 건너뛴 경우 평균 매수가와
//! 매수 횟수가 실제 체결과 어긋나지 않습니다.

use crate::indicators::{closes, sma};
use crate::{Strategy, StrategyResult};
use quantlab_core::{Bar, Price, Quantity, Signal, SignalKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 피라미딩 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PyramidingConfig {
    /// 추세 판단용 이동평균 기간
    #[serde(default = "default_trend_period")]
    pub trend_period: usize,

    /// 사이클당 최대 추가 매수 횟수
    #[serde(default = "default_max_add_ons")]
    pub max_add_ons: u32,

    /// 추가 매수 트리거 하락률 (직전 매수가 대비)
    #[serde(default = "default_add_on_drop")]
    pub add_on_drop: Decimal,

    /// 사이클 종료 목표 수익률 (가중 평균 매수가 대비)
    #[serde(default = "default_take_profit")]
    pub take_profit: Decimal,

    /// 1회 매수 비중 (포트폴리오 대비)
    #[serde(default = "default_entry_fraction")]
    pub entry_fraction: Decimal,
}

fn default_trend_period() -> usize {
    20
}

fn default_max_add_ons() -> u32 {
    3
}

fn default_add_on_drop() -> Decimal {
    dec!(0.03)
}

fn default_take_profit() -> Decimal {
    dec!(0.08)
}

fn default_entry_fraction() -> Decimal {
    dec!(0.25)
}

impl Default for PyramidingConfig {
    fn default() -> Self {
        Self {
            trend_period: default_trend_period(),
            max_add_ons: default_max_add_ons(),
            add_on_drop: default_add_on_drop(),
            take_profit: default_take_profit(),
            entry_fraction: default_entry_fraction(),
        }
    }
}

/// 진행 중인 매수 사이클.
#[derive(Debug, Clone)]
struct Cycle {
    /// 사이클 내 매수 횟수 (첫 진입 포함)
    entries: u32,
    /// 직전 매수 가격
    last_entry_price: Price,
    /// 수량 가중 평균 매수가 계산용 합계
    total_cost: Decimal,
    total_weight: Decimal,
}

impl Cycle {
    fn start(price: Price) -> Self {
        Self {
            entries: 1,
            last_entry_price: price,
            total_cost: price,
            total_weight: Decimal::ONE,
        }
    }

    fn add(&mut self, price: Price) {
        self.entries += 1;
        self.last_entry_price = price;
        self.total_cost += price;
        self.total_weight += Decimal::ONE;
    }

    fn avg_entry_price(&self) -> Price {
        self.total_cost / self.total_weight
    }
}

/// 피라미딩 전략.
pub struct PyramidingStrategy {
    config: PyramidingConfig,
    cycle: Option<Cycle>,
    /// 매수 시그널은 냈지만 아직 체결 확인이 안 된 가격
    pending_entry: Option<Price>,
    last_position_qty: Quantity,
}

impl PyramidingStrategy {
    /// 새 피라미딩 전략을 생성합니다.
    pub fn new(config: PyramidingConfig) -> Self {
        Self {
            config,
            cycle: None,
            pending_entry: None,
            last_position_qty: Decimal::ZERO,
        }
    }
}

impl Default for PyramidingStrategy {
    fn default() -> Self {
        Self::new(PyramidingConfig::default())
    }
}

impl Strategy for PyramidingStrategy {
    fn name(&self) -> &str {
        "Pyramiding"
    }

    fn description(&self) -> &str {
        "하락 시 분할 매수, 목표 수익률 도달 시 전량 청산하는 사이클 전략"
    }

    fn initialize(&mut self, _history: &[Bar]) -> StrategyResult<()> {
        self.cycle = None;
        self.pending_entry = None;
        self.last_position_qty = Decimal::ZERO;
        Ok(())
    }

    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>> {
        let values = closes(history);
        let Some(trend) = sma(&values, self.config.trend_period) else {
            return Ok(None);
        };
        let close = history[history.len() - 1].close;

        // 직전 매수 시그널은 포지션 수량이 실제로 늘었을 때만 사이클에 반영.
        // 엔진이 주문을 건너뛰면 (현금 부족, 가격 제한 등) 보류 진입은 폐기
        if let Some(entry) = self.pending_entry.take() {
            if position_qty > self.last_position_qty {
                match &mut self.cycle {
                    Some(cycle) => cycle.add(entry),
                    None => self.cycle = Some(Cycle::start(entry)),
                }
            }
        }
        self.last_position_qty = position_qty;

        // 포지션이 비었으면 사이클도 리셋
        if position_qty.is_zero() {
            self.cycle = None;
        }

        let Some(cycle) = &self.cycle else {
            // 추세 위에 있을 때만 새 사이클 시작
            if close > trend {
                debug!(close = %close, trend = %trend, "사이클 시작 - 첫 매수");
                self.pending_entry = Some(close);
                return Ok(Some(
                    Signal::new(SignalKind::Buy, 0.7)
                        .with_position_fraction(self.config.entry_fraction)
                        .with_reason("피라미딩 사이클 시작"),
                ));
            }
            return Ok(None);
        };

        let avg_entry = cycle.avg_entry_price();
        let trigger = cycle.last_entry_price * (Decimal::ONE - self.config.add_on_drop);
        let entries = cycle.entries;

        // 목표 수익률 도달 시 전량 청산 후 사이클 종료
        if close >= avg_entry * (Decimal::ONE + self.config.take_profit) {
            debug!(close = %close, avg_entry = %avg_entry, "목표 도달 - 사이클 종료");
            self.cycle = None;
            return Ok(Some(
                Signal::new(SignalKind::StrongSell, 0.9).with_reason("피라미딩 목표 수익률 도달"),
            ));
        }

        // 직전 매수가 대비 하락 시 추가 매수
        if close <= trigger && entries <= self.config.max_add_ons {
            debug!(close = %close, trigger = %trigger, entries, "추가 매수");
            self.pending_entry = Some(close);
            return Ok(Some(
                Signal::new(SignalKind::Buy, 0.6)
                    .with_position_fraction(self.config.entry_fraction)
                    .with_reason("피라미딩 추가 매수"),
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

    fn short_config() -> PyramidingConfig {
        PyramidingConfig {
            trend_period: 5,
            max_add_ons: 2,
            add_on_drop: dec!(0.03),
            take_profit: dec!(0.05),
            entry_fraction: dec!(0.25),
        }
    }

    #[test]
    fn test_cycle_start_above_trend() {
        let mut strategy = PyramidingStrategy::new(short_config());
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);

        let signal = strategy
            .generate_signal(&bars, Decimal::ZERO)
            .unwrap()
            .expect("추세 위면 사이클 시작");
        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.position_fraction, Some(dec!(0.25)));
    }

    #[test]
    fn test_add_on_after_drop() {
        let mut strategy = PyramidingStrategy::new(short_config());

        // 110에서 사이클 시작
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);
        strategy.generate_signal(&bars, Decimal::ZERO).unwrap();

        // 3% 이상 하락하면 추가 매수
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106]);
        let signal = strategy
            .generate_signal(&bars, dec!(100))
            .unwrap()
            .expect("하락 시 추가 매수");
        assert_eq!(signal.kind, SignalKind::Buy);
    }

    #[test]
    fn test_take_profit_closes_cycle() {
        let mut strategy = PyramidingStrategy::new(short_config());

        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);
        strategy.generate_signal(&bars, Decimal::ZERO).unwrap();

        // 평균 매수가 110 대비 +5% 이상이면 전량 청산
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 116]);
        let signal = strategy
            .generate_signal(&bars, dec!(100))
            .unwrap()
            .expect("목표 도달 시 청산");
        assert_eq!(signal.kind, SignalKind::StrongSell);

        // 사이클이 리셋되었으므로 추세 위에서 다시 시작 가능
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 116, 120]);
        let signal = strategy.generate_signal(&bars, Decimal::ZERO).unwrap();
        assert!(signal.is_some());
    }

    #[test]
    fn test_add_on_capped() {
        let mut strategy = PyramidingStrategy::new(PyramidingConfig {
            max_add_ons: 1,
            ..short_config()
        });

        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);
        strategy.generate_signal(&bars, Decimal::ZERO).unwrap();

        // 첫 추가 매수는 허용
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106]);
        assert!(strategy.generate_signal(&bars, dec!(100)).unwrap().is_some());

        // 한도 도달 후에는 더 사지 않는다
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106, 102]);
        assert!(strategy.generate_signal(&bars, dec!(200)).unwrap().is_none());
    }

    #[test]
    fn test_unfilled_add_on_keeps_avg_entry() {
        let mut strategy = PyramidingStrategy::new(short_config());

        // 110에서 사이클 시작
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);
        strategy.generate_signal(&bars, Decimal::ZERO).unwrap();

        // 106에서 추가 매수 시그널, 체결은 아직 미확인
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106]);
        let signal = strategy.generate_signal(&bars, dec!(100)).unwrap();
        assert_eq!(signal.unwrap().kind, SignalKind::Buy);

        // 수량이 그대로면 추가 매수는 체결되지 않은 것. 평균 매수가는 110 유지이므로
        // +5% 목표는 115.5이고, 114에서는 청산하지 않는다
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106, 114]);
        assert!(strategy.generate_signal(&bars, dec!(100)).unwrap().is_none());

        // 116에서 비로소 목표 도달
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106, 114, 116]);
        let signal = strategy
            .generate_signal(&bars, dec!(100))
            .unwrap()
            .expect("평균 매수가 110 기준으로 목표 도달");
        assert_eq!(signal.kind, SignalKind::StrongSell);
    }

    #[test]
    fn test_unfilled_add_on_does_not_consume_cap() {
        let mut strategy = PyramidingStrategy::new(PyramidingConfig {
            max_add_ons: 1,
            ..short_config()
        });

        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110]);
        strategy.generate_signal(&bars, Decimal::ZERO).unwrap();

        // 추가 매수 시그널이 나갔지만 엔진이 주문을 건너뛴 상황
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106]);
        assert!(strategy.generate_signal(&bars, dec!(100)).unwrap().is_some());

        // 수량이 그대로이므로 한도를 소모하지 않았고, 같은 조건에서 재시도된다
        let bars = bars_from_closes(&[100, 100, 100, 100, 100, 110, 106, 106]);
        let signal = strategy
            .generate_signal(&bars, dec!(100))
            .unwrap()
            .expect("미체결 추가 매수는 재시도 가능");
        assert_eq!(signal.kind, SignalKind::Buy);
    }
}
