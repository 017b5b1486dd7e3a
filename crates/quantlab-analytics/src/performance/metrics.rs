//! 수익률/위험 지표 계산과 왕복 거래 분석.
//!
//! # 주요 기능
//! - FIFO 매칭으로 체결 목록을 왕복 거래로 짝짓기
//! - 총수익률, 기하 연환산 수익률, 변동성, Sharpe/Sortino/Calmar
//! - 벤치마크 대비 알파/베타/상관계수/정보비율
//!
//! 내부 통계 계산은 f64로 수행하고, 결과는 `sanitize_f64`를 거쳐
//! Decimal로 변환합니다. NaN이나 무한대는 절대 보고서에 실리지 않습니다.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use quantlab_core::{
    sanitize_f64, Price, Quantity, Side, Trade, TradeInfo, TradeStatistics,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::{calculate_drawdown, max_drawdown, EquityPoint};

/// 기본 무위험 수익률 (연 5%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// 연간 거래일 수.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 연환산에 사용하는 1년의 일수.
const DAYS_PER_YEAR: f64 = 365.25;

/// FIFO로 짝지어진 왕복 거래 (매수 lot → 매도).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTrip {
    /// 종목 코드
    pub symbol: String,
    /// 체결 수량
    pub quantity: Quantity,
    /// 진입가
    pub entry_price: Price,
    /// 청산가
    pub exit_price: Price,
    /// 진입 시각
    pub entry_time: DateTime<Utc>,
    /// 청산 시각
    pub exit_time: DateTime<Utc>,
    /// 배분된 수수료 (진입 + 청산)
    pub fees: Decimal,
    /// 실현 손익 (수수료 제외)
    pub pnl: Decimal,
}

impl TradeInfo for RoundTrip {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn pnl(&self) -> Option<Decimal> {
        Some(self.pnl)
    }

    fn fees(&self) -> Decimal {
        self.fees
    }

    fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    fn exit_time(&self) -> Option<DateTime<Utc>> {
        Some(self.exit_time)
    }
}

/// 매수 후 아직 매도되지 않은 lot.
#[derive(Debug, Clone)]
struct OpenLot {
    quantity: Quantity,
    price: Price,
    entry_time: DateTime<Utc>,
    /// 주당 수수료 (lot 분할 시 비례 배분)
    fee_per_share: Decimal,
}

/// 체결 목록을 FIFO 규칙으로 왕복 거래로 짝짓습니다.
///
/// 매도는 가장 오래된 매수 lot부터 소진하며, lot이 부분 소진되면
/// 수수료를 수량 비례로 배분합니다. 청산되지 않고 남은 매수 lot은
/// 결과에 포함되지 않습니다.
pub fn pair_round_trips(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut open_lots: VecDeque<OpenLot> = VecDeque::new();
    let mut round_trips = Vec::new();

    for trade in trades {
        match trade.side {
            Side::Buy => {
                let fee_per_share = if trade.quantity.is_zero() {
                    Decimal::ZERO
                } else {
                    trade.commission / trade.quantity
                };
                open_lots.push_back(OpenLot {
                    quantity: trade.quantity,
                    price: trade.price,
                    entry_time: trade.executed_at,
                    fee_per_share,
                });
            }
            Side::Sell => {
                let sell_fee_per_share = if trade.quantity.is_zero() {
                    Decimal::ZERO
                } else {
                    trade.commission / trade.quantity
                };
                let mut remaining = trade.quantity;

                while remaining > Decimal::ZERO {
                    let Some(mut lot) = open_lots.pop_front() else {
                        // 짝지을 매수 lot이 없으면 남은 매도 수량은 버림
                        break;
                    };

                    let matched = remaining.min(lot.quantity);
                    let pnl = (trade.price - lot.price) * matched;
                    let fees = (lot.fee_per_share + sell_fee_per_share) * matched;

                    round_trips.push(RoundTrip {
                        symbol: trade.symbol.clone(),
                        quantity: matched,
                        entry_price: lot.price,
                        exit_price: trade.price,
                        entry_time: lot.entry_time,
                        exit_time: trade.executed_at,
                        fees,
                        pnl,
                    });

                    remaining -= matched;
                    lot.quantity -= matched;
                    if lot.quantity > Decimal::ZERO {
                        open_lots.push_front(lot);
                    }
                }
            }
        }
    }

    round_trips
}

/// 백테스트 성과 지표.
///
/// 모든 값은 유한한 Decimal입니다. 계산 불가능한 지표는 0으로
/// 보고합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// 총 수익률 (비율, 예: 0.25 = +25%)
    pub total_return: Decimal,
    /// 기하 연환산 수익률 (1일 미만이면 0)
    pub annual_return: Decimal,
    /// 연환산 변동성 (일별 수익률 표준편차 × √252)
    pub volatility: Decimal,
    /// Sharpe 비율 (변동성이 0이면 0)
    pub sharpe_ratio: Decimal,
    /// Sortino 비율 (하방 변동성이 0이면 0)
    pub sortino_ratio: Decimal,
    /// Calmar 비율 (낙폭이 0이면 0)
    pub calmar_ratio: Decimal,
    /// 최대 낙폭 (0 이하)
    pub max_drawdown: Decimal,
    /// 최장 낙폭 지속 일수
    pub max_drawdown_duration_days: i64,
    /// 왕복 거래 수
    pub total_trades: usize,
    /// 승률 (비율, 0~1)
    pub win_rate: Decimal,
    /// Profit Factor (손실이 없으면 유한 상한값)
    pub profit_factor: Decimal,
    /// 평균 수익 거래
    pub avg_win: Decimal,
    /// 평균 손실 거래 (양수)
    pub avg_loss: Decimal,
    /// 최대 수익 거래
    pub largest_win: Decimal,
    /// 최대 손실 거래 (양수)
    pub largest_loss: Decimal,
    /// 평균 보유 일수
    pub avg_holding_days: Decimal,
    /// 벤치마크 대비 알파 (연환산, 벤치마크 없으면 0)
    pub alpha: Decimal,
    /// 벤치마크 대비 베타 (벤치마크 없으면 0)
    pub beta: Decimal,
    /// 벤치마크 상관계수 (벤치마크 없으면 0)
    pub correlation: Decimal,
    /// 정보비율 (벤치마크 없으면 0)
    pub information_ratio: Decimal,
    /// 초기 자본
    pub initial_capital: Decimal,
    /// 최종 자본
    pub final_value: Decimal,
}

/// 성과 지표 계산기.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    /// 무위험 수익률 (연, 비율)
    risk_free_rate: f64,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCalculator {
    /// 기본 무위험 수익률로 계산기 생성.
    pub fn new() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// 무위험 수익률 설정.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// 자본 곡선과 체결 목록에서 성과 지표를 계산합니다.
    ///
    /// `benchmark`는 (타임스탬프, 가격) 시계열이며, 자본 곡선과
    /// 타임스탬프 inner join으로 일별 수익률을 맞춥니다.
    pub fn calculate(
        &self,
        initial_capital: Decimal,
        equity_curve: &[EquityPoint],
        trades: &[Trade],
        benchmark: Option<&[(DateTime<Utc>, Decimal)]>,
    ) -> PerformanceMetrics {
        let final_value = equity_curve
            .last()
            .map(|p| p.portfolio_value)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital.is_zero() {
            Decimal::ZERO
        } else {
            (final_value - initial_capital) / initial_capital
        };

        let timestamps: Vec<DateTime<Utc>> =
            equity_curve.iter().map(|p| p.timestamp).collect();
        let equity: Vec<Decimal> =
            equity_curve.iter().map(|p| p.portfolio_value).collect();

        let daily_returns = daily_returns(&equity);

        let annual_return = self.annual_return(initial_capital, final_value, &timestamps);
        let volatility = annualized_volatility(&daily_returns);
        let sharpe_ratio = if volatility.abs() < f64::EPSILON {
            0.0
        } else {
            (annual_return - self.risk_free_rate) / volatility
        };

        let downside = downside_deviation(&daily_returns);
        let sortino_ratio = if downside.abs() < f64::EPSILON {
            0.0
        } else {
            (annual_return - self.risk_free_rate) / downside
        };

        let dd_curve = calculate_drawdown(&equity);
        let (max_dd, max_dd_days) = max_drawdown(&timestamps, &dd_curve);
        let max_dd_f64 = max_dd.to_f64().unwrap_or(0.0);
        let calmar_ratio = if max_dd_f64.abs() < f64::EPSILON {
            0.0
        } else {
            annual_return / max_dd_f64.abs()
        };

        let round_trips = pair_round_trips(trades);
        let stats = TradeStatistics::from_trades(&round_trips);

        let relative = benchmark
            .map(|series| self.relative_metrics(&timestamps, &daily_returns, series))
            .unwrap_or_default();

        PerformanceMetrics {
            total_return,
            annual_return: sanitize_f64(annual_return),
            volatility: sanitize_f64(volatility),
            sharpe_ratio: sanitize_f64(sharpe_ratio),
            sortino_ratio: sanitize_f64(sortino_ratio),
            calmar_ratio: sanitize_f64(calmar_ratio),
            max_drawdown: max_dd,
            max_drawdown_duration_days: max_dd_days,
            total_trades: stats.total_trades,
            win_rate: stats.win_rate_pct / Decimal::ONE_HUNDRED,
            profit_factor: stats.profit_factor,
            avg_win: stats.avg_win,
            avg_loss: stats.avg_loss,
            largest_win: stats.largest_win,
            largest_loss: stats.largest_loss,
            avg_holding_days: stats.avg_holding_days(),
            alpha: sanitize_f64(relative.alpha),
            beta: sanitize_f64(relative.beta),
            correlation: sanitize_f64(relative.correlation),
            information_ratio: sanitize_f64(relative.information_ratio),
            initial_capital,
            final_value,
        }
    }

    /// 기하 연환산 수익률.
    ///
    /// 경과 기간이 1일 미만이면 연환산이 의미가 없으므로 0을
    /// 반환합니다.
    fn annual_return(
        &self,
        initial_capital: Decimal,
        final_value: Decimal,
        timestamps: &[DateTime<Utc>],
    ) -> f64 {
        let (Some(first), Some(last)) = (timestamps.first(), timestamps.last()) else {
            return 0.0;
        };
        let elapsed_days =
            last.signed_duration_since(*first).num_seconds() as f64 / 86400.0;
        if elapsed_days < 1.0 {
            return 0.0;
        }

        let initial = initial_capital.to_f64().unwrap_or(0.0);
        let final_v = final_value.to_f64().unwrap_or(0.0);
        if initial <= 0.0 || final_v <= 0.0 {
            return 0.0;
        }

        (final_v / initial).powf(DAYS_PER_YEAR / elapsed_days) - 1.0
    }

    /// 벤치마크 대비 지표 (알파/베타/상관계수/정보비율).
    fn relative_metrics(
        &self,
        timestamps: &[DateTime<Utc>],
        strategy_returns: &[f64],
        benchmark: &[(DateTime<Utc>, Decimal)],
    ) -> RelativeMetrics {
        // 벤치마크 일별 수익률을 타임스탬프로 인덱싱
        let mut bench_returns: HashMap<DateTime<Utc>, f64> = HashMap::new();
        for pair in benchmark.windows(2) {
            let prev = pair[0].1.to_f64().unwrap_or(0.0);
            let curr = pair[1].1.to_f64().unwrap_or(0.0);
            if prev > 0.0 {
                bench_returns.insert(pair[1].0, curr / prev - 1.0);
            }
        }

        // inner join: 전략 수익률 i는 timestamps[i + 1]에 대응
        let mut joined_strategy = Vec::new();
        let mut joined_bench = Vec::new();
        for (i, &ret) in strategy_returns.iter().enumerate() {
            let Some(ts) = timestamps.get(i + 1) else {
                break;
            };
            if let Some(&bench_ret) = bench_returns.get(ts) {
                joined_strategy.push(ret);
                joined_bench.push(bench_ret);
            }
        }

        if joined_strategy.len() < 2 {
            return RelativeMetrics::default();
        }

        let mean_s = mean(&joined_strategy);
        let mean_b = mean(&joined_bench);
        let var_b = variance(&joined_bench, mean_b);
        let cov = covariance(&joined_strategy, mean_s, &joined_bench, mean_b);
        let std_s = variance(&joined_strategy, mean_s).sqrt();
        let std_b = var_b.sqrt();

        let beta = if var_b.abs() < f64::EPSILON {
            0.0
        } else {
            cov / var_b
        };
        let alpha = (mean_s - beta * mean_b) * TRADING_DAYS_PER_YEAR;
        let correlation = if std_s < f64::EPSILON || std_b < f64::EPSILON {
            0.0
        } else {
            cov / (std_s * std_b)
        };

        let excess: Vec<f64> = joined_strategy
            .iter()
            .zip(&joined_bench)
            .map(|(s, b)| s - b)
            .collect();
        let mean_excess = mean(&excess);
        let std_excess = variance(&excess, mean_excess).sqrt();
        let information_ratio = if std_excess < f64::EPSILON {
            0.0
        } else {
            mean_excess / std_excess * TRADING_DAYS_PER_YEAR.sqrt()
        };

        RelativeMetrics {
            alpha,
            beta,
            correlation,
            information_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RelativeMetrics {
    alpha: f64,
    beta: f64,
    correlation: f64,
    information_ratio: f64,
}

/// 자본 시계열에서 일별 수익률 계산.
fn daily_returns(equity: &[Decimal]) -> Vec<f64> {
    equity
        .windows(2)
        .filter_map(|pair| {
            let prev = pair[0].to_f64()?;
            let curr = pair[1].to_f64()?;
            if prev > 0.0 {
                Some(curr / prev - 1.0)
            } else {
                None
            }
        })
        .collect()
}

/// 연환산 변동성 (일별 수익률 표준편차 × √252).
fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let m = mean(returns);
    variance(returns, m).sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// 하방 변동성 (0 미만 수익률만, 연환산).
fn downside_deviation(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = returns
        .iter()
        .filter(|&&r| r < 0.0)
        .map(|&r| r * r)
        .sum();
    (sum_sq / returns.len() as f64).sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 모집단 분산.
fn variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn covariance(xs: &[f64], mean_x: f64, ys: &[f64], mean_y: f64) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / xs.len() as f64
}
