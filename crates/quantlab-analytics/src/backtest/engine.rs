//! 단일 종목 바 단위 백테스트 엔진.
//!
//! # 주요 기능
//! - 예열 구간 이후 바마다 전략을 호출하고 종가 기준으로 체결
//! - 시장 규칙 적용 (거래 단위, 가격제한폭, T+N 결제, 비용)
//! - 매수 불가 시 현금 한도로 축소 후 재시도, 그래도 안 되면 스킵
//! - 바마다 자본 샘플 기록, 종료 후 성과 보고서 생성
//!
//! 엔진은 결정적입니다: 같은 설정, 같은 전략, 같은 바 시계열은
//! 항상 같은 보고서를 만듭니다. 한 번 실행한 엔진은 재사용할 수
//! 없습니다.

use chrono::{DateTime, Utc};
use quantlab_core::{
    backtest_span, sanitize_f64, Bar, Market, MarketConfig, Position, Price, QuantError,
    Side, Signal, SignalKind, Trade, TradeStatistics,
};
use quantlab_market::{MarketRule, MarketRuleEngine};
use quantlab_strategy::{Strategy, StrategyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::performance::{pair_round_trips, MetricsCalculator, PerformanceMetrics};
use crate::portfolio::{
    calculate_drawdown, monthly_returns, DrawdownPoint, EquityPoint, MonthlyReturn,
};

use super::validation::validate_input;

/// 백테스트 오류.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    /// 설정 오류
    #[error("설정 오류: {0}")]
    InvalidConfig(String),

    /// 입력 데이터 오류
    #[error("데이터 오류: {0}")]
    InvalidData(String),

    /// 전략 오류
    #[error("전략 오류: {0}")]
    Strategy(#[from] StrategyError),

    /// 엔진 상태 오류 (예: 완료된 엔진 재실행)
    #[error("상태 오류: {0}")]
    InvalidState(String),

    /// 내부 오류
    #[error("내부 오류: {0}")]
    Internal(#[from] QuantError),
}

/// 백테스트 Result 타입.
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 백테스트 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// 종목 코드
    pub symbol: String,
    /// 초기 자본
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    /// 슬리피지 비율 (매수는 가산, 매도는 차감)
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: Decimal,
    /// 수수료율 오버라이드 (None이면 시장 규칙의 수수료 체계 적용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Decimal>,
    /// 최대 포지션 비율 (시그널에 비율이 없을 때 사용)
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// 예열 바 수 (이 구간에서는 거래하지 않음)
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,
    /// 매수 축소 시 사용할 현금 한도 비율
    #[serde(default = "default_cash_buffer_ratio")]
    pub cash_buffer_ratio: Decimal,
    /// Sell 시그널의 부분 청산 비율
    #[serde(default = "default_partial_exit_ratio")]
    pub partial_exit_ratio: Decimal,
    /// 시작일 (없으면 전체 구간)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// 종료일 (없으면 전체 구간)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// 시장 설정 (판별 실패 시 폴백 시장)
    #[serde(default)]
    pub market: MarketConfig,
    /// 무위험 수익률 (연, 비율)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

fn default_initial_capital() -> Decimal {
    dec!(100000)
}

fn default_slippage_rate() -> Decimal {
    dec!(0.0005)
}

fn default_max_position_size() -> Decimal {
    dec!(0.95)
}

fn default_warmup_bars() -> usize {
    30
}

fn default_cash_buffer_ratio() -> Decimal {
    dec!(0.98)
}

fn default_partial_exit_ratio() -> Decimal {
    dec!(0.5)
}

fn default_risk_free_rate() -> f64 {
    crate::performance::DEFAULT_RISK_FREE_RATE
}

impl BacktestConfig {
    /// 기본값으로 설정을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            initial_capital: default_initial_capital(),
            slippage_rate: default_slippage_rate(),
            commission_rate: None,
            max_position_size: default_max_position_size(),
            warmup_bars: default_warmup_bars(),
            cash_buffer_ratio: default_cash_buffer_ratio(),
            partial_exit_ratio: default_partial_exit_ratio(),
            start_date: None,
            end_date: None,
            market: MarketConfig::default(),
            risk_free_rate: default_risk_free_rate(),
        }
    }

    /// 초기 자본 설정.
    pub fn with_initial_capital(mut self, capital: Decimal) -> Self {
        self.initial_capital = capital;
        self
    }

    /// 슬리피지 비율 설정.
    pub fn with_slippage_rate(mut self, rate: Decimal) -> Self {
        self.slippage_rate = rate;
        self
    }

    /// 수수료율 오버라이드 설정.
    ///
    /// 설정하면 시장 규칙의 수수료 체계(최소 수수료, 인지세 등) 대신
    /// 명목 가치 × 비율의 단일 수수료를 적용합니다.
    pub fn with_commission_rate(mut self, rate: Decimal) -> Self {
        self.commission_rate = Some(rate);
        self
    }

    /// 최대 포지션 비율 설정.
    pub fn with_max_position_size(mut self, fraction: Decimal) -> Self {
        self.max_position_size = fraction;
        self
    }

    /// 예열 바 수 설정.
    pub fn with_warmup_bars(mut self, bars: usize) -> Self {
        self.warmup_bars = bars;
        self
    }

    /// 백테스트 구간 설정.
    pub fn with_period(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// 시장 설정.
    pub fn with_market(mut self, market: MarketConfig) -> Self {
        self.market = market;
        self
    }

    /// 무위험 수익률 설정.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// 설정값을 검증합니다.
    pub fn validate(&self) -> BacktestResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(BacktestError::InvalidConfig(
                "종목 코드가 비어 있습니다".to_string(),
            ));
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(BacktestError::InvalidConfig(format!(
                "초기 자본은 양수여야 합니다: {}",
                self.initial_capital
            )));
        }
        if self.slippage_rate < Decimal::ZERO || self.slippage_rate >= Decimal::ONE {
            return Err(BacktestError::InvalidConfig(format!(
                "슬리피지 비율은 [0, 1) 범위여야 합니다: {}",
                self.slippage_rate
            )));
        }
        if let Some(rate) = self.commission_rate {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(BacktestError::InvalidConfig(format!(
                    "수수료율은 [0, 1) 범위여야 합니다: {}",
                    rate
                )));
            }
        }
        if self.max_position_size <= Decimal::ZERO || self.max_position_size > Decimal::ONE {
            return Err(BacktestError::InvalidConfig(format!(
                "최대 포지션 비율은 (0, 1] 범위여야 합니다: {}",
                self.max_position_size
            )));
        }
        if self.cash_buffer_ratio <= Decimal::ZERO || self.cash_buffer_ratio > Decimal::ONE {
            return Err(BacktestError::InvalidConfig(format!(
                "현금 한도 비율은 (0, 1] 범위여야 합니다: {}",
                self.cash_buffer_ratio
            )));
        }
        if self.partial_exit_ratio <= Decimal::ZERO || self.partial_exit_ratio > Decimal::ONE {
            return Err(BacktestError::InvalidConfig(format!(
                "부분 청산 비율은 (0, 1] 범위여야 합니다: {}",
                self.partial_exit_ratio
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start >= end {
                return Err(BacktestError::InvalidConfig(
                    "시작일은 종료일보다 앞서야 합니다".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// 엔진 상태. 한 번 실행한 엔진은 재실행할 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Initialized,
    Completed,
}

/// 매수/매도 집계.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeSummary {
    /// 매수 체결 수
    pub buy_count: usize,
    /// 매도 체결 수
    pub sell_count: usize,
    /// 평균 매수가
    pub avg_buy_price: Decimal,
    /// 평균 매도가
    pub avg_sell_price: Decimal,
    /// 총 수수료
    pub total_commission: Decimal,
    /// 총 슬리피지 비용
    pub total_slippage: Decimal,
}

/// 백테스트 결과 보고서.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// 종목 코드
    pub symbol: String,
    /// 판별된 시장
    pub market: Market,
    /// 초기 자본
    pub initial_capital: Decimal,
    /// 최종 자본
    pub final_value: Decimal,
    /// 성과 지표
    pub metrics: PerformanceMetrics,
    /// 체결 집계
    pub trade_summary: TradeSummary,
    /// 왕복 거래 통계
    pub statistics: TradeStatistics,
    /// 자본 곡선
    pub equity_curve: Vec<EquityPoint>,
    /// 낙폭 곡선
    pub drawdown_curve: Vec<DrawdownPoint>,
    /// 월별 수익률
    pub monthly_returns: Vec<MonthlyReturn>,
    /// 체결 기록 (시간순, 불변)
    pub trades: Vec<Trade>,
}

impl BacktestReport {
    /// 사람이 읽기 좋은 요약 문자열을 생성합니다.
    pub fn summary(&self) -> String {
        format!(
            "\n╔══════════════════════════════════════════╗\n\
             ║           백테스트 결과 요약             ║\n\
             ╠══════════════════════════════════════════╣\n\
             ║ 종목:          {:>25} ║\n\
             ║ 시장:          {:>25} ║\n\
             ║ 초기 자본:     {:>25} ║\n\
             ║ 최종 자본:     {:>25.2} ║\n\
             ║ 총 수익률:     {:>24}% ║\n\
             ║ 연환산 수익률: {:>24}% ║\n\
             ║ 최대 낙폭:     {:>24}% ║\n\
             ║ Sharpe:        {:>25.4} ║\n\
             ║ 왕복 거래:     {:>25} ║\n\
             ║ 승률:          {:>24}% ║\n\
             ║ 총 수수료:     {:>25.2} ║\n\
             ╚══════════════════════════════════════════╝",
            self.symbol,
            self.market,
            self.initial_capital,
            self.final_value,
            (self.metrics.total_return * dec!(100)).round_dp(2),
            (self.metrics.annual_return * dec!(100)).round_dp(2),
            (self.metrics.max_drawdown * dec!(100)).round_dp(2),
            self.metrics.sharpe_ratio,
            self.metrics.total_trades,
            (self.metrics.win_rate * dec!(100)).round_dp(1),
            self.trade_summary.total_commission,
        )
    }
}

/// 단일 종목 백테스트 엔진.
pub struct BacktestEngine {
    config: BacktestConfig,
    rules: MarketRuleEngine,
    market: Market,
    rule: MarketRule,
    state: EngineState,
    cash: Decimal,
    position: Position,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    total_commission: Decimal,
    total_slippage: Decimal,
    benchmark: Option<Vec<(DateTime<Utc>, Decimal)>>,
}

impl BacktestEngine {
    /// 설정을 검증하고 엔진을 생성합니다.
    pub fn new(config: BacktestConfig) -> BacktestResult<Self> {
        config.validate()?;

        let rules = MarketRuleEngine::new(config.market.clone());
        let market = rules.detect_market(&config.symbol);
        let rule = rules.get_rule(market);
        let cash = config.initial_capital;
        let position = Position::new(config.symbol.clone());

        Ok(Self {
            config,
            rules,
            market,
            rule,
            state: EngineState::Initialized,
            cash,
            position,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            total_commission: Decimal::ZERO,
            total_slippage: Decimal::ZERO,
            benchmark: None,
        })
    }

    /// 벤치마크 시계열 설정 (타임스탬프, 가격).
    pub fn with_benchmark(mut self, series: Vec<(DateTime<Utc>, Decimal)>) -> Self {
        self.benchmark = Some(series);
        self
    }

    /// 판별된 시장.
    pub fn market(&self) -> Market {
        self.market
    }

    /// 백테스트를 실행하고 보고서를 반환합니다.
    ///
    /// 엔진은 1회용입니다. 두 번째 호출은 `InvalidState`를 반환합니다.
    pub fn run(
        &mut self,
        strategy: &mut dyn Strategy,
        bars: &[Bar],
    ) -> BacktestResult<BacktestReport> {
        if self.state == EngineState::Completed {
            return Err(BacktestError::InvalidState(
                "완료된 엔진은 재실행할 수 없습니다".to_string(),
            ));
        }

        let span = backtest_span!("backtest", self.config.symbol, strategy.name());
        let _guard = span.enter();

        let bars = self.filter_period(bars);
        validate_input(&bars, self.config.warmup_bars)?;

        info!(
            market = %self.market,
            bars = bars.len(),
            initial_capital = %self.config.initial_capital,
            "백테스트 시작"
        );

        strategy.initialize(&bars[..self.config.warmup_bars])?;

        for i in self.config.warmup_bars..bars.len() {
            let bar = &bars[i];
            let prev_close = bars[i - 1].close;
            let history = &bars[..=i];

            // None은 전략의 통상적인 관망이므로 debug로만 기록
            let signal = match strategy.generate_signal(history, self.position.quantity)? {
                Some(signal) => signal,
                None => {
                    debug!(timestamp = %bar.timestamp, "시그널 없음, 관망 처리");
                    Signal::hold()
                }
            };

            match signal.kind {
                SignalKind::Buy | SignalKind::StrongBuy => {
                    self.try_buy(bar, prev_close, &signal);
                }
                SignalKind::Sell | SignalKind::StrongSell => {
                    self.try_sell(bar, prev_close, &signal)?;
                }
                SignalKind::Hold => {}
            }

            self.record_equity(bar, signal.kind);
        }

        self.state = EngineState::Completed;
        Ok(self.build_report())
    }

    /// 체결 비용을 계산합니다.
    ///
    /// 수수료율 오버라이드가 설정되어 있으면 시장 수수료 체계 대신
    /// 명목 가치 × 비율을 적용합니다.
    fn execution_fees(&self, side: Side, notional: Decimal) -> Decimal {
        match self.config.commission_rate {
            Some(rate) => notional * rate,
            None => self
                .rules
                .calculate_commission(self.market, side, notional)
                .total(),
        }
    }

    /// 설정된 기간으로 바를 필터링합니다.
    fn filter_period(&self, bars: &[Bar]) -> Vec<Bar> {
        bars.iter()
            .filter(|bar| {
                self.config.start_date.map_or(true, |s| bar.timestamp >= s)
                    && self.config.end_date.map_or(true, |e| bar.timestamp <= e)
            })
            .cloned()
            .collect()
    }

    /// 매수 시그널 처리. 체결 불가 사유는 debug 로그 후 스킵합니다.
    fn try_buy(&mut self, bar: &Bar, prev_close: Price, signal: &Signal) {
        let fill_price = bar.close * (Decimal::ONE + self.config.slippage_rate);

        if let Err(violation) =
            self.rules
                .check_price_limit(self.market, fill_price, prev_close, &self.config.symbol)
        {
            debug!(timestamp = %bar.timestamp, %violation, "매수 스킵: 가격제한폭");
            return;
        }

        let fraction = signal
            .position_fraction
            .unwrap_or(self.config.max_position_size);
        let confidence = sanitize_f64(signal.confidence);
        let portfolio_value = self.cash + self.position.quantity * bar.close;
        let target_notional = portfolio_value * fraction * confidence;

        let lot = self.rule.lot_size_decimal();
        let mut quantity = floor_to_lot(target_notional / fill_price, lot);
        if quantity.is_zero() {
            debug!(timestamp = %bar.timestamp, "매수 스킵: 목표 수량이 거래 단위 미만");
            return;
        }

        let mut notional = quantity * fill_price;
        let mut fees = self.execution_fees(Side::Buy, notional);

        // 현금 부족 시 한도 내로 축소 후 1회 재시도
        if notional + fees > self.cash {
            let capped = self.cash * self.config.cash_buffer_ratio;
            quantity = floor_to_lot(capped / fill_price, lot);
            if quantity.is_zero() {
                debug!(timestamp = %bar.timestamp, "매수 스킵: 현금 부족");
                return;
            }
            notional = quantity * fill_price;
            fees = self.execution_fees(Side::Buy, notional);
            if notional + fees > self.cash {
                debug!(timestamp = %bar.timestamp, "매수 스킵: 축소 후에도 현금 부족");
                return;
            }
        }

        if let Err(violation) = self.rules.validate_quantity(self.market, quantity) {
            debug!(timestamp = %bar.timestamp, %violation, "매수 스킵: 수량 규칙 위반");
            return;
        }

        // lot 정렬과 현금 확인을 통과했으므로 실패할 수 없음
        if self
            .position
            .add(quantity, fill_price, bar.timestamp)
            .is_err()
        {
            debug!(timestamp = %bar.timestamp, "매수 스킵: 포지션 갱신 실패");
            return;
        }

        let slippage_cost = (fill_price - bar.close) * quantity;
        self.cash -= notional + fees;
        self.total_commission += fees;
        self.total_slippage += slippage_cost;

        let portfolio_after = self.cash + self.position.quantity * bar.close;
        self.trades.push(Trade::new(
            self.config.symbol.clone(),
            Side::Buy,
            quantity,
            fill_price,
            fees,
            slippage_cost,
            bar.timestamp,
            portfolio_after,
        ));

        debug!(
            timestamp = %bar.timestamp,
            %quantity,
            price = %fill_price,
            %fees,
            "매수 체결"
        );
    }

    /// 매도 시그널 처리.
    ///
    /// StrongSell은 전량, Sell은 부분 청산 비율만큼 (최소 1 거래 단위)
    /// 매도합니다. 체결 불가 사유는 debug 로그 후 스킵하고,
    /// 포지션 갱신 실패 같은 예상 밖 오류는 전파합니다.
    fn try_sell(
        &mut self,
        bar: &Bar,
        prev_close: Price,
        signal: &Signal,
    ) -> BacktestResult<()> {
        if !self.position.is_open() {
            debug!(timestamp = %bar.timestamp, "매도 스킵: 보유 포지션 없음");
            return Ok(());
        }

        // T+N 결제: 당일 매수분은 매도 불가
        if let Some(buy_at) = self.position.last_buy_at {
            if !self.rules.can_sell_today(self.market, buy_at, bar.timestamp) {
                debug!(timestamp = %bar.timestamp, "매도 스킵: T+N 결제 제한");
                return Ok(());
            }
        }

        let fill_price = bar.close * (Decimal::ONE - self.config.slippage_rate);

        if let Err(violation) =
            self.rules
                .check_price_limit(self.market, fill_price, prev_close, &self.config.symbol)
        {
            debug!(timestamp = %bar.timestamp, %violation, "매도 스킵: 가격제한폭");
            return Ok(());
        }

        let held = self.position.quantity;
        let lot = self.rule.lot_size_decimal();
        let quantity = if signal.kind == SignalKind::StrongSell {
            held
        } else {
            let partial = floor_to_lot(held * self.config.partial_exit_ratio, lot);
            partial.max(lot).min(held)
        };

        let notional = quantity * fill_price;
        let fees = self.execution_fees(Side::Sell, notional);

        let realized = self
            .position
            .reduce(quantity, fill_price)
            .map_err(BacktestError::Internal)?;

        let slippage_cost = (bar.close - fill_price) * quantity;
        self.cash += notional - fees;
        self.total_commission += fees;
        self.total_slippage += slippage_cost;

        let portfolio_after = self.cash + self.position.quantity * bar.close;
        self.trades.push(
            Trade::new(
                self.config.symbol.clone(),
                Side::Sell,
                quantity,
                fill_price,
                fees,
                slippage_cost,
                bar.timestamp,
                portfolio_after,
            )
            .with_realized_pnl(realized),
        );

        debug!(
            timestamp = %bar.timestamp,
            %quantity,
            price = %fill_price,
            pnl = %realized,
            "매도 체결"
        );
        Ok(())
    }

    /// 바 종가 기준으로 자본 샘플을 기록합니다.
    fn record_equity(&mut self, bar: &Bar, signal: SignalKind) {
        let positions_value = self.position.quantity * bar.close;
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            portfolio_value: self.cash + positions_value,
            cash: self.cash,
            positions_value,
            signal,
        });
    }

    /// 실행 결과로 보고서를 조립합니다.
    fn build_report(&self) -> BacktestReport {
        let final_value = self
            .equity_curve
            .last()
            .map(|p| p.portfolio_value)
            .unwrap_or(self.config.initial_capital);

        let metrics = MetricsCalculator::new()
            .with_risk_free_rate(self.config.risk_free_rate)
            .calculate(
                self.config.initial_capital,
                &self.equity_curve,
                &self.trades,
                self.benchmark.as_deref(),
            );

        let round_trips = pair_round_trips(&self.trades);
        let statistics = TradeStatistics::from_trades(&round_trips);

        let equity: Vec<Decimal> = self
            .equity_curve
            .iter()
            .map(|p| p.portfolio_value)
            .collect();
        let drawdown_curve = calculate_drawdown(&equity);
        let monthly = monthly_returns(self.config.initial_capital, &self.equity_curve);

        let trade_summary = self.summarize_trades();

        info!(
            final_value = %final_value,
            trades = self.trades.len(),
            total_return = %metrics.total_return,
            "백테스트 완료"
        );

        BacktestReport {
            symbol: self.config.symbol.clone(),
            market: self.market,
            initial_capital: self.config.initial_capital,
            final_value,
            metrics,
            trade_summary,
            statistics,
            equity_curve: self.equity_curve.clone(),
            drawdown_curve,
            monthly_returns: monthly,
            trades: self.trades.clone(),
        }
    }

    fn summarize_trades(&self) -> TradeSummary {
        let mut summary = TradeSummary {
            total_commission: self.total_commission,
            total_slippage: self.total_slippage,
            ..TradeSummary::default()
        };

        let mut buy_value = Decimal::ZERO;
        let mut buy_qty = Decimal::ZERO;
        let mut sell_value = Decimal::ZERO;
        let mut sell_qty = Decimal::ZERO;

        for trade in &self.trades {
            match trade.side {
                Side::Buy => {
                    summary.buy_count += 1;
                    buy_value += trade.notional_value();
                    buy_qty += trade.quantity;
                }
                Side::Sell => {
                    summary.sell_count += 1;
                    sell_value += trade.notional_value();
                    sell_qty += trade.quantity;
                }
            }
        }

        if buy_qty > Decimal::ZERO {
            summary.avg_buy_price = buy_value / buy_qty;
        }
        if sell_qty > Decimal::ZERO {
            summary.avg_sell_price = sell_value / sell_qty;
        }
        summary
    }
}

/// 수량을 거래 단위의 배수로 내림합니다.
fn floor_to_lot(quantity: Decimal, lot: Decimal) -> Decimal {
    if lot <= Decimal::ZERO {
        return quantity.floor();
    }
    (quantity / lot).floor() * lot
}
