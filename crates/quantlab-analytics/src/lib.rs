//! # QuantLab Analytics
//!
//! 백테스트 엔진과 성과 분석을 제공합니다.
//!
//! # 주요 기능
//! - **backtest**: 단일 종목 바 단위 백테스트 엔진
//! - **performance**: 수익률/위험 지표 및 왕복 거래 분석
//! - **portfolio**: 자본 곡선, 낙폭 곡선, 월별 수익률
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use quantlab_analytics::{BacktestConfig, BacktestEngine};
//! use quantlab_strategy::SmaCrossStrategy;
//! use rust_decimal_macros::dec;
//!
//! let config = BacktestConfig::new("600519").with_initial_capital(dec!(100000));
//! let mut engine = BacktestEngine::new(config)?;
//! let mut strategy = SmaCrossStrategy::default();
//! let report = engine.run(&mut strategy, &bars)?;
//! println!("{}", report.summary());
//! ```

pub mod backtest;
pub mod performance;
pub mod portfolio;

pub use backtest::*;
pub use performance::*;
pub use portfolio::*;
