//! # QuantLab Strategy
//!
//! 백테스트 전략 인터페이스와 내장 전략을 제공합니다.
//!
//! # 주요 기능
//! - `Strategy` trait: 바마다 시그널을 생성하는 동기 인터페이스
//! - 내장 전략: SMA 크로스오버, RSI, MACD, 볼린저 밴드, 피라미딩
//! - `registry`: 고정 팩토리 테이블 기반 전략 조회/생성
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use quantlab_strategy::registry;
//!
//! let params = toml::Value::Table(Default::default());
//! let mut strategy = registry::build("sma_cross", &params)?;
//! ```

mod error;
pub mod indicators;
pub mod registry;
pub mod strategies;
mod traits;

pub use error::*;
pub use strategies::*;
pub use traits::*;
