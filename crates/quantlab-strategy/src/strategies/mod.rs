//! 내장 전략 모음.

mod bollinger;
mod macd;
mod pyramiding;
mod rsi;
mod sma_cross;

pub use bollinger::*;
pub use macd::*;
pub use pyramiding::*;
pub use rsi::*;
pub use sma_cross::*;
