//! 성과 지표 계산.

mod metrics;

pub use metrics::*;
