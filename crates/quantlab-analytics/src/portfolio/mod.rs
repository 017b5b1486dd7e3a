//! 자본 곡선 및 포트폴리오 시계열 분석.

mod equity_curve;
mod monthly;

pub use equity_curve::*;
pub use monthly::*;
