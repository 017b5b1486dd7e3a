//! 핵심 타입 정의.

pub mod decimal;
pub mod market;

pub use decimal::*;
pub use market::*;
