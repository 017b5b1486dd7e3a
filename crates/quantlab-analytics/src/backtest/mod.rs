//! 바 단위 백테스트 엔진.

mod engine;
mod validation;

pub use engine::*;
pub use validation::*;
