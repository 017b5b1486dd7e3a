//! 백테스팅을 위한 도메인 모델.

mod bar;
mod calculations;
mod position;
mod side;
mod signal;
mod statistics;
mod trade;

pub use bar::*;
pub use calculations::*;
pub use position::*;
pub use side::*;
pub use signal::*;
pub use statistics::*;
pub use trade::*;
