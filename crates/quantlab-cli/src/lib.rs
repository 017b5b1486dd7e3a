//! 백테스트 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - CSV 데이터 기반 백테스트 실행
//! - 전략 목록 조회
//! - 합성 OHLCV 데이터 생성

pub mod commands;

pub use commands::*;
