//! 백테스팅 시스템의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum QuantError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 시장 규칙 에러
    #[error("시장 규칙 에러: {0}")]
    MarketRule(String),

    /// 전략 에러
    #[error("전략 에러: {0}")]
    Strategy(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잔고 부족
    #[error("잔고 부족: {0}")]
    InsufficientFunds(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 백테스팅 작업을 위한 Result 타입.
pub type QuantResult<T> = Result<T, QuantError>;

impl QuantError {
    /// 치명적인 에러인지 확인합니다.
    ///
    /// 치명적인 에러는 실행을 즉시 중단해야 하며, 주문 건너뛰기로
    /// 처리하면 안 됩니다.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            QuantError::Data(_) | QuantError::Internal(_) | QuantError::Config(_)
        )
    }
}

impl From<serde_json::Error> for QuantError {
    fn from(err: serde_json::Error) -> Self {
        QuantError::Serialization(err.to_string())
    }
}
