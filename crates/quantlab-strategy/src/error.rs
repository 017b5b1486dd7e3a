//! 전략 에러 타입.

use thiserror::Error;

/// 전략 실행 중 발생하는 에러.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// 전략 설정 에러
    #[error("전략 설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 전략 ID
    #[error("알 수 없는 전략: {0}")]
    UnknownStrategy(String),

    /// 내부 에러
    #[error("전략 내부 에러: {0}")]
    Internal(String),
}

/// 전략 작업을 위한 Result 타입.
pub type StrategyResult<T> = Result<T, StrategyError>;

impl From<toml::de::Error> for StrategyError {
    fn from(err: toml::de::Error) -> Self {
        StrategyError::Config(err.to_string())
    }
}
