//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use crate::types::Market;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 시장 구분 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// 백테스트 엔진 기본값
    #[serde(default)]
    pub engine: EngineDefaults,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 시장 구분 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// 종목 코드 형식을 인식하지 못했을 때 사용할 기본 시장
    #[serde(default = "default_fallback_market")]
    pub fallback_market: Market,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fallback_market: default_fallback_market(),
        }
    }
}

fn default_fallback_market() -> Market {
    Market::ChinaA
}

/// 백테스트 엔진 기본값.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineDefaults {
    /// 초기 자본금
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    /// 슬리피지 비율 (0.0005 = 0.05%)
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: Decimal,
    /// 포지션당 최대 비중 (포트폴리오 대비)
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// 지표 예열용 바 개수
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            slippage_rate: default_slippage_rate(),
            max_position_size: default_max_position_size(),
            warmup_bars: default_warmup_bars(),
        }
    }
}

fn default_initial_capital() -> Decimal {
    Decimal::from(100_000)
}
fn default_slippage_rate() -> Decimal {
    Decimal::new(5, 4)
}
fn default_max_position_size() -> Decimal {
    Decimal::new(95, 2)
}
fn default_warmup_bars() -> usize {
    30
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("QUANTLAB")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    ///
    /// `.env` 파일이 있으면 먼저 읽어들입니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load("config/default.toml")
    }
}
