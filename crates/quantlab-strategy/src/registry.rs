//! 전략 레지스트리.
//!
//! 닫힌 팩토리 테이블로 전략을 조회/생성합니다. 동적 탐색이나
//! 플러그인 로딩 없이, 빌드에 포함된 전략만 테이블에 존재합니다.

use crate::error::{StrategyError, StrategyResult};
use crate::strategies::{
    BollingerConfig, BollingerStrategy, MacdConfig, MacdStrategy, PyramidingConfig,
    PyramidingStrategy, RsiConfig, RsiStrategy, SmaCrossConfig, SmaCrossStrategy,
};
use crate::Strategy;

/// 전략 메타데이터 (컴파일 타임 상수).
#[derive(Clone)]
pub struct StrategyMeta {
    /// 전략 ID (영문, snake_case)
    pub id: &'static str,

    /// 별칭 (여러 이름으로 접근 가능)
    pub aliases: &'static [&'static str],

    /// 전략 이름 (한글)
    pub name: &'static str,

    /// 전략 설명
    pub description: &'static str,

    /// 팩토리 함수 (설정 파라미터로 Box<dyn Strategy> 생성)
    pub factory: fn(&toml::Value) -> StrategyResult<Box<dyn Strategy>>,
}

impl std::fmt::Debug for StrategyMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyMeta")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("factory", &"<fn>")
            .finish()
    }
}

impl StrategyMeta {
    /// 전략 ID 또는 별칭으로 매칭합니다.
    pub fn matches(&self, query: &str) -> bool {
        self.id == query || self.aliases.contains(&query)
    }
}

fn parse_params<T: serde::de::DeserializeOwned + Default>(params: &toml::Value) -> StrategyResult<T> {
    // 빈 테이블이면 기본 설정 사용
    if params
        .as_table()
        .map(|t| t.is_empty())
        .unwrap_or(false)
    {
        return Ok(T::default());
    }
    Ok(params.clone().try_into()?)
}

/// 등록된 전략 테이블.
static STRATEGIES: &[StrategyMeta] = &[
    StrategyMeta {
        id: "sma_cross",
        aliases: &["sma", "golden_cross"],
        name: "SMA 크로스오버",
        description: "단기/장기 이동평균 크로스오버 추세 추종",
        factory: |params| {
            let config: SmaCrossConfig = parse_params(params)?;
            Ok(Box::new(SmaCrossStrategy::new(config)))
        },
    },
    StrategyMeta {
        id: "rsi",
        aliases: &["rsi_reversal"],
        name: "RSI 역추세",
        description: "RSI 과매도 매수 / 과매수 매도",
        factory: |params| {
            let config: RsiConfig = parse_params(params)?;
            Ok(Box::new(RsiStrategy::new(config)))
        },
    },
    StrategyMeta {
        id: "macd",
        aliases: &["macd_momentum"],
        name: "MACD 모멘텀",
        description: "MACD/시그널 라인 크로스오버 모멘텀",
        factory: |params| {
            let config: MacdConfig = parse_params(params)?;
            Ok(Box::new(MacdStrategy::new(config)))
        },
    },
    StrategyMeta {
        id: "bollinger",
        aliases: &["bb", "bollinger_reversion"],
        name: "볼린저 밴드",
        description: "볼린저 밴드 이탈 평균 회귀",
        factory: |params| {
            let config: BollingerConfig = parse_params(params)?;
            Ok(Box::new(BollingerStrategy::new(config)))
        },
    },
    StrategyMeta {
        id: "pyramiding",
        aliases: &["pyramid", "scale_in"],
        name: "피라미딩",
        description: "하락 분할 매수, 목표 도달 시 전량 청산",
        factory: |params| {
            let config: PyramidingConfig = parse_params(params)?;
            Ok(Box::new(PyramidingStrategy::new(config)))
        },
    },
];

/// 모든 등록된 전략 메타데이터.
pub fn all() -> &'static [StrategyMeta] {
    STRATEGIES
}

/// ID/별칭으로 전략을 검색합니다.
pub fn find(query: &str) -> Option<&'static StrategyMeta> {
    STRATEGIES.iter().find(|meta| meta.matches(query))
}

/// 전략 인스턴스를 생성합니다.
pub fn build(query: &str, params: &toml::Value) -> StrategyResult<Box<dyn Strategy>> {
    let meta = find(query).ok_or_else(|| StrategyError::UnknownStrategy(query.to_string()))?;
    (meta.factory)(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> toml::Value {
        toml::Value::Table(Default::default())
    }

    #[test]
    fn test_find_by_id_and_alias() {
        assert!(find("sma_cross").is_some());
        assert!(find("golden_cross").is_some());
        assert!(find("bb").is_some());
        assert!(find("nonexistent").is_none());
    }

    #[test]
    fn test_build_with_defaults() {
        let strategy = build("sma_cross", &empty_params()).unwrap();
        assert_eq!(strategy.name(), "SMA Crossover");
    }

    #[test]
    fn test_build_with_params() {
        let params: toml::Value = toml::from_str("short_period = 5\nlong_period = 15").unwrap();
        assert!(build("sma_cross", &params).is_ok());
    }

    #[test]
    fn test_build_unknown_strategy() {
        let err = build("nope", &empty_params()).unwrap_err();
        assert!(matches!(err, StrategyError::UnknownStrategy(_)));
    }

    #[test]
    fn test_all_ids_unique() {
        let mut ids: Vec<&str> = all().iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }
}
