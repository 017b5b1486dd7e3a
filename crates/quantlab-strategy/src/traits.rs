//! 전략 인터페이스.
//!
//! 백테스트 엔진은 단일 스레드로 바를 순회하며 전략을 호출합니다.
//! 엔진이 결정적이어야 하므로 인터페이스는 동기식입니다.

use crate::error::StrategyResult;
use quantlab_core::{Bar, Quantity, Signal};

/// 바마다 시그널을 생성하는 트레이딩 전략.
///
/// 전략은 기본적으로 무상태입니다: 매 호출마다 바 히스토리 전체를
/// 전달받아 지표를 다시 계산합니다. 사이클을 추적하는 전략
/// (피라미딩 등)만 최소한의 내부 상태를 유지합니다.
pub trait Strategy: Send {
    /// 전략 이름.
    fn name(&self) -> &str;

    /// 전략 설명.
    fn description(&self) -> &str;

    /// 백테스트 시작 전 1회 호출되는 준비 단계.
    ///
    /// `history`는 예열 구간의 바입니다. 대부분의 전략은 할 일이 없습니다.
    fn initialize(&mut self, history: &[Bar]) -> StrategyResult<()> {
        let _ = history;
        Ok(())
    }

    /// 현재 바까지의 히스토리로 시그널을 생성합니다.
    ///
    /// `history`는 첫 바부터 현재 바까지 (현재 바 포함),
    /// `position_qty`는 현재 보유 수량입니다.
    /// `None` 반환은 암묵적 관망으로 처리됩니다.
    fn generate_signal(
        &mut self,
        history: &[Bar],
        position_qty: Quantity,
    ) -> StrategyResult<Option<Signal>>;
}

impl std::fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name()).finish()
    }
}
