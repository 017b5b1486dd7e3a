//! 자본 곡선과 낙폭 곡선.
//!
//! 엔진은 바마다 자본 샘플 하나를 기록합니다. 낙폭은 음수 또는 0인
//! 비율로 표현합니다 (신고점에서 0).

use chrono::{DateTime, Utc};
use quantlab_core::SignalKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 바 하나당 기록되는 자본 샘플.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    /// 바 타임스탬프
    pub timestamp: DateTime<Utc>,
    /// 포트폴리오 총 가치 (현금 + 평가액)
    pub portfolio_value: Decimal,
    /// 현금 잔고
    pub cash: Decimal,
    /// 보유 포지션 평가액
    pub positions_value: Decimal,
    /// 해당 바의 시그널 종류 (시그널이 없으면 Hold)
    pub signal: SignalKind,
}

/// 낙폭 곡선의 한 점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    /// 자본
    pub equity: Decimal,
    /// 현재까지의 최고 자본
    pub running_max: Decimal,
    /// 낙폭 비율 (항상 0 이하, 신고점에서 0)
    pub drawdown: Decimal,
}

/// 자본 시계열에서 낙폭 곡선을 계산합니다.
///
/// 빈 입력은 빈 곡선을 반환합니다.
pub fn calculate_drawdown(equity: &[Decimal]) -> Vec<DrawdownPoint> {
    let mut curve = Vec::with_capacity(equity.len());
    let mut running_max = Decimal::ZERO;

    for &value in equity {
        if value > running_max {
            running_max = value;
        }
        let drawdown = if running_max.is_zero() {
            Decimal::ZERO
        } else {
            (value - running_max) / running_max
        };
        curve.push(DrawdownPoint {
            equity: value,
            running_max,
            drawdown,
        });
    }
    curve
}

/// 최대 낙폭 (0 이하)과 최장 낙폭 지속 일수를 계산합니다.
///
/// 지속 기간은 직전 고점에서 회복(또는 시계열 끝)까지의 일수입니다.
pub fn max_drawdown(
    timestamps: &[DateTime<Utc>],
    curve: &[DrawdownPoint],
) -> (Decimal, i64) {
    let mut max_dd = Decimal::ZERO;
    let mut max_duration = 0i64;
    let mut peak_ts: Option<DateTime<Utc>> = None;

    for (i, point) in curve.iter().enumerate() {
        if point.drawdown < max_dd {
            max_dd = point.drawdown;
        }

        if point.drawdown.is_zero() {
            // 신고점 도달: 진행 중이던 낙폭 구간 종료
            if let (Some(peak), Some(ts)) = (peak_ts, timestamps.get(i)) {
                let days = ts.signed_duration_since(peak).num_days();
                max_duration = max_duration.max(days);
            }
            peak_ts = timestamps.get(i).copied();
        }
    }

    // 회복하지 못한 채 끝난 낙폭 구간
    if let (Some(peak), Some(last)) = (peak_ts, timestamps.last()) {
        if curve.last().map(|p| p.drawdown < Decimal::ZERO).unwrap_or(false) {
            let days = last.signed_duration_since(peak).num_days();
            max_duration = max_duration.max(days);
        }
    }

    (max_dd, max_duration)
}
