//! 백테스트 입력 사전 검증.
//!
//! 엔진은 실행 전에 바 시계열 전체를 검증합니다. 검증에 실패하면
//! 거래를 하나도 실행하지 않고 즉시 중단합니다.

use quantlab_core::{validate_series, Bar};

use super::engine::{BacktestError, BacktestResult};

/// 바 시계열이 백테스트 가능한지 검증합니다.
///
/// - 예열 구간 이후 최소 1개의 거래 바가 남아야 합니다.
/// - 바는 타임스탬프 오름차순이고 중복이 없어야 합니다.
/// - 각 바의 OHLCV가 유효해야 합니다 (양수 가격, high ≥ low 등).
pub fn validate_input(bars: &[Bar], warmup_bars: usize) -> BacktestResult<()> {
    if bars.len() < warmup_bars + 1 {
        return Err(BacktestError::InvalidData(format!(
            "바 수가 부족합니다: {}개 (예열 {}개 + 최소 1개 필요)",
            bars.len(),
            warmup_bars
        )));
    }

    validate_series(bars).map_err(|e| BacktestError::InvalidData(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bars(count: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                Bar::new(
                    start + Duration::days(i as i64),
                    dec!(100),
                    dec!(105),
                    dec!(95),
                    dec!(102),
                    dec!(10000),
                )
            })
            .collect()
    }

    #[test]
    fn test_enough_bars_passes() {
        assert!(validate_input(&bars(31), 30).is_ok());
    }

    #[test]
    fn test_too_few_bars_rejected() {
        let err = validate_input(&bars(30), 30).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidData(_)));
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let mut series = bars(35);
        series[10].timestamp = series[9].timestamp;
        assert!(validate_input(&series, 30).is_err());
    }

    #[test]
    fn test_invalid_bar_rejected() {
        let mut series = bars(35);
        series[5].high = dec!(90); // high < low
        assert!(validate_input(&series, 30).is_err());
    }
}
