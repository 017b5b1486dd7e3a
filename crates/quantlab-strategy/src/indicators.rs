//! 기술 지표 계산.
//!
//! 바 히스토리 슬라이스에서 직접 지표를 계산하는 순수 함수를 제공합니다.
//! 전략이 매 바마다 다시 호출하므로 모든 함수는 입력에 대해 결정적입니다.

use quantlab_core::{decimal_sqrt, Bar};
use rust_decimal::Decimal;

/// 바 슬라이스에서 종가 목록을 추출합니다.
pub fn closes(bars: &[Bar]) -> Vec<Decimal> {
    bars.iter().map(|b| b.close).collect()
}

/// 단순 이동평균 (마지막 `period`개 값).
///
/// 데이터가 부족하면 `None`을 반환합니다.
pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: Decimal = values[values.len() - period..].iter().sum();
    Some(sum / Decimal::from(period))
}

/// 지수 이동평균 시계열.
///
/// 처음 `period`개 값의 SMA를 시드로 사용합니다. 반환 벡터의 길이는
/// `values.len() - period + 1`입니다.
pub fn ema_series(values: &[Decimal], period: usize) -> Option<Vec<Decimal>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let multiplier = Decimal::from(2) / Decimal::from(period + 1);
    let seed: Decimal = values[..period].iter().sum::<Decimal>() / Decimal::from(period);

    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);
    let mut prev = seed;
    for value in &values[period..] {
        let ema = (*value - prev) * multiplier + prev;
        series.push(ema);
        prev = ema;
    }
    Some(series)
}

/// 지수 이동평균 (마지막 값).
pub fn ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    ema_series(values, period).and_then(|s| s.last().copied())
}

/// RSI (Wilder 평활법).
///
/// `period + 1`개 이상의 값이 필요합니다. 전부 상승이면 100을 반환합니다.
pub fn rsi(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;

    // 초기 평균
    for window in values[..period + 1].windows(2) {
        let change = window[1] - window[0];
        if change > Decimal::ZERO {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= Decimal::from(period);
    avg_loss /= Decimal::from(period);

    // Wilder 평활
    let period_dec = Decimal::from(period);
    for window in values[period..].windows(2) {
        let change = window[1] - window[0];
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -change)
        };
        avg_gain = (avg_gain * (period_dec - Decimal::ONE) + gain) / period_dec;
        avg_loss = (avg_loss * (period_dec - Decimal::ONE) + loss) / period_dec;
    }

    if avg_loss.is_zero() {
        return Some(Decimal::from(100));
    }

    let rs = avg_gain / avg_loss;
    Some(Decimal::from(100) - Decimal::from(100) / (Decimal::ONE + rs))
}

/// 마지막 `period`개 값의 표본 표준편차 (모집단 기준).
pub fn stddev(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean: Decimal = window.iter().sum::<Decimal>() / Decimal::from(period);
    let variance: Decimal = window
        .iter()
        .map(|v| {
            let diff = *v - mean;
            diff * diff
        })
        .sum::<Decimal>()
        / Decimal::from(period);
    Some(decimal_sqrt(variance))
}

/// MACD (MACD 라인, 시그널 라인, 히스토그램).
pub fn macd(
    values: &[Decimal],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<(Decimal, Decimal, Decimal)> {
    if fast_period >= slow_period {
        return None;
    }

    let fast = ema_series(values, fast_period)?;
    let slow = ema_series(values, slow_period)?;

    // slow 시계열 시작점에 맞춰 fast를 정렬
    let offset = fast.len().checked_sub(slow.len())?;
    let macd_line: Vec<Decimal> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[i + offset] - s)
        .collect();

    let signal_series = ema_series(&macd_line, signal_period)?;
    let macd_last = *macd_line.last()?;
    let signal_last = *signal_series.last()?;
    Some((macd_last, signal_last, macd_last - signal_last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn test_sma() {
        let values = decimals(&[1, 2, 3, 4, 5]);
        assert_eq!(sma(&values, 3), Some(dec!(4)));
        assert_eq!(sma(&values, 5), Some(dec!(3)));
        assert_eq!(sma(&values, 6), None);
        assert_eq!(sma(&values, 0), None);
    }

    #[test]
    fn test_ema_constant_series() {
        let values = vec![dec!(10); 20];
        assert_eq!(ema(&values, 5), Some(dec!(10)));
    }

    #[test]
    fn test_rsi_all_gains() {
        let values = decimals(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(rsi(&values, 14), Some(dec!(100)));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let values = decimals(&[1, 2, 3]);
        assert_eq!(rsi(&values, 14), None);
    }

    #[test]
    fn test_rsi_mixed() {
        let values = decimals(&[10, 11, 10, 11, 10, 11, 10, 11, 10, 11, 10, 11, 10, 11, 10]);
        let rsi_value = rsi(&values, 14).unwrap();
        // 상승과 하락이 대칭에 가까우므로 50 부근
        assert!(rsi_value > dec!(30) && rsi_value < dec!(70));
    }

    #[test]
    fn test_stddev() {
        let values = decimals(&[2, 4, 4, 4, 5, 5, 7, 9]);
        let sd = stddev(&values, 8).unwrap();
        assert!((sd - dec!(2)).abs() < dec!(0.0001));

        // 상수 시계열의 표준편차는 0
        let flat = vec![dec!(5); 10];
        assert_eq!(stddev(&flat, 10), Some(dec!(0)));
    }

    #[test]
    fn test_macd_constant_series() {
        let values = vec![dec!(100); 60];
        let (macd_line, signal_line, histogram) = macd(&values, 12, 26, 9).unwrap();
        assert_eq!(macd_line, Decimal::ZERO);
        assert_eq!(signal_line, Decimal::ZERO);
        assert_eq!(histogram, Decimal::ZERO);
    }

    #[test]
    fn test_macd_requires_fast_below_slow() {
        let values = vec![dec!(100); 60];
        assert!(macd(&values, 26, 12, 9).is_none());
    }
}
