//! 바(캔들) 시계열 데이터 구조체.
//!
//! 이 모듈은 백테스트 입력이 되는 OHLCV 바와 그 검증 로직을 정의합니다.
//! 바 시계열은 타임스탬프 오름차순이며 중복이 없어야 합니다.

use crate::error::{QuantError, QuantResult};
use crate::types::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 바 (캔들) 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 바 타임스탬프 (일봉이면 해당 거래일)
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Decimal,
}

impl Bar {
    /// 새 바를 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 상승 바인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 하락 바인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 고가-저가 범위를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 대표 가격 (고가+저가+종가)/3 을 반환합니다.
    pub fn typical_price(&self) -> Price {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// 바 내부 일관성을 검증합니다.
    ///
    /// 고가 >= 저가, 종가/시가가 [저가, 고가] 안에 있어야 하며
    /// 가격은 모두 양수여야 합니다.
    pub fn validate(&self) -> QuantResult<()> {
        if self.open <= Decimal::ZERO
            || self.high <= Decimal::ZERO
            || self.low <= Decimal::ZERO
            || self.close <= Decimal::ZERO
        {
            return Err(QuantError::Data(format!(
                "{}: 가격은 양수여야 합니다",
                self.timestamp
            )));
        }
        if self.high < self.low {
            return Err(QuantError::Data(format!(
                "{}: 고가({})가 저가({})보다 낮습니다",
                self.timestamp, self.high, self.low
            )));
        }
        if self.close < self.low || self.close > self.high {
            return Err(QuantError::Data(format!(
                "{}: 종가({})가 [저가, 고가] 범위를 벗어났습니다",
                self.timestamp, self.close
            )));
        }
        if self.open < self.low || self.open > self.high {
            return Err(QuantError::Data(format!(
                "{}: 시가({})가 [저가, 고가] 범위를 벗어났습니다",
                self.timestamp, self.open
            )));
        }
        if self.volume < Decimal::ZERO {
            return Err(QuantError::Data(format!(
                "{}: 거래량은 음수일 수 없습니다",
                self.timestamp
            )));
        }
        Ok(())
    }
}

/// 바 시계열 전체를 검증합니다.
///
/// 각 바의 내부 일관성과 함께 타임스탬프 오름차순/중복 여부를 확인합니다.
pub fn validate_series(bars: &[Bar]) -> QuantResult<()> {
    for bar in bars {
        bar.validate()?;
    }
    for window in bars.windows(2) {
        if window[1].timestamp <= window[0].timestamp {
            return Err(QuantError::Data(format!(
                "바 시계열이 오름차순이 아닙니다: {} -> {}",
                window[0].timestamp, window[1].timestamp
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar_at(day: u32, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            dec!(10000),
        )
    }

    #[test]
    fn test_bar_helpers() {
        let bar = bar_at(1, dec!(10), dec!(12), dec!(9), dec!(11));
        assert!(bar.is_bullish());
        assert_eq!(bar.range(), dec!(3));
        assert_eq!(bar.typical_price(), dec!(32) / dec!(3));
    }

    #[test]
    fn test_bar_validate_high_below_low() {
        let bar = bar_at(1, dec!(10), dec!(9), dec!(12), dec!(10));
        assert!(bar.validate().is_err());
    }

    #[test]
    fn test_bar_validate_close_out_of_range() {
        let bar = bar_at(1, dec!(10), dec!(12), dec!(9), dec!(13));
        assert!(bar.validate().is_err());
    }

    #[test]
    fn test_series_must_be_ascending() {
        let bars = vec![
            bar_at(2, dec!(10), dec!(12), dec!(9), dec!(11)),
            bar_at(1, dec!(11), dec!(13), dec!(10), dec!(12)),
        ];
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn test_series_duplicate_timestamp() {
        let bars = vec![
            bar_at(1, dec!(10), dec!(12), dec!(9), dec!(11)),
            bar_at(1, dec!(11), dec!(13), dec!(10), dec!(12)),
        ];
        assert!(validate_series(&bars).is_err());
    }
}
