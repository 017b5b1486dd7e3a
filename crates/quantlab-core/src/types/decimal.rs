//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 이 모듈은 금융 계산에 필요한 정밀 소수점 타입 및 유틸리티를 제공합니다.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (0.01 = 1%).
pub type Percentage = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 양수인지 확인합니다.
    fn is_positive(&self) -> bool;

    /// 음수인지 확인합니다.
    fn is_negative(&self) -> bool;

    /// 절대값을 반환합니다.
    fn abs(&self) -> Decimal;

    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_dp(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn is_positive(&self) -> bool {
        *self > Decimal::ZERO
    }

    fn is_negative(&self) -> bool {
        *self < Decimal::ZERO
    }

    fn abs(&self) -> Decimal {
        if self.is_sign_negative() {
            -*self
        } else {
            *self
        }
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::from(100);
        format!("{:.2}%", pct)
    }

    fn round_dp(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Decimal 제곱근 (Newton-Raphson 방법).
///
/// 변동성 연환산 등 지표 계산에 사용합니다. 음수 입력은 0을 반환합니다.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let two = Decimal::from(2);
    let precision = Decimal::new(1, 10);
    let mut x = value / two;

    if x.is_zero() {
        x = value;
    }

    // 최대 50회 반복, 1e-10 수렴 허용 오차
    for _ in 0..50 {
        let next = (x + value / x) / two;
        if (next - x).abs() < precision {
            return next;
        }
        x = next;
    }

    x
}

/// f64 값을 Decimal로 안전하게 변환합니다.
///
/// NaN/무한대는 외부 보고 경로로 절대 새어 나가면 안 되므로
/// 0으로 치환합니다.
pub fn sanitize_f64(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}
