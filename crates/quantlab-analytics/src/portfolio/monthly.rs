//! 월별 수익률 집계.

use chrono::Datelike;
use quantlab_core::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EquityPoint;

/// 한 달의 수익률.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    /// 1~12
    pub month: u32,
    /// 전월 말 대비 수익률 (비율)
    pub return_pct: Percentage,
}

/// 자본 곡선을 월별 수익률로 집계합니다.
///
/// 각 달의 마지막 샘플을 월말 자본으로 삼고, 첫 달은 초기 자본을
/// 기준으로 계산합니다.
pub fn monthly_returns(initial_capital: Decimal, curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut result = Vec::new();
    if curve.is_empty() || initial_capital <= Decimal::ZERO {
        return result;
    }

    let mut prev_close = initial_capital;
    let mut current: Option<(i32, u32, Decimal)> = None;

    for point in curve {
        let year = point.timestamp.year();
        let month = point.timestamp.month();

        match current {
            Some((y, m, _)) if y == year && m == month => {
                current = Some((y, m, point.portfolio_value));
            }
            Some((y, m, value)) => {
                result.push(make_return(y, m, prev_close, value));
                prev_close = value;
                current = Some((year, month, point.portfolio_value));
            }
            None => {
                current = Some((year, month, point.portfolio_value));
            }
        }
    }

    if let Some((y, m, value)) = current {
        result.push(make_return(y, m, prev_close, value));
    }

    result
}

fn make_return(year: i32, month: u32, prev_close: Decimal, close: Decimal) -> MonthlyReturn {
    let return_pct = if prev_close.is_zero() {
        Decimal::ZERO
    } else {
        (close - prev_close) / prev_close
    };
    MonthlyReturn {
        year,
        month,
        return_pct,
    }
}
