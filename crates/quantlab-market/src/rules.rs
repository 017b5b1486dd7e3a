//! 시장별 매매 규칙 테이블.
//!
//! 각 시장의 거래 단위, 결제 주기, 수수료율, 가격제한폭을
//! 불변 상수 테이블로 정의합니다.

use quantlab_core::{Market, Percentage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 인지세 부과 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampDutySide {
    /// 부과하지 않음
    None,
    /// 매도에만 부과 (중국 A주)
    SellOnly,
    /// 양방향 부과 (홍콩)
    Both,
}

/// 단일 시장의 매매 규칙 (불변).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRule {
    /// 시장 구분
    pub market: Market,
    /// 거래 단위 (1 lot 주식 수)
    pub lot_size: u32,
    /// 매수 후 매도 가능까지의 결제 일수 (T+N)
    pub settlement_days: u32,
    /// 거래 단위 배수 강제 여부 (중국 A주만 해당)
    pub lot_multiple_required: bool,
    /// 위탁 수수료율
    pub commission_rate: Percentage,
    /// 최소 위탁 수수료
    pub min_commission: Decimal,
    /// 인지세율
    pub stamp_duty_rate: Percentage,
    /// 인지세 부과 방향
    pub stamp_duty_side: StampDutySide,
    /// 거래 징수금율 (홍콩 transaction levy)
    pub transaction_levy_rate: Percentage,
    /// 거래소 거래비율 (홍콩 trading fee)
    pub trading_fee_rate: Percentage,
    /// SEC 수수료율 (미국, 매도에만 부과)
    pub sec_fee_rate: Percentage,
    /// 일반 종목 가격제한폭 (None이면 제한 없음)
    pub price_limit: Option<Percentage>,
}

impl MarketRule {
    /// 시장별 규칙 테이블에서 규칙을 반환합니다.
    pub fn for_market(market: Market) -> Self {
        match market {
            Market::ChinaA => Self {
                market,
                lot_size: 100,
                settlement_days: 1,
                lot_multiple_required: true,
                commission_rate: dec!(0.0003),
                min_commission: dec!(5),
                stamp_duty_rate: dec!(0.001),
                stamp_duty_side: StampDutySide::SellOnly,
                transaction_levy_rate: Decimal::ZERO,
                trading_fee_rate: Decimal::ZERO,
                sec_fee_rate: Decimal::ZERO,
                price_limit: Some(dec!(0.10)),
            },
            Market::HongKong => Self {
                market,
                lot_size: 100,
                settlement_days: 0,
                lot_multiple_required: false,
                commission_rate: dec!(0.00025),
                min_commission: dec!(100),
                stamp_duty_rate: dec!(0.001),
                stamp_duty_side: StampDutySide::Both,
                transaction_levy_rate: dec!(0.000027),
                trading_fee_rate: dec!(0.0000565),
                sec_fee_rate: Decimal::ZERO,
                price_limit: None,
            },
            Market::UnitedStates => Self {
                market,
                lot_size: 1,
                settlement_days: 0,
                lot_multiple_required: false,
                commission_rate: Decimal::ZERO,
                min_commission: Decimal::ZERO,
                stamp_duty_rate: Decimal::ZERO,
                stamp_duty_side: StampDutySide::None,
                transaction_levy_rate: Decimal::ZERO,
                trading_fee_rate: Decimal::ZERO,
                sec_fee_rate: dec!(0.0000278),
                price_limit: None,
            },
        }
    }

    /// 종목 코드를 반영한 가격제한폭을 반환합니다.
    ///
    /// 중국 A주는 종목 구분에 따라 폭이 다릅니다:
    /// - ST 종목 (코드 앞에 "ST"/"*ST" 표기): ±5%
    /// - 창업판 (300/301 prefix), 과창판 (688/689 prefix): ±20%
    /// - 일반 종목: ±10%
    pub fn price_limit_for(&self, code: &str) -> Option<Percentage> {
        let base = self.price_limit?;
        if self.market != Market::ChinaA {
            return Some(base);
        }

        let upper = code.trim().to_uppercase();
        if upper.starts_with("ST") || upper.starts_with("*ST") {
            return Some(dec!(0.05));
        }

        let digits: String = upper.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.starts_with("300")
            || digits.starts_with("301")
            || digits.starts_with("688")
            || digits.starts_with("689")
        {
            return Some(dec!(0.20));
        }

        Some(base)
    }

    /// 거래 단위를 Decimal로 반환합니다.
    pub fn lot_size_decimal(&self) -> Decimal {
        Decimal::from(self.lot_size)
    }
}
