//! CSV OHLCV 파일 로드/저장.
//!
//! 파일 형식은 헤더 `timestamp,open,high,low,close,volume`의 CSV이며,
//! 타임스탬프는 RFC 3339 (`2024-01-02T07:00:00Z`) 또는 날짜만
//! (`2024-01-02`, UTC 자정) 허용합니다.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quantlab_core::Bar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// CSV 한 행.
#[derive(Debug, Serialize, Deserialize)]
struct BarRecord {
    timestamp: String,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

/// 타임스탬프 문자열을 파싱합니다 (RFC 3339 또는 YYYY-MM-DD).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("타임스탬프 파싱 실패: {}", s))?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .context("유효하지 않은 날짜")?
        .and_utc())
}

/// CSV 파일에서 바 시계열을 읽습니다.
///
/// 읽은 뒤 타임스탬프 오름차순으로 정렬하고 중복 타임스탬프는
/// 첫 번째 행만 남깁니다.
pub fn load_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("CSV 파일 열기 실패: {}", path.display()))?;

    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<BarRecord>().enumerate() {
        let record = record.with_context(|| format!("CSV {}번째 행 파싱 실패", line + 2))?;
        let timestamp = parse_timestamp(&record.timestamp)?;
        bars.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    bars.sort_by_key(|bar| bar.timestamp);
    bars.dedup_by_key(|bar| bar.timestamp);

    debug!(path = %path.display(), bars = bars.len(), "CSV 데이터 로드 완료");
    Ok(bars)
}

/// 바 시계열을 CSV 파일로 저장합니다.
pub fn save_bars(path: impl AsRef<Path>, bars: &[Bar]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("CSV 파일 생성 실패: {}", path.display()))?;

    for bar in bars {
        writer.serialize(BarRecord {
            timestamp: bar.timestamp.to_rfc3339(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })?;
    }
    writer.flush()?;

    debug!(path = %path.display(), bars = bars.len(), "CSV 데이터 저장 완료");
    Ok(())
}
