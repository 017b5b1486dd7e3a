//! 백테스트 명령어.
//!
//! CSV 파일의 과거 데이터로 전략을 백테스트하고, 텍스트 요약 또는
//! JSON 보고서를 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 중국 A주 일봉으로 SMA 크로스 백테스트
//! quantlab backtest -d data/600519.csv -s 600519 --strategy sma_cross
//!
//! # 파라미터 파일과 JSON 출력
//! quantlab backtest -d data/AAPL.csv -s AAPL --strategy rsi \
//!     -p config/rsi.toml --format json -o report.json
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use quantlab_analytics::{BacktestConfig, BacktestEngine, BacktestReport};
use quantlab_core::AppConfig;
use quantlab_strategy::registry;
use rust_decimal::Decimal;
use tracing::info;

use super::data::load_bars;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("지원하지 않는 출력 형식: {} (text, json)", other)),
        }
    }
}

/// 백테스트 CLI 설정.
#[derive(Debug, Clone)]
pub struct BacktestCliConfig {
    /// OHLCV CSV 파일 경로
    pub data_path: String,
    /// 종목 코드
    pub symbol: String,
    /// 전략 ID 또는 별칭
    pub strategy: String,
    /// 전략 파라미터 TOML 파일 (옵션)
    pub params_path: Option<String>,
    /// 초기 자본금
    pub initial_capital: Decimal,
    /// 슬리피지 비율 오버라이드 (None이면 설정 파일 기본값)
    pub slippage_rate: Option<Decimal>,
    /// 수수료율 오버라이드 (None이면 시장 규칙 수수료 체계)
    pub commission_rate: Option<Decimal>,
    /// 시작일 (옵션)
    pub start_date: Option<DateTime<Utc>>,
    /// 종료일 (옵션)
    pub end_date: Option<DateTime<Utc>>,
    /// 벤치마크 CSV 파일 (옵션)
    pub benchmark_path: Option<String>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 보고서 저장 경로 (옵션)
    pub output_path: Option<String>,
}

impl BacktestCliConfig {
    /// CLI 인자에서 설정을 조립합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn parse_args(
        data: String,
        symbol: String,
        strategy: String,
        params: Option<String>,
        capital: String,
        slippage: Option<String>,
        commission: Option<String>,
        from: Option<String>,
        to: Option<String>,
        benchmark: Option<String>,
        format: String,
        output: Option<String>,
    ) -> Result<Self> {
        let initial_capital = Decimal::from_str(&capital)
            .with_context(|| format!("초기 자본금 파싱 실패: {}", capital))?;
        let slippage_rate = slippage
            .map(|s| {
                Decimal::from_str(&s).with_context(|| format!("슬리피지 비율 파싱 실패: {}", s))
            })
            .transpose()?;
        let commission_rate = commission
            .map(|s| {
                Decimal::from_str(&s).with_context(|| format!("수수료율 파싱 실패: {}", s))
            })
            .transpose()?;

        Ok(Self {
            data_path: data,
            symbol,
            strategy,
            params_path: params,
            initial_capital,
            slippage_rate,
            commission_rate,
            start_date: from.map(|s| parse_date(&s)).transpose()?,
            end_date: to.map(|s| parse_date_end(&s)).transpose()?,
            benchmark_path: benchmark,
            format: format.parse()?,
            output_path: output,
        })
    }
}

/// YYYY-MM-DD를 UTC 자정으로 파싱합니다.
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("날짜 파싱 실패: {} (YYYY-MM-DD)", s))?;
    Ok(date.and_hms_opt(0, 0, 0).context("유효하지 않은 날짜")?.and_utc())
}

/// 종료일은 해당 날짜 전체를 포함하도록 23:59:59로 파싱합니다.
fn parse_date_end(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("날짜 파싱 실패: {} (YYYY-MM-DD)", s))?;
    Ok(date
        .and_hms_opt(23, 59, 59)
        .context("유효하지 않은 날짜")?
        .and_utc())
}

/// 전략 파라미터 TOML 파일을 읽습니다. 파일이 없으면 빈 테이블입니다.
fn load_params(path: Option<&str>) -> Result<toml::Value> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("파라미터 파일 읽기 실패: {}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("파라미터 파일 파싱 실패: {}", path))
        }
        None => Ok(toml::Value::Table(toml::map::Map::new())),
    }
}

/// 백테스트를 실행하고 결과를 출력합니다.
pub fn run_backtest(config: BacktestCliConfig) -> Result<()> {
    let meta = registry::find(&config.strategy)
        .ok_or_else(|| anyhow!("알 수 없는 전략: {} (quantlab strategies로 목록 확인)", config.strategy))?;
    info!(strategy = meta.id, symbol = %config.symbol, "백테스트 준비");

    let params = load_params(config.params_path.as_deref())?;
    let mut strategy = registry::build(&config.strategy, &params)?;

    let bars = load_bars(&config.data_path)?;

    // config/default.toml과 QUANTLAB__* 환경 변수의 엔진 기본값 적용,
    // CLI 플래그가 있으면 우선
    let app_config = AppConfig::load_default().context("설정 로드 실패")?;
    let slippage_rate = config
        .slippage_rate
        .unwrap_or(app_config.engine.slippage_rate);
    let mut engine_config = BacktestConfig::new(config.symbol.clone())
        .with_initial_capital(config.initial_capital)
        .with_slippage_rate(slippage_rate)
        .with_max_position_size(app_config.engine.max_position_size)
        .with_warmup_bars(app_config.engine.warmup_bars)
        .with_market(app_config.market)
        .with_period(config.start_date, config.end_date);
    if let Some(rate) = config.commission_rate {
        engine_config = engine_config.with_commission_rate(rate);
    }
    let mut engine = BacktestEngine::new(engine_config)?;

    if let Some(benchmark_path) = &config.benchmark_path {
        let benchmark: Vec<(DateTime<Utc>, Decimal)> = load_bars(benchmark_path)?
            .iter()
            .map(|bar| (bar.timestamp, bar.close))
            .collect();
        engine = engine.with_benchmark(benchmark);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("진행 표시줄 템플릿 파싱 실패")?,
    );
    pb.set_message(format!("{} 백테스트 실행 중...", config.symbol));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = engine.run(strategy.as_mut(), &bars)?;
    pb.finish_and_clear();

    emit_report(&report, config.format, config.output_path.as_deref())
}

/// 보고서를 stdout 또는 파일에 출력합니다.
fn emit_report(report: &BacktestReport, format: OutputFormat, output: Option<&str>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => report.summary(),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    match output {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &rendered)
                .with_context(|| format!("보고서 저장 실패: {}", path))?;
            info!(path, "보고서 저장 완료");
            println!("보고서 저장: {}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
