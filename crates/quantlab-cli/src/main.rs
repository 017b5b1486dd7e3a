//! 백테스트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 귀주모태주 일봉으로 SMA 크로스 백테스트
//! quantlab backtest -d data/600519.csv -s 600519 --strategy sma_cross
//!
//! # 전략 파라미터 파일과 기간 지정
//! quantlab backtest -d data/AAPL.csv -s AAPL --strategy rsi \
//!     -p config/rsi.toml -f 2024-01-01 -t 2024-12-31
//!
//! # JSON 보고서 저장
//! quantlab backtest -d data/0700.HK.csv -s 0700.HK --strategy bollinger \
//!     --format json -o report.json
//!
//! # 사용 가능한 전략 목록
//! quantlab strategies
//!
//! # 합성 데이터 생성 (250 거래일, 시드 고정)
//! quantlab generate -o data/synthetic.csv --bars 250 --seed 42
//! ```

use clap::{Parser, Subcommand};
use quantlab_core::init_logging_from_env;
use tracing::error;

mod commands;

use commands::backtest::{run_backtest, BacktestCliConfig};
use commands::generate::{generate_data, GenerateConfig};
use commands::strategies::print_strategies;

#[derive(Parser)]
#[command(name = "quantlab")]
#[command(about = "QuantLab - 다중 시장 주식 백테스트 엔진", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CSV 데이터로 백테스트 실행
    Backtest {
        /// OHLCV CSV 파일 경로
        #[arg(short, long)]
        data: String,

        /// 종목 코드 (예: 600519, 0700.HK, AAPL)
        #[arg(short, long)]
        symbol: String,

        /// 전략 ID 또는 별칭 (strategies 명령어로 목록 확인)
        #[arg(long)]
        strategy: String,

        /// 전략 파라미터 TOML 파일 (생략 시 기본값)
        #[arg(short, long)]
        params: Option<String>,

        /// 초기 자본금
        #[arg(long, default_value = "100000")]
        capital: String,

        /// 슬리피지 비율 오버라이드 (예: 0.0005)
        #[arg(long)]
        slippage: Option<String>,

        /// 수수료율 오버라이드 (지정하면 시장 규칙 수수료 체계 대신 적용)
        #[arg(long)]
        commission: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short = 't', long)]
        to: Option<String>,

        /// 벤치마크 CSV 파일 경로 (알파/베타 계산용)
        #[arg(short, long)]
        benchmark: Option<String>,

        /// 출력 형식 (text, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// 보고서 저장 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 사용 가능한 전략 목록 보기
    Strategies,

    /// 합성 OHLCV 데이터 생성 (랜덤 워크)
    Generate {
        /// 출력 CSV 파일 경로
        #[arg(short, long)]
        output: String,

        /// 생성할 바 수
        #[arg(long, default_value = "250")]
        bars: usize,

        /// 시작 가격
        #[arg(long, default_value = "100")]
        start_price: String,

        /// 일일 변동성 (비율)
        #[arg(long, default_value = "0.02")]
        volatility: f64,

        /// 일일 추세 (비율, 음수 가능)
        #[arg(long, default_value = "0.0005")]
        drift: f64,

        /// 난수 시드 (같은 시드는 같은 데이터 생성)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-02")]
        start_date: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging_from_env() {
        eprintln!("로깅 초기화 실패: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Backtest {
            data,
            symbol,
            strategy,
            params,
            capital,
            slippage,
            commission,
            from,
            to,
            benchmark,
            format,
            output,
        } => BacktestCliConfig::parse_args(
            data, symbol, strategy, params, capital, slippage, commission, from, to, benchmark,
            format, output,
        )
        .and_then(run_backtest),
        Commands::Strategies => {
            print_strategies();
            Ok(())
        }
        Commands::Generate {
            output,
            bars,
            start_price,
            volatility,
            drift,
            seed,
            start_date,
        } => GenerateConfig::parse_args(output, bars, start_price, volatility, drift, seed, start_date)
            .and_then(generate_data),
    };

    if let Err(e) = result {
        error!("명령어 실행 실패: {:#}", e);
        eprintln!("오류: {:#}", e);
        std::process::exit(1);
    }
}
