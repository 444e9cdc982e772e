use dividend_screener::config::{Config, DEFAULT_OUTPUT_FILE};
use dividend_screener::data_provider::{AShareProvider, MarketDataProvider};
use dividend_screener::models::stock::StockIdentifier;
use dividend_screener::screener::{self, Verdict};
use dividend_screener::services::screening_service::ScreeningService;

use clap::{App, Arg, SubCommand};
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    // 创建基本的命令行应用
    let app = App::new("DividendScreener")
        .version("1.0.0")
        .about("A-share high dividend yield screener");

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug")
            .long("debug")
            .help("Enable debug mode")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .help("Limit the number of stocks to process in debug mode")
            .takes_value(true)
            .default_value("10"),
    );

    // 添加子命令
    let app = app.subcommand(
        SubCommand::with_name("screen")
            .about("Screen all A-share stocks for qualifying dividend yield and export to Excel")
            .arg(
                Arg::with_name("output")
                    .short('o')
                    .long("output")
                    .value_name("FILE")
                    .help("Output xlsx file")
                    .takes_value(true)
                    .default_value(DEFAULT_OUTPUT_FILE),
            )
            .arg(
                Arg::with_name("min-yield")
                    .long("min-yield")
                    .value_name("PERCENT")
                    .help("Minimum dividend yield in percent")
                    .takes_value(true)
                    .default_value("3.0"),
            )
            .arg(
                Arg::with_name("years")
                    .long("years")
                    .value_name("YEARS")
                    .help("Latest cash dividend must be no older than this many years")
                    .takes_value(true)
                    .default_value("2"),
            )
            .arg(
                Arg::with_name("pace-delay-ms")
                    .long("pace-delay-ms")
                    .value_name("MS")
                    .help("Pause after every 50 stocks, in milliseconds")
                    .takes_value(true)
                    .default_value("1000"),
            ),
    ).subcommand(
        SubCommand::with_name("dividends")
            .about("Show dividend history and verdict for one stock")
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Stock code, e.g. 600000")
                    .required(true)
                    .takes_value(true),
            ),
    );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_stock_limit = matches.value_of("debug-limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);
    #[cfg(not(debug_assertions))]
    let debug_stock_limit = usize::MAX;

    if let Some(matches) = matches.subcommand_matches("screen") {
        let output = matches.value_of("output").unwrap_or(DEFAULT_OUTPUT_FILE);
        let min_yield = matches.value_of("min-yield")
            .unwrap_or("3.0")
            .parse::<f64>()?;
        let years = matches.value_of("years")
            .unwrap_or("2")
            .parse::<i32>()?;
        let pace_delay_ms = matches.value_of("pace-delay-ms")
            .unwrap_or("1000")
            .parse::<u64>()?;

        // 创建配置
        let config = Config::new()
            .with_debug_mode(debug_mode)
            .with_debug_stock_limit(debug_stock_limit)
            .with_output_path(output)
            .with_min_yield_percent(min_yield)
            .with_recency_years(years)
            .with_pacing(50, Duration::from_millis(pace_delay_ms));

        let provider = Arc::new(AShareProvider::new()?);
        let service = ScreeningService::new(config, provider);
        service.run_and_export().await?;
    } else if let Some(matches) = matches.subcommand_matches("dividends") {
        let symbol = matches.value_of("symbol").ok_or("missing --symbol")?;

        let provider = Arc::new(AShareProvider::new()?);
        let records = provider.fetch_dividends(symbol).await?;
        let prices = provider.fetch_spot_prices().await?;

        info!("Stock {}: {} dividend records", symbol, records.len());
        info!("{:-<80}", "");
        info!("{:<12} {:<10} {:<10} {:<12} {:<12} {:<12}",
              "Announced", "Kind", "Cash/10", "Record", "Ex-date", "Period");
        info!("{:-<80}", "");
        for r in &records {
            let fmt_date = |d: Option<chrono::NaiveDate>| {
                d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string())
            };
            info!("{:<12} {:<10} {:<10.2} {:<12} {:<12} {:<12}",
                  r.report_date, r.kind.label(), r.cash_ratio,
                  fmt_date(r.record_date), fmt_date(r.ex_dividend_date),
                  r.report_period.as_deref().unwrap_or("-"));
        }

        let config = Config::new();
        let service = ScreeningService::new(config, provider.clone());
        let stock = StockIdentifier::new("", symbol, "");
        match screener::evaluate(&stock, &records, &prices, &service.criteria()) {
            Verdict::Qualified(result) => info!(
                "Qualified: price {:.2}, dividend/share {:.2}, yield {:.2}% ({})",
                result.latest_price, result.dividend_per_share, result.yield_percent, result.dividend_year
            ),
            other => info!("Not qualified: {:?}", other),
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
