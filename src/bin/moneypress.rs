use moneypress::config::Config;
use moneypress::services::screening_service::ScreeningService;
use moneypress::sources::{LocalDataSource, MarketDataSource, RemoteDataSource};
use moneypress::store::DataStore;

use clap::{App, Arg, ArgMatches, SubCommand};
use chrono::NaiveDate;
use log::{info, error};
use std::error::Error;
use std::sync::Arc;

// 数据来源与数据目录参数，各子命令共用
fn with_source_args(app: App<'_>) -> App<'_> {
    app.arg(
        Arg::with_name("source")
            .long("source")
            .value_name("SOURCE")
            .help("Where to read scraped data from (local, remote)")
            .takes_value(true)
            .default_value("local"),
    )
    .arg(
        Arg::with_name("base-url")
            .long("base-url")
            .value_name("URL")
            .help("Base URL of the remote data mirror")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("Local data directory")
            .takes_value(true)
            .default_value("data"),
    )
}

fn build_source(
    matches: &ArgMatches,
    config: &Config,
) -> Result<Arc<dyn MarketDataSource + Send + Sync>, Box<dyn Error>> {
    let source = matches.value_of("source").unwrap_or("local");
    match source.to_lowercase().as_str() {
        "local" => Ok(Arc::new(LocalDataSource::new(DataStore::new(&config.data_dir)))),
        "remote" => {
            let base_url = config.remote_base_url.as_deref()
                .ok_or("--base-url is required for the remote source")?;
            Ok(Arc::new(RemoteDataSource::new(base_url)?))
        }
        _ => {
            error!("Unknown source: {}", source);
            Err(format!("Unknown source: {}", source).into())
        }
    }
}

fn parse_date(matches: &ArgMatches) -> Result<NaiveDate, Box<dyn Error>> {
    let date_str = matches.value_of("date").ok_or("missing --date")?;
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let app = App::new("moneypress")
        .version("2021.6.9")
        .about("Shortlist optionable stocks from earnings and price history scores");

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
            .help("Limit the number of candidates to analyze in debug mode")
            .takes_value(true)
            .default_value("2"),
    );

    let date_arg = Arg::with_name("date")
        .short('d')
        .long("date")
        .value_name("DATE")
        .help("Date treated as today (YYYY-MM-DD)")
        .takes_value(true)
        .default_value(&today);

    let days_arg = Arg::with_name("days")
        .long("days")
        .value_name("DAYS")
        .help("Number of past days of earnings to screen")
        .takes_value(true)
        .default_value("15");

    let app = app
        .subcommand(with_source_args(
            SubCommand::with_name("screen")
                .about("Run the full screen: earnings, weekly options, price history scores")
                .arg(date_arg.clone())
                .arg(days_arg.clone()),
        ))
        .subcommand(with_source_args(
            SubCommand::with_name("candidates")
                .about("Intersect the earnings calendar with weekly options only")
                .arg(date_arg)
                .arg(days_arg),
        ))
        .subcommand(with_source_args(
            SubCommand::with_name("analyze")
                .about("Analyze the price history of a single symbol")
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Stock symbol to analyze")
                        .required(true)
                        .takes_value(true),
                ),
        ))
        .subcommand(with_source_args(
            SubCommand::with_name("profile")
                .about("Show the company profile of a symbol, refreshing it when older than a week")
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Stock symbol")
                        .required(true)
                        .takes_value(true),
                ),
        ))
        .subcommand(
            SubCommand::with_name("show")
                .about("Show the saved suggestions")
                .arg(
                    Arg::with_name("data-dir")
                        .long("data-dir")
                        .value_name("DIR")
                        .takes_value(true)
                        .default_value("data"),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_symbol_limit = matches.value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_symbol_limit = usize::MAX;

    let base_config = |sub: &ArgMatches| {
        let mut config = Config::new()
            .with_debug_mode(debug_mode)
            .with_debug_symbol_limit(debug_symbol_limit)
            .with_data_dir(sub.value_of("data-dir").unwrap_or("data"));
        if let Some(url) = sub.value_of("base-url") {
            config = config.with_remote_base_url(url);
        }
        config
    };

    // 仅 screen 与 candidates 子命令定义了 --days
    let with_days = |config: Config, sub: &ArgMatches| {
        match sub.value_of("days").and_then(|d| d.parse::<usize>().ok()) {
            Some(days) => config.with_earnings_days_in_past(days),
            None => config,
        }
    };

    if let Some(matches) = matches.subcommand_matches("screen") {
        let date = parse_date(matches)?;
        let config = with_days(base_config(matches), matches);
        let source = build_source(matches, &config)?;
        let service = ScreeningService::new(config, source);

        let report = service.run(date).await?;
        info!("Earnings events: {}, weekly option symbols: {}, removed negative surprises: {}",
              report.earnings_events, report.optionable_symbols, report.pruned);
        info!("Profiles: {}, analyzed {} of {} candidates",
              report.profiles, report.analyzed(), report.candidates.len());
        for failure in &report.failures {
            info!("  skipped {} at {}: {}", failure.symbol, failure.stage, failure.error);
        }
    } else if let Some(matches) = matches.subcommand_matches("candidates") {
        let date = parse_date(matches)?;
        let config = with_days(base_config(matches), matches);
        let source = build_source(matches, &config)?;
        let service = ScreeningService::new(config, source);

        let report = service.screen_candidates(date).await?;
        info!("{} candidates saved to {}",
              report.candidates.len(), service.store().suggestions_path().display());
    } else if let Some(matches) = matches.subcommand_matches("analyze") {
        let symbol = matches.value_of("symbol").ok_or("missing --symbol")?.to_uppercase();
        let config = base_config(matches);
        let source = build_source(matches, &config)?;
        let service = ScreeningService::new(config, source);

        match service.analyze_symbol(&symbol).await {
            Ok(analysis) => {
                info!("{} trend average: {:.6}, positive: {}",
                      symbol, analysis.close_trend_average, analysis.is_trend_positive);
                info!("{} close > SMA: {}, close near 2 stdev: {}",
                      symbol, analysis.is_close_greater_than_sma, analysis.is_close_nearer_2_stdev);
                info!("{} price history score: {}", symbol, analysis.price_history_score);
            }
            Err(failure) => {
                error!("{}: {} failed: {}", failure.symbol, failure.stage, failure.error);
                return Err(failure.error.into());
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("profile") {
        let symbol = matches.value_of("symbol").ok_or("missing --symbol")?.to_uppercase();
        let config = base_config(matches);
        let source = build_source(matches, &config)?;
        let service = ScreeningService::new(config, source);

        match service.refresh_company_profile(&symbol, chrono::Local::now().naive_local()).await {
            Ok(profile) => {
                info!("{} ({})", profile.symbol, profile.stock_type);
                if !profile.description.is_empty() {
                    info!("{}", profile.description);
                }
                for (label, value) in &profile.details {
                    info!("  {:<20} {}", label, value.as_str().unwrap_or_default());
                }
                if let Some(updated) = profile.last_updated {
                    info!("Last updated: {}", updated);
                }
            }
            Err(failure) => {
                error!("{}: {} failed: {}", failure.symbol, failure.stage, failure.error);
                return Err(failure.error.into());
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("show") {
        let limit = matches.value_of("limit")
            .unwrap_or("10")
            .parse::<usize>()
            .unwrap_or(10);
        let store = DataStore::new(matches.value_of("data-dir").unwrap_or("data"));
        let suggestions = store.load_suggestions()?;

        info!("Found {} suggestions", suggestions.len());
        info!("{:<8} {:<12} {:<10} {:<10} {:<8} {:<10}",
              "Symbol", "Earnings", "EPS", "Surprise", "Score", "PH Score");
        info!("{:-<60}", "");
        for event in suggestions.iter().take(limit) {
            let fmt_opt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string());
            info!("{:<8} {:<12} {:<10} {:<10} {:<8.1} {:<10}",
                  event.symbol, event.earnings_date.to_string(), fmt_opt(event.reported_eps),
                  fmt_opt(event.surprise_percent), event.earnings_score, fmt_opt(event.price_history_score));
        }
        if suggestions.len() > limit {
            info!("... and {} more records", suggestions.len() - limit);
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
