use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_core::domain::analysis::AnalysisResult;
use portfolio_core::domain::portfolio::parse_portfolio;
use portfolio_core::reference::ReferenceTable;
use portfolio_core::scoring::analyze_portfolio;

#[derive(Debug, Parser)]
#[command(name = "portfolio_cli")]
struct Args {
    /// Holdings as `TICKER: QTY` pairs separated by commas, e.g. "TCS: 10, INFY: 5".
    #[arg(long)]
    portfolio: String,

    /// Reference table CSV. Overrides REFERENCE_TABLE_PATH.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = portfolio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let reference_path = args
        .reference
        .clone()
        .unwrap_or_else(|| settings.reference_table_path.clone());

    let reference = ReferenceTable::load(&reference_path).map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        e
    })?;

    let result = run(&args.portfolio, &reference);
    tracing::info!(
        reference = %reference_path.display(),
        risk_level = %result.risk_level,
        "portfolio analyzed"
    );

    println!("{}", render(&result, args.pretty)?);
    Ok(())
}

fn run(portfolio_str: &str, reference: &ReferenceTable) -> AnalysisResult {
    let portfolio = parse_portfolio(portfolio_str);
    if portfolio.is_empty() && !portfolio_str.trim().is_empty() {
        tracing::warn!("no holdings recognised; expected `TICKER: QTY` pairs");
    }
    analyze_portfolio(&portfolio, reference)
}

fn render(result: &AnalysisResult, pretty: bool) -> anyhow::Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    };
    out.context("failed to serialize analysis result")
}

fn init_sentry(settings: &portfolio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
