//! valsheet CLI - equity valuation workbook builder

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use valsheet_formula::evaluate_cell;
use valsheet_model::{DcfBuilder, DividendAnalysis, Figure, MarketInputs, StatementPack};
use valsheet_xlsx::XlsxWriter;

#[derive(Parser)]
#[command(name = "valsheet")]
#[command(author, version, about = "Build and interrogate equity valuation workbooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a DCF model workbook from exported statement tables
    Build {
        /// Ticker symbol
        ticker: String,

        /// Directory of statement CSV exports
        #[arg(short, long)]
        statements: PathBuf,

        /// Market inputs JSON file
        #[arg(short, long)]
        market: PathBuf,

        /// Output workbook (default: <ticker>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the model in memory and evaluate a labeled cell
    Value {
        /// Ticker symbol
        ticker: String,

        /// Directory of statement CSV exports
        #[arg(short, long)]
        statements: PathBuf,

        /// Market inputs JSON file
        #[arg(short, long)]
        market: PathBuf,

        /// Label of the scalar to evaluate
        #[arg(short, long, default_value = "Estimated value / share")]
        label: String,
    },

    /// Print the dividend metrics report
    Dividend {
        /// Ticker symbol
        ticker: String,

        /// Directory of statement CSV exports
        #[arg(short, long)]
        statements: PathBuf,

        /// Market inputs JSON file
        #[arg(short, long)]
        market: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            ticker,
            statements,
            market,
            output,
        } => build(&ticker, &statements, &market, output),
        Commands::Value {
            ticker,
            statements,
            market,
            label,
        } => value(&ticker, &statements, &market, &label),
        Commands::Dividend {
            ticker,
            statements,
            market,
        } => dividend(&ticker, &statements, &market),
    }
}

fn load_inputs(statements: &Path, market: &Path) -> Result<(StatementPack, MarketInputs)> {
    let pack = StatementPack::load(statements)
        .with_context(|| format!("Failed to load statements from '{}'", statements.display()))?;
    let inputs = MarketInputs::from_json_file(market)
        .with_context(|| format!("Failed to load market inputs from '{}'", market.display()))?;
    Ok((pack, inputs))
}

fn build(ticker: &str, statements: &Path, market: &Path, output: Option<PathBuf>) -> Result<()> {
    let (pack, inputs) = load_inputs(statements, market)?;
    if let Some(company) = &pack.company {
        info!(%ticker, %company, "building DCF model");
    }

    let sheet = DcfBuilder::new(ticker, &pack, inputs)?
        .build()
        .context("Failed to build the DCF model")?;
    let grid = sheet.into_grid();

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", ticker)));
    XlsxWriter::write_file(&grid, &output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!(
        "Wrote {} cells ({} formulas) to '{}'",
        grid.cell_count(),
        grid.formula_count(),
        output.display()
    );
    Ok(())
}

fn value(ticker: &str, statements: &Path, market: &Path, label: &str) -> Result<()> {
    let (pack, inputs) = load_inputs(statements, market)?;

    let sheet = DcfBuilder::new(ticker, &pack, inputs)?
        .build()
        .context("Failed to build the DCF model")?;

    let entry = sheet
        .get(label)
        .with_context(|| format!("No cell labeled '{}' in the model", label))?;
    let result = evaluate_cell(sheet.grid(), entry.value_ref())
        .with_context(|| format!("Failed to evaluate '{}'", label))?;

    println!("{}: {:.4}", label, result);
    Ok(())
}

fn dividend(ticker: &str, statements: &Path, market: &Path) -> Result<()> {
    let (pack, inputs) = load_inputs(statements, market)?;

    let report = DividendAnalysis::new(&pack, inputs.market_cap)?
        .compute()
        .context("Failed to compute dividend metrics")?;

    println!("Dividend report for {}", ticker.to_uppercase());
    println!();
    println!("Dividend yield (TTM): {}", percent(report.dividend_yield_ttm));
    println!("Dividend yield (FWD): {}", percent(report.dividend_yield_fwd));
    println!("4 year average dividend yield: {}", percent(report.dividend_yield_4y));
    println!("Earnings yield (TTM): {}", percent(report.earnings_yield_ttm));
    println!("Earnings yield (FWD): {}", percent(report.earnings_yield_fwd));
    println!("1 year yield on cost: {}", percent(report.yield_on_cost_1y));
    println!("3 year yield on cost: {}", percent(report.yield_on_cost_3y));
    println!("5 year yield on cost: {}", percent(report.yield_on_cost_5y));
    println!();
    println!("DPS growth (FWD): {}", percent(report.dps_growth_fwd));
    println!("DPS growth (LTM): {}", percent(report.dps_growth_ltm));
    if let Some((growth, years)) = report.dps_growth_next_years {
        println!(
            "DPS growth for next {} years (CAGR): {}",
            years,
            percent(Figure::Known(growth))
        );
    }
    if let Some(growth) = report.dps_growth_past_3y {
        println!(
            "DPS growth for past 3 years (CAGR): {}",
            percent(Figure::Known(growth))
        );
    }
    if let Some(growth) = report.dps_growth_past_5y {
        println!(
            "DPS growth for past 5 years (CAGR): {}",
            percent(Figure::Known(growth))
        );
    }
    println!();
    println!("Cash dividend payout ratio (LTM): {}", percent(report.cash_payout_ratio_ltm));
    println!("Dividend payout ratio (LTM): {}", percent(report.payout_ratio_ltm));
    println!("Cash flow payout ratio (LTM): {}", percent(report.cash_flow_payout_ratio));
    println!();
    println!("Price over NAV: {}", ratio(report.price_over_nav));
    println!("Liability to asset ratio: {}", ratio(report.liability_to_asset));
    println!("Debt to equity ratio: {}", ratio(report.debt_to_equity));
    println!("Cash to short term debt ratio: {}", ratio(report.cash_to_short_term_debt));

    Ok(())
}

fn percent(figure: Figure) -> String {
    match figure.known() {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn ratio(figure: Figure) -> String {
    match figure.known() {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}
