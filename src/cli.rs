//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::{select_allocation, Allocation};
use crate::domain::config_validation::{
    simulation_config_from, universe_from_config, validate_config,
};
use crate::domain::error::EtfRotorError;
use crate::domain::metrics::{MetricsSummary, PerformanceReport};
use crate::domain::prices::PriceTable;
use crate::domain::simulation::{run_simulation, SimulationConfig, SimulationResult};
use crate::domain::universe::Universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "etfrotor", about = "ETF rotation strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full simulation and write a report
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Report directory, overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the target allocation for a given date
    Allocate {
        #[arg(short, long)]
        config: PathBuf,
        /// Allocation date (YYYY-MM-DD), defaults to the last date on file
        #[arg(long)]
        date: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate { config, output } => run_simulate(&config, output),
        Command::Allocate { config, date } => run_allocate(&config, date.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EtfRotorError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_simulate(config_path: &PathBuf, output_override: Option<PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (result, report, universe, sim_config) = match simulate_pipeline(&adapter) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Simulation Results ===");
    eprintln!("Trades executed:  {}", result.trades.len());
    eprintln!("Initial capital:  {:.2}", sim_config.initial_capital);
    print_summary(&report.strategy);
    eprintln!("\n=== {} buy-and-hold ===", universe.benchmark);
    print_summary(&report.benchmark);
    eprintln!("\n=== Equal-weight buy-and-hold ===");
    print_summary(&report.equal_weight);

    let output_dir = output_override.unwrap_or_else(|| {
        adapter
            .get_string("report", "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("report"))
    });

    match CsvReportAdapter::new().write(&result, &report, &output_dir) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// The simulate pipeline behind the CLI surface: validate, load, run, measure.
pub fn simulate_pipeline(
    adapter: &dyn ConfigPort,
) -> Result<
    (
        SimulationResult,
        PerformanceReport,
        Universe,
        SimulationConfig,
    ),
    EtfRotorError,
> {
    validate_config(adapter)?;
    let universe = universe_from_config(adapter)?;
    let sim_config = simulation_config_from(adapter)?;

    let (daily, weekly) = load_tables(adapter)?;
    eprintln!(
        "Loaded {} daily and {} weekly rows for {} symbols",
        daily.len(),
        weekly.len(),
        universe.count(),
    );

    let result = run_simulation(&daily, &weekly, &universe, &sim_config)?;
    let report = PerformanceReport::compute(
        &result.equity_curve,
        &daily,
        &universe,
        sim_config.initial_capital,
        sim_config.risk_free_rate,
    )?;
    Ok((result, report, universe, sim_config))
}

/// Load the daily table and a weekly table, resampling the daily closes when
/// no weekly file is configured.
pub fn load_tables(adapter: &dyn ConfigPort) -> Result<(PriceTable, PriceTable), EtfRotorError> {
    let daily_path = adapter
        .get_string("data", "daily_csv")
        .ok_or_else(|| EtfRotorError::ConfigMissing {
            section: "data".to_string(),
            key: "daily_csv".to_string(),
        })?;
    let weekly_path = adapter.get_string("data", "weekly_csv");

    let data_port = CsvPriceAdapter::new(
        PathBuf::from(daily_path),
        weekly_path.map(PathBuf::from),
    );

    let daily = data_port.load_daily()?;
    let weekly = match data_port.load_weekly()? {
        Some(table) => table,
        None => daily.resample_weekly(),
    };
    Ok((daily, weekly))
}

fn run_allocate(config_path: &PathBuf, date_str: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let universe = match universe_from_config(&adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let (daily, weekly) = match load_tables(&adapter) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let as_of = match date_str {
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                eprintln!("error: invalid date '{s}', expected YYYY-MM-DD");
                return ExitCode::from(2);
            }
        },
        None => match daily.dates().last() {
            Some(&d) => d,
            None => {
                eprintln!("error: daily price table is empty");
                return ExitCode::from(3);
            }
        },
    };

    let target = select_allocation(daily.view_to(as_of), weekly.view_to(as_of), &universe, None);

    eprintln!("Target allocation as of {as_of}:");
    match &target {
        Allocation::Cash => println!("CASH 1.0000"),
        Allocation::Weighted(weights) => {
            for (symbol, weight) in weights {
                println!("{symbol} {weight:.4}");
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let universe = match universe_from_config(&adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let sim_config = match simulation_config_from(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nUniverse:");
    eprintln!("  symbols:   {}", universe.symbols.join(", "));
    eprintln!("  benchmark: {}", universe.benchmark);
    eprintln!("\nSimulation:");
    eprintln!("  initial_capital:       {:.2}", sim_config.initial_capital);
    eprintln!("  rebalance_frequency:   {:?}", sim_config.rebalance_frequency);
    eprintln!(
        "  transaction_cost_rate: {}",
        sim_config.transaction_cost_rate
    );
    eprintln!("  drift_tolerance:       {}", sim_config.drift_tolerance);
    eprintln!("  risk_free_rate:        {}", sim_config.risk_free_rate);
    eprintln!("\nConfig validated successfully");
    ExitCode::SUCCESS
}

fn print_summary(summary: &MetricsSummary) {
    eprintln!("Final value:      {:.2}", summary.final_value);
    eprintln!("Total return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("CAGR:             {:.2}%", summary.cagr * 100.0);
    match (
        summary.max_drawdown.peak_date,
        summary.max_drawdown.trough_date,
    ) {
        (Some(peak), Some(trough)) => eprintln!(
            "Max drawdown:     -{:.1}% ({} to {})",
            summary.max_drawdown.depth * 100.0,
            peak,
            trough,
        ),
        _ => eprintln!(
            "Max drawdown:     -{:.1}%",
            summary.max_drawdown.depth * 100.0
        ),
    }
    eprintln!("Sharpe ratio:     {:.2}", summary.sharpe);
}
