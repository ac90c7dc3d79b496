//! CSV report adapter.
//!
//! Persists a finished run as three files in the output directory:
//! `equity_curve.csv` (strategy and both baselines), `trades.csv`, and
//! `summary.csv` (one metrics row per series).

use std::fs;
use std::path::Path;

use crate::domain::error::EtfRotorError;
use crate::domain::metrics::{MetricsSummary, PerformanceReport};
use crate::domain::simulation::{SimulationResult, TradeReason, TradeSide};
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_equity_curve(
        result: &SimulationResult,
        report: &PerformanceReport,
        path: &Path,
    ) -> Result<(), EtfRotorError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_io)?;
        wtr.write_record(["date", "strategy", "benchmark", "equal_weight"])
            .map_err(csv_io)?;

        for (i, point) in result.equity_curve.iter().enumerate() {
            let benchmark = report
                .benchmark_curve
                .get(i)
                .map(|p| p.value)
                .unwrap_or(f64::NAN);
            let equal_weight = report
                .equal_weight_curve
                .get(i)
                .map(|p| p.value)
                .unwrap_or(f64::NAN);
            wtr.write_record([
                point.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", point.value),
                format!("{:.2}", benchmark),
                format!("{:.2}", equal_weight),
            ])
            .map_err(csv_io)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(result: &SimulationResult, path: &Path) -> Result<(), EtfRotorError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_io)?;
        wtr.write_record(["date", "symbol", "side", "shares", "price", "cost", "reason"])
            .map_err(csv_io)?;

        for trade in &result.trades {
            wtr.write_record([
                trade.date.format("%Y-%m-%d").to_string(),
                trade.symbol.clone(),
                side_label(trade.side).to_string(),
                format!("{:.6}", trade.shares),
                format!("{:.4}", trade.price),
                format!("{:.4}", trade.cost),
                reason_label(trade.reason).to_string(),
            ])
            .map_err(csv_io)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(report: &PerformanceReport, path: &Path) -> Result<(), EtfRotorError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_io)?;
        wtr.write_record([
            "series",
            "final_value",
            "total_return",
            "cagr",
            "max_drawdown",
            "drawdown_peak",
            "drawdown_trough",
            "sharpe",
        ])
        .map_err(csv_io)?;

        for summary in [&report.strategy, &report.benchmark, &report.equal_weight] {
            wtr.write_record(summary_record(summary)).map_err(csv_io)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &SimulationResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<(), EtfRotorError> {
        fs::create_dir_all(output_dir)?;
        Self::write_equity_curve(result, report, &output_dir.join("equity_curve.csv"))?;
        Self::write_trades(result, &output_dir.join("trades.csv"))?;
        Self::write_summary(report, &output_dir.join("summary.csv"))?;
        Ok(())
    }
}

fn csv_io(e: csv::Error) -> EtfRotorError {
    EtfRotorError::Io(std::io::Error::other(e))
}

fn side_label(side: TradeSide) -> &'static str {
    match side {
        TradeSide::Buy => "buy",
        TradeSide::Sell => "sell",
    }
}

fn reason_label(reason: TradeReason) -> &'static str {
    match reason {
        TradeReason::Rebalance => "rebalance",
        TradeReason::Drift => "drift",
        TradeReason::ExitSignal => "exit_signal",
    }
}

fn summary_record(summary: &MetricsSummary) -> Vec<String> {
    vec![
        summary.label.clone(),
        format!("{:.2}", summary.final_value),
        format!("{:.6}", summary.total_return),
        format!("{:.6}", summary.cagr),
        format!("{:.6}", summary.max_drawdown.depth),
        summary
            .max_drawdown
            .peak_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        summary
            .max_drawdown
            .trough_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        format!("{:.6}", summary.sharpe),
    ]
}
