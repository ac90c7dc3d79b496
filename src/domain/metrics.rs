//! Performance metrics over equity curves.
//!
//! Every metric degrades to `0.0` instead of panicking or dividing by zero
//! when the curve is too short or degenerate, so report generation never
//! fails after a simulation has already succeeded.

use chrono::NaiveDate;

use crate::domain::error::EtfRotorError;
use crate::domain::prices::PriceTable;
use crate::domain::simulation::EquityPoint;
use crate::domain::universe::Universe;

/// Trading days per year, used to annualize daily return statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Calendar days per year, used for CAGR over the elapsed calendar span.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

/// Daily simple returns of an equity curve, one fewer element than the input.
pub fn daily_returns(curve: &[EquityPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .map(|w| {
            if w[0].value != 0.0 {
                (w[1].value - w[0].value) / w[0].value
            } else {
                0.0
            }
        })
        .collect()
}

/// Compound annual growth rate over the calendar span of the curve. Zero for
/// curves with fewer than two points, a non-positive endpoint, or no elapsed
/// time.
pub fn cagr(curve: &[EquityPoint]) -> f64 {
    let (first, last) = match (curve.first(), curve.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if curve.len() < 2 || first.value <= 0.0 || last.value <= 0.0 {
        return 0.0;
    }
    let days = (last.date - first.date).num_days();
    if days <= 0 {
        return 0.0;
    }
    let years = days as f64 / CALENDAR_DAYS_PER_YEAR;
    (last.value / first.value).powf(1.0 / years) - 1.0
}

/// Deepest peak-to-trough decline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxDrawdown {
    /// Fractional depth, e.g. `0.25` for a 25% decline. Zero when the curve
    /// never declines.
    pub depth: f64,
    /// Date of the peak in effect when the deepest trough was reached.
    pub peak_date: Option<NaiveDate>,
    /// Date of the deepest trough.
    pub trough_date: Option<NaiveDate>,
}

/// Scan the curve with a running peak and report the deepest drawdown. A
/// curve with fewer than two points, or one that never declines, reports a
/// zero depth with no dates.
pub fn max_drawdown(curve: &[EquityPoint]) -> MaxDrawdown {
    let mut result = MaxDrawdown {
        depth: 0.0,
        peak_date: None,
        trough_date: None,
    };
    if curve.len() < 2 {
        return result;
    }

    let mut peak = curve[0].value;
    let mut peak_date = curve[0].date;
    for point in &curve[1..] {
        if point.value > peak {
            peak = point.value;
            peak_date = point.date;
        } else if peak > 0.0 {
            let depth = (peak - point.value) / peak;
            if depth > result.depth {
                result.depth = depth;
                result.peak_date = Some(peak_date);
                result.trough_date = Some(point.date);
            }
        }
    }
    result
}

/// Annualized Sharpe ratio of daily returns in excess of `risk_free_rate`
/// (an annual rate, spread evenly over trading days). Zero when there are
/// fewer than two returns or the return series has no variance.
pub fn sharpe(curve: &[EquityPoint], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let n = returns.len() as f64;
    let mean = returns.iter().map(|r| r - daily_rf).sum::<f64>() / n;
    // Sample variance with n-1 in the denominator.
    let var = returns
        .iter()
        .map(|r| {
            let d = (r - daily_rf) - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1.0);
    if var <= 0.0 {
        return 0.0;
    }
    mean / var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Metrics for one equity series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub label: String,
    pub final_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: MaxDrawdown,
    pub sharpe: f64,
}

impl MetricsSummary {
    pub fn from_curve(label: &str, curve: &[EquityPoint], risk_free_rate: f64) -> Self {
        let first = curve.first().map(|p| p.value).unwrap_or(0.0);
        let last = curve.last().map(|p| p.value).unwrap_or(0.0);
        let total_return = if first > 0.0 { last / first - 1.0 } else { 0.0 };
        MetricsSummary {
            label: label.to_string(),
            final_value: last,
            total_return,
            cagr: cagr(curve),
            max_drawdown: max_drawdown(curve),
            sharpe: sharpe(curve, risk_free_rate),
        }
    }
}

/// The strategy measured against two passive baselines over the same dates:
/// buy-and-hold of the benchmark and an equal-weight buy-and-hold of the
/// whole universe.
#[derive(Debug, Clone)]
pub struct PerformanceReport {
    pub strategy: MetricsSummary,
    pub benchmark: MetricsSummary,
    pub equal_weight: MetricsSummary,
    pub benchmark_curve: Vec<EquityPoint>,
    pub equal_weight_curve: Vec<EquityPoint>,
}

impl PerformanceReport {
    pub fn compute(
        strategy_curve: &[EquityPoint],
        daily: &PriceTable,
        universe: &Universe,
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Result<Self, EtfRotorError> {
        let benchmark_curve = buy_and_hold_curve(daily, &universe.benchmark, initial_capital)?;
        let equal_weight_curve = equal_weight_curve(daily, &universe.symbols, initial_capital)?;

        Ok(PerformanceReport {
            strategy: MetricsSummary::from_curve("strategy", strategy_curve, risk_free_rate),
            benchmark: MetricsSummary::from_curve(
                &universe.benchmark,
                &benchmark_curve,
                risk_free_rate,
            ),
            equal_weight: MetricsSummary::from_curve(
                "equal-weight",
                &equal_weight_curve,
                risk_free_rate,
            ),
            benchmark_curve,
            equal_weight_curve,
        })
    }
}

/// Buy-and-hold equity for one symbol: the whole stake goes in at the first
/// price and is marked to market every day after.
pub fn buy_and_hold_curve(
    daily: &PriceTable,
    symbol: &str,
    initial_capital: f64,
) -> Result<Vec<EquityPoint>, EtfRotorError> {
    let series = daily.series(symbol).ok_or_else(|| EtfRotorError::PriceData {
        source_name: "daily prices".to_string(),
        reason: format!("missing column {}", symbol),
    })?;
    let dates = daily.dates();

    let mut curve = Vec::with_capacity(dates.len());
    let mut start = 0.0;
    for (i, (&date, &price)) in dates.iter().zip(series).enumerate() {
        if !price.is_finite() || price <= 0.0 {
            return Err(EtfRotorError::MissingPrice {
                symbol: symbol.to_string(),
                date,
            });
        }
        if i == 0 {
            start = price;
        }
        curve.push(EquityPoint {
            date,
            value: initial_capital * price / start,
        });
    }
    Ok(curve)
}

/// Equal-weight buy-and-hold across `symbols`: each symbol gets `1/n` of the
/// stake at its first price, with no rebalancing afterwards.
pub fn equal_weight_curve(
    daily: &PriceTable,
    symbols: &[String],
    initial_capital: f64,
) -> Result<Vec<EquityPoint>, EtfRotorError> {
    if symbols.is_empty() {
        return Ok(daily
            .dates()
            .iter()
            .map(|&date| EquityPoint {
                date,
                value: initial_capital,
            })
            .collect());
    }

    let per_symbol = initial_capital / symbols.len() as f64;
    let mut totals = vec![0.0; daily.len()];
    for symbol in symbols {
        let leg = buy_and_hold_curve(daily, symbol, per_symbol)?;
        for (total, point) in totals.iter_mut().zip(&leg) {
            *total += point.value;
        }
    }

    Ok(daily
        .dates()
        .iter()
        .zip(totals)
        .map(|(&date, value)| EquityPoint { date, value })
        .collect())
}
