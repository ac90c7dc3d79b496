//! Event-driven daily simulation.
//!
//! Walks the daily table forward one bar at a time: mark the book to market,
//! ask the selector for a target on history up to today only, decide whether
//! to trade (schedule, drift, or exit override), execute under transaction
//! costs, and record the day's equity. The loop is strictly sequential since
//! today's trigger depends on yesterday's holdings. It owns all mutable
//! state, so a shared [`PriceTable`] can back any number of concurrent runs.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashMap};

use crate::domain::allocation::{select_allocation, Allocation};
use crate::domain::error::EtfRotorError;
use crate::domain::prices::{week_ending_friday, PriceTable};
use crate::domain::universe::Universe;

/// Share deltas below this are not worth a trade.
const SHARE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceFrequency {
    /// Last trading date of each calendar month.
    MonthEnd,
    /// Last trading date of each trailing-Friday week bin.
    WeekEnd,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub rebalance_frequency: RebalanceFrequency,
    pub transaction_cost_rate: f64,
    pub drift_tolerance: f64,
    pub risk_free_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_capital: 10_000.0,
            rebalance_frequency: RebalanceFrequency::MonthEnd,
            transaction_cost_rate: 0.001,
            drift_tolerance: 0.25,
            risk_free_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeReason {
    Rebalance,
    Drift,
    ExitSignal,
}

/// One executed trade. `shares` is the signed delta (positive = buy).
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub symbol: String,
    pub shares: f64,
    pub price: f64,
    pub side: TradeSide,
    pub reason: TradeReason,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    /// Final book, retained as-is rather than auto-liquidated at the end.
    pub holdings: HashMap<String, f64>,
}

/// Run the full simulation over every date in the daily table.
pub fn run_simulation(
    daily: &PriceTable,
    weekly: &PriceTable,
    universe: &Universe,
    config: &SimulationConfig,
) -> Result<SimulationResult, EtfRotorError> {
    if daily.is_empty() {
        return Err(EtfRotorError::InsufficientData {
            rows: 0,
            minimum: 1,
        });
    }
    check_columns(daily, "daily prices", universe)?;
    check_columns(weekly, "weekly prices", universe)?;

    let dates = daily.dates();
    let scheduled = scheduled_flags(dates, config.rebalance_frequency);

    let mut holdings: HashMap<String, f64> = HashMap::new();
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve = vec![EquityPoint {
        date: dates[0],
        value: config.initial_capital,
    }];
    let mut prev_value = config.initial_capital;

    for (i, &date) in dates.iter().enumerate().skip(1) {
        // 1. Mark to market; a flat book carries yesterday's value forward.
        let mut value = if holdings.is_empty() {
            prev_value
        } else {
            let mut total = 0.0;
            for (symbol, &shares) in &holdings {
                total += shares * price_at(daily, date, symbol)?;
            }
            total
        };

        // 2. Current weights, empty when flat.
        let mut weights: HashMap<String, f64> = HashMap::new();
        if !holdings.is_empty() && value > 0.0 {
            for (symbol, &shares) in &holdings {
                let price = price_at(daily, date, symbol)?;
                weights.insert(symbol.clone(), shares * price / value);
            }
        }

        // 3. Target allocation on history up to today.
        let current = if holdings.is_empty() {
            None
        } else {
            Some(&weights)
        };
        let target = select_allocation(daily.view_to(date), weekly.view_to(date), universe, current);

        // 4. Trigger decision. A Cash target while holding forces the book
        // flat even between scheduled dates.
        let is_scheduled = scheduled[i];
        let drift = !holdings.is_empty() && drift_breached(&weights, &target, config.drift_tolerance);
        let exit_override = !is_scheduled && !holdings.is_empty() && target.is_cash();

        // 5. Execution.
        if is_scheduled || drift || exit_override {
            let reason = if exit_override {
                TradeReason::ExitSignal
            } else if is_scheduled {
                TradeReason::Rebalance
            } else {
                TradeReason::Drift
            };

            let total_cost = match &target {
                Allocation::Cash => liquidate_all(
                    &mut holdings,
                    daily,
                    date,
                    config.transaction_cost_rate,
                    reason,
                    &mut trades,
                )?,
                Allocation::Weighted(target_weights) => rebalance_to_target(
                    &mut holdings,
                    target_weights,
                    value,
                    daily,
                    date,
                    config.transaction_cost_rate,
                    reason,
                    &mut trades,
                )?,
            };
            value -= total_cost;
        }

        // 6. Record today's equity.
        equity_curve.push(EquityPoint { date, value });
        prev_value = value;
    }

    Ok(SimulationResult {
        equity_curve,
        trades,
        holdings,
    })
}

/// Mark each date that closes a rebalance period. The final date always
/// closes its (possibly partial) period.
pub fn scheduled_flags(dates: &[NaiveDate], frequency: RebalanceFrequency) -> Vec<bool> {
    (0..dates.len())
        .map(|i| match dates.get(i + 1) {
            None => true,
            Some(&next) => match frequency {
                RebalanceFrequency::MonthEnd => {
                    (next.year(), next.month()) != (dates[i].year(), dates[i].month())
                }
                RebalanceFrequency::WeekEnd => {
                    week_ending_friday(next) != week_ending_friday(dates[i])
                }
            },
        })
        .collect()
}

/// Relative drift check over symbols present in BOTH the current and target
/// allocations. A symbol entering or leaving the target set never triggers
/// drift by itself.
pub fn drift_breached(
    current: &HashMap<String, f64>,
    target: &Allocation,
    tolerance: f64,
) -> bool {
    current.iter().any(|(symbol, &current_weight)| {
        match target.weight(symbol) {
            Some(target_weight) => {
                (current_weight - target_weight).abs() > tolerance * target_weight
            }
            None => false,
        }
    })
}

/// Sell every held position at today's price. Returns the summed transaction
/// cost. Symbols are processed in sorted order so runs are reproducible.
pub fn liquidate_all(
    holdings: &mut HashMap<String, f64>,
    prices: &PriceTable,
    date: NaiveDate,
    cost_rate: f64,
    reason: TradeReason,
    trades: &mut Vec<Trade>,
) -> Result<f64, EtfRotorError> {
    let mut symbols: Vec<String> = holdings.keys().cloned().collect();
    symbols.sort();

    let mut total_cost = 0.0;
    for symbol in symbols {
        let shares = holdings[&symbol];
        let price = price_at(prices, date, &symbol)?;
        let cost = (shares * price).abs() * cost_rate;
        total_cost += cost;
        trades.push(Trade {
            date,
            symbol,
            shares: -shares,
            price,
            side: TradeSide::Sell,
            reason,
            cost,
        });
    }

    holdings.clear();
    Ok(total_cost)
}

/// Move the book to the target weights: compute target shares from today's
/// pre-cost portfolio value, trade every delta above [`SHARE_EPSILON`] across
/// the union of held and targeted symbols, and replace the holdings with the
/// target share map. Returns the summed transaction cost.
#[allow(clippy::too_many_arguments)]
pub fn rebalance_to_target(
    holdings: &mut HashMap<String, f64>,
    target_weights: &[(String, f64)],
    value: f64,
    prices: &PriceTable,
    date: NaiveDate,
    cost_rate: f64,
    reason: TradeReason,
    trades: &mut Vec<Trade>,
) -> Result<f64, EtfRotorError> {
    let mut target_shares: HashMap<String, f64> = HashMap::new();
    for (symbol, weight) in target_weights {
        let price = price_at(prices, date, symbol)?;
        target_shares.insert(symbol.clone(), weight * value / price);
    }

    let union: BTreeSet<String> = holdings
        .keys()
        .chain(target_shares.keys())
        .cloned()
        .collect();

    let mut total_cost = 0.0;
    for symbol in union {
        let current = holdings.get(&symbol).copied().unwrap_or(0.0);
        let target = target_shares.get(&symbol).copied().unwrap_or(0.0);
        let delta = target - current;
        if delta.abs() <= SHARE_EPSILON {
            continue;
        }
        let price = price_at(prices, date, &symbol)?;
        let cost = (delta * price).abs() * cost_rate;
        total_cost += cost;
        trades.push(Trade {
            date,
            symbol,
            shares: delta,
            price,
            side: if delta > 0.0 {
                TradeSide::Buy
            } else {
                TradeSide::Sell
            },
            reason,
            cost,
        });
    }

    holdings.clear();
    for (symbol, shares) in target_shares {
        if shares.abs() > SHARE_EPSILON {
            holdings.insert(symbol, shares);
        }
    }
    Ok(total_cost)
}

/// A tradable price must be finite and positive; anything else is a data
/// fault that halts the run, matching the metrics layer's baseline curves.
fn price_at(prices: &PriceTable, date: NaiveDate, symbol: &str) -> Result<f64, EtfRotorError> {
    match prices.price(date, symbol) {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        _ => Err(EtfRotorError::MissingPrice {
            symbol: symbol.to_string(),
            date,
        }),
    }
}

fn check_columns(
    table: &PriceTable,
    source_name: &str,
    universe: &Universe,
) -> Result<(), EtfRotorError> {
    for symbol in universe.symbols.iter().chain([&universe.benchmark]) {
        if !table.has_symbol(symbol) {
            return Err(EtfRotorError::PriceData {
                source_name: source_name.to_string(),
                reason: format!("missing column {}", symbol),
            });
        }
    }
    Ok(())
}
