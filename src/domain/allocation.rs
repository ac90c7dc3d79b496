//! Target allocation selection.
//!
//! Converts the latest trend and correlation signals into a target portfolio:
//! either all cash or an equal-weighted basket of up to three ETFs chosen for
//! low correlation to the benchmark. Short history never errors here; every
//! unknown signal pushes the result toward [`Allocation::Cash`].

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::prices::PriceView;
use crate::domain::signals::{
    entry_signal, exit_signal, rolling_correlation, CORRELATION_WINDOW,
};
use crate::domain::universe::Universe;

/// Maximum number of ETFs held at once.
pub const MAX_POSITIONS: usize = 3;

/// Target portfolio composition. `Weighted` entries are equal-weighted and
/// sum to 1.0; the cash state is its own variant rather than a sentinel
/// symbol so it cannot be confused with a tradable asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Allocation {
    Cash,
    Weighted(Vec<(String, f64)>),
}

impl Allocation {
    pub fn is_cash(&self) -> bool {
        matches!(self, Allocation::Cash)
    }

    pub fn weight(&self, symbol: &str) -> Option<f64> {
        match self {
            Allocation::Cash => None,
            Allocation::Weighted(weights) => weights
                .iter()
                .find(|(s, _)| s == symbol)
                .map(|&(_, w)| w),
        }
    }
}

/// Select the target allocation as of the last day in the supplied views.
///
/// Strict order of evaluation:
/// 1. If any currently held symbol's exit signal fires, liquidate the whole
///    book (return `Cash`), not just the triggering symbol.
/// 2. Filter the universe by the entry signal, in declared order.
/// 3. No survivors: `Cash`.
/// 4. Rank survivors ascending by latest weekly correlation to the benchmark
///    (stable, so ties keep declared order); symbols whose correlation is
///    still undefined do not pass. Take the lowest three.
/// 5. Equal-weight the selection.
pub fn select_allocation(
    daily: PriceView<'_>,
    weekly: PriceView<'_>,
    universe: &Universe,
    current_weights: Option<&HashMap<String, f64>>,
) -> Allocation {
    if let Some(held) = current_weights {
        for symbol in held.keys() {
            let exited = daily
                .series(symbol)
                .and_then(|s| exit_signal(s).last().copied().flatten());
            if exited == Some(true) {
                return Allocation::Cash;
            }
        }
    }

    let filtered: Vec<&String> = universe
        .symbols
        .iter()
        .filter(|symbol| {
            daily
                .series(symbol)
                .and_then(|s| entry_signal(s).last().copied().flatten())
                == Some(true)
        })
        .collect();

    if filtered.is_empty() {
        return Allocation::Cash;
    }

    let benchmark = weekly.series(&universe.benchmark).unwrap_or(&[]);
    let mut ranked: Vec<(&String, f64)> = filtered
        .iter()
        .filter_map(|&symbol| {
            let corr = weekly
                .series(symbol)
                .and_then(|s| {
                    rolling_correlation(s, benchmark, CORRELATION_WINDOW)
                        .last()
                        .copied()
                        .flatten()
                })?;
            Some((symbol, corr))
        })
        .collect();

    if ranked.is_empty() {
        return Allocation::Cash;
    }

    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked.truncate(MAX_POSITIONS);

    let weight = 1.0 / ranked.len() as f64;
    Allocation::Weighted(
        ranked
            .into_iter()
            .map(|(symbol, _)| (symbol.clone(), weight))
            .collect(),
    )
}
