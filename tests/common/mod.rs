#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

use etfrotor::domain::error::EtfRotorError;
use etfrotor::domain::prices::PriceTable;
use etfrotor::domain::simulation::SimulationConfig;
use etfrotor::domain::universe::Universe;
use etfrotor::ports::data_port::PriceDataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day_range(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n).map(|i| start + Days::new(i as u64)).collect()
}

pub fn make_table(dates: Vec<NaiveDate>, columns: Vec<(&str, Vec<f64>)>) -> PriceTable {
    let map: HashMap<String, Vec<f64>> = columns
        .into_iter()
        .map(|(s, v)| (s.to_string(), v))
        .collect();
    PriceTable::new(dates, map).unwrap()
}

pub fn make_universe(symbols: &[&str], benchmark: &str) -> Universe {
    Universe::new(
        symbols.iter().map(|s| s.to_string()).collect(),
        benchmark.to_string(),
    )
    .unwrap()
}

pub fn sample_config() -> SimulationConfig {
    SimulationConfig::default()
}

/// Prices built from a repeating daily-return pattern. A period-3 pattern
/// keeps weekly return variance nonzero under 7-day calendar bins, so
/// correlations stay defined.
pub fn prices_from_pattern(base: f64, pattern: &[f64], n: usize) -> Vec<f64> {
    let mut prices = Vec::with_capacity(n);
    prices.push(base);
    for i in 1..n {
        let r = pattern[(i - 1) % pattern.len()];
        prices.push(prices[i - 1] * (1.0 + r));
    }
    prices
}

pub fn rising_prices(base: f64, slope: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| base + slope * i as f64).collect()
}

/// In-memory data port over pre-built tables.
pub struct MockPriceDataPort {
    pub daily: PriceTable,
    pub weekly: Option<PriceTable>,
}

impl MockPriceDataPort {
    pub fn new(daily: PriceTable) -> Self {
        Self {
            daily,
            weekly: None,
        }
    }

    pub fn with_weekly(mut self, weekly: PriceTable) -> Self {
        self.weekly = Some(weekly);
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn load_daily(&self) -> Result<PriceTable, EtfRotorError> {
        Ok(self.daily.clone())
    }

    fn load_weekly(&self) -> Result<Option<PriceTable>, EtfRotorError> {
        Ok(self.weekly.clone())
    }
}
