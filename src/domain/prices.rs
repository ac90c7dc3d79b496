//! Date-indexed price tables.
//!
//! A [`PriceTable`] is column-oriented: one strictly increasing date axis and
//! one `f64` series per symbol, all the same length. Two instances exist per
//! run (daily and weekly). The simulation never copies history; it hands the
//! selector a [`PriceView`] prefix so signals only ever see data up to the
//! simulated day.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

use crate::domain::error::EtfRotorError;

#[derive(Debug, Clone)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: HashMap<String, Vec<f64>>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceTable {
    /// Build a table, validating that dates are strictly increasing and every
    /// column has one value per date.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: HashMap<String, Vec<f64>>,
    ) -> Result<Self, EtfRotorError> {
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(EtfRotorError::PriceData {
                    source_name: "price table".to_string(),
                    reason: format!("dates not strictly increasing at {}", pair[1]),
                });
            }
        }

        for (symbol, series) in &columns {
            if series.len() != dates.len() {
                return Err(EtfRotorError::PriceData {
                    source_name: "price table".to_string(),
                    reason: format!(
                        "column {} has {} values for {} dates",
                        symbol,
                        series.len(),
                        dates.len()
                    ),
                });
            }
        }

        let date_index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Ok(Self {
            dates,
            columns,
            date_index,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    /// Full history for one symbol.
    pub fn series(&self, symbol: &str) -> Option<&[f64]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    pub fn price(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let idx = *self.date_index.get(&date)?;
        self.columns.get(symbol).map(|s| s[idx])
    }

    /// Prefix of the table containing every row dated on or before `date`.
    pub fn view_to(&self, date: NaiveDate) -> PriceView<'_> {
        let len = self.dates.partition_point(|&d| d <= date);
        PriceView { table: self, len }
    }

    pub fn full_view(&self) -> PriceView<'_> {
        PriceView {
            table: self,
            len: self.dates.len(),
        }
    }

    /// Resample to weekly bars: the last observation of each trailing-Friday
    /// week bin, keyed by the bin's last trading date.
    pub fn resample_weekly(&self) -> PriceTable {
        let mut keep: Vec<usize> = Vec::new();
        for i in 0..self.dates.len() {
            let last_of_bin = match self.dates.get(i + 1) {
                Some(&next) => week_ending_friday(next) != week_ending_friday(self.dates[i]),
                None => true,
            };
            if last_of_bin {
                keep.push(i);
            }
        }

        let dates: Vec<NaiveDate> = keep.iter().map(|&i| self.dates[i]).collect();
        let columns: HashMap<String, Vec<f64>> = self
            .columns
            .iter()
            .map(|(symbol, series)| {
                let weekly: Vec<f64> = keep.iter().map(|&i| series[i]).collect();
                (symbol.clone(), weekly)
            })
            .collect();

        let date_index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        PriceTable {
            dates,
            columns,
            date_index,
        }
    }
}

/// The Friday on or after `date`; Saturday and Sunday roll into the next
/// week's bin, matching a W-FRI resample rule.
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (4 + 7 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(days_ahead))
}

/// Borrowed prefix of a [`PriceTable`]. Everything the signal and allocation
/// code reads goes through one of these, which is what makes lookahead
/// impossible by construction.
#[derive(Debug, Clone, Copy)]
pub struct PriceView<'a> {
    table: &'a PriceTable,
    len: usize,
}

impl<'a> PriceView<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.table.dates[..self.len].last().copied()
    }

    pub fn series(&self, symbol: &str) -> Option<&'a [f64]> {
        self.table.columns.get(symbol).map(|s| &s[..self.len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_table(dates: Vec<NaiveDate>, symbol: &str, prices: Vec<f64>) -> PriceTable {
        let mut columns = HashMap::new();
        columns.insert(symbol.to_string(), prices);
        PriceTable::new(dates, columns).unwrap()
    }

    #[test]
    fn new_rejects_unsorted_dates() {
        let mut columns = HashMap::new();
        columns.insert("GLD".to_string(), vec![100.0, 101.0]);
        let result = PriceTable::new(vec![date(2024, 1, 2), date(2024, 1, 1)], columns);
        assert!(matches!(result, Err(EtfRotorError::PriceData { .. })));
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let mut columns = HashMap::new();
        columns.insert("GLD".to_string(), vec![100.0, 101.0]);
        let result = PriceTable::new(vec![date(2024, 1, 1), date(2024, 1, 1)], columns);
        assert!(matches!(result, Err(EtfRotorError::PriceData { .. })));
    }

    #[test]
    fn new_rejects_short_column() {
        let mut columns = HashMap::new();
        columns.insert("GLD".to_string(), vec![100.0]);
        let result = PriceTable::new(vec![date(2024, 1, 1), date(2024, 1, 2)], columns);
        assert!(matches!(result, Err(EtfRotorError::PriceData { .. })));
    }

    #[test]
    fn price_lookup() {
        let table = make_table(
            vec![date(2024, 1, 1), date(2024, 1, 2)],
            "GLD",
            vec![100.0, 101.0],
        );
        assert_eq!(table.price(date(2024, 1, 2), "GLD"), Some(101.0));
        assert_eq!(table.price(date(2024, 1, 3), "GLD"), None);
        assert_eq!(table.price(date(2024, 1, 1), "TLT"), None);
    }

    #[test]
    fn view_to_truncates_history() {
        let table = make_table(
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)],
            "GLD",
            vec![100.0, 101.0, 102.0],
        );

        let view = table.view_to(date(2024, 1, 2));
        assert_eq!(view.len(), 2);
        assert_eq!(view.last_date(), Some(date(2024, 1, 2)));
        assert_eq!(view.series("GLD"), Some(&[100.0, 101.0][..]));
    }

    #[test]
    fn view_to_date_between_rows() {
        let table = make_table(
            vec![date(2024, 1, 1), date(2024, 1, 5)],
            "GLD",
            vec![100.0, 101.0],
        );
        let view = table.view_to(date(2024, 1, 3));
        assert_eq!(view.len(), 1);
        assert_eq!(view.last_date(), Some(date(2024, 1, 1)));
    }

    #[test]
    fn view_to_before_start_is_empty() {
        let table = make_table(vec![date(2024, 1, 5)], "GLD", vec![100.0]);
        let view = table.view_to(date(2024, 1, 1));
        assert!(view.is_empty());
        assert_eq!(view.last_date(), None);
    }

    #[test]
    fn week_ending_friday_rolls_forward() {
        // 2024-01-01 is a Monday, 2024-01-05 the Friday of that week.
        assert_eq!(week_ending_friday(date(2024, 1, 1)), date(2024, 1, 5));
        assert_eq!(week_ending_friday(date(2024, 1, 5)), date(2024, 1, 5));
        // Saturday and Sunday belong to the following week's bin.
        assert_eq!(week_ending_friday(date(2024, 1, 6)), date(2024, 1, 12));
        assert_eq!(week_ending_friday(date(2024, 1, 7)), date(2024, 1, 12));
    }

    #[test]
    fn resample_weekly_takes_last_observation() {
        // Mon 1st .. Fri 5th, then Mon 8th .. Wed 10th (partial final week).
        let dates = vec![
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
            date(2024, 1, 5),
            date(2024, 1, 8),
            date(2024, 1, 9),
            date(2024, 1, 10),
        ];
        let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let table = make_table(dates, "GLD", prices);

        let weekly = table.resample_weekly();
        assert_eq!(weekly.dates(), &[date(2024, 1, 5), date(2024, 1, 10)]);
        assert_eq!(weekly.series("GLD"), Some(&[5.0, 8.0][..]));
    }

    #[test]
    fn resample_weekly_friday_holiday() {
        // No Friday trading; Thursday is the bin's last trading date.
        let dates = vec![
            date(2024, 1, 1),
            date(2024, 1, 4),
            date(2024, 1, 8),
        ];
        let table = make_table(dates, "GLD", vec![1.0, 2.0, 3.0]);

        let weekly = table.resample_weekly();
        assert_eq!(weekly.dates(), &[date(2024, 1, 4), date(2024, 1, 8)]);
    }
}
