//! Wide-format CSV price adapter.
//!
//! Expects one file per frequency: a date column followed by one close-price
//! column per symbol, e.g. `date,TLT,GLD,SPY`. Rows may arrive in any order;
//! they are sorted by date before the table is built.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::EtfRotorError;
use crate::domain::prices::PriceTable;
use crate::ports::data_port::PriceDataPort;

pub struct CsvPriceAdapter {
    daily_path: PathBuf,
    weekly_path: Option<PathBuf>,
}

impl CsvPriceAdapter {
    pub fn new(daily_path: PathBuf, weekly_path: Option<PathBuf>) -> Self {
        Self {
            daily_path,
            weekly_path,
        }
    }

    fn load_table(path: &Path) -> Result<PriceTable, EtfRotorError> {
        let source = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| EtfRotorError::PriceData {
            source_name: source.clone(),
            reason: format!("failed to read file: {}", e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| EtfRotorError::PriceData {
                source_name: source.clone(),
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        if headers.len() < 2 {
            return Err(EtfRotorError::PriceData {
                source_name: source,
                reason: "expected a date column and at least one symbol column".to_string(),
            });
        }
        let symbols: Vec<String> = headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_uppercase())
            .collect();

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| EtfRotorError::PriceData {
                source_name: source.clone(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| EtfRotorError::PriceData {
                source_name: source.clone(),
                reason: "missing date column".to_string(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                EtfRotorError::PriceData {
                    source_name: source.clone(),
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            let mut prices = Vec::with_capacity(symbols.len());
            for (i, symbol) in symbols.iter().enumerate() {
                let cell = record.get(i + 1).unwrap_or("").trim();
                if cell.is_empty() {
                    return Err(EtfRotorError::MissingPrice {
                        symbol: symbol.clone(),
                        date,
                    });
                }
                let price: f64 = cell.parse().map_err(|e| EtfRotorError::PriceData {
                    source_name: source.clone(),
                    reason: format!("invalid price for {} on {}: {}", symbol, date, e),
                })?;
                prices.push(price);
            }
            rows.push((date, prices));
        }

        rows.sort_by_key(|(date, _)| *date);

        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        let mut columns: HashMap<String, Vec<f64>> = symbols
            .iter()
            .map(|s| (s.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for (_, prices) in &rows {
            for (symbol, &price) in symbols.iter().zip(prices) {
                if let Some(column) = columns.get_mut(symbol) {
                    column.push(price);
                }
            }
        }

        PriceTable::new(dates, columns)
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn load_daily(&self) -> Result<PriceTable, EtfRotorError> {
        Self::load_table(&self.daily_path)
    }

    fn load_weekly(&self) -> Result<Option<PriceTable>, EtfRotorError> {
        match &self.weekly_path {
            Some(path) => Self::load_table(path).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_wide_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "daily.csv",
            "date,TLT,GLD,SPY\n\
             2024-01-02,95.0,190.0,470.0\n\
             2024-01-03,96.0,191.0,468.0\n",
        );
        let adapter = CsvPriceAdapter::new(path, None);

        let table = adapter.load_daily().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.price(date(2024, 1, 2), "TLT"), Some(95.0));
        assert_eq!(table.price(date(2024, 1, 3), "SPY"), Some(468.0));
        assert!(adapter.load_weekly().unwrap().is_none());
    }

    #[test]
    fn sorts_rows_and_uppercases_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "daily.csv",
            "date,tlt\n2024-01-03,96.0\n2024-01-02,95.0\n",
        );
        let adapter = CsvPriceAdapter::new(path, None);

        let table = adapter.load_daily().unwrap();
        assert_eq!(table.dates(), &[date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(table.price(date(2024, 1, 2), "TLT"), Some(95.0));
    }

    #[test]
    fn empty_cell_is_a_missing_price() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "daily.csv", "date,TLT,GLD\n2024-01-02,95.0,\n");
        let adapter = CsvPriceAdapter::new(path, None);

        let err = adapter.load_daily().unwrap_err();
        assert!(matches!(
            err,
            EtfRotorError::MissingPrice { symbol, date: d }
                if symbol == "GLD" && d == date(2024, 1, 2)
        ));
    }

    #[test]
    fn bad_number_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "daily.csv", "date,TLT\n2024-01-02,abc\n");
        let adapter = CsvPriceAdapter::new(path, None);
        assert!(matches!(
            adapter.load_daily(),
            Err(EtfRotorError::PriceData { .. })
        ));
    }

    #[test]
    fn bad_date_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "daily.csv", "date,TLT\n02/01/2024,95.0\n");
        let adapter = CsvPriceAdapter::new(path, None);
        assert!(matches!(
            adapter.load_daily(),
            Err(EtfRotorError::PriceData { .. })
        ));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "daily.csv",
            "date,TLT\n2024-01-02,95.0\n2024-01-02,96.0\n",
        );
        let adapter = CsvPriceAdapter::new(path, None);
        assert!(matches!(
            adapter.load_daily(),
            Err(EtfRotorError::PriceData { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let adapter = CsvPriceAdapter::new(PathBuf::from("/nonexistent/daily.csv"), None);
        assert!(matches!(
            adapter.load_daily(),
            Err(EtfRotorError::PriceData { .. })
        ));
    }

    #[test]
    fn weekly_file_is_loaded_when_configured() {
        let dir = TempDir::new().unwrap();
        let daily = write_csv(&dir, "daily.csv", "date,TLT\n2024-01-02,95.0\n");
        let weekly = write_csv(&dir, "weekly.csv", "date,TLT\n2024-01-05,96.0\n");
        let adapter = CsvPriceAdapter::new(daily, Some(weekly));

        let table = adapter.load_weekly().unwrap().unwrap();
        assert_eq!(table.price(date(2024, 1, 5), "TLT"), Some(96.0));
    }
}
