//! Configuration validation and loading.
//!
//! Validates every config field before a run starts, then builds the domain
//! values from the validated file. Defaults are applied here and nowhere
//! else.

use crate::domain::error::EtfRotorError;
use crate::domain::simulation::{RebalanceFrequency, SimulationConfig};
use crate::domain::universe::{parse_symbols, Universe};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    validate_daily_csv(config)?;
    validate_universe_section(config)?;
    validate_initial_capital(config)?;
    validate_rebalance_frequency(config)?;
    validate_transaction_cost_rate(config)?;
    validate_drift_tolerance(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

/// Build the universe from the `[universe]` section.
pub fn universe_from_config(config: &dyn ConfigPort) -> Result<Universe, EtfRotorError> {
    let symbols_str = require_string(config, "universe", "symbols")?;
    let symbols = parse_symbols(&symbols_str)?;
    let benchmark = require_string(config, "universe", "benchmark")?
        .trim()
        .to_uppercase();
    Ok(Universe::new(symbols, benchmark)?)
}

/// Build the simulation parameters from the `[simulation]` section, with
/// defaults for every key.
pub fn simulation_config_from(config: &dyn ConfigPort) -> Result<SimulationConfig, EtfRotorError> {
    let defaults = SimulationConfig::default();
    Ok(SimulationConfig {
        initial_capital: double_or(config, "simulation", "initial_capital", defaults.initial_capital)?,
        rebalance_frequency: rebalance_frequency_from(config)?,
        transaction_cost_rate: double_or(
            config,
            "simulation",
            "transaction_cost_rate",
            defaults.transaction_cost_rate,
        )?,
        drift_tolerance: double_or(config, "simulation", "drift_tolerance", defaults.drift_tolerance)?,
        risk_free_rate: double_or(config, "simulation", "risk_free_rate", defaults.risk_free_rate)?,
    })
}

/// Numeric value for `key`, defaulting only when the key is absent. A value
/// that is present but not a number is a config error, never a silent
/// default.
fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EtfRotorError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|_| EtfRotorError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("not a number: '{}'", s.trim()),
        }),
    }
}

fn rebalance_frequency_from(config: &dyn ConfigPort) -> Result<RebalanceFrequency, EtfRotorError> {
    match config.get_string("simulation", "rebalance_frequency") {
        None => Ok(RebalanceFrequency::MonthEnd),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "month_end" => Ok(RebalanceFrequency::MonthEnd),
            "week_end" => Ok(RebalanceFrequency::WeekEnd),
            other => Err(EtfRotorError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "rebalance_frequency".to_string(),
                reason: format!("unknown frequency '{}', expected month_end or week_end", other),
            }),
        },
    }
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, EtfRotorError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(EtfRotorError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_daily_csv(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    require_string(config, "data", "daily_csv").map(|_| ())
}

fn validate_universe_section(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    universe_from_config(config).map(|_| ())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    let value = double_or(config, "simulation", "initial_capital", 10_000.0)?;
    if value <= 0.0 {
        return Err(EtfRotorError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_rebalance_frequency(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    rebalance_frequency_from(config).map(|_| ())
}

fn validate_transaction_cost_rate(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    let value = double_or(config, "simulation", "transaction_cost_rate", 0.0)?;
    if value < 0.0 {
        return Err(EtfRotorError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "transaction_cost_rate".to_string(),
            reason: "transaction_cost_rate must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_drift_tolerance(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    let value = double_or(config, "simulation", "drift_tolerance", 0.0)?;
    if value < 0.0 {
        return Err(EtfRotorError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "drift_tolerance".to_string(),
            reason: "drift_tolerance must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), EtfRotorError> {
    let value = double_or(config, "simulation", "risk_free_rate", 0.0)?;
    if value < 0.0 || value >= 1.0 {
        return Err(EtfRotorError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[data]
daily_csv = prices/daily.csv

[universe]
symbols = TLT,GLD,HYG,DBC
benchmark = SPY

[simulation]
initial_capital = 10000.0
rebalance_frequency = month_end
transaction_cost_rate = 0.001
drift_tolerance = 0.25
risk_free_rate = 0.0
"#;

    #[test]
    fn valid_config_passes() {
        let config = make_config(VALID);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = make_config("[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT,GLD\nbenchmark = SPY\n");
        assert!(validate_config(&config).is_ok());

        let sim = simulation_config_from(&config).unwrap();
        assert_eq!(sim.initial_capital, 10_000.0);
        assert_eq!(sim.rebalance_frequency, RebalanceFrequency::MonthEnd);
        assert_eq!(sim.transaction_cost_rate, 0.001);
        assert_eq!(sim.drift_tolerance, 0.25);
        assert_eq!(sim.risk_free_rate, 0.0);
    }

    #[test]
    fn missing_daily_csv_fails() {
        let config = make_config("[universe]\nsymbols = TLT\nbenchmark = SPY\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigMissing { key, .. } if key == "daily_csv"));
    }

    #[test]
    fn missing_symbols_fails() {
        let config = make_config("[data]\ndaily_csv = d.csv\n[universe]\nbenchmark = SPY\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn benchmark_in_universe_fails() {
        let config =
            make_config("[data]\ndaily_csv = d.csv\n[universe]\nsymbols = SPY,TLT\nbenchmark = SPY\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::Universe(_)));
    }

    #[test]
    fn universe_is_uppercased_in_order() {
        let config =
            make_config("[data]\ndaily_csv = d.csv\n[universe]\nsymbols = tlt, gld\nbenchmark = spy\n");
        let universe = universe_from_config(&config).unwrap();
        assert_eq!(universe.symbols, vec!["TLT", "GLD"]);
        assert_eq!(universe.benchmark, "SPY");
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\ninitial_capital = 0\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn negative_cost_rate_fails() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\ntransaction_cost_rate = -0.001\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "transaction_cost_rate")
        );
    }

    #[test]
    fn negative_drift_tolerance_fails() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\ndrift_tolerance = -1\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "drift_tolerance"));
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\nrisk_free_rate = 1.5\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn unparseable_number_is_rejected_not_defaulted() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\ninitial_capital = abc\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "initial_capital"));

        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\ndrift_tolerance = lots\n",
        );
        let err = simulation_config_from(&config).unwrap_err();
        assert!(matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "drift_tolerance"));
    }

    #[test]
    fn unknown_rebalance_frequency_fails() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\nrebalance_frequency = daily\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, EtfRotorError::ConfigInvalid { key, .. } if key == "rebalance_frequency")
        );
    }

    #[test]
    fn week_end_frequency_parses() {
        let config = make_config(
            "[data]\ndaily_csv = d.csv\n[universe]\nsymbols = TLT\nbenchmark = SPY\n[simulation]\nrebalance_frequency = week_end\n",
        );
        let sim = simulation_config_from(&config).unwrap();
        assert_eq!(sim.rebalance_frequency, RebalanceFrequency::WeekEnd);
    }
}
