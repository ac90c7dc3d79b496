//! ETF universe: the fixed, ordered candidate set plus the benchmark symbol.
//!
//! Order matters: correlation ties are broken by declared position, so the
//! universe is a `Vec`, never a set.

use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Universe {
    pub symbols: Vec<String>,
    pub benchmark: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("universe is empty")]
    Empty,

    #[error("benchmark {0} cannot be in the ETF universe")]
    BenchmarkInUniverse(String),
}

impl Universe {
    /// Build a universe, rejecting an empty symbol list and a benchmark that
    /// is also a candidate (the benchmark is never traded).
    pub fn new(symbols: Vec<String>, benchmark: String) -> Result<Self, UniverseError> {
        if symbols.is_empty() {
            return Err(UniverseError::Empty);
        }
        if symbols.contains(&benchmark) {
            return Err(UniverseError::BenchmarkInUniverse(benchmark));
        }
        Ok(Self { symbols, benchmark })
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// Parse a comma-separated symbol list: trimmed, upper-cased, duplicates and
/// empty tokens rejected, declared order preserved.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if seen.contains(&symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        seen.insert(symbol.clone());
        symbols.push(symbol);
    }

    Ok(symbols)
}
