//! Report output port trait.

use std::path::Path;

use crate::domain::error::EtfRotorError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::simulation::SimulationResult;

/// Port for persisting a finished run: equity curves, the trade log, and the
/// comparative metrics summary.
pub trait ReportPort {
    fn write(
        &self,
        result: &SimulationResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<(), EtfRotorError>;
}
