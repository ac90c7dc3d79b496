//! Price history access port trait.

use crate::domain::error::EtfRotorError;
use crate::domain::prices::PriceTable;

pub trait PriceDataPort {
    /// Daily close prices for the whole tracked symbol set.
    fn load_daily(&self) -> Result<PriceTable, EtfRotorError>;

    /// Pre-resampled weekly closes, if the source provides them. Callers fall
    /// back to resampling the daily table when this returns `None`.
    fn load_weekly(&self) -> Result<Option<PriceTable>, EtfRotorError>;
}
