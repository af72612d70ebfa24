//! Report rendering port.

use crate::domain::error::SwingtraderError;
use crate::domain::optimizer::OptimizationOutcome;

/// Consumes the winning simulation; never feeds anything back into the core.
pub trait ReportPort {
    fn write(
        &self,
        symbol: &str,
        outcome: &OptimizationOutcome,
        output_path: &str,
    ) -> Result<(), SwingtraderError>;
}
