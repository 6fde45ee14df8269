//! The standard data-quality checks.
//!
//! [`DataValidator`](crate::core::DataValidator) runs these in a fixed order:
//!
//! 1. [`StructureCheck`]: required columns present, at least one row
//! 2. [`RangeCheck`]: values outside their configured valid range
//! 3. [`MissingValueCheck`]: missing values in required columns
//! 4. [`DuplicateCheck`]: rows sharing a `(city, date)` key
//! 5. [`TemporalGapCheck`]: gaps between consecutive readings of a city
//! 6. [`OutlierCheck`]: IQR outliers among the core pollutants
//!
//! Each check is independent: a failing structure check does not stop the
//! others, which work with whatever columns exist.

mod duplicates;
mod missing;
mod outliers;
mod range;
mod structure;
pub(crate) mod support;
mod temporal;

pub use duplicates::DuplicateCheck;
pub use missing::MissingValueCheck;
pub use outliers::{quantile, OutlierCheck};
pub use range::RangeCheck;
pub use structure::StructureCheck;
pub use temporal::TemporalGapCheck;

use crate::config::ValidatorConfig;
use crate::core::BoxedCheck;

/// Builds the six standard checks, in run order, from a configuration.
pub fn standard_checks(config: &ValidatorConfig) -> Vec<BoxedCheck> {
    vec![
        Box::new(StructureCheck::new(config.required_columns.clone())),
        Box::new(RangeCheck::new(
            config.valid_ranges.clone(),
            config.rules.range,
        )),
        Box::new(MissingValueCheck::new(
            config.required_columns.clone(),
            config.rules.missing,
        )),
        Box::new(DuplicateCheck::new(config.rules.duplicates)),
        Box::new(TemporalGapCheck::new(config.max_gap_days)),
        Box::new(OutlierCheck::new(
            config.outlier_columns.clone(),
            config.outlier_iqr_multiplier,
            config.outlier_min_samples,
            config.rules.outliers,
        )),
    ]
}
