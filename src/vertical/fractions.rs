//! Layer thickness fractions and their sum check.
//!
//! The fractions partition a column: they must sum to one. A sum that is
//! off by a rounding-sized amount is corrected silently apart from a
//! warning; a sum further away than the tolerance is a configuration error.
//! Either way the whole excess is taken out of the first (surface) layer,
//! so the remaining layers keep exactly the thicknesses the user asked for.

use crate::mesh_error::LandIceError;

/// Default absolute tolerance on the fraction sum.
pub const DEFAULT_FRACTION_TOLERANCE: f64 = 0.001;

/// What to do when the fraction sum is outside the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractionSumHandling {
    /// Log an error, apply the surface-layer correction anyway and flag the
    /// problem in the returned [`FractionCorrection`]; the caller decides
    /// whether to halt.
    #[default]
    Warn,
    /// Return `FractionSumOutOfTolerance` and leave the fractions untouched.
    Error,
}

impl FractionSumHandling {
    /// Parse a configuration value (`"warn"` or `"error"`).
    pub fn from_config(name: &str, value: &str) -> Result<Self, LandIceError> {
        match value.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LandIceError::InvalidConfigValue {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Record of a correction applied to the first layer fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionCorrection {
    /// Sum of the fractions before correction.
    pub original_sum: f64,
    /// Amount subtracted from the first fraction (`original_sum - 1`).
    pub excess: f64,
    /// Whether `|excess|` exceeded the tolerance.
    pub out_of_tolerance: bool,
    pub tolerance: f64,
}

impl FractionCorrection {
    /// `Err(FractionSumOutOfTolerance)` if the correction was out of tolerance.
    pub fn status(&self) -> Result<(), LandIceError> {
        if self.out_of_tolerance {
            return Err(LandIceError::FractionSumOutOfTolerance {
                sum: self.original_sum,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

/// Make `fractions` sum to one by adjusting the first entry.
///
/// Returns `Ok(None)` when the sum is already exactly one. Any other sum is
/// corrected; the returned record says by how much and whether the
/// deviation was beyond `tolerance`.
///
/// # Errors
/// - `EmptyVerticalGrid` if `fractions` is empty.
/// - `FractionSumOutOfTolerance` under [`FractionSumHandling::Error`] when
///   the deviation exceeds `tolerance`; `fractions` is not modified then.
pub fn normalize_layer_fractions(
    fractions: &mut [f64],
    tolerance: f64,
    handling: FractionSumHandling,
) -> Result<Option<FractionCorrection>, LandIceError> {
    let Some(first) = fractions.first().copied() else {
        return Err(LandIceError::EmptyVerticalGrid);
    };
    let total: f64 = fractions.iter().sum();
    if total == 1.0 {
        return Ok(None);
    }

    let excess = total - 1.0;
    let out_of_tolerance = excess.abs() > tolerance;
    if out_of_tolerance {
        log::error!("The sum of layerThicknessFractions must be 1.0 (sum = {total}, tolerance = {tolerance})");
        if handling == FractionSumHandling::Error {
            return Err(LandIceError::FractionSumOutOfTolerance {
                sum: total,
                tolerance,
            });
        }
    }

    fractions[0] = first - excess;
    log::warn!(
        "Adjusted layerThicknessFractions(1) by {:e} so the fractions sum to 1.0 (was {total}); new value {}",
        -excess,
        fractions[0]
    );

    Ok(Some(FractionCorrection {
        original_sum: total,
        excess,
        out_of_tolerance,
        tolerance,
    }))
}

/// `n` equal fractions.
pub fn uniform_layer_fractions(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}
