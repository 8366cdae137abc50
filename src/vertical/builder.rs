//! VerticalGridBuilder: sigma coordinates plus initial layer thickness.
//!
//! The builder runs once at initialization (and again on restart):
//!
//! 1. On a cold start, check the layer fractions sum to one and correct the
//!    surface fraction if not (see [`normalize_layer_fractions`]). On a
//!    restart the fractions are trusted as-is; re-correcting would shift
//!    layer 1 a little further on every restart.
//! 2. Derive [`SigmaCoordinates`] from the fractions.
//! 3. Split each column's ice thickness into layers, writing both time
//!    levels of `layerThickness` identically.

use crate::config::{
    CONFIG_LAYER_FRACTION_POLICY, CONFIG_LAYER_FRACTION_TOLERANCE, ConfigBinder,
};
use crate::data::array::Array2;
use crate::mesh_error::LandIceError;
use crate::vertical::fractions::{
    DEFAULT_FRACTION_TOLERANCE, FractionCorrection, FractionSumHandling, normalize_layer_fractions,
};
use crate::vertical::sigma::SigmaCoordinates;

/// Number of time levels the time-stepping scheme keeps for `layerThickness`.
pub const LAYER_THICKNESS_TIME_LEVELS: usize = 2;

/// Tuning of the fraction-sum check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalGridOptions {
    /// Absolute tolerance on `|sum - 1|`.
    pub tolerance: f64,
    pub fraction_handling: FractionSumHandling,
}

impl Default for VerticalGridOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_FRACTION_TOLERANCE,
            fraction_handling: FractionSumHandling::default(),
        }
    }
}

impl VerticalGridOptions {
    /// Read `config_layer_fraction_tolerance` and
    /// `config_layer_fraction_policy`, falling back to the defaults.
    pub fn from_config(config: &ConfigBinder<'_>) -> Result<Self, LandIceError> {
        let tolerance = config.real_or(CONFIG_LAYER_FRACTION_TOLERANCE, DEFAULT_FRACTION_TOLERANCE)?;
        let policy = config.character_or(CONFIG_LAYER_FRACTION_POLICY, "warn".to_string())?;
        Ok(Self {
            tolerance,
            fraction_handling: FractionSumHandling::from_config(CONFIG_LAYER_FRACTION_POLICY, &policy)?,
        })
    }
}

/// What happened to the fractions during a build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalGridReport {
    /// The build ran in restart mode and skipped the fraction check.
    pub restart: bool,
    /// The correction applied to the first fraction, if any.
    pub correction: Option<FractionCorrection>,
}

impl VerticalGridReport {
    /// `Err(FractionSumOutOfTolerance)` if the fractions were out of
    /// tolerance. The grid is still built in that case; halting is up to
    /// the caller.
    pub fn status(&self) -> Result<(), LandIceError> {
        self.correction.as_ref().map_or(Ok(()), FractionCorrection::status)
    }
}

/// Per-cell, per-level ice thickness for each time level.
///
/// Each time level is an `(n_levels, n_cells)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerThickness {
    time_levels: [Array2<f64>; LAYER_THICKNESS_TIME_LEVELS],
}

impl LayerThickness {
    /// Every time level set to `layers`.
    pub fn replicated(layers: Array2<f64>) -> Self {
        Self {
            time_levels: [layers.clone(), layers],
        }
    }

    /// Time level `time_level` (1-based).
    pub fn time_level(&self, time_level: usize) -> Option<&Array2<f64>> {
        time_level
            .checked_sub(1)
            .and_then(|i| self.time_levels.get(i))
    }

    /// Time level 1.
    pub fn current(&self) -> &Array2<f64> {
        &self.time_levels[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array2<f64>> {
        self.time_levels.iter()
    }
}

/// Output of [`VerticalGridBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalGrid {
    pub sigma: SigmaCoordinates,
    pub layer_thickness: LayerThickness,
    pub report: VerticalGridReport,
}

/// `thickness[cell] * fractions[level]` as an `(n_levels, n_cells)` array.
pub fn layer_thickness_from_fractions(thickness: &[f64], fractions: &[f64]) -> Array2<f64> {
    let mut layers = Array2::new(fractions.len(), thickness.len());
    for (column, &h) in layers.columns_mut().zip(thickness) {
        for (dz, &f) in column.iter_mut().zip(fractions) {
            *dz = h * f;
        }
    }
    layers
}

/// Builds the vertical grid of the ice columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalGridBuilder {
    options: VerticalGridOptions,
}

impl VerticalGridBuilder {
    pub fn new(options: VerticalGridOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VerticalGridOptions {
        &self.options
    }

    /// Build sigma coordinates and the initial layer thickness.
    ///
    /// `fractions` holds one entry per level and is corrected in place on a
    /// cold start; `thickness` holds the ice thickness of each cell.
    ///
    /// # Errors
    /// - `EmptyVerticalGrid` if `fractions` is empty.
    /// - `FractionSumOutOfTolerance` under strict fraction handling.
    ///
    /// With the default (warn) handling an out-of-tolerance sum does not
    /// fail the build; check [`VerticalGridReport::status`].
    pub fn build(
        &self,
        fractions: &mut [f64],
        thickness: &[f64],
        is_restart: bool,
    ) -> Result<VerticalGrid, LandIceError> {
        if fractions.is_empty() {
            return Err(LandIceError::EmptyVerticalGrid);
        }

        let correction = if is_restart {
            None
        } else {
            normalize_layer_fractions(fractions, self.options.tolerance, self.options.fraction_handling)?
        };

        let sigma = SigmaCoordinates::from_fractions(fractions)?;
        let layer_thickness =
            LayerThickness::replicated(layer_thickness_from_fractions(thickness, fractions));

        log::debug!(
            "Built vertical grid: {} levels over {} cells (restart = {is_restart})",
            sigma.n_levels(),
            thickness.len()
        );

        Ok(VerticalGrid {
            sigma,
            layer_thickness,
            report: VerticalGridReport {
                restart: is_restart,
                correction,
            },
        })
    }
}
