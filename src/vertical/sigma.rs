//! Sigma coordinates of a terrain-following ice column.
//!
//! σ is the fractional depth below the ice surface: σ = 0 at the surface
//! and σ = 1 at the bed, independent of the local ice thickness. Level 0
//! is the surface layer. For `n` layers with thickness fractions `f`:
//!
//! ```text
//! interface[0]   = 0
//! interface[k+1] = interface[k] + f[k]
//! center[k]      = interface[k] + f[k] / 2
//! interface[n]   = 1            (set exactly, not accumulated)
//! ```

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::LandIceError;

/// Sigma values at layer centers and layer interfaces.
///
/// # Invariants
/// - `layer_interface_sigma.len() == layer_center_sigma.len() + 1`
/// - `layer_interface_sigma[0] == 0` and `layer_interface_sigma[n] == 1`
/// - both sequences are non-decreasing, and each center lies between
///   its two interfaces
///
/// The invariants hold whenever the fractions used to build the
/// coordinates are non-negative; negative fractions are not rejected here
/// and show up as a failed [`validate_invariants`](DebugInvariants::validate_invariants).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaCoordinates {
    layer_center_sigma: Vec<f64>,
    layer_interface_sigma: Vec<f64>,
}

impl SigmaCoordinates {
    /// Derive sigma coordinates from layer thickness fractions.
    ///
    /// The fractions are expected to sum to one already; the bed interface
    /// is pinned to exactly `1.0` regardless.
    ///
    /// # Errors
    /// `EmptyVerticalGrid` if `fractions` is empty.
    pub fn from_fractions(fractions: &[f64]) -> Result<Self, LandIceError> {
        let n = fractions.len();
        if n == 0 {
            return Err(LandIceError::EmptyVerticalGrid);
        }

        let mut layer_interface_sigma = Vec::with_capacity(n + 1);
        let mut layer_center_sigma = Vec::with_capacity(n);
        let mut top = 0.0;
        layer_interface_sigma.push(top);
        for &f in fractions {
            layer_center_sigma.push(top + 0.5 * f);
            top += f;
            layer_interface_sigma.push(top);
        }
        layer_interface_sigma[n] = 1.0;

        Ok(Self {
            layer_center_sigma,
            layer_interface_sigma,
        })
    }

    /// Number of layers.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.layer_center_sigma.len()
    }

    /// σ at layer centers, surface first; length `n_levels`.
    #[inline]
    pub fn layer_center_sigma(&self) -> &[f64] {
        &self.layer_center_sigma
    }

    /// σ at layer interfaces, surface first; length `n_levels + 1`.
    #[inline]
    pub fn layer_interface_sigma(&self) -> &[f64] {
        &self.layer_interface_sigma
    }

    /// Thickness of each layer in σ space.
    pub fn d_sigma(&self) -> Vec<f64> {
        self.layer_interface_sigma
            .iter()
            .tuple_windows()
            .map(|(upper, lower)| lower - upper)
            .collect()
    }

    /// Depth below the surface of each layer center for a column of
    /// thickness `thickness`.
    pub fn center_depths(&self, thickness: f64) -> impl Iterator<Item = f64> + '_ {
        self.layer_center_sigma.iter().map(move |s| s * thickness)
    }
}

impl DebugInvariants for SigmaCoordinates {
    fn validate_invariants(&self) -> Result<(), LandIceError> {
        let n = self.layer_center_sigma.len();
        if self.layer_interface_sigma.len() != n + 1 {
            return Err(LandIceError::LengthMismatch {
                name: "layerInterfaceSigma".to_string(),
                expected: n + 1,
                found: self.layer_interface_sigma.len(),
            });
        }
        if self.layer_interface_sigma[0] != 0.0 || self.layer_interface_sigma[n] != 1.0 {
            return Err(LandIceError::InvariantViolation(format!(
                "layerInterfaceSigma must run from 0 to 1, got {} to {}",
                self.layer_interface_sigma[0], self.layer_interface_sigma[n]
            )));
        }
        for (name, values) in [
            ("layerCenterSigma", &self.layer_center_sigma),
            ("layerInterfaceSigma", &self.layer_interface_sigma),
        ] {
            if let Some((k, (a, b))) = values
                .iter()
                .tuple_windows()
                .enumerate()
                .find(|(_, (a, b))| b < a)
            {
                return Err(LandIceError::InvariantViolation(format!(
                    "{name} decreases between levels {k} and {}: {a} > {b}",
                    k + 1
                )));
            }
        }
        for (k, c) in self.layer_center_sigma.iter().enumerate() {
            let (upper, lower) = (self.layer_interface_sigma[k], self.layer_interface_sigma[k + 1]);
            if *c < upper || *c > lower {
                return Err(LandIceError::InvariantViolation(format!(
                    "layerCenterSigma[{k}] = {c} lies outside its interfaces [{upper}, {lower}]"
                )));
            }
        }
        Ok(())
    }
}
