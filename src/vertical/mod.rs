//! Terrain-following vertical coordinate of the ice columns.
//!
//! Each column is split into `nVertLevels` layers whose thicknesses are
//! fixed fractions of the local ice thickness. The fractions determine the
//! sigma coordinates shared by all columns:
//!
//! ```
//! # fn try_main() -> Result<(), landice_setup::mesh_error::LandIceError> {
//! use landice_setup::vertical::VerticalGridBuilder;
//!
//! let mut fractions = vec![0.2, 0.3, 0.5];
//! let grid = VerticalGridBuilder::default().build(&mut fractions, &[10.0], false)?;
//! let interfaces = grid.sigma.layer_interface_sigma();
//! assert_eq!(interfaces[0], 0.0);
//! assert_eq!(interfaces[3], 1.0);
//! assert!((grid.layer_thickness.current()[(2, 0)] - 5.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

pub mod builder;
pub mod fractions;
pub mod sigma;

pub use builder::{
    LayerThickness, VerticalGrid, VerticalGridBuilder, VerticalGridOptions, VerticalGridReport,
    layer_thickness_from_fractions,
};
pub use fractions::{
    DEFAULT_FRACTION_TOLERANCE, FractionCorrection, FractionSumHandling, normalize_layer_fractions,
    uniform_layer_fractions,
};
pub use sigma::SigmaCoordinates;
