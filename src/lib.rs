//! # landice-setup
//!
//! landice-setup provides the setup-phase kernels of an unstructured-mesh
//! land-ice dynamical core. It runs once before time stepping (and again on
//! restart) and prepares two families of fields the ice-dynamics solver
//! consumes read-only:
//!
//! - the terrain-following **sigma coordinate** of the ice columns
//!   (`layerCenterSigma`, `layerInterfaceSigma`) and the initial per-layer
//!   ice thickness (`layerThickness`, two time levels), derived from
//!   user-supplied layer thickness fractions;
//! - the **edge sign** fields (`edgeSignOnCell`, optionally
//!   `edgeSignOnVertex` and `kiteIndexOnCell`) that make flux divergences
//!   consistent between neighbouring cells.
//!
//! ## Features
//! - Explicit configuration handle ([`config::ConfigBinder`]); no global state
//! - Named mesh/geometry field pools with time levels ([`data::pool::Pool`])
//! - Configurable handling of bad layer fractions (flag-and-correct or strict)
//!   and of inconsistent mesh incidence (error, warn, ignore)
//! - Invariant checks on derived structures via [`DebugInvariants`]
//!
//! ## Usage
//!
//! ```rust
//! # fn try_main() -> Result<(), landice_setup::mesh_error::LandIceError> {
//! use landice_setup::prelude::*;
//!
//! let configs = ConfigTable::new().with("config_do_restart", false);
//! let setup = LandIceSetup::bind(ConfigBinder::bind(&configs))?;
//!
//! let mut geometry = Pool::new("geometry");
//! geometry.add_dimension("nCells", 1);
//! geometry.add_dimension("nVertLevels", 3);
//! geometry.add_field("layerThicknessFractions", vec![0.2, 0.3, 0.5]);
//! geometry.add_field("thickness", vec![10.0]);
//!
//! let report = setup.setup_vertical_grid(&mut geometry)?;
//! report.status()?;
//! let sigma = geometry.array::<Vec<f64>>("layerInterfaceSigma")?;
//! assert_eq!(sigma.len(), 4);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! ## Logging
//! Diagnostics go through the [`log`] facade; install any logger in the
//! driver to see them.

pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod mesh;
pub mod mesh_error;
pub mod setup;
pub mod vertical;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::config::{ConfigBinder, ConfigTable, ConfigValue};
    pub use crate::data::array::Array2;
    pub use crate::data::pool::Pool;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh::connectivity::{EdgeEnds, MeshConnectivity, VertexConnectivity};
    pub use crate::mesh::edge_sign::{EdgeIncidence, compute_edge_signs};
    pub use crate::mesh::validation::IncidenceHandling;
    pub use crate::mesh_error::LandIceError;
    pub use crate::setup::LandIceSetup;
    pub use crate::vertical::{
        FractionSumHandling, SigmaCoordinates, VerticalGridBuilder, VerticalGridOptions,
    };
}
