//! Pool-level setup steps run by the simulation driver before time stepping.
//!
//! [`LandIceSetup`] binds the configuration once and then fills the fields
//! the dynamics solver reads:
//!
//! - [`LandIceSetup::setup_vertical_grid`] writes `layerCenterSigma`,
//!   `layerInterfaceSigma` and both time levels of `layerThickness` into the
//!   geometry pool, correcting `layerThicknessFractions` in place on a cold
//!   start.
//! - [`LandIceSetup::setup_sign_and_index_fields`] writes `edgeSignOnCell`
//!   into the mesh pool, plus `edgeSignOnVertex` and `kiteIndexOnCell` when
//!   the pool carries vertex connectivity.
//!
//! Output fields are created when missing and overwritten otherwise. An
//! existing output field of the wrong kind or with too few time levels fails
//! the step before anything in the pool is modified. The two steps are
//! independent and may run in either order.

use crate::config::{CONFIG_DO_RESTART, CONFIG_EDGE_SIGN_POLICY, ConfigBinder};
use crate::data::array::Array2;
use crate::data::pool::{Pool, PoolArray};
use crate::mesh::connectivity::{MeshConnectivity, VertexConnectivity};
use crate::mesh::edge_sign::{compute_edge_signs, compute_kite_indices, compute_vertex_edge_signs};
use crate::mesh::validation::{ConnectivityValidationOptions, IncidenceHandling, validate_connectivity};
use crate::mesh_error::LandIceError;
use crate::vertical::builder::{
    LAYER_THICKNESS_TIME_LEVELS, VerticalGridBuilder, VerticalGridOptions, VerticalGridReport,
};

/// Configuration-bound setup driver.
#[derive(Debug, Clone, Copy)]
pub struct LandIceSetup<'a> {
    config: ConfigBinder<'a>,
    vertical: VerticalGridOptions,
    incidence: IncidenceHandling,
}

impl<'a> LandIceSetup<'a> {
    /// Bind the configuration, resolve the options this crate reads and
    /// log the full option table.
    pub fn bind(config: ConfigBinder<'a>) -> Result<Self, LandIceError> {
        config.log_options();
        let vertical = VerticalGridOptions::from_config(&config)?;
        let policy = config.character_or(CONFIG_EDGE_SIGN_POLICY, "error".to_string())?;
        let incidence = IncidenceHandling::from_config(CONFIG_EDGE_SIGN_POLICY, &policy)?;
        Ok(Self {
            config,
            vertical,
            incidence,
        })
    }

    pub fn config(&self) -> ConfigBinder<'a> {
        self.config
    }

    pub fn vertical_options(&self) -> &VerticalGridOptions {
        &self.vertical
    }

    pub fn incidence_handling(&self) -> IncidenceHandling {
        self.incidence
    }

    /// Initialize the sigma coordinates and layer thickness in `geometry`.
    ///
    /// Reads dimensions `nCells` and `nVertLevels` and fields
    /// `layerThicknessFractions` and `thickness`.
    pub fn setup_vertical_grid(&self, geometry: &mut Pool) -> Result<VerticalGridReport, LandIceError> {
        let is_restart = self.config.logical(CONFIG_DO_RESTART)?;
        let n_cells = geometry.dimension("nCells")?;
        let n_levels = geometry.dimension("nVertLevels")?;

        let mut fractions = geometry.array::<Vec<f64>>("layerThicknessFractions")?.clone();
        expect_len("layerThicknessFractions", n_levels, fractions.len())?;
        let thickness = geometry.array::<Vec<f64>>("thickness")?;
        expect_len("thickness", n_cells, thickness.len())?;

        check_output::<Vec<f64>>(geometry, "layerCenterSigma", 1)?;
        check_output::<Vec<f64>>(geometry, "layerInterfaceSigma", 1)?;
        check_output::<Array2<f64>>(geometry, "layerThickness", LAYER_THICKNESS_TIME_LEVELS)?;

        let grid = VerticalGridBuilder::new(self.vertical).build(&mut fractions, thickness, is_restart)?;

        // every write below targets a field checked above, so none can fail
        geometry.add_dimension("nVertLevelsP1", n_levels + 1);
        geometry.store_all_time_levels("layerCenterSigma", grid.sigma.layer_center_sigma().to_vec(), 1)?;
        geometry.store_all_time_levels(
            "layerInterfaceSigma",
            grid.sigma.layer_interface_sigma().to_vec(),
            1,
        )?;
        if !geometry.has_field("layerThickness") {
            geometry.add_field_with_time_levels(
                "layerThickness",
                Array2::<f64>::new(n_levels, n_cells),
                LAYER_THICKNESS_TIME_LEVELS,
            );
        }
        for (i, layers) in grid.layer_thickness.iter().enumerate() {
            geometry.set_array_at("layerThickness", i + 1, layers.clone())?;
        }
        geometry.set_array_at("layerThicknessFractions", 1, fractions)?;

        Ok(grid.report)
    }

    /// Compute edge sign (and, if available, vertex sign and kite index)
    /// fields into `mesh`.
    pub fn setup_sign_and_index_fields(&self, mesh: &mut Pool) -> Result<(), LandIceError> {
        let cells = MeshConnectivity::from_pool(mesh)?;
        check_output::<Array2<i32>>(mesh, "edgeSignOnCell", 1)?;
        validate_connectivity(
            &cells,
            ConnectivityValidationOptions {
                handling: self.incidence,
                ..ConnectivityValidationOptions::default()
            },
        )?;
        // validation has already reported every cell incidence mismatch
        let sign_handling = match self.incidence {
            IncidenceHandling::Warn => IncidenceHandling::Ignore,
            handling => handling,
        };
        let edge_signs = compute_edge_signs(&cells, sign_handling)?;

        let vertex_fields = if VertexConnectivity::present_in(mesh) {
            check_output::<Array2<i32>>(mesh, "edgeSignOnVertex", 1)?;
            check_output::<Array2<i32>>(mesh, "kiteIndexOnCell", 1)?;
            let vertices = VertexConnectivity::from_pool(mesh, &cells)?;
            Some((
                compute_vertex_edge_signs(&vertices, self.incidence)?,
                compute_kite_indices(&cells, &vertices, self.incidence)?,
            ))
        } else {
            log::debug!("Mesh pool has no vertex connectivity; skipping edgeSignOnVertex and kiteIndexOnCell");
            None
        };

        mesh.store_all_time_levels("edgeSignOnCell", edge_signs, 1)?;
        if let Some((vertex_signs, kites)) = vertex_fields {
            mesh.store_all_time_levels("edgeSignOnVertex", vertex_signs, 1)?;
            mesh.store_all_time_levels("kiteIndexOnCell", kites, 1)?;
        }
        Ok(())
    }
}

/// An existing output field must hold `A` in every time level and have at
/// least `min_levels` of them. A missing field is created on write.
fn check_output<A: PoolArray>(pool: &Pool, name: &str, min_levels: usize) -> Result<(), LandIceError> {
    if !pool.has_field(name) {
        return Ok(());
    }
    let available = pool.n_time_levels(name)?;
    if available < min_levels {
        return Err(LandIceError::InvalidTimeLevel {
            name: name.to_string(),
            time_level: min_levels,
            available,
        });
    }
    for level in 1..=available {
        pool.array_at::<A>(name, level)?;
    }
    Ok(())
}

fn expect_len(name: &str, expected: usize, found: usize) -> Result<(), LandIceError> {
    if expected != found {
        return Err(LandIceError::LengthMismatch {
            name: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}
