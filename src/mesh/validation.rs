//! Mesh connectivity validation helpers.
//!
//! Sign computation trusts that every cell-edge incidence resolves to one
//! of the edge's two ends. These checks establish that once, when the mesh
//! is read, instead of on every lookup.

use std::collections::HashSet;

use crate::mesh::connectivity::MeshConnectivity;
use crate::mesh_error::LandIceError;

/// Optional validation toggles for connectivity checks.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityValidationOptions {
    /// Every edge listed by a cell must name that cell as its tail or head.
    pub check_incidence: bool,
    /// A cell must not list the same edge twice.
    pub check_duplicate_edges: bool,
    /// Both ends of an edge must list the edge among their own edges.
    pub check_reciprocity: bool,
    /// How to report a failed check.
    pub handling: IncidenceHandling,
}

impl ConnectivityValidationOptions {
    /// Enable all connectivity checks, failing on the first problem.
    pub fn all() -> Self {
        Self {
            check_incidence: true,
            check_duplicate_edges: true,
            check_reciprocity: true,
            handling: IncidenceHandling::Error,
        }
    }
}

impl Default for ConnectivityValidationOptions {
    fn default() -> Self {
        Self {
            check_incidence: true,
            check_duplicate_edges: false,
            check_reciprocity: false,
            handling: IncidenceHandling::Error,
        }
    }
}

/// Behavior when an incidence does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncidenceHandling {
    /// Skip detection; sign lookups fall back to `+1`.
    Ignore,
    /// Log a warning; sign lookups fall back to `+1`.
    Warn,
    /// Return an error.
    #[default]
    Error,
}

impl IncidenceHandling {
    /// Parse a configuration value (`"error"`, `"warn"`, `"ignore"`).
    pub fn from_config(name: &str, value: &str) -> Result<Self, LandIceError> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            _ => Err(LandIceError::InvalidConfigValue {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Route `err` according to the handling: returned for `Error`, logged
    /// for `Warn`, dropped for `Ignore`.
    pub(crate) fn report(self, err: LandIceError) -> Result<(), LandIceError> {
        match self {
            IncidenceHandling::Error => Err(err),
            IncidenceHandling::Warn => {
                log::warn!("Mesh connectivity problem: {err}");
                Ok(())
            }
            IncidenceHandling::Ignore => Ok(()),
        }
    }
}

/// Validate cell/edge connectivity.
pub fn validate_connectivity(
    mesh: &MeshConnectivity,
    options: ConnectivityValidationOptions,
) -> Result<(), LandIceError> {
    if options.handling == IncidenceHandling::Ignore {
        return Ok(());
    }

    if options.check_duplicate_edges {
        for cell in 0..mesh.n_cells() {
            let mut seen = HashSet::new();
            for &edge in mesh.edges_on_cell(cell) {
                if !seen.insert(edge) {
                    options
                        .handling
                        .report(LandIceError::DuplicateEdgeOnCell { cell, edge })?;
                }
            }
        }
    }

    if options.check_incidence {
        for (cell, slot, edge) in mesh.incidences() {
            let ends = mesh.cells_on_edge(edge);
            if !ends.touches(cell) {
                options.handling.report(LandIceError::IncidenceMismatch {
                    center_kind: "cell",
                    center: cell,
                    slot,
                    edge,
                    tail: ends.tail,
                    head: ends.head,
                })?;
            }
        }
    }

    if options.check_reciprocity {
        for edge in 0..mesh.n_edges() {
            let ends = mesh.cells_on_edge(edge);
            for cell in std::iter::once(ends.tail).chain(ends.head) {
                if !mesh.edges_on_cell(cell).contains(&edge) {
                    options
                        .handling
                        .report(LandIceError::EdgeNotReciprocated { edge, cell })?;
                }
            }
        }
    }

    Ok(())
}
