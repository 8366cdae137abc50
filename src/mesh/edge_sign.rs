//! Edge sign and kite index fields.
//!
//! A flux across an edge is positive in the direction of the edge's
//! canonical orientation, from its tail to its head. To accumulate a flux
//! divergence, each cell needs to know, per bounding edge, whether the
//! edge points out of it (`-1`, the cell is the tail) or into it (`+1`, the
//! cell is the head). Both neighbours see the same edge with opposite
//! signs, so contributions cancel when summed across the mesh.
//!
//! The same rule applies between vertices and the edges meeting at them
//! (`edgeSignOnVertex`). Both are expressed through [`EdgeIncidence`]:
//!
//! ```rust
//! # fn try_main() -> Result<(), landice_setup::mesh_error::LandIceError> {
//! use landice_setup::mesh::connectivity::{EdgeEnds, MeshConnectivity};
//! use landice_setup::mesh::edge_sign::compute_edge_signs;
//! use landice_setup::mesh::validation::IncidenceHandling;
//!
//! // Two cells sharing edge 0, oriented from cell 0 to cell 1.
//! let mesh = MeshConnectivity::new(&[vec![0], vec![0]], vec![EdgeEnds::interior(0, 1)])?;
//! let signs = compute_edge_signs(&mesh, IncidenceHandling::Error)?;
//! assert_eq!(signs[(0, 0)], -1);
//! assert_eq!(signs[(0, 1)], 1);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::data::array::Array2;
use crate::mesh::connectivity::{EdgeEnds, MeshConnectivity, VertexConnectivity};
use crate::mesh::validation::IncidenceHandling;
use crate::mesh_error::LandIceError;

/// Sign of an edge seen from its tail.
pub const TAIL_SIGN: i32 = -1;
/// Sign of an edge seen from its head.
pub const HEAD_SIGN: i32 = 1;
/// Value of slots beyond a center's edge count.
pub const UNSET_SIGN: i32 = 0;
/// Value of `kiteIndexOnCell` slots that have no kite.
pub const UNSET_KITE: i32 = -1;

/// A family of *centers* (cells or vertices), each bounded by a list of
/// oriented edges.
pub trait EdgeIncidence {
    /// Singular noun for centers, used in diagnostics.
    const CENTER_KIND: &'static str;

    fn n_centers(&self) -> usize;

    /// Slot capacity of the output table.
    fn max_slots(&self) -> usize;

    /// Number of slots of `center` to visit.
    fn n_slots(&self, center: usize) -> usize;

    /// Edge in `slot` of `center`, `None` when the slot is empty.
    fn edge_at(&self, center: usize, slot: usize) -> Option<usize>;

    /// Oriented ends of `edge`, expressed in the same entity as the centers.
    fn ends(&self, edge: usize) -> EdgeEnds;
}

/// Cells and the edges bounding them.
#[derive(Clone, Copy, Debug)]
pub struct CellEdges<'a>(pub &'a MeshConnectivity);

impl EdgeIncidence for CellEdges<'_> {
    const CENTER_KIND: &'static str = "cell";

    fn n_centers(&self) -> usize {
        self.0.n_cells()
    }

    fn max_slots(&self) -> usize {
        self.0.max_edges()
    }

    fn n_slots(&self, center: usize) -> usize {
        self.0.n_edges_on_cell(center)
    }

    fn edge_at(&self, center: usize, slot: usize) -> Option<usize> {
        self.0.edges_on_cell(center).get(slot).copied()
    }

    fn ends(&self, edge: usize) -> EdgeEnds {
        self.0.cells_on_edge(edge)
    }
}

/// Vertices and the edges meeting at them.
#[derive(Clone, Copy, Debug)]
pub struct VertexEdges<'a>(pub &'a VertexConnectivity);

impl EdgeIncidence for VertexEdges<'_> {
    const CENTER_KIND: &'static str = "vertex";

    fn n_centers(&self) -> usize {
        self.0.n_vertices()
    }

    fn max_slots(&self) -> usize {
        self.0.vertex_degree()
    }

    fn n_slots(&self, _center: usize) -> usize {
        self.0.vertex_degree()
    }

    fn edge_at(&self, center: usize, slot: usize) -> Option<usize> {
        self.0.edges_on_vertex(center).get(slot).copied().flatten()
    }

    fn ends(&self, edge: usize) -> EdgeEnds {
        self.0.vertices_on_edge(edge)
    }
}

/// Sign of `edge` seen from `center`.
///
/// `-1` for the tail, `+1` for the head. When `center` is neither, the
/// handling decides: `Error` returns `IncidenceMismatch`, `Warn` logs and
/// yields `+1`, `Ignore` silently yields `+1`.
#[inline]
pub fn incidence_sign<I: EdgeIncidence>(
    incidence: &I,
    center: usize,
    slot: usize,
    edge: usize,
    handling: IncidenceHandling,
) -> Result<i32, LandIceError> {
    let ends = incidence.ends(edge);
    if center == ends.tail {
        return Ok(TAIL_SIGN);
    }
    if ends.head != Some(center) {
        handling.report(LandIceError::IncidenceMismatch {
            center_kind: I::CENTER_KIND,
            center,
            slot,
            edge,
            tail: ends.tail,
            head: ends.head,
        })?;
    }
    Ok(HEAD_SIGN)
}

/// Fill `out` with the sign of every (slot, center) incidence.
///
/// Every slot is overwritten: slots holding an edge get `±1`, empty slots
/// and slots beyond a center's edge count get [`UNSET_SIGN`]. Calling this
/// repeatedly on the same inputs always produces the same table.
///
/// # Errors
/// `LengthMismatch` if `out` does not have shape `(max_slots, n_centers)`;
/// `IncidenceMismatch` under [`IncidenceHandling::Error`].
pub fn compute_incidence_signs_into<I: EdgeIncidence>(
    incidence: &I,
    handling: IncidenceHandling,
    out: &mut Array2<i32>,
) -> Result<(), LandIceError> {
    let expected = (incidence.max_slots(), incidence.n_centers());
    if out.dims() != expected {
        return Err(LandIceError::LengthMismatch {
            name: format!("edgeSignOn{}", capitalized(I::CENTER_KIND)),
            expected: expected.0 * expected.1,
            found: out.n_inner() * out.n_outer(),
        });
    }
    out.fill(UNSET_SIGN);
    for center in 0..incidence.n_centers() {
        for slot in 0..incidence.n_slots(center) {
            if let Some(edge) = incidence.edge_at(center, slot) {
                out[(slot, center)] = incidence_sign(incidence, center, slot, edge, handling)?;
            }
        }
    }
    Ok(())
}

/// Allocate and fill a sign table for `incidence`.
pub fn compute_incidence_signs<I: EdgeIncidence>(
    incidence: &I,
    handling: IncidenceHandling,
) -> Result<Array2<i32>, LandIceError> {
    let mut out = Array2::new(incidence.max_slots(), incidence.n_centers());
    compute_incidence_signs_into(incidence, handling, &mut out)?;
    Ok(out)
}

/// `edgeSignOnCell(maxEdges, nCells)`.
pub fn compute_edge_signs(
    mesh: &MeshConnectivity,
    handling: IncidenceHandling,
) -> Result<Array2<i32>, LandIceError> {
    let signs = compute_incidence_signs(&CellEdges(mesh), handling)?;
    log::debug!(
        "Computed edgeSignOnCell for {} cells ({} edges)",
        mesh.n_cells(),
        mesh.n_edges()
    );
    Ok(signs)
}

/// `edgeSignOnVertex(vertexDegree, nVertices)`.
pub fn compute_vertex_edge_signs(
    vertices: &VertexConnectivity,
    handling: IncidenceHandling,
) -> Result<Array2<i32>, LandIceError> {
    compute_incidence_signs(&VertexEdges(vertices), handling)
}

/// `kiteIndexOnCell(maxEdges, nCells)`: for slot `i` of cell `c`, the
/// position `j` of `c` in `cellsOnVertex` of the vertex in that slot.
///
/// Slots beyond the cell's edge count hold [`UNSET_KITE`]. A vertex that
/// does not list the cell is an error under `IncidenceHandling::Error`,
/// otherwise the slot stays unset.
pub fn compute_kite_indices(
    mesh: &MeshConnectivity,
    vertices: &VertexConnectivity,
    handling: IncidenceHandling,
) -> Result<Array2<i32>, LandIceError> {
    let mut kites = Array2::filled(mesh.max_edges(), mesh.n_cells(), UNSET_KITE);
    for cell in 0..mesh.n_cells() {
        for slot in 0..mesh.n_edges_on_cell(cell) {
            let Some(vertex) = vertices.vertex_on_cell(cell, slot) else {
                continue;
            };
            let position = vertices
                .cells_on_vertex(vertex)
                .iter()
                .position(|&c| c == Some(cell));
            match position {
                Some(j) => kites[(slot, cell)] = j as i32,
                None => handling.report(LandIceError::KiteIndexNotFound { cell, slot, vertex })?,
            }
        }
    }
    Ok(kites)
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}
