//! Cell/edge and vertex/edge connectivity of an unstructured polygonal mesh.
//!
//! Connectivity is read once from a mesh [`Pool`] and converted from the
//! pool's `i32` storage to `usize` indices. Every edge has a canonical
//! orientation given by the order of its two sides: the first is the
//! *tail*, the second the *head*. A boundary edge has no head; in the pool
//! that is encoded by any out-of-range value (negative, or `>= nCells`).
//!
//! All indices are 0-based.

use crate::data::array::Array2;
use crate::data::pool::Pool;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::LandIceError;

/// The two sides of an oriented edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeEnds {
    /// First side; the edge points away from it.
    pub tail: usize,
    /// Second side, absent on a mesh boundary.
    pub head: Option<usize>,
}

impl EdgeEnds {
    pub fn new(tail: usize, head: Option<usize>) -> Self {
        Self { tail, head }
    }

    pub fn interior(tail: usize, head: usize) -> Self {
        Self::new(tail, Some(head))
    }

    pub fn boundary(tail: usize) -> Self {
        Self::new(tail, None)
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.head.is_none()
    }

    /// Whether `side` is one of the two ends.
    #[inline]
    pub fn touches(&self, side: usize) -> bool {
        self.tail == side || self.head == Some(side)
    }
}

/// Cell-to-edge incidence and edge orientation.
///
/// # Invariants
/// - `n_edges_on_cell[c] <= max_edges` for every cell.
/// - `edges_on_cell` has shape `(max_edges, n_cells)`; only the first
///   `n_edges_on_cell[c]` slots of column `c` are meaningful.
/// - `cells_on_edge.len() == n_edges` and every tail is a valid cell.
///
/// Incidence consistency (every cell listed among the ends of each of its
/// edges) is *not* enforced on construction; see
/// [`validate_connectivity`](crate::mesh::validation::validate_connectivity).
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConnectivity {
    n_cells: usize,
    max_edges: usize,
    n_edges_on_cell: Vec<usize>,
    edges_on_cell: Array2<usize>,
    cells_on_edge: Vec<EdgeEnds>,
}

impl MeshConnectivity {
    /// Build from explicit per-cell edge lists and per-edge ends.
    ///
    /// `max_edges` is taken as the longest edge list.
    ///
    /// # Errors
    /// `IndexOutOfRange` if an edge id is `>= cells_on_edge.len()` or an edge
    /// end is not a valid cell.
    pub fn new(edges_on_cell: &[Vec<usize>], cells_on_edge: Vec<EdgeEnds>) -> Result<Self, LandIceError> {
        let n_cells = edges_on_cell.len();
        let max_edges = edges_on_cell.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Array2::new(max_edges, n_cells);
        for (cell, edges) in edges_on_cell.iter().enumerate() {
            table.column_mut(cell)[..edges.len()].copy_from_slice(edges);
        }
        let n_edges_on_cell = edges_on_cell.iter().map(Vec::len).collect();
        let mesh = Self {
            n_cells,
            max_edges,
            n_edges_on_cell,
            edges_on_cell: table,
            cells_on_edge,
        };
        mesh.validate_invariants()?;
        Ok(mesh)
    }

    /// Read `nCells`, `nEdges`, `maxEdges`, `nEdgesOnCell`, `edgesOnCell`
    /// and `cellsOnEdge` from a mesh pool.
    pub fn from_pool(pool: &Pool) -> Result<Self, LandIceError> {
        let n_cells = pool.dimension("nCells")?;
        let n_edges = pool.dimension("nEdges")?;
        let max_edges = pool.dimension("maxEdges")?;

        let counts = pool.array::<Vec<i32>>("nEdgesOnCell")?;
        check_len("nEdgesOnCell", n_cells, counts.len())?;
        let raw_edges = pool.array::<Array2<i32>>("edgesOnCell")?;
        check_dims("edgesOnCell", (max_edges, n_cells), raw_edges.dims())?;
        let raw_ends = pool.array::<Array2<i32>>("cellsOnEdge")?;
        check_dims("cellsOnEdge", (2, n_edges), raw_ends.dims())?;

        let mut n_edges_on_cell = Vec::with_capacity(n_cells);
        let mut edges_on_cell = Array2::new(max_edges, n_cells);
        for (cell, &count) in counts.iter().enumerate() {
            let count = usize::try_from(count).map_err(|_| {
                LandIceError::InvariantViolation(format!("nEdgesOnCell[{cell}] is negative ({count})"))
            })?;
            if count > max_edges {
                return Err(LandIceError::TooManyEdgesOnCell {
                    cell,
                    found: count,
                    max: max_edges,
                });
            }
            for slot in 0..count {
                let raw = raw_edges[(slot, cell)];
                edges_on_cell[(slot, cell)] = to_index(raw, n_edges).ok_or(
                    LandIceError::IndexOutOfRange {
                        kind: "edge",
                        index: i64::from(raw),
                        owner_kind: "cell",
                        owner: cell,
                        slot,
                        count: n_edges,
                    },
                )?;
            }
            n_edges_on_cell.push(count);
        }

        let cells_on_edge = read_edge_ends(raw_ends, n_cells, "cell")?;

        let mesh = Self {
            n_cells,
            max_edges,
            n_edges_on_cell,
            edges_on_cell,
            cells_on_edge,
        };
        mesh.debug_assert_invariants();
        Ok(mesh)
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    #[inline]
    pub fn n_edges(&self) -> usize {
        self.cells_on_edge.len()
    }

    #[inline]
    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    /// Number of edges bounding `cell`.
    #[inline]
    pub fn n_edges_on_cell(&self, cell: usize) -> usize {
        self.n_edges_on_cell[cell]
    }

    /// Edges bounding `cell`, in local slot order.
    #[inline]
    pub fn edges_on_cell(&self, cell: usize) -> &[usize] {
        &self.edges_on_cell.column(cell)[..self.n_edges_on_cell[cell]]
    }

    /// Oriented ends of `edge`.
    #[inline]
    pub fn cells_on_edge(&self, edge: usize) -> EdgeEnds {
        self.cells_on_edge[edge]
    }

    pub fn edge_ends(&self) -> &[EdgeEnds] {
        &self.cells_on_edge
    }

    /// `(cell, slot, edge)` for every cell-edge incidence.
    pub fn incidences(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.n_cells).flat_map(move |cell| {
            self.edges_on_cell(cell)
                .iter()
                .enumerate()
                .map(move |(slot, &edge)| (cell, slot, edge))
        })
    }
}

impl DebugInvariants for MeshConnectivity {
    fn validate_invariants(&self) -> Result<(), LandIceError> {
        check_len("nEdgesOnCell", self.n_cells, self.n_edges_on_cell.len())?;
        check_dims(
            "edgesOnCell",
            (self.max_edges, self.n_cells),
            self.edges_on_cell.dims(),
        )?;
        for (cell, &count) in self.n_edges_on_cell.iter().enumerate() {
            if count > self.max_edges {
                return Err(LandIceError::TooManyEdgesOnCell {
                    cell,
                    found: count,
                    max: self.max_edges,
                });
            }
        }
        for (cell, slot, edge) in self.incidences() {
            if edge >= self.n_edges() {
                return Err(LandIceError::IndexOutOfRange {
                    kind: "edge",
                    index: edge as i64,
                    owner_kind: "cell",
                    owner: cell,
                    slot,
                    count: self.n_edges(),
                });
            }
        }
        for (edge, ends) in self.cells_on_edge.iter().enumerate() {
            for (slot, side) in [Some(ends.tail), ends.head].into_iter().enumerate() {
                match side {
                    Some(c) if c >= self.n_cells => {
                        return Err(LandIceError::IndexOutOfRange {
                            kind: "cell",
                            index: c as i64,
                            owner_kind: "edge",
                            owner: edge,
                            slot,
                            count: self.n_cells,
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Vertex-to-edge incidence, vertex-to-cell incidence and cell-to-vertex
/// incidence of the dual mesh.
///
/// `edges_on_vertex` and `cells_on_vertex` have shape
/// `(vertex_degree, n_vertices)`; `vertices_on_cell` has shape
/// `(max_edges, n_cells)` with the same slot count per cell as
/// `edgesOnCell`. A `None` in `edges_on_vertex` or `cells_on_vertex` marks
/// a boundary vertex with fewer than `vertex_degree` neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexConnectivity {
    n_vertices: usize,
    vertex_degree: usize,
    edges_on_vertex: Array2<Option<usize>>,
    vertices_on_edge: Vec<EdgeEnds>,
    cells_on_vertex: Array2<Option<usize>>,
    vertices_on_cell: Array2<usize>,
}

impl VertexConnectivity {
    /// Build from explicit tables.
    pub fn new(
        edges_on_vertex: &[Vec<Option<usize>>],
        vertices_on_edge: Vec<EdgeEnds>,
        cells_on_vertex: &[Vec<Option<usize>>],
        vertices_on_cell: &[Vec<usize>],
    ) -> Result<Self, LandIceError> {
        let n_vertices = edges_on_vertex.len();
        let vertex_degree = edges_on_vertex.first().map_or(0, Vec::len);
        let edges = Array2::from_columns(vertex_degree, edges_on_vertex.iter().cloned())?;
        let cells = Array2::from_columns(vertex_degree, cells_on_vertex.iter().cloned())?;
        check_len("cellsOnVertex", n_vertices, cells.n_outer())?;
        let max_edges = vertices_on_cell.iter().map(Vec::len).max().unwrap_or(0);
        let mut on_cell = Array2::new(max_edges, vertices_on_cell.len());
        for (cell, verts) in vertices_on_cell.iter().enumerate() {
            if let Some((slot, &v)) = verts.iter().enumerate().find(|&(_, &v)| v >= n_vertices) {
                return Err(LandIceError::IndexOutOfRange {
                    kind: "vertex",
                    index: v as i64,
                    owner_kind: "cell",
                    owner: cell,
                    slot,
                    count: n_vertices,
                });
            }
            on_cell.column_mut(cell)[..verts.len()].copy_from_slice(verts);
        }
        for (vertex, column) in edges_on_vertex.iter().enumerate() {
            for (slot, edge) in column.iter().enumerate() {
                if let Some(e) = edge.filter(|&e| e >= vertices_on_edge.len()) {
                    return Err(LandIceError::IndexOutOfRange {
                        kind: "edge",
                        index: e as i64,
                        owner_kind: "vertex",
                        owner: vertex,
                        slot,
                        count: vertices_on_edge.len(),
                    });
                }
            }
        }
        for (edge, ends) in vertices_on_edge.iter().enumerate() {
            for (slot, side) in [Some(ends.tail), ends.head].into_iter().enumerate() {
                if let Some(v) = side.filter(|&v| v >= n_vertices) {
                    return Err(LandIceError::IndexOutOfRange {
                        kind: "vertex",
                        index: v as i64,
                        owner_kind: "edge",
                        owner: edge,
                        slot,
                        count: n_vertices,
                    });
                }
            }
        }
        Ok(Self {
            n_vertices,
            vertex_degree,
            edges_on_vertex: edges,
            vertices_on_edge,
            cells_on_vertex: cells,
            vertices_on_cell: on_cell,
        })
    }

    /// Whether `pool` carries the vertex tables read by [`from_pool`](Self::from_pool).
    pub fn present_in(pool: &Pool) -> bool {
        pool.has_dimension("nVertices")
            && pool.has_dimension("vertexDegree")
            && ["edgesOnVertex", "verticesOnEdge", "cellsOnVertex", "verticesOnCell"]
                .iter()
                .all(|name| pool.has_field(name))
    }

    /// Read vertex tables from a mesh pool. `mesh` supplies the cell count
    /// and per-cell slot counts used to check `verticesOnCell`.
    pub fn from_pool(pool: &Pool, mesh: &MeshConnectivity) -> Result<Self, LandIceError> {
        let n_vertices = pool.dimension("nVertices")?;
        let vertex_degree = pool.dimension("vertexDegree")?;
        let n_cells = mesh.n_cells();

        let raw_edges = pool.array::<Array2<i32>>("edgesOnVertex")?;
        check_dims("edgesOnVertex", (vertex_degree, n_vertices), raw_edges.dims())?;
        let raw_ends = pool.array::<Array2<i32>>("verticesOnEdge")?;
        check_dims("verticesOnEdge", (2, mesh.n_edges()), raw_ends.dims())?;
        let raw_cells = pool.array::<Array2<i32>>("cellsOnVertex")?;
        check_dims("cellsOnVertex", (vertex_degree, n_vertices), raw_cells.dims())?;
        let raw_verts = pool.array::<Array2<i32>>("verticesOnCell")?;
        check_dims("verticesOnCell", (mesh.max_edges(), n_cells), raw_verts.dims())?;

        let mut edges_on_vertex = Array2::filled(vertex_degree, n_vertices, None);
        let mut cells_on_vertex = Array2::filled(vertex_degree, n_vertices, None);
        for vertex in 0..n_vertices {
            for slot in 0..vertex_degree {
                edges_on_vertex[(slot, vertex)] = to_index(raw_edges[(slot, vertex)], mesh.n_edges());
                cells_on_vertex[(slot, vertex)] = to_index(raw_cells[(slot, vertex)], n_cells);
            }
        }

        let mut vertices_on_cell = Array2::new(mesh.max_edges(), n_cells);
        for cell in 0..n_cells {
            for slot in 0..mesh.n_edges_on_cell(cell) {
                let raw = raw_verts[(slot, cell)];
                vertices_on_cell[(slot, cell)] =
                    to_index(raw, n_vertices).ok_or(LandIceError::IndexOutOfRange {
                        kind: "vertex",
                        index: i64::from(raw),
                        owner_kind: "cell",
                        owner: cell,
                        slot,
                        count: n_vertices,
                    })?;
            }
        }

        Ok(Self {
            n_vertices,
            vertex_degree,
            edges_on_vertex,
            vertices_on_edge: read_edge_ends(raw_ends, n_vertices, "vertex")?,
            cells_on_vertex,
            vertices_on_cell,
        })
    }

    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    #[inline]
    pub fn vertex_degree(&self) -> usize {
        self.vertex_degree
    }

    /// Edge slots of `vertex`; `None` where a boundary vertex has no edge.
    #[inline]
    pub fn edges_on_vertex(&self, vertex: usize) -> &[Option<usize>] {
        self.edges_on_vertex.column(vertex)
    }

    #[inline]
    pub fn vertices_on_edge(&self, edge: usize) -> EdgeEnds {
        self.vertices_on_edge[edge]
    }

    pub fn n_edges(&self) -> usize {
        self.vertices_on_edge.len()
    }

    #[inline]
    pub fn cells_on_vertex(&self, vertex: usize) -> &[Option<usize>] {
        self.cells_on_vertex.column(vertex)
    }

    /// Vertex in `slot` of `cell`; slots beyond the cell's edge count are unspecified.
    #[inline]
    pub fn vertex_on_cell(&self, cell: usize, slot: usize) -> Option<usize> {
        self.vertices_on_cell.get(slot, cell).copied()
    }
}

/// Convert a stored index to `usize`, treating anything outside `0..count` as absent.
#[inline]
fn to_index(raw: i32, count: usize) -> Option<usize> {
    usize::try_from(raw).ok().filter(|&i| i < count)
}

fn read_edge_ends(
    raw: &Array2<i32>,
    count: usize,
    kind: &'static str,
) -> Result<Vec<EdgeEnds>, LandIceError> {
    raw.columns()
        .enumerate()
        .map(|(edge, ends)| {
            let tail = to_index(ends[0], count).ok_or(LandIceError::IndexOutOfRange {
                kind,
                index: i64::from(ends[0]),
                owner_kind: "edge",
                owner: edge,
                slot: 0,
                count,
            })?;
            Ok(EdgeEnds::new(tail, to_index(ends[1], count)))
        })
        .collect()
}

fn check_len(name: &str, expected: usize, found: usize) -> Result<(), LandIceError> {
    if expected != found {
        return Err(LandIceError::LengthMismatch {
            name: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn check_dims(name: &str, expected: (usize, usize), found: (usize, usize)) -> Result<(), LandIceError> {
    check_len(&format!("{name} (inner)"), expected.0, found.0)?;
    check_len(&format!("{name} (outer)"), expected.1, found.1)
}
