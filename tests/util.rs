#![allow(dead_code)]
use landice_setup::data::{Array2, Pool};

/// Doubly periodic `nx` x `ny` grid of unit squares.
///
/// Cell `c = j * nx + i`. Cell `c` owns its east edge `2c` (to the cell on
/// its east) and its north edge `2c + 1` (to the cell on its north), and its
/// north-east corner vertex `c`. Edge slots per cell run E, N, W, S; vertex
/// slots run NE, NW, SW, SE. `flip(edge)` reverses the canonical orientation
/// of that edge (both `cellsOnEdge` and `verticesOnEdge`).
pub struct PeriodicQuads {
    pub nx: usize,
    pub ny: usize,
}

impl PeriodicQuads {
    pub fn new(nx: usize, ny: usize) -> Self {
        assert!(nx >= 3 && ny >= 3, "need at least 3x3 cells for distinct neighbours");
        Self { nx, ny }
    }

    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    pub fn n_edges(&self) -> usize {
        2 * self.n_cells()
    }

    fn ij(&self, c: usize) -> (usize, usize) {
        (c % self.nx, c / self.nx)
    }

    fn at(&self, i: usize, j: usize) -> usize {
        (j % self.ny) * self.nx + (i % self.nx)
    }

    pub fn east(&self, c: usize) -> usize {
        let (i, j) = self.ij(c);
        self.at(i + 1, j)
    }

    pub fn west(&self, c: usize) -> usize {
        let (i, j) = self.ij(c);
        self.at(i + self.nx - 1, j)
    }

    pub fn north(&self, c: usize) -> usize {
        let (i, j) = self.ij(c);
        self.at(i, j + 1)
    }

    pub fn south(&self, c: usize) -> usize {
        let (i, j) = self.ij(c);
        self.at(i, j + self.ny - 1)
    }

    /// Edge slots E, N, W, S of cell `c`.
    pub fn edges_on_cell(&self, c: usize) -> [usize; 4] {
        [2 * c, 2 * c + 1, 2 * self.west(c), 2 * self.south(c) + 1]
    }

    /// Unflipped `(tail, head)` cells of `edge`.
    pub fn cells_on_edge(&self, edge: usize) -> (usize, usize) {
        let c = edge / 2;
        if edge % 2 == 0 {
            (c, self.east(c))
        } else {
            (c, self.north(c))
        }
    }

    /// Mesh pool with cell and vertex connectivity.
    pub fn pool(&self, flip: impl Fn(usize) -> bool) -> Pool {
        let n_cells = self.n_cells();
        let n_edges = self.n_edges();
        let mut pool = Pool::new("mesh");
        pool.add_dimension("nCells", n_cells);
        pool.add_dimension("nEdges", n_edges);
        pool.add_dimension("maxEdges", 4);
        pool.add_dimension("nVertices", n_cells);
        pool.add_dimension("vertexDegree", 4);

        pool.add_field("nEdgesOnCell", vec![4_i32; n_cells]);
        let edges_on_cell = (0..n_cells).map(|c| self.edges_on_cell(c).map(|e| e as i32));
        pool.add_field("edgesOnCell", Array2::from_columns(4, edges_on_cell).unwrap());

        let oriented = |edge: usize, (a, b): (usize, usize)| {
            if flip(edge) { [b as i32, a as i32] } else { [a as i32, b as i32] }
        };
        let cells_on_edge = (0..n_edges).map(|e| oriented(e, self.cells_on_edge(e)));
        pool.add_field("cellsOnEdge", Array2::from_columns(2, cells_on_edge).unwrap());

        // east edge of c runs from the NE corner of south(c) up to vertex c;
        // north edge of c runs from the NE corner of west(c) across to vertex c
        let vertices_on_edge = (0..n_edges).map(|e| {
            let c = e / 2;
            let from = if e % 2 == 0 { self.south(c) } else { self.west(c) };
            oriented(e, (from, c))
        });
        pool.add_field("verticesOnEdge", Array2::from_columns(2, vertices_on_edge).unwrap());

        let edges_on_vertex = (0..n_cells).map(|v| {
            [2 * v, 2 * v + 1, 2 * self.north(v), 2 * self.east(v) + 1].map(|e| e as i32)
        });
        pool.add_field("edgesOnVertex", Array2::from_columns(4, edges_on_vertex).unwrap());

        let cells_on_vertex = (0..n_cells).map(|v| {
            [v, self.east(v), self.north(self.east(v)), self.north(v)].map(|c| c as i32)
        });
        pool.add_field("cellsOnVertex", Array2::from_columns(4, cells_on_vertex).unwrap());

        let vertices_on_cell = (0..n_cells).map(|c| {
            [c, self.west(c), self.south(self.west(c)), self.south(c)].map(|v| v as i32)
        });
        pool.add_field("verticesOnCell", Array2::from_columns(4, vertices_on_cell).unwrap());

        pool
    }
}

/// Geometry pool with fractions and per-cell thickness.
pub fn geometry_pool(fractions: &[f64], thickness: &[f64]) -> Pool {
    let mut pool = Pool::new("geometry");
    pool.add_dimension("nCells", thickness.len());
    pool.add_dimension("nVertLevels", fractions.len());
    pool.add_field("layerThicknessFractions", fractions.to_vec());
    pool.add_field("thickness", thickness.to_vec());
    pool
}

pub fn assert_close(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len(), "length differs\n got={got:?}\nwant={want:?}");
    for (a, b) in got.iter().zip(want) {
        assert!((a - b).abs() < 1e-12, "values differ\n got={got:?}\nwant={want:?}");
    }
}

/// Records emitted on the current thread while `f` runs, as `(level, message)`.
///
/// The capturing logger is installed once per test binary; records are kept
/// per thread so tests running in parallel do not see each other's output.
pub fn captured_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(log::Level, String)>) {
    static INSTALL: std::sync::Once = std::sync::Once::new();
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other logger in test binaries");
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
    let out = f();
    let records = RECORDS.with(|r| r.take());
    (out, records)
}

/// Number of captured records at `level`.
pub fn count_at(records: &[(log::Level, String)], level: log::Level) -> usize {
    records.iter().filter(|(l, _)| *l == level).count()
}

thread_local! {
    static RECORDS: std::cell::RefCell<Vec<(log::Level, String)>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

struct Capture;

static CAPTURE: Capture = Capture;

impl log::Log for Capture {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}
