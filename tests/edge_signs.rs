mod util;

use landice_setup::data::{Array2, Pool};
use landice_setup::mesh::edge_sign::{UNSET_SIGN, compute_kite_indices, compute_vertex_edge_signs};
use landice_setup::mesh::{
    ConnectivityValidationOptions, EdgeEnds, IncidenceHandling, MeshConnectivity,
    VertexConnectivity, compute_edge_signs, validate_connectivity,
};
use landice_setup::mesh_error::LandIceError;
use proptest::prelude::*;
use util::PeriodicQuads;

fn slot_of(mesh: &MeshConnectivity, cell: usize, edge: usize) -> usize {
    mesh.edges_on_cell(cell)
        .iter()
        .position(|&e| e == edge)
        .expect("edge on cell")
}

#[test]
fn periodic_mesh_signs_are_opposite_across_every_edge() {
    let quads = PeriodicQuads::new(4, 3);
    let mesh = MeshConnectivity::from_pool(&quads.pool(|e| e % 3 == 0)).unwrap();
    validate_connectivity(&mesh, ConnectivityValidationOptions::all()).unwrap();
    let signs = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap();

    assert!(signs.as_slice().iter().all(|&s| s == 1 || s == -1));
    for edge in 0..mesh.n_edges() {
        let EdgeEnds { tail, head } = mesh.cells_on_edge(edge);
        let head = head.expect("periodic mesh has no boundary");
        assert_eq!(signs[(slot_of(&mesh, tail, edge), tail)], -1);
        assert_eq!(signs[(slot_of(&mesh, head, edge), head)], 1);
    }
}

#[test]
fn divergence_of_any_flux_sums_to_zero_on_a_closed_mesh() {
    let quads = PeriodicQuads::new(5, 4);
    let mesh = MeshConnectivity::from_pool(&quads.pool(|e| e % 2 == 1)).unwrap();
    let signs = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap();

    let flux: Vec<f64> = (0..mesh.n_edges()).map(|e| (e as f64 * 0.37).sin()).collect();
    let total: f64 = (0..mesh.n_cells())
        .map(|c| {
            mesh.edges_on_cell(c)
                .iter()
                .enumerate()
                .map(|(slot, &e)| f64::from(signs[(slot, c)]) * flux[e])
                .sum::<f64>()
        })
        .sum();
    assert!(total.abs() < 1e-12, "net divergence {total}");
}

#[test]
fn named_cells_get_tail_and_head_signs() {
    // edge 0 runs from cell 5 to cell 9; other cells are isolated
    let mut edges_on_cell = vec![Vec::new(); 10];
    edges_on_cell[5] = vec![0];
    edges_on_cell[9] = vec![0];
    let mesh = MeshConnectivity::new(&edges_on_cell, vec![EdgeEnds::interior(5, 9)]).unwrap();
    let signs = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap();
    assert_eq!(signs[(0, 5)], -1);
    assert_eq!(signs[(0, 9)], 1);
    assert_eq!(signs[(0, 0)], UNSET_SIGN);
}

#[test]
fn boundary_edges_from_pool_sentinels() {
    // a strip of two squares; outer edges have no second cell
    let mut pool = Pool::new("mesh");
    pool.add_dimension("nCells", 2);
    pool.add_dimension("nEdges", 7);
    pool.add_dimension("maxEdges", 4);
    pool.add_field("nEdgesOnCell", vec![4_i32, 4]);
    pool.add_field(
        "edgesOnCell",
        Array2::from_vec(4, 2, vec![0, 1, 2, 3, 1, 4, 5, 6]).unwrap(),
    );
    pool.add_field(
        "cellsOnEdge",
        Array2::from_vec(
            2,
            7,
            vec![0, 2, 1, 0, 0, -1, 0, 2, 1, 2, 1, 2, 1, -1],
        )
        .unwrap(),
    );
    let mesh = MeshConnectivity::from_pool(&pool).unwrap();
    validate_connectivity(&mesh, ConnectivityValidationOptions::all()).unwrap();
    let signs = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap();
    // edge 1 is shared and oriented from cell 1 to cell 0
    assert_eq!(signs.column(0), &[-1, 1, -1, -1]);
    assert_eq!(signs.column(1), &[-1, -1, -1, -1]);
}

#[test]
fn corrupt_incidence_fails_loudly_by_default() {
    let quads = PeriodicQuads::new(3, 3);
    let mut pool = quads.pool(|_| false);
    // point cell 4's east edge at an edge that does not touch it
    pool.array_mut::<Array2<i32>>("edgesOnCell").unwrap()[(0, 4)] = 0;
    let mesh = MeshConnectivity::from_pool(&pool).unwrap();

    let err = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap_err();
    assert_eq!(
        err,
        LandIceError::IncidenceMismatch {
            center_kind: "cell",
            center: 4,
            slot: 0,
            edge: 0,
            tail: 0,
            head: Some(1),
        }
    );
    assert!(validate_connectivity(&mesh, ConnectivityValidationOptions::default()).is_err());

    // the legacy behaviour is still available for parity runs
    let signs = compute_edge_signs(&mesh, IncidenceHandling::Ignore).unwrap();
    assert_eq!(signs[(0, 4)], 1);
}

#[test]
fn vertex_signs_and_kites_on_periodic_mesh() {
    let quads = PeriodicQuads::new(4, 4);
    let pool = quads.pool(|e| e % 5 == 2);
    let mesh = MeshConnectivity::from_pool(&pool).unwrap();
    let vertices = VertexConnectivity::from_pool(&pool, &mesh).unwrap();

    let vertex_signs = compute_vertex_edge_signs(&vertices, IncidenceHandling::Error).unwrap();
    assert_eq!(vertex_signs.dims(), (4, quads.n_cells()));
    for edge in 0..vertices.n_edges() {
        let EdgeEnds { tail, head } = vertices.vertices_on_edge(edge);
        let head = head.unwrap();
        let slot = |v: usize| {
            vertices
                .edges_on_vertex(v)
                .iter()
                .position(|&e| e == Some(edge))
                .unwrap()
        };
        assert_eq!(vertex_signs[(slot(tail), tail)], -1);
        assert_eq!(vertex_signs[(slot(head), head)], 1);
    }

    let kites = compute_kite_indices(&mesh, &vertices, IncidenceHandling::Error).unwrap();
    for cell in 0..mesh.n_cells() {
        assert_eq!(kites.column(cell), &[0, 1, 2, 3]);
    }
}

proptest! {
    #[test]
    fn prop_signs_follow_orientation(
        nx in 3usize..7,
        ny in 3usize..7,
        flips in prop::collection::vec(any::<bool>(), 72),
    ) {
        let quads = PeriodicQuads::new(nx, ny);
        let mesh = MeshConnectivity::from_pool(&quads.pool(|e| flips[e])).unwrap();
        let signs = compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap();

        for (cell, slot, edge) in mesh.incidences() {
            let ends = mesh.cells_on_edge(edge);
            let expected = if ends.tail == cell { -1 } else { 1 };
            prop_assert_eq!(signs[(slot, cell)], expected);
        }
        for edge in 0..mesh.n_edges() {
            let ends = mesh.cells_on_edge(edge);
            let head = ends.head.unwrap();
            let sum = signs[(slot_of(&mesh, ends.tail, edge), ends.tail)]
                + signs[(slot_of(&mesh, head, edge), head)];
            prop_assert_eq!(sum, 0);
        }
        // recomputation is idempotent
        prop_assert_eq!(&signs, &compute_edge_signs(&mesh, IncidenceHandling::Error).unwrap());
    }
}
