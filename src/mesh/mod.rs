//! Mesh module: connectivity, validation, and edge sign/index fields

pub mod connectivity;
pub mod edge_sign;
pub mod validation;

pub use connectivity::{EdgeEnds, MeshConnectivity, VertexConnectivity};
pub use edge_sign::{
    CellEdges, EdgeIncidence, VertexEdges, compute_edge_signs, compute_incidence_signs,
    compute_kite_indices, compute_vertex_edge_signs,
};
pub use validation::{ConnectivityValidationOptions, IncidenceHandling, validate_connectivity};
