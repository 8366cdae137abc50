//! LandIceError: Unified error type for landice-setup public APIs
//!
//! Every fallible operation in the crate returns this error so a driver can
//! decide in one place whether a setup problem is fatal.

use thiserror::Error;

/// Unified error type for land-ice setup operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LandIceError {
    /// A named dimension was not registered in the pool.
    #[error("Pool `{pool}` has no dimension `{name}`")]
    MissingDimension { pool: String, name: String },
    /// A named field was not registered in the pool.
    #[error("Pool `{pool}` has no field `{name}`")]
    MissingField { pool: String, name: String },
    /// A field exists but holds a different array kind.
    #[error("Field `{name}` holds {found}, expected {expected}")]
    FieldTypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A time level outside `1..=available` was requested.
    #[error("Field `{name}` has {available} time level(s); time level {time_level} requested")]
    InvalidTimeLevel {
        name: String,
        time_level: usize,
        available: usize,
    },
    /// An array length or shape disagrees with the dimension it is declared against.
    #[error("`{name}` has length {found}, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A configuration option is not present in the table.
    #[error("Configuration option `{0}` is not set")]
    MissingConfig(String),
    /// A configuration option holds a value of another type.
    #[error("Configuration option `{name}` is {found}, expected {expected}")]
    ConfigTypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A configuration option holds a value outside its accepted set.
    #[error("Configuration option `{name}` has unsupported value `{value}`")]
    InvalidConfigValue { name: String, value: String },
    /// A vertical grid needs at least one level.
    #[error("Vertical grid requires at least one level")]
    EmptyVerticalGrid,
    /// Layer thickness fractions do not sum to one within tolerance.
    #[error("The sum of layerThicknessFractions must be 1.0 (got {sum}, tolerance {tolerance})")]
    FractionSumOutOfTolerance { sum: f64, tolerance: f64 },
    /// A cell declares more edges than the mesh allows.
    #[error("Cell {cell} has {found} edges, more than maxEdges = {max}")]
    TooManyEdgesOnCell { cell: usize, found: usize, max: usize },
    /// A connectivity entry refers to an entity that does not exist.
    #[error("{kind} index {index} referenced from {owner_kind} {owner} slot {slot} is out of range (count {count})")]
    IndexOutOfRange {
        kind: &'static str,
        index: i64,
        owner_kind: &'static str,
        owner: usize,
        slot: usize,
        count: usize,
    },
    /// A cell (or vertex) references an edge it does not bound.
    #[error("{center_kind} {center} slot {slot} references edge {edge}, whose ends are ({tail}, {head:?})")]
    IncidenceMismatch {
        center_kind: &'static str,
        center: usize,
        slot: usize,
        edge: usize,
        tail: usize,
        head: Option<usize>,
    },
    /// The same edge appears twice in one cell's edge list.
    #[error("Cell {cell} lists edge {edge} more than once")]
    DuplicateEdgeOnCell { cell: usize, edge: usize },
    /// An interior edge is not referenced back by one of its two cells.
    #[error("Edge {edge} names cell {cell} as a side, but the cell does not list the edge")]
    EdgeNotReciprocated { edge: usize, cell: usize },
    /// No `cellsOnVertex` slot of the vertex points back at the cell.
    #[error("Vertex {vertex} (slot {slot} of cell {cell}) does not list the cell in cellsOnVertex")]
    KiteIndexNotFound {
        cell: usize,
        slot: usize,
        vertex: usize,
    },
    /// A derived structure violates one of its documented invariants.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}
