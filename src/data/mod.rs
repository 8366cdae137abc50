//! Data module: dense arrays and the named field pool

pub mod array;
pub mod pool;

pub use array::Array2;
pub use pool::{FieldData, Pool, PoolArray};
