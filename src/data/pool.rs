//! Pool: a named store of mesh dimensions and field arrays.
//!
//! A `Pool` plays the role of the mesh or geometry store the setup steps
//! read from and write into. Dimensions are named `usize` scalars; fields
//! are named arrays with one or more *time levels* (double-buffered state
//! such as `layerThickness` has two). Time levels are selected with their
//! 1-based number, matching how the time-stepping scheme names them.
//!
//! Typed access goes through [`PoolArray`], implemented for the four array
//! kinds a field can hold:
//!
//! ```rust
//! # fn try_main() -> Result<(), landice_setup::mesh_error::LandIceError> {
//! use landice_setup::data::pool::Pool;
//!
//! let mut geometry = Pool::new("geometry");
//! geometry.add_dimension("nCells", 2);
//! geometry.add_field("thickness", vec![100.0_f64, 0.0]);
//! let thickness = geometry.array::<Vec<f64>>("thickness")?;
//! assert_eq!(thickness, &[100.0, 0.0]);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::array::Array2;
use crate::mesh_error::LandIceError;

/// One time level of a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldData {
    Real1(Vec<f64>),
    Real2(Array2<f64>),
    Int1(Vec<i32>),
    Int2(Array2<i32>),
}

impl FieldData {
    /// Short human-readable name of the array kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldData::Real1(_) => Vec::<f64>::KIND,
            FieldData::Real2(_) => Array2::<f64>::KIND,
            FieldData::Int1(_) => Vec::<i32>::KIND,
            FieldData::Int2(_) => Array2::<i32>::KIND,
        }
    }
}

/// Array types that can be stored in and borrowed from a [`Pool`].
pub trait PoolArray: Sized {
    /// Name used in type-mismatch errors.
    const KIND: &'static str;
    fn wrap(self) -> FieldData;
    fn view(data: &FieldData) -> Option<&Self>;
    fn view_mut(data: &mut FieldData) -> Option<&mut Self>;
}

macro_rules! impl_pool_array {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl PoolArray for $ty {
            const KIND: &'static str = $kind;
            fn wrap(self) -> FieldData {
                FieldData::$variant(self)
            }
            fn view(data: &FieldData) -> Option<&Self> {
                match data {
                    FieldData::$variant(a) => Some(a),
                    _ => None,
                }
            }
            fn view_mut(data: &mut FieldData) -> Option<&mut Self> {
                match data {
                    FieldData::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_pool_array!(Vec<f64>, Real1, "real 1-D array");
impl_pool_array!(Array2<f64>, Real2, "real 2-D array");
impl_pool_array!(Vec<i32>, Int1, "integer 1-D array");
impl_pool_array!(Array2<i32>, Int2, "integer 2-D array");

/// Named dimensions and time-levelled fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Pool {
    name: String,
    dimensions: BTreeMap<String, usize>,
    fields: BTreeMap<String, Vec<FieldData>>,
}

impl Pool {
    /// Creates an empty pool; `name` only appears in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers (or overwrites) a dimension.
    pub fn add_dimension(&mut self, name: &str, value: usize) -> Option<usize> {
        self.dimensions.insert(name.to_string(), value)
    }

    /// Value of a dimension.
    ///
    /// # Errors
    /// Returns `MissingDimension` if `name` was never registered.
    pub fn dimension(&self, name: &str) -> Result<usize, LandIceError> {
        self.dimensions
            .get(name)
            .copied()
            .ok_or_else(|| LandIceError::MissingDimension {
                pool: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Registers a single-time-level field, replacing any previous field of that name.
    pub fn add_field<A: PoolArray>(&mut self, name: &str, array: A) {
        self.fields.insert(name.to_string(), vec![array.wrap()]);
    }

    /// Registers a field with `n_time_levels` identical copies of `array`.
    pub fn add_field_with_time_levels<A: PoolArray + Clone>(
        &mut self,
        name: &str,
        array: A,
        n_time_levels: usize,
    ) {
        let levels = (0..n_time_levels.max(1)).map(|_| array.clone().wrap()).collect();
        self.fields.insert(name.to_string(), levels);
    }

    /// Number of time levels of a field.
    pub fn n_time_levels(&self, name: &str) -> Result<usize, LandIceError> {
        self.levels(name).map(Vec::len)
    }

    /// Time level 1 of a field.
    pub fn array<A: PoolArray>(&self, name: &str) -> Result<&A, LandIceError> {
        self.array_at(name, 1)
    }

    /// A given time level (1-based) of a field.
    pub fn array_at<A: PoolArray>(&self, name: &str, time_level: usize) -> Result<&A, LandIceError> {
        let levels = self.levels(name)?;
        let data = time_level
            .checked_sub(1)
            .and_then(|i| levels.get(i))
            .ok_or_else(|| LandIceError::InvalidTimeLevel {
                name: name.to_string(),
                time_level,
                available: levels.len(),
            })?;
        A::view(data).ok_or_else(|| LandIceError::FieldTypeMismatch {
            name: name.to_string(),
            expected: A::KIND,
            found: data.kind(),
        })
    }

    /// Mutable time level 1 of a field.
    pub fn array_mut<A: PoolArray>(&mut self, name: &str) -> Result<&mut A, LandIceError> {
        self.array_mut_at(name, 1)
    }

    /// Mutable access to a given time level (1-based) of a field.
    pub fn array_mut_at<A: PoolArray>(
        &mut self,
        name: &str,
        time_level: usize,
    ) -> Result<&mut A, LandIceError> {
        let pool = self.name.clone();
        let levels = self
            .fields
            .get_mut(name)
            .ok_or_else(|| LandIceError::MissingField {
                pool,
                name: name.to_string(),
            })?;
        let available = levels.len();
        let data = time_level
            .checked_sub(1)
            .and_then(|i| levels.get_mut(i))
            .ok_or_else(|| LandIceError::InvalidTimeLevel {
                name: name.to_string(),
                time_level,
                available,
            })?;
        let found = data.kind();
        A::view_mut(data).ok_or_else(|| LandIceError::FieldTypeMismatch {
            name: name.to_string(),
            expected: A::KIND,
            found,
        })
    }

    /// Replace one time level of an existing field.
    ///
    /// The new array must be of the same kind as the stored one.
    pub fn set_array_at<A: PoolArray>(
        &mut self,
        name: &str,
        time_level: usize,
        array: A,
    ) -> Result<(), LandIceError> {
        *self.array_mut_at::<A>(name, time_level)? = array;
        Ok(())
    }

    /// Write `array` to every time level of `name`, creating the field with
    /// `n_time_levels` levels when it does not exist yet.
    pub fn store_all_time_levels<A: PoolArray + Clone>(
        &mut self,
        name: &str,
        array: A,
        n_time_levels: usize,
    ) -> Result<(), LandIceError> {
        if !self.has_field(name) {
            self.add_field_with_time_levels(name, array, n_time_levels);
            return Ok(());
        }
        for level in 1..=self.n_time_levels(name)? {
            self.set_array_at(name, level, array.clone())?;
        }
        Ok(())
    }

    /// Names of all dimensions, sorted.
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    /// Names of all fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    fn levels(&self, name: &str) -> Result<&Vec<FieldData>, LandIceError> {
        self.fields.get(name).ok_or_else(|| LandIceError::MissingField {
            pool: self.name.clone(),
            name: name.to_string(),
        })
    }
}
