//! Array2: dense, bounds-checked 2-D storage for per-entity fields.
//!
//! Mesh fields such as `edgesOnCell(maxEdges, nCells)` or
//! `layerThickness(nVertLevels, nCells)` are indexed by a short *inner*
//! index (slot, level) and a long *outer* index (cell, edge, vertex).
//! `Array2` stores them contiguously with the inner index fastest, so one
//! column (all slots of one cell) is a single slice.

use serde::{Deserialize, Serialize};

use crate::mesh_error::LandIceError;

/// Contiguous 2-D array indexed as `(inner, outer)`.
///
/// # Invariants
/// `data.len() == n_inner * n_outer`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array2<T> {
    n_inner: usize,
    n_outer: usize,
    data: Vec<T>,
}

impl<T: Clone> Array2<T> {
    /// New array of shape `(n_inner, n_outer)` filled with `fill`.
    pub fn filled(n_inner: usize, n_outer: usize, fill: T) -> Self {
        Self {
            n_inner,
            n_outer,
            data: vec![fill; n_inner * n_outer],
        }
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value.clone());
    }
}

impl<T: Clone + Default> Array2<T> {
    /// New array of shape `(n_inner, n_outer)` filled with `T::default()`.
    pub fn new(n_inner: usize, n_outer: usize) -> Self {
        Self::filled(n_inner, n_outer, T::default())
    }
}

impl<T> Array2<T> {
    /// Wrap an existing buffer laid out with the inner index fastest.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `data.len() != n_inner * n_outer`.
    pub fn from_vec(n_inner: usize, n_outer: usize, data: Vec<T>) -> Result<Self, LandIceError> {
        if data.len() != n_inner * n_outer {
            return Err(LandIceError::LengthMismatch {
                name: "Array2 buffer".to_string(),
                expected: n_inner * n_outer,
                found: data.len(),
            });
        }
        Ok(Self {
            n_inner,
            n_outer,
            data,
        })
    }

    /// Build from one column per outer entity. Every column must have `n_inner` entries.
    pub fn from_columns<C>(n_inner: usize, columns: impl IntoIterator<Item = C>) -> Result<Self, LandIceError>
    where
        C: IntoIterator<Item = T>,
    {
        let mut data = Vec::new();
        let mut n_outer = 0;
        for column in columns {
            let before = data.len();
            data.extend(column);
            let found = data.len() - before;
            if found != n_inner {
                return Err(LandIceError::LengthMismatch {
                    name: format!("Array2 column {n_outer}"),
                    expected: n_inner,
                    found,
                });
            }
            n_outer += 1;
        }
        Ok(Self {
            n_inner,
            n_outer,
            data,
        })
    }

    /// Shape as `(n_inner, n_outer)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.n_inner, self.n_outer)
    }

    #[inline]
    pub fn n_inner(&self) -> usize {
        self.n_inner
    }

    #[inline]
    pub fn n_outer(&self) -> usize {
        self.n_outer
    }

    #[inline]
    fn offset(&self, inner: usize, outer: usize) -> Option<usize> {
        (inner < self.n_inner && outer < self.n_outer).then(|| outer * self.n_inner + inner)
    }

    /// Element at `(inner, outer)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, inner: usize, outer: usize) -> Option<&T> {
        self.offset(inner, outer).map(|i| &self.data[i])
    }

    /// Mutable element at `(inner, outer)`, or `None` when out of bounds.
    #[inline]
    pub fn get_mut(&mut self, inner: usize, outer: usize) -> Option<&mut T> {
        self.offset(inner, outer).map(move |i| &mut self.data[i])
    }

    /// All inner entries of one outer entity.
    ///
    /// # Panics
    /// Panics if `outer >= n_outer`.
    #[inline]
    pub fn column(&self, outer: usize) -> &[T] {
        assert!(outer < self.n_outer, "outer index {outer} out of range");
        &self.data[outer * self.n_inner..(outer + 1) * self.n_inner]
    }

    /// Mutable inner entries of one outer entity.
    ///
    /// # Panics
    /// Panics if `outer >= n_outer`.
    #[inline]
    pub fn column_mut(&mut self, outer: usize) -> &mut [T] {
        assert!(outer < self.n_outer, "outer index {outer} out of range");
        &mut self.data[outer * self.n_inner..(outer + 1) * self.n_inner]
    }

    /// Iterator over columns in outer order.
    pub fn columns(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact panics on zero; an empty inner dimension yields empty columns.
        let n_inner = self.n_inner.max(1);
        let empty = self.n_inner == 0;
        let n_outer = self.n_outer;
        self.data
            .chunks_exact(n_inner)
            .chain(std::iter::repeat_n(&[][..], if empty { n_outer } else { 0 }))
    }

    /// Mutable iterator over columns in outer order.
    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        let n_inner = self.n_inner.max(1);
        let padding = if self.n_inner == 0 { self.n_outer } else { 0 };
        self.data
            .chunks_exact_mut(n_inner)
            .chain((0..padding).map(|_| <&mut [T]>::default()))
    }

    /// Flat view of the storage, inner index fastest.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> std::ops::Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, (inner, outer): (usize, usize)) -> &T {
        match self.offset(inner, outer) {
            Some(i) => &self.data[i],
            None => panic!(
                "index ({inner}, {outer}) out of bounds for Array2 of shape ({}, {})",
                self.n_inner, self.n_outer
            ),
        }
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, (inner, outer): (usize, usize)) -> &mut T {
        let (n_inner, n_outer) = (self.n_inner, self.n_outer);
        match self.offset(inner, outer) {
            Some(i) => &mut self.data[i],
            None => panic!(
                "index ({inner}, {outer}) out of bounds for Array2 of shape ({n_inner}, {n_outer})"
            ),
        }
    }
}
