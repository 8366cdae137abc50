//! Invariant checks for derived setup structures.
//!
//! Sigma coordinates and mesh connectivity carry invariants the downstream
//! solver relies on. Connectivity read from a pool is asserted in debug
//! builds and in builds with the `check-invariants` or `strict-invariants`
//! feature. Sigma coordinates are only checked on request through
//! [`DebugInvariants::validate_invariants`], since user fractions may be
//! negative and must not panic.

use crate::mesh_error::LandIceError;

/// Structures whose invariants can be validated after construction.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation encountered.
    fn validate_invariants(&self) -> Result<(), LandIceError>;

    /// Panic on the first violation when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "structure invariants");
    }
}

/// Run a fallible check and panic with `ctx` on error when invariant
/// checking is enabled. Expands to nothing otherwise.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
