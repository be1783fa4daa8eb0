//! Errors reported by the checked container operations.
//!
//! Misusing a container is a logic error, not a recoverable failure, so most
//! of the API panics on an empty container. The `try_` variants exist for the
//! few call sites where emptiness is an expected state, e.g. a slot that may
//! already have been promoted. Both paths report the same [`PolyError`].

use core::fmt;

/// The operation that was attempted on an empty container.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Operation {
    /// Borrowing the occupant through the base type.
    Access,
    /// Moving the occupant to the heap.
    Promote,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Access => f.write_str("access"),
            Operation::Promote => f.write_str("promote"),
        }
    }
}

/// An operation required an occupied container but found an empty one.
///
/// ```
/// use inline_poly::{Operation, Poly, PolyError};
///
/// let mut poly = Poly::<u32>::new(7);
/// let _boxed = poly.promote();
///
/// let error: PolyError = poly.try_promote().unwrap_err();
/// assert_eq!(error.operation(), Operation::Promote);
/// assert_eq!(error.to_string(), "cannot promote an empty Poly");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PolyError {
    /// What was attempted.
    operation: Operation,
}

impl PolyError {
    /// Creates an error for `operation` on an empty container.
    #[must_use]
    pub const fn empty(operation: Operation) -> Self {
        Self { operation }
    }

    /// The operation that failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }
}

impl fmt::Display for PolyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} an empty Poly", self.operation)
    }
}

impl core::error::Error for PolyError {}
