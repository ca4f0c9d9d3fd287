//! Error types shared across the crate.
use thiserror::Error;

/// Failure modes of the coil field calculations.
///
/// `Domain` marks a parameter outside the valid range of a numerical routine.
/// The field routines clamp their elliptic parameter before evaluating, so a
/// `Domain` error escaping this crate indicates a modeling bug upstream, not
/// a recoverable input problem. `Validation` rejects caller-supplied geometry
/// or drive values before any field math runs; no partial results are
/// produced.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Parameter outside the valid range of a numerical routine.
    #[error("domain error: {0}")]
    Domain(&'static str),

    /// Rejected input value or shape.
    #[error("validation error: {0}")]
    Validation(&'static str),
}
