//! Error types for basis construction and evaluation
//!
//! This module defines the failure modes encountered when building bases,
//! evaluating them, or combining them, along with a convenient `Result` alias.

/// Errors that can occur when working with function bases.
///
/// Every error is raised synchronously by the offending call; none of them are transient.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A basis must contain at least one function.
    #[error("A basis must have at least 1 function, got {0}")]
    InvalidNumberOfBasis(usize),

    /// A domain interval is empty, reversed, or not finite.
    #[error("Invalid domain range {start}..{end}; the start must be finite and strictly less than the end")]
    InvalidDomain {
        /// Start of the offending interval
        start: String,
        /// End of the offending interval
        end: String,
    },

    /// The domain has the wrong number of dimensions for this basis.
    #[error("Expected a domain with {expected} dimension(s), found {found}")]
    DimensionMismatch {
        /// Number of dimensions the basis supports
        expected: usize,
        /// Number of dimensions supplied
        found: usize,
    },

    /// A basis parameter (order, period, breakpoints, ...) is invalid.
    #[error("Invalid basis parameter: {0}")]
    InvalidParameter(&'static str),

    /// The coefficient matrix does not have one column per basis function.
    #[error("Coefficient matrix has {found} columns, but the basis has {expected} functions")]
    CoefficientShape {
        /// Number of basis functions
        expected: usize,
        /// Number of coefficient columns supplied
        found: usize,
    },

    /// Sampled data does not line up with its sample points.
    #[error("Sample data has {found} columns, but there are {expected} sample points")]
    SampleShape {
        /// Number of sample points
        expected: usize,
        /// Number of data columns supplied
        found: usize,
    },

    /// Sample points must be strictly increasing.
    #[error("Sample points must be strictly increasing")]
    UnsortedSamplePoints,

    /// Cannot build sampled functions because there is no data.
    #[error("No data available")]
    NoData,

    /// There are fewer sample points than basis functions, so the projection is not unique.
    #[error("Cannot project {points} sample points onto {n_basis} basis functions")]
    Underdetermined {
        /// Number of sample points
        points: usize,
        /// Number of basis functions
        n_basis: usize,
    },

    /// An evaluation point lies outside the domain of the basis.
    ///
    /// Use [`crate::basis::Basis::evaluate_with`] and [`crate::Extrapolation::Allow`]
    /// to evaluate outside the domain on purpose.
    #[error("Point {point} is outside the domain {start}..{end}")]
    OutOfDomain {
        /// The offending point
        point: String,
        /// Start of the domain
        start: String,
        /// End of the domain
        end: String,
    },

    /// Two bases were combined, but their domains differ.
    #[error("Domain ranges are not equal: {lhs} != {rhs}")]
    IncompatibleDomain {
        /// Domain of the left-hand operand
        lhs: String,
        /// Domain of the right-hand operand
        rhs: String,
    },

    /// A numeric value could not be cast to the target type.
    #[error("Failed to cast value to target type")]
    CastFailed,

    /// Failed to solve a linear system.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),
}

/// Result type for basis operations
pub type Result<T> = std::result::Result<T, Error>;
