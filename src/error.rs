//! Errors for caller contract violations.

use std::error::Error;
use std::fmt;

/// An error raised for invalid caller input.
///
/// Geometric degeneracies never surface here: zero-length segments yield
/// zero vectors, unreducible curves yield empty reduction lists, and miters
/// past their limit fall back to bevels. An error of this type always means
/// a documented contract was broken by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum CurveError {
    /// A Bezier segment was constructed with an unsupported number of
    /// control points.
    ///
    /// Supported orders are 1 (line), 2 (quadratic) and 3 (cubic), so a
    /// segment takes two to four control points.
    InvalidOrder {
        /// The number of control points that were supplied.
        points: usize,
    },
    /// A chain split was requested at a parameter outside [0, 1].
    ///
    /// Split parameters address the chain's own unit range, so a value
    /// outside it (or NaN) has no position to refer to.
    SplitOutOfRange {
        /// The offending parameter value.
        t: f64,
    },
    /// A dash pattern contained no positive entry, so a dash walk over it
    /// could never advance.
    EmptyDashPattern,
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::InvalidOrder { points } => write!(
                f,
                "unsupported Bezier order: got {points} control points, expected 2 to 4"
            ),
            CurveError::SplitOutOfRange { t } => {
                write!(f, "chain split parameter {t} is outside [0, 1]")
            }
            CurveError::EmptyDashPattern => {
                write!(f, "dash pattern has no positive entry")
            }
        }
    }
}

impl Error for CurveError {}
