//! Error types for the CAM tools crate.

use thiserror::Error;

/// Errors that can occur while expanding an arc.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArcError {
    /// The command is not a G2/G3 arc.
    #[error("Not an arc command")]
    NotAnArc,

    /// The distance between start point and center is zero.
    #[error("Arc radius is zero or near zero: {radius}")]
    DegenerateRadius { radius: f64 },

    /// The configured segment length is not usable.
    #[error("Invalid arc segment length: {value}")]
    InvalidSegmentLength { value: f32 },

    /// The arc would expand into more moves than allowed.
    #[error("Arc of length {arc_length} needs more than {max} segments")]
    TooManySegments { arc_length: f64, max: usize },
}

/// Result type alias for arc expansion.
pub type ArcResult<T> = Result<T, ArcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_error_display() {
        let err = ArcError::DegenerateRadius { radius: 0.0 };
        assert_eq!(err.to_string(), "Arc radius is zero or near zero: 0");

        let err = ArcError::InvalidSegmentLength { value: -1.0 };
        assert_eq!(err.to_string(), "Invalid arc segment length: -1");

        assert_eq!(ArcError::NotAnArc.to_string(), "Not an arc command");

        let err = ArcError::TooManySegments {
            arc_length: 2.5,
            max: 4,
        };
        assert_eq!(err.to_string(), "Arc of length 2.5 needs more than 4 segments");
    }
}
