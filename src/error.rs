use std::fmt::Display;

/// Everything the wheel can reject.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelError {
    /// Prize table length does not match the configured segment count.
    SegmentCountMismatch { expected: usize, found: usize },
    EmptyTable,
    /// Weight is zero, negative or non-finite, or the running total overflowed.
    InvalidWeight { index: usize, weight: f64 },
    /// Every weight is zero.
    ZeroTotalWeight,
    /// Parallel value/weight sequences of different lengths.
    LengthMismatch { values: usize, weights: usize },
    InvalidParams(String),

    /// A spin is already in flight.
    Busy,
    /// The previous spin resolved but the wheel was not reset.
    AwaitingReset,

    UnknownSegment { id: usize, count: usize },
    CheatsDisabled,
    InvalidCheat(String),
}

impl Display for WheelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WheelError::SegmentCountMismatch { expected, found } => write!(
                f,
                "prize table has {} entries but the wheel has {} segments",
                found, expected
            ),
            WheelError::EmptyTable => write!(f, "prize table is empty"),
            WheelError::InvalidWeight { index, weight } => {
                write!(f, "segment {} has invalid weight {}", index, weight)
            }
            WheelError::ZeroTotalWeight => write!(f, "total weight is zero"),
            WheelError::LengthMismatch { values, weights } => write!(
                f,
                "{} values but {} weights",
                values, weights
            ),
            WheelError::InvalidParams(msg) => write!(f, "invalid parameters: {}", msg),
            WheelError::Busy => write!(f, "wheel is already spinning"),
            WheelError::AwaitingReset => write!(f, "wheel must be reset before spinning again"),
            WheelError::UnknownSegment { id, count } => {
                write!(f, "segment {} does not exist (wheel has {})", id, count)
            }
            WheelError::CheatsDisabled => write!(f, "cheat panel is disabled"),
            WheelError::InvalidCheat(s) => write!(f, "unrecognised cheat '{}'", s),
        }
    }
}

impl std::error::Error for WheelError {}

pub type Result<T> = std::result::Result<T, WheelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = WheelError::SegmentCountMismatch { expected: 8, found: 7 };
        assert_eq!(
            e.to_string(),
            "prize table has 7 entries but the wheel has 8 segments"
        );
        assert_eq!(WheelError::Busy.to_string(), "wheel is already spinning");
    }
}
