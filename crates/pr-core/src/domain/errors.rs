use super::DataArray;
use crate::numerics::linalg::LinalgError;
use std::collections::TryReserveError;

pub type InvertorResult<T> = Result<T, InvertorError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvertorError {
    #[error("problem allocating memory for {array} ({requested} values)")]
    Allocation {
        array: DataArray,
        requested: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("input array too short for {array} data: need {required}, got {actual}")]
    BufferTooSmall {
        array: DataArray,
        required: usize,
        actual: usize,
    },
    #[error("data arrays are of different length: x={npoints}, y={ny}, err={nerr}")]
    InconsistentData {
        npoints: usize,
        ny: usize,
        nerr: usize,
    },
    #[error("I(q) point {index} has no error")]
    ZeroUncertainty { index: usize },
    #[error("q-value at index {index} is zero; delete that entry before proceeding")]
    ZeroQ { index: usize },
    #[error("the P(r) expansion needs at least one base function")]
    EmptyExpansion,
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

#[cfg(test)]
mod tests {
    use super::InvertorError;
    use crate::domain::DataArray;

    #[test]
    fn buffer_error_names_the_array() {
        let error = InvertorError::BufferTooSmall {
            array: DataArray::Err,
            required: 4,
            actual: 2,
        };
        assert_eq!(
            error.to_string(),
            "input array too short for err data: need 4, got 2"
        );
    }

    #[test]
    fn inconsistent_data_reports_all_lengths() {
        let error = InvertorError::InconsistentData {
            npoints: 2,
            ny: 2,
            nerr: 3,
        };
        assert!(error.to_string().contains("x=2, y=2, err=3"));
    }
}
