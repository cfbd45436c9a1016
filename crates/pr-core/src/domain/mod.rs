pub mod errors;

pub use errors::{InvertorError, InvertorResult};

use std::fmt::{Display, Formatter};

/// One of the three index-aligned arrays held by an [`crate::Invertor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataArray {
    X,
    Y,
    Err,
}

impl DataArray {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Err => "err",
        }
    }
}

impl Display for DataArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
