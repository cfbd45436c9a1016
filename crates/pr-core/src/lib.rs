//! Indirect Fourier transform of small-angle scattering data.
//!
//! The pair-distance distribution `P(r)` is expanded on the orthogonal basis
//! `2 r sin(pi n r / d_max)` (Moore, J. Appl. Cryst. (1980) 13, 168-175) and
//! the expansion coefficients are fitted against the measured `I(q)` with a
//! smoothness penalty on `dP/dr`.

pub mod config;
pub mod domain;
pub mod invertor;
pub mod numerics;

pub use config::{ConfigError, InversionConfig, load_inversion_config};
pub use domain::{DataArray, InvertorError, InvertorResult};
pub use invertor::{
    ALPHA_TOO_LARGE_MESSAGE, AlphaEstimate, InversionOutput, Invertor, PrValue, RANK_DEFICIENT_CHI2,
};
