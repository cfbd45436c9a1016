//! JSON configuration for an inversion run.

use crate::invertor::{DEFAULT_D_MAX, DEFAULT_NFUNC, DEFAULT_REG_POINTS, Invertor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct InversionConfig {
    pub d_max: f64,
    pub alpha: f64,
    pub q_min: Option<f64>,
    pub q_max: Option<f64>,
    pub nfunc: usize,
    pub nr: usize,
    pub slit_height: f64,
    pub slit_width: f64,
    pub estimate_background: bool,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            d_max: DEFAULT_D_MAX,
            alpha: 0.0,
            q_min: None,
            q_max: None,
            nfunc: DEFAULT_NFUNC,
            nr: DEFAULT_REG_POINTS,
            slit_height: 0.0,
            slit_width: 0.0,
            estimate_background: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read inversion config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse inversion config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid inversion config: {field} = {value}")]
    Invalid { field: &'static str, value: String },
}

impl InversionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.d_max.is_finite() && self.d_max > 0.0) {
            return Err(invalid("dMax", self.d_max));
        }
        if self.nfunc == 0 {
            return Err(invalid("nfunc", self.nfunc));
        }

        let finite_fields = [
            ("alpha", Some(self.alpha)),
            ("qMin", self.q_min),
            ("qMax", self.q_max),
            ("slitHeight", Some(self.slit_height)),
            ("slitWidth", Some(self.slit_width)),
        ];
        for (field, value) in finite_fields {
            if let Some(value) = value.filter(|value| !value.is_finite()) {
                return Err(invalid(field, value));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.to_string(),
    }
}

pub fn load_inversion_config(config_path: impl AsRef<Path>) -> Result<InversionConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: InversionConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

impl Invertor {
    /// An empty problem carrying the parameters of `config`.
    pub fn from_config(config: &InversionConfig) -> Self {
        let mut invertor = Self::new();
        invertor.apply_config(config);
        invertor
    }

    /// Copies the invertor-level parameters; `nfunc` and `nr` are passed to
    /// [`Invertor::invert`] by the caller.
    pub fn apply_config(&mut self, config: &InversionConfig) {
        self.set_d_max(config.d_max);
        self.set_alpha(config.alpha);
        self.set_q_min(config.q_min);
        self.set_q_max(config.q_max);
        self.set_slit_height(config.slit_height);
        self.set_slit_width(config.slit_width);
        self.set_est_bck(config.estimate_background);
    }
}
