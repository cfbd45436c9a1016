use super::CliError;
use super::sphere::{SphereDataset, sphere_rg};
use pr_core::{InversionConfig, Invertor, load_inversion_config};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct SphereArgs {
    /// Sphere radius, in the inverse unit of q
    #[arg(long)]
    radius: f64,

    /// Maximum distance for the expansion (default: config value, or twice the radius)
    #[arg(long)]
    d_max: Option<f64>,

    /// Number of basis functions
    #[arg(long)]
    nfunc: Option<usize>,

    /// Regularization constant
    #[arg(long)]
    alpha: Option<f64>,

    /// Number of q points to generate
    #[arg(long, default_value_t = 100)]
    points: usize,

    /// Lower bound of the fit window
    #[arg(long)]
    q_min: Option<f64>,

    /// Upper bound of the fit window
    #[arg(long)]
    q_max: Option<f64>,

    /// Relative uncertainty assigned to each generated point
    #[arg(long, default_value_t = 0.01)]
    noise: f64,

    /// Inversion config JSON; command-line values take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Estimate alpha first and invert with the estimate
    #[arg(long)]
    estimate_alpha: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InversionReport {
    radius: f64,
    d_max: f64,
    nfunc: usize,
    alpha: f64,
    points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    alpha_estimate: Option<AlphaEstimateReport>,
    coefficients: Vec<f64>,
    coefficient_errors: Vec<f64>,
    chi2: f64,
    suggested_alpha: f64,
    background: f64,
    oscillations: f64,
    peaks: usize,
    positive_fraction: f64,
    positive_error_fraction: f64,
    rg: f64,
    expected_rg: f64,
    iq0: f64,
    elapsed_seconds: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlphaEstimateReport {
    alpha: f64,
    message: Option<String>,
}

pub(super) fn run_sphere_command(args: SphereArgs) -> Result<i32, CliError> {
    validate_sphere_args(&args)?;
    let config = resolve_config(&args)?;

    let dataset = SphereDataset::generate(args.radius, args.points, args.noise);
    let mut invertor = Invertor::from_config(&config);
    invertor.set_x(&dataset.q)?;
    invertor.set_y(&dataset.intensity)?;
    invertor.set_err(&dataset.err)?;

    let alpha_estimate = if args.estimate_alpha {
        let estimate = invertor.estimate_alpha(config.nfunc);
        info!(alpha = estimate.alpha, "using estimated alpha");
        invertor.set_alpha(estimate.alpha);
        Some(AlphaEstimateReport {
            alpha: estimate.alpha,
            message: estimate.message,
        })
    } else {
        None
    };

    let output = invertor.invert(config.nfunc, config.nr)?;
    let c = &output.coefficients;
    let c_err = output.coefficient_errors();
    let report = InversionReport {
        radius: args.radius,
        d_max: invertor.d_max(),
        nfunc: config.nfunc,
        alpha: invertor.alpha(),
        points: args.points,
        alpha_estimate,
        coefficients: c.clone(),
        coefficient_errors: c_err.clone(),
        chi2: output.chi2,
        suggested_alpha: output.suggested_alpha,
        background: output.background,
        oscillations: invertor.oscillations(c),
        peaks: invertor.get_peaks(c),
        positive_fraction: invertor.get_positive(c),
        positive_error_fraction: invertor.get_pos_err(c, &c_err),
        rg: invertor.rg(c),
        expected_rg: sphere_rg(args.radius),
        iq0: invertor.iq0(c),
        elapsed_seconds: output.elapsed.as_secs_f64(),
    };

    let rendered = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
    println!("{rendered}");
    Ok(0)
}

pub(super) fn run_defaults_command() -> Result<i32, CliError> {
    let rendered =
        serde_json::to_string_pretty(&InversionConfig::default()).map_err(anyhow::Error::from)?;
    println!("{rendered}");
    Ok(0)
}

fn validate_sphere_args(args: &SphereArgs) -> Result<(), CliError> {
    if !(args.radius.is_finite() && args.radius > 0.0) {
        return Err(CliError::Usage(format!(
            "--radius must be a positive number, got {}",
            args.radius
        )));
    }
    if args.points < 2 {
        return Err(CliError::Usage(format!(
            "--points must be at least 2, got {}",
            args.points
        )));
    }
    if !(args.noise.is_finite() && args.noise > 0.0) {
        return Err(CliError::Usage(format!(
            "--noise must be a positive number, got {}",
            args.noise
        )));
    }
    Ok(())
}

/// Defaults, then the config file, then command-line values.
fn resolve_config(args: &SphereArgs) -> Result<InversionConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_inversion_config(path)?,
        None => InversionConfig {
            d_max: 2.0 * args.radius,
            ..InversionConfig::default()
        },
    };

    if let Some(d_max) = args.d_max {
        config.d_max = d_max;
    }
    if let Some(nfunc) = args.nfunc {
        config.nfunc = nfunc;
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if args.q_min.is_some() {
        config.q_min = args.q_min;
    }
    if args.q_max.is_some() {
        config.q_max = args.q_max;
    }

    config.validate()?;
    Ok(config)
}
