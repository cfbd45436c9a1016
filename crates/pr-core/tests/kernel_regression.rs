#![cfg(not(feature = "full-precision-pi"))]

use pr_core::Invertor;
use pr_core::invertor::basis::{ortho, ortho_derived, ortho_transformed, ortho_transformed_smeared};
use pr_core::invertor::diagnostics::{REG_TERM_SLICES, int_p2, reg_term};
use pr_core::invertor::expansion::{dprdr, iq, pr, pr_err};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KernelFixtures {
    basis_cases: Vec<BasisCase>,
    smearing_cases: Vec<SmearingCase>,
    expansion_cases: Vec<ExpansionCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasisCase {
    id: String,
    d_max: f64,
    n: usize,
    r: f64,
    q: f64,
    expected_ortho: f64,
    expected_ortho_derived: f64,
    expected_ortho_transformed: f64,
    abs_tol: f64,
    rel_tol: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmearingCase {
    id: String,
    d_max: f64,
    n: usize,
    slit_height: f64,
    slit_width: f64,
    q: f64,
    npts: usize,
    expected: f64,
    abs_tol: f64,
    rel_tol: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpansionCase {
    id: String,
    d_max: f64,
    coefficients: Vec<f64>,
    coefficient_errors: Vec<f64>,
    r: f64,
    q: f64,
    expected_pr: f64,
    expected_pr_value: f64,
    expected_pr_error: f64,
    expected_dprdr: f64,
    expected_iq: f64,
    expected_reg_term: f64,
    expected_int_p2: f64,
    expected_oscillations: f64,
    expected_peaks: usize,
    expected_positive: f64,
    expected_pos_err: f64,
    expected_rg: f64,
    expected_iq0: f64,
    abs_tol: f64,
    rel_tol: f64,
}

#[test]
fn basis_fixtures_match_golden_values() {
    let fixtures = load_fixtures();

    for case in fixtures.basis_cases {
        assert_scalar_close(
            &format!("{} ortho", case.id),
            case.expected_ortho,
            ortho(case.d_max, case.n, case.r),
            case.abs_tol,
            case.rel_tol,
        );
        assert_scalar_close(
            &format!("{} ortho_derived", case.id),
            case.expected_ortho_derived,
            ortho_derived(case.d_max, case.n, case.r),
            case.abs_tol,
            case.rel_tol,
        );
        assert_scalar_close(
            &format!("{} ortho_transformed", case.id),
            case.expected_ortho_transformed,
            ortho_transformed(case.d_max, case.n, case.q),
            case.abs_tol,
            case.rel_tol,
        );
    }
}

#[test]
fn smearing_fixtures_match_golden_values() {
    let fixtures = load_fixtures();

    for case in fixtures.smearing_cases {
        let actual = ortho_transformed_smeared(
            case.d_max,
            case.n,
            case.slit_height,
            case.slit_width,
            case.q,
            case.npts,
        );
        assert_scalar_close(&case.id, case.expected, actual, case.abs_tol, case.rel_tol);
    }
}

#[test]
fn expansion_fixtures_match_golden_values() {
    let fixtures = load_fixtures();

    for case in fixtures.expansion_cases {
        let c = &case.coefficients;
        let c_err = &case.coefficient_errors;
        let scalar_checks = [
            ("pr", case.expected_pr, pr(c, case.d_max, case.r)),
            ("dprdr", case.expected_dprdr, dprdr(c, case.d_max, case.r)),
            ("iq", case.expected_iq, iq(c, case.d_max, case.q)),
            (
                "reg_term",
                case.expected_reg_term,
                reg_term(c, case.d_max, REG_TERM_SLICES),
            ),
            ("int_p2", case.expected_int_p2, int_p2(c, case.d_max, 100)),
        ];
        for (label, expected, actual) in scalar_checks {
            assert_scalar_close(
                &format!("{} {label}", case.id),
                expected,
                actual,
                case.abs_tol,
                case.rel_tol,
            );
        }

        let with_error = pr_err(c, c_err, case.d_max, case.r);
        assert_scalar_close(
            &format!("{} pr_err value", case.id),
            case.expected_pr_value,
            with_error.value,
            case.abs_tol,
            case.rel_tol,
        );
        assert_scalar_close(
            &format!("{} pr_err error", case.id),
            case.expected_pr_error,
            with_error.error,
            case.abs_tol,
            case.rel_tol,
        );
    }
}

#[test]
fn invertor_diagnostics_match_golden_values() {
    let fixtures = load_fixtures();

    for case in fixtures.expansion_cases {
        let mut invertor = Invertor::new();
        invertor.set_d_max(case.d_max);
        let c = &case.coefficients;
        let c_err = &case.coefficient_errors;

        assert_eq!(
            invertor.get_peaks(c),
            case.expected_peaks,
            "{} peaks",
            case.id
        );
        assert_eq!(
            invertor.get_positive(c),
            case.expected_positive,
            "{} positive fraction",
            case.id
        );
        assert_eq!(
            invertor.get_pos_err(c, c_err),
            case.expected_pos_err,
            "{} positive-within-errors fraction",
            case.id
        );

        let scalar_checks = [
            ("oscillations", case.expected_oscillations, invertor.oscillations(c)),
            ("rg", case.expected_rg, invertor.rg(c)),
            ("iq0", case.expected_iq0, invertor.iq0(c)),
        ];
        for (label, expected, actual) in scalar_checks {
            assert_scalar_close(
                &format!("{} {label}", case.id),
                expected,
                actual,
                case.abs_tol,
                case.rel_tol,
            );
        }
    }
}

fn load_fixtures() -> KernelFixtures {
    let fixture_path = workspace_root().join("fixtures/pr-kernel-fixtures.json");
    let source = fs::read_to_string(&fixture_path).unwrap_or_else(|error| {
        panic!(
            "fixture file {} should be readable: {}",
            fixture_path.display(),
            error
        )
    });

    serde_json::from_str(&source).unwrap_or_else(|error| {
        panic!(
            "fixture file {} should parse as JSON: {}",
            fixture_path.display(),
            error
        )
    })
}

fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
    let abs_diff = (actual - expected).abs();
    let rel_diff = abs_diff / expected.abs().max(1.0);

    assert!(
        abs_diff <= abs_tol || rel_diff <= rel_tol,
        "{} expected={:.15e} actual={:.15e} abs_diff={:.15e} rel_diff={:.15e} abs_tol={:.15e} rel_tol={:.15e}",
        label,
        expected,
        actual,
        abs_diff,
        rel_diff,
        abs_tol,
        rel_tol
    );
}
