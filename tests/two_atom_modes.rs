use anyhow::Result;
use nalgebra::Complex;
use phonon_chain::{TwoAtomBuilder, TwoAtomParams, Wavevector, compute_modes, dispersion};

const TOLERANCE: f64 = 1e-10;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{what}: expected {expected}, got {actual}"
    );
}

/// `|<a, b>| / (|a| |b|)` for real two-component shapes.
fn alignment(shape: [f64; 2], reference: [f64; 2]) -> f64 {
    let dot = shape[0] * reference[0] + shape[1] * reference[1];
    let norms = (shape[0].hypot(shape[1])) * (reference[0].hypot(reference[1]));
    dot.abs() / norms
}

#[test]
fn unit_lattice_zone_centre_has_translation_and_relative_modes() -> Result<()> {
    let modes = compute_modes(1.0, 1.0, 1.0)?;

    assert_close(modes.q0.eigenvalues[0], 0.0, "acoustic eigenvalue");
    assert_close(modes.q0.eigenvalues[1], 4.0, "optical eigenvalue");
    assert!(modes.q0.frequencies[0] < 1e-7);
    assert_close(modes.q0.frequencies[1], 2.0, "optical frequency");

    assert_close(alignment(modes.q0.displacement(0), [1.0, 1.0]), 1.0, "translation mode");
    assert_close(alignment(modes.q0.displacement(1), [1.0, -1.0]), 1.0, "relative mode");
    Ok(())
}

#[test]
fn zone_edge_decouples_atoms() -> Result<()> {
    let (m, k) = (2.0, 3.0);
    let matrix = TwoAtomBuilder::build(&TwoAtomParams::new(m, m, k), Wavevector::Pi);
    assert_eq!(matrix[(0, 1)], Complex::new(0.0, 0.0));
    assert_eq!(matrix[(1, 0)], Complex::new(0.0, 0.0));

    let modes = compute_modes(m, m, k)?;
    // Decoupled sites each oscillate at 2k/m, so the two branches meet here.
    for value in &modes.qpi.eigenvalues {
        assert_close(*value, 2.0 * k / m, "zone-edge eigenvalue");
    }
    Ok(())
}

#[test]
fn zone_edge_with_unequal_masses_gives_diagonal_terms() -> Result<()> {
    let modes = compute_modes(1.0, 4.0, 1.0)?;
    assert_close(modes.qpi.eigenvalues[0], 0.5, "heavy site");
    assert_close(modes.qpi.eigenvalues[1], 2.0, "light site");
    assert_close(modes.qpi.displacement(0)[0], 0.0, "light site at rest in heavy mode");
    Ok(())
}

#[test]
fn frequencies_are_non_negative_for_valid_inputs() -> Result<()> {
    for m2 in [1.0, 1.7, 3.3, 6.1, 10.0] {
        for k in [0.1, 1.0, 25.0] {
            let modes = compute_modes(1.0, m2, k)?;
            for frequency in modes.q0.frequencies.iter().chain(&modes.qpi.frequencies) {
                assert!(*frequency >= 0.0 && frequency.is_finite());
            }
            assert!(modes.q0.eigenvalues[0] <= modes.q0.eigenvalues[1]);
        }
    }
    Ok(())
}

#[test]
fn rebuilding_is_deterministic() -> Result<()> {
    let first = compute_modes(1.0, 2.7, 1.3)?;
    let second = compute_modes(1.0, 2.7, 1.3)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn non_positive_mass_propagates_instead_of_failing() -> Result<()> {
    let modes = compute_modes(0.0, 1.0, 1.0)?;
    assert!(modes.q0.eigenvalues.iter().all(|v| v.is_nan()));
    assert!(modes.q0.frequencies.iter().all(|v| v.is_nan()));
    Ok(())
}

#[test]
fn dispersion_reaches_special_points() -> Result<()> {
    let params = TwoAtomParams::new(1.0, 3.0, 1.0);
    let points = dispersion(&params, 201)?;
    let centre = &points[100];
    assert!(centre.q.abs() < 1e-12);
    assert!(centre.acoustic < 1e-7);
    assert_close(centre.optical, (2.0f64 * (1.0 + 1.0 / 3.0)).sqrt(), "optical at centre");

    let edge = points.last().expect("edge point");
    assert!((edge.acoustic - (2.0f64 / 3.0).sqrt()).abs() < 1e-7);
    assert!((edge.optical - 2.0f64.sqrt()).abs() < 1e-7);
    assert!(dispersion(&params, 1).is_err());
    Ok(())
}
