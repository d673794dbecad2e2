// SPDX-License-Identifier: AGPL-3.0-only

//! Wilson Fermion CG Validation.
//!
//! Inverts the free Wilson operator on a point source and checks the result
//! against an independent CG reference and the momentum-space sum, then
//! verifies operator identities on a random SU(3) gauge field.
//!
//! # Validation targets
//!
//! | Observable | Expected | Tolerance | Basis |
//! |-----------|----------|-----------|-------|
//! | Cold plaquette | 1.0 | 1e-12 | Definition |
//! | x(0)[0][0], 8×4×4×4, m=0.1 | 0.2522536470 | 1e-6 abs | Reference CG run |
//! | Momentum-space G(0) | same | 1e-6 abs | Free-field Fourier sum |
//! | Reference iterations | < 200 | upper bound | Algorithm sanity |
//! | Mass action | 1 iteration | exact | `D = m` |
//! | ⟨y, D x⟩ = ⟨D† y, x⟩ | 0 | 1e-12 rel | γ5-hermiticity |
//! | D[Uᵍ] gψ = g D[U] ψ | 0 | 1e-12 rel | Gauge covariance |
//! | Hamber-Wu / Naik G(0) | Fourier sum | 1e-6 abs | Free-field Fourier sum |
//!
//! # Provenance
//!
//! Reference value from a CG inversion at relative residual 1e-8 on a unit
//! gauge field; cross-checked by `free_propagator_origin`.

use std::sync::Arc;

use num_complex::Complex64;
use quarkprop::config::{ActionKind, InverterConfig};
use quarkprop::error::Result;
use quarkprop::lattice::action::{MassAction, HAMBER_WU_TERMS, NAIK_TERMS, WILSON_TERMS};
use quarkprop::lattice::cg::conjugate_gradient;
use quarkprop::lattice::constants::N_COLOURS;
use quarkprop::lattice::field::{LatticeColourMatrix, LatticeColourVector};
use quarkprop::lattice::free_field::free_propagator_origin;
use quarkprop::lattice::gauge::{random_gauge_rotation, rotate_fermion};
use quarkprop::lattice::layout::Layout;
use quarkprop::tolerances;
use quarkprop::validation::ValidationHarness;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NC: usize = N_COLOURS;

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Wilson Fermion CG Validation                               ║");
    println!("║  Multi-hop hopping matrix + normal-equation CG              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut harness = ValidationHarness::new("wilson_cg");
    if let Err(e) = run(&mut harness) {
        error!(error = %e, "validation aborted");
        harness.check_bool(&format!("run completed ({e})"), false);
    }
    harness.finish();
}

fn run(harness: &mut ValidationHarness) -> Result<()> {
    reference_solve(harness)?;
    mass_action(harness)?;
    operator_identities(harness)?;
    improved_free_field(harness)?;
    Ok(())
}

fn reference_solve(harness: &mut ValidationHarness) -> Result<()> {
    println!("═══ Free Wilson point source (8×4×4×4, m=0.1) ═══");
    let config = InverterConfig::default();
    config.validate()?;
    let layout = config.layout()?;
    let gauge = LatticeColourMatrix::<NC>::cold_start(Arc::clone(&layout));
    harness.check_abs("cold plaquette", gauge.average_plaquette(), 1.0, 1e-12);

    let action = config.build_action(&gauge)?;
    let origin = vec![0_isize; layout.num_dims()];
    let source = LatticeColourVector::<NC>::point_source(
        Arc::clone(&layout),
        config.num_spins(),
        &origin,
        0,
        0,
    );
    let result = conjugate_gradient(action.as_ref(), &source, config.max_iterations, config.tolerance)?;
    let x00 = result.solution.at_coords(&origin, 0)[0];
    println!(
        "  x(0)[0][0] = {:.12} + {:.3e}i after {} iterations (residual {:.3e})",
        x00.re, x00.im, result.iterations, result.residual
    );

    harness.check_bool("reference CG converged", result.converged());
    harness.check_upper(
        "reference iterations",
        result.iterations as f64,
        tolerances::REFERENCE_ITERATIONS_MAX as f64,
    );
    harness.check_abs(
        "x(0)[0][0] vs reference",
        x00.re,
        tolerances::WILSON_FREE_POINT_REF,
        tolerances::SOLUTION_VS_REFERENCE_ABS,
    );
    harness.check_abs("x(0)[0][0] imaginary part", x00.im, 0.0, tolerances::SYMMETRY_ZERO_ABS);

    let mut off_diagonal = 0.0_f64;
    for spin in 0..config.num_spins() {
        let v = result.solution.at_coords(&origin, spin);
        for colour in 0..NC {
            if (spin, colour) != (0, 0) {
                off_diagonal = off_diagonal.max(v[colour].norm());
            }
        }
    }
    harness.check_upper(
        "other components at source",
        off_diagonal,
        tolerances::SYMMETRY_ZERO_ABS,
    );

    let mut applied = source.zeros_like();
    action.apply_full(&mut applied, &result.solution);
    applied.axpy(Complex64::new(-1.0, 0.0), &source);
    let recomputed = (applied.norm_sq() / source.norm_sq()).sqrt();
    harness.check_upper(
        "recomputed residual",
        recomputed,
        config.tolerance * tolerances::RECOMPUTED_RESIDUAL_FACTOR,
    );

    let fourier = free_propagator_origin(&config.shape, config.mass, &config.twists, &WILSON_TERMS)?;
    println!("  momentum-space G(0) = {fourier:.12}");
    harness.check_abs(
        "momentum-space G(0) vs reference",
        fourier,
        tolerances::WILSON_FREE_POINT_REF,
        tolerances::SOLUTION_VS_REFERENCE_ABS,
    );
    println!();
    Ok(())
}

fn mass_action(harness: &mut ValidationHarness) -> Result<()> {
    println!("═══ Mass action (D = m) ═══");
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4])?);
    let action = MassAction::new(2.0)?;
    let source = LatticeColourVector::<NC>::random(layout, 4, 7);
    let result = conjugate_gradient(&action, &source, 10, 1e-12)?;
    let mut expected = source.clone();
    expected.scale(0.5);
    let mut diff = result.solution.clone();
    diff.axpy(Complex64::new(-1.0, 0.0), &expected);
    println!("  iterations = {}", result.iterations);
    harness.check_abs("mass action iterations", result.iterations as f64, 1.0, 0.5);
    harness.check_identity(
        "mass action solution b/m",
        diff.norm_sq().sqrt(),
        expected.norm_sq().sqrt(),
        tolerances::OPERATOR_IDENTITY_REL,
    );
    println!();
    Ok(())
}

fn operator_identities(harness: &mut ValidationHarness) -> Result<()> {
    println!("═══ Operator identities on a hot SU(3) gauge field (4^4) ═══");
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4])?);
    let gauge = LatticeColourMatrix::<NC>::hot_start(Arc::clone(&layout), 11);
    let twists = [0.5, 0.25, 0.0, 0.0];
    let x = LatticeColourVector::<NC>::random(Arc::clone(&layout), 4, 101);
    let y = LatticeColourVector::<NC>::random(Arc::clone(&layout), 4, 202);
    let rotation = random_gauge_rotation::<NC>(Arc::clone(&layout), 303);
    let rotated_gauge = gauge.gauge_transformed(&rotation)?;

    println!("  plaquette = {:.6}", gauge.average_plaquette());
    harness.check_abs(
        "plaquette gauge invariant",
        rotated_gauge.average_plaquette(),
        gauge.average_plaquette(),
        1e-12,
    );

    for kind in [ActionKind::Wilson, ActionKind::HamberWu, ActionKind::Naik] {
        let config = InverterConfig {
            shape: vec![4; 4],
            action: kind,
            twists: twists.to_vec(),
            ..Default::default()
        };
        let name = kind.name();
        let action = config.build_action(&gauge)?;

        // ⟨y, D x⟩ vs ⟨Γ D Γ y, x⟩
        let mut dx = x.zeros_like();
        action.apply_full(&mut dx, &x);
        let lhs = y.dot(&dx);
        let mut gy = y.clone();
        action.apply_hermiticity(&mut gy);
        let mut dagger_y = y.zeros_like();
        action.apply_full(&mut dagger_y, &gy);
        action.remove_hermiticity(&mut dagger_y);
        let rhs = dagger_y.dot(&x);
        harness.check_identity(
            &format!("{name} γ5-hermiticity"),
            (lhs - rhs).norm(),
            lhs.norm(),
            tolerances::OPERATOR_IDENTITY_REL,
        );

        // D[Uᵍ] (g x) vs g (D[U] x)
        let rotated_action = config.build_action(&rotated_gauge)?;
        let gx = rotate_fermion(&x, &rotation)?;
        let mut d_gx = x.zeros_like();
        rotated_action.apply_full(&mut d_gx, &gx);
        let mut g_dx = rotate_fermion(&dx, &rotation)?;
        g_dx.axpy(Complex64::new(-1.0, 0.0), &d_gx);
        harness.check_identity(
            &format!("{name} gauge covariance"),
            g_dx.norm_sq().sqrt(),
            d_gx.norm_sq().sqrt(),
            tolerances::OPERATOR_IDENTITY_REL,
        );
    }
    println!();
    Ok(())
}

fn improved_free_field(harness: &mut ValidationHarness) -> Result<()> {
    println!("═══ Improved actions on a unit gauge field (4^4, m=0.2) ═══");
    let shape = [4, 4, 4, 4];
    let layout = Arc::new(Layout::new(&shape)?);
    let gauge = LatticeColourMatrix::<NC>::cold_start(Arc::clone(&layout));
    let origin = [0_isize; 4];
    let source = LatticeColourVector::<NC>::point_source(Arc::clone(&layout), 4, &origin, 0, 0);

    let cases: [(ActionKind, [f64; 4], &[(usize, f64)]); 2] = [
        (ActionKind::HamberWu, [0.0; 4], &HAMBER_WU_TERMS),
        (ActionKind::Naik, [0.5, 0.0, 0.0, 0.0], &NAIK_TERMS),
    ];
    for (kind, twists, terms) in cases {
        let name = kind.name();
        let config = InverterConfig {
            shape: shape.to_vec(),
            action: kind,
            mass: 0.2,
            twists: twists.to_vec(),
            ..Default::default()
        };
        let action = config.build_action(&gauge)?;
        let result = conjugate_gradient(action.as_ref(), &source, 500, 1e-10)?;
        let x00 = result.solution.at_coords(&origin, 0)[0].re;
        let expected = free_propagator_origin(&shape, 0.2, &twists, terms)?;
        println!(
            "  {name}: x(0)[0][0] = {x00:.12}, G(0) = {expected:.12}, {} iterations",
            result.iterations
        );
        harness.check_bool(&format!("{name} CG converged"), result.converged());
        harness.check_abs(
            &format!("{name} x(0)[0][0] vs G(0)"),
            x00,
            expected,
            tolerances::SOLUTION_VS_REFERENCE_ABS,
        );
    }
    println!();
    Ok(())
}
