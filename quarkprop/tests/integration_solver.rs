// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: Wilson-type actions inverted with CG.
//!
//! Free-field solves are checked against the momentum-space propagator;
//! interacting solves against operator identities that hold for any gauge
//! field.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use quarkprop::config::{ActionKind, InverterConfig};
use quarkprop::lattice::action::{
    FermionAction, HamberWuAction, NaikAction, WilsonAction, HAMBER_WU_TERMS, NAIK_TERMS,
    WILSON_TERMS,
};
use quarkprop::lattice::cg::{conjugate_gradient, CgStatus};
use quarkprop::lattice::field::{LatticeColourMatrix, LatticeColourVector};
use quarkprop::lattice::free_field::free_propagator_origin;
use quarkprop::lattice::gauge::{random_gauge_rotation, rotate_fermion};
use quarkprop::lattice::layout::{Layout, SiteOrdering};
use quarkprop::tolerances;

fn relative_difference<const NC: usize>(
    a: &LatticeColourVector<NC>,
    b: &LatticeColourVector<NC>,
) -> f64 {
    let mut diff = a.clone();
    diff.axpy(Complex64::new(-1.0, 0.0), b);
    (diff.norm_sq() / b.norm_sq()).sqrt()
}

fn solve_origin<A: FermionAction<3> + ?Sized>(
    action: &A,
    layout: &Arc<Layout>,
    tolerance: f64,
) -> (Complex64, usize, CgStatus) {
    let origin = vec![0_isize; layout.num_dims()];
    let source = LatticeColourVector::<3>::point_source(Arc::clone(layout), 4, &origin, 0, 0);
    let result = conjugate_gradient(action, &source, 1000, tolerance).unwrap();
    let x00 = result.solution.at_coords(&origin, 0)[0];
    (x00, result.iterations, result.status)
}

#[test]
fn free_wilson_reference_point_source() {
    let layout = Arc::new(Layout::new(&tolerances::REFERENCE_SHAPE).unwrap());
    let gauge = LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout));
    let action = WilsonAction::new(tolerances::REFERENCE_MASS, &gauge).unwrap();
    let origin = [0_isize; 4];
    let source = LatticeColourVector::<3>::point_source(Arc::clone(&layout), 4, &origin, 0, 0);
    let solve = || {
        conjugate_gradient(
            &action,
            &source,
            tolerances::REFERENCE_MAX_ITERATIONS,
            tolerances::REFERENCE_TOLERANCE,
        )
        .unwrap()
    };
    let result = solve();

    assert_eq!(result.status, CgStatus::Converged);
    assert!(
        result.iterations < tolerances::REFERENCE_ITERATIONS_MAX,
        "free Wilson reference took {} iterations",
        result.iterations
    );
    let x00 = result.solution.at_coords(&origin, 0)[0];
    assert_abs_diff_eq!(
        x00.re,
        tolerances::WILSON_FREE_POINT_REF,
        epsilon = tolerances::SOLUTION_VS_REFERENCE_ABS
    );
    assert_abs_diff_eq!(x00.im, 0.0, epsilon = tolerances::SYMMETRY_ZERO_ABS);

    for spin in 0..4 {
        let v = result.solution.at_coords(&origin, spin);
        for colour in 0..3 {
            if (spin, colour) != (0, 0) {
                assert!(
                    v[colour].norm() < tolerances::SYMMETRY_ZERO_ABS,
                    "spin {spin} colour {colour}: {}",
                    v[colour]
                );
            }
        }
    }

    let rerun = solve();
    assert_eq!(rerun.iterations, result.iterations);
    assert_eq!(rerun.residual, result.residual);
    assert_eq!(rerun.solution.as_slice(), result.solution.as_slice());
}

#[test]
fn even_odd_ordering_gives_same_solution() {
    let shape = [4, 4, 4, 4];
    let lexi = Arc::new(Layout::new(&shape).unwrap());
    let eo = Arc::new(Layout::with_ordering(&shape, SiteOrdering::EvenOdd).unwrap());

    let action_lexi =
        WilsonAction::new(0.2, &LatticeColourMatrix::<3>::cold_start(Arc::clone(&lexi))).unwrap();
    let action_eo =
        WilsonAction::new(0.2, &LatticeColourMatrix::<3>::cold_start(Arc::clone(&eo))).unwrap();

    let (a, _, status_a) = solve_origin(&action_lexi, &lexi, 1e-10);
    let (b, _, status_b) = solve_origin(&action_eo, &eo, 1e-10);
    assert_eq!(status_a, CgStatus::Converged);
    assert_eq!(status_b, CgStatus::Converged);
    assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-8);
}

#[test]
fn free_improved_actions_match_momentum_space() {
    let shape = [4, 4, 4, 4];
    let layout = Arc::new(Layout::new(&shape).unwrap());
    let gauge = LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout));

    let hw = HamberWuAction::new(0.2, &gauge).unwrap();
    let (x00, _, status) = solve_origin(&hw, &layout, 1e-10);
    let expected = free_propagator_origin(&shape, 0.2, &[0.0; 4], &HAMBER_WU_TERMS).unwrap();
    assert_eq!(status, CgStatus::Converged);
    assert_abs_diff_eq!(expected, 0.224_870_551_887_309_67, epsilon = 1e-12);
    assert_abs_diff_eq!(x00.re, expected, epsilon = 1e-8);

    let twists = [0.5, 0.0, 0.0, 0.0];
    let naik = NaikAction::with_twists(0.2, &gauge, &twists).unwrap();
    let (x00, _, status) = solve_origin(&naik, &layout, 1e-10);
    let expected = free_propagator_origin(&shape, 0.2, &twists, &NAIK_TERMS).unwrap();
    assert_eq!(status, CgStatus::Converged);
    assert_abs_diff_eq!(expected, 0.219_179_202_989_074_92, epsilon = 1e-12);
    assert_abs_diff_eq!(x00.re, expected, epsilon = 1e-8);
}

#[test]
fn antiperiodic_wilson_matches_momentum_space() {
    let shape = [4, 4, 4, 4];
    let twists = [0.5, 0.0, 0.0, 0.0];
    let layout = Arc::new(Layout::new(&shape).unwrap());
    let gauge = LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout));
    let action = WilsonAction::with_twists(0.1, &gauge, &twists).unwrap();

    let (x00, _, status) = solve_origin(&action, &layout, 1e-10);
    let expected = free_propagator_origin(&shape, 0.1, &twists, &WILSON_TERMS).unwrap();
    assert_eq!(status, CgStatus::Converged);
    assert_abs_diff_eq!(expected, 0.233_094_217_274_907_92, epsilon = 1e-12);
    assert_abs_diff_eq!(x00.re, expected, epsilon = 1e-8);
}

#[test]
fn two_dimensional_single_colour_with_twist() {
    let shape = [4, 4];
    let twists = [0.25, 0.0];
    let layout = Arc::new(Layout::new(&shape).unwrap());
    let gauge = LatticeColourMatrix::<1>::cold_start(Arc::clone(&layout));
    let action = WilsonAction::with_twists(0.2, &gauge, &twists).unwrap();
    assert_eq!(action.num_spins(), 2);

    let origin = [0_isize; 2];
    let source = LatticeColourVector::<1>::point_source(Arc::clone(&layout), 2, &origin, 0, 0);
    let result = conjugate_gradient(&action, &source, 500, 1e-12).unwrap();
    assert!(result.converged());
    let expected = free_propagator_origin(&shape, 0.2, &twists, &WILSON_TERMS).unwrap();
    assert_abs_diff_eq!(result.solution.at_coords(&origin, 0)[0].re, expected, epsilon = 1e-9);
}

#[test]
fn gamma5_hermiticity_on_hot_gauge() {
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4]).unwrap());
    let gauge = LatticeColourMatrix::<3>::hot_start(Arc::clone(&layout), 5);
    let twists = [0.5, 0.0, 0.25, 0.0];
    let x = LatticeColourVector::<3>::random(Arc::clone(&layout), 4, 1);
    let y = LatticeColourVector::<3>::random(Arc::clone(&layout), 4, 2);

    let actions: Vec<Box<dyn FermionAction<3>>> = vec![
        Box::new(WilsonAction::with_twists(0.1, &gauge, &twists).unwrap()),
        Box::new(HamberWuAction::with_twists(0.1, &gauge, &twists).unwrap()),
        Box::new(NaikAction::with_twists(0.1, &gauge, &twists).unwrap()),
    ];
    for action in &actions {
        let mut dx = x.zeros_like();
        action.apply_full(&mut dx, &x);
        let lhs = y.dot(&dx);

        let mut gy = y.clone();
        action.apply_hermiticity(&mut gy);
        let mut dagger_y = y.zeros_like();
        action.apply_full(&mut dagger_y, &gy);
        action.remove_hermiticity(&mut dagger_y);
        let rhs = dagger_y.dot(&x);

        assert!(
            (lhs - rhs).norm() < tolerances::OPERATOR_IDENTITY_REL * lhs.norm().max(1.0),
            "<y, Dx> = {lhs}, <D†y, x> = {rhs}"
        );
    }
}

#[test]
fn operator_is_gauge_covariant() {
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4]).unwrap());
    let gauge = LatticeColourMatrix::<3>::hot_start(Arc::clone(&layout), 17);
    let rotation = random_gauge_rotation::<3>(Arc::clone(&layout), 18);
    let rotated = gauge.gauge_transformed(&rotation).unwrap();
    let psi = LatticeColourVector::<3>::random(Arc::clone(&layout), 4, 19);
    let g_psi = rotate_fermion(&psi, &rotation).unwrap();

    for kind in [ActionKind::Wilson, ActionKind::HamberWu, ActionKind::Naik] {
        let config = InverterConfig {
            shape: vec![4; 4],
            action: kind,
            twists: vec![0.5, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        let action = config.build_action(&gauge).unwrap();
        let rotated_action = config.build_action(&rotated).unwrap();

        let mut d_psi = psi.zeros_like();
        action.apply_full(&mut d_psi, &psi);
        let expected = rotate_fermion(&d_psi, &rotation).unwrap();

        let mut observed = psi.zeros_like();
        rotated_action.apply_full(&mut observed, &g_psi);

        let rel = relative_difference(&observed, &expected);
        assert!(rel < tolerances::OPERATOR_IDENTITY_REL, "{}: {rel:e}", kind.name());
    }
}

#[test]
fn solution_is_gauge_covariant() {
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4]).unwrap());
    let gauge = LatticeColourMatrix::<3>::hot_start(Arc::clone(&layout), 23);
    let rotation = random_gauge_rotation::<3>(Arc::clone(&layout), 24);
    let rotated = gauge.gauge_transformed(&rotation).unwrap();

    let action = WilsonAction::new(0.5, &gauge).unwrap();
    let rotated_action = WilsonAction::new(0.5, &rotated).unwrap();
    let source = LatticeColourVector::<3>::random(Arc::clone(&layout), 4, 25);
    let rotated_source = rotate_fermion(&source, &rotation).unwrap();

    let x = conjugate_gradient(&action, &source, 1000, 1e-10).unwrap();
    let x_rotated = conjugate_gradient(&rotated_action, &rotated_source, 1000, 1e-10).unwrap();
    assert!(x.converged());
    assert!(x_rotated.converged());

    let expected = rotate_fermion(&x.solution, &rotation).unwrap();
    assert!(relative_difference(&x_rotated.solution, &expected) < 1e-7);
}

#[test]
fn hot_gauge_solution_satisfies_system() {
    let layout = Arc::new(Layout::new(&[4, 4, 4, 4]).unwrap());
    let gauge = LatticeColourMatrix::<3>::hot_start(Arc::clone(&layout), 31);
    let action = NaikAction::with_twists(0.5, &gauge, &[0.5, 0.0, 0.0, 0.0]).unwrap();
    let source = LatticeColourVector::<3>::random(Arc::clone(&layout), 4, 32);

    let result = conjugate_gradient(&action, &source, 1000, 1e-9).unwrap();
    assert!(result.converged());
    assert!(result.residual <= 1e-9);

    let mut applied = source.zeros_like();
    action.apply_full(&mut applied, &result.solution);
    let rel = relative_difference(&applied, &source);
    assert!(
        rel < 1e-9 * tolerances::RECOMPUTED_RESIDUAL_FACTOR,
        "recomputed residual {rel:e}"
    );
}

#[test]
fn boxed_action_from_config_solves() {
    let config = InverterConfig::from_json_str(
        r#"{"shape": [4, 4, 4, 4], "action": "naik", "mass": 0.2, "twists": [0.5, 0.0, 0.0, 0.0], "tolerance": 1e-10}"#,
    )
    .unwrap();
    let layout = config.layout().unwrap();
    let gauge = LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout));
    let action = config.build_action(&gauge).unwrap();
    let (x00, _, status) = solve_origin(action.as_ref(), &layout, config.tolerance);
    assert_eq!(status, CgStatus::Converged);
    assert_abs_diff_eq!(x00.re, 0.219_179_202_989_074_92, epsilon = 1e-8);
}
