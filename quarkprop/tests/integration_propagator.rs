// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: point propagators and meson correlators.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use num_complex::Complex64;
use quarkprop::error::QuarkPropError;
use quarkprop::lattice::action::{WilsonAction, WILSON_TERMS};
use quarkprop::lattice::correlator::{
    effective_mass, fold_correlator, meson_correlator, meson_correlator_at_momentum,
    pion_correlator,
};
use quarkprop::lattice::field::LatticeColourMatrix;
use quarkprop::lattice::free_field::free_propagator_origin;
use quarkprop::lattice::gamma::{chirality, euclidean_gammas};
use quarkprop::lattice::layout::Layout;
use quarkprop::lattice::propagator::{compute_propagator, PropagatorResult};

fn wilson_propagator(shape: &[usize], mass: f64, hot_seed: Option<u64>) -> PropagatorResult {
    let origin = vec![0_isize; shape.len()];
    wilson_propagator_from(shape, mass, hot_seed, &origin)
}

fn wilson_propagator_from(
    shape: &[usize],
    mass: f64,
    hot_seed: Option<u64>,
    source: &[isize],
) -> PropagatorResult {
    let layout = Arc::new(Layout::new(shape).unwrap());
    let gauge = match hot_seed {
        Some(seed) => LatticeColourMatrix::<3>::hot_start(Arc::clone(&layout), seed),
        None => LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout)),
    };
    let action = WilsonAction::new(mass, &gauge).unwrap();
    compute_propagator(&action, &layout, 4, source, 1000, 1e-10).unwrap()
}

#[test]
fn free_propagator_diagonal_at_source() {
    let shape = [4, 4, 4, 4];
    let result = wilson_propagator(&shape, 0.3, None);
    assert!(result.all_converged());
    assert_eq!(result.solves.len(), 12);

    let expected = free_propagator_origin(&shape, 0.3, &[0.0; 4], &WILSON_TERMS).unwrap();
    let at_source = result.propagator.at_coords(&[0, 0, 0, 0]);
    for i in 0..12 {
        for j in 0..12 {
            let want = if i == j { expected } else { 0.0 };
            assert_abs_diff_eq!(at_source[(i, j)].re, want, epsilon = 1e-8);
            assert_abs_diff_eq!(at_source[(i, j)].im, 0.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn pion_equals_pseudoscalar_meson() {
    let result = wilson_propagator(&[4, 4, 4, 4], 0.5, Some(3));
    assert!(result.all_converged());
    let prop = &result.propagator;

    let gammas = euclidean_gammas(4).unwrap();
    let g5 = chirality(&gammas);
    let pion = pion_correlator(prop, 0).unwrap();
    let meson = meson_correlator(prop, prop, &g5, &g5, &g5, 0).unwrap();

    assert_eq!(pion.len(), 4);
    for (p, m) in pion.iter().zip(&meson) {
        assert!(*p > 0.0);
        assert_relative_eq!(m.re, *p, max_relative = 1e-10);
        assert_abs_diff_eq!(m.im, 0.0, epsilon = 1e-10 * p.abs());
    }
}

#[test]
fn free_pion_is_time_symmetric_and_decays() {
    let result = wilson_propagator(&[8, 4, 4, 4], 0.5, None);
    assert!(result.all_converged());
    let pion = pion_correlator(&result.propagator, 0).unwrap();

    for t in 1..8 {
        assert_abs_diff_eq!(pion[t], pion[8 - t], epsilon = 1e-8 * pion[0]);
    }
    for t in 0..4 {
        assert!(pion[t] > pion[t + 1], "C({t}) = {} <= C({}) = {}", pion[t], t + 1, pion[t + 1]);
    }

    let folded = fold_correlator(&pion);
    assert_abs_diff_eq!(folded[3], pion[3], epsilon = 1e-8 * pion[0]);
    let meff = effective_mass(&folded, 1.0);
    for &m in &meff {
        assert!(m > 0.0 && m.is_finite(), "effective mass {m}");
    }
}

#[test]
fn correlator_rejects_bad_inputs() {
    let result = wilson_propagator(&[2, 2, 2, 2], 1.0, None);
    let prop = &result.propagator;
    assert!(pion_correlator(prop, 4).is_err());

    let gammas = euclidean_gammas(4).unwrap();
    let g5 = chirality(&gammas);
    let small = euclidean_gammas(2).unwrap();
    assert!(meson_correlator(prop, prop, &small[0], &g5, &g5, 0).is_err());
    assert!(matches!(
        meson_correlator_at_momentum(prop, prop, &g5, &g5, &g5, 0, &[0, 0]),
        Err(QuarkPropError::InvalidParameter { name: "momentum", .. })
    ));

    let shifted = wilson_propagator_from(&[2, 2, 2, 2], 1.0, None, &[1, 0, 0, 0]);
    assert!(matches!(
        meson_correlator(prop, &shifted.propagator, &g5, &g5, &g5, 0),
        Err(QuarkPropError::InvalidParameter { name: "propagator", .. })
    ));
    let other_lattice = wilson_propagator(&[4, 2, 2, 2], 1.0, None);
    assert!(matches!(
        meson_correlator(prop, &other_lattice.propagator, &g5, &g5, &g5, 0),
        Err(QuarkPropError::LayoutMismatch)
    ));
}

#[test]
fn two_flavour_pseudoscalar_is_hermitian_pair() {
    let light = wilson_propagator(&[4, 4, 4, 4], 0.5, Some(3));
    let heavy = wilson_propagator(&[4, 4, 4, 4], 0.8, Some(3));
    assert!(light.all_converged() && heavy.all_converged());
    let (light, heavy) = (&light.propagator, &heavy.propagator);

    let gammas = euclidean_gammas(4).unwrap();
    let g5 = chirality(&gammas);
    let light_heavy = meson_correlator(light, heavy, &g5, &g5, &g5, 0).unwrap();
    let heavy_light = meson_correlator(heavy, light, &g5, &g5, &g5, 0).unwrap();
    let pion_light = pion_correlator(light, 0).unwrap();
    let pion_heavy = pion_correlator(heavy, 0).unwrap();

    for t in 0..4 {
        // Tr[S_l† S_h] is the conjugate of Tr[S_h† S_l], bounded by Cauchy-Schwarz
        let scale = light_heavy[t].norm();
        assert_abs_diff_eq!(light_heavy[t].re, heavy_light[t].re, epsilon = 1e-10 * scale);
        assert_abs_diff_eq!(light_heavy[t].im, -heavy_light[t].im, epsilon = 1e-10 * scale);
        assert!(scale <= (pion_light[t] * pion_heavy[t]).sqrt() * (1.0 + 1e-12));
    }
}

#[test]
fn momentum_projections_sum_to_source_timeline() {
    let result = wilson_propagator(&[4, 4, 4, 4], 0.5, None);
    let prop = &result.propagator;
    let gammas = euclidean_gammas(4).unwrap();
    let g5 = chirality(&gammas);

    let zero = meson_correlator_at_momentum(prop, prop, &g5, &g5, &g5, 0, &[0, 0, 0]).unwrap();
    let pion = pion_correlator(prop, 0).unwrap();
    for (z, p) in zero.iter().zip(&pion) {
        assert_relative_eq!(z.re, *p, max_relative = 1e-12);
    }

    // Σ_p C(t, p) = V_s · c(t, x_s = x₀)
    let mut total = vec![Complex64::new(0.0, 0.0); 4];
    for kx in 0..4 {
        for ky in 0..4 {
            for kz in 0..4 {
                let c = meson_correlator_at_momentum(prop, prop, &g5, &g5, &g5, 0, &[kx, ky, kz])
                    .unwrap();
                for (acc, v) in total.iter_mut().zip(c) {
                    *acc += v;
                }
            }
        }
    }
    for (t, acc) in total.iter().enumerate() {
        let local = prop.at_coords(&[t as isize, 0, 0, 0]).norm_squared();
        assert_relative_eq!(acc.re, 64.0 * local, max_relative = 1e-9);
        assert_abs_diff_eq!(acc.im, 0.0, epsilon = 1e-9 * local);
    }

    // cubic symmetry of the free field
    let px = meson_correlator_at_momentum(prop, prop, &g5, &g5, &g5, 0, &[1, 0, 0]).unwrap();
    let pz = meson_correlator_at_momentum(prop, prop, &g5, &g5, &g5, 0, &[0, 0, -1]).unwrap();
    for t in 0..4 {
        assert_relative_eq!(px[t].re, pz[t].re, max_relative = 1e-9);
        assert!(px[t].re < zero[t].re);
    }
}
