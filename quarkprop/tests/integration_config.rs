// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: JSON configuration to propagator.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use quarkprop::config::{ActionKind, InverterConfig};
use quarkprop::error::QuarkPropError;
use quarkprop::lattice::field::LatticeColourMatrix;
use quarkprop::lattice::free_field::free_propagator_origin;
use quarkprop::lattice::layout::SiteOrdering;
use quarkprop::lattice::propagator::compute_propagator;
use quarkprop::lattice::action::HAMBER_WU_TERMS;

#[test]
fn json_config_drives_propagator() {
    let config = InverterConfig::from_json_str(
        r#"{
            "shape": [4, 4, 4, 4],
            "ordering": "even_odd",
            "action": "hamber_wu",
            "mass": 0.2,
            "twists": [0.0, 0.0, 0.0, 0.0],
            "max_iterations": 500,
            "tolerance": 1e-10
        }"#,
    )
    .unwrap();
    assert_eq!(config.ordering, SiteOrdering::EvenOdd);
    assert_eq!(config.action, ActionKind::HamberWu);

    let layout = config.layout().unwrap();
    let gauge = LatticeColourMatrix::<3>::cold_start(Arc::clone(&layout));
    let action = config.build_action(&gauge).unwrap();
    let result = compute_propagator(
        action.as_ref(),
        &layout,
        config.num_spins(),
        &[0, 0, 0, 0],
        config.max_iterations,
        config.tolerance,
    )
    .unwrap();
    assert!(result.all_converged());

    let expected =
        free_propagator_origin(&config.shape, config.mass, &config.twists, &HAMBER_WU_TERMS)
            .unwrap();
    let at_source = result.propagator.at_coords(&[0, 0, 0, 0]);
    for i in 0..12 {
        assert_abs_diff_eq!(at_source[(i, i)].re, expected, epsilon = 1e-8);
    }
}

#[test]
fn mass_config_needs_no_gauge_structure() {
    let config = InverterConfig {
        shape: vec![3, 3],
        action: ActionKind::Mass,
        mass: 4.0,
        twists: vec![0.0; 2],
        ..Default::default()
    };
    config.validate().unwrap();
    let layout = config.layout().unwrap();
    let gauge = LatticeColourMatrix::<2>::cold_start(Arc::clone(&layout));
    let action = config.build_action(&gauge).unwrap();
    let result =
        compute_propagator(action.as_ref(), &layout, config.num_spins(), &[1, 2], 10, 1e-12)
            .unwrap();
    assert_eq!(result.total_iterations(), result.solves.len());
    assert_abs_diff_eq!(result.propagator.at_coords(&[1, 2])[(0, 0)].re, 0.25, epsilon = 1e-14);
}

#[test]
fn invalid_configs_are_rejected_before_allocation() {
    let err = InverterConfig::from_json_str(r#"{"shape": [4, 0, 4, 4]}"#).unwrap_err();
    assert!(matches!(err, QuarkPropError::ZeroExtent { dim: 1 }));

    let err = InverterConfig::from_json_str(r#"{"action": "staggered"}"#).unwrap_err();
    assert!(matches!(err, QuarkPropError::ConfigParse(_)));

    let err = InverterConfig::from_json_str(r#"{"mass": 0.1, "max_iterations": 0}"#).unwrap_err();
    assert!(matches!(
        err,
        QuarkPropError::InvalidParameter { name: "max_iterations", .. }
    ));
}

#[test]
fn naik_too_large_for_lattice_fails_at_build() {
    let config = InverterConfig {
        shape: vec![2, 2],
        action: ActionKind::Naik,
        twists: vec![0.0; 2],
        ..Default::default()
    };
    config.validate().unwrap();
    let layout = config.layout().unwrap();
    let gauge = LatticeColourMatrix::<1>::cold_start(layout);
    assert!(matches!(
        config.build_action(&gauge),
        Err(QuarkPropError::InvalidHopCount { hops: 3, max: 2 })
    ));
}
