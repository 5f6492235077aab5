//! Unit tests for the parameter search space

use hydra::models::{ParameterDescriptor, ParameterGroup, ParameterSet};
use hydra::optimization::{SearchSpace, SpaceError};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_default_space_has_every_group() {
    let space = SearchSpace::default();
    assert_eq!(space.dimensions(), 27);
    for group in [
        ParameterGroup::Sniper,
        ParameterGroup::Reentry,
        ParameterGroup::AiSignal,
        ParameterGroup::Risk,
        ParameterGroup::ValueAccrual,
        ParameterGroup::Execution,
    ] {
        assert!(space.descriptors().iter().any(|d| d.group == group));
    }
}

#[test]
fn test_rejects_inverted_or_duplicate_descriptors() {
    let inverted = vec![ParameterDescriptor::continuous("x", 2.0, 1.0, ParameterGroup::Risk)];
    assert!(matches!(
        SearchSpace::new(inverted),
        Err(SpaceError::InvalidDescriptor(_))
    ));

    let duplicate = vec![
        ParameterDescriptor::continuous("x", 0.0, 1.0, ParameterGroup::Risk),
        ParameterDescriptor::continuous("x", 0.0, 2.0, ParameterGroup::Risk),
    ];
    assert!(SearchSpace::new(duplicate).is_err());
}

#[test]
fn test_unknown_and_missing_parameters() {
    let space = SearchSpace::default();
    let extra = space.defaults().with("leverage", 3.0);
    assert!(matches!(
        space.check_bounds(&extra),
        Err(SpaceError::UnknownParameter(name)) if name == "leverage"
    ));

    let missing = ParameterSet::new().with("sniper_min_liquidity", 10.0);
    assert!(matches!(
        space.check_bounds(&missing),
        Err(SpaceError::MissingParameter(_))
    ));
}

#[test]
fn test_repair_projects_allocations() {
    let space = SearchSpace::default();
    let skewed = space
        .defaults()
        .with("treasury_allocation", 0.80)
        .with("burn_allocation", 0.30)
        .with("buyback_allocation", 0.25);
    let repaired = space.repair(&skewed);
    assert!(space.check_bounds(&repaired).is_ok());
    assert!((repaired.allocation_sum().unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn test_unit_vector_round_trip_snaps_integers() {
    let space = SearchSpace::default();
    let defaults = space.defaults();
    let unit = space.to_unit_vector(&defaults).unwrap();
    assert!(unit.iter().all(|u| (0.0..=1.0).contains(u)));

    let nudged: Vec<f64> = unit.iter().map(|u| (u + 0.013).min(1.0)).collect();
    let set = space.from_unit_vector(&nudged).unwrap();
    let reaction = set.get("sniper_reaction_time").unwrap();
    assert_eq!(reaction.fract(), 0.0);

    assert!(matches!(
        space.from_unit_vector(&[0.5]),
        Err(SpaceError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_samples_are_valid() {
    let space = SearchSpace::default();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let set = space.sample(&mut rng);
        assert!(space.check_bounds(&set).is_ok());
        assert!((set.allocation_sum().unwrap() - 1.0).abs() < 1e-6);
    }
}
