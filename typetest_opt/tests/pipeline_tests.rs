//! End-to-end runs of the simplification pipeline.

mod common;

use common::Fixture;
use pretty_assertions::assert_eq;
use typetest_opt::{
    Canonicalize, NodeKind, PassPipeline, SimplifierConfig, SimplifyStats, TypeProfile,
};
use typetest_opt_lattice::{ObjectStamp, TriState};

fn canonicalize_only() -> PassPipeline {
    let mut pipeline = PassPipeline::new();
    pipeline.add_pass(Box::new(Canonicalize::new()));
    pipeline
}

#[test]
fn test_test_degenerates_to_null_check() {
    let mut fx = Fixture::new();
    let value = fx.param(ObjectStamp::object(&fx.ty("Animal")));
    let test = fx.instance_of("Dog", value);
    let guard = fx.graph.add_guard(test, false);

    // A later inference step learns the exact class.
    let known = ObjectStamp::exact(&fx.ty("Dog"));
    fx.graph.set_stamp(value, known.into()).unwrap();
    let stats = canonicalize_only().run(&mut fx.graph).unwrap();

    assert_eq!(stats.null_checks, 1);
    assert!(fx.graph.node(test).is_dead());
    let (condition, negated) = fx.graph.guard_condition(guard).unwrap();
    assert!(!negated);
    match fx.graph.node(condition).kind() {
        NodeKind::LogicNegation(inner) => {
            assert_eq!(fx.graph.node(*inner).kind(), &NodeKind::IsNull(value));
        }
        other => panic!("expected a negated null check, got {:?}", other),
    }
}

#[test]
fn test_contradiction_keeps_failing_guard() {
    let mut fx = Fixture::new();
    let value = fx.param(ObjectStamp::object(&fx.ty("Animal")));
    let test = fx.instance_of("Dog", value);
    let guard = fx.graph.add_guard(test, false);

    let known = ObjectStamp::exact(&fx.ty("Cat"));
    fx.graph.set_stamp(value, known.into()).unwrap();
    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    assert_eq!(stats.contradictions, 1);
    assert_eq!(stats.removed_guards, 0);
    assert_eq!(fx.graph.guards(), &[guard]);
    let (condition, _) = fx.graph.guard_condition(guard).unwrap();
    assert_eq!(fx.graph.node(condition).as_logic_constant(), Some(false));
}

#[test]
fn test_tautology_removes_guard() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let test = fx.instance_of("Animal", value);
    fx.graph.add_guard(test, false);

    let known = ObjectStamp::exact_non_null(&fx.ty("Puppy"));
    fx.graph.set_stamp(value, known.into()).unwrap();
    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    assert_eq!(
        stats,
        SimplifyStats {
            tautologies: 1,
            removed_guards: 1,
            ..SimplifyStats::default()
        }
    );
    assert!(fx.graph.guards().is_empty());
    assert!(fx.graph.type_tests().is_empty());
}

#[test]
fn test_dog_guard_implies_animal_guard() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let dog = fx.instance_of("Dog", value);
    let animal = fx.instance_of("Animal", value);
    let first = fx.graph.add_guard(dog, false);
    fx.graph.add_guard(animal, false);

    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    assert_eq!(stats.implied_guards, 1);
    assert_eq!(stats.removed_guards, 1);
    assert_eq!(fx.graph.guards(), &[first]);
    // The Animal test had no other user.
    assert!(fx.graph.node(animal).is_dead());
    assert_eq!(fx.graph.type_tests(), vec![dog]);
}

#[test]
fn test_failed_animal_guard_decides_dog_guard() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let animal = fx.instance_of("Animal", value);
    let dog = fx.instance_of("Dog", value);
    fx.graph.add_guard(animal, true);
    let second = fx.graph.add_guard(dog, false);

    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    // !Animal => !Dog, so the Dog guard can never pass.
    assert_eq!(stats.implied_guards, 1);
    assert_eq!(stats.removed_guards, 0);
    let (condition, negated) = fx.graph.guard_condition(second).unwrap();
    assert!(!negated);
    assert_eq!(fx.graph.node(condition).as_logic_constant(), Some(false));
}

#[test]
fn test_null_guard_narrows_later_type_test() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let is_null = fx.graph.is_null(value);
    let dog = fx.instance_of("Dog", value);
    fx.graph.add_guard(is_null, false);
    let second = fx.graph.add_guard(dog, true);

    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    // Only null reaches the second guard, and null is not a Dog.
    assert_eq!(stats.contradictions, 1);
    assert_eq!(stats.removed_guards, 1);
    assert!(!fx.graph.guards().contains(&second));
    assert!(fx.graph.node(dog).is_dead());
}

#[test]
fn test_narrowing_can_be_disabled() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let is_null = fx.graph.is_null(value);
    let dog = fx.instance_of("Dog", value);
    fx.graph.add_guard(is_null, false);
    fx.graph.add_guard(dog, true);

    let config = SimplifierConfig::from_toml_str("narrow_after_guards = false").unwrap();
    let stats = PassPipeline::from_config(&config)
        .run(&mut fx.graph)
        .unwrap();

    assert_eq!(stats, SimplifyStats::default());
    assert_eq!(fx.graph.guards().len(), 2);
    assert!(fx.graph.is_live(dog));
}

#[test]
fn test_virtual_allocation_folds() {
    let mut fx = Fixture::new();
    let dog = fx.ty("Dog");
    // Built without stamp inference: the allocation looks like any object.
    let alloc = fx
        .graph
        .add_node(NodeKind::NewInstance(dog), ObjectStamp::any().into());
    let test = fx.instance_of("Pet", alloc);
    fx.graph.add_guard(test, false);

    let stats = PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    assert_eq!(stats.virtualization_folds, 1);
    assert_eq!(stats.removed_guards, 1);
    assert!(fx.graph.type_tests().is_empty());
    assert!(fx.graph.guards().is_empty());
}

#[test]
fn test_pipeline_reaches_fixpoint() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let dog = fx.instance_of("Dog", value);
    let pet = fx.instance_of("Pet", value);
    let bird = fx.instance_of("Bird", value);
    fx.graph.add_guard(dog, false);
    fx.graph.add_guard(pet, false);
    fx.graph.add_guard(bird, false);

    let pipeline = PassPipeline::default_pipeline();
    let first = pipeline.run(&mut fx.graph).unwrap();
    assert!(first.total() > 0);
    let snapshot = fx.graph.clone();

    let second = pipeline.run(&mut fx.graph).unwrap();
    assert_eq!(second, SimplifyStats::default());
    assert_eq!(fx.graph.guards(), snapshot.guards());
    assert_eq!(fx.graph.type_tests(), snapshot.type_tests());
}

#[test]
fn test_profiles_survive_simplification() {
    let mut fx = Fixture::new();
    let value = fx.any_param();
    let test = fx.instance_of("Dog", value);
    let anchor = fx.graph.anchor();
    let profile = TypeProfile::new(Vec::new(), 1.0, TriState::Unknown);
    fx.graph
        .set_type_test_profile(test, Some(profile.clone()), Some(anchor))
        .unwrap();
    fx.graph.add_guard(test, false);

    PassPipeline::default_pipeline().run(&mut fx.graph).unwrap();

    let node = fx.graph.type_test(test).unwrap();
    assert_eq!(node.profile(), Some(&profile));
    assert_eq!(node.anchor(), Some(anchor));
}
