//! Exhaustive soundness checks over the fixture hierarchy.
//!
//! Every definite answer of the engine is compared against the outcome of
//! the test on each concrete runtime value the stamps admit.

mod common;

use typetest_opt::{find_synonym, try_fold, Graph, Synonym, TypeTestNode};
use typetest_opt_lattice::testing::{concrete_values, zoo};
use typetest_opt_lattice::{ObjectStamp, Stamp, TriState, TypeHierarchy, TypeRef};

/// Every stamp expressible over `hierarchy`, each also with every
/// speculation it can carry.
fn all_stamps(hierarchy: &TypeHierarchy) -> Vec<ObjectStamp> {
    let mut plain = vec![
        ObjectStamp::any(),
        ObjectStamp::any_non_null(),
        ObjectStamp::null(),
        ObjectStamp::empty(),
    ];
    for ty in hierarchy.types() {
        plain.push(ObjectStamp::object(ty));
        plain.push(ObjectStamp::object_non_null(ty));
        plain.push(ObjectStamp::exact(ty));
        plain.push(ObjectStamp::exact_non_null(ty));
    }

    let mut stamps = Vec::new();
    for stamp in plain {
        for class in concrete_values(hierarchy).into_iter().flatten() {
            let speculative = stamp.clone().with_speculation(&class);
            if speculative.speculated().is_some() && !stamps.contains(&speculative) {
                stamps.push(speculative);
            }
        }
        if !stamps.contains(&stamp) {
            stamps.push(stamp);
        }
    }
    stamps
}

fn passes(checked: &ObjectStamp, value: &Option<TypeRef>) -> bool {
    checked.contains_value(value.as_ref())
}

#[test]
fn test_join_and_meet_are_sound() {
    let h = zoo();
    let stamps = all_stamps(&h);
    let values = concrete_values(&h);
    assert!(stamps.iter().any(|stamp| stamp.speculated().is_some()));

    for a in &stamps {
        for b in &stamps {
            let joined = a.join(b);
            let met = a.meet(b);
            for value in &values {
                let (in_a, in_b) = (passes(a, value), passes(b, value));
                if in_a && in_b {
                    assert!(
                        passes(&joined, value),
                        "{} join {} = {} lost {:?}",
                        a,
                        b,
                        joined,
                        value
                    );
                }
                if in_a || in_b {
                    assert!(
                        passes(&met, value),
                        "{} meet {} = {} lost {:?}",
                        a,
                        b,
                        met,
                        value
                    );
                }
            }
            for result in [&joined, &met] {
                if let Some(speculated) = result.speculated() {
                    assert!(
                        result.contains_value(Some(speculated)),
                        "{} with {} speculates on an impossible {}",
                        a,
                        b,
                        speculated
                    );
                }
            }
            if a.speculated() != b.speculated() {
                assert_eq!(met.speculated(), None, "{} meet {} kept a speculation", a, b);
            }
        }
    }
}

#[test]
fn test_find_synonym_is_sound() {
    common::init_tracing();
    let h = zoo();
    let stamps = all_stamps(&h);
    let values = concrete_values(&h);

    for checked in &stamps {
        for input in &stamps {
            let synonym = find_synonym(checked, input)
                .unwrap_or_else(|err| panic!("{} vs {}: {}", checked, input, err));
            let Some(synonym) = synonym else { continue };
            for value in values.iter().filter(|v| input.contains_value(v.as_ref())) {
                let actual = passes(checked, value);
                let predicted = match synonym {
                    Synonym::Contradiction => false,
                    Synonym::Tautology => true,
                    Synonym::IsNull => value.is_none(),
                    Synonym::IsNotNull => value.is_some(),
                };
                assert_eq!(
                    actual, predicted,
                    "{} vs {} gave {} but value {:?} disagrees",
                    checked, input, synonym, value
                );
            }
        }
    }
}

#[test]
fn test_try_fold_is_sound() {
    let h = zoo();
    let stamps = all_stamps(&h);
    let values = concrete_values(&h);

    for checked in &stamps {
        for input in &stamps {
            let Some(verdict) = try_fold(checked, &Stamp::from(input.clone())).to_bool() else {
                continue;
            };
            for value in values.iter().filter(|v| input.contains_value(v.as_ref())) {
                assert_eq!(
                    passes(checked, value),
                    verdict,
                    "{} folded to {} for {} but value {:?} disagrees",
                    checked,
                    verdict,
                    input,
                    value
                );
            }
        }
    }
}

#[test]
fn test_implies_is_sound() {
    let h = zoo();
    let values = concrete_values(&h);
    let mut graph = Graph::new();
    let operand = graph.parameter(0, ObjectStamp::any().into());

    // Only checked stamps that survive as real type tests.
    let mut tests = Vec::new();
    for checked in all_stamps(&h) {
        let id = TypeTestNode::create_with_stamp(&mut graph, checked, operand, None, None).unwrap();
        if graph.type_test(id).is_ok() {
            tests.push(id);
        }
    }
    assert!(tests.len() > 10, "only {} type tests survived", tests.len());

    for &this in &tests {
        for &other in &tests {
            let this_test = graph.type_test(this).unwrap();
            let other_test = graph.type_test(other).unwrap();
            for this_negated in [false, true] {
                let Some(other_value) = this_test.implies(this_negated, other_test).to_bool()
                else {
                    continue;
                };
                for value in &values {
                    let this_outcome = passes(this_test.checked_stamp(), value);
                    if this_outcome == this_negated {
                        continue;
                    }
                    assert_eq!(
                        passes(other_test.checked_stamp(), value),
                        other_value,
                        "{} (negated: {}) implies {} = {} but value {:?} disagrees",
                        this_test.checked_stamp(),
                        this_negated,
                        other_test.checked_stamp(),
                        other_value,
                        value
                    );
                }
            }
        }
    }
}

#[test]
fn test_graph_implication_agrees_with_node_implication() {
    let h = zoo();
    let mut graph = Graph::new();
    let operand = graph.parameter(0, ObjectStamp::any().into());
    let animal = TypeTestNode::create(&mut graph, h.get("Animal").unwrap(), operand).unwrap();
    let dog = TypeTestNode::create(&mut graph, h.get("Dog").unwrap(), operand).unwrap();

    assert_eq!(graph.implies(dog, false, animal), TriState::True);
    assert_eq!(graph.implies(animal, true, dog), TriState::False);
    assert_eq!(graph.implies(animal, false, dog), TriState::Unknown);
}
