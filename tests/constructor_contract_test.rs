//! # Constructor Contract Tests
//!
//! Invocation of every public constructor and the argument-to-property
//! mapping check, including types that cannot be synthesized.

mod common;

use common::*;
use contract_probe::reflect::{MethodSignature, ParameterInfo, TypeDescriptor, TypeHandle, Value};
use contract_probe::{ClassTester, ContractError, TypeFactory, ValueSynthesizer};

fn tester_for(ty: &TypeHandle) -> ClassTester {
    let mut synthesizer = seeded_synthesizer();
    let subject = synthesizer.synthesize(ty).unwrap();
    ClassTester::with_factory(subject, synthesizer, seeded_config()).unwrap()
}

// === MAPPING ===

#[test]
fn test_unmapped_parameter_is_reported_when_checking_mapping() {
    let mut errors = Vec::new();
    let passed = tester_for(&inventory_type()).test_constructors(true, Some(&mut errors)).unwrap();
    assert!(!passed);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("Inventory.Count"));
    assert!(errors[0].contains("'count'"));
}

#[test]
fn test_unmapped_parameter_is_ignored_without_mapping_check() {
    let mut errors = Vec::new();
    assert!(tester_for(&inventory_type()).test_constructors(false, Some(&mut errors)).unwrap());
    assert!(errors.is_empty());
}

#[test]
fn test_record_constructor_maps_every_parameter() {
    let mut errors = Vec::new();
    assert!(tester_for(&point_type()).test_constructors(true, Some(&mut errors)).unwrap());
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_ignored_signature_skips_the_broken_constructor() {
    let mut tester = tester_for(&inventory_type());
    tester.ignore_constructor(MethodSignature::new(vec![TypeHandle::string(), int()]));
    assert!(tester.test_constructors(true, None).unwrap());
}

#[test]
fn test_fail_fast_mapping_violation() {
    let err = tester_for(&inventory_type()).test_constructors(true, None).unwrap_err();
    assert!(matches!(err, ContractError::ConstructorMapping(_)));
}

// === UNSYNTHESIZABLE PARAMETERS ===

#[test]
fn test_interface_parameter_makes_the_owner_unconstructible() {
    let mut synthesizer = seeded_synthesizer();
    assert!(!synthesizer.can_synthesize(&canvas_interface()));
    assert!(!synthesizer.can_synthesize(&renderer_type()));
    assert!(matches!(
        synthesizer.synthesize(&renderer_type()),
        Err(ContractError::UnsynthesizableType { .. })
    ));
}

#[test]
fn test_interface_parameter_is_diagnosed_as_cannot_create() {
    // A hand-built subject stands in for the unconstructible type.
    let subject = Value::Object(contract_probe::ObjectRef::new(contract_probe::DynamicObject::new(renderer_type())));
    let mut tester = ClassTester::with_config(subject, seeded_config()).unwrap();
    let mut errors = Vec::new();
    assert!(!tester.test_constructors(true, Some(&mut errors)).unwrap());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Cannot create an instance of the type 'ICanvas'"));
}

#[test]
fn test_every_constructor_is_tried() {
    let ty = TypeDescriptor::class("Gadget")
        .record_constructor(vec![ParameterInfo::new("canvas", canvas_interface())])
        .record_constructor(vec![ParameterInfo::new("label", TypeHandle::string())])
        .read_only("Canvas", canvas_interface())
        .read_only("Label", TypeHandle::string())
        .build();
    let mut errors = Vec::new();
    let mut tester = tester_for(&ty);
    assert!(!tester.test_constructors(true, Some(&mut errors)).unwrap());
    assert_eq!(errors.len(), 1);

    tester.ignore_constructor(MethodSignature::new(vec![canvas_interface()]));
    assert!(tester.test_constructors(true, None).unwrap());
}

// === SELF-REFERENCE ===

#[test]
fn test_self_referential_type_terminates_unconstructible() {
    let mut synthesizer = seeded_synthesizer();
    assert!(!synthesizer.can_synthesize(&node_type()));
    assert!(synthesizer.synthesize(&node_type()).is_err());
}

#[test]
fn test_self_referential_type_with_alternative_constructor() {
    let mut synthesizer = seeded_synthesizer();
    assert!(synthesizer.can_synthesize(&chain_type()));
    let plan = synthesizer.plan_for(&chain_type()).unwrap();
    assert_eq!(plan.signature().to_string(), "(i32)");
    let chain = synthesizer.synthesize(&chain_type()).unwrap();
    assert_eq!(chain.type_handle().unwrap(), chain_type());
}

#[test]
fn test_mutually_recursive_types_resolve_in_either_order() {
    let mut left_first = seeded_synthesizer();
    assert!(left_first.can_synthesize(&left_type()));
    assert!(left_first.can_synthesize(&right_type()));

    let mut right_first = seeded_synthesizer();
    assert!(right_first.can_synthesize(&right_type()));
    assert!(right_first.can_synthesize(&left_type()));
    assert!(right_first.synthesize(&left_type()).is_ok());

    for ty in [left_type(), right_type()] {
        assert_eq!(signature(&mut left_first, &ty), signature(&mut right_first, &ty), "{}", ty);
    }
    assert!(left_first.synthesize(&left_type()).is_ok());
}

fn signature(synthesizer: &mut ValueSynthesizer, ty: &TypeHandle) -> String {
    synthesizer.plan_for(ty).map(|plan| plan.signature().to_string()).unwrap_or_default()
}

#[test]
fn test_plans_do_not_depend_on_query_order() {
    let mut ping_first = seeded_synthesizer();
    let ping = signature(&mut ping_first, &ping_type());
    let pong = signature(&mut ping_first, &pong_type());

    let mut pong_first = seeded_synthesizer();
    assert!(pong_first.can_synthesize(&pong_type()));
    assert_eq!(signature(&mut pong_first, &ping_type()), ping);
    assert_eq!(signature(&mut pong_first, &pong_type()), pong);

    // Each picks the first constructor that does not lead back to itself.
    assert_eq!(ping, "(i32)");
    assert_eq!(pong, "(String)");
    for synthesizer in [&mut ping_first, &mut pong_first] {
        assert!(synthesizer.synthesize(&ping_type()).is_ok());
        assert!(synthesizer.synthesize(&pong_type()).is_ok());
    }
}

#[test]
fn test_value_type_without_any_construction_path_is_unsynthesizable() {
    let mut synthesizer = seeded_synthesizer();
    assert!(!synthesizer.can_synthesize(&hollow_struct_type()));
    let err = synthesizer.synthesize(&hollow_struct_type()).unwrap_err();
    assert!(matches!(err, ContractError::UnsynthesizableType { .. }), "{}", err);

    assert_eq!(signature(&mut synthesizer, &measure_struct_type()), "(i32)");
    assert!(synthesizer.synthesize(&measure_struct_type()).is_ok());
}
