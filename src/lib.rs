//! # contract-probe
//!
//! Introspection-driven contract verification.
//!
//! Given a runtime type or a live object, the engine synthesizes plausible
//! values for the type's data, drives the object's public surface with them
//! and reports where the behavior breaks one of the structural contracts:
//!
//! - properties store what is written and announce changes when they notify,
//! - constructors store their arguments in the matching properties,
//! - `equals`, `==`, `!=` and the hash code agree with each other.
//!
//! Types are described through the [`reflect`] object model. Construction
//! decisions are memoized per engine by the [`ConstructionPlanner`], and
//! types that cannot be handled are diagnosed rather than aborting a run.

pub mod reflect;

pub mod assembly_tester;
pub mod class_tester;
pub mod config;
pub mod constructor_tester;
pub mod equality_tester;
pub mod error_handler;
pub mod errors;
pub mod planner;
pub mod property_tester;
pub mod synthesis;
pub mod type_generation;

// Re-export core types for easy access
pub use assembly_tester::AssemblyTester;
pub use class_tester::ClassTester;
pub use config::TesterConfig;
pub use equality_tester::{test_against_null, test_equal_objects, test_unequal_objects};
pub use error_handler::{catch_panic, safe_call, ErrorHandler};
pub use errors::ContractError;
pub use planner::{ConstructionPlan, ConstructionPlanner, PlannerStats};
pub use property_tester::PropertyTester;
pub use synthesis::{TypeFactory, ValueSynthesizer};
pub use type_generation::{FreshTypeGenerator, TypeGenerationError, TypeGenerator};
pub use reflect::{
    ChangeWatcher, DynamicObject, MethodSignature, ObjectRef, PrimitiveKind, PropertyChanged, Reflect,
    ReflectError, TypeDescriptor, TypeHandle, TypeKind, TypeRegistry, Value,
};
