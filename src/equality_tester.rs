//! Equality contract: `equals`, the strongly typed equals, `==`, `!=` and the
//! hash code must agree with each other.
//!
//! Each probe runs under [`safe_call`], so a probe that panics counts as
//! having returned `false`.

use crate::error_handler::{safe_call, ErrorHandler};
use crate::errors::ContractError;
use crate::reflect::{DynamicObject, ObjectRef, TypeHandle, Value};

/// Checks that `a` and `b`, which are expected to be equal, are equal under
/// every equality surface of their type and hash alike.
pub fn test_equal_objects(a: &Value, b: &Value, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
    let mut handler = ErrorHandler::new(errors);
    check_equal(a, b, &mut handler)?;
    Ok(handler.finish())
}

/// Checks that `a` and `b`, which are expected to differ, are unequal under
/// every equality surface, and that `a` is unequal to an unrelated object.
pub fn test_unequal_objects(a: &Value, b: &Value, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
    let mut handler = ErrorHandler::new(errors);
    check_unequal(a, b, &mut handler)?;
    Ok(handler.finish())
}

/// Checks that an instance of a reference type never equals null. Value
/// types pass trivially.
pub fn test_against_null(a: &Value, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
    let mut handler = ErrorHandler::new(errors);
    check_against_null(a, &mut handler)?;
    Ok(handler.finish())
}

fn instance_type(value: &Value, operation: &str) -> Result<TypeHandle, ContractError> {
    value.type_handle().ok_or_else(|| ContractError::ArgumentNull { context: operation.to_string() })
}

fn violation(handler: &mut ErrorHandler<'_>, message: String) -> Result<(), ContractError> {
    handler.handle(ContractError::EqualityContract(message))
}

fn check_operator_presence(ty: &TypeHandle, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
    let info = ty.info();
    let has_eq = info.equality_operator().is_some();
    let has_ne = info.inequality_operator().is_some();
    if !has_eq && (has_ne || info.overrides_equals()) {
        violation(handler, format!("The type '{}' does not implement the == operator", ty))?;
    }
    if !has_ne && (has_eq || info.overrides_equals()) {
        violation(handler, format!("The type '{}' does not implement the != operator", ty))?;
    }
    Ok(())
}

pub(crate) fn check_equal(a: &Value, b: &Value, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
    let ty = instance_type(a, "test_equal_objects")?;
    instance_type(b, "test_equal_objects")?;
    let info = ty.info();

    if !safe_call(|| a.hash_code() == b.hash_code()) {
        violation(handler, format!("The hash codes of two equal instances of '{}' differ", ty))?;
    }
    if !safe_call(|| a.equals(b)) {
        violation(handler, format!("Equals returned false for two equal instances of '{}'", ty))?;
    }
    if let Some(equals) = info.strongly_typed_equals() {
        if !safe_call(|| equals(a, b)) {
            violation(handler, format!("The strongly typed Equals returned false for two equal instances of '{}'", ty))?;
        }
    }
    if let Some(eq) = info.equality_operator() {
        if !safe_call(|| eq(a, b)) {
            violation(handler, format!("The == operator returned false for two equal instances of '{}'", ty))?;
        }
    }
    if let Some(ne) = info.inequality_operator() {
        if safe_call(|| ne(a, b)) {
            violation(handler, format!("The != operator returned true for two equal instances of '{}'", ty))?;
        }
    }
    check_operator_presence(&ty, handler)
}

pub(crate) fn check_unequal(a: &Value, b: &Value, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
    let ty = instance_type(a, "test_unequal_objects")?;
    instance_type(b, "test_unequal_objects")?;
    let info = ty.info();

    let unrelated = Value::Object(ObjectRef::new(DynamicObject::new(TypeHandle::object())));
    if safe_call(|| a.equals(&unrelated)) {
        violation(handler, format!("Equals returned true when comparing '{}' with an instance of an unrelated type", ty))?;
    }
    if safe_call(|| a.equals(b)) {
        violation(handler, format!("Equals returned true for two unequal instances of '{}'", ty))?;
    }
    if let Some(equals) = info.strongly_typed_equals() {
        if safe_call(|| equals(a, b)) {
            violation(handler, format!("The strongly typed Equals returned true for two unequal instances of '{}'", ty))?;
        }
    }
    if let Some(eq) = info.equality_operator() {
        if safe_call(|| eq(a, b)) {
            violation(handler, format!("The == operator returned true for two unequal instances of '{}'", ty))?;
        }
    }
    if let Some(ne) = info.inequality_operator() {
        if !safe_call(|| ne(a, b)) {
            violation(handler, format!("The != operator returned false for two unequal instances of '{}'", ty))?;
        }
    }
    check_operator_presence(&ty, handler)
}

pub(crate) fn check_against_null(a: &Value, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
    let ty = instance_type(a, "test_against_null")?;
    if !ty.kind().is_reference_type() {
        return Ok(());
    }
    let info = ty.info();
    let null = Value::Null;

    if safe_call(|| a.equals(&null)) {
        violation(handler, format!("Equals returned true when comparing an instance of '{}' with null", ty))?;
    }
    if let Some(equals) = info.strongly_typed_equals() {
        if safe_call(|| equals(a, &null)) {
            violation(handler, format!("The strongly typed Equals returned true when comparing an instance of '{}' with null", ty))?;
        }
    }
    if let Some(eq) = info.equality_operator() {
        if safe_call(|| eq(a, &null)) {
            violation(handler, format!("The == operator returned true when comparing an instance of '{}' with null", ty))?;
        }
    }
    if let Some(ne) = info.inequality_operator() {
        if !safe_call(|| ne(a, &null)) {
            violation(handler, format!("The != operator returned false when comparing an instance of '{}' with null", ty))?;
        }
    }
    check_operator_presence(&ty, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{PrimitiveKind, TypeDescriptor};

    fn money_type() -> TypeHandle {
        TypeDescriptor::class("Money")
            .read_write("Amount", TypeHandle::primitive(PrimitiveKind::I64))
            .with_structural_equality()
            .build()
    }

    fn money(amount: i64) -> Value {
        let mut object = DynamicObject::new(money_type());
        object.set_field("Amount", Value::I64(amount)).unwrap();
        Value::Object(ObjectRef::new(object))
    }

    #[test]
    fn test_structural_equality_is_consistent() {
        let mut errors = Vec::new();
        assert!(test_equal_objects(&money(5), &money(5), Some(&mut errors)).unwrap());
        assert!(test_unequal_objects(&money(5), &money(6), Some(&mut errors)).unwrap());
        assert!(test_against_null(&money(5), Some(&mut errors)).unwrap());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_missing_operators_are_reported() {
        let ty = TypeDescriptor::class("Bare").overrides_equals().build();
        let a = Value::Object(ObjectRef::new(DynamicObject::new(ty.clone())));
        let b = Value::Object(ObjectRef::new(DynamicObject::new(ty)));
        let mut errors = Vec::new();
        assert!(!test_equal_objects(&a, &b, Some(&mut errors)).unwrap());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("=="));
        assert!(errors[1].contains("!="));
    }

    #[test]
    fn test_missing_operators_are_reported_against_null() {
        let ty = TypeDescriptor::class("Bare").overrides_equals().build();
        let a = Value::Object(ObjectRef::new(DynamicObject::new(ty)));
        let mut errors = Vec::new();
        assert!(!test_against_null(&a, Some(&mut errors)).unwrap());
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert!(errors[0].contains("does not implement the == operator"));
        assert!(errors[1].contains("does not implement the != operator"));
    }

    #[test]
    fn test_equality_operator_without_inequality_is_reported() {
        let ty = TypeDescriptor::class("HalfOps").equality_operator(|a, b| a.equals(b)).build();
        let a = Value::Object(ObjectRef::new(DynamicObject::new(ty)));
        let same = a.clone();
        let mut errors = Vec::new();
        assert!(!test_equal_objects(&a, &same, Some(&mut errors)).unwrap());
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].contains("does not implement the != operator"));
    }

    #[test]
    fn test_panicking_operator_counts_as_false() {
        let ty = TypeDescriptor::class("Touchy")
            .with_structural_equality()
            .equality_operator(|_, _| panic!("operator exploded"))
            .build();
        let a = Value::Object(ObjectRef::new(DynamicObject::new(ty.clone())));
        let b = Value::Object(ObjectRef::new(DynamicObject::new(ty)));
        let mut errors = Vec::new();
        assert!(!test_equal_objects(&a, &b, Some(&mut errors)).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("The == operator returned false"));
    }

    #[test]
    fn test_null_instance_is_always_an_error() {
        let mut errors = Vec::new();
        let err = test_equal_objects(&Value::Null, &money(1), Some(&mut errors)).unwrap_err();
        assert!(matches!(err, ContractError::ArgumentNull { .. }));
        assert!(errors.is_empty());
        assert!(test_against_null(&Value::Null, None).is_err());
    }

    #[test]
    fn test_value_types_skip_the_null_checks() {
        assert!(test_against_null(&Value::I32(3), None).unwrap());
    }

    #[test]
    fn test_fail_fast_returns_the_first_violation() {
        let err = test_unequal_objects(&money(1), &money(1), None).unwrap_err();
        assert!(matches!(err, ContractError::EqualityContract(_)));
    }
}
