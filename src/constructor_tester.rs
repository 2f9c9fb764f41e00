//! Constructor contract: every public constructor can be invoked with
//! synthesized arguments and, optionally, stores each argument in the
//! property named after its parameter.

use log::debug;

use crate::error_handler::{catch_panic, ErrorHandler};
use crate::errors::ContractError;
use crate::reflect::{ConstructorInfo, MethodSignature, ObjectRef, TypeHandle, Value};
use crate::synthesis::TypeFactory;

pub(crate) fn check_constructors<F: TypeFactory>(
    ty: &TypeHandle,
    ignored: &[MethodSignature],
    check_mapped: bool,
    factory: &mut F,
    handler: &mut ErrorHandler<'_>,
) -> Result<(), ContractError> {
    for constructor in ty.info().constructors() {
        let signature = constructor.signature();
        if ignored.contains(&signature) {
            debug!("Skipping ignored constructor {}{}", ty, signature);
            continue;
        }
        debug!("Testing constructor {}{}", ty, signature);

        let arguments = match synthesize_arguments(ty, &constructor, factory, handler)? {
            Some(arguments) => arguments,
            None => continue,
        };
        let instance = match catch_panic(|| constructor.invoke(ty, arguments.clone())) {
            Ok(Ok(instance)) => instance,
            Ok(Err(e)) => {
                handler.handle(failed(ty, &signature, e.to_string()))?;
                continue;
            }
            Err(panic) => {
                handler.handle(failed(ty, &signature, format!("panicked: {}", panic)))?;
                continue;
            }
        };

        if check_mapped {
            if let Some(object) = instance.as_object() {
                check_mapping(object, &constructor, &arguments, handler)?;
            }
        }
    }
    Ok(())
}

/// `None` when some parameter could not be synthesized; that has already
/// been diagnosed.
fn synthesize_arguments<F: TypeFactory>(
    ty: &TypeHandle,
    constructor: &ConstructorInfo,
    factory: &mut F,
    handler: &mut ErrorHandler<'_>,
) -> Result<Option<Vec<Value>>, ContractError> {
    let mut arguments = Vec::with_capacity(constructor.parameters().len());
    for parameter in constructor.parameters() {
        if !factory.can_synthesize(&parameter.ty) {
            handler.handle(ContractError::unsynthesizable(
                parameter.ty.name(),
                format!("required by parameter '{}' of constructor {}{}", parameter.name, ty, constructor.signature()),
            ))?;
            return Ok(None);
        }
        match factory.synthesize(&parameter.ty) {
            Ok(value) => arguments.push(value),
            Err(e) => {
                handler.handle(e)?;
                return Ok(None);
            }
        }
    }
    Ok(Some(arguments))
}

fn check_mapping(
    object: &ObjectRef,
    constructor: &ConstructorInfo,
    arguments: &[Value],
    handler: &mut ErrorHandler<'_>,
) -> Result<(), ContractError> {
    let ty = object.type_handle();
    let properties = ty.info().properties();
    for (parameter, argument) in constructor.parameters().iter().zip(arguments) {
        let property = properties
            .iter()
            .find(|p| p.readable && !p.is_indexed() && p.name.eq_ignore_ascii_case(&parameter.name));
        let property = match property {
            Some(property) => property,
            None => continue,
        };
        match catch_panic(|| object.get_property(&property.name)) {
            Ok(Ok(stored)) if stored.equals(argument) => {}
            Ok(Ok(stored)) => handler.handle(ContractError::ConstructorMapping(format!(
                "The value of property '{}.{}' does not match constructor parameter '{}' (in: '{}', out: '{}')",
                ty, property.name, parameter.name, argument, stored
            )))?,
            Ok(Err(e)) => handler.handle(ContractError::ConstructorMapping(format!(
                "Property '{}.{}' mapped from constructor parameter '{}' could not be read: {}",
                ty, property.name, parameter.name, e
            )))?,
            Err(panic) => handler.handle(ContractError::ConstructorMapping(format!(
                "Property '{}.{}' mapped from constructor parameter '{}' panicked when read: {}",
                ty, property.name, parameter.name, panic
            )))?,
        }
    }
    Ok(())
}

fn failed(ty: &TypeHandle, signature: &MethodSignature, reason: String) -> ContractError {
    ContractError::ConstructorFailed { type_name: ty.name().to_string(), signature: signature.to_string(), reason }
}
