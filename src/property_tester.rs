//! Property contract: what is written can be read back, and notifying
//! subjects announce the member that changed.

use std::collections::HashSet;

use log::debug;

use crate::class_tester::require_object;
use crate::config::TesterConfig;
use crate::error_handler::{catch_panic, ErrorHandler};
use crate::errors::ContractError;
use crate::reflect::{ChangeWatcher, ObjectRef, PropertyInfo, Value};
use crate::synthesis::{TypeFactory, ValueSynthesizer};

/// Everything one property pass needs besides the factory.
pub(crate) struct PropertyRun<'a> {
    pub subject: &'a ObjectRef,
    pub ignored: &'a HashSet<String>,
    pub watcher: Option<&'a ChangeWatcher>,
    pub max_loops: usize,
}

/// Exercises every visible, non-indexed, non-ignored member of the subject.
pub(crate) fn check_properties<F: TypeFactory>(
    run: &PropertyRun<'_>,
    factory: &mut F,
    handler: &mut ErrorHandler<'_>,
) -> Result<(), ContractError> {
    for property in run.subject.type_handle().info().properties() {
        if property.is_indexed() || run.ignored.contains(&property.name) {
            debug!("Skipping property {}", property.name);
            continue;
        }
        check_property(run, &property, factory, handler)?;
    }
    Ok(())
}

fn check_property<F: TypeFactory>(
    run: &PropertyRun<'_>,
    property: &PropertyInfo,
    factory: &mut F,
    handler: &mut ErrorHandler<'_>,
) -> Result<(), ContractError> {
    let ty = run.subject.type_handle();
    debug!("Testing property {}.{}", ty, property.name);

    let mut written = None;
    if property.writable {
        if !factory.can_synthesize(&property.ty) {
            return handler.handle(ContractError::unsynthesizable(
                property.ty.name(),
                format!("required to test property '{}.{}'", ty, property.name),
            ));
        }
        let first = match factory.synthesize(&property.ty) {
            Ok(value) => value,
            Err(e) => return handler.handle(e),
        };
        let second = match run.watcher {
            Some(_) => distinct_value(run, property, &first, factory, handler)?,
            None => None,
        };

        if let Some(watcher) = run.watcher {
            watcher.reset();
        }
        if let Err(reason) = write(run.subject, &property.name, first.clone()) {
            return handler.handle(write_failed(run, property, &reason));
        }
        written = Some(first);
        if let Some(second) = second {
            if let Some(watcher) = run.watcher {
                watcher.reset();
            }
            if let Err(reason) = write(run.subject, &property.name, second.clone()) {
                return handler.handle(write_failed(run, property, &reason));
            }
            written = Some(second);
        }

        if let Some(watcher) = run.watcher {
            let notified = watcher.take();
            if notified.as_deref() != Some(property.name.as_str()) {
                let last = match notified {
                    Some(name) => format!("the last notification named '{}'", name),
                    None => "no notification was received".to_string(),
                };
                handler.handle(ContractError::PropertyContract(format!(
                    "The property '{}.{}' did not raise a property changed notification ({})",
                    ty, property.name, last
                )))?;
            }
        }
    }

    if property.readable {
        let read = match catch_panic(|| run.subject.get_property(&property.name)) {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => return handler.handle(read_failed(run, property, &e.to_string())),
            Err(panic) => return handler.handle(read_failed(run, property, &format!("panicked: {}", panic))),
        };
        if let Some(expected) = written {
            if !read.equals(&expected) {
                handler.handle(ContractError::PropertyContract(format!(
                    "The value of property '{}.{}' changed between setting and getting it (in: '{}', out: '{}')",
                    ty, property.name, expected, read
                )))?;
            }
        }
    }
    Ok(())
}

/// A value different from `first`, or `None` once the attempts run out.
fn distinct_value<F: TypeFactory>(
    run: &PropertyRun<'_>,
    property: &PropertyInfo,
    first: &Value,
    factory: &mut F,
    handler: &mut ErrorHandler<'_>,
) -> Result<Option<Value>, ContractError> {
    for _ in 0..run.max_loops {
        let candidate = match factory.synthesize(&property.ty) {
            Ok(value) => value,
            Err(e) => {
                handler.handle(e)?;
                return Ok(None);
            }
        };
        if !candidate.equals(first) {
            return Ok(Some(candidate));
        }
    }
    handler.handle(ContractError::PropertyContract(format!(
        "Unable to generate two distinct values of type '{}' for property '{}.{}' within {} attempts",
        property.ty,
        run.subject.type_handle(),
        property.name,
        run.max_loops
    )))?;
    Ok(None)
}

fn write(subject: &ObjectRef, name: &str, value: Value) -> Result<(), String> {
    match catch_panic(|| subject.set_property(name, value)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(format!("panicked: {}", panic)),
    }
}

fn write_failed(run: &PropertyRun<'_>, property: &PropertyInfo, reason: &str) -> ContractError {
    ContractError::PropertyContract(format!(
        "Setting property '{}.{}' failed: {}",
        run.subject.type_handle(),
        property.name,
        reason
    ))
}

fn read_failed(run: &PropertyRun<'_>, property: &PropertyInfo, reason: &str) -> ContractError {
    ContractError::PropertyContract(format!(
        "Getting property '{}.{}' failed: {}",
        run.subject.type_handle(),
        property.name,
        reason
    ))
}

/// Property checks alone, for callers that do not need constructor or
/// equality testing.
///
/// Passing no error list makes the first violation abort the run.
pub struct PropertyTester<F: TypeFactory = ValueSynthesizer> {
    subject: ObjectRef,
    factory: F,
    config: TesterConfig,
    ignored_properties: HashSet<String>,
    watcher: Option<ChangeWatcher>,
}

impl PropertyTester<ValueSynthesizer> {
    pub fn new(subject: Value) -> Result<Self, ContractError> {
        let config = TesterConfig::default();
        let factory = ValueSynthesizer::with_config(config.clone())?;
        Self::with_factory(subject, factory, config)
    }
}

impl<F: TypeFactory> PropertyTester<F> {
    pub fn with_factory(subject: Value, factory: F, config: TesterConfig) -> Result<Self, ContractError> {
        config.validate()?;
        let subject = require_object(subject)?;
        let watcher = ChangeWatcher::attach(&subject);
        Ok(Self { subject, factory, config, ignored_properties: HashSet::new(), watcher })
    }

    pub fn ignore_property(&mut self, name: impl Into<String>) -> &mut Self {
        self.ignored_properties.insert(name.into());
        self
    }

    pub fn test_properties(&mut self, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
        let mut handler = ErrorHandler::new(errors);
        let run = PropertyRun {
            subject: &self.subject,
            ignored: &self.ignored_properties,
            watcher: self.watcher.as_ref(),
            max_loops: self.config.max_loops_per_property,
        };
        check_properties(&run, &mut self.factory, &mut handler)?;
        Ok(handler.finish())
    }
}
