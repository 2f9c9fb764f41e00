//! The engine bound to one subject.
//!
//! A [`ClassTester`] owns the factory, the configuration, the ignore sets and
//! the change watcher for one live object, and runs the property,
//! constructor and equality contracts against it.
//!
//! ## Error collection
//!
//! Every contract operation takes `errors: Option<&mut Vec<String>>`. With a
//! list, violations are appended and the operation reports whether it added
//! none. Without one, the first violation is returned as an `Err`.
//!
//! ```ignore
//! let mut tester = ClassTester::new(subject)?;
//! tester.ignore_property("Cache");
//! let mut errors = Vec::new();
//! tester.test_properties(Some(&mut errors))?;
//! tester.test_constructors(true, Some(&mut errors))?;
//! ```

use std::collections::HashSet;

use log::debug;

use crate::config::TesterConfig;
use crate::constructor_tester::check_constructors;
use crate::equality_tester::{check_against_null, check_equal, check_unequal};
use crate::error_handler::ErrorHandler;
use crate::errors::ContractError;
use crate::property_tester::{check_properties, PropertyRun};
use crate::reflect::{ChangeWatcher, MethodSignature, ObjectRef, TypeHandle, Value};
use crate::synthesis::{TypeFactory, ValueSynthesizer};

/// The live object behind `subject`; null and plain data are rejected.
pub(crate) fn require_object(subject: Value) -> Result<ObjectRef, ContractError> {
    match subject {
        Value::Object(object) => Ok(object),
        Value::Null => Err(ContractError::ArgumentNull { context: "subject".to_string() }),
        other => Err(ContractError::InvalidSubject(format!(
            "expected an object, got the value '{}'",
            other
        ))),
    }
}

pub struct ClassTester<F: TypeFactory = ValueSynthesizer> {
    subject: ObjectRef,
    factory: F,
    config: TesterConfig,
    ignored_properties: HashSet<String>,
    ignored_constructors: Vec<MethodSignature>,
    watcher: Option<ChangeWatcher>,
}

impl ClassTester<ValueSynthesizer> {
    pub fn new(subject: Value) -> Result<Self, ContractError> {
        Self::with_config(subject, TesterConfig::default())
    }

    pub fn with_config(subject: Value, config: TesterConfig) -> Result<Self, ContractError> {
        let factory = ValueSynthesizer::with_config(config.clone())?;
        Self::with_factory(subject, factory, config)
    }
}

impl<F: TypeFactory> ClassTester<F> {
    /// Binds `subject` to an existing factory. Subscribes to the subject's
    /// change notifications when it has any.
    pub fn with_factory(subject: Value, factory: F, config: TesterConfig) -> Result<Self, ContractError> {
        config.validate()?;
        let subject = require_object(subject)?;
        let watcher = ChangeWatcher::attach(&subject);
        Ok(Self {
            subject,
            factory,
            config,
            ignored_properties: HashSet::new(),
            ignored_constructors: Vec::new(),
            watcher,
        })
    }

    pub fn subject(&self) -> &ObjectRef {
        &self.subject
    }

    pub fn subject_type(&self) -> &TypeHandle {
        self.subject.type_handle()
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn ignore_property(&mut self, name: impl Into<String>) -> &mut Self {
        self.ignored_properties.insert(name.into());
        self
    }

    pub fn ignore_constructor(&mut self, signature: MethodSignature) -> &mut Self {
        if !self.ignored_constructors.contains(&signature) {
            self.ignored_constructors.push(signature);
        }
        self
    }

    pub fn ignored_properties(&self) -> &HashSet<String> {
        &self.ignored_properties
    }

    pub fn ignored_constructors(&self) -> &[MethodSignature] {
        &self.ignored_constructors
    }

    pub fn test_properties(&mut self, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
        let mut handler = ErrorHandler::new(errors);
        self.run_properties(&mut handler)?;
        Ok(handler.finish())
    }

    /// Invokes every non-ignored constructor; with `check_mapped`, also
    /// checks that arguments land in the properties named after their
    /// parameters.
    pub fn test_constructors(&mut self, check_mapped: bool, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
        let mut handler = ErrorHandler::new(errors);
        self.run_constructors(check_mapped, &mut handler)?;
        Ok(handler.finish())
    }

    /// Builds two equal instances of the subject's type and checks them
    /// against each other, against the subject and against null.
    pub fn test_equality(&mut self, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
        let mut handler = ErrorHandler::new(errors);
        self.run_equality(&mut handler)?;
        Ok(handler.finish())
    }

    pub(crate) fn run_properties(&mut self, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
        debug!("Testing properties of {}", self.subject.type_handle());
        let run = PropertyRun {
            subject: &self.subject,
            ignored: &self.ignored_properties,
            watcher: self.watcher.as_ref(),
            max_loops: self.config.max_loops_per_property,
        };
        check_properties(&run, &mut self.factory, handler)
    }

    pub(crate) fn run_constructors(&mut self, check_mapped: bool, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
        debug!("Testing constructors of {}", self.subject.type_handle());
        let ty = self.subject.type_handle().clone();
        check_constructors(&ty, &self.ignored_constructors, check_mapped, &mut self.factory, handler)
    }

    pub(crate) fn run_equality(&mut self, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
        let ty = self.subject.type_handle().clone();
        debug!("Testing equality of {}", ty);
        let subject = Value::Object(self.subject.clone());
        match self.factory.create_dual_instances(&ty) {
            Ok((first, second)) => {
                check_equal(&first, &second, handler)?;
                check_unequal(&first, &subject, handler)?;
            }
            Err(e) => handler.handle(ContractError::EqualityContract(format!(
                "Unable to create instances of '{}' for equality testing: {}",
                ty, e
            )))?,
        }
        check_against_null(&subject, handler)
    }
}
