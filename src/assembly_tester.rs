//! Sweeps every class and struct of a [`TypeRegistry`].

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::class_tester::ClassTester;
use crate::config::TesterConfig;
use crate::error_handler::ErrorHandler;
use crate::errors::ContractError;
use crate::reflect::{MethodSignature, TypeHandle, TypeKind, TypeRegistry};
use crate::synthesis::{TypeFactory, ValueSynthesizer};

/// Runs the constructor, property and equality contracts over a registry,
/// sharing one factory across all types.
///
/// For each constructible type a subject is synthesized and handed to a
/// [`ClassTester`]. Equality is only tested for types that override equals.
pub struct AssemblyTester<F: TypeFactory = ValueSynthesizer> {
    registry: TypeRegistry,
    factory: F,
    config: TesterConfig,
    excluded_classes: HashSet<String>,
    excluded_constructors: HashMap<String, Vec<MethodSignature>>,
    excluded_properties: HashMap<String, HashSet<String>>,
    unmapped_classes: HashSet<String>,
    equality_excluded: HashSet<String>,
    skip_constructor_tests: bool,
    skip_property_tests: bool,
    skip_equality_tests: bool,
}

impl AssemblyTester<ValueSynthesizer> {
    pub fn new(registry: TypeRegistry) -> Result<Self, ContractError> {
        Self::with_config(registry, TesterConfig::default())
    }

    pub fn with_config(registry: TypeRegistry, config: TesterConfig) -> Result<Self, ContractError> {
        let factory = ValueSynthesizer::with_config(config.clone())?;
        Self::with_factory(registry, factory, config)
    }
}

impl<F: TypeFactory> AssemblyTester<F> {
    pub fn with_factory(registry: TypeRegistry, factory: F, config: TesterConfig) -> Result<Self, ContractError> {
        config.validate()?;
        Ok(Self {
            registry,
            factory,
            config,
            excluded_classes: HashSet::new(),
            excluded_constructors: HashMap::new(),
            excluded_properties: HashMap::new(),
            unmapped_classes: HashSet::new(),
            equality_excluded: HashSet::new(),
            skip_constructor_tests: false,
            skip_property_tests: false,
            skip_equality_tests: false,
        })
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Leaves `class` out of the sweep entirely.
    pub fn exclude_class(&mut self, class: &TypeHandle) -> &mut Self {
        self.excluded_classes.insert(class.name().to_string());
        self
    }

    pub fn exclude_constructor(&mut self, class: &TypeHandle, signature: MethodSignature) -> &mut Self {
        let signatures = self.excluded_constructors.entry(class.name().to_string()).or_default();
        if !signatures.contains(&signature) {
            signatures.push(signature);
        }
        self
    }

    pub fn exclude_constructor_tests(&mut self) -> &mut Self {
        self.skip_constructor_tests = true;
        self
    }

    /// Tests `class`'s constructors without the argument-to-property check.
    pub fn exclude_mapped_properties(&mut self, class: &TypeHandle) -> &mut Self {
        self.unmapped_classes.insert(class.name().to_string());
        self
    }

    /// `None` turns equality testing off for every type.
    pub fn exclude_equality_tests(&mut self, class: Option<&TypeHandle>) -> &mut Self {
        match class {
            Some(class) => {
                self.equality_excluded.insert(class.name().to_string());
            }
            None => self.skip_equality_tests = true,
        }
        self
    }

    pub fn exclude_property(&mut self, class: &TypeHandle, name: impl Into<String>) -> &mut Self {
        self.excluded_properties
            .entry(class.name().to_string())
            .or_default()
            .insert(name.into());
        self
    }

    pub fn exclude_property_tests(&mut self) -> &mut Self {
        self.skip_property_tests = true;
        self
    }

    pub fn test_assembly(&mut self, errors: Option<&mut Vec<String>>) -> Result<bool, ContractError> {
        let mut handler = ErrorHandler::new(errors);
        debug!("Sweeping {} types of {}", self.registry.len(), self.registry.name());
        let types: Vec<TypeHandle> = self.registry.iter().cloned().collect();
        for ty in types {
            if !matches!(ty.kind(), TypeKind::Class | TypeKind::Struct) || ty.info().is_generic_definition() {
                continue;
            }
            if self.excluded_classes.contains(ty.name()) {
                debug!("Skipping excluded type {}", ty);
                continue;
            }
            self.test_type(&ty, &mut handler)?;
        }
        Ok(handler.finish())
    }

    fn test_type(&mut self, ty: &TypeHandle, handler: &mut ErrorHandler<'_>) -> Result<(), ContractError> {
        let subject = match self.factory.synthesize(ty) {
            Ok(subject) => subject,
            Err(e) => return handler.handle(e),
        };
        if subject.as_object().is_none() {
            debug!("Skipping {}, its instances are not objects", ty);
            return Ok(());
        }

        let mut tester = ClassTester::with_factory(subject, &mut self.factory, self.config.clone())?;
        if let Some(signatures) = self.excluded_constructors.get(ty.name()) {
            for signature in signatures {
                tester.ignore_constructor(signature.clone());
            }
        }
        if let Some(names) = self.excluded_properties.get(ty.name()) {
            for name in names {
                tester.ignore_property(name.clone());
            }
        }

        if !self.skip_constructor_tests {
            let check_mapped = !self.unmapped_classes.contains(ty.name());
            tester.run_constructors(check_mapped, handler)?;
        }
        if !self.skip_property_tests {
            tester.run_properties(handler)?;
        }
        if !self.skip_equality_tests && !self.equality_excluded.contains(ty.name()) && ty.info().overrides_equals() {
            tester.run_equality(handler)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{DynamicObject, ObjectRef, ParameterInfo, PrimitiveKind, TypeDescriptor, Value};

    fn registry() -> TypeRegistry {
        let tag = TypeDescriptor::class("Tag")
            .record_constructor(vec![ParameterInfo::new("label", TypeHandle::string())])
            .read_only("Label", TypeHandle::string())
            .build();
        let counter = TypeDescriptor::class("Counter")
            .default_constructor(|ty| Ok(Value::Object(ObjectRef::new(DynamicObject::new(ty.clone())))))
            .read_write("Count", TypeHandle::primitive(PrimitiveKind::I32))
            .build();
        TypeRegistry::new("fixtures")
            .with(tag)
            .with(counter)
            .with(TypeDescriptor::interface("IThing").build())
    }

    fn seeded(registry: TypeRegistry) -> AssemblyTester {
        AssemblyTester::with_config(registry, TesterConfig::default().with_seed(2)).unwrap()
    }

    #[test]
    fn test_clean_registry() {
        let mut errors = Vec::new();
        assert!(seeded(registry()).test_assembly(Some(&mut errors)).unwrap());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_unconstructible_type_is_diagnosed() {
        let needy = TypeDescriptor::class("Needy")
            .constructor(vec![ParameterInfo::new("thing", TypeDescriptor::interface("IThing").build())], |_, _| Ok(Value::Null))
            .build();
        let mut errors = Vec::new();
        let mut tester = seeded(registry().with(needy.clone()));
        assert!(!tester.test_assembly(Some(&mut errors)).unwrap());
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        let mut tester = seeded(registry().with(needy.clone()));
        tester.exclude_class(&needy);
        assert!(tester.test_assembly(Some(&mut errors)).unwrap());
    }
}
