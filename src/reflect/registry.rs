//! Named collections of types that can be swept as a unit.

use super::TypeHandle;

/// An ordered set of types, the unit an [`AssemblyTester`](crate::AssemblyTester) sweeps.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    name: String,
    types: Vec<TypeHandle>,
}

impl TypeRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), types: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `ty` unless a type with the same name is already registered.
    /// Returns whether it was added.
    pub fn register(&mut self, ty: TypeHandle) -> bool {
        if self.types.contains(&ty) {
            return false;
        }
        self.types.push(ty);
        true
    }

    pub fn with(mut self, ty: TypeHandle) -> Self {
        self.register(ty);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeHandle> {
        self.types.iter().find(|ty| ty.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeHandle> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::TypeDescriptor;

    #[test]
    fn test_register_is_nominal() {
        let mut registry = TypeRegistry::new("fixtures");
        assert!(registry.register(TypeDescriptor::class("Widget").build()));
        assert!(!registry.register(TypeDescriptor::class("Widget").build()));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Widget").is_some());
        assert!(registry.get("Gadget").is_none());
    }
}
