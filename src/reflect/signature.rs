//! Constructor signatures, used to identify constructors to exclude.

use std::fmt;

use super::{ParameterInfo, TypeHandle};

/// Ordered parameter types of a construction path. Parameter names are not
/// part of the signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSignature {
    types: Vec<TypeHandle>,
}

impl MethodSignature {
    pub fn new(types: Vec<TypeHandle>) -> Self {
        Self { types }
    }

    /// The signature of a parameterless constructor.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: &[ParameterInfo]) -> Self {
        Self { types: parameters.iter().map(|p| p.ty.clone()).collect() }
    }

    pub fn types(&self) -> &[TypeHandle] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}
