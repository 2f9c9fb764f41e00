//! Fabrication of fresh, nominally distinct types.
//!
//! Type-reference values need types that no subject already knows about. A
//! [`TypeGenerator`] produces them on demand; [`FreshTypeGenerator`] defines
//! empty classes with random identifiers whose default constructor yields a
//! [`DynamicObject`].

use std::collections::HashSet;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::reflect::{DynamicObject, ObjectRef, TypeDescriptor, TypeHandle, Value};

const NAMESPACE: &str = "generated";
const IDENTIFIER_TAIL: usize = 7;
const MAX_NAME_ATTEMPTS: usize = 16;
const TAIL_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeGenerationError {
    #[error("'{0}' is not a valid type identifier")]
    InvalidIdentifier(String),

    #[error("a type named '{0}' was already generated")]
    DuplicateName(String),

    #[error("no unused type name found after {0} attempts")]
    Exhausted(usize),
}

/// Source of fresh types for type-reference values.
pub trait TypeGenerator {
    fn generate_fresh_type(&mut self) -> Result<TypeHandle, TypeGenerationError>;
}

/// Defines empty classes named `generated::<identifier>`.
#[derive(Debug)]
pub struct FreshTypeGenerator {
    rng: ChaCha8Rng,
    defined: HashSet<String>,
}

impl FreshTypeGenerator {
    pub fn new() -> Self {
        Self { rng: ChaCha8Rng::from_entropy(), defined: HashSet::new() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), defined: HashSet::new() }
    }

    /// Number of types defined so far.
    pub fn defined_count(&self) -> usize {
        self.defined.len()
    }

    /// Defines an empty class named after `identifier`.
    pub fn define(&mut self, identifier: &str) -> Result<TypeHandle, TypeGenerationError> {
        if !is_identifier(identifier) {
            return Err(TypeGenerationError::InvalidIdentifier(identifier.to_string()));
        }
        let name = format!("{}::{}", NAMESPACE, identifier);
        if !self.defined.insert(name.clone()) {
            return Err(TypeGenerationError::DuplicateName(name));
        }
        debug!("Defined fresh type {}", name);
        Ok(TypeDescriptor::class(name)
            .default_constructor(|ty| Ok(Value::Object(ObjectRef::new(DynamicObject::new(ty.clone())))))
            .build())
    }

    fn random_identifier(&mut self) -> String {
        let mut identifier = String::with_capacity(IDENTIFIER_TAIL + 1);
        identifier.push(self.rng.gen_range(b'A'..=b'Z') as char);
        for _ in 0..IDENTIFIER_TAIL {
            let index = self.rng.gen_range(0..TAIL_ALPHABET.len());
            identifier.push(TAIL_ALPHABET[index] as char);
        }
        identifier
    }
}

impl Default for FreshTypeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGenerator for FreshTypeGenerator {
    fn generate_fresh_type(&mut self) -> Result<TypeHandle, TypeGenerationError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let identifier = self.random_identifier();
            match self.define(&identifier) {
                Err(TypeGenerationError::DuplicateName(name)) => {
                    debug!("Generated name {} collided, retrying", name);
                }
                result => return result,
            }
        }
        Err(TypeGenerationError::Exhausted(MAX_NAME_ATTEMPTS))
    }
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}
