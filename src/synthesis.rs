//! Value synthesis.
//!
//! [`ValueSynthesizer`] produces a plausible value for any type it can plan
//! for. Optional wrappers are stripped first; the remaining type is then
//! handled by the first matching rule:
//!
//! 1. arrays get a random length below `max_array_length` and synthesized
//!    elements,
//! 2. enumerations pick one of their members uniformly,
//! 3. uuids, durations and type references get fresh random values, type
//!    references being drawn from a pool of generated types,
//! 4. primitives are drawn over their full representable range (floats stay
//!    finite),
//! 5. everything else is built through the [`ConstructionPlanner`], each
//!    constructor argument being synthesized recursively.
//!
//! Recursion is bounded by `max_synthesis_depth`.

use std::fmt;
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::TesterConfig;
use crate::error_handler::catch_panic;
use crate::errors::ContractError;
use crate::planner::{ConstructionPlan, ConstructionPlanner, PlannerStats};
use crate::reflect::{EnumValue, PrimitiveKind, TypeHandle, TypeKind, Value};
use crate::type_generation::{FreshTypeGenerator, TypeGenerator};

/// Source of values and instances for the contract testers.
pub trait TypeFactory {
    /// Whether [`TypeFactory::synthesize`] can produce a value of `ty`.
    fn can_synthesize(&mut self, ty: &TypeHandle) -> bool;

    /// A fresh value of `ty`; `UnsynthesizableType` when there is none.
    fn synthesize(&mut self, ty: &TypeHandle) -> Result<Value, ContractError>;

    /// Two distinct instances built from identical constructor arguments and
    /// identical values for every writable property.
    fn create_dual_instances(&mut self, ty: &TypeHandle) -> Result<(Value, Value), ContractError>;
}

impl<T: TypeFactory + ?Sized> TypeFactory for &mut T {
    fn can_synthesize(&mut self, ty: &TypeHandle) -> bool {
        (**self).can_synthesize(ty)
    }

    fn synthesize(&mut self, ty: &TypeHandle) -> Result<Value, ContractError> {
        (**self).synthesize(ty)
    }

    fn create_dual_instances(&mut self, ty: &TypeHandle) -> Result<(Value, Value), ContractError> {
        (**self).create_dual_instances(ty)
    }
}

/// The stock [`TypeFactory`].
pub struct ValueSynthesizer {
    planner: ConstructionPlanner,
    rng: ChaCha8Rng,
    type_generator: Box<dyn TypeGenerator>,
    generated_types: Vec<TypeHandle>,
    config: TesterConfig,
    depth: usize,
}

impl ValueSynthesizer {
    pub fn new() -> Self {
        Self::from_valid_config(TesterConfig::default())
    }

    pub fn with_config(config: TesterConfig) -> Result<Self, ContractError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TesterConfig) -> Self {
        let (rng, type_generator) = match config.seed {
            Some(seed) => (ChaCha8Rng::seed_from_u64(seed), FreshTypeGenerator::seeded(seed.wrapping_add(1))),
            None => (ChaCha8Rng::from_entropy(), FreshTypeGenerator::new()),
        };
        Self {
            planner: ConstructionPlanner::new(),
            rng,
            type_generator: Box::new(type_generator),
            generated_types: Vec::new(),
            config,
            depth: 0,
        }
    }

    /// Replaces the source of fresh types for type-reference values.
    pub fn with_type_generator(mut self, generator: Box<dyn TypeGenerator>) -> Self {
        self.type_generator = generator;
        self.generated_types.clear();
        self
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn planner_stats(&self) -> PlannerStats {
        self.planner.stats()
    }

    /// The plan chosen for `ty`, if any.
    pub fn plan_for(&mut self, ty: &TypeHandle) -> Option<ConstructionPlan> {
        self.planner.resolve(ty)
    }

    fn unsynthesizable(&self, ty: &TypeHandle) -> ContractError {
        let inner = ty.unwrap_optional();
        let reason = if inner.info().is_generic_definition() {
            "open generic definitions cannot be instantiated".to_string()
        } else {
            match inner.kind() {
                TypeKind::Interface => "interfaces have no constructors".to_string(),
                TypeKind::Enum(_) => "the enumeration has no members".to_string(),
                TypeKind::Array(element) => format!("element type '{}' cannot be synthesized", element),
                TypeKind::Class => "no public constructor has synthesizable parameters".to_string(),
                TypeKind::Struct => "no default instance and no constructor with synthesizable parameters".to_string(),
                _ => "no construction path".to_string(),
            }
        };
        ContractError::unsynthesizable(ty.name(), reason)
    }

    fn synthesize_unwrapped(&mut self, ty: &TypeHandle) -> Result<Value, ContractError> {
        match ty.kind().clone() {
            TypeKind::Array(element) => {
                let len = self.rng.gen_range(0..self.config.max_array_length);
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.synthesize(&element)?);
                }
                Ok(Value::Array { element, items })
            }
            TypeKind::Enum(members) => {
                let index = self.rng.gen_range(0..members.len());
                Ok(Value::Enum(EnumValue::new(ty.clone(), index)))
            }
            TypeKind::Uuid => Ok(Value::Uuid(self.fresh_uuid())),
            TypeKind::Duration => {
                let ticks = self.rng.gen_range(0..i32::MAX as u64);
                Ok(Value::Duration(Duration::from_nanos(ticks * 100)))
            }
            TypeKind::TypeRef => Ok(Value::Type(self.generated_type()?)),
            TypeKind::Primitive(kind) => Ok(self.primitive(kind)),
            TypeKind::Optional(_) | TypeKind::Struct | TypeKind::Class | TypeKind::Interface => self.construct(ty),
        }
    }

    fn primitive(&mut self, kind: PrimitiveKind) -> Value {
        let rng = &mut self.rng;
        match kind {
            PrimitiveKind::Bool => Value::Bool(rng.gen()),
            PrimitiveKind::Char => Value::Char(rng.gen()),
            PrimitiveKind::I8 => Value::I8(rng.gen()),
            PrimitiveKind::I16 => Value::I16(rng.gen()),
            PrimitiveKind::I32 => Value::I32(rng.gen()),
            PrimitiveKind::I64 => Value::I64(rng.gen()),
            PrimitiveKind::U8 => Value::U8(rng.gen()),
            PrimitiveKind::U16 => Value::U16(rng.gen()),
            PrimitiveKind::U32 => Value::U32(rng.gen()),
            PrimitiveKind::U64 => Value::U64(rng.gen()),
            PrimitiveKind::F32 => {
                let sign = if rng.gen() { -1.0 } else { 1.0 };
                Value::F32(sign * rng.gen::<f32>() * f32::MAX)
            }
            PrimitiveKind::F64 => {
                let sign = if rng.gen() { -1.0 } else { 1.0 };
                Value::F64(sign * rng.gen::<f64>() * f64::MAX)
            }
            PrimitiveKind::String => Value::String(uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()),
            PrimitiveKind::DateTime => {
                let seconds = rng.gen_range(0..i32::MAX as u64);
                Value::DateTime(DateTime::<Utc>::from(UNIX_EPOCH + Duration::from_secs(seconds)))
            }
        }
    }

    fn fresh_uuid(&mut self) -> uuid::Uuid {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    fn generated_type(&mut self) -> Result<TypeHandle, ContractError> {
        if self.generated_types.len() < self.config.generated_type_pool {
            let ty = self.type_generator.generate_fresh_type()?;
            self.generated_types.push(ty.clone());
            return Ok(ty);
        }
        let index = self.rng.gen_range(0..self.generated_types.len());
        Ok(self.generated_types[index].clone())
    }

    fn construct(&mut self, ty: &TypeHandle) -> Result<Value, ContractError> {
        let plan = self.planner.resolve(ty).ok_or_else(|| self.unsynthesizable(ty))?;
        let arguments = self.synthesize_arguments(&plan)?;
        invoke_plan(ty, &plan, arguments)
    }

    fn synthesize_arguments(&mut self, plan: &ConstructionPlan) -> Result<Vec<Value>, ContractError> {
        let mut arguments = Vec::with_capacity(plan.parameter_types().len());
        for parameter in plan.parameter_types() {
            arguments.push(self.synthesize(parameter)?);
        }
        Ok(arguments)
    }
}

fn invoke_plan(ty: &TypeHandle, plan: &ConstructionPlan, arguments: Vec<Value>) -> Result<Value, ContractError> {
    trace!("Constructing {} with {}", ty, plan.signature());
    match catch_panic(|| plan.execute(ty, arguments)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ContractError::unsynthesizable(ty.name(), e.to_string())),
        Err(panic) => Err(ContractError::unsynthesizable(ty.name(), format!("constructor panicked: {}", panic))),
    }
}

impl TypeFactory for ValueSynthesizer {
    fn can_synthesize(&mut self, ty: &TypeHandle) -> bool {
        self.planner.can_construct(ty)
    }

    fn synthesize(&mut self, ty: &TypeHandle) -> Result<Value, ContractError> {
        if self.depth >= self.config.max_synthesis_depth {
            return Err(ContractError::unsynthesizable(
                ty.name(),
                format!("synthesis nested deeper than {} levels", self.config.max_synthesis_depth),
            ));
        }
        if !self.can_synthesize(ty) {
            return Err(self.unsynthesizable(ty));
        }
        self.depth += 1;
        let result = self.synthesize_unwrapped(&ty.unwrap_optional());
        self.depth -= 1;
        result
    }

    fn create_dual_instances(&mut self, ty: &TypeHandle) -> Result<(Value, Value), ContractError> {
        if !self.can_synthesize(ty) {
            return Err(self.unsynthesizable(ty));
        }
        let ty = ty.unwrap_optional();
        if !matches!(ty.kind(), TypeKind::Class | TypeKind::Struct) {
            let value = self.synthesize(&ty)?;
            return Ok((value.clone(), value));
        }

        let plan = self.planner.resolve(&ty).ok_or_else(|| self.unsynthesizable(&ty))?;
        let arguments = self.synthesize_arguments(&plan)?;
        let first = invoke_plan(&ty, &plan, arguments.clone())?;
        let second = invoke_plan(&ty, &plan, arguments)?;

        if let (Some(a), Some(b)) = (first.as_object(), second.as_object()) {
            for property in ty.info().properties() {
                if !property.writable || property.is_indexed() || !self.can_synthesize(&property.ty) {
                    continue;
                }
                let value = self.synthesize(&property.ty)?;
                let written = catch_panic(|| {
                    a.set_property(&property.name, value.clone())?;
                    b.set_property(&property.name, value)
                });
                if !matches!(written, Ok(Ok(()))) {
                    debug!("Could not assign {}.{} on the dual instances", ty, property.name);
                }
            }
        }
        Ok((first, second))
    }
}

impl Default for ValueSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValueSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSynthesizer")
            .field("planner", &self.planner)
            .field("generated_types", &self.generated_types)
            .field("config", &self.config)
            .finish()
    }
}
