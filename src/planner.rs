//! Construction planning.
//!
//! The planner decides, once per type and engine, how an instance of a type
//! can be obtained: trivially (no arguments), through a specific constructor
//! whose parameters can all be synthesized, or not at all.
//!
//! ## Memoization
//!
//! Every answer is cached and never revised. A lookup that misses the cache
//! collects every uncached type reachable through constructor parameters and
//! element types, then settles all of them at once as a least fixed point:
//! types with a trivial path are constructible at stage 0, and a type is
//! constructible at stage `n` once one of its constructors only needs types
//! from earlier stages. Types that never reach a stage are unconstructible.
//!
//! A constructible type uses its first constructor, in declaration order,
//! whose parameters all sit at earlier stages than the type itself. Plans
//! therefore never loop back to the type they build, and the answer for a
//! type does not depend on which type was queried first.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::reflect::{ConstructorInfo, MethodSignature, ReflectError, TypeHandle, TypeKind, Value};

/// How to obtain an instance of one type.
#[derive(Debug, Clone)]
pub struct ConstructionPlan {
    signature: MethodSignature,
    constructor: Option<ConstructorInfo>,
}

impl ConstructionPlan {
    /// No arguments needed.
    pub fn trivial() -> Self {
        Self { signature: MethodSignature::empty(), constructor: None }
    }

    pub fn with_constructor(constructor: ConstructorInfo) -> Self {
        Self { signature: constructor.signature(), constructor: Some(constructor) }
    }

    pub fn is_trivial(&self) -> bool {
        self.signature.is_empty()
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn parameter_types(&self) -> &[TypeHandle] {
        self.signature.types()
    }

    /// Runs the plan with already synthesized arguments.
    pub fn execute(&self, ty: &TypeHandle, arguments: Vec<Value>) -> Result<Value, ReflectError> {
        match &self.constructor {
            Some(constructor) => constructor.invoke(ty, arguments),
            None => ty.info().create_default(ty),
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerStats {
    /// Cache probes, including the ones made for dependent types
    pub lookups: u64,

    /// Probes answered from the cache
    pub hits: u64,

    /// Types that had to be inspected
    pub introspections: u64,
}

#[derive(Debug, Clone)]
struct Planned {
    plan: ConstructionPlan,
    stage: usize,
}

/// What inspecting a single type reveals, before its dependencies are known.
enum Shape {
    Settled(Option<ConstructionPlan>),
    Element(TypeHandle),
    Constructors(Vec<ConstructorInfo>),
}

impl Shape {
    fn dependencies(&self) -> Vec<TypeHandle> {
        match self {
            Shape::Settled(_) => Vec::new(),
            Shape::Element(inner) => vec![inner.clone()],
            Shape::Constructors(constructors) => constructors
                .iter()
                .flat_map(|c| c.parameters().iter().map(|p| p.ty.clone()))
                .collect(),
        }
    }
}

/// Memoizing resolver from types to construction plans.
#[derive(Debug, Default)]
pub struct ConstructionPlanner {
    cache: HashMap<TypeHandle, Option<Planned>>,
    stats: PlannerStats,
}

impl ConstructionPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plan for `ty`, or `None` when it cannot be constructed.
    pub fn resolve(&mut self, ty: &TypeHandle) -> Option<ConstructionPlan> {
        if !self.probe(ty) {
            self.settle(ty);
        }
        self.cache.get(ty).and_then(|entry| entry.as_ref().map(|planned| planned.plan.clone()))
    }

    pub fn can_construct(&mut self, ty: &TypeHandle) -> bool {
        self.resolve(ty).is_some()
    }

    pub fn is_cached(&self, ty: &TypeHandle) -> bool {
        self.cache.contains_key(ty)
    }

    pub fn stats(&self) -> PlannerStats {
        self.stats
    }

    fn probe(&mut self, ty: &TypeHandle) -> bool {
        self.stats.lookups += 1;
        let hit = self.cache.contains_key(ty);
        if hit {
            self.stats.hits += 1;
            trace!("Plan cache hit for {}", ty);
        }
        hit
    }

    fn stage_of(&self, ty: &TypeHandle, stages: &HashMap<TypeHandle, usize>) -> Option<usize> {
        match self.cache.get(ty) {
            Some(entry) => entry.as_ref().map(|planned| planned.stage),
            None => stages.get(ty).copied(),
        }
    }

    fn all_before(&self, types: &[TypeHandle], stage: usize, stages: &HashMap<TypeHandle, usize>) -> bool {
        types.iter().all(|ty| matches!(self.stage_of(ty, stages), Some(s) if s < stage))
    }

    /// Inspects every uncached type reachable from `root` and caches them all.
    fn settle(&mut self, root: &TypeHandle) {
        let mut shapes: Vec<(TypeHandle, Shape)> = Vec::new();
        let mut seen: HashSet<TypeHandle> = HashSet::new();
        let mut pending = vec![root.clone()];
        let mut highest_cached = 0;
        seen.insert(root.clone());

        while let Some(ty) = pending.pop() {
            self.stats.introspections += 1;
            let shape = introspect(&ty);
            for dependency in shape.dependencies() {
                if seen.contains(&dependency) {
                    continue;
                }
                if self.probe(&dependency) {
                    if let Some(Some(planned)) = self.cache.get(&dependency) {
                        highest_cached = highest_cached.max(planned.stage);
                    }
                    continue;
                }
                seen.insert(dependency.clone());
                pending.push(dependency);
            }
            shapes.push((ty, shape));
        }

        let mut stages: HashMap<TypeHandle, usize> = HashMap::new();
        for (ty, shape) in &shapes {
            if let Shape::Settled(Some(_)) = shape {
                stages.insert(ty.clone(), 0);
            }
        }
        // Past the highest cached stage every round must admit a type or none ever will.
        let mut stage = 1;
        loop {
            let entering: Vec<TypeHandle> = shapes
                .iter()
                .filter(|(ty, _)| !stages.contains_key(ty))
                .filter(|(_, shape)| match shape {
                    Shape::Settled(_) => false,
                    Shape::Element(inner) => self.all_before(std::slice::from_ref(inner), stage, &stages),
                    Shape::Constructors(constructors) => constructors
                        .iter()
                        .any(|c| self.all_before(c.signature().types(), stage, &stages)),
                })
                .map(|(ty, _)| ty.clone())
                .collect();
            if entering.is_empty() && stage > highest_cached {
                break;
            }
            for ty in entering {
                stages.insert(ty, stage);
            }
            stage += 1;
        }

        for (ty, shape) in shapes {
            let planned = stages.get(&ty).copied().and_then(|stage| {
                let plan = match shape {
                    Shape::Settled(plan) => plan,
                    Shape::Element(_) => Some(ConstructionPlan::trivial()),
                    Shape::Constructors(constructors) => constructors
                        .into_iter()
                        .find(|c| self.all_before(c.signature().types(), stage, &stages))
                        .map(ConstructionPlan::with_constructor),
                };
                plan.map(|plan| Planned { plan, stage })
            });
            match &planned {
                Some(planned) => debug!("Resolved {} with signature {}", ty, planned.plan.signature()),
                None => debug!("{} cannot be constructed", ty),
            }
            self.cache.insert(ty, planned);
        }
    }
}

fn introspect(ty: &TypeHandle) -> Shape {
    let info = ty.info();
    if info.is_generic_definition() {
        return Shape::Settled(None);
    }
    match ty.kind().clone() {
        TypeKind::Optional(inner) | TypeKind::Array(inner) => Shape::Element(inner),
        TypeKind::Enum(members) if members.is_empty() => Shape::Settled(None),
        TypeKind::Primitive(_) | TypeKind::Uuid | TypeKind::Duration | TypeKind::TypeRef | TypeKind::Enum(_) => {
            Shape::Settled(Some(ConstructionPlan::trivial()))
        }
        TypeKind::Interface => Shape::Settled(None),
        TypeKind::Struct | TypeKind::Class if info.has_default_instance() => {
            Shape::Settled(Some(ConstructionPlan::trivial()))
        }
        TypeKind::Struct | TypeKind::Class => {
            let constructors = info.constructors();
            if constructors.is_empty() {
                Shape::Settled(None)
            } else {
                trace!("{} has {} constructors to weigh", ty, constructors.len());
                Shape::Constructors(constructors)
            }
        }
    }
}
