//! Type descriptors: the introspection surface the engine drives.
//!
//! A [`TypeHandle`] is the engine's view of one runtime type. Everything the
//! planner and the contract testers know about a type comes through the
//! [`TypeInfo`] capability: its kind, its public constructors in declaration
//! order, its data members and its equality surface. [`TypeDescriptor`] is the
//! stock implementation, assembled with [`TypeBuilder`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::{DynamicObject, MethodSignature, ObjectRef, ReflectError, Value};

/// Invokes a constructor. Receives the owning type and the argument values.
pub type ConstructFn = Rc<dyn Fn(&TypeHandle, Vec<Value>) -> Result<Value, ReflectError>>;

/// Produces the default instance of a value type.
pub type DefaultFn = Rc<dyn Fn(&TypeHandle) -> Result<Value, ReflectError>>;

/// A two-argument boolean operation: strongly typed equals, `==` or `!=`.
pub type OperatorFn = Rc<dyn Fn(&Value, &Value) -> bool>;

/// Primitive data kinds with a full-range random representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    DateTime,
}

impl PrimitiveKind {
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::String => "String",
            PrimitiveKind::DateTime => "DateTime",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Structural classification of a type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Globally unique identifier.
    Uuid,
    /// Time span.
    Duration,
    /// A value that is itself a type.
    TypeRef,
    /// Optional wrapper around another type.
    Optional(TypeHandle),
    /// Variable-length sequence of an element type.
    Array(TypeHandle),
    /// Enumeration with its declared members, in order.
    Enum(Vec<String>),
    /// Composite value type. Usually has a default instance.
    Struct,
    /// Composite reference type.
    Class,
    /// Abstract capability with no known implementation.
    Interface,
}

impl TypeKind {
    /// Value types cannot hold null.
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeKind::Primitive(kind) => *kind != PrimitiveKind::String,
            TypeKind::Uuid | TypeKind::Duration | TypeKind::Enum(_) | TypeKind::Struct => true,
            TypeKind::Optional(_)
            | TypeKind::TypeRef
            | TypeKind::Array(_)
            | TypeKind::Class
            | TypeKind::Interface => false,
        }
    }

    pub fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }
}

/// A named constructor parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeHandle,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self { name: name.into(), ty }
    }
}

/// One public construction path of a type.
#[derive(Clone)]
pub struct ConstructorInfo {
    parameters: Vec<ParameterInfo>,
    invoke: ConstructFn,
}

impl ConstructorInfo {
    pub fn new(parameters: Vec<ParameterInfo>, invoke: ConstructFn) -> Self {
        Self { parameters, invoke }
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn signature(&self) -> MethodSignature {
        MethodSignature::from_parameters(&self.parameters)
    }

    /// Invokes the constructor on behalf of `owner`.
    pub fn invoke(&self, owner: &TypeHandle, arguments: Vec<Value>) -> Result<Value, ReflectError> {
        if arguments.len() != self.parameters.len() {
            return Err(ReflectError::ArgumentCount {
                type_name: owner.name().to_string(),
                expected: self.parameters.len(),
                found: arguments.len(),
            });
        }
        (self.invoke)(owner, arguments)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// A data member of a type.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: TypeHandle,
    pub readable: bool,
    pub writable: bool,
    /// Number of index parameters; non-zero for indexers.
    pub index_parameters: usize,
}

impl PropertyInfo {
    pub fn read_write(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self { name: name.into(), ty, readable: true, writable: true, index_parameters: 0 }
    }

    pub fn read_only(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self { writable: false, ..Self::read_write(name, ty) }
    }

    pub fn write_only(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self { readable: false, ..Self::read_write(name, ty) }
    }

    pub fn indexed(name: impl Into<String>, ty: TypeHandle, index_parameters: usize) -> Self {
        Self { index_parameters, ..Self::read_write(name, ty) }
    }

    pub fn is_indexed(&self) -> bool {
        self.index_parameters > 0
    }
}

/// Introspection capability for one runtime type.
pub trait TypeInfo: fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> &TypeKind;

    /// Public instance constructors, in declaration order.
    fn constructors(&self) -> Vec<ConstructorInfo>;

    /// Externally visible data members, in declaration order.
    fn properties(&self) -> Vec<PropertyInfo>;

    /// Whether the type replaces the identity-based base equality.
    fn overrides_equals(&self) -> bool;

    fn strongly_typed_equals(&self) -> Option<OperatorFn>;

    fn equality_operator(&self) -> Option<OperatorFn>;

    fn inequality_operator(&self) -> Option<OperatorFn>;

    /// Open generic definitions can never be instantiated.
    fn is_generic_definition(&self) -> bool {
        false
    }

    /// Whether [`TypeInfo::create_default`] can succeed. Implementors that
    /// override `create_default` must override this too.
    fn has_default_instance(&self) -> bool {
        self.constructors().iter().any(|constructor| constructor.parameters().is_empty())
    }

    /// Creates the instance produced by the trivial construction path.
    fn create_default(&self, owner: &TypeHandle) -> Result<Value, ReflectError> {
        invoke_default_constructor(self, owner)
    }
}

/// Invokes the first parameterless constructor of `info`.
pub fn invoke_default_constructor<T: TypeInfo + ?Sized>(info: &T, owner: &TypeHandle) -> Result<Value, ReflectError> {
    info.constructors()
        .into_iter()
        .find(|constructor| constructor.parameters().is_empty())
        .ok_or_else(|| ReflectError::NoDefaultConstructor(owner.name().to_string()))?
        .invoke(owner, Vec::new())
}

/// Shared handle to a type. Types are nominal: handles compare by name.
#[derive(Clone)]
pub struct TypeHandle(Rc<dyn TypeInfo>);

impl TypeHandle {
    pub fn new<T: TypeInfo + 'static>(info: T) -> Self {
        TypeHandle(Rc::new(info))
    }

    pub fn from_rc(info: Rc<dyn TypeInfo>) -> Self {
        TypeHandle(info)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn kind(&self) -> &TypeKind {
        self.0.kind()
    }

    pub fn info(&self) -> &dyn TypeInfo {
        &*self.0
    }

    pub fn is_value_type(&self) -> bool {
        self.kind().is_value_type()
    }

    /// Strips every optional wrapper.
    pub fn unwrap_optional(&self) -> TypeHandle {
        let mut current = self.clone();
        while let TypeKind::Optional(inner) = current.kind() {
            let inner = inner.clone();
            current = inner;
        }
        current
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDescriptor::builtin(kind.type_name(), TypeKind::Primitive(kind))
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn date_time() -> Self {
        Self::primitive(PrimitiveKind::DateTime)
    }

    pub fn uuid() -> Self {
        TypeDescriptor::builtin("Uuid", TypeKind::Uuid)
    }

    pub fn duration() -> Self {
        TypeDescriptor::builtin("Duration", TypeKind::Duration)
    }

    pub fn type_ref() -> Self {
        TypeDescriptor::builtin("Type", TypeKind::TypeRef)
    }

    pub fn optional(inner: TypeHandle) -> Self {
        let name = format!("Option<{}>", inner.name());
        TypeDescriptor::builtin(&name, TypeKind::Optional(inner))
    }

    pub fn array(element: TypeHandle) -> Self {
        let name = format!("[{}]", element.name());
        TypeDescriptor::builtin(&name, TypeKind::Array(element))
    }

    /// The root reference type: identity equality, parameterless constructor.
    pub fn object() -> Self {
        TypeDescriptor::class("object")
            .default_constructor(|ty| Ok(Value::Object(ObjectRef::new(DynamicObject::new(ty.clone())))))
            .build()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.name())
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stock [`TypeInfo`] implementation.
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    constructors: Vec<ConstructorInfo>,
    properties: Vec<PropertyInfo>,
    overrides_equals: bool,
    strongly_typed_equals: Option<OperatorFn>,
    equality_operator: Option<OperatorFn>,
    inequality_operator: Option<OperatorFn>,
    generic_definition: bool,
    default_instance: Option<DefaultFn>,
}

impl TypeDescriptor {
    pub fn class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name.into(), TypeKind::Class)
    }

    /// A value type; `default` yields its zero instance.
    pub fn value_type<F>(name: impl Into<String>, default: F) -> TypeBuilder
    where
        F: Fn(&TypeHandle) -> Result<Value, ReflectError> + 'static,
    {
        let mut builder = TypeBuilder::new(name.into(), TypeKind::Struct);
        builder.descriptor.default_instance = Some(Rc::new(default));
        builder
    }

    pub fn interface(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name.into(), TypeKind::Interface)
    }

    pub fn enumeration<S: Into<String>>(name: impl Into<String>, members: impl IntoIterator<Item = S>) -> TypeBuilder {
        let members = members.into_iter().map(Into::into).collect();
        TypeBuilder::new(name.into(), TypeKind::Enum(members)).with_structural_equality()
    }

    /// Built-in data types compare structurally and declare both operators.
    fn builtin(name: &str, kind: TypeKind) -> TypeHandle {
        TypeBuilder::new(name.to_string(), kind)
            .with_structural_equality()
            .build()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("constructors", &self.constructors.len())
            .field("properties", &self.properties)
            .field("overrides_equals", &self.overrides_equals)
            .finish()
    }
}

impl TypeInfo for TypeDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &TypeKind {
        &self.kind
    }

    fn constructors(&self) -> Vec<ConstructorInfo> {
        self.constructors.clone()
    }

    fn properties(&self) -> Vec<PropertyInfo> {
        self.properties.clone()
    }

    fn overrides_equals(&self) -> bool {
        self.overrides_equals
    }

    fn strongly_typed_equals(&self) -> Option<OperatorFn> {
        self.strongly_typed_equals.clone()
    }

    fn equality_operator(&self) -> Option<OperatorFn> {
        self.equality_operator.clone()
    }

    fn inequality_operator(&self) -> Option<OperatorFn> {
        self.inequality_operator.clone()
    }

    fn is_generic_definition(&self) -> bool {
        self.generic_definition
    }

    fn has_default_instance(&self) -> bool {
        self.default_instance.is_some() || self.constructors.iter().any(|c| c.parameters().is_empty())
    }

    fn create_default(&self, owner: &TypeHandle) -> Result<Value, ReflectError> {
        match &self.default_instance {
            Some(default) => default(owner),
            None => invoke_default_constructor(self, owner),
        }
    }
}

/// Assembles a [`TypeDescriptor`].
pub struct TypeBuilder {
    descriptor: TypeDescriptor,
}

impl TypeBuilder {
    fn new(name: String, kind: TypeKind) -> Self {
        Self {
            descriptor: TypeDescriptor {
                name,
                kind,
                constructors: Vec::new(),
                properties: Vec::new(),
                overrides_equals: false,
                strongly_typed_equals: None,
                equality_operator: None,
                inequality_operator: None,
                generic_definition: false,
                default_instance: None,
            },
        }
    }

    pub fn constructor<F>(mut self, parameters: Vec<ParameterInfo>, invoke: F) -> Self
    where
        F: Fn(&TypeHandle, Vec<Value>) -> Result<Value, ReflectError> + 'static,
    {
        self.descriptor.constructors.push(ConstructorInfo::new(parameters, Rc::new(invoke)));
        self
    }

    pub fn default_constructor<F>(self, invoke: F) -> Self
    where
        F: Fn(&TypeHandle) -> Result<Value, ReflectError> + 'static,
    {
        self.constructor(Vec::new(), move |owner, _| invoke(owner))
    }

    /// A constructor that builds a [`DynamicObject`] and stores every argument
    /// in the property whose name matches the parameter, ignoring case.
    pub fn record_constructor(self, parameters: Vec<ParameterInfo>) -> Self {
        let names: Vec<String> = parameters.iter().map(|p| p.name.clone()).collect();
        self.constructor(parameters, move |owner, arguments| {
            let mut object = DynamicObject::new(owner.clone());
            for (name, argument) in names.iter().zip(arguments) {
                object.set_field_ignore_case(name, argument)?;
            }
            Ok(Value::Object(ObjectRef::new(object)))
        })
    }

    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.descriptor.properties.push(property);
        self
    }

    pub fn read_write(self, name: &str, ty: TypeHandle) -> Self {
        self.property(PropertyInfo::read_write(name, ty))
    }

    pub fn read_only(self, name: &str, ty: TypeHandle) -> Self {
        self.property(PropertyInfo::read_only(name, ty))
    }

    pub fn write_only(self, name: &str, ty: TypeHandle) -> Self {
        self.property(PropertyInfo::write_only(name, ty))
    }

    pub fn overrides_equals(mut self) -> Self {
        self.descriptor.overrides_equals = true;
        self
    }

    pub fn strongly_typed_equals<F>(mut self, equals: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        self.descriptor.strongly_typed_equals = Some(Rc::new(equals));
        self
    }

    pub fn equality_operator<F>(mut self, operator: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        self.descriptor.equality_operator = Some(Rc::new(operator));
        self
    }

    pub fn inequality_operator<F>(mut self, operator: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        self.descriptor.inequality_operator = Some(Rc::new(operator));
        self
    }

    /// Overridden equals, strongly typed equals and both operators, all
    /// defined in terms of [`Value::equals`].
    pub fn with_structural_equality(self) -> Self {
        self.overrides_equals()
            .strongly_typed_equals(|a, b| a.equals(b))
            .equality_operator(|a, b| a.equals(b))
            .inequality_operator(|a, b| !a.equals(b))
    }

    pub fn generic_definition(mut self) -> Self {
        self.descriptor.generic_definition = true;
        self
    }

    pub fn build(self) -> TypeHandle {
        TypeHandle::new(self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_compare_by_name() {
        assert_eq!(TypeHandle::primitive(PrimitiveKind::I32), TypeHandle::primitive(PrimitiveKind::I32));
        assert_ne!(TypeHandle::primitive(PrimitiveKind::I32), TypeHandle::primitive(PrimitiveKind::I64));
        assert_eq!(TypeHandle::array(TypeHandle::string()).name(), "[String]");
    }

    #[test]
    fn test_unwrap_optional_strips_every_layer() {
        let nested = TypeHandle::optional(TypeHandle::optional(TypeHandle::uuid()));
        assert_eq!(nested.unwrap_optional(), TypeHandle::uuid());
    }

    #[test]
    fn test_value_and_reference_kinds() {
        assert!(TypeHandle::primitive(PrimitiveKind::Bool).is_value_type());
        assert!(!TypeHandle::string().is_value_type());
        assert!(!TypeHandle::object().is_value_type());
        assert!(TypeHandle::duration().is_value_type());
        assert!(!TypeHandle::optional(TypeHandle::primitive(PrimitiveKind::I32)).is_value_type());
        assert!(!TypeHandle::optional(TypeHandle::string()).is_value_type());
    }

    #[test]
    fn test_constructor_rejects_wrong_arity() {
        let ty = TypeDescriptor::class("Pair")
            .record_constructor(vec![ParameterInfo::new("left", TypeHandle::string())])
            .read_only("Left", TypeHandle::string())
            .build();
        let constructor = ty.info().constructors().remove(0);
        let err = constructor.invoke(&ty, Vec::new()).unwrap_err();
        assert!(matches!(err, ReflectError::ArgumentCount { expected: 1, found: 0, .. }));
    }

    #[test]
    fn test_default_constructor_is_found() {
        let ty = TypeHandle::object();
        let value = ty.info().create_default(&ty).unwrap();
        assert_eq!(value.type_handle().unwrap(), ty);
    }
}
