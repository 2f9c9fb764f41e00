//! Fixture types shared by the integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::rc::Rc;

use contract_probe::reflect::{
    ConstructorInfo, DynamicObject, NotifyPropertyChanged, ObjectRef, OperatorFn, ParameterInfo, PrimitiveKind,
    PropertyChanged, PropertyInfo, Reflect, ReflectError, TypeDescriptor, TypeHandle, TypeInfo, TypeKind, Value,
};
use contract_probe::{TesterConfig, ValueSynthesizer};

pub const SEED: u64 = 0x5EED;

pub fn seeded_config() -> TesterConfig {
    TesterConfig::default().with_seed(SEED)
}

pub fn seeded_synthesizer() -> ValueSynthesizer {
    ValueSynthesizer::with_config(seeded_config()).unwrap()
}

pub fn int() -> TypeHandle {
    TypeHandle::primitive(PrimitiveKind::I32)
}

pub fn instance_of(ty: &TypeHandle) -> Value {
    ty.info().create_default(ty).unwrap()
}

fn new_dynamic(ty: &TypeHandle) -> Result<Value, ReflectError> {
    Ok(Value::Object(ObjectRef::new(DynamicObject::new(ty.clone()))))
}

// === DATA TYPES ===

pub fn color_type() -> TypeHandle {
    TypeDescriptor::enumeration("Color", ["Red", "Green", "Blue"]).build()
}

/// A class with one read-write member per primitive and well-known kind, a
/// read-only and a write-only member, and an array of itself.
pub fn test_type() -> TypeHandle {
    let mut builder = TypeDescriptor::class("TestType").default_constructor(new_dynamic);
    let primitives = [
        ("Flag", PrimitiveKind::Bool),
        ("Letter", PrimitiveKind::Char),
        ("Tiny", PrimitiveKind::I8),
        ("Short", PrimitiveKind::I16),
        ("Int", PrimitiveKind::I32),
        ("Long", PrimitiveKind::I64),
        ("Byte", PrimitiveKind::U8),
        ("UShort", PrimitiveKind::U16),
        ("UInt", PrimitiveKind::U32),
        ("ULong", PrimitiveKind::U64),
        ("Single", PrimitiveKind::F32),
        ("Double", PrimitiveKind::F64),
        ("Text", PrimitiveKind::String),
        ("Timestamp", PrimitiveKind::DateTime),
    ];
    for (name, kind) in primitives {
        builder = builder.read_write(name, TypeHandle::primitive(kind));
    }
    builder
        .read_write("MaybeInt", TypeHandle::optional(int()))
        .read_write("Children", TypeHandle::array(test_type_ref()))
        .read_write("Color", color_type())
        .read_write("Id", TypeHandle::uuid())
        .read_write("Elapsed", TypeHandle::duration())
        .read_write("Kind", TypeHandle::type_ref())
        .read_only("ReadOnly", TypeHandle::string())
        .write_only("WriteOnly", TypeHandle::string())
        .build()
}

// Stands for TestType inside its own declaration; handles are nominal.
fn test_type_ref() -> TypeHandle {
    TypeDescriptor::class("TestType").default_constructor(new_dynamic).build()
}

/// `Point(x, y)` storing both arguments, with structural equality.
pub fn point_type() -> TypeHandle {
    TypeDescriptor::class("Point")
        .record_constructor(vec![ParameterInfo::new("x", int()), ParameterInfo::new("y", int())])
        .read_only("X", int())
        .read_only("Y", int())
        .with_structural_equality()
        .build()
}

pub fn point(x: i32, y: i32) -> Value {
    let ty = point_type();
    ty.info().constructors()[0].invoke(&ty, vec![Value::I32(x), Value::I32(y)]).unwrap()
}

/// `Inventory(name, count)` that forgets `count`.
pub fn inventory_type() -> TypeHandle {
    TypeDescriptor::class("Inventory")
        .constructor(
            vec![ParameterInfo::new("name", TypeHandle::string()), ParameterInfo::new("count", int())],
            |owner, arguments| {
                let mut object = DynamicObject::new(owner.clone());
                if let Some(name) = arguments.into_iter().next() {
                    object.set_field("Name", name)?;
                }
                Ok(Value::Object(ObjectRef::new(object)))
            },
        )
        .read_only("Name", TypeHandle::string())
        .read_only("Count", int())
        .build()
}

pub fn canvas_interface() -> TypeHandle {
    TypeDescriptor::interface("ICanvas").build()
}

/// `Renderer(canvas: ICanvas)`: nothing implements the interface.
pub fn renderer_type() -> TypeHandle {
    TypeDescriptor::class("Renderer")
        .record_constructor(vec![ParameterInfo::new("canvas", canvas_interface())])
        .read_only("Canvas", canvas_interface())
        .build()
}

/// A value type whose default instance is a dynamic object.
pub fn size_type() -> TypeHandle {
    TypeDescriptor::value_type("Size", new_dynamic)
        .read_write("Width", int())
        .read_write("Height", int())
        .with_structural_equality()
        .build()
}

// === NOTIFYING TYPES ===

/// A hand-written notifying subject. When `miswired`, the setter of
/// `PropertyTwo` announces `PropertyOne`.
pub struct Observed {
    ty: TypeHandle,
    one: String,
    two: i32,
    miswired: bool,
    property_changed: PropertyChanged,
}

impl Reflect for Observed {
    fn type_handle(&self) -> TypeHandle {
        self.ty.clone()
    }

    fn get_property(&self, name: &str) -> Result<Value, ReflectError> {
        match name {
            "PropertyOne" => Ok(Value::String(self.one.clone())),
            "PropertyTwo" => Ok(Value::I32(self.two)),
            _ => Err(ReflectError::UnknownProperty { type_name: self.ty.name().to_string(), property: name.to_string() }),
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
        match (name, value) {
            ("PropertyOne", Value::String(s)) => {
                self.one = s;
                self.property_changed.raise("PropertyOne");
            }
            ("PropertyTwo", Value::I32(v)) => {
                self.two = v;
                self.property_changed.raise(if self.miswired { "PropertyOne" } else { "PropertyTwo" });
            }
            (name, other) => {
                return Err(ReflectError::TypeMismatch {
                    property: name.to_string(),
                    expected: "String or i32".to_string(),
                    found: other.type_handle().map_or("null".to_string(), |t| t.name().to_string()),
                })
            }
        }
        Ok(())
    }

    fn as_notifier(&mut self) -> Option<&mut dyn NotifyPropertyChanged> {
        Some(&mut self.property_changed)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn observed_type(name: &str, miswired: bool) -> TypeHandle {
    TypeDescriptor::class(name)
        .default_constructor(move |ty| {
            Ok(Value::Object(ObjectRef::new(Observed {
                ty: ty.clone(),
                one: String::new(),
                two: 0,
                miswired,
                property_changed: PropertyChanged::new(),
            })))
        })
        .read_write("PropertyOne", TypeHandle::string())
        .read_write("PropertyTwo", int())
        .build()
}

pub fn good_notifier_type() -> TypeHandle {
    observed_type("GoodNotifier", false)
}

pub fn bad_notifier_type() -> TypeHandle {
    observed_type("BadNotifier", true)
}

// === SELF-REFERENTIAL TYPES ===

/// A class whose constructor parameter lists are produced on demand, so a
/// type can mention itself.
#[derive(Debug)]
pub struct LazyClass {
    name: &'static str,
    kind: TypeKind,
    parameters: fn() -> Vec<Vec<ParameterInfo>>,
}

impl LazyClass {
    fn handle(name: &'static str, parameters: fn() -> Vec<Vec<ParameterInfo>>) -> TypeHandle {
        TypeHandle::new(LazyClass { name, kind: TypeKind::Class, parameters })
    }
}

impl TypeInfo for LazyClass {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> &TypeKind {
        &self.kind
    }

    fn constructors(&self) -> Vec<ConstructorInfo> {
        (self.parameters)()
            .into_iter()
            .map(|parameters| ConstructorInfo::new(parameters, Rc::new(|owner: &TypeHandle, _arguments: Vec<Value>| new_dynamic(owner))))
            .collect()
    }

    fn properties(&self) -> Vec<PropertyInfo> {
        Vec::new()
    }

    fn overrides_equals(&self) -> bool {
        false
    }

    fn strongly_typed_equals(&self) -> Option<OperatorFn> {
        None
    }

    fn equality_operator(&self) -> Option<OperatorFn> {
        None
    }

    fn inequality_operator(&self) -> Option<OperatorFn> {
        None
    }
}

/// `Node(next: Node)` and nothing else.
pub fn node_type() -> TypeHandle {
    LazyClass::handle("Node", || vec![vec![ParameterInfo::new("next", node_type())]])
}

/// `Chain(next: Chain)` or `Chain(value: i32)`.
pub fn chain_type() -> TypeHandle {
    LazyClass::handle("Chain", || {
        vec![vec![ParameterInfo::new("next", chain_type())], vec![ParameterInfo::new("value", int())]]
    })
}

/// `Left(right: Right)`.
pub fn left_type() -> TypeHandle {
    LazyClass::handle("Left", || vec![vec![ParameterInfo::new("right", right_type())]])
}

/// `Right(left: Left)` or `Right(value: i32)`.
pub fn right_type() -> TypeHandle {
    LazyClass::handle("Right", || {
        vec![vec![ParameterInfo::new("left", left_type())], vec![ParameterInfo::new("value", int())]]
    })
}

/// `Ping(pong: Pong)` or `Ping(value: i32)`.
pub fn ping_type() -> TypeHandle {
    LazyClass::handle("Ping", || {
        vec![vec![ParameterInfo::new("pong", pong_type())], vec![ParameterInfo::new("value", int())]]
    })
}

/// `Pong(ping: Ping)` or `Pong(label: String)`.
pub fn pong_type() -> TypeHandle {
    LazyClass::handle("Pong", || {
        vec![vec![ParameterInfo::new("ping", ping_type())], vec![ParameterInfo::new("label", TypeHandle::string())]]
    })
}

/// A value type exposing neither a default instance nor a constructor.
pub fn hollow_struct_type() -> TypeHandle {
    TypeHandle::new(LazyClass { name: "Hollow", kind: TypeKind::Struct, parameters: Vec::new })
}

/// A value type whose only path is `Measure(amount: i32)`.
pub fn measure_struct_type() -> TypeHandle {
    TypeHandle::new(LazyClass {
        name: "Measure",
        kind: TypeKind::Struct,
        parameters: || vec![vec![ParameterInfo::new("amount", int())]],
    })
}
