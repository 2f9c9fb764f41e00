//! Dynamic values flowing between the synthesizer, the subject and the testers.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ObjectRef, PrimitiveKind, TypeHandle, TypeKind};

/// One member of an enumeration type.
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: TypeHandle,
    index: usize,
}

impl EnumValue {
    pub fn new(ty: TypeHandle, index: usize) -> Self {
        Self { ty, index }
    }

    pub fn type_handle(&self) -> &TypeHandle {
        &self.ty
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn member(&self) -> Option<&str> {
        match self.ty.kind() {
            TypeKind::Enum(members) => members.get(self.index).map(String::as_str),
            _ => None,
        }
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Duration(Duration),
    Type(TypeHandle),
    Enum(EnumValue),
    Array { element: TypeHandle, items: Vec<Value> },
    Object(ObjectRef),
}

macro_rules! value_accessors {
    ($($name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<$ty> {
                match self {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        )*
    };
}

impl Value {
    value_accessors! {
        as_bool => Bool: bool,
        as_char => Char: char,
        as_i8 => I8: i8,
        as_i16 => I16: i16,
        as_i32 => I32: i32,
        as_i64 => I64: i64,
        as_u8 => U8: u8,
        as_u16 => U16: u16,
        as_u32 => U32: u32,
        as_u64 => U64: u64,
        as_f32 => F32: f32,
        as_f64 => F64: f64,
        as_uuid => Uuid: Uuid,
        as_duration => Duration: Duration,
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Runtime type of the value; `None` for null.
    pub fn type_handle(&self) -> Option<TypeHandle> {
        let primitive = |kind| Some(TypeHandle::primitive(kind));
        match self {
            Value::Null => None,
            Value::Bool(_) => primitive(PrimitiveKind::Bool),
            Value::Char(_) => primitive(PrimitiveKind::Char),
            Value::I8(_) => primitive(PrimitiveKind::I8),
            Value::I16(_) => primitive(PrimitiveKind::I16),
            Value::I32(_) => primitive(PrimitiveKind::I32),
            Value::I64(_) => primitive(PrimitiveKind::I64),
            Value::U8(_) => primitive(PrimitiveKind::U8),
            Value::U16(_) => primitive(PrimitiveKind::U16),
            Value::U32(_) => primitive(PrimitiveKind::U32),
            Value::U64(_) => primitive(PrimitiveKind::U64),
            Value::F32(_) => primitive(PrimitiveKind::F32),
            Value::F64(_) => primitive(PrimitiveKind::F64),
            Value::String(_) => primitive(PrimitiveKind::String),
            Value::DateTime(_) => primitive(PrimitiveKind::DateTime),
            Value::Uuid(_) => Some(TypeHandle::uuid()),
            Value::Duration(_) => Some(TypeHandle::duration()),
            Value::Type(_) => Some(TypeHandle::type_ref()),
            Value::Enum(e) => Some(e.type_handle().clone()),
            Value::Array { element, .. } => Some(TypeHandle::array(element.clone())),
            Value::Object(object) => Some(object.type_handle().clone()),
        }
    }

    /// Object equality: structural for plain data, delegated to the object
    /// for object values.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(object), _) => object.equals(other),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            // NaN equals itself, as a stored value should round-trip.
            (Value::F32(a), Value::F32(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a.ty == b.ty && a.index == b.index,
            (
                Value::Array { element: ea, items: ia },
                Value::Array { element: eb, items: ib },
            ) => ea == eb && ia.len() == ib.len() && ia.iter().zip(ib).all(|(a, b)| a.equals(b)),
            _ => false,
        }
    }

    /// Hash code consistent with [`Value::equals`] for plain data.
    pub fn hash_code(&self) -> u64 {
        if let Value::Object(object) = self {
            return object.hash_code();
        }
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::U8(v) => v.hash(state),
            Value::U16(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::F32(v) => canonical_f32_bits(*v).hash(state),
            Value::F64(v) => canonical_f64_bits(*v).hash(state),
            Value::String(v) => v.hash(state),
            Value::DateTime(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::Duration(v) => v.hash(state),
            Value::Type(v) => v.hash(state),
            Value::Enum(v) => {
                v.ty.hash(state);
                v.index.hash(state);
            }
            Value::Array { element, items } => {
                element.hash(state);
                for item in items {
                    item.hash_code().hash(state);
                }
            }
            Value::Object(object) => object.hash_code().hash(state),
        }
    }
}

// 0.0 == -0.0 and NaN == NaN under equals, so they must hash alike.
fn canonical_f32_bits(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{:?}", v),
            Value::Type(v) => write!(f, "{}", v),
            Value::Enum(v) => match v.member() {
                Some(member) => write!(f, "{}::{}", v.ty, member),
                None => write!(f, "{}#{}", v.ty, v.index),
            },
            Value::Array { element, items } => write!(f, "{}[{}]", element, items.len()),
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}
