//! Runtime object model
//!
//! The engine never sees concrete Rust types. It works over [`TypeHandle`]s,
//! whose [`TypeInfo`] reports constructors, data members and the equality
//! surface, and over [`Value`]s, which carry plain data or live objects
//! implementing [`Reflect`].

mod descriptor;
mod dynamic;
mod notify;
mod object;
mod registry;
mod signature;
mod value;

pub use self::descriptor::{
    invoke_default_constructor, ConstructFn, ConstructorInfo, DefaultFn, OperatorFn, ParameterInfo,
    PrimitiveKind, PropertyInfo, TypeBuilder, TypeDescriptor, TypeHandle, TypeInfo, TypeKind,
};
pub use self::dynamic::DynamicObject;
pub use self::notify::{ChangeWatcher, NotifyPropertyChanged, PropertyChanged, PropertyChangedHandler, SubscriptionId};
pub use self::object::{ObjectRef, Reflect, ReflectError};
pub use self::registry::TypeRegistry;
pub use self::signature::MethodSignature;
pub use self::value::{EnumValue, Value};
