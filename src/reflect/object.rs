//! Live objects: the [`Reflect`] capability and shared [`ObjectRef`] handles.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::rc::Rc;

use super::{NotifyPropertyChanged, PropertyChangedHandler, SubscriptionId, TypeHandle, Value};

/// Failures of the object model itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReflectError {
    #[error("type '{type_name}' has no property named '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("property '{type_name}.{property}' cannot be read")]
    NotReadable { type_name: String, property: String },

    #[error("property '{type_name}.{property}' cannot be written")]
    NotWritable { type_name: String, property: String },

    #[error("property '{property}' expects a value of type '{expected}', found '{found}'")]
    TypeMismatch { property: String, expected: String, found: String },

    #[error("constructor of '{type_name}' takes {expected} argument(s), {found} supplied")]
    ArgumentCount { type_name: String, expected: usize, found: usize },

    #[error("type '{0}' has no parameterless constructor")]
    NoDefaultConstructor(String),

    #[error("constructor failed: {0}")]
    Constructor(String),

    #[error("object of type '{0}' is already borrowed")]
    Busy(String),
}

/// Runtime access to an object's data members and equality.
pub trait Reflect: Any {
    /// The runtime type of this object.
    fn type_handle(&self) -> TypeHandle;

    fn get_property(&self, name: &str) -> Result<Value, ReflectError>;

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), ReflectError>;

    /// Only consulted when the runtime type overrides equals.
    fn equals(&self, _other: &Value) -> bool {
        false
    }

    /// Only consulted when the runtime type overrides equals; `None` falls
    /// back to the identity hash.
    fn hash_code(&self) -> Option<u64> {
        None
    }

    /// The change-notification capability, when the object has one.
    fn as_notifier(&mut self) -> Option<&mut dyn NotifyPropertyChanged> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared single-threaded handle to a live object.
#[derive(Clone)]
pub struct ObjectRef {
    cell: Rc<RefCell<dyn Reflect>>,
    ty: TypeHandle,
}

impl ObjectRef {
    pub fn new<T: Reflect>(object: T) -> Self {
        let ty = object.type_handle();
        ObjectRef { cell: Rc::new(RefCell::new(object)), ty }
    }

    pub fn type_handle(&self) -> &TypeHandle {
        &self.ty
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    fn address(&self) -> usize {
        Rc::as_ptr(&self.cell) as *const u8 as usize
    }

    pub fn get_property(&self, name: &str) -> Result<Value, ReflectError> {
        let object = self.cell.try_borrow().map_err(|_| self.busy())?;
        object.get_property(name)
    }

    pub fn set_property(&self, name: &str, value: Value) -> Result<(), ReflectError> {
        let mut object = self.cell.try_borrow_mut().map_err(|_| self.busy())?;
        object.set_property(name, value)
    }

    /// Identity unless the runtime type overrides equals.
    pub fn equals(&self, other: &Value) -> bool {
        if !self.ty.info().overrides_equals() {
            return matches!(other, Value::Object(o) if self.ptr_eq(o));
        }
        match self.cell.try_borrow() {
            Ok(object) => object.equals(other),
            Err(_) => false,
        }
    }

    pub fn hash_code(&self) -> u64 {
        if self.ty.info().overrides_equals() {
            if let Some(code) = self.cell.try_borrow().ok().and_then(|object| object.hash_code()) {
                return code;
            }
        }
        let mut hasher = DefaultHasher::new();
        self.address().hash(&mut hasher);
        hasher.finish()
    }

    /// Subscribes `handler` when the object supports change notification.
    pub fn subscribe(&self, handler: PropertyChangedHandler) -> Option<SubscriptionId> {
        let mut object = self.cell.try_borrow_mut().ok()?;
        object.as_notifier().map(|notifier| notifier.subscribe(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.cell.try_borrow_mut() {
            Ok(mut object) => object.as_notifier().map_or(false, |notifier| notifier.unsubscribe(id)),
            Err(_) => false,
        }
    }

    /// Runs `f` against the concrete object when it is a `T`.
    pub fn with<T: Reflect, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let object = self.cell.try_borrow().ok()?;
        object.as_any().downcast_ref::<T>().map(f)
    }

    fn busy(&self) -> ReflectError {
        ReflectError::Busy(self.ty.name().to_string())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.ty, self.address())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.ty, self.address())
    }
}
