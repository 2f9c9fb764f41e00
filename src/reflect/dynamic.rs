//! Property-bag objects whose shape comes entirely from their descriptor.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::{
    NotifyPropertyChanged, PropertyChanged, PropertyInfo, Reflect, ReflectError, TypeHandle, Value,
};

/// An object storing one value per declared property.
///
/// Unset properties read as [`Value::Null`]. When the type overrides equals,
/// two dynamic objects of the same type are equal when every declared
/// property holds an equal value.
#[derive(Debug)]
pub struct DynamicObject {
    ty: TypeHandle,
    fields: HashMap<String, Value>,
    property_changed: Option<PropertyChanged>,
}

impl DynamicObject {
    pub fn new(ty: TypeHandle) -> Self {
        Self { ty, fields: HashMap::new(), property_changed: None }
    }

    /// A dynamic object that raises a change notification on every write.
    pub fn notifying(ty: TypeHandle) -> Self {
        Self { property_changed: Some(PropertyChanged::new()), ..Self::new(ty) }
    }

    /// Stores `value` without the writability check or notification.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
        let property = self.property(name)?;
        self.fields.insert(property.name, value);
        Ok(())
    }

    /// [`DynamicObject::set_field`] matching the property name case-insensitively.
    pub fn set_field_ignore_case(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
        let property = self
            .ty
            .info()
            .properties()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| self.unknown(name))?;
        self.fields.insert(property.name, value);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }

    fn property(&self, name: &str) -> Result<PropertyInfo, ReflectError> {
        self.ty
            .info()
            .properties()
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| self.unknown(name))
    }

    fn unknown(&self, name: &str) -> ReflectError {
        ReflectError::UnknownProperty { type_name: self.ty.name().to_string(), property: name.to_string() }
    }
}

impl Reflect for DynamicObject {
    fn type_handle(&self) -> TypeHandle {
        self.ty.clone()
    }

    fn get_property(&self, name: &str) -> Result<Value, ReflectError> {
        let property = self.property(name)?;
        if !property.readable {
            return Err(ReflectError::NotReadable { type_name: self.ty.name().to_string(), property: property.name });
        }
        Ok(self.field(&property.name))
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
        let property = self.property(name)?;
        if !property.writable {
            return Err(ReflectError::NotWritable { type_name: self.ty.name().to_string(), property: property.name });
        }
        self.fields.insert(property.name.clone(), value);
        if let Some(event) = &self.property_changed {
            event.raise(&property.name);
        }
        Ok(())
    }

    fn equals(&self, other: &Value) -> bool {
        let other = match other.as_object() {
            Some(object) if *object.type_handle() == self.ty => object,
            _ => return false,
        };
        let properties = self.ty.info().properties();
        other
            .with::<DynamicObject, _>(|that| {
                properties.iter().all(|p| self.field(&p.name).equals(&that.field(&p.name)))
            })
            .unwrap_or(false)
    }

    fn hash_code(&self) -> Option<u64> {
        let mut hasher = DefaultHasher::new();
        self.ty.hash(&mut hasher);
        for property in self.ty.info().properties() {
            self.field(&property.name).hash_code().hash(&mut hasher);
        }
        Some(hasher.finish())
    }

    fn as_notifier(&mut self) -> Option<&mut dyn NotifyPropertyChanged> {
        self.property_changed.as_mut().map(|event| event as &mut dyn NotifyPropertyChanged)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
