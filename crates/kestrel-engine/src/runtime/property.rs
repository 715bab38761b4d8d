//! Property keys, properties and descriptors.

use std::fmt;

use super::object::JsObject;
use super::string::JsString;
use super::symbol::Symbol;
use super::value::Value;

/// A property key: a string or a symbol.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String-keyed property (array indices included)
    String(JsString),
    /// Symbol-keyed property
    Symbol(Symbol),
}

impl PropertyKey {
    /// The array index this key denotes, if any.
    pub fn as_array_index(&self) -> Option<u32> {
        match self {
            PropertyKey::String(s) => s.to_array_index(),
            PropertyKey::Symbol(_) => None,
        }
    }

    /// Returns the string key, if this is one.
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }

    /// Returns true for symbol keys.
    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// The key as a language value.
    pub fn to_value(&self) -> Value {
        match self {
            PropertyKey::String(s) => Value::String(s.clone()),
            PropertyKey::Symbol(symbol) => Value::Symbol(symbol.clone()),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        PropertyKey::String(JsString::from(value))
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        PropertyKey::String(JsString::from(value))
    }
}

impl From<JsString> for PropertyKey {
    fn from(value: JsString) -> Self {
        PropertyKey::String(value)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        PropertyKey::String(JsString::from(value.to_string()))
    }
}

impl From<usize> for PropertyKey {
    fn from(value: usize) -> Self {
        PropertyKey::String(JsString::from(value.to_string()))
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{s}"),
            PropertyKey::Symbol(symbol) => f.write_str(&symbol.descriptive_string()),
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{s:?}"),
            PropertyKey::Symbol(symbol) => write!(f, "{symbol:?}"),
        }
    }
}

/// An own property. Exactly one of the two kinds at a time.
#[derive(Debug, Clone)]
pub enum Property {
    /// A data property
    Data {
        /// The stored value
        value: Value,
        /// `[[Writable]]`
        writable: bool,
        /// `[[Enumerable]]`
        enumerable: bool,
        /// `[[Configurable]]`
        configurable: bool,
    },
    /// An accessor property
    Accessor {
        /// `[[Get]]`
        get: Option<JsObject>,
        /// `[[Set]]`
        set: Option<JsObject>,
        /// `[[Enumerable]]`
        enumerable: bool,
        /// `[[Configurable]]`
        configurable: bool,
    },
}

impl Property {
    /// A data property with explicit attributes.
    pub fn data(value: impl Into<Value>, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Property::Data {
            value: value.into(),
            writable,
            enumerable,
            configurable,
        }
    }

    /// A writable, enumerable, configurable data property.
    pub fn plain(value: impl Into<Value>) -> Self {
        Self::data(value, true, true, true)
    }

    /// A writable, non-enumerable, configurable data property, the shape of
    /// built-in methods.
    pub fn hidden(value: impl Into<Value>) -> Self {
        Self::data(value, true, false, true)
    }

    /// `[[Enumerable]]`.
    pub fn enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => *enumerable,
        }
    }

    /// `[[Configurable]]`.
    pub fn configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => {
                *configurable
            }
        }
    }

    /// Returns true for data properties.
    pub fn is_data(&self) -> bool {
        matches!(self, Property::Data { .. })
    }

    /// The complete descriptor of this property.
    pub fn to_descriptor(&self) -> PropertyDescriptor {
        match self {
            Property::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                value: Some(value.clone()),
                writable: Some(*writable),
                get: None,
                set: None,
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
            Property::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(get.clone().map_or(Value::Undefined, Value::Object)),
                set: Some(set.clone().map_or(Value::Undefined, Value::Object)),
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
            },
        }
    }
}

/// A partial property descriptor, as consumed by `[[DefineOwnProperty]]`.
///
/// Accessor fields hold `undefined` or a callable object.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`
    pub get: Option<Value>,
    /// `[[Set]]`
    pub set: Option<Value>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A complete data descriptor.
    pub fn data(value: impl Into<Value>, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    /// A descriptor that only sets `[[Value]]`.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// IsAccessorDescriptor.
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// IsDataDescriptor.
    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// IsGenericDescriptor.
    pub fn is_generic(&self) -> bool {
        !self.is_accessor() && !self.is_data()
    }

    /// Builds a property from this descriptor, filling absent fields with
    /// their defaults.
    pub fn to_property(&self) -> Property {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor() {
            Property::Accessor {
                get: self.get.as_ref().and_then(Value::as_object).cloned(),
                set: self.set.as_ref().and_then(Value::as_object).cloned(),
                enumerable,
                configurable,
            }
        } else {
            Property::Data {
                value: self.value.clone().unwrap_or_default(),
                writable: self.writable.unwrap_or(false),
                enumerable,
                configurable,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_kinds() {
        assert!(PropertyDescriptor::data(1, true, true, true).is_data());
        assert!(PropertyDescriptor::default().is_generic());
        let accessor = PropertyDescriptor {
            get: Some(Value::Undefined),
            ..PropertyDescriptor::default()
        };
        assert!(accessor.is_accessor());
        assert!(!accessor.is_data());
    }

    #[test]
    fn test_absent_fields_default_to_false() {
        let property = PropertyDescriptor::value(5).to_property();
        match property {
            Property::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => {
                assert_eq!(value, Value::from(5));
                assert!(!writable && !enumerable && !configurable);
            }
            Property::Accessor { .. } => panic!("expected a data property"),
        }
    }

    #[test]
    fn test_key_array_index() {
        assert_eq!(PropertyKey::from(7u32).as_array_index(), Some(7));
        assert_eq!(PropertyKey::from("length").as_array_index(), None);
        assert!(PropertyKey::from(Symbol::new(None)).as_array_index().is_none());
    }
}
