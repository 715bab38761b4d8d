//! Objects and their internal methods.
//!
//! An object is a shared handle to [`ObjectData`]: an insertion-ordered
//! property map, a prototype link, an extensibility flag, an
//! [`ObjectClass`] selecting exotic behaviour and internal slots, and the
//! optional call/construct capabilities that make it a function.
//!
//! Borrows of the inner `RefCell` are kept short: no borrow is held across
//! a call back into the interpreter (getters, setters, coercions).

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::interpreter::Interpreter;

use super::arguments::ParameterMap;
use super::completion::Completion;
use super::function::{BoundFunction, ScriptFunction};
use super::property::{Property, PropertyDescriptor, PropertyKey};
use super::string::JsString;
use super::symbol::Symbol;
use super::value::{Value, same_value};

/// A built-in function implemented in Rust.
///
/// Receives the `this` value, the arguments, and `new.target` when invoked
/// through `[[Construct]]`.
pub type NativeFunction =
    fn(&mut Interpreter, &Value, &[Value], Option<&JsObject>) -> Completion<Value>;

/// The `[[Call]]` capability of a function object.
#[derive(Clone)]
pub enum CallBehavior {
    /// A built-in function
    Native(NativeFunction),
    /// An ordinary function defined in script code
    Script(Rc<ScriptFunction>),
    /// A bound function exotic object
    Bound(Rc<BoundFunction>),
}

/// The `[[Construct]]` capability of a function object.
#[derive(Clone, Copy)]
pub enum ConstructBehavior {
    /// A built-in constructor, called with `new.target` set
    Native(NativeFunction),
    /// OrdinaryCallEvaluateBody on the object's script function
    Script,
    /// Forwards to the bound target
    Bound,
}

/// Which values an array iterator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationKind {
    /// Indices
    Keys,
    /// Elements
    Values,
    /// `[index, element]` pairs
    Entries,
}

/// Internal slots of an array iterator.
#[derive(Debug, Clone)]
pub struct ArrayIteratorState {
    /// The iterated object; `None` once exhausted
    pub object: Option<JsObject>,
    /// The next index to visit
    pub next_index: u64,
    /// What each step produces
    pub kind: IterationKind,
}

/// Internal slots of a string iterator.
#[derive(Debug, Clone)]
pub struct StringIteratorState {
    /// The iterated string; `None` once exhausted
    pub string: Option<JsString>,
    /// The next code unit offset
    pub position: usize,
}

/// The object class: exotic behaviour and internal slots.
pub enum ObjectClass {
    /// An ordinary object (functions included)
    Ordinary,
    /// An Array exotic object
    Array,
    /// An Error instance (`[[ErrorData]]`)
    Error,
    /// An arguments object; mapped when it carries a parameter map
    Arguments(Option<Rc<ParameterMap>>),
    /// A Boolean wrapper
    Boolean(bool),
    /// A Number wrapper
    Number(f64),
    /// A String exotic wrapper
    String(JsString),
    /// A Symbol wrapper
    Symbol(Symbol),
    /// `%ArrayIteratorPrototype%` instances
    ArrayIterator(ArrayIteratorState),
    /// `%StringIteratorPrototype%` instances
    StringIterator(StringIteratorState),
}

impl ObjectClass {
    /// A short name used in debug output.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectClass::Ordinary => "Object",
            ObjectClass::Array => "Array",
            ObjectClass::Error => "Error",
            ObjectClass::Arguments(_) => "Arguments",
            ObjectClass::Boolean(_) => "Boolean",
            ObjectClass::Number(_) => "Number",
            ObjectClass::String(_) => "String",
            ObjectClass::Symbol(_) => "Symbol",
            ObjectClass::ArrayIterator(_) => "Array Iterator",
            ObjectClass::StringIterator(_) => "String Iterator",
        }
    }
}

type PropertyMap = IndexMap<PropertyKey, Property, FxBuildHasher>;

/// The state behind an object handle.
pub struct ObjectData {
    pub(crate) prototype: Option<JsObject>,
    pub(crate) extensible: bool,
    pub(crate) properties: PropertyMap,
    pub(crate) class: ObjectClass,
    pub(crate) call: Option<CallBehavior>,
    pub(crate) construct: Option<ConstructBehavior>,
}

/// A shared object handle. Equality is identity.
#[derive(Clone)]
pub struct JsObject(Rc<RefCell<ObjectData>>);

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for JsObject {}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => {
                let kind = if data.call.is_some() {
                    "Function"
                } else {
                    data.class.name()
                };
                write!(f, "JsObject({kind} @ {:p})", Rc::as_ptr(&self.0))
            }
            Err(_) => write!(f, "JsObject(<borrowed> @ {:p})", Rc::as_ptr(&self.0)),
        }
    }
}

impl JsObject {
    /// Creates an object of the given class.
    pub fn new(prototype: Option<JsObject>, class: ObjectClass) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            prototype,
            extensible: true,
            properties: PropertyMap::default(),
            class,
            call: None,
            construct: None,
        })))
    }

    /// OrdinaryObjectCreate.
    pub fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::new(prototype, ObjectClass::Ordinary)
    }

    /// Creates a function object with the given capabilities.
    pub fn function(
        prototype: Option<JsObject>,
        call: CallBehavior,
        construct: Option<ConstructBehavior>,
    ) -> Self {
        let object = Self::ordinary(prototype);
        {
            let mut data = object.0.borrow_mut();
            data.call = Some(call);
            data.construct = construct;
        }
        object
    }

    /// ArrayCreate with the given length.
    pub fn array(prototype: JsObject, length: u32) -> Self {
        let array = Self::new(Some(prototype), ObjectClass::Array);
        array.insert("length", Property::data(length, true, false, false));
        array
    }

    /// Borrows the object state.
    pub fn borrow(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    /// Mutably borrows the object state.
    pub fn borrow_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    /// Borrows the object class.
    pub fn class(&self) -> Ref<'_, ObjectClass> {
        Ref::map(self.0.borrow(), |data| &data.class)
    }

    /// Mutably borrows the object class.
    pub fn class_mut(&self) -> RefMut<'_, ObjectClass> {
        RefMut::map(self.0.borrow_mut(), |data| &mut data.class)
    }

    /// IsCallable.
    pub fn is_callable(&self) -> bool {
        self.0.borrow().call.is_some()
    }

    /// IsConstructor.
    pub fn is_constructor(&self) -> bool {
        self.0.borrow().construct.is_some()
    }

    /// The `[[Call]]` capability.
    pub fn call_behavior(&self) -> Option<CallBehavior> {
        self.0.borrow().call.clone()
    }

    /// The `[[Construct]]` capability.
    pub fn construct_behavior(&self) -> Option<ConstructBehavior> {
        self.0.borrow().construct
    }

    /// Installs the call and construct capabilities.
    pub fn set_behavior(&self, call: CallBehavior, construct: Option<ConstructBehavior>) {
        let mut data = self.0.borrow_mut();
        data.call = Some(call);
        data.construct = construct;
    }

    /// The script function behind this object, if it is one.
    pub fn script_function(&self) -> Option<Rc<ScriptFunction>> {
        match &self.0.borrow().call {
            Some(CallBehavior::Script(function)) => Some(function.clone()),
            _ => None,
        }
    }

    /// Returns true for Array exotic objects.
    pub fn is_array(&self) -> bool {
        matches!(self.0.borrow().class, ObjectClass::Array)
    }

    /// Returns true for objects with `[[ErrorData]]`.
    pub fn is_error(&self) -> bool {
        matches!(self.0.borrow().class, ObjectClass::Error)
    }

    /// Stores a property without validation. Used while building
    /// intrinsics and fresh objects.
    pub fn insert(&self, key: impl Into<PropertyKey>, property: Property) {
        self.0.borrow_mut().properties.insert(key.into(), property);
    }

    /// Returns true when `key` is an own property.
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.get_own_property(key).is_some()
    }

    // Internal methods

    /// `[[GetPrototypeOf]]`.
    pub fn get_prototype_of(&self) -> Option<JsObject> {
        self.0.borrow().prototype.clone()
    }

    /// `[[SetPrototypeOf]]`. Refuses cycles and changes to non-extensible
    /// objects.
    pub fn set_prototype_of(&self, prototype: Option<JsObject>) -> bool {
        let current = self.get_prototype_of();
        if current == prototype {
            return true;
        }
        if !self.is_extensible() {
            return false;
        }
        let mut cursor = prototype.clone();
        while let Some(object) = cursor {
            if object == *self {
                return false;
            }
            cursor = object.get_prototype_of();
        }
        self.0.borrow_mut().prototype = prototype;
        true
    }

    /// `[[IsExtensible]]`.
    pub fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    /// `[[PreventExtensions]]`.
    pub fn prevent_extensions(&self) -> bool {
        self.0.borrow_mut().extensible = false;
        true
    }

    /// `[[GetOwnProperty]]`, including String and Arguments exotic
    /// behaviour.
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<Property> {
        let data = self.0.borrow();
        match &data.class {
            ObjectClass::String(string) => {
                if let Some(index) = key.as_array_index()
                    && let Some(unit) = string.code_unit_at(index as usize)
                {
                    let character = JsString::from_code_units(&[unit]);
                    return Some(Property::data(character, false, true, false));
                }
            }
            ObjectClass::Arguments(Some(map)) => {
                let mut property = data.properties.get(key).cloned()?;
                if let Some(index) = key.as_array_index()
                    && let Some(mapped) = map.get(index)
                    && let Property::Data { value, .. } = &mut property
                {
                    *value = mapped;
                }
                return Some(property);
            }
            _ => {}
        }
        data.properties.get(key).cloned()
    }

    /// `[[DefineOwnProperty]]`. Returns `false` for a rejected definition.
    pub fn define_own_property(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> Completion<bool> {
        enum Exotic {
            None,
            Array,
            String(usize),
            Mapped(Rc<ParameterMap>),
        }
        let exotic = match &self.0.borrow().class {
            ObjectClass::Array => Exotic::Array,
            ObjectClass::String(string) => Exotic::String(string.len()),
            ObjectClass::Arguments(Some(map)) => Exotic::Mapped(map.clone()),
            _ => Exotic::None,
        };

        match exotic {
            Exotic::None => Ok(self.ordinary_define_own_property(key, desc)),
            Exotic::Array => self.array_define_own_property(interp, key, desc),
            Exotic::String(length) => {
                if let Some(index) = key.as_array_index()
                    && (index as usize) < length
                {
                    let current = self.get_own_property(key);
                    return Ok(validate_and_apply(None, key, false, &desc, current));
                }
                Ok(self.ordinary_define_own_property(key, desc))
            }
            Exotic::Mapped(map) => {
                let index = key.as_array_index().filter(|index| map.contains(*index));
                let mut adjusted = desc.clone();
                if let Some(index) = index
                    && desc.is_data()
                    && desc.value.is_none()
                    && desc.writable == Some(false)
                {
                    adjusted.value = map.get(index);
                }
                if !self.ordinary_define_own_property(key, adjusted) {
                    return Ok(false);
                }
                if let Some(index) = index {
                    if desc.is_accessor() {
                        map.remove(index);
                    } else {
                        if let Some(value) = &desc.value {
                            map.set(index, value.clone());
                        }
                        if desc.writable == Some(false) {
                            map.remove(index);
                        }
                    }
                }
                Ok(true)
            }
        }
    }

    /// OrdinaryDefineOwnProperty.
    pub fn ordinary_define_own_property(&self, key: &PropertyKey, desc: PropertyDescriptor) -> bool {
        let current = self.0.borrow().properties.get(key).cloned();
        let extensible = self.is_extensible();
        validate_and_apply(Some(self), key, extensible, &desc, current)
    }

    fn array_define_own_property(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> Completion<bool> {
        if key.as_string().is_some_and(|name| *name == "length") {
            return self.array_set_length(interp, desc);
        }
        let Some(index) = key.as_array_index() else {
            return Ok(self.ordinary_define_own_property(key, desc));
        };
        let (length, length_writable) = self.array_length_state();
        if index >= length && !length_writable {
            return Ok(false);
        }
        if !self.ordinary_define_own_property(key, desc) {
            return Ok(false);
        }
        if index >= length {
            self.write_array_length(index + 1, None);
        }
        Ok(true)
    }

    /// ArraySetLength.
    fn array_set_length(&self, interp: &mut Interpreter, desc: PropertyDescriptor) -> Completion<bool> {
        let length_key = PropertyKey::from("length");
        let Some(value) = desc.value.clone() else {
            return Ok(self.ordinary_define_own_property(&length_key, desc));
        };
        let new_length = interp.to_uint32(&value)?;
        let number_length = interp.to_number(&value)?;
        if f64::from(new_length) != number_length {
            return Err(interp.range_error("Invalid array length"));
        }

        let mut new_desc = desc.clone();
        new_desc.value = Some(Value::from(new_length));
        let (old_length, old_writable) = self.array_length_state();
        if new_length >= old_length {
            return Ok(self.ordinary_define_own_property(&length_key, new_desc));
        }
        if !old_writable {
            return Ok(false);
        }
        let new_writable = desc.writable != Some(false);
        if !new_writable {
            new_desc.writable = Some(true);
        }
        if !self.ordinary_define_own_property(&length_key, new_desc) {
            return Ok(false);
        }

        let mut doomed: Vec<u32> = self
            .0
            .borrow()
            .properties
            .keys()
            .filter_map(PropertyKey::as_array_index)
            .filter(|index| *index >= new_length)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for index in doomed {
            if !self.delete(&PropertyKey::from(index)) {
                let writable = (!new_writable).then_some(false);
                self.write_array_length(index + 1, writable);
                return Ok(false);
            }
        }
        if !new_writable {
            self.write_array_length(new_length, Some(false));
        }
        Ok(true)
    }

    /// The current array `length` and whether it is writable.
    pub fn array_length_state(&self) -> (u32, bool) {
        match self.0.borrow().properties.get(&PropertyKey::from("length")) {
            Some(Property::Data {
                value: Value::Number(n),
                writable,
                ..
            }) => (*n as u32, *writable),
            _ => (0, true),
        }
    }

    fn write_array_length(&self, length: u32, writable: Option<bool>) {
        let mut data = self.0.borrow_mut();
        if let Some(Property::Data {
            value,
            writable: current_writable,
            ..
        }) = data.properties.get_mut(&PropertyKey::from("length"))
        {
            *value = Value::from(length);
            if let Some(writable) = writable {
                *current_writable = writable;
            }
        }
    }

    /// `[[HasProperty]]`.
    pub fn has_property(&self, key: &PropertyKey) -> bool {
        let mut object = self.clone();
        loop {
            if object.get_own_property(key).is_some() {
                return true;
            }
            match object.get_prototype_of() {
                Some(prototype) => object = prototype,
                None => return false,
            }
        }
    }

    /// `[[Get]]` with an explicit receiver for accessors.
    pub fn get(&self, interp: &mut Interpreter, key: &PropertyKey, receiver: &Value) -> Completion<Value> {
        let mut object = self.clone();
        loop {
            if let Some(property) = object.get_own_property(key) {
                return match property {
                    Property::Data { value, .. } => Ok(value),
                    Property::Accessor { get: Some(getter), .. } => {
                        interp.call(&Value::Object(getter), receiver, &[])
                    }
                    Property::Accessor { get: None, .. } => Ok(Value::Undefined),
                };
            }
            match object.get_prototype_of() {
                Some(prototype) => object = prototype,
                None => return Ok(Value::Undefined),
            }
        }
    }

    /// `[[Set]]` with an explicit receiver (OrdinarySet). Returns `false`
    /// when the assignment was refused.
    pub fn set(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> Completion<bool> {
        let map = match &self.0.borrow().class {
            ObjectClass::Arguments(Some(map)) => Some(map.clone()),
            _ => None,
        };
        if let Some(map) = map
            && receiver.as_object() == Some(self)
            && let Some(index) = key.as_array_index()
            && map.contains(index)
        {
            map.set(index, value.clone());
        }

        let own = self.get_own_property(key);
        self.set_with_own_property(interp, key, value, receiver, own)
    }

    /// OrdinarySetWithOwnDescriptor.
    fn set_with_own_property(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
        own: Option<Property>,
    ) -> Completion<bool> {
        let own = match own {
            Some(property) => property,
            None => match self.get_prototype_of() {
                Some(parent) => return parent.set(interp, key, value, receiver),
                None => Property::plain(Value::Undefined),
            },
        };

        match own {
            Property::Data { writable, .. } => {
                if !writable {
                    return Ok(false);
                }
                let Some(receiver) = receiver.as_object() else {
                    return Ok(false);
                };
                match receiver.get_own_property(key) {
                    Some(Property::Accessor { .. }) => Ok(false),
                    Some(Property::Data { writable: false, .. }) => Ok(false),
                    Some(Property::Data { .. }) => {
                        receiver.define_own_property(interp, key, PropertyDescriptor::value(value))
                    }
                    None => receiver.create_data_property(interp, key, value),
                }
            }
            Property::Accessor { set: Some(setter), .. } => {
                interp.call(&Value::Object(setter), receiver, &[value])?;
                Ok(true)
            }
            Property::Accessor { set: None, .. } => Ok(false),
        }
    }

    /// `[[Delete]]`. Returns `false` for non-configurable properties.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        match self.get_own_property(key) {
            None => true,
            Some(property) if property.configurable() => {
                let mut data = self.0.borrow_mut();
                data.properties.shift_remove(key);
                if let ObjectClass::Arguments(Some(map)) = &data.class
                    && let Some(index) = key.as_array_index()
                {
                    map.remove(index);
                }
                true
            }
            Some(_) => false,
        }
    }

    /// `[[OwnPropertyKeys]]`: array indices ascending, then string keys in
    /// insertion order, then symbols in insertion order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let data = self.0.borrow();
        let mut indices: Vec<u32> = Vec::new();
        if let ObjectClass::String(string) = &data.class {
            indices.extend(0..string.len() as u32);
        }
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for key in data.properties.keys() {
            match key {
                PropertyKey::String(name) => match name.to_array_index() {
                    Some(index) => indices.push(index),
                    None => strings.push(key.clone()),
                },
                PropertyKey::Symbol(_) => symbols.push(key.clone()),
            }
        }
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(PropertyKey::from)
            .chain(strings)
            .chain(symbols)
            .collect()
    }

    // Abstract operations over the internal methods

    /// CreateDataProperty.
    pub fn create_data_property(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        value: Value,
    ) -> Completion<bool> {
        self.define_own_property(interp, key, PropertyDescriptor::data(value, true, true, true))
    }

    /// CreateDataPropertyOrThrow.
    pub fn create_data_property_or_throw(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        value: Value,
    ) -> Completion<()> {
        if self.create_data_property(interp, key, value)? {
            Ok(())
        } else {
            Err(interp.type_error(format!("Cannot define property {key}")))
        }
    }

    /// DefinePropertyOrThrow.
    pub fn define_property_or_throw(
        &self,
        interp: &mut Interpreter,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> Completion<()> {
        if self.define_own_property(interp, key, desc)? {
            Ok(())
        } else {
            Err(interp.type_error(format!("Cannot redefine property: {key}")))
        }
    }
}

/// ValidateAndApplyPropertyDescriptor. With `object` absent this only
/// checks compatibility.
fn validate_and_apply(
    object: Option<&JsObject>,
    key: &PropertyKey,
    extensible: bool,
    desc: &PropertyDescriptor,
    current: Option<Property>,
) -> bool {
    let Some(current) = current else {
        if !extensible {
            return false;
        }
        if let Some(object) = object {
            object.insert(key.clone(), desc.to_property());
        }
        return true;
    };

    if !current.configurable() {
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some_and(|enumerable| enumerable != current.enumerable()) {
            return false;
        }
        if !desc.is_generic() && desc.is_accessor() == current.is_data() {
            return false;
        }
        match &current {
            Property::Accessor { get, set, .. } => {
                let same_function = |field: &Option<Value>, existing: &Option<JsObject>| {
                    field.as_ref().is_none_or(|value| {
                        same_value(value, &existing.clone().map_or(Value::Undefined, Value::Object))
                    })
                };
                if !same_function(&desc.get, get) || !same_function(&desc.set, set) {
                    return false;
                }
            }
            Property::Data {
                value, writable: false, ..
            } => {
                if desc.writable == Some(true) {
                    return false;
                }
                if desc.value.as_ref().is_some_and(|new| !same_value(new, value)) {
                    return false;
                }
            }
            Property::Data { .. } => {}
        }
    }

    let Some(object) = object else {
        return true;
    };

    let enumerable = desc.enumerable.unwrap_or(current.enumerable());
    let configurable = desc.configurable.unwrap_or(current.configurable());
    let accessor_field = |field: &Option<Value>, existing: Option<JsObject>| match field {
        Some(value) => value.as_object().cloned(),
        None => existing,
    };
    let updated = match current {
        Property::Data { .. } if desc.is_accessor() => Property::Accessor {
            get: accessor_field(&desc.get, None),
            set: accessor_field(&desc.set, None),
            enumerable,
            configurable,
        },
        Property::Accessor { .. } if desc.is_data() => Property::Data {
            value: desc.value.clone().unwrap_or_default(),
            writable: desc.writable.unwrap_or(false),
            enumerable,
            configurable,
        },
        Property::Data { value, writable, .. } => Property::Data {
            value: desc.value.clone().unwrap_or(value),
            writable: desc.writable.unwrap_or(writable),
            enumerable,
            configurable,
        },
        Property::Accessor { get, set, .. } => Property::Accessor {
            get: accessor_field(&desc.get, get),
            set: accessor_field(&desc.set, set),
            enumerable,
            configurable,
        },
    };
    object.insert(key.clone(), updated);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> PropertyKey {
        PropertyKey::from(name)
    }

    #[test]
    fn test_prototype_cycles_are_rejected() {
        let a = JsObject::ordinary(None);
        let b = JsObject::ordinary(Some(a.clone()));
        assert!(!a.set_prototype_of(Some(b.clone())));
        assert!(!a.set_prototype_of(Some(a.clone())));
        assert!(b.set_prototype_of(None));
        assert!(a.set_prototype_of(Some(b)));
    }

    #[test]
    fn test_non_extensible_objects_keep_their_prototype() {
        let proto = JsObject::ordinary(None);
        let object = JsObject::ordinary(None);
        object.prevent_extensions();
        assert!(!object.set_prototype_of(Some(proto)));
        assert!(object.set_prototype_of(None));
        assert!(!object.ordinary_define_own_property(&key("x"), PropertyDescriptor::value(1)));
    }

    #[test]
    fn test_non_configurable_redefinition_rules() {
        let object = JsObject::ordinary(None);
        object.insert("fixed", Property::data(1, false, false, false));

        assert!(object.ordinary_define_own_property(&key("fixed"), PropertyDescriptor::value(1)));
        assert!(!object.ordinary_define_own_property(&key("fixed"), PropertyDescriptor::value(2)));
        let make_configurable = PropertyDescriptor {
            configurable: Some(true),
            ..PropertyDescriptor::default()
        };
        assert!(!object.ordinary_define_own_property(&key("fixed"), make_configurable));
        let to_accessor = PropertyDescriptor {
            get: Some(Value::Undefined),
            ..PropertyDescriptor::default()
        };
        assert!(!object.ordinary_define_own_property(&key("fixed"), to_accessor));
    }

    #[test]
    fn test_configurable_data_becomes_accessor() {
        let object = JsObject::ordinary(None);
        object.insert("x", Property::data(1, true, true, true));
        let desc = PropertyDescriptor {
            get: Some(Value::Undefined),
            ..PropertyDescriptor::default()
        };
        assert!(object.ordinary_define_own_property(&key("x"), desc));
        match object.get_own_property(&key("x")) {
            Some(Property::Accessor {
                get: None,
                enumerable: true,
                configurable: true,
                ..
            }) => {}
            other => panic!("unexpected property {other:?}"),
        }
    }

    #[test]
    fn test_own_property_keys_order() {
        let object = JsObject::ordinary(None);
        let symbol = Symbol::new(None);
        object.insert("b", Property::plain(1));
        object.insert(symbol.clone(), Property::plain(2));
        object.insert("10", Property::plain(3));
        object.insert("a", Property::plain(4));
        object.insert("2", Property::plain(5));

        let keys = object.own_property_keys();
        assert_eq!(
            keys,
            vec![
                key("2"),
                key("10"),
                key("b"),
                key("a"),
                PropertyKey::Symbol(symbol)
            ]
        );
    }

    #[test]
    fn test_string_wrapper_exposes_indices() {
        let object = JsObject::new(None, ObjectClass::String(JsString::from("hi")));
        match object.get_own_property(&key("1")) {
            Some(Property::Data { value, writable, .. }) => {
                assert_eq!(value, Value::from("i"));
                assert!(!writable);
            }
            other => panic!("unexpected property {other:?}"),
        }
        assert!(object.get_own_property(&key("2")).is_none());
        assert!(!object.delete(&key("0")));
        assert_eq!(object.own_property_keys(), vec![key("0"), key("1")]);
    }

    #[test]
    fn test_delete_preserves_remaining_order() {
        let object = JsObject::ordinary(None);
        object.insert("a", Property::plain(1));
        object.insert("b", Property::plain(2));
        object.insert("c", Property::plain(3));
        assert!(object.delete(&key("b")));
        assert!(object.delete(&key("missing")));
        assert_eq!(object.own_property_keys(), vec![key("a"), key("c")]);
    }
}
