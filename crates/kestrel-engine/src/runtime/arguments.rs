//! Arguments exotic objects.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Name;
use crate::interpreter::Interpreter;

use super::environment::Environment;
use super::object::{JsObject, ObjectClass};
use super::property::Property;
use super::symbol::well_known;
use super::value::Value;

/// `[[ParameterMap]]`: links argument indices to the parameter bindings of
/// a sloppy function with simple parameters.
pub struct ParameterMap {
    env: Environment,
    names: RefCell<FxHashMap<u32, Name>>,
}

impl ParameterMap {
    /// The current value of the parameter mapped at `index`.
    pub fn get(&self, index: u32) -> Option<Value> {
        let names = self.names.borrow();
        let name = names.get(&index)?;
        self.env.declarative()?.binding_value(name)
    }

    /// Writes through to the parameter mapped at `index`.
    pub fn set(&self, index: u32, value: Value) {
        let names = self.names.borrow();
        if let Some(name) = names.get(&index)
            && let Some(record) = self.env.declarative()
        {
            record.set_binding_value(name, value);
        }
    }

    /// Breaks the link for `index`.
    pub fn remove(&self, index: u32) {
        self.names.borrow_mut().remove(&index);
    }

    /// Whether `index` is still linked.
    pub fn contains(&self, index: u32) -> bool {
        self.names.borrow().contains_key(&index)
    }
}

fn arguments_object(interp: &Interpreter, map: Option<Rc<ParameterMap>>, args: &[Value]) -> JsObject {
    let intrinsics = &interp.realm().intrinsics;
    let object = JsObject::new(
        Some(intrinsics.object_prototype.clone()),
        ObjectClass::Arguments(map),
    );
    object.insert("length", Property::hidden(args.len()));
    for (index, value) in args.iter().enumerate() {
        object.insert(index, Property::plain(value.clone()));
    }
    object.insert(
        well_known().iterator.clone(),
        Property::hidden(intrinsics.array_prototype_values.clone()),
    );
    object
}

/// CreateUnmappedArgumentsObject.
pub fn create_unmapped_arguments_object(interp: &Interpreter, args: &[Value]) -> JsObject {
    let object = arguments_object(interp, None, args);
    let thrower = interp.realm().intrinsics.throw_type_error.clone();
    object.insert(
        "callee",
        Property::Accessor {
            get: Some(thrower.clone()),
            set: Some(thrower),
            enumerable: false,
            configurable: false,
        },
    );
    object
}

/// CreateMappedArgumentsObject. Later parameters with the same name win.
pub fn create_mapped_arguments_object(
    interp: &Interpreter,
    function: &JsObject,
    formals: &[Name],
    args: &[Value],
    env: &Environment,
) -> JsObject {
    let mut names = FxHashMap::default();
    let mut mapped: Vec<&Name> = Vec::new();
    for (index, name) in formals.iter().enumerate().rev() {
        if mapped.contains(&name) {
            continue;
        }
        mapped.push(name);
        if index < args.len() {
            names.insert(index as u32, name.clone());
        }
    }
    let map = ParameterMap {
        env: env.clone(),
        names: RefCell::new(names),
    };
    let object = arguments_object(interp, Some(Rc::new(map)), args);
    object.insert("callee", Property::hidden(function.clone()));
    object
}

