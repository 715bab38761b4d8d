//! Built-in objects and constructors.
//!
//! The realm allocates every intrinsic object first; [`initialize`] then
//! links constructors to their prototypes and lets each module install its
//! properties:
//! - Object, Function, Array, String, Number, Boolean, Symbol
//! - The Error family
//! - Array and string iterators
//! - Global functions and `console`

pub mod array;
pub mod boolean;
pub mod console;
pub mod error;
pub mod function;
pub mod global;
pub mod iterator;
pub mod number;
pub mod object;
pub mod string;
pub mod symbol;

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::function::{create_builtin_function, set_function_name};
use crate::runtime::object::{JsObject, NativeFunction};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::value::Value;

/// Links every constructor with its prototype and installs the built-in
/// properties.
pub fn initialize(intrinsics: &Intrinsics) {
    let pairs = [
        (&intrinsics.object, &intrinsics.object_prototype),
        (&intrinsics.function, &intrinsics.function_prototype),
        (&intrinsics.array, &intrinsics.array_prototype),
        (&intrinsics.string, &intrinsics.string_prototype),
        (&intrinsics.number, &intrinsics.number_prototype),
        (&intrinsics.boolean, &intrinsics.boolean_prototype),
        (&intrinsics.symbol, &intrinsics.symbol_prototype),
        (&intrinsics.error, &intrinsics.error_prototype),
        (&intrinsics.eval_error, &intrinsics.eval_error_prototype),
        (&intrinsics.range_error, &intrinsics.range_error_prototype),
        (&intrinsics.reference_error, &intrinsics.reference_error_prototype),
        (&intrinsics.syntax_error, &intrinsics.syntax_error_prototype),
        (&intrinsics.type_error, &intrinsics.type_error_prototype),
        (&intrinsics.uri_error, &intrinsics.uri_error_prototype),
    ];
    for (constructor, prototype) in pairs {
        link_constructor(constructor, prototype);
    }

    object::init(intrinsics);
    function::init(intrinsics);
    array::init(intrinsics);
    string::init(intrinsics);
    number::init(intrinsics);
    boolean::init(intrinsics);
    symbol::init(intrinsics);
    error::init(intrinsics);
    iterator::init(intrinsics);
}

/// `C.prototype` (fixed) and `C.prototype.constructor` (hidden).
fn link_constructor(constructor: &JsObject, prototype: &JsObject) {
    constructor.insert("prototype", Property::data(prototype.clone(), false, false, false));
    prototype.insert("constructor", Property::hidden(constructor.clone()));
}

// ============================================================================
// Installation helpers
// ============================================================================

/// Installs a built-in method as a hidden data property and returns it.
pub(crate) fn define_method(
    intrinsics: &Intrinsics,
    target: &JsObject,
    key: impl Into<PropertyKey>,
    native: NativeFunction,
    length: u32,
) -> JsObject {
    let key = key.into();
    let function = create_builtin_function(&intrinsics.function_prototype, native, key.clone(), length, false);
    target.insert(key, Property::hidden(function.clone()));
    function
}

/// Installs a configurable accessor with only a getter.
pub(crate) fn define_getter(
    intrinsics: &Intrinsics,
    target: &JsObject,
    key: impl Into<PropertyKey>,
    native: NativeFunction,
) {
    let key = key.into();
    let getter = create_builtin_function(&intrinsics.function_prototype, native, key.clone(), 0, false);
    set_function_name(&getter, &key, Some("get"));
    target.insert(
        key,
        Property::Accessor {
            get: Some(getter),
            set: None,
            enumerable: false,
            configurable: true,
        },
    );
}

/// Installs a non-writable, non-enumerable, non-configurable constant.
pub(crate) fn define_constant(target: &JsObject, key: impl Into<PropertyKey>, value: impl Into<Value>) {
    target.insert(key, Property::data(value, false, false, false));
}

/// The argument at `index`, or undefined.
pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// The `this` value as an object, or a TypeError naming `method`.
pub(crate) fn this_object(interp: &mut Interpreter, this: &Value, method: &str) -> Completion<JsObject> {
    match this {
        Value::Object(object) => Ok(object.clone()),
        other => Err(interp.type_error(format!(
            "{method} called on non-object {}",
            interp.describe(other)
        ))),
    }
}

/// Converts a relative index argument (negative counts from `length`)
/// into an absolute position clamped to `0..=length`.
pub(crate) fn relative_index(interp: &mut Interpreter, value: &Value, length: u64, default: u64) -> Completion<u64> {
    if value.is_undefined() {
        return Ok(default);
    }
    let relative = interp.to_integer_or_infinity(value)?;
    let length = length as f64;
    let index = if relative < 0.0 {
        (length + relative).max(0.0)
    } else {
        relative.min(length)
    };
    Ok(index as u64)
}
