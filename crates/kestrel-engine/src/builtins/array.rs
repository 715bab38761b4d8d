//! Array built-in object.
//!
//! Provides the Array constructor and prototype methods. The prototype
//! methods are generic: they work on any array-like `this` through `length`
//! and index-keyed properties, so holes and inherited elements behave as
//! they do on ordinary objects.

use std::cmp::Ordering;

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::to_boolean;
use crate::runtime::object::{IterationKind, JsObject};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::string::JsString;
use crate::runtime::symbol::well_known;
use crate::runtime::value::{Value, is_strictly_equal, same_value_zero};

use super::iterator::create_array_iterator;
use super::{arg, define_method, relative_index};

/// The largest valid array length.
const MAX_LENGTH: u64 = u32::MAX as u64;

pub(super) fn init(intrinsics: &Intrinsics) {
    let constructor = &intrinsics.array;
    define_method(intrinsics, constructor, "from", from, 1);
    define_method(intrinsics, constructor, "isArray", is_array, 1);
    define_method(intrinsics, constructor, "of", of, 0);

    let prototype = &intrinsics.array_prototype;
    define_method(intrinsics, prototype, "concat", concat, 1);
    define_method(intrinsics, prototype, "entries", entries, 0);
    define_method(intrinsics, prototype, "every", every, 1);
    define_method(intrinsics, prototype, "filter", filter, 1);
    define_method(intrinsics, prototype, "find", find, 1);
    define_method(intrinsics, prototype, "findIndex", find_index, 1);
    define_method(intrinsics, prototype, "forEach", for_each, 1);
    define_method(intrinsics, prototype, "includes", includes, 1);
    define_method(intrinsics, prototype, "indexOf", index_of, 1);
    define_method(intrinsics, prototype, "join", join, 1);
    define_method(intrinsics, prototype, "keys", keys, 0);
    define_method(intrinsics, prototype, "lastIndexOf", last_index_of, 1);
    define_method(intrinsics, prototype, "map", map, 1);
    define_method(intrinsics, prototype, "pop", pop, 0);
    define_method(intrinsics, prototype, "push", push, 1);
    define_method(intrinsics, prototype, "reduce", reduce, 1);
    define_method(intrinsics, prototype, "reverse", reverse, 0);
    define_method(intrinsics, prototype, "shift", shift, 0);
    define_method(intrinsics, prototype, "slice", slice, 2);
    define_method(intrinsics, prototype, "some", some, 1);
    define_method(intrinsics, prototype, "sort", sort, 1);
    define_method(intrinsics, prototype, "splice", splice, 2);
    define_method(intrinsics, prototype, "toString", to_string, 0);
    define_method(intrinsics, prototype, "unshift", unshift, 1);

    // `values` and @@iterator are the same function object
    let values = &intrinsics.array_prototype_values;
    prototype.insert("values", Property::hidden(values.clone()));
    prototype.insert(well_known().iterator.clone(), Property::hidden(values.clone()));
}

// ============================================================================
// Helpers
// ============================================================================

fn index_key(index: u64) -> PropertyKey {
    PropertyKey::from(index.to_string())
}

/// LengthOfArrayLike.
fn length_of(interp: &mut Interpreter, object: &JsObject) -> Completion<u64> {
    let length = interp.get(object, "length")?;
    interp.to_length(&length)
}

/// ArrayCreate with %Array.prototype%.
fn array_create(interp: &mut Interpreter, length: u64) -> Completion<JsObject> {
    if length > MAX_LENGTH {
        return Err(interp.range_error("Invalid array length"));
    }
    Ok(JsObject::array(interp.intrinsics().array_prototype.clone(), length as u32))
}

fn set_length(interp: &mut Interpreter, object: &JsObject, length: u64) -> Completion<()> {
    interp.set(object, "length", Value::Number(length as f64), true)
}

/// DeletePropertyOrThrow.
fn delete_or_throw(interp: &mut Interpreter, object: &JsObject, key: &PropertyKey) -> Completion<()> {
    if object.delete(key) {
        Ok(())
    } else {
        Err(interp.type_error(format!("Cannot delete property '{key}'")))
    }
}

/// Moves element `from` to `to`, deleting `to` when `from` is a hole.
fn move_element(interp: &mut Interpreter, object: &JsObject, from: u64, to: u64) -> Completion<()> {
    let from = index_key(from);
    let to = index_key(to);
    if object.has_property(&from) {
        let value = interp.get(object, from)?;
        interp.set(object, to, value, true)
    } else {
        delete_or_throw(interp, object, &to)
    }
}

fn callback(interp: &mut Interpreter, args: &[Value]) -> Completion<Value> {
    let function = arg(args, 0);
    if !function.is_callable() {
        return Err(interp.type_error(format!("{} is not a function", interp.describe(&function))));
    }
    Ok(function)
}

// ============================================================================
// Array Constructor
// ============================================================================

/// Array(...items) - Creates an array; a single number sets the length.
pub fn array_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let new_target = new_target.cloned().unwrap_or_else(|| interp.intrinsics().array.clone());
    let fallback = interp.intrinsics().array_prototype.clone();
    let prototype = interp.get_prototype_from_constructor(&new_target, fallback)?;
    match args {
        [] => Ok(Value::Object(JsObject::array(prototype, 0))),
        [Value::Number(length)] => {
            let int_length = interp.to_uint32(&Value::Number(*length))?;
            if f64::from(int_length) != *length {
                return Err(interp.range_error("Invalid array length"));
            }
            Ok(Value::Object(JsObject::array(prototype, int_length)))
        }
        items => {
            let array = JsObject::array(prototype, 0);
            for (index, item) in items.iter().enumerate() {
                array.create_data_property_or_throw(interp, &PropertyKey::from(index), item.clone())?;
            }
            Ok(Value::Object(array))
        }
    }
}

/// Array.isArray(arg)
pub fn is_array(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(arg(args, 0).as_object().is_some_and(JsObject::is_array)))
}

/// Array.of(...items)
pub fn of(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Object(interp.create_array_from_list(args.iter().cloned())))
}

/// Array.from(items, mapFn, thisArg) - Builds an array from an iterable or
/// array-like.
pub fn from(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let items = arg(args, 0);
    let map_fn = arg(args, 1);
    let this_arg = arg(args, 2);
    if !map_fn.is_undefined() && !map_fn.is_callable() {
        return Err(interp.type_error(format!("{} is not a function", interp.describe(&map_fn))));
    }

    let mut values = Vec::new();
    if interp.get_method(&items, well_known().iterator.clone())?.is_some() {
        let mut record = interp.get_iterator(&items)?;
        let mut index = 0usize;
        while let Some(value) = interp.iterator_step_value(&mut record)? {
            let value = if map_fn.is_undefined() {
                value
            } else {
                let mapped = interp.call(&map_fn, &this_arg, &[value, Value::from(index)]);
                match mapped {
                    Ok(mapped) => mapped,
                    Err(abrupt) => return interp.iterator_close(&record, Err(abrupt)),
                }
            };
            values.push(value);
            index += 1;
        }
    } else {
        let array_like = interp.to_object(&items)?;
        let length = length_of(interp, &array_like)?;
        for index in 0..length {
            let value = interp.get(&array_like, index_key(index))?;
            let value = if map_fn.is_undefined() {
                value
            } else {
                interp.call(&map_fn, &this_arg, &[value, Value::Number(index as f64)])?
            };
            values.push(value);
        }
    }
    Ok(Value::Object(interp.create_array_from_list(values)))
}

// ============================================================================
// Array.prototype Methods
// ============================================================================

/// Array.prototype.concat(...items)
pub fn concat(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let result = array_create(interp, 0)?;
    let mut n = 0u64;
    let items = std::iter::once(Value::Object(object)).chain(args.iter().cloned());
    for item in items {
        match item.as_object().filter(|object| object.is_array()) {
            Some(spread) => {
                let length = length_of(interp, spread)?;
                if n + length > MAX_LENGTH {
                    return Err(interp.type_error("Array length exceeds the maximum"));
                }
                for k in 0..length {
                    let key = index_key(k);
                    if spread.has_property(&key) {
                        let value = interp.get(spread, key)?;
                        result.create_data_property_or_throw(interp, &index_key(n), value)?;
                    }
                    n += 1;
                }
            }
            None => {
                result.create_data_property_or_throw(interp, &index_key(n), item.clone())?;
                n += 1;
            }
        }
    }
    set_length(interp, &result, n)?;
    Ok(Value::Object(result))
}

/// Array.prototype.entries()
pub fn entries(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    Ok(Value::Object(create_array_iterator(interp, object, IterationKind::Entries)))
}

/// Array.prototype.keys()
pub fn keys(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    Ok(Value::Object(create_array_iterator(interp, object, IterationKind::Keys)))
}

/// Array.prototype.values() / Array.prototype[@@iterator]()
pub fn values(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    Ok(Value::Object(create_array_iterator(interp, object, IterationKind::Values)))
}

/// What a callback-driven scan reports.
enum Scan {
    /// Stop at the first truthy callback result
    FirstTruthy,
    /// Stop at the first falsy callback result
    FirstFalsy,
    /// Visit everything
    All,
}

/// Calls `callback(element, index, object)` for each element; holes are
/// skipped unless `visit_holes`. Returns the index where the scan stopped
/// and the element seen there.
fn scan(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    mode: Scan,
    visit_holes: bool,
    mut each: impl FnMut(&mut Interpreter, u64, &Value, &Value) -> Completion<()>,
) -> Completion<Option<(u64, Value)>> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let function = callback(interp, args)?;
    let this_arg = arg(args, 1);
    for k in 0..length {
        let key = index_key(k);
        if !visit_holes && !object.has_property(&key) {
            continue;
        }
        let value = interp.get(&object, key)?;
        let result = interp.call(
            &function,
            &this_arg,
            &[value.clone(), Value::Number(k as f64), Value::Object(object.clone())],
        )?;
        each(interp, k, &value, &result)?;
        let stop = match mode {
            Scan::FirstTruthy => to_boolean(&result),
            Scan::FirstFalsy => !to_boolean(&result),
            Scan::All => false,
        };
        if stop {
            return Ok(Some((k, value)));
        }
    }
    Ok(None)
}

/// Array.prototype.every(callback, thisArg)
pub fn every(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let stopped = scan(interp, this, args, Scan::FirstFalsy, false, |_, _, _, _| Ok(()))?;
    Ok(Value::Boolean(stopped.is_none()))
}

/// Array.prototype.some(callback, thisArg)
pub fn some(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let stopped = scan(interp, this, args, Scan::FirstTruthy, false, |_, _, _, _| Ok(()))?;
    Ok(Value::Boolean(stopped.is_some()))
}

/// Array.prototype.find(predicate, thisArg)
pub fn find(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let stopped = scan(interp, this, args, Scan::FirstTruthy, true, |_, _, _, _| Ok(()))?;
    Ok(stopped.map(|(_, value)| value).unwrap_or_default())
}

/// Array.prototype.findIndex(predicate, thisArg)
pub fn find_index(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let stopped = scan(interp, this, args, Scan::FirstTruthy, true, |_, _, _, _| Ok(()))?;
    Ok(Value::Number(stopped.map_or(-1.0, |(index, _)| index as f64)))
}

/// Array.prototype.forEach(callback, thisArg)
pub fn for_each(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    scan(interp, this, args, Scan::All, false, |_, _, _, _| Ok(()))?;
    Ok(Value::Undefined)
}

/// Array.prototype.filter(callback, thisArg)
pub fn filter(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let mut kept = Vec::new();
    scan(interp, this, args, Scan::All, false, |_, _, value, result| {
        if to_boolean(result) {
            kept.push(value.clone());
        }
        Ok(())
    })?;
    Ok(Value::Object(interp.create_array_from_list(kept)))
}

/// Array.prototype.map(callback, thisArg)
pub fn map(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let result = array_create(interp, length)?;
    scan(interp, this, args, Scan::All, false, |interp, index, _, mapped| {
        result.create_data_property_or_throw(interp, &index_key(index), mapped.clone())
    })?;
    Ok(Value::Object(result))
}

/// Array.prototype.reduce(callback, initialValue)
pub fn reduce(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let function = callback(interp, args)?;
    let mut k = 0;
    let mut accumulator = if args.len() >= 2 {
        arg(args, 1)
    } else {
        loop {
            if k >= length {
                return Err(interp.type_error("Reduce of empty array with no initial value"));
            }
            let key = index_key(k);
            k += 1;
            if object.has_property(&key) {
                break interp.get(&object, key)?;
            }
        }
    };
    while k < length {
        let key = index_key(k);
        if object.has_property(&key) {
            let value = interp.get(&object, key)?;
            accumulator = interp.call(
                &function,
                &Value::Undefined,
                &[accumulator, value, Value::Number(k as f64), Value::Object(object.clone())],
            )?;
        }
        k += 1;
    }
    Ok(accumulator)
}

/// Array.prototype.includes(searchElement, fromIndex) - SameValueZero.
pub fn includes(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    if length == 0 {
        return Ok(Value::Boolean(false));
    }
    let start = relative_index(interp, &arg(args, 1), length, 0)?;
    let target = arg(args, 0);
    for k in start..length {
        let value = interp.get(&object, index_key(k))?;
        if same_value_zero(&value, &target) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

/// Array.prototype.indexOf(searchElement, fromIndex) - strict equality,
/// holes skipped.
pub fn index_of(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    if length == 0 {
        return Ok(Value::Number(-1.0));
    }
    let start = relative_index(interp, &arg(args, 1), length, 0)?;
    let target = arg(args, 0);
    for k in start..length {
        let key = index_key(k);
        if object.has_property(&key) && is_strictly_equal(&interp.get(&object, key)?, &target) {
            return Ok(Value::Number(k as f64));
        }
    }
    Ok(Value::Number(-1.0))
}

/// Array.prototype.lastIndexOf(searchElement, fromIndex)
pub fn last_index_of(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    if length == 0 {
        return Ok(Value::Number(-1.0));
    }
    let from = if args.len() >= 2 {
        let n = interp.to_integer_or_infinity(&args[1])?;
        if n == f64::NEG_INFINITY {
            return Ok(Value::Number(-1.0));
        }
        if n >= 0.0 {
            n.min(length as f64 - 1.0)
        } else {
            length as f64 + n
        }
    } else {
        length as f64 - 1.0
    };
    if from < 0.0 {
        return Ok(Value::Number(-1.0));
    }
    let target = arg(args, 0);
    for k in (0..=from as u64).rev() {
        let key = index_key(k);
        if object.has_property(&key) && is_strictly_equal(&interp.get(&object, key)?, &target) {
            return Ok(Value::Number(k as f64));
        }
    }
    Ok(Value::Number(-1.0))
}

/// Array.prototype.join(separator) - Joins elements with a separator;
/// undefined and null become empty strings.
pub fn join(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let separator = match arg(args, 0) {
        Value::Undefined => JsString::from(","),
        other => interp.to_string(&other)?,
    };
    let mut parts = Vec::with_capacity(length.min(1 << 16) as usize);
    for k in 0..length {
        let element = interp.get(&object, index_key(k))?;
        parts.push(match element {
            Value::Undefined | Value::Null => JsString::empty(),
            other => interp.to_string(&other)?,
        });
    }
    Ok(Value::String(JsString::join(&parts, &separator)))
}

/// Array.prototype.toString() - Calls `join`, falling back to
/// Object.prototype.toString.
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let join = interp.get(&object, "join")?;
    if join.is_callable() {
        return interp.call(&join, &Value::Object(object), &[]);
    }
    super::object::to_string(interp, &Value::Object(object), &[], new_target)
}

/// Array.prototype.pop()
pub fn pop(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    if length == 0 {
        set_length(interp, &object, 0)?;
        return Ok(Value::Undefined);
    }
    let key = index_key(length - 1);
    let element = interp.get(&object, key.clone())?;
    delete_or_throw(interp, &object, &key)?;
    set_length(interp, &object, length - 1)?;
    Ok(element)
}

/// Array.prototype.push(...items) - Returns the new length.
pub fn push(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let mut length = length_of(interp, &object)?;
    if length + args.len() as u64 > (1u64 << 53) - 1 {
        return Err(interp.type_error("Pushing elements past the maximum array-like length"));
    }
    for item in args {
        interp.set(&object, index_key(length), item.clone(), true)?;
        length += 1;
    }
    set_length(interp, &object, length)?;
    Ok(Value::Number(length as f64))
}

/// Array.prototype.reverse()
pub fn reverse(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let middle = length / 2;
    let mut lower = 0;
    while lower != middle {
        let upper = length - lower - 1;
        let (lower_key, upper_key) = (index_key(lower), index_key(upper));
        let lower_exists = object.has_property(&lower_key);
        let lower_value = if lower_exists {
            interp.get(&object, lower_key.clone())?
        } else {
            Value::Undefined
        };
        let upper_exists = object.has_property(&upper_key);
        let upper_value = if upper_exists {
            interp.get(&object, upper_key.clone())?
        } else {
            Value::Undefined
        };
        match (lower_exists, upper_exists) {
            (true, true) => {
                interp.set(&object, lower_key, upper_value, true)?;
                interp.set(&object, upper_key, lower_value, true)?;
            }
            (false, true) => {
                interp.set(&object, lower_key, upper_value, true)?;
                delete_or_throw(interp, &object, &upper_key)?;
            }
            (true, false) => {
                delete_or_throw(interp, &object, &lower_key)?;
                interp.set(&object, upper_key, lower_value, true)?;
            }
            (false, false) => {}
        }
        lower += 1;
    }
    Ok(Value::Object(object))
}

/// Array.prototype.shift()
pub fn shift(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    if length == 0 {
        set_length(interp, &object, 0)?;
        return Ok(Value::Undefined);
    }
    let first = interp.get(&object, index_key(0))?;
    for k in 1..length {
        move_element(interp, &object, k, k - 1)?;
    }
    delete_or_throw(interp, &object, &index_key(length - 1))?;
    set_length(interp, &object, length - 1)?;
    Ok(first)
}

/// Array.prototype.unshift(...items) - Returns the new length.
pub fn unshift(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let count = args.len() as u64;
    if count > 0 {
        for k in (0..length).rev() {
            move_element(interp, &object, k, k + count)?;
        }
        for (j, item) in args.iter().enumerate() {
            interp.set(&object, index_key(j as u64), item.clone(), true)?;
        }
    }
    set_length(interp, &object, length + count)?;
    Ok(Value::Number((length + count) as f64))
}

/// Array.prototype.slice(start, end)
pub fn slice(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let start = relative_index(interp, &arg(args, 0), length, 0)?;
    let end = relative_index(interp, &arg(args, 1), length, length)?;
    let count = end.saturating_sub(start);
    let result = array_create(interp, count)?;
    let mut n = 0;
    for k in start..end {
        let key = index_key(k);
        if object.has_property(&key) {
            let value = interp.get(&object, key)?;
            result.create_data_property_or_throw(interp, &index_key(n), value)?;
        }
        n += 1;
    }
    set_length(interp, &result, n)?;
    Ok(Value::Object(result))
}

/// Array.prototype.splice(start, deleteCount, ...items) - Returns the
/// removed elements.
pub fn splice(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;
    let start = relative_index(interp, &arg(args, 0), length, 0)?;
    let items = args.get(2..).unwrap_or_default();
    let item_count = items.len() as u64;
    let delete_count = match args.len() {
        0 => 0,
        1 => length - start,
        _ => {
            let count = interp.to_integer_or_infinity(&args[1])?;
            count.clamp(0.0, (length - start) as f64) as u64
        }
    };

    let removed = array_create(interp, delete_count)?;
    for k in 0..delete_count {
        let key = index_key(start + k);
        if object.has_property(&key) {
            let value = interp.get(&object, key)?;
            removed.create_data_property_or_throw(interp, &index_key(k), value)?;
        }
    }
    set_length(interp, &removed, delete_count)?;

    if item_count < delete_count {
        for k in start..(length - delete_count) {
            move_element(interp, &object, k + delete_count, k + item_count)?;
        }
        let mut k = length;
        while k > length - delete_count + item_count {
            delete_or_throw(interp, &object, &index_key(k - 1))?;
            k -= 1;
        }
    } else if item_count > delete_count {
        let mut k = length - delete_count;
        while k > start {
            move_element(interp, &object, k + delete_count - 1, k + item_count - 1)?;
            k -= 1;
        }
    }
    for (j, item) in items.iter().enumerate() {
        interp.set(&object, index_key(start + j as u64), item.clone(), true)?;
    }
    set_length(interp, &object, length - delete_count + item_count)?;
    Ok(Value::Object(removed))
}

/// Array.prototype.sort(comparefn) - Stable sort; undefined elements go
/// last and holes after them.
pub fn sort(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let compare = arg(args, 0);
    if !compare.is_undefined() && !compare.is_callable() {
        return Err(interp.type_error("The comparison function must be either a function or undefined"));
    }
    let object = interp.to_object(this)?;
    let length = length_of(interp, &object)?;

    let mut items = Vec::new();
    let mut undefined_count = 0u64;
    for k in 0..length {
        let key = index_key(k);
        if object.has_property(&key) {
            match interp.get(&object, key)? {
                Value::Undefined => undefined_count += 1,
                value => items.push(value),
            }
        }
    }
    let sorted = merge_sort(interp, items, &compare)?;

    let mut k = 0u64;
    for value in sorted {
        interp.set(&object, index_key(k), value, true)?;
        k += 1;
    }
    for _ in 0..undefined_count {
        interp.set(&object, index_key(k), Value::Undefined, true)?;
        k += 1;
    }
    while k < length {
        delete_or_throw(interp, &object, &index_key(k))?;
        k += 1;
    }
    Ok(Value::Object(object))
}

/// SortCompare for two defined values.
fn sort_compare(interp: &mut Interpreter, compare: &Value, x: &Value, y: &Value) -> Completion<Ordering> {
    if compare.is_undefined() {
        let x = interp.to_string(x)?;
        let y = interp.to_string(y)?;
        return Ok(x.cmp(&y));
    }
    let result = interp.call(compare, &Value::Undefined, &[x.clone(), y.clone()])?;
    let n = interp.to_number(&result)?;
    Ok(if n < 0.0 {
        Ordering::Less
    } else if n > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    })
}

/// A stable merge sort whose comparator may fail.
fn merge_sort(interp: &mut Interpreter, items: Vec<Value>, compare: &Value) -> Completion<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(interp, left, compare)?;
    let right = merge_sort(interp, right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        if sort_compare(interp, compare, r, l)? == Ordering::Less {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    fn array_of(interp: &Interpreter, values: &[i32]) -> Value {
        Value::Object(interp.create_array_from_list(values.iter().map(|&n| Value::from(n))))
    }

    fn joined(interp: &mut Interpreter, value: &Value) -> Option<Value> {
        join(interp, value, &[], None).ok()
    }

    #[test]
    fn test_constructor_with_length() {
        let mut interp = interpreter();
        let Ok(Value::Object(array)) = array_constructor(&mut interp, &Value::Undefined, &[Value::from(3)], None)
        else {
            panic!("Array(3) failed");
        };
        assert_eq!(array.array_length_state().0, 3);
        assert!(!array.has_own_property(&PropertyKey::from("0")));
        let invalid = array_constructor(&mut interp, &Value::Undefined, &[Value::from(-1)], None);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_push_pop_shift_unshift() {
        let mut interp = interpreter();
        let array = array_of(&interp, &[1, 2]);
        assert_eq!(push(&mut interp, &array, &[Value::from(3)], None).ok(), Some(Value::from(3)));
        assert_eq!(pop(&mut interp, &array, &[], None).ok(), Some(Value::from(3)));
        assert_eq!(shift(&mut interp, &array, &[], None).ok(), Some(Value::from(1)));
        assert_eq!(unshift(&mut interp, &array, &[Value::from(0)], None).ok(), Some(Value::from(2)));
        assert_eq!(joined(&mut interp, &array), Some(Value::from("0,2")));
    }

    #[test]
    fn test_splice_removes_and_inserts() {
        let mut interp = interpreter();
        let array = array_of(&interp, &[1, 2, 3, 4]);
        let removed = splice(
            &mut interp,
            &array,
            &[Value::from(1), Value::from(2), Value::from(9)],
            None,
        )
        .ok();
        let removed = removed.unwrap_or_default();
        assert_eq!(joined(&mut interp, &removed), Some(Value::from("2,3")));
        assert_eq!(joined(&mut interp, &array), Some(Value::from("1,9,4")));
    }

    #[test]
    fn test_slice_with_negative_start() {
        let mut interp = interpreter();
        let array = array_of(&interp, &[1, 2, 3, 4]);
        let sliced = slice(&mut interp, &array, &[Value::from(-2)], None).unwrap_or_default();
        assert_eq!(joined(&mut interp, &sliced), Some(Value::from("3,4")));
    }

    #[test]
    fn test_default_sort_is_lexicographic() {
        let mut interp = interpreter();
        let array = array_of(&interp, &[10, 9, 1, 100]);
        assert!(sort(&mut interp, &array, &[], None).is_ok());
        assert_eq!(joined(&mut interp, &array), Some(Value::from("1,10,100,9")));
    }

    #[test]
    fn test_reverse_and_index_of() {
        let mut interp = interpreter();
        let array = array_of(&interp, &[1, 2, 3]);
        assert!(reverse(&mut interp, &array, &[], None).is_ok());
        assert_eq!(joined(&mut interp, &array), Some(Value::from("3,2,1")));
        assert_eq!(
            index_of(&mut interp, &array, &[Value::from(1)], None).ok(),
            Some(Value::from(2))
        );
        assert_eq!(
            last_index_of(&mut interp, &array, &[Value::from(7)], None).ok(),
            Some(Value::from(-1))
        );
    }

    #[test]
    fn test_includes_finds_nan() {
        let mut interp = interpreter();
        let array = Value::Object(interp.create_array_from_list([Value::Number(f64::NAN)]));
        assert_eq!(
            includes(&mut interp, &array, &[Value::Number(f64::NAN)], None).ok(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            index_of(&mut interp, &array, &[Value::Number(f64::NAN)], None).ok(),
            Some(Value::from(-1))
        );
    }
}
