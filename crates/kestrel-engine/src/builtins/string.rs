//! String built-in object.
//!
//! Provides the String constructor and prototype methods. Positions and
//! lengths are measured in UTF-16 code units.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::is_js_whitespace;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::realm::Intrinsics;
use crate::runtime::string::JsString;
use crate::runtime::symbol::well_known;
use crate::runtime::value::Value;

use super::iterator::create_string_iterator;
use super::{arg, define_method, relative_index};

/// Strings longer than this are a RangeError.
const MAX_STRING_LENGTH: u64 = 1 << 30;

pub(super) fn init(intrinsics: &Intrinsics) {
    define_method(intrinsics, &intrinsics.string, "fromCharCode", from_char_code, 1);

    let prototype = &intrinsics.string_prototype;
    define_method(intrinsics, prototype, "at", at, 1);
    define_method(intrinsics, prototype, "charAt", char_at, 1);
    define_method(intrinsics, prototype, "charCodeAt", char_code_at, 1);
    define_method(intrinsics, prototype, "concat", concat, 1);
    define_method(intrinsics, prototype, "endsWith", ends_with, 1);
    define_method(intrinsics, prototype, "includes", includes, 1);
    define_method(intrinsics, prototype, "indexOf", index_of, 1);
    define_method(intrinsics, prototype, "lastIndexOf", last_index_of, 1);
    define_method(intrinsics, prototype, "padEnd", pad_end, 1);
    define_method(intrinsics, prototype, "padStart", pad_start, 1);
    define_method(intrinsics, prototype, "repeat", repeat, 1);
    define_method(intrinsics, prototype, "slice", slice, 2);
    define_method(intrinsics, prototype, "split", split, 2);
    define_method(intrinsics, prototype, "startsWith", starts_with, 1);
    define_method(intrinsics, prototype, "substring", substring, 2);
    define_method(intrinsics, prototype, "toLowerCase", to_lower_case, 0);
    define_method(intrinsics, prototype, "toString", to_string, 0);
    define_method(intrinsics, prototype, "toUpperCase", to_upper_case, 0);
    define_method(intrinsics, prototype, "trim", trim, 0);
    define_method(intrinsics, prototype, "trimEnd", trim_end, 0);
    define_method(intrinsics, prototype, "trimStart", trim_start, 0);
    define_method(intrinsics, prototype, "valueOf", value_of, 0);
    define_method(intrinsics, prototype, well_known().iterator.clone(), iterator, 0);
}

// ============================================================================
// Helpers
// ============================================================================

/// RequireObjectCoercible(this) followed by ToString.
fn coerced_this(interp: &mut Interpreter, this: &Value) -> Completion<JsString> {
    interp.require_object_coercible(this)?;
    interp.to_string(this)
}

/// thisStringValue: a string primitive or a String wrapper.
fn this_string_value(interp: &mut Interpreter, this: &Value, method: &str) -> Completion<JsString> {
    match this {
        Value::String(s) => return Ok(s.clone()),
        Value::Object(object) => {
            if let ObjectClass::String(s) = &*object.class() {
                return Ok(s.clone());
            }
        }
        _ => {}
    }
    Err(interp.type_error(format!("{method} requires that 'this' be a String")))
}

/// The first index of `needle` in `haystack` at or after `from`.
fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

/// Clamps a ToIntegerOrInfinity result to `0..=length`.
fn clamp_position(position: f64, length: usize) -> usize {
    position.clamp(0.0, length as f64) as usize
}

fn trim_units(units: &[u16], start: bool, end: bool) -> JsString {
    // Every JS whitespace character is in the BMP
    let is_space = |unit: &u16| char::from_u32(u32::from(*unit)).is_some_and(is_js_whitespace);
    let mut lo = 0;
    let mut hi = units.len();
    if start {
        while lo < hi && is_space(&units[lo]) {
            lo += 1;
        }
    }
    if end {
        while hi > lo && is_space(&units[hi - 1]) {
            hi -= 1;
        }
    }
    JsString::from_code_units(&units[lo..hi])
}

/// Maps every code point through `convert`, leaving lone surrogates as they
/// are.
fn map_case<I>(s: &JsString, convert: impl Fn(char) -> I) -> JsString
where
    I: Iterator<Item = char>,
{
    let mut units = Vec::with_capacity(s.len());
    let mut buffer = [0; 2];
    for decoded in char::decode_utf16(s.code_units().iter().copied()) {
        match decoded {
            Ok(ch) => {
                for mapped in convert(ch) {
                    units.extend_from_slice(mapped.encode_utf16(&mut buffer));
                }
            }
            Err(error) => units.push(error.unpaired_surrogate()),
        }
    }
    JsString::from(units)
}

// ============================================================================
// String Constructor
// ============================================================================

/// String(value) - Converts to a string, or creates a String object when
/// called with `new`.
pub fn string_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let value = match args.first() {
        None => JsString::empty(),
        Some(Value::Symbol(symbol)) if new_target.is_none() => {
            return Ok(Value::from(symbol.descriptive_string()));
        }
        Some(value) => interp.to_string(value)?,
    };
    let Some(new_target) = new_target else {
        return Ok(Value::String(value));
    };
    let fallback = interp.intrinsics().string_prototype.clone();
    let prototype = interp.get_prototype_from_constructor(new_target, fallback)?;
    let object = interp.string_object(value);
    object.set_prototype_of(Some(prototype));
    Ok(Value::Object(object))
}

/// String.fromCharCode(...codes) - Builds a string from UTF-16 code units.
pub fn from_char_code(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let mut units = Vec::with_capacity(args.len());
    for code in args {
        units.push(interp.to_uint32(code)? as u16);
    }
    Ok(Value::String(JsString::from_code_units(&units)))
}

// ============================================================================
// String.prototype Methods
// ============================================================================

/// String.prototype.toString() - Returns the string value.
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    this_string_value(interp, this, "String.prototype.toString").map(Value::String)
}

/// String.prototype.valueOf() - Returns the string value.
pub fn value_of(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    this_string_value(interp, this, "String.prototype.valueOf").map(Value::String)
}

/// String.prototype.at(index) - Negative indices count from the end.
pub fn at(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let length = s.len() as f64;
    let relative = interp.to_integer_or_infinity(&arg(args, 0))?;
    let index = if relative >= 0.0 { relative } else { length + relative };
    if index < 0.0 || index >= length {
        return Ok(Value::Undefined);
    }
    let index = index as usize;
    Ok(Value::String(s.substring(index, index + 1)))
}

/// String.prototype.charAt(pos) - Returns the code unit at a position as a
/// string, or "" when out of range.
pub fn char_at(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let position = interp.to_integer_or_infinity(&arg(args, 0))?;
    if position < 0.0 || position >= s.len() as f64 {
        return Ok(Value::String(JsString::empty()));
    }
    let position = position as usize;
    Ok(Value::String(s.substring(position, position + 1)))
}

/// String.prototype.charCodeAt(pos) - Returns the code unit at a position,
/// or NaN when out of range.
pub fn char_code_at(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let position = interp.to_integer_or_infinity(&arg(args, 0))?;
    if position < 0.0 || position >= s.len() as f64 {
        return Ok(Value::Number(f64::NAN));
    }
    let unit = s.code_unit_at(position as usize);
    Ok(Value::Number(unit.map_or(f64::NAN, f64::from)))
}

/// String.prototype.concat(...strings)
pub fn concat(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let mut result = coerced_this(interp, this)?;
    for next in args {
        let next = interp.to_string(next)?;
        result = result.concat(&next);
    }
    Ok(Value::String(result))
}

/// String.prototype.indexOf(searchString, position)
pub fn index_of(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let search = interp.to_string(&arg(args, 0))?;
    let position = interp.to_integer_or_infinity(&arg(args, 1))?;
    let units = s.code_units();
    let start = clamp_position(position, units.len());
    let found = find_units(&units, &search.code_units(), start);
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

/// String.prototype.lastIndexOf(searchString, position)
pub fn last_index_of(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let search = interp.to_string(&arg(args, 0))?;
    let position = interp.to_number(&arg(args, 1))?;
    let position = if position.is_nan() {
        f64::INFINITY
    } else {
        position.trunc()
    };
    let units = s.code_units();
    let needle = search.code_units();
    if needle.len() > units.len() {
        return Ok(Value::Number(-1.0));
    }
    let start = clamp_position(position, units.len()).min(units.len() - needle.len());
    let found = (0..=start).rev().find(|&i| units[i..].starts_with(&needle));
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

/// String.prototype.includes(searchString, position)
pub fn includes(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let found = index_of(interp, this, args, new_target)?;
    Ok(Value::Boolean(found != Value::Number(-1.0)))
}

/// String.prototype.startsWith(searchString, position)
pub fn starts_with(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let search = interp.to_string(&arg(args, 0))?;
    let position = interp.to_integer_or_infinity(&arg(args, 1))?;
    let units = s.code_units();
    let start = clamp_position(position, units.len());
    Ok(Value::Boolean(units[start..].starts_with(&search.code_units())))
}

/// String.prototype.endsWith(searchString, endPosition)
pub fn ends_with(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let search = interp.to_string(&arg(args, 0))?;
    let units = s.code_units();
    let end = match arg(args, 1) {
        Value::Undefined => units.len(),
        position => {
            let position = interp.to_integer_or_infinity(&position)?;
            clamp_position(position, units.len())
        }
    };
    Ok(Value::Boolean(units[..end].ends_with(&search.code_units())))
}

/// String.prototype.slice(start, end) - Negative positions count from the
/// end.
pub fn slice(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let length = s.len() as u64;
    let from = relative_index(interp, &arg(args, 0), length, 0)?;
    let to = relative_index(interp, &arg(args, 1), length, length)?;
    if from >= to {
        return Ok(Value::String(JsString::empty()));
    }
    Ok(Value::String(s.substring(from as usize, to as usize)))
}

/// String.prototype.substring(start, end) - Clamps both positions and
/// swaps them when reversed.
pub fn substring(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let length = s.len();
    let start = interp.to_integer_or_infinity(&arg(args, 0))?;
    let end = match arg(args, 1) {
        Value::Undefined => length,
        end => clamp_position(interp.to_integer_or_infinity(&end)?, length),
    };
    let start = clamp_position(start, length);
    Ok(Value::String(s.substring(start.min(end), start.max(end))))
}

/// String.prototype.toLowerCase()
pub fn to_lower_case(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::String(map_case(&s, char::to_lowercase)))
}

/// String.prototype.toUpperCase()
pub fn to_upper_case(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::String(map_case(&s, char::to_uppercase)))
}

/// String.prototype.trim() - Removes leading and trailing whitespace and
/// line terminators.
pub fn trim(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::String(trim_units(&s.code_units(), true, true)))
}

/// String.prototype.trimStart()
pub fn trim_start(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::String(trim_units(&s.code_units(), true, false)))
}

/// String.prototype.trimEnd()
pub fn trim_end(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::String(trim_units(&s.code_units(), false, true)))
}

/// String.prototype.split(separator, limit) - Splits on a string separator;
/// an empty separator splits into code units.
pub fn split(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let limit = match arg(args, 1) {
        Value::Undefined => u32::MAX,
        limit => interp.to_uint32(&limit)?,
    } as usize;
    let separator = arg(args, 0);
    let separator = if separator.is_undefined() {
        None
    } else {
        Some(interp.to_string(&separator)?)
    };
    if limit == 0 {
        return Ok(Value::Object(interp.create_array_from_list(Vec::new())));
    }
    let Some(separator) = separator else {
        return Ok(Value::Object(interp.create_array_from_list([Value::String(s)])));
    };

    let units = s.code_units();
    let needle = separator.code_units();
    let mut parts = Vec::new();
    if needle.is_empty() {
        parts.extend(
            units
                .iter()
                .take(limit)
                .map(|unit| Value::String(JsString::from_code_units(&[*unit]))),
        );
        return Ok(Value::Object(interp.create_array_from_list(parts)));
    }
    if units.is_empty() {
        return Ok(Value::Object(interp.create_array_from_list([Value::String(s)])));
    }

    let mut start = 0;
    while let Some(found) = find_units(&units, &needle, start) {
        parts.push(Value::String(JsString::from_code_units(&units[start..found])));
        if parts.len() >= limit {
            return Ok(Value::Object(interp.create_array_from_list(parts)));
        }
        start = found + needle.len();
    }
    parts.push(Value::String(JsString::from_code_units(&units[start..])));
    Ok(Value::Object(interp.create_array_from_list(parts)))
}

/// String.prototype.repeat(count)
pub fn repeat(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let count = interp.to_integer_or_infinity(&arg(args, 0))?;
    if count < 0.0 || count == f64::INFINITY {
        return Err(interp.range_error(format!("Invalid count value: {count}")));
    }
    if count == 0.0 || s.is_empty() {
        return Ok(Value::String(JsString::empty()));
    }
    if s.len() as f64 * count > MAX_STRING_LENGTH as f64 {
        return Err(interp.range_error("Invalid string length"));
    }
    Ok(Value::String(JsString::from(s.code_units().repeat(count as usize))))
}

/// StringPad: fills to `maxLength` code units on one side.
fn pad(interp: &mut Interpreter, this: &Value, args: &[Value], at_start: bool) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    let max_length = interp.to_length(&arg(args, 0))?;
    let length = s.len() as u64;
    if max_length <= length {
        return Ok(Value::String(s));
    }
    let filler = match arg(args, 1) {
        Value::Undefined => JsString::from(" "),
        filler => interp.to_string(&filler)?,
    };
    if filler.is_empty() {
        return Ok(Value::String(s));
    }
    if max_length > MAX_STRING_LENGTH {
        return Err(interp.range_error("Invalid string length"));
    }
    let fill_length = (max_length - length) as usize;
    let fill: Vec<u16> = filler.code_units().iter().copied().cycle().take(fill_length).collect();
    let fill = JsString::from_code_units(&fill);
    Ok(Value::String(if at_start {
        fill.concat(&s)
    } else {
        s.concat(&fill)
    }))
}

/// String.prototype.padStart(maxLength, fillString)
pub fn pad_start(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    pad(interp, this, args, true)
}

/// String.prototype.padEnd(maxLength, fillString)
pub fn pad_end(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    pad(interp, this, args, false)
}

/// String.prototype[@@iterator]() - Iterates code points.
pub fn iterator(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let s = coerced_this(interp, this)?;
    Ok(Value::Object(create_string_iterator(interp, s)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use pretty_assertions::assert_eq;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    fn call(method: crate::runtime::object::NativeFunction, this: &str, args: &[Value]) -> Option<Value> {
        let mut interp = interpreter();
        method(&mut interp, &Value::from(this), args, None).ok()
    }

    #[test]
    fn test_char_access() {
        assert_eq!(call(char_at, "abc", &[Value::from(1)]), Some(Value::from("b")));
        assert_eq!(call(char_at, "abc", &[Value::from(5)]), Some(Value::from("")));
        assert_eq!(call(char_code_at, "A", &[]), Some(Value::from(65)));
        assert_eq!(call(at, "abc", &[Value::from(-1)]), Some(Value::from("c")));
    }

    #[test]
    fn test_searching() {
        assert_eq!(call(index_of, "hello", &[Value::from("l")]), Some(Value::from(2)));
        assert_eq!(call(last_index_of, "hello", &[Value::from("l")]), Some(Value::from(3)));
        assert_eq!(call(includes, "hello", &[Value::from("ell")]), Some(Value::Boolean(true)));
        assert_eq!(call(starts_with, "hello", &[Value::from("he")]), Some(Value::Boolean(true)));
        assert_eq!(call(ends_with, "hello", &[Value::from("lo")]), Some(Value::Boolean(true)));
    }

    #[test]
    fn test_slice_and_substring() {
        assert_eq!(call(slice, "hello", &[Value::from(-3)]), Some(Value::from("llo")));
        assert_eq!(
            call(substring, "hello", &[Value::from(4), Value::from(1)]),
            Some(Value::from("ell"))
        );
    }

    #[test]
    fn test_trim_and_pad() {
        assert_eq!(call(trim, " \t x \n", &[]), Some(Value::from("x")));
        assert_eq!(call(trim_start, "  x ", &[]), Some(Value::from("x ")));
        assert_eq!(
            call(pad_start, "5", &[Value::from(3), Value::from("0")]),
            Some(Value::from("005"))
        );
        assert_eq!(call(pad_end, "ab", &[Value::from(5), Value::from("xy")]), Some(Value::from("abxyx")));
    }

    #[test]
    fn test_case_mapping_keeps_lone_surrogates() {
        let mut interp = interpreter();
        let mixed = Value::String(JsString::from_code_units(&[0x61, 0xD800, 0xDF00, 0xD83D, 0x62]));
        let upper = to_upper_case(&mut interp, &mixed, &[], None).ok();
        let expected = JsString::from_code_units(&[0x41, 0xD800, 0xDF00, 0xD83D, 0x42]);
        assert_eq!(upper, Some(Value::String(expected)));
        assert_eq!(call(to_lower_case, "ÀB", &[]), Some(Value::from("àb")));
    }

    #[test]
    fn test_repeat_rejects_negative_count() {
        let mut interp = interpreter();
        assert!(repeat(&mut interp, &Value::from("a"), &[Value::from(-1)], None).is_err());
        assert_eq!(call(repeat, "ab", &[Value::from(3)]), Some(Value::from("ababab")));
    }

    #[test]
    fn test_split() {
        let mut interp = interpreter();
        let parts = split(&mut interp, &Value::from("a,b,,c"), &[Value::from(",")], None).unwrap_or_default();
        let joined = interp.invoke(&parts, "join", &[Value::from("|")]).ok();
        assert_eq!(joined, Some(Value::from("a|b||c")));
        let chars = split(&mut interp, &Value::from("abc"), &[Value::from("")], None).unwrap_or_default();
        assert_eq!(interp.get_v(&chars, "length").ok(), Some(Value::from(3)));
    }

    #[test]
    fn test_constructor_with_symbol() {
        let mut interp = interpreter();
        let symbol = Value::from(crate::runtime::symbol::Symbol::new(Some("x".into())));
        let result = string_constructor(&mut interp, &Value::Undefined, &[symbol], None).ok();
        assert_eq!(result, Some(Value::from("Symbol(x)")));
    }

    #[test]
    fn test_to_string_rejects_other_objects() {
        let mut interp = interpreter();
        let object = Value::Object(interp.ordinary_object_create());
        assert!(to_string(&mut interp, &object, &[], None).is_err());
    }
}
