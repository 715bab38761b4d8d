//! Global object bindings and functions.
//!
//! [`install`] sets up the default global bindings of a realm: the value
//! properties, every constructor, the global functions, and `console`.

use crate::interpreter::Interpreter;
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::conversions::is_js_whitespace;
use crate::runtime::object::JsObject;
use crate::runtime::property::Property;
use crate::runtime::realm::Intrinsics;
use crate::runtime::value::Value;

use super::{arg, console, define_constant, define_method};

/// SetDefaultGlobalBindings.
pub fn install(intrinsics: &Intrinsics, global: &JsObject) {
    global.insert("globalThis", Property::hidden(global.clone()));
    define_constant(global, "Infinity", f64::INFINITY);
    define_constant(global, "NaN", f64::NAN);
    define_constant(global, "undefined", Value::Undefined);

    let constructors = [
        ("Array", &intrinsics.array),
        ("Boolean", &intrinsics.boolean),
        ("Error", &intrinsics.error),
        ("EvalError", &intrinsics.eval_error),
        ("Function", &intrinsics.function),
        ("Number", &intrinsics.number),
        ("Object", &intrinsics.object),
        ("RangeError", &intrinsics.range_error),
        ("ReferenceError", &intrinsics.reference_error),
        ("String", &intrinsics.string),
        ("Symbol", &intrinsics.symbol),
        ("SyntaxError", &intrinsics.syntax_error),
        ("TypeError", &intrinsics.type_error),
        ("URIError", &intrinsics.uri_error),
    ];
    for (name, constructor) in constructors {
        global.insert(name, Property::hidden(constructor.clone()));
    }

    define_method(intrinsics, global, "eval", eval, 1);
    define_method(intrinsics, global, "isFinite", is_finite, 1);
    define_method(intrinsics, global, "isNaN", is_nan, 1);
    define_method(intrinsics, global, "parseFloat", parse_float, 1);
    define_method(intrinsics, global, "parseInt", parse_int, 2);

    global.insert("console", Property::hidden(console::create(intrinsics)));
}

// ============================================================================
// Global Functions
// ============================================================================

/// eval(x) - Evaluating source at runtime is not supported.
pub fn eval(
    _interp: &mut Interpreter,
    _this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Err(Abrupt::unsupported("eval"))
}

/// isNaN(number) - Returns true if ToNumber(number) is NaN.
pub fn is_nan(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let n = interp.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_nan()))
}

/// isFinite(number) - Returns true if ToNumber(number) is finite.
pub fn is_finite(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let n = interp.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_finite()))
}

/// parseInt(string, radix) - Parses an integer prefix.
pub fn parse_int(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let input = interp.to_string(&arg(args, 0))?;
    let radix = interp.to_int32(&arg(args, 1))?;
    Ok(Value::Number(parse_int_prefix(&input.to_std_string(), radix)))
}

/// parseFloat(string) - Parses a decimal literal prefix.
pub fn parse_float(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let input = interp.to_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float_prefix(&input.to_std_string())))
}

// ============================================================================
// Parsing
// ============================================================================

fn trim_leading_whitespace(s: &str) -> &str {
    s.trim_start_matches(is_js_whitespace)
}

/// The integer prefix of `input` in `radix` (0 selects 10, or 16 for a
/// `0x` prefix).
fn parse_int_prefix(input: &str, radix: i32) -> f64 {
    let s = trim_leading_whitespace(input);
    let (sign, s) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };

    let has_hex_prefix = s.starts_with("0x") || s.starts_with("0X");
    let (radix, s) = match radix {
        0 if has_hex_prefix => (16, &s[2..]),
        0 => (10, s),
        16 if has_hex_prefix => (16, &s[2..]),
        2..=36 => (radix as u32, s),
        _ => return f64::NAN,
    };

    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    if radix == 10 {
        // Decimal digits go through the float parser for correct rounding
        let text: String = s.chars().take(digits.len()).collect();
        return sign * text.parse::<f64>().unwrap_or(f64::NAN);
    }
    let base = f64::from(radix);
    sign * digits
        .into_iter()
        .fold(0.0, |acc, digit| acc * base + f64::from(digit))
}

/// The longest prefix of `input` that is a StrDecimalLiteral.
fn parse_float_prefix(input: &str) -> f64 {
    let s = trim_leading_whitespace(input);
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let bytes = s.as_bytes();
    let mut end = s.len() - unsigned.len();
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_start;
        if mantissa_digits > 0 {
            end = fraction_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if exponent_end < bytes.len() && matches!(bytes[exponent_end], b'+' | b'-') {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("  42px", 0), 42.0);
        assert_eq!(parse_int_prefix("-0x1F", 0), -31.0);
        assert_eq!(parse_int_prefix("ff", 16), 255.0);
        assert_eq!(parse_int_prefix("101", 2), 5.0);
        assert_eq!(parse_int_prefix("08", 0), 8.0);
        assert!(parse_int_prefix("xyz", 0).is_nan());
        assert!(parse_int_prefix("1", 37).is_nan());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("3.14abc"), 3.14);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("1e3x"), 1000.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix("-Infinityx"), f64::NEG_INFINITY);
        assert!(parse_float_prefix(".").is_nan());
        assert!(parse_float_prefix("abc").is_nan());
    }

    #[test]
    fn test_global_value_properties() {
        let interp = Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default());
        let global = interp.realm().global_object.clone();
        let Some(Property::Data { writable, configurable, .. }) =
            global.get_own_property(&"undefined".into())
        else {
            panic!("undefined is not a data property");
        };
        assert!(!writable);
        assert!(!configurable);
        assert!(global.has_own_property(&"globalThis".into()));
        assert!(global.has_own_property(&"console".into()));
    }

    #[test]
    fn test_eval_is_a_fault() {
        let mut interp = Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default());
        let result = eval(&mut interp, &Value::Undefined, &[], None);
        assert!(matches!(result, Err(Abrupt::Fault(_))));
    }
}
