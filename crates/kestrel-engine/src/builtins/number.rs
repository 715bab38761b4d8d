//! Number built-in object.
//!
//! Provides the Number constructor, its constants, and prototype methods.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::number_to_string;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::realm::Intrinsics;
use crate::runtime::value::Value;

use super::{arg, define_constant, define_method};

// ============================================================================
// Number Constants
// ============================================================================

/// Number.MAX_SAFE_INTEGER - 2^53 - 1.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Number.MIN_SAFE_INTEGER
pub const MIN_SAFE_INTEGER: f64 = -MAX_SAFE_INTEGER;

/// Number.MAX_VALUE - Largest positive finite value.
pub const MAX_VALUE: f64 = f64::MAX;

/// Number.MIN_VALUE - Smallest positive denormal value.
pub const MIN_VALUE: f64 = 5e-324;

pub(super) fn init(intrinsics: &Intrinsics) {
    let constructor = &intrinsics.number;
    define_constant(constructor, "EPSILON", f64::EPSILON);
    define_constant(constructor, "MAX_SAFE_INTEGER", MAX_SAFE_INTEGER);
    define_constant(constructor, "MAX_VALUE", MAX_VALUE);
    define_constant(constructor, "MIN_SAFE_INTEGER", MIN_SAFE_INTEGER);
    define_constant(constructor, "MIN_VALUE", MIN_VALUE);
    define_constant(constructor, "NaN", f64::NAN);
    define_constant(constructor, "NEGATIVE_INFINITY", f64::NEG_INFINITY);
    define_constant(constructor, "POSITIVE_INFINITY", f64::INFINITY);
    define_method(intrinsics, constructor, "isFinite", is_finite, 1);
    define_method(intrinsics, constructor, "isInteger", is_integer, 1);
    define_method(intrinsics, constructor, "isNaN", is_nan, 1);
    define_method(intrinsics, constructor, "isSafeInteger", is_safe_integer, 1);

    let prototype = &intrinsics.number_prototype;
    define_method(intrinsics, prototype, "toFixed", to_fixed, 1);
    define_method(intrinsics, prototype, "toLocaleString", to_locale_string, 0);
    define_method(intrinsics, prototype, "toString", to_string, 1);
    define_method(intrinsics, prototype, "valueOf", value_of, 0);
}

// ============================================================================
// Number Constructor
// ============================================================================

/// Number(value) - Converts to a number, or creates a Number object when
/// called with `new`.
pub fn number_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let n = match args.first() {
        Some(value) => interp.to_number(value)?,
        None => 0.0,
    };
    let Some(new_target) = new_target else {
        return Ok(Value::Number(n));
    };
    let fallback = interp.intrinsics().number_prototype.clone();
    let prototype = interp.get_prototype_from_constructor(new_target, fallback)?;
    Ok(Value::Object(JsObject::new(Some(prototype), ObjectClass::Number(n))))
}

/// Number.isFinite(number) - No coercion.
pub fn is_finite(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(arg(args, 0).as_number().is_some_and(f64::is_finite)))
}

/// Number.isInteger(number)
pub fn is_integer(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(arg(args, 0).as_number().is_some_and(is_integral)))
}

/// Number.isNaN(number) - No coercion.
pub fn is_nan(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(arg(args, 0).as_number().is_some_and(f64::is_nan)))
}

/// Number.isSafeInteger(number)
pub fn is_safe_integer(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let safe = arg(args, 0)
        .as_number()
        .is_some_and(|n| is_integral(n) && n.abs() <= MAX_SAFE_INTEGER);
    Ok(Value::Boolean(safe))
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.trunc() == n
}

// ============================================================================
// Number.prototype Methods
// ============================================================================

/// thisNumberValue: a number primitive or a Number wrapper.
fn this_number_value(interp: &mut Interpreter, this: &Value, method: &str) -> Completion<f64> {
    match this {
        Value::Number(n) => return Ok(*n),
        Value::Object(object) => {
            if let ObjectClass::Number(n) = &*object.class() {
                return Ok(*n);
            }
        }
        _ => {}
    }
    Err(interp.type_error(format!("{method} requires that 'this' be a Number")))
}

/// Number.prototype.toString(radix) - Returns the representation in the
/// given radix (2 to 36, default 10).
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let n = this_number_value(interp, this, "Number.prototype.toString")?;
    let radix = match arg(args, 0) {
        Value::Undefined => 10.0,
        radix => interp.to_integer_or_infinity(&radix)?,
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(interp.range_error("toString() radix must be between 2 and 36"));
    }
    if radix == 10.0 {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(format_radix(n, radix as u32)))
}

/// Formats a number in a non-decimal radix. Fractions are expanded until
/// they terminate or exceed the precision of an f64.
fn format_radix(n: f64, radix: u32) -> String {
    if !n.is_finite() {
        return number_to_string(n);
    }
    if n == 0.0 {
        return "0".into();
    }
    let base = f64::from(radix);
    let digit = |d: f64| char::from_digit(d as u32, radix).unwrap_or('0');

    let mut integer = n.abs().trunc();
    let mut fraction = n.abs() - integer;
    let mut digits = Vec::new();
    while integer >= 1.0 {
        digits.push(digit(integer % base));
        integer = (integer / base).trunc();
    }
    if digits.is_empty() {
        digits.push('0');
    }
    if n < 0.0 {
        digits.push('-');
    }
    let mut result: String = digits.into_iter().rev().collect();

    if fraction > 0.0 {
        result.push('.');
        // 52 bits of mantissa in base 2 need at most 52 digits
        let max_digits = (52.0 / base.log2()).ceil() as usize + 1;
        for _ in 0..max_digits {
            if fraction <= 0.0 {
                break;
            }
            fraction *= base;
            let d = fraction.trunc();
            result.push(digit(d));
            fraction -= d;
        }
        while result.ends_with('0') {
            result.pop();
        }
        if result.ends_with('.') {
            result.pop();
        }
    }
    result
}

/// Number.prototype.toFixed(fractionDigits) - Fixed-point notation.
pub fn to_fixed(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let n = this_number_value(interp, this, "Number.prototype.toFixed")?;
    let digits = interp.to_integer_or_infinity(&arg(args, 0))?;
    if !(0.0..=100.0).contains(&digits) {
        return Err(interp.range_error("toFixed() digits argument must be between 0 and 100"));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::from(number_to_string(n)));
    }
    let formatted = format!("{:.1$}", n, digits as usize);
    // -0 and values rounding to zero print without a sign
    if formatted.starts_with('-') && formatted.bytes().all(|b| matches!(b, b'-' | b'0' | b'.')) {
        return Ok(Value::from(&formatted[1..]));
    }
    Ok(Value::from(formatted))
}

/// Number.prototype.toLocaleString() - Same as toString().
pub fn to_locale_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    to_string(interp, this, &[], new_target)
}

/// Number.prototype.valueOf() - Returns the number value.
pub fn value_of(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    this_number_value(interp, this, "Number.prototype.valueOf").map(Value::Number)
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

    #[test]
    fn test_format_radix() {
        assert_eq!(format_radix(255.0, 16), "ff");
        assert_eq!(format_radix(-8.0, 2), "-1000");
        assert_eq!(format_radix(0.5, 2), "0.1");
        assert_eq!(format_radix(f64::NAN, 2), "NaN");
    }

    #[test]
    fn test_to_string_with_radix() {
        let mut interp = interpreter();
        let result = to_string(&mut interp, &Value::from(35), &[Value::from(36)], None).ok();
        assert_eq!(result, Some(Value::from("z")));
        assert!(to_string(&mut interp, &Value::from(1), &[Value::from(1)], None).is_err());
    }

    #[test]
    fn test_to_fixed() {
        let mut interp = interpreter();
        let result = to_fixed(&mut interp, &Value::Number(1.256), &[Value::from(2)], None).ok();
        assert_eq!(result, Some(Value::from("1.26")));
        let result = to_fixed(&mut interp, &Value::Number(-0.0), &[], None).ok();
        assert_eq!(result, Some(Value::from("0")));
    }

    #[test]
    fn test_statics_do_not_coerce() {
        let mut interp = interpreter();
        let this = Value::Undefined;
        assert_eq!(
            is_nan(&mut interp, &this, &[Value::from("abc")], None).ok(),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            is_integer(&mut interp, &this, &[Value::Number(5.0)], None).ok(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            is_safe_integer(&mut interp, &this, &[Value::Number(2f64.powi(53))], None).ok(),
            Some(Value::Boolean(false))
        );
    }

    #[test]
    fn test_value_of_rejects_strings() {
        let mut interp = interpreter();
        assert!(value_of(&mut interp, &Value::from("1"), &[], None).is_err());
    }
}
