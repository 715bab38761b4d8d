//! Type conversion abstract operations.
//!
//! Conversions that can run user code (`valueOf`, `toString`,
//! `@@toPrimitive`) are methods on the interpreter; the pure ones are free
//! functions.

use crate::interpreter::Interpreter;

use super::completion::Completion;
use super::object::{JsObject, ObjectClass};
use super::property::{Property, PropertyKey};
use super::string::JsString;
use super::symbol::well_known;
use super::value::Value;

/// The hint passed to ToPrimitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No preference (`+`, `==`)
    Default,
    /// Prefer `toString`
    String,
    /// Prefer `valueOf`
    Number,
}

impl PreferredType {
    fn as_str(self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::String => "string",
            PreferredType::Number => "number",
        }
    }
}

/// ToBoolean.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => !n.is_nan() && *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Symbol(_) | Value::Object(_) => true,
    }
}

/// WhiteSpace and LineTerminator code points.
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000B}'
            | '\u{000C}'
            | ' '
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\n'
            | '\r'
            | '\u{2028}'
            | '\u{2029}'
    ) || (c != '\u{85}' && c.is_whitespace())
}

/// StringToNumber.
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut value = 0.0;
        for c in digits.chars() {
            match c.to_digit(radix) {
                Some(digit) => value = value * f64::from(radix) + f64::from(digit),
                None => return f64::NAN,
            }
        }
        return value;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let well_formed = trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Number::toString with radix 10: the shortest digit string that
/// round-trips, laid out the way ECMAScript prints numbers.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n == 0.0 {
        return "0".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    let scientific = format!("{n:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat_n('0', (point - k) as usize));
        out
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    }
}

/// ToIntegerOrInfinity on an already-converted number.
pub fn integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc() + 0.0
    }
}

/// ToUint32 on an already-converted number.
pub fn f64_to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// ToInt32 on an already-converted number.
pub fn f64_to_int32(n: f64) -> i32 {
    f64_to_uint32(n) as i32
}

impl Interpreter {
    /// ToPrimitive.
    pub fn to_primitive(&mut self, value: &Value, hint: PreferredType) -> Completion<Value> {
        let Value::Object(object) = value else {
            return Ok(value.clone());
        };
        let exotic = self.get_method(value, well_known().to_primitive.clone())?;
        if let Some(exotic) = exotic {
            let result = self.call(&Value::Object(exotic), value, &[Value::from(hint.as_str())])?;
            if result.is_object() {
                return Err(self.type_error("Cannot convert object to primitive value"));
            }
            return Ok(result);
        }
        let hint = if hint == PreferredType::Default {
            PreferredType::Number
        } else {
            hint
        };
        self.ordinary_to_primitive(object, hint)
    }

    /// OrdinaryToPrimitive.
    pub fn ordinary_to_primitive(&mut self, object: &JsObject, hint: PreferredType) -> Completion<Value> {
        let order = if hint == PreferredType::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for name in order {
            let method = self.get(object, name)?;
            if method.is_callable() {
                let result = self.call(&method, &Value::Object(object.clone()), &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(self.type_error("Cannot convert object to primitive value"))
    }

    /// ToNumber.
    pub fn to_number(&mut self, value: &Value) -> Completion<f64> {
        match value {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(string_to_number(&s.to_std_string())),
            Value::Symbol(_) => Err(self.type_error("Cannot convert a Symbol value to a number")),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::Number)?;
                self.to_number(&primitive)
            }
        }
    }

    /// ToIntegerOrInfinity.
    pub fn to_integer_or_infinity(&mut self, value: &Value) -> Completion<f64> {
        Ok(integer_or_infinity(self.to_number(value)?))
    }

    /// ToInt32.
    pub fn to_int32(&mut self, value: &Value) -> Completion<i32> {
        Ok(f64_to_int32(self.to_number(value)?))
    }

    /// ToUint32.
    pub fn to_uint32(&mut self, value: &Value) -> Completion<u32> {
        Ok(f64_to_uint32(self.to_number(value)?))
    }

    /// ToLength.
    pub fn to_length(&mut self, value: &Value) -> Completion<u64> {
        let length = self.to_integer_or_infinity(value)?;
        if length <= 0.0 {
            return Ok(0);
        }
        Ok(length.min(9_007_199_254_740_991.0) as u64)
    }

    /// ToString.
    pub fn to_string(&mut self, value: &Value) -> Completion<JsString> {
        match value {
            Value::Undefined => Ok(JsString::from("undefined")),
            Value::Null => Ok(JsString::from("null")),
            Value::Boolean(b) => Ok(JsString::from(if *b { "true" } else { "false" })),
            Value::Number(n) => Ok(JsString::from(number_to_string(*n))),
            Value::String(s) => Ok(s.clone()),
            Value::Symbol(_) => Err(self.type_error("Cannot convert a Symbol value to a string")),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::String)?;
                self.to_string(&primitive)
            }
        }
    }

    /// ToPropertyKey.
    pub fn to_property_key(&mut self, value: &Value) -> Completion<PropertyKey> {
        match value {
            Value::String(s) => Ok(PropertyKey::String(s.clone())),
            Value::Symbol(symbol) => Ok(PropertyKey::Symbol(symbol.clone())),
            _ => {
                let key = self.to_primitive(value, PreferredType::String)?;
                match key {
                    Value::Symbol(symbol) => Ok(PropertyKey::Symbol(symbol)),
                    other => Ok(PropertyKey::String(self.to_string(&other)?)),
                }
            }
        }
    }

    /// ToObject.
    pub fn to_object(&mut self, value: &Value) -> Completion<JsObject> {
        let intrinsics = &self.realm().intrinsics;
        let (prototype, class) = match value {
            Value::Object(object) => return Ok(object.clone()),
            Value::Undefined | Value::Null => {
                return Err(self.type_error("Cannot convert undefined or null to object"));
            }
            Value::Boolean(b) => (intrinsics.boolean_prototype.clone(), ObjectClass::Boolean(*b)),
            Value::Number(n) => (intrinsics.number_prototype.clone(), ObjectClass::Number(*n)),
            Value::String(s) => return Ok(self.string_object(s.clone())),
            Value::Symbol(symbol) => (
                intrinsics.symbol_prototype.clone(),
                ObjectClass::Symbol(symbol.clone()),
            ),
        };
        Ok(JsObject::new(Some(prototype), class))
    }

    /// StringCreate with %String.prototype%.
    pub fn string_object(&self, value: JsString) -> JsObject {
        let length = value.len();
        let object = JsObject::new(
            Some(self.realm().intrinsics.string_prototype.clone()),
            ObjectClass::String(value),
        );
        object.insert("length", Property::data(length, false, false, false));
        object
    }

    /// RequireObjectCoercible.
    pub fn require_object_coercible(&mut self, value: &Value) -> Completion<()> {
        if value.is_nullish() {
            return Err(self.type_error(format!(
                "Cannot convert {} to object",
                if value.is_null() { "null" } else { "undefined" }
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_number_to_string_layouts() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-42.0), "-42");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(123.456), "123.456");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("  42  "), 42.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("-1.5e3"), -1500.0);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("infinity").is_nan());
        assert!(string_to_number("NaN").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("-0x10").is_nan());
    }

    #[test]
    fn test_int32_wrapping() {
        assert_eq!(f64_to_int32(4_294_967_296.0 + 5.0), 5);
        assert_eq!(f64_to_int32(2_147_483_648.0), -2_147_483_648);
        assert_eq!(f64_to_int32(-1.5), -1);
        assert_eq!(f64_to_uint32(-1.0), 4_294_967_295);
        assert_eq!(f64_to_int32(f64::NAN), 0);
    }

    #[test]
    fn test_to_boolean() {
        assert!(!to_boolean(&Value::from("")));
        assert!(to_boolean(&Value::from("0")));
        assert!(!to_boolean(&Value::from(f64::NAN)));
        assert!(!to_boolean(&Value::from(-0.0)));
        assert!(to_boolean(&Value::from(JsObject::ordinary(None))));
    }

    proptest! {
        #[test]
        fn prop_number_to_string_round_trips(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
            let printed = number_to_string(n);
            let parsed = string_to_number(&printed);
            prop_assert!(parsed == n || (parsed == 0.0 && n == 0.0));
        }

        #[test]
        fn prop_int32_is_uint32_reinterpreted(n in -1e12f64..1e12f64) {
            prop_assert_eq!(f64_to_int32(n) as u32, f64_to_uint32(n));
        }

        #[test]
        fn prop_integer_strings_parse_exactly(n in -1_000_000_000i64..1_000_000_000i64) {
            prop_assert_eq!(string_to_number(&n.to_string()), n as f64);
        }
    }
}
