//! ECMAScript language values.

use super::object::JsObject;
use super::string::JsString;
use super::symbol::Symbol;

/// A language value.
///
/// `PartialEq` is SameValue: `NaN` equals itself and `+0` differs from `-0`.
/// Use [`is_strictly_equal`] for `===`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(JsString),
    /// Symbol
    Symbol(Symbol),
    /// Object reference
    Object(JsObject),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        same_value(self, other)
    }
}

impl Value {
    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is nullish (null or undefined).
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns true for objects (including functions).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the object, if this value is one.
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the number, if this value is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this value is one.
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// IsCallable.
    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(JsObject::is_callable)
    }

    /// IsConstructor.
    pub fn is_constructor(&self) -> bool {
        self.as_object().is_some_and(JsObject::is_constructor)
    }

    /// The result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(object) if object.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(JsString::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(JsString::from(value))
    }
}

impl From<JsString> for Value {
    fn from(value: JsString) -> Self {
        Value::String(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<JsObject> for Value {
    fn from(value: JsObject) -> Self {
        Value::Object(value)
    }
}

impl From<Option<JsObject>> for Value {
    fn from(value: Option<JsObject>) -> Self {
        value.map_or(Value::Null, Value::Object)
    }
}

/// SameValue.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y && x.is_sign_negative() == y.is_sign_negative()
            }
        }
        _ => same_non_number(a, b),
    }
}

/// SameValueZero: like SameValue but `+0` equals `-0`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => same_non_number(a, b),
    }
}

/// IsStrictlyEqual (`===`).
pub fn is_strictly_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => same_non_number(a, b),
    }
}

fn same_non_number(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_flavours() {
        let nan = Value::Number(f64::NAN);
        let zero = Value::Number(0.0);
        let negative_zero = Value::Number(-0.0);

        assert!(same_value(&nan, &nan));
        assert!(!is_strictly_equal(&nan, &nan));
        assert!(same_value_zero(&nan, &nan));

        assert!(!same_value(&zero, &negative_zero));
        assert!(same_value_zero(&zero, &negative_zero));
        assert!(is_strictly_equal(&zero, &negative_zero));

        assert!(is_strictly_equal(&Value::from("a"), &Value::from("a")));
        assert!(!is_strictly_equal(&Value::from(1), &Value::from("1")));
        assert!(!is_strictly_equal(&Value::Null, &Value::Undefined));
    }

    #[test]
    fn test_type_of_primitives() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::from(true).type_of(), "boolean");
        assert_eq!(Value::from(1.5).type_of(), "number");
        assert_eq!(Value::from("s").type_of(), "string");
        assert_eq!(Value::from(Symbol::new(None)).type_of(), "symbol");
    }

    #[test]
    fn test_nullish() {
        assert!(Value::Undefined.is_nullish());
        assert!(Value::Null.is_nullish());
        assert!(!Value::from(0).is_nullish());
    }
}
