//! Boolean built-in object.
//!
//! Provides the Boolean constructor and prototype methods.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::to_boolean;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::realm::Intrinsics;
use crate::runtime::value::Value;

use super::{arg, define_method};

pub(super) fn init(intrinsics: &Intrinsics) {
    let prototype = &intrinsics.boolean_prototype;
    define_method(intrinsics, prototype, "toString", to_string, 0);
    define_method(intrinsics, prototype, "valueOf", value_of, 0);
}

// ============================================================================
// Boolean Constructor
// ============================================================================

/// Boolean(value) - Converts to a boolean, or creates a Boolean object when
/// called with `new`.
pub fn boolean_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let b = to_boolean(&arg(args, 0));
    let Some(new_target) = new_target else {
        return Ok(Value::Boolean(b));
    };
    let fallback = interp.intrinsics().boolean_prototype.clone();
    let prototype = interp.get_prototype_from_constructor(new_target, fallback)?;
    Ok(Value::Object(JsObject::new(Some(prototype), ObjectClass::Boolean(b))))
}

// ============================================================================
// Boolean.prototype Methods
// ============================================================================

/// Boolean.prototype.toString() - Returns "true" or "false".
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let b = this_boolean_value(interp, this, "Boolean.prototype.toString")?;
    Ok(Value::from(if b { "true" } else { "false" }))
}

/// Boolean.prototype.valueOf() - Returns the boolean value.
pub fn value_of(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    this_boolean_value(interp, this, "Boolean.prototype.valueOf").map(Value::Boolean)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// thisBooleanValue: a boolean primitive or a Boolean wrapper.
fn this_boolean_value(interp: &mut Interpreter, this: &Value, method: &str) -> Completion<bool> {
    match this {
        Value::Boolean(b) => return Ok(*b),
        Value::Object(object) => {
            if let ObjectClass::Boolean(b) = &*object.class() {
                return Ok(*b);
            }
        }
        _ => {}
    }
    Err(interp.type_error(format!("{method} requires that 'this' be a Boolean")))
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
    fn test_boolean_conversion() {
        let mut interp = interpreter();
        let this = Value::Undefined;
        assert_eq!(
            boolean_constructor(&mut interp, &this, &[Value::from("")], None).ok(),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            boolean_constructor(&mut interp, &this, &[Value::from("false")], None).ok(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            boolean_constructor(&mut interp, &this, &[], None).ok(),
            Some(Value::Boolean(false))
        );
    }

    #[test]
    fn test_wrapper_value_of() {
        let mut interp = interpreter();
        let wrapper = JsObject::new(
            Some(interp.intrinsics().boolean_prototype.clone()),
            ObjectClass::Boolean(true),
        );
        let wrapper = Value::Object(wrapper);
        assert_eq!(value_of(&mut interp, &wrapper, &[], None).ok(), Some(Value::Boolean(true)));
        assert_eq!(to_string(&mut interp, &wrapper, &[], None).ok(), Some(Value::from("true")));
    }

    #[test]
    fn test_to_string_rejects_numbers() {
        let mut interp = interpreter();
        assert!(to_string(&mut interp, &Value::from(1), &[], None).is_err());
    }
}
