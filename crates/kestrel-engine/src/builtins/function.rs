//! Function built-in object.
//!
//! Provides the Function constructor and prototype methods.

use crate::interpreter::Interpreter;
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::function::{bound_function_create, debug_function_name, set_function_name};
use crate::runtime::object::{CallBehavior, JsObject};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::symbol::well_known;
use crate::runtime::value::Value;

use super::{arg, define_method};

pub(super) fn init(intrinsics: &Intrinsics) {
    let prototype = &intrinsics.function_prototype;
    define_method(intrinsics, prototype, "apply", apply, 2);
    define_method(intrinsics, prototype, "bind", bind, 1);
    define_method(intrinsics, prototype, "call", call, 1);
    define_method(intrinsics, prototype, "toString", to_string, 0);
    let has_instance = define_method(
        intrinsics,
        prototype,
        well_known().has_instance.clone(),
        has_instance,
        1,
    );
    prototype.insert(
        well_known().has_instance.clone(),
        Property::data(has_instance, false, false, false),
    );
}

// ============================================================================
// Intrinsic Functions
// ============================================================================

/// %Function.prototype% itself: accepts any arguments and returns
/// undefined.
pub fn function_prototype_call(
    _interp: &mut Interpreter,
    _this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Undefined)
}

/// Function() constructor - creates a function from source strings.
///
/// Compiling source at runtime is not supported.
pub fn function_constructor(
    _interp: &mut Interpreter,
    _this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Err(Abrupt::unsupported("the Function constructor"))
}

/// %ThrowTypeError% - guards `callee` on unmapped arguments objects.
pub fn throw_type_error(
    interp: &mut Interpreter,
    _this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Err(interp.type_error(
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions or the arguments objects for calls to them",
    ))
}

// ============================================================================
// Function.prototype Methods
// ============================================================================

/// Function.prototype.apply(thisArg, argArray) - Calls the function with
/// the given this value and an array-like of arguments.
pub fn apply(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    if !this.is_callable() {
        return Err(interp.type_error("Function.prototype.apply was called on a non-function"));
    }
    let this_arg = arg(args, 0);
    let arg_array = arg(args, 1);
    if arg_array.is_nullish() {
        return interp.call(this, &this_arg, &[]);
    }
    let list = interp.create_list_from_array_like(&arg_array)?;
    interp.call(this, &this_arg, &list)
}

/// Function.prototype.call(thisArg, ...args) - Calls the function with the
/// given this value.
pub fn call(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    if !this.is_callable() {
        return Err(interp.type_error("Function.prototype.call was called on a non-function"));
    }
    let rest = args.get(1..).unwrap_or_default();
    interp.call(this, &arg(args, 0), rest)
}

/// Function.prototype.bind(thisArg, ...args) - Creates a bound function.
pub fn bind(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(target) = this else {
        return Err(interp.type_error("Bind must be called on a function"));
    };
    if !target.is_callable() {
        return Err(interp.type_error("Bind must be called on a function"));
    }
    let bound_args = args.get(1..).unwrap_or_default().to_vec();
    let bound_count = bound_args.len() as f64;
    let bound = bound_function_create(target, arg(args, 0), bound_args);

    let mut length = 0.0;
    if target.has_own_property(&PropertyKey::from("length"))
        && let Value::Number(target_length) = interp.get(target, "length")?
    {
        length = if target_length == f64::INFINITY {
            f64::INFINITY
        } else if target_length == f64::NEG_INFINITY {
            0.0
        } else {
            let target_length = interp.to_integer_or_infinity(&Value::Number(target_length))?;
            (target_length - bound_count).max(0.0)
        };
    }
    bound.insert("length", Property::data(length, false, false, true));

    let name = match interp.get(target, "name")? {
        Value::String(name) => name,
        _ => Default::default(),
    };
    set_function_name(&bound, &PropertyKey::from(name), Some("bound"));
    Ok(Value::Object(bound))
}

/// Function.prototype.toString() - Returns the source text of script
/// functions, or a native code placeholder.
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Some(function) = this.as_object().filter(|object| object.is_callable()) else {
        return Err(interp.type_error("Function.prototype.toString requires that 'this' be a Function"));
    };
    if let Some(CallBehavior::Script(script)) = function.call_behavior() {
        return Ok(Value::from(&*script.node.source_text));
    }
    Ok(Value::from(format!(
        "function {}() {{ [native code] }}",
        debug_function_name(function)
    )))
}

/// Function.prototype[@@hasInstance](V) - OrdinaryHasInstance(this, V).
pub fn has_instance(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(function) = this else {
        return Ok(Value::Boolean(false));
    };
    interp
        .ordinary_has_instance(function, &arg(args, 0))
        .map(Value::Boolean)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use crate::runtime::function::create_builtin_function;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    fn identity_this(
        _interp: &mut Interpreter,
        this: &Value,
        _args: &[Value],
        _new_target: Option<&JsObject>,
    ) -> Completion<Value> {
        Ok(this.clone())
    }

    fn count_args(
        _interp: &mut Interpreter,
        _this: &Value,
        args: &[Value],
        _new_target: Option<&JsObject>,
    ) -> Completion<Value> {
        Ok(Value::from(args.len()))
    }

    #[test]
    fn test_call_passes_this() {
        let mut interp = interpreter();
        let function = create_builtin_function(
            &interp.intrinsics().function_prototype,
            identity_this,
            "identity",
            0,
            false,
        );
        let result = call(&mut interp, &Value::Object(function), &[Value::from(7)], None).ok();
        assert_eq!(result, Some(Value::from(7)));
    }

    #[test]
    fn test_bind_prepends_arguments_and_sets_name() {
        let mut interp = interpreter();
        let function = create_builtin_function(
            &interp.intrinsics().function_prototype,
            count_args,
            "count",
            3,
            false,
        );
        let bound = bind(
            &mut interp,
            &Value::Object(function),
            &[Value::Undefined, Value::from(1), Value::from(2)],
            None,
        );
        let Ok(bound) = bound else {
            panic!("bind failed");
        };
        let result = interp.call(&bound, &Value::Undefined, &[Value::from(3)]).ok();
        assert_eq!(result, Some(Value::from(3)));
        let Value::Object(bound) = bound else {
            panic!("bind returned a primitive");
        };
        assert_eq!(interp.get(&bound, "name").ok(), Some(Value::from("bound count")));
        assert_eq!(interp.get(&bound, "length").ok(), Some(Value::from(1)));
    }

    #[test]
    fn test_apply_rejects_non_callable() {
        let mut interp = interpreter();
        let result = apply(&mut interp, &Value::from(1), &[], None);
        assert!(matches!(result, Err(Abrupt::Throw(_))));
    }

    #[test]
    fn test_function_constructor_is_unsupported() {
        let mut interp = interpreter();
        let result = function_constructor(&mut interp, &Value::Undefined, &[], None);
        assert!(matches!(result, Err(Abrupt::Fault(_))));
    }
}
