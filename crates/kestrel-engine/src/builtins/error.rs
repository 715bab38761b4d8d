//! Error built-in objects.
//!
//! Provides the Error constructor and the native error types:
//! - Error
//! - EvalError
//! - RangeError
//! - ReferenceError
//! - SyntaxError
//! - TypeError
//! - URIError

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::string::JsString;
use crate::runtime::value::Value;

use super::{arg, define_method, this_object};

/// Error type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Eval,
    Range,
    Reference,
    Syntax,
    Type,
    Uri,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::Eval,
        ErrorKind::Range,
        ErrorKind::Reference,
        ErrorKind::Syntax,
        ErrorKind::Type,
        ErrorKind::Uri,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Uri => "URIError",
        }
    }

    /// The intrinsic prototype for instances of this kind.
    pub fn prototype(self, intrinsics: &Intrinsics) -> &JsObject {
        match self {
            ErrorKind::Error => &intrinsics.error_prototype,
            ErrorKind::Eval => &intrinsics.eval_error_prototype,
            ErrorKind::Range => &intrinsics.range_error_prototype,
            ErrorKind::Reference => &intrinsics.reference_error_prototype,
            ErrorKind::Syntax => &intrinsics.syntax_error_prototype,
            ErrorKind::Type => &intrinsics.type_error_prototype,
            ErrorKind::Uri => &intrinsics.uri_error_prototype,
        }
    }

    /// The intrinsic constructor for this kind.
    pub fn constructor(self, intrinsics: &Intrinsics) -> &JsObject {
        match self {
            ErrorKind::Error => &intrinsics.error,
            ErrorKind::Eval => &intrinsics.eval_error,
            ErrorKind::Range => &intrinsics.range_error,
            ErrorKind::Reference => &intrinsics.reference_error,
            ErrorKind::Syntax => &intrinsics.syntax_error,
            ErrorKind::Type => &intrinsics.type_error,
            ErrorKind::Uri => &intrinsics.uri_error,
        }
    }
}

pub(super) fn init(intrinsics: &Intrinsics) {
    for kind in ErrorKind::ALL {
        let prototype = kind.prototype(intrinsics);
        prototype.insert("name", Property::hidden(kind.name()));
        prototype.insert("message", Property::hidden(""));
        if kind != ErrorKind::Error {
            // NativeError constructors inherit from %Error%
            kind.constructor(intrinsics)
                .set_prototype_of(Some(intrinsics.error.clone()));
        }
    }
    define_method(intrinsics, &intrinsics.error_prototype, "toString", to_string, 0);
}

// ============================================================================
// Constructors
// ============================================================================

/// Shared body of the Error and NativeError constructors. Called without
/// `new`, the kind's own constructor stands in for NewTarget.
fn construct_error(
    interp: &mut Interpreter,
    kind: ErrorKind,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    let new_target = match new_target {
        Some(target) => target.clone(),
        None => kind.constructor(interp.intrinsics()).clone(),
    };
    let fallback = kind.prototype(interp.intrinsics()).clone();
    let prototype = interp.get_prototype_from_constructor(&new_target, fallback)?;
    let error = JsObject::new(Some(prototype), ObjectClass::Error);

    let message = arg(args, 0);
    if !message.is_undefined() {
        let message = interp.to_string(&message)?;
        error.insert("message", Property::hidden(message));
    }
    install_error_cause(interp, &error, &arg(args, 1))?;
    Ok(Value::Object(error))
}

/// InstallErrorCause.
fn install_error_cause(interp: &mut Interpreter, error: &JsObject, options: &Value) -> Completion<()> {
    if let Value::Object(options) = options
        && options.has_property(&PropertyKey::from("cause"))
    {
        let cause = interp.get(options, "cause")?;
        error.insert("cause", Property::hidden(cause));
    }
    Ok(())
}

/// Error(message, options) - Creates an Error object.
pub fn error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Error, args, new_target)
}

/// EvalError(message, options)
pub fn eval_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Eval, args, new_target)
}

/// RangeError(message, options)
pub fn range_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Range, args, new_target)
}

/// ReferenceError(message, options)
pub fn reference_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Reference, args, new_target)
}

/// SyntaxError(message, options)
pub fn syntax_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Syntax, args, new_target)
}

/// TypeError(message, options)
pub fn type_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Type, args, new_target)
}

/// URIError(message, options)
pub fn uri_error_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    construct_error(interp, ErrorKind::Uri, args, new_target)
}

// ============================================================================
// Error.prototype Methods
// ============================================================================

/// Error.prototype.toString() - Returns "name: message".
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = this_object(interp, this, "Error.prototype.toString")?;
    let name = match interp.get(&object, "name")? {
        Value::Undefined => "Error".into(),
        other => interp.to_string(&other)?,
    };
    let message = match interp.get(&object, "message")? {
        Value::Undefined => Default::default(),
        other => interp.to_string(&other)?,
    };
    if name.is_empty() {
        return Ok(Value::String(message));
    }
    if message.is_empty() {
        return Ok(Value::String(name));
    }
    Ok(Value::String(name.concat(&JsString::from(": ")).concat(&message)))
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
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::Type.name(), "TypeError");
        assert_eq!(ErrorKind::Uri.name(), "URIError");
    }

    #[test]
    fn test_constructor_without_new() {
        let mut interp = interpreter();
        let result = type_error_constructor(&mut interp, &Value::Undefined, &[Value::from("bad")], None);
        let Ok(Value::Object(error)) = result else {
            panic!("expected an error object");
        };
        assert!(error.is_error());
        assert_eq!(
            error.get_prototype_of(),
            Some(interp.intrinsics().type_error_prototype.clone())
        );
        let text = to_string(&mut interp, &Value::Object(error), &[], None).ok();
        assert_eq!(text, Some(Value::from("TypeError: bad")));
    }

    #[test]
    fn test_to_string_without_message() {
        let mut interp = interpreter();
        let error = interp.create_error(ErrorKind::Range, "");
        let text = to_string(&mut interp, &Value::Object(error), &[], None).ok();
        assert_eq!(text, Some(Value::from("RangeError")));
    }

    #[test]
    fn test_native_error_constructor_inherits_error() {
        let interp = interpreter();
        let intrinsics = interp.intrinsics();
        assert_eq!(
            intrinsics.syntax_error.get_prototype_of(),
            Some(intrinsics.error.clone())
        );
    }
}
