//! Console built-in object.
//!
//! Provides `console.log`, forwarded to the host.

use tracing::trace;

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::object::JsObject;
use crate::runtime::realm::Intrinsics;
use crate::runtime::value::Value;

use super::define_method;

/// Creates the `console` object.
pub(super) fn create(intrinsics: &Intrinsics) -> JsObject {
    let console = JsObject::ordinary(Some(intrinsics.object_prototype.clone()));
    define_method(intrinsics, &console, "log", console_log, 0);
    console
}

/// console.log(...args) - Joins ToString of each argument with spaces and
/// hands the line to the host.
pub fn console_log(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let mut parts = Vec::with_capacity(args.len());
    for value in args {
        parts.push(interp.to_string(value)?.to_string());
    }
    let line = parts.join(" ");
    trace!(len = line.len(), "console.log");
    interp.host().log(&line);
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;

    #[test]
    fn test_log_joins_arguments() {
        let host = BufferedHost::new();
        let mut interp = Interpreter::new(Box::new(host.clone()), EngineConfig::default());
        let args = [Value::from("a"), Value::from(1), Value::Boolean(true), Value::Undefined];
        assert!(console_log(&mut interp, &Value::Undefined, &args, None).is_ok());
        assert_eq!(host.lines(), vec!["a 1 true undefined".to_string()]);
    }

    #[test]
    fn test_log_propagates_symbol_errors() {
        let host = BufferedHost::new();
        let mut interp = Interpreter::new(Box::new(host.clone()), EngineConfig::default());
        let symbol = Value::from(crate::runtime::symbol::Symbol::new(None));
        assert!(console_log(&mut interp, &Value::Undefined, &[symbol], None).is_err());
        assert!(host.lines().is_empty());
    }
}
