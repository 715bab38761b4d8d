//! Symbol built-in object.
//!
//! Provides the Symbol function, the well-known symbol constants, and
//! prototype methods.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::property::Property;
use crate::runtime::realm::Intrinsics;
use crate::runtime::symbol::{Symbol, well_known};
use crate::runtime::value::Value;

use super::{arg, define_constant, define_getter, define_method};

pub(super) fn init(intrinsics: &Intrinsics) {
    let constructor = &intrinsics.symbol;
    let symbols = well_known();
    define_constant(constructor, "hasInstance", symbols.has_instance.clone());
    define_constant(constructor, "iterator", symbols.iterator.clone());
    define_constant(constructor, "toPrimitive", symbols.to_primitive.clone());
    define_constant(constructor, "toStringTag", symbols.to_string_tag.clone());
    define_constant(constructor, "unscopables", symbols.unscopables.clone());

    let prototype = &intrinsics.symbol_prototype;
    define_getter(intrinsics, prototype, "description", description);
    define_method(intrinsics, prototype, "toString", to_string, 0);
    define_method(intrinsics, prototype, "valueOf", value_of, 0);
    let to_primitive = define_method(intrinsics, prototype, symbols.to_primitive.clone(), value_of, 1);
    prototype.insert(
        symbols.to_primitive.clone(),
        Property::data(to_primitive, false, false, true),
    );
    prototype.insert(
        symbols.to_string_tag.clone(),
        Property::data("Symbol", false, false, true),
    );
}

// ============================================================================
// Symbol Function
// ============================================================================

/// Symbol(description) - Creates a new unique symbol. Not a constructor.
pub fn symbol_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    if new_target.is_some() {
        return Err(interp.type_error("Symbol is not a constructor"));
    }
    let description = match arg(args, 0) {
        Value::Undefined => None,
        description => Some(interp.to_string(&description)?.to_string()),
    };
    Ok(Value::Symbol(Symbol::new(description)))
}

// ============================================================================
// Symbol.prototype Methods
// ============================================================================

/// thisSymbolValue: a symbol primitive or a Symbol wrapper.
fn this_symbol_value(interp: &mut Interpreter, this: &Value, method: &str) -> Completion<Symbol> {
    match this {
        Value::Symbol(symbol) => return Ok(symbol.clone()),
        Value::Object(object) => {
            if let ObjectClass::Symbol(symbol) = &*object.class() {
                return Ok(symbol.clone());
            }
        }
        _ => {}
    }
    Err(interp.type_error(format!("{method} requires that 'this' be a Symbol")))
}

/// Symbol.prototype.toString() - Returns "Symbol(description)".
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let symbol = this_symbol_value(interp, this, "Symbol.prototype.toString")?;
    Ok(Value::from(symbol.descriptive_string()))
}

/// Symbol.prototype.valueOf() / Symbol.prototype[@@toPrimitive](hint) -
/// Returns the symbol value.
pub fn value_of(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    this_symbol_value(interp, this, "Symbol.prototype.valueOf").map(Value::Symbol)
}

/// get Symbol.prototype.description
pub fn description(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let symbol = this_symbol_value(interp, this, "Symbol.prototype.description")?;
    Ok(symbol.description().map(Value::from).unwrap_or_default())
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
    fn test_symbols_are_unique() {
        let mut interp = interpreter();
        let a = symbol_constructor(&mut interp, &Value::Undefined, &[Value::from("x")], None).ok();
        let b = symbol_constructor(&mut interp, &Value::Undefined, &[Value::from("x")], None).ok();
        assert!(a.is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_symbol_throws() {
        let mut interp = interpreter();
        let target = interp.intrinsics().symbol.clone();
        assert!(symbol_constructor(&mut interp, &Value::Undefined, &[], Some(&target)).is_err());
    }

    #[test]
    fn test_to_string_and_description() {
        let mut interp = interpreter();
        let symbol = Value::Symbol(Symbol::new(Some("tag".into())));
        assert_eq!(to_string(&mut interp, &symbol, &[], None).ok(), Some(Value::from("Symbol(tag)")));
        assert_eq!(description(&mut interp, &symbol, &[], None).ok(), Some(Value::from("tag")));
        let anonymous = Value::Symbol(Symbol::new(None));
        assert_eq!(description(&mut interp, &anonymous, &[], None).ok(), Some(Value::Undefined));
    }

    #[test]
    fn test_well_known_constants() {
        let mut interp = interpreter();
        let constructor = interp.intrinsics().symbol.clone();
        let iterator = interp.get(&constructor, "iterator").ok();
        assert_eq!(iterator, Some(Value::Symbol(well_known().iterator.clone())));
    }
}
