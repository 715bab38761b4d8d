//! Object built-in object.
//!
//! Provides the Object constructor, its static methods and the
//! Object.prototype methods every ordinary object inherits.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::to_boolean;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::property::{Property, PropertyDescriptor, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::string::JsString;
use crate::runtime::symbol::well_known;
use crate::runtime::value::{Value, same_value};

use super::{arg, define_method};

pub(super) fn init(intrinsics: &Intrinsics) {
    let constructor = &intrinsics.object;
    define_method(intrinsics, constructor, "assign", assign, 2);
    define_method(intrinsics, constructor, "create", create, 2);
    define_method(intrinsics, constructor, "defineProperties", define_properties, 2);
    define_method(intrinsics, constructor, "defineProperty", define_property, 3);
    define_method(intrinsics, constructor, "entries", entries, 1);
    define_method(intrinsics, constructor, "freeze", freeze, 1);
    define_method(intrinsics, constructor, "getOwnPropertyDescriptor", get_own_property_descriptor, 2);
    define_method(intrinsics, constructor, "getOwnPropertyNames", get_own_property_names, 1);
    define_method(intrinsics, constructor, "getOwnPropertySymbols", get_own_property_symbols, 1);
    define_method(intrinsics, constructor, "getPrototypeOf", get_prototype_of, 1);
    define_method(intrinsics, constructor, "is", is, 2);
    define_method(intrinsics, constructor, "isExtensible", is_extensible, 1);
    define_method(intrinsics, constructor, "isFrozen", is_frozen, 1);
    define_method(intrinsics, constructor, "keys", keys, 1);
    define_method(intrinsics, constructor, "preventExtensions", prevent_extensions, 1);
    define_method(intrinsics, constructor, "setPrototypeOf", set_prototype_of, 2);
    define_method(intrinsics, constructor, "values", values, 1);

    let prototype = &intrinsics.object_prototype;
    define_method(intrinsics, prototype, "hasOwnProperty", has_own_property, 1);
    define_method(intrinsics, prototype, "isPrototypeOf", is_prototype_of, 1);
    define_method(intrinsics, prototype, "propertyIsEnumerable", property_is_enumerable, 1);
    define_method(intrinsics, prototype, "toLocaleString", to_locale_string, 0);
    define_method(intrinsics, prototype, "toString", to_string, 0);
    define_method(intrinsics, prototype, "valueOf", value_of, 0);
}

// ============================================================================
// Object Constructor
// ============================================================================

/// Object(value) - Converts a value to an object, or creates a new one.
pub fn object_constructor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    new_target: Option<&JsObject>,
) -> Completion<Value> {
    if let Some(new_target) = new_target
        && *new_target != interp.intrinsics().object
    {
        let fallback = interp.intrinsics().object_prototype.clone();
        let prototype = interp.get_prototype_from_constructor(new_target, fallback)?;
        return Ok(Value::Object(JsObject::ordinary(Some(prototype))));
    }
    let value = arg(args, 0);
    if value.is_nullish() {
        return Ok(Value::Object(interp.ordinary_object_create()));
    }
    interp.to_object(&value).map(Value::Object)
}

// ============================================================================
// Object Static Methods
// ============================================================================

/// Object.assign(target, ...sources) - Copies own enumerable properties.
pub fn assign(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let target = interp.to_object(&arg(args, 0))?;
    for source in args.iter().skip(1) {
        if source.is_nullish() {
            continue;
        }
        let from = interp.to_object(source)?;
        for key in from.own_property_keys() {
            if from.get_own_property(&key).is_some_and(|property| property.enumerable()) {
                let value = from.get(interp, &key, &Value::Object(from.clone()))?;
                interp.set(&target, key, value, true)?;
            }
        }
    }
    Ok(Value::Object(target))
}

/// Object.create(proto, properties) - Creates an object with the given
/// prototype.
pub fn create(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let prototype = match arg(args, 0) {
        Value::Object(object) => Some(object),
        Value::Null => None,
        other => {
            return Err(interp.type_error(format!(
                "Object prototype may only be an Object or null: {}",
                interp.describe(&other)
            )));
        }
    };
    let object = JsObject::ordinary(prototype);
    let properties = arg(args, 1);
    if !properties.is_undefined() {
        object_define_properties(interp, &object, &properties)?;
    }
    Ok(Value::Object(object))
}

/// Object.defineProperty(O, P, Attributes)
pub fn define_property(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(object) = arg(args, 0) else {
        return Err(interp.type_error("Object.defineProperty called on non-object"));
    };
    let key = interp.to_property_key(&arg(args, 1))?;
    let desc = to_property_descriptor(interp, &arg(args, 2))?;
    object.define_property_or_throw(interp, &key, desc)?;
    Ok(Value::Object(object))
}

/// Object.defineProperties(O, Properties)
pub fn define_properties(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(object) = arg(args, 0) else {
        return Err(interp.type_error("Object.defineProperties called on non-object"));
    };
    object_define_properties(interp, &object, &arg(args, 1))?;
    Ok(Value::Object(object))
}

/// ObjectDefineProperties: reads every descriptor before defining any.
fn object_define_properties(interp: &mut Interpreter, object: &JsObject, properties: &Value) -> Completion<()> {
    let props = interp.to_object(properties)?;
    let mut descriptors = Vec::new();
    for key in props.own_property_keys() {
        if props.get_own_property(&key).is_some_and(|property| property.enumerable()) {
            let desc_object = props.get(interp, &key, &Value::Object(props.clone()))?;
            let desc = to_property_descriptor(interp, &desc_object)?;
            descriptors.push((key, desc));
        }
    }
    for (key, desc) in descriptors {
        object.define_property_or_throw(interp, &key, desc)?;
    }
    Ok(())
}

/// Object.entries(O) - Own enumerable `[key, value]` pairs.
pub fn entries(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    enumerable_own_properties(interp, &arg(args, 0), PropertyKind::Entries)
}

/// Object.keys(O) - Own enumerable string keys.
pub fn keys(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    enumerable_own_properties(interp, &arg(args, 0), PropertyKind::Keys)
}

/// Object.values(O) - Own enumerable values.
pub fn values(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    enumerable_own_properties(interp, &arg(args, 0), PropertyKind::Values)
}

#[derive(Clone, Copy)]
enum PropertyKind {
    Keys,
    Values,
    Entries,
}

/// EnumerableOwnProperties over string keys.
fn enumerable_own_properties(interp: &mut Interpreter, value: &Value, kind: PropertyKind) -> Completion<Value> {
    let object = interp.to_object(value)?;
    let mut results = Vec::new();
    for key in object.own_property_keys() {
        if key.is_symbol() {
            continue;
        }
        if !object.get_own_property(&key).is_some_and(|property| property.enumerable()) {
            continue;
        }
        let key_value = key.to_value();
        match kind {
            PropertyKind::Keys => results.push(key_value),
            PropertyKind::Values | PropertyKind::Entries => {
                let value = object.get(interp, &key, &Value::Object(object.clone()))?;
                if let PropertyKind::Entries = kind {
                    let entry = interp.create_array_from_list([key_value, value]);
                    results.push(Value::Object(entry));
                } else {
                    results.push(value);
                }
            }
        }
    }
    Ok(Value::Object(interp.create_array_from_list(results)))
}

/// Object.freeze(O) - SetIntegrityLevel(O, frozen).
pub fn freeze(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let value = arg(args, 0);
    let Value::Object(object) = &value else {
        return Ok(value);
    };
    object.prevent_extensions();
    for key in object.own_property_keys() {
        let Some(property) = object.get_own_property(&key) else {
            continue;
        };
        let desc = PropertyDescriptor {
            configurable: Some(false),
            writable: property.is_data().then_some(false),
            ..PropertyDescriptor::default()
        };
        object.define_property_or_throw(interp, &key, desc)?;
    }
    Ok(value)
}

/// Object.isFrozen(O) - TestIntegrityLevel(O, frozen).
pub fn is_frozen(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(object) = arg(args, 0) else {
        return Ok(Value::Boolean(true));
    };
    if object.is_extensible() {
        return Ok(Value::Boolean(false));
    }
    let frozen = object.own_property_keys().iter().all(|key| match object.get_own_property(key) {
        Some(Property::Data {
            writable, configurable, ..
        }) => !writable && !configurable,
        Some(Property::Accessor { configurable, .. }) => !configurable,
        None => true,
    });
    Ok(Value::Boolean(frozen))
}

/// Object.getOwnPropertyDescriptor(O, P)
pub fn get_own_property_descriptor(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(&arg(args, 0))?;
    let key = interp.to_property_key(&arg(args, 1))?;
    Ok(match object.get_own_property(&key) {
        Some(property) => Value::Object(from_property_descriptor(interp, &property)),
        None => Value::Undefined,
    })
}

/// Object.getOwnPropertyNames(O) - Own string keys, enumerable or not.
pub fn get_own_property_names(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(&arg(args, 0))?;
    let names = object
        .own_property_keys()
        .into_iter()
        .filter(|key| !key.is_symbol())
        .map(|key| key.to_value());
    Ok(Value::Object(interp.create_array_from_list(names)))
}

/// Object.getOwnPropertySymbols(O) - Own symbol keys.
pub fn get_own_property_symbols(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(&arg(args, 0))?;
    let symbols = object
        .own_property_keys()
        .into_iter()
        .filter(PropertyKey::is_symbol)
        .map(|key| key.to_value());
    Ok(Value::Object(interp.create_array_from_list(symbols)))
}

/// Object.getPrototypeOf(O)
pub fn get_prototype_of(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let object = interp.to_object(&arg(args, 0))?;
    Ok(Value::from(object.get_prototype_of()))
}

/// Object.setPrototypeOf(O, proto)
pub fn set_prototype_of(
    interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let value = arg(args, 0);
    interp.require_object_coercible(&value)?;
    let prototype = match arg(args, 1) {
        Value::Object(object) => Some(object),
        Value::Null => None,
        _ => return Err(interp.type_error("Object prototype may only be an Object or null")),
    };
    if let Value::Object(object) = &value
        && !object.set_prototype_of(prototype)
    {
        return Err(interp.type_error("Cyclic or non-extensible prototype assignment"));
    }
    Ok(value)
}

/// Object.is(a, b) - SameValue.
pub fn is(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(same_value(&arg(args, 0), &arg(args, 1))))
}

/// Object.isExtensible(O)
pub fn is_extensible(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(Value::Boolean(
        arg(args, 0).as_object().is_some_and(JsObject::is_extensible),
    ))
}

/// Object.preventExtensions(O)
pub fn prevent_extensions(
    _interp: &mut Interpreter,
    _this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let value = arg(args, 0);
    if let Value::Object(object) = &value {
        object.prevent_extensions();
    }
    Ok(value)
}

// ============================================================================
// Object.prototype Methods
// ============================================================================

/// Object.prototype.hasOwnProperty(V)
pub fn has_own_property(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let object = interp.to_object(this)?;
    Ok(Value::Boolean(object.has_own_property(&key)))
}

/// Object.prototype.isPrototypeOf(V)
pub fn is_prototype_of(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Value::Object(value) = arg(args, 0) else {
        return Ok(Value::Boolean(false));
    };
    let object = interp.to_object(this)?;
    let mut current = value.get_prototype_of();
    while let Some(candidate) = current {
        if candidate == object {
            return Ok(Value::Boolean(true));
        }
        current = candidate.get_prototype_of();
    }
    Ok(Value::Boolean(false))
}

/// Object.prototype.propertyIsEnumerable(V)
pub fn property_is_enumerable(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let object = interp.to_object(this)?;
    Ok(Value::Boolean(
        object.get_own_property(&key).is_some_and(|property| property.enumerable()),
    ))
}

/// Object.prototype.toLocaleString() - Invokes `this.toString()`.
pub fn to_locale_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    interp.invoke(this, "toString", &[])
}

/// Object.prototype.toString() - Returns "[object Tag]".
pub fn to_string(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    match this {
        Value::Undefined => return Ok(Value::from("[object Undefined]")),
        Value::Null => return Ok(Value::from("[object Null]")),
        _ => {}
    }
    let object = interp.to_object(this)?;
    let builtin_tag = if object.is_callable() {
        "Function"
    } else {
        match &*object.class() {
            ObjectClass::Array => "Array",
            ObjectClass::Arguments(_) => "Arguments",
            ObjectClass::Error => "Error",
            ObjectClass::Boolean(_) => "Boolean",
            ObjectClass::Number(_) => "Number",
            ObjectClass::String(_) => "String",
            _ => "Object",
        }
    };
    let tag = match interp.get(&object, well_known().to_string_tag.clone())? {
        Value::String(tag) => tag,
        _ => JsString::from(builtin_tag),
    };
    let tag = JsString::from("[object ").concat(&tag).concat(&JsString::from("]"));
    Ok(Value::String(tag))
}

/// Object.prototype.valueOf() - ToObject(this).
pub fn value_of(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    interp.to_object(this).map(Value::Object)
}

// ============================================================================
// Descriptor Conversion
// ============================================================================

/// ToPropertyDescriptor.
pub fn to_property_descriptor(interp: &mut Interpreter, value: &Value) -> Completion<PropertyDescriptor> {
    let Value::Object(object) = value else {
        return Err(interp.type_error(format!(
            "Property description must be an object: {}",
            interp.describe(value)
        )));
    };
    let mut desc = PropertyDescriptor::default();
    if object.has_property(&PropertyKey::from("enumerable")) {
        desc.enumerable = Some(to_boolean(&interp.get(object, "enumerable")?));
    }
    if object.has_property(&PropertyKey::from("configurable")) {
        desc.configurable = Some(to_boolean(&interp.get(object, "configurable")?));
    }
    if object.has_property(&PropertyKey::from("value")) {
        desc.value = Some(interp.get(object, "value")?);
    }
    if object.has_property(&PropertyKey::from("writable")) {
        desc.writable = Some(to_boolean(&interp.get(object, "writable")?));
    }
    for name in ["get", "set"] {
        if !object.has_property(&PropertyKey::from(name)) {
            continue;
        }
        let accessor = interp.get(object, name)?;
        if !accessor.is_undefined() && !accessor.is_callable() {
            return Err(interp.type_error(format!(
                "{} is not a function",
                interp.describe(&accessor)
            )));
        }
        if name == "get" {
            desc.get = Some(accessor);
        } else {
            desc.set = Some(accessor);
        }
    }
    if desc.is_accessor() && desc.is_data() {
        return Err(interp.type_error(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

/// FromPropertyDescriptor for a complete own property.
pub fn from_property_descriptor(interp: &Interpreter, property: &Property) -> JsObject {
    let object = interp.ordinary_object_create();
    match property {
        Property::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => {
            object.insert("value", Property::plain(value.clone()));
            object.insert("writable", Property::plain(*writable));
            object.insert("enumerable", Property::plain(*enumerable));
            object.insert("configurable", Property::plain(*configurable));
        }
        Property::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => {
            object.insert("get", Property::plain(Value::from(get.clone())));
            object.insert("set", Property::plain(Value::from(set.clone())));
            object.insert("enumerable", Property::plain(*enumerable));
            object.insert("configurable", Property::plain(*configurable));
        }
    }
    object
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use crate::runtime::completion::Abrupt;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    #[test]
    fn test_to_string_tags() {
        let mut interp = interpreter();
        let array = Value::Object(interp.create_array_from_list(Vec::new()));
        assert_eq!(
            to_string(&mut interp, &array, &[], None).ok(),
            Some(Value::from("[object Array]"))
        );
        assert_eq!(
            to_string(&mut interp, &Value::Null, &[], None).ok(),
            Some(Value::from("[object Null]"))
        );
        assert_eq!(
            to_string(&mut interp, &Value::from(1), &[], None).ok(),
            Some(Value::from("[object Number]"))
        );
    }

    #[test]
    fn test_keys_skips_hidden_properties() {
        let mut interp = interpreter();
        let object = interp.ordinary_object_create();
        object.insert("visible", Property::plain(1));
        object.insert("hidden", Property::hidden(2));
        let Ok(Value::Object(result)) = keys(&mut interp, &Value::Undefined, &[Value::Object(object)], None) else {
            panic!("Object.keys failed");
        };
        assert_eq!(interp.get(&result, "length").ok(), Some(Value::from(1)));
        assert_eq!(interp.get(&result, "0").ok(), Some(Value::from("visible")));
    }

    #[test]
    fn test_freeze_makes_properties_read_only() {
        let mut interp = interpreter();
        let object = interp.ordinary_object_create();
        object.insert("x", Property::plain(1));
        let value = Value::Object(object.clone());
        assert!(freeze(&mut interp, &Value::Undefined, std::slice::from_ref(&value), None).is_ok());
        assert_eq!(
            is_frozen(&mut interp, &Value::Undefined, std::slice::from_ref(&value), None).ok(),
            Some(Value::Boolean(true))
        );
        assert!(interp.set(&object, "x", Value::from(2), false).is_ok());
        assert_eq!(interp.get(&object, "x").ok(), Some(Value::from(1)));
    }

    #[test]
    fn test_descriptor_rejects_mixed_kinds() {
        let mut interp = interpreter();
        let desc = interp.ordinary_object_create();
        desc.insert("value", Property::plain(1));
        desc.insert("get", Property::plain(Value::Undefined));
        let result = to_property_descriptor(&mut interp, &Value::Object(desc));
        assert!(matches!(result, Err(Abrupt::Throw(_))));
    }

    #[test]
    fn test_is_uses_same_value() {
        let mut interp = interpreter();
        let nan = Value::Number(f64::NAN);
        assert_eq!(
            is(&mut interp, &Value::Undefined, &[nan.clone(), nan], None).ok(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            is(&mut interp, &Value::Undefined, &[Value::from(0.0), Value::from(-0.0)], None).ok(),
            Some(Value::Boolean(false))
        );
    }
}
