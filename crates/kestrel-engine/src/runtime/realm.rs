//! Realms and their intrinsic objects.

use std::rc::Rc;

use tracing::debug;

use crate::builtins::{self, array, boolean, error, function, number, object, string, symbol};

use super::environment::Environment;
use super::function::create_builtin_function;
use super::object::{CallBehavior, JsObject, NativeFunction, ObjectClass};
use super::property::Property;
use super::string::JsString;

/// The well-known intrinsic objects of a realm.
pub struct Intrinsics {
    /// %Object.prototype%
    pub object_prototype: JsObject,
    /// %Function.prototype%
    pub function_prototype: JsObject,
    /// %Array.prototype%
    pub array_prototype: JsObject,
    /// %String.prototype%
    pub string_prototype: JsObject,
    /// %Number.prototype%
    pub number_prototype: JsObject,
    /// %Boolean.prototype%
    pub boolean_prototype: JsObject,
    /// %Symbol.prototype%
    pub symbol_prototype: JsObject,
    /// %Error.prototype%
    pub error_prototype: JsObject,
    /// %EvalError.prototype%
    pub eval_error_prototype: JsObject,
    /// %RangeError.prototype%
    pub range_error_prototype: JsObject,
    /// %ReferenceError.prototype%
    pub reference_error_prototype: JsObject,
    /// %SyntaxError.prototype%
    pub syntax_error_prototype: JsObject,
    /// %TypeError.prototype%
    pub type_error_prototype: JsObject,
    /// %URIError.prototype%
    pub uri_error_prototype: JsObject,
    /// %IteratorPrototype%
    pub iterator_prototype: JsObject,
    /// %ArrayIteratorPrototype%
    pub array_iterator_prototype: JsObject,
    /// %StringIteratorPrototype%
    pub string_iterator_prototype: JsObject,

    /// %Object%
    pub object: JsObject,
    /// %Function%
    pub function: JsObject,
    /// %Array%
    pub array: JsObject,
    /// %String%
    pub string: JsObject,
    /// %Number%
    pub number: JsObject,
    /// %Boolean%
    pub boolean: JsObject,
    /// %Symbol%
    pub symbol: JsObject,
    /// %Error%
    pub error: JsObject,
    /// %EvalError%
    pub eval_error: JsObject,
    /// %RangeError%
    pub range_error: JsObject,
    /// %ReferenceError%
    pub reference_error: JsObject,
    /// %SyntaxError%
    pub syntax_error: JsObject,
    /// %TypeError%
    pub type_error: JsObject,
    /// %URIError%
    pub uri_error: JsObject,

    /// %ThrowTypeError%
    pub throw_type_error: JsObject,
    /// %Array.prototype.values%
    pub array_prototype_values: JsObject,
}

impl Intrinsics {
    /// Allocates every intrinsic in dependency order, then lets the
    /// built-in modules install their properties.
    fn create() -> Self {
        let object_prototype = JsObject::ordinary(None);
        let function_prototype = JsObject::function(
            Some(object_prototype.clone()),
            CallBehavior::Native(function::function_prototype_call),
            None,
        );
        function_prototype.insert("length", Property::data(0, false, false, true));
        function_prototype.insert("name", Property::data("", false, false, true));

        let derived = || JsObject::ordinary(Some(object_prototype.clone()));
        let array_prototype = JsObject::array(object_prototype.clone(), 0);
        let string_prototype = JsObject::new(
            Some(object_prototype.clone()),
            ObjectClass::String(JsString::empty()),
        );
        string_prototype.insert("length", Property::data(0, false, false, false));
        let number_prototype = JsObject::new(Some(object_prototype.clone()), ObjectClass::Number(0.0));
        let boolean_prototype = JsObject::new(Some(object_prototype.clone()), ObjectClass::Boolean(false));
        let symbol_prototype = derived();
        let error_prototype = derived();
        let native_error = || JsObject::ordinary(Some(error_prototype.clone()));
        let iterator_prototype = derived();
        let array_iterator_prototype = JsObject::ordinary(Some(iterator_prototype.clone()));
        let string_iterator_prototype = JsObject::ordinary(Some(iterator_prototype.clone()));

        let constructor = |native: NativeFunction, name: &str, length: u32| {
            create_builtin_function(&function_prototype, native, name, length, true)
        };
        let method = |native: NativeFunction, name: &str, length: u32| {
            create_builtin_function(&function_prototype, native, name, length, false)
        };

        let throw_type_error = method(function::throw_type_error, "", 0);
        throw_type_error.insert("length", Property::data(0, false, false, false));
        throw_type_error.insert("name", Property::data("", false, false, false));
        throw_type_error.prevent_extensions();

        let intrinsics = Self {
            eval_error_prototype: native_error(),
            range_error_prototype: native_error(),
            reference_error_prototype: native_error(),
            syntax_error_prototype: native_error(),
            type_error_prototype: native_error(),
            uri_error_prototype: native_error(),

            object: constructor(object::object_constructor, "Object", 1),
            function: constructor(function::function_constructor, "Function", 1),
            array: constructor(array::array_constructor, "Array", 1),
            string: constructor(string::string_constructor, "String", 1),
            number: constructor(number::number_constructor, "Number", 1),
            boolean: constructor(boolean::boolean_constructor, "Boolean", 1),
            symbol: constructor(symbol::symbol_constructor, "Symbol", 0),
            error: constructor(error::error_constructor, "Error", 1),
            eval_error: constructor(error::eval_error_constructor, "EvalError", 1),
            range_error: constructor(error::range_error_constructor, "RangeError", 1),
            reference_error: constructor(error::reference_error_constructor, "ReferenceError", 1),
            syntax_error: constructor(error::syntax_error_constructor, "SyntaxError", 1),
            type_error: constructor(error::type_error_constructor, "TypeError", 1),
            uri_error: constructor(error::uri_error_constructor, "URIError", 1),

            throw_type_error,
            array_prototype_values: method(array::values, "values", 0),

            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            symbol_prototype,
            error_prototype,
            iterator_prototype,
            array_iterator_prototype,
            string_iterator_prototype,
        };
        builtins::initialize(&intrinsics);
        intrinsics
    }
}

/// A realm: the intrinsics, the global object and the global environment.
pub struct Realm {
    /// The intrinsic objects
    pub intrinsics: Intrinsics,
    /// The global object
    pub global_object: JsObject,
    /// The global environment
    pub global_env: Environment,
}

impl Realm {
    /// CreateRealm followed by SetRealmGlobalObject and
    /// SetDefaultGlobalBindings.
    pub fn create() -> Rc<Self> {
        let intrinsics = Intrinsics::create();
        let global_object = JsObject::ordinary(Some(intrinsics.object_prototype.clone()));
        let global_env = Environment::new_global(global_object.clone(), global_object.clone());
        builtins::global::install(&intrinsics, &global_object);
        debug!(
            globals = global_object.own_property_keys().len(),
            "realm created"
        );
        Rc::new(Self {
            intrinsics,
            global_object,
            global_env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::property::PropertyKey;
    use crate::runtime::value::Value;

    #[test]
    fn test_prototype_chain_roots() {
        let realm = Realm::create();
        let intrinsics = &realm.intrinsics;
        assert_eq!(intrinsics.object_prototype.get_prototype_of(), None);
        assert_eq!(
            intrinsics.function_prototype.get_prototype_of(),
            Some(intrinsics.object_prototype.clone())
        );
        assert!(intrinsics.function_prototype.is_callable());
        assert_eq!(
            intrinsics.type_error_prototype.get_prototype_of(),
            Some(intrinsics.error_prototype.clone())
        );
    }

    #[test]
    fn test_global_bindings() {
        let realm = Realm::create();
        let global = &realm.global_object;
        for name in ["globalThis", "undefined", "NaN", "Infinity", "Object", "Array", "console"] {
            assert!(global.has_own_property(&PropertyKey::from(name)), "missing {name}");
        }
        match global.get_own_property(&PropertyKey::from("undefined")) {
            Some(Property::Data {
                value,
                writable,
                configurable,
                ..
            }) => {
                assert_eq!(value, Value::Undefined);
                assert!(!writable);
                assert!(!configurable);
            }
            other => panic!("unexpected undefined binding: {other:?}"),
        }
    }

    #[test]
    fn test_constructor_links() {
        let realm = Realm::create();
        let intrinsics = &realm.intrinsics;
        let prototype = intrinsics.array.get_own_property(&PropertyKey::from("prototype"));
        assert!(matches!(
            prototype,
            Some(Property::Data { value: Value::Object(ref object), .. }) if *object == intrinsics.array_prototype
        ));
        let constructor = intrinsics
            .array_prototype
            .get_own_property(&PropertyKey::from("constructor"));
        assert!(matches!(
            constructor,
            Some(Property::Data { value: Value::Object(ref object), .. }) if *object == intrinsics.array
        ));
    }
}
