//! Function objects: creation, invocation and declaration instantiation.
//!
//! Script functions are created in three steps, mirroring the abstract
//! operations: [`function_allocate`] fixes the prototype and whether the
//! object can be constructed, [`function_initialize`] attaches the captured
//! environment and syntax node, and [`make_constructor`] adds the
//! `prototype` object. [`set_function_name`] and [`make_method`] finish
//! the object where the syntax calls for it.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::ast::{self, FunctionKind, Name, scope};
use crate::interpreter::Interpreter;

use super::arguments::{create_mapped_arguments_object, create_unmapped_arguments_object};
use super::completion::{Abrupt, Completion};
use super::context::ExecutionContext;
use super::environment::Environment;
use super::object::{CallBehavior, ConstructBehavior, JsObject, NativeFunction};
use super::property::{Property, PropertyKey};
use super::string::JsString;
use super::value::Value;

/// How a function resolves `this`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisMode {
    /// Arrow functions use the `this` of their defining scope
    Lexical,
    /// Strict functions receive `this` unchanged
    Strict,
    /// Sloppy functions box primitives and map nullish to the global object
    Global,
}

/// The internal slots of a function defined in script code.
pub struct ScriptFunction {
    /// `[[Environment]]`: the scope the function closes over
    pub environment: Environment,
    /// `[[ECMAScriptCode]]` and `[[FormalParameters]]`
    pub node: Rc<ast::Function>,
    /// `[[ThisMode]]`
    pub this_mode: ThisMode,
    /// `[[Strict]]`
    pub strict: bool,
    home_object: RefCell<Option<JsObject>>,
}

impl ScriptFunction {
    /// `[[HomeObject]]`.
    pub fn home_object(&self) -> Option<JsObject> {
        self.home_object.borrow().clone()
    }

    /// The syntactic kind of the function.
    pub fn kind(&self) -> FunctionKind {
        self.node.kind
    }
}

/// The internal slots of a bound function exotic object.
pub struct BoundFunction {
    /// `[[BoundTargetFunction]]`
    pub target: JsObject,
    /// `[[BoundThis]]`
    pub this: Value,
    /// `[[BoundArguments]]`
    pub arguments: Vec<Value>,
}

/// Allocates a function object whose constructor capability is fixed up
/// front. The call capability is attached by [`function_initialize`].
pub fn function_allocate(prototype: &JsObject, constructor: bool) -> JsObject {
    let object = JsObject::ordinary(Some(prototype.clone()));
    object.borrow_mut().construct = constructor.then_some(ConstructBehavior::Script);
    object
}

/// Attaches the environment and code to an allocated function object and
/// defines its `length`.
pub fn function_initialize(object: &JsObject, node: Rc<ast::Function>, environment: Environment) {
    let strict = node.strict;
    let this_mode = if node.is_arrow() {
        ThisMode::Lexical
    } else if strict {
        ThisMode::Strict
    } else {
        ThisMode::Global
    };
    let length = node.expected_argument_count();
    let function = ScriptFunction {
        environment,
        node,
        this_mode,
        strict,
        home_object: RefCell::new(None),
    };
    let construct = object.construct_behavior();
    object.set_behavior(CallBehavior::Script(Rc::new(function)), construct);
    object.insert("length", Property::data(length, false, false, true));
}

/// OrdinaryFunctionCreate with %Function.prototype%. Only plain
/// `function` declarations and expressions can be constructed.
pub fn ordinary_function_create(
    interp: &Interpreter,
    node: Rc<ast::Function>,
    environment: Environment,
) -> JsObject {
    let prototype = interp.realm().intrinsics.function_prototype.clone();
    let constructor = node.kind == FunctionKind::Normal;
    let object = function_allocate(&prototype, constructor);
    function_initialize(&object, node, environment);
    object
}

/// MakeConstructor: gives `function` a `prototype` property.
///
/// Without an explicit `prototype` a fresh object is created whose
/// `constructor` points back at `function`. `writable_prototype` controls
/// whether both of those properties are writable.
pub fn make_constructor(
    interp: &Interpreter,
    function: &JsObject,
    writable_prototype: bool,
    prototype: Option<JsObject>,
) {
    let prototype = prototype.unwrap_or_else(|| {
        let prototype = JsObject::ordinary(Some(interp.realm().intrinsics.object_prototype.clone()));
        prototype.insert(
            "constructor",
            Property::data(function.clone(), writable_prototype, false, true),
        );
        prototype
    });
    function.insert("prototype", Property::data(prototype, writable_prototype, false, false));
}

/// MakeMethod: records the object the method was defined on, which is
/// what `super` property lookups start from.
pub fn make_method(function: &JsObject, home_object: &JsObject) {
    if let Some(script) = function.script_function() {
        *script.home_object.borrow_mut() = Some(home_object.clone());
    }
}

/// The string a property key contributes to a function name.
pub fn function_name_for_key(key: &PropertyKey) -> JsString {
    match key {
        PropertyKey::String(name) => name.clone(),
        PropertyKey::Symbol(symbol) => match symbol.description() {
            Some(description) => JsString::from(format!("[{description}]")),
            None => JsString::empty(),
        },
    }
}

/// SetFunctionName.
pub fn set_function_name(function: &JsObject, key: &PropertyKey, prefix: Option<&str>) {
    let mut name = function_name_for_key(key);
    if let Some(prefix) = prefix {
        name = JsString::from(format!("{prefix} ")).concat(&name);
    }
    function.insert("name", Property::data(name, false, false, true));
}

/// CreateBuiltinFunction.
pub fn create_builtin_function(
    function_prototype: &JsObject,
    behavior: NativeFunction,
    name: impl Into<PropertyKey>,
    length: u32,
    constructor: bool,
) -> JsObject {
    let object = JsObject::function(
        Some(function_prototype.clone()),
        CallBehavior::Native(behavior),
        constructor.then_some(ConstructBehavior::Native(behavior)),
    );
    object.insert("length", Property::data(length, false, false, true));
    set_function_name(&object, &name.into(), None);
    object
}

/// BoundFunctionCreate.
pub fn bound_function_create(target: &JsObject, this: Value, arguments: Vec<Value>) -> JsObject {
    let construct = target.is_constructor().then_some(ConstructBehavior::Bound);
    let bound = BoundFunction {
        target: target.clone(),
        this,
        arguments,
    };
    JsObject::function(
        target.get_prototype_of(),
        CallBehavior::Bound(Rc::new(bound)),
        construct,
    )
}

/// InstantiateFunctionObject for a function or generator declaration.
pub fn instantiate_function_object(
    interp: &Interpreter,
    node: &Rc<ast::Function>,
    environment: Environment,
) -> JsObject {
    let function = ordinary_function_create(interp, node.clone(), environment);
    let name = node
        .id
        .as_ref()
        .map_or_else(|| PropertyKey::from("default"), |id| PropertyKey::from(&*id.name));
    set_function_name(&function, &name, None);
    if node.kind == FunctionKind::Normal {
        make_constructor(interp, &function, true, None);
    }
    function
}

/// The `name` of a function object, for diagnostics.
pub fn debug_function_name(function: &JsObject) -> String {
    match function.get_own_property(&PropertyKey::from("name")) {
        Some(Property::Data {
            value: Value::String(name),
            ..
        }) if !name.is_empty() => name.to_string(),
        _ => "anonymous".into(),
    }
}

impl Interpreter {
    /// Call: invokes `function` with a `this` value and arguments.
    pub fn call(&mut self, function: &Value, this: &Value, args: &[Value]) -> Completion<Value> {
        let behavior = function.as_object().and_then(JsObject::call_behavior);
        let (Some(object), Some(behavior)) = (function.as_object(), behavior) else {
            return Err(self.type_error(format!("{} is not a function", self.describe(function))));
        };
        self.enter_call()?;
        let result = crate::interpreter::grow_stack(|| match behavior {
            CallBehavior::Native(native) => native(self, this, args, None),
            CallBehavior::Script(script) => self.call_script_function(object, &script, this, args),
            CallBehavior::Bound(bound) => {
                let mut bound_args = bound.arguments.clone();
                bound_args.extend_from_slice(args);
                self.call(&Value::Object(bound.target.clone()), &bound.this, &bound_args)
            }
        });
        self.exit_call();
        result
    }

    /// Construct: invokes `[[Construct]]`; `new_target` defaults to the
    /// constructor itself.
    pub fn construct(
        &mut self,
        constructor: &JsObject,
        args: &[Value],
        new_target: Option<&JsObject>,
    ) -> Completion<Value> {
        let Some(behavior) = constructor.construct_behavior() else {
            let description = self.describe(&Value::Object(constructor.clone()));
            return Err(self.type_error(format!("{description} is not a constructor")));
        };
        let new_target = new_target.unwrap_or(constructor).clone();
        self.enter_call()?;
        let result = crate::interpreter::grow_stack(|| match behavior {
            ConstructBehavior::Native(native) => native(self, &Value::Undefined, args, Some(&new_target)),
            ConstructBehavior::Script => self.construct_script_function(constructor, args, &new_target),
            ConstructBehavior::Bound => self.construct_bound_function(constructor, args, &new_target),
        });
        self.exit_call();
        result
    }

    fn call_script_function(
        &mut self,
        object: &JsObject,
        function: &Rc<ScriptFunction>,
        this: &Value,
        args: &[Value],
    ) -> Completion<Value> {
        if function.kind() == FunctionKind::Generator {
            return Err(Abrupt::unsupported("generator functions"));
        }
        trace!(function = %debug_function_name(object), args = args.len(), "call");
        let env = self.prepare_for_ordinary_call(object, function, None);
        let result = self
            .ordinary_call_bind_this(function, &env, this.clone())
            .and_then(|()| self.ordinary_call_evaluate_body(object, function, args));
        self.pop_context();
        result
    }

    fn construct_script_function(
        &mut self,
        object: &JsObject,
        args: &[Value],
        new_target: &JsObject,
    ) -> Completion<Value> {
        let Some(function) = object.script_function() else {
            return Err(Abrupt::internal("script constructor without script function"));
        };
        let fallback = self.realm().intrinsics.object_prototype.clone();
        let prototype = self.get_prototype_from_constructor(new_target, fallback)?;
        let this_argument = JsObject::ordinary(Some(prototype));

        trace!(function = %debug_function_name(object), args = args.len(), "construct");
        let env = self.prepare_for_ordinary_call(object, &function, Some(new_target.clone()));
        let result = self
            .ordinary_call_bind_this(&function, &env, Value::Object(this_argument.clone()))
            .and_then(|()| self.ordinary_call_evaluate_body(object, &function, args));
        self.pop_context();

        match result? {
            Value::Object(returned) => Ok(Value::Object(returned)),
            _ => Ok(Value::Object(this_argument)),
        }
    }

    fn construct_bound_function(
        &mut self,
        object: &JsObject,
        args: &[Value],
        new_target: &JsObject,
    ) -> Completion<Value> {
        let Some(CallBehavior::Bound(bound)) = object.call_behavior() else {
            return Err(Abrupt::internal("bound constructor without bound target"));
        };
        let mut bound_args = bound.arguments.clone();
        bound_args.extend_from_slice(args);
        let new_target = if new_target == object {
            &bound.target
        } else {
            new_target
        };
        self.construct(&bound.target, &bound_args, Some(new_target))
    }

    /// GetPrototypeFromConstructor.
    pub fn get_prototype_from_constructor(
        &mut self,
        constructor: &JsObject,
        fallback: JsObject,
    ) -> Completion<JsObject> {
        match self.get(constructor, "prototype")? {
            Value::Object(prototype) => Ok(prototype),
            _ => Ok(fallback),
        }
    }

    /// PrepareForOrdinaryCall: pushes a context whose environment is a new
    /// function environment chained to the captured scope.
    fn prepare_for_ordinary_call(
        &mut self,
        object: &JsObject,
        function: &ScriptFunction,
        new_target: Option<JsObject>,
    ) -> Environment {
        let env = Environment::new_function(
            object.clone(),
            function.this_mode == ThisMode::Lexical,
            new_target,
            function.environment.clone(),
        );
        self.push_context(ExecutionContext {
            realm: self.realm().clone(),
            function: Some(object.clone()),
            lexical_environment: env.clone(),
            variable_environment: env.clone(),
            strict: function.strict,
        });
        env
    }

    /// OrdinaryCallBindThis.
    fn ordinary_call_bind_this(
        &mut self,
        function: &ScriptFunction,
        env: &Environment,
        this_argument: Value,
    ) -> Completion<()> {
        let this_value = match function.this_mode {
            ThisMode::Lexical => return Ok(()),
            ThisMode::Strict => this_argument,
            ThisMode::Global if this_argument.is_nullish() => {
                let global_env = self.realm().global_env.clone();
                global_env.get_this_binding(self)?
            }
            ThisMode::Global => Value::Object(self.to_object(&this_argument)?),
        };
        match env.as_function() {
            Some(record) => record.bind_this_value(self, this_value),
            None => Err(Abrupt::internal("function call without a function environment")),
        }
    }

    /// OrdinaryCallEvaluateBody: instantiates declarations, runs the body
    /// and maps the completion to a return value.
    fn ordinary_call_evaluate_body(
        &mut self,
        object: &JsObject,
        function: &ScriptFunction,
        args: &[Value],
    ) -> Completion<Value> {
        self.function_declaration_instantiation(object, function, args)?;
        match self.evaluate_statement_list(&function.node.body) {
            Ok(_) => Ok(Value::Undefined),
            Err(Abrupt::Return(value)) => Ok(value),
            Err(Abrupt::Break(..) | Abrupt::Continue(..)) => {
                Err(Abrupt::internal("break or continue escaped a function body"))
            }
            Err(abrupt) => Err(abrupt),
        }
    }

    /// FunctionDeclarationInstantiation.
    fn function_declaration_instantiation(
        &mut self,
        object: &JsObject,
        function: &ScriptFunction,
        args: &[Value],
    ) -> Completion<()> {
        let node = &function.node;
        let strict = function.strict;
        let parameter_names = scope::parameter_names(node);
        let has_duplicates = scope::find_duplicate(&parameter_names).is_some();
        let simple_parameters = node.simple_params;
        let has_parameter_expressions = node.param_expressions;
        let var_names = scope::var_declared_names(&node.body, true);

        // The last declaration of a name wins.
        let mut function_names: Vec<Name> = Vec::new();
        let mut functions_to_initialize = Vec::new();
        for declaration in scope::var_scoped_functions(&node.body).into_iter().rev() {
            let Some(id) = &declaration.id else { continue };
            if !function_names.contains(&id.name) {
                function_names.push(id.name.clone());
                functions_to_initialize.insert(0, declaration.clone());
            }
        }

        let lexical_names = scope::lexically_declared_names(&node.body, false);
        let arguments_name: Name = Name::from("arguments");
        let arguments_object_needed = function.this_mode != ThisMode::Lexical
            && !parameter_names.contains(&arguments_name)
            && (has_parameter_expressions
                || (!function_names.contains(&arguments_name) && !lexical_names.contains(&arguments_name)));

        let callee_env = self.lexical_environment();
        let env = if strict || !has_parameter_expressions {
            callee_env
        } else {
            let env = Environment::new_declarative(Some(callee_env));
            self.set_lexical_environment(env.clone());
            env
        };

        for name in &parameter_names {
            if !env.has_binding(self, name)? {
                env.create_mutable_binding(self, name, false)?;
                if has_duplicates {
                    env.initialize_binding(self, name, Value::Undefined)?;
                }
            }
        }

        let mut parameter_bindings: FxHashSet<Name> = parameter_names.iter().cloned().collect();
        if arguments_object_needed {
            let arguments = if strict || !simple_parameters {
                create_unmapped_arguments_object(self, args)
            } else {
                create_mapped_arguments_object(self, object, &parameter_names, args, &env)
            };
            if strict {
                env.create_immutable_binding(self, &arguments_name, false)?;
            } else {
                env.create_mutable_binding(self, &arguments_name, false)?;
            }
            env.initialize_binding(self, &arguments_name, Value::Object(arguments))?;
            parameter_bindings.insert(arguments_name);
        }

        let binding_env = (!has_duplicates).then(|| env.clone());
        self.bind_formal_parameters(node, args, binding_env.as_ref())?;

        let var_env = if !has_parameter_expressions {
            let mut instantiated = parameter_bindings.clone();
            for name in &var_names {
                if instantiated.insert(name.clone()) {
                    env.create_mutable_binding(self, name, false)?;
                    env.initialize_binding(self, name, Value::Undefined)?;
                }
            }
            env.clone()
        } else {
            let var_env = Environment::new_declarative(Some(env.clone()));
            self.set_variable_environment(var_env.clone());
            let mut instantiated = FxHashSet::default();
            for name in &var_names {
                if instantiated.insert(name.clone()) {
                    var_env.create_mutable_binding(self, name, false)?;
                    let initial = if !parameter_bindings.contains(name) || function_names.contains(name) {
                        Value::Undefined
                    } else {
                        env.get_binding_value(self, name, false)?
                    };
                    var_env.initialize_binding(self, name, initial)?;
                }
            }
            var_env
        };

        let lex_env = if strict {
            var_env.clone()
        } else {
            Environment::new_declarative(Some(var_env.clone()))
        };
        self.set_lexical_environment(lex_env.clone());

        for declaration in scope::lexically_scoped_declarations(&node.body, false) {
            if declaration.is_constant() {
                lex_env.create_immutable_binding(self, &declaration.name, true)?;
            } else {
                lex_env.create_mutable_binding(self, &declaration.name, false)?;
            }
        }

        for declaration in functions_to_initialize {
            let Some(id) = &declaration.id else { continue };
            let function_object = instantiate_function_object(self, &declaration, lex_env.clone());
            var_env.set_mutable_binding(self, &id.name, Value::Object(function_object), false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use pretty_assertions::assert_eq;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    fn writable(object: &JsObject, name: &str) -> Option<bool> {
        match object.get_own_property(&PropertyKey::from(name))? {
            Property::Data { writable, .. } => Some(writable),
            Property::Accessor { .. } => None,
        }
    }

    fn prototype_of(function: &JsObject) -> Option<JsObject> {
        match function.get_own_property(&PropertyKey::from("prototype"))? {
            Property::Data {
                value: Value::Object(prototype),
                ..
            } => Some(prototype),
            _ => None,
        }
    }

    #[test]
    fn test_make_constructor_creates_prototype() {
        let interp = interpreter();
        let function = JsObject::ordinary(None);
        make_constructor(&interp, &function, true, None);
        assert_eq!(writable(&function, "prototype"), Some(true));
        let prototype = prototype_of(&function).expect("prototype object");
        assert_eq!(writable(&prototype, "constructor"), Some(true));
        assert_eq!(
            prototype.get_prototype_of(),
            Some(interp.realm().intrinsics.object_prototype.clone())
        );
    }

    #[test]
    fn test_make_constructor_read_only_prototype() {
        let interp = interpreter();
        let function = JsObject::ordinary(None);
        make_constructor(&interp, &function, false, None);
        assert_eq!(writable(&function, "prototype"), Some(false));
        let prototype = prototype_of(&function).expect("prototype object");
        assert_eq!(writable(&prototype, "constructor"), Some(false));
    }

    #[test]
    fn test_make_constructor_with_given_prototype() {
        let interp = interpreter();
        let function = JsObject::ordinary(None);
        let given = JsObject::ordinary(None);
        make_constructor(&interp, &function, true, Some(given.clone()));
        assert_eq!(prototype_of(&function), Some(given.clone()));
        assert!(!given.has_own_property(&PropertyKey::from("constructor")));
    }
}
