//! The tree-walking evaluator.
//!
//! [`Interpreter`] owns the realm, the execution context stack and the host
//! hooks. Evaluation is split by syntax category:
//!
//! - `expressions` - expression evaluation and references
//! - `statements` - statements, blocks and loops
//! - `operators` - binary operators, equality and relational comparison
//! - `patterns` - binding initialization and destructuring
//! - `iteration` - the iterator protocol and for-in enumeration
//! - `script` / `module` - top-level declaration instantiation

mod expressions;
mod iteration;
pub mod module;
mod operators;
mod patterns;
mod script;
mod statements;

use std::rc::Rc;

use tracing::warn;

use crate::builtins::error::ErrorKind;
use crate::config::EngineConfig;
use crate::host::HostHooks;
use crate::runtime::completion::{Abrupt, Completion, EngineFault};
use crate::runtime::context::ExecutionContext;
use crate::runtime::conversions::number_to_string;
use crate::runtime::environment::{Environment, get_identifier_reference, get_this_environment};
use crate::runtime::function::debug_function_name;
use crate::runtime::object::{JsObject, ObjectClass};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::{Intrinsics, Realm};
use crate::runtime::reference::Reference;
use crate::runtime::value::Value;
use crate::ast::Name;

pub use iteration::IteratorRecord;
pub use module::SourceTextModule;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Longest list CreateListFromArrayLike will build.
pub const MAX_LIST_LENGTH: u64 = 1 << 20;

/// Runs `f`, first moving to a fresh stack segment when the current one
/// is nearly exhausted.
pub(crate) fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

/// The evaluator state for one realm.
pub struct Interpreter {
    realm: Rc<Realm>,
    contexts: Vec<ExecutionContext>,
    host: Box<dyn HostHooks>,
    config: EngineConfig,
    steps: u64,
    call_depth: usize,
}

impl Interpreter {
    /// Creates a realm and an empty context stack.
    pub fn new(host: Box<dyn HostHooks>, config: EngineConfig) -> Self {
        Self {
            realm: Realm::create(),
            contexts: Vec::new(),
            host,
            config,
            steps: 0,
            call_depth: 0,
        }
    }

    /// The current realm.
    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    /// The intrinsics of the current realm.
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.realm.intrinsics
    }

    /// The host hooks.
    pub fn host(&self) -> &dyn HostHooks {
        self.host.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // Execution context stack

    /// Pushes a context; it becomes the running context.
    pub fn push_context(&mut self, context: ExecutionContext) {
        self.contexts.push(context);
    }

    /// Pops the running context.
    pub fn pop_context(&mut self) -> Option<ExecutionContext> {
        self.contexts.pop()
    }

    /// The running execution context.
    pub fn running_context(&self) -> Option<&ExecutionContext> {
        self.contexts.last()
    }

    /// The LexicalEnvironment of the running context, or the global
    /// environment when nothing is running.
    pub fn lexical_environment(&self) -> Environment {
        self.contexts
            .last()
            .map_or_else(|| self.realm.global_env.clone(), |context| context.lexical_environment.clone())
    }

    /// Replaces the LexicalEnvironment of the running context.
    pub fn set_lexical_environment(&mut self, env: Environment) {
        if let Some(context) = self.contexts.last_mut() {
            context.lexical_environment = env;
        }
    }

    /// The VariableEnvironment of the running context.
    pub fn variable_environment(&self) -> Environment {
        self.contexts
            .last()
            .map_or_else(|| self.realm.global_env.clone(), |context| context.variable_environment.clone())
    }

    /// Replaces the VariableEnvironment of the running context.
    pub fn set_variable_environment(&mut self, env: Environment) {
        if let Some(context) = self.contexts.last_mut() {
            context.variable_environment = env;
        }
    }

    /// Whether the running code is strict.
    pub fn is_strict(&self) -> bool {
        self.contexts.last().is_some_and(|context| context.strict)
    }

    /// Runs `f` with `env` as the LexicalEnvironment, restoring the previous
    /// environment on every exit path.
    pub(crate) fn with_lexical_environment<T>(
        &mut self,
        env: Environment,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = self.lexical_environment();
        self.set_lexical_environment(env);
        let result = f(self);
        self.set_lexical_environment(previous);
        result
    }

    // Resource limits

    pub(crate) fn enter_call(&mut self) -> Completion<()> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(self.range_error("Maximum call stack size exceeded"));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Charges one evaluation step against the budget.
    pub(crate) fn step(&mut self) -> Completion<()> {
        self.steps += 1;
        match self.config.step_budget {
            Some(budget) if self.steps > budget => {
                warn!(budget, "step budget exhausted");
                Err(Abrupt::Fault(EngineFault::StepBudgetExhausted))
            }
            _ => Ok(()),
        }
    }

    /// Resets per-evaluation counters.
    pub(crate) fn reset_limits(&mut self) {
        self.steps = 0;
        self.call_depth = 0;
    }

    // Errors

    /// Creates an error object of the given kind.
    pub fn create_error(&self, kind: ErrorKind, message: impl Into<String>) -> JsObject {
        let error = JsObject::new(Some(kind.prototype(self.intrinsics()).clone()), ObjectClass::Error);
        error.insert("message", Property::hidden(message.into()));
        error
    }

    /// A throw completion carrying a new error object.
    pub fn throw_error(&self, kind: ErrorKind, message: impl Into<String>) -> Abrupt {
        Abrupt::Throw(Value::Object(self.create_error(kind, message)))
    }

    /// A TypeError throw completion.
    pub fn type_error(&self, message: impl Into<String>) -> Abrupt {
        self.throw_error(ErrorKind::Type, message)
    }

    /// A ReferenceError throw completion.
    pub fn reference_error(&self, message: impl Into<String>) -> Abrupt {
        self.throw_error(ErrorKind::Reference, message)
    }

    /// A RangeError throw completion.
    pub fn range_error(&self, message: impl Into<String>) -> Abrupt {
        self.throw_error(ErrorKind::Range, message)
    }

    /// A SyntaxError throw completion.
    pub fn syntax_error(&self, message: impl Into<String>) -> Abrupt {
        self.throw_error(ErrorKind::Syntax, message)
    }

    // Object operations

    /// Get(O, P).
    pub fn get(&mut self, object: &JsObject, key: impl Into<PropertyKey>) -> Completion<Value> {
        object.get(self, &key.into(), &Value::Object(object.clone()))
    }

    /// GetV(V, P): property lookup on any value, with the value itself as
    /// the receiver.
    pub fn get_v(&mut self, value: &Value, key: impl Into<PropertyKey>) -> Completion<Value> {
        let object = self.to_object(value)?;
        object.get(self, &key.into(), value)
    }

    /// Set(O, P, V, Throw).
    pub fn set(
        &mut self,
        object: &JsObject,
        key: impl Into<PropertyKey>,
        value: Value,
        throw: bool,
    ) -> Completion<()> {
        let key = key.into();
        let succeeded = object.set(self, &key, value, &Value::Object(object.clone()))?;
        if !succeeded && throw {
            return Err(self.type_error(format!("Cannot assign to read only property '{key}'")));
        }
        Ok(())
    }

    /// GetMethod(V, P): `None` for undefined or null, TypeError for any
    /// other non-callable.
    pub fn get_method(&mut self, value: &Value, key: impl Into<PropertyKey>) -> Completion<Option<JsObject>> {
        let key = key.into();
        let method = self.get_v(value, key.clone())?;
        match method {
            Value::Undefined | Value::Null => Ok(None),
            Value::Object(object) if object.is_callable() => Ok(Some(object)),
            _ => Err(self.type_error(format!("{key} is not a function"))),
        }
    }

    /// Invoke(V, P, args).
    pub fn invoke(&mut self, value: &Value, key: impl Into<PropertyKey>, args: &[Value]) -> Completion<Value> {
        let function = self.get_v(value, key)?;
        self.call(&function, value, args)
    }

    /// OrdinaryObjectCreate(%Object.prototype%).
    pub fn ordinary_object_create(&self) -> JsObject {
        JsObject::ordinary(Some(self.intrinsics().object_prototype.clone()))
    }

    /// CreateArrayFromList.
    pub fn create_array_from_list(&self, values: impl IntoIterator<Item = Value>) -> JsObject {
        let array = JsObject::array(self.intrinsics().array_prototype.clone(), 0);
        let mut length = 0u32;
        for value in values {
            array.insert(length, Property::plain(value));
            length += 1;
        }
        array.insert("length", Property::data(length, true, false, false));
        array
    }

    /// CreateListFromArrayLike. Lists longer than [`MAX_LIST_LENGTH`] are a
    /// RangeError, and every element read is charged against the step
    /// budget.
    pub fn create_list_from_array_like(&mut self, value: &Value) -> Completion<Vec<Value>> {
        let Value::Object(object) = value else {
            return Err(self.type_error("CreateListFromArrayLike called on non-object"));
        };
        let length_value = self.get(object, "length")?;
        let length = self.to_length(&length_value)?;
        if length > MAX_LIST_LENGTH {
            return Err(self.range_error(format!("Too many arguments: {length}")));
        }
        let mut list = Vec::with_capacity(length.min(1 << 16) as usize);
        for index in 0..length {
            self.step()?;
            list.push(self.get(object, PropertyKey::from(index.to_string()))?);
        }
        Ok(list)
    }

    /// CopyDataProperties: copies own enumerable properties of `source`
    /// onto `target`, skipping `excluded`.
    pub fn copy_data_properties(
        &mut self,
        target: &JsObject,
        source: &Value,
        excluded: &[PropertyKey],
    ) -> Completion<()> {
        if source.is_nullish() {
            return Ok(());
        }
        let from = self.to_object(source)?;
        for key in from.own_property_keys() {
            if excluded.contains(&key) {
                continue;
            }
            if let Some(property) = from.get_own_property(&key)
                && property.enumerable()
            {
                let value = from.get(self, &key, &Value::Object(from.clone()))?;
                target.create_data_property_or_throw(self, &key, value)?;
            }
        }
        Ok(())
    }

    // Name and this resolution

    /// ResolveBinding in the running context.
    pub fn resolve_binding(&mut self, name: &Name) -> Completion<Reference> {
        let env = self.lexical_environment();
        let strict = self.is_strict();
        get_identifier_reference(self, Some(&env), name, strict)
    }

    /// GetThisEnvironment for the running context.
    pub fn get_this_environment(&self) -> Environment {
        get_this_environment(&self.lexical_environment())
    }

    /// ResolveThisBinding.
    pub fn resolve_this_binding(&mut self) -> Completion<Value> {
        let env = self.get_this_environment();
        env.get_this_binding(self)
    }

    /// GetNewTarget.
    pub fn get_new_target(&self) -> Option<JsObject> {
        let env = self.get_this_environment();
        env.as_function().and_then(|record| record.new_target.clone())
    }

    // Diagnostics

    /// A short description of a value for error messages. Never runs
    /// script code.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => format!("\"{s}\""),
            Value::Symbol(symbol) => symbol.descriptive_string(),
            Value::Object(object) if object.is_callable() => {
                format!("function {}", debug_function_name(object))
            }
            Value::Object(object) => format!("[object {}]", object.class().name()),
        }
    }

    /// Renders a thrown value for the host. Error objects become
    /// `Name: message`; anything else goes through ToString.
    pub fn stringify_thrown(&mut self, value: &Value) -> String {
        match self.to_string(value) {
            Ok(text) => text.to_string(),
            Err(_) => self.describe(value),
        }
    }

    /// Renders a value the way the REPL echoes results. Never runs script
    /// code: accessors are shown as `[Getter]`.
    pub fn inspect(&self, value: &Value) -> String {
        self.inspect_value(value, 0)
    }

    fn inspect_value(&self, value: &Value, depth: usize) -> String {
        let Value::Object(object) = value else {
            return self.describe(value);
        };
        if object.is_callable() {
            return format!("[Function: {}]", debug_function_name(object));
        }
        if object.is_error() {
            let name = self.inspect_data(object, "name").unwrap_or_else(|| "Error".into());
            let message = self.inspect_data(object, "message").unwrap_or_default();
            return if message.is_empty() { name } else { format!("{name}: {message}") };
        }
        if depth > 2 {
            return if object.is_array() { "[Array]".into() } else { "[Object]".into() };
        }
        let entries: Vec<String> = object
            .own_property_keys()
            .into_iter()
            .filter_map(|key| {
                let property = object.get_own_property(&key)?;
                if !property.enumerable() {
                    return None;
                }
                let rendered = match property {
                    Property::Data { value, .. } => self.inspect_value(&value, depth + 1),
                    Property::Accessor { .. } => "[Getter/Setter]".into(),
                };
                Some(if object.is_array() && key.as_array_index().is_some() {
                    rendered
                } else {
                    format!("{key}: {rendered}")
                })
            })
            .collect();
        if object.is_array() {
            format!("[{}]", entries.join(", "))
        } else if entries.is_empty() {
            "{}".into()
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }

    fn inspect_data(&self, object: &JsObject, name: &str) -> Option<String> {
        let key = PropertyKey::from(name);
        let mut current = Some(object.clone());
        while let Some(candidate) = current {
            if let Some(property) = candidate.get_own_property(&key) {
                return match property {
                    Property::Data {
                        value: Value::String(text),
                        ..
                    } => Some(text.to_string()),
                    _ => None,
                };
            }
            current = candidate.get_prototype_of();
        }
        None
    }
}
