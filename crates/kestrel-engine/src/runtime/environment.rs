//! Environment records and lexical environments.
//!
//! An [`Environment`] is a reference-counted node pairing an
//! [`EnvironmentRecord`] with its outer environment, so closures keep their
//! defining scope alive after the frame that created it returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::ast::Name;
use crate::interpreter::Interpreter;

use super::completion::{Abrupt, Completion};
use super::object::JsObject;
use super::property::{Property, PropertyDescriptor, PropertyKey};
use super::reference::Reference;
use super::symbol::well_known;
use super::value::Value;

/// A single binding in a declarative record.
#[derive(Debug, Clone)]
pub struct Binding {
    /// `None` while uninitialized (the temporal dead zone)
    pub value: Option<Value>,
    /// Whether assignment is allowed
    pub mutable: bool,
    /// Whether `delete` may remove it
    pub deletable: bool,
    /// Immutable bindings created strict always throw on assignment
    pub strict: bool,
}

/// Name → binding storage, in creation order.
#[derive(Default)]
pub struct DeclarativeRecord {
    bindings: RefCell<IndexMap<Name, Binding, FxBuildHasher>>,
}

impl DeclarativeRecord {
    /// HasBinding.
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// CreateMutableBinding.
    pub fn create_mutable_binding(&self, name: &Name, deletable: bool) -> Completion<()> {
        self.create(name, Binding {
            value: None,
            mutable: true,
            deletable,
            strict: false,
        })
    }

    /// CreateImmutableBinding.
    pub fn create_immutable_binding(&self, name: &Name, strict: bool) -> Completion<()> {
        self.create(name, Binding {
            value: None,
            mutable: false,
            deletable: false,
            strict,
        })
    }

    fn create(&self, name: &Name, binding: Binding) -> Completion<()> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(Abrupt::internal(format!("binding '{name}' already exists")));
        }
        bindings.insert(name.clone(), binding);
        Ok(())
    }

    /// InitializeBinding.
    pub fn initialize_binding(&self, name: &str, value: Value) -> Completion<()> {
        match self.bindings.borrow_mut().get_mut(name) {
            Some(binding) => {
                binding.value = Some(value);
                Ok(())
            }
            None => Err(Abrupt::internal(format!("binding '{name}' does not exist"))),
        }
    }

    /// SetMutableBinding.
    pub fn set_mutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        value: Value,
        strict: bool,
    ) -> Completion<()> {
        enum Outcome {
            Missing,
            Uninitialized,
            Constant(bool),
            Written,
        }
        let outcome = match self.bindings.borrow_mut().get_mut(&**name) {
            None => Outcome::Missing,
            Some(binding) if binding.value.is_none() => Outcome::Uninitialized,
            Some(binding) if binding.mutable => {
                binding.value = Some(value.clone());
                Outcome::Written
            }
            Some(binding) => Outcome::Constant(binding.strict || strict),
        };
        match outcome {
            Outcome::Written | Outcome::Constant(false) => Ok(()),
            Outcome::Missing if strict => Err(interp.reference_error(format!("{name} is not defined"))),
            Outcome::Missing => {
                self.create_mutable_binding(name, true)?;
                self.initialize_binding(name, value)
            }
            Outcome::Uninitialized => Err(uninitialized(interp, name)),
            Outcome::Constant(true) => Err(interp.type_error("Assignment to constant variable.")),
        }
    }

    /// GetBindingValue.
    pub fn get_binding_value(&self, interp: &mut Interpreter, name: &str) -> Completion<Value> {
        let value = self.bindings.borrow().get(name).map(|binding| binding.value.clone());
        match value {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(uninitialized(interp, name)),
            None => Err(Abrupt::internal(format!("binding '{name}' does not exist"))),
        }
    }

    /// DeleteBinding.
    pub fn delete_binding(&self, name: &str) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        match bindings.get(name) {
            Some(binding) if !binding.deletable => false,
            Some(_) => {
                bindings.shift_remove(name);
                true
            }
            None => true,
        }
    }

    /// The bound names, in creation order.
    pub fn binding_names(&self) -> Vec<Name> {
        self.bindings.borrow().keys().cloned().collect()
    }

    /// Reads a binding without TDZ checks; `None` when missing or
    /// uninitialized.
    pub fn binding_value(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).and_then(|binding| binding.value.clone())
    }

    /// Overwrites an existing binding's value without mutability checks.
    pub fn set_binding_value(&self, name: &str, value: Value) {
        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            binding.value = Some(value);
        }
    }
}

fn uninitialized(interp: &Interpreter, name: &str) -> Abrupt {
    interp.reference_error(format!("Cannot access '{name}' before initialization"))
}

/// A record whose bindings are the properties of an object (`with` and the
/// var half of the global record).
pub struct ObjectRecord {
    /// The binding object
    pub binding_object: JsObject,
    /// Whether this record was created by a `with` statement
    pub with_environment: bool,
}

impl ObjectRecord {
    fn key(name: &str) -> PropertyKey {
        PropertyKey::from(name)
    }

    /// HasBinding, honouring `@@unscopables` for `with` records.
    pub fn has_binding(&self, interp: &mut Interpreter, name: &str) -> Completion<bool> {
        let key = Self::key(name);
        if !self.binding_object.has_property(&key) {
            return Ok(false);
        }
        if !self.with_environment {
            return Ok(true);
        }
        let unscopables = interp.get(&self.binding_object, well_known().unscopables.clone())?;
        if let Value::Object(unscopables) = unscopables {
            let blocked = interp.get(&unscopables, key)?;
            if super::conversions::to_boolean(&blocked) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// CreateMutableBinding.
    pub fn create_mutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &str,
        deletable: bool,
    ) -> Completion<()> {
        let desc = PropertyDescriptor::data(Value::Undefined, true, true, deletable);
        self.binding_object
            .define_property_or_throw(interp, &Self::key(name), desc)
    }

    /// SetMutableBinding.
    pub fn set_mutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &str,
        value: Value,
        strict: bool,
    ) -> Completion<()> {
        let key = Self::key(name);
        let still_exists = self.binding_object.has_property(&key);
        if !still_exists && strict {
            return Err(interp.reference_error(format!("{name} is not defined")));
        }
        interp.set(&self.binding_object, key, value, strict)
    }

    /// GetBindingValue.
    pub fn get_binding_value(
        &self,
        interp: &mut Interpreter,
        name: &str,
        strict: bool,
    ) -> Completion<Value> {
        let key = Self::key(name);
        if !self.binding_object.has_property(&key) {
            if strict {
                return Err(interp.reference_error(format!("{name} is not defined")));
            }
            return Ok(Value::Undefined);
        }
        interp.get(&self.binding_object, key)
    }
}

/// The `this` binding state of a function record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisBindingStatus {
    /// Arrow functions: `this` comes from the outer scope
    Lexical,
    /// Not bound yet
    Uninitialized,
    /// Bound
    Initialized,
}

/// The top-level record of a function invocation.
pub struct FunctionRecord {
    /// Parameter and body bindings
    pub declarative: DeclarativeRecord,
    this_value: RefCell<Value>,
    this_status: Cell<ThisBindingStatus>,
    /// The function being invoked
    pub function_object: JsObject,
    /// `new.target` for this invocation
    pub new_target: Option<JsObject>,
}

impl FunctionRecord {
    /// BindThisValue.
    pub fn bind_this_value(&self, interp: &mut Interpreter, value: Value) -> Completion<()> {
        match self.this_status.get() {
            ThisBindingStatus::Lexical => Err(Abrupt::internal("bind_this_value on a lexical this")),
            ThisBindingStatus::Initialized => {
                Err(interp.reference_error("'this' has already been initialized"))
            }
            ThisBindingStatus::Uninitialized => {
                *self.this_value.borrow_mut() = value;
                self.this_status.set(ThisBindingStatus::Initialized);
                Ok(())
            }
        }
    }

    /// GetThisBinding.
    pub fn get_this_binding(&self, interp: &mut Interpreter) -> Completion<Value> {
        match self.this_status.get() {
            ThisBindingStatus::Lexical => Err(Abrupt::internal("get_this_binding on a lexical this")),
            ThisBindingStatus::Uninitialized => Err(interp.reference_error(
                "Must call super constructor before accessing 'this'",
            )),
            ThisBindingStatus::Initialized => Ok(self.this_value.borrow().clone()),
        }
    }

    /// The function's `[[HomeObject]]`, if it is a method.
    pub fn home_object(&self) -> Option<JsObject> {
        self.function_object
            .script_function()
            .and_then(|function| function.home_object())
    }

    /// HasSuperBinding.
    pub fn has_super_binding(&self) -> bool {
        self.this_status.get() != ThisBindingStatus::Lexical && self.home_object().is_some()
    }

    /// GetSuperBase.
    pub fn get_super_base(&self) -> Value {
        match self.home_object() {
            Some(home) => Value::from(home.get_prototype_of()),
            None => Value::Undefined,
        }
    }
}

/// The realm's global record: lexical declarations in a declarative part,
/// `var` and function declarations on the global object.
pub struct GlobalRecord {
    /// The var half, backed by the global object
    pub object_record: ObjectRecord,
    /// The value of `this` at the top level
    pub global_this: JsObject,
    /// `let`, `const` and class declarations
    pub declarative: DeclarativeRecord,
    var_names: RefCell<FxHashSet<Name>>,
}

impl GlobalRecord {
    fn global_object(&self) -> &JsObject {
        &self.object_record.binding_object
    }

    /// HasVarDeclaration.
    pub fn has_var_declaration(&self, name: &str) -> bool {
        self.var_names.borrow().contains(name)
    }

    /// HasLexicalDeclaration.
    pub fn has_lexical_declaration(&self, name: &str) -> bool {
        self.declarative.has_binding(name)
    }

    /// HasRestrictedGlobalProperty.
    pub fn has_restricted_global_property(&self, name: &str) -> bool {
        self.global_object()
            .get_own_property(&PropertyKey::from(name))
            .is_some_and(|property| !property.configurable())
    }

    /// CanDeclareGlobalVar.
    pub fn can_declare_global_var(&self, name: &str) -> bool {
        self.global_object().has_own_property(&PropertyKey::from(name))
            || self.global_object().is_extensible()
    }

    /// CanDeclareGlobalFunction.
    pub fn can_declare_global_function(&self, name: &str) -> bool {
        match self.global_object().get_own_property(&PropertyKey::from(name)) {
            None => self.global_object().is_extensible(),
            Some(property) if property.configurable() => true,
            Some(Property::Data {
                writable: true,
                enumerable: true,
                ..
            }) => true,
            Some(_) => false,
        }
    }

    /// CreateGlobalVarBinding.
    pub fn create_global_var_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        deletable: bool,
    ) -> Completion<()> {
        let has_own = self.global_object().has_own_property(&PropertyKey::from(&**name));
        if !has_own && self.global_object().is_extensible() {
            self.object_record.create_mutable_binding(interp, name, deletable)?;
            self.object_record
                .set_mutable_binding(interp, name, Value::Undefined, false)?;
        }
        self.var_names.borrow_mut().insert(name.clone());
        Ok(())
    }

    /// CreateGlobalFunctionBinding.
    pub fn create_global_function_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        value: Value,
        deletable: bool,
    ) -> Completion<()> {
        let key = PropertyKey::from(&**name);
        let existing = self.global_object().get_own_property(&key);
        let desc = match existing {
            Some(property) if !property.configurable() => PropertyDescriptor::value(value.clone()),
            _ => PropertyDescriptor::data(value.clone(), true, true, deletable),
        };
        self.global_object().define_property_or_throw(interp, &key, desc)?;
        interp.set(self.global_object(), key, value, false)?;
        self.var_names.borrow_mut().insert(name.clone());
        Ok(())
    }
}

/// The kinds of environment record.
pub enum EnvironmentRecord {
    /// Blocks, catch clauses, function bodies with separate var scopes
    Declarative(DeclarativeRecord),
    /// `with` statements
    Object(ObjectRecord),
    /// Function invocations
    Function(FunctionRecord),
    /// The realm's global scope
    Global(GlobalRecord),
    /// A module's top-level scope; `this` is undefined
    Module(DeclarativeRecord),
}

struct EnvironmentNode {
    record: EnvironmentRecord,
    outer: Option<Environment>,
}

/// A lexical environment: a record plus its outer environment.
#[derive(Clone)]
pub struct Environment(Rc<EnvironmentNode>);

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0.record {
            EnvironmentRecord::Declarative(_) => "Declarative",
            EnvironmentRecord::Object(_) => "Object",
            EnvironmentRecord::Function(_) => "Function",
            EnvironmentRecord::Global(_) => "Global",
            EnvironmentRecord::Module(_) => "Module",
        };
        write!(f, "Environment({kind} @ {:p})", Rc::as_ptr(&self.0))
    }
}

impl Environment {
    fn from_record(record: EnvironmentRecord, outer: Option<Environment>) -> Self {
        Self(Rc::new(EnvironmentNode { record, outer }))
    }

    /// NewDeclarativeEnvironment.
    pub fn new_declarative(outer: Option<Environment>) -> Self {
        Self::from_record(EnvironmentRecord::Declarative(DeclarativeRecord::default()), outer)
    }

    /// NewObjectEnvironment.
    pub fn new_object(binding_object: JsObject, with_environment: bool, outer: Option<Environment>) -> Self {
        Self::from_record(
            EnvironmentRecord::Object(ObjectRecord {
                binding_object,
                with_environment,
            }),
            outer,
        )
    }

    /// NewFunctionEnvironment.
    pub fn new_function(
        function_object: JsObject,
        lexical_this: bool,
        new_target: Option<JsObject>,
        outer: Environment,
    ) -> Self {
        let status = if lexical_this {
            ThisBindingStatus::Lexical
        } else {
            ThisBindingStatus::Uninitialized
        };
        Self::from_record(
            EnvironmentRecord::Function(FunctionRecord {
                declarative: DeclarativeRecord::default(),
                this_value: RefCell::new(Value::Undefined),
                this_status: Cell::new(status),
                function_object,
                new_target,
            }),
            Some(outer),
        )
    }

    /// NewGlobalEnvironment.
    pub fn new_global(global_object: JsObject, global_this: JsObject) -> Self {
        Self::from_record(
            EnvironmentRecord::Global(GlobalRecord {
                object_record: ObjectRecord {
                    binding_object: global_object,
                    with_environment: false,
                },
                global_this,
                declarative: DeclarativeRecord::default(),
                var_names: RefCell::new(FxHashSet::default()),
            }),
            None,
        )
    }

    /// NewModuleEnvironment.
    pub fn new_module(outer: Environment) -> Self {
        Self::from_record(EnvironmentRecord::Module(DeclarativeRecord::default()), Some(outer))
    }

    /// The record.
    pub fn record(&self) -> &EnvironmentRecord {
        &self.0.record
    }

    /// The outer environment.
    pub fn outer(&self) -> Option<&Environment> {
        self.0.outer.as_ref()
    }

    /// The declarative storage of this record, when it has one.
    pub fn declarative(&self) -> Option<&DeclarativeRecord> {
        match &self.0.record {
            EnvironmentRecord::Declarative(record) | EnvironmentRecord::Module(record) => Some(record),
            EnvironmentRecord::Function(record) => Some(&record.declarative),
            EnvironmentRecord::Global(_) | EnvironmentRecord::Object(_) => None,
        }
    }

    /// The function record, when this is one.
    pub fn as_function(&self) -> Option<&FunctionRecord> {
        match &self.0.record {
            EnvironmentRecord::Function(record) => Some(record),
            _ => None,
        }
    }

    /// The global record, when this is one.
    pub fn as_global(&self) -> Option<&GlobalRecord> {
        match &self.0.record {
            EnvironmentRecord::Global(record) => Some(record),
            _ => None,
        }
    }

    /// HasBinding.
    pub fn has_binding(&self, interp: &mut Interpreter, name: &str) -> Completion<bool> {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.has_binding(interp, name),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    return Ok(true);
                }
                record.object_record.has_binding(interp, name)
            }
            _ => Ok(self.declarative().is_some_and(|record| record.has_binding(name))),
        }
    }

    /// CreateMutableBinding.
    pub fn create_mutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        deletable: bool,
    ) -> Completion<()> {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.create_mutable_binding(interp, name, deletable),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    return Err(interp.type_error(format!("Identifier '{name}' has already been declared")));
                }
                record.declarative.create_mutable_binding(name, deletable)
            }
            _ => self.declarative_or_fault()?.create_mutable_binding(name, deletable),
        }
    }

    /// CreateImmutableBinding.
    pub fn create_immutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        strict: bool,
    ) -> Completion<()> {
        match &self.0.record {
            EnvironmentRecord::Object(_) => {
                Err(Abrupt::internal("object records have no immutable bindings"))
            }
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    return Err(interp.type_error(format!("Identifier '{name}' has already been declared")));
                }
                record.declarative.create_immutable_binding(name, strict)
            }
            _ => self.declarative_or_fault()?.create_immutable_binding(name, strict),
        }
    }

    /// InitializeBinding.
    pub fn initialize_binding(&self, interp: &mut Interpreter, name: &Name, value: Value) -> Completion<()> {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.set_mutable_binding(interp, name, value, false),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    record.declarative.initialize_binding(name, value)
                } else {
                    record.object_record.set_mutable_binding(interp, name, value, false)
                }
            }
            _ => self.declarative_or_fault()?.initialize_binding(name, value),
        }
    }

    /// SetMutableBinding.
    pub fn set_mutable_binding(
        &self,
        interp: &mut Interpreter,
        name: &Name,
        value: Value,
        strict: bool,
    ) -> Completion<()> {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.set_mutable_binding(interp, name, value, strict),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    record.declarative.set_mutable_binding(interp, name, value, strict)
                } else {
                    record.object_record.set_mutable_binding(interp, name, value, strict)
                }
            }
            _ => self
                .declarative_or_fault()?
                .set_mutable_binding(interp, name, value, strict),
        }
    }

    /// GetBindingValue.
    pub fn get_binding_value(&self, interp: &mut Interpreter, name: &str, strict: bool) -> Completion<Value> {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.get_binding_value(interp, name, strict),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    record.declarative.get_binding_value(interp, name)
                } else {
                    record.object_record.get_binding_value(interp, name, strict)
                }
            }
            _ => self.declarative_or_fault()?.get_binding_value(interp, name),
        }
    }

    /// DeleteBinding.
    pub fn delete_binding(&self, name: &str) -> bool {
        match &self.0.record {
            EnvironmentRecord::Object(record) => record.binding_object.delete(&PropertyKey::from(name)),
            EnvironmentRecord::Global(record) => {
                if record.declarative.has_binding(name) {
                    return record.declarative.delete_binding(name);
                }
                let key = PropertyKey::from(name);
                if record.global_object().has_own_property(&key) {
                    let deleted = record.global_object().delete(&key);
                    if deleted {
                        record.var_names.borrow_mut().remove(name);
                    }
                    return deleted;
                }
                true
            }
            _ => self
                .declarative()
                .is_none_or(|record| record.delete_binding(name)),
        }
    }

    /// HasThisBinding.
    pub fn has_this_binding(&self) -> bool {
        match &self.0.record {
            EnvironmentRecord::Function(record) => record.this_status.get() != ThisBindingStatus::Lexical,
            EnvironmentRecord::Global(_) | EnvironmentRecord::Module(_) => true,
            EnvironmentRecord::Declarative(_) | EnvironmentRecord::Object(_) => false,
        }
    }

    /// HasSuperBinding.
    pub fn has_super_binding(&self) -> bool {
        self.as_function().is_some_and(FunctionRecord::has_super_binding)
    }

    /// WithBaseObject.
    pub fn with_base_object(&self) -> Option<JsObject> {
        match &self.0.record {
            EnvironmentRecord::Object(record) if record.with_environment => {
                Some(record.binding_object.clone())
            }
            _ => None,
        }
    }

    /// GetThisBinding, for records that have one.
    pub fn get_this_binding(&self, interp: &mut Interpreter) -> Completion<Value> {
        match &self.0.record {
            EnvironmentRecord::Function(record) => record.get_this_binding(interp),
            EnvironmentRecord::Global(record) => Ok(Value::Object(record.global_this.clone())),
            EnvironmentRecord::Module(_) => Ok(Value::Undefined),
            _ => Err(Abrupt::internal("environment has no this binding")),
        }
    }

    /// The names bound directly in this record.
    pub fn binding_names(&self) -> Vec<Name> {
        match &self.0.record {
            EnvironmentRecord::Global(record) => {
                let mut names = record.declarative.binding_names();
                names.extend(record.var_names.borrow().iter().cloned());
                names
            }
            EnvironmentRecord::Object(record) => record
                .binding_object
                .own_property_keys()
                .into_iter()
                .filter_map(|key| key.as_string().map(|name| Name::from(name.to_std_string())))
                .collect(),
            _ => self.declarative().map(DeclarativeRecord::binding_names).unwrap_or_default(),
        }
    }

    fn declarative_or_fault(&self) -> Completion<&DeclarativeRecord> {
        self.declarative()
            .ok_or_else(|| Abrupt::internal("expected a declarative environment record"))
    }
}

/// GetIdentifierReference: walks outward until a record has the binding.
pub fn get_identifier_reference(
    interp: &mut Interpreter,
    env: Option<&Environment>,
    name: &Name,
    strict: bool,
) -> Completion<Reference> {
    let mut current = env.cloned();
    while let Some(env) = current {
        if env.has_binding(interp, name)? {
            return Ok(Reference::Environment {
                env,
                name: name.clone(),
                strict,
            });
        }
        current = env.outer().cloned();
    }
    Ok(Reference::Unresolvable {
        name: name.clone(),
        strict,
    })
}

/// GetThisEnvironment: the nearest record with a `this` binding.
pub fn get_this_environment(env: &Environment) -> Environment {
    let mut current = env.clone();
    loop {
        if current.has_this_binding() {
            return current;
        }
        match current.outer() {
            Some(outer) => current = outer.clone(),
            None => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Name {
        Name::from(text)
    }

    #[test]
    fn test_declarative_binding_lifecycle() {
        let record = DeclarativeRecord::default();
        record.create_mutable_binding(&name("x"), false).unwrap();
        assert!(record.has_binding("x"));
        assert_eq!(record.binding_value("x"), None);

        record.initialize_binding("x", Value::from(1)).unwrap();
        assert_eq!(record.binding_value("x"), Some(Value::from(1)));
        assert!(!record.delete_binding("x"));
    }

    #[test]
    fn test_duplicate_binding_is_a_fault() {
        let record = DeclarativeRecord::default();
        record.create_immutable_binding(&name("c"), true).unwrap();
        assert!(matches!(
            record.create_mutable_binding(&name("c"), false),
            Err(Abrupt::Fault(_))
        ));
    }

    #[test]
    fn test_binding_names_keep_creation_order() {
        let env = Environment::new_declarative(None);
        let record = env.declarative().unwrap();
        for n in ["b", "a", "c"] {
            record.create_mutable_binding(&name(n), true).unwrap();
        }
        let names: Vec<String> = env.binding_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(record.delete_binding("a"));
        assert_eq!(env.binding_names().len(), 2);
    }

    #[test]
    fn test_this_environment_skips_blocks() {
        let global = JsObject::ordinary(None);
        let global_env = Environment::new_global(global.clone(), global);
        let block = Environment::new_declarative(Some(global_env.clone()));
        let inner = Environment::new_declarative(Some(block));
        assert_eq!(get_this_environment(&inner), global_env);
        assert!(!inner.has_this_binding());
    }
}
