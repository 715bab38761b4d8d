//! References: the result of evaluating an identifier or a property access.
//!
//! A reference is transient. It is produced by the evaluator, consumed by
//! [`Reference::get_value`] or [`Reference::put_value`], and never stored.

use crate::ast::Name;
use crate::interpreter::Interpreter;

use super::completion::Completion;
use super::environment::Environment;
use super::property::PropertyKey;
use super::value::Value;

/// A resolved name or property.
#[derive(Debug, Clone)]
pub enum Reference {
    /// A name no environment binds
    Unresolvable {
        /// The name
        name: Name,
        /// Whether the referencing code is strict
        strict: bool,
    },
    /// A binding in an environment record
    Environment {
        /// The environment holding the binding
        env: Environment,
        /// The name
        name: Name,
        /// Whether the referencing code is strict
        strict: bool,
    },
    /// A property of a value
    Property {
        /// The base value (may be a primitive)
        base: Value,
        /// The property key
        key: PropertyKey,
        /// Whether the referencing code is strict
        strict: bool,
        /// The receiver for `super.x` references
        this_value: Option<Value>,
    },
}

impl Reference {
    /// IsPropertyReference.
    pub fn is_property(&self) -> bool {
        matches!(self, Reference::Property { .. })
    }

    /// IsUnresolvableReference.
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Reference::Unresolvable { .. })
    }

    /// Whether the reference was produced by strict code.
    pub fn is_strict(&self) -> bool {
        match self {
            Reference::Unresolvable { strict, .. }
            | Reference::Environment { strict, .. }
            | Reference::Property { strict, .. } => *strict,
        }
    }

    /// GetThisValue for property references.
    pub fn this_value(&self) -> Value {
        match self {
            Reference::Property {
                this_value: Some(this),
                ..
            } => this.clone(),
            Reference::Property { base, .. } => base.clone(),
            _ => Value::Undefined,
        }
    }

    /// GetValue.
    pub fn get_value(&self, interp: &mut Interpreter) -> Completion<Value> {
        match self {
            Reference::Unresolvable { name, .. } => {
                Err(interp.reference_error(format!("{name} is not defined")))
            }
            Reference::Environment { env, name, strict } => env.get_binding_value(interp, name, *strict),
            Reference::Property { base, key, .. } => {
                let object = interp.to_object(base)?;
                object.get(interp, key, &self.this_value())
            }
        }
    }

    /// PutValue.
    pub fn put_value(&self, interp: &mut Interpreter, value: Value) -> Completion<()> {
        match self {
            Reference::Unresolvable { name, strict } => {
                if *strict {
                    return Err(interp.reference_error(format!("{name} is not defined")));
                }
                let global = interp.realm().global_object.clone();
                interp.set(&global, &**name, value, false)
            }
            Reference::Environment { env, name, strict } => {
                env.set_mutable_binding(interp, name, value, *strict)
            }
            Reference::Property { base, key, strict, .. } => {
                let object = interp.to_object(base)?;
                let succeeded = object.set(interp, key, value, &self.this_value())?;
                if !succeeded && *strict {
                    return Err(interp.type_error(format!(
                        "Cannot assign to read only property '{key}' of {}",
                        base.type_of()
                    )));
                }
                Ok(())
            }
        }
    }

    /// InitializeReferencedBinding.
    pub fn initialize_referenced_binding(&self, interp: &mut Interpreter, value: Value) -> Completion<()> {
        match self {
            Reference::Environment { env, name, .. } => env.initialize_binding(interp, name, value),
            _ => self.put_value(interp, value),
        }
    }
}
