//! Binding initialization and destructuring.
//!
//! Binding patterns (declarations, parameters, catch clauses) and
//! assignment patterns share one walk. With an environment the leaves are
//! initialized in it; without one they are resolved in the running context
//! and written with PutValue, which is also how member-expression targets
//! of assignment patterns behave.

use crate::ast::{self, Pattern, PropertyName};
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::conversions::number_to_string;
use crate::runtime::environment::{Environment, get_identifier_reference};
use crate::runtime::property::PropertyKey;
use crate::runtime::reference::Reference;
use crate::runtime::value::Value;

use super::Interpreter;
use super::iteration::IteratorRecord;

/// Splits `target = default` into its parts.
fn split_default(pattern: &Pattern) -> (&Pattern, Option<&ast::Expression>) {
    match pattern {
        Pattern::Assignment(assignment) => (assignment.target.as_ref(), Some(assignment.default.as_ref())),
        _ => (pattern, None),
    }
}

impl Interpreter {
    /// BindingInitialization / DestructuringAssignmentEvaluation.
    pub(crate) fn binding_initialization(
        &mut self,
        pattern: &Pattern,
        value: Value,
        env: Option<&Environment>,
    ) -> Completion<()> {
        match pattern {
            Pattern::Identifier(_) | Pattern::Expression(_) => {
                let reference = self.target_reference(pattern, env)?;
                self.finish_target(pattern, reference, value, env)
            }
            Pattern::Object(object) => {
                self.require_object_coercible(&value)?;
                let mut excluded = Vec::with_capacity(object.properties.len());
                for property in &object.properties {
                    let key = self.evaluate_property_name(&property.key)?;
                    excluded.push(key.clone());
                    self.keyed_initialization(&property.value, &value, key, env)?;
                }
                if let Some(rest) = &object.rest {
                    let reference = self.target_reference(rest, env)?;
                    let rest_object = self.ordinary_object_create();
                    self.copy_data_properties(&rest_object, &value, &excluded)?;
                    self.finish_target(rest, reference, Value::Object(rest_object), env)?;
                }
                Ok(())
            }
            Pattern::Array(array) => {
                let mut record = self.get_iterator(&value)?;
                let result = self.iterator_initialization(array, &mut record, env);
                if record.done {
                    result
                } else {
                    self.iterator_close(&record, result)
                }
            }
            Pattern::Assignment(_) => Err(Abrupt::internal("default value outside of a pattern element")),
        }
    }

    /// KeyedBindingInitialization for one `key: target = default` entry.
    fn keyed_initialization(
        &mut self,
        element: &Pattern,
        source: &Value,
        key: PropertyKey,
        env: Option<&Environment>,
    ) -> Completion<()> {
        let (target, default) = split_default(element);
        let reference = self.target_reference(target, env)?;
        let mut value = self.get_v(source, key)?;
        if let Some(default) = default
            && value.is_undefined()
        {
            value = self.evaluate_default(target, default)?;
        }
        self.finish_target(target, reference, value, env)
    }

    /// IteratorBindingInitialization for an array pattern.
    fn iterator_initialization(
        &mut self,
        array: &ast::ArrayPattern,
        record: &mut IteratorRecord,
        env: Option<&Environment>,
    ) -> Completion<()> {
        for element in &array.elements {
            let Some(element) = element else {
                if !record.done {
                    self.iterator_step_value(record)?;
                }
                continue;
            };
            let (target, default) = split_default(element);
            let reference = self.target_reference(target, env)?;
            let mut value = if record.done {
                Value::Undefined
            } else {
                self.iterator_step_value(record)?.unwrap_or_default()
            };
            if let Some(default) = default
                && value.is_undefined()
            {
                value = self.evaluate_default(target, default)?;
            }
            self.finish_target(target, reference, value, env)?;
        }
        if let Some(rest) = &array.rest {
            let reference = self.target_reference(rest, env)?;
            let mut values = Vec::new();
            while !record.done {
                if let Some(value) = self.iterator_step_value(record)? {
                    values.push(value);
                }
            }
            let rest_array = self.create_array_from_list(values);
            self.finish_target(rest, reference, Value::Object(rest_array), env)?;
        }
        Ok(())
    }

    /// IteratorBindingInitialization of a formal parameter list over the
    /// argument list.
    pub(crate) fn bind_formal_parameters(
        &mut self,
        function: &ast::Function,
        args: &[Value],
        env: Option<&Environment>,
    ) -> Completion<()> {
        for (index, param) in function.params.iter().enumerate() {
            let (target, default) = split_default(param);
            let reference = self.target_reference(target, env)?;
            let mut value = args.get(index).cloned().unwrap_or_default();
            if let Some(default) = default
                && value.is_undefined()
            {
                value = self.evaluate_default(target, default)?;
            }
            self.finish_target(target, reference, value, env)?;
        }
        if let Some(rest) = &function.rest {
            let reference = self.target_reference(rest, env)?;
            let remaining = args.get(function.params.len()..).unwrap_or_default();
            let rest_array = self.create_array_from_list(remaining.iter().cloned());
            self.finish_target(rest, reference, Value::Object(rest_array), env)?;
        }
        Ok(())
    }

    /// The reference a leaf target writes to, resolved before its value is
    /// read. Nested patterns have none.
    fn target_reference(&mut self, target: &Pattern, env: Option<&Environment>) -> Completion<Option<Reference>> {
        match target {
            Pattern::Identifier(id) => {
                let reference = match env {
                    Some(env) => {
                        let strict = self.is_strict();
                        get_identifier_reference(self, Some(env), &id.name, strict)?
                    }
                    None => self.resolve_binding(&id.name)?,
                };
                Ok(Some(reference))
            }
            Pattern::Expression(expression) => self.evaluate_reference(expression).map(Some),
            _ => Ok(None),
        }
    }

    fn finish_target(
        &mut self,
        target: &Pattern,
        reference: Option<Reference>,
        value: Value,
        env: Option<&Environment>,
    ) -> Completion<()> {
        match reference {
            Some(reference) if env.is_some() => reference.initialize_referenced_binding(self, value),
            Some(reference) => reference.put_value(self, value),
            None => self.binding_initialization(target, value, env),
        }
    }

    /// Evaluates a default value; anonymous functions are named after an
    /// identifier target.
    fn evaluate_default(&mut self, target: &Pattern, default: &ast::Expression) -> Completion<Value> {
        match target {
            Pattern::Identifier(id) if default.is_anonymous_function_definition() => {
                self.named_evaluation(default, &PropertyKey::from(&*id.name))
            }
            _ => self.evaluate_expression(default),
        }
    }

    /// The key denoted by a property name, evaluating computed keys.
    pub(crate) fn evaluate_property_name(&mut self, name: &PropertyName) -> Completion<PropertyKey> {
        match name {
            PropertyName::String(text) => Ok(PropertyKey::String(text.clone())),
            PropertyName::Number(number) => Ok(PropertyKey::from(number_to_string(*number))),
            PropertyName::Computed(expression) => {
                let value = self.evaluate_expression(expression)?;
                self.to_property_key(&value)
            }
        }
    }
}
