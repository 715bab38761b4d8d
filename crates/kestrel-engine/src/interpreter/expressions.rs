//! Expression evaluation.

use std::rc::Rc;

use crate::ast::{
    Argument, ArrayElement, AssignmentExpression, AssignmentOperator, CallExpression, Expression,
    Function, FunctionKind, Literal, LogicalOperator, MemberExpression, MemberProperty,
    ObjectMember, Pattern, UnaryOperator, UpdateOperator,
};
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::conversions::to_boolean;
use crate::runtime::environment::Environment;
use crate::runtime::function::{
    make_constructor, make_method, ordinary_function_create, set_function_name,
};
use crate::runtime::object::JsObject;
use crate::runtime::property::{PropertyDescriptor, PropertyKey};
use crate::runtime::reference::Reference;
use crate::runtime::string::JsString;
use crate::runtime::value::Value;

use super::Interpreter;

/// A readable name for a callee, used in "is not a function" messages.
fn callee_text(expression: &Expression) -> String {
    match expression {
        Expression::Identifier(id) => id.name.to_string(),
        Expression::This => "this".into(),
        Expression::Member(member) => {
            let object = callee_text(&member.object);
            match &member.property {
                MemberProperty::Identifier(name) => format!("{object}.{name}"),
                MemberProperty::Computed(_) => format!("{object}[...]"),
            }
        }
        Expression::SuperMember(MemberProperty::Identifier(name)) => format!("super.{name}"),
        Expression::Call(call) => format!("{}(...)", callee_text(&call.callee)),
        Expression::OptionalChain(inner) => callee_text(inner),
        _ => "expression".into(),
    }
}

impl Interpreter {
    /// Evaluates an expression to a value (Evaluation followed by GetValue).
    pub(crate) fn evaluate_expression(&mut self, expression: &Expression) -> Completion<Value> {
        super::grow_stack(|| self.evaluate_expression_inner(expression))
    }

    fn evaluate_expression_inner(&mut self, expression: &Expression) -> Completion<Value> {
        match expression {
            Expression::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null => Value::Null,
            }),
            Expression::Template(template) => {
                let mut units = Vec::new();
                for (index, quasi) in template.quasis.iter().enumerate() {
                    units.extend_from_slice(quasi.code_units());
                    if let Some(substitution) = template.expressions.get(index) {
                        let value = self.evaluate_expression(substitution)?;
                        units.extend_from_slice(self.to_string(&value)?.code_units());
                    }
                }
                Ok(Value::String(JsString::from(units)))
            }
            Expression::Identifier(id) => {
                let reference = self.resolve_binding(&id.name)?;
                reference.get_value(self)
            }
            Expression::This => self.resolve_this_binding(),
            Expression::Array(elements) => self.evaluate_array_literal(elements),
            Expression::Object(members) => self.evaluate_object_literal(members),
            Expression::Function(function) => self.function_expression(function, None).map(Value::Object),
            Expression::Arrow(function) => Ok(Value::Object(self.arrow_function(function, None))),
            Expression::Unary(unary) => self.evaluate_unary(unary.operator, &unary.argument),
            Expression::Update(update) => {
                let reference = self.evaluate_reference(&update.argument)?;
                let old = reference.get_value(self)?;
                let old = self.to_number(&old)?;
                let new = match update.operator {
                    UpdateOperator::Increment => old + 1.0,
                    UpdateOperator::Decrement => old - 1.0,
                };
                reference.put_value(self, Value::Number(new))?;
                Ok(Value::Number(if update.prefix { new } else { old }))
            }
            Expression::Binary(binary) => {
                let left = self.evaluate_expression(&binary.left)?;
                let right = self.evaluate_expression(&binary.right)?;
                self.apply_binary(binary.operator, left, right)
            }
            Expression::Logical(logical) => {
                let left = self.evaluate_expression(&logical.left)?;
                if short_circuits(logical.operator, &left) {
                    return Ok(left);
                }
                self.evaluate_expression(&logical.right)
            }
            Expression::Conditional(conditional) => {
                let test = self.evaluate_expression(&conditional.test)?;
                if to_boolean(&test) {
                    self.evaluate_expression(&conditional.consequent)
                } else {
                    self.evaluate_expression(&conditional.alternate)
                }
            }
            Expression::Assignment(assignment) => self.evaluate_assignment(assignment),
            Expression::Sequence(expressions) => {
                let mut value = Value::Undefined;
                for expression in expressions {
                    value = self.evaluate_expression(expression)?;
                }
                Ok(value)
            }
            Expression::Member(_) | Expression::Call(_) => {
                Ok(self.evaluate_chain(expression)?.unwrap_or_default())
            }
            Expression::OptionalChain(inner) => Ok(self.evaluate_chain(inner)?.unwrap_or_default()),
            Expression::SuperMember(_) => {
                let reference = self.evaluate_reference(expression)?;
                reference.get_value(self)
            }
            Expression::New(new) => {
                let constructor = self.evaluate_expression(&new.callee)?;
                let args = self.evaluate_arguments(&new.arguments)?;
                match &constructor {
                    Value::Object(object) if object.is_constructor() => {
                        self.construct(object, &args, None)
                    }
                    _ => Err(self.type_error(format!("{} is not a constructor", callee_text(&new.callee)))),
                }
            }
            Expression::NewTarget => Ok(self.get_new_target().map_or(Value::Undefined, Value::Object)),
            Expression::Yield(_) => Err(Abrupt::unsupported("generators")),
        }
    }

    /// Evaluates an expression that denotes a reference: an identifier, a
    /// property access or a `super` property access.
    pub(crate) fn evaluate_reference(&mut self, expression: &Expression) -> Completion<Reference> {
        match expression {
            Expression::Identifier(id) => self.resolve_binding(&id.name),
            Expression::Member(member) => match self.evaluate_member_reference(member)? {
                Some(reference) => Ok(reference),
                None => Err(Abrupt::internal("optional chain used as a reference")),
            },
            Expression::SuperMember(property) => {
                let env = self.get_this_environment();
                let actual_this = env.get_this_binding(self)?;
                let key = self.evaluate_member_property(property)?;
                let base = env
                    .as_function()
                    .map_or(Value::Undefined, |record| record.get_super_base());
                Ok(Reference::Property {
                    base,
                    key,
                    strict: self.is_strict(),
                    this_value: Some(actual_this),
                })
            }
            _ => Err(Abrupt::internal("expression is not a reference")),
        }
    }

    fn evaluate_member_property(&mut self, property: &MemberProperty) -> Completion<PropertyKey> {
        match property {
            MemberProperty::Identifier(name) => Ok(PropertyKey::from(&**name)),
            MemberProperty::Computed(expression) => {
                let value = self.evaluate_expression(expression)?;
                self.to_property_key(&value)
            }
        }
    }

    /// A property reference; `None` when an optional link short-circuits
    /// the chain.
    fn evaluate_member_reference(&mut self, member: &MemberExpression) -> Completion<Option<Reference>> {
        let Some(base) = self.evaluate_chain(&member.object)? else {
            return Ok(None);
        };
        if member.optional && base.is_nullish() {
            return Ok(None);
        }
        let key = self.evaluate_member_property(&member.property)?;
        Ok(Some(Reference::Property {
            base,
            key,
            strict: self.is_strict(),
            this_value: None,
        }))
    }

    /// Evaluates one link of an optional chain. `None` means a `?.` met a
    /// nullish value and the rest of the chain is skipped.
    fn evaluate_chain(&mut self, expression: &Expression) -> Completion<Option<Value>> {
        match expression {
            Expression::Member(member) => match self.evaluate_member_reference(member)? {
                Some(reference) => reference.get_value(self).map(Some),
                None => Ok(None),
            },
            Expression::Call(call) => self.evaluate_call(call),
            _ => self.evaluate_expression(expression).map(Some),
        }
    }

    fn evaluate_call(&mut self, call: &CallExpression) -> Completion<Option<Value>> {
        let (function, this) = match call.callee.as_ref() {
            Expression::Member(member) => {
                let Some(reference) = self.evaluate_member_reference(member)? else {
                    return Ok(None);
                };
                (reference.get_value(self)?, reference.this_value())
            }
            callee @ Expression::SuperMember(_) => {
                let reference = self.evaluate_reference(callee)?;
                (reference.get_value(self)?, reference.this_value())
            }
            Expression::Identifier(id) => {
                let reference = self.resolve_binding(&id.name)?;
                let function = reference.get_value(self)?;
                let this = match &reference {
                    Reference::Environment { env, .. } => env
                        .with_base_object()
                        .map_or(Value::Undefined, Value::Object),
                    _ => Value::Undefined,
                };
                (function, this)
            }
            callee => {
                let Some(function) = self.evaluate_chain(callee)? else {
                    return Ok(None);
                };
                (function, Value::Undefined)
            }
        };
        if call.optional && function.is_nullish() {
            return Ok(None);
        }
        let args = self.evaluate_arguments(&call.arguments)?;
        if !function.is_callable() {
            return Err(self.type_error(format!("{} is not a function", callee_text(&call.callee))));
        }
        self.call(&function, &this, &args).map(Some)
    }

    /// ArgumentListEvaluation.
    pub(crate) fn evaluate_arguments(&mut self, arguments: &[Argument]) -> Completion<Vec<Value>> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match argument {
                Argument::Expression(expression) => values.push(self.evaluate_expression(expression)?),
                Argument::Spread(expression) => {
                    let iterable = self.evaluate_expression(expression)?;
                    values.extend(self.iterable_to_list(&iterable)?);
                }
            }
        }
        Ok(values)
    }

    fn evaluate_unary(&mut self, operator: UnaryOperator, argument: &Expression) -> Completion<Value> {
        match operator {
            UnaryOperator::Delete => self.evaluate_delete(argument).map(Value::Boolean),
            UnaryOperator::Void => {
                self.evaluate_expression(argument)?;
                Ok(Value::Undefined)
            }
            UnaryOperator::Typeof => {
                if let Expression::Identifier(id) = argument {
                    let reference = self.resolve_binding(&id.name)?;
                    if reference.is_unresolvable() {
                        return Ok(Value::from("undefined"));
                    }
                    let value = reference.get_value(self)?;
                    return Ok(Value::from(value.type_of()));
                }
                let value = self.evaluate_expression(argument)?;
                Ok(Value::from(value.type_of()))
            }
            UnaryOperator::Plus => {
                let value = self.evaluate_expression(argument)?;
                Ok(Value::Number(self.to_number(&value)?))
            }
            UnaryOperator::Minus => {
                let value = self.evaluate_expression(argument)?;
                Ok(Value::Number(-self.to_number(&value)?))
            }
            UnaryOperator::BitwiseNot => {
                let value = self.evaluate_expression(argument)?;
                Ok(Value::from(!self.to_int32(&value)?))
            }
            UnaryOperator::LogicalNot => {
                let value = self.evaluate_expression(argument)?;
                Ok(Value::Boolean(!to_boolean(&value)))
            }
        }
    }

    fn evaluate_delete(&mut self, argument: &Expression) -> Completion<bool> {
        let reference = match argument {
            Expression::Identifier(_) | Expression::SuperMember(_) => self.evaluate_reference(argument)?,
            Expression::Member(member) => match self.evaluate_member_reference(member)? {
                Some(reference) => reference,
                None => return Ok(true),
            },
            Expression::OptionalChain(inner) => match inner.as_ref() {
                Expression::Member(member) => match self.evaluate_member_reference(member)? {
                    Some(reference) => reference,
                    None => return Ok(true),
                },
                _ => {
                    self.evaluate_chain(inner)?;
                    return Ok(true);
                }
            },
            _ => {
                self.evaluate_expression(argument)?;
                return Ok(true);
            }
        };
        match reference {
            Reference::Unresolvable { .. } => Ok(true),
            Reference::Environment { env, name, .. } => Ok(env.delete_binding(&name)),
            Reference::Property {
                this_value: Some(_), ..
            } => Err(self.reference_error("Unsupported reference to 'super'")),
            Reference::Property { base, key, strict, .. } => {
                let object = self.to_object(&base)?;
                let deleted = object.delete(&key);
                if !deleted && strict {
                    return Err(self.type_error(format!("Cannot delete property '{key}' of {}", self.describe(&base))));
                }
                Ok(deleted)
            }
        }
    }

    fn evaluate_assignment(&mut self, assignment: &AssignmentExpression) -> Completion<Value> {
        let target = &assignment.target;
        match assignment.operator {
            AssignmentOperator::Assign => match target {
                Pattern::Object(_) | Pattern::Array(_) => {
                    let value = self.evaluate_expression(&assignment.value)?;
                    self.binding_initialization(target, value.clone(), None)?;
                    Ok(value)
                }
                _ => {
                    let reference = self.pattern_reference(target)?;
                    let value = self.evaluate_assigned_value(target, &assignment.value)?;
                    reference.put_value(self, value.clone())?;
                    Ok(value)
                }
            },
            AssignmentOperator::Compound(operator) => {
                let reference = self.pattern_reference(target)?;
                let left = reference.get_value(self)?;
                let right = self.evaluate_expression(&assignment.value)?;
                let value = self.apply_binary(operator, left, right)?;
                reference.put_value(self, value.clone())?;
                Ok(value)
            }
            AssignmentOperator::Logical(operator) => {
                let reference = self.pattern_reference(target)?;
                let left = reference.get_value(self)?;
                if short_circuits(operator, &left) {
                    return Ok(left);
                }
                let value = self.evaluate_assigned_value(target, &assignment.value)?;
                reference.put_value(self, value.clone())?;
                Ok(value)
            }
        }
    }

    fn pattern_reference(&mut self, target: &Pattern) -> Completion<Reference> {
        match target {
            Pattern::Identifier(id) => self.resolve_binding(&id.name),
            Pattern::Expression(expression) => self.evaluate_reference(expression),
            _ => Err(Abrupt::internal("pattern is not a simple assignment target")),
        }
    }

    fn evaluate_assigned_value(&mut self, target: &Pattern, value: &Expression) -> Completion<Value> {
        match target {
            Pattern::Identifier(id) if value.is_anonymous_function_definition() => {
                self.named_evaluation(value, &PropertyKey::from(&*id.name))
            }
            _ => self.evaluate_expression(value),
        }
    }

    /// NamedEvaluation of an anonymous function definition.
    pub(crate) fn named_evaluation(&mut self, expression: &Expression, name: &PropertyKey) -> Completion<Value> {
        match expression {
            Expression::Function(function) if function.id.is_none() => {
                self.function_expression(function, Some(name)).map(Value::Object)
            }
            Expression::Arrow(function) => Ok(Value::Object(self.arrow_function(function, Some(name)))),
            _ => self.evaluate_expression(expression),
        }
    }

    /// InstantiateOrdinaryFunctionExpression. A named expression gets its
    /// own scope holding an immutable binding of its name.
    fn function_expression(&mut self, function: &Rc<Function>, name: Option<&PropertyKey>) -> Completion<JsObject> {
        let scope = self.lexical_environment();
        let closure = match &function.id {
            Some(id) => {
                let function_env = Environment::new_declarative(Some(scope));
                function_env.create_immutable_binding(self, &id.name, false)?;
                let closure = ordinary_function_create(self, function.clone(), function_env.clone());
                set_function_name(&closure, &PropertyKey::from(&*id.name), None);
                function_env.initialize_binding(self, &id.name, Value::Object(closure.clone()))?;
                closure
            }
            None => {
                let closure = ordinary_function_create(self, function.clone(), scope);
                let name = name.cloned().unwrap_or_else(|| PropertyKey::from(""));
                set_function_name(&closure, &name, None);
                closure
            }
        };
        if function.kind == FunctionKind::Normal {
            make_constructor(self, &closure, true, None);
        }
        Ok(closure)
    }

    fn arrow_function(&mut self, function: &Rc<Function>, name: Option<&PropertyKey>) -> JsObject {
        let scope = self.lexical_environment();
        let closure = ordinary_function_create(self, function.clone(), scope);
        let name = name.cloned().unwrap_or_else(|| PropertyKey::from(""));
        set_function_name(&closure, &name, None);
        closure
    }

    fn evaluate_array_literal(&mut self, elements: &[ArrayElement]) -> Completion<Value> {
        let array = JsObject::array(self.intrinsics().array_prototype.clone(), 0);
        let mut index: u32 = 0;
        for element in elements {
            match element {
                ArrayElement::Hole => index += 1,
                ArrayElement::Expression(expression) => {
                    let value = self.evaluate_expression(expression)?;
                    array.create_data_property_or_throw(self, &PropertyKey::from(index), value)?;
                    index += 1;
                }
                ArrayElement::Spread(expression) => {
                    let iterable = self.evaluate_expression(expression)?;
                    let mut record = self.get_iterator(&iterable)?;
                    while let Some(value) = self.iterator_step_value(&mut record)? {
                        array.create_data_property_or_throw(self, &PropertyKey::from(index), value)?;
                        index += 1;
                    }
                }
            }
        }
        self.set(&array, "length", Value::from(index), true)?;
        Ok(Value::Object(array))
    }

    fn evaluate_object_literal(&mut self, members: &[ObjectMember]) -> Completion<Value> {
        let object = self.ordinary_object_create();
        for member in members {
            match member {
                ObjectMember::Property(name, expression) => {
                    let key = self.evaluate_property_name(name)?;
                    let value = if expression.is_anonymous_function_definition() {
                        self.named_evaluation(expression, &key)?
                    } else {
                        self.evaluate_expression(expression)?
                    };
                    object.create_data_property_or_throw(self, &key, value)?;
                }
                ObjectMember::Shorthand(id) => {
                    let reference = self.resolve_binding(&id.name)?;
                    let value = reference.get_value(self)?;
                    object.create_data_property_or_throw(self, &PropertyKey::from(&*id.name), value)?;
                }
                ObjectMember::CoverInitializedName(..) => {
                    return Err(Abrupt::internal("cover initialized name outside a pattern"));
                }
                ObjectMember::Method(name, function) => {
                    let key = self.evaluate_property_name(name)?;
                    self.define_method_property(&object, key, function)?;
                }
                ObjectMember::Spread(expression) => {
                    let source = self.evaluate_expression(expression)?;
                    self.copy_data_properties(&object, &source, &[])?;
                }
                ObjectMember::Proto(expression) => {
                    let value = self.evaluate_expression(expression)?;
                    match value {
                        Value::Object(prototype) => {
                            object.set_prototype_of(Some(prototype));
                        }
                        Value::Null => {
                            object.set_prototype_of(None);
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(Value::Object(object))
    }

    /// MethodDefinitionEvaluation for object literal methods, getters,
    /// setters and generator methods.
    fn define_method_property(&mut self, object: &JsObject, key: PropertyKey, function: &Rc<Function>) -> Completion<()> {
        let scope = self.lexical_environment();
        let closure = ordinary_function_create(self, function.clone(), scope);
        make_method(&closure, object);
        let descriptor = match function.kind {
            FunctionKind::Getter => {
                set_function_name(&closure, &key, Some("get"));
                PropertyDescriptor {
                    get: Some(Value::Object(closure)),
                    enumerable: Some(true),
                    configurable: Some(true),
                    ..PropertyDescriptor::default()
                }
            }
            FunctionKind::Setter => {
                set_function_name(&closure, &key, Some("set"));
                PropertyDescriptor {
                    set: Some(Value::Object(closure)),
                    enumerable: Some(true),
                    configurable: Some(true),
                    ..PropertyDescriptor::default()
                }
            }
            _ => {
                set_function_name(&closure, &key, None);
                PropertyDescriptor::data(closure, true, true, true)
            }
        };
        object.define_property_or_throw(self, &key, descriptor)
    }
}

/// Whether a logical operator returns its left operand without evaluating
/// the right one.
fn short_circuits(operator: LogicalOperator, left: &Value) -> bool {
    match operator {
        LogicalOperator::And => !to_boolean(left),
        LogicalOperator::Or => to_boolean(left),
        LogicalOperator::Nullish => !left.is_nullish(),
    }
}
