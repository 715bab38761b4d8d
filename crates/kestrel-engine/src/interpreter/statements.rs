//! Statement evaluation.

use tracing::trace;

use crate::ast::{
    self, BlockStatement, ForInLeft, ForInit, Name, Pattern, Statement, SwitchCase, TryStatement,
    VariableDeclaration, VariableKind, scope,
};
use crate::runtime::completion::{Abrupt, Completion, StatementCompletion, loop_continues, update_empty};
use crate::runtime::conversions::to_boolean;
use crate::runtime::environment::Environment;
use crate::runtime::function::instantiate_function_object;
use crate::runtime::property::PropertyKey;
use crate::runtime::value::{Value, is_strictly_equal};

use super::Interpreter;
use super::iteration::{IteratorRecord, PropertyEnumerator};

/// How a for-in/of head binds each value.
enum IterationBinding<'a> {
    /// An assignment target or a `var` declaration
    Assignment(&'a Pattern),
    /// A `let` or `const` declaration
    Lexical(&'a Pattern, bool),
}

/// The source of values for a for-in/of body.
enum IterationSource {
    Keys(PropertyEnumerator),
    Iterator(IteratorRecord),
}

/// The completion of a loop whose body stopped it: a `break` aimed at this
/// loop becomes a normal completion carrying the loop's value.
fn exit_loop(completion: StatementCompletion, labels: &[Name], value: Value) -> StatementCompletion {
    match update_empty(completion, Some(value)) {
        Err(Abrupt::Break(None, result)) => Ok(result),
        Err(Abrupt::Break(Some(label), result)) if labels.contains(&label) => Ok(result),
        other => other,
    }
}

/// Keeps the value of a body completion that lets the loop go on.
fn carry_value(completion: &StatementCompletion, value: &mut Value) {
    if let Ok(Some(result)) | Err(Abrupt::Continue(_, Some(result))) = completion {
        *value = result.clone();
    }
}

impl Interpreter {
    /// Evaluates a statement list, keeping the last non-empty value.
    pub(crate) fn evaluate_statement_list(&mut self, statements: &[Statement]) -> StatementCompletion {
        let mut last = None;
        for statement in statements {
            let result = self.evaluate_statement(statement);
            last = update_empty(result, last)?;
        }
        Ok(last)
    }

    /// Evaluates one statement. Every statement charges one step.
    pub(crate) fn evaluate_statement(&mut self, statement: &Statement) -> StatementCompletion {
        self.step()?;
        super::grow_stack(|| self.labelled_evaluation(statement, &mut Vec::new()))
    }

    /// LabelledEvaluation: `labels` is the label set of the statement.
    fn labelled_evaluation(&mut self, statement: &Statement, labels: &mut Vec<Name>) -> StatementCompletion {
        match statement {
            Statement::Labeled(labeled) => {
                let label = labeled.label.name.clone();
                labels.push(label.clone());
                let result = self.labelled_evaluation(&labeled.body, labels);
                match result {
                    Err(Abrupt::Break(Some(target), value)) if target == label => Ok(value),
                    other => other,
                }
            }
            Statement::While(statement) => self.evaluate_while(statement, labels),
            Statement::DoWhile(statement) => self.evaluate_do_while(statement, labels),
            Statement::For(statement) => self.evaluate_for(statement, labels),
            Statement::ForIn(statement) => {
                self.evaluate_for_in_of(&statement.left, &statement.right, &statement.body, false, labels)
            }
            Statement::ForOf(statement) => {
                self.evaluate_for_in_of(&statement.left, &statement.right, &statement.body, true, labels)
            }
            Statement::Switch(statement) => self.evaluate_switch(&statement.discriminant, &statement.cases),
            other => self.evaluate_plain_statement(other),
        }
    }

    fn evaluate_plain_statement(&mut self, statement: &Statement) -> StatementCompletion {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                self.evaluate_variable_declaration(declaration)?;
                Ok(None)
            }
            Statement::FunctionDeclaration(_) | Statement::Empty | Statement::Debugger => Ok(None),
            Statement::Expression(expression) => self.evaluate_expression(expression).map(Some),
            Statement::Block(block) => self.evaluate_block(block),
            Statement::If(statement) => {
                let test = self.evaluate_expression(&statement.test)?;
                let result = if to_boolean(&test) {
                    self.evaluate_statement(&statement.consequent)
                } else if let Some(alternate) = &statement.alternate {
                    self.evaluate_statement(alternate)
                } else {
                    Ok(None)
                };
                update_empty(result, Some(Value::Undefined))
            }
            Statement::Return(argument) => {
                let value = match argument {
                    Some(expression) => self.evaluate_expression(expression)?,
                    None => Value::Undefined,
                };
                Err(Abrupt::Return(value))
            }
            Statement::Break(label) => Err(Abrupt::Break(label.as_ref().map(|id| id.name.clone()), None)),
            Statement::Continue(label) => Err(Abrupt::Continue(label.as_ref().map(|id| id.name.clone()), None)),
            Statement::Throw(expression) => {
                let value = self.evaluate_expression(expression)?;
                Err(Abrupt::Throw(value))
            }
            Statement::Try(statement) => self.evaluate_try(statement),
            Statement::With(statement) => {
                let value = self.evaluate_expression(&statement.object)?;
                let object = self.to_object(&value)?;
                let env = Environment::new_object(object, true, Some(self.lexical_environment()));
                let result = self.with_lexical_environment(env, |interp| interp.evaluate_statement(&statement.body));
                update_empty(result, Some(Value::Undefined))
            }
            Statement::Labeled(_)
            | Statement::While(_)
            | Statement::DoWhile(_)
            | Statement::For(_)
            | Statement::ForIn(_)
            | Statement::ForOf(_)
            | Statement::Switch(_) => self.labelled_evaluation(statement, &mut Vec::new()),
        }
    }

    fn evaluate_variable_declaration(&mut self, declaration: &VariableDeclaration) -> Completion<()> {
        let lexical = declaration.kind.is_lexical();
        for declarator in &declaration.declarations {
            match &declarator.target {
                Pattern::Identifier(id) => {
                    if !lexical && declarator.init.is_none() {
                        continue;
                    }
                    let reference = self.resolve_binding(&id.name)?;
                    let value = match &declarator.init {
                        Some(init) if init.is_anonymous_function_definition() => {
                            self.named_evaluation(init, &PropertyKey::from(&*id.name))?
                        }
                        Some(init) => self.evaluate_expression(init)?,
                        None => Value::Undefined,
                    };
                    if lexical {
                        reference.initialize_referenced_binding(self, value)?;
                    } else {
                        reference.put_value(self, value)?;
                    }
                }
                pattern => {
                    let value = match &declarator.init {
                        Some(init) => self.evaluate_expression(init)?,
                        None => Value::Undefined,
                    };
                    let env = lexical.then(|| self.lexical_environment());
                    self.binding_initialization(pattern, value, env.as_ref())?;
                }
            }
        }
        Ok(())
    }

    fn evaluate_block(&mut self, block: &BlockStatement) -> StatementCompletion {
        if block.body.is_empty() {
            return Ok(None);
        }
        let env = Environment::new_declarative(Some(self.lexical_environment()));
        trace!(statements = block.body.len(), "entering block scope");
        self.block_declaration_instantiation(&block.body, &env)?;
        self.with_lexical_environment(env, |interp| interp.evaluate_statement_list(&block.body))
    }

    /// BlockDeclarationInstantiation.
    pub(crate) fn block_declaration_instantiation(
        &mut self,
        statements: &[Statement],
        env: &Environment,
    ) -> Completion<()> {
        for declaration in scope::lexically_scoped_declarations(statements, true) {
            let name = &declaration.name;
            if !env.has_binding(self, name)? {
                if declaration.is_constant() {
                    env.create_immutable_binding(self, name, true)?;
                } else {
                    env.create_mutable_binding(self, name, false)?;
                }
            }
            if let scope::DeclarationKind::Function(function) = &declaration.kind {
                let function_object = instantiate_function_object(self, function, env.clone());
                let initialized = env
                    .declarative()
                    .is_some_and(|record| record.binding_value(name).is_some());
                if initialized {
                    env.set_mutable_binding(self, name, Value::Object(function_object), false)?;
                } else {
                    env.initialize_binding(self, name, Value::Object(function_object))?;
                }
            }
        }
        Ok(())
    }

    fn evaluate_try(&mut self, statement: &TryStatement) -> StatementCompletion {
        let block = self.evaluate_block(&statement.block);
        if matches!(block, Err(Abrupt::Fault(_))) {
            return block;
        }
        let completion = match (block, &statement.handler) {
            (Err(Abrupt::Throw(thrown)), Some(handler)) => self.evaluate_catch(handler, thrown),
            (block, _) => block,
        };
        if matches!(completion, Err(Abrupt::Fault(_))) {
            return completion;
        }
        let completion = match &statement.finalizer {
            Some(finalizer) => match self.evaluate_block(finalizer) {
                Ok(_) => completion,
                abrupt => abrupt,
            },
            None => completion,
        };
        update_empty(completion, Some(Value::Undefined))
    }

    /// CatchClauseEvaluation.
    fn evaluate_catch(&mut self, handler: &ast::CatchClause, thrown: Value) -> StatementCompletion {
        let Some(param) = &handler.param else {
            return self.evaluate_block(&handler.body);
        };
        let catch_env = Environment::new_declarative(Some(self.lexical_environment()));
        for name in scope::pattern_names(param) {
            catch_env.create_mutable_binding(self, &name, false)?;
        }
        self.with_lexical_environment(catch_env.clone(), |interp| {
            interp.binding_initialization(param, thrown, Some(&catch_env))?;
            interp.evaluate_block(&handler.body)
        })
    }

    fn evaluate_while(&mut self, statement: &ast::WhileStatement, labels: &[Name]) -> StatementCompletion {
        let mut value = Value::Undefined;
        loop {
            let test = self.evaluate_expression(&statement.test)?;
            if !to_boolean(&test) {
                return Ok(Some(value));
            }
            let result = self.evaluate_statement(&statement.body);
            if !loop_continues(&result, labels) {
                return exit_loop(result, labels, value);
            }
            carry_value(&result, &mut value);
        }
    }

    fn evaluate_do_while(&mut self, statement: &ast::DoWhileStatement, labels: &[Name]) -> StatementCompletion {
        let mut value = Value::Undefined;
        loop {
            let result = self.evaluate_statement(&statement.body);
            if !loop_continues(&result, labels) {
                return exit_loop(result, labels, value);
            }
            carry_value(&result, &mut value);
            let test = self.evaluate_expression(&statement.test)?;
            if !to_boolean(&test) {
                return Ok(Some(value));
            }
        }
    }

    fn evaluate_for(&mut self, statement: &ast::ForStatement, labels: &[Name]) -> StatementCompletion {
        match &statement.init {
            Some(ForInit::Declaration(declaration)) if declaration.kind.is_lexical() => {
                let old_env = self.lexical_environment();
                let loop_env = Environment::new_declarative(Some(old_env.clone()));
                let is_const = declaration.kind == VariableKind::Const;
                let mut bound_names = Vec::new();
                for declarator in &declaration.declarations {
                    scope::bound_names(&declarator.target, &mut bound_names);
                }
                for name in &bound_names {
                    if is_const {
                        loop_env.create_immutable_binding(self, name, true)?;
                    } else {
                        loop_env.create_mutable_binding(self, name, false)?;
                    }
                }
                self.with_lexical_environment(loop_env, |interp| {
                    interp.evaluate_variable_declaration(declaration)?;
                    let per_iteration = if is_const { Vec::new() } else { bound_names };
                    interp.for_body_evaluation(statement, &per_iteration, labels)
                })
            }
            Some(ForInit::Declaration(declaration)) => {
                self.evaluate_variable_declaration(declaration)?;
                self.for_body_evaluation(statement, &[], labels)
            }
            Some(ForInit::Expression(expression)) => {
                self.evaluate_expression(expression)?;
                self.for_body_evaluation(statement, &[], labels)
            }
            None => self.for_body_evaluation(statement, &[], labels),
        }
    }

    /// ForBodyEvaluation.
    fn for_body_evaluation(
        &mut self,
        statement: &ast::ForStatement,
        per_iteration: &[Name],
        labels: &[Name],
    ) -> StatementCompletion {
        let mut value = Value::Undefined;
        self.create_per_iteration_environment(per_iteration)?;
        loop {
            if let Some(test) = &statement.test {
                let test = self.evaluate_expression(test)?;
                if !to_boolean(&test) {
                    return Ok(Some(value));
                }
            }
            let result = self.evaluate_statement(&statement.body);
            if !loop_continues(&result, labels) {
                return exit_loop(result, labels, value);
            }
            carry_value(&result, &mut value);
            self.create_per_iteration_environment(per_iteration)?;
            if let Some(update) = &statement.update {
                self.evaluate_expression(update)?;
            }
        }
    }

    /// CreatePerIterationEnvironment: copies the loop's `let` bindings into
    /// a fresh record so closures capture one iteration each.
    fn create_per_iteration_environment(&mut self, names: &[Name]) -> Completion<()> {
        if names.is_empty() {
            return Ok(());
        }
        let last = self.lexical_environment();
        let this_env = Environment::new_declarative(last.outer().cloned());
        for name in names {
            this_env.create_mutable_binding(self, name, false)?;
            let value = last.get_binding_value(self, name, true)?;
            this_env.initialize_binding(self, name, value)?;
        }
        self.set_lexical_environment(this_env);
        Ok(())
    }

    fn evaluate_for_in_of(
        &mut self,
        left: &ForInLeft,
        right: &ast::Expression,
        body: &Statement,
        iterate: bool,
        labels: &[Name],
    ) -> StatementCompletion {
        let (binding, tdz_names) = match left {
            ForInLeft::Declaration(kind, pattern) if kind.is_lexical() => (
                IterationBinding::Lexical(pattern, *kind == VariableKind::Const),
                scope::pattern_names(pattern),
            ),
            ForInLeft::Declaration(_, pattern) | ForInLeft::Pattern(pattern) => {
                (IterationBinding::Assignment(pattern), Vec::new())
            }
        };

        // ForIn/OfHeadEvaluation
        let value = if tdz_names.is_empty() {
            self.evaluate_expression(right)?
        } else {
            let tdz = Environment::new_declarative(Some(self.lexical_environment()));
            for name in &tdz_names {
                tdz.create_mutable_binding(self, name, false)?;
            }
            self.with_lexical_environment(tdz, |interp| interp.evaluate_expression(right))?
        };
        let source = if iterate {
            IterationSource::Iterator(self.get_iterator(&value)?)
        } else {
            if value.is_nullish() {
                return Ok(Some(Value::Undefined));
            }
            IterationSource::Keys(PropertyEnumerator::new(self.to_object(&value)?))
        };
        self.for_in_of_body_evaluation(&binding, body, source, labels)
    }

    /// ForIn/OfBodyEvaluation.
    fn for_in_of_body_evaluation(
        &mut self,
        binding: &IterationBinding<'_>,
        body: &Statement,
        mut source: IterationSource,
        labels: &[Name],
    ) -> StatementCompletion {
        let mut value = Value::Undefined;
        loop {
            let next = match &mut source {
                IterationSource::Keys(enumerator) => enumerator.next_key().map(|key| key.to_value()),
                IterationSource::Iterator(record) => self.iterator_step_value(record)?,
            };
            let Some(next) = next else {
                return Ok(Some(value));
            };

            let outer = self.lexical_environment();
            let status = match binding {
                IterationBinding::Assignment(pattern) => self.binding_initialization(pattern, next, None),
                IterationBinding::Lexical(pattern, is_const) => {
                    let iteration_env = Environment::new_declarative(Some(outer.clone()));
                    self.set_lexical_environment(iteration_env.clone());
                    self.for_declaration_binding(pattern, *is_const, next, &iteration_env)
                }
            };
            if let Err(abrupt) = status {
                self.set_lexical_environment(outer);
                return self.close_iteration(&source, Err(abrupt));
            }

            let result = self.evaluate_statement(body);
            self.set_lexical_environment(outer);
            if !loop_continues(&result, labels) {
                let completion = exit_loop(result, labels, value);
                return self.close_iteration(&source, completion);
            }
            carry_value(&result, &mut value);
        }
    }

    /// ForDeclarationBindingInstantiation followed by
    /// ForDeclarationBindingInitialization.
    fn for_declaration_binding(
        &mut self,
        pattern: &Pattern,
        is_const: bool,
        value: Value,
        env: &Environment,
    ) -> Completion<()> {
        for name in scope::pattern_names(pattern) {
            if is_const {
                env.create_immutable_binding(self, &name, true)?;
            } else {
                env.create_mutable_binding(self, &name, false)?;
            }
        }
        self.binding_initialization(pattern, value, Some(env))
    }

    fn close_iteration(&mut self, source: &IterationSource, completion: StatementCompletion) -> StatementCompletion {
        match source {
            IterationSource::Iterator(record) => self.iterator_close(record, completion),
            IterationSource::Keys(_) => completion,
        }
    }

    fn evaluate_switch(&mut self, discriminant: &ast::Expression, cases: &[SwitchCase]) -> StatementCompletion {
        let value = self.evaluate_expression(discriminant)?;
        let env = Environment::new_declarative(Some(self.lexical_environment()));
        for case in cases {
            self.block_declaration_instantiation(&case.consequent, &env)?;
        }
        self.with_lexical_environment(env, |interp| interp.case_block_evaluation(&value, cases))
    }

    /// CaseBlockEvaluation. Clauses before the default clause are tried
    /// first, then those after it; without a match, evaluation starts at the
    /// default clause and falls through.
    fn case_block_evaluation(&mut self, input: &Value, cases: &[SwitchCase]) -> StatementCompletion {
        let mut value = Value::Undefined;
        let default_index = cases.iter().position(|case| case.test.is_none());
        let (before, after) = match default_index {
            Some(index) => (&cases[..index], &cases[index + 1..]),
            None => (cases, &cases[cases.len()..]),
        };

        let mut found = false;
        for case in before {
            if !found {
                found = self.case_matches(case, input)?;
            }
            if found && let Some(exit) = self.run_case(case, &mut value) {
                return exit;
            }
        }
        let Some(default_index) = default_index else {
            return Ok(Some(value));
        };

        let mut found_in_after = false;
        if !found {
            for case in after {
                if !found_in_after {
                    found_in_after = self.case_matches(case, input)?;
                }
                if found_in_after && let Some(exit) = self.run_case(case, &mut value) {
                    return exit;
                }
            }
        }
        if found_in_after {
            return Ok(Some(value));
        }
        if let Some(exit) = self.run_case(&cases[default_index], &mut value) {
            return exit;
        }
        for case in after {
            if let Some(exit) = self.run_case(case, &mut value) {
                return exit;
            }
        }
        Ok(Some(value))
    }

    fn case_matches(&mut self, case: &SwitchCase, input: &Value) -> Completion<bool> {
        match &case.test {
            Some(test) => {
                let selector = self.evaluate_expression(test)?;
                Ok(is_strictly_equal(input, &selector))
            }
            None => Ok(false),
        }
    }

    /// Runs one clause; `Some` carries the completion that ends the switch.
    fn run_case(&mut self, case: &SwitchCase, value: &mut Value) -> Option<StatementCompletion> {
        match self.evaluate_statement_list(&case.consequent) {
            Ok(Some(v)) => {
                *value = v;
                None
            }
            Ok(None) => None,
            abrupt => match update_empty(abrupt, Some(value.clone())) {
                Err(Abrupt::Break(None, result)) => Some(Ok(result)),
                other => Some(other),
            },
        }
    }
}
