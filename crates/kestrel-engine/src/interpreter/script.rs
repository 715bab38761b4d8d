//! Classic script evaluation.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::ast::{self, Name, scope};
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::context::ExecutionContext;
use crate::runtime::environment::Environment;
use crate::runtime::function::instantiate_function_object;
use crate::runtime::value::Value;

use super::Interpreter;

impl Interpreter {
    /// ScriptEvaluation against the realm's global environment. Returns the
    /// script's completion value.
    pub fn evaluate_script(&mut self, script: &ast::Script) -> Completion<Value> {
        let realm = self.realm().clone();
        let global_env = realm.global_env.clone();
        debug!(statements = script.body.len(), strict = script.strict, "evaluating script");
        self.push_context(ExecutionContext::for_code(realm, global_env.clone(), script.strict));
        let result = self
            .global_declaration_instantiation(script, &global_env)
            .and_then(|()| self.evaluate_statement_list(&script.body));
        self.pop_context();
        result.map(Option::unwrap_or_default)
    }

    /// GlobalDeclarationInstantiation.
    fn global_declaration_instantiation(&mut self, script: &ast::Script, env: &Environment) -> Completion<()> {
        let Some(global) = env.as_global() else {
            return Err(Abrupt::internal("script evaluated outside the global environment"));
        };
        let lexical_names = scope::lexically_declared_names(&script.body, false);
        let var_names = scope::var_declared_names(&script.body, true);

        for name in &lexical_names {
            if global.has_var_declaration(name)
                || global.has_lexical_declaration(name)
                || global.has_restricted_global_property(name)
            {
                return Err(self.syntax_error(format!("Identifier '{name}' has already been declared")));
            }
        }
        for name in &var_names {
            if global.has_lexical_declaration(name) {
                return Err(self.syntax_error(format!("Identifier '{name}' has already been declared")));
            }
        }

        let mut declared_function_names: FxHashSet<Name> = FxHashSet::default();
        let mut functions_to_initialize = Vec::new();
        for function in scope::var_scoped_functions(&script.body).into_iter().rev() {
            let Some(id) = &function.id else {
                continue;
            };
            if declared_function_names.contains(&id.name) {
                continue;
            }
            if !global.can_declare_global_function(&id.name) {
                return Err(self.type_error(format!("Cannot declare global function '{}'", id.name)));
            }
            declared_function_names.insert(id.name.clone());
            functions_to_initialize.push(function.clone());
        }
        functions_to_initialize.reverse();

        let mut declared_var_names: Vec<Name> = Vec::new();
        for name in scope::var_declared_names(&script.body, false) {
            if declared_function_names.contains(&name) {
                continue;
            }
            if !global.can_declare_global_var(&name) {
                return Err(self.type_error(format!("Cannot declare global variable '{name}'")));
            }
            declared_var_names.push(name);
        }

        for declaration in scope::lexically_scoped_declarations(&script.body, false) {
            if declaration.is_constant() {
                env.create_immutable_binding(self, &declaration.name, true)?;
            } else {
                env.create_mutable_binding(self, &declaration.name, false)?;
            }
        }
        for function in &functions_to_initialize {
            let Some(id) = &function.id else {
                continue;
            };
            let function_object = instantiate_function_object(self, function, env.clone());
            global.create_global_function_binding(self, &id.name, Value::Object(function_object), false)?;
        }
        for name in &declared_var_names {
            global.create_global_var_binding(self, name, false)?;
        }
        debug!(
            functions = functions_to_initialize.len(),
            vars = declared_var_names.len(),
            "global declarations instantiated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use crate::parser::parse_script;

    fn run(source: &str) -> Completion<Value> {
        let mut interp = Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default());
        let script = parse_script(source).expect("script should parse");
        interp.evaluate_script(&script)
    }

    #[test]
    fn test_completion_value() {
        assert_eq!(run("1; 2; if (true) { 3 }").ok(), Some(Value::from(3)));
        assert_eq!(run("var x = 1;").ok(), Some(Value::Undefined));
    }

    #[test]
    fn test_function_hoisting_last_wins() {
        let result = run("var f = 1; function f() { return 1 } function f() { return 2 } typeof f");
        assert_eq!(result.ok(), Some(Value::from("number")));
        let result = run("function f() { return 1 } function f() { return 2 } f()");
        assert_eq!(result.ok(), Some(Value::from(2)));
    }

    #[test]
    fn test_lexical_redeclaration_of_restricted_global() {
        let result = run("let undefined = 1;");
        assert!(matches!(result, Err(Abrupt::Throw(_))));
    }
}
