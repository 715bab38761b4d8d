//! Source text module records.
//!
//! A module is instantiated once (its environment and hoisted bindings are
//! created) and evaluated once. Repeating either step is a no-op; a module
//! whose evaluation threw reports the same error every time it is asked to
//! evaluate again.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::ast::{self, scope};
use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::context::ExecutionContext;
use crate::runtime::environment::Environment;
use crate::runtime::function::instantiate_function_object;
use crate::runtime::value::Value;

use super::Interpreter;

/// Where a module is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Parsed, no environment yet
    Unlinked,
    /// Environment created and declarations hoisted
    Linked,
    /// Body running
    Evaluating,
    /// Body finished, normally or not
    Evaluated,
}

/// A Source Text Module Record.
pub struct SourceTextModule {
    node: Rc<ast::Module>,
    environment: RefCell<Option<Environment>>,
    status: Cell<ModuleStatus>,
    evaluation_error: RefCell<Option<Abrupt>>,
}

impl SourceTextModule {
    pub fn new(node: impl Into<Rc<ast::Module>>) -> Self {
        Self {
            node: node.into(),
            environment: RefCell::new(None),
            status: Cell::new(ModuleStatus::Unlinked),
            evaluation_error: RefCell::new(None),
        }
    }

    pub fn status(&self) -> ModuleStatus {
        self.status.get()
    }

    /// The module environment, once instantiated.
    pub fn environment(&self) -> Option<Environment> {
        self.environment.borrow().clone()
    }

    /// InitializeEnvironment: creates the module environment and hoists
    /// its declarations. Only the first call has any effect.
    pub fn instantiate(&self, interp: &mut Interpreter) -> Completion<()> {
        if self.environment.borrow().is_some() {
            return Ok(());
        }
        let realm = interp.realm().clone();
        let env = Environment::new_module(realm.global_env.clone());
        interp.push_context(ExecutionContext::for_code(realm, env.clone(), true));
        let result = self.initialize_environment(interp, &env);
        interp.pop_context();
        result?;

        *self.environment.borrow_mut() = Some(env);
        self.status.set(ModuleStatus::Linked);
        debug!(statements = self.node.body.len(), "module instantiated");
        Ok(())
    }

    fn initialize_environment(&self, interp: &mut Interpreter, env: &Environment) -> Completion<()> {
        let body = &self.node.body;
        for name in scope::var_declared_names(body, false) {
            env.create_mutable_binding(interp, &name, false)?;
            env.initialize_binding(interp, &name, Value::Undefined)?;
        }
        for declaration in scope::lexically_scoped_declarations(body, true) {
            let name = &declaration.name;
            if declaration.is_constant() {
                env.create_immutable_binding(interp, name, true)?;
            } else {
                env.create_mutable_binding(interp, name, false)?;
            }
            if let scope::DeclarationKind::Function(function) = &declaration.kind {
                let function_object = instantiate_function_object(interp, function, env.clone());
                env.initialize_binding(interp, name, Value::Object(function_object))?;
            }
        }
        Ok(())
    }

    /// Evaluate: runs the module body at most once, instantiating first
    /// when needed. Module code is strict and `this` is undefined.
    pub fn evaluate(&self, interp: &mut Interpreter) -> Completion<()> {
        match self.status.get() {
            ModuleStatus::Evaluated | ModuleStatus::Evaluating => {
                return match self.evaluation_error.borrow().clone() {
                    Some(error) => Err(error),
                    None => Ok(()),
                };
            }
            ModuleStatus::Unlinked => self.instantiate(interp)?,
            ModuleStatus::Linked => {}
        }
        let Some(env) = self.environment() else {
            return Err(Abrupt::internal("module evaluated without an environment"));
        };

        self.status.set(ModuleStatus::Evaluating);
        debug!("evaluating module");
        let realm = interp.realm().clone();
        interp.push_context(ExecutionContext::for_code(realm, env, true));
        let result = interp.evaluate_statement_list(&self.node.body);
        interp.pop_context();
        self.status.set(ModuleStatus::Evaluated);

        match result {
            Ok(_) => {
                debug!("module evaluated");
                Ok(())
            }
            Err(abrupt) => {
                debug!(error = ?abrupt, "module evaluation failed");
                *self.evaluation_error.borrow_mut() = Some(abrupt.clone());
                Err(abrupt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;
    use crate::parser::parse_module;

    fn setup(source: &str) -> (Interpreter, BufferedHost, SourceTextModule) {
        let host = BufferedHost::new();
        let interp = Interpreter::new(Box::new(host.clone()), EngineConfig::default());
        let module = SourceTextModule::new(parse_module(source).expect("module should parse"));
        (interp, host, module)
    }

    #[test]
    fn test_instantiate_is_idempotent() {
        let (mut interp, _host, module) = setup("var a = 1; let b = 2; function f() {}");
        assert!(module.instantiate(&mut interp).is_ok());
        let first = module.environment();
        assert!(module.instantiate(&mut interp).is_ok());
        assert!(first.is_some());
        assert!(first == module.environment());
        assert_eq!(module.status(), ModuleStatus::Linked);
    }

    #[test]
    fn test_hoisted_bindings() {
        let (mut interp, _host, module) = setup("var a = 1; let b = 2; function f() {}");
        assert!(module.instantiate(&mut interp).is_ok());
        let Some(env) = module.environment() else {
            panic!("module environment missing");
        };
        let record = env.declarative().expect("module record is declarative");
        assert_eq!(record.binding_value("a"), Some(Value::Undefined));
        assert_eq!(record.binding_value("b"), None);
        assert!(matches!(record.binding_value("f"), Some(Value::Object(_))));
    }

    #[test]
    fn test_evaluate_runs_once() {
        let (mut interp, host, module) = setup("console.log('ran');");
        assert!(module.evaluate(&mut interp).is_ok());
        assert!(module.evaluate(&mut interp).is_ok());
        assert_eq!(host.lines(), vec!["ran".to_string()]);
        assert_eq!(module.status(), ModuleStatus::Evaluated);
    }

    #[test]
    fn test_evaluation_error_is_replayed() {
        let (mut interp, host, module) = setup("console.log('once'); throw 1;");
        assert!(matches!(module.evaluate(&mut interp), Err(Abrupt::Throw(_))));
        assert!(matches!(module.evaluate(&mut interp), Err(Abrupt::Throw(_))));
        assert_eq!(host.lines().len(), 1);
    }

    #[test]
    fn test_module_this_is_undefined() {
        let (mut interp, host, module) = setup("console.log(typeof this);");
        assert!(module.evaluate(&mut interp).is_ok());
        assert_eq!(host.lines(), vec!["undefined".to_string()]);
    }
}
