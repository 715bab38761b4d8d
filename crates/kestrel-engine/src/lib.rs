// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # kestrel-engine
//!
//! A tree-walking ECMAScript interpreter that follows the language's
//! runtime semantics step by step: completion records, environment
//! records, property descriptors and the abstract operations over them.
//!
//! ## Overview
//!
//! This crate provides:
//! - Lexer and parser producing a typed syntax tree
//! - The value and object model with ordinary and exotic objects
//! - Environment records, realms and execution contexts
//! - A direct evaluator for scripts and modules
//! - The core built-in objects and `console.log`
//!
//! ## Quick Start
//!
//! ```rust
//! use kestrel_engine::{BufferedHost, Engine};
//!
//! let host = BufferedHost::new();
//! let mut engine = Engine::new(host.clone());
//! engine.eval_module_source("console.log(1 + 2);").expect("module runs");
//! assert_eq!(host.lines(), vec!["3".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builtins;
pub mod config;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;

use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

pub use config::EngineConfig;
pub use host::{BufferedHost, HostHooks, Outcome, StdioHost};
pub use interpreter::{Interpreter, SourceTextModule};
pub use runtime::completion::{Abrupt, EngineFault};
pub use runtime::value::Value;

/// Errors reported to embedders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The source failed to parse
    #[error("SyntaxError: {message} ({line}:{column})")]
    Syntax {
        /// What went wrong
        message: String,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// A value was thrown and not caught
    #[error("Uncaught {0}")]
    Uncaught(String),

    /// The program used a feature the engine does not implement
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A broken engine invariant
    #[error("Internal error: {0}")]
    Internal(String),

    /// The configured step budget ran out
    #[error("Step budget exhausted")]
    StepBudgetExhausted,

    /// Reading source failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// A syntax error at a source position.
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Converts an abrupt completion that escaped to the top level.
    fn from_abrupt(interp: &mut Interpreter, abrupt: Abrupt) -> Self {
        match abrupt {
            Abrupt::Throw(value) => Error::Uncaught(interp.stringify_thrown(&value)),
            Abrupt::Fault(EngineFault::Unsupported(feature)) => Error::Unsupported(feature.to_string()),
            Abrupt::Fault(EngineFault::Internal(message)) => Error::Internal(message),
            Abrupt::Fault(EngineFault::StepBudgetExhausted) => Error::StepBudgetExhausted,
            Abrupt::Break(..) | Abrupt::Continue(..) | Abrupt::Return(_) => {
                Error::Internal("control transfer escaped the program".into())
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}

/// Evaluates a parsed module in a fresh realm, reporting the outcome to
/// `host`.
pub fn eval_module(module: &ast::Module, host: impl HostHooks + 'static) -> Result<(), Error> {
    Engine::new(host).eval_module(module)
}

/// The main JavaScript engine instance.
///
/// Owns one realm; successive scripts and modules share its global object.
pub struct Engine {
    interpreter: Interpreter,
}

impl Engine {
    /// Creates an engine with the default limits.
    pub fn new(host: impl HostHooks + 'static) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Creates an engine with explicit limits.
    pub fn with_config(host: impl HostHooks + 'static, config: EngineConfig) -> Self {
        Self {
            interpreter: Interpreter::new(Box::new(host), config),
        }
    }

    /// The underlying interpreter.
    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Instantiates and evaluates a module, then tells the host whether it
    /// succeeded.
    pub fn eval_module(&mut self, module: &ast::Module) -> Result<(), Error> {
        let module = SourceTextModule::new(module.clone());
        let result = self.run_module(&module);
        self.report(&result);
        result
    }

    /// Parses and evaluates module source.
    pub fn eval_module_source(&mut self, source: &str) -> Result<(), Error> {
        let module = match parser::parse_module(source) {
            Ok(module) => module,
            Err(error) => {
                let result = Err(error);
                self.report(&result);
                return result;
            }
        };
        self.eval_module(&module)
    }

    /// Parses and evaluates a classic script, returning its completion
    /// value. Declarations persist in the realm between calls.
    pub fn eval_script(&mut self, source: &str) -> Result<Value, Error> {
        let script = parser::parse_script(source)?;
        self.interpreter.reset_limits();
        debug!(statements = script.body.len(), "evaluating script");
        self.interpreter
            .evaluate_script(&script)
            .map_err(|abrupt| self.fail(abrupt))
    }

    /// Creates and instantiates a module without evaluating it. Pass the
    /// handle to [`Engine::run_module`]; repeated runs are no-ops.
    pub fn load_module(&mut self, module: impl Into<Rc<ast::Module>>) -> Result<SourceTextModule, Error> {
        let module = SourceTextModule::new(module);
        module
            .instantiate(&mut self.interpreter)
            .map_err(|abrupt| self.fail(abrupt))?;
        Ok(module)
    }

    /// Evaluates a loaded module. A module runs at most once; later calls
    /// replay the first outcome.
    pub fn run_module(&mut self, module: &SourceTextModule) -> Result<(), Error> {
        self.interpreter.reset_limits();
        module
            .evaluate(&mut self.interpreter)
            .map_err(|abrupt| self.fail(abrupt))
    }

    /// Renders a value for display without running script code.
    pub fn inspect(&self, value: &Value) -> String {
        self.interpreter.inspect(value)
    }

    fn fail(&mut self, abrupt: Abrupt) -> Error {
        if let Abrupt::Fault(fault) = &abrupt {
            warn!(%fault, "evaluation stopped by an engine fault");
        }
        Error::from_abrupt(&mut self.interpreter, abrupt)
    }

    fn report<T>(&self, result: &Result<T, Error>) {
        match result {
            Ok(_) => self.interpreter.host().success(),
            Err(Error::Uncaught(reason)) => self.interpreter.host().failure(reason),
            Err(error) => self.interpreter.host().failure(&error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_module_reports_success() {
        let host = BufferedHost::new();
        let mut engine = Engine::new(host.clone());
        assert_eq!(engine.eval_module_source("console.log('hi', 1 + 1);"), Ok(()));
        assert_eq!(host.lines(), vec!["hi 2".to_string()]);
        assert_eq!(host.outcome(), Some(Outcome::Success));
    }

    #[test]
    fn test_uncaught_error_reaches_host() {
        let host = BufferedHost::new();
        let mut engine = Engine::new(host.clone());
        let result = engine.eval_module_source("throw new TypeError('bad');");
        assert_eq!(result, Err(Error::Uncaught("TypeError: bad".into())));
        assert_eq!(host.outcome(), Some(Outcome::Failure("TypeError: bad".into())));
    }

    #[test]
    fn test_syntax_error() {
        let host = BufferedHost::new();
        let mut engine = Engine::new(host.clone());
        let result = engine.eval_module_source("let = ;");
        assert!(matches!(result, Err(Error::Syntax { .. })));
        assert!(matches!(host.outcome(), Some(Outcome::Failure(_))));
    }

    #[test]
    fn test_eval_script_returns_completion_value() {
        let mut engine = Engine::new(BufferedHost::new());
        assert_eq!(engine.eval_script("var x = 2; x * 21"), Ok(Value::from(42)));
        assert_eq!(engine.eval_script("x = x * 21; x + 1"), Ok(Value::from(43)));
    }

    #[test]
    fn test_step_budget() {
        let config = EngineConfig::default().with_step_budget(1_000);
        let mut engine = Engine::with_config(BufferedHost::new(), config);
        assert_eq!(engine.eval_script("while (true) {}"), Err(Error::StepBudgetExhausted));
    }

    #[test]
    fn test_apply_charges_each_argument() {
        let config = EngineConfig::default().with_step_budget(1_000);
        let mut engine = Engine::with_config(BufferedHost::new(), config);
        let result = engine.eval_script("(function () {}).apply(null, { length: 5000 })");
        assert_eq!(result, Err(Error::StepBudgetExhausted));
    }

    #[test]
    fn test_apply_rejects_huge_array_like() {
        let mut engine = Engine::new(BufferedHost::new());
        let result = engine.eval_script(
            "try { (function () {}).apply(null, { length: 1e15 }); 'done' } catch (e) { e instanceof RangeError }",
        );
        assert_eq!(result, Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_loaded_module_runs_once() {
        let host = BufferedHost::new();
        let mut engine = Engine::new(host.clone());
        let module = parser::parse_module("console.log('run');").expect("parses");
        let module = engine.load_module(module).expect("instantiates");
        assert_eq!(engine.run_module(&module), Ok(()));
        assert_eq!(engine.run_module(&module), Ok(()));
        assert_eq!(host.lines(), vec!["run".to_string()]);
    }

    #[test]
    fn test_generators_are_unsupported() {
        let mut engine = Engine::new(BufferedHost::new());
        let result = engine.eval_script("function* g() { yield 1; } g();");
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }
}
