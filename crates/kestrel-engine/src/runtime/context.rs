//! Execution contexts.

use std::rc::Rc;

use super::environment::Environment;
use super::object::JsObject;
use super::realm::Realm;

/// The state of one running piece of code. Contexts form a strict LIFO
/// stack on the interpreter.
pub struct ExecutionContext {
    /// The realm the code belongs to
    pub realm: Rc<Realm>,
    /// The function being evaluated, or `None` for script and module code
    pub function: Option<JsObject>,
    /// Where identifier references resolve; replaced while blocks run
    pub lexical_environment: Environment,
    /// Where `var` declarations live
    pub variable_environment: Environment,
    /// Whether the running code is strict
    pub strict: bool,
}

impl ExecutionContext {
    /// A context for script or module code whose lexical and variable
    /// environments coincide.
    pub fn for_code(realm: Rc<Realm>, environment: Environment, strict: bool) -> Self {
        Self {
            realm,
            function: None,
            lexical_environment: environment.clone(),
            variable_environment: environment,
            strict,
        }
    }
}
