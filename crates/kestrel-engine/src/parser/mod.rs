//! Parser for ECMAScript source code.
//!
//! Transforms a stream of tokens into the typed syntax tree, applying
//! automatic semicolon insertion and the early errors the evaluator relies
//! on (conflicting declarations, invalid `break`/`continue` targets,
//! strict-mode restrictions).
//!
//! ## Structure
//!
//! - `parser` - The `Parser` state, token helpers and error reporting
//! - `statements` - Statement and declaration parsing
//! - `expressions` - Expression, pattern and function parsing
//!
//! ## Usage
//!
//! ```rust
//! use kestrel_engine::parser::parse_module;
//!
//! let module = parse_module("let x = 1 + 2;").expect("should parse");
//! assert_eq!(module.body.len(), 1);
//! ```

mod expressions;
mod parser;
mod statements;

pub use parser::{Goal, Parser};

use crate::Error;
use crate::ast::{Module, Script};

/// Parses a classic script.
pub fn parse_script(source: &str) -> Result<Script, Error> {
    Parser::new(source, Goal::Script).parse_script()
}

/// Parses a module. Module code is strict.
pub fn parse_module(source: &str) -> Result<Module, Error> {
    Parser::new(source, Goal::Module).parse_module()
}
