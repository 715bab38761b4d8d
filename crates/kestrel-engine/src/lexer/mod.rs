//! Lexical analysis (tokenization) for ECMAScript source code.
//!
//! The lexer transforms source text into a stream of tokens that can be
//! consumed by the parser. Every token records whether a line terminator
//! preceded it, which the parser needs for automatic semicolon insertion.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token` and `TokenKind` definitions
//!
//! ## Usage
//!
//! ```rust
//! use kestrel_engine::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("let x = 42;");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, TemplateParts, Token, TokenKind};
