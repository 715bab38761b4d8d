//! The main parser state and helpers.

use rustc_hash::FxHashSet;

use crate::Error;
use crate::ast::scope;
use crate::ast::{Module, Name, Script, Statement};
use crate::lexer::{Scanner, Span, Token, TokenKind};

/// Which grammar goal symbol is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// A classic script
    Script,
    /// A module (always strict)
    Module,
}

/// A label in scope for `break`/`continue`.
#[derive(Debug, Clone)]
pub(super) struct Label {
    pub name: Name,
    /// Whether the label is attached to an iteration statement
    pub iteration: bool,
}

/// Per-function parsing context. Reset at every function boundary.
#[derive(Debug, Clone, Default)]
pub(super) struct FunctionContext {
    pub return_allowed: bool,
    pub new_target_allowed: bool,
    pub super_allowed: bool,
    pub generator: bool,
    pub labels: Vec<Label>,
    pub iteration_depth: usize,
    pub breakable_depth: usize,
}

/// A recursive descent parser for ECMAScript.
pub struct Parser<'a> {
    pub(super) source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    pub(super) goal: Goal,
    pub(super) strict: bool,
    pub(super) in_allowed: bool,
    pub(super) context: FunctionContext,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'a str, goal: Goal) -> Self {
        Self {
            source,
            tokens: Scanner::new(source).tokenize(),
            pos: 0,
            goal,
            strict: goal == Goal::Module,
            in_allowed: true,
            context: FunctionContext::default(),
        }
    }

    /// Creates a parser over a sub-range of the source that shares this
    /// parser's context. Used for template substitutions.
    pub(super) fn sub_parser(&self, range: Span) -> Parser<'a> {
        Parser {
            source: self.source,
            tokens: Scanner::with_range(self.source, range).tokenize(),
            pos: 0,
            goal: self.goal,
            strict: self.strict,
            in_allowed: true,
            context: self.context.clone(),
        }
    }

    /// Parses the source code as a classic script.
    pub fn parse_script(&mut self) -> Result<Script, Error> {
        self.parse_directives();
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement_list_item()?);
        }
        self.check_declarations(&body, false, &[])?;
        Ok(Script {
            body,
            strict: self.strict,
        })
    }

    /// Parses the source code as a module.
    pub fn parse_module(&mut self) -> Result<Module, Error> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement_list_item()?);
        }
        self.check_declarations(&body, true, &[])?;
        Ok(Module { body })
    }

    /// Consumes a directive prologue, switching to strict mode when it
    /// contains `"use strict"`. The directives stay in the token stream and
    /// are parsed as ordinary expression statements.
    pub(super) fn parse_directives(&mut self) {
        let mut index = self.pos;
        while let TokenKind::String(_) = &self.tokens[index].kind {
            let token = &self.tokens[index];
            let next = &self.tokens[(index + 1).min(self.tokens.len() - 1)];
            let ends_statement = matches!(
                next.kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
            ) || next.newline_before;
            if !ends_statement {
                break;
            }
            let raw = &self.source[token.span.start..token.span.end];
            if raw == "\"use strict\"" || raw == "'use strict'" {
                self.strict = true;
            }
            index += 1;
            if matches!(self.tokens[index].kind, TokenKind::Semicolon) {
                index += 1;
            }
        }
    }

    /// Early errors shared by every statement list that opens a scope:
    /// no duplicate lexical names, no lexical name also declared with `var`
    /// in the same scope, and none shadowing a parameter of the same body.
    pub(super) fn check_declarations(
        &self,
        body: &[Statement],
        functions_are_lexical: bool,
        parameters: &[Name],
    ) -> Result<(), Error> {
        let lexical = scope::lexically_declared_names(body, functions_are_lexical);
        if let Some(name) = scope::find_duplicate(&lexical) {
            return Err(self.error(format!("Identifier '{name}' has already been declared")));
        }
        let var_names: FxHashSet<Name> = scope::var_declared_names(body, !functions_are_lexical)
            .into_iter()
            .chain(parameters.iter().cloned())
            .collect();
        if let Some(name) = lexical.iter().find(|name| var_names.contains(*name)) {
            return Err(self.error(format!("Identifier '{name}' has already been declared")));
        }
        Ok(())
    }

    // Token helpers

    pub(super) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(super) fn kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    /// The kind of the token `offset` positions ahead (saturating at `Eof`).
    pub(super) fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    pub(super) fn peek_token(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(super) fn previous_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<Token, Error> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    /// Returns true when the current token is the contextual keyword `word`.
    pub(super) fn check_contextual(&self, word: &str) -> bool {
        matches!(self.kind(), TokenKind::Identifier(name) if name == word)
    }

    /// Automatic semicolon insertion.
    pub(super) fn consume_semicolon(&mut self) -> Result<(), Error> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        if matches!(self.kind(), TokenKind::RightBrace | TokenKind::Eof)
            || self.current().newline_before
        {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Returns true when `return`/`break`/`continue` must stop before the
    /// current token.
    pub(super) fn at_statement_end(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || self.current().newline_before
    }

    pub(super) fn is_at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Finds the token index just past the bracket matching the one at the
    /// current position.
    pub(super) fn matching_close(&self) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(index + 1);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    pub(super) fn token_at(&self, index: usize) -> &Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    // Errors

    /// A syntax error at the current token.
    pub(super) fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(self.current().span.start, message)
    }

    pub(super) fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        let (line, column) = line_column(self.source, offset);
        Error::syntax(message, line, column)
    }

    pub(super) fn unexpected(&self) -> Error {
        match self.kind() {
            TokenKind::Invalid(reason) => self.error(*reason),
            TokenKind::Eof => self.error("Unexpected end of input"),
            _ => {
                let span = self.current().span;
                let text = &self.source[span.start..span.end];
                self.error(format!("Unexpected token '{text}'"))
            }
        }
    }

    pub(super) fn unsupported(&self, feature: &str) -> Error {
        self.error(format!("{feature} are not supported"))
    }
}

/// Converts a byte offset into a 1-based line and column.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::parser::{parse_module, parse_script};

    // Helper to parse and get first statement
    fn parse_stmt(src: &str) -> Statement {
        parse_ok(src).body.into_iter().next().unwrap()
    }

    // Helper to parse and check it succeeds
    fn parse_ok(src: &str) -> Script {
        match parse_script(src) {
            Ok(script) => script,
            Err(err) => panic!("failed to parse {src:?}: {err}"),
        }
    }

    // Helper to parse and check it fails
    fn parse_err(src: &str) -> Error {
        match parse_script(src) {
            Ok(script) => panic!("expected {src:?} to fail, got {script:?}"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn test_parse_variable_declaration() {
        let Statement::VariableDeclaration(decl) = parse_stmt("let x = 42;") else {
            panic!("expected declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        assert_eq!(decl.declarations.len(), 1);
        assert!(matches!(
            decl.declarations[0].init,
            Some(Expression::Literal(Literal::Number(n))) if n == 42.0
        ));
    }

    #[test]
    fn test_parse_function_declaration() {
        let Statement::FunctionDeclaration(function) = parse_stmt("function add(a, b = 1) { return a + b; }")
        else {
            panic!("expected function");
        };
        assert_eq!(function.id.as_ref().map(|id| &*id.name), Some("add"));
        assert_eq!(function.params.len(), 2);
        assert_eq!(function.expected_argument_count(), 1);
        assert!(!function.simple_params);
        assert!(function.param_expressions);
        assert_eq!(&*function.source_text, "function add(a, b = 1) { return a + b; }");
    }

    #[test]
    fn test_automatic_semicolon_insertion() {
        let script = parse_ok("let a = 1\nlet b = 2\na\n++b");
        assert_eq!(script.body.len(), 4);
        assert!(matches!(
            &script.body[3],
            Statement::Expression(Expression::Update(UpdateExpression { prefix: true, .. }))
        ));
        parse_err("let a = 1 let b = 2");
    }

    #[test]
    fn test_restricted_return() {
        let script = parse_ok("function f() { return\n1 }");
        let Statement::FunctionDeclaration(function) = &script.body[0] else {
            panic!("expected function");
        };
        assert!(matches!(function.body[0], Statement::Return(None)));
    }

    #[test]
    fn test_use_strict_directive() {
        assert!(parse_ok("'use strict'; var x;").strict);
        assert!(!parse_ok("var x; 'use strict';").strict);
        parse_err("'use strict'; with (a) {}");
        parse_err("'use strict'; delete x;");
        parse_err("function f(a, a) { 'use strict'; }");
        parse_ok("function f(a, a) { return a; }");
    }

    #[test]
    fn test_module_is_strict() {
        assert!(parse_module("with (a) {}").is_err());
        assert!(parse_module("var f; function f() {}").is_err());
    }

    #[test]
    fn test_declaration_conflicts() {
        parse_err("let a; let a;");
        parse_err("let a; var a;");
        parse_err("{ let a; { var a; } }");
        parse_err("function f(a) { let a; }");
        parse_err("try {} catch (e) { let e; }");
        parse_ok("var a; var a; function a() {}");
        parse_ok("let a; { let a; }");
    }

    #[test]
    fn test_break_and_continue_targets() {
        parse_ok("outer: for (;;) { inner: for (;;) { continue outer; } }");
        parse_ok("block: { break block; }");
        parse_ok("switch (x) { case 1: break; }");
        parse_err("break;");
        parse_err("while (1) { function f() { break; } }");
        parse_err("block: { continue block; }");
        parse_err("for (;;) { continue missing; }");
        parse_err("a: a: ;");
    }

    #[test]
    fn test_return_outside_function() {
        parse_err("return 1;");
    }

    #[test]
    fn test_for_in_and_of() {
        assert!(matches!(parse_stmt("for (var k in o) {}"), Statement::ForIn(_)));
        assert!(matches!(parse_stmt("for (const [a, b] of pairs) {}"), Statement::ForOf(_)));
        assert!(matches!(parse_stmt("for (x.y in o) ;"), Statement::ForIn(_)));
        assert!(matches!(parse_stmt("for (var i = 0, n = ('a' in o); i < n; i++) ;"), Statement::For(_)));
    }

    #[test]
    fn test_parse_arrow_functions() {
        let Statement::Expression(Expression::Arrow(arrow)) = parse_stmt("(a, { b }, ...c) => a;") else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 2);
        assert!(arrow.rest.is_some());
        assert!(matches!(arrow.body[0], Statement::Return(Some(_))));
        assert!(matches!(parse_stmt("x => x * 2;"), Statement::Expression(Expression::Arrow(_))));
        assert!(matches!(parse_stmt("(x);"), Statement::Expression(Expression::Identifier(_))));
    }

    #[test]
    fn test_parse_destructuring_assignment() {
        let Statement::Expression(Expression::Assignment(assign)) = parse_stmt("[a, b = 2, ...rest] = list;") else {
            panic!("expected assignment");
        };
        let Pattern::Array(array) = assign.target else {
            panic!("expected array pattern");
        };
        assert_eq!(array.elements.len(), 2);
        assert!(matches!(array.elements[1], Some(Pattern::Assignment(_))));
        assert!(array.rest.is_some());
        parse_ok("({ a, b: { c }, d = 1 } = obj);");
        parse_err("({ a = 1 });");
        parse_err("1 = 2;");
        parse_err("a?.b = 1;");
    }

    #[test]
    fn test_parse_object_literal_members() {
        let Statement::Expression(Expression::Object(members)) =
            parse_stmt("({ a: 1, b, [c]: 2, d() {}, get e() { return 1; }, set e(v) {}, ...f, __proto__: null, 3: 'x' });")
        else {
            panic!("expected object");
        };
        assert_eq!(members.len(), 9);
        assert!(matches!(members[1], ObjectMember::Shorthand(_)));
        assert!(matches!(&members[3], ObjectMember::Method(_, f) if f.kind == FunctionKind::Method));
        assert!(matches!(&members[4], ObjectMember::Method(_, f) if f.kind == FunctionKind::Getter));
        assert!(matches!(members[6], ObjectMember::Spread(_)));
        assert!(matches!(members[7], ObjectMember::Proto(_)));
        assert!(matches!(members[8], ObjectMember::Property(PropertyName::Number(n), _) if n == 3.0));
        parse_err("({ __proto__: 1, __proto__: 2 });");
    }

    #[test]
    fn test_parse_templates() {
        let Statement::Expression(Expression::Template(template)) = parse_stmt("`a${1 + 2}b${`c${d}`}`;") else {
            panic!("expected template");
        };
        assert_eq!(template.quasis.len(), 3);
        assert_eq!(template.expressions.len(), 2);
        assert!(matches!(template.expressions[1], Expression::Template(_)));
    }

    #[test]
    fn test_parse_optional_chain() {
        let Statement::Expression(Expression::OptionalChain(chain)) = parse_stmt("a?.b.c();") else {
            panic!("expected optional chain");
        };
        assert!(matches!(*chain, Expression::Call(_)));
    }

    #[test]
    fn test_precedence() {
        let Statement::Expression(Expression::Binary(binary)) = parse_stmt("1 + 2 * 3;") else {
            panic!("expected binary");
        };
        assert_eq!(binary.operator, BinaryOperator::Add);
        assert!(matches!(*binary.right, Expression::Binary(BinaryExpression { operator: BinaryOperator::Multiply, .. })));

        let Statement::Expression(Expression::Binary(power)) = parse_stmt("2 ** 3 ** 2;") else {
            panic!("expected binary");
        };
        assert!(matches!(*power.right, Expression::Binary(_)));
        parse_err("-2 ** 2;");
        parse_ok("(-2) ** 2;");
    }

    #[test]
    fn test_unsupported_syntax_is_rejected() {
        for source in [
            "class A {}",
            "import x from 'y';",
            "export const a = 1;",
            "async function f() {}",
            "tag`x`;",
            "let r = /ab+c/;",
            "let big = 10n;",
        ] {
            let err = parse_err(source);
            assert!(matches!(err, Error::Syntax { .. }), "{source}: {err:?}");
        }
    }

    #[test]
    fn test_syntax_error_positions() {
        let Error::Syntax { line, column, .. } = parse_err("let a = 1;\nlet = ;") else {
            panic!("expected syntax error");
        };
        assert_eq!(line, 2);
        assert_eq!(column, 5);
    }

    #[test]
    fn test_generators_parse() {
        let Statement::FunctionDeclaration(function) = parse_stmt("function* g() { yield 1; yield* other; }") else {
            panic!("expected generator");
        };
        assert_eq!(function.kind, FunctionKind::Generator);
    }

    #[test]
    fn test_new_target_and_super() {
        parse_ok("function F() { return new.target; }");
        parse_err("new.target;");
        parse_ok("({ m() { return super.m(); } });");
        parse_err("function f() { return super.x; }");
    }
}
