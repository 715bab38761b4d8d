//! Statement and declaration parsing.

use crate::Error;
use crate::ast::*;
use crate::lexer::TokenKind;

use super::parser::{Goal, Label, Parser};

impl<'a> Parser<'a> {
    /// Parses a StatementListItem: a declaration or a statement.
    pub(super) fn parse_statement_list_item(&mut self) -> Result<Statement, Error> {
        match self.kind() {
            TokenKind::Function => {
                let function = self.parse_function(false)?;
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::Let | TokenKind::Const => self.parse_variable_statement(),
            TokenKind::Class => Err(self.unsupported("class declarations")),
            TokenKind::Import | TokenKind::Export => {
                Err(self.unsupported("import and export declarations"))
            }
            _ if self.at_async_function() => Err(self.unsupported("async functions")),
            _ => self.parse_statement(),
        }
    }

    /// Parses a single statement.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, Error> {
        match self.kind() {
            TokenKind::Var => self.parse_variable_statement(),
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Statement::Debugger)
            }
            TokenKind::Function => {
                Err(self.error("Function declarations are not allowed in statement position"))
            }
            TokenKind::Let | TokenKind::Const | TokenKind::Class => {
                Err(self.error("Lexical declarations are not allowed in statement position"))
            }
            TokenKind::Identifier(_) if matches!(self.peek_kind(1), TokenKind::Colon) => {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn at_async_function(&self) -> bool {
        self.check_contextual("async")
            && matches!(self.peek_kind(1), TokenKind::Function)
            && !self.peek_token(1).newline_before
    }

    /// Parses `{ ... }` with its own lexical scope checks.
    pub(super) fn parse_block(&mut self) -> Result<BlockStatement, Error> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement_list_item()?);
        }
        self.advance();
        self.check_declarations(&body, true, &[])?;
        Ok(BlockStatement { body })
    }

    fn parse_variable_statement(&mut self) -> Result<Statement, Error> {
        let declaration = self.parse_variable_declaration()?;
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration(declaration))
    }

    /// Parses `var|let|const` and the declarator list, without the
    /// terminating semicolon. Initializers are checked by the caller when
    /// the declaration turns out to be a for-in/of head.
    pub(super) fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, Error> {
        let kind = match self.advance().kind {
            TokenKind::Var => VariableKind::Var,
            TokenKind::Let => VariableKind::Let,
            _ => VariableKind::Const,
        };

        let mut declarations = Vec::new();
        loop {
            let target = self.parse_binding_target()?;
            if kind.is_lexical()
                && scope::pattern_names(&target)
                    .iter()
                    .any(|name| &**name == "let")
            {
                return Err(self.error("let is disallowed as a lexically bound name"));
            }
            let init = if self.eat(&TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator { target, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let in_for_head = !self.in_allowed
            && (self.check(&TokenKind::In) || self.check_contextual("of"));
        if !in_for_head {
            for declarator in &declarations {
                if declarator.init.is_none() {
                    if kind == VariableKind::Const {
                        return Err(self.error("Missing initializer in const declaration"));
                    }
                    if !matches!(declarator.target, Pattern::Identifier(_)) {
                        return Err(self.error("Missing initializer in destructuring declaration"));
                    }
                }
            }
        }

        Ok(VariableDeclaration { kind, declarations })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression_allowing_in()?;
        self.expect(&TokenKind::RightParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_loop_body(&mut self) -> Result<Box<Statement>, Error> {
        self.context.iteration_depth += 1;
        self.context.breakable_depth += 1;
        let body = self.parse_statement();
        self.context.iteration_depth -= 1;
        self.context.breakable_depth -= 1;
        Ok(Box::new(body?))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression_allowing_in()?;
        self.expect(&TokenKind::RightParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement { test, body }))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        let body = self.parse_loop_body()?;
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression_allowing_in()?;
        self.expect(&TokenKind::RightParen)?;
        // `do ; while (x) y` inserts a semicolon after `)`
        self.eat(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(DoWhileStatement { body, test }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        if self.check(&TokenKind::Await) {
            return Err(self.unsupported("for await loops"));
        }
        self.expect(&TokenKind::LeftParen)?;

        let outer_in = std::mem::replace(&mut self.in_allowed, false);
        let head = self.parse_for_head();
        self.in_allowed = outer_in;
        let init = head?;

        let left = match init {
            Some(ForInit::Declaration(declaration))
                if self.check(&TokenKind::In) || self.check_contextual("of") =>
            {
                Some(self.for_in_declaration(declaration)?)
            }
            Some(ForInit::Expression(expression))
                if self.check(&TokenKind::In) || self.check_contextual("of") =>
            {
                Some(ForInLeft::Pattern(self.to_assignment_target(expression)?))
            }
            other => {
                self.expect(&TokenKind::Semicolon)?;
                let test = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression_allowing_in()?)
                };
                self.expect(&TokenKind::Semicolon)?;
                let update = if self.check(&TokenKind::RightParen) {
                    None
                } else {
                    Some(self.parse_expression_allowing_in()?)
                };
                self.expect(&TokenKind::RightParen)?;
                let body = self.parse_loop_body()?;
                if let Some(ForInit::Declaration(declaration)) = &other
                    && declaration.kind.is_lexical()
                {
                    let mut names = Vec::new();
                    for declarator in &declaration.declarations {
                        scope::bound_names(&declarator.target, &mut names);
                    }
                    self.check_loop_bindings(&names, &body)?;
                }
                return Ok(Statement::For(ForStatement {
                    init: other,
                    test,
                    update,
                    body,
                }));
            }
        };

        let Some(left) = left else {
            return Err(self.unexpected());
        };
        if self.eat(&TokenKind::In) {
            let right = self.parse_expression_allowing_in()?;
            self.expect(&TokenKind::RightParen)?;
            let body = self.parse_loop_body()?;
            self.check_for_in_left(&left, &body)?;
            Ok(Statement::ForIn(ForInStatement { left, right, body }))
        } else {
            self.advance(); // `of`
            let outer_in = std::mem::replace(&mut self.in_allowed, true);
            let right = self.parse_assignment();
            self.in_allowed = outer_in;
            let right = right?;
            self.expect(&TokenKind::RightParen)?;
            let body = self.parse_loop_body()?;
            self.check_for_in_left(&left, &body)?;
            Ok(Statement::ForOf(ForOfStatement { left, right, body }))
        }
    }

    fn check_for_in_left(&self, left: &ForInLeft, body: &Statement) -> Result<(), Error> {
        match left {
            ForInLeft::Declaration(kind, pattern) if kind.is_lexical() => {
                self.check_loop_bindings(&scope::pattern_names(pattern), body)
            }
            _ => Ok(()),
        }
    }

    fn parse_for_head(&mut self) -> Result<Option<ForInit>, Error> {
        match self.kind() {
            TokenKind::Semicolon => Ok(None),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                Ok(Some(ForInit::Declaration(self.parse_variable_declaration()?)))
            }
            _ => Ok(Some(ForInit::Expression(self.parse_expression()?))),
        }
    }

    fn for_in_declaration(&self, declaration: VariableDeclaration) -> Result<ForInLeft, Error> {
        let kind = declaration.kind;
        let mut declarations = declaration.declarations;
        if declarations.len() != 1 {
            return Err(self.error("Invalid left-hand side in for-in/of loop: must have a single binding"));
        }
        let declarator = declarations.remove(0);
        if declarator.init.is_some() {
            return Err(self.error("for-in/of loop variable declaration may not have an initializer"));
        }
        Ok(ForInLeft::Declaration(kind, declarator.target))
    }

    /// Loop head bindings must be unique, and a `let`/`const` head may not
    /// be redeclared by a `var` in the body.
    fn check_loop_bindings(&self, names: &[Name], body: &Statement) -> Result<(), Error> {
        if let Some(name) = scope::find_duplicate(names) {
            return Err(self.error(format!("Identifier '{name}' has already been declared")));
        }
        let body_vars = scope::var_declared_names(std::slice::from_ref(body), false);
        if let Some(name) = names.iter().find(|name| body_vars.contains(name)) {
            return Err(self.error(format!("Identifier '{name}' has already been declared")));
        }
        Ok(())
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        let label = self.parse_jump_label()?;
        match &label {
            Some(label) => {
                let found = self
                    .context
                    .labels
                    .iter()
                    .rev()
                    .find(|candidate| candidate.name == label.name);
                match found {
                    Some(candidate) if candidate.iteration => {}
                    Some(_) => {
                        return Err(self.error(format!(
                            "Illegal continue statement: '{}' does not denote an iteration statement",
                            label.name
                        )));
                    }
                    None => return Err(self.error(format!("Undefined label '{}'", label.name))),
                }
            }
            None if self.context.iteration_depth == 0 => {
                return Err(self.error("Illegal continue statement: no surrounding iteration statement"));
            }
            None => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Continue(label))
    }

    fn parse_break_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        let label = self.parse_jump_label()?;
        match &label {
            Some(label) => {
                if !self.context.labels.iter().any(|candidate| candidate.name == label.name) {
                    return Err(self.error(format!("Undefined label '{}'", label.name)));
                }
            }
            None if self.context.breakable_depth == 0 => {
                return Err(self.error("Illegal break statement"));
            }
            None => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Break(label))
    }

    fn parse_jump_label(&mut self) -> Result<Option<Identifier>, Error> {
        if self.current().newline_before {
            return Ok(None);
        }
        if let TokenKind::Identifier(name) = self.kind() {
            let id = Identifier::new(name.as_str(), self.current().span);
            self.advance();
            return Ok(Some(id));
        }
        Ok(None)
    }

    fn parse_return_statement(&mut self) -> Result<Statement, Error> {
        if !self.context.return_allowed {
            return Err(self.error("Illegal return statement"));
        }
        self.advance();
        let argument = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression_allowing_in()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(argument))
    }

    fn parse_with_statement(&mut self) -> Result<Statement, Error> {
        if self.strict {
            return Err(self.error("Strict mode code may not include a with statement"));
        }
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let object = self.parse_expression_allowing_in()?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::With(WithStatement { object, body }))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let discriminant = self.parse_expression_allowing_in()?;
        self.expect(&TokenKind::RightParen)?;
        self.expect(&TokenKind::LeftBrace)?;

        self.context.breakable_depth += 1;
        let cases = self.parse_case_block();
        self.context.breakable_depth -= 1;
        let cases = cases?;

        let all: Vec<Statement> = cases
            .iter()
            .flat_map(|case| case.consequent.iter().cloned())
            .collect();
        self.check_declarations(&all, true, &[])?;

        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
        }))
    }

    fn parse_case_block(&mut self) -> Result<Vec<SwitchCase>, Error> {
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.eat(&TokenKind::RightBrace) {
            let test = match self.kind() {
                TokenKind::Case => {
                    self.advance();
                    Some(self.parse_expression_allowing_in()?)
                }
                TokenKind::Default => {
                    if seen_default {
                        return Err(self.error("More than one default clause in switch statement"));
                    }
                    seen_default = true;
                    self.advance();
                    None
                }
                _ => return Err(self.unexpected()),
            };
            self.expect(&TokenKind::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_statement_list_item()?);
            }
            cases.push(SwitchCase { test, consequent });
        }
        Ok(cases)
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        if self.current().newline_before {
            return Err(self.error("Illegal newline after throw"));
        }
        let argument = self.parse_expression_allowing_in()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(argument))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, Error> {
        self.advance();
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LeftParen) {
                let pattern = self.parse_binding_target()?;
                self.expect(&TokenKind::RightParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block()?;
            if let Some(param) = &param {
                let names = scope::pattern_names(param);
                if let Some(name) = scope::find_duplicate(&names) {
                    return Err(self.error(format!("Identifier '{name}' has already been declared")));
                }
                let lexical = scope::lexically_declared_names(&body.body, true);
                if let Some(name) = lexical.iter().find(|name| names.contains(name)) {
                    return Err(self.error(format!("Identifier '{name}' has already been declared")));
                }
            }
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try"));
        }

        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, Error> {
        let token = self.advance();
        let TokenKind::Identifier(name) = token.kind else {
            return Err(self.unexpected());
        };
        self.advance(); // `:`
        let label = Identifier::new(name.as_str(), token.span);

        if self.context.labels.iter().any(|existing| existing.name == label.name) {
            return Err(self.error_at(token.span.start, format!("Label '{}' has already been declared", label.name)));
        }

        let iteration = self.labels_iteration_statement();
        self.context.labels.push(Label {
            name: label.name.clone(),
            iteration,
        });
        let body = if self.check(&TokenKind::Function) {
            if self.strict {
                Err(self.error("In strict mode code, functions can only be declared at top level or inside a block"))
            } else {
                self.parse_function(false).map(Statement::FunctionDeclaration)
            }
        } else {
            self.parse_statement()
        };
        self.context.labels.pop();

        Ok(Statement::Labeled(LabeledStatement {
            label,
            body: Box::new(body?),
        }))
    }

    /// Looks past any further `label:` prefixes for a loop keyword.
    fn labels_iteration_statement(&self) -> bool {
        let mut offset = 0;
        while matches!(self.peek_kind(offset), TokenKind::Identifier(_))
            && matches!(self.peek_kind(offset + 1), TokenKind::Colon)
        {
            offset += 2;
        }
        matches!(
            self.peek_kind(offset),
            TokenKind::For | TokenKind::While | TokenKind::Do
        )
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, Error> {
        let expression = self.parse_expression_allowing_in()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(expression))
    }

    /// Parses a function body `{ ... }` including its directive prologue,
    /// which may switch the parser into strict mode.
    pub(super) fn parse_function_body(&mut self) -> Result<Vec<Statement>, Error> {
        self.expect(&TokenKind::LeftBrace)?;
        self.parse_directives();
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement_list_item()?);
        }
        self.advance();
        Ok(body)
    }

    /// Whether `await` may be used as an identifier here.
    pub(super) fn await_is_identifier(&self) -> bool {
        self.goal == Goal::Script
    }
}
