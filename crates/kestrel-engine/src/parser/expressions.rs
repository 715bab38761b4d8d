//! Expression, pattern and function parsing.

use std::rc::Rc;

use crate::Error;
use crate::ast::*;
use crate::lexer::{TemplateParts, TokenKind};
use crate::runtime::string::JsString;

use super::parser::{FunctionContext, Parser};

/// A binary-level operator recognised by precedence climbing.
#[derive(Clone, Copy)]
enum Infix {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// Returns the operator and its precedence (higher binds tighter).
fn infix_operator(kind: &TokenKind, in_allowed: bool) -> Option<(Infix, u8)> {
    use BinaryOperator as B;
    let entry = match kind {
        TokenKind::QuestionQuestion => (Infix::Logical(LogicalOperator::Nullish), 1),
        TokenKind::PipePipe => (Infix::Logical(LogicalOperator::Or), 2),
        TokenKind::AmpersandAmpersand => (Infix::Logical(LogicalOperator::And), 3),
        TokenKind::Pipe => (Infix::Binary(B::BitwiseOr), 4),
        TokenKind::Caret => (Infix::Binary(B::BitwiseXor), 5),
        TokenKind::Ampersand => (Infix::Binary(B::BitwiseAnd), 6),
        TokenKind::EqualEqual => (Infix::Binary(B::Equal), 7),
        TokenKind::NotEqual => (Infix::Binary(B::NotEqual), 7),
        TokenKind::StrictEqual => (Infix::Binary(B::StrictEqual), 7),
        TokenKind::StrictNotEqual => (Infix::Binary(B::StrictNotEqual), 7),
        TokenKind::LessThan => (Infix::Binary(B::LessThan), 8),
        TokenKind::GreaterThan => (Infix::Binary(B::GreaterThan), 8),
        TokenKind::LessThanEqual => (Infix::Binary(B::LessThanEqual), 8),
        TokenKind::GreaterThanEqual => (Infix::Binary(B::GreaterThanEqual), 8),
        TokenKind::Instanceof => (Infix::Binary(B::InstanceOf), 8),
        TokenKind::In if in_allowed => (Infix::Binary(B::In), 8),
        TokenKind::LeftShift => (Infix::Binary(B::LeftShift), 9),
        TokenKind::RightShift => (Infix::Binary(B::RightShift), 9),
        TokenKind::UnsignedRightShift => (Infix::Binary(B::UnsignedRightShift), 9),
        TokenKind::Plus => (Infix::Binary(B::Add), 10),
        TokenKind::Minus => (Infix::Binary(B::Subtract), 10),
        TokenKind::Star => (Infix::Binary(B::Multiply), 11),
        TokenKind::Slash => (Infix::Binary(B::Divide), 11),
        TokenKind::Percent => (Infix::Binary(B::Modulo), 11),
        TokenKind::StarStar => (Infix::Binary(B::Exponent), 12),
        _ => return None,
    };
    Some(entry)
}

fn assignment_operator(kind: &TokenKind) -> Option<AssignmentOperator> {
    use AssignmentOperator::{Assign, Compound, Logical};
    use BinaryOperator as B;
    let operator = match kind {
        TokenKind::Equal => Assign,
        TokenKind::PlusEqual => Compound(B::Add),
        TokenKind::MinusEqual => Compound(B::Subtract),
        TokenKind::StarEqual => Compound(B::Multiply),
        TokenKind::SlashEqual => Compound(B::Divide),
        TokenKind::PercentEqual => Compound(B::Modulo),
        TokenKind::StarStarEqual => Compound(B::Exponent),
        TokenKind::LeftShiftEqual => Compound(B::LeftShift),
        TokenKind::RightShiftEqual => Compound(B::RightShift),
        TokenKind::UnsignedRightShiftEqual => Compound(B::UnsignedRightShift),
        TokenKind::AmpersandEqual => Compound(B::BitwiseAnd),
        TokenKind::PipeEqual => Compound(B::BitwiseOr),
        TokenKind::CaretEqual => Compound(B::BitwiseXor),
        TokenKind::AmpersandAmpersandEqual => Logical(LogicalOperator::And),
        TokenKind::PipePipeEqual => Logical(LogicalOperator::Or),
        TokenKind::QuestionQuestionEqual => Logical(LogicalOperator::Nullish),
        _ => return None,
    };
    Some(operator)
}

const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
    "static",
];

impl<'a> Parser<'a> {
    /// Parses an Expression with the `in` operator enabled.
    pub(super) fn parse_expression_allowing_in(&mut self) -> Result<Expression, Error> {
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let result = self.parse_expression();
        self.in_allowed = outer;
        result
    }

    /// Parses a comma-separated Expression.
    pub(super) fn parse_expression(&mut self) -> Result<Expression, Error> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(&TokenKind::Comma) {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(expressions))
    }

    /// Parses an AssignmentExpression.
    pub(super) fn parse_assignment(&mut self) -> Result<Expression, Error> {
        self.parse_assignment_inner(true)
    }

    /// `check_cover` is false for elements of array and object literals,
    /// which may still turn out to be destructuring patterns.
    fn parse_assignment_inner(&mut self, check_cover: bool) -> Result<Expression, Error> {
        if self.check(&TokenKind::Yield) && self.context.generator {
            return self.parse_yield();
        }
        if self.at_async_arrow() {
            return Err(self.unsupported("async functions"));
        }
        if self.is_arrow_ahead() {
            return Ok(Expression::Arrow(self.parse_arrow_function()?));
        }

        let left = self.parse_conditional()?;
        let Some(operator) = assignment_operator(self.kind()) else {
            if check_cover && contains_cover_initializer(&left) {
                return Err(self.error("Invalid shorthand property initializer"));
            }
            return Ok(left);
        };

        let target = if operator == AssignmentOperator::Assign {
            self.to_assignment_target(left)?
        } else {
            self.to_simple_target(left)?
        };
        self.advance();
        let value = self.parse_assignment()?;
        Ok(Expression::Assignment(AssignmentExpression {
            operator,
            target,
            value: Box::new(value),
        }))
    }

    fn parse_yield(&mut self) -> Result<Expression, Error> {
        self.advance();
        let ends = matches!(
            self.kind(),
            TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
                | TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::Colon
                | TokenKind::Eof
        ) || self.current().newline_before;
        if ends {
            return Ok(Expression::Yield(YieldExpression {
                argument: None,
                delegate: false,
            }));
        }
        let delegate = self.eat(&TokenKind::Star);
        let argument = self.parse_assignment()?;
        Ok(Expression::Yield(YieldExpression {
            argument: Some(Box::new(argument)),
            delegate,
        }))
    }

    fn parse_conditional(&mut self) -> Result<Expression, Error> {
        let test = self.parse_binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let consequent = self.parse_assignment();
        self.in_allowed = outer;
        let consequent = consequent?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    /// Precedence climbing over every binary and logical operator.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;
        while let Some((operator, precedence)) = infix_operator(self.kind(), self.in_allowed) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = match operator {
                // `**` is right associative
                Infix::Binary(BinaryOperator::Exponent) => self.parse_binary(precedence)?,
                _ => self.parse_binary(precedence + 1)?,
            };
            left = match operator {
                Infix::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }),
                Infix::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, Error> {
        let operator = match self.kind() {
            TokenKind::Delete => UnaryOperator::Delete,
            TokenKind::Void => UnaryOperator::Void,
            TokenKind::Typeof => UnaryOperator::Typeof,
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Tilde => UnaryOperator::BitwiseNot,
            TokenKind::Bang => UnaryOperator::LogicalNot,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let operator = if self.check(&TokenKind::PlusPlus) {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                self.advance();
                let argument = self.parse_unary()?;
                let Pattern::Expression(argument) = self.to_update_target(argument)? else {
                    return Err(self.error("Invalid left-hand side expression in prefix operation"));
                };
                return Ok(Expression::Update(UpdateExpression {
                    operator,
                    argument,
                    prefix: true,
                }));
            }
            TokenKind::Await if !self.await_is_identifier() => {
                return Err(self.unsupported("await expressions"));
            }
            _ => return self.parse_postfix(),
        };

        self.advance();
        let argument = self.parse_unary()?;
        if operator == UnaryOperator::Delete
            && self.strict
            && matches!(argument, Expression::Identifier(_))
        {
            return Err(self.error("Delete of an unqualified identifier in strict mode"));
        }
        if self.check(&TokenKind::StarStar) {
            return Err(self.error(
                "Unary operator used immediately before exponentiation expression; parentheses are required",
            ));
        }
        Ok(Expression::Unary(UnaryExpression {
            operator,
            argument: Box::new(argument),
        }))
    }

    fn parse_postfix(&mut self) -> Result<Expression, Error> {
        let expression = self.parse_lhs()?;
        let operator = match self.kind() {
            TokenKind::PlusPlus => UpdateOperator::Increment,
            TokenKind::MinusMinus => UpdateOperator::Decrement,
            _ => return Ok(expression),
        };
        if self.current().newline_before {
            return Ok(expression);
        }
        let Pattern::Expression(argument) = self.to_update_target(expression)? else {
            return Err(self.error("Invalid left-hand side expression in postfix operation"));
        };
        self.advance();
        Ok(Expression::Update(UpdateExpression {
            operator,
            argument,
            prefix: false,
        }))
    }

    /// Validates an update operand, returning it wrapped as an expression pattern.
    fn to_update_target(&self, expression: Expression) -> Result<Pattern, Error> {
        match self.to_simple_target(expression)? {
            Pattern::Identifier(id) => Ok(Pattern::Expression(Box::new(Expression::Identifier(id)))),
            other => Ok(other),
        }
    }

    /// LeftHandSideExpression: member accesses, calls and `new`.
    fn parse_lhs(&mut self) -> Result<Expression, Error> {
        let base = match self.kind() {
            TokenKind::New => self.parse_new()?,
            TokenKind::Super => self.parse_super()?,
            _ => self.parse_primary()?,
        };
        self.parse_chain(base, true)
    }

    fn parse_chain(&mut self, mut expression: Expression, allow_calls: bool) -> Result<Expression, Error> {
        let mut optional_chain = false;
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.parse_identifier_name()?;
                    expression = member(expression, MemberProperty::Identifier(name), false);
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = self.parse_expression_allowing_in()?;
                    self.expect(&TokenKind::RightBracket)?;
                    expression = member(expression, MemberProperty::Computed(Box::new(property)), false);
                }
                TokenKind::LeftParen if allow_calls => {
                    let arguments = self.parse_arguments()?;
                    expression = Expression::Call(CallExpression {
                        callee: Box::new(expression),
                        arguments,
                        optional: false,
                    });
                }
                TokenKind::QuestionDot if allow_calls => {
                    self.advance();
                    optional_chain = true;
                    match self.kind() {
                        TokenKind::LeftParen => {
                            let arguments = self.parse_arguments()?;
                            expression = Expression::Call(CallExpression {
                                callee: Box::new(expression),
                                arguments,
                                optional: true,
                            });
                        }
                        TokenKind::LeftBracket => {
                            self.advance();
                            let property = self.parse_expression_allowing_in()?;
                            self.expect(&TokenKind::RightBracket)?;
                            expression =
                                member(expression, MemberProperty::Computed(Box::new(property)), true);
                        }
                        TokenKind::Template(_) => {
                            return Err(self.error("Invalid tagged template on optional chain"));
                        }
                        _ => {
                            let name = self.parse_identifier_name()?;
                            expression = member(expression, MemberProperty::Identifier(name), true);
                        }
                    }
                }
                TokenKind::Template(_) => return Err(self.unsupported("tagged templates")),
                _ => break,
            }
        }
        if optional_chain {
            expression = Expression::OptionalChain(Box::new(expression));
        }
        Ok(expression)
    }

    fn parse_new(&mut self) -> Result<Expression, Error> {
        let new_token = self.advance();
        if self.eat(&TokenKind::Dot) {
            if !self.check_contextual("target") {
                return Err(self.unexpected());
            }
            if !self.context.new_target_allowed {
                return Err(self.error_at(new_token.span.start, "new.target expression is not allowed here"));
            }
            self.advance();
            return Ok(Expression::NewTarget);
        }

        let callee = match self.kind() {
            TokenKind::New => self.parse_new()?,
            TokenKind::Super => self.parse_super()?,
            _ => self.parse_primary()?,
        };
        let callee = self.parse_chain(callee, false)?;
        let arguments = if self.check(&TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::New(NewExpression {
            callee: Box::new(callee),
            arguments,
        }))
    }

    fn parse_super(&mut self) -> Result<Expression, Error> {
        if !self.context.super_allowed {
            return Err(self.error("'super' keyword unexpected here"));
        }
        self.advance();
        match self.kind() {
            TokenKind::Dot => {
                self.advance();
                let name = self.parse_identifier_name()?;
                Ok(Expression::SuperMember(MemberProperty::Identifier(name)))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let property = self.parse_expression_allowing_in()?;
                self.expect(&TokenKind::RightBracket)?;
                Ok(Expression::SuperMember(MemberProperty::Computed(Box::new(property))))
            }
            TokenKind::LeftParen => Err(self.unsupported("super calls")),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, Error> {
        self.expect(&TokenKind::LeftParen)?;
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let result = self.parse_argument_list();
        self.in_allowed = outer;
        result
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Argument>, Error> {
        let mut arguments = Vec::new();
        while !self.eat(&TokenKind::RightParen) {
            if self.eat(&TokenKind::Ellipsis) {
                arguments.push(Argument::Spread(self.parse_assignment()?));
            } else {
                arguments.push(Argument::Expression(self.parse_assignment()?));
            }
            if !self.check(&TokenKind::RightParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression, Error> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::This => {
                self.advance();
                Ok(Expression::This)
            }
            TokenKind::Identifier(name) => {
                if name == "async"
                    && matches!(self.peek_kind(1), TokenKind::Function)
                    && !self.peek_token(1).newline_before
                {
                    return Err(self.unsupported("async functions"));
                }
                self.advance();
                Ok(Expression::Identifier(Identifier::new(name.as_str(), token.span)))
            }
            TokenKind::Yield if !self.strict && !self.context.generator => {
                self.advance();
                Ok(Expression::Identifier(Identifier::new("yield", token.span)))
            }
            TokenKind::Await if self.await_is_identifier() => {
                self.advance();
                Ok(Expression::Identifier(Identifier::new("await", token.span)))
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expression::Literal(Literal::Number(value)))
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expression::Literal(Literal::String(value)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }
            TokenKind::Template(parts) => {
                self.advance();
                self.parse_template(parts)
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.parse_expression_allowing_in()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expression)
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::Function => Ok(Expression::Function(self.parse_function(true)?)),
            TokenKind::Class => Err(self.unsupported("class expressions")),
            TokenKind::Import => Err(self.unsupported("dynamic imports")),
            TokenKind::Slash | TokenKind::SlashEqual => {
                Err(self.unsupported("regular expression literals"))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_template(&mut self, parts: TemplateParts) -> Result<Expression, Error> {
        let mut expressions = Vec::with_capacity(parts.substitutions.len());
        for span in parts.substitutions {
            let mut parser = self.sub_parser(span);
            if parser.is_at_end() {
                return Err(self.error_at(span.start, "Empty template substitution"));
            }
            let expression = parser.parse_expression_allowing_in()?;
            if !parser.is_at_end() {
                return Err(parser.unexpected());
            }
            expressions.push(expression);
        }
        Ok(Expression::Template(TemplateLiteral {
            quasis: parts.quasis,
            expressions,
        }))
    }

    fn parse_array_literal(&mut self) -> Result<Expression, Error> {
        self.expect(&TokenKind::LeftBracket)?;
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let result = self.parse_array_elements();
        self.in_allowed = outer;
        Ok(Expression::Array(result?))
    }

    fn parse_array_elements(&mut self) -> Result<Vec<ArrayElement>, Error> {
        let mut elements = Vec::new();
        loop {
            match self.kind() {
                TokenKind::RightBracket => {
                    self.advance();
                    return Ok(elements);
                }
                TokenKind::Comma => {
                    self.advance();
                    elements.push(ArrayElement::Hole);
                    continue;
                }
                TokenKind::Ellipsis => {
                    self.advance();
                    elements.push(ArrayElement::Spread(self.parse_assignment_inner(false)?));
                }
                _ => elements.push(ArrayElement::Expression(self.parse_assignment_inner(false)?)),
            }
            if !self.check(&TokenKind::RightBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expression, Error> {
        self.expect(&TokenKind::LeftBrace)?;
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let result = self.parse_object_members();
        self.in_allowed = outer;
        Ok(Expression::Object(result?))
    }

    fn parse_object_members(&mut self) -> Result<Vec<ObjectMember>, Error> {
        let mut members = Vec::new();
        let mut has_proto = false;
        while !self.eat(&TokenKind::RightBrace) {
            let member = self.parse_object_member()?;
            if let ObjectMember::Proto(_) = member {
                if has_proto {
                    return Err(self.error("Duplicate __proto__ fields are not allowed in object literals"));
                }
                has_proto = true;
            }
            members.push(member);
            if !self.check(&TokenKind::RightBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        Ok(members)
    }

    fn parse_object_member(&mut self) -> Result<ObjectMember, Error> {
        let start = self.current().span.start;

        if self.eat(&TokenKind::Ellipsis) {
            return Ok(ObjectMember::Spread(self.parse_assignment()?));
        }

        if self.eat(&TokenKind::Star) {
            let key = self.parse_property_name()?;
            let function = self.parse_method(start, FunctionKind::Generator)?;
            return Ok(ObjectMember::Method(key, function));
        }

        let followed_by_name = !matches!(
            self.peek_kind(1),
            TokenKind::LeftParen
                | TokenKind::Colon
                | TokenKind::Comma
                | TokenKind::RightBrace
                | TokenKind::Equal
        );
        if followed_by_name && (self.check_contextual("get") || self.check_contextual("set")) {
            let kind = if self.check_contextual("get") {
                FunctionKind::Getter
            } else {
                FunctionKind::Setter
            };
            self.advance();
            let key = self.parse_property_name()?;
            let function = self.parse_method(start, kind)?;
            return Ok(ObjectMember::Method(key, function));
        }
        if followed_by_name && self.check_contextual("async") && !self.peek_token(1).newline_before {
            return Err(self.unsupported("async methods"));
        }

        let key_token = self.current().clone();
        let key = self.parse_property_name()?;
        match self.kind() {
            TokenKind::LeftParen => {
                let function = self.parse_method(start, FunctionKind::Method)?;
                Ok(ObjectMember::Method(key, function))
            }
            TokenKind::Colon => {
                self.advance();
                let value = self.parse_assignment_inner(false)?;
                let is_proto = matches!(&key, PropertyName::String(name) if *name == "__proto__")
                    && !matches!(key_token.kind, TokenKind::LeftBracket);
                if is_proto {
                    Ok(ObjectMember::Proto(value))
                } else {
                    Ok(ObjectMember::Property(key, value))
                }
            }
            _ => {
                let id = match key_token.kind {
                    TokenKind::Identifier(name) => {
                        self.check_identifier_reference(&name, key_token.span.start)?;
                        Identifier::new(name.as_str(), key_token.span)
                    }
                    TokenKind::Yield if !self.strict && !self.context.generator => {
                        Identifier::new("yield", key_token.span)
                    }
                    TokenKind::Await if self.await_is_identifier() => {
                        Identifier::new("await", key_token.span)
                    }
                    _ => return Err(self.unexpected()),
                };
                if self.eat(&TokenKind::Equal) {
                    let default = self.parse_assignment()?;
                    Ok(ObjectMember::CoverInitializedName(id, default))
                } else {
                    Ok(ObjectMember::Shorthand(id))
                }
            }
        }
    }

    fn parse_property_name(&mut self) -> Result<PropertyName, Error> {
        let token = self.advance();
        match token.kind {
            TokenKind::String(value) => Ok(PropertyName::String(value)),
            TokenKind::Number(value) => Ok(PropertyName::Number(value)),
            TokenKind::LeftBracket => {
                let outer = std::mem::replace(&mut self.in_allowed, true);
                let key = self.parse_assignment();
                self.in_allowed = outer;
                let key = key?;
                self.expect(&TokenKind::RightBracket)?;
                Ok(PropertyName::Computed(Box::new(key)))
            }
            kind => match kind.identifier_name() {
                Some(name) => Ok(PropertyName::String(name.into())),
                None => Err(self.error_at(token.span.start, "Unexpected token in property name")),
            },
        }
    }

    /// IdentifierName after `.`: reserved words are allowed.
    fn parse_identifier_name(&mut self) -> Result<Name, Error> {
        let Some(name) = self.kind().identifier_name().map(Name::from) else {
            return Err(self.unexpected());
        };
        self.advance();
        Ok(name)
    }

    fn check_identifier_reference(&self, name: &str, offset: usize) -> Result<(), Error> {
        if self.strict && STRICT_RESERVED.contains(&name) {
            return Err(self.error_at(offset, format!("Unexpected strict mode reserved word '{name}'")));
        }
        Ok(())
    }

    // Functions

    /// Parses `function [*] [name] (params) { body }`.
    pub(super) fn parse_function(&mut self, is_expression: bool) -> Result<Rc<Function>, Error> {
        let start = self.current().span.start;
        self.expect(&TokenKind::Function)?;
        let generator = self.eat(&TokenKind::Star);
        let id = if is_expression && self.check(&TokenKind::LeftParen) {
            None
        } else {
            Some(self.parse_binding_identifier()?)
        };
        let kind = if generator {
            FunctionKind::Generator
        } else {
            FunctionKind::Normal
        };
        let context = FunctionContext {
            return_allowed: true,
            new_target_allowed: true,
            super_allowed: false,
            generator,
            ..FunctionContext::default()
        };
        self.parse_function_rest(start, id, kind, context)
    }

    fn parse_method(&mut self, start: usize, kind: FunctionKind) -> Result<Rc<Function>, Error> {
        let context = FunctionContext {
            return_allowed: true,
            new_target_allowed: true,
            super_allowed: true,
            generator: kind == FunctionKind::Generator,
            ..FunctionContext::default()
        };
        let function = self.parse_function_rest(start, None, kind, context)?;
        match kind {
            FunctionKind::Getter if !function.params.is_empty() || function.rest.is_some() => {
                Err(self.error_at(start, "Getter must not have any formal parameters"))
            }
            FunctionKind::Setter if function.params.len() != 1 || function.rest.is_some() => {
                Err(self.error_at(start, "Setter must have exactly one formal parameter"))
            }
            _ => Ok(function),
        }
    }

    fn parse_function_rest(
        &mut self,
        start: usize,
        id: Option<Identifier>,
        kind: FunctionKind,
        context: FunctionContext,
    ) -> Result<Rc<Function>, Error> {
        let outer_context = std::mem::replace(&mut self.context, context);
        let outer_in = std::mem::replace(&mut self.in_allowed, true);
        let outer_strict = self.strict;

        let result = self.parse_formal_parameters().and_then(|(params, rest)| {
            let body = self.parse_function_body()?;
            self.finish_function(start, id, params, rest, body, kind, outer_strict)
        });

        self.context = outer_context;
        self.in_allowed = outer_in;
        self.strict = outer_strict;
        result
    }

    fn is_arrow_ahead(&self) -> bool {
        match self.kind() {
            TokenKind::Identifier(_) => {
                matches!(self.peek_kind(1), TokenKind::Arrow) && !self.peek_token(1).newline_before
            }
            TokenKind::Yield | TokenKind::Await => matches!(self.peek_kind(1), TokenKind::Arrow),
            TokenKind::LeftParen => self.matching_close().is_some_and(|index| {
                let token = self.token_at(index);
                matches!(token.kind, TokenKind::Arrow) && !token.newline_before
            }),
            _ => false,
        }
    }

    fn at_async_arrow(&self) -> bool {
        if !self.check_contextual("async") || self.peek_token(1).newline_before {
            return false;
        }
        match self.peek_kind(1) {
            TokenKind::Identifier(_) => matches!(self.peek_kind(2), TokenKind::Arrow),
            TokenKind::LeftParen => {
                let mut probe = 1;
                let mut depth = 0usize;
                loop {
                    match self.peek_kind(probe) {
                        TokenKind::LeftParen => depth += 1,
                        TokenKind::RightParen => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.peek_kind(probe + 1), TokenKind::Arrow);
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    probe += 1;
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Rc<Function>, Error> {
        let start = self.current().span.start;
        let context = FunctionContext {
            return_allowed: true,
            new_target_allowed: self.context.new_target_allowed,
            super_allowed: self.context.super_allowed,
            generator: false,
            ..FunctionContext::default()
        };
        let outer_context = std::mem::replace(&mut self.context, context);
        let outer_strict = self.strict;
        let outer_in = self.in_allowed;

        let result = self.parse_arrow_parts(start, outer_strict);

        self.context = outer_context;
        self.strict = outer_strict;
        self.in_allowed = outer_in;
        result
    }

    fn parse_arrow_parts(&mut self, start: usize, outer_strict: bool) -> Result<Rc<Function>, Error> {
        let (params, rest) = if self.check(&TokenKind::LeftParen) {
            let outer_in = std::mem::replace(&mut self.in_allowed, true);
            let params = self.parse_formal_parameters();
            self.in_allowed = outer_in;
            params?
        } else {
            (vec![Pattern::Identifier(self.parse_binding_identifier()?)], None)
        };
        self.expect(&TokenKind::Arrow)?;

        let body = if self.check(&TokenKind::LeftBrace) {
            self.in_allowed = true;
            self.parse_function_body()?
        } else {
            vec![Statement::Return(Some(self.parse_assignment()?))]
        };
        self.finish_function(start, None, params, rest, body, FunctionKind::Arrow, outer_strict)
    }

    fn parse_formal_parameters(&mut self) -> Result<(Vec<Pattern>, Option<Pattern>), Error> {
        self.expect(&TokenKind::LeftParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.eat(&TokenKind::RightParen) {
            if self.eat(&TokenKind::Ellipsis) {
                rest = Some(self.parse_binding_target()?);
                if !self.check(&TokenKind::RightParen) {
                    return Err(self.error("Rest parameter must be last formal parameter"));
                }
                continue;
            }
            params.push(self.parse_binding_element()?);
            if !self.check(&TokenKind::RightParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        Ok((params, rest))
    }

    /// Applies function-level early errors and builds the node.
    #[allow(clippy::too_many_arguments)]
    fn finish_function(
        &self,
        start: usize,
        id: Option<Identifier>,
        params: Vec<Pattern>,
        rest: Option<Pattern>,
        body: Vec<Statement>,
        kind: FunctionKind,
        outer_strict: bool,
    ) -> Result<Rc<Function>, Error> {
        let simple_params = rest.is_none() && params.iter().all(|p| matches!(p, Pattern::Identifier(_)));
        let strict = self.strict;
        if strict && !outer_strict && !simple_params {
            return Err(self.error_at(
                start,
                "Illegal 'use strict' directive in function with non-simple parameter list",
            ));
        }

        let mut names = Vec::new();
        for param in params.iter().chain(rest.iter()) {
            scope::bound_names(param, &mut names);
        }
        let unique_required = strict
            || !simple_params
            || !matches!(kind, FunctionKind::Normal | FunctionKind::Generator);
        if unique_required && let Some(name) = scope::find_duplicate(&names) {
            return Err(self.error_at(start, format!("Duplicate parameter name '{name}' not allowed in this context")));
        }
        if strict {
            let restricted = names
                .iter()
                .chain(id.iter().map(|id| &id.name))
                .find(|name| matches!(&***name, "eval" | "arguments") || STRICT_RESERVED.contains(&&***name));
            if let Some(name) = restricted {
                return Err(self.error_at(start, format!("Unexpected eval or arguments in strict mode: '{name}'")));
            }
        }
        self.check_declarations(&body, false, &names)?;

        let param_expressions = params.iter().chain(rest.iter()).any(pattern_has_expressions);
        let source_text: Rc<str> = self.source[start..self.previous_end()].into();

        Ok(Rc::new(Function {
            id,
            params,
            rest,
            body,
            kind,
            strict,
            simple_params,
            param_expressions,
            source_text,
        }))
    }

    // Patterns

    /// A BindingIdentifier or a destructuring binding pattern.
    pub(super) fn parse_binding_target(&mut self) -> Result<Pattern, Error> {
        match self.kind() {
            TokenKind::LeftBrace => self.parse_object_binding_pattern(),
            TokenKind::LeftBracket => self.parse_array_binding_pattern(),
            _ => Ok(Pattern::Identifier(self.parse_binding_identifier()?)),
        }
    }

    /// A binding target with an optional `= default`.
    fn parse_binding_element(&mut self) -> Result<Pattern, Error> {
        let target = self.parse_binding_target()?;
        if !self.eat(&TokenKind::Equal) {
            return Ok(target);
        }
        let outer = std::mem::replace(&mut self.in_allowed, true);
        let default = self.parse_assignment();
        self.in_allowed = outer;
        Ok(Pattern::Assignment(AssignmentPattern {
            target: Box::new(target),
            default: Box::new(default?),
        }))
    }

    pub(super) fn parse_binding_identifier(&mut self) -> Result<Identifier, Error> {
        let token = self.current().clone();
        let name = match &token.kind {
            TokenKind::Identifier(name) => {
                if self.strict && (name == "eval" || name == "arguments") {
                    return Err(self.error(format!("Unexpected eval or arguments in strict mode: '{name}'")));
                }
                self.check_identifier_reference(name, token.span.start)?;
                name.as_str()
            }
            TokenKind::Yield if !self.strict && !self.context.generator => "yield",
            TokenKind::Await if self.await_is_identifier() => "await",
            _ => return Err(self.unexpected()),
        };
        let id = Identifier::new(name, token.span);
        self.advance();
        Ok(id)
    }

    fn parse_object_binding_pattern(&mut self) -> Result<Pattern, Error> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;
        while !self.eat(&TokenKind::RightBrace) {
            if self.eat(&TokenKind::Ellipsis) {
                rest = Some(Box::new(Pattern::Identifier(self.parse_binding_identifier()?)));
                if !self.check(&TokenKind::RightBrace) {
                    return Err(self.error("Rest element must be last element"));
                }
                continue;
            }
            let shorthand = matches!(
                self.kind(),
                TokenKind::Identifier(_) | TokenKind::Yield | TokenKind::Await
            ) && !matches!(self.peek_kind(1), TokenKind::Colon);
            let property = if shorthand {
                let id = self.parse_binding_identifier()?;
                let key = PropertyName::String(JsString::from(&*id.name));
                let mut value = Pattern::Identifier(id);
                if self.eat(&TokenKind::Equal) {
                    let default = self.parse_assignment()?;
                    value = Pattern::Assignment(AssignmentPattern {
                        target: Box::new(value),
                        default: Box::new(default),
                    });
                }
                PatternProperty { key, value }
            } else {
                let key = self.parse_property_name()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.parse_binding_element()?;
                PatternProperty { key, value }
            };
            properties.push(property);
            if !self.check(&TokenKind::RightBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        Ok(Pattern::Object(ObjectPattern { properties, rest }))
    }

    fn parse_array_binding_pattern(&mut self) -> Result<Pattern, Error> {
        self.expect(&TokenKind::LeftBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;
        loop {
            match self.kind() {
                TokenKind::RightBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                    elements.push(None);
                    continue;
                }
                TokenKind::Ellipsis => {
                    self.advance();
                    rest = Some(Box::new(self.parse_binding_target()?));
                    self.expect(&TokenKind::RightBracket)?;
                    break;
                }
                _ => elements.push(Some(self.parse_binding_element()?)),
            }
            if !self.check(&TokenKind::RightBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        Ok(Pattern::Array(ArrayPattern { elements, rest }))
    }

    // Cover grammar

    /// Reinterprets the left side of `=` (or a for-in/of head) as a target.
    pub(super) fn to_assignment_target(&self, expression: Expression) -> Result<Pattern, Error> {
        match expression {
            Expression::Object(members) => self.object_assignment_pattern(members),
            Expression::Array(elements) => self.array_assignment_pattern(elements),
            other => self.to_simple_target(other),
        }
    }

    /// A target that is not a destructuring pattern: an identifier or a
    /// non-optional member access.
    fn to_simple_target(&self, expression: Expression) -> Result<Pattern, Error> {
        match expression {
            Expression::Identifier(id) => {
                if self.strict && matches!(&*id.name, "eval" | "arguments") {
                    return Err(self.error_at(id.span.start, "Unexpected eval or arguments in strict mode"));
                }
                Ok(Pattern::Identifier(id))
            }
            Expression::Member(member) if !member.optional => {
                Ok(Pattern::Expression(Box::new(Expression::Member(member))))
            }
            expression @ Expression::SuperMember(_) => Ok(Pattern::Expression(Box::new(expression))),
            _ => Err(self.error("Invalid left-hand side in assignment")),
        }
    }

    fn to_assignment_element(&self, expression: Expression) -> Result<Pattern, Error> {
        match expression {
            Expression::Assignment(assignment) if assignment.operator == AssignmentOperator::Assign => {
                Ok(Pattern::Assignment(AssignmentPattern {
                    target: Box::new(assignment.target),
                    default: assignment.value,
                }))
            }
            other => self.to_assignment_target(other),
        }
    }

    fn object_assignment_pattern(&self, members: Vec<ObjectMember>) -> Result<Pattern, Error> {
        let count = members.len();
        let mut properties = Vec::new();
        let mut rest = None;
        for (index, member) in members.into_iter().enumerate() {
            let property = match member {
                ObjectMember::Property(key, value) => PatternProperty {
                    key,
                    value: self.to_assignment_element(value)?,
                },
                ObjectMember::Proto(value) => PatternProperty {
                    key: PropertyName::String("__proto__".into()),
                    value: self.to_assignment_element(value)?,
                },
                ObjectMember::Shorthand(id) => PatternProperty {
                    key: PropertyName::String(JsString::from(&*id.name)),
                    value: self.to_simple_target(Expression::Identifier(id))?,
                },
                ObjectMember::CoverInitializedName(id, default) => {
                    let key = PropertyName::String(JsString::from(&*id.name));
                    let target = self.to_simple_target(Expression::Identifier(id))?;
                    PatternProperty {
                        key,
                        value: Pattern::Assignment(AssignmentPattern {
                            target: Box::new(target),
                            default: Box::new(default),
                        }),
                    }
                }
                ObjectMember::Spread(expression) if index + 1 == count => {
                    rest = Some(Box::new(self.to_simple_target(expression)?));
                    continue;
                }
                _ => return Err(self.error("Invalid destructuring assignment target")),
            };
            properties.push(property);
        }
        Ok(Pattern::Object(ObjectPattern { properties, rest }))
    }

    fn array_assignment_pattern(&self, elements: Vec<ArrayElement>) -> Result<Pattern, Error> {
        let count = elements.len();
        let mut patterns = Vec::new();
        let mut rest = None;
        for (index, element) in elements.into_iter().enumerate() {
            match element {
                ArrayElement::Hole => patterns.push(None),
                ArrayElement::Expression(expression) => {
                    patterns.push(Some(self.to_assignment_element(expression)?));
                }
                ArrayElement::Spread(expression) if index + 1 == count => {
                    rest = Some(Box::new(self.to_assignment_target(expression)?));
                }
                ArrayElement::Spread(_) => {
                    return Err(self.error("Rest element must be last element"));
                }
            }
        }
        Ok(Pattern::Array(ArrayPattern {
            elements: patterns,
            rest,
        }))
    }
}

fn member(object: Expression, property: MemberProperty, optional: bool) -> Expression {
    Expression::Member(MemberExpression {
        object: Box::new(object),
        property,
        optional,
    })
}

/// Whether an object/array literal still holds a `name = value` shorthand
/// that was never reinterpreted as a pattern.
fn contains_cover_initializer(expression: &Expression) -> bool {
    match expression {
        Expression::Object(members) => members.iter().any(|member| match member {
            ObjectMember::CoverInitializedName(..) => true,
            ObjectMember::Property(_, value) | ObjectMember::Proto(value) => {
                contains_cover_initializer(value)
            }
            _ => false,
        }),
        Expression::Array(elements) => elements.iter().any(|element| match element {
            ArrayElement::Expression(value) | ArrayElement::Spread(value) => {
                contains_cover_initializer(value)
            }
            ArrayElement::Hole => false,
        }),
        _ => false,
    }
}

/// ContainsExpression for a parameter pattern.
fn pattern_has_expressions(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Identifier(_) => false,
        Pattern::Assignment(_) | Pattern::Expression(_) => true,
        Pattern::Object(object) => {
            object.properties.iter().any(|property| {
                matches!(property.key, PropertyName::Computed(_)) || pattern_has_expressions(&property.value)
            }) || object.rest.as_deref().is_some_and(pattern_has_expressions)
        }
        Pattern::Array(array) => {
            array.elements.iter().flatten().any(pattern_has_expressions)
                || array.rest.as_deref().is_some_and(pattern_has_expressions)
        }
    }
}
