//! Abstract Syntax Tree (AST) definitions for ECMAScript.
//!
//! These structures follow ESTree naming where possible. Function nodes are
//! reference counted so that function objects created at runtime can share
//! their code with the tree they were parsed from.

pub mod scope;

use std::rc::Rc;

use crate::lexer::Span;
use crate::runtime::string::JsString;

/// A name as it appears in source, shared between the tree and runtime bindings.
pub type Name = Rc<str>;

/// A classic script.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// The statements in the script
    pub body: Vec<Statement>,
    /// Whether the script starts with a `"use strict"` directive
    pub strict: bool,
}

/// A module. Module code is always strict.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// The module items
    pub body: Vec<Statement>,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: Name,
    /// Where the identifier appears
    pub span: Span,
}

impl Identifier {
    /// Creates an identifier.
    pub fn new(name: impl Into<Name>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// An ECMAScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),
    /// Function or generator declaration
    FunctionDeclaration(Rc<Function>),
    /// Expression statement
    Expression(Expression),
    /// Block statement { ... }
    Block(BlockStatement),
    /// If statement
    If(IfStatement),
    /// Switch statement
    Switch(SwitchStatement),
    /// While statement
    While(WhileStatement),
    /// Do-while statement
    DoWhile(DoWhileStatement),
    /// For statement
    For(ForStatement),
    /// For-in statement
    ForIn(ForInStatement),
    /// For-of statement
    ForOf(ForOfStatement),
    /// Return statement
    Return(Option<Expression>),
    /// Break statement with optional label
    Break(Option<Identifier>),
    /// Continue statement with optional label
    Continue(Option<Identifier>),
    /// Throw statement
    Throw(Expression),
    /// Try statement
    Try(TryStatement),
    /// With statement
    With(WithStatement),
    /// Labeled statement
    Labeled(LabeledStatement),
    /// Debugger statement
    Debugger,
    /// Empty statement (;)
    Empty,
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var declaration
    Var,
    /// let declaration
    Let,
    /// const declaration
    Const,
}

impl VariableKind {
    /// Returns true for `let` and `const`.
    pub fn is_lexical(self) -> bool {
        !matches!(self, VariableKind::Var)
    }
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The kind of declaration
    pub kind: VariableKind,
    /// The declarators
    pub declarations: Vec<VariableDeclarator>,
}

/// A single variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// The binding target
    pub target: Pattern,
    /// Optional initializer expression
    pub init: Option<Expression>,
}

/// A binding or assignment target.
///
/// Binding patterns (declarations, parameters, catch parameters) never
/// contain [`Pattern::Expression`]; assignment patterns may.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// A plain identifier
    Identifier(Identifier),
    /// `{ a, b: c, ...rest }`
    Object(ObjectPattern),
    /// `[a, , b, ...rest]`
    Array(ArrayPattern),
    /// A target with a default value, `a = 1`
    Assignment(AssignmentPattern),
    /// A member expression target (assignment patterns only)
    Expression(Box<Expression>),
}

/// An object destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    /// The named properties
    pub properties: Vec<PatternProperty>,
    /// The rest element
    pub rest: Option<Box<Pattern>>,
}

/// One `key: target` entry in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    /// The property to read
    pub key: PropertyName,
    /// Where the value goes
    pub value: Pattern,
}

/// An array destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// The elements (None represents an elision)
    pub elements: Vec<Option<Pattern>>,
    /// The rest element
    pub rest: Option<Box<Pattern>>,
}

/// A pattern with a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPattern {
    /// The target
    pub target: Box<Pattern>,
    /// The value used when the incoming value is undefined
    pub default: Box<Expression>,
}

/// The kind of a function node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function f() {}`
    Normal,
    /// `() => {}`
    Arrow,
    /// Concise method in an object literal
    Method,
    /// `get x() {}`
    Getter,
    /// `set x(v) {}`
    Setter,
    /// `function* g() {}`
    Generator,
}

/// A function, arrow, method or generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The binding identifier, if any
    pub id: Option<Identifier>,
    /// The formal parameters (without the rest parameter)
    pub params: Vec<Pattern>,
    /// The rest parameter
    pub rest: Option<Pattern>,
    /// The body; an arrow with an expression body holds a single return
    pub body: Vec<Statement>,
    /// The function kind
    pub kind: FunctionKind,
    /// Whether the function's code is strict
    pub strict: bool,
    /// Whether every parameter is a plain identifier without a default
    pub simple_params: bool,
    /// Whether any parameter contains an expression (defaults, computed keys)
    pub param_expressions: bool,
    /// The source text of the whole function
    pub source_text: Rc<str>,
}

impl Function {
    /// The number of parameters before the first default or rest parameter.
    pub fn expected_argument_count(&self) -> usize {
        self.params
            .iter()
            .take_while(|param| !matches!(param, Pattern::Assignment(_)))
            .count()
    }

    /// Returns true for arrows.
    pub fn is_arrow(&self) -> bool {
        self.kind == FunctionKind::Arrow
    }
}

/// A block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    /// The statements in the block
    pub body: Vec<Statement>,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition
    pub test: Expression,
    /// The then branch
    pub consequent: Box<Statement>,
    /// The optional else branch
    pub alternate: Option<Box<Statement>>,
}

/// A while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The condition
    pub test: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A do-while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    /// The loop body
    pub body: Box<Statement>,
    /// The condition
    pub test: Expression,
}

/// A for statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// The initializer
    pub init: Option<ForInit>,
    /// The condition
    pub test: Option<Expression>,
    /// The update expression
    pub update: Option<Expression>,
    /// The loop body
    pub body: Box<Statement>,
}

/// For loop initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// Variable declaration
    Declaration(VariableDeclaration),
    /// Expression
    Expression(Expression),
}

/// Left-hand side of for-in/for-of.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    /// `for (var|let|const target ...)`
    Declaration(VariableKind, Pattern),
    /// `for (target ...)`, an assignment target
    Pattern(Pattern),
}

/// A for-in statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement {
    /// The left-hand side
    pub left: ForInLeft,
    /// The object to iterate over
    pub right: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A for-of statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStatement {
    /// The left-hand side
    pub left: ForInLeft,
    /// The iterable
    pub right: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The discriminant expression
    pub discriminant: Expression,
    /// The case clauses
    pub cases: Vec<SwitchCase>,
}

/// A switch case clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// The test expression (None for default)
    pub test: Option<Expression>,
    /// The consequent statements
    pub consequent: Vec<Statement>,
}

/// A try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    /// The try block
    pub block: BlockStatement,
    /// The catch clause
    pub handler: Option<CatchClause>,
    /// The finally block
    pub finalizer: Option<BlockStatement>,
}

/// A catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// The error parameter
    pub param: Option<Pattern>,
    /// The catch body
    pub body: BlockStatement,
}

/// A with statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// The object expression
    pub object: Expression,
    /// The body statement
    pub body: Box<Statement>,
}

/// A labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    /// The label identifier
    pub label: Identifier,
    /// The labeled body
    pub body: Box<Statement>,
}

/// An ECMAScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Literal),
    /// Template literal
    Template(TemplateLiteral),
    /// Identifier reference
    Identifier(Identifier),
    /// this keyword
    This,
    /// Array literal
    Array(Vec<ArrayElement>),
    /// Object literal
    Object(Vec<ObjectMember>),
    /// Function expression
    Function(Rc<Function>),
    /// Arrow function expression
    Arrow(Rc<Function>),
    /// Unary expression
    Unary(UnaryExpression),
    /// Update expression (++/--)
    Update(UpdateExpression),
    /// Binary expression
    Binary(BinaryExpression),
    /// Logical expression (&&, ||, ??)
    Logical(LogicalExpression),
    /// Conditional (ternary) expression
    Conditional(ConditionalExpression),
    /// Assignment expression
    Assignment(AssignmentExpression),
    /// Sequence expression (comma operator)
    Sequence(Vec<Expression>),
    /// Member access expression
    Member(MemberExpression),
    /// `super.x` or `super[x]`
    SuperMember(MemberProperty),
    /// Call expression
    Call(CallExpression),
    /// new expression
    New(NewExpression),
    /// `new.target`
    NewTarget,
    /// The outer boundary of an optional chain (`a?.b.c`)
    OptionalChain(Box<Expression>),
    /// `yield` / `yield*`
    Yield(YieldExpression),
}

impl Expression {
    /// Returns true if this is an anonymous function or arrow definition,
    /// which takes its name from the binding it is assigned to.
    pub fn is_anonymous_function_definition(&self) -> bool {
        match self {
            Expression::Function(function) => function.id.is_none(),
            Expression::Arrow(_) => true,
            _ => false,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal
    Number(f64),
    /// String literal
    String(JsString),
    /// Boolean literal
    Boolean(bool),
    /// null literal
    Null,
}

/// A template literal. `quasis` has one more element than `expressions`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    /// Cooked string chunks
    pub quasis: Vec<JsString>,
    /// Substitutions
    pub expressions: Vec<Expression>,
}

/// An element of an array literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    /// `[,]`
    Hole,
    /// A plain element
    Expression(Expression),
    /// `...iterable`
    Spread(Expression),
}

/// A member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value`
    Property(PropertyName, Expression),
    /// `name`
    Shorthand(Identifier),
    /// `name = default`; only valid once reinterpreted as a pattern
    CoverInitializedName(Identifier, Expression),
    /// `key() {}`, `get key() {}`, `set key(v) {}`
    Method(PropertyName, Rc<Function>),
    /// `...source`
    Spread(Expression),
    /// `__proto__: value`
    Proto(Expression),
}

/// A property name in an object literal or pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    /// Identifier name or string literal
    String(JsString),
    /// Numeric literal key
    Number(f64),
    /// `[expression]`
    Computed(Box<Expression>),
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// The operator
    pub operator: UnaryOperator,
    /// The operand
    pub argument: Box<Expression>,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    LogicalNot,
    /// ~
    BitwiseNot,
    /// typeof
    Typeof,
    /// void
    Void,
    /// delete
    Delete,
}

/// An update expression (++/--)
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// The operator
    pub operator: UpdateOperator,
    /// The operand
    pub argument: Box<Expression>,
    /// Whether prefix (++x) or postfix (x++)
    pub prefix: bool,
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// The operator
    pub operator: BinaryOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    // Comparison
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    // Bitwise
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    // Other
    In,
    InstanceOf,
}

/// A short-circuiting logical expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    /// The operator
    pub operator: LogicalOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand, evaluated only when needed
    pub right: Box<Expression>,
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
    /// ??
    Nullish,
}

/// A conditional (ternary) expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    /// The condition
    pub test: Box<Expression>,
    /// The consequent (if true)
    pub consequent: Box<Expression>,
    /// The alternate (if false)
    pub alternate: Box<Expression>,
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    /// The operator
    pub operator: AssignmentOperator,
    /// The target; only `=` may use object or array patterns
    pub target: Pattern,
    /// The right-hand side
    pub value: Box<Expression>,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `op=` for an arithmetic, bitwise or shift operator
    Compound(BinaryOperator),
    /// `&&=`, `||=`, `??=`
    Logical(LogicalOperator),
}

/// A member access expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// The object
    pub object: Box<Expression>,
    /// The property
    pub property: MemberProperty,
    /// Whether this link is `?.`
    pub optional: bool,
}

/// Member property.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `.name`
    Identifier(Name),
    /// `[expression]`
    Computed(Box<Expression>),
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A plain argument
    Expression(Expression),
    /// `...iterable`
    Spread(Expression),
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The function being called
    pub callee: Box<Expression>,
    /// The arguments
    pub arguments: Vec<Argument>,
    /// Whether this link is `?.()`
    pub optional: bool,
}

/// A new expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    /// The constructor
    pub callee: Box<Expression>,
    /// The arguments
    pub arguments: Vec<Argument>,
}

/// A yield expression.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    /// The yielded value
    pub argument: Option<Box<Expression>>,
    /// Whether this is `yield*`
    pub delegate: bool,
}
