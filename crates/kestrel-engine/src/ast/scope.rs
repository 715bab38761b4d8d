//! Static semantics over the syntax tree.
//!
//! These walks answer the questions declaration instantiation asks before a
//! body runs: which names does a pattern bind, which names are `var`-scoped,
//! and which declarations are lexically scoped to a statement list.
//!
//! Top-level function declarations are var-scoped in function bodies and
//! scripts, and lexically scoped in modules and blocks.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use super::{ForInLeft, ForInit, Function, Name, Pattern, Statement, VariableKind};

/// A lexically scoped declaration of a statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalDeclaration {
    /// The bound name
    pub name: Name,
    /// What declared it
    pub kind: DeclarationKind,
}

/// The declaration form behind a lexical binding.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    /// `let`
    Let,
    /// `const`
    Const,
    /// A function or generator declaration
    Function(Rc<Function>),
}

impl LexicalDeclaration {
    /// IsConstantDeclaration.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, DeclarationKind::Const)
    }
}

/// Collects the BoundNames of a pattern, in source order.
pub fn bound_names(pattern: &Pattern, out: &mut Vec<Name>) {
    match pattern {
        Pattern::Identifier(id) => out.push(id.name.clone()),
        Pattern::Object(object) => {
            for property in &object.properties {
                bound_names(&property.value, out);
            }
            if let Some(rest) = &object.rest {
                bound_names(rest, out);
            }
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                bound_names(element, out);
            }
            if let Some(rest) = &array.rest {
                bound_names(rest, out);
            }
        }
        Pattern::Assignment(assignment) => bound_names(&assignment.target, out),
        Pattern::Expression(_) => {}
    }
}

/// BoundNames of a pattern as a fresh vector.
pub fn pattern_names(pattern: &Pattern) -> Vec<Name> {
    let mut names = Vec::new();
    bound_names(pattern, &mut names);
    names
}

/// The parameter names of a function, including the rest parameter,
/// duplicates preserved.
pub fn parameter_names(function: &Function) -> Vec<Name> {
    let mut names = Vec::new();
    for param in &function.params {
        bound_names(param, &mut names);
    }
    if let Some(rest) = &function.rest {
        bound_names(rest, &mut names);
    }
    names
}

/// VarDeclaredNames of a statement list, deduplicated in first-seen order.
///
/// With `top_level_functions`, function declarations directly in `body`
/// (possibly under labels) contribute their names.
pub fn var_declared_names(body: &[Statement], top_level_functions: bool) -> Vec<Name> {
    let mut names = Vec::new();
    for statement in body {
        if top_level_functions && let Some(function) = top_level_function(statement) {
            if let Some(id) = &function.id {
                names.push(id.name.clone());
            }
            continue;
        }
        collect_var_names(statement, &mut names);
    }
    dedup(names)
}

/// The function declarations directly in `body` (possibly labeled), in
/// source order. Callers instantiate them last-to-first, skipping names
/// already seen, so the last declaration of a name wins.
pub fn var_scoped_functions(body: &[Statement]) -> Vec<Rc<Function>> {
    body.iter()
        .filter_map(top_level_function)
        .cloned()
        .collect()
}

/// LexicallyScopedDeclarations of a statement list.
///
/// `functions_are_lexical` selects module/block treatment of function
/// declarations directly in `body`.
pub fn lexically_scoped_declarations(
    body: &[Statement],
    functions_are_lexical: bool,
) -> Vec<LexicalDeclaration> {
    let mut declarations = Vec::new();
    for statement in body {
        match statement {
            Statement::VariableDeclaration(declaration) if declaration.kind.is_lexical() => {
                let kind = if declaration.kind == VariableKind::Const {
                    DeclarationKind::Const
                } else {
                    DeclarationKind::Let
                };
                for declarator in &declaration.declarations {
                    for name in pattern_names(&declarator.target) {
                        declarations.push(LexicalDeclaration {
                            name,
                            kind: kind.clone(),
                        });
                    }
                }
            }
            _ if functions_are_lexical => {
                if let Some(function) = top_level_function(statement)
                    && let Some(id) = &function.id
                {
                    declarations.push(LexicalDeclaration {
                        name: id.name.clone(),
                        kind: DeclarationKind::Function(function.clone()),
                    });
                }
            }
            _ => {}
        }
    }
    declarations
}

/// LexicallyDeclaredNames of a statement list.
pub fn lexically_declared_names(body: &[Statement], functions_are_lexical: bool) -> Vec<Name> {
    lexically_scoped_declarations(body, functions_are_lexical)
        .into_iter()
        .map(|declaration| declaration.name)
        .collect()
}

/// Returns the first name bound twice in `names`, if any.
pub fn find_duplicate(names: &[Name]) -> Option<Name> {
    let mut seen = FxHashSet::default();
    names.iter().find(|name| !seen.insert(name.clone())).cloned()
}

fn top_level_function(statement: &Statement) -> Option<&Rc<Function>> {
    match statement {
        Statement::FunctionDeclaration(function) => Some(function),
        Statement::Labeled(labeled) => top_level_function(&labeled.body),
        _ => None,
    }
}

fn collect_var_names(statement: &Statement, names: &mut Vec<Name>) {
    match statement {
        Statement::VariableDeclaration(declaration) if declaration.kind == VariableKind::Var => {
            for declarator in &declaration.declarations {
                bound_names(&declarator.target, names);
            }
        }
        Statement::Block(block) => {
            for statement in &block.body {
                collect_var_names(statement, names);
            }
        }
        Statement::If(statement) => {
            collect_var_names(&statement.consequent, names);
            if let Some(alternate) = &statement.alternate {
                collect_var_names(alternate, names);
            }
        }
        Statement::While(statement) => collect_var_names(&statement.body, names),
        Statement::DoWhile(statement) => collect_var_names(&statement.body, names),
        Statement::For(statement) => {
            if let Some(ForInit::Declaration(declaration)) = &statement.init
                && declaration.kind == VariableKind::Var
            {
                for declarator in &declaration.declarations {
                    bound_names(&declarator.target, names);
                }
            }
            collect_var_names(&statement.body, names);
        }
        Statement::ForIn(statement) => {
            collect_for_in_left(&statement.left, names);
            collect_var_names(&statement.body, names);
        }
        Statement::ForOf(statement) => {
            collect_for_in_left(&statement.left, names);
            collect_var_names(&statement.body, names);
        }
        Statement::Switch(statement) => {
            for case in &statement.cases {
                for statement in &case.consequent {
                    collect_var_names(statement, names);
                }
            }
        }
        Statement::Try(statement) => {
            for statement in &statement.block.body {
                collect_var_names(statement, names);
            }
            if let Some(handler) = &statement.handler {
                for statement in &handler.body.body {
                    collect_var_names(statement, names);
                }
            }
            if let Some(finalizer) = &statement.finalizer {
                for statement in &finalizer.body {
                    collect_var_names(statement, names);
                }
            }
        }
        Statement::With(statement) => collect_var_names(&statement.body, names),
        Statement::Labeled(statement) => collect_var_names(&statement.body, names),
        _ => {}
    }
}

fn collect_for_in_left(left: &ForInLeft, names: &mut Vec<Name>) {
    if let ForInLeft::Declaration(VariableKind::Var, pattern) = left {
        bound_names(pattern, names);
    }
}

fn dedup(names: Vec<Name>) -> Vec<Name> {
    let mut seen = FxHashSet::default();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    fn body(source: &str) -> Vec<Statement> {
        parse_script(source).expect("parses").body
    }

    fn strings(names: Vec<Name>) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_var_names_are_hoisted_out_of_nested_statements() {
        let body = body(
            "var a; if (x) { var b; } for (var c = 0;;) { break; } \
             try { var d; } catch (e) { var e2; } label: for (var f in o) {} \
             function g() { var inner; } let h;",
        );
        assert_eq!(
            strings(var_declared_names(&body, true)),
            vec!["a", "b", "c", "d", "e2", "f", "g"]
        );
        assert_eq!(
            strings(var_declared_names(&body, false)),
            vec!["a", "b", "c", "d", "e2", "f"]
        );
    }

    #[test]
    fn test_block_functions_are_not_var_scoped() {
        let body = body("{ function inner() {} } var a;");
        assert_eq!(strings(var_declared_names(&body, true)), vec!["a"]);
    }

    #[test]
    fn test_lexical_declarations() {
        let body = body("let a, [b, c] = d; const { e, f: g } = h; function k() {} var v;");
        let declarations = lexically_scoped_declarations(&body, true);
        let names: Vec<_> = declarations.iter().map(|d| d.name.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c", "e", "g", "k"]);
        assert!(!declarations[0].is_constant());
        assert!(declarations[3].is_constant());
        assert!(matches!(declarations[5].kind, DeclarationKind::Function(_)));

        let without_functions = lexically_declared_names(&body, false);
        assert_eq!(without_functions.len(), 5);
    }

    #[test]
    fn test_last_function_declaration_is_listed_last() {
        let body = body("function f() { return 1; } function f() { return 2; }");
        let functions = var_scoped_functions(&body);
        assert_eq!(functions.len(), 2);
        assert!(functions[1].source_text.contains("return 2"));
    }

    #[test]
    fn test_find_duplicate() {
        let names: Vec<Name> = vec!["a".into(), "b".into(), "a".into()];
        assert_eq!(find_duplicate(&names).as_deref(), Some("a"));
        assert_eq!(find_duplicate(&names[..2]), None);
    }
}
