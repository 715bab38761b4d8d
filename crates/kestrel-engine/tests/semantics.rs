//! Language semantics integration tests
//!
//! Drives source text through `Engine` with a `BufferedHost` and checks the
//! values scripts produce and the lines they log.

use kestrel_engine::parser::parse_module;
use kestrel_engine::{BufferedHost, Engine, EngineConfig, Error, Outcome, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Runs `source` as a module and returns what it logged.
fn run_module(source: &str) -> Vec<String> {
    let host = BufferedHost::new();
    let mut engine = Engine::new(host.clone());
    if let Err(error) = engine.eval_module_source(source) {
        panic!("module failed: {error}\n{source}");
    }
    assert_eq!(host.outcome(), Some(Outcome::Success));
    host.lines()
}

/// Evaluates `source` as a classic script and returns its completion value.
fn eval(source: &str) -> Value {
    let mut engine = Engine::new(BufferedHost::new());
    match engine.eval_script(source) {
        Ok(value) => value,
        Err(error) => panic!("script failed: {error}\n{source}"),
    }
}

fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|line| line.to_string()).collect()
}

// ============================================================================
// Completion values and propagation
// ============================================================================

#[test]
fn test_script_completion_values() {
    assert_eq!(eval("1; if (true) { 2; } else { 3; }"), Value::from(2));
    assert_eq!(eval("3; var y = 1;"), Value::from(3));
    assert_eq!(eval("do { 5; break; } while (false)"), Value::from(5));
    assert_eq!(eval("var z;"), Value::Undefined);
}

#[test]
fn test_break_carries_completion_value() {
    assert_eq!(eval("1; do { 5; break; } while (false)"), Value::from(5));
    assert_eq!(eval("1; while (true) { 7; break; }"), Value::from(7));
    assert_eq!(eval("1; l: { 3; break l; }"), Value::from(3));
    assert_eq!(eval("1; for (var i = 0; i < 3; i++) { i; if (i === 1) continue; 'x'; }"), Value::from("x"));
    assert_eq!(eval("1; for (var i = 0; i < 2; i++) { i; continue; }"), Value::from(1));
    assert_eq!(eval("1; outer: for (;;) { for (;;) { 9; break outer; } }"), Value::from(9));
    assert_eq!(eval("1; do { 5; try { break; } finally {} } while (false)"), Value::Undefined);
}

#[test]
fn test_switch_completion_value() {
    assert_eq!(eval("1; switch (1) { case 1: 'b'; break; }"), Value::from("b"));
    assert_eq!(
        eval("switch (3) { case 1: 'a'; default: 'd'; case 2: 'b'; break; case 4: 'c'; }"),
        Value::from("b")
    );
    assert_eq!(eval("1; switch (0) { case 1: 'a'; }"), Value::Undefined);
}

#[test]
fn test_abrupt_completion_stops_evaluation() {
    let output = run_module(
        "const log = [];
         function f() { log.push('f'); throw new Error('x'); }
         try { log.push('a'); f(); log.push('after'); } catch (e) { log.push(e.message); }
         console.log(log.join());",
    );
    assert_eq!(output, lines(&["a,f,x"]));
}

#[test]
fn test_uncaught_throw_is_reported() {
    let mut engine = Engine::new(BufferedHost::new());
    let result = engine.eval_script("undeclaredName");
    assert!(matches!(result, Err(Error::Uncaught(ref reason)) if reason.starts_with("ReferenceError")));
    assert_eq!(engine.eval_script("throw 'plain'"), Err(Error::Uncaught("plain".into())));
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_block_scope_restored_after_normal_and_abrupt_exit() {
    let output = run_module(
        "let x = 'outer';
         { let x = 'inner'; }
         console.log(x);
         try { { let x = 'thrown'; throw 1; } } catch (e) {}
         console.log(x);
         for (let x = 0; x < 1; x++) { break; }
         console.log(x);",
    );
    assert_eq!(output, lines(&["outer", "outer", "outer"]));
}

#[test]
fn test_temporal_dead_zone() {
    let output = run_module(
        "try { console.log(v); } catch (e) { console.log(e instanceof ReferenceError); }
         let v = 1;
         console.log(v);",
    );
    assert_eq!(output, lines(&["true", "1"]));
}

#[test]
fn test_const_assignment_throws_type_error() {
    let output = run_module(
        "const c = 1;
         try { c = 2; } catch (e) { console.log(e.name); }
         console.log(c);",
    );
    assert_eq!(output, lines(&["TypeError", "1"]));
}

#[test]
fn test_function_hoisting() {
    assert_eq!(
        eval("var r = f(); var f; function f() { return 1; } function f() { return 2; } r"),
        Value::from(2)
    );
    assert_eq!(eval("typeof g; function g() {} typeof g"), Value::from("function"));
}

#[test]
fn test_global_lexical_redeclaration() {
    let mut engine = Engine::new(BufferedHost::new());
    assert_eq!(engine.eval_script("let shared = 1;"), Ok(Value::Undefined));
    let result = engine.eval_script("var shared;");
    assert!(matches!(result, Err(Error::Uncaught(ref reason)) if reason.starts_with("SyntaxError")));
}

#[test]
fn test_typeof_unresolvable_reference() {
    assert_eq!(eval("typeof nothingHere"), Value::from("undefined"));
}

#[test]
fn test_with_statement() {
    assert_eq!(eval("var o = { p: 1 }; with (o) { p = 2; } o.p"), Value::from(2));
}

// ============================================================================
// Operators and coercion
// ============================================================================

#[test]
fn test_short_circuit_evaluation() {
    let output = run_module(
        "let calls = 0;
         function f() { calls++; return true; }
         false && f();
         true || f();
         'set' ?? f();
         0 || f();
         console.log(calls, 0 || 'fallback', 0 ?? 'kept');",
    );
    assert_eq!(output, lines(&["1 fallback 0"]));
}

#[test]
fn test_coercions() {
    assert_eq!(eval(r#""5" + 3"#), Value::from("53"));
    assert_eq!(eval(r#""5" - 3"#), Value::from(2));
    assert_eq!(eval(r#"1 / "0""#), Value::Number(f64::INFINITY));
    assert_eq!(eval("NaN === NaN"), Value::Boolean(false));
    assert_eq!(eval("Object.is(NaN, NaN)"), Value::Boolean(true));
    assert_eq!(eval("null == undefined"), Value::Boolean(true));
    assert_eq!(eval("[1, 2] + ''"), Value::from("1,2"));
}

#[test]
fn test_strings_are_code_unit_sequences() {
    assert_eq!(eval(r"'\ud800' === '\udc00'"), Value::Boolean(false));
    assert_eq!(eval(r"'\ud800' === '�'"), Value::Boolean(false));
    assert_eq!(eval(r"('\ud83d' + '\ude00') === '😀'"), Value::Boolean(true));
    assert_eq!(eval(r"'😀' === '😀'"), Value::Boolean(true));
    assert_eq!(eval(r"var s = '😀'; s[0] + s[1] === s"), Value::Boolean(true));
    assert_eq!(eval(r"'\ud800'.charCodeAt(0)"), Value::from(55296));
    assert_eq!(eval(r"'😀'.slice(1).charCodeAt(0)"), Value::from(0xDE00));
    assert_eq!(eval(r"`\ud83d${'\ude00'}` === '😀'"), Value::Boolean(true));
    assert_eq!(eval(r"var o = { '\ud800': 1 }; o[String.fromCharCode(0xd800)]"), Value::from(1));
    assert_eq!(eval(r"['\ud83d', '\ude00'].join('') === '😀'"), Value::Boolean(true));
    assert_eq!(eval(r"'\udc00' > '\ud800'"), Value::Boolean(true));
}

// ============================================================================
// Evaluation and coercion order
// ============================================================================

/// Prelude for order tests: `operand(name, value)` logs `name` when
/// evaluated and `v` + `name` when coerced through valueOf.
const ORDER_PRELUDE: &str = "
    let log = [];
    const operand = (name, value) => {
        log.push(name);
        return { valueOf() { log.push('v' + name); return value; } };
    };
    const order = (run) => {
        log = [];
        const result = run();
        return result + ' ' + log.join();
    };
";

#[test]
fn test_relational_operators_coerce_left_operand_first() {
    let output = run_module(&format!(
        "{ORDER_PRELUDE}
         console.log(order(() => operand('a', 1) > operand('b', 2)));
         console.log(order(() => operand('a', 1) <= operand('b', 2)));
         console.log(order(() => operand('a', 1) < operand('b', 2)));
         console.log(order(() => operand('a', 1) >= operand('b', 2)));"
    ));
    assert_eq!(
        output,
        lines(&["false a,b,va,vb", "true a,b,va,vb", "true a,b,va,vb", "false a,b,va,vb"])
    );
}

#[test]
fn test_addition_evaluates_both_operands_before_coercion() {
    let output = run_module(&format!(
        "{ORDER_PRELUDE}
         console.log(order(() => operand('a', 1) + operand('b', 2)));
         console.log(order(() => operand('a', 'x') + operand('b', 2)));
         console.log(order(() => operand('a', 6) * operand('b', 7)));"
    ));
    assert_eq!(output, lines(&["3 a,b,va,vb", "x2 a,b,va,vb", "42 a,b,va,vb"]));
}

#[test]
fn test_assignment_resolves_reference_before_value() {
    let output = run_module(
        "const log = [];
         let target = { tag: 'first' };
         const first = target;
         const holder = { get target() { log.push('get'); return target; } };
         const value = (v) => { log.push('rhs'); target = { tag: 'second' }; return v; };
         holder.target.x = value(1);
         console.log(log.join(), first.x, target.x);

         log.length = 0;
         const counter = {
             get n() { log.push('get n'); return 1; },
             set n(v) { log.push('set n ' + v); },
         };
         counter.n += (log.push('rhs'), 2);
         console.log(log.join());

         let o = {};
         const old = o;
         o.y = (o = {}, 5);
         console.log(old.y, o.y);",
    );
    assert_eq!(
        output,
        lines(&["get,rhs 1 undefined", "get n,rhs,set n 3", "5 undefined"])
    );
}

#[test]
fn test_logical_assignment() {
    let output = run_module(
        "let a = null; a ??= 'filled';
         let b = 1; b &&= 2;
         let c = 0; c ||= 3;
         console.log(a, b, c);",
    );
    assert_eq!(output, lines(&["filled 2 3"]));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_closures_are_independent() {
    let output = run_module(
        "function counter(step) { let n = 0; return function () { n += step; return n; }; }
         const a = counter(2);
         const b = counter(10);
         console.log(a(), a(), b(), a());",
    );
    assert_eq!(output, lines(&["2 4 10 6"]));
}

#[test]
fn test_this_binding() {
    let output = run_module(
        "const obj = {
           name: 'obj',
           method() { return this.name; },
           arrow() { return (() => this.name)(); },
         };
         console.log(obj.method(), obj.arrow(), typeof this);",
    );
    assert_eq!(output, lines(&["obj obj undefined"]));
}

#[test]
fn test_constructors_and_prototypes() {
    let output = run_module(
        "function Point(x, y) { this.x = x; this.y = y; }
         Point.prototype.sum = function () { return this.x + this.y; };
         const p = new Point(1, 2);
         console.log(p.sum(), p instanceof Point, Object.getPrototypeOf(p) === Point.prototype);",
    );
    assert_eq!(output, lines(&["3 true true"]));
}

#[test]
fn test_mapped_arguments_in_sloppy_functions() {
    assert_eq!(eval("function f(a) { arguments[0] = 9; return a; } f(1)"), Value::from(9));
    assert_eq!(
        eval("function g(a) { 'use strict'; arguments[0] = 9; return a; } g(1)"),
        Value::from(1)
    );
}

#[test]
fn test_call_depth_limit() {
    let host = BufferedHost::new();
    let config = EngineConfig::default().with_max_call_depth(50);
    let mut engine = Engine::with_config(host.clone(), config);
    let result = engine.eval_module_source(
        "function recurse() { return recurse(); }
         try { recurse(); } catch (e) { console.log(e instanceof RangeError); }",
    );
    assert_eq!(result, Ok(()));
    assert_eq!(host.lines(), lines(&["true"]));
}

#[test]
fn test_bind_call_apply() {
    let output = run_module(
        "function add(a, b) { return this.base + a + b; }
         const ctx = { base: 10 };
         console.log(add.call(ctx, 1, 2), add.apply(ctx, [3, 4]), add.bind(ctx, 5)(6));",
    );
    assert_eq!(output, lines(&["13 17 21"]));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_labelled_break_and_continue() {
    let output = run_module(
        "const out = [];
         outer: for (let i = 0; i < 3; i++) {
           for (let j = 0; j < 3; j++) {
             if (j === 1) continue outer;
             if (i === 2) break outer;
             out.push(i + ':' + j);
           }
         }
         console.log(out.join(' '));",
    );
    assert_eq!(output, lines(&["0:0 1:0"]));
}

#[test]
fn test_switch_fall_through() {
    let output = run_module(
        "function sw(x) {
           const r = [];
           switch (x) {
             case 1: r.push('one');
             case 2: r.push('two'); break;
             default: r.push('default');
             case 3: r.push('three');
           }
           return r.join();
         }
         console.log(sw(1), sw(2), sw(3), sw(9), sw('1'));",
    );
    assert_eq!(output, lines(&["one,two two three default,three default,three"]));
}

#[test]
fn test_try_finally() {
    let output = run_module(
        "function f() { try { return 'try'; } finally { console.log('finally'); } }
         console.log(f());
         function g() { try { throw 1; } finally { return 'override'; } }
         console.log(g());
         try { null.prop; } catch ({ name }) { console.log(name); }",
    );
    assert_eq!(output, lines(&["finally", "try", "override", "TypeError"]));
}

#[test]
fn test_per_iteration_let_bindings() {
    let output = run_module(
        "const fns = [];
         for (let i = 0; i < 3; i++) { fns.push(() => i); }
         console.log(fns.map((f) => f()).join());",
    );
    assert_eq!(output, lines(&["0,1,2"]));
}

// ============================================================================
// Iteration
// ============================================================================

#[test]
fn test_for_in_respects_shadowing() {
    let output = run_module(
        "const proto = { a: 1, shared: 1 };
         const obj = Object.create(proto);
         obj.b = 2;
         obj.shared = 3;
         const keys = [];
         for (const k in obj) keys.push(k);
         console.log(keys.join());
         for (const k in null) console.log('never');",
    );
    assert_eq!(output, lines(&["b,shared,a"]));
}

#[test]
fn test_for_of_closes_iterator_on_break() {
    let output = run_module(
        "const log = [];
         const iterable = {
           [Symbol.iterator]() {
             let i = 0;
             return {
               next() { i++; return { value: i, done: i > 5 }; },
               return() { log.push('closed'); return {}; },
             };
           },
         };
         for (const v of iterable) { log.push(v); if (v === 2) break; }
         console.log(log.join());
         for (const ch of 'a\u{1F600}') log.push(ch.length);
         console.log(log.slice(3).join());",
    );
    assert_eq!(output, lines(&["1,2,closed", "1,2"]));
}

#[test]
fn test_destructuring() {
    let output = run_module(
        "const { a, b: [c, d = 4], ...rest } = { a: 1, b: [3], e: 5, f: 6 };
         console.log(a, c, d, Object.keys(rest).join());
         let x = 1, y = 2;
         [x, y] = [y, x];
         console.log(x, y);
         function f({ p = 'default' } = {}, ...others) { return p + others.length; }
         console.log(f(), f({ p: 'given' }, 1, 2));",
    );
    assert_eq!(output, lines(&["1 3 4 e,f", "2 1", "default0 given2"]));
}

#[test]
fn test_object_literal_features() {
    let output = run_module(
        "const key = 'dyn';
         const base = { inherited: true };
         const o = { get x() { return 1; }, ...{ y: 2 }, [key + 'amic']: 3, __proto__: base };
         console.log(`${o.x}-${o.y}-${o.dynamic}`, o.inherited, Object.keys(o).join());",
    );
    assert_eq!(output, lines(&["1-2-3 true x,y,dynamic"]));
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_module_instantiate_and_evaluate_are_idempotent() {
    let host = BufferedHost::new();
    let mut engine = Engine::new(host.clone());
    let module = parse_module(
        "var count = (globalThis.count || 0) + 1;
         globalThis.count = count;
         console.log(count);",
    )
    .expect("parses");
    let module = engine.load_module(module).expect("instantiates");
    module
        .instantiate(engine.interpreter())
        .expect("second instantiate is a no-op");
    assert_eq!(engine.run_module(&module), Ok(()));
    assert_eq!(engine.run_module(&module), Ok(()));
    assert_eq!(host.lines(), lines(&["1"]));
    assert_eq!(engine.eval_script("globalThis.count"), Ok(Value::from(1)));
}

#[test]
fn test_module_error_is_replayed() {
    let host = BufferedHost::new();
    let mut engine = Engine::new(host.clone());
    let module = parse_module("console.log('once'); throw new RangeError('boom');").expect("parses");
    let module = engine.load_module(module).expect("instantiates");
    let expected = Err(Error::Uncaught("RangeError: boom".into()));
    assert_eq!(engine.run_module(&module), expected);
    assert_eq!(engine.run_module(&module), expected);
    assert_eq!(host.lines(), lines(&["once"]));
}

#[test]
fn test_module_code_is_strict() {
    let output = run_module(
        "try { undeclared = 1; } catch (e) { console.log(e.name); }
         console.log(typeof undeclared);",
    );
    assert_eq!(output, lines(&["ReferenceError", "undefined"]));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_integer_addition_matches(a in -10_000i32..10_000, b in -10_000i32..10_000) {
        let mut engine = Engine::new(BufferedHost::new());
        let result = engine.eval_script(&format!("({a}) + ({b})"));
        prop_assert_eq!(result, Ok(Value::from(a + b)));
    }

    #[test]
    fn prop_string_plus_number_concatenates(s in "[a-z]{0,8}", n in -1_000i32..1_000) {
        let mut engine = Engine::new(BufferedHost::new());
        let result = engine.eval_script(&format!("'{s}' + ({n})"));
        prop_assert_eq!(result, Ok(Value::from(format!("{s}{n}"))));
    }

    #[test]
    fn prop_numeric_string_subtraction(a in -1_000i32..1_000, b in -1_000i32..1_000) {
        let mut engine = Engine::new(BufferedHost::new());
        let result = engine.eval_script(&format!("'{a}' - ({b})"));
        prop_assert_eq!(result, Ok(Value::from(a - b)));
    }
}
