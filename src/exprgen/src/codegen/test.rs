// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::*;
use crate::ast::{Element, OpTree};
use crate::common::ErrorCode;

fn render(statements: Vec<Statement>) -> String {
    Statements(statements).to_string()
}

fn sum() -> Value {
    Value::binary(
        BinaryOp::Add,
        Value::binary(BinaryOp::Add, Value::var("x"), Value::constant("1")),
        Value::call("f", vec![Value::constant("10"), Value::constant("11")]),
    )
}

#[test]
fn test_function() {
    let g = Container::function("double", "g", vec![], vec![Statement::returns(sum())]);
    assert_eq!(
        "double g() {\n  return ((x + 1) + f(10, 11));\n}\n",
        render(vec![g.into()])
    );
}

#[test]
fn test_prototype() {
    let params: Vec<Declaration> = vec![
        Variable::double("a").into(),
        Variable::int("n").into(),
        Array::new("D", "double", 2).into(),
    ];
    let g = Container::function("double", "g", params, vec![Statement::returns(sum())]);
    let proto = g.declaration().unwrap();
    assert!(proto.is_declaration_only());
    assert_eq!(
        "double g(double a, int n, double** D);",
        render(vec![proto.into()])
    );
    assert_eq!(None, Container::else_block(vec![]).declaration());
}

#[test]
fn test_separators() {
    let x = Variable::new("x");
    let statements = vec![
        Statement::comment("// setup"),
        Macro::define("N", Some("3")).into(),
        Declaration::from(Variable::int("i")).into(),
        Assignment::declare(x.clone(), Value::constant("0")).into(),
        Assignment::new(x.clone(), Value::var("y")).into(),
        Update::binary(x.clone(), BinaryOp::AddAssign, Value::constant("2")).into(),
        Update::unary(x, UnaryOp::Decrement).into(),
        Call::new("free", vec![Value::var("p")]).into(),
        Statement::Empty,
        Statement::Return(None),
    ];
    let expected = "// setup
#define N 3
int i;
double x = 0;
x = y;
x += 2;
x--;
free(p);

return;";
    assert_eq!(expected, render(statements));
}

#[test]
fn test_update_arity() {
    let err = Update::new(Variable::new("x"), BinaryOp::MulAssign.into(), None).unwrap_err();
    assert_eq!(ErrorCode::ArityMismatch, err.code);
    let err = Update::new(
        Variable::new("x"),
        UnaryOp::Increment.into(),
        Some(Value::constant("1")),
    )
    .unwrap_err();
    assert_eq!(ErrorCode::ArityMismatch, err.code);

    let update = Update::new(Variable::int("i"), UnaryOp::Increment.into(), None).unwrap();
    assert_eq!(Update::increment(Variable::int("i")), update);
}

#[test]
fn test_macros() {
    assert_eq!("#include \"gauss.h\"", Macro::include("gauss.h", true).to_string());
    assert_eq!("#include <math.h>", Macro::include("math.h", false).to_string());
    assert_eq!("#define PI", Macro::define("PI", None).to_string());
    assert_eq!("#endif", Macro::new("endif", &[]).to_string());
}

#[test]
fn test_nested_loops() {
    let d = Array::new("D", "double", 2);
    let element = Element::new(d, vec![Value::var("i"), Value::var("j")]).unwrap();
    let inner = for_range(
        Variable::int("j"),
        Value::constant("0"),
        Value::var("m"),
        vec![Assignment::new(element, Value::constant("0")).into()],
    );
    let outer = for_range(
        Variable::int("i"),
        Value::constant("0"),
        Value::var("n"),
        vec![inner.into()],
    );
    let expected = "for (int i = 0; i < n; i++) {
  for (int j = 0; j < m; j++) {
    D[i][j] = 0;
  }
}";
    assert_eq!(expected, render(vec![outer.into()]));
}

#[test]
fn test_conditionals() {
    let is_zero = Value::compare(Value::var("II"), BinaryOp::Eq, Value::constant("0"));
    let is_one = Value::compare(Value::var("II"), BinaryOp::Eq, Value::constant("1"));
    let statements = vec![
        Container::if_block(is_zero, vec![Statement::returns(Value::constant("1"))], false)
            .into(),
        Container::if_block(is_one, vec![Statement::returns(Value::var("x"))], true).into(),
        Container::else_block(vec![Statement::returns(Value::constant("0"))]).into(),
    ];
    let expected = "if (II == 0) {
  return 1;
}
else if (II == 1) {
  return x;
}
else {
  return 0;
}";
    assert_eq!(expected, render(statements));
}

#[test]
fn test_while_and_empty_body() {
    let done = Value::Condition(OpTree::unary(UnaryOp::Not, Value::var("done")));
    assert_eq!(
        "while (!(done)) {\n}",
        render(vec![Container::while_loop(done, vec![]).into()])
    );
    assert_eq!(
        "void noop() {\n}\n",
        render(vec![Container::function("void", "noop", vec![], vec![]).into()])
    );
}

#[test]
fn test_empty_else() {
    let statements = vec![
        Container::if_block(Value::var("ready"), vec![Statement::Empty], false)
            .into(),
        Container::else_block(vec![]).into(),
    ];
    assert_eq!("if (ready) {\n}\nelse {\n}", render(statements));
    assert_eq!("else {\n}", Container::else_block(vec![]).render());
}

#[test]
fn test_nested_function_blank_line_dropped() {
    let body = vec![Statement::returns(Value::constant("1"))];
    let inner = Container::function("int", "one", vec![], body);
    let block = Container::if_block(
        Value::var("flag"),
        vec![inner.into(), Statement::Empty],
        false,
    );
    assert_eq!(
        "if (flag) {\n  int one() {\n    return 1;\n  }\n}",
        render(vec![block.into()])
    );
}

#[test]
fn test_source_file() {
    let g = Container::function("double", "g", vec![], vec![Statement::returns(sum())]);
    let header = SourceFile::new()
        .comment("/* generated */")
        .guard("GAUSS_H")
        .include("math.h", false)
        .push(g.declaration().unwrap());
    let expected = "/* generated */

#ifndef GAUSS_H
#define GAUSS_H

#include <math.h>

double g();

#endif";
    assert_eq!(expected, header.to_string());

    let source = SourceFile::new()
        .include("gauss.h", true)
        .define("N", Some("4"))
        .push(g);
    let expected = "#include \"gauss.h\"

#define N 4

double g() {
  return ((x + 1) + f(10, 11));
}
";
    assert_eq!(expected, source.to_string());
}
