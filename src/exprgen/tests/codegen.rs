// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use exprgen::ast::{Array, Element, all};
use exprgen::codegen::{
    Assignment, Container, Declaration, SourceFile, Statement, Statements, Update, for_range,
};
use exprgen::{BinaryOp, Frontend, Value, Variable};

fn params() -> Vec<Declaration> {
    let mut params: Vec<Declaration> = ["GA", "GB", "GC"]
        .iter()
        .map(|name| Variable::typed(name, "double3").into())
        .collect();
    params.push(Variable::double("Z").into());
    params
}

fn integrals(frontend: &Frontend) -> Vec<Container> {
    let formulas = [
        ("S_S_S", "Z*exp(-0.5*GA.x*GB.x)"),
        ("S_Px_S", "(GA.x-GB.x)*S_S_S(GA, GB, GC, Z)/2"),
    ];
    formulas
        .iter()
        .map(|(name, formula)| {
            let value = frontend.expression(formula).unwrap();
            Container::function("double", name, params(), vec![Statement::returns(value)])
        })
        .collect()
}

#[test]
fn end_to_end_function() {
    let frontend = Frontend::default();
    let value = frontend.expression("x+1+f(10,11)").unwrap();
    let g = Container::function("double", "g", vec![], vec![Statement::returns(value)]);
    assert_eq!(
        "double g() {\n  return ((x + 1) + f(10, 11));\n}\n",
        Statements(vec![g.into()]).to_string()
    );
}

#[test]
fn header_and_source() {
    let frontend = Frontend::default();
    let functions = integrals(&frontend);

    let mut header = SourceFile::new()
        .comment("/* Generated file. Do not edit. */")
        .guard("__INTEGRALS_H__")
        .push(Declaration::from(Variable::typed("double3", "struct")));
    for function in functions.iter() {
        header = header.push(function.declaration().unwrap());
    }
    let expected = "/* Generated file. Do not edit. */

#ifndef __INTEGRALS_H__
#define __INTEGRALS_H__

struct double3;
double S_S_S(double3 GA, double3 GB, double3 GC, double Z);
double S_Px_S(double3 GA, double3 GB, double3 GC, double Z);

#endif";
    assert_eq!(expected, header.to_string());

    let source = SourceFile::new()
        .include("integrals.h", true)
        .include("vector_types.h", false)
        .extend(functions.into_iter().map(Statement::from));
    let expected = "#include \"integrals.h\"
#include <vector_types.h>

double S_S_S(double3 GA, double3 GB, double3 GC, double Z) {
  return (Z * exp(((-0.5 * GA.x) * GB.x)));
}

double S_Px_S(double3 GA, double3 GB, double3 GC, double Z) {
  return (((GA.x - GB.x) * S_S_S(GA, GB, GC, Z)) / 2);
}
";
    assert_eq!(expected, source.to_string());
}

#[test]
fn update_function() {
    let frontend = Frontend::default();
    let d = Array::new("D", "double", 2);
    let dij = Element::new(d.clone(), vec![Value::var("I"), Value::var("J")]).unwrap();
    let shell = all(vec![
        Value::compare(Value::var("II"), BinaryOp::Eq, Value::constant("0")),
        Value::compare(Value::var("JJ"), BinaryOp::Eq, Value::constant("0")),
    ])
    .unwrap();
    let integral = frontend.expression("S_S_S(GA, GB, GC, Z)").unwrap();
    let body = vec![
        Container::if_block(
            shell,
            vec![Update::binary(dij, BinaryOp::AddAssign, integral).into()],
            false,
        )
        .into(),
    ];
    let loops = for_range(Variable::int("k"), Value::constant("0"), Value::var("n"), body);
    let update = Container::function(
        "void",
        "update",
        vec![d.into(), Variable::int("n").into()],
        vec![
            Assignment::declare(Variable::int("I"), Value::constant("0")).into(),
            loops.into(),
        ],
    );
    let expected = "void update(double** D, int n) {
  int I = 0;
  for (int k = 0; k < n; k++) {
    if ((II == 0 && JJ == 0)) {
      D[I][J] += S_S_S(GA, GB, GC, Z);
    }
  }
}
";
    assert_eq!(expected, Statements(vec![update.into()]).to_string());
}
