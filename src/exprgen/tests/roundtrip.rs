// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property tests over the whole pipeline: emitted expressions parse
//! back to equal values, and every tree the parser yields tiles exactly
//! the span it was asked for.

use exprgen::{BinaryOp, Frontend, Grammar, SpanParser, Symbol, Value, tokenize};
use proptest::prelude::*;

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,5}".prop_map(|s| s.to_string())
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ident_strategy().prop_map(|name| Value::var(&name)),
        (ident_strategy(), ident_strategy()).prop_map(|(a, b)| Value::var(&format!("{a}.{b}"))),
        (0u32..1000).prop_map(|n| Value::constant(&n.to_string())),
        (-100i32..0).prop_map(|n| Value::constant(&n.to_string())),
        (1u32..100, 0u32..100).prop_map(|(a, b)| Value::constant(&format!("{a}.{b}"))),
        (1u32..10, -9i32..10).prop_map(|(m, e)| Value::constant(&format!("{m}e{e}"))),
    ]
}

fn op_strategy() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            (op_strategy(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Value::binary(op, l, r)),
            inner.clone().prop_map(Value::parens),
            (ident_strategy(), prop::collection::vec(inner, 0..3))
                .prop_map(|(name, args)| Value::call(&name, args)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn emitted_expressions_reparse(value in value_strategy()) {
        let frontend = Frontend::default();
        let emitted = value.to_string();
        let reparsed = frontend.expression(&emitted);
        prop_assert!(reparsed.is_ok(), "{} failed: {:?}", emitted, reparsed);
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(&value, &reparsed);
        prop_assert_eq!(emitted, reparsed.to_string());
    }

    #[test]
    fn tokens_cover_input(value in value_strategy()) {
        let emitted = value.to_string();
        let tokens = tokenize(&emitted).unwrap();
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        let stripped: String = emitted.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(stripped, joined);
    }

    #[test]
    fn trees_tile_their_span(value in value_strategy(), a in 0usize..64, b in 0usize..64) {
        let grammar = Grammar::default();
        let tokens = tokenize(&value.to_string()).unwrap();
        let n = tokens.len();
        let (start, end) = {
            let (a, b) = (a % (n + 1), b % (n + 1));
            (a.min(b), a.max(b))
        };
        let parser = SpanParser::new(&grammar, &tokens);
        for id in grammar.nonterminals() {
            for tree in parser.parse(start, end, Symbol::Nonterminal(id)).unwrap().take(4) {
                prop_assert_eq!((start, end), (tree.start, tree.end));
                prop_assert!(tree.is_well_formed());
            }
        }
    }
}

#[test]
fn canonical_output_is_a_fixed_point() {
    let frontend = Frontend::default();
    for input in ["a-b-c", "a-(b-c)", "((x))", "f(a*(b+c), -1)", "p.q.r/2e-3"] {
        let once = frontend.expression(input).unwrap().to_string();
        let twice = frontend.expression(&once).unwrap().to_string();
        assert_eq!(once, twice, "{input}");
    }
}
