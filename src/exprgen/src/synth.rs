// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Synthesis of expression values from parse trees.
//!
//! Every nonterminal is assigned a `Reduction` that says how the
//! already-synthesized results of its children combine.  Children are
//! flattened first: a `Structural` child's results are spliced into its
//! parent's, and punctuation disappears, so a rule like
//! `call = call_head call_tail` sees `[name, arg, arg, ...]` no matter
//! how the argument list was split up by the grammar.

use std::collections::HashMap;

use log::debug;

use crate::ast::{BinaryOp, Call, OpTree, Operator, Value, Variable};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::grammar::{Grammar, NonterminalId, Symbol};
use crate::parser::ParseNode;
use crate::synth_err;
use crate::token::{Tag, Token};
use crate::transform::{Transformer, transform};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// The top label: returns its single child.
    Start,
    /// List builders and rule halves: return the children as-is.
    Structural,
    /// Passes a value through, promoting a bare identifier to a variable.
    Expression,
    /// Wraps the child in `Parens`.
    Grouped,
    /// `[name, args...]` becomes a call.
    Call,
    /// Dotted names become a single variable.
    Member,
    /// `[left, operator, right]` becomes an operator tree.
    BinaryOp,
}

// Covers DEFAULT_GRAMMAR as well as grammars written with the
// function/list naming for calls.
const DEFAULT_REDUCTIONS: &[(&str, Reduction)] = &[
    ("start", Reduction::Start),
    ("expr", Reduction::Expression),
    ("term", Reduction::Expression),
    ("factor", Reduction::Expression),
    ("sum", Reduction::BinaryOp),
    ("product", Reduction::BinaryOp),
    ("parens", Reduction::Grouped),
    ("call", Reduction::Call),
    ("function", Reduction::Call),
    ("member", Reduction::Member),
    ("sum_head", Reduction::Structural),
    ("product_head", Reduction::Structural),
    ("parens_head", Reduction::Structural),
    ("call_head", Reduction::Structural),
    ("call_tail", Reduction::Structural),
    ("function_head", Reduction::Structural),
    ("function_tail", Reduction::Structural),
    ("args", Reduction::Structural),
    ("args_tail", Reduction::Structural),
    ("list", Reduction::Structural),
    ("list_tail", Reduction::Structural),
    ("member_head", Reduction::Structural),
];

/// Reductions maps the nonterminals of one grammar to how they are
/// synthesized.  Nonterminals without an entry cannot be synthesized.
#[derive(Clone, Debug, Default)]
pub struct Reductions {
    table: HashMap<NonterminalId, Reduction>,
}

impl Reductions {
    /// new builds a table from nonterminal names, all of which must
    /// appear in `grammar`.
    pub fn new(grammar: &Grammar, entries: &[(&str, Reduction)]) -> Result<Self> {
        let mut table = HashMap::new();
        for &(name, reduction) in entries {
            let Some(id) = grammar.nonterminal(name) else {
                return Err(Error::new(
                    ErrorKind::Parse,
                    ErrorCode::UnknownLabel,
                    Some(format!("'{name}' is not a nonterminal of the grammar")),
                ));
            };
            table.insert(id, reduction);
        }
        Ok(Reductions { table })
    }

    /// default_for assigns the conventional reductions to whichever of
    /// the conventional nonterminal names `grammar` uses.
    pub fn default_for(grammar: &Grammar) -> Self {
        let table = DEFAULT_REDUCTIONS
            .iter()
            .filter_map(|&(name, reduction)| grammar.nonterminal(name).map(|id| (id, reduction)))
            .collect();
        Reductions { table }
    }

    pub fn get(&self, id: NonterminalId) -> Option<Reduction> {
        self.table.get(&id).copied()
    }

    pub fn set(&mut self, id: NonterminalId, reduction: Reduction) {
        self.table.insert(id, reduction);
    }
}

/// The intermediate result of synthesizing a subtree.
#[derive(Clone, Debug, PartialEq)]
pub enum Folded {
    /// An identifier whose role the parent decides.
    Raw(String),
    Op(Operator),
    Value(Value),
    List(Vec<Folded>),
    Nil,
}

fn flatten(children: Vec<Folded>, out: &mut Vec<Folded>) {
    for child in children {
        match child {
            Folded::List(inner) => flatten(inner, out),
            Folded::Nil => {}
            other => out.push(other),
        }
    }
}

pub struct Synthesizer<'a> {
    grammar: &'a Grammar,
    reductions: &'a Reductions,
}

impl<'a> Synthesizer<'a> {
    pub fn new(grammar: &'a Grammar, reductions: &'a Reductions) -> Self {
        Synthesizer {
            grammar,
            reductions,
        }
    }

    fn leaf(&self, tag: Tag, token: &Token) -> Result<Folded> {
        if token.tag != tag {
            return synth_err!(
                UnhandledTag,
                format!("{} leaf over {} token {:?}", tag, token.tag, token.text)
            );
        }
        let folded = match tag {
            Tag::AddOp | Tag::MulOp => match BinaryOp::from_symbol(&token.text) {
                Some(op) => Folded::Op(Operator::Binary(op)),
                None => {
                    return synth_err!(
                        UnknownOperator,
                        format!("'{}' is not a binary operator", token.text)
                    );
                }
            },
            Tag::Name | Tag::FuncName => Folded::Raw(token.text.clone()),
            Tag::Number => Folded::Value(Value::Constant(token.text.clone())),
            Tag::Dot | Tag::Comma | Tag::LParen | Tag::RParen => Folded::Nil,
        };
        Ok(folded)
    }

    fn unexpected<T>(&self, id: NonterminalId, children: &[Folded]) -> Result<T> {
        synth_err!(
            UnexpectedShape,
            format!("{} with children {:?}", self.grammar.name(id), children)
        )
    }

    fn reduce(
        &self,
        id: NonterminalId,
        reduction: Reduction,
        mut children: Vec<Folded>,
    ) -> Result<Folded> {
        let folded = match reduction {
            Reduction::Structural => Folded::List(children),
            Reduction::Start if children.len() == 1 => children.remove(0),
            Reduction::Expression if children.len() == 1 => match children.remove(0) {
                Folded::Raw(name) => Folded::Value(Value::Variable(Variable::new(&name))),
                value @ Folded::Value(_) => value,
                other => return self.unexpected(id, &[other]),
            },
            Reduction::Grouped if children.len() == 1 => match children.remove(0) {
                Folded::Value(inner) => Folded::Value(Value::parens(inner)),
                other => return self.unexpected(id, &[other]),
            },
            Reduction::Call if !children.is_empty() => {
                let Folded::Raw(name) = &children[0] else {
                    return self.unexpected(id, &children);
                };
                let mut args = Vec::with_capacity(children.len() - 1);
                for child in children[1..].iter() {
                    match child {
                        Folded::Value(arg) => args.push(arg.clone()),
                        _ => return self.unexpected(id, &children),
                    }
                }
                Folded::Value(Value::Call(Call::new(name, args)))
            }
            Reduction::Member if !children.is_empty() => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children.iter() {
                    match child {
                        Folded::Raw(name) => parts.push(name.as_str()),
                        Folded::Value(Value::Variable(var)) => parts.push(var.name.as_str()),
                        _ => return self.unexpected(id, &children),
                    }
                }
                Folded::Value(Value::var(&parts.join(".")))
            }
            Reduction::BinaryOp => match <[Folded; 3]>::try_from(children) {
                Ok([Folded::Value(l), Folded::Op(Operator::Binary(op)), Folded::Value(r)]) => {
                    Folded::Value(Value::OpTree(OpTree::binary(op, l, r)))
                }
                Ok(parts) => return self.unexpected(id, &parts),
                Err(children) => return self.unexpected(id, &children),
            },
            _ => return self.unexpected(id, &children),
        };
        Ok(folded)
    }
}

impl Transformer for Synthesizer<'_> {
    type Output = Folded;
    type Error = Error;

    fn combine(
        &mut self,
        tokens: &[Token],
        node: &ParseNode,
        children: Vec<Folded>,
    ) -> Result<Folded> {
        let id = match node.label {
            Symbol::Terminal(tag) if node.is_leaf() => {
                return self.leaf(tag, &tokens[node.start]);
            }
            Symbol::Terminal(tag) => {
                return synth_err!(UnhandledTag, format!("{tag} node with children"));
            }
            Symbol::Nonterminal(id) => id,
        };
        let mut flat = Vec::with_capacity(children.len());
        flatten(children, &mut flat);

        match self.reductions.get(id) {
            Some(reduction) => self.reduce(id, reduction, flat),
            None => synth_err!(
                UnexpectedShape,
                format!("no reduction for {}", self.grammar.name(id))
            ),
        }
    }
}

/// synthesize turns a parse tree into an expression value.
pub fn synthesize(
    grammar: &Grammar,
    reductions: &Reductions,
    tokens: &[Token],
    tree: &ParseNode,
) -> Result<Value> {
    let mut synthesizer = Synthesizer::new(grammar, reductions);
    match transform(&mut synthesizer, tokens, tree)? {
        Folded::Value(value) => {
            debug!("synthesized {value}");
            Ok(value)
        }
        other => synth_err!(
            UnexpectedShape,
            format!(
                "{} synthesized {:?}, not a value",
                grammar.symbol_name(tree.label),
                other
            )
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::SpanParser;

    fn expression(input: &str) -> Result<Value> {
        let grammar = Grammar::default();
        let reductions = Reductions::default_for(&grammar);
        let tokens = tokenize(input)?;
        let tree = SpanParser::new(&grammar, &tokens).parse_first(
            0,
            tokens.len(),
            grammar.lookup("start").unwrap(),
        )?;
        synthesize(&grammar, &reductions, &tokens, &tree)
    }

    #[test]
    fn end_to_end() {
        let expected = Value::binary(
            BinaryOp::Add,
            Value::binary(BinaryOp::Add, Value::var("x"), Value::constant("1")),
            Value::call("f", vec![Value::constant("10"), Value::constant("11")]),
        );
        let value = expression("x+1+f(10,11)").unwrap();
        assert_eq!(expected, value);
        assert_eq!("((x + 1) + f(10, 11))", value.to_string());
    }

    #[test]
    fn identifiers_become_default_typed_variables() {
        match expression("rho").unwrap() {
            Value::Variable(var) => {
                assert_eq!("rho", var.name);
                assert_eq!("double", var.type_tag);
            }
            other => panic!("expected a variable, got {other:?}"),
        }
    }

    #[test]
    fn structure() {
        let cases = [
            ("a*b+c", "((a * b) + c)"),
            ("a+b*c", "(a + (b * c))"),
            ("a-b-c", "((a - b) - c)"),
            ("a/b/c", "((a / b) / c)"),
            ("(a+b)*c", "((a + b) * c)"),
            ("(x)", "(x)"),
            ("3-2", "(3 - 2)"),
            ("-2*x", "(-2 * x)"),
            ("a.b.c+1", "(a.b.c + 1)"),
            ("g()", "g()"),
            ("g(a.b)", "g(a.b)"),
            ("exp(-0.5*r)", "exp((-0.5 * r))"),
            ("f(g(x),2e-3)", "f(g(x), 2e-3)"),
        ];
        for (input, expected) in cases {
            assert_eq!(expected, expression(input).unwrap().to_string(), "{input}");
        }
    }

    #[test]
    fn parens_are_kept_but_transparent() {
        let grouped = expression("(a+b)").unwrap();
        assert!(matches!(grouped, Value::Parens(_)));
        assert_eq!(expression("a+b").unwrap(), grouped);
    }

    #[test]
    fn missing_reduction() {
        let grammar = Grammar::default();
        let mut entries: Vec<(&str, Reduction)> = DEFAULT_REDUCTIONS
            .iter()
            .copied()
            .filter(|(name, _)| grammar.nonterminal(name).is_some() && *name != "member")
            .collect();
        let reductions = Reductions::new(&grammar, &entries).unwrap();
        let tokens = tokenize("a.b").unwrap();
        let tree = SpanParser::new(&grammar, &tokens)
            .parse_first(0, tokens.len(), grammar.lookup("start").unwrap())
            .unwrap();
        let err = synthesize(&grammar, &reductions, &tokens, &tree).unwrap_err();
        assert_eq!(ErrorKind::Synthesis, err.kind);
        assert_eq!(ErrorCode::UnexpectedShape, err.code);
        assert!(!err.is_input_error());

        entries.push(("nope", Reduction::Start));
        let err = Reductions::new(&grammar, &entries).unwrap_err();
        assert_eq!(ErrorCode::UnknownLabel, err.code);
    }

    #[test]
    fn wrong_shape() {
        // a sum reduced as an expression sees three children
        let grammar = Grammar::default();
        let mut reductions = Reductions::default_for(&grammar);
        reductions.set(grammar.nonterminal("sum").unwrap(), Reduction::Expression);
        let tokens = tokenize("a+b").unwrap();
        let tree = SpanParser::new(&grammar, &tokens)
            .parse_first(0, tokens.len(), grammar.lookup("start").unwrap())
            .unwrap();
        let err = synthesize(&grammar, &reductions, &tokens, &tree).unwrap_err();
        assert_eq!(ErrorCode::UnexpectedShape, err.code);
    }

    #[test]
    fn mismatched_leaf() {
        let grammar = Grammar::default();
        let reductions = Reductions::default_for(&grammar);
        let tokens = vec![Token::new(Tag::Name, "x")];
        let tree = ParseNode {
            label: Symbol::Terminal(Tag::Number),
            start: 0,
            end: 1,
            children: vec![],
        };
        let err = synthesize(&grammar, &reductions, &tokens, &tree).unwrap_err();
        assert_eq!(ErrorCode::UnhandledTag, err.code);
    }

    #[test]
    fn unknown_operator() {
        let grammar = Grammar::compile("start = sum\nsum = head name\nhead = name addop").unwrap();
        let entries = [
            ("start", Reduction::Start),
            ("sum", Reduction::BinaryOp),
            ("head", Reduction::Structural),
        ];
        let reductions = Reductions::new(&grammar, &entries).unwrap();
        let tokens = vec![
            Token::new(Tag::Name, "a"),
            Token::new(Tag::AddOp, "%"),
            Token::new(Tag::Name, "b"),
        ];
        let tree = SpanParser::new(&grammar, &tokens)
            .parse_first(0, 3, grammar.lookup("start").unwrap())
            .unwrap();
        let err = synthesize(&grammar, &reductions, &tokens, &tree).unwrap_err();
        assert_eq!(ErrorCode::UnknownOperator, err.code);
    }

    #[test]
    fn function_list_naming() {
        let grammar = Grammar::compile(
            "start = expr
             expr = function
             expr = name
             expr = number
             function = function_head function_tail
             function_head = funcname lparen
             function_tail = rparen
             function_tail = list rparen
             list = expr
             list = expr list_tail
             list_tail = comma list",
        )
        .unwrap();
        let reductions = Reductions::default_for(&grammar);
        let tokens = tokenize("h(1, y)").unwrap();
        let tree = SpanParser::new(&grammar, &tokens)
            .parse_first(0, tokens.len(), grammar.lookup("start").unwrap())
            .unwrap();
        let value = synthesize(&grammar, &reductions, &tokens, &tree).unwrap();
        assert_eq!(
            Value::call("h", vec![Value::constant("1"), Value::var("y")]),
            value
        );
    }
}
