// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::convert::Infallible;
use std::marker::PhantomData;

use serde::Serialize;

use crate::grammar::Grammar;
use crate::parser::ParseNode;
use crate::token::{Token, text};

/// Transformers reduce parse trees bottom-up: every child is combined
/// before its parent, and the parent sees its children's results in
/// the same order as `node.children`.
pub trait Transformer {
    type Output;
    type Error;

    fn combine(
        &mut self,
        tokens: &[Token],
        node: &ParseNode,
        children: Vec<Self::Output>,
    ) -> Result<Self::Output, Self::Error>;
}

pub fn transform<T: Transformer>(
    transformer: &mut T,
    tokens: &[Token],
    node: &ParseNode,
) -> Result<T::Output, T::Error> {
    let children = node
        .children
        .iter()
        .map(|child| transform(transformer, tokens, child))
        .collect::<Result<Vec<_>, _>>()?;
    transformer.combine(tokens, node, children)
}

struct Fold<F, R>(F, PhantomData<fn() -> R>);

impl<R, F> Transformer for Fold<F, R>
where
    F: FnMut(&[Token], &ParseNode, Vec<R>) -> R,
{
    type Output = R;
    type Error = Infallible;

    fn combine(
        &mut self,
        tokens: &[Token],
        node: &ParseNode,
        children: Vec<R>,
    ) -> Result<R, Infallible> {
        Ok((self.0)(tokens, node, children))
    }
}

/// fold is `transform` for combine functions that cannot fail.
pub fn fold<R, F>(tokens: &[Token], node: &ParseNode, combine: F) -> R
where
    F: FnMut(&[Token], &ParseNode, Vec<R>) -> R,
{
    match transform(&mut Fold(combine, PhantomData), tokens, node) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

/// TreePrinter renders a tree one node per line as `label "text"`,
/// with each node's children indented beneath it.
pub struct TreePrinter<'a> {
    grammar: &'a Grammar,
}

impl<'a> TreePrinter<'a> {
    pub fn new(grammar: &'a Grammar) -> Self {
        TreePrinter { grammar }
    }

    pub fn print(&self, tokens: &[Token], tree: &ParseNode) -> String {
        fold(tokens, tree, |tokens, node, children: Vec<String>| {
            let mut s = format!(
                "{} {:?}",
                self.grammar.symbol_name(node.label),
                text(&tokens[node.start..node.end])
            );
            if !children.is_empty() {
                s.push_str(":\n");
                for child in children.iter() {
                    for line in child.lines() {
                        s.push_str("  ");
                        s.push_str(line);
                        s.push('\n');
                    }
                }
            }
            s.trim().to_owned()
        })
    }
}

/// A parse tree with its labels and matched text resolved, for
/// serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamedNode {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NamedNode>,
}

impl NamedNode {
    pub fn new(grammar: &Grammar, tokens: &[Token], tree: &ParseNode) -> Self {
        fold(tokens, tree, |tokens, node, children| NamedNode {
            label: grammar.symbol_name(node.label).to_owned(),
            start: node.start,
            end: node.end,
            text: text(&tokens[node.start..node.end]),
            children,
        })
    }
}
