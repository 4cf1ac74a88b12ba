// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Enumerative span parser.
//!
//! `SpanParser::parse` yields every parse tree rooted at a label that
//! covers exactly a half-open token range.  Nothing is memoized: each
//! call builds an independent, lazily evaluated iterator, so a caller
//! that only wants the first tree never pays for the rest.  Ambiguous
//! grammars produce every derivation, rules in table order and split
//! points left to right.
//!
//! Split points are skipped when the tokens on either side of them
//! cannot end the left symbol or begin the right one (see
//! `Grammar::could_start`), or when the right half has no parse at all.
//! That pruning never removes a tree, it only avoids exploring halves
//! that were bound to fail.

use std::iter;

use log::{Level, debug, log_enabled, trace};

use crate::common::Result;
use crate::grammar::{Grammar, Rhs, Symbol};
use crate::parse_err;
use crate::token::{Token, text};


/// A node of a parse tree.  Leaves are terminal matches and span
/// exactly one token; inner nodes cover the concatenation of their
/// children's spans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNode {
    pub label: Symbol,
    pub start: usize,
    pub end: usize,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    fn leaf(label: Symbol, start: usize) -> Self {
        ParseNode {
            label,
            start,
            end: start + 1,
            children: vec![],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// is_well_formed checks that every node is non-empty and that the
    /// children of each node tile its span, in order, without gaps.
    pub fn is_well_formed(&self) -> bool {
        if self.start >= self.end {
            return false;
        }
        if self.is_leaf() {
            return self.len() == 1;
        }
        let mut pos = self.start;
        for child in self.children.iter() {
            if child.start != pos || !child.is_well_formed() {
                return false;
            }
            pos = child.end;
        }
        pos == self.end
    }
}

/// A lazy sequence of parse trees.
pub struct Parses<'a> {
    inner: Box<dyn Iterator<Item = ParseNode> + 'a>,
}

impl Iterator for Parses<'_> {
    type Item = ParseNode;

    fn next(&mut self) -> Option<ParseNode> {
        self.inner.next()
    }
}

type Trees<'a> = Box<dyn Iterator<Item = ParseNode> + 'a>;

#[derive(Clone, Copy)]
pub struct SpanParser<'a> {
    grammar: &'a Grammar,
    tokens: &'a [Token],
}

impl<'a> SpanParser<'a> {
    pub fn new(grammar: &'a Grammar, tokens: &'a [Token]) -> Self {
        SpanParser { grammar, tokens }
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// parse returns every tree for `label` that covers exactly
    /// `tokens[start..end]`.  Nothing is computed until the result is
    /// iterated.
    pub fn parse(&self, start: usize, end: usize, label: Symbol) -> Result<Parses<'a>> {
        if start > end || end > self.tokens.len() {
            return parse_err!(
                InvalidSpan,
                start,
                end,
                format!("span {start}..{end} is outside 0..{}", self.tokens.len())
            );
        }
        Ok(Parses {
            inner: self.derive(start, end, label),
        })
    }

    /// parse_first stops after the first tree.
    pub fn parse_first(&self, start: usize, end: usize, label: Symbol) -> Result<ParseNode> {
        match self.parse(start, end, label)?.next() {
            Some(tree) => Ok(tree),
            None => self.no_parse(start, end, label),
        }
    }

    /// parse_all enumerates every tree.  This is exponential in the
    /// worst case; prefer `parse` when any prefix of the results will do.
    pub fn parse_all(&self, start: usize, end: usize, label: Symbol) -> Result<Vec<ParseNode>> {
        let trees: Vec<ParseNode> = self.parse(start, end, label)?.collect();
        if trees.is_empty() {
            return self.no_parse(start, end, label);
        }
        debug!(
            "{} parses of {}..{} as {}",
            trees.len(),
            start,
            end,
            self.grammar.symbol_name(label)
        );
        Ok(trees)
    }

    fn no_parse<T>(&self, start: usize, end: usize, label: Symbol) -> Result<T> {
        parse_err!(
            NoParse,
            start,
            end,
            format!(
                "no derivation of {} for {:?}",
                self.grammar.symbol_name(label),
                text(&self.tokens[start..end])
            )
        )
    }

    fn derive(self, start: usize, end: usize, label: Symbol) -> Trees<'a> {
        if start >= end {
            return Box::new(iter::empty());
        }

        match label {
            Symbol::Terminal(tag) => {
                let leaf = (end - start == 1 && self.tokens[start].tag == tag)
                    .then(|| ParseNode::leaf(label, start));
                Box::new(leaf.into_iter())
            }
            Symbol::Nonterminal(id) => {
                if !self.grammar.could_start(label, self.tokens[start].tag)
                    || !self.grammar.could_end(label, self.tokens[end - 1].tag)
                {
                    return Box::new(iter::empty());
                }
                if log_enabled!(Level::Trace) {
                    trace!(
                        "{} =? {}",
                        self.grammar.name(id),
                        text(&self.tokens[start..end])
                    );
                }
                Box::new(
                    self.grammar
                        .rules_for(id)
                        .flat_map(move |rule| self.expand(label, rule.rhs, start, end)),
                )
            }
        }
    }

    fn expand(self, label: Symbol, rhs: Rhs, start: usize, end: usize) -> Trees<'a> {
        match rhs {
            Rhs::Unit(child) => {
                let trees = self.derive(start, end, child);
                Box::new(trees.map(move |child| ParseNode {
                    label,
                    start,
                    end,
                    children: vec![child],
                }))
            }
            Rhs::Binary(left, right) => {
                let grammar = self.grammar;
                let tokens = self.tokens;
                // a split whose right half has no parse yields nothing, so
                // it is dropped before the left half is enumerated
                let splits = (start + 1..end).filter(move |&p| {
                    grammar.could_end(left, tokens[p - 1].tag)
                        && grammar.could_start(right, tokens[p].tag)
                        && self.derive(p, end, right).next().is_some()
                });
                Box::new(splits.flat_map(move |p| {
                    self.derive(start, p, left).flat_map(move |lchild| {
                        self.derive(p, end, right).map(move |rchild| ParseNode {
                            label,
                            start,
                            end,
                            children: vec![lchild.clone(), rchild],
                        })
                    })
                }))
            }
        }
    }
}
