// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Turns algebraic source strings into expression values and renders
//! those values, embedded in a statement-level code model, as C text.
//!
//! The pipeline is `tokenize` → `SpanParser` → `synthesize` → `Display`:
//! the lexer produces tagged tokens, the span parser lazily enumerates
//! every tree a grammar admits over a token range, a `Transformer`
//! folds a tree into a `Value`, and `codegen` renders values inside
//! statements.  `Frontend` bundles the first three for the common case
//! of wanting the first parse of a whole string.

#![forbid(unsafe_code)]

use log::debug;

pub mod ast;
pub mod codegen;
pub mod common;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod synth;
pub mod token;
pub mod transform;

pub use self::ast::{BinaryOp, Operator, UnaryOp, Value, Variable};
pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::grammar::{DEFAULT_GRAMMAR, Grammar, Symbol};
pub use self::lexer::tokenize;
pub use self::parser::{ParseNode, Parses, SpanParser};
pub use self::synth::{Reduction, Reductions, synthesize};
pub use self::token::{Tag, Token};
pub use self::transform::{Transformer, TreePrinter, fold, transform};

/// Frontend is a grammar together with its reductions and the label
/// whole inputs are parsed as.
#[derive(Clone, Debug)]
pub struct Frontend {
    grammar: Grammar,
    reductions: Reductions,
    start: String,
}

impl Default for Frontend {
    fn default() -> Self {
        Frontend::new(Grammar::default(), "start")
    }
}

impl Frontend {
    pub fn new(grammar: Grammar, start: &str) -> Self {
        let reductions = Reductions::default_for(&grammar);
        Frontend {
            grammar,
            reductions,
            start: start.to_owned(),
        }
    }

    pub fn with_reductions(mut self, reductions: Reductions) -> Self {
        self.reductions = reductions;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn reductions(&self) -> &Reductions {
        &self.reductions
    }

    /// start resolves the start label against the grammar.
    pub fn start(&self) -> Result<Symbol> {
        match self.grammar.lookup(&self.start) {
            Some(symbol) => Ok(symbol),
            None => Err(Error::new(
                ErrorKind::Parse,
                ErrorCode::UnknownLabel,
                Some(format!("start label '{}' is not in the grammar", self.start)),
            )),
        }
    }

    pub fn tokens(&self, input: &str) -> Result<Vec<Token>> {
        tokenize(input)
    }

    /// trees lazily yields every parse of the whole token sequence.
    pub fn trees<'a>(&'a self, tokens: &'a [Token]) -> Result<Parses<'a>> {
        let start = self.start()?;
        SpanParser::new(&self.grammar, tokens).parse(0, tokens.len(), start)
    }

    pub fn first_tree(&self, tokens: &[Token]) -> Result<ParseNode> {
        let start = self.start()?;
        SpanParser::new(&self.grammar, tokens).parse_first(0, tokens.len(), start)
    }

    /// all_trees enumerates every parse of the whole token sequence.
    pub fn all_trees(&self, tokens: &[Token]) -> Result<Vec<ParseNode>> {
        let start = self.start()?;
        SpanParser::new(&self.grammar, tokens).parse_all(0, tokens.len(), start)
    }

    pub fn print_tree(&self, tokens: &[Token], tree: &ParseNode) -> String {
        TreePrinter::new(&self.grammar).print(tokens, tree)
    }

    pub fn synthesize(&self, tokens: &[Token], tree: &ParseNode) -> Result<Value> {
        synthesize(&self.grammar, &self.reductions, tokens, tree)
    }

    /// expression synthesizes the first parse of `input`.
    pub fn expression(&self, input: &str) -> Result<Value> {
        let tokens = self.tokens(input)?;
        let tree = self.first_tree(&tokens)?;
        debug!("parsed {:?} as {}", input, self.start);
        self.synthesize(&tokens, &tree)
    }
}
