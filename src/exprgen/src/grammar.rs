// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Production rules compiled from a line-oriented grammar description.
//!
//! Every rule is either a unit production (`lhs = a`) or a binary
//! production (`lhs = a b`), where `a` and `b` name either another
//! nonterminal or a terminal tag (`number`, `name`, `funcname`, `addop`,
//! `mulop`, `dot`, `comma`, `lparen`, `rparen`).  The same `lhs` may
//! appear on several lines; alternatives are tried in the order they
//! are written.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::common::Result;
use crate::grammar_err;
use crate::token::{Tag, TagSet};

/// The built-in grammar.  Precedence and associativity live entirely in
/// the shape of the rules: a `sum` is an `expr` followed by an additive
/// operator and a `term`, so `a + b + c` only splits as `(a + b) + c`,
/// and products bind tighter because a `term` never contains a bare
/// additive operator.
pub const DEFAULT_GRAMMAR: &str = "
start = expr

expr = sum
expr = term
sum = sum_head term
sum_head = expr addop

term = product
term = factor
product = product_head factor
product_head = term mulop

factor = number
factor = name
factor = member
factor = parens
factor = call

parens = parens_head rparen
parens_head = lparen expr

call = call_head call_tail
call_head = funcname lparen
call_tail = rparen
call_tail = args rparen
args = expr
args = expr args_tail
args_tail = comma args

member = member_head name
member_head = name dot
member_head = member dot
";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalId(u32);

impl NonterminalId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Tag),
    Nonterminal(NonterminalId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rhs {
    Unit(Symbol),
    Binary(Symbol, Symbol),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub lhs: NonterminalId,
    pub rhs: Rhs,
}

impl Rule {
    pub fn is_unit(&self) -> bool {
        matches!(self.rhs, Rhs::Unit(_))
    }
}

/// Grammar is immutable once compiled and is meant to be shared by
/// reference between any number of parses.
#[derive(Clone, Debug)]
pub struct Grammar {
    names: Vec<String>,
    ids: HashMap<String, NonterminalId>,
    rules: Vec<Rule>,
    by_lhs: Vec<Vec<usize>>,
    // terminals that can begin and end a derivation of each nonterminal
    first: Vec<TagSet>,
    last: Vec<TagSet>,
}

struct Builder {
    names: Vec<String>,
    ids: HashMap<String, NonterminalId>,
}

impl Builder {
    fn intern(&mut self, name: &str) -> NonterminalId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = NonterminalId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        id
    }

    fn symbol(&mut self, name: &str) -> Symbol {
        match Tag::from_name(name) {
            Some(tag) => Symbol::Terminal(tag),
            None => Symbol::Nonterminal(self.intern(name)),
        }
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

impl Grammar {
    pub fn compile(text: &str) -> Result<Grammar> {
        let mut builder = Builder {
            names: vec![],
            ids: HashMap::new(),
        };
        let mut rules = vec![];

        for (i, line) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = line.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }

            let Some((lhs, rhs)) = line.split_once('=') else {
                return grammar_err!(MalformedRule, format!("line {lineno}: missing '='"));
            };
            let lhs = lhs.trim();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                return grammar_err!(
                    MalformedRule,
                    format!("line {lineno}: expected a single name before '='")
                );
            }
            if Tag::from_name(lhs).is_some() {
                return grammar_err!(
                    TerminalOnLeft,
                    format!("line {lineno}: terminal '{lhs}' cannot have rules")
                );
            }

            let lhs = builder.intern(lhs);
            let rhs: Vec<&str> = rhs.split_whitespace().collect();
            let rhs = match rhs.as_slice() {
                [a] => Rhs::Unit(builder.symbol(a)),
                [a, b] => Rhs::Binary(builder.symbol(a), builder.symbol(b)),
                _ => {
                    return grammar_err!(
                        MalformedRule,
                        format!(
                            "line {lineno}: expected 1 or 2 symbols after '=', found {}",
                            rhs.len()
                        )
                    );
                }
            };
            rules.push(Rule { lhs, rhs });
        }

        let n = builder.names.len();
        let mut by_lhs = vec![vec![]; n];
        for (i, rule) in rules.iter().enumerate() {
            by_lhs[rule.lhs.index()].push(i);
        }

        let mut grammar = Grammar {
            names: builder.names,
            ids: builder.ids,
            rules,
            by_lhs,
            first: vec![TagSet::default(); n],
            last: vec![TagSet::default(); n],
        };
        grammar.check_unit_cycles()?;
        grammar.compute_boundaries();

        debug!(
            "compiled grammar: {} rules over {} nonterminals",
            grammar.rules.len(),
            n
        );

        Ok(grammar)
    }

    // A unit cycle lets a nonterminal derive itself over the same span,
    // which no amount of splitting ever terminates.
    fn check_unit_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        fn visit(
            grammar: &Grammar,
            id: NonterminalId,
            marks: &mut [Mark],
        ) -> Option<NonterminalId> {
            match marks[id.index()] {
                Mark::Done => return None,
                Mark::Active => return Some(id),
                Mark::New => {}
            }
            marks[id.index()] = Mark::Active;
            for rule in grammar.rules_for(id) {
                if let Rhs::Unit(Symbol::Nonterminal(child)) = rule.rhs {
                    if let Some(cycle) = visit(grammar, child, marks) {
                        return Some(cycle);
                    }
                }
            }
            marks[id.index()] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::New; self.names.len()];
        for i in 0..self.names.len() {
            if let Some(id) = visit(self, NonterminalId(i as u32), &mut marks) {
                return grammar_err!(
                    UnitCycle,
                    format!("'{}' derives itself through unit rules", self.name(id))
                );
            }
        }
        Ok(())
    }

    fn boundary(sets: &[TagSet], symbol: Symbol) -> TagSet {
        match symbol {
            Symbol::Terminal(tag) => TagSet::single(tag),
            Symbol::Nonterminal(id) => sets[id.index()],
        }
    }

    // There are no empty productions, so a derivation starts with a
    // terminal from the leftmost symbol and ends with one from the
    // rightmost.
    fn compute_boundaries(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for rule in self.rules.iter() {
                let (head, tail) = match rule.rhs {
                    Rhs::Unit(sym) => (sym, sym),
                    Rhs::Binary(l, r) => (l, r),
                };
                let first = Self::boundary(&self.first, head);
                let last = Self::boundary(&self.last, tail);
                changed |= self.first[rule.lhs.index()].union(first);
                changed |= self.last[rule.lhs.index()].union(last);
            }
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// rules_for yields the alternatives for a nonterminal in table order.
    pub fn rules_for(&self, id: NonterminalId) -> impl Iterator<Item = &Rule> + '_ {
        self.by_lhs[id.index()].iter().map(move |&i| &self.rules[i])
    }

    pub fn name(&self, id: NonterminalId) -> &str {
        &self.names[id.index()]
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(tag) => tag.name(),
            Symbol::Nonterminal(id) => self.name(id),
        }
    }

    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.ids.get(name).copied()
    }

    /// lookup resolves a grammar label: terminal tags first, then
    /// nonterminals mentioned anywhere in the rules.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        match Tag::from_name(name) {
            Some(tag) => Some(Symbol::Terminal(tag)),
            None => self.nonterminal(name).map(Symbol::Nonterminal),
        }
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> + '_ {
        (0..self.names.len()).map(|i| NonterminalId(i as u32))
    }

    /// could_start reports whether a derivation of `symbol` can begin with `tag`.
    pub(crate) fn could_start(&self, symbol: Symbol, tag: Tag) -> bool {
        Self::boundary(&self.first, symbol).contains(tag)
    }

    /// could_end reports whether a derivation of `symbol` can end with `tag`.
    pub(crate) fn could_end(&self, symbol: Symbol, tag: Tag) -> bool {
        Self::boundary(&self.last, symbol).contains(tag)
    }

    fn rule_display(&self, rule: &Rule) -> String {
        let lhs = self.name(rule.lhs);
        match rule.rhs {
            Rhs::Unit(a) => format!("{} = {}", lhs, self.rhs_name(a)),
            Rhs::Binary(a, b) => format!("{} = {} {}", lhs, self.rhs_name(a), self.rhs_name(b)),
        }
    }

    fn rhs_name(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Terminal(tag) => tag.name().to_lowercase(),
            Symbol::Nonterminal(id) => self.name(id).to_owned(),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::compile(DEFAULT_GRAMMAR).expect("built-in grammar is well formed")
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in self.rules.iter() {
            writeln!(f, "{}", self.rule_display(rule))?;
        }
        Ok(())
    }
}
