// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Whitespace-insensitive tokenizer for algebraic source strings.
//!
//! All whitespace is dropped before scanning, so `"1 2"` is the number
//! `12`.  At each position the patterns are tried in a fixed order
//! (operators, function names, names, numbers, punctuation) and the
//! first one that matches wins.  Two decisions are made here rather
//! than in the grammar:
//!
//! - a `+` or `-` is an `ADDOP` only when it follows a token that can
//!   end an operand; anywhere else it must be the sign of a number.
//! - an identifier immediately followed by `(` is a `FUNCNAME`.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::common::Result;
use crate::lex_err;
use crate::token::{Tag, Token};


lazy_static! {
    static ref FUNCNAME_RE: Regex = Regex::new(r"^([A-Za-z_][A-Za-z_0-9]*)\(").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*").unwrap();
    static ref NUMBER_RE: Regex =
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eEdD][+-]?[0-9]+)?").unwrap();
}

pub struct Lexer {
    text: String,
    // offsets[i] is the byte offset in the original input of text[i]
    offsets: Vec<usize>,
    pos: usize,
    prev: Option<Tag>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut text = String::with_capacity(input.len());
        let mut offsets = Vec::with_capacity(input.len());
        for (i, c) in input.char_indices() {
            if c.is_whitespace() {
                continue;
            }
            offsets.extend(i..i + c.len_utf8());
            text.push(c);
        }

        Lexer {
            text,
            offsets,
            pos: 0,
            prev: None,
        }
    }

    fn operand_ended(&self) -> bool {
        matches!(
            self.prev,
            Some(Tag::Name | Tag::FuncName | Tag::Number | Tag::RParen)
        )
    }

    fn operator(&self, c: char) -> Option<(Tag, usize)> {
        match c {
            '*' | '/' => Some((Tag::MulOp, 1)),
            '+' | '-' if self.operand_ended() => Some((Tag::AddOp, 1)),
            _ => None,
        }
    }

    fn punctuation(c: char) -> Option<(Tag, usize)> {
        let tag = match c {
            '.' => Tag::Dot,
            ',' => Tag::Comma,
            '(' => Tag::LParen,
            ')' => Tag::RParen,
            _ => return None,
        };
        Some((tag, 1))
    }

    fn scan_token(&self) -> Option<(Tag, usize)> {
        let rest = &self.text[self.pos..];
        let c = rest.chars().next()?;

        if let Some(m) = self.operator(c) {
            return Some(m);
        }
        if let Some(caps) = FUNCNAME_RE.captures(rest) {
            return Some((Tag::FuncName, caps[1].len()));
        }
        if let Some(m) = NAME_RE.find(rest) {
            return Some((Tag::Name, m.end()));
        }
        if let Some(m) = NUMBER_RE.find(rest) {
            return Some((Tag::Number, m.end()));
        }
        Self::punctuation(c)
    }

    fn unrecognized(&mut self) -> Result<Token> {
        let start = self.offsets[self.pos];
        let c = self.text[self.pos..].chars().next().unwrap_or_default();
        // lexing is not resumable after an error
        self.pos = self.text.len();
        lex_err!(
            UnrecognizedCharacter,
            start,
            start + c.len_utf8(),
            format!("unrecognized character {c:?} at offset {start}")
        )
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        match self.scan_token() {
            Some((tag, len)) => {
                let tok = Token::new(tag, &self.text[self.pos..self.pos + len]);
                self.pos += len;
                self.prev = Some(tag);
                Some(Ok(tok))
            }
            None => Some(self.unrecognized()),
        }
    }
}

/// tokenize converts a source string into its tokens, failing on the
/// first character no pattern accepts.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let tokens = Lexer::new(input).collect::<Result<Vec<Token>>>()?;
    debug!("tokenized {:?} into {} tokens", input, tokens.len());
    Ok(tokens)
}
