// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use serde::Serialize;

/// Tag is the closed set of lexical categories.  Grammars refer to
/// these by (case-insensitive) name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    Number,
    Name,
    FuncName,
    AddOp,
    MulOp,
    Dot,
    Comma,
    LParen,
    RParen,
}

pub const ALL_TAGS: [Tag; 9] = [
    Tag::Number,
    Tag::Name,
    Tag::FuncName,
    Tag::AddOp,
    Tag::MulOp,
    Tag::Dot,
    Tag::Comma,
    Tag::LParen,
    Tag::RParen,
];

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Number => "NUMBER",
            Tag::Name => "NAME",
            Tag::FuncName => "FUNCNAME",
            Tag::AddOp => "ADDOP",
            Tag::MulOp => "MULOP",
            Tag::Dot => "DOT",
            Tag::Comma => "COMMA",
            Tag::LParen => "LPAREN",
            Tag::RParen => "RPAREN",
        }
    }

    pub fn from_name(name: &str) -> Option<Tag> {
        ALL_TAGS
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub tag: Tag,
    pub text: String,
}

impl Token {
    pub fn new(tag: Tag, text: &str) -> Self {
        Token {
            tag,
            text: text.to_owned(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:?}", self.tag, self.text)
    }
}

/// text concatenates the source text of a run of tokens.
pub fn text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// A small bitset of tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TagSet(u16);

impl TagSet {
    pub(crate) fn single(tag: Tag) -> Self {
        TagSet(tag.bit())
    }

    pub(crate) fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// union returns true if `other` added anything to self.
    pub(crate) fn union(&mut self, other: TagSet) -> bool {
        let before = self.0;
        self.0 |= other.0;
        self.0 != before
    }
}
