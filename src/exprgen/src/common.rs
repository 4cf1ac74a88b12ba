// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnrecognizedCharacter,
    MalformedRule,
    TerminalOnLeft,
    UnitCycle,
    NoParse,
    InvalidSpan,
    UnknownLabel,
    UnhandledTag,
    UnexpectedShape,
    UnknownOperator,
    ArityMismatch,
    EmptyReduction,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            UnrecognizedCharacter => "unrecognized_character",
            MalformedRule => "malformed_rule",
            TerminalOnLeft => "terminal_on_left",
            UnitCycle => "unit_cycle",
            NoParse => "no_parse",
            InvalidSpan => "invalid_span",
            UnknownLabel => "unknown_label",
            UnhandledTag => "unhandled_tag",
            UnexpectedShape => "unexpected_shape",
            UnknownOperator => "unknown_operator",
            ArityMismatch => "arity_mismatch",
            EmptyReduction => "empty_reduction",
        };

        write!(f, "{name}")
    }
}

/// The pipeline stage that produced an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Grammar,
    Parse,
    Synthesis,
    Model,
}

/// Error is the single error type of the crate.  `span` is a half-open
/// range: byte offsets into the original input for lexical errors,
/// token indices for parse errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub span: Option<(usize, usize)>,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            span: None,
            details,
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }

    /// Lexical, grammar and parse failures come from the input (or the
    /// grammar text) and need the caller's attention.  Synthesis and model
    /// errors are defects in reduction rules or hand-built code models.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Lex | ErrorKind::Grammar | ErrorKind::Parse
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Lex => "LexError",
            ErrorKind::Grammar => "GrammarError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Synthesis => "SynthesisError",
            ErrorKind::Model => "ModelError",
        };
        write!(f, "{}{{{}", kind, self.code)?;
        if let Some((start, end)) = self.span {
            write!(f, "@{start}:{end}")?;
        }
        match self.details {
            Some(ref details) => write!(f, ": {details}}}"),
            None => write!(f, "}}"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! lex_err(
    ($code:tt, $start:expr, $end:expr, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Lex, ErrorCode::$code, Some($str)).with_span($start, $end))
    }}
);

#[macro_export]
macro_rules! grammar_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Grammar, ErrorCode::$code, Some($str)))
    }}
);

#[macro_export]
macro_rules! parse_err(
    ($code:tt, $start:expr, $end:expr, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Parse, ErrorCode::$code, Some($str)).with_span($start, $end))
    }}
);

#[macro_export]
macro_rules! synth_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Synthesis, ErrorCode::$code, Some($str)))
    }}
);

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Model, ErrorCode::$code, Some($str)))
    }}
);

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Parse,
        ErrorCode::NoParse,
        Some("start".to_owned()),
    )
    .with_span(0, 3);
    assert_eq!("ParseError{no_parse@0:3: start}", format!("{err}"));

    let err = Error::new(ErrorKind::Model, ErrorCode::ArityMismatch, None);
    assert_eq!("ModelError{arity_mismatch}", format!("{err}"));
}

#[test]
fn test_input_errors_are_distinguishable() {
    let lex = Error::new(ErrorKind::Lex, ErrorCode::UnrecognizedCharacter, None);
    let synth = Error::new(ErrorKind::Synthesis, ErrorCode::UnexpectedShape, None);
    assert!(lex.is_input_error());
    assert!(!synth.is_input_error());
}
