// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Statement-level code model and its C-like text rendering.
//!
//! Rendering is deterministic and fixed: statement lines take a `;`
//! unless they are containers, comments or preprocessor macros (a
//! function prototype still takes one), container bodies are indented
//! by `INDENT`, and a full function definition is followed by a blank
//! line.

use std::fmt;

use crate::ast::{Array, BinaryOp, Call, Operator, UnaryOp, Value, Variable};
use crate::common::Result;
use crate::model_err;

#[cfg(test)]
mod test;

pub use crate::ast::DEFAULT_TYPE;

pub const INDENT: &str = "  ";
pub const SEPARATOR: &str = ";";

#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Variable(Variable),
    Array(Array),
}

impl Declaration {
    fn render(&self) -> String {
        match self {
            Declaration::Variable(var) => var.declare(),
            Declaration::Array(array) => array.declare(),
        }
    }
}

impl From<Variable> for Declaration {
    fn from(var: Variable) -> Self {
        Declaration::Variable(var)
    }
}

impl From<Array> for Declaration {
    fn from(array: Array) -> Self {
        Declaration::Array(array)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    target: Value,
    rhs: Value,
    declared_type: Option<String>,
}

impl Assignment {
    /// new assigns to an existing variable or array element.
    pub fn new(target: impl Into<Value>, rhs: Value) -> Self {
        Assignment {
            target: target.into(),
            rhs,
            declared_type: None,
        }
    }

    /// declare declares `var` and initializes it in one statement.
    pub fn declare(var: Variable, rhs: Value) -> Self {
        let declared_type = Some(var.type_tag.clone());
        Assignment {
            target: Value::Variable(var),
            rhs,
            declared_type,
        }
    }

    pub fn target(&self) -> &Value {
        &self.target
    }

    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub fn is_declaration(&self) -> bool {
        self.declared_type.is_some()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref type_tag) = self.declared_type {
            write!(f, "{type_tag} ")?;
        }
        write!(f, "{} = {}", self.target, self.rhs)
    }
}

/// An in-place update: `x += 1`, `i++`.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    target: Value,
    op: Operator,
    value: Option<Value>,
}

impl Update {
    pub fn new(target: impl Into<Value>, op: Operator, value: Option<Value>) -> Result<Self> {
        if value.is_some() != (op.arity() == 2) {
            return model_err!(
                ArityMismatch,
                format!("update with '{}' takes {} operands", op, op.arity())
            );
        }
        Ok(Update {
            target: target.into(),
            op,
            value,
        })
    }

    pub fn binary(target: impl Into<Value>, op: BinaryOp, value: Value) -> Self {
        Update {
            target: target.into(),
            op: Operator::Binary(op),
            value: Some(value),
        }
    }

    pub fn unary(target: impl Into<Value>, op: UnaryOp) -> Self {
        Update {
            target: target.into(),
            op: Operator::Unary(op),
            value: None,
        }
    }

    pub fn increment(target: impl Into<Value>) -> Self {
        Update::unary(target, UnaryOp::Increment)
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{} {} {}", self.target, self.op, value),
            None => write!(f, "{}{}", self.target, self.op),
        }
    }
}

/// A preprocessor line, `#name arg...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub args: Vec<String>,
}

impl Macro {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Macro {
            name: name.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }

    /// include quotes `file` for a local include, brackets it otherwise.
    pub fn include(file: &str, local: bool) -> Self {
        let arg = if local {
            format!("\"{file}\"")
        } else {
            format!("<{file}>")
        };
        Macro {
            name: "include".to_owned(),
            args: vec![arg],
        }
    }

    pub fn define(name: &str, value: Option<&str>) -> Self {
        let mut args = vec![name.to_owned()];
        args.extend(value.map(str::to_owned));
        Macro {
            name: "define".to_owned(),
            args,
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Header {
    For {
        init: Box<Statement>,
        condition: Value,
        update: Box<Statement>,
    },
    While(Value),
    If(Value),
    ElseIf(Value),
    Else,
    Function {
        return_type: String,
        name: String,
        params: Vec<Declaration>,
        declaration_only: bool,
    },
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Header::For {
                init,
                condition,
                update,
            } => write!(
                f,
                "for ({}; {}; {})",
                init.render(),
                condition,
                update.render()
            ),
            Header::While(condition) => write!(f, "while ({condition})"),
            Header::If(condition) => write!(f, "if ({condition})"),
            Header::ElseIf(condition) => write!(f, "else if ({condition})"),
            Header::Else => write!(f, "else"),
            Header::Function {
                return_type,
                name,
                params,
                ..
            } => {
                let params: Vec<String> = params.iter().map(|p| p.render()).collect();
                write!(f, "{} {}({})", return_type, name, params.join(", "))
            }
        }
    }
}

/// A header followed by a braced, indented body.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub header: Header,
    pub body: Vec<Statement>,
    pub trailing_blank_line: bool,
}

impl Container {
    fn new(header: Header, body: Vec<Statement>) -> Self {
        Container {
            header,
            body,
            trailing_blank_line: false,
        }
    }

    pub fn for_loop(
        init: Statement,
        condition: Value,
        update: Statement,
        body: Vec<Statement>,
    ) -> Self {
        let header = Header::For {
            init: Box::new(init),
            condition,
            update: Box::new(update),
        };
        Container::new(header, body)
    }

    pub fn while_loop(condition: Value, body: Vec<Statement>) -> Self {
        Container::new(Header::While(condition), body)
    }

    /// if_block opens a conditional; `chained` makes it the `else if`
    /// arm of a preceding one.
    pub fn if_block(condition: Value, body: Vec<Statement>, chained: bool) -> Self {
        let header = if chained {
            Header::ElseIf(condition)
        } else {
            Header::If(condition)
        };
        Container::new(header, body)
    }

    pub fn else_block(body: Vec<Statement>) -> Self {
        Container::new(Header::Else, body)
    }

    pub fn function(
        return_type: &str,
        name: &str,
        params: Vec<Declaration>,
        body: Vec<Statement>,
    ) -> Self {
        let header = Header::Function {
            return_type: return_type.to_owned(),
            name: name.to_owned(),
            params,
            declaration_only: false,
        };
        Container {
            header,
            body,
            trailing_blank_line: true,
        }
    }

    /// declaration returns the prototype of a function definition.
    pub fn declaration(&self) -> Option<Container> {
        let Header::Function {
            return_type,
            name,
            params,
            ..
        } = &self.header
        else {
            return None;
        };
        let header = Header::Function {
            return_type: return_type.clone(),
            name: name.clone(),
            params: params.clone(),
            declaration_only: true,
        };
        Some(Container::new(header, vec![]))
    }

    pub fn is_declaration_only(&self) -> bool {
        matches!(
            self.header,
            Header::Function {
                declaration_only: true,
                ..
            }
        )
    }

    fn render(&self) -> String {
        if self.is_declaration_only() {
            return self.header.to_string();
        }
        let mut s = format!("{} {{\n", self.header);
        let body = render_block(&self.body);
        for line in body.lines().filter(|line| !line.trim().is_empty()) {
            s.push_str(INDENT);
            s.push_str(line);
            s.push('\n');
        }
        s.push('}');
        s
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    Update(Update),
    Return(Option<Value>),
    Declaration(Declaration),
    Call(Call),
    Macro(Macro),
    /// Pre-formatted text, emitted verbatim.
    Comment(String),
    Empty,
    Container(Container),
}

impl Statement {
    pub fn comment(text: &str) -> Self {
        Statement::Comment(text.to_owned())
    }

    pub fn returns(value: Value) -> Self {
        Statement::Return(Some(value))
    }

    fn render(&self) -> String {
        match self {
            Statement::Assignment(assignment) => assignment.to_string(),
            Statement::Update(update) => update.to_string(),
            Statement::Return(Some(value)) => format!("return {value}"),
            Statement::Return(None) => "return".to_owned(),
            Statement::Declaration(decl) => decl.render(),
            Statement::Call(call) => call.to_string(),
            Statement::Macro(m) => m.to_string(),
            Statement::Comment(text) => text.clone(),
            Statement::Empty => String::new(),
            Statement::Container(container) => container.render(),
        }
    }

    fn takes_separator(&self) -> bool {
        match self {
            Statement::Container(container) => container.is_declaration_only(),
            Statement::Macro(_) | Statement::Comment(_) | Statement::Empty => false,
            _ => true,
        }
    }
}

impl From<Assignment> for Statement {
    fn from(assignment: Assignment) -> Self {
        Statement::Assignment(assignment)
    }
}

impl From<Update> for Statement {
    fn from(update: Update) -> Self {
        Statement::Update(update)
    }
}

impl From<Declaration> for Statement {
    fn from(decl: Declaration) -> Self {
        Statement::Declaration(decl)
    }
}

impl From<Call> for Statement {
    fn from(call: Call) -> Self {
        Statement::Call(call)
    }
}

impl From<Macro> for Statement {
    fn from(m: Macro) -> Self {
        Statement::Macro(m)
    }
}

impl From<Container> for Statement {
    fn from(container: Container) -> Self {
        Statement::Container(container)
    }
}

/// for_range is the counting loop `for (int i = start; i < end; i++)`.
pub fn for_range(var: Variable, start: Value, end: Value, body: Vec<Statement>) -> Container {
    let condition = Value::compare(Value::Variable(var.clone()), BinaryOp::Lt, end);
    let update = Update::increment(var.clone());
    Container::for_loop(
        Assignment::declare(var, start).into(),
        condition,
        update.into(),
        body,
    )
}

/// A block of statements rendered one per line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statements(pub Vec<Statement>);

fn render_block(statements: &[Statement]) -> String {
    let mut lines = Vec::with_capacity(statements.len());
    for statement in statements.iter() {
        let mut line = statement.render().trim().to_owned();
        if !line.is_empty() && statement.takes_separator() {
            line.push_str(SEPARATOR);
        }
        if let Statement::Container(container) = statement {
            if container.trailing_blank_line && !container.is_declaration_only() {
                line.push('\n');
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

impl fmt::Display for Statements {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render_block(&self.0))
    }
}

/// SourceFile lays out a complete C source or header file: a leading
/// comment, an optional include guard, includes, defines and the body,
/// with a blank line between sections.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    comment: Option<String>,
    guard: Option<String>,
    includes: Vec<Macro>,
    defines: Vec<Macro>,
    body: Vec<Statement>,
}

impl SourceFile {
    pub fn new() -> Self {
        SourceFile::default()
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.comment = Some(text.to_owned());
        self
    }

    pub fn guard(mut self, name: &str) -> Self {
        self.guard = Some(name.to_owned());
        self
    }

    pub fn include(mut self, file: &str, local: bool) -> Self {
        self.includes.push(Macro::include(file, local));
        self
    }

    pub fn define(mut self, name: &str, value: Option<&str>) -> Self {
        self.defines.push(Macro::define(name, value));
        self
    }

    pub fn push(mut self, statement: impl Into<Statement>) -> Self {
        self.body.push(statement.into());
        self
    }

    pub fn extend(mut self, statements: impl IntoIterator<Item = Statement>) -> Self {
        self.body.extend(statements);
        self
    }

    pub fn statements(&self) -> Statements {
        let mut out = vec![];
        if let Some(ref comment) = self.comment {
            out.push(Statement::Comment(comment.clone()));
            out.push(Statement::Empty);
        }
        if let Some(ref guard) = self.guard {
            out.push(Macro::new("ifndef", &[guard.as_str()]).into());
            out.push(Macro::define(guard, None).into());
            out.push(Statement::Empty);
        }
        if !self.includes.is_empty() {
            out.extend(self.includes.iter().cloned().map(Statement::Macro));
            out.push(Statement::Empty);
        }
        if !self.defines.is_empty() {
            out.extend(self.defines.iter().cloned().map(Statement::Macro));
            out.push(Statement::Empty);
        }
        out.extend(self.body.iter().cloned());
        if self.guard.is_some() {
            out.push(Statement::Empty);
            out.push(Macro::new("endif", &[]).into());
        }
        Statements(out)
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.statements())
    }
}
