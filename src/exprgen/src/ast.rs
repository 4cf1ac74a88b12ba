// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Expression values: what synthesis produces from a parse tree and
//! what the code model embeds in statements.

use std::fmt;

use crate::common::Result;
use crate::model_err;

/// The type given to variables that are not declared with one.
pub const DEFAULT_TYPE: &str = "double";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

const BINARY_OPS: [BinaryOp; 16] = [
    BinaryOp::Lt,
    BinaryOp::Lte,
    BinaryOp::Gt,
    BinaryOp::Gte,
    BinaryOp::Eq,
    BinaryOp::Neq,
    BinaryOp::And,
    BinaryOp::Or,
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::AddAssign,
    BinaryOp::SubAssign,
    BinaryOp::MulAssign,
    BinaryOp::DivAssign,
];

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        BINARY_OPS.iter().copied().find(|op| op.symbol() == symbol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negative,
    Increment,
    Decrement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negative => "-",
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
        }
    }
}

/// Operators are identified by their symbol and arity, so binary `-`
/// and unary `-` are different operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.symbol(),
            Operator::Unary(op) => op.symbol(),
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Operator::Binary(_) => 2,
            Operator::Unary(_) => 1,
        }
    }
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        Operator::Binary(op)
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        Operator::Unary(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A named, typed variable.  Identity is the name alone.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub type_tag: String,
}

impl Variable {
    pub fn new(name: &str) -> Self {
        Variable::typed(name, DEFAULT_TYPE)
    }

    pub fn typed(name: &str, type_tag: &str) -> Self {
        Variable {
            name: name.to_owned(),
            type_tag: type_tag.to_owned(),
        }
    }

    pub fn int(name: &str) -> Self {
        Variable::typed(name, "int")
    }

    pub fn double(name: &str) -> Self {
        Variable::typed(name, "double")
    }

    /// declare renders the variable as it appears in a declaration.
    pub fn declare(&self) -> String {
        format!("{} {}", self.type_tag, self.name)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A pointer-based array of `dims` dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Array {
    pub name: String,
    pub type_tag: String,
    pub dims: usize,
}

impl Array {
    pub fn new(name: &str, type_tag: &str, dims: usize) -> Self {
        Array {
            name: name.to_owned(),
            type_tag: type_tag.to_owned(),
            dims,
        }
    }

    pub fn declare(&self) -> String {
        format!("{}{} {}", self.type_tag, "*".repeat(self.dims), self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    array: Array,
    indices: Vec<Value>,
}

impl Element {
    pub fn new(array: Array, indices: Vec<Value>) -> Result<Self> {
        if indices.len() != array.dims {
            return model_err!(
                ArityMismatch,
                format!(
                    "array {} has {} dimensions but was indexed with {}",
                    array.name,
                    array.dims,
                    indices.len()
                )
            );
        }
        Ok(Element { array, indices })
    }

    pub fn array(&self) -> &Array {
        &self.array
    }

    pub fn indices(&self) -> &[Value] {
        &self.indices
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Value>,
}

impl Call {
    pub fn new(name: &str, args: Vec<Value>) -> Self {
        Call {
            name: name.to_owned(),
            args,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|arg| arg.to_string()).collect();
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

/// An operator applied to one or two operands.  A right operand is
/// present exactly when the operator is binary.
#[derive(Clone, Debug, PartialEq)]
pub struct OpTree {
    op: Operator,
    left: Box<Value>,
    right: Option<Box<Value>>,
}

impl OpTree {
    pub fn new(op: Operator, left: Value, right: Option<Value>) -> Result<Self> {
        if right.is_some() != (op.arity() == 2) {
            let details = format!("operator '{op}' takes {} operands", op.arity());
            return model_err!(ArityMismatch, details);
        }
        Ok(OpTree {
            op,
            left: Box::new(left),
            right: right.map(Box::new),
        })
    }

    pub fn binary(op: BinaryOp, left: Value, right: Value) -> Self {
        OpTree {
            op: Operator::Binary(op),
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    pub fn unary(op: UnaryOp, operand: Value) -> Self {
        OpTree {
            op: Operator::Unary(op),
            left: Box::new(operand),
            right: None,
        }
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn left(&self) -> &Value {
        &self.left
    }

    pub fn right(&self) -> Option<&Value> {
        self.right.as_deref()
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Variable(Variable),
    Constant(String),
    Parens(Box<Value>),
    Call(Call),
    OpTree(OpTree),
    Element(Element),
    /// Like `OpTree`, but rendered without enclosing parentheses, for
    /// use in control-flow headers.
    Condition(OpTree),
}

impl Value {
    pub fn var(name: &str) -> Self {
        Value::Variable(Variable::new(name))
    }

    pub fn constant(text: &str) -> Self {
        Value::Constant(text.to_owned())
    }

    pub fn parens(inner: Value) -> Self {
        Value::Parens(Box::new(inner))
    }

    pub fn call(name: &str, args: Vec<Value>) -> Self {
        Value::Call(Call::new(name, args))
    }

    pub fn binary(op: BinaryOp, left: Value, right: Value) -> Self {
        Value::OpTree(OpTree::binary(op, left, right))
    }

    pub fn compare(left: Value, op: BinaryOp, right: Value) -> Self {
        Value::Condition(OpTree::binary(op, left, right))
    }

    /// ungrouped strips any number of enclosing `Parens`.
    pub fn ungrouped(&self) -> &Value {
        let mut value = self;
        while let Value::Parens(inner) = value {
            value = inner;
        }
        value
    }

    fn name_text(&self) -> Option<&str> {
        match self {
            Value::Variable(var) => Some(&var.name),
            Value::Constant(text) => Some(text),
            _ => None,
        }
    }

    // binary operator trees print their own enclosing parentheses
    fn self_enclosed(&self) -> bool {
        matches!(self, Value::OpTree(tree) if tree.right.is_some())
    }
}

/// Constants are a kind of variable and compare by their text, and
/// grouping parentheses do not take part in equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.ungrouped(), other.ungrouped());
        if let (Some(a), Some(b)) = (a.name_text(), b.name_text()) {
            return a == b;
        }
        match (a, b) {
            (Value::Call(a), Value::Call(b)) => a == b,
            (Value::OpTree(a), Value::OpTree(b)) => a == b,
            (Value::Element(a), Value::Element(b)) => a == b,
            (Value::Condition(a), Value::Condition(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Variable> for Value {
    fn from(var: Variable) -> Self {
        Value::Variable(var)
    }
}

impl From<Call> for Value {
    fn from(call: Call) -> Self {
        Value::Call(call)
    }
}

impl From<OpTree> for Value {
    fn from(tree: OpTree) -> Self {
        Value::OpTree(tree)
    }
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        Value::Element(element)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Variable(var) => write!(f, "{var}"),
            Value::Constant(text) => write!(f, "{text}"),
            Value::Parens(inner) => {
                if inner.self_enclosed() {
                    write!(f, "{inner}")
                } else {
                    write!(f, "({inner})")
                }
            }
            Value::Call(call) => write!(f, "{call}"),
            Value::OpTree(tree) => match tree.right {
                Some(ref right) => write!(f, "({} {} {})", tree.left, tree.op, right),
                None => write!(f, "{}{}", tree.op, tree.left),
            },
            Value::Element(element) => {
                write!(f, "{}", element.array.name)?;
                for index in element.indices.iter() {
                    write!(f, "[{index}]")?;
                }
                Ok(())
            }
            Value::Condition(tree) => match tree.right {
                Some(ref right) => write!(f, "{} {} {}", tree.left, tree.op, right),
                None => write!(f, "{}({})", tree.op, tree.left),
            },
        }
    }
}

/// reduce left-folds values with a binary operator:
/// `[a, b, c]` becomes `((a op b) op c)`.
pub fn reduce(op: BinaryOp, values: Vec<Value>) -> Result<Value> {
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return model_err!(
            EmptyReduction,
            format!("cannot reduce zero values with '{}'", op.symbol())
        );
    };
    Ok(values.fold(first, |acc, value| Value::binary(op, acc, value)))
}

pub fn product(values: Vec<Value>) -> Result<Value> {
    reduce(BinaryOp::Mul, values)
}

pub fn all(conditions: Vec<Value>) -> Result<Value> {
    reduce(BinaryOp::And, conditions)
}

pub fn any(conditions: Vec<Value>) -> Result<Value> {
    reduce(BinaryOp::Or, conditions)
}
