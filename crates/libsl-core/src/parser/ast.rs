//! Contract expression AST
//!
//! The closed node hierarchy for `requires`/`ensures` clauses. Precedence,
//! lowest first:
//!
//! ```text
//! ConjunctionNode  a & b
//!   DisjunctionNode  a | b        (invertible: !(a | b))
//!     TermNode         x == y      (invertible: !x, !(x == y))
//!       EqualityPartNode   "s" | (conjunction) | arithmetic
//!         ArithmeticExpressionNode   + -  over  * /  over  number | call | variable
//! ```
//!
//! Inversion is fixed when a node is built; nodes are never mutated after
//! construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level AND of OR-groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionNode {
    pub disjunctions: Vec<DisjunctionNode>,
}

/// OR of terms, itself invertible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisjunctionNode {
    pub terms: Vec<TermNode>,
    pub is_inverted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermNode {
    pub kind: TermKind,
    pub is_inverted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TermKind {
    Equality(EqualityNode),
    /// An equality part standing alone as a boolean term
    Part(EqualityPartNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityNode {
    pub left: EqualityPartNode,
    pub right: EqualityPartNode,
    pub sign: EqualitySign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqualitySign {
    EqEq,
    NotEq,
    LtEq,
    GtEq,
    Lt,
    Gt,
}

impl EqualitySign {
    pub fn text(self) -> &'static str {
        match self {
            EqualitySign::EqEq => "==",
            EqualitySign::NotEq => "!=",
            EqualitySign::LtEq => "<=",
            EqualitySign::GtEq => ">=",
            EqualitySign::Lt => "<",
            EqualitySign::Gt => ">",
        }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        match text {
            "==" => Ok(EqualitySign::EqEq),
            "!=" => Ok(EqualitySign::NotEq),
            "<=" => Ok(EqualitySign::LtEq),
            ">=" => Ok(EqualitySign::GtEq),
            "<" => Ok(EqualitySign::Lt),
            ">" => Ok(EqualitySign::Gt),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for EqualitySign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EqualityPartNode {
    Arithmetic(ArithmeticExpressionNode),
    String(StringNode),
    /// Parenthesized sub-contract used as a boolean operand
    BooleanExpression(Box<ConjunctionNode>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArithmeticExpressionNode {
    Variable(VariableNode),
    FunctionCall(FunctionCallNode),
    Number(NumberNode),
    Mul(Box<ArithmeticExpressionNode>, Box<ArithmeticExpressionNode>),
    Div(Box<ArithmeticExpressionNode>, Box<ArithmeticExpressionNode>),
    Plus(Box<ArithmeticExpressionNode>, Box<ArithmeticExpressionNode>),
    Minus(Box<ArithmeticExpressionNode>, Box<ArithmeticExpressionNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Mul,
    Div,
    Plus,
    Minus,
}

impl ArithmeticOp {
    pub fn text(self) -> &'static str {
        match self {
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
        }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        match text {
            "*" => Ok(ArithmeticOp::Mul),
            "/" => Ok(ArithmeticOp::Div),
            "+" => Ok(ArithmeticOp::Plus),
            "-" => Ok(ArithmeticOp::Minus),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }
}

impl ArithmeticExpressionNode {
    pub fn binary(
        op: ArithmeticOp,
        left: ArithmeticExpressionNode,
        right: ArithmeticExpressionNode,
    ) -> Self {
        let (l, r) = (Box::new(left), Box::new(right));
        match op {
            ArithmeticOp::Mul => ArithmeticExpressionNode::Mul(l, r),
            ArithmeticOp::Div => ArithmeticExpressionNode::Div(l, r),
            ArithmeticOp::Plus => ArithmeticExpressionNode::Plus(l, r),
            ArithmeticOp::Minus => ArithmeticExpressionNode::Minus(l, r),
        }
    }

    /// Operator and operands of a binary node
    pub fn as_binary(
        &self,
    ) -> Option<(ArithmeticOp, &ArithmeticExpressionNode, &ArithmeticExpressionNode)> {
        match self {
            ArithmeticExpressionNode::Mul(l, r) => Some((ArithmeticOp::Mul, l, r)),
            ArithmeticExpressionNode::Div(l, r) => Some((ArithmeticOp::Div, l, r)),
            ArithmeticExpressionNode::Plus(l, r) => Some((ArithmeticOp::Plus, l, r)),
            ArithmeticExpressionNode::Minus(l, r) => Some((ArithmeticOp::Minus, l, r)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallNode {
    pub name: String,
    pub args: Vec<EqualityPartNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberNode {
    pub value: Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => {
                // Always keep a decimal point so the literal re-lexes as a float
                let s = format!("{}", x);
                if s.contains('.') || s.contains("inf") || s.contains("NaN") {
                    f.write_str(&s)
                } else {
                    write!(f, "{}.0", s)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringNode {
    pub value: String,
}

// ── Convenience accessors ─────────────────────────────────

impl TermNode {
    pub fn equality(&self) -> Option<&EqualityNode> {
        match &self.kind {
            TermKind::Equality(eq) => Some(eq),
            TermKind::Part(_) => None,
        }
    }

    pub fn part(&self) -> Option<&EqualityPartNode> {
        match &self.kind {
            TermKind::Part(part) => Some(part),
            TermKind::Equality(_) => None,
        }
    }
}

impl EqualityPartNode {
    pub fn variable(&self) -> Option<&VariableNode> {
        match self {
            EqualityPartNode::Arithmetic(ArithmeticExpressionNode::Variable(v)) => Some(v),
            _ => None,
        }
    }

    pub fn function_call(&self) -> Option<&FunctionCallNode> {
        match self {
            EqualityPartNode::Arithmetic(ArithmeticExpressionNode::FunctionCall(c)) => Some(c),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<Number> {
        match self {
            EqualityPartNode::Arithmetic(ArithmeticExpressionNode::Number(n)) => Some(n.value),
            _ => None,
        }
    }
}

// ── Visitor ───────────────────────────────────────────────

/// Exhaustive dispatch over every expression node kind.
///
/// `visit_term` has a default that routes to the equality or part visitor;
/// a term's own `is_inverted` flag is the implementor's concern.
pub trait ExpressionVisitor<T> {
    fn visit_conjunction(&mut self, node: &ConjunctionNode) -> T;
    fn visit_disjunction(&mut self, node: &DisjunctionNode) -> T;
    fn visit_equality(&mut self, node: &EqualityNode) -> T;
    fn visit_binary(
        &mut self,
        op: ArithmeticOp,
        left: &ArithmeticExpressionNode,
        right: &ArithmeticExpressionNode,
    ) -> T;
    fn visit_function_call(&mut self, node: &FunctionCallNode) -> T;
    fn visit_number(&mut self, node: &NumberNode) -> T;
    fn visit_variable(&mut self, node: &VariableNode) -> T;
    fn visit_string(&mut self, node: &StringNode) -> T;

    fn visit_term(&mut self, node: &TermNode) -> T {
        match &node.kind {
            TermKind::Equality(eq) => self.visit_equality(eq),
            TermKind::Part(part) => self.visit_part(part),
        }
    }

    fn visit_part(&mut self, node: &EqualityPartNode) -> T {
        match node {
            EqualityPartNode::Arithmetic(arith) => self.visit_arithmetic(arith),
            EqualityPartNode::String(s) => self.visit_string(s),
            EqualityPartNode::BooleanExpression(expr) => self.visit_boolean_expression(expr),
        }
    }

    fn visit_boolean_expression(&mut self, node: &ConjunctionNode) -> T {
        self.visit_conjunction(node)
    }

    fn visit_arithmetic(&mut self, node: &ArithmeticExpressionNode) -> T {
        match node {
            ArithmeticExpressionNode::Variable(v) => self.visit_variable(v),
            ArithmeticExpressionNode::FunctionCall(c) => self.visit_function_call(c),
            ArithmeticExpressionNode::Number(n) => self.visit_number(n),
            ArithmeticExpressionNode::Mul(l, r) => self.visit_binary(ArithmeticOp::Mul, l, r),
            ArithmeticExpressionNode::Div(l, r) => self.visit_binary(ArithmeticOp::Div, l, r),
            ArithmeticExpressionNode::Plus(l, r) => self.visit_binary(ArithmeticOp::Plus, l, r),
            ArithmeticExpressionNode::Minus(l, r) => self.visit_binary(ArithmeticOp::Minus, l, r),
        }
    }
}

/// Collects every variable name referenced by a contract, in first-use order
#[derive(Debug, Default)]
pub struct VariableCollector {
    pub names: Vec<String>,
}

impl ExpressionVisitor<()> for VariableCollector {
    fn visit_conjunction(&mut self, node: &ConjunctionNode) {
        for d in &node.disjunctions {
            self.visit_disjunction(d);
        }
    }

    fn visit_disjunction(&mut self, node: &DisjunctionNode) {
        for t in &node.terms {
            self.visit_term(t);
        }
    }

    fn visit_equality(&mut self, node: &EqualityNode) {
        self.visit_part(&node.left);
        self.visit_part(&node.right);
    }

    fn visit_binary(
        &mut self,
        _op: ArithmeticOp,
        left: &ArithmeticExpressionNode,
        right: &ArithmeticExpressionNode,
    ) {
        self.visit_arithmetic(left);
        self.visit_arithmetic(right);
    }

    fn visit_function_call(&mut self, node: &FunctionCallNode) {
        for arg in &node.args {
            self.visit_part(arg);
        }
    }

    fn visit_number(&mut self, _node: &NumberNode) {}

    fn visit_variable(&mut self, node: &VariableNode) {
        if !self.names.contains(&node.name) {
            self.names.push(node.name.clone());
        }
    }

    fn visit_string(&mut self, _node: &StringNode) {}
}

impl ConjunctionNode {
    pub fn referenced_variables(&self) -> Vec<String> {
        let mut collector = VariableCollector::default();
        collector.visit_conjunction(self);
        collector.names
    }
}
