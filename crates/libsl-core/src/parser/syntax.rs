//! Concrete syntax for the declarations that need a build step
//!
//! Automaton bodies and function declarations are recorded item by item as
//! they appear in the source; `builder` folds them into IR nodes.

use crate::ir::{ActionDecl, FunctionArgument, PropertyDecl, ReturnTypeDecl, VariableAssignment};
use crate::parser::ast::ConjunctionNode;
use crate::parser::tokenizer::Span;
use crate::types::SemanticType;

#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonSyntax {
    pub name: SemanticType,
    pub items: Vec<AutomatonItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutomatonItem {
    Extendable,
    JavaPackage(Vec<String>),
    Variable { name: String, var_type: SemanticType },
    States(Vec<String>),
    FinishState(String),
    Shift {
        from: String,
        to: String,
        functions: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunDeclSyntax {
    pub entity: Option<SemanticType>,
    pub name: String,
    pub args: Vec<FunctionArgument>,
    pub requires: Option<ConjunctionNode>,
    pub ensures: Option<ConjunctionNode>,
    pub return_value: Option<ReturnTypeDecl>,
    pub properties: Vec<FunProperty>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunProperty {
    Action(ActionDecl),
    Static(Option<String>),
    Property(PropertyDecl),
    Assignment(VariableAssignment),
}
