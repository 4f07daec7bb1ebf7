//! LibSL intermediate representation
//!
//! `LibraryDecl` is the unit threaded through the whole pipeline. It is
//! built once by the parser and never mutated afterwards: completion passes
//! return fresh copies.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::ast::ConjunctionNode;
use crate::types::{filter_array_types, SemanticType, TypeTable};

/// Extension appended to include names when resolving them to files
pub const INCLUDE_EXTENSION: &str = "lsl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDecl {
    pub name: String,
    pub imports: Vec<String>,
    pub includes: Vec<String>,
    pub automata: Vec<Automaton>,
    pub types: TypeTable,
    pub converters: Vec<Converter>,
    pub functions: Vec<FunctionDecl>,
}

impl LibraryDecl {
    /// Paths of every include, resolved against `includes_dir`. Nothing is read.
    pub fn include_paths(&self, includes_dir: &Path) -> Vec<PathBuf> {
        self.includes
            .iter()
            .map(|name| resolve_include(name, includes_dir))
            .collect()
    }

    /// Distinct array types used by function arguments
    pub fn array_types_from_function_args(&self) -> Vec<SemanticType> {
        filter_array_types(
            self.functions
                .iter()
                .flat_map(|f| f.args.iter().map(|a| &a.arg_type)),
        )
    }

    pub fn automaton(&self, name: &SemanticType) -> Option<&Automaton> {
        self.automata.iter().find(|a| &a.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// `includes_dir / (name + ".lsl")`
pub fn resolve_include(name: &str, includes_dir: &Path) -> PathBuf {
    includes_dir.join(format!("{}.{}", name, INCLUDE_EXTENSION))
}

// ── Automata ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automaton {
    pub name: SemanticType,
    pub java_package: Option<JavaPackageDecl>,
    pub states: Vec<StateDecl>,
    pub shifts: Vec<ShiftDecl>,
    pub extendable: bool,
    pub statements: Vec<AutomatonStatement>,
    /// Functions owned by this automaton; filled in by completion
    pub associated_functions: Vec<FunctionDecl>,
}

impl Automaton {
    /// An automaton with nothing declared but its name
    pub fn empty(name: SemanticType) -> Self {
        Automaton {
            name,
            java_package: None,
            states: Vec::new(),
            shifts: Vec::new(),
            extendable: false,
            statements: Vec::new(),
            associated_functions: Vec::new(),
        }
    }

    pub fn state(&self, name: &str) -> Option<&StateDecl> {
        self.states.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaPackageDecl {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDecl {
    pub name: String,
    pub is_finish: bool,
}

impl StateDecl {
    pub fn new(name: impl Into<String>, is_finish: bool) -> Self {
        StateDecl {
            name: name.into(),
            is_finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDecl {
    pub from: String,
    pub to: String,
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutomatonStatement {
    Variable { name: String, var_type: SemanticType },
}

// ── Converters ────────────────────────────────────────────

/// Verbatim conversion expression for an entity; not parsed further
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Converter {
    pub entity: SemanticType,
    pub expression: String,
}

// ── Functions ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub entity: FunctionEntityDecl,
    pub name: String,
    pub args: Vec<FunctionArgument>,
    pub actions: Vec<ActionDecl>,
    pub return_value: Option<ReturnTypeDecl>,
    pub static_name: Option<StaticDecl>,
    pub properties: Vec<PropertyDecl>,
    pub variable_assignments: Vec<VariableAssignment>,
    pub contracts: ContractsInfo,
    /// Synthesized by completion rather than declared in source
    pub builtin: bool,
}

impl FunctionDecl {
    /// A builtin, argument-less function owned by `entity`
    pub fn builtin(entity: SemanticType, name: impl Into<String>) -> Self {
        FunctionDecl {
            entity: FunctionEntityDecl {
                entity_type: entity,
                style: FunctionEntityDeclStyle::ExplicitBeforeName,
            },
            name: name.into(),
            args: Vec::new(),
            actions: Vec::new(),
            return_value: None,
            static_name: None,
            properties: Vec::new(),
            variable_assignments: Vec::new(),
            contracts: ContractsInfo::default(),
            builtin: true,
        }
    }

    /// Every semantic type the signature mentions: arguments, then return type
    pub fn signature_types(&self) -> impl Iterator<Item = &SemanticType> {
        self.args
            .iter()
            .map(|a| &a.arg_type)
            .chain(self.return_value.iter().map(|r| &r.return_type))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionEntityDecl {
    pub entity_type: SemanticType,
    pub style: FunctionEntityDeclStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionEntityDeclStyle {
    /// `Entity name(...)`
    ExplicitBeforeName,
    /// `name(@handle h: Entity, ...)`
    ViaHandleAnnotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArgument {
    pub name: String,
    pub arg_type: SemanticType,
    pub annotations: Vec<String>,
}

impl FunctionArgument {
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTypeDecl {
    pub return_type: SemanticType,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDecl {
    /// Empty when written as a bare `static;`
    pub static_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub key: String,
    pub value: String,
}

/// `name = new Automaton(args);`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssignment {
    pub name: String,
    pub callee_automaton_name: SemanticType,
    pub callee_arguments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractsInfo {
    pub requires: Option<ConjunctionNode>,
    pub ensures: Option<ConjunctionNode>,
}

impl ContractsInfo {
    pub fn is_empty(&self) -> bool {
        self.requires.is_none() && self.ensures.is_none()
    }
}
