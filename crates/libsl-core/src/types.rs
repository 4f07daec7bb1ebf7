//! Semantic type model
//!
//! A semantic type is LibSL's own notion of a type, independent of the
//! target language. Composite types nest recursively:
//!
//! ```text
//! Int          → Simple("Int")
//! Int[]        → Complex(enclosing = Simple("[]"), inner = Simple("Int"))
//! Handle*      → Complex(enclosing = Simple("*"),  inner = Simple("Handle"))
//! List Int[]   → Complex(enclosing = Simple("List"), inner = Int[])
//! ```
//!
//! Equality and hashing are structural. The display name of a complex type
//! is derived text and never takes part in comparisons.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Semantic types treated as primitives; every other type is a reference type
pub const PRIMITIVE_SEMANTIC_TYPES: [&str; 4] = ["String", "Int", "Char", "Boolean"];

pub const ARRAY_ENCLOSING: &str = "[]";
pub const POINTER_ENCLOSING: &str = "*";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticType {
    Simple {
        name: String,
    },
    Complex {
        type_name: String,
        enclosing: Box<SemanticType>,
        inner: Box<SemanticType>,
    },
}

impl SemanticType {
    pub fn simple(name: impl Into<String>) -> Self {
        SemanticType::Simple { name: name.into() }
    }

    /// `item[]`
    pub fn array(item: SemanticType) -> Self {
        let type_name = format!("{}[]", item.type_name());
        SemanticType::Complex {
            type_name,
            enclosing: Box::new(SemanticType::simple(ARRAY_ENCLOSING)),
            inner: Box::new(item),
        }
    }

    /// `item*`
    pub fn pointer(item: SemanticType) -> Self {
        let type_name = format!("{}*", item.type_name());
        SemanticType::Complex {
            type_name,
            enclosing: Box::new(SemanticType::simple(POINTER_ENCLOSING)),
            inner: Box::new(item),
        }
    }

    /// Two adjacent types: `enclosing inner`
    pub fn generic(enclosing: SemanticType, inner: SemanticType) -> Self {
        let type_name = format!("{} {}", enclosing.type_name(), inner.type_name());
        SemanticType::Complex {
            type_name,
            enclosing: Box::new(enclosing),
            inner: Box::new(inner),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            SemanticType::Simple { name } => name,
            SemanticType::Complex { type_name, .. } => type_name,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, SemanticType::Complex { .. })
    }

    pub fn is_array(&self) -> bool {
        self.enclosing_name() == Some(ARRAY_ENCLOSING)
    }

    pub fn is_pointer(&self) -> bool {
        self.enclosing_name() == Some(POINTER_ENCLOSING)
    }

    pub fn is_reference(&self) -> bool {
        !PRIMITIVE_SEMANTIC_TYPES.contains(&self.type_name())
    }

    pub fn enclosing_type(&self) -> Option<&SemanticType> {
        match self {
            SemanticType::Complex { enclosing, .. } => Some(enclosing),
            SemanticType::Simple { .. } => None,
        }
    }

    pub fn inner_type(&self) -> Option<&SemanticType> {
        match self {
            SemanticType::Complex { inner, .. } => Some(inner),
            SemanticType::Simple { .. } => None,
        }
    }

    fn enclosing_name(&self) -> Option<&str> {
        self.enclosing_type().map(SemanticType::type_name)
    }
}

impl PartialEq for SemanticType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SemanticType::Simple { name: a }, SemanticType::Simple { name: b }) => a == b,
            (
                SemanticType::Complex {
                    enclosing: e1,
                    inner: i1,
                    ..
                },
                SemanticType::Complex {
                    enclosing: e2,
                    inner: i2,
                    ..
                },
            ) => e1 == e2 && i1 == i2,
            _ => false,
        }
    }
}

impl Eq for SemanticType {}

impl Hash for SemanticType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SemanticType::Simple { name } => {
                0u8.hash(state);
                name.hash(state);
            }
            SemanticType::Complex {
                enclosing, inner, ..
            } => {
                1u8.hash(state);
                enclosing.hash(state);
                inner.hash(state);
            }
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Keep only the array types, dropping duplicates while preserving order
pub fn filter_array_types<'a, I>(types: I) -> Vec<SemanticType>
where
    I: IntoIterator<Item = &'a SemanticType>,
{
    let mut arrays: Vec<SemanticType> = Vec::new();
    for ty in types {
        if ty.is_array() && !arrays.contains(ty) {
            arrays.push(ty.clone());
        }
    }
    arrays
}

/// Opaque target-language type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeType(pub String);

impl CodeType {
    pub fn new(name: impl Into<String>) -> Self {
        CodeType(name.into())
    }

    pub fn type_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of the `types` section: semantic type → code type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub semantic_type: SemanticType,
    pub code_type: CodeType,
}

impl TypeDecl {
    pub fn new(semantic_type: SemanticType, code_type: CodeType) -> Self {
        TypeDecl {
            semantic_type,
            code_type,
        }
    }
}

/// Ordered type declarations keyed by structural `SemanticType` equality.
///
/// Duplicate keys are kept in declaration order; lookups return the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TypeDecl>", into = "Vec<TypeDecl>")]
pub struct TypeTable {
    decls: Vec<TypeDecl>,
    first_index: HashMap<SemanticType, usize>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: TypeDecl) {
        self.first_index
            .entry(decl.semantic_type.clone())
            .or_insert(self.decls.len());
        self.decls.push(decl);
    }

    /// First declaration for `semantic_type`, or `MissingTypeDecl`
    pub fn get(&self, semantic_type: &SemanticType) -> Result<&TypeDecl> {
        self.first_index
            .get(semantic_type)
            .map(|&i| &self.decls[i])
            .ok_or_else(|| Error::MissingTypeDecl(semantic_type.type_name().to_string()))
    }

    pub fn contains(&self, semantic_type: &SemanticType) -> bool {
        self.first_index.contains_key(semantic_type)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn as_slice(&self) -> &[TypeDecl] {
        &self.decls
    }

    pub fn first(&self) -> Option<&TypeDecl> {
        self.decls.first()
    }
}

impl PartialEq for TypeTable {
    fn eq(&self, other: &Self) -> bool {
        self.decls == other.decls
    }
}

impl From<Vec<TypeDecl>> for TypeTable {
    fn from(decls: Vec<TypeDecl>) -> Self {
        let mut table = TypeTable::new();
        for decl in decls {
            table.push(decl);
        }
        table
    }
}

impl From<TypeTable> for Vec<TypeDecl> {
    fn from(table: TypeTable) -> Self {
        table.decls
    }
}

impl FromIterator<TypeDecl> for TypeTable {
    fn from_iter<I: IntoIterator<Item = TypeDecl>>(iter: I) -> Self {
        let mut table = TypeTable::new();
        for decl in iter {
            table.push(decl);
        }
        table
    }
}

impl Extend<TypeDecl> for TypeTable {
    fn extend<I: IntoIterator<Item = TypeDecl>>(&mut self, iter: I) {
        for decl in iter {
            self.push(decl);
        }
    }
}

impl<'a> IntoIterator for &'a TypeTable {
    type Item = &'a TypeDecl;
    type IntoIter = std::slice::Iter<'a, TypeDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.decls.iter()
    }
}
