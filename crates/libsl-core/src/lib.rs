//! LibSL Core - front end for the LibSL library specification language
//!
//! Parses LibSL text into a typed IR, completes the IR with derived
//! declarations, and prints it back in canonical form.
//!
//! # Architecture
//!
//! ```text
//! LibSL Text → Tokenizer → Parser → Builder → LibraryDecl
//!                                                 ↓
//!                                Completion passes (fixed order)
//!                                                 ↓
//!                                  Printer → canonical text / semantic hash
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces an identical IR
//! - **All-or-nothing**: any error aborts the call; no partial IR
//! - **Pure completion**: passes return new values and never mutate input
//! - **Round trip**: `print(parse(text)) == text` for canonical text
//!
//! # Example
//!
//! ```
//! use libsl_core::{parse, print};
//!
//! let text = "library test;\n\ntypes {\n    A (B);\n}\n\nautomaton Test {\n}\n";
//! let library = parse(text).unwrap();
//! assert_eq!(print(&library), text);
//! ```

pub mod error;
pub mod ir;
pub mod normalizer;
pub mod parser;
pub mod printer;
pub mod types;

pub use error::{Error, Result};
pub use ir::{resolve_include, LibraryDecl};
pub use normalizer::{Completion, CompletionConfig, ConversionRules};
pub use parser::{parse, parse_bytes, parse_reader};
pub use printer::{print, semantic_hash};
pub use types::{CodeType, SemanticType, TypeDecl, TypeTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
