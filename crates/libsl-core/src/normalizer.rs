//! Completion passes: derive the final IR from a freshly built one
//!
//! Every pass is a pure function `&LibraryDecl → LibraryDecl`. Passes are
//! order-sensitive, so the only way to run more than one is `Completion`,
//! which fixes the order:
//!
//! ```text
//! associate → complex types? → array types? → handlers → default states → missing automata
//! ```
//!
//! # Guarantees
//!
//! - **Pure**: the input library is never modified
//! - **Deterministic**: declaration order in, declaration order out
//! - **Guarded**: re-running on completed output adds no types, functions,
//!   states or automata

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ir::{Automaton, FunctionDecl, LibraryDecl, StateDecl};
use crate::types::{CodeType, SemanticType, TypeDecl, TypeTable};
use crate::{Error, Result};

/// States every automaton ends up with, in order
pub const DEFAULT_STATES: [(&str, bool); 3] =
    [("Created", false), ("Constructed", false), ("Closed", true)];

/// Prefixes of the builtin functions generated for array and pointer types
pub const HANDLER_PREFIXES: [&str; 3] = ["set", "get", "mem_alloc"];

/// Marks where the inner code type goes in a conversion template
pub const PLACEHOLDER: &str = "{}";

pub fn default_states() -> Vec<StateDecl> {
    DEFAULT_STATES
        .iter()
        .map(|&(name, is_finish)| StateDecl::new(name, is_finish))
        .collect()
}

// ── Pass contract ──────────────────────────────────────────

/// Parts of a `LibraryDecl` a pass may read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrField {
    Automata,
    AutomatonStates,
    AssociatedFunctions,
    Types,
    Functions,
}

pub trait Pass {
    const NAME: &'static str;
    const READS: &'static [IrField];
    const WRITES: &'static [IrField];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl>;
}

pub struct AssociateAutomataWithFunctions;

impl Pass for AssociateAutomataWithFunctions {
    const NAME: &'static str = "associate_automata_with_functions";
    const READS: &'static [IrField] = &[IrField::Automata, IrField::Functions];
    const WRITES: &'static [IrField] = &[IrField::AssociatedFunctions];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        Ok(library.associate_automata_with_functions())
    }
}

pub struct AddComplexTypesDecls<'a> {
    pub rules: &'a ConversionRules,
}

impl Pass for AddComplexTypesDecls<'_> {
    const NAME: &'static str = "add_complex_types_decls";
    const READS: &'static [IrField] = &[IrField::Functions, IrField::Types, IrField::Automata];
    const WRITES: &'static [IrField] = &[IrField::Types, IrField::Automata];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        library.add_complex_types_decls(self.rules)
    }
}

pub struct AddArrayTypeDecls<F> {
    pub convert: F,
}

impl<F> Pass for AddArrayTypeDecls<F>
where
    F: Fn(&CodeType) -> CodeType,
{
    const NAME: &'static str = "add_array_type_decls";
    const READS: &'static [IrField] = &[IrField::Functions, IrField::Types];
    const WRITES: &'static [IrField] = &[IrField::Types];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        library.add_array_type_decls(&self.convert)
    }
}

pub struct GenerateHandlersForArrayAndPointerTypes;

impl Pass for GenerateHandlersForArrayAndPointerTypes {
    const NAME: &'static str = "generate_handlers_for_array_and_pointer_types";
    const READS: &'static [IrField] = &[IrField::Types, IrField::Functions];
    const WRITES: &'static [IrField] = &[IrField::Functions];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        Ok(library.generate_handlers_for_array_and_pointer_types())
    }
}

pub struct AddDefaultStates;

impl Pass for AddDefaultStates {
    const NAME: &'static str = "add_default_states";
    const READS: &'static [IrField] = &[IrField::AutomatonStates];
    const WRITES: &'static [IrField] = &[IrField::AutomatonStates];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        Ok(library.add_default_states())
    }
}

pub struct AddMissingAutomata;

impl Pass for AddMissingAutomata {
    const NAME: &'static str = "add_missing_automata";
    const READS: &'static [IrField] = &[IrField::Functions, IrField::Automata];
    const WRITES: &'static [IrField] = &[IrField::Automata];

    fn apply(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        Ok(library.add_missing_automata())
    }
}

// ── Conversion rules ───────────────────────────────────────

/// Enclosing type name → code type template, e.g. `"List" → "java.util.List<{}>"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionRules(BTreeMap<String, String>);

impl ConversionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, enclosing: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(enclosing, template);
        self
    }

    pub fn insert(&mut self, enclosing: impl Into<String>, template: impl Into<String>) {
        self.0.insert(enclosing.into(), template.into());
    }

    pub fn rule(&self, enclosing: &str) -> Option<&str> {
        self.0.get(enclosing).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the code type of `semantic_type`.
    ///
    /// Complex types apply the rule of their enclosing type to the rendered
    /// inner type; simple types are looked up in `table`.
    ///
    /// # Errors
    /// `MissingConversionRule` when an enclosing type has no rule,
    /// `MissingTypeDecl` when a leaf type is not declared.
    pub fn render(&self, semantic_type: &SemanticType, table: &TypeTable) -> Result<CodeType> {
        match semantic_type {
            SemanticType::Simple { .. } => Ok(table.get(semantic_type)?.code_type.clone()),
            SemanticType::Complex {
                enclosing, inner, ..
            } => {
                let template = self
                    .rule(enclosing.type_name())
                    .ok_or_else(|| Error::MissingConversionRule(enclosing.type_name().to_string()))?;
                let inner_code = self.render(inner, table)?;
                Ok(CodeType::new(template.replacen(
                    PLACEHOLDER,
                    inner_code.type_name(),
                    1,
                )))
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ConversionRules
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ConversionRules(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// `{}` in `template` replaced by the item code type: `"{}[]"` gives `int[]`
pub fn template_conversion(template: impl Into<String>) -> impl Fn(&CodeType) -> CodeType {
    let template = template.into();
    move |item: &CodeType| CodeType::new(template.replacen(PLACEHOLDER, item.type_name(), 1))
}

// ── Passes ─────────────────────────────────────────────────

impl LibraryDecl {
    /// Each automaton owns the functions whose entity type equals its name
    pub fn associate_automata_with_functions(&self) -> LibraryDecl {
        let mut library = self.clone();
        for automaton in &mut library.automata {
            automaton.associated_functions = self
                .functions
                .iter()
                .filter(|f| f.entity.entity_type == automaton.name)
                .cloned()
                .collect();
        }
        library
    }

    /// Declare every complex type used in a signature, plus a home automaton
    /// for each new declaration
    pub fn add_complex_types_decls(&self, rules: &ConversionRules) -> Result<LibraryDecl> {
        let mut library = self.clone();
        let mut pending: Vec<&SemanticType> = Vec::new();
        for ty in self.functions.iter().flat_map(|f| f.signature_types()) {
            if ty.is_complex() && !self.types.contains(ty) && !pending.contains(&ty) {
                pending.push(ty);
            }
        }

        for ty in pending {
            let code_type = rules.render(ty, &library.types)?;
            debug!(semantic = %ty, code = %code_type, "declared complex type");
            library.types.push(TypeDecl::new(ty.clone(), code_type));
            if library.automaton(ty).is_none() {
                library.automata.push(Automaton::empty(ty.clone()));
            }
        }
        Ok(library)
    }

    /// Declare array types used by arguments, deriving each code type from
    /// the item's code type
    pub fn add_array_type_decls<F>(&self, convert: F) -> Result<LibraryDecl>
    where
        F: Fn(&CodeType) -> CodeType,
    {
        let mut library = self.clone();
        for array_type in self.array_types_from_function_args() {
            if library.types.contains(&array_type) {
                continue;
            }
            let Some(item_type) = array_type.inner_type() else {
                continue;
            };
            let code_type = convert(&library.types.get(item_type)?.code_type);
            library.types.push(TypeDecl::new(array_type, code_type));
        }
        Ok(library)
    }

    /// `set<C>`, `get<C>` and `mem_alloc<C>` for every array or pointer
    /// declaration, `C` being that declaration's code type
    pub fn generate_handlers_for_array_and_pointer_types(&self) -> LibraryDecl {
        let mut library = self.clone();
        let mut seen = HashSet::new();
        for decl in self.types.iter() {
            let ty = &decl.semantic_type;
            if !(ty.is_array() || ty.is_pointer()) || !seen.insert(ty) {
                continue;
            }
            for prefix in HANDLER_PREFIXES {
                let name = format!("{}<{}>", prefix, decl.code_type.type_name());
                let exists = library
                    .functions
                    .iter()
                    .any(|f| &f.entity.entity_type == ty && f.name == name);
                if !exists {
                    library.functions.push(FunctionDecl::builtin(ty.clone(), name));
                }
            }
        }
        library
    }

    /// Append the default states to every automaton; a declared state wins
    /// over a default with the same name
    pub fn add_default_states(&self) -> LibraryDecl {
        let mut library = self.clone();
        for automaton in &mut library.automata {
            let mut names = HashSet::new();
            automaton.states = automaton
                .states
                .iter()
                .cloned()
                .chain(default_states())
                .filter(|s| names.insert(s.name.clone()))
                .collect();
        }
        library
    }

    /// One automaton with the default states for every entity type that
    /// has none
    pub fn add_missing_automata(&self) -> LibraryDecl {
        let mut library = self.clone();
        for function in &self.functions {
            let entity = &function.entity.entity_type;
            if library.automaton(entity).is_none() {
                debug!(entity = %entity, "synthesized automaton");
                let mut automaton = Automaton::empty(entity.clone());
                automaton.states = default_states();
                library.automata.push(automaton);
            }
        }
        library
    }
}

// ── Pipeline ───────────────────────────────────────────────

type ArrayConversion = Box<dyn Fn(&CodeType) -> CodeType>;

/// Ordered completion pipeline
///
/// # Example
/// ```
/// use libsl_core::normalizer::{template_conversion, Completion};
///
/// let lib = libsl_core::parse("library l; types { Int (int); } Int sum(xs: Int[]) {}").unwrap();
/// let done = Completion::new()
///     .array_types(template_conversion("{}[]"))
///     .run(&lib)
///     .unwrap();
/// assert!(done.function("get<int[]>").is_some());
/// ```
#[derive(Default)]
pub struct Completion {
    complex_rules: Option<ConversionRules>,
    array_conversion: Option<ArrayConversion>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `add_complex_types_decls` with these rules
    pub fn complex_types(mut self, rules: ConversionRules) -> Self {
        self.complex_rules = Some(rules);
        self
    }

    /// Enable `add_array_type_decls` with this item → array converter
    pub fn array_types<F>(mut self, convert: F) -> Self
    where
        F: Fn(&CodeType) -> CodeType + 'static,
    {
        self.array_conversion = Some(Box::new(convert));
        self
    }

    /// Names of the passes `run` will apply, in order
    pub fn steps(&self) -> Vec<&'static str> {
        let mut steps = vec![AssociateAutomataWithFunctions::NAME];
        if self.complex_rules.is_some() {
            steps.push(AddComplexTypesDecls::NAME);
        }
        if self.array_conversion.is_some() {
            steps.push(<AddArrayTypeDecls<ArrayConversion>>::NAME);
        }
        steps.extend([
            GenerateHandlersForArrayAndPointerTypes::NAME,
            AddDefaultStates::NAME,
            AddMissingAutomata::NAME,
        ]);
        steps
    }

    pub fn run(&self, library: &LibraryDecl) -> Result<LibraryDecl> {
        let mut current = apply_pass(&AssociateAutomataWithFunctions, library)?;
        if let Some(rules) = &self.complex_rules {
            current = apply_pass(&AddComplexTypesDecls { rules }, &current)?;
        }
        if let Some(convert) = &self.array_conversion {
            current = apply_pass(
                &AddArrayTypeDecls {
                    convert: convert.as_ref(),
                },
                &current,
            )?;
        }
        current = apply_pass(&GenerateHandlersForArrayAndPointerTypes, &current)?;
        current = apply_pass(&AddDefaultStates, &current)?;
        apply_pass(&AddMissingAutomata, &current)
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("complex_rules", &self.complex_rules)
            .field("array_conversion", &self.array_conversion.is_some())
            .finish()
    }
}

fn apply_pass<P: Pass>(pass: &P, library: &LibraryDecl) -> Result<LibraryDecl> {
    let out = pass.apply(library)?;
    debug!(
        pass = P::NAME,
        reads = ?P::READS,
        writes = ?P::WRITES,
        types = out.types.len(),
        automata = out.automata.len(),
        functions = out.functions.len(),
        "completion pass"
    );
    Ok(out)
}

// ── Configuration ──────────────────────────────────────────

/// File form of a `Completion`
///
/// ```json
/// { "complex_types": { "List": "java.util.List<{}>" }, "array_template": "{}[]" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    pub complex_types: Option<ConversionRules>,
    pub array_template: Option<String>,
}

impl CompletionConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn into_completion(self) -> Completion {
        let mut completion = Completion::new();
        if let Some(rules) = self.complex_types {
            completion = completion.complex_types(rules);
        }
        if let Some(template) = self.array_template {
            completion = completion.array_types(template_conversion(template));
        }
        completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FunctionEntityDeclStyle;
    use crate::parser::parse;

    fn lib(src: &str) -> LibraryDecl {
        parse(src).unwrap()
    }

    fn state_names(automaton: &Automaton) -> Vec<(&str, bool)> {
        automaton
            .states
            .iter()
            .map(|s| (s.name.as_str(), s.is_finish))
            .collect()
    }

    const ARRAYS: &str = r#"library arrays;
types {
    Int (int);
    Buf (buffer);
}
automaton Buf {
}
Buf fill(data: Int[], count: Int) {
}
Buf peek(): Int {
}
"#;

    // ── Individual passes ──────────────────────────────

    #[test]
    fn test_associate_automata_with_functions() {
        let input = lib(
            "library l; types {} automaton A {} automaton B {} A f() {} B g() {} A h() {}",
        );
        let out = input.associate_automata_with_functions();
        let names = |i: usize| -> Vec<&str> {
            out.automata[i]
                .associated_functions
                .iter()
                .map(|f| f.name.as_str())
                .collect()
        };
        assert_eq!(names(0), vec!["f", "h"]);
        assert_eq!(names(1), vec!["g"]);
        assert!(input.automata[0].associated_functions.is_empty());
    }

    #[test]
    fn test_associate_is_structural() {
        let input = lib("library l; types {} automaton List Int {} List Int size() {}");
        let out = input.associate_automata_with_functions();
        assert_eq!(out.automata[0].associated_functions.len(), 1);
    }

    #[test]
    fn test_default_state_merge() {
        let input = lib("library l; types {} automaton A { states S1, S2; finishstate F; }");
        let parsed = &input.automata[0];
        assert_eq!(parsed.states.iter().filter(|s| !s.is_finish).count(), 2);
        let finals: Vec<_> = parsed.states.iter().filter(|s| s.is_finish).collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].name, "F");

        let out = input.add_default_states();
        assert_eq!(
            state_names(&out.automata[0]),
            vec![
                ("S1", false),
                ("S2", false),
                ("F", true),
                ("Created", false),
                ("Constructed", false),
                ("Closed", true)
            ]
        );
    }

    #[test]
    fn test_declared_state_wins_over_default() {
        let input = lib("library l; types {} automaton A { states Closed; finishstate Created; }");
        let out = input.add_default_states();
        assert_eq!(
            state_names(&out.automata[0]),
            vec![("Closed", false), ("Created", true), ("Constructed", false)]
        );
    }

    #[test]
    fn test_missing_automaton_synthesis() {
        let input = lib("library l; types {} automaton A {} B open() {} B close() {} A f() {}");
        let out = input.add_missing_automata();
        assert_eq!(out.automata.len(), 2);
        let synthesized = &out.automata[1];
        assert_eq!(synthesized.name, SemanticType::simple("B"));
        assert_eq!(
            state_names(synthesized),
            vec![("Created", false), ("Constructed", false), ("Closed", true)]
        );
        assert!(synthesized.shifts.is_empty());
        assert!(!synthesized.extendable);
    }

    #[test]
    fn test_builtin_handler_synthesis() {
        let input = lib(ARRAYS)
            .add_array_type_decls(template_conversion("{}[]"))
            .unwrap();
        let array = SemanticType::array(SemanticType::simple("Int"));
        assert_eq!(input.types.get(&array).unwrap().code_type.type_name(), "int[]");

        let out = input.generate_handlers_for_array_and_pointer_types();
        let builtins: Vec<&FunctionDecl> = out.functions.iter().filter(|f| f.builtin).collect();
        let names: Vec<&str> = builtins.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["set<int[]>", "get<int[]>", "mem_alloc<int[]>"]);
        for f in builtins {
            assert!(f.args.is_empty());
            assert_eq!(f.entity.entity_type, array);
            assert_eq!(f.entity.style, FunctionEntityDeclStyle::ExplicitBeforeName);
        }
    }

    #[test]
    fn test_pointer_handlers() {
        let input = lib("library l; types { Int (int); Int* (int*); }");
        let out = input.generate_handlers_for_array_and_pointer_types();
        assert!(out.function("mem_alloc<int*>").is_some());
        assert_eq!(out.functions.len(), 3);
    }

    #[test]
    fn test_handlers_not_duplicated() {
        let input = lib("library l; types { Int[] (int[]); }");
        let once = input.generate_handlers_for_array_and_pointer_types();
        let twice = once.generate_handlers_for_array_and_pointer_types();
        assert_eq!(once.functions.len(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_array_decls_need_item_decl() {
        let input = lib("library l; types {} automaton A {} A f(xs: Byte[]) {}");
        let err = input
            .add_array_type_decls(template_conversion("{}[]"))
            .unwrap_err();
        assert_eq!(err, Error::MissingTypeDecl("Byte".into()));
    }

    #[test]
    fn test_array_decls_only_from_arguments() {
        let out = lib(ARRAYS)
            .add_array_type_decls(template_conversion("Array<{}>"))
            .unwrap();
        assert_eq!(out.types.len(), 3);
        assert_eq!(out.types.as_slice()[2].code_type.type_name(), "Array<int>");
        assert_eq!(out.automata.len(), 1);
    }

    #[test]
    fn test_complex_types_rendered_recursively() {
        let input = lib(r#"library l;
types {
    Int (Integer);
}
automaton Store {
}
Store put(xs: List Int): List List Int {
}
"#);
        let rules = ConversionRules::new().with_rule("List", "java.util.List<{}>");
        let out = input.add_complex_types_decls(&rules).unwrap();

        let codes: Vec<&str> = out.types.iter().map(|d| d.code_type.type_name()).collect();
        assert_eq!(
            codes,
            vec![
                "Integer",
                "java.util.List<Integer>",
                "java.util.List<java.util.List<Integer>>"
            ]
        );
        let automata: Vec<String> = out.automata.iter().map(|a| a.name.to_string()).collect();
        assert_eq!(automata, vec!["Store", "List Int", "List List Int"]);
        assert!(out.automata[1].states.is_empty());
    }

    #[test]
    fn test_complex_types_missing_rule() {
        let input = lib("library l; types { Int (int); } automaton A {} A f(m: Map Int) {}");
        let err = input
            .add_complex_types_decls(&ConversionRules::new())
            .unwrap_err();
        assert_eq!(err, Error::MissingConversionRule("Map".into()));
    }

    #[test]
    fn test_complex_types_missing_leaf() {
        let input = lib("library l; types {} automaton A {} A f(m: Map Key) {}");
        let rules: ConversionRules = [("Map", "Map<{}>")].into_iter().collect();
        let err = input.add_complex_types_decls(&rules).unwrap_err();
        assert_eq!(err, Error::MissingTypeDecl("Key".into()));
    }

    #[test]
    fn test_complex_types_skip_declared() {
        let input = lib("library l; types { Int (int); List Int (IntList); } automaton A {} A f(l: List Int) {}");
        let out = input
            .add_complex_types_decls(&ConversionRules::new())
            .unwrap();
        assert_eq!(out, input);
    }

    // ── Pipeline ───────────────────────────────────────

    #[test]
    fn test_pipeline_steps_order() {
        assert_eq!(
            Completion::new().steps(),
            vec![
                "associate_automata_with_functions",
                "generate_handlers_for_array_and_pointer_types",
                "add_default_states",
                "add_missing_automata"
            ]
        );
        let full = Completion::new()
            .complex_types(ConversionRules::new())
            .array_types(template_conversion("{}[]"));
        assert_eq!(full.steps().len(), 6);
        assert_eq!(full.steps()[1], "add_complex_types_decls");
        assert_eq!(full.steps()[2], "add_array_type_decls");
    }

    #[test]
    fn test_pipeline_array_types_get_home_automaton() {
        let input = lib(ARRAYS);
        let out = Completion::new()
            .array_types(template_conversion("{}[]"))
            .run(&input)
            .unwrap();

        let array = SemanticType::array(SemanticType::simple("Int"));
        let home = out.automaton(&array).unwrap();
        assert_eq!(home.states.len(), 3);
        assert_eq!(out.automaton(&SemanticType::simple("Buf")).unwrap().states.len(), 3);
        assert_eq!(out.functions.iter().filter(|f| f.builtin).count(), 3);
        // declared automata are associated before handlers exist
        assert_eq!(out.automata[0].associated_functions.len(), 2);
    }

    #[test]
    fn test_pipeline_does_not_mutate_input() {
        let input = lib(ARRAYS);
        let snapshot = input.clone();
        let _ = Completion::new()
            .array_types(template_conversion("{}[]"))
            .run(&input)
            .unwrap();
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_pipeline_rerun_adds_nothing() {
        let completion = Completion::new()
            .complex_types(
                ConversionRules::new()
                    .with_rule("List", "List<{}>")
                    .with_rule("[]", "{}[]"),
            )
            .array_types(template_conversion("{}[]"));
        let src = format!("{}all(@handle b: Buf, l: List Int): List Int {{\n}}\n", ARRAYS);
        let once = completion.run(&lib(&src)).unwrap();
        let twice = completion.run(&once).unwrap();

        assert_eq!(once.types, twice.types);
        assert_eq!(once.functions, twice.functions);
        let names = |l: &LibraryDecl| -> Vec<(String, usize)> {
            l.automata
                .iter()
                .map(|a| (a.name.to_string(), a.states.len()))
                .collect()
        };
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_pipeline_propagates_errors() {
        let input = lib("library l; types {} automaton A {} A f(l: Set Int) {}");
        let err = Completion::new()
            .complex_types(ConversionRules::new())
            .run(&input)
            .unwrap_err();
        assert!(matches!(err, Error::MissingConversionRule(_)));
    }

    // ── Configuration ──────────────────────────────────

    #[test]
    fn test_config_from_json() {
        let config = CompletionConfig::from_json(
            r#"{"complex_types": {"List": "java.util.List<{}>"}, "array_template": "{}[]"}"#,
        )
        .unwrap();
        assert_eq!(
            config.complex_types.as_ref().unwrap().rule("List"),
            Some("java.util.List<{}>")
        );
        let completion = config.into_completion();
        assert_eq!(completion.steps().len(), 6);
    }

    #[test]
    fn test_config_defaults_and_unknown_fields() {
        let empty = CompletionConfig::from_json("{}").unwrap();
        assert_eq!(empty, CompletionConfig::default());
        assert_eq!(empty.into_completion().steps().len(), 4);
        assert!(CompletionConfig::from_json(r#"{"arrays": "{}[]"}"#).is_err());
    }
}
