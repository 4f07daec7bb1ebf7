//! Canonical printer: renders a `LibraryDecl` back to LibSL text
//!
//! # Layout
//!
//! - Sections in fixed order: header, imports, includes, types, automata,
//!   converters, functions
//! - A blank line before each group, each automaton and each function
//! - 4-space indentation, `\n` line endings, trailing newline
//! - Builtin functions are skipped; completion regenerates them
//!
//! For canonically formatted input `print(parse(text)) == text` holds byte
//! for byte.

use sha2::{Digest, Sha256};

use crate::ir::{
    Automaton, AutomatonStatement, Converter, FunctionArgument, FunctionDecl,
    FunctionEntityDeclStyle, LibraryDecl,
};
use crate::parser::ast::{
    ArithmeticExpressionNode, ArithmeticOp, ConjunctionNode, DisjunctionNode, EqualityNode,
    ExpressionVisitor, FunctionCallNode, NumberNode, StringNode, TermKind, TermNode,
    VariableNode,
};
use crate::types::TypeTable;

const INDENT: &str = "    ";

// ── Public API ─────────────────────────────────────────────

/// Serialize a library to canonical LibSL text
///
/// Inside an automaton, non-final states come first on one `states` line
/// and final states follow, each on its own `finishstate` line. A library
/// whose states interleave (e.g. after `add_default_states` appends
/// `Created, Constructed, Closed` behind a declared final state) therefore
/// reparses with the same states in grouped order.
pub fn print(library: &LibraryDecl) -> String {
    let mut out = String::new();

    out.push_str(&format!("library {};\n", library.name));

    if !library.imports.is_empty() {
        out.push('\n');
        for import in &library.imports {
            out.push_str(&format!("import {};\n", import));
        }
    }

    if !library.includes.is_empty() {
        out.push('\n');
        for include in &library.includes {
            out.push_str(&format!("include {};\n", include));
        }
    }

    out.push('\n');
    print_types(&mut out, &library.types);

    for automaton in &library.automata {
        out.push('\n');
        print_automaton(&mut out, automaton);
    }

    if !library.converters.is_empty() {
        out.push('\n');
        print_converters(&mut out, &library.converters);
    }

    for function in library.functions.iter().filter(|f| !f.builtin) {
        out.push('\n');
        print_function(&mut out, function);
    }

    out
}

/// Render a contract as it appears after `requires` / `ensures`
pub fn print_contract(contract: &ConjunctionNode) -> String {
    ContractPrinter.visit_conjunction(contract)
}

/// SHA-256 of the canonical text, lowercase hex
///
/// Formatting, comments and builtin functions do not affect the hash.
pub fn semantic_hash(library: &LibraryDecl) -> String {
    let canonical = print(library);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ── Sections ───────────────────────────────────────────────

fn print_types(out: &mut String, types: &TypeTable) {
    out.push_str("types {\n");
    for decl in types.iter() {
        line(out, &format!("{} ({});", decl.semantic_type, decl.code_type));
    }
    out.push_str("}\n");
}

fn print_automaton(out: &mut String, automaton: &Automaton) {
    out.push_str(&format!("automaton {} {{\n", automaton.name));

    if automaton.extendable {
        line(out, "extendable;");
    }
    if let Some(package) = &automaton.java_package {
        line(out, &format!("javapackage {};", package.name));
    }
    for statement in &automaton.statements {
        let AutomatonStatement::Variable { name, var_type } = statement;
        line(out, &format!("var {}: {};", name, var_type));
    }

    let plain: Vec<&str> = automaton
        .states
        .iter()
        .filter(|s| !s.is_finish)
        .map(|s| s.name.as_str())
        .collect();
    if !plain.is_empty() {
        line(out, &format!("states {};", plain.join(", ")));
    }
    for state in automaton.states.iter().filter(|s| s.is_finish) {
        line(out, &format!("finishstate {};", state.name));
    }

    for shift in &automaton.shifts {
        line(
            out,
            &format!(
                "shift {} -> {} ({});",
                shift.from,
                shift.to,
                shift.functions.join(", ")
            ),
        );
    }

    out.push_str("}\n");
}

fn print_converters(out: &mut String, converters: &[Converter]) {
    out.push_str("converters {\n");
    for converter in converters {
        line(
            out,
            &format!("{} <- {};", converter.entity, converter.expression),
        );
    }
    out.push_str("}\n");
}

fn print_function(out: &mut String, function: &FunctionDecl) {
    let mut head = String::new();
    if function.entity.style == FunctionEntityDeclStyle::ExplicitBeforeName {
        head.push_str(&format!("{} ", function.entity.entity_type));
    }
    let args: Vec<String> = function.args.iter().map(print_argument).collect();
    head.push_str(&format!("{}({})", function.name, args.join(", ")));

    if let Some(requires) = &function.contracts.requires {
        head.push_str(&format!(" requires {}", print_contract(requires)));
    }
    if let Some(ensures) = &function.contracts.ensures {
        head.push_str(&format!(" ensures {}", print_contract(ensures)));
    }
    if let Some(ret) = &function.return_value {
        head.push_str(&format!(
            ": {}{}",
            annotations(&ret.annotations),
            ret.return_type
        ));
    }
    out.push_str(&head);
    out.push_str(" {\n");

    for action in &function.actions {
        line(
            out,
            &format!("action {}({});", action.name, action.args.join(", ")),
        );
    }
    if let Some(static_decl) = &function.static_name {
        if static_decl.static_name.is_empty() {
            line(out, "static;");
        } else {
            line(out, &format!("static {};", static_decl.static_name));
        }
    }
    for property in &function.properties {
        line(
            out,
            &format!("property {} = {};", property.key, property.value),
        );
    }
    for assignment in &function.variable_assignments {
        line(
            out,
            &format!(
                "{} = new {}({});",
                assignment.name,
                assignment.callee_automaton_name,
                assignment.callee_arguments.join(", ")
            ),
        );
    }

    out.push_str("}\n");
}

fn print_argument(arg: &FunctionArgument) -> String {
    format!("{}{}: {}", annotations(&arg.annotations), arg.name, arg.arg_type)
}

/// `@a @b ` with a trailing space, or nothing
fn annotations(names: &[String]) -> String {
    names.iter().map(|a| format!("@{} ", a)).collect()
}

fn line(out: &mut String, text: &str) {
    out.push_str(INDENT);
    out.push_str(text);
    out.push('\n');
}

// ── Contracts ──────────────────────────────────────────────

struct ContractPrinter;

impl ExpressionVisitor<String> for ContractPrinter {
    fn visit_conjunction(&mut self, node: &ConjunctionNode) -> String {
        node.disjunctions
            .iter()
            .map(|d| self.visit_disjunction(d))
            .collect::<Vec<_>>()
            .join(" & ")
    }

    fn visit_disjunction(&mut self, node: &DisjunctionNode) -> String {
        let body = node
            .terms
            .iter()
            .map(|t| self.visit_term(t))
            .collect::<Vec<_>>()
            .join(" | ");
        if node.is_inverted {
            format!("!({})", body)
        } else {
            body
        }
    }

    fn visit_term(&mut self, node: &TermNode) -> String {
        let body = match &node.kind {
            TermKind::Equality(eq) => self.visit_equality(eq),
            TermKind::Part(part) => self.visit_part(part),
        };
        if node.is_inverted {
            format!("!{}", body)
        } else {
            body
        }
    }

    fn visit_equality(&mut self, node: &EqualityNode) -> String {
        format!(
            "{} {} {}",
            self.visit_part(&node.left),
            node.sign,
            self.visit_part(&node.right)
        )
    }

    fn visit_boolean_expression(&mut self, node: &ConjunctionNode) -> String {
        format!("({})", self.visit_conjunction(node))
    }

    fn visit_binary(
        &mut self,
        op: ArithmeticOp,
        left: &ArithmeticExpressionNode,
        right: &ArithmeticExpressionNode,
    ) -> String {
        format!(
            "{} {} {}",
            self.visit_arithmetic(left),
            op.text(),
            self.visit_arithmetic(right)
        )
    }

    fn visit_function_call(&mut self, node: &FunctionCallNode) -> String {
        let args: Vec<String> = node.args.iter().map(|a| self.visit_part(a)).collect();
        format!("{}({})", node.name, args.join(", "))
    }

    fn visit_number(&mut self, node: &NumberNode) -> String {
        node.value.to_string()
    }

    fn visit_variable(&mut self, node: &VariableNode) -> String {
        node.name.clone()
    }

    fn visit_string(&mut self, node: &StringNode) -> String {
        let mut out = String::with_capacity(node.value.len() + 2);
        out.push('"');
        for c in node.value.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                other => out.push(other),
            }
        }
        out.push('"');
        out
    }
}
