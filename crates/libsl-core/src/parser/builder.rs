//! IR builder: folds declaration syntax into IR nodes
//!
//! Ownership rule for functions:
//! - an explicit type before the name owns the function (`ExplicitBeforeName`);
//! - otherwise exactly one argument must carry `@handle`, and its type owns
//!   the function (`ViaHandleAnnotation`).

use tracing::trace;

use crate::ir::{
    Automaton, AutomatonStatement, ContractsInfo, FunctionArgument, FunctionDecl,
    FunctionEntityDecl, FunctionEntityDeclStyle, JavaPackageDecl, ShiftDecl, StateDecl,
    StaticDecl,
};
use crate::parser::syntax::{AutomatonItem, AutomatonSyntax, FunDeclSyntax, FunProperty};
use crate::{Error, Result};

pub const HANDLE_ANNOTATION: &str = "handle";

/// Non-final states come first in declaration order, then the final ones.
pub fn build_automaton(syntax: AutomatonSyntax) -> Result<Automaton> {
    let mut automaton = Automaton::empty(syntax.name);
    let mut finish_states = Vec::new();

    for item in syntax.items {
        match item {
            AutomatonItem::Extendable => automaton.extendable = true,
            AutomatonItem::JavaPackage(parts) => {
                if automaton.java_package.is_some() {
                    return Err(Error::ParseError(format!(
                        "Duplicate javapackage in automaton {} at {}",
                        automaton.name, syntax.span
                    )));
                }
                automaton.java_package = Some(JavaPackageDecl {
                    name: parts.join("."),
                });
            }
            AutomatonItem::Variable { name, var_type } => automaton
                .statements
                .push(AutomatonStatement::Variable { name, var_type }),
            AutomatonItem::States(names) => automaton
                .states
                .extend(names.into_iter().map(|n| StateDecl::new(n, false))),
            AutomatonItem::FinishState(name) => finish_states.push(StateDecl::new(name, true)),
            AutomatonItem::Shift {
                from,
                to,
                functions,
            } => automaton.shifts.push(ShiftDecl {
                from,
                to,
                functions,
            }),
        }
    }

    automaton.states.extend(finish_states);
    trace!(automaton = %automaton.name, states = automaton.states.len(), "built automaton");
    Ok(automaton)
}

pub fn build_function(syntax: FunDeclSyntax) -> Result<FunctionDecl> {
    let entity = find_function_entity(syntax.entity, &syntax.name, &syntax.args)?;

    let mut actions = Vec::new();
    let mut static_name = None;
    let mut properties = Vec::new();
    let mut variable_assignments = Vec::new();

    for property in syntax.properties {
        match property {
            FunProperty::Action(action) => actions.push(action),
            FunProperty::Static(name) => {
                if static_name.is_some() {
                    return Err(Error::ParseError(format!(
                        "Duplicate static declaration in function {} at {}",
                        syntax.name, syntax.span
                    )));
                }
                static_name = Some(StaticDecl {
                    static_name: name.unwrap_or_default(),
                });
            }
            FunProperty::Property(p) => properties.push(p),
            FunProperty::Assignment(a) => variable_assignments.push(a),
        }
    }

    Ok(FunctionDecl {
        entity,
        name: syntax.name,
        args: syntax.args,
        actions,
        return_value: syntax.return_value,
        static_name,
        properties,
        variable_assignments,
        contracts: ContractsInfo {
            requires: syntax.requires,
            ensures: syntax.ensures,
        },
        builtin: false,
    })
}

fn find_function_entity(
    explicit: Option<crate::types::SemanticType>,
    function: &str,
    args: &[FunctionArgument],
) -> Result<FunctionEntityDecl> {
    if let Some(entity_type) = explicit {
        return Ok(FunctionEntityDecl {
            entity_type,
            style: FunctionEntityDeclStyle::ExplicitBeforeName,
        });
    }

    let handles: Vec<&FunctionArgument> = args
        .iter()
        .filter(|a| a.has_annotation(HANDLE_ANNOTATION))
        .collect();

    match handles.as_slice() {
        [handle] => Ok(FunctionEntityDecl {
            entity_type: handle.arg_type.clone(),
            style: FunctionEntityDeclStyle::ViaHandleAnnotation,
        }),
        [] => Err(Error::MissingHandle {
            function: function.to_string(),
        }),
        many => Err(Error::AmbiguousHandle {
            function: function.to_string(),
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ActionDecl;
    use crate::parser::tokenizer::Span;
    use crate::types::SemanticType;

    fn span() -> Span {
        Span {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    fn arg(name: &str, ty: &str, annotations: &[&str]) -> FunctionArgument {
        FunctionArgument {
            name: name.into(),
            arg_type: SemanticType::simple(ty),
            annotations: annotations.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn fun(entity: Option<&str>, args: Vec<FunctionArgument>) -> FunDeclSyntax {
        FunDeclSyntax {
            entity: entity.map(SemanticType::simple),
            name: "f".into(),
            args,
            requires: None,
            ensures: None,
            return_value: None,
            properties: Vec::new(),
            span: span(),
        }
    }

    #[test]
    fn test_states_non_final_then_final() {
        let syntax = AutomatonSyntax {
            name: SemanticType::simple("A"),
            items: vec![
                AutomatonItem::FinishState("F".into()),
                AutomatonItem::States(vec!["S1".into()]),
                AutomatonItem::States(vec!["S2".into()]),
            ],
            span: span(),
        };
        let automaton = build_automaton(syntax).unwrap();
        let names: Vec<_> = automaton.states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S2", "F"]);
        assert!(automaton.states[2].is_finish);
    }

    #[test]
    fn test_duplicate_javapackage_rejected() {
        let syntax = AutomatonSyntax {
            name: SemanticType::simple("A"),
            items: vec![
                AutomatonItem::JavaPackage(vec!["a".into()]),
                AutomatonItem::JavaPackage(vec!["b".into()]),
            ],
            span: span(),
        };
        assert!(matches!(build_automaton(syntax), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_explicit_entity_wins_over_handle() {
        let f = build_function(fun(Some("Owner"), vec![arg("h", "Other", &["handle"])])).unwrap();
        assert_eq!(f.entity.entity_type, SemanticType::simple("Owner"));
        assert_eq!(f.entity.style, FunctionEntityDeclStyle::ExplicitBeforeName);
    }

    #[test]
    fn test_handle_annotation_determines_entity() {
        let f = build_function(fun(
            None,
            vec![arg("x", "Int", &[]), arg("h", "Socket", &["nonnull", "handle"])],
        ))
        .unwrap();
        assert_eq!(f.entity.entity_type, SemanticType::simple("Socket"));
        assert_eq!(f.entity.style, FunctionEntityDeclStyle::ViaHandleAnnotation);
    }

    #[test]
    fn test_missing_handle_is_error() {
        let err = build_function(fun(None, vec![arg("x", "Int", &[])])).unwrap_err();
        assert_eq!(err, Error::MissingHandle { function: "f".into() });
    }

    #[test]
    fn test_ambiguous_handle_is_error() {
        let err = build_function(fun(
            None,
            vec![arg("a", "A", &["handle"]), arg("b", "B", &["handle"])],
        ))
        .unwrap_err();
        assert_eq!(
            err,
            Error::AmbiguousHandle {
                function: "f".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_properties_partitioned() {
        let mut syntax = fun(Some("A"), vec![]);
        syntax.properties = vec![
            FunProperty::Action(ActionDecl {
                name: "OPEN".into(),
                args: vec![],
            }),
            FunProperty::Static(None),
        ];
        let f = build_function(syntax).unwrap();
        assert_eq!(f.actions.len(), 1);
        assert_eq!(f.static_name.unwrap().static_name, "");
    }

    #[test]
    fn test_duplicate_static_rejected() {
        let mut syntax = fun(Some("A"), vec![]);
        syntax.properties = vec![
            FunProperty::Static(Some("a".into())),
            FunProperty::Static(Some("b".into())),
        ];
        assert!(matches!(build_function(syntax), Err(Error::ParseError(_))));
    }
}
