//! LibSL Parser: tokenizer, syntax, IR builder and recursive descent parser
//!
//! Converts LibSL text into a `LibraryDecl`.
//!
//! ```text
//! start    := 'library' Identifier ';' import* include* types automaton* converters? funDecl*
//! types    := 'types' '{' (semanticType '(' codeType ')' ';')* '}'
//! funDecl  := typeAtom* Identifier '(' args ')' requires? ensures? (':' returnType)? '{' funProperty* '}'
//! semanticType := typeAtom semanticType?
//! typeAtom     := Identifier ('[' ']' | '*')*
//! ```
//!
//! Contract clauses are handled by the sub-parser in `expression`.

pub mod ast;
pub mod builder;
pub mod expression;
pub mod syntax;
pub mod tokenizer;

use std::io::Read;

use tracing::trace;

use crate::ir::{
    ActionDecl, Converter, FunctionArgument, LibraryDecl, PropertyDecl, ReturnTypeDecl,
    VariableAssignment,
};
use crate::types::{CodeType, SemanticType, TypeDecl, TypeTable};
use crate::{Error, Result};

use syntax::{AutomatonItem, AutomatonSyntax, FunDeclSyntax, FunProperty};
use tokenizer::{Span, SpannedToken, Token, Tokenizer};

/// Parse LibSL text into a `LibraryDecl`
///
/// # Guarantees
/// - Deterministic: same input always produces the same IR
/// - All-or-nothing: any syntax or build error aborts the whole parse
///
/// # Errors
/// Returns `ParseError` with line:column for syntax violations, and
/// `MissingHandle`/`AmbiguousHandle` when a function's owner can't be found.
///
/// # Example
/// ```
/// let lib = libsl_core::parse("library test; types {A (B);} automaton Test {}").unwrap();
/// assert_eq!(lib.name, "test");
/// ```
pub fn parse(input: &str) -> Result<LibraryDecl> {
    let tokens = Tokenizer::new(input).tokenize()?;
    trace!(tokens = tokens.len(), "tokenized");
    Parser::new(input, tokens).parse_library()
}

/// Parse LibSL from any reader; the whole stream is read up front
pub fn parse_reader<R: Read>(mut reader: R) -> Result<LibraryDecl> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

/// Parse LibSL from raw bytes, which must be UTF-8
pub fn parse_bytes(bytes: &[u8]) -> Result<LibraryDecl> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidUtf8(e.to_string()))?;
    parse(text)
}

static EOF: Token = Token::Eof;

/// Recursive descent parser over a tokenized LibSL source
pub struct Parser {
    source: Vec<char>,
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str, tokens: Vec<SpannedToken>) -> Self {
        Parser {
            source: source.chars().collect(),
            tokens,
            position: 0,
        }
    }

    // ── Token helpers ──────────────────────────────────────

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.position + offset).min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(index)
            .map(|t| &t.token)
            .unwrap_or(&EOF)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map(|t| t.span.clone())
            .unwrap_or(Span {
                line: 1,
                column: 1,
                offset: 0,
            })
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&self, expected: &str) -> Error {
        Error::ParseError(format!(
            "Expected {}, found {} at {}",
            expected,
            self.peek().describe(),
            self.current_span()
        ))
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn is_identifier(&self) -> bool {
        matches!(self.peek(), Token::Identifier(_))
    }

    /// `Identifier (',' Identifier)*`
    fn identifier_list(&mut self, what: &str) -> Result<Vec<String>> {
        let mut names = vec![self.expect_identifier(what)?];
        while self.eat(&Token::Comma) {
            names.push(self.expect_identifier(what)?);
        }
        Ok(names)
    }

    /// `Identifier ('.' Identifier)*`, joined with dots
    fn dotted_name(&mut self, what: &str) -> Result<Vec<String>> {
        let mut parts = vec![self.expect_identifier(what)?];
        while self.eat(&Token::Dot) {
            parts.push(self.expect_identifier(what)?);
        }
        Ok(parts)
    }

    /// Verbatim source text up to (not including) the first depth-0 token
    /// matching `stop`. Nested `()`, `[]` and `{}` are skipped over whole.
    fn raw_text_until(&mut self, stop: &Token, what: &str) -> Result<String> {
        let start = self.current_span();
        let mut end = start.offset;
        let mut depth = 0usize;

        loop {
            let token = self.peek().clone();
            if token == Token::Eof {
                return Err(self.error_here(&format!("'{}'", stop.symbol().unwrap_or("?"))));
            }
            if depth == 0 && &token == stop {
                break;
            }
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        return Err(self.error_here(what));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            end = self.tokens[self.position].end;
            self.advance();
        }

        let text: String = self.source[start.offset..end].iter().collect();
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(Error::ParseError(format!("Expected {} at {}", what, start)));
        }
        Ok(text)
    }

    // ── Library ────────────────────────────────────────────

    pub fn parse_library(&mut self) -> Result<LibraryDecl> {
        self.expect(&Token::Library, "'library'")?;
        let name = self.expect_identifier("library name")?;
        self.expect(&Token::Semicolon, "';'")?;

        let mut imports = Vec::new();
        while self.eat(&Token::Import) {
            imports.push(self.dotted_name("imported name")?.join("."));
            self.expect(&Token::Semicolon, "';'")?;
        }

        let mut includes = Vec::new();
        while self.eat(&Token::Include) {
            includes.push(self.dotted_name("included name")?.join("."));
            self.expect(&Token::Semicolon, "';'")?;
        }

        let types = self.parse_types_section()?;

        let mut automata = Vec::new();
        while self.check(&Token::Automaton) {
            let syntax = self.parse_automaton()?;
            automata.push(builder::build_automaton(syntax)?);
        }

        let converters = if self.check(&Token::Converters) {
            self.parse_converters_section()?
        } else {
            Vec::new()
        };

        let mut functions = Vec::new();
        while !self.check(&Token::Eof) {
            let syntax = self.parse_fun_decl()?;
            functions.push(builder::build_function(syntax)?);
        }

        trace!(
            library = %name,
            automata = automata.len(),
            functions = functions.len(),
            "parsed library"
        );

        Ok(LibraryDecl {
            name,
            imports,
            includes,
            automata,
            types,
            converters,
            functions,
        })
    }

    // ── Semantic types ─────────────────────────────────────

    /// `Identifier ('[' ']' | '*')*`
    fn parse_type_atom(&mut self) -> Result<SemanticType> {
        let name = self.expect_identifier("type name")?;
        let mut ty = SemanticType::simple(name);
        loop {
            if self.check(&Token::LBracket) && self.peek_at(1) == &Token::RBracket {
                self.advance();
                self.advance();
                ty = SemanticType::array(ty);
            } else if self.eat(&Token::Star) {
                ty = SemanticType::pointer(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    /// Adjacent atoms nest to the right: `A B C` is `A (B C)`
    pub(crate) fn parse_semantic_type(&mut self) -> Result<SemanticType> {
        let outer = self.parse_type_atom()?;
        if self.is_identifier() {
            let inner = self.parse_semantic_type()?;
            Ok(SemanticType::generic(outer, inner))
        } else {
            Ok(outer)
        }
    }

    // ── Types section ──────────────────────────────────────

    fn parse_types_section(&mut self) -> Result<TypeTable> {
        self.expect(&Token::Types, "'types' section")?;
        self.expect(&Token::LBrace, "'{'")?;
        let mut table = TypeTable::new();
        while !self.eat(&Token::RBrace) {
            let semantic_type = self.parse_semantic_type()?;
            self.expect(&Token::LParen, "'(' before code type")?;
            let code_type = self.raw_text_until(&Token::RParen, "code type")?;
            self.expect(&Token::RParen, "')'")?;
            self.expect(&Token::Semicolon, "';'")?;
            table.push(TypeDecl::new(semantic_type, CodeType::new(code_type)));
        }
        Ok(table)
    }

    // ── Automata ───────────────────────────────────────────

    fn parse_automaton(&mut self) -> Result<AutomatonSyntax> {
        let span = self.current_span();
        self.expect(&Token::Automaton, "'automaton'")?;
        let name = self.parse_semantic_type()?;
        self.expect(&Token::LBrace, "'{'")?;

        let mut items = Vec::new();
        while !self.eat(&Token::RBrace) {
            items.push(self.parse_automaton_item()?);
        }

        Ok(AutomatonSyntax { name, items, span })
    }

    fn parse_automaton_item(&mut self) -> Result<AutomatonItem> {
        let item = match self.peek() {
            Token::Extendable => {
                self.advance();
                AutomatonItem::Extendable
            }
            Token::JavaPackage => {
                self.advance();
                AutomatonItem::JavaPackage(self.dotted_name("package name")?)
            }
            Token::Var => {
                self.advance();
                let name = self.expect_identifier("variable name")?;
                self.expect(&Token::Colon, "':'")?;
                let var_type = self.parse_semantic_type()?;
                AutomatonItem::Variable { name, var_type }
            }
            Token::States => {
                self.advance();
                AutomatonItem::States(self.identifier_list("state name")?)
            }
            Token::FinishState => {
                self.advance();
                AutomatonItem::FinishState(self.expect_identifier("state name")?)
            }
            Token::Shift => {
                self.advance();
                let from = self.expect_identifier("source state")?;
                self.expect(&Token::Arrow, "'->'")?;
                let to = self.expect_identifier("destination state")?;
                self.expect(&Token::LParen, "'('")?;
                let functions = self.identifier_list("function name")?;
                self.expect(&Token::RParen, "')'")?;
                AutomatonItem::Shift {
                    from,
                    to,
                    functions,
                }
            }
            _ => return Err(self.error_here("automaton statement")),
        };
        self.expect(&Token::Semicolon, "';'")?;
        Ok(item)
    }

    // ── Converters ─────────────────────────────────────────

    fn parse_converters_section(&mut self) -> Result<Vec<Converter>> {
        self.expect(&Token::Converters, "'converters'")?;
        self.expect(&Token::LBrace, "'{'")?;
        let mut converters = Vec::new();
        while !self.eat(&Token::RBrace) {
            let entity = self.parse_semantic_type()?;
            self.expect(&Token::Lt, "'<-'")?;
            self.expect(&Token::Minus, "'<-'")?;
            let expression = self.raw_text_until(&Token::Semicolon, "converter expression")?;
            self.expect(&Token::Semicolon, "';'")?;
            converters.push(Converter { entity, expression });
        }
        Ok(converters)
    }

    // ── Functions ──────────────────────────────────────────

    fn parse_fun_decl(&mut self) -> Result<FunDeclSyntax> {
        let span = self.current_span();

        let mut atoms = vec![self.parse_type_atom()?];
        while !self.check(&Token::LParen) {
            if !self.is_identifier() {
                return Err(self.error_here("'(' after function name"));
            }
            atoms.push(self.parse_type_atom()?);
        }

        let name = match atoms.pop() {
            Some(SemanticType::Simple { name }) => name,
            Some(other) => {
                return Err(Error::ParseError(format!(
                    "Function name must be an identifier, found type '{}' at {}",
                    other, span
                )))
            }
            None => return Err(self.error_here("function name")),
        };
        let entity = atoms
            .into_iter()
            .rev()
            .reduce(|inner, outer| SemanticType::generic(outer, inner));

        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            args.push(self.parse_fun_arg()?);
            while self.eat(&Token::Comma) {
                args.push(self.parse_fun_arg()?);
            }
        }
        self.expect(&Token::RParen, "')'")?;

        let requires = if self.eat(&Token::Requires) {
            Some(self.parse_contract()?)
        } else {
            None
        };
        let ensures = if self.eat(&Token::Ensures) {
            Some(self.parse_contract()?)
        } else {
            None
        };

        let return_value = if self.eat(&Token::Colon) {
            let annotations = self.parse_annotations()?;
            let return_type = self.parse_semantic_type()?;
            Some(ReturnTypeDecl {
                return_type,
                annotations,
            })
        } else {
            None
        };

        self.expect(&Token::LBrace, "'{' to open function body")?;
        let mut properties = Vec::new();
        while !self.eat(&Token::RBrace) {
            properties.push(self.parse_fun_property()?);
        }

        Ok(FunDeclSyntax {
            entity,
            name,
            args,
            requires,
            ensures,
            return_value,
            properties,
            span,
        })
    }

    fn parse_annotations(&mut self) -> Result<Vec<String>> {
        let mut annotations = Vec::new();
        while self.eat(&Token::At) {
            annotations.push(self.expect_identifier("annotation name")?);
        }
        Ok(annotations)
    }

    fn parse_fun_arg(&mut self) -> Result<FunctionArgument> {
        let annotations = self.parse_annotations()?;
        let name = self.expect_identifier("argument name")?;
        self.expect(&Token::Colon, "':'")?;
        let arg_type = self.parse_semantic_type()?;
        Ok(FunctionArgument {
            name,
            arg_type,
            annotations,
        })
    }

    fn parse_fun_property(&mut self) -> Result<FunProperty> {
        let property = match self.peek().clone() {
            Token::Action => {
                self.advance();
                let name = self.expect_identifier("action name")?;
                self.expect(&Token::LParen, "'('")?;
                let args = if self.check(&Token::RParen) {
                    Vec::new()
                } else {
                    self.identifier_list("action argument")?
                };
                self.expect(&Token::RParen, "')'")?;
                FunProperty::Action(ActionDecl { name, args })
            }
            Token::Static => {
                self.advance();
                let name = if self.is_identifier() {
                    Some(self.expect_identifier("static name")?)
                } else {
                    None
                };
                FunProperty::Static(name)
            }
            Token::Property => {
                self.advance();
                let key = self.expect_identifier("property key")?;
                self.expect(&Token::Equals, "'='")?;
                let value = self.raw_text_until(&Token::Semicolon, "property value")?;
                FunProperty::Property(PropertyDecl { key, value })
            }
            Token::Identifier(name) => {
                self.advance();
                self.expect(&Token::Equals, "'='")?;
                self.expect(&Token::New, "'new'")?;
                let callee_automaton_name = self.parse_semantic_type()?;
                self.expect(&Token::LParen, "'('")?;
                let callee_arguments = if self.check(&Token::RParen) {
                    Vec::new()
                } else {
                    self.identifier_list("automaton argument")?
                };
                self.expect(&Token::RParen, "')'")?;
                FunProperty::Assignment(VariableAssignment {
                    name,
                    callee_automaton_name,
                    callee_arguments,
                })
            }
            _ => return Err(self.error_here("function property")),
        };
        self.expect(&Token::Semicolon, "';'")?;
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AutomatonStatement, FunctionEntityDeclStyle};
    use std::io::Cursor;

    const MINIMAL: &str = "library test; types {A (B);} automaton Test {}";

    #[test]
    fn test_parse_from_string() {
        let lib = parse(MINIMAL).unwrap();
        assert_eq!(lib.name, "test");
        assert_eq!(lib.types.len(), 1);
        let decl = lib.types.first().unwrap();
        assert_eq!(decl.semantic_type.type_name(), "A");
        assert_eq!(decl.code_type.type_name(), "B");
        assert_eq!(lib.automata.len(), 1);
        assert_eq!(lib.automata[0].name.type_name(), "Test");
    }

    #[test]
    fn test_parse_from_reader_and_bytes() {
        let from_reader = parse_reader(Cursor::new(MINIMAL)).unwrap();
        let from_bytes = parse_bytes(MINIMAL.as_bytes()).unwrap();
        assert_eq!(from_reader, parse(MINIMAL).unwrap());
        assert_eq!(from_bytes, from_reader);
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let err = parse_bytes(&[0x6c, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8(_)));
        let err = parse_reader(std::io::Cursor::new([0x6c, 0xff])).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8(_)), "{:?}", err);
    }

    #[test]
    fn test_parse_with_package() {
        let lib =
            parse("library test; types{A (B);} automaton Test {javapackage ru.spbstu.test.package;}")
                .unwrap();
        assert_eq!(
            lib.automata[0].java_package.as_ref().unwrap().name,
            "ru.spbstu.test.package"
        );
    }

    #[test]
    fn test_parse_imports_and_includes() {
        let lib = parse("library x; import java.io; import z3; include common; types {}").unwrap();
        assert_eq!(lib.imports, vec!["java.io", "z3"]);
        assert_eq!(lib.includes, vec!["common"]);
        assert!(lib.types.is_empty());
    }

    #[test]
    fn test_parse_code_type_is_verbatim() {
        let lib = parse("library x; types { List Int (java.util.List<Integer>); Buf (byte[]); }")
            .unwrap();
        let decls = lib.types.as_slice();
        assert_eq!(decls[0].code_type.type_name(), "java.util.List<Integer>");
        assert_eq!(decls[0].semantic_type.type_name(), "List Int");
        assert_eq!(decls[1].code_type.type_name(), "byte[]");
    }

    #[test]
    fn test_parse_semantic_type_nesting() {
        let lib = parse("library x; types { Map List Int[]* (X); }").unwrap();
        let ty = &lib.types.first().unwrap().semantic_type;
        assert_eq!(ty.enclosing_type().unwrap().type_name(), "Map");
        let inner = ty.inner_type().unwrap();
        assert_eq!(inner.enclosing_type().unwrap().type_name(), "List");
        let leaf = inner.inner_type().unwrap();
        assert!(leaf.is_pointer());
        assert!(leaf.inner_type().unwrap().is_array());
        assert_eq!(ty.type_name(), "Map List Int[]*");
    }

    #[test]
    fn test_parse_automaton_body() {
        let src = r#"library x; types {}
automaton Conn {
    extendable;
    var buffer: CustomString;
    states Created, Open;
    finishstate F;
    shift Created -> Open (open, reopen);
}"#;
        let lib = parse(src).unwrap();
        let a = &lib.automata[0];
        assert!(a.extendable);
        assert_eq!(a.states.iter().filter(|s| !s.is_finish).count(), 2);
        let finish: Vec<_> = a.states.iter().filter(|s| s.is_finish).collect();
        assert_eq!(finish.len(), 1);
        assert_eq!(finish[0].name, "F");
        assert_eq!(a.shifts[0].functions, vec!["open", "reopen"]);
        let AutomatonStatement::Variable { name, var_type } = &a.statements[0];
        assert_eq!(name, "buffer");
        assert_eq!(var_type.type_name(), "CustomString");
    }

    #[test]
    fn test_parse_variable_assignment() {
        let src = r#"library x; types {}
automaton Test { var testVariable: CustomString; }
Test make() {
    testVariable = new Test(A);
}"#;
        let lib = parse(src).unwrap();
        let assignment = &lib.functions[0].variable_assignments[0];
        assert_eq!(assignment.name, "testVariable");
        assert_eq!(assignment.callee_automaton_name.type_name(), "Test");
        assert_eq!(assignment.callee_arguments, vec!["A"]);
    }

    #[test]
    fn test_parse_converters_verbatim() {
        let src = "library x; types {} converters { Socket <- new Socket(host, 80); }";
        let lib = parse(src).unwrap();
        assert_eq!(lib.converters[0].entity.type_name(), "Socket");
        assert_eq!(lib.converters[0].expression, "new Socket(host, 80)");
    }

    #[test]
    fn test_parse_converters_with_foreign_syntax() {
        let src = "library l; types {} converters { Socket <- ok ? a : b; C <- new C('x', ';'); }";
        let lib = parse(src).unwrap();
        assert_eq!(lib.converters[0].expression, "ok ? a : b");
        assert_eq!(lib.converters[1].expression, "new C('x', ';')");
    }

    #[test]
    fn test_parse_wildcard_code_type() {
        let lib = parse("library l; types { Any (java.util.List<?>); Mask (~0 ^ $x % #y); }").unwrap();
        let decls = lib.types.as_slice();
        assert_eq!(decls[0].code_type.type_name(), "java.util.List<?>");
        assert_eq!(decls[1].code_type.type_name(), "~0 ^ $x % #y");
    }

    #[test]
    fn test_foreign_character_outside_verbatim_text() {
        let err = parse("library l?;").unwrap_err().to_string();
        assert!(err.contains("found '?' at 1:10"), "{}", err);
        let err = parse("library l; types {} A f(@handle a: A) requires a ? 1 {}")
            .unwrap_err()
            .to_string();
        assert!(err.contains("'?'"), "{}", err);
    }

    #[test]
    fn test_parse_function_head_forms() {
        let src = r#"library x; types {}
Int[] get(): Int {
}
List Item find(@handle l: List Item) {
}
close(x: Int, @handle s: Socket) {
}"#;
        let lib = parse(src).unwrap();
        assert_eq!(lib.functions[0].entity.entity_type.type_name(), "Int[]");
        assert_eq!(lib.functions[0].name, "get");
        assert_eq!(lib.functions[1].entity.entity_type.type_name(), "List Item");
        assert_eq!(lib.functions[1].name, "find");
        assert_eq!(
            lib.functions[2].entity.style,
            FunctionEntityDeclStyle::ViaHandleAnnotation
        );
        assert_eq!(lib.functions[2].entity.entity_type.type_name(), "Socket");
    }

    #[test]
    fn test_parse_function_properties() {
        let src = r#"library x; types {}
S open(path: String): @nonnull S {
    action OPEN(path, mode);
    static fopen;
    property kind = "constructor";
}"#;
        let f = &parse(src).unwrap().functions[0];
        assert_eq!(f.actions[0].name, "OPEN");
        assert_eq!(f.actions[0].args, vec!["path", "mode"]);
        assert_eq!(f.static_name.as_ref().unwrap().static_name, "fopen");
        assert_eq!(f.properties[0].key, "kind");
        assert_eq!(f.properties[0].value, "\"constructor\"");
        let ret = f.return_value.as_ref().unwrap();
        assert_eq!(ret.annotations, vec!["nonnull"]);
        assert_eq!(ret.return_type.type_name(), "S");
    }

    #[test]
    fn test_function_without_handle_fails_whole_parse() {
        let err = parse("library x; types {} close(x: Int) {}").unwrap_err();
        assert_eq!(
            err,
            Error::MissingHandle {
                function: "close".into()
            }
        );
    }

    #[test]
    fn test_function_name_cannot_be_array() {
        let err = parse("library x; types {} A b[]() {}").unwrap_err();
        assert!(err.to_string().contains("Function name must be an identifier"));
    }

    #[test]
    fn test_missing_types_section() {
        let err = parse("library x; automaton A {}").unwrap_err();
        assert!(err.to_string().contains("'types' section"));
        assert!(err.to_string().contains("1:12"));
    }

    #[test]
    fn test_section_order_enforced() {
        let err = parse("library x; types {} import a;").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_unterminated_types_section() {
        let err = parse("library x; types { A (B);").unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn test_parse_determinism_100_iterations() {
        let first = parse(MINIMAL).unwrap();
        for i in 0..100 {
            assert_eq!(first, parse(MINIMAL).unwrap(), "Determinism failure at iteration {}", i);
        }
    }
}
