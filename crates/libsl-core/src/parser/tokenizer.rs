//! LibSL Tokenizer: converts LibSL text into a token stream
//!
//! Handles: keywords, identifiers, string literals, integer/float literals,
//! comparison/arithmetic/boolean operators and punctuation.
//! Line (`//`) and block (`/* */`) comments are discarded.
//! Characters outside that set, and single-quoted runs such as `'x'`, lex as
//! `Token::Other`; only verbatim text (code types, converter expressions,
//! property values) accepts them.
//!
//! Every token records where it starts and where it ends so the parser can
//! recover verbatim source text for code types and converter expressions.

/// Token types for LibSL syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Library,
    Import,
    Include,
    Types,
    Automaton,
    JavaPackage,
    Extendable,
    States,
    FinishState,
    Shift,
    Var,
    Converters,
    Requires,
    Ensures,
    Static,
    Action,
    Property,
    New,

    // Literals
    StringLiteral(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    LtEq,  // <=
    GtEq,  // >=
    Lt,    // <
    Gt,    // >

    // Arithmetic
    Star,  // *
    Slash, // /
    Plus,  // +
    Minus, // -

    // Boolean connectives
    Amp,  // &
    Pipe, // |
    Bang, // !

    // Punctuation
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    LParen,    // (
    RParen,    // )
    Semicolon, // ;
    Colon,     // :
    Comma,     // ,
    Dot,       // .
    At,        // @
    Equals,    // =
    Arrow,     // ->

    // Other
    Identifier(String),
    /// Source text with no meaning in LibSL itself
    Other(String),
    Eof,
}

impl Token {
    /// Source spelling of operator and punctuation tokens
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Bang => "!",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::At => "@",
            Token::Equals => "=",
            Token::Arrow => "->",
            _ => return None,
        };
        Some(s)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::EqEq | Token::NotEq | Token::LtEq | Token::GtEq | Token::Lt | Token::Gt
        )
    }

    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::StringLiteral(s) => format!("string \"{}\"", s),
            Token::IntegerLiteral(n) => format!("integer {}", n),
            Token::FloatLiteral(x) => format!("float {}", x),
            Token::Other(text) => format!("'{}'", text),
            Token::Eof => "end of input".to_string(),
            other => match other.symbol() {
                Some(sym) => format!("'{}'", sym),
                None => format!("keyword '{}'", keyword_text(other).unwrap_or("?")),
            },
        }
    }
}

fn keyword_text(token: &Token) -> Option<&'static str> {
    let s = match token {
        Token::Library => "library",
        Token::Import => "import",
        Token::Include => "include",
        Token::Types => "types",
        Token::Automaton => "automaton",
        Token::JavaPackage => "javapackage",
        Token::Extendable => "extendable",
        Token::States => "states",
        Token::FinishState => "finishstate",
        Token::Shift => "shift",
        Token::Var => "var",
        Token::Converters => "converters",
        Token::Requires => "requires",
        Token::Ensures => "ensures",
        Token::Static => "static",
        Token::Action => "action",
        Token::Property => "property",
        Token::New => "new",
        _ => return None,
    };
    Some(s)
}

/// Position in source text for error reporting
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    /// Character offset of the token's first character
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    /// Character offset one past the token's last character
    pub end: usize,
}

/// Tokenizer for LibSL source text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(&mut self) -> crate::Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                let span = self.current_span();
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    end: span.offset,
                    span,
                });
                break;
            }

            let span = self.current_span();
            let token = self.next_token(&span)?;
            tokens.push(SpannedToken {
                token,
                span,
                end: self.position,
            });
        }

        Ok(tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    // ── Whitespace & Comments ──────────────────────────────

    fn skip_whitespace_and_comments(&mut self) -> crate::Result<()> {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.peek() == Some('/') && self.peek_ahead(1) == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_ahead(1) == Some('*') {
                let start = self.current_span();
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        None => {
                            return Err(crate::Error::ParseError(format!(
                                "Unterminated block comment starting at {}",
                                start
                            )));
                        }
                        Some('*') if self.peek_ahead(1) == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self, span: &Span) -> crate::Result<Token> {
        let ch = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match ch {
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            ';' => self.single(Token::Semicolon),
            ':' => self.single(Token::Colon),
            ',' => self.single(Token::Comma),
            '.' => self.single(Token::Dot),
            '@' => self.single(Token::At),
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '+' => self.single(Token::Plus),
            '&' => self.single(Token::Amp),
            '|' => self.single(Token::Pipe),
            '-' => self.one_or_two('>', Token::Arrow, Token::Minus),
            '=' => self.one_or_two('=', Token::EqEq, Token::Equals),
            '!' => self.one_or_two('=', Token::NotEq, Token::Bang),
            '<' => self.one_or_two('=', Token::LtEq, Token::Lt),
            '>' => self.one_or_two('=', Token::GtEq, Token::Gt),
            '"' => self.read_string(span)?,
            '\'' => self.read_quoted_run(span)?,
            c if c.is_ascii_digit() => self.read_number(span)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier_or_keyword(),
            c => self.single(Token::Other(c.to_string())),
        };
        Ok(token)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn one_or_two(&mut self, second: char, two: Token, one: Token) -> Token {
        self.advance();
        if self.peek() == Some(second) {
            self.advance();
            two
        } else {
            one
        }
    }

    // ── String literals ────────────────────────────────────

    fn read_string(&mut self, span: &Span) -> crate::Result<Token> {
        self.advance(); // consume opening "
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(crate::Error::ParseError(format!(
                        "Unterminated string starting at {}",
                        span
                    )));
                }
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(c) => {
                        return Err(crate::Error::ParseError(format!(
                            "Invalid escape sequence '\\{}' at {}",
                            c,
                            self.current_span()
                        )));
                    }
                    None => {
                        return Err(crate::Error::ParseError(format!(
                            "Unterminated escape sequence at {}",
                            self.current_span()
                        )));
                    }
                },
                Some(c) => value.push(c),
            }
        }

        Ok(Token::StringLiteral(value))
    }

    /// `'…'` kept raw, backslash escapes included, so quotes and
    /// delimiters inside it never reach the parser.
    fn read_quoted_run(&mut self, span: &Span) -> crate::Result<Token> {
        let start = self.position;
        self.advance(); // consume opening '

        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(crate::Error::ParseError(format!(
                        "Unterminated quote starting at {}",
                        span
                    )));
                }
                Some('\'') => break,
                Some('\\') => {
                    self.advance();
                }
                Some(_) => {}
            }
        }

        let text: String = self.input[start..self.position].iter().collect();
        Ok(Token::Other(text))
    }

    // ── Numbers ────────────────────────────────────────────

    fn read_number(&mut self, span: &Span) -> crate::Result<Token> {
        let start = self.position;
        let mut has_dot = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !has_dot
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();

        if has_dot {
            let val: f64 = text.parse().map_err(|_| {
                crate::Error::ParseError(format!("Invalid float '{}' at {}", text, span))
            })?;
            Ok(Token::FloatLiteral(val))
        } else {
            let val: i64 = text.parse().map_err(|_| {
                crate::Error::ParseError(format!("Invalid integer '{}' at {}", text, span))
            })?;
            Ok(Token::IntegerLiteral(val))
        }
    }

    // ── Identifiers & Keywords ─────────────────────────────

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();

        match text.as_str() {
            "library" => Token::Library,
            "import" => Token::Import,
            "include" => Token::Include,
            "types" => Token::Types,
            "automaton" => Token::Automaton,
            "javapackage" => Token::JavaPackage,
            "extendable" => Token::Extendable,
            "states" => Token::States,
            "finishstate" => Token::FinishState,
            "shift" => Token::Shift,
            "var" => Token::Var,
            "converters" => Token::Converters,
            "requires" => Token::Requires,
            "ensures" => Token::Ensures,
            "static" => Token::Static,
            "action" => Token::Action,
            "property" => Token::Property,
            "new" => Token::New,
            _ => Token::Identifier(text),
        }
    }
}
