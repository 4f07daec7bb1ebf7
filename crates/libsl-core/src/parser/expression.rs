//! Contract sub-parser for `requires` / `ensures` clauses
//!
//! ```text
//! conjunction := disjunction ('&' disjunction)*
//! disjunction := '!' '(' disjunction ')' | term ('|' term)*
//! term        := '!'? part (compareOp part)?
//! part        := String | '(' conjunction ')' | arith
//! arith       := mul (('+' | '-') mul)*
//! mul         := atom (('*' | '/') atom)*
//! atom        := Number | '-' Number | Identifier '(' args ')' | Identifier
//! ```
//!
//! `!( ... )` at the start of a disjunction is ambiguous: it is an inverted
//! disjunction when the parentheses hold exactly one non-inverted disjunction
//! and nothing extends it, otherwise it is an inverted boolean term.

use tracing::trace;

use super::ast::{
    ArithmeticExpressionNode, ArithmeticOp, ConjunctionNode, DisjunctionNode, EqualityNode,
    EqualityPartNode, EqualitySign, FunctionCallNode, Number, NumberNode, StringNode, TermKind,
    TermNode, VariableNode,
};
use super::tokenizer::Token;
use super::Parser;
use crate::{Error, Result};

impl Parser {
    pub(crate) fn parse_contract(&mut self) -> Result<ConjunctionNode> {
        let span = self.current_span();
        let contract = self.parse_conjunction()?;
        trace!(at = %span, disjunctions = contract.disjunctions.len(), "parsed contract");
        Ok(contract)
    }

    fn parse_conjunction(&mut self) -> Result<ConjunctionNode> {
        let mut disjunctions = vec![self.parse_disjunction()?];
        while self.eat(&Token::Amp) {
            disjunctions.push(self.parse_disjunction()?);
        }
        Ok(ConjunctionNode { disjunctions })
    }

    fn parse_disjunction(&mut self) -> Result<DisjunctionNode> {
        let first = if self.check(&Token::Bang) && self.peek_at(1) == &Token::LParen {
            self.advance();
            self.advance();
            let inner = self.parse_conjunction()?;
            self.expect(&Token::RParen, "')'")?;

            let extended = self.check(&Token::Pipe) || self.peek().is_comparison();
            match inner.disjunctions.as_slice() {
                [only] if !only.is_inverted && !extended => {
                    return Ok(DisjunctionNode {
                        terms: only.terms.clone(),
                        is_inverted: true,
                    });
                }
                _ => self.finish_term(EqualityPartNode::BooleanExpression(Box::new(inner)), true)?,
            }
        } else {
            self.parse_term()?
        };

        let mut terms = vec![first];
        while self.eat(&Token::Pipe) {
            terms.push(self.parse_term()?);
        }
        Ok(DisjunctionNode {
            terms,
            is_inverted: false,
        })
    }

    fn parse_term(&mut self) -> Result<TermNode> {
        let is_inverted = self.eat(&Token::Bang);
        let part = self.parse_equality_part()?;
        self.finish_term(part, is_inverted)
    }

    /// Completes a term whose leading part is already parsed
    fn finish_term(&mut self, left: EqualityPartNode, is_inverted: bool) -> Result<TermNode> {
        if !self.peek().is_comparison() {
            return Ok(TermNode {
                kind: TermKind::Part(left),
                is_inverted,
            });
        }

        let op = self.advance();
        let sign = EqualitySign::from_text(op.symbol().unwrap_or_default())?;
        let right = self.parse_equality_part()?;
        Ok(TermNode {
            kind: TermKind::Equality(EqualityNode { left, right, sign }),
            is_inverted,
        })
    }

    fn parse_equality_part(&mut self) -> Result<EqualityPartNode> {
        match self.peek().clone() {
            Token::StringLiteral(value) => {
                self.advance();
                Ok(EqualityPartNode::String(StringNode { value }))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_conjunction()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(EqualityPartNode::BooleanExpression(Box::new(inner)))
            }
            _ => Ok(EqualityPartNode::Arithmetic(self.parse_arithmetic()?)),
        }
    }

    fn parse_arithmetic(&mut self) -> Result<ArithmeticExpressionNode> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => ArithmeticOp::Plus,
                Token::Minus => ArithmeticOp::Minus,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = ArithmeticExpressionNode::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ArithmeticExpressionNode> {
        let mut left = self.parse_arithmetic_atom()?;
        loop {
            let op = match self.peek() {
                Token::Star => ArithmeticOp::Mul,
                Token::Slash => ArithmeticOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_arithmetic_atom()?;
            left = ArithmeticExpressionNode::binary(op, left, right);
        }
    }

    fn parse_arithmetic_atom(&mut self) -> Result<ArithmeticExpressionNode> {
        match self.peek().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(number(Number::Int(n)))
            }
            Token::FloatLiteral(x) => {
                self.advance();
                Ok(number(Number::Float(x)))
            }
            Token::Minus => {
                self.advance();
                match self.peek().clone() {
                    Token::IntegerLiteral(n) => {
                        self.advance();
                        Ok(number(Number::Int(-n)))
                    }
                    Token::FloatLiteral(x) => {
                        self.advance();
                        Ok(number(Number::Float(-x)))
                    }
                    _ => Err(self.error_here("number after unary '-'")),
                }
            }
            Token::Identifier(name) => {
                self.advance();
                if !self.eat(&Token::LParen) {
                    return Ok(ArithmeticExpressionNode::Variable(VariableNode { name }));
                }
                let mut args = Vec::new();
                if !self.check(&Token::RParen) {
                    args.push(self.parse_equality_part()?);
                    while self.eat(&Token::Comma) {
                        args.push(self.parse_equality_part()?);
                    }
                }
                self.expect(&Token::RParen, "')' to close call")?;
                Ok(ArithmeticExpressionNode::FunctionCall(FunctionCallNode {
                    name,
                    args,
                }))
            }
            Token::Eof => Err(Error::ParseError(format!(
                "Unexpected end of input in contract at {}",
                self.current_span()
            ))),
            _ => Err(self.error_here("contract expression")),
        }
    }
}

fn number(value: Number) -> ArithmeticExpressionNode {
    ArithmeticExpressionNode::Number(NumberNode { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::Tokenizer;

    fn contract(text: &str) -> ConjunctionNode {
        let tokens = Tokenizer::new(text).tokenize().unwrap();
        let mut parser = Parser::new(text, tokens);
        let node = parser.parse_contract().unwrap();
        assert_eq!(parser.peek(), &Token::Eof, "contract did not consume {:?}", text);
        node
    }

    fn contract_err(text: &str) -> Error {
        let tokens = Tokenizer::new(text).tokenize().unwrap();
        Parser::new(text, tokens).parse_contract().unwrap_err()
    }

    #[test]
    fn test_four_disjunctions() {
        let c = contract(r#"a == "a" & b == a & c == 155.2 & d == foo(123)"#);
        assert_eq!(c.disjunctions.len(), 4);

        let eq0 = c.disjunctions[0].terms[0].equality().unwrap();
        assert_eq!(eq0.left.variable().unwrap().name, "a");
        assert_eq!(
            eq0.right,
            EqualityPartNode::String(StringNode { value: "a".into() })
        );

        let eq2 = c.disjunctions[2].terms[0].equality().unwrap();
        assert_eq!(eq2.right.number(), Some(Number::Float(155.2)));

        let eq3 = c.disjunctions[3].terms[0].equality().unwrap();
        let call = eq3.right.function_call().unwrap();
        assert_eq!(call.name, "foo");
        assert_eq!(call.args[0].number(), Some(Number::Int(123)));
    }

    #[test]
    fn test_disjunction_of_terms() {
        let c = contract("x > 0 | y <= 10 | flag");
        assert_eq!(c.disjunctions.len(), 1);
        let terms = &c.disjunctions[0].terms;
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0].equality().unwrap().sign, EqualitySign::Gt);
        assert_eq!(terms[1].equality().unwrap().sign, EqualitySign::LtEq);
        assert_eq!(terms[2].part().unwrap().variable().unwrap().name, "flag");
    }

    #[test]
    fn test_arithmetic_precedence_left_assoc() {
        let c = contract("a - b - c * d == 0");
        let eq = c.disjunctions[0].terms[0].equality().unwrap();
        let EqualityPartNode::Arithmetic(arith) = &eq.left else {
            panic!("expected arithmetic");
        };
        // (a - b) - (c * d)
        let (op, left, right) = arith.as_binary().unwrap();
        assert_eq!(op, ArithmeticOp::Minus);
        assert_eq!(left.as_binary().unwrap().0, ArithmeticOp::Minus);
        assert_eq!(right.as_binary().unwrap().0, ArithmeticOp::Mul);
    }

    #[test]
    fn test_negative_literals() {
        let c = contract("x != -1 & y < -0.5");
        let eq0 = c.disjunctions[0].terms[0].equality().unwrap();
        assert_eq!(eq0.right.number(), Some(Number::Int(-1)));
        let eq1 = c.disjunctions[1].terms[0].equality().unwrap();
        assert_eq!(eq1.right.number(), Some(Number::Float(-0.5)));
    }

    #[test]
    fn test_inverted_disjunction() {
        let c = contract("!(a | b)");
        let d = &c.disjunctions[0];
        assert!(d.is_inverted);
        assert_eq!(d.terms.len(), 2);
        assert!(!d.terms[0].is_inverted);
    }

    #[test]
    fn test_inverted_group_followed_by_pipe_is_a_term() {
        let c = contract("!(a | b) | c");
        let d = &c.disjunctions[0];
        assert!(!d.is_inverted);
        assert_eq!(d.terms.len(), 2);
        assert!(d.terms[0].is_inverted);
        assert!(matches!(
            d.terms[0].part(),
            Some(EqualityPartNode::BooleanExpression(_))
        ));
    }

    #[test]
    fn test_inverted_group_compared_is_a_term() {
        let c = contract("!(a) == b");
        let term = &c.disjunctions[0].terms[0];
        assert!(term.is_inverted);
        let eq = term.equality().unwrap();
        assert!(matches!(eq.left, EqualityPartNode::BooleanExpression(_)));
    }

    #[test]
    fn test_inverted_conjunction_group_is_a_term() {
        let c = contract("!(a & b)");
        let d = &c.disjunctions[0];
        assert!(!d.is_inverted);
        let EqualityPartNode::BooleanExpression(inner) = d.terms[0].part().unwrap() else {
            panic!("expected boolean expression");
        };
        assert_eq!(inner.disjunctions.len(), 2);
        assert!(d.terms[0].is_inverted);
    }

    #[test]
    fn test_inverted_plain_term() {
        let c = contract("!closed & size(buf, \"x\") >= 2");
        assert!(c.disjunctions[0].terms[0].is_inverted);
        let call = c.disjunctions[1].terms[0]
            .equality()
            .unwrap()
            .left
            .function_call()
            .unwrap();
        assert_eq!(call.args.len(), 2);
    }

    #[test]
    fn test_contract_stops_at_non_continuing_token() {
        let text = "a == 1 ensures";
        let tokens = Tokenizer::new(text).tokenize().unwrap();
        let mut parser = Parser::new(text, tokens);
        let c = parser.parse_contract().unwrap();
        assert_eq!(c.disjunctions.len(), 1);
        assert_eq!(parser.peek(), &Token::Ensures);
    }

    #[test]
    fn test_dangling_operator_is_error() {
        let err = contract_err("a == ");
        assert!(err.to_string().contains("Unexpected end of input"));
        let err = contract_err("- x");
        assert!(err.to_string().contains("number after unary '-'"));
    }
}
