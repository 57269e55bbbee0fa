use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Button wired to {index} but the machine only has {len} lights at position {span:?}")]
    IndexOutOfRange { index: usize, len: usize, span: Span },
    #[error("Machine has {lights} lights but {counters} joltage counters at position {span:?}")]
    LengthMismatch {
        lights: usize,
        counters: usize,
        span: Span,
    },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines_and_comments(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    // Machines are single-line, so unlike the item parsers this never skips newlines
    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut machines = Vec::new();

        loop {
            self.skip_newlines_and_comments();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::LBracket => machines.push(self.parse_machine()?),
                _ => return Err(self.unexpected("machine")),
            }

            // A machine ends its line
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Comment | TokenKind::Eof => {}
                _ => return Err(self.unexpected("end of line")),
            }
        }

        Ok(Program { machines })
    }

    fn parse_machine(&mut self) -> Result<Machine, ParseError> {
        let start = self.expect(TokenKind::LBracket)?.span;

        let mut lights = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Off => lights.push(false),
                TokenKind::On => lights.push(true),
                TokenKind::RBracket => break,
                _ => return Err(self.unexpected("'.', '#' or ']'")),
            }
            self.advance();
        }
        self.expect(TokenKind::RBracket)?;

        let mut buttons = Vec::new();
        while self.peek_kind() == TokenKind::LParen {
            buttons.push(self.parse_button(lights.len())?);
        }

        let joltage_start = self.expect(TokenKind::LBrace)?.span;
        let joltage = self.parse_number_list(TokenKind::RBrace)?;
        let end = self.expect(TokenKind::RBrace)?.span;

        let span = start.merge(end);
        if joltage.len() != lights.len() {
            return Err(ParseError::LengthMismatch {
                lights: lights.len(),
                counters: joltage.len(),
                span: joltage_start.merge(end),
            });
        }

        Ok(Machine {
            span,
            lights,
            buttons,
            joltage,
        })
    }

    fn parse_button(&mut self, len: usize) -> Result<Button, ParseError> {
        let start = self.expect(TokenKind::LParen)?.span;
        let indices = self.parse_number_list(TokenKind::RParen)?;
        let end = self.expect(TokenKind::RParen)?.span;
        let span = start.merge(end);

        let mut wiring = Vec::with_capacity(indices.len());
        for index in indices {
            let index = usize::try_from(index)
                .map_err(|_| ParseError::InvalidNumber(index.to_string()))?;
            if index >= len {
                return Err(ParseError::IndexOutOfRange { index, len, span });
            }
            wiring.push(index);
        }

        Ok(Button { span, wiring })
    }

    /// Comma-separated numbers up to (not including) `close`.
    fn parse_number_list(&mut self, close: TokenKind) -> Result<Vec<u64>, ParseError> {
        let mut values = Vec::new();
        if self.peek_kind() == close {
            return Ok(values);
        }

        loop {
            let token = self.expect(TokenKind::Number)?;
            let value = token
                .text
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;
            values.push(value);

            if self.peek_kind() == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(values)
    }
}
