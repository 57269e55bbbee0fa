pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use compiler::MachineError;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
