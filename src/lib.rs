pub mod ast;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod pretty_print;
pub mod source;

pub use ast::Program;
pub use environment::{Env, Environment};
pub use evaluator::{RuntimeError, evaluate};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use object::Object;
pub use parser::{ParseError, Parser, parse};
pub use source::Span;
