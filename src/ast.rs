use crate::lexer::{Token, TokenKind};
use std::fmt;

/// Shared behaviour of every syntax tree node: the literal of the token that
/// introduced it, and (through `Display`) its canonical source rendering.
pub trait Node: fmt::Display {
    fn token_literal(&self) -> &str;
}

/// Root of a parse: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Node for Program {
    fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|statement| statement.token_literal())
            .unwrap_or("")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Option<Expression>,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
}

impl Node for Statement {
    fn token_literal(&self) -> &str {
        match self {
            Statement::Let { token, .. }
            | Statement::Return { token, .. }
            | Statement::Expression { token, .. } => &token.literal,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { token, name, value } => {
                write!(f, "{} {} = {};", token.literal, name, value)
            }
            Statement::Return { token, value } => match value {
                Some(value) => write!(f, "{} {};", token.literal, value),
                None => write!(f, "{} ;", token.literal),
            },
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

/// A braced statement list, the body of `if` branches and functions.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl Node for BlockStatement {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

// `{ a; (-b) }`: expression statements need the `;` back, or `a (-b)` would
// re-parse as a call.
impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let last = self.statements.len().saturating_sub(1);
        for (i, statement) in self.statements.iter().enumerate() {
            write!(f, " {}", statement)?;
            if i != last && matches!(statement, Statement::Expression { .. }) {
                write!(f, ";")?;
            }
        }
        if self.statements.is_empty() {
            write!(f, "}}")
        } else {
            write!(f, " }}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Identifier { token, value }
    }
}

impl Node for Identifier {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Bang),
            TokenKind::Minus => Some(PrefixOperator::Minus),
            _ => None,
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Bang => f.write_str("!"),
            PrefixOperator::Minus => f.write_str("-"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(InfixOperator::Plus),
            TokenKind::Minus => Some(InfixOperator::Minus),
            TokenKind::Asterisk => Some(InfixOperator::Asterisk),
            TokenKind::Slash => Some(InfixOperator::Slash),
            TokenKind::Lt => Some(InfixOperator::Lt),
            TokenKind::Gt => Some(InfixOperator::Gt),
            TokenKind::Eq => Some(InfixOperator::Eq),
            TokenKind::NotEq => Some(InfixOperator::NotEq),
            _ => None,
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    Prefix {
        token: Token,
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
    // Source order is kept for rendering only
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
}

impl Node for Expression {
    fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(identifier) => identifier.token_literal(),
            Expression::IntegerLiteral { token, .. }
            | Expression::StringLiteral { token, .. }
            | Expression::Boolean { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::If { token, .. }
            | Expression::FunctionLiteral { token, .. }
            | Expression::Call { token, .. }
            | Expression::ArrayLiteral { token, .. }
            | Expression::Index { token, .. }
            | Expression::HashLiteral { token, .. } => &token.literal,
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    let mut first = true;
    for item in items {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            Expression::StringLiteral { value, .. } => write!(f, "\"{}\"", value),
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                token,
                parameters,
                body,
            } => {
                write!(f, "{}(", token.literal)?;
                write_separated(f, parameters)?;
                write!(f, ") {}", body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                write!(f, "{}(", function)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expression::ArrayLiteral { elements, .. } => {
                write!(f, "[")?;
                write_separated(f, elements)?;
                write!(f, "]")
            }
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expression::HashLiteral { pairs, .. } => {
                write!(f, "{{")?;
                write_separated(
                    f,
                    pairs.iter().map(|(key, value)| format!("{}:{}", key, value)),
                )?;
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    fn token(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, Span::default())
    }

    fn ident(name: &str) -> Identifier {
        Identifier::new(token(TokenKind::Ident, name))
    }

    fn int(value: i64) -> Expression {
        Expression::IntegerLiteral {
            token: token(TokenKind::Int, &value.to_string()),
            value,
        }
    }

    #[test]
    fn test_program_display() {
        let program = Program {
            statements: vec![Statement::Let {
                token: token(TokenKind::Let, "let"),
                name: ident("myVar"),
                value: Expression::Identifier(ident("anotherVar")),
            }],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;");
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn test_empty_program() {
        let program = Program::default();
        assert_eq!(program.to_string(), "");
        assert_eq!(program.token_literal(), "");
    }

    #[test]
    fn test_return_display() {
        let bare = Statement::Return {
            token: token(TokenKind::Return, "return"),
            value: None,
        };
        assert_eq!(bare.to_string(), "return ;");
        let with_value = Statement::Return {
            token: token(TokenKind::Return, "return"),
            value: Some(int(5)),
        };
        assert_eq!(with_value.to_string(), "return 5;");
    }

    #[test]
    fn test_block_display_separates_expressions() {
        let statement = |expression| Statement::Expression {
            token: token(TokenKind::Ident, "x"),
            expression,
        };
        let block = BlockStatement {
            token: token(TokenKind::LBrace, "{"),
            statements: vec![
                statement(Expression::Identifier(ident("a"))),
                statement(Expression::Prefix {
                    token: token(TokenKind::Minus, "-"),
                    operator: PrefixOperator::Minus,
                    right: Box::new(Expression::Identifier(ident("b"))),
                }),
            ],
        };
        assert_eq!(block.to_string(), "{ a; (-b) }");

        let empty = BlockStatement {
            token: token(TokenKind::LBrace, "{"),
            statements: vec![],
        };
        assert_eq!(empty.to_string(), "{}");
    }

    #[test]
    fn test_expression_display() {
        let infix = Expression::Infix {
            token: token(TokenKind::Plus, "+"),
            left: Box::new(int(1)),
            operator: InfixOperator::Plus,
            right: Box::new(int(2)),
        };
        assert_eq!(infix.to_string(), "(1 + 2)");
        assert_eq!(infix.token_literal(), "+");

        let hash = Expression::HashLiteral {
            token: token(TokenKind::LBrace, "{"),
            pairs: vec![(
                Expression::StringLiteral {
                    token: token(TokenKind::String, "one"),
                    value: "one".to_string(),
                },
                int(1),
            )],
        };
        assert_eq!(hash.to_string(), "{\"one\":1}");

        let array = Expression::ArrayLiteral {
            token: token(TokenKind::LBracket, "["),
            elements: vec![int(1), infix],
        };
        assert_eq!(array.to_string(), "[1, (1 + 2)]");
    }

    #[test]
    fn test_operator_from_token() {
        assert_eq!(
            InfixOperator::from_token(TokenKind::NotEq),
            Some(InfixOperator::NotEq)
        );
        assert_eq!(InfixOperator::from_token(TokenKind::Bang), None);
        assert_eq!(
            PrefixOperator::from_token(TokenKind::Bang),
            Some(PrefixOperator::Bang)
        );
    }
}
