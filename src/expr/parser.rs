//! Recursive-descent parser for the supported expression subset.
//!
//! Precedence, loosest first: `||`, `&&`, equality, relational, additive,
//! multiplicative, unary `!`/`-`, postfix (member, index, call), primary.

use super::Failure;
use super::lexer::{TemplatePiece, Token, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    fn from_punct(punct: &str) -> Option<Self> {
        Some(match punct {
            "||" => BinOp::Or,
            "&&" => BinOp::And,
            "==" | "===" => BinOp::Eq,
            "!=" | "!==" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Rem,
            _ => return None,
        })
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne => 3,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 6,
        }
    }

    pub(crate) fn is_logical(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }

    pub(crate) fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Var(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Str(String),
    Num(String),
    Bool(bool),
    Nil,
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Template(Vec<TemplatePart>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplatePart {
    Text(String),
    Expr(Expr),
}

/// Deepest expression tree the parser will build. Bindings nest a handful
/// of levels; anything past this is rejected instead of recursing further.
const MAX_DEPTH: usize = 64;

/// Parse a complete expression; trailing tokens are an error.
pub(crate) fn parse(input: &str) -> Result<Expr, Failure> {
    parse_at(input, 0)
}

fn parse_at(input: &str, depth: usize) -> Result<Expr, Failure> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(Failure::Syntax("empty expression".to_string()));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth,
    };
    let expr = parser.binary(0)?;
    if let Some(token) = parser.peek() {
        return Err(Failure::Syntax(format!("unexpected {}", describe(token))));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Levels of the tree under construction, including enclosing templates.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), Failure> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(Failure::Syntax(format!("expected `{punct}`")))
        }
    }

    /// Enter one more level of the tree.
    fn descend(&mut self) -> Result<(), Failure> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Failure::Unsupported("nesting too deep".to_string()));
        }
        Ok(())
    }

    /// Precedence climbing over binary operators.
    fn binary(&mut self, min_prec: u8) -> Result<Expr, Failure> {
        let base = self.depth;
        self.descend()?;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct(p)) => match BinOp::from_punct(p) {
                    Some(op) if op.precedence() > min_prec => op,
                    _ => break,
                },
                _ => break,
            };
            self.pos += 1;
            // Each operator in a chain adds a level to the left-leaning tree.
            self.descend()?;
            let rhs = self.binary(op.precedence())?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, Failure> {
        if self.eat("!") {
            let base = self.depth;
            self.descend()?;
            let inner = self.unary()?;
            self.depth = base;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.eat("-") {
            return match self.next() {
                Some(Token::Number(n)) => self.postfix(Expr::Num(format!("-{n}"))),
                _ => Err(Failure::Unsupported("unary minus".to_string())),
            };
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn postfix(&mut self, mut expr: Expr) -> Result<Expr, Failure> {
        let base = self.depth;
        loop {
            if matches!(self.peek(), Some(Token::Punct(p)) if matches!(*p, "." | "[" | "(")) {
                self.descend()?;
            }
            if self.eat(".") {
                match self.next() {
                    Some(Token::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    _ => return Err(Failure::Syntax("expected property name".to_string())),
                }
            } else if self.eat("[") {
                let key = self.binary(0)?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(key));
            } else if self.eat("(") {
                let mut args = Vec::new();
                if !self.eat(")") {
                    loop {
                        args.push(self.binary(0)?);
                        if self.eat(")") {
                            break;
                        }
                        self.expect(",")?;
                    }
                }
                expr = Expr::Call(Box::new(expr), args);
            } else {
                self.depth = base;
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, Failure> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                "null" | "undefined" | "nil" => Expr::Nil,
                _ => Expr::Var(name),
            }),
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Template(pieces)) => {
                let mut parts = Vec::with_capacity(pieces.len());
                for piece in pieces {
                    parts.push(match piece {
                        TemplatePiece::Text(text) => TemplatePart::Text(text),
                        TemplatePiece::Expr(source) => TemplatePart::Expr(parse_at(&source, self.depth + 1)?),
                    });
                }
                Ok(Expr::Template(parts))
            }
            Some(Token::Punct("(")) => {
                let inner = self.binary(0)?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(token) => Err(Failure::Syntax(format!("unexpected {}", describe(&token)))),
            None => Err(Failure::Syntax("unexpected end of expression".to_string())),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier `{name}`"),
        Token::Number(n) => format!("number `{n}`"),
        Token::Str(_) => "string literal".to_string(),
        Token::Template(_) => "template literal".to_string(),
        Token::Punct(p) => format!("`{p}`"),
    }
}
