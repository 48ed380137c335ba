//! Arithmetic scoring formulas over project counters.
//!
//! A formula is an expression such as
//! `starsCount * 3 + forksCount * 2 + contributorsCount * 5 + commitsCount / 10`.
//! It supports decimal literals, `+ - * /`, unary minus and parentheses.
//! Identifiers name project counters and may carry a `project.` prefix.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, instrument};

use crate::db::Project;
use crate::scoring::ScoringError;

/// Computes a ranking score for a project.
pub trait Scorer {
    /// Returns the score of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] if the score cannot be computed.
    fn score(&self, project: &Project) -> Result<i32, ScoringError>;
}

/// Project counter that a formula can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ProjectField {
    /// Number of stars.
    StarsCount,
    /// Number of forks.
    ForksCount,
    /// Number of commits.
    CommitsCount,
    /// Number of distinct contributors.
    ContributorsCount,
}

impl ProjectField {
    fn value(self, project: &Project) -> f64 {
        let value = match self {
            Self::StarsCount => *project.stars_count(),
            Self::ForksCount => *project.forks_count(),
            Self::CommitsCount => *project.commits_count(),
            Self::ContributorsCount => *project.contributors_count(),
        };
        f64::from(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Field(ProjectField),
    Neg(Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
}

impl Expr {
    fn eval(&self, project: &Project) -> Result<f64, ScoringError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Field(field) => Ok(field.value(project)),
            Self::Neg(inner) => Ok(-inner.eval(project)?),
            Self::Binary(lhs, op, rhs) => {
                let lhs = lhs.eval(project)?;
                let rhs = rhs.eval(project)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(ScoringError::new("division by zero")),
                    BinaryOp::Div => Ok(lhs / rhs),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ScoringError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' => {
                chars.next();
                tokens.push(Token::Op(match c {
                    '+' => BinaryOp::Add,
                    '-' => BinaryOp::Sub,
                    '*' => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                }));
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = pos;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &source[pos..end];
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| ScoringError::new(format!("invalid number '{}'", literal)))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(source[pos..end].to_string()));
            }
            other => {
                return Err(ScoringError::new(format!(
                    "unexpected character '{}' at offset {}",
                    other, pos
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
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

    fn expression(&mut self) -> Result<Expr, ScoringError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ScoringError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ScoringError> {
        if let Some(Token::Op(BinaryOp::Sub)) = self.peek() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ScoringError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Ident(name)) => {
                let field_name = name.strip_prefix("project.").unwrap_or(&name);
                let field = ProjectField::from_str(field_name).map_err(|_| {
                    let known: Vec<String> = ProjectField::iter().map(|f| f.to_string()).collect();
                    ScoringError::new(format!(
                        "unknown field '{}', expected one of: {}",
                        name,
                        known.join(", ")
                    ))
                })?;
                Ok(Expr::Field(field))
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ScoringError::new("missing closing parenthesis")),
                }
            }
            Some(token) => Err(ScoringError::new(format!("unexpected token {:?}", token))),
            None => Err(ScoringError::new("unexpected end of formula")),
        }
    }
}

/// Scorer evaluating an arithmetic formula over project counters.
///
/// The result is rounded to the nearest integer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaScorer {
    source: String,
    expr: Expr,
}

impl FormulaScorer {
    /// Parses a formula.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] if the formula is empty or malformed, or
    /// references an unknown field.
    #[instrument]
    pub fn parse(source: &str) -> Result<Self, ScoringError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ScoringError::new("empty scoring formula"));
        }

        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(ScoringError::new(format!(
                "unexpected trailing token {:?}",
                token
            )));
        }

        debug!(formula = %source, "Scoring formula parsed");
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// Returns the formula text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for FormulaScorer {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FormulaScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Scorer for FormulaScorer {
    #[instrument(skip(self, project), fields(project = %project.name()))]
    fn score(&self, project: &Project) -> Result<i32, ScoringError> {
        let value = self.expr.eval(project)?.round();
        if !value.is_finite() || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            return Err(ScoringError::new(format!(
                "score {} is out of range",
                value
            )));
        }
        Ok(value as i32)
    }
}
