use std::{borrow::Cow, fmt::Display};

use crate::{
    error::{CompileError, Reason},
    lex::{Token, TokenKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    UnaryPlus,
    UnaryMinus,
}

/// Precedence and number of operands of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub precedence: u8,
    pub arity: usize,
}

const OPERATORS: &[(&str, Op, Operator)] = &[
    ("*", Op::Star, Operator { precedence: 3, arity: 2 }),
    ("/", Op::Slash, Operator { precedence: 3, arity: 2 }),
    ("+", Op::Plus, Operator { precedence: 1, arity: 2 }),
    ("-", Op::Minus, Operator { precedence: 1, arity: 2 }),
    ("u+", Op::UnaryPlus, Operator { precedence: 100, arity: 1 }),
    ("u-", Op::UnaryMinus, Operator { precedence: 100, arity: 1 }),
];

impl Op {
    pub fn lookup(text: &str) -> Option<Op> {
        OPERATORS
            .iter()
            .find(|(name, ..)| *name == text)
            .map(|(_, op, _)| *op)
    }

    pub fn text(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op, _)| *op == self)
            .map_or("?", |(name, ..)| *name)
    }

    pub fn descriptor(self) -> Operator {
        OPERATORS
            .iter()
            .find(|(_, op, _)| *op == self)
            .map_or(Operator { precedence: 0, arity: 0 }, |(.., descriptor)| *descriptor)
    }

    /// The prefix form of `+` and `-`; other operators have none.
    pub fn unary(self) -> Option<Op> {
        match self {
            Op::Plus => Some(Op::UnaryPlus),
            Op::Minus => Some(Op::UnaryMinus),
            _ => None,
        }
    }
}

/// `+` and `-` are prefix operators unless they follow something that
/// produces a value.
fn is_prefix_position(previous: Option<TokenKind>) -> bool {
    !matches!(
        previous,
        Some(TokenKind::NumericLiteral | TokenKind::Unit | TokenKind::ParenClose)
    )
}

/// Tokens in postfix order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rpn<'de> {
    pub tokens: Vec<Token<'de>>,
}

impl Rpn<'_> {
    /// Did the expression name a unit anywhere?
    pub fn has_units(&self) -> bool {
        self.tokens.iter().any(|token| token.kind == TokenKind::Unit)
    }
}

impl Display for Rpn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token.text)?;
        }
        Ok(())
    }
}

/// Shunting-yard conversion from infix tokens to [`Rpn`].
#[derive(Default)]
pub struct Parser<'de> {
    holding: Vec<Token<'de>>,
    output: Vec<Token<'de>>,
    previous: Option<TokenKind>,
}

impl<'de> Parser<'de> {
    pub fn to_rpn(tokens: &[Token<'de>]) -> Result<Rpn<'de>, CompileError> {
        let mut parser = Parser::default();
        for token in tokens {
            parser.push(token.clone())?;
        }
        let rpn = parser.finish()?;
        tracing::debug!(target: "parse", %rpn, "converted to postfix");
        Ok(rpn)
    }

    fn push(&mut self, mut token: Token<'de>) -> Result<(), CompileError> {
        let kind = token.kind;
        match kind {
            TokenKind::NumericLiteral | TokenKind::Unit => self.output.push(token),
            TokenKind::ParenOpen => self.holding.push(token),
            TokenKind::ParenClose => {
                if self.holding.is_empty() {
                    return Err(CompileError::solve(
                        Reason::UnexpectedCloseParen,
                        Some((token.pos, 1)),
                    ));
                }
                loop {
                    match self.holding.pop() {
                        Some(Token {
                            kind: TokenKind::ParenOpen,
                            ..
                        }) => break,
                        Some(held) => self.output.push(held),
                        None => {
                            return Err(CompileError::solve(
                                Reason::NoOpenParen,
                                Some((token.pos, 1)),
                            ));
                        }
                    }
                }
            }
            TokenKind::Operator => {
                let Some(mut op) = Op::lookup(&token.text) else {
                    let at = Some((token.pos, token.text.len()));
                    return Err(CompileError::solve(
                        Reason::UnknownOperator(token.text.into_owned()),
                        at,
                    ));
                };
                if is_prefix_position(self.previous) {
                    if let Some(unary) = op.unary() {
                        op = unary;
                        token.text = Cow::Borrowed(unary.text());
                    }
                }

                let precedence = op.descriptor().precedence;
                while let Some(top) = self.holding.last() {
                    if top.kind == TokenKind::ParenOpen {
                        break;
                    }
                    let top_precedence = Op::lookup(&top.text)
                        .map_or(0, |op| op.descriptor().precedence);
                    if top_precedence < precedence {
                        break;
                    }
                    if let Some(held) = self.holding.pop() {
                        self.output.push(held);
                    }
                }
                self.holding.push(token);
            }
            TokenKind::Symbol | TokenKind::Unknown => {
                return Err(CompileError::solve(
                    Reason::UnsupportedToken(token.text.to_string()),
                    Some((token.pos, token.text.len())),
                ));
            }
        }
        self.previous = Some(kind);
        Ok(())
    }

    fn finish(mut self) -> Result<Rpn<'de>, CompileError> {
        while let Some(held) = self.holding.pop() {
            if held.kind == TokenKind::ParenOpen {
                return Err(CompileError::parse(Reason::UnbalancedParentheses, held.pos, 1));
            }
            self.output.push(held);
        }
        Ok(Rpn {
            tokens: self.output,
        })
    }
}
