use std::{borrow::Cow, fmt::Display};

use crate::{
    charset::{self, BINARY_DIGITS, DIGITS, HEX_DIGITS, NUMERIC, OPERATORS, WHITESPACE},
    error::{CompileError, Reason},
    parse::Op,
    units::Units,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'de> {
    /// Byte offset of the first character of the token.
    pub pos: usize,
    pub kind: TokenKind,
    pub text: Cow<'de, str>,
    /// Literal value for numbers, scale factor for units.
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Unknown,
    NumericLiteral,
    Operator,
    ParenOpen,
    ParenClose,
    Symbol,
    Unit,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (pos, text, value) = (self.pos, &self.text, self.value);
        match self.kind {
            TokenKind::Unknown => write!(f, "[Unknown] @ ({pos}) : {text}"),
            TokenKind::NumericLiteral => {
                write!(f, "[Literal, Numeric] @ ({pos}) : {text} [{value}]")
            }
            TokenKind::Operator => write!(f, "[Operator] @ ({pos}) : {text}"),
            TokenKind::ParenOpen => write!(f, "[Parenthesis, Open] @ ({pos}) : {text}"),
            TokenKind::ParenClose => write!(f, "[Parenthesis, Close] @ ({pos}) : {text}"),
            TokenKind::Symbol => write!(f, "[Symbol] @ ({pos}) : {text}"),
            TokenKind::Unit => write!(f, "[Unit] @ ({pos}) : {text} [x{value}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewToken,
    NumericLiteral,
    PrefixedNumericLiteral,
    HexNumericLiteral,
    BinNumericLiteral,
    Operator,
    UnitOrSymbol,
}

enum Step<'de> {
    Goto(State),
    Emit(Token<'de>),
    Finish,
}

/// Splits an expression into tokens.
///
/// Each call to `next` runs the state machine from `NewToken` until one token
/// is complete. After the first error the lexer is exhausted.
pub struct Lexer<'de, 'u> {
    whole: &'de str,
    units: &'u Units,
    decimal_point: char,
    byte: usize,
    start: usize,
    /// Offsets of the parentheses still waiting for a `)`.
    open: Vec<usize>,
    buffer: String,
    dotted: bool,
    digits: usize,
    radix_value: f64,
    done: bool,
}

impl<'de, 'u> Lexer<'de, 'u> {
    pub fn new(input: &'de str, units: &'u Units, decimal_point: char) -> Self {
        Lexer {
            whole: input,
            units,
            decimal_point,
            byte: 0,
            start: 0,
            open: Vec::new(),
            buffer: String::new(),
            dotted: false,
            digits: 0,
            radix_value: 0.0,
            done: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.whole[self.byte..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.byte += c.len_utf8();
    }

    fn literal(&self) -> &'de str {
        &self.whole[self.start..self.byte]
    }

    fn token(&self, kind: TokenKind, value: f64) -> Token<'de> {
        Token {
            pos: self.start,
            kind,
            text: Cow::Borrowed(self.literal()),
            value,
        }
    }

    fn error(&self, reason: Reason, end: usize) -> CompileError {
        CompileError::parse(reason, self.start, end - self.start)
    }

    fn new_token(&mut self) -> Result<Step<'de>, CompileError> {
        self.start = self.byte;
        self.buffer.clear();
        self.dotted = false;

        let Some(c) = self.peek() else {
            if let Some(&open) = self.open.last() {
                return Err(CompileError::parse(Reason::UnbalancedParentheses, open, 1));
            }
            return Ok(Step::Finish);
        };

        if WHITESPACE.contains(c) {
            self.bump(c);
            return Ok(Step::Goto(State::NewToken));
        }

        if DIGITS.contains(c) {
            self.bump(c);
            self.buffer.push(c);
            return Ok(Step::Goto(if c == '0' {
                State::PrefixedNumericLiteral
            } else {
                State::NumericLiteral
            }));
        }

        // operators are matched without consuming the first character
        if OPERATORS.contains(c) {
            return Ok(Step::Goto(State::Operator));
        }

        match c {
            '(' => {
                self.bump(c);
                self.open.push(self.start);
                Ok(Step::Emit(self.token(TokenKind::ParenOpen, 0.0)))
            }
            ')' => {
                // a stray `)` is left for the parser to report
                self.bump(c);
                self.open.pop();
                Ok(Step::Emit(self.token(TokenKind::ParenClose, 0.0)))
            }
            c if charset::starts_symbol(c) => {
                self.bump(c);
                Ok(Step::Goto(State::UnitOrSymbol))
            }
            c => Err(self.error(Reason::UnknownCharacter(c), self.byte + c.len_utf8())),
        }
    }

    fn numeric_literal(&mut self) -> Result<Step<'de>, CompileError> {
        match self.peek() {
            Some(c) if DIGITS.contains(c) => {
                self.bump(c);
                self.buffer.push(c);
                Ok(Step::Goto(State::NumericLiteral))
            }
            Some(c) if NUMERIC.contains(c) || c == self.decimal_point => {
                if self.dotted {
                    return Err(self.error(Reason::BadNumericLiteral, self.byte + c.len_utf8()));
                }
                self.dotted = true;
                self.bump(c);
                self.buffer.push('.');
                Ok(Step::Goto(State::NumericLiteral))
            }
            _ => {
                let value = self
                    .buffer
                    .parse()
                    .map_err(|_| self.error(Reason::BadNumericLiteral, self.byte))?;
                let literal = self.literal();
                let text = if literal == self.buffer {
                    Cow::Borrowed(literal)
                } else {
                    Cow::Owned(self.buffer.clone())
                };
                Ok(Step::Emit(Token {
                    pos: self.start,
                    kind: TokenKind::NumericLiteral,
                    text,
                    value,
                }))
            }
        }
    }

    fn prefixed_numeric_literal(&mut self) -> Result<Step<'de>, CompileError> {
        self.digits = 0;
        self.radix_value = 0.0;
        match self.peek() {
            Some(c @ ('x' | 'X')) => {
                self.bump(c);
                Ok(Step::Goto(State::HexNumericLiteral))
            }
            Some(c @ ('b' | 'B')) => {
                self.bump(c);
                Ok(Step::Goto(State::BinNumericLiteral))
            }
            _ => Ok(Step::Goto(State::NumericLiteral)),
        }
    }

    fn radix_literal(&mut self, state: State) -> Result<Step<'de>, CompileError> {
        let (radix, class) = match state {
            State::HexNumericLiteral => (16, &HEX_DIGITS),
            _ => (2, &BINARY_DIGITS),
        };
        match self.peek() {
            Some(c) if class.contains(c) => {
                self.bump(c);
                self.digits += 1;
                let digit = c.to_digit(radix).unwrap_or_default();
                self.radix_value = self.radix_value * f64::from(radix) + f64::from(digit);
                Ok(Step::Goto(state))
            }
            _ if self.digits == 0 => Err(self.error(Reason::InvalidPrefixedLiteral, self.byte)),
            _ => Ok(Step::Emit(self.token(TokenKind::NumericLiteral, self.radix_value))),
        }
    }

    fn operator(&mut self) -> Result<Step<'de>, CompileError> {
        match self.peek() {
            Some(c) if OPERATORS.contains(c) => {
                let longer = format!("{}{c}", self.buffer);
                if Op::lookup(&longer).is_some() || Op::lookup(&self.buffer).is_none() {
                    self.bump(c);
                    self.buffer = longer;
                    Ok(Step::Goto(State::Operator))
                } else {
                    Ok(Step::Emit(self.token(TokenKind::Operator, 0.0)))
                }
            }
            _ if Op::lookup(&self.buffer).is_some() => {
                Ok(Step::Emit(self.token(TokenKind::Operator, 0.0)))
            }
            _ => Err(self.error(Reason::UnknownOperator(self.buffer.clone()), self.byte)),
        }
    }

    fn unit_or_symbol(&mut self) -> Result<Step<'de>, CompileError> {
        match self.peek() {
            Some(c) if charset::continues_symbol(c) => {
                self.bump(c);
                Ok(Step::Goto(State::UnitOrSymbol))
            }
            _ => Ok(Step::Emit(match self.units.get(self.literal()) {
                Some(unit) => self.token(TokenKind::Unit, unit.scale),
                None => self.token(TokenKind::Symbol, 0.0),
            })),
        }
    }
}

impl<'de> Iterator for Lexer<'de, '_> {
    type Item = Result<Token<'de>, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut state = State::NewToken;
        loop {
            let step = match state {
                State::NewToken => self.new_token(),
                State::NumericLiteral => self.numeric_literal(),
                State::PrefixedNumericLiteral => self.prefixed_numeric_literal(),
                State::HexNumericLiteral | State::BinNumericLiteral => self.radix_literal(state),
                State::Operator => self.operator(),
                State::UnitOrSymbol => self.unit_or_symbol(),
            };

            match step {
                Ok(Step::Goto(next)) => state = next,
                Ok(Step::Emit(token)) => {
                    tracing::debug!(target: "tokenize", "{token}");
                    return Some(Ok(token));
                }
                Ok(Step::Finish) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
