use std::fmt::Display;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The compilation stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Tokenizing the input text.
    Parse,
    /// Converting to RPN and evaluating it.
    Solve,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Parse => write!(f, "PARSE"),
            Stage::Solve => write!(f, "SOLVE"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    #[error("No input")]
    NoInput,
    #[error("Unknown character '{0}'")]
    UnknownCharacter(char),
    #[error("Bad numeric construction")]
    BadNumericLiteral,
    #[error("Invalid prefixed numeric literal")]
    InvalidPrefixedLiteral,
    #[error("Parenthesis '(' & ')' not balanced")]
    UnbalancedParentheses,
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Expression is malformed")]
    Malformed,
    #[error("Unsupported token '{0}'")]
    UnsupportedToken(String),
    #[error("Unexpected close parenthesis")]
    UnexpectedCloseParen,
    #[error("Unexpected close parenthesis, no open parenthesis found")]
    NoOpenParen,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Indeterminate expression")]
    Indeterminate,
}

impl Reason {
    fn help(&self) -> Option<String> {
        let help = match self {
            Reason::NoInput => "type a number, optionally followed by a unit such as `mm` or `ft`",
            Reason::UnknownCharacter(c) => {
                return Some(format!("remove or correct the character: `{c}`"));
            }
            Reason::BadNumericLiteral => "a number may contain only one decimal point",
            Reason::InvalidPrefixedLiteral => "`0x` and `0b` need at least one digit",
            Reason::UnbalancedParentheses => "every `(` needs a matching `)`",
            Reason::UnknownOperator(_) => "the supported operators are `+`, `-`, `*` and `/`",
            Reason::UnsupportedToken(_) => {
                "only numbers, units, operators and parentheses are understood"
            }
            Reason::UnexpectedCloseParen | Reason::NoOpenParen => "remove the extra `)`",
            Reason::Malformed | Reason::DivisionByZero | Reason::Indeterminate => return None,
        };
        Some(help.to_string())
    }
}

/// An error raised while compiling an expression.
///
/// Parse errors always point at the offending bytes of the input; solve errors
/// do when the token that caused them is known.
#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("[PARSE] {reason}")]
    #[diagnostic(code(numeric::parse))]
    Parse {
        reason: Reason,

        #[label("here")]
        span: SourceSpan,

        #[help]
        help: Option<String>,
    },

    #[error("[SOLVE] {reason}")]
    #[diagnostic(code(numeric::solve))]
    Solve {
        reason: Reason,

        #[label("here")]
        span: Option<SourceSpan>,

        #[help]
        help: Option<String>,
    },
}

impl CompileError {
    pub fn parse(reason: Reason, offset: usize, len: usize) -> Self {
        CompileError::Parse {
            help: reason.help(),
            reason,
            span: SourceSpan::from(offset..offset + len),
        }
    }

    pub fn solve(reason: Reason, at: Option<(usize, usize)>) -> Self {
        CompileError::Solve {
            help: reason.help(),
            reason,
            span: at.map(|(offset, len)| SourceSpan::from(offset..offset + len)),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Parse { .. } => Stage::Parse,
            CompileError::Solve { .. } => Stage::Solve,
        }
    }

    pub fn reason(&self) -> &Reason {
        match self {
            CompileError::Parse { reason, .. } | CompileError::Solve { reason, .. } => reason,
        }
    }

    /// Byte offset into the input the error refers to, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::Parse { span, .. } => Some(span.offset()),
            CompileError::Solve { span, .. } => span.map(|span| span.offset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_is_prefixed_with_stage() {
        let err = CompileError::parse(Reason::UnknownCharacter('#'), 3, 1);
        assert_eq!(err.to_string(), "[PARSE] Unknown character '#'");
        assert_eq!(err.stage(), Stage::Parse);
        assert_eq!(err.offset(), Some(3));

        let err = CompileError::solve(Reason::Indeterminate, None);
        assert_eq!(err.to_string(), "[SOLVE] Indeterminate expression");
        assert_eq!(err.stage(), Stage::Solve);
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn help_follows_reason() {
        let err = CompileError::solve(Reason::NoOpenParen, Some((4, 1)));
        let CompileError::Solve { help, .. } = err else {
            panic!("expected a solve error");
        };
        assert_eq!(help.as_deref(), Some("remove the extra `)`"));
    }
}
