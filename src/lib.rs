//! A small calculator for lengths.
//!
//! Expressions such as `5m + 3ft` or `3in + 1/8in` are tokenized, converted to
//! reverse Polish notation, evaluated on a stack and shown in the most readable
//! unit of the selected [`UnitSystem`].

pub mod charset;
pub mod compiler;
pub mod error;
pub mod eval;
pub mod format;
pub mod lex;
pub mod locale;
pub mod normalize;
pub mod parse;
pub mod session;
pub mod units;

pub use compiler::{Compiler, CompilerOptions};
pub use error::{CompileError, Reason, Stage};
pub use eval::Solution;
pub use lex::{Lexer, Token, TokenKind};
pub use locale::{FixedLocale, Locale, SystemLocale};
pub use parse::{Parser, Rpn};
pub use session::{Reply, Session};
pub use units::{Unit, UnitSystem, Units};
