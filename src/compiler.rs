use crate::{
    error::{CompileError, Reason},
    eval::{Evaluator, Solution},
    format,
    lex::{Lexer, Token},
    locale::{Locale, SystemLocale},
    normalize::Normalizer,
    parse::{Parser, Rpn},
    units::{Unit, UnitSystem, Units},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Show imperial results as `3+1/8in` rather than `3.125in`.
    pub imperial_fractions: bool,
    /// Let metric results settle on centimeters.
    pub centimeters: bool,
    /// Let imperial results settle on yards.
    pub yards: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            imperial_fractions: true,
            centimeters: false,
            yards: false,
        }
    }
}

/// Compiles one expression at a time: tokenize, convert to RPN, evaluate,
/// normalize, and format.
pub struct Compiler {
    units: Units,
    options: CompilerOptions,
    locale: Box<dyn Locale>,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Compiler {
            units: Units::new(UnitSystem::Generic),
            options,
            locale: Box::new(SystemLocale),
        }
    }

    pub fn with_locale(mut self, locale: impl Locale + 'static) -> Self {
        self.locale = Box::new(locale);
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn set_imperial_fractions(&mut self, enable: bool) {
        self.options.imperial_fractions = enable;
    }

    /// Replaces the unit tables with those of `system`.
    pub fn set_output_system(&mut self, system: UnitSystem) {
        self.units = Units::new(system);
    }

    pub fn output_system(&self) -> UnitSystem {
        self.units.system()
    }

    pub fn default_unit(&self) -> Unit {
        self.units.default_unit()
    }

    /// Display name of `unit`, `None` if the tables have no such scale.
    pub fn unit_name(&self, unit: &Unit) -> Option<&'static str> {
        self.units.name(unit)
    }

    pub fn eval(&self, input: &str, previous: Option<&Solution>) -> Result<Solution, CompileError> {
        let tokens = self.parse(input)?;
        self.solve(&tokens, previous)
    }

    pub fn format(&self, solution: &Solution) -> String {
        format::format(solution, &self.units, &self.options)
    }

    pub fn parse<'de>(&self, input: &'de str) -> Result<Vec<Token<'de>>, CompileError> {
        if input.is_empty() {
            return Err(CompileError::parse(Reason::NoInput, 0, 0));
        }
        Lexer::new(input, &self.units, self.locale.decimal_point()).collect()
    }

    pub fn rpn<'de>(&self, tokens: &[Token<'de>]) -> Result<Rpn<'de>, CompileError> {
        Parser::to_rpn(tokens)
    }

    pub fn solve(
        &self,
        tokens: &[Token<'_>],
        previous: Option<&Solution>,
    ) -> Result<Solution, CompileError> {
        let rpn = Parser::to_rpn(tokens)?;
        let mut solution = Evaluator::new(&self.units).solve(&rpn, previous)?;
        Normalizer::new(&self.units, &self.options).normalize(&mut solution);
        Ok(solution)
    }
}
