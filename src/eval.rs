use crate::{
    error::{CompileError, Reason},
    lex::{Token, TokenKind},
    parse::{Op, Rpn},
    units::{Unit, Units},
};

/// A magnitude and the unit it is displayed in.
///
/// `value` is always expressed in canonical base units (meters or thousandths
/// of an inch); `units.scale` only decides how it is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub value: f64,
    pub units: Unit,
}

impl Solution {
    pub fn new(value: f64, units: Unit) -> Self {
        Solution { value, units }
    }

    /// The value as a count of `units`.
    pub fn normalized(&self) -> f64 {
        self.value / self.units.scale
    }
}

/// Evaluates postfix tokens on a stack of [`Solution`]s.
pub struct Evaluator<'u> {
    units: &'u Units,
    stack: Vec<Solution>,
}

impl<'u> Evaluator<'u> {
    pub fn new(units: &'u Units) -> Self {
        Evaluator {
            units,
            stack: Vec::new(),
        }
    }

    /// Runs `rpn` to a single solution, then settles its unit: expressions
    /// without a unit continue in `previous`'s unit, and foreign units are
    /// replaced by the base unit of the output system.
    pub fn solve(
        mut self,
        rpn: &Rpn<'_>,
        previous: Option<&Solution>,
    ) -> Result<Solution, CompileError> {
        for token in &rpn.tokens {
            self.step(token)?;
        }

        let mut result = match self.stack.as_slice() {
            [result] => *result,
            _ => return Err(CompileError::solve(Reason::Indeterminate, None)),
        };

        if !rpn.has_units() {
            let units = match previous {
                Some(previous) if !previous.units.is_generic() => previous.units,
                _ => self.units.default_unit(),
            };
            result = Solution::new(result.value * units.scale, units);
        }

        let system = self.units.system();
        if result.units.system != system {
            result.units = Unit::new(1.0, system);
        }

        tracing::debug!(
            target: "solve",
            value = result.value,
            scale = result.units.scale,
            system = %result.units.system,
            "solved"
        );
        Ok(result)
    }

    fn pop(&mut self, token: &Token<'_>) -> Result<Solution, CompileError> {
        let at = Some((token.pos, token.text.len()));
        self.stack
            .pop()
            .ok_or_else(|| CompileError::solve(Reason::Malformed, at))
    }

    fn step(&mut self, token: &Token<'_>) -> Result<(), CompileError> {
        let at = Some((token.pos, token.text.len()));
        let result = match token.kind {
            TokenKind::NumericLiteral => Solution::new(token.value, Unit::generic()),
            TokenKind::Unit => {
                let Some(unit) = self.units.get(&token.text) else {
                    return Err(CompileError::solve(
                        Reason::UnsupportedToken(token.text.to_string()),
                        at,
                    ));
                };
                let operand = self.pop(token)?;
                Solution::new(operand.value * unit.scale, unit)
            }
            TokenKind::Operator => {
                let Some(op) = Op::lookup(&token.text) else {
                    return Err(CompileError::solve(
                        Reason::UnknownOperator(token.text.to_string()),
                        at,
                    ));
                };
                if op.descriptor().arity == 1 {
                    let operand = self.pop(token)?;
                    self.unary(op, operand)
                } else {
                    let rhs = self.pop(token)?;
                    let lhs = self.pop(token)?;
                    self.binary(op, lhs, rhs)
                        .ok_or_else(|| CompileError::solve(Reason::DivisionByZero, at))?
                }
            }
            _ => {
                return Err(CompileError::solve(
                    Reason::UnsupportedToken(token.text.to_string()),
                    at,
                ));
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn unary(&self, op: Op, operand: Solution) -> Solution {
        match op {
            Op::UnaryMinus => Solution::new(-operand.value, operand.units),
            _ => operand,
        }
    }

    /// Combines two operands; `None` on division by zero.
    fn binary(&self, op: Op, lhs: Solution, rhs: Solution) -> Option<Solution> {
        let base = Unit::new(1.0, self.units.system());
        let (l, r) = (lhs.normalized(), rhs.normalized());

        Some(match op {
            Op::Slash => {
                if r == 0.0 {
                    return None;
                }
                // TODO: a ratio of lengths keeps the divisor's unit; confirm before relying on it
                if rhs.units.is_generic() {
                    Solution::new(l / r, base)
                } else {
                    Solution::new(l / r * rhs.units.scale, rhs.units)
                }
            }
            Op::Star => Solution::new(lhs.value * rhs.value, base),
            Op::Plus | Op::Minus => {
                let combine = |a: f64, b: f64| if op == Op::Plus { a + b } else { a - b };
                if rhs.units.is_generic() {
                    Solution::new(combine(l, r) * lhs.units.scale, lhs.units)
                } else if lhs.units.is_generic() {
                    Solution::new(combine(l, r) * rhs.units.scale, rhs.units)
                } else {
                    // both already in base units
                    Solution::new(combine(lhs.value, rhs.value), Unit::generic())
                }
            }
            Op::UnaryPlus | Op::UnaryMinus => return Some(self.unary(op, rhs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::Stage,
        lex::Lexer,
        parse::Parser,
        units::{UnitSystem, scale},
    };

    fn solve(
        input: &str,
        system: UnitSystem,
        previous: Option<&Solution>,
    ) -> Result<Solution, CompileError> {
        let units = Units::new(system);
        let tokens: Vec<_> = Lexer::new(input, &units, '.').collect::<Result<_, _>>()?;
        let rpn = Parser::to_rpn(&tokens)?;
        Evaluator::new(&units).solve(&rpn, previous)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn plain_arithmetic() {
        let result = solve("2 * 3", UnitSystem::Metric, None).unwrap();
        assert_eq!(result, Solution::new(6.0, Unit::new(1.0, UnitSystem::Metric)));

        let result = solve("1 + 2 * 3 - 4 / 2", UnitSystem::Generic, None).unwrap();
        assert_eq!(result, Solution::new(5.0, Unit::generic()));

        let result = solve("-(2 + 3)", UnitSystem::Generic, None).unwrap();
        assert_eq!(result.value, -5.0);
    }

    #[test]
    fn mixed_units_add_in_base_units() {
        let result = solve("5m + 3ft", UnitSystem::Metric, None).unwrap();
        assert!(close(result.value, 5.9144), "{result:?}");
        assert_eq!(result.units, Unit::new(1.0, UnitSystem::Metric));
    }

    #[test]
    fn mixed_units_subtract_in_base_units() {
        let result = solve("1m - 10cm", UnitSystem::Metric, None).unwrap();
        assert!(close(result.value, 0.9), "{result:?}");
    }

    #[test]
    fn bare_number_joins_the_unit_operand() {
        let result = solve("120mm + 5", UnitSystem::Metric, None).unwrap();
        assert!(close(result.value, 0.125), "{result:?}");
        assert_eq!(result.units, Unit::new(scale::MILLIMETER, UnitSystem::Metric));

        let result = solve("10 - 2in", UnitSystem::Imperial, None).unwrap();
        assert_eq!(result, Solution::new(8000.0, Unit::new(scale::INCH, UnitSystem::Imperial)));
    }

    #[test]
    fn foreign_units_become_base_units() {
        let result = solve("1in", UnitSystem::Metric, None).unwrap();
        assert_eq!(result, Solution::new(0.0254, Unit::new(1.0, UnitSystem::Metric)));
    }

    #[test]
    fn division_keeps_the_divisor_unit() {
        let result = solve("6m / 2m", UnitSystem::Metric, None).unwrap();
        assert_eq!(result, Solution::new(3.0, Unit::new(1.0, UnitSystem::Metric)));

        let result = solve("6m / 2", UnitSystem::Metric, None).unwrap();
        assert_eq!(result, Solution::new(3.0, Unit::new(1.0, UnitSystem::Metric)));

        let result = solve("1ft / 2in", UnitSystem::Imperial, None).unwrap();
        // each side is first counted in its own unit: 1 / 2
        assert_eq!(result, Solution::new(500.0, Unit::new(scale::INCH, UnitSystem::Imperial)));
    }

    #[test]
    fn division_by_zero() {
        let err = solve("1 / (2 - 2)", UnitSystem::Generic, None).unwrap_err();
        assert_matches!(err.reason(), Reason::DivisionByZero);
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn unitless_result_inherits_previous_unit() {
        let previous = Solution::new(0.12, Unit::new(scale::MILLIMETER, UnitSystem::Metric));
        let result = solve("+5", UnitSystem::Metric, Some(&previous)).unwrap();
        assert!(close(result.value, 0.005), "{result:?}");
        assert_eq!(result.units, previous.units);

        let previous = Solution::new(0.12, Unit::new(1.0, UnitSystem::Metric));
        let result = solve("+5", UnitSystem::Metric, Some(&previous)).unwrap();
        assert_eq!(result, Solution::new(5.0, Unit::new(1.0, UnitSystem::Metric)));
    }

    #[test]
    fn unitless_result_uses_default_unit() {
        let result = solve("2", UnitSystem::Imperial, None).unwrap();
        assert_eq!(result, Solution::new(24000.0, Unit::new(scale::FOOT, UnitSystem::Imperial)));

        let previous = Solution::new(3.0, Unit::generic());
        let result = solve("2", UnitSystem::Imperial, Some(&previous)).unwrap();
        assert_eq!(result.units.scale, scale::FOOT);
    }

    #[test]
    fn malformed() {
        let err = solve("1 +", UnitSystem::Generic, None).unwrap_err();
        assert_eq!(err.stage(), Stage::Solve);
        assert_matches!(err.reason(), Reason::Malformed);

        let err = solve("mm", UnitSystem::Metric, None).unwrap_err();
        assert_matches!(err.reason(), Reason::Malformed);
    }

    #[test]
    fn indeterminate() {
        let err = solve("1 2", UnitSystem::Generic, None).unwrap_err();
        assert_matches!(err.reason(), Reason::Indeterminate);

        let err = solve("3ft 6in", UnitSystem::Imperial, None).unwrap_err();
        assert_matches!(err.reason(), Reason::Indeterminate);

        let err = solve(" ", UnitSystem::Generic, None).unwrap_err();
        assert_matches!(err.reason(), Reason::Indeterminate);
    }
}
