//! Picks the most readable display unit for a solved value.

use crate::{
    compiler::CompilerOptions,
    eval::Solution,
    units::{UnitSystem, Units, scale},
};

/// Is `d` within 1e-14 of a whole number?
pub fn is_epsilon_integer(d: f64) -> bool {
    (d - d.round()).abs() <= 1e-14
}

pub struct Normalizer<'a> {
    units: &'a Units,
    options: &'a CompilerOptions,
}

impl<'a> Normalizer<'a> {
    pub fn new(units: &'a Units, options: &'a CompilerOptions) -> Self {
        Normalizer { units, options }
    }

    /// Moves `solution` up or down the unit ladder of the output system until
    /// no rung fits better. Zero always lands on the default unit.
    pub fn normalize(&self, solution: &mut Solution) {
        let system = self.units.system();
        if system == UnitSystem::Generic {
            return;
        }
        if solution.value == 0.0 {
            solution.units = self.units.default_unit();
            return;
        }

        loop {
            let next = match system {
                UnitSystem::Imperial => self.imperial_step(solution),
                _ => self.metric_step(solution),
            };
            let Some(next) = next else {
                break;
            };
            tracing::trace!(target: "solve", from = solution.units.scale, to = next, "normalize");
            solution.units.scale = next;
        }
    }

    fn imperial_step(&self, solution: &Solution) -> Option<f64> {
        let current = solution.units.scale;
        let n = solution.normalized().abs();
        let divides = |by: f64| is_epsilon_integer(solution.value / by);

        if n >= scale::INCH && current == scale::THOU {
            Some(scale::INCH)
        } else if n > 72.0 && current == scale::INCH {
            Some(scale::FOOT)
        } else if n >= 12.0 && current == scale::INCH && divides(scale::FOOT) {
            Some(scale::FOOT)
        } else if self.options.yards
            && n >= 12.0
            && current == scale::FOOT
            && divides(scale::YARD)
        {
            Some(scale::YARD)
        } else if !self.options.yards && current == scale::YARD {
            Some(scale::FOOT)
        } else if n >= 5280.0 && current == scale::FOOT && divides(scale::MILE) {
            Some(scale::MILE)
        } else if n >= 1760.0 && current == scale::YARD && divides(scale::MILE) {
            Some(scale::MILE)
        } else {
            None
        }
    }

    fn metric_step(&self, solution: &Solution) -> Option<f64> {
        let current = solution.units.scale;
        let n = solution.normalized().abs();
        let centimeters = self.options.centimeters;

        if n >= 1000.0 && current == scale::KILOMETER {
            Some(scale::MEGAMETER)
        } else if n >= 1000.0 && current == scale::METER {
            Some(scale::KILOMETER)
        } else if n >= 1000.0 && current == scale::MILLIMETER {
            Some(scale::METER)
        } else if centimeters && n >= 100.0 && current == scale::MILLIMETER {
            Some(scale::CENTIMETER)
        } else if current == scale::CENTIMETER && (!centimeters || n >= 100.0) {
            Some(scale::METER)
        } else if n < 1.0 && current == scale::MEGAMETER {
            Some(scale::KILOMETER)
        } else if n < 1.0 && current == scale::KILOMETER {
            Some(scale::METER)
        } else if n < 1.0 && current == scale::METER {
            Some(if centimeters { scale::CENTIMETER } else { scale::MILLIMETER })
        } else if centimeters && n < 1.0 && current == scale::CENTIMETER {
            Some(scale::MILLIMETER)
        } else {
            None
        }
    }
}
