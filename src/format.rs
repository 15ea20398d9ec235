use crate::{
    compiler::CompilerOptions,
    eval::Solution,
    normalize::is_epsilon_integer,
    units::{Unit, UnitSystem, Units, scale},
};

const DENOMINATORS: [i64; 14] = [2, 3, 4, 5, 6, 7, 8, 10, 12, 16, 32, 64, 128, 1000];

/// Shown in place of a unit name when the scale has no entry in the tables.
pub const UNKNOWN_UNIT: &str = "<error>";

/// Renders `solution` as text, e.g. `5.9144m`, `3+1/8in` or `6ft+5in`.
pub fn format(solution: &Solution, units: &Units, options: &CompilerOptions) -> String {
    let unit_name = |unit: &Unit| units.name(unit).unwrap_or(UNKNOWN_UNIT);
    let value = solution.normalized();

    let mut out = if is_epsilon_integer(value) {
        whole(value)
    } else if solution.units.system == UnitSystem::Imperial && options.imperial_fractions {
        let integral = value.trunc();
        let frac = value.abs().fract();
        let feet = solution.units.scale == scale::FOOT;

        match DENOMINATORS
            .iter()
            .find(|&&denom| is_epsilon_integer(frac * denom as f64))
        {
            Some(&denom) => {
                let numerator = (frac * denom as f64).round() as i64;
                let feet_and_inches = denom == 12 && feet;
                let mut out = String::new();

                if integral != 0.0 {
                    out.push_str(&whole(integral));
                    if feet_and_inches {
                        out.push_str(unit_name(&solution.units));
                    }
                    out.push(if value < 0.0 { '-' } else { '+' });
                } else if value < 0.0 {
                    out.push('-');
                }

                if feet_and_inches {
                    out.push_str(&numerator.to_string());
                    out.push_str(unit_name(&Unit::new(scale::INCH, UnitSystem::Imperial)));
                    return out;
                }
                out.push_str(&format!("{numerator}/{denom}"));
                out
            }
            None => decimal(value),
        }
    } else {
        decimal(value)
    };

    out.push_str(unit_name(&solution.units));
    out
}

/// A whole number straight from the float, so magnitudes past `i64` keep
/// their digits.
fn whole(value: f64) -> String {
    match value.round() {
        rounded if rounded == 0.0 => "0".to_string(),
        rounded => format!("{rounded:.0}"),
    }
}

/// Six decimal places with trailing zeros dropped.
fn decimal(value: f64) -> String {
    let fixed = format!("{value:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}
