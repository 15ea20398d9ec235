use std::{collections::HashMap, fmt::Display, str::FromStr};

/// Which family of units a result is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitSystem {
    #[default]
    Generic,
    Metric,
    Imperial,
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Generic => write!(f, "Generic"),
            UnitSystem::Metric => write!(f, "Metric"),
            UnitSystem::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(UnitSystem::Generic),
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// How many canonical base units one of this unit is worth. Always positive.
    pub scale: f64,
    pub system: UnitSystem,
}

impl Unit {
    pub const fn new(scale: f64, system: UnitSystem) -> Self {
        Unit { scale, system }
    }

    pub const fn generic() -> Self {
        Unit::new(1.0, UnitSystem::Generic)
    }

    pub fn is_generic(&self) -> bool {
        self.system == UnitSystem::Generic
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::generic()
    }
}

/// Scale factors, in meters for the metric output system and in thousandths
/// of an inch for the imperial one.
pub mod scale {
    pub const MILLIMETER: f64 = 0.001;
    pub const CENTIMETER: f64 = 0.01;
    pub const METER: f64 = 1.0;
    pub const KILOMETER: f64 = 1000.0;
    pub const MEGAMETER: f64 = 1_000_000.0;

    pub const METRIC_THOU: f64 = METRIC_INCH / 1000.0;
    pub const METRIC_INCH: f64 = 0.0254;
    pub const METRIC_FOOT: f64 = 0.3048;
    pub const METRIC_YARD: f64 = 0.9144;
    pub const METRIC_MILE: f64 = 1609.344;

    pub const THOU: f64 = 1.0;
    pub const INCH: f64 = 1000.0;
    pub const FOOT: f64 = 12.0 * INCH;
    pub const YARD: f64 = 3.0 * FOOT;
    pub const MILE: f64 = 5280.0 * FOOT;
}

struct Family {
    system: UnitSystem,
    display: &'static str,
    names: &'static [&'static str],
    meters: f64,
    thou: f64,
}

const FAMILIES: &[Family] = &[
    Family {
        system: UnitSystem::Metric,
        display: "mm",
        names: &["mm"],
        meters: scale::MILLIMETER,
        thou: 1.0 / scale::METRIC_INCH,
    },
    Family {
        system: UnitSystem::Metric,
        display: "cm",
        names: &["cm"],
        meters: scale::CENTIMETER,
        thou: 10.0 / scale::METRIC_INCH,
    },
    Family {
        system: UnitSystem::Metric,
        display: "m",
        names: &["m"],
        meters: scale::METER,
        thou: 1000.0 / scale::METRIC_INCH,
    },
    Family {
        system: UnitSystem::Metric,
        display: "Km",
        names: &["Km", "km"],
        meters: scale::KILOMETER,
        thou: 1_000_000.0 / scale::METRIC_INCH,
    },
    Family {
        system: UnitSystem::Metric,
        display: "Mm",
        names: &["Mm"],
        meters: scale::MEGAMETER,
        thou: 1_000_000_000.0 / scale::METRIC_INCH,
    },
    Family {
        system: UnitSystem::Imperial,
        display: "th",
        names: &["th", "thou", "mil"],
        meters: scale::METRIC_THOU,
        thou: scale::THOU,
    },
    Family {
        system: UnitSystem::Imperial,
        display: "in",
        names: &["in", "inch", "inches", "\""],
        meters: scale::METRIC_INCH,
        thou: scale::INCH,
    },
    Family {
        system: UnitSystem::Imperial,
        display: "ft",
        names: &["ft", "foot", "feet", "'"],
        meters: scale::METRIC_FOOT,
        thou: scale::FOOT,
    },
    Family {
        system: UnitSystem::Imperial,
        display: "yd",
        names: &["yd", "yard", "yds", "yards"],
        meters: scale::METRIC_YARD,
        thou: scale::YARD,
    },
    Family {
        system: UnitSystem::Imperial,
        display: "mi",
        names: &["mi", "mile", "miles"],
        meters: scale::METRIC_MILE,
        thou: scale::MILE,
    },
];

/// The unit names understood for one output system, and the reverse lookup
/// used to display a result.
///
/// Both tables are rebuilt from the same constants, so a scale produced by a
/// unit name always has a display name.
#[derive(Debug, Clone)]
pub struct Units {
    system: UnitSystem,
    by_name: HashMap<&'static str, Unit>,
    names: HashMap<u64, &'static str>,
}

impl Units {
    pub fn new(system: UnitSystem) -> Self {
        let mut by_name = HashMap::new();
        let mut names = HashMap::new();

        for family in FAMILIES {
            let scale = match system {
                UnitSystem::Generic => continue,
                UnitSystem::Metric => family.meters,
                UnitSystem::Imperial => family.thou,
            };
            let unit = Unit::new(scale, family.system);
            for name in family.names {
                by_name.insert(*name, unit);
            }
            names.insert(scale.to_bits(), family.display);
        }

        Units {
            system,
            by_name,
            names,
        }
    }

    pub fn system(&self) -> UnitSystem {
        self.system
    }

    pub fn get(&self, name: &str) -> Option<Unit> {
        self.by_name.get(name).copied()
    }

    /// The unit a fresh previous solution should start from.
    pub fn default_unit(&self) -> Unit {
        match self.system {
            UnitSystem::Generic | UnitSystem::Metric => Unit::new(1.0, self.system),
            UnitSystem::Imperial => Unit::new(scale::FOOT, self.system),
        }
    }

    /// Display name of `unit`: empty for generic units, `None` when no unit of
    /// this system has exactly that scale.
    pub fn name(&self, unit: &Unit) -> Option<&'static str> {
        if unit.is_generic() {
            return Some("");
        }
        self.names.get(&unit.scale.to_bits()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn metric_tables() {
        let units = Units::new(UnitSystem::Metric);
        assert_eq!(units.get("mm"), Some(Unit::new(0.001, UnitSystem::Metric)));
        assert_eq!(units.get("km"), units.get("Km"));
        assert_eq!(units.get("feet"), Some(Unit::new(0.3048, UnitSystem::Imperial)));
        assert_eq!(units.get("\""), Some(Unit::new(0.0254, UnitSystem::Imperial)));
        assert_eq!(units.get("mi").map(|u| u.scale), Some(1609.344));
        assert_eq!(units.get("furlong"), None);
        assert_eq!(units.default_unit(), Unit::new(1.0, UnitSystem::Metric));
    }

    #[test]
    fn imperial_tables() {
        let units = Units::new(UnitSystem::Imperial);
        assert_eq!(units.get("thou"), Some(Unit::new(1.0, UnitSystem::Imperial)));
        assert_eq!(units.get("inch").map(|u| u.scale), Some(1000.0));
        assert_eq!(units.get("'").map(|u| u.scale), Some(12000.0));
        assert_eq!(units.get("yds").map(|u| u.scale), Some(36000.0));
        assert_eq!(units.get("miles").map(|u| u.scale), Some(63_360_000.0));
        assert_eq!(units.get("m").map(|u| u.system), Some(UnitSystem::Metric));
        assert_eq!(units.default_unit(), Unit::new(12000.0, UnitSystem::Imperial));
    }

    #[test]
    fn generic_has_no_units() {
        let units = Units::new(UnitSystem::Generic);
        assert_eq!(units.get("m"), None);
        assert_eq!(units.default_unit(), Unit::generic());
        assert_eq!(units.name(&Unit::generic()), Some(""));
    }

    #[test]
    fn every_unit_has_a_display_name() {
        for system in [UnitSystem::Metric, UnitSystem::Imperial] {
            let units = Units::new(system);
            for family in FAMILIES {
                for name in family.names {
                    let unit = units.get(name).unwrap();
                    assert_eq!(units.name(&unit), Some(family.display), "{system} {name}");
                }
            }
        }
    }

    #[test]
    fn unknown_scale_has_no_name() {
        let units = Units::new(UnitSystem::Metric);
        assert_eq!(units.name(&Unit::new(0.5, UnitSystem::Metric)), None);
    }

    #[test]
    fn system_from_command() {
        assert_eq!("imperial".parse(), Ok(UnitSystem::Imperial));
        assert_eq!("Metric".parse::<UnitSystem>(), Err(()));
    }
}
