//! Where the decimal separator of the environment comes from.

/// Supplies the decimal separator numbers may be typed with.
pub trait Locale {
    fn decimal_point(&self) -> char;
}

/// Reads the process environment on every call, so a changed locale is seen
/// without restarting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocale;

impl Locale for SystemLocale {
    fn decimal_point(&self) -> char {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
            .map_or('.', |tag| decimal_point_for(&tag))
    }
}

/// Always answers with the same separator.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocale(pub char);

impl Locale for FixedLocale {
    fn decimal_point(&self) -> char {
        self.0
    }
}

const COMMA_LANGUAGES: &[&str] = &[
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "it", "lt", "lv",
    "nb", "nl", "nn", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk", "vi",
];

const POINT_REGIONS: &[&str] = &["de_CH", "it_CH", "es_MX", "es_US"];

/// Decimal separator for a POSIX locale name such as `de_DE.UTF-8`.
pub fn decimal_point_for(tag: &str) -> char {
    let name = tag.split(['.', '@']).next().unwrap_or_default();
    let language = name.split(['_', '-']).next().unwrap_or_default();

    if POINT_REGIONS.contains(&name) || !COMMA_LANGUAGES.contains(&language) {
        '.'
    } else {
        ','
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn locale_names() {
        assert_eq!(decimal_point_for("C"), '.');
        assert_eq!(decimal_point_for("POSIX"), '.');
        assert_eq!(decimal_point_for("en_US.UTF-8"), '.');
        assert_eq!(decimal_point_for("de_DE.UTF-8"), ',');
        assert_eq!(decimal_point_for("fr_FR@euro"), ',');
        assert_eq!(decimal_point_for("de_CH.UTF-8"), '.');
        assert_eq!(decimal_point_for("pt-BR"), ',');
    }

    #[test]
    fn fixed() {
        assert_eq!(FixedLocale(',').decimal_point(), ',');
    }
}
