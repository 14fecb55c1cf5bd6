use std::ops::Range;

/// Query flag: `true` and `1` (any case) are true, any other value false.
pub fn flag(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(value) => value.eq_ignore_ascii_case("true") || value == "1",
    }
}

/// A front-end category identifier such as `u18_w`, `men` shorthand `m`, or none at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIdentifier {
    pub category: String,
    pub male: bool,
}

impl CategoryIdentifier {
    /// `None` is every athlete of the men's lists. A single token is `m` for men, anything else
    /// women. Otherwise `{category}_{m|w}`.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self {
                category: "all".to_string(),
                male: true,
            };
        };

        match value.split_once('_') {
            None if value == "m" => Self {
                category: "men".to_string(),
                male: true,
            },
            None => Self {
                category: "women".to_string(),
                male: false,
            },
            Some((category, gender)) => Self {
                category: category.to_string(),
                male: gender == "m",
            },
        }
    }

    /// Accepted values of `year(result date) - year(birthdate)`. `restrict` keeps only athletes
    /// too old for the next younger category.
    pub fn age_range(&self, restrict: bool) -> Range<i32> {
        let (min, max) = match self.category.to_lowercase().as_str() {
            "masters" => (30, 200),
            "men" | "women" if restrict => (20, 30),
            "men" | "women" => (20, 200),
            "u23" if restrict => (20, 23),
            "u23" => (0, 23),
            "u20" if restrict => (18, 20),
            "u20" => (0, 20),
            "u18" if restrict => (16, 18),
            "u18" => (0, 18),
            "u16" if restrict => (14, 16),
            "u16" => (0, 16),
            "u14" if restrict => (12, 14),
            "u14" => (0, 14),
            "u12" if restrict => (10, 12),
            "u12" => (0, 12),
            "u10" => (0, 10),
            _ => (0, 200),
        };
        min..max
    }
}
