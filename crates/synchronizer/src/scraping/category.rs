use std::fmt;
use std::ops::Range;

/// Bestlist categories with the codes the bestlist page expects in its `blcat` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BestlistCategory {
    U10Men,
    U10Women,
    U12Men,
    U12Women,
    U14Men,
    U14Women,
    U16Men,
    U16Women,
    U18Men,
    U18Women,
    U20Men,
    U20Women,
    Men,
    Women,
    AllMen,
    AllWomen,
}

impl BestlistCategory {
    pub fn code(&self) -> &'static str {
        match self {
            BestlistCategory::U10Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45f-be",
            BestlistCategory::U10Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g45i-bf",
            BestlistCategory::U12Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45k-bg",
            BestlistCategory::U12Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g45m-bh",
            BestlistCategory::U14Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45o-bi",
            BestlistCategory::U14Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g45q-bj",
            BestlistCategory::U16Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45s-bk",
            BestlistCategory::U16Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g45u-bl",
            BestlistCategory::U18Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45w-bm",
            BestlistCategory::U18Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g45y-bn",
            BestlistCategory::U20Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g45z-bo",
            BestlistCategory::U20Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g461-bp",
            BestlistCategory::Men => "5c4o3k5m-d686mo-j986g2ie-1-j986g467-bs",
            BestlistCategory::Women => "5c4o3k5m-d686mo-j986g2ie-1-j986g469-bt",
            BestlistCategory::AllMen => "M",
            BestlistCategory::AllWomen => "W",
        }
    }

    /// Accepted `year(result) - year(birth)` values for this category.
    pub fn age_bounds(&self) -> Range<i32> {
        match self {
            BestlistCategory::U10Men | BestlistCategory::U10Women => 0..10,
            BestlistCategory::U12Men | BestlistCategory::U12Women => 10..12,
            BestlistCategory::U14Men | BestlistCategory::U14Women => 12..14,
            BestlistCategory::U16Men | BestlistCategory::U16Women => 14..16,
            BestlistCategory::U18Men | BestlistCategory::U18Women => 16..18,
            BestlistCategory::U20Men | BestlistCategory::U20Women => 18..20,
            BestlistCategory::Men | BestlistCategory::Women => 20..200,
            BestlistCategory::AllMen | BestlistCategory::AllWomen => 0..200,
        }
    }

    pub fn all(male: bool) -> Self {
        if male {
            BestlistCategory::AllMen
        } else {
            BestlistCategory::AllWomen
        }
    }

    pub fn main(male: bool) -> Self {
        if male {
            BestlistCategory::Men
        } else {
            BestlistCategory::Women
        }
    }

    /// Junior categories, youngest first.
    pub fn juniors(male: bool) -> [Self; 6] {
        if male {
            [
                BestlistCategory::U10Men,
                BestlistCategory::U12Men,
                BestlistCategory::U14Men,
                BestlistCategory::U16Men,
                BestlistCategory::U18Men,
                BestlistCategory::U20Men,
            ]
        } else {
            [
                BestlistCategory::U10Women,
                BestlistCategory::U12Women,
                BestlistCategory::U14Women,
                BestlistCategory::U16Women,
                BestlistCategory::U18Women,
                BestlistCategory::U20Women,
            ]
        }
    }
}

impl fmt::Display for BestlistCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BestlistCategory::U10Men => "U10 men",
            BestlistCategory::U10Women => "U10 women",
            BestlistCategory::U12Men => "U12 men",
            BestlistCategory::U12Women => "U12 women",
            BestlistCategory::U14Men => "U14 men",
            BestlistCategory::U14Women => "U14 women",
            BestlistCategory::U16Men => "U16 men",
            BestlistCategory::U16Women => "U16 women",
            BestlistCategory::U18Men => "U18 men",
            BestlistCategory::U18Women => "U18 women",
            BestlistCategory::U20Men => "U20 men",
            BestlistCategory::U20Women => "U20 women",
            BestlistCategory::Men => "men",
            BestlistCategory::Women => "women",
            BestlistCategory::AllMen => "all men",
            BestlistCategory::AllWomen => "all women",
        };
        write!(f, "{}", name)
    }
}
