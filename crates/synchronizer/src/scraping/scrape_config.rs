use std::fmt;

use storage::models::Discipline;

use super::BestlistCategory;
use crate::error::{Result, SyncError};

/// Result counts the bestlist page is able to render.
pub const VALID_AMOUNTS: [u32; 5] = [10, 30, 100, 500, 5000];

pub const MAX_AMOUNT: u32 = 5000;

/// One bestlist query: a discipline narrowed down to a category and optionally a year.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub discipline: Discipline,
    pub category: BestlistCategory,
    /// `None` queries all years.
    pub year: Option<i32>,
    pub allow_wind: bool,
    pub amount: u32,
    pub only_homologated: bool,
}

impl ScrapeConfig {
    /// All-time list of all athletes of the discipline's gender, as large as possible.
    pub fn basic(discipline: Discipline) -> Self {
        Self {
            category: BestlistCategory::all(discipline.male),
            discipline,
            year: None,
            allow_wind: true,
            amount: MAX_AMOUNT,
            only_homologated: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !VALID_AMOUNTS.contains(&self.amount) {
            return Err(SyncError::ConfigError(format!(
                "Amount {} is invalid, expected one of {:?}",
                self.amount, VALID_AMOUNTS
            )));
        }
        Ok(())
    }

    /// Query arguments of the bestlist request.
    pub fn query_arguments(&self) -> Result<Vec<(&'static str, String)>> {
        self.validate()?;

        Ok(vec![
            ("lang", "de".to_string()),
            ("mobile", "false".to_string()),
            (
                "blyear",
                self.year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "ALL".to_string()),
            ),
            ("blcat", self.category.code().to_string()),
            ("disci", self.discipline.discipline_code.clone()),
            ("indoor", self.discipline.indoor.to_string()),
            ("top", self.amount.to_string()),
            ("sw", u8::from(self.allow_wind).to_string()),
            ("hom", u8::from(!self.only_homologated).to_string()),
        ])
    }
}

impl fmt::Display for ScrapeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) category={} year={} top={}",
            self.discipline.name,
            self.discipline.place(),
            self.discipline.gender(),
            self.category,
            self.year
                .map(|year| year.to_string())
                .unwrap_or_else(|| "all".to_string()),
            self.amount,
        )?;
        if self.only_homologated {
            write!(f, " homologated only")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn long_jump() -> Discipline {
        Discipline {
            discipline_id: Uuid::new_v4(),
            config_id: Uuid::new_v4(),
            name: "Weit".to_string(),
            ascending: false,
            discipline_code: "5c4o3k5m-d686mo-j986g2ie-1-j986ge5c-3mp".to_string(),
            indoor: false,
            male: true,
            ignore: false,
            score_identifier: None,
        }
    }

    fn argument<'a>(args: &'a [(&'static str, String)], key: &str) -> &'a str {
        args.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_basic_config() {
        let config = ScrapeConfig::basic(long_jump());
        assert_eq!(config.category, BestlistCategory::AllMen);
        assert_eq!(config.year, None);
        assert_eq!(config.amount, 5000);
        assert!(config.allow_wind);
        assert!(!config.only_homologated);
    }

    #[test]
    fn test_query_arguments() {
        let mut config = ScrapeConfig::basic(long_jump());
        let args = config.query_arguments().unwrap();
        assert_eq!(argument(&args, "blyear"), "ALL");
        assert_eq!(argument(&args, "blcat"), "M");
        assert_eq!(argument(&args, "indoor"), "false");
        assert_eq!(argument(&args, "top"), "5000");
        assert_eq!(argument(&args, "sw"), "1");
        assert_eq!(argument(&args, "hom"), "1");

        config.year = Some(2023);
        config.only_homologated = true;
        config.allow_wind = false;
        let args = config.query_arguments().unwrap();
        assert_eq!(argument(&args, "blyear"), "2023");
        assert_eq!(argument(&args, "sw"), "0");
        assert_eq!(argument(&args, "hom"), "0");
    }

    #[test]
    fn test_invalid_amount_is_rejected() {
        let mut config = ScrapeConfig::basic(long_jump());
        config.amount = 42;
        assert!(matches!(
            config.query_arguments(),
            Err(SyncError::ConfigError(_))
        ));

        for amount in VALID_AMOUNTS {
            config.amount = amount;
            assert!(config.validate().is_ok());
        }
    }
}
