use std::ops::Range;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{CategoryIdentifier, flag};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DisciplineQuery {
    pub year: Option<i32>,
    /// e.g. `u18_w`. Also selects the gender.
    pub category_identifier: Option<String>,
    pub only_homologated: Option<String>,
    pub indoor: Option<String>,
    pub restrict_category: Option<String>,
    /// Only disciplines with a score list
    pub score_available: Option<String>,
}

/// Disciplines with at least one result matching these filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisciplineRequest {
    pub year: Option<i32>,
    pub male: bool,
    pub indoor: bool,
    pub age_range: Range<i32>,
    pub only_homologated: bool,
    pub score_available: bool,
}

impl DisciplineQuery {
    pub fn resolve(&self) -> DisciplineRequest {
        let category = CategoryIdentifier::parse(self.category_identifier.as_deref());
        DisciplineRequest {
            year: self.year,
            male: category.male,
            indoor: flag(self.indoor.as_deref(), false),
            age_range: category.age_range(flag(self.restrict_category.as_deref(), false)),
            only_homologated: flag(self.only_homologated.as_deref(), false),
            score_available: flag(self.score_available.as_deref(), false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DisciplineSummary {
    pub id: Uuid,
    pub name: String,
    pub score_available: bool,
    pub wind_relevant: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisciplineListResponse {
    pub disciplines: Vec<DisciplineSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = DisciplineQuery::default().resolve();
        assert_eq!(
            request,
            DisciplineRequest {
                year: None,
                male: true,
                indoor: false,
                age_range: 0..200,
                only_homologated: false,
                score_available: false,
            }
        );
    }

    #[test]
    fn test_category_selects_gender_and_ages() {
        let request = DisciplineQuery {
            category_identifier: Some("u16_w".to_string()),
            restrict_category: Some("true".to_string()),
            indoor: Some("1".to_string()),
            score_available: Some("true".to_string()),
            year: Some(2022),
            ..DisciplineQuery::default()
        }
        .resolve();

        assert!(!request.male);
        assert!(request.indoor);
        assert!(request.score_available);
        assert_eq!(request.age_range, 14..16);
        assert_eq!(request.year, Some(2022));
    }
}
