use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::Result;
use crate::models::Discipline;

/// Narrows the discipline list. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DisciplineFilter {
    pub name: Option<String>,
    pub indoor: Option<bool>,
    pub male: Option<bool>,
}

pub struct DisciplineRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DisciplineRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Disciplines not flagged `ignore`, ordered by configuration name, venue and gender.
    pub async fn list(&self, filter: &DisciplineFilter) -> Result<Vec<Discipline>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                d.discipline_id, d.config_id, dc.name, dc.ascending, d.discipline_code,
                d.indoor, d.male, d.ignore, d.score_identifier
            FROM disciplines d
            JOIN discipline_configs dc ON dc.config_id = d.config_id
            WHERE d.ignore = FALSE
            "#,
        );

        if let Some(name) = &filter.name {
            query.push(" AND dc.name = ");
            query.push_bind(name);
        }

        if let Some(indoor) = filter.indoor {
            query.push(" AND d.indoor = ");
            query.push_bind(indoor);
        }

        if let Some(male) = filter.male {
            query.push(" AND d.male = ");
            query.push_bind(male);
        }

        query.push(" ORDER BY dc.name, d.indoor, d.male DESC");

        let disciplines = query
            .build_query_as::<Discipline>()
            .fetch_all(self.pool)
            .await?;

        Ok(disciplines)
    }
}
