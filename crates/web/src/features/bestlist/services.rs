use sqlx::PgPool;
use storage::{
    dto::bestlist::{BestlistEntry, BestlistRequest},
    error::Result,
    repository::bestlist::{BestlistDiscipline, BestlistRepository},
};
use uuid::Uuid;

/// Get the ranking-relevant configuration of a discipline
pub async fn find_discipline(pool: &PgPool, discipline_id: Uuid) -> Result<BestlistDiscipline> {
    let repo = BestlistRepository::new(pool);
    repo.find_discipline(discipline_id).await
}

/// Get the bestlist of a discipline
pub async fn get_bestlist(
    pool: &PgPool,
    discipline: &BestlistDiscipline,
    request: &BestlistRequest,
) -> Result<Vec<BestlistEntry>> {
    let repo = BestlistRepository::new(pool);
    repo.query(discipline, request).await
}
