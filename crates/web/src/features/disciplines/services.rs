use sqlx::PgPool;
use storage::{
    dto::discipline::{DisciplineRequest, DisciplineSummary},
    error::Result,
    repository::bestlist::BestlistRepository,
};

/// List the disciplines with results matching the request
pub async fn list_disciplines(
    pool: &PgPool,
    request: &DisciplineRequest,
) -> Result<Vec<DisciplineSummary>> {
    let repo = BestlistRepository::new(pool);
    repo.disciplines(request).await
}
