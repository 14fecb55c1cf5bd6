use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::discipline::{DisciplineListResponse, DisciplineQuery},
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/disciplines",
    params(DisciplineQuery),
    responses(
        (status = 200, description = "Disciplines with matching results", body = DisciplineListResponse)
    ),
    tag = "disciplines"
)]
pub async fn list_disciplines(
    State(db): State<Database>,
    Query(query): Query<DisciplineQuery>,
) -> Result<Response, WebError> {
    let disciplines = services::list_disciplines(db.pool(), &query.resolve()).await?;

    Ok(Json(DisciplineListResponse { disciplines }).into_response())
}
