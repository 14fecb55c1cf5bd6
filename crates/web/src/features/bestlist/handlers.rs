use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::bestlist::{BestlistConfiguration, BestlistQuery, BestlistResponse},
    error::StorageError,
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/bestlist",
    params(BestlistQuery),
    responses(
        (status = 200, description = "Bestlist retrieved successfully", body = BestlistResponse),
        (status = 400, description = "Invalid query parameters or unknown discipline")
    ),
    tag = "bestlist"
)]
pub async fn get_bestlist(
    State(db): State<Database>,
    Query(query): Query<BestlistQuery>,
) -> Result<Response, WebError> {
    let request = query.resolve().map_err(WebError::BadRequest)?;

    let discipline = services::find_discipline(db.pool(), request.discipline_id)
        .await
        .map_err(|e| match e {
            StorageError::NotFound => WebError::BadRequest(format!(
                "No discipline found with id {}",
                request.discipline_id
            )),
            e => WebError::from(e),
        })?;

    let results = services::get_bestlist(db.pool(), &discipline, &request).await?;

    let response = BestlistResponse {
        configuration: BestlistConfiguration::new(
            &results,
            discipline.score_identifier.is_some(),
            discipline.discipline_type,
        ),
        results,
    };

    Ok(Json(response).into_response())
}
