use axum::{routing::get, Router};
use storage::Database;

use super::handlers::list_disciplines;

pub fn routes() -> Router<Database> {
    Router::new().route("/", get(list_disciplines))
}
