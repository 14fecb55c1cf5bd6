use axum::{routing::get, Router};
use storage::Database;

use super::handlers::get_bestlist;

pub fn routes() -> Router<Database> {
    Router::new().route("/", get(get_bestlist))
}
