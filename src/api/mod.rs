pub mod health;
pub mod news;
pub mod stages;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/stages", stages::router())
        .nest("/api/news", news::router())
}
