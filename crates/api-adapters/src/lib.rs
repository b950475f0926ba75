//! # api-adapters
//!
//! The JSON routing layer for the board.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;

#[cfg(feature = "web-axum")]
pub use router::router;

#[cfg(feature = "web-axum")]
mod router {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use services::BoardService;

    use crate::{handlers, middleware};

    /// Builds the full application router.
    ///
    /// Thread commands live under `/api/threads/{board}`, reply commands under
    /// `/api/replies/{board}`; the HTTP method selects the command.
    pub fn router(service: BoardService) -> Router {
        let api = Router::new()
            .route(
                "/threads/{board}",
                get(handlers::list_threads)
                    .post(handlers::create_thread)
                    .put(handlers::report_thread)
                    .delete(handlers::delete_thread),
            )
            .route(
                "/replies/{board}",
                get(handlers::get_thread)
                    .post(handlers::create_reply)
                    .put(handlers::report_reply)
                    .delete(handlers::delete_reply),
            );

        let app = Router::new()
            .nest("/api", api)
            .route("/health", get(handlers::health))
            .fallback(|| async { (StatusCode::NOT_FOUND, "Not Found") })
            .with_state(service);

        middleware::standard_layers(app)
    }
}
