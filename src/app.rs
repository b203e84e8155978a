use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::Problem,
    handlers::{self, exercises, health, workouts},
    middleware_layer::{correlation::propagate_correlation_id, rate_limit::enforce_rate_limit},
    state::AppState,
};

/// Builds the full application router.
///
/// Layers, outermost first: correlation id, HTTP trace, panic catcher, rate
/// limit, body limit. The correlation scope covers every response the inner
/// layers produce, including 429s and panics, and the access log lines.
pub fn build_router(state: AppState) -> Router {
    let exercise_collection = post(exercises::create_exercise).get(exercises::list_exercises);
    let workout_collection = post(workouts::create_workout).get(workouts::list_workouts);

    Router::new()
        .route("/health", get(health::health))
        .route("/exercises/", exercise_collection.clone())
        .route("/exercises", exercise_collection)
        .route("/exercises/{exercise_id}", get(exercises::get_exercise))
        .route("/workouts/", workout_collection.clone())
        .route("/workouts", workout_collection)
        .route(
            "/workouts/{workout_id}",
            get(workouts::get_workout).delete(workouts::delete_workout),
        )
        .route("/workouts/{workout_id}/sets", post(workouts::add_set))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(from_fn_with_state(state.clone(), enforce_rate_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().level(Level::INFO))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::INFO))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(from_fn(propagate_correlation_id))
        .with_state(state)
}

/// Logs the panic payload and answers with the generic 500 problem.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!("Handler panicked: {}", message);
    Problem::internal().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use tracing_subscriber::layer::SubscriberExt;

    use crate::{
        config::Config,
        error::GENERIC_SERVER_DETAIL,
        logging::{capture::CapturedLogs, masked_layer},
    };

    async fn explode() -> &'static str {
        panic!("secret internal state 0xdeadbeef")
    }

    #[tokio::test]
    async fn panics_become_generic_problems_with_correlation_id() {
        let app = Router::new()
            .route("/boom", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(from_fn(propagate_correlation_id));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/boom")
                    .header("x-correlation-id", "panic-test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-correlation-id"], "panic-test");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], GENERIC_SERVER_DETAIL);
        assert_eq!(body["correlation_id"], "panic-test");
        assert!(!body.to_string().contains("deadbeef"));
    }

    #[tokio::test]
    async fn access_log_lines_carry_correlation_id() {
        let app = build_router(AppState::in_memory(Config::default()));

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::registry().with(masked_layer(logs.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/workouts/not-a-uuid")
                    .header("x-correlation-id", "access-log-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let output = logs.contents();
        assert!(output.contains("finished processing request"), "{output}");
        for line in output.lines().filter(|line| !line.trim().is_empty()) {
            assert!(line.contains("correlation_id=access-log-7"), "{line}");
        }
    }
}
