use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use workout_log::{AppState, Config, build_router};

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

fn app_with_limit(requests_per_minute: usize) -> Router {
    build_router(AppState::in_memory(Config {
        requests_per_minute,
        ..Config::default()
    }))
}

fn app() -> Router {
    app_with_limit(1_000)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None, &[]).await
}

async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body), &[]).await
}

async fn create_exercise(app: &Router, name: &str) -> String {
    let res = post(app, "/exercises/", json!({ "name": name })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.body["id"].as_str().unwrap().to_string()
}

async fn create_workout(app: &Router) -> String {
    let res = post(app, "/workouts/", json!({ "workout_date": "2025-11-08" })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.body["id"].as_str().unwrap().to_string()
}

async fn add_set(app: &Router, workout: &str, exercise: &str, body: Value) -> TestResponse {
    post(
        app,
        &format!("/workouts/{workout}/sets?exercise_id={exercise}"),
        body,
    )
    .await
}

fn assert_problem(res: &TestResponse, status: StatusCode, title: &str) {
    assert_eq!(res.status, status);
    assert_eq!(res.headers["content-type"], "application/problem+json");
    assert_eq!(res.body["status"], status.as_u16());
    assert_eq!(res.body["title"], title);
    assert!(res.body["type"].is_string());
    assert!(res.body["detail"].is_string());

    let correlation_id = res.body["correlation_id"].as_str().unwrap();
    assert!(!correlation_id.is_empty());
    assert_eq!(res.headers["x-correlation-id"], correlation_id);
}

#[tokio::test]
async fn health_returns_welcome_message() {
    let res = get(&app(), "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "message": "Welcome to Workout Log API!" }));
}

#[tokio::test]
async fn every_response_gets_a_fresh_correlation_id() {
    let app = app();
    let first = get(&app, "/health").await;
    let second = get(&app, "/health").await;

    let first_id = first.headers["x-correlation-id"].to_str().unwrap();
    let second_id = second.headers["x-correlation-id"].to_str().unwrap();
    assert!(Uuid::parse_str(first_id).is_ok());
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn inbound_correlation_id_is_echoed() {
    let app = app();
    let ok = send(&app, Method::GET, "/health", None, &[("x-correlation-id", "trace-abc-1")]).await;
    assert_eq!(ok.headers["x-correlation-id"], "trace-abc-1");

    let missing = send(
        &app,
        Method::GET,
        &format!("/workouts/{}", Uuid::new_v4()),
        None,
        &[("x-correlation-id", "trace-abc-2")],
    )
    .await;
    assert_problem(&missing, StatusCode::NOT_FOUND, "Not Found");
    assert_eq!(missing.body["correlation_id"], "trace-abc-2");
}

#[tokio::test]
async fn end_to_end_workout_with_set() {
    let app = app();

    let exercise = create_exercise(&app, "Squat").await;

    let workout = post(&app, "/workouts/", json!({ "workout_date": "2025-09-25" })).await;
    assert_eq!(workout.status, StatusCode::CREATED);
    assert_eq!(workout.body["workout_date"], "2025-09-25");
    assert_eq!(workout.body["sets"], json!([]));
    let workout_id = workout.body["id"].as_str().unwrap();

    let res = add_set(&app, workout_id, &exercise, json!({ "reps": 10, "weight": 80.0 })).await;
    assert_eq!(res.status, StatusCode::OK);
    let sets = res.body["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["exercise_name"], "Squat");
    assert_eq!(sets[0]["reps"], 10);
    assert_eq!(sets[0]["weight"].as_f64(), Some(80.0));

    let fetched = get(&app, &format!("/workouts/{workout_id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], workout_id);
    assert_eq!(fetched.body["sets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lists_return_created_entities() {
    let app = app();
    create_exercise(&app, "Жим лежа").await;
    let workout = create_workout(&app).await;

    let exercises = get(&app, "/exercises/").await;
    assert_eq!(exercises.status, StatusCode::OK);
    assert!(
        exercises.body.as_array().unwrap().iter().any(|e| e["name"] == "Жим лежа")
    );

    let workouts = get(&app, "/workouts/").await;
    assert_eq!(workouts.status, StatusCode::OK);
    assert!(workouts.body.as_array().unwrap().iter().any(|w| w["id"] == workout.as_str()));
}

#[tokio::test]
async fn exercise_can_be_fetched_by_id() {
    let app = app();
    let id = create_exercise(&app, "  Deadlift  ").await;

    let res = get(&app, &format!("/exercises/{id}")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Deadlift");
    assert_eq!(res.body["description"], Value::Null);

    let missing = get(&app, &format!("/exercises/{}", Uuid::new_v4())).await;
    assert_problem(&missing, StatusCode::NOT_FOUND, "Not Found");
    assert_eq!(missing.body["detail"], "Exercise not found");
}

#[tokio::test]
async fn missing_exercise_and_missing_workout_are_distinguishable() {
    let app = app();
    let exercise = create_exercise(&app, "Pull-up").await;
    let workout = create_workout(&app).await;
    let body = json!({ "reps": 5, "weight": "0" });

    let no_exercise = add_set(&app, &workout, &Uuid::new_v4().to_string(), body.clone()).await;
    assert_problem(&no_exercise, StatusCode::NOT_FOUND, "Not Found");
    assert_eq!(no_exercise.body["detail"], "Exercise not found to add set");

    let no_workout = add_set(&app, &Uuid::new_v4().to_string(), &exercise, body).await;
    assert_problem(&no_workout, StatusCode::NOT_FOUND, "Not Found");
    assert_eq!(no_workout.body["detail"], "Workout not found");
}

#[tokio::test]
async fn reps_bounds_are_enforced() {
    let app = app();
    let exercise = create_exercise(&app, "Test Exercise").await;
    let workout = create_workout(&app).await;

    for reps in [0, -5, 1001] {
        let res = add_set(&app, &workout, &exercise, json!({ "reps": reps, "weight": "50.0" })).await;
        assert_problem(&res, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");
        assert_eq!(res.body["errors"][0]["field"], "reps");
    }

    for reps in [1, 1000] {
        let res = add_set(&app, &workout, &exercise, json!({ "reps": reps, "weight": "50.0" })).await;
        assert_eq!(res.status, StatusCode::OK, "reps = {reps}");
    }
}

#[tokio::test]
async fn weight_precision_is_enforced() {
    let app = app();
    let exercise = create_exercise(&app, "Bench Press").await;
    let workout = create_workout(&app).await;

    let negative = add_set(&app, &workout, &exercise, json!({ "reps": 10, "weight": "-10.5" })).await;
    assert_problem(&negative, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");

    let precise = add_set(&app, &workout, &exercise, json!({ "reps": 10, "weight": "100.256" })).await;
    assert_problem(&precise, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");
    assert_eq!(precise.body["errors"][0]["field"], "weight");

    let too_large = add_set(&app, &workout, &exercise, json!({ "reps": 10, "weight": 12345.5 })).await;
    assert_problem(&too_large, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");

    let ok = add_set(&app, &workout, &exercise, json!({ "reps": 10, "weight": "100.25" })).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["sets"][0]["weight"].as_f64(), Some(100.25));

    let stored = add_set(&app, &workout, &exercise, json!({ "reps": 10, "weight": "82.50" })).await;
    assert_eq!(stored.body["sets"][1]["weight"].as_f64(), Some(82.5));
}

#[tokio::test]
async fn exercise_name_rules() {
    let app = app();

    for name in ["x".repeat(201), "Test\u{0}Exercise".to_string(), String::new()] {
        let res = post(&app, "/exercises/", json!({ "name": name })).await;
        assert_problem(&res, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");
    }

    let res = post(&app, "/exercises/", json!({ "name": "x".repeat(200) })).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let long_description = post(
        &app,
        "/exercises/",
        json!({ "name": "Row", "description": "d".repeat(2001) }),
    )
    .await;
    assert_problem(&long_description, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");
}

#[tokio::test]
async fn workout_note_rules() {
    let app = app();

    let cleaned = post(
        &app,
        "/workouts/",
        json!({ "workout_date": "2025-11-08", "note": "Normal text\u{0}\u{1}\u{2}cleaned" }),
    )
    .await;
    assert_eq!(cleaned.status, StatusCode::CREATED);
    assert_eq!(cleaned.body["note"], "Normal textcleaned");

    let emptied = post(
        &app,
        "/workouts/",
        json!({ "workout_date": "2025-11-08", "note": "\u{0}\u{1}  " }),
    )
    .await;
    assert_eq!(emptied.status, StatusCode::CREATED);
    assert_eq!(emptied.body["note"], Value::Null);

    let too_long = post(
        &app,
        "/workouts/",
        json!({ "workout_date": "2025-09-25", "note": "x".repeat(2000) }),
    )
    .await;
    assert_problem(&too_long, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");
}

#[tokio::test]
async fn malformed_input_is_a_validation_problem() {
    let app = app();

    let bad_date = post(&app, "/workouts/", json!({ "workout_date": "not-a-date", "note": "Test" })).await;
    assert_problem(&bad_date, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");

    let bad_id = get(&app, "/workouts/not-a-uuid").await;
    assert_problem(&bad_id, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");

    let workout = create_workout(&app).await;
    let no_exercise = post(
        &app,
        &format!("/workouts/{workout}/sets"),
        json!({ "reps": 1, "weight": 1 }),
    )
    .await;
    assert_problem(&no_exercise, StatusCode::UNPROCESSABLE_ENTITY, "Validation Error");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/exercises/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let app = build_router(AppState::in_memory(Config {
        max_body_bytes: 64,
        ..Config::default()
    }));

    let res = post(&app, "/exercises/", json!({ "name": "x".repeat(500) })).await;
    assert_problem(&res, StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
    assert!(res.body.get("errors").is_none());

    let list = get(&app, "/exercises/").await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/exercises/")
        .body(Body::from(json!({ "name": "Squat" }).to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.headers()["content-type"], "application/problem+json");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["title"], "Unsupported Media Type");
    assert_eq!(body["status"], 415);
}

#[tokio::test]
async fn unknown_routes_and_methods_are_problems() {
    let app = app();

    let missing = get(&app, "/nowhere").await;
    assert_problem(&missing, StatusCode::NOT_FOUND, "Not Found");

    let wrong_method = send(&app, Method::PUT, "/health", None, &[]).await;
    assert_problem(&wrong_method, StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
}

#[tokio::test]
async fn deleting_a_workout_removes_it() {
    let app = app();
    let exercise = create_exercise(&app, "Lunge").await;
    let workout = create_workout(&app).await;
    add_set(&app, &workout, &exercise, json!({ "reps": 8, "weight": 20 })).await;

    let deleted = send(&app, Method::DELETE, &format!("/workouts/{workout}"), None, &[]).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.headers.contains_key("x-correlation-id"));

    let gone = get(&app, &format!("/workouts/{workout}")).await;
    assert_problem(&gone, StatusCode::NOT_FOUND, "Not Found");

    let again = send(&app, Method::DELETE, &format!("/workouts/{workout}"), None, &[]).await;
    assert_problem(&again, StatusCode::NOT_FOUND, "Not Found");
}

#[tokio::test]
async fn rate_limit_rejects_after_quota() {
    let app = app_with_limit(3);
    let client = [("x-forwarded-for", "198.51.100.1")];

    for _ in 0..3 {
        let res = send(&app, Method::GET, "/health", None, &client).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let res = send(&app, Method::GET, "/health", None, &client).await;
    assert_problem(&res, StatusCode::TOO_MANY_REQUESTS, "Too Many Requests");
    assert_eq!(res.body["detail"], "Rate limit exceeded. Please try again later.");
    assert!(res.headers.contains_key("retry-after"));
}

#[tokio::test]
async fn rejected_requests_never_reach_handlers() {
    let app = app_with_limit(1);
    let limited = [("x-forwarded-for", "198.51.100.2")];

    send(&app, Method::GET, "/health", None, &limited).await;
    let res = send(
        &app,
        Method::POST,
        "/exercises/",
        Some(json!({ "name": "Ghost" })),
        &limited,
    )
    .await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    let list = send(&app, Method::GET, "/exercises/", None, &[("x-forwarded-for", "198.51.100.3")]).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn forwarded_clients_have_independent_quotas() {
    let app = app_with_limit(2);
    let first = [("x-forwarded-for", "203.0.113.10")];
    let second = [("x-forwarded-for", "203.0.113.20")];

    for _ in 0..2 {
        assert_eq!(send(&app, Method::GET, "/health", None, &first).await.status, StatusCode::OK);
    }
    assert_eq!(
        send(&app, Method::GET, "/health", None, &first).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    for _ in 0..2 {
        assert_eq!(send(&app, Method::GET, "/health", None, &second).await.status, StatusCode::OK);
    }
}
