mod common;

use axum::http::{Method, StatusCode};
use common::test_app;
use serde_json::json;

#[tokio::test]
async fn create_list_and_fetch_courses() {
    let app = test_app();
    let token = app.register("ravi", "ravi@example.com", Some("instructor")).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({ "title": "Rust for Beginners", "description": "Ownership first", "price": 499.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["instructorName"], "ravi");

    let (status, body) = app.get("/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Rust for Beginners");

    let (status, body) = app.get(&format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 499.0);
}

#[tokio::test]
async fn course_creation_requires_auth_and_a_title() {
    let app = test_app();

    let (status, _) = app
        .json(Method::POST, "/api/courses", None, json!({ "title": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.register("ravi", "ravi@example.com", None).await;
    let (status, _) = app
        .json(Method::POST, "/api/courses", Some(&token), json!({ "price": 10.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({ "title": "Cheap", "price": -1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enrolling_twice_is_rejected() {
    let app = test_app();
    let instructor = app.register("ravi", "ravi@example.com", Some("instructor")).await;
    let student = app.register("asha", "asha@example.com", None).await;

    let (_, body) = app
        .json(Method::POST, "/api/courses", Some(&instructor), json!({ "title": "DSA" }))
        .await;
    let course_id = body["data"]["id"].as_str().unwrap().to_string();
    let enroll = format!("/api/courses/{}/enroll", course_id);

    let (status, body) = app.json(Method::POST, &enroll, Some(&student), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["courseId"], course_id.as_str());

    let (status, body) = app.json(Method::POST, &enroll, Some(&student), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You are already enrolled in this course.");
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let app = test_app();
    let student = app.register("asha", "asha@example.com", None).await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app.get(&format!("/api/courses/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/courses/{}/enroll", missing),
            Some(&student),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_uuid_course_ids_are_not_found() {
    let app = test_app();
    let student = app.register("asha", "asha@example.com", None).await;

    let (status, body) = app.get("/api/courses/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(Method::POST, "/api/courses/42/enroll", Some(&student), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
