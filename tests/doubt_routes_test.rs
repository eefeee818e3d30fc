// ABOUTME: HTTP tests for the doubt routes
// ABOUTME: Authentication, status codes, teacher reference resolution and the accept response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{bearer, create_student, create_teacher, create_test_server_resources};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use std::sync::Arc;
use tutorlink_server::models::{Account, Doubt};
use tutorlink_server::resources::ServerResources;
use tutorlink_server::server::build_router;

struct Fixture {
    resources: Arc<ServerResources>,
    student: Account,
    teacher: Account,
}

impl Fixture {
    async fn new() -> Self {
        let resources = create_test_server_resources(None).await.unwrap();
        let student = create_student(&resources.database, "sam@example.com").await.unwrap();
        let teacher = create_teacher(&resources.database, "tina@example.com", &["Physics"])
            .await
            .unwrap();
        Self {
            resources,
            student,
            teacher,
        }
    }

    fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.resources))
    }

    fn student_auth(&self) -> String {
        bearer(&self.resources, &self.student)
    }

    fn teacher_auth(&self) -> String {
        bearer(&self.resources, &self.teacher)
    }

    async fn raise(&self, title: &str) -> Doubt {
        AxumTestRequest::post("/doubts")
            .auth(&self.student_auth())
            .json(&json!({
                "subject": "Physics",
                "title": title,
                "description": "I am stuck"
            }))
            .send(self.router())
            .await
            .assert_status(StatusCode::CREATED)
            .json()
    }
}

#[tokio::test]
async fn test_create_doubt_requires_token() {
    let fx = Fixture::new().await;

    let response = AxumTestRequest::post("/doubts")
        .json(&json!({"subject": "Physics", "title": "t", "description": "d"}))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "AUTH_REQUIRED");

    let response = AxumTestRequest::post("/doubts")
        .auth("Bearer not-a-jwt")
        .json(&json!({"subject": "Physics", "title": "t", "description": "d"}))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_doubt_returns_camel_case_doubt() {
    let fx = Fixture::new().await;

    let body: Value = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .json(&json!({
            "subject": "Physics",
            "title": "Ohm's law",
            "description": "Why V = IR?"
        }))
        .send(fx.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body["title"], "Ohm's law");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["student"], fx.student.id.to_string());
    assert_eq!(body["teachers"], json!([]));
    assert!(body["aiReply"].is_null());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_doubt_validation_errors() {
    let fx = Fixture::new().await;

    let response = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .json(&json!({"subject": "Physics", "description": "no title"}))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");

    let response = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .raw_json("{not json")
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .json(&json!({
            "subject": "Physics",
            "title": "t",
            "description": "d",
            "teachers": ["nobody@example.com"]
        }))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .json(&json!({
            "subject": "Physics",
            "title": "t",
            "description": "d",
            "teachers": ["tina"]
        }))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_cannot_create_doubt() {
    let fx = Fixture::new().await;

    let response = AxumTestRequest::post("/doubts")
        .auth(&fx.teacher_auth())
        .json(&json!({"subject": "Physics", "title": "t", "description": "d"}))
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "ROLE_VIOLATION");
}

#[tokio::test]
async fn test_create_doubt_with_teacher_email() {
    let fx = Fixture::new().await;

    let body: Value = AxumTestRequest::post("/doubts")
        .auth(&fx.student_auth())
        .json(&json!({
            "subject": "Physics",
            "title": "Lenses",
            "description": "Focal length?",
            "teachers": ["TINA@example.com"]
        }))
        .send(fx.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body["teachers"], json!([fx.teacher.id.to_string()]));
    assert!(body["conversation"].is_string());
}

#[tokio::test]
async fn test_unassigned_accept_and_get() {
    let fx = Fixture::new().await;
    let doubt = fx.raise("Momentum").await;

    let unassigned: Vec<Doubt> = AxumTestRequest::get("/doubts/unassigned")
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(unassigned.len(), 1);
    assert_eq!(unassigned[0].id, doubt.id);

    let accepted: Value = AxumTestRequest::put(&format!("/doubts/{}/accept", doubt.id))
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(accepted["id"], doubt.id.to_string());
    assert_eq!(accepted["teachers"], json!([fx.teacher.id.to_string()]));
    assert_eq!(accepted["chat"]["displayName"], "Doubt: Momentum");
    assert_eq!(accepted["conversation"], accepted["chat"]["id"]);

    let fetched: Doubt = AxumTestRequest::get(&format!("/doubts/{}", doubt.id))
        .auth(&fx.student_auth())
        .send(fx.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched.teachers, vec![fx.teacher.id]);

    let unassigned: Vec<Doubt> = AxumTestRequest::get("/doubts/unassigned")
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await
        .json();
    assert!(unassigned.is_empty());
}

#[tokio::test]
async fn test_list_doubts_and_student_filter() {
    let fx = Fixture::new().await;
    let doubt = fx.raise("Fields").await;

    let mine: Vec<Doubt> = AxumTestRequest::get("/doubts")
        .auth(&fx.student_auth())
        .send(fx.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(mine.len(), 1);

    let filtered: Vec<Doubt> = AxumTestRequest::get(&format!("/doubts?student={}", fx.student.id))
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, doubt.id);

    let response = AxumTestRequest::get("/doubts?student=sam")
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_malformed_doubt_ids() {
    let fx = Fixture::new().await;

    for uri in ["/doubts/not-a-uuid", "/doubts/6f1c0e57-1d5c-4c51-9c32-3b8a1e0b2f10"] {
        let response = AxumTestRequest::get(uri)
            .auth(&fx.student_auth())
            .send(fx.router())
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    let response = AxumTestRequest::put("/doubts/not-a-uuid/accept")
        .auth(&fx.teacher_auth())
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_student_cannot_accept() {
    let fx = Fixture::new().await;
    let doubt = fx.raise("Vectors").await;

    let response = AxumTestRequest::put(&format!("/doubts/{}/accept", doubt.id))
        .auth(&fx.student_auth())
        .send(fx.router())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
