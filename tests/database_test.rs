// ABOUTME: Storage tests against an on-disk SQLite database
// ABOUTME: Persistence across reopen, account constraints, conversation reuse and pool settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_student, create_teacher, create_test_database, new_doubt};
use tempfile::TempDir;
use tutorlink_server::config::DatabaseUrl;
use tutorlink_server::database::Database;
use tutorlink_server::errors::ErrorCode;
use tutorlink_server::models::Role;

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tutorlink.db");
    let url = DatabaseUrl::parse_url(&format!("sqlite:{}", path.display())).unwrap();

    let student_id = {
        let database = Database::new(&url).await.unwrap();
        let student = create_student(&database, "sam@example.com").await.unwrap();
        database
            .doubts()
            .create(student.id, &new_doubt("Physics", "Persistence"))
            .await
            .unwrap();
        student.id
    };

    let reopened = Database::new(&url).await.unwrap();
    reopened.health_check().await.unwrap();
    let doubts = reopened.doubts().list_for_student(student_id).await.unwrap();
    assert_eq!(doubts.len(), 1);
    assert_eq!(doubts[0].title, "Persistence");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_case_insensitively() {
    let database = create_test_database().await.unwrap();
    create_student(&database, "sam@example.com").await.unwrap();

    let err = create_student(&database, "SAM@example.com")
        .await
        .unwrap_err()
        .downcast::<tutorlink_server::errors::AppError>()
        .unwrap();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_subject_lookup_returns_matching_teachers() {
    let database = create_test_database().await.unwrap();
    let physics = create_teacher(&database, "p@example.com", &["Physics", "Mathematics"])
        .await
        .unwrap();
    create_teacher(&database, "c@example.com", &["Chemistry"]).await.unwrap();
    create_student(&database, "s@example.com").await.unwrap();

    let found = database
        .accounts()
        .list_by_role_and_subject(Role::Teacher, "Mathematics")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, physics.id);
    assert_eq!(found[0].subjects, vec!["Physics", "Mathematics"]);
}

#[tokio::test]
async fn test_reused_conversation_is_not_discarded() {
    let database = create_test_database().await.unwrap();
    let student = create_student(&database, "sam@example.com").await.unwrap();
    let teacher = create_teacher(&database, "tina@example.com", &["Physics"]).await.unwrap();
    let other = create_teacher(&database, "omar@example.com", &["Physics"]).await.unwrap();
    let chats = database.chats();

    let first = chats
        .create_conversation(student.id, &[teacher.id], "Tina")
        .await
        .unwrap();
    assert!(first.created);
    let reused = chats
        .create_conversation(student.id, &[teacher.id], "Tina")
        .await
        .unwrap();
    assert!(!reused.created);
    assert_eq!(reused.conversation.id, first.conversation.id);

    assert!(!chats.delete_if_unused(first.conversation.id).await.unwrap());
    assert!(chats
        .get_conversation(first.conversation.id)
        .await
        .unwrap()
        .is_some());

    let fresh = chats
        .create_conversation(student.id, &[other.id], "Omar")
        .await
        .unwrap();
    assert!(chats.delete_if_unused(fresh.conversation.id).await.unwrap());
    assert!(chats
        .get_conversation(fresh.conversation.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_in_memory_pool_keeps_its_connection() {
    let database = Database::in_memory().await.unwrap();
    let options = database.pool().options();

    assert_eq!(options.get_max_connections(), 1);
    assert_eq!(options.get_min_connections(), 1);
    assert_eq!(options.get_idle_timeout(), None);
    assert_eq!(options.get_max_lifetime(), None);
}
