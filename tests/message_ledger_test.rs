// ABOUTME: Integration tests for the membership-gated message ledger
// ABOUTME: Posting, ordering, latest-message tracking and non-member rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_student, create_teacher, create_test_server_resources, requester};
use tutorlink_server::errors::ErrorCode;
use tutorlink_server::models::{Account, Conversation, ConversationId};
use tutorlink_server::resources::ServerResources;

async fn conversation(resources: &ServerResources) -> (Account, Account, Conversation) {
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();
    let chat = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap()
        .conversation;
    (student, teacher, chat)
}

#[tokio::test]
async fn test_members_post_and_read_in_order() {
    let resources = create_test_server_resources(None).await.unwrap();
    let (student, teacher, chat) = conversation(&resources).await;

    let question = resources
        .messages
        .post_message(chat.id, "  Why is the sky blue? ", &requester(&student))
        .await
        .unwrap();
    assert_eq!(question.content, "Why is the sky blue?");
    assert_eq!(question.sender, student.id);
    assert_eq!(question.conversation, chat.id);

    let answer = resources
        .messages
        .post_message(chat.id, "Rayleigh scattering.", &requester(&teacher))
        .await
        .unwrap();
    assert!(answer.created_at >= question.created_at);

    let log = resources
        .messages
        .list_messages(chat.id, &requester(&teacher))
        .await
        .unwrap();
    let ids: Vec<_> = log.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![question.id, answer.id]);

    let refreshed = resources
        .conversations
        .get_conversation(chat.id, &requester(&student))
        .await
        .unwrap();
    assert_eq!(refreshed.latest_message, Some(answer.id));
}

#[tokio::test]
async fn test_non_members_are_rejected() {
    let resources = create_test_server_resources(None).await.unwrap();
    let (_student, _teacher, chat) = conversation(&resources).await;
    let stranger = create_student(&resources.database, "olive@example.com").await.unwrap();
    let outsider = create_teacher(&resources.database, "o@example.com", &["Physics"]).await.unwrap();

    for other in [&stranger, &outsider] {
        let err = resources
            .messages
            .post_message(chat.id, "let me in", &requester(other))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let err = resources
            .messages
            .list_messages(chat.id, &requester(other))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    assert_eq!(resources.database.chats().count_messages(chat.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let resources = create_test_server_resources(None).await.unwrap();
    let (student, _teacher, chat) = conversation(&resources).await;

    let err = resources
        .messages
        .post_message(chat.id, " \n ", &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let huge = "x".repeat(10_001);
    let err = resources
        .messages
        .post_message(chat.id, &huge, &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = resources
        .messages
        .post_message(ConversationId::new(), "hello", &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_teacher_added_later_sees_history() {
    let resources = create_test_server_resources(None).await.unwrap();
    let (student, _teacher, chat) = conversation(&resources).await;
    let late = create_teacher(&resources.database, "late@example.com", &["Physics"]).await.unwrap();

    resources
        .messages
        .post_message(chat.id, "First question", &requester(&student))
        .await
        .unwrap();

    let err = resources
        .messages
        .list_messages(chat.id, &requester(&late))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    resources.conversations.add_teacher(chat.id, late.id).await.unwrap();

    let log = resources
        .messages
        .list_messages(chat.id, &requester(&late))
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].content, "First question");
}
