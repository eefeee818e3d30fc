// ABOUTME: Integration tests for the conversation registry
// ABOUTME: Participant-set deduplication, teacher additions, membership and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_student, create_teacher, create_test_server_resources, new_doubt, requester};
use tutorlink_server::database::TeacherAddition;
use tutorlink_server::errors::ErrorCode;
use tutorlink_server::models::ConversationId;

#[tokio::test]
async fn test_create_conversation_dedupes_participant_set() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let a = create_teacher(&resources.database, "a@example.com", &["Physics"]).await.unwrap();
    let b = create_teacher(&resources.database, "b@example.com", &["Physics"]).await.unwrap();

    let first = resources
        .conversations
        .create_conversation(student.id, &[a.id, b.id], Some("Group"))
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.conversation.display_name, "Group");

    let again = resources
        .conversations
        .create_conversation(student.id, &[b.id, a.id, b.id], Some("Renamed"))
        .await
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.conversation.id, first.conversation.id);
    assert_eq!(again.conversation.display_name, "Group");

    let subset = resources
        .conversations
        .create_conversation(student.id, &[a.id], None)
        .await
        .unwrap();
    assert!(subset.created);
    assert_ne!(subset.conversation.id, first.conversation.id);
    assert_eq!(subset.conversation.display_name, "Conversation");
}

#[tokio::test]
async fn test_create_conversation_validates_roles() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let other = create_student(&resources.database, "olive@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();

    let err = resources
        .conversations
        .create_conversation(student.id, &[], None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = resources
        .conversations
        .create_conversation(teacher.id, &[teacher.id], None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleViolation);

    let err = resources
        .conversations
        .create_conversation(student.id, &[teacher.id, other.id], None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleViolation);

    let chats = resources
        .conversations
        .list_conversations(&requester(&student))
        .await
        .unwrap();
    assert!(chats.is_empty());
}

#[tokio::test]
async fn test_get_conversation_requires_membership() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let stranger = create_student(&resources.database, "olive@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();
    let outsider = create_teacher(&resources.database, "o@example.com", &["Physics"]).await.unwrap();

    let chat = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap()
        .conversation;

    for member in [&student, &teacher] {
        assert!(resources
            .conversations
            .get_conversation(chat.id, &requester(member))
            .await
            .is_ok());
    }
    for other in [&stranger, &outsider] {
        let err = resources
            .conversations
            .get_conversation(chat.id, &requester(other))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    let err = resources
        .conversations
        .get_conversation(ConversationId::new(), &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_add_teacher_outcomes() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let a = create_teacher(&resources.database, "a@example.com", &["Physics"]).await.unwrap();
    let b = create_teacher(&resources.database, "b@example.com", &["Physics"]).await.unwrap();
    let c = create_teacher(&resources.database, "c@example.com", &["Physics"]).await.unwrap();

    let solo = resources
        .conversations
        .create_conversation(student.id, &[a.id], None)
        .await
        .unwrap()
        .conversation;

    let join = resources.conversations.add_teacher(solo.id, b.id).await.unwrap();
    assert_eq!(join.outcome, TeacherAddition::Added);
    assert_eq!(join.conversation.id, solo.id);
    assert_eq!(join.conversation.teachers, vec![a.id, b.id]);

    let join = resources.conversations.add_teacher(solo.id, b.id).await.unwrap();
    assert_eq!(join.outcome, TeacherAddition::AlreadyPresent);
    assert_eq!(join.conversation.teachers, vec![a.id, b.id]);

    // {a, b, c} already exists elsewhere once we create it
    let group = resources
        .conversations
        .create_conversation(student.id, &[a.id, b.id, c.id], None)
        .await
        .unwrap()
        .conversation;
    let join = resources.conversations.add_teacher(solo.id, c.id).await.unwrap();
    assert_eq!(join.outcome, TeacherAddition::Collided(group.id));
    assert_eq!(join.conversation.id, group.id);

    let unchanged = resources
        .conversations
        .get_conversation(solo.id, &requester(&student))
        .await
        .unwrap();
    assert_eq!(unchanged.teachers, vec![a.id, b.id]);
}

#[tokio::test]
async fn test_add_teacher_rejects_students_and_missing_conversations() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let other = create_student(&resources.database, "olive@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();

    let chat = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap()
        .conversation;

    let err = resources
        .conversations
        .add_teacher(chat.id, other.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleViolation);

    let err = resources
        .conversations
        .add_teacher(ConversationId::new(), teacher.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_list_conversations_for_both_roles() {
    let resources = create_test_server_resources(None).await.unwrap();
    let sam = create_student(&resources.database, "sam@example.com").await.unwrap();
    let olive = create_student(&resources.database, "olive@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();

    resources
        .conversations
        .create_conversation(sam.id, &[teacher.id], None)
        .await
        .unwrap();
    resources
        .conversations
        .create_conversation(olive.id, &[teacher.id], None)
        .await
        .unwrap();

    let teacher_chats = resources
        .conversations
        .list_conversations(&requester(&teacher))
        .await
        .unwrap();
    assert_eq!(teacher_chats.len(), 2);

    let sam_chats = resources
        .conversations
        .list_conversations(&requester(&sam))
        .await
        .unwrap();
    assert_eq!(sam_chats.len(), 1);
    assert_eq!(sam_chats[0].student, sam.id);
}

#[tokio::test]
async fn test_delete_conversation_only_by_student() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();

    let mut input = new_doubt("Physics", "Capacitors");
    input.teachers = vec![teacher.id];
    let doubt = resources
        .doubts
        .create_doubt(input, &requester(&student))
        .await
        .unwrap();
    let chat_id = doubt.conversation.expect("linked");

    resources
        .messages
        .post_message(chat_id, "Hello!", &requester(&student))
        .await
        .unwrap();

    let err = resources
        .conversations
        .delete_conversation(chat_id, &requester(&teacher))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    resources
        .conversations
        .delete_conversation(chat_id, &requester(&student))
        .await
        .unwrap();

    let err = resources
        .conversations
        .get_conversation(chat_id, &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    assert_eq!(resources.database.chats().count_messages(chat_id).await.unwrap(), 0);

    let doubt = resources
        .doubts
        .get_doubt(doubt.id, &requester(&student))
        .await
        .unwrap();
    assert!(doubt.conversation.is_none());

    let err = resources
        .conversations
        .delete_conversation(chat_id, &requester(&student))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_recreating_after_delete_gives_new_conversation() {
    let resources = create_test_server_resources(None).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "t@example.com", &["Physics"]).await.unwrap();

    let first = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap()
        .conversation;
    resources
        .conversations
        .delete_conversation(first.id, &requester(&student))
        .await
        .unwrap();

    let second = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap();
    assert!(second.created);
    assert_ne!(second.conversation.id, first.id);
}
