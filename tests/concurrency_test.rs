// ABOUTME: Multi-threaded tests against a WAL database file with a multi-connection pool
// ABOUTME: Concurrent message posting, concurrent accepts, participant-set collisions and reuse
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_file_test_server_resources, create_student, create_teacher, new_doubt, requester,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tutorlink_server::models::{Account, ConversationId, DoubtId};
use tutorlink_server::resources::ServerResources;

const POST_ROUNDS: usize = 10;
const POSTS_PER_ROUND: usize = 16;
const ACCEPT_ROUNDS: usize = 10;

async fn join_all<T: Send + 'static>(handles: Vec<JoinHandle<T>>) -> Vec<T> {
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

fn spawn_accept(
    resources: &Arc<ServerResources>,
    doubt: DoubtId,
    teacher: &Account,
) -> JoinHandle<()> {
    let resources = Arc::clone(resources);
    let teacher = requester(teacher);
    tokio::spawn(async move {
        resources.doubts.accept_doubt(doubt, &teacher).await.unwrap();
    })
}

/// The doubt's linked conversation must hold every teacher on the doubt
async fn assert_settled(resources: &ServerResources, student: &Account, doubt: DoubtId, round: usize) {
    let settled = resources
        .doubts
        .get_doubt(doubt, &requester(student))
        .await
        .unwrap();
    let linked = settled
        .conversation
        .unwrap_or_else(|| panic!("round {round}: doubt left unlinked"));
    let chat = resources
        .conversations
        .get_conversation(linked, &requester(student))
        .await
        .unwrap();
    for teacher in &settled.teachers {
        assert!(
            chat.is_member(*teacher),
            "round {round}: teacher {teacher} missing from linked conversation"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_keep_latest_message_in_append_order() {
    let dir = TempDir::new().unwrap();
    let resources = create_file_test_server_resources(dir.path()).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let teacher = create_teacher(&resources.database, "tina@example.com", &["Physics"])
        .await
        .unwrap();
    let chat_id = resources
        .conversations
        .create_conversation(student.id, &[teacher.id], None)
        .await
        .unwrap()
        .conversation
        .id;

    for round in 0..POST_ROUNDS {
        let handles = (0..POSTS_PER_ROUND)
            .map(|i| {
                let resources = Arc::clone(&resources);
                let sender = requester(if i % 2 == 0 { &student } else { &teacher });
                tokio::spawn(async move {
                    resources
                        .messages
                        .post_message(chat_id, &format!("round {round} message {i}"), &sender)
                        .await
                        .unwrap()
                })
            })
            .collect();
        join_all(handles).await;

        let chat = resources
            .conversations
            .get_conversation(chat_id, &requester(&student))
            .await
            .unwrap();
        let messages = resources
            .messages
            .list_messages(chat_id, &requester(&student))
            .await
            .unwrap();
        let last = messages.last().unwrap();

        assert_eq!(messages.len(), (round + 1) * POSTS_PER_ROUND);
        assert_eq!(chat.latest_message, Some(last.id), "round {round}");
        assert!(chat.updated_at >= last.created_at, "round {round}: updatedAt went backwards");
        assert!(
            messages.windows(2).all(|w| w[0].created_at < w[1].created_at),
            "round {round}: listing disagrees with timestamps"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_settle_on_one_conversation() {
    let dir = TempDir::new().unwrap();
    let resources = create_file_test_server_resources(dir.path()).await.unwrap();
    let student = create_student(&resources.database, "sam@example.com").await.unwrap();
    let mut teachers = Vec::new();
    for i in 0..6 {
        teachers.push(
            create_teacher(&resources.database, &format!("t{i}@example.com"), &["Physics"])
                .await
                .unwrap(),
        );
    }

    for round in 0..ACCEPT_ROUNDS {
        let doubt = resources
            .doubts
            .create_doubt(new_doubt("Physics", &format!("Question {round}")), &requester(&student))
            .await
            .unwrap();

        let handles = teachers
            .iter()
            .map(|t| spawn_accept(&resources, doubt.id, t))
            .collect();
        join_all(handles).await;

        let settled = resources.database.doubts().get(doubt.id).await.unwrap().unwrap();
        assert_eq!(settled.teachers.len(), teachers.len(), "round {round}");
        assert_settled(&resources, &student, doubt.id, round).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_across_participant_collision() {
    let dir = TempDir::new().unwrap();
    let resources = create_file_test_server_resources(dir.path()).await.unwrap();
    let first = create_teacher(&resources.database, "t1@example.com", &["Physics"]).await.unwrap();
    let second = create_teacher(&resources.database, "t2@example.com", &["Physics"]).await.unwrap();
    let third = create_teacher(&resources.database, "t3@example.com", &["Physics"]).await.unwrap();

    for round in 0..ACCEPT_ROUNDS {
        let student = create_student(&resources.database, &format!("s{round}@example.com"))
            .await
            .unwrap();

        // {student, t1, t2} exists before the doubt grows into it
        resources
            .conversations
            .create_conversation(student.id, &[first.id, second.id], Some("Study group"))
            .await
            .unwrap();

        let doubt = resources
            .doubts
            .create_doubt(new_doubt("Physics", "Buoyancy"), &requester(&student))
            .await
            .unwrap();
        resources
            .doubts
            .accept_doubt(doubt.id, &requester(&first))
            .await
            .unwrap();

        join_all(vec![
            spawn_accept(&resources, doubt.id, &second),
            spawn_accept(&resources, doubt.id, &third),
        ])
        .await;

        assert_settled(&resources, &student, doubt.id, round).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reused_conversation_survives_concurrent_accepts() {
    let dir = TempDir::new().unwrap();
    let resources = create_file_test_server_resources(dir.path()).await.unwrap();
    let teacher = create_teacher(&resources.database, "tina@example.com", &["Physics"])
        .await
        .unwrap();

    for round in 0..ACCEPT_ROUNDS {
        let student = create_student(&resources.database, &format!("s{round}@example.com"))
            .await
            .unwrap();
        let mut doubts = Vec::new();
        for title in ["Inertia", "Momentum"] {
            doubts.push(
                resources
                    .doubts
                    .create_doubt(new_doubt("Physics", title), &requester(&student))
                    .await
                    .unwrap()
                    .id,
            );
        }

        let mut handles: Vec<JoinHandle<Option<ConversationId>>> = doubts
            .iter()
            .map(|id| {
                let resources = Arc::clone(&resources);
                let teacher = requester(&teacher);
                let id = *id;
                tokio::spawn(async move {
                    resources.doubts.accept_doubt(id, &teacher).await.unwrap();
                    None
                })
            })
            .collect();
        {
            let resources = Arc::clone(&resources);
            let (student_id, teacher_id) = (student.id, teacher.id);
            handles.push(tokio::spawn(async move {
                let registered = resources
                    .conversations
                    .create_conversation(student_id, &[teacher_id], None)
                    .await
                    .unwrap();
                Some(registered.conversation.id)
            }));
        }

        let opened: Vec<ConversationId> = join_all(handles).await.into_iter().flatten().collect();
        for id in opened {
            resources
                .conversations
                .get_conversation(id, &requester(&student))
                .await
                .unwrap_or_else(|e| panic!("round {round}: handed-out conversation {id} is gone: {e}"));
        }
        for id in &doubts {
            assert_settled(&resources, &student, *id, round).await;
        }
    }
}
