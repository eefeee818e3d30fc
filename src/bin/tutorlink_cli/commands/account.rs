// ABOUTME: Account provisioning command for tutorlink-cli
// ABOUTME: Registers students and teachers directly in the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use anyhow::Result;
use tracing::info;
use tutorlink_server::database::{Database, NewAccount};
use tutorlink_server::models::Role;

/// Register an account and print its identifier
pub async fn create(
    database: &Database,
    role: Role,
    email: String,
    name: Option<String>,
    subjects: Vec<String>,
) -> Result<()> {
    let display_name = name.unwrap_or_else(|| {
        email
            .split('@')
            .next()
            .unwrap_or(email.as_str())
            .to_owned()
    });

    if role == Role::Student && !subjects.is_empty() {
        info!("Ignoring --subject for a student account");
    }

    let account = database
        .accounts()
        .create(NewAccount {
            role,
            email,
            display_name,
            subjects,
        })
        .await?;

    println!("Created {} account", account.role);
    println!("   ID: {}", account.id);
    println!("   Email: {}", account.email);
    println!("   Name: {}", account.display_name);
    if !account.subjects.is_empty() {
        println!("   Subjects: {}", account.subjects.join(", "));
    }

    Ok(())
}
