// ABOUTME: Token issuance command for tutorlink-cli
// ABOUTME: Signs a bearer token with the server's JWT_SECRET for an existing account
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use anyhow::{bail, Context, Result};
use std::env;
use tutorlink_server::auth::AuthManager;
use tutorlink_server::config::AuthConfig;
use tutorlink_server::constants::{auth, env_config};
use tutorlink_server::database::Database;

/// Sign and print a token for the account registered under `email`
pub async fn issue(database: &Database, email: &str) -> Result<()> {
    let jwt_secret = env::var(env_config::JWT_SECRET)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .context("JWT_SECRET must be set to the server's signing secret")?;

    let jwt_expiry_hours = env::var(env_config::JWT_EXPIRY_HOURS)
        .ok()
        .map(|v| v.parse::<i64>())
        .transpose()
        .context("JWT_EXPIRY_HOURS must be an integer")?
        .unwrap_or(auth::DEFAULT_JWT_EXPIRY_HOURS);

    let Some(account) = database.accounts().get_by_email(email).await? else {
        bail!("No account registered for {email}");
    };

    let manager = AuthManager::new(&AuthConfig {
        jwt_secret,
        jwt_expiry_hours,
    });
    let token = manager.generate_token(&account)?;

    println!("Token for {} ({}):", account.email, account.role);
    println!("{token}");
    println!("Use it as: Authorization: Bearer <token>");

    Ok(())
}
