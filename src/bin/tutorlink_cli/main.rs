// ABOUTME: TutorLink CLI - command-line tool for account provisioning and token issuance
// ABOUTME: Creates student/teacher accounts and signs bearer tokens against the server database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors
//!
//! Usage:
//! ```bash
//! # Register a teacher covering two subjects
//! tutorlink-cli account create --role teacher --email t@example.com --name "T. Rivera" \
//!     --subject Mathematics --subject Physics
//!
//! # Register a student
//! tutorlink-cli account create --role student --email s@example.com --name "Sam"
//!
//! # Issue a bearer token (uses JWT_SECRET from the environment)
//! tutorlink-cli token issue --email s@example.com
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use std::str::FromStr;
use tracing::info;
use tutorlink_server::config::DatabaseUrl;
use tutorlink_server::constants::env_config;
use tutorlink_server::database::Database;
use tutorlink_server::models::Role;

#[derive(Parser)]
#[command(
    name = "tutorlink-cli",
    about = "TutorLink management CLI",
    long_about = "Command-line tool for creating TutorLink accounts and issuing bearer tokens."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Account management commands
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },

    /// Token commands
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Register a student or teacher
    Create {
        /// student or teacher
        #[arg(long, value_parser = Role::from_str)]
        role: Role,

        /// Unique email
        #[arg(long)]
        email: String,

        /// Display name (defaults to the email prefix)
        #[arg(long)]
        name: Option<String>,

        /// Subject covered by a teacher; repeatable
        #[arg(long = "subject")]
        subjects: Vec<String>,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Sign a bearer token for an existing account
    Issue {
        /// Account email
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let database_url = cli
        .database_url
        .or_else(|| env::var(env_config::DATABASE_URL).ok())
        .unwrap_or_else(|| "sqlite:./data/tutorlink.db".into());

    info!("Connecting to database: {}", database_url);
    let database = Database::new(&DatabaseUrl::parse_url(&database_url)?).await?;

    match cli.command {
        Command::Account { action } => match action {
            AccountCommand::Create {
                role,
                email,
                name,
                subjects,
            } => commands::account::create(&database, role, email, name, subjects).await?,
        },
        Command::Token { action } => match action {
            TokenCommand::Issue { email } => commands::token::issue(&database, &email).await?,
        },
    }

    Ok(())
}
