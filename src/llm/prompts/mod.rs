// ABOUTME: System prompts and prompt builders for completion requests
// ABOUTME: Prompt text lives in markdown files loaded at compile time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

use crate::models::Doubt;

/// System instruction for doubt explanations
pub const ENRICHMENT_SYSTEM_PROMPT: &str = include_str!("enrichment_system.md");

/// System prompt for the public site assistant
pub const TUTOR_BOT_SYSTEM_PROMPT: &str = include_str!("tutor_bot.md");

/// User prompt asking for an explanation of `doubt`
#[must_use]
pub fn enrichment_prompt(doubt: &Doubt) -> String {
    format!(
        "A student asked a doubt in {}:\n\nTitle: {}\nDescription: {}\n\nProvide a detailed explanation.",
        doubt.subject, doubt.title, doubt.description
    )
}
