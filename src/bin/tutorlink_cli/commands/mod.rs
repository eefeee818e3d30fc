// ABOUTME: Re-exports command modules for tutorlink-cli
// ABOUTME: Provides access to account and token commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

pub mod account;
pub mod token;
