// ABOUTME: System-wide constants re-exported from tutorlink-core
// ABOUTME: Subject catalog, limits, defaults and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Constants Module

pub use tutorlink_core::constants::*;
