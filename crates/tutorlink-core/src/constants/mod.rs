// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Subject catalog, server defaults, limits and AI assistant settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! large list.

/// Service identity used in logs and health responses
pub mod service_names {
    /// Server binary / service name
    pub const TUTORLINK_SERVER: &str = "tutorlink-server";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Flat subject taxonomy offered to clients
pub mod subjects {
    /// Subjects a doubt can be raised under and a teacher can cover
    pub const CATALOG: &[&str] = &[
        "Mathematics",
        "Physics",
        "Chemistry",
        "Biology",
        "English",
        "Computer Science",
        "History",
        "Geography",
    ];
}

/// Conversation naming and limits
pub mod conversations {
    /// Prefix of the display name of a conversation bridged from a doubt
    pub const DOUBT_CHAT_PREFIX: &str = "Doubt: ";
    /// Display name when the creator supplies none
    pub const DEFAULT_DISPLAY_NAME: &str = "Conversation";
}

/// Input limits enforced at the boundary
pub mod limits {
    /// Maximum characters in a doubt title
    pub const MAX_TITLE_CHARS: usize = 200;
    /// Maximum characters in a doubt description
    pub const MAX_DESCRIPTION_CHARS: usize = 10_000;
    /// Maximum characters in a chat message
    pub const MAX_MESSAGE_CHARS: usize = 10_000;
    /// Maximum request body size in bytes
    pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;
    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
}

/// Token issuance defaults
pub mod auth {
    /// Default token lifetime in hours (30 days)
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 720;
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "tutorlink-api";
    /// JWT issuer claim
    pub const JWT_ISSUER: &str = "tutorlink";
}

/// AI enrichment and assistant defaults
pub mod ai {
    /// Time budget for one completion call, in seconds
    pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 30;
    /// Default Gemini model
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
    /// Default `OpenAI`-compatible base URL
    pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default `OpenAI`-compatible model
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    /// Assistant sampling temperature
    pub const ASSISTANT_TEMPERATURE: f32 = 0.2;
    /// Assistant response token cap
    pub const ASSISTANT_MAX_TOKENS: u32 = 600;
    /// History turns forwarded to the assistant
    pub const ASSISTANT_HISTORY_LIMIT: usize = 10;
    /// Support address quoted by the offline assistant
    pub const SUPPORT_EMAIL: &str = "support@example.com";
}

/// Environment variable names
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// JWT signing secret
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// JWT lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Comma-separated allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Enable background enrichment
    pub const ENRICHMENT_ENABLED: &str = "ENRICHMENT_ENABLED";
    /// Enrichment/assistant time budget
    pub const ENRICHMENT_TIMEOUT_SECS: &str = "ENRICHMENT_TIMEOUT_SECS";
    /// Preferred provider (`gemini` or `openai`)
    pub const LLM_PROVIDER: &str = "LLM_PROVIDER";
    /// Gemini API key
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Gemini model override
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    /// `OpenAI` API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// `OpenAI`-compatible base URL
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// `OpenAI`-compatible model
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
}
