// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database, JWT, CORS and AI provider settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Environment-based configuration management

use crate::constants::{ai, auth, env_config, ports};
use anyhow::{bail, Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs
    pub fn parse_url(s: &str) -> Result<Self> {
        let Some(path_str) = s.strip_prefix("sqlite:") else {
            bail!("Unsupported database URL '{s}': only sqlite: URLs are supported");
        };
        let path_str = path_str.trim_start_matches("//");
        if path_str == ":memory:" || path_str.is_empty() {
            Ok(Self::Memory)
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            })
        }
    }

    /// Connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// True for the in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/tutorlink.db"),
        }
    }
}

/// Token issuance configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_secret(),
            jwt_expiry_hours: auth::DEFAULT_JWT_EXPIRY_HOURS,
        }
    }
}

/// Which completion backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Google Gemini
    Gemini,
    /// `OpenAI` or any compatible endpoint
    OpenAi,
}

impl LlmProviderKind {
    /// Parse a provider name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "openai-compatible" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

/// AI enrichment and assistant settings
#[derive(Clone)]
pub struct AiConfig {
    /// Run background enrichment after doubt creation
    pub enrichment_enabled: bool,
    /// Time budget for one completion call
    pub timeout_secs: u64,
    /// Explicit provider choice; otherwise the first one with a key wins
    pub provider: Option<LlmProviderKind>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Gemini model
    pub gemini_model: String,
    /// `OpenAI` API key
    pub openai_api_key: Option<String>,
    /// `OpenAI`-compatible base URL
    pub openai_base_url: String,
    /// `OpenAI`-compatible model
    pub openai_model: String,
}

impl AiConfig {
    /// Provider that will actually be used, given configured keys
    #[must_use]
    pub fn effective_provider(&self) -> Option<LlmProviderKind> {
        match self.provider {
            Some(LlmProviderKind::Gemini) => {
                self.gemini_api_key.as_ref().map(|_| LlmProviderKind::Gemini)
            }
            Some(LlmProviderKind::OpenAi) => {
                self.openai_api_key.as_ref().map(|_| LlmProviderKind::OpenAi)
            }
            None if self.gemini_api_key.is_some() => Some(LlmProviderKind::Gemini),
            None if self.openai_api_key.is_some() => Some(LlmProviderKind::OpenAi),
            None => None,
        }
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("enrichment_enabled", &self.enrichment_enabled)
            .field("timeout_secs", &self.timeout_secs)
            .field("provider", &self.effective_provider())
            .field("gemini_model", &self.gemini_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .finish_non_exhaustive()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enrichment_enabled: true,
            timeout_secs: ai::DEFAULT_COMPLETION_TIMEOUT_SECS,
            provider: None,
            gemini_api_key: None,
            gemini_model: ai::DEFAULT_GEMINI_MODEL.to_owned(),
            openai_api_key: None,
            openai_base_url: ai::DEFAULT_OPENAI_BASE_URL.to_owned(),
            openai_model: ai::DEFAULT_OPENAI_MODEL.to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Allowed CORS origins (`*` allows any)
    pub cors_allowed_origins: Vec<String>,
    /// AI configuration
    pub ai: AiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or `JWT_SECRET` is missing in production
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment = Environment::from_str_or_default(&env_var_or(
            env_config::ENVIRONMENT,
            "development",
        ));

        let http_port = env::var(env_config::HTTP_PORT)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("HTTP_PORT must be a valid port number")?
            .unwrap_or(ports::DEFAULT_HTTP_PORT);

        let database_url =
            DatabaseUrl::parse_url(&env_var_or(env_config::DATABASE_URL, "sqlite:./data/tutorlink.db"))?;

        let jwt_secret = match env::var(env_config::JWT_SECRET) {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment.is_production() => {
                bail!("JWT_SECRET must be set in production");
            }
            _ => {
                warn!("JWT_SECRET not set; generated a per-process secret, tokens will not survive restarts");
                generate_secret()
            }
        };

        let jwt_expiry_hours = env::var(env_config::JWT_EXPIRY_HOURS)
            .ok()
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("JWT_EXPIRY_HOURS must be an integer")?
            .unwrap_or(auth::DEFAULT_JWT_EXPIRY_HOURS);

        let timeout_secs = env::var(env_config::ENRICHMENT_TIMEOUT_SECS)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("ENRICHMENT_TIMEOUT_SECS must be a positive integer")?
            .unwrap_or(ai::DEFAULT_COMPLETION_TIMEOUT_SECS);

        let provider = match env::var(env_config::LLM_PROVIDER) {
            Ok(name) => {
                let kind = LlmProviderKind::parse(&name);
                if kind.is_none() {
                    warn!(provider = %name, "Unknown LLM_PROVIDER, falling back to auto-detection");
                }
                kind
            }
            Err(_) => None,
        };

        let config = Self {
            http_port,
            environment,
            database_url,
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours,
            },
            cors_allowed_origins: parse_origins(&env_var_or(
                env_config::CORS_ALLOWED_ORIGINS,
                "*",
            )),
            ai: AiConfig {
                enrichment_enabled: parse_bool(&env_var_or(
                    env_config::ENRICHMENT_ENABLED,
                    "true",
                )),
                timeout_secs,
                provider,
                gemini_api_key: non_empty_var(env_config::GEMINI_API_KEY),
                gemini_model: env_var_or(env_config::GEMINI_MODEL, ai::DEFAULT_GEMINI_MODEL),
                openai_api_key: non_empty_var(env_config::OPENAI_API_KEY),
                openai_base_url: env_var_or(
                    env_config::OPENAI_BASE_URL,
                    ai::DEFAULT_OPENAI_BASE_URL,
                ),
                openai_model: env_var_or(env_config::OPENAI_MODEL, ai::DEFAULT_OPENAI_MODEL),
            },
        };

        info!(
            environment = %config.environment,
            http_port = config.http_port,
            database = %config.database_url.to_connection_string(),
            ai = ?config.ai,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// One-line summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} port={} database={} llm={:?} enrichment={}",
            self.environment,
            self.http_port,
            self.database_url.to_connection_string(),
            self.ai.effective_provider(),
            self.ai.enrichment_enabled,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
