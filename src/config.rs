use std::env;

use thiserror::Error;
use url::Url;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

pub const SYSTEM_PROMPT: &str = "\
You are a helpful real estate analyst assistant that answers questions \
based on the KFH Real Estate Report 2025 Q1. Use only the information \
from the provided context to answer questions. If you're unsure or the \
context doesn't contain the relevant information, say so.

RESPONSE STYLE: CONCISE & FOCUSED
- Keep answers brief and to the point
- Use bullet points for key data
- Highlight important numbers with **bold**
- Avoid lengthy explanations unless specifically requested
- Focus on the most relevant information first

DEFINITION RESPONSES:
- For \"what is\", \"definition\", \"what does mean\" questions, give a \
clear, concise definition as 3-5 bullet points, highlighting specific \
requirements or criteria with **bold**

Always provide accurate, data-driven insights based on the report \
content. Be concise and direct in your responses.";

/// Passages retrieved per query.
pub const TOP_K_PASSAGES: usize = 5;
pub const COMPLETION_TEMPERATURE: f32 = 0.7;
/// Response length cap, keeps answers concise.
pub const COMPLETION_MAX_TOKENS: u32 = 300;
/// Conversation history kept per session, in characters. Roughly a
/// quarter of this in tokens, leaving room for context and the answer.
pub const HISTORY_CHAR_BUDGET: usize = 12_000;

pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_DB_PATH: &str = "data/report_index.json";
pub const DEFAULT_ACCESS_PASSWORD: &str = "default123";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variables that must be set for the service to start.
pub const REQUIRED_ENV_VARS: [&str; 4] = [
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_DEPLOYMENT_NAME",
    "AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<String>),

    #[error("AZURE_OPENAI_ENDPOINT is not a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub api_version: String,
    pub deployment_name: String,
    pub embedding_deployment_name: String,
    pub db_path: String,
    pub environment: Environment,
    pub access_password: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Tests feed
    /// maps through here instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|name| get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let endpoint = Url::parse(&get("AZURE_OPENAI_ENDPOINT").unwrap_or_default())?;

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let environment = match get("ENVIRONMENT") {
            Some(value) if value.trim().eq_ignore_ascii_case("production") => {
                Environment::Production
            }
            _ => Environment::Development,
        };

        Ok(AppConfig {
            api_key: get("AZURE_OPENAI_API_KEY").unwrap_or_default(),
            endpoint,
            api_version: get("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            deployment_name: get("AZURE_OPENAI_DEPLOYMENT_NAME").unwrap_or_default(),
            embedding_deployment_name: get("AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME")
                .unwrap_or_default(),
            db_path: get("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            environment,
            access_password: get("ACCESS_PASSWORD")
                .unwrap_or_else(|| DEFAULT_ACCESS_PASSWORD.to_string()),
            port,
        })
    }

    /// The access-password gate only applies in production.
    pub fn requires_auth(&self) -> bool {
        self.environment == Environment::Production
    }
}
